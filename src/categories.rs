use crate::error::{BoardError, BoardResult};
use crate::models::MeasureUnit;

/// A field activity type and the unit its quantity is measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub id: &'static str,
    pub name: &'static str,
    pub unit: MeasureUnit,
}

const CATEGORIES: [Category; 11] = [
    Category { id: "perf_pq", name: "Perforación PQ", unit: MeasureUnit::Meters },
    Category { id: "perf_hq", name: "Perforación HQ", unit: MeasureUnit::Meters },
    Category { id: "perf_nq", name: "Perforación NQ", unit: MeasureUnit::Meters },
    Category { id: "rec_core", name: "Recuperación de Testigos", unit: MeasureUnit::Percentage },
    Category { id: "mapeo_geo", name: "Mapeo Geológico", unit: MeasureUnit::Meters },
    Category { id: "log_geotech", name: "Logueo Geotécnico", unit: MeasureUnit::Meters },
    Category { id: "sampling", name: "Muestreo", unit: MeasureUnit::Units },
    Category { id: "install_piezo", name: "Instalación Piezómetro", unit: MeasureUnit::Units },
    Category { id: "rig_move", name: "Movilización de Equipo", unit: MeasureUnit::Hours },
    Category { id: "maintenance", name: "Mantenimiento Mecánico", unit: MeasureUnit::Hours },
    Category { id: "safety_mtg", name: "Charla de Seguridad", unit: MeasureUnit::Hours },
];

/// All known categories in display order.
pub fn all() -> &'static [Category] {
    &CATEGORIES
}

/// Looks a category up by exact id or case-insensitive name.
pub fn find(key: &str) -> Option<&'static Category> {
    let key = key.trim();
    CATEGORIES
        .iter()
        .find(|c| c.id == key || c.name.to_lowercase() == key.to_lowercase())
}

/// Like [`find`], but rejects unknown keys with `InvalidCategory`.
pub fn resolve(key: &str) -> BoardResult<&'static Category> {
    find(key).ok_or_else(|| BoardError::InvalidCategory(key.to_string()))
}

/// Drilling activities, counted in the drilled-meters KPI.
pub fn is_drilling(category: &str) -> bool {
    category.to_lowercase().contains("perforación")
}

/// Logging and mapping activities, counted in the logged-meters KPI.
pub fn is_logging(category: &str) -> bool {
    let c = category.to_lowercase();
    c.contains("logueo") || c.contains("mapeo")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_by_id_or_name() {
        assert_eq!(find("sampling").unwrap().name, "Muestreo");
        assert_eq!(find("perforación pq").unwrap().id, "perf_pq");
        assert_eq!(find("PERFORACIÓN HQ").unwrap().unit, MeasureUnit::Meters);
        assert!(find("Voladura").is_none());
    }

    #[test]
    fn resolve_rejects_unknown() {
        match resolve("Voladura") {
            Err(BoardError::InvalidCategory(k)) => assert_eq!(k, "Voladura"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn classifies_kpi_buckets() {
        assert!(is_drilling("Perforación NQ"));
        assert!(!is_drilling("Muestreo"));
        assert!(is_logging("Logueo Geotécnico"));
        assert!(is_logging("Mapeo Geológico"));
        assert!(!is_logging("Charla de Seguridad"));
    }

    #[test]
    fn ids_are_unique() {
        let mut ids: Vec<_> = all().iter().map(|c| c.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), all().len());
    }
}
