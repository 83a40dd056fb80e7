//! Executive summary of a period report, written by an external
//! text-generation service.

use std::future::Future;
use std::pin::Pin;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::error::{BoardError, BoardResult};
use crate::report::{ConsolidatedReportItem, DateRange};

pub const MISSING_KEY_MESSAGE: &str = "Error: API Key no configurada.";
pub const CONNECTION_FAILED_MESSAGE: &str = "Error al conectar con el servicio de IA para generar el resumen.";
pub const EMPTY_SUMMARY_MESSAGE: &str = "No se pudo generar el resumen.";

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Boxed future so the trait stays dyn-compatible.
pub type SummaryFuture<'a> = Pin<Box<dyn Future<Output = BoardResult<String>> + Send + 'a>>;

/// Turns consolidated report rows into prose.
pub trait Summarizer: Send + Sync {
    /// # Errors
    ///
    /// `SummaryService` carrying the message to show the user when the
    /// service is unconfigured or the request fails.
    fn summarize<'a>(&'a self, rows: &'a [ConsolidatedReportItem], range: DateRange) -> SummaryFuture<'a>;
}

/// Runs `summarizer`, replacing any failure with its user-facing message.
pub async fn summarize_or_fallback(
    summarizer: &dyn Summarizer,
    rows: &[ConsolidatedReportItem],
    range: DateRange,
) -> String {
    match summarizer.summarize(rows, range).await {
        Ok(text) => text,
        Err(BoardError::SummaryService(msg)) => msg,
        Err(e) => {
            error!(error = %e, "summary failed");
            CONNECTION_FAILED_MESSAGE.to_string()
        }
    }
}

/// Prompt sent to the service for the given rows and period.
pub fn build_prompt(rows: &[ConsolidatedReportItem], range: DateRange) -> BoardResult<String> {
    let data = serde_json::to_string_pretty(rows)?;
    Ok(format!(
        "Actúa como un Supervisor Senior de Perforación Diamantina.\n\
         Analiza los siguientes datos consolidados de producción en el rango de fechas {start} a {end}.\n\n\
         Datos:\n{data}\n\n\
         Genera un resumen ejecutivo breve (máximo 2 párrafos) destacando:\n\
         1. El avance total en metros perforados (si los hay).\n\
         2. Actividades auxiliares clave (mapeo, instalaciones, etc.).\n\
         3. Una conclusión sobre la productividad del periodo.\n\n\
         Usa un tono profesional, técnico y directo.\n",
        start = range.start.format("%Y-%m-%d"),
        end = range.end.format("%Y-%m-%d"),
    ))
}

/// Live client for the Gemini `generateContent` endpoint.
pub struct GeminiSummarizer {
    client: Client,
    api_key: Option<String>,
    model: String,
}

impl GeminiSummarizer {
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Self {
        Self { client: Client::new(), api_key, model: model.into() }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl Summarizer for GeminiSummarizer {
    fn summarize<'a>(&'a self, rows: &'a [ConsolidatedReportItem], range: DateRange) -> SummaryFuture<'a> {
        Box::pin(async move {
            let Some(api_key) = self.api_key.as_deref() else {
                warn!("summary requested without an API key");
                return Err(BoardError::SummaryService(MISSING_KEY_MESSAGE.to_string()));
            };
            let prompt = build_prompt(rows, range)?;
            let body = GenerateRequest {
                contents: vec![Content { parts: vec![Part { text: &prompt }] }],
            };
            let url = format!("{GEMINI_API_BASE}/{}:generateContent", self.model);

            let failed = |what: &str, detail: String| {
                error!(model = %self.model, "{what}: {detail}");
                BoardError::SummaryService(CONNECTION_FAILED_MESSAGE.to_string())
            };

            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", api_key)
                .json(&body)
                .send()
                .await
                .map_err(|e| failed("request failed", e.to_string()))?;

            let status = response.status();
            let text = response
                .text()
                .await
                .map_err(|e| failed("could not read response", e.to_string()))?;
            if !status.is_success() {
                return Err(failed("service returned an error", format!("{}: {text}", status.as_u16())));
            }

            let parsed: GenerateResponse = serde_json::from_str(&text)
                .map_err(|e| failed("could not parse response", e.to_string()))?;
            let summary: String = parsed
                .candidates
                .into_iter()
                .next()
                .and_then(|c| c.content)
                .map(|c| c.parts.into_iter().map(|p| p.text).collect())
                .unwrap_or_default();

            debug!(chars = summary.len(), "summary received");
            if summary.trim().is_empty() {
                Ok(EMPTY_SUMMARY_MESSAGE.to_string())
            } else {
                Ok(summary)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MeasureUnit;
    use chrono::NaiveDate;

    struct Canned(BoardResult<String>);

    impl Summarizer for Canned {
        fn summarize<'a>(&'a self, _rows: &'a [ConsolidatedReportItem], _range: DateRange) -> SummaryFuture<'a> {
            let out = match &self.0 {
                Ok(s) => Ok(s.clone()),
                Err(e) => Err(BoardError::SummaryService(e.to_string())),
            };
            Box::pin(async move { out })
        }
    }

    fn range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
        )
    }

    fn rows() -> Vec<ConsolidatedReportItem> {
        vec![ConsolidatedReportItem {
            category: "Perforación PQ".into(),
            unit: MeasureUnit::Meters,
            total_quantity: 80.0,
            task_count: 2,
        }]
    }

    #[test]
    fn prompt_carries_range_and_rows() {
        let prompt = build_prompt(&rows(), range()).unwrap();
        assert!(prompt.contains("2025-03-01 a 2025-03-15"));
        assert!(prompt.contains("\"totalQuantity\": 80.0"));
        assert!(prompt.contains("\"unit\": \"m\""));
    }

    #[tokio::test]
    async fn missing_key_fails_without_network() {
        let s = GeminiSummarizer::new(None, "gemini-2.5-flash");
        match s.summarize(&rows(), range()).await {
            Err(BoardError::SummaryService(msg)) => assert_eq!(msg, MISSING_KEY_MESSAGE),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(summarize_or_fallback(&s, &rows(), range()).await, MISSING_KEY_MESSAGE);
    }

    #[tokio::test]
    async fn fallback_passes_text_through() {
        let ok = Canned(Ok("80 m perforados".into()));
        assert_eq!(summarize_or_fallback(&ok, &rows(), range()).await, "80 m perforados");

        let down = Canned(Err(BoardError::SummaryService(CONNECTION_FAILED_MESSAGE.into())));
        assert_eq!(summarize_or_fallback(&down, &rows(), range()).await, CONNECTION_FAILED_MESSAGE);
    }
}
