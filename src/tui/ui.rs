use chrono::{DateTime, Local, Utc};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, Paragraph, Row, Table, Wrap},
    Frame,
};

use super::app::{App, InputField, InputMode, ViewMode};
use crate::categories;
use crate::models::{Task, TaskStatus};
use crate::timing::{execution_time, format_duration, wait_time};

pub fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Body
            Constraint::Length(3)  // Help
        ].as_ref())
        .split(f.area());

    match app.view_mode {
        ViewMode::Board => draw_board(f, app, chunks[0]),
        ViewMode::Report => draw_report(f, app, chunks[0]),
    }

    let help_text = match (&app.input_mode, &app.message) {
        (InputMode::Normal, Some(msg)) => msg.clone(),
        (InputMode::Normal, None) => match app.view_mode {
            ViewMode::Board => "q: Quit | Tab: Report | ←→: Column | ↑↓: Select | ]/Space: Advance | [: Back | a: Add | e: Title | c: Category | n: Qty | o: Notes | d: Del".to_string(),
            ViewMode::Report => "q: Quit | Tab: Board | f: From | t: To | s: AI Summary".to_string(),
        },
        (InputMode::Editing, _) => "Enter: Save | Esc: Cancel".to_string(),
        (InputMode::Adding, _) => "Enter: Next Step | Esc: Cancel".to_string(),
        (InputMode::Confirming, _) => "y: Delete | n/Esc: Cancel".to_string(),
    };
    let help_style = if app.message.is_some() && app.input_mode == InputMode::Normal {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Gray)
    };
    let help = Paragraph::new(help_text)
        .style(help_style)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[1]);

    if app.input_mode != InputMode::Normal {
        draw_input(f, app);
    }
}

fn draw_board(f: &mut Frame, app: &mut App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(0)].as_ref())
        .split(area);

    // Longest-waiting open tasks
    let critical: Vec<Line> = app
        .board
        .critical_tasks(app.now, 3)
        .into_iter()
        .map(|(t, waited)| {
            Line::from(vec![
                Span::styled(format!("{:>10}  ", format_duration(waited)), Style::default().fg(Color::Red)),
                Span::raw(format!("#{} {} ", t.id, t.title)),
                Span::styled(format!("({})", t.status.label()), Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect();
    let critical = if critical.is_empty() {
        Paragraph::new("Sin tareas pendientes")
    } else {
        Paragraph::new(critical)
    };
    let clock = Local::now().format("%a %d %b %H:%M:%S").to_string();
    f.render_widget(
        critical.block(Block::default().borders(Borders::ALL).title("Drillboard - Mayor tiempo de espera").title_bottom(Line::from(clock).alignment(Alignment::Right))),
        rows[0],
    );

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3), Constraint::Ratio(1, 3), Constraint::Ratio(1, 3)].as_ref())
        .split(rows[1]);

    for (i, status) in TaskStatus::ALL.iter().enumerate() {
        let now = app.now;
        let items: Vec<ListItem> = app.board.by_status(*status).map(|t| card(t, now)).collect();
        let count = items.len();
        let focused = i == app.column;
        let border = if focused {
            Style::default().fg(status_color(*status)).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).border_style(border).title(format!("{} ({})", status.label(), count)))
            .highlight_style(if focused { Style::default().bg(Color::DarkGray) } else { Style::default() })
            .highlight_symbol(if focused { ">> " } else { "   " });
        f.render_stateful_widget(list, columns[i], &mut app.column_states[i]);
    }
}

/// Multi-line card: title, quantity and timing labels.
fn card(t: &Task, now: DateTime<Utc>) -> ListItem<'_> {
    let mut lines = vec![
        Line::from(vec![
            Span::styled(format!("#{} ", t.id), Style::default().fg(Color::DarkGray)),
            Span::styled(t.title.as_str(), Style::default().add_modifier(Modifier::BOLD)),
        ]),
        Line::from(format!("{} · {} {}", t.category, t.quantity, t.unit)),
    ];
    let wait_label = if t.status == TaskStatus::Pending { "En espera" } else { "Espera" };
    let mut timing = vec![Span::styled(
        format!("{}: {}", wait_label, format_duration(wait_time(t, now))),
        Style::default().fg(Color::Yellow),
    )];
    if let Some(exec) = execution_time(t, now) {
        let color = if t.completed_at.is_some() { Color::Green } else { Color::Blue };
        timing.push(Span::raw("  "));
        timing.push(Span::styled(format!("Ejecución: {}", format_duration(exec)), Style::default().fg(color)));
    }
    lines.push(Line::from(timing));
    if let Some(d) = &t.description {
        lines.push(Line::styled(d.as_str(), Style::default().fg(Color::DarkGray)));
    }
    lines.push(Line::raw(""));
    ListItem::new(Text::from(lines))
}

fn draw_report(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(6), Constraint::Length(8)].as_ref())
        .split(area);

    let k = &app.report.kpis;
    let kpis = vec![
        Line::from(format!("Metros perforados:      {} m", k.drilling_meters_label())),
        Line::from(format!("Metros logueo/mapeo:    {} m", k.logging_meters_label())),
        Line::from(format!("Tareas completadas:     {}", k.completed_count)),
        Line::from(format!("Tiempo promedio ciclo:  {} h", k.avg_cycle_hours_label())),
        Line::from(format!("Tareas creadas:         {}", k.created_count)),
    ];
    let title = format!("Reporte {} a {}", app.range.start, app.range.end);
    f.render_widget(
        Paragraph::new(kpis).block(Block::default().borders(Borders::ALL).title(title)),
        chunks[0],
    );

    let rows: Vec<Row> = app
        .report
        .items
        .iter()
        .map(|item| {
            Row::new(vec![
                Cell::from(item.category.clone()),
                Cell::from(item.unit.to_string()),
                Cell::from(format!("{:.2}", item.total_quantity)),
                Cell::from(item.task_count.to_string()),
            ])
        })
        .collect();
    let widths = [
        Constraint::Min(24),
        Constraint::Length(6),
        Constraint::Length(12),
        Constraint::Length(8),
    ];
    let table = Table::new(rows, widths)
        .header(Row::new(vec!["Actividad", "Unidad", "Total", "Tareas"])
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .bottom_margin(1))
        .block(Block::default().borders(Borders::ALL).title("Consolidado"));
    f.render_widget(table, chunks[1]);

    let summary_text = if app.generating {
        "Generando resumen...".to_string()
    } else if let Some(s) = &app.summary {
        s.clone()
    } else if app.report.items.is_empty() {
        "Sin datos en el periodo.".to_string()
    } else {
        "Presiona 's' para generar un resumen ejecutivo.".to_string()
    };
    f.render_widget(
        Paragraph::new(summary_text)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Resumen IA")),
        chunks[2],
    );
}

fn draw_input(f: &mut Frame, app: &App) {
    let picking_category = matches!(
        (&app.input_mode, &app.input_field, app.add_state.step),
        (InputMode::Adding, _, 1) | (InputMode::Editing, InputField::Category, _)
    );
    let area = centered_rect(60, 3, f.area()); // Fixed height of 3 (border + 1 line)

    if picking_category {
        let lines: Vec<Line> = categories::all()
            .iter()
            .enumerate()
            .map(|(i, c)| Line::from(format!("{:>2}. {} ({})", i + 1, c.name, c.unit)))
            .collect();
        // Stack the list right above the prompt.
        let height = (lines.len() as u16 + 2).min(area.y.saturating_sub(f.area().y));
        let list_area = Rect { y: area.y - height, height, ..area };
        f.render_widget(Clear, list_area);
        f.render_widget(Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Categorías")), list_area);
    }

    f.render_widget(Clear, area); // Clear the area first

    let confirm_title;
    let title = match app.input_mode {
        InputMode::Confirming => {
            confirm_title = format!("Delete task #{}? (y/n)", app.target_id.unwrap_or_default());
            confirm_title.as_str()
        }
        InputMode::Adding => match app.add_state.step {
            0 => "Add Task: Enter Title",
            1 => "Add Task: Category (number, id or name)",
            2 => "Add Task: Quantity",
            3 => "Add Task: Description (Optional)",
            _ => "Add Task",
        },
        _ => match app.input_field {
            InputField::Title => "Edit Title",
            InputField::Category => "Edit Category (number, id or name)",
            InputField::Quantity => "Edit Quantity",
            InputField::Description => "Edit Description",
            InputField::RangeFrom => "Report From (YYYY-MM-DD)",
            InputField::RangeTo => "Report To (YYYY-MM-DD)",
            InputField::None => "Edit",
        },
    };

    let input = Paragraph::new(app.input_buffer.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(input, area);
}

fn status_color(status: TaskStatus) -> Color {
    match status {
        TaskStatus::Pending => Color::Yellow,
        TaskStatus::InProgress => Color::LightRed,
        TaskStatus::Done => Color::Green,
    }
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(r.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Length(r.height.saturating_sub(height) / 2),
        ].as_ref())
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ].as_ref())
        .split(popup_layout[1])[1]
}
