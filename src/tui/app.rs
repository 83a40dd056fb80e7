use chrono::{DateTime, Local, Utc};
use ratatui::widgets::ListState;
use tokio::runtime::Runtime;

use crate::board::TaskBoard;
use crate::categories;
use crate::error::BoardResult;
use crate::models::{Task, TaskDraft, TaskPatch, TaskStatus};
use crate::report::{build_report, parse_date, DateRange, Report};
use crate::storage::TaskStore;
use crate::summary::{summarize_or_fallback, Summarizer};

#[derive(PartialEq)]
pub enum InputMode {
    Normal,
    Editing,
    Adding,
    /// Waiting for y/n on a pending delete.
    Confirming,
}

#[derive(PartialEq)]
pub enum ViewMode {
    Board,
    Report,
}

#[derive(PartialEq)]
pub enum InputField {
    None,
    Title,
    Category,
    Quantity,
    Description,
    RangeFrom,
    RangeTo,
}

/// State for the multi-step "Add Task" wizard.
#[derive(Default)]
pub struct AddState {
    pub title: String,
    pub category: String,
    pub quantity: f64,
    pub step: usize, // 0: Title, 1: Category, 2: Quantity, 3: Description
}

pub struct App {
    pub board: TaskBoard,
    store: TaskStore,
    summarizer: Box<dyn Summarizer>,
    runtime: Runtime,
    /// Last tick; drives the elapsed-time labels.
    pub now: DateTime<Utc>,
    pub view_mode: ViewMode,
    /// Focused board column, index into `TaskStatus::ALL`.
    pub column: usize,
    pub column_states: [ListState; 3],
    pub input_mode: InputMode,
    pub input_field: InputField,
    pub input_buffer: String,
    pub target_id: Option<u64>,
    pub add_state: AddState,
    pub range: DateRange,
    pub report: Report,
    pub summary: Option<String>,
    /// Set while a summary request is outstanding.
    pub generating: bool,
    /// One-line feedback shown in the help bar.
    pub message: Option<String>,
}

impl App {
    /// Creates a new App instance and loads initial data.
    pub fn new(store: TaskStore, summarizer: Box<dyn Summarizer>, runtime: Runtime) -> App {
        let board = TaskBoard::new(store.load_or_default());
        let range = DateRange::current_month(Local::now().date_naive());
        let report = build_report(board.tasks(), range, &Local);
        let mut app = App {
            board,
            store,
            summarizer,
            runtime,
            now: Utc::now(),
            view_mode: ViewMode::Board,
            column: 0,
            column_states: Default::default(),
            input_mode: InputMode::Normal,
            input_field: InputField::None,
            input_buffer: String::new(),
            target_id: None,
            add_state: AddState::default(),
            range,
            report,
            summary: None,
            generating: false,
            message: None,
        };
        app.clamp_selection();
        app
    }

    /// Refreshes the clock used for elapsed-time labels.
    pub fn tick(&mut self) {
        self.now = Utc::now();
    }

    pub fn column_tasks(&self, column: usize) -> Vec<&Task> {
        self.board.by_status(TaskStatus::ALL[column]).collect()
    }

    pub fn selected_task(&self) -> Option<&Task> {
        let i = self.column_states[self.column].selected()?;
        self.column_tasks(self.column).get(i).copied()
    }

    /// Selects the next task in the focused column.
    pub fn next(&mut self) {
        let len = self.column_tasks(self.column).len();
        if len == 0 { return; }
        let state = &mut self.column_states[self.column];
        let i = match state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        state.select(Some(i));
    }

    /// Selects the previous task in the focused column.
    pub fn previous(&mut self) {
        let len = self.column_tasks(self.column).len();
        if len == 0 { return; }
        let state = &mut self.column_states[self.column];
        let i = match state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        state.select(Some(i));
    }

    pub fn focus_left(&mut self) {
        self.column = if self.column == 0 { TaskStatus::ALL.len() - 1 } else { self.column - 1 };
    }

    pub fn focus_right(&mut self) {
        self.column = (self.column + 1) % TaskStatus::ALL.len();
    }

    /// Moves the selected task one column forward.
    pub fn advance_selected(&mut self) {
        self.step_selected(TaskStatus::next);
    }

    /// Moves the selected task one column back.
    pub fn retreat_selected(&mut self) {
        self.step_selected(TaskStatus::previous);
    }

    fn step_selected(&mut self, step: fn(TaskStatus) -> Option<TaskStatus>) {
        let Some((id, to)) = self.selected_task().and_then(|t| step(t.status).map(|s| (t.id, s))) else {
            return;
        };
        self.apply(|b, now| b.move_task(id, to, now));
    }

    /// Asks for confirmation before deleting the selected task.
    pub fn request_delete(&mut self) {
        let Some((id, title)) = self.selected_task().map(|t| (t.id, t.title.clone())) else {
            return;
        };
        self.target_id = Some(id);
        self.input_buffer = title;
        self.input_mode = InputMode::Confirming;
    }

    /// Deletes the task picked by `request_delete`.
    pub fn confirm_delete(&mut self) {
        if self.input_mode != InputMode::Confirming { return; }
        if let Some(id) = self.target_id.take() {
            self.apply(|b, _| b.delete(id).map(|_| ()));
        }
        self.cancel_input();
    }

    /// Toggles between Board and Report views.
    pub fn toggle_view(&mut self) {
        self.view_mode = match self.view_mode {
            ViewMode::Board => ViewMode::Report,
            ViewMode::Report => ViewMode::Board,
        };
        self.refresh_report();
    }

    pub fn refresh_report(&mut self) {
        self.report = build_report(self.board.tasks(), self.range, &Local);
    }

    /// Whether a summary may be requested right now.
    pub fn can_summarize(&self) -> bool {
        !self.generating && !self.report.items.is_empty()
    }

    /// Marks a summary request as outstanding. Returns false when one is
    /// already running or there is nothing to summarise.
    pub fn begin_summary(&mut self) -> bool {
        if !self.can_summarize() { return false; }
        self.generating = true;
        true
    }

    /// Completes the outstanding summary request. Blocks until the service
    /// answers; the result replaces any previous summary.
    pub fn finish_summary(&mut self) {
        if !self.generating { return; }
        let text = self.runtime.block_on(summarize_or_fallback(
            self.summarizer.as_ref(),
            &self.report.items,
            self.report.range,
        ));
        self.summary = Some(text);
        self.generating = false;
    }

    /// Initiates the "Add Task" wizard.
    pub fn start_add(&mut self) {
        if self.view_mode != ViewMode::Board { return; }
        self.input_mode = InputMode::Adding;
        self.add_state = AddState::default();
        self.input_buffer.clear();
    }

    /// Initiates editing of a field: task fields on the board, range bounds
    /// on the report.
    pub fn start_edit(&mut self, field: InputField) {
        let prefill = match field {
            InputField::RangeFrom | InputField::RangeTo => {
                if self.view_mode != ViewMode::Report { return; }
                if field == InputField::RangeFrom {
                    self.range.start.to_string()
                } else {
                    self.range.end.to_string()
                }
            }
            _ => {
                if self.view_mode != ViewMode::Board { return; }
                let Some(t) = self.selected_task() else { return };
                let text = match field {
                    InputField::Title => t.title.clone(),
                    InputField::Category => t.category.clone(),
                    InputField::Quantity => t.quantity.to_string(),
                    InputField::Description => t.description.clone().unwrap_or_default(),
                    _ => String::new(),
                };
                let id = t.id;
                self.target_id = Some(id);
                text
            }
        };
        self.input_mode = InputMode::Editing;
        self.input_field = field;
        self.input_buffer = prefill;
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input_field = InputField::None;
        self.input_buffer.clear();
        self.target_id = None;
    }

    /// Handles text input based on the current mode.
    pub fn handle_input(&mut self) {
        match self.input_mode {
            InputMode::Adding => self.handle_adding_input(),
            InputMode::Editing => self.handle_editing_input(),
            InputMode::Normal | InputMode::Confirming => {}
        }
    }

    /// Handles input for the "Add Task" wizard.
    fn handle_adding_input(&mut self) {
        let input = self.input_buffer.trim().to_string();
        match self.add_state.step {
            0 => { // Title
                if input.is_empty() { return; }
                self.add_state.title = input;
            }
            1 => { // Category
                let Some(c) = lookup_category(&input) else {
                    self.message = Some(format!("Unknown category '{}'", input));
                    return;
                };
                self.add_state.category = c.name.to_string();
            }
            2 => { // Quantity
                match parse_quantity(&input) {
                    Some(q) => self.add_state.quantity = q,
                    None => {
                        self.message = Some(format!("Invalid quantity '{}'", input));
                        return;
                    }
                }
            }
            3 => { // Description
                let draft = TaskDraft {
                    title: std::mem::take(&mut self.add_state.title),
                    category: std::mem::take(&mut self.add_state.category),
                    quantity: self.add_state.quantity,
                    description: Some(input),
                };
                self.apply(|b, now| b.create(draft, now).map(|_| ()));
                self.cancel_input();
                return;
            }
            _ => {}
        }
        self.add_state.step += 1;
        self.input_buffer.clear();
    }

    /// Handles input for the edit prompts.
    fn handle_editing_input(&mut self) {
        let input = self.input_buffer.trim().to_string();
        match self.input_field {
            InputField::RangeFrom | InputField::RangeTo => {
                match parse_date(&input) {
                    Ok(d) => {
                        if self.input_field == InputField::RangeFrom {
                            self.range.start = d;
                        } else {
                            self.range.end = d;
                        }
                        self.summary = None;
                        self.refresh_report();
                    }
                    Err(e) => self.message = Some(e.to_string()),
                }
            }
            _ => {
                if let Some(id) = self.target_id {
                    let mut patch = TaskPatch::default();
                    match self.input_field {
                        InputField::Title if !input.is_empty() => patch.title = Some(input),
                        InputField::Category => {
                            patch.category = Some(lookup_category(&input).map(|c| c.name.to_string()).unwrap_or(input));
                        }
                        InputField::Quantity => match parse_quantity(&input) {
                            Some(q) => patch.quantity = Some(q),
                            None => {
                                self.message = Some(format!("Invalid quantity '{}'", input));
                                return;
                            }
                        },
                        InputField::Description => patch.description = Some(input),
                        _ => {}
                    }
                    self.apply(|b, now| b.edit(id, patch, now));
                }
            }
        }
        self.cancel_input();
    }

    /// Runs a board operation and saves the result. Failures leave the
    /// board untouched and show up in the help bar. A summary of rows that
    /// no longer match the report is dropped.
    fn apply(&mut self, op: impl FnOnce(&mut TaskBoard, DateTime<Utc>) -> BoardResult<()>) {
        self.tick();
        let result = op(&mut self.board, self.now).and_then(|_| self.store.save(self.board.tasks()));
        self.message = result.err().map(|e| e.to_string());
        self.clamp_selection();
        let previous = std::mem::take(&mut self.report.items);
        self.refresh_report();
        if self.report.items != previous {
            self.summary = None;
        }
    }

    fn clamp_selection(&mut self) {
        for column in 0..TaskStatus::ALL.len() {
            let len = self.column_tasks(column).len();
            let state = &mut self.column_states[column];
            if len == 0 {
                state.select(None);
            } else {
                match state.selected() {
                    Some(i) if i >= len => state.select(Some(len - 1)),
                    None => state.select(Some(0)),
                    _ => {}
                }
            }
        }
    }
}

/// Category by 1-based position in the registry, id or name.
pub fn lookup_category(input: &str) -> Option<&'static categories::Category> {
    match input.parse::<usize>() {
        Ok(n) if n >= 1 => categories::all().get(n - 1),
        _ => categories::find(input),
    }
}

fn parse_quantity(input: &str) -> Option<f64> {
    if input.is_empty() {
        return Some(0.0);
    }
    input.replace(',', ".").parse::<f64>().ok().filter(|q| q.is_finite() && *q >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MeasureUnit;
    use crate::report::ConsolidatedReportItem;
    use crate::summary::SummaryFuture;
    use tempfile::TempDir;

    struct Fixed(&'static str);

    impl Summarizer for Fixed {
        fn summarize<'a>(&'a self, _rows: &'a [ConsolidatedReportItem], _range: DateRange) -> SummaryFuture<'a> {
            let text = self.0.to_string();
            Box::pin(async move { Ok(text) })
        }
    }

    /// App over a temp store holding one task completed just now.
    fn app_with(done: bool, answer: &'static str) -> (App, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = TaskStore::new(dir.path().join("tasks.json"));
        let mut board = TaskBoard::default();
        let now = Utc::now();
        let id = board
            .create(TaskDraft { title: "DDH-010".into(), category: "perf_hq".into(), quantity: 25.0, description: None }, now)
            .unwrap();
        if done {
            board.move_task(id, TaskStatus::Done, now).unwrap();
        }
        store.save(board.tasks()).unwrap();
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        (App::new(store, Box::new(Fixed(answer)), runtime), dir)
    }

    #[test]
    fn summary_refused_for_empty_report() {
        let (mut app, _dir) = app_with(false, "resumen");
        assert!(app.report.items.is_empty());
        assert!(!app.can_summarize());
        assert!(!app.begin_summary());
        app.finish_summary();
        assert!(app.summary.is_none());
    }

    #[test]
    fn only_one_summary_in_flight() {
        let (mut app, _dir) = app_with(true, "25 m perforados");
        assert!(app.begin_summary());
        assert!(app.generating);
        assert!(!app.can_summarize());
        assert!(!app.begin_summary());

        app.finish_summary();
        assert!(!app.generating);
        assert_eq!(app.summary.as_deref(), Some("25 m perforados"));
        assert!(app.can_summarize());
    }

    #[test]
    fn new_summary_replaces_previous() {
        let (mut app, _dir) = app_with(true, "nuevo");
        app.summary = Some("anterior".into());
        assert!(app.begin_summary());
        app.finish_summary();
        assert_eq!(app.summary.as_deref(), Some("nuevo"));
    }

    #[test]
    fn summary_dropped_when_report_changes() {
        let (mut app, _dir) = app_with(true, "resumen");
        app.summary = Some("resumen".into());

        app.apply(|b, now| {
            b.create(TaskDraft { title: "Charla".into(), category: "safety_mtg".into(), quantity: 1.0, description: None }, now)
                .map(|_| ())
        });
        assert_eq!(app.summary.as_deref(), Some("resumen"));

        app.column = 2;
        app.retreat_selected();
        assert!(app.report.items.is_empty());
        assert!(app.summary.is_none());
    }

    #[test]
    fn delete_waits_for_confirmation() {
        let (mut app, _dir) = app_with(false, "");
        app.request_delete();
        assert!(app.input_mode == InputMode::Confirming);
        assert_eq!(app.input_buffer, "DDH-010");
        app.cancel_input();
        assert_eq!(app.board.tasks().len(), 1);

        app.request_delete();
        app.confirm_delete();
        assert!(app.board.tasks().is_empty());
        assert!(app.input_mode == InputMode::Normal);
        assert!(app.message.is_none());
    }

    #[test]
    fn completed_task_reaches_report() {
        let (app, _dir) = app_with(true, "");
        assert_eq!(app.report.items.len(), 1);
        assert_eq!(app.report.items[0].unit, MeasureUnit::Meters);
    }

    #[test]
    fn category_lookup_accepts_index_id_and_name() {
        assert_eq!(lookup_category("1").unwrap().id, "perf_pq");
        assert_eq!(lookup_category("sampling").unwrap().name, "Muestreo");
        assert_eq!(lookup_category("charla de seguridad").unwrap().id, "safety_mtg");
        assert!(lookup_category("0").is_none());
        assert!(lookup_category("99").is_none());
    }

    #[test]
    fn quantity_input() {
        assert_eq!(parse_quantity(""), Some(0.0));
        assert_eq!(parse_quantity("12,5"), Some(12.5));
        assert_eq!(parse_quantity("-1"), None);
        assert_eq!(parse_quantity("abc"), None);
    }
}
