// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs};
use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use time::Date;
use timeforing_app::{
    AppCommand, AppEvent, AppMode, AppState, BillingSortColumn, BillingView, Case, CaseFormErrors,
    CaseFormInput, CaseId, EntryEditor, FormKind, FormPayload, HoursInput, InvoiceId,
    InvoiceStatus, LedgerSnapshot, SortDirection, SuggestionBoard, SuggestionCategory,
    SuggestionEditor, SuggestionId, TabKind, TimeEntry, TimeEntryFormErrors, TimeEntryFormInput,
    TimeEntryId, UNKNOWN_CASE_LABEL, UnconfirmedSuggestion, case_week_total, categorize,
    day_total, entries_on, filter_activities, filter_cases, format_currency, format_date,
    format_day_month, format_hours, week_dates, week_total, weekday_label,
};

const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);
const HIGHLIGHT_CLEAR_AFTER: Duration = Duration::from_secs(3);
const EMPTY_VALUE: &str = "—";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormSubmission {
    TimeEntry(TimeEntryId),
    Case(CaseId),
}

/// Result of confirming one or more suggestions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfirmSummary {
    pub entry_ids: Vec<TimeEntryId>,
    pub skipped: Vec<String>,
}

/// Everything the TUI needs from the ledger behind it.
pub trait AppRuntime {
    fn load_snapshot(&mut self) -> Result<LedgerSnapshot>;
    fn submit_form(&mut self, payload: &FormPayload) -> Result<FormSubmission>;
    fn update_entry(&mut self, entry: TimeEntry) -> Result<()>;
    fn delete_entry(&mut self, entry_id: TimeEntryId) -> Result<()>;
    fn update_suggestion(&mut self, suggestion: UnconfirmedSuggestion) -> Result<()>;
    fn delete_suggestion(&mut self, suggestion_id: SuggestionId) -> Result<()>;
    fn confirm_suggestions(&mut self, suggestion_ids: &[SuggestionId]) -> Result<ConfirmSummary>;
    fn create_invoice(&mut self, case_id: CaseId, date: Date) -> Result<InvoiceId>;
    fn approve_invoice(&mut self, invoice_id: InvoiceId) -> Result<()>;
    fn delete_invoice(&mut self, invoice_id: InvoiceId) -> Result<()>;
    fn export_invoice(&mut self, invoice_id: InvoiceId) -> Result<PathBuf>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
    ClearHighlight { token: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Case,
    Date,
    Activity,
    Hours,
    Description,
    Billable,
    CaseName,
    CaseNumber,
    ClientName,
}

impl Field {
    const fn label(self) -> &'static str {
        match self {
            Self::Case => "Sak",
            Self::Date => "Dato",
            Self::Activity => "Aktivitet",
            Self::Hours => "Timer",
            Self::Description => "Beskrivelse",
            Self::Billable => "Fakturerbar",
            Self::CaseName => "Saksnavn",
            Self::CaseNumber => "Saksnummer",
            Self::ClientName => "Klient",
        }
    }
}

const NEW_ENTRY_FIELDS: [Field; 6] = [
    Field::Case,
    Field::Date,
    Field::Activity,
    Field::Hours,
    Field::Description,
    Field::Billable,
];
const NEW_CASE_FIELDS: [Field; 3] = [Field::CaseName, Field::CaseNumber, Field::ClientName];
const ENTRY_FIELDS: [Field; 5] = [
    Field::Case,
    Field::Activity,
    Field::Hours,
    Field::Description,
    Field::Billable,
];
const SUGGESTION_FIELDS: [Field; 4] = [
    Field::Case,
    Field::Activity,
    Field::Description,
    Field::Hours,
];

/// Search-as-you-type list used by the case and activity fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Picker {
    query: String,
    cursor: usize,
}

impl Picker {
    fn at(cursor: usize) -> Self {
        Self {
            query: String::new(),
            cursor,
        }
    }

    fn push(&mut self, ch: char) {
        self.query.push(ch);
        self.cursor = 0;
    }

    fn pop(&mut self) {
        self.query.pop();
        self.cursor = 0;
    }

    fn step(&mut self, up: bool, len: usize) {
        if len == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = if up {
            self.cursor.saturating_sub(1)
        } else {
            (self.cursor + 1).min(len - 1)
        };
    }
}

#[derive(Debug, Clone, PartialEq)]
enum EditTarget {
    NewEntry(TimeEntryFormInput),
    NewCase(CaseFormInput),
    Entry(EntryEditor),
    Suggestion(SuggestionEditor),
}

impl EditTarget {
    fn fields(&self) -> &'static [Field] {
        match self {
            Self::NewEntry(_) => &NEW_ENTRY_FIELDS,
            Self::NewCase(_) => &NEW_CASE_FIELDS,
            Self::Entry(_) => &ENTRY_FIELDS,
            Self::Suggestion(_) => &SUGGESTION_FIELDS,
        }
    }

    const fn title(&self) -> &'static str {
        match self {
            Self::NewEntry(_) => "ny timeføring",
            Self::NewCase(_) => "ny sak",
            Self::Entry(_) => "rediger timeføring",
            Self::Suggestion(_) => "rediger forslag",
        }
    }

    fn case_id(&self) -> Option<CaseId> {
        match self {
            Self::NewEntry(input) => input.case_id,
            Self::NewCase(_) => None,
            Self::Entry(editor) => Some(editor.case_id),
            Self::Suggestion(editor) => editor.case_id,
        }
    }

    fn set_case(&mut self, case_id: Option<CaseId>) {
        match self {
            Self::NewEntry(input) => input.case_id = case_id,
            Self::Suggestion(editor) => editor.case_id = case_id,
            Self::Entry(editor) => {
                if let Some(case_id) = case_id {
                    editor.case_id = case_id;
                }
            }
            Self::NewCase(_) => {}
        }
    }

    fn activity(&self) -> &str {
        match self {
            Self::NewEntry(input) => &input.activity_type,
            Self::Entry(editor) => &editor.activity_type,
            Self::Suggestion(editor) => &editor.activity_type,
            Self::NewCase(_) => "",
        }
    }

    fn set_activity(&mut self, activity: Option<&str>) {
        let value = activity.unwrap_or_default().to_owned();
        match self {
            Self::NewEntry(input) => input.activity_type = value,
            Self::Suggestion(editor) => editor.activity_type = value,
            Self::Entry(editor) => {
                if activity.is_some() {
                    editor.activity_type = value;
                }
            }
            Self::NewCase(_) => {}
        }
    }

    fn text(&self, field: Field) -> Option<&str> {
        match (self, field) {
            (Self::NewEntry(input), Field::Description) => Some(&input.description),
            (Self::Entry(editor), Field::Description) => Some(&editor.description),
            (Self::Suggestion(editor), Field::Description) => Some(&editor.description),
            (Self::NewCase(input), Field::CaseName) => Some(&input.name),
            (Self::NewCase(input), Field::CaseNumber) => Some(&input.case_number),
            (Self::NewCase(input), Field::ClientName) => Some(&input.client_name),
            _ => None,
        }
    }

    fn text_mut(&mut self, field: Field) -> Option<&mut String> {
        match (self, field) {
            (Self::NewEntry(input), Field::Description) => Some(&mut input.description),
            (Self::Entry(editor), Field::Description) => Some(&mut editor.description),
            (Self::Suggestion(editor), Field::Description) => Some(&mut editor.description),
            (Self::NewCase(input), Field::CaseName) => Some(&mut input.name),
            (Self::NewCase(input), Field::CaseNumber) => Some(&mut input.case_number),
            (Self::NewCase(input), Field::ClientName) => Some(&mut input.client_name),
            _ => None,
        }
    }

    fn billable(&self) -> Option<bool> {
        match self {
            Self::NewEntry(input) => Some(input.billable),
            Self::Entry(editor) => Some(editor.billable),
            _ => None,
        }
    }

    fn toggle_billable(&mut self) {
        match self {
            Self::NewEntry(input) => input.billable = !input.billable,
            Self::Entry(editor) => editor.billable = !editor.billable,
            _ => {}
        }
    }

    fn date(&self) -> Option<Date> {
        match self {
            Self::NewEntry(input) => Some(input.date),
            Self::Entry(editor) => Some(editor.date),
            _ => None,
        }
    }

    fn shift_date(&mut self, days: i64) {
        if let Self::NewEntry(input) = self {
            input.date = input.date.saturating_add(time::Duration::days(days));
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct EditorUiState {
    target: EditTarget,
    field_index: usize,
    form_hours: HoursInput,
    case_picker: Picker,
    activity_picker: Picker,
    errors: Vec<(Field, &'static str)>,
}

impl EditorUiState {
    fn new(target: EditTarget, cases: &[Case]) -> Self {
        let form_hours = match &target {
            EditTarget::NewEntry(input) => HoursInput::new(input.hours),
            _ => HoursInput::default(),
        };
        let case_cursor = target
            .case_id()
            .and_then(|id| cases.iter().position(|case| case.id == id))
            .unwrap_or(0);
        let activity_cursor = filter_activities("")
            .iter()
            .position(|activity| *activity == target.activity())
            .unwrap_or(0);
        Self {
            target,
            field_index: 0,
            form_hours,
            case_picker: Picker::at(case_cursor),
            activity_picker: Picker::at(activity_cursor),
            errors: Vec::new(),
        }
    }

    fn field(&self) -> Field {
        let fields = self.target.fields();
        fields[self.field_index.min(fields.len() - 1)]
    }

    fn hours(&self) -> Option<&HoursInput> {
        match &self.target {
            EditTarget::NewEntry(_) => Some(&self.form_hours),
            EditTarget::Entry(editor) => Some(&editor.hours),
            EditTarget::Suggestion(editor) => Some(&editor.hours),
            EditTarget::NewCase(_) => None,
        }
    }

    fn hours_mut(&mut self) -> Option<&mut HoursInput> {
        match &mut self.target {
            EditTarget::NewEntry(_) => Some(&mut self.form_hours),
            EditTarget::Entry(editor) => Some(&mut editor.hours),
            EditTarget::Suggestion(editor) => Some(&mut editor.hours),
            EditTarget::NewCase(_) => None,
        }
    }

    fn sync_form_hours(&mut self) {
        if let EditTarget::NewEntry(input) = &mut self.target {
            input.hours = self.form_hours.hours();
        }
    }

    fn blur_hours(&mut self) {
        if let Some(hours) = self.hours_mut() {
            hours.blur();
        }
        self.sync_form_hours();
    }

    fn move_field(&mut self, delta: isize, cases: &[Case]) {
        match self.field() {
            Field::Hours => self.blur_hours(),
            Field::Case => {
                let cursor = self
                    .target
                    .case_id()
                    .and_then(|id| cases.iter().position(|case| case.id == id))
                    .unwrap_or(0);
                self.case_picker = Picker::at(cursor);
            }
            Field::Activity => {
                let cursor = filter_activities("")
                    .iter()
                    .position(|activity| *activity == self.target.activity())
                    .unwrap_or(0);
                self.activity_picker = Picker::at(cursor);
            }
            _ => {}
        }
        let len = self.target.fields().len() as isize;
        self.field_index = (self.field_index as isize + delta).rem_euclid(len) as usize;
    }

    fn apply_case_picker(&mut self, cases: &[Case]) {
        let matches = filter_cases(cases, &self.case_picker.query);
        let picked = matches.get(self.case_picker.cursor).map(|case| case.id);
        self.target.set_case(picked);
    }

    fn apply_activity_picker(&mut self) {
        let matches = filter_activities(&self.activity_picker.query);
        let picked = matches.get(self.activity_picker.cursor).copied();
        self.target.set_activity(picked);
    }

    fn clear_error(&mut self, field: Field) {
        self.errors.retain(|(error_field, _)| *error_field != field);
    }

    fn error_for(&self, field: Field) -> Option<&'static str> {
        self.errors
            .iter()
            .find(|(error_field, _)| *error_field == field)
            .map(|(_, message)| *message)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum BillingFocus {
    #[default]
    Cases,
    Invoices,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct BillingUiState {
    focus: BillingFocus,
    case_cursor: usize,
    invoice_cursor: usize,
    query_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SuggestionRow {
    Section,
    Category(SuggestionCategory),
    Item(SuggestionId),
}

#[derive(Debug, Clone, Default, PartialEq)]
struct ViewData {
    snapshot: LedgerSnapshot,
    entry_cursor: usize,
    suggestions: SuggestionBoard,
    suggestion_cursor: usize,
    billing: BillingView,
    billing_ui: BillingUiState,
    editor: Option<EditorUiState>,
    stashed_editor: Option<EditorUiState>,
    help_visible: bool,
    status_token: u64,
}

pub fn run_app<R: AppRuntime>(state: &mut AppState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    if let Err(error) = execute!(io::stdout(), terminal::EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(error).context("enter alternate screen");
    }

    let result = Terminal::new(CrosstermBackend::new(io::stdout()))
        .context("create terminal")
        .and_then(|mut terminal| {
            drive_app(&mut terminal, state, runtime, || {
                if event::poll(Duration::from_millis(120)).context("poll event")? {
                    event::read().map(Some).context("read event")
                } else {
                    Ok(None)
                }
            })
        });

    let restored = restore_terminal();
    result.and(restored)
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")
}

/// Runs until quit or the first draw/input error. The caller owns terminal setup
/// and teardown, so every exit path here returns instead of unwinding past it.
fn drive_app<B, R, F>(
    terminal: &mut Terminal<B>,
    state: &mut AppState,
    runtime: &mut R,
    mut next_event: F,
) -> Result<()>
where
    B: Backend,
    R: AppRuntime,
    F: FnMut() -> Result<Option<Event>>,
{
    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    if let Err(error) = refresh_view_data(state, runtime, &mut view_data) {
        state.dispatch(AppCommand::SetStatus(format!("innlasting feilet: {error}")));
    }

    loop {
        process_internal_events(state, &mut view_data, &internal_rx);

        terminal
            .draw(|frame| render(frame, state, &view_data))
            .context("draw frame")?;

        match next_event()? {
            Some(Event::Key(key)) => {
                if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                    return Ok(());
                }
            }
            Some(_) | None => {}
        }
    }
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &mut ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::ClearHighlight { token } => {
                state.dispatch(AppCommand::ClearRecentlyAdded { token });
            }
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn schedule_highlight_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(HIGHLIGHT_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearHighlight { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn mark_recently_added(
    state: &mut AppState,
    internal_tx: &Sender<InternalEvent>,
    entry_ids: Vec<TimeEntryId>,
) {
    for event in state.dispatch(AppCommand::MarkRecentlyAdded(entry_ids)) {
        if let AppEvent::HighlightStarted { token } = event {
            schedule_highlight_clear(internal_tx, token);
        }
    }
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('q') {
        return true;
    }

    if view_data.help_visible {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
            view_data.help_visible = false;
        }
        return false;
    }

    if view_data.editor.is_some() {
        handle_editor_key(state, runtime, view_data, internal_tx, key);
        return false;
    }

    if view_data.billing_ui.query_active {
        handle_query_key(state, view_data, key);
        return false;
    }

    match key.code {
        KeyCode::Char('?') => {
            view_data.help_visible = true;
            return false;
        }
        KeyCode::Char('f') => {
            dispatch_and_refresh(state, runtime, view_data, AppCommand::NextTab, internal_tx);
            return false;
        }
        KeyCode::Char('b') => {
            dispatch_and_refresh(state, runtime, view_data, AppCommand::PrevTab, internal_tx);
            return false;
        }
        _ => {}
    }

    match state.active_tab {
        TabKind::Week => handle_week_key(state, runtime, view_data, internal_tx, key),
        TabKind::Suggestions => handle_suggestions_key(state, runtime, view_data, internal_tx, key),
        TabKind::Billing => handle_billing_key(state, runtime, view_data, internal_tx, key),
    }
    false
}

fn handle_week_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let date_command = match key.code {
        KeyCode::Left | KeyCode::Char('h') => Some(AppCommand::PrevDay),
        KeyCode::Right | KeyCode::Char('l') => Some(AppCommand::NextDay),
        KeyCode::Char('[') | KeyCode::Char('H') => Some(AppCommand::PrevWeek),
        KeyCode::Char(']') | KeyCode::Char('L') => Some(AppCommand::NextWeek),
        KeyCode::Char('t') => Some(AppCommand::GoToToday),
        _ => None,
    };
    if let Some(command) = date_command {
        dispatch_and_refresh(state, runtime, view_data, command, internal_tx);
        view_data.entry_cursor = 0;
        return;
    }

    match key.code {
        KeyCode::Down | KeyCode::Char('j') => {
            let len = day_entries(&view_data.snapshot, state.selected_date).len();
            view_data.entry_cursor = step_cursor(view_data.entry_cursor, 1, len);
        }
        KeyCode::Up | KeyCode::Char('k') => {
            let len = day_entries(&view_data.snapshot, state.selected_date).len();
            view_data.entry_cursor = step_cursor(view_data.entry_cursor, -1, len);
        }
        KeyCode::Char('a') => {
            let target = EditTarget::NewEntry(TimeEntryFormInput::blank(state.selected_date));
            open_editor(state, runtime, view_data, internal_tx, target);
        }
        KeyCode::Char('n') => {
            let target = EditTarget::NewCase(CaseFormInput::default());
            open_editor(state, runtime, view_data, internal_tx, target);
        }
        KeyCode::Char('e') | KeyCode::Enter => {
            let selected = selected_entry(state, view_data).map(EntryEditor::from_entry);
            match selected {
                Some(editor) => {
                    open_editor(state, runtime, view_data, internal_tx, EditTarget::Entry(editor));
                }
                None => emit_status(state, view_data, internal_tx, "ingen timeføring valgt"),
            }
        }
        KeyCode::Char('d') => {
            let Some(entry_id) = selected_entry(state, view_data).map(|entry| entry.id) else {
                emit_status(state, view_data, internal_tx, "ingen timeføring valgt");
                return;
            };
            match runtime.delete_entry(entry_id) {
                Ok(()) => reload_with_status(
                    state,
                    runtime,
                    view_data,
                    internal_tx,
                    "timeføring slettet",
                ),
                Err(error) => emit_status(
                    state,
                    view_data,
                    internal_tx,
                    format!("sletting feilet: {error}"),
                ),
            }
        }
        _ => {}
    }
}

fn handle_suggestions_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let rows = suggestion_rows(view_data);
    let current = rows.get(view_data.suggestion_cursor).copied();
    let current_item = match current {
        Some(SuggestionRow::Item(id)) => Some(id),
        _ => None,
    };

    match key.code {
        KeyCode::Down | KeyCode::Char('j') => {
            view_data.suggestion_cursor = step_cursor(view_data.suggestion_cursor, 1, rows.len());
        }
        KeyCode::Up | KeyCode::Char('k') => {
            view_data.suggestion_cursor = step_cursor(view_data.suggestion_cursor, -1, rows.len());
        }
        KeyCode::Char('z') => {
            view_data.suggestions.toggle_expanded();
            view_data.suggestion_cursor = 0;
        }
        KeyCode::Enter => match current {
            Some(SuggestionRow::Section) => {
                view_data.suggestions.toggle_expanded();
            }
            Some(SuggestionRow::Category(category)) => {
                view_data.suggestions.toggle_category(category);
            }
            Some(SuggestionRow::Item(id)) => edit_suggestion(state, runtime, view_data, internal_tx, id),
            None => {}
        },
        KeyCode::Char(' ') => {
            let Some(id) = current_item else {
                return;
            };
            let confirmable = find_suggestion(&view_data.snapshot, id)
                .is_some_and(|suggestion| suggestion.category().is_confirmable());
            if confirmable {
                view_data.suggestions.toggle_selected(id);
            } else {
                emit_status(
                    state,
                    view_data,
                    internal_tx,
                    "spam kan ikke bekreftes",
                );
            }
        }
        KeyCode::Char('e') => {
            if let Some(id) = current_item {
                edit_suggestion(state, runtime, view_data, internal_tx, id);
            }
        }
        KeyCode::Char('c') => {
            if let Some(id) = current_item {
                confirm_suggestions(state, runtime, view_data, internal_tx, vec![id]);
            }
        }
        KeyCode::Char('C') => {
            let selected = view_data.suggestions.take_selected();
            if selected.is_empty() {
                emit_status(state, view_data, internal_tx, "ingen forslag valgt");
            } else {
                confirm_suggestions(state, runtime, view_data, internal_tx, selected);
            }
        }
        KeyCode::Char('d') => {
            let Some(id) = current_item else {
                return;
            };
            match runtime.delete_suggestion(id) {
                Ok(()) => {
                    reload_with_status(state, runtime, view_data, internal_tx, "forslag slettet");
                }
                Err(error) => emit_status(
                    state,
                    view_data,
                    internal_tx,
                    format!("sletting feilet: {error}"),
                ),
            }
        }
        _ => {}
    }
}

fn edit_suggestion<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    suggestion_id: SuggestionId,
) {
    let Some(editor) =
        find_suggestion(&view_data.snapshot, suggestion_id).map(SuggestionEditor::from_suggestion)
    else {
        return;
    };
    open_editor(
        state,
        runtime,
        view_data,
        internal_tx,
        EditTarget::Suggestion(editor),
    );
}

fn confirm_suggestions<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    suggestion_ids: Vec<SuggestionId>,
) {
    match runtime.confirm_suggestions(&suggestion_ids) {
        Ok(summary) => {
            let confirmed = summary.entry_ids.len();
            let message = match summary.skipped.first() {
                None => format!("{confirmed} forslag bekreftet"),
                Some(reason) if confirmed == 0 => format!("ikke bekreftet: {reason}"),
                Some(reason) => format!(
                    "{confirmed} forslag bekreftet, {} hoppet over: {reason}",
                    summary.skipped.len()
                ),
            };
            reload_with_status(state, runtime, view_data, internal_tx, message);
            mark_recently_added(state, internal_tx, summary.entry_ids);
        }
        Err(error) => emit_status(
            state,
            view_data,
            internal_tx,
            format!("bekreftelse feilet: {error}"),
        ),
    }
}

fn handle_billing_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Tab => {
            view_data.billing_ui.focus = match view_data.billing_ui.focus {
                BillingFocus::Cases => BillingFocus::Invoices,
                BillingFocus::Invoices => BillingFocus::Cases,
            };
        }
        KeyCode::Down | KeyCode::Char('j') => move_billing_cursor(state, view_data, 1),
        KeyCode::Up | KeyCode::Char('k') => move_billing_cursor(state, view_data, -1),
        KeyCode::Char(digit @ '1'..='4') => {
            let index = digit as usize - '1' as usize;
            let column = BillingSortColumn::ALL[index];
            view_data.billing.toggle_sort(column);
            let arrow = sort_arrow(view_data.billing.sort_direction);
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("sortert på {} {arrow}", column.label()),
            );
        }
        KeyCode::Char(digit @ '5'..='8') => {
            let index = digit as usize - '5' as usize;
            let status = InvoiceStatus::ALL[index];
            view_data.billing.toggle_status(status);
            clamp_cursors(state, view_data);
        }
        KeyCode::Char('p') => {
            view_data.billing.period = view_data.billing.period.next();
            clamp_cursors(state, view_data);
            let label = view_data.billing.period.label();
            emit_status(state, view_data, internal_tx, format!("periode: {label}"));
        }
        KeyCode::Char('/') => {
            view_data.billing_ui.query_active = true;
        }
        KeyCode::Char('i') => {
            let rows = view_data.billing.case_rows(&view_data.snapshot, state.today);
            let Some(row) = rows.get(view_data.billing_ui.case_cursor) else {
                emit_status(state, view_data, internal_tx, "ingen sak valgt");
                return;
            };
            let case_name = row.case_name.clone();
            match runtime.create_invoice(row.case_id, state.today) {
                Ok(_) => reload_with_status(
                    state,
                    runtime,
                    view_data,
                    internal_tx,
                    format!("fakturautkast opprettet for {case_name}"),
                ),
                Err(error) => emit_status(
                    state,
                    view_data,
                    internal_tx,
                    format!("faktura feilet: {error}"),
                ),
            }
        }
        KeyCode::Char('a') => {
            with_selected_invoice(state, view_data, internal_tx, |invoice_id| {
                runtime
                    .approve_invoice(invoice_id)
                    .map(|()| "faktura godkjent og sendt".to_owned())
            });
            refresh_after_billing_action(state, runtime, view_data, internal_tx);
        }
        KeyCode::Char('d') => {
            with_selected_invoice(state, view_data, internal_tx, |invoice_id| {
                runtime
                    .delete_invoice(invoice_id)
                    .map(|()| "fakturautkast slettet".to_owned())
            });
            refresh_after_billing_action(state, runtime, view_data, internal_tx);
        }
        KeyCode::Char('o') | KeyCode::Enter => {
            with_selected_invoice(state, view_data, internal_tx, |invoice_id| {
                runtime
                    .export_invoice(invoice_id)
                    .map(|path| format!("faktura lagret: {}", path.display()))
            });
        }
        _ => {}
    }
}

fn with_selected_invoice(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    action: impl FnOnce(InvoiceId) -> Result<String>,
) {
    if view_data.billing_ui.focus != BillingFocus::Invoices {
        emit_status(state, view_data, internal_tx, "velg en faktura (tab)");
        return;
    }
    let selected = view_data
        .billing
        .invoice_rows(&view_data.snapshot, state.today)
        .get(view_data.billing_ui.invoice_cursor)
        .map(|invoice| invoice.id);
    let Some(invoice_id) = selected else {
        emit_status(state, view_data, internal_tx, "ingen faktura valgt");
        return;
    };
    match action(invoice_id) {
        Ok(message) => emit_status(state, view_data, internal_tx, message),
        Err(error) => emit_status(state, view_data, internal_tx, format!("{error}")),
    }
}

fn refresh_after_billing_action<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    if let Err(error) = refresh_view_data(state, runtime, view_data) {
        emit_status(
            state,
            view_data,
            internal_tx,
            format!("innlasting feilet: {error}"),
        );
    }
}

fn handle_query_key(state: &AppState, view_data: &mut ViewData, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            view_data.billing.query.clear();
            view_data.billing_ui.query_active = false;
        }
        KeyCode::Enter => view_data.billing_ui.query_active = false,
        KeyCode::Backspace => {
            view_data.billing.query.pop();
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            view_data.billing.query.push(ch);
        }
        _ => {}
    }
    clamp_cursors(state, view_data);
}

fn move_billing_cursor(state: &AppState, view_data: &mut ViewData, delta: isize) {
    match view_data.billing_ui.focus {
        BillingFocus::Cases => {
            let len = view_data
                .billing
                .case_rows(&view_data.snapshot, state.today)
                .len();
            view_data.billing_ui.case_cursor =
                step_cursor(view_data.billing_ui.case_cursor, delta, len);
        }
        BillingFocus::Invoices => {
            let len = view_data
                .billing
                .invoice_rows(&view_data.snapshot, state.today)
                .len();
            view_data.billing_ui.invoice_cursor =
                step_cursor(view_data.billing_ui.invoice_cursor, delta, len);
        }
    }
}

fn open_editor<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    target: EditTarget,
) {
    let command = match &target {
        EditTarget::NewEntry(_) => AppCommand::OpenForm(FormKind::TimeEntry),
        EditTarget::NewCase(_) => AppCommand::OpenForm(FormKind::Case),
        EditTarget::Entry(_) | EditTarget::Suggestion(_) => AppCommand::EnterEditMode,
    };
    view_data.editor = Some(EditorUiState::new(target, &view_data.snapshot.cases));
    dispatch_and_refresh(state, runtime, view_data, command, internal_tx);
}

fn close_editor<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    view_data.editor = None;
    view_data.stashed_editor = None;
    dispatch_and_refresh(state, runtime, view_data, AppCommand::ExitToNav, internal_tx);
}

fn handle_editor_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(editor) = view_data.editor.as_mut() else {
        return;
    };
    let cases = &view_data.snapshot.cases;
    let field = editor.field();

    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => cancel_editor(state, runtime, view_data, internal_tx),
        (KeyCode::Enter, _) | (KeyCode::Char('s'), KeyModifiers::CONTROL) => {
            submit_editor(state, runtime, view_data, internal_tx);
        }
        (KeyCode::Char('n'), KeyModifiers::CONTROL)
            if field == Field::Case && matches!(editor.target, EditTarget::NewEntry(_)) =>
        {
            open_case_form_from_entry(state, runtime, view_data, internal_tx);
        }
        (KeyCode::Tab, _) => editor.move_field(1, cases),
        (KeyCode::BackTab, _) => editor.move_field(-1, cases),
        (KeyCode::Up, _) => step_field(editor, cases, true),
        (KeyCode::Down, _) => step_field(editor, cases, false),
        (KeyCode::Backspace, _) => {
            match field {
                Field::Case => {
                    editor.case_picker.pop();
                    editor.apply_case_picker(cases);
                }
                Field::Activity => {
                    editor.activity_picker.pop();
                    editor.apply_activity_picker();
                }
                Field::Hours => {
                    if let Some(hours) = editor.hours_mut() {
                        hours.pop_char();
                    }
                    editor.sync_form_hours();
                }
                _ => {
                    if let Some(text) = editor.target.text_mut(field) {
                        text.pop();
                    }
                }
            }
            editor.clear_error(field);
        }
        (KeyCode::Char(ch), modifiers) if !modifiers.contains(KeyModifiers::CONTROL) => {
            insert_char(editor, cases, ch);
        }
        _ => {}
    }
}

fn step_field(editor: &mut EditorUiState, cases: &[Case], up: bool) {
    let field = editor.field();
    match field {
        Field::Case => {
            let len = filter_cases(cases, &editor.case_picker.query).len();
            editor.case_picker.step(up, len);
            editor.apply_case_picker(cases);
        }
        Field::Activity => {
            let len = filter_activities(&editor.activity_picker.query).len();
            editor.activity_picker.step(up, len);
            editor.apply_activity_picker();
        }
        Field::Hours => {
            if let Some(hours) = editor.hours_mut() {
                if up {
                    hours.step_up();
                } else {
                    hours.step_down();
                }
            }
            editor.sync_form_hours();
        }
        Field::Date => editor.target.shift_date(if up { 1 } else { -1 }),
        Field::Billable => editor.target.toggle_billable(),
        Field::Description | Field::CaseName | Field::CaseNumber | Field::ClientName => {}
    }
    editor.clear_error(field);
}

fn insert_char(editor: &mut EditorUiState, cases: &[Case], ch: char) {
    let field = editor.field();
    match field {
        Field::Case => {
            editor.case_picker.push(ch);
            editor.apply_case_picker(cases);
        }
        Field::Activity => {
            editor.activity_picker.push(ch);
            editor.apply_activity_picker();
        }
        Field::Hours => {
            if let Some(hours) = editor.hours_mut() {
                hours.push_char(ch);
            }
            editor.sync_form_hours();
        }
        Field::Billable => {
            if ch == ' ' {
                editor.target.toggle_billable();
            }
        }
        Field::Date => {}
        Field::Description | Field::CaseName | Field::CaseNumber | Field::ClientName => {
            if let Some(text) = editor.target.text_mut(field) {
                text.push(ch);
            }
        }
    }
    editor.clear_error(field);
}

fn open_case_form_from_entry<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    view_data.stashed_editor = view_data.editor.take();
    let target = EditTarget::NewCase(CaseFormInput::default());
    view_data.editor = Some(EditorUiState::new(target, &view_data.snapshot.cases));
    dispatch_and_refresh(
        state,
        runtime,
        view_data,
        AppCommand::OpenForm(FormKind::Case),
        internal_tx,
    );
}

fn cancel_editor<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let editing_case = matches!(
        view_data.editor.as_ref().map(|editor| &editor.target),
        Some(EditTarget::NewCase(_))
    );
    if editing_case && let Some(stashed) = view_data.stashed_editor.take() {
        view_data.editor = Some(stashed);
        dispatch_and_refresh(
            state,
            runtime,
            view_data,
            AppCommand::OpenForm(FormKind::TimeEntry),
            internal_tx,
        );
        return;
    }
    close_editor(state, runtime, view_data, internal_tx);
}

fn submit_editor<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let Some(editor) = view_data.editor.as_mut() else {
        return;
    };
    if editor.field() == Field::Hours {
        editor.blur_hours();
    }
    let target = editor.target.clone();

    match target {
        EditTarget::NewEntry(input) => submit_payload(
            state,
            runtime,
            view_data,
            internal_tx,
            FormPayload::TimeEntry(input),
        ),
        EditTarget::NewCase(input) => {
            submit_payload(state, runtime, view_data, internal_tx, FormPayload::Case(input));
        }
        EditTarget::Entry(entry_editor) => {
            match runtime.update_entry(entry_editor.to_entry()) {
                Ok(()) => {
                    close_editor(state, runtime, view_data, internal_tx);
                    reload_with_status(
                        state,
                        runtime,
                        view_data,
                        internal_tx,
                        "timeføring oppdatert",
                    );
                }
                Err(error) => emit_status(
                    state,
                    view_data,
                    internal_tx,
                    format!("lagring feilet: {error}"),
                ),
            }
        }
        EditTarget::Suggestion(suggestion_editor) => {
            let Some(original) =
                find_suggestion(&view_data.snapshot, suggestion_editor.suggestion_id).cloned()
            else {
                close_editor(state, runtime, view_data, internal_tx);
                emit_status(state, view_data, internal_tx, "forslaget finnes ikke lenger");
                return;
            };
            match runtime.update_suggestion(suggestion_editor.apply_to(&original)) {
                Ok(()) => {
                    close_editor(state, runtime, view_data, internal_tx);
                    reload_with_status(state, runtime, view_data, internal_tx, "forslag oppdatert");
                }
                Err(error) => emit_status(
                    state,
                    view_data,
                    internal_tx,
                    format!("lagring feilet: {error}"),
                ),
            }
        }
    }
}

fn submit_payload<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    payload: FormPayload,
) {
    let submitted = payload
        .validate()
        .and_then(|()| runtime.submit_form(&payload));
    let submission = match submitted {
        Ok(submission) => submission,
        Err(error) => {
            let field_errors = form_field_errors(&error);
            if let Some(editor) = view_data.editor.as_mut()
                && !field_errors.is_empty()
            {
                editor.errors = field_errors;
                emit_status(state, view_data, internal_tx, "skjemaet har feil");
            } else {
                emit_status(
                    state,
                    view_data,
                    internal_tx,
                    format!("lagring feilet: {error}"),
                );
            }
            return;
        }
    };

    match submission {
        FormSubmission::TimeEntry(entry_id) => {
            if let Some(editor) = view_data.editor.as_mut()
                && let EditTarget::NewEntry(input) = &mut editor.target
            {
                input.reset_after_submit();
                editor.form_hours = HoursInput::new(input.hours);
                editor.activity_picker = Picker::default();
                editor.errors.clear();
            }
            reload_with_status(state, runtime, view_data, internal_tx, "timeføring lagret");
            mark_recently_added(state, internal_tx, vec![entry_id]);
        }
        FormSubmission::Case(case_id) => {
            reload_with_status(state, runtime, view_data, internal_tx, "sak opprettet");
            let Some(mut stashed) = view_data.stashed_editor.take() else {
                view_data.editor = None;
                dispatch_and_refresh(state, runtime, view_data, AppCommand::ExitToNav, internal_tx);
                emit_status(state, view_data, internal_tx, "sak opprettet");
                return;
            };
            stashed.target.set_case(Some(case_id));
            let cursor = view_data
                .snapshot
                .cases
                .iter()
                .position(|case| case.id == case_id)
                .unwrap_or(0);
            stashed.case_picker = Picker::at(cursor);
            stashed.clear_error(Field::Case);
            view_data.editor = Some(stashed);
            state.dispatch(AppCommand::OpenForm(FormKind::TimeEntry));
        }
    }
}

fn form_field_errors(error: &anyhow::Error) -> Vec<(Field, &'static str)> {
    let pairs: Vec<(Field, Option<&'static str>)> =
        if let Some(errors) = error.downcast_ref::<TimeEntryFormErrors>() {
            vec![
                (Field::Case, errors.case),
                (Field::Activity, errors.activity_type),
                (Field::Description, errors.description),
            ]
        } else if let Some(errors) = error.downcast_ref::<CaseFormErrors>() {
            vec![
                (Field::CaseName, errors.name),
                (Field::CaseNumber, errors.case_number),
                (Field::ClientName, errors.client_name),
            ]
        } else {
            Vec::new()
        };
    pairs
        .into_iter()
        .filter_map(|(field, message)| message.map(|message| (field, message)))
        .collect()
}

fn reload_with_status<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    match refresh_view_data(state, runtime, view_data) {
        Ok(()) => emit_status(state, view_data, internal_tx, message),
        Err(error) => emit_status(
            state,
            view_data,
            internal_tx,
            format!("innlasting feilet: {error}"),
        ),
    }
}

fn dispatch_and_refresh<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    command: AppCommand,
    internal_tx: &Sender<InternalEvent>,
) {
    let events = state.dispatch(command);
    if should_refresh_view(&events)
        && let Err(error) = refresh_view_data(state, runtime, view_data)
    {
        emit_status(
            state,
            view_data,
            internal_tx,
            format!("innlasting feilet: {error}"),
        );
    }
    if events
        .iter()
        .any(|event| matches!(event, AppEvent::StatusUpdated(_)))
    {
        view_data.status_token = view_data.status_token.saturating_add(1);
        schedule_status_clear(internal_tx, view_data.status_token);
    }
}

fn should_refresh_view(events: &[AppEvent]) -> bool {
    events
        .iter()
        .any(|event| matches!(event, AppEvent::TabChanged(_)))
}

fn refresh_view_data<R: AppRuntime>(
    state: &AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
) -> Result<()> {
    view_data.snapshot = runtime.load_snapshot()?;
    view_data
        .suggestions
        .retain_existing(&view_data.snapshot.suggestions);
    clamp_cursors(state, view_data);
    Ok(())
}

fn clamp_cursors(state: &AppState, view_data: &mut ViewData) {
    let clamp = |cursor: usize, len: usize| cursor.min(len.saturating_sub(1));
    let entries = day_entries(&view_data.snapshot, state.selected_date).len();
    view_data.entry_cursor = clamp(view_data.entry_cursor, entries);
    let rows = suggestion_rows(view_data).len();
    view_data.suggestion_cursor = clamp(view_data.suggestion_cursor, rows);
    let cases = view_data
        .billing
        .case_rows(&view_data.snapshot, state.today)
        .len();
    view_data.billing_ui.case_cursor = clamp(view_data.billing_ui.case_cursor, cases);
    let invoices = view_data
        .billing
        .invoice_rows(&view_data.snapshot, state.today)
        .len();
    view_data.billing_ui.invoice_cursor = clamp(view_data.billing_ui.invoice_cursor, invoices);
}

fn step_cursor(cursor: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (cursor as isize + delta).clamp(0, len as isize - 1) as usize
}

fn day_entries(snapshot: &LedgerSnapshot, date: Date) -> Vec<&TimeEntry> {
    snapshot
        .entries
        .iter()
        .filter(|entry| entry.date == date)
        .collect()
}

fn selected_entry<'a>(state: &AppState, view_data: &'a ViewData) -> Option<&'a TimeEntry> {
    day_entries(&view_data.snapshot, state.selected_date)
        .get(view_data.entry_cursor)
        .copied()
}

fn find_suggestion(
    snapshot: &LedgerSnapshot,
    suggestion_id: SuggestionId,
) -> Option<&UnconfirmedSuggestion> {
    snapshot
        .suggestions
        .iter()
        .find(|suggestion| suggestion.id == suggestion_id)
}

fn suggestion_rows(view_data: &ViewData) -> Vec<SuggestionRow> {
    let mut rows = vec![SuggestionRow::Section];
    if !view_data.suggestions.is_expanded() {
        return rows;
    }
    let groups = categorize(&view_data.snapshot.suggestions);
    for category in SuggestionCategory::ALL {
        rows.push(SuggestionRow::Category(category));
        if view_data.suggestions.is_category_open(category) {
            rows.extend(
                groups
                    .get(category)
                    .iter()
                    .map(|suggestion| SuggestionRow::Item(suggestion.id)),
            );
        }
    }
    rows
}

/// Case rows shown on the week grid: known cases first, then any ids
/// referenced by this week's entries that no longer resolve.
fn week_case_ids(snapshot: &LedgerSnapshot, date: Date) -> Vec<CaseId> {
    let days = week_dates(date);
    let mut ids: Vec<CaseId> = snapshot.cases.iter().map(|case| case.id).collect();
    for entry in &snapshot.entries {
        if days.contains(&entry.date) && !ids.contains(&entry.case_id) {
            ids.push(entry.case_id);
        }
    }
    ids
}

fn hours_cell(hours: f64) -> String {
    if hours > 0.0 {
        format_hours(hours)
    } else {
        String::new()
    }
}

fn week_grid_rows(state: &AppState, snapshot: &LedgerSnapshot) -> Vec<Vec<String>> {
    let days = week_dates(state.selected_date);
    let mut rows: Vec<Vec<String>> = week_case_ids(snapshot, state.selected_date)
        .into_iter()
        .map(|case_id| {
            let mut row = vec![snapshot.case_label(case_id).to_owned()];
            row.extend(days.iter().map(|day| {
                let hours = entries_on(&snapshot.entries, case_id, *day)
                    .iter()
                    .fold(0.0, |sum, entry| sum + entry.hours);
                hours_cell(hours)
            }));
            row.push(hours_cell(case_week_total(
                &snapshot.entries,
                case_id,
                state.selected_date,
            )));
            row
        })
        .collect();

    let mut totals = vec!["Sum".to_owned()];
    totals.extend(
        days.iter()
            .map(|day| format_hours(day_total(&snapshot.entries, *day))),
    );
    totals.push(format_hours(week_total(
        &snapshot.entries,
        state.selected_date,
    )));
    rows.push(totals);
    rows
}

fn entry_line(state: &AppState, snapshot: &LedgerSnapshot, entry: &TimeEntry) -> String {
    let marker = if state.is_recently_added(entry.id) {
        "+ "
    } else {
        "  "
    };
    let billable = if entry.billable {
        ""
    } else {
        " (ikke fakturerbar)"
    };
    format!(
        "{marker}{} | {} | {} t | {}{billable}",
        snapshot.case_label(entry.case_id),
        entry.activity_type,
        format_hours(entry.hours),
        entry.description,
    )
}

fn or_empty(value: &str) -> &str {
    if value.trim().is_empty() {
        EMPTY_VALUE
    } else {
        value
    }
}

fn suggestion_line(view_data: &ViewData, suggestion: &UnconfirmedSuggestion) -> String {
    let check = if !suggestion.category().is_confirmable() {
        "   "
    } else if view_data.suggestions.is_selected(suggestion.id) {
        "[x]"
    } else {
        "[ ]"
    };
    let case = suggestion.case_id.map_or(EMPTY_VALUE, |case_id| {
        view_data.snapshot.case_label(case_id)
    });
    let hours = if suggestion.hours > 0.0 {
        format!("{} t", format_hours(suggestion.hours))
    } else {
        EMPTY_VALUE.to_owned()
    };
    let important = if suggestion.important { " !" } else { "" };
    format!(
        "{check} {} {} | {case} | {} | {hours} | {}{important}",
        weekday_label(suggestion.date.weekday()),
        format_day_month(suggestion.date),
        or_empty(&suggestion.activity_type),
        or_empty(&suggestion.description),
    )
}

fn suggestion_row_text(view_data: &ViewData, row: SuggestionRow) -> String {
    match row {
        SuggestionRow::Section => {
            let arrow = if view_data.suggestions.is_expanded() {
                "▾"
            } else {
                "▸"
            };
            let selected = view_data.suggestions.selected_count();
            format!(
                "{arrow} Ubekreftede forslag ({}) | valgt: {selected}",
                view_data.snapshot.suggestions.len()
            )
        }
        SuggestionRow::Category(category) => {
            let arrow = if view_data.suggestions.is_category_open(category) {
                "▾"
            } else {
                "▸"
            };
            let count = categorize(&view_data.snapshot.suggestions)
                .get(category)
                .len();
            format!("  {arrow} {} ({count})", category.label())
        }
        SuggestionRow::Item(id) => find_suggestion(&view_data.snapshot, id)
            .map(|suggestion| format!("    {}", suggestion_line(view_data, suggestion)))
            .unwrap_or_default(),
    }
}

fn sort_arrow(direction: SortDirection) -> &'static str {
    match direction {
        SortDirection::Asc => "↑",
        SortDirection::Desc => "↓",
    }
}

fn billing_filter_text(billing: &BillingView) -> String {
    let statuses = if billing.status_filter.is_empty() {
        "alle".to_owned()
    } else {
        billing
            .status_filter
            .iter()
            .map(|status| status.label())
            .collect::<Vec<_>>()
            .join(", ")
    };
    let query = if billing.query.is_empty() {
        EMPTY_VALUE
    } else {
        billing.query.as_str()
    };
    format!(
        "søk: {query} | periode: {} | status: {statuses} | sortering: {} {}",
        billing.period.label(),
        billing.sort_column.label(),
        sort_arrow(billing.sort_direction)
    )
}

fn field_value(editor: &EditorUiState, field: Field, snapshot: &LedgerSnapshot) -> String {
    let with_query = |label: String, query: &str| {
        if query.is_empty() {
            label
        } else {
            format!("{label}  [søk: {query}]")
        }
    };
    match field {
        Field::Case => {
            let label = editor.target.case_id().map_or_else(
                || "velg sak".to_owned(),
                |case_id| match snapshot.case(case_id) {
                    Some(case) => format!("{} ({})", case.name, case.case_number),
                    None => UNKNOWN_CASE_LABEL.to_owned(),
                },
            );
            with_query(label, &editor.case_picker.query)
        }
        Field::Activity => {
            let activity = editor.target.activity();
            let label = if activity.is_empty() {
                "velg aktivitet".to_owned()
            } else {
                activity.to_owned()
            };
            with_query(label, &editor.activity_picker.query)
        }
        Field::Hours => editor
            .hours()
            .map(|hours| hours.text().to_owned())
            .unwrap_or_default(),
        Field::Date => editor.target.date().map(format_date).unwrap_or_default(),
        Field::Billable => match editor.target.billable() {
            Some(true) => "ja".to_owned(),
            Some(false) => "nei".to_owned(),
            None => String::new(),
        },
        Field::Description | Field::CaseName | Field::CaseNumber | Field::ClientName => editor
            .target
            .text(field)
            .unwrap_or_default()
            .to_owned(),
    }
}

fn editor_overlay_lines(editor: &EditorUiState, snapshot: &LedgerSnapshot) -> Vec<String> {
    let active = editor.field();
    let mut lines = Vec::new();
    for field in editor.target.fields() {
        let cursor = if *field == active { ">" } else { " " };
        lines.push(format!(
            "{cursor} {:<12} {}",
            field.label(),
            field_value(editor, *field, snapshot)
        ));
        if let Some(message) = editor.error_for(*field) {
            lines.push(format!("  {:<12} ! {message}", ""));
        }
    }

    match active {
        Field::Case => {
            lines.push(String::new());
            let matches = filter_cases(&snapshot.cases, &editor.case_picker.query);
            if matches.is_empty() {
                lines.push("  ingen saker funnet".to_owned());
            }
            for (index, case) in matches.iter().enumerate() {
                let cursor = if index == editor.case_picker.cursor {
                    "›"
                } else {
                    " "
                };
                lines.push(format!(
                    "  {cursor} {} · {} · {}",
                    case.name, case.case_number, case.client_name
                ));
            }
            if matches!(editor.target, EditTarget::NewEntry(_)) {
                lines.push("  ctrl+n ny sak".to_owned());
            }
        }
        Field::Activity => {
            lines.push(String::new());
            for (index, activity) in filter_activities(&editor.activity_picker.query)
                .iter()
                .enumerate()
            {
                let cursor = if index == editor.activity_picker.cursor {
                    "›"
                } else {
                    " "
                };
                lines.push(format!("  {cursor} {activity}"));
            }
        }
        _ => {}
    }
    lines
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let selected = TabKind::ALL
        .iter()
        .position(|tab| *tab == state.active_tab)
        .unwrap_or(0);
    let tab_titles = TabKind::ALL
        .iter()
        .map(|tab| tab_title(*tab, view_data))
        .collect::<Vec<String>>();
    let tabs = Tabs::new(tab_titles)
        .block(Block::default().title("timeføring").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    match state.active_tab {
        TabKind::Week => render_week(frame, layout[1], state, view_data),
        TabKind::Suggestions => render_suggestions(frame, layout[1], view_data),
        TabKind::Billing => render_billing(frame, layout[1], state, view_data),
    }

    let status_widget = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_widget, layout[2]);

    if let Some(editor) = &view_data.editor {
        let area = centered_rect(70, 70, frame.area());
        frame.render_widget(Clear, area);
        let lines = editor_overlay_lines(editor, &view_data.snapshot)
            .into_iter()
            .map(Line::from)
            .collect::<Vec<_>>();
        let overlay = Paragraph::new(lines).block(
            Block::default()
                .title(editor.target.title())
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(overlay, area);
    }

    if view_data.help_visible {
        let area = centered_rect(70, 80, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("hjelp").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn tab_title(tab: TabKind, view_data: &ViewData) -> String {
    match tab {
        TabKind::Suggestions => format!(
            "{} ({})",
            tab.label(),
            view_data.snapshot.suggestions.len()
        ),
        TabKind::Week | TabKind::Billing => tab.label().to_owned(),
    }
}

fn render_week(frame: &mut ratatui::Frame<'_>, area: Rect, state: &AppState, view_data: &ViewData) {
    let snapshot = &view_data.snapshot;
    let grid = week_grid_rows(state, snapshot);
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(grid.len() as u16 + 3),
            Constraint::Min(3),
        ])
        .split(area);

    let days = week_dates(state.selected_date);
    let selected_column = days
        .iter()
        .position(|day| *day == state.selected_date)
        .map_or(0, |index| index + 1);
    let mut header = vec![Cell::from("Sak")];
    header.extend(days.iter().map(|day| {
        let style = if *day == state.today {
            Style::default().add_modifier(Modifier::UNDERLINED)
        } else {
            Style::default()
        };
        Cell::from(format!(
            "{} {}",
            weekday_label(day.weekday()),
            format_day_month(*day)
        ))
        .style(style)
    }));
    header.push(Cell::from("Sum"));

    let total_row = grid.len().saturating_sub(1);
    let rows = grid.into_iter().enumerate().map(|(row_index, row)| {
        let cells = row.into_iter().enumerate().map(|(column, text)| {
            let style = if column == selected_column {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Cell::from(text).style(style)
        });
        let row_style = if row_index == total_row {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        Row::new(cells).style(row_style)
    });

    let mut widths = vec![Constraint::Length(26)];
    widths.extend([Constraint::Length(10); 7]);
    widths.push(Constraint::Length(8));
    let title = format!(
        "uke {} | {}",
        state.selected_date.iso_week(),
        format_date(state.week_start())
    );
    let table = Table::new(rows, widths)
        .header(Row::new(header).style(Style::default().add_modifier(Modifier::BOLD)))
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(table, layout[0]);

    let entries = day_entries(snapshot, state.selected_date);
    let lines: Vec<Line<'_>> = if entries.is_empty() {
        vec![Line::from("ingen timeføringer denne dagen (a for ny)")]
    } else {
        entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let mut style = Style::default();
                if state.is_recently_added(entry.id) {
                    style = style.fg(Color::Green);
                }
                if index == view_data.entry_cursor {
                    style = style.add_modifier(Modifier::REVERSED);
                }
                Line::from(Span::styled(entry_line(state, snapshot, entry), style))
            })
            .collect()
    };
    let title = format!(
        "{} {}",
        weekday_label(state.selected_date.weekday()),
        format_date(state.selected_date)
    );
    let list = Paragraph::new(lines).block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(list, layout[1]);
}

fn render_suggestions(frame: &mut ratatui::Frame<'_>, area: Rect, view_data: &ViewData) {
    let lines: Vec<Line<'_>> = suggestion_rows(view_data)
        .into_iter()
        .enumerate()
        .map(|(index, row)| {
            let mut style = match row {
                SuggestionRow::Section | SuggestionRow::Category(_) => {
                    Style::default().add_modifier(Modifier::BOLD)
                }
                SuggestionRow::Item(_) => Style::default(),
            };
            if index == view_data.suggestion_cursor {
                style = style.add_modifier(Modifier::REVERSED);
            }
            Line::from(Span::styled(suggestion_row_text(view_data, row), style))
        })
        .collect();
    let body =
        Paragraph::new(lines).block(Block::default().title("forslag").borders(Borders::ALL));
    frame.render_widget(body, area);
}

fn render_billing(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    view_data: &ViewData,
) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Percentage(50),
            Constraint::Min(3),
        ])
        .split(area);

    let filter_style = if view_data.billing_ui.query_active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    frame.render_widget(
        Paragraph::new(billing_filter_text(&view_data.billing)).style(filter_style),
        layout[0],
    );

    let focused = |focus: BillingFocus| {
        if view_data.billing_ui.focus == focus {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        }
    };
    let selected = |is_selected: bool| {
        if is_selected {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        }
    };

    let case_rows = view_data.billing.case_rows(&view_data.snapshot, state.today);
    let rows = case_rows.iter().enumerate().map(|(index, row)| {
        Row::new(vec![
            Cell::from(format!("{} ({})", row.case_name, row.case_number)),
            Cell::from(row.client_name.clone()),
            Cell::from(format_hours(row.hours)),
            Cell::from(format_currency(row.amount)),
        ])
        .style(selected(
            view_data.billing_ui.focus == BillingFocus::Cases
                && index == view_data.billing_ui.case_cursor,
        ))
    });
    let header = BillingSortColumn::ALL.iter().map(|column| {
        if *column == view_data.billing.sort_column {
            format!(
                "{} {}",
                column.label(),
                sort_arrow(view_data.billing.sort_direction)
            )
        } else {
            column.label().to_owned()
        }
    });
    let cases_table = Table::new(
        rows,
        [
            Constraint::Percentage(40),
            Constraint::Percentage(25),
            Constraint::Percentage(10),
            Constraint::Percentage(25),
        ],
    )
    .header(Row::new(header).style(Style::default().add_modifier(Modifier::BOLD)))
    .block(
        Block::default()
            .title("fakturerbare saker")
            .borders(Borders::ALL)
            .border_style(focused(BillingFocus::Cases)),
    );
    frame.render_widget(cases_table, layout[1]);

    let invoices = view_data
        .billing
        .invoice_rows(&view_data.snapshot, state.today);
    let rows = invoices.iter().enumerate().map(|(index, invoice)| {
        Row::new(vec![
            Cell::from(invoice.invoice_number.clone()),
            Cell::from(view_data.snapshot.case_label(invoice.case_id).to_owned()),
            Cell::from(format_date(invoice.date)),
            Cell::from(format_date(invoice.due_date)),
            Cell::from(format_currency(invoice.amount)),
            Cell::from(invoice.status.label()),
        ])
        .style(selected(
            view_data.billing_ui.focus == BillingFocus::Invoices
                && index == view_data.billing_ui.invoice_cursor,
        ))
    });
    let invoices_table = Table::new(
        rows,
        [
            Constraint::Length(12),
            Constraint::Percentage(30),
            Constraint::Length(11),
            Constraint::Length(11),
            Constraint::Length(16),
            Constraint::Length(12),
        ],
    )
    .header(
        Row::new(vec!["Nummer", "Sak", "Dato", "Forfall", "Beløp", "Status"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(
        Block::default()
            .title("fakturaer")
            .borders(Borders::ALL)
            .border_style(focused(BillingFocus::Invoices)),
    );
    frame.render_widget(invoices_table, layout[2]);
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    if view_data.help_visible {
        return String::new();
    }

    let mode = match state.mode {
        AppMode::Nav => "NAV",
        AppMode::Edit => "EDIT",
        AppMode::Form(_) => "FORM",
    };
    let hints = if view_data.editor.is_some() {
        "tab/shift+tab felt | ↑/↓ velg | enter lagre | esc avbryt"
    } else if view_data.billing_ui.query_active {
        "skriv søk | enter ferdig | esc tøm"
    } else {
        match state.active_tab {
            TabKind::Week => "h/l dag | [/] uke | t i dag | j/k | a ny | n sak | e rediger | d slett",
            TabKind::Suggestions => {
                "j/k | enter åpne | space velg | c bekreft | C bekreft valgte | e rediger | d slett"
            }
            TabKind::Billing => {
                "tab fokus | 1-4 sorter | 5-8 status | p periode | / søk | i faktura | a godkjenn | o last ned"
            }
        }
    };
    let default = format!("{hints} | f/b fane | ? hjelp | ctrl+q");
    match &state.status_line {
        Some(status) => format!("{mode} | {status} | {default}"),
        None => format!("{mode} | {default}"),
    }
}

fn help_overlay_text() -> String {
    [
        "globalt",
        "  f / b          neste / forrige fane",
        "  ?              vis / skjul hjelp",
        "  ctrl+q         avslutt",
        "",
        "uke",
        "  h / l, ← / →   forrige / neste dag",
        "  [ / ], H / L   forrige / neste uke",
        "  t              i dag",
        "  j / k          velg timeføring",
        "  a              ny timeføring",
        "  n              ny sak",
        "  e / enter      rediger timeføring",
        "  d              slett timeføring",
        "",
        "forslag",
        "  enter          åpne / lukk gruppe, rediger forslag",
        "  space          velg forslag (ikke spam)",
        "  c              bekreft forslaget",
        "  C              bekreft alle valgte",
        "  e              rediger forslaget",
        "  d              slett forslaget",
        "  z              vis / skjul forslag",
        "",
        "fakturering",
        "  tab            bytt mellom saker og fakturaer",
        "  1-4            sorter på sak, klient, timer, beløp",
        "  5-8            filtrer på utkast, sendt, betalt, forfalt",
        "  p              bytt periode",
        "  /              søk",
        "  i              lag fakturautkast for saken",
        "  a              godkjenn og send utkast",
        "  d              slett utkast",
        "  o / enter      last ned faktura",
        "",
        "skjema",
        "  tab / shift+tab  neste / forrige felt",
        "  ↑ / ↓            velg i listen, endre timer eller dato",
        "  ctrl+n           ny sak fra saksfeltet",
        "  enter / ctrl+s   lagre",
        "  esc              avbryt",
    ]
    .join("\n")
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
