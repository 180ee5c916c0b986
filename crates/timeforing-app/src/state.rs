// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;
use time::{Date, Duration};

use crate::{AppMode, FormKind, TabKind, TimeEntryId, format_date, week_start};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub mode: AppMode,
    pub active_tab: TabKind,
    pub today: Date,
    pub selected_date: Date,
    pub status_line: Option<String>,
    pub recently_added: BTreeSet<TimeEntryId>,
    highlight_token: u64,
}

impl AppState {
    pub fn new(today: Date) -> Self {
        Self {
            mode: AppMode::Nav,
            active_tab: TabKind::Week,
            today,
            selected_date: today,
            status_line: None,
            recently_added: BTreeSet::new(),
            highlight_token: 0,
        }
    }

    pub fn week_start(&self) -> Date {
        week_start(self.selected_date)
    }

    pub fn is_recently_added(&self, id: TimeEntryId) -> bool {
        self.recently_added.contains(&id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    NextTab,
    PrevTab,
    SelectTab(TabKind),
    EnterEditMode,
    ExitToNav,
    OpenForm(FormKind),
    PrevDay,
    NextDay,
    PrevWeek,
    NextWeek,
    GoToToday,
    GoToDate(Date),
    MarkRecentlyAdded(Vec<TimeEntryId>),
    ClearRecentlyAdded { token: u64 },
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ModeChanged(AppMode),
    TabChanged(TabKind),
    DateChanged(Date),
    HighlightStarted { token: u64 },
    HighlightCleared,
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::NextTab => self.rotate_tab(1),
            AppCommand::PrevTab => self.rotate_tab(-1),
            AppCommand::SelectTab(tab) => {
                if self.active_tab == tab {
                    return Vec::new();
                }
                self.active_tab = tab;
                vec![AppEvent::TabChanged(tab)]
            }
            AppCommand::EnterEditMode => {
                self.mode = AppMode::Edit;
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::ExitToNav => {
                self.mode = AppMode::Nav;
                vec![AppEvent::ModeChanged(self.mode), self.set_status("nav")]
            }
            AppCommand::OpenForm(kind) => {
                self.mode = AppMode::Form(kind);
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::PrevDay => self.shift_date(-1),
            AppCommand::NextDay => self.shift_date(1),
            AppCommand::PrevWeek => self.shift_date(-7),
            AppCommand::NextWeek => self.shift_date(7),
            AppCommand::GoToToday => self.move_to(self.today),
            AppCommand::GoToDate(date) => self.move_to(date),
            AppCommand::MarkRecentlyAdded(ids) => {
                if ids.is_empty() {
                    return Vec::new();
                }
                self.recently_added.extend(ids);
                self.highlight_token += 1;
                vec![AppEvent::HighlightStarted {
                    token: self.highlight_token,
                }]
            }
            AppCommand::ClearRecentlyAdded { token } => {
                if token != self.highlight_token || self.recently_added.is_empty() {
                    return Vec::new();
                }
                self.recently_added.clear();
                vec![AppEvent::HighlightCleared]
            }
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    fn rotate_tab(&mut self, delta: isize) -> Vec<AppEvent> {
        let tabs = TabKind::ALL;
        let current = tabs
            .iter()
            .position(|tab| *tab == self.active_tab)
            .unwrap_or(0) as isize;
        let len = tabs.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.active_tab = tabs[next];
        vec![AppEvent::TabChanged(self.active_tab)]
    }

    fn shift_date(&mut self, days: i64) -> Vec<AppEvent> {
        let target = self.selected_date.saturating_add(Duration::days(days));
        self.move_to(target)
    }

    fn move_to(&mut self, date: Date) -> Vec<AppEvent> {
        if self.selected_date == date {
            return Vec::new();
        }
        self.selected_date = date;
        vec![
            AppEvent::DateChanged(date),
            self.set_status(&format_date(date)),
        ]
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}
