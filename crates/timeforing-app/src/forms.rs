// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use std::fmt;
use time::Date;

use crate::{
    CaseId, DEFAULT_ENTRY_HOURS, FormKind, HoursInput, SuggestionId, TimeEntry, TimeEntryId,
    UnconfirmedSuggestion,
};

pub const CASE_REQUIRED: &str = "Vennligst velg en sak";
pub const ACTIVITY_REQUIRED: &str = "Vennligst velg en aktivitetstype";
pub const DESCRIPTION_REQUIRED: &str = "Vennligst skriv en beskrivelse";
pub const CASE_NAME_REQUIRED: &str = "Vennligst skriv et saksnavn";
pub const CASE_NUMBER_REQUIRED: &str = "Vennligst skriv et saksnummer";
pub const CLIENT_NAME_REQUIRED: &str = "Vennligst skriv et klientnavn";

#[derive(Debug, Clone, PartialEq)]
pub struct TimeEntryFormInput {
    pub case_id: Option<CaseId>,
    pub date: Date,
    pub hours: f64,
    pub description: String,
    pub activity_type: String,
    pub billable: bool,
}

impl TimeEntryFormInput {
    pub fn blank(date: Date) -> Self {
        Self {
            case_id: None,
            date,
            hours: DEFAULT_ENTRY_HOURS,
            description: String::new(),
            activity_type: String::new(),
            billable: true,
        }
    }

    /// Collects every missing field at once instead of stopping at the first.
    pub fn validate(&self) -> std::result::Result<(), TimeEntryFormErrors> {
        let errors = TimeEntryFormErrors {
            case: self.case_id.is_none().then_some(CASE_REQUIRED),
            activity_type: self
                .activity_type
                .trim()
                .is_empty()
                .then_some(ACTIVITY_REQUIRED),
            description: self
                .description
                .trim()
                .is_empty()
                .then_some(DESCRIPTION_REQUIRED),
        };
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Case, date and billable flag survive a submit; the rest starts over.
    pub fn reset_after_submit(&mut self) {
        self.hours = DEFAULT_ENTRY_HOURS;
        self.description.clear();
        self.activity_type.clear();
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeEntryFormErrors {
    pub case: Option<&'static str>,
    pub activity_type: Option<&'static str>,
    pub description: Option<&'static str>,
}

impl TimeEntryFormErrors {
    pub fn is_empty(&self) -> bool {
        self.case.is_none() && self.activity_type.is_none() && self.description.is_none()
    }

    pub fn messages(&self) -> Vec<&'static str> {
        [self.case, self.activity_type, self.description]
            .into_iter()
            .flatten()
            .collect()
    }
}

impl fmt::Display for TimeEntryFormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.messages().join("; "))
    }
}

impl std::error::Error for TimeEntryFormErrors {}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseFormInput {
    pub name: String,
    pub case_number: String,
    pub client_name: String,
}

impl CaseFormInput {
    pub fn validate(&self) -> std::result::Result<(), CaseFormErrors> {
        let errors = CaseFormErrors {
            name: self.name.trim().is_empty().then_some(CASE_NAME_REQUIRED),
            case_number: self
                .case_number
                .trim()
                .is_empty()
                .then_some(CASE_NUMBER_REQUIRED),
            client_name: self
                .client_name
                .trim()
                .is_empty()
                .then_some(CLIENT_NAME_REQUIRED),
        };
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaseFormErrors {
    pub name: Option<&'static str>,
    pub case_number: Option<&'static str>,
    pub client_name: Option<&'static str>,
}

impl CaseFormErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.case_number.is_none() && self.client_name.is_none()
    }

    pub fn messages(&self) -> Vec<&'static str> {
        [self.name, self.case_number, self.client_name]
            .into_iter()
            .flatten()
            .collect()
    }
}

impl fmt::Display for CaseFormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.messages().join("; "))
    }
}

impl std::error::Error for CaseFormErrors {}

#[derive(Debug, Clone, PartialEq)]
pub enum FormPayload {
    TimeEntry(TimeEntryFormInput),
    Case(CaseFormInput),
}

impl FormPayload {
    pub fn kind(&self) -> FormKind {
        match self {
            Self::TimeEntry(_) => FormKind::TimeEntry,
            Self::Case(_) => FormKind::Case,
        }
    }

    pub fn blank_for(kind: FormKind, date: Date) -> Self {
        match kind {
            FormKind::TimeEntry => Self::TimeEntry(TimeEntryFormInput::blank(date)),
            FormKind::Case => Self::Case(CaseFormInput::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Self::TimeEntry(entry) => entry.validate()?,
            Self::Case(case) => case.validate()?,
        }
        Ok(())
    }
}

/// Inline edit state for an existing time entry.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryEditor {
    pub entry_id: TimeEntryId,
    pub case_id: CaseId,
    pub date: Date,
    pub hours: HoursInput,
    pub description: String,
    pub activity_type: String,
    pub billable: bool,
    from_suggestion: bool,
}

impl EntryEditor {
    pub fn from_entry(entry: &TimeEntry) -> Self {
        Self {
            entry_id: entry.id,
            case_id: entry.case_id,
            date: entry.date,
            hours: HoursInput::new(entry.hours),
            description: entry.description.clone(),
            activity_type: entry.activity_type.clone(),
            billable: entry.billable,
            from_suggestion: entry.from_suggestion,
        }
    }

    pub fn to_entry(&self) -> TimeEntry {
        TimeEntry {
            id: self.entry_id,
            case_id: self.case_id,
            date: self.date,
            hours: self.hours.hours(),
            description: self.description.clone(),
            activity_type: self.activity_type.clone(),
            billable: self.billable,
            from_suggestion: self.from_suggestion,
        }
    }
}

/// Inline edit state for a suggestion that has not been confirmed yet.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionEditor {
    pub suggestion_id: SuggestionId,
    pub case_id: Option<CaseId>,
    pub activity_type: String,
    pub description: String,
    pub hours: HoursInput,
}

impl SuggestionEditor {
    pub fn from_suggestion(suggestion: &UnconfirmedSuggestion) -> Self {
        Self {
            suggestion_id: suggestion.id,
            case_id: suggestion.case_id,
            activity_type: suggestion.activity_type.clone(),
            description: suggestion.description.clone(),
            hours: HoursInput::new(suggestion.hours),
        }
    }

    /// Applies the edited fields on top of `original`, keeping date and flags.
    pub fn apply_to(&self, original: &UnconfirmedSuggestion) -> UnconfirmedSuggestion {
        UnconfirmedSuggestion {
            case_id: self.case_id,
            activity_type: self.activity_type.clone(),
            description: self.description.clone(),
            hours: self.hours.hours(),
            ..original.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ACTIVITY_REQUIRED, CASE_REQUIRED, CaseFormErrors, CaseFormInput, DESCRIPTION_REQUIRED,
        EntryEditor, FormPayload, SuggestionEditor, TimeEntryFormErrors, TimeEntryFormInput,
    };
    use crate::{CaseId, FormKind, SuggestionId, TimeEntry, TimeEntryId, UnconfirmedSuggestion};
    use time::{Date, Month};

    fn monday() -> Date {
        Date::from_calendar_date(2026, Month::February, 16).expect("valid date")
    }

    #[test]
    fn blank_entry_form_collects_all_field_errors() {
        let form = TimeEntryFormInput::blank(monday());
        let errors = form.validate().expect_err("blank form should fail");
        assert_eq!(
            errors,
            TimeEntryFormErrors {
                case: Some(CASE_REQUIRED),
                activity_type: Some(ACTIVITY_REQUIRED),
                description: Some(DESCRIPTION_REQUIRED),
            }
        );
        assert_eq!(errors.messages().len(), 3);
    }

    #[test]
    fn whitespace_description_is_rejected() {
        let form = TimeEntryFormInput {
            case_id: Some(CaseId::new(1)),
            activity_type: "Mekling".to_owned(),
            description: "   ".to_owned(),
            ..TimeEntryFormInput::blank(monday())
        };
        let errors = form.validate().expect_err("blank description should fail");
        assert_eq!(errors.messages(), vec![DESCRIPTION_REQUIRED]);
    }

    #[test]
    fn complete_entry_form_validates() {
        let form = TimeEntryFormInput {
            case_id: Some(CaseId::new(1)),
            activity_type: "Mekling".to_owned(),
            description: "Mekling i tingretten".to_owned(),
            ..TimeEntryFormInput::blank(monday())
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn reset_keeps_case_date_and_billable() {
        let mut form = TimeEntryFormInput {
            case_id: Some(CaseId::new(4)),
            hours: 3.5,
            activity_type: "Admin".to_owned(),
            description: "Arkivering".to_owned(),
            billable: false,
            ..TimeEntryFormInput::blank(monday())
        };
        form.reset_after_submit();
        assert_eq!(form.case_id, Some(CaseId::new(4)));
        assert_eq!(form.date, monday());
        assert!(!form.billable);
        assert_eq!(form.hours, 1.0);
        assert!(form.description.is_empty());
        assert!(form.activity_type.is_empty());
    }

    #[test]
    fn payload_validation_surfaces_typed_errors_through_anyhow() {
        let payload = FormPayload::blank_for(FormKind::Case, monday());
        assert_eq!(payload.kind(), FormKind::Case);
        let error = payload.validate().expect_err("blank case should fail");
        let typed = error
            .downcast_ref::<CaseFormErrors>()
            .expect("case form errors");
        assert_eq!(typed.messages().len(), 3);

        let payload = FormPayload::Case(CaseFormInput {
            name: "Arv".to_owned(),
            case_number: "sak 50".to_owned(),
            client_name: "Ola Nordmann".to_owned(),
        });
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn entry_editor_round_trips_untouched_entry() {
        let entry = TimeEntry {
            id: TimeEntryId::new(7),
            case_id: CaseId::new(2),
            date: monday(),
            hours: 2.5,
            description: "Rettsmøte".to_owned(),
            activity_type: "Juridisk bistand".to_owned(),
            billable: true,
            from_suggestion: true,
        };
        let mut editor = EntryEditor::from_entry(&entry);
        assert_eq!(editor.hours.text(), "2,5");
        assert_eq!(editor.to_entry(), entry);

        editor.hours.input("3");
        editor.billable = false;
        let updated = editor.to_entry();
        assert_eq!(updated.hours, 3.0);
        assert!(!updated.billable);
        assert!(updated.from_suggestion);
    }

    #[test]
    fn suggestion_editor_keeps_date_and_flags() {
        let original = UnconfirmedSuggestion {
            id: SuggestionId::new(6),
            case_id: Some(CaseId::new(5)),
            activity_type: String::new(),
            description: "Møte: Rettsmøte".to_owned(),
            hours: 5.0,
            date: monday(),
            confirmed: false,
            important: true,
        };
        let mut editor = SuggestionEditor::from_suggestion(&original);
        editor.activity_type = "Juridisk bistand".to_owned();
        let updated = editor.apply_to(&original);
        assert_eq!(updated.activity_type, "Juridisk bistand");
        assert_eq!(updated.date, original.date);
        assert!(updated.important);
        assert_eq!(updated.id, original.id);
    }
}
