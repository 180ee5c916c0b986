// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::Add;
use time::Date;

use crate::ids::*;

pub const DEFAULT_HOURLY_RATE_KRONER: i64 = 1500;
pub const MAX_HOURLY_RATE_KRONER: i64 = 100_000;
pub const UNKNOWN_CASE_LABEL: &str = "Ukjent sak";
pub const UNKNOWN_CLIENT_LABEL: &str = "Ukjent klient";

pub const ACTIVITY_TYPES: [&str; 9] = [
    "Reisetid",
    "Juridisk bistand",
    "Mediakommunikasjon",
    "Møte med skatt",
    "Undersøkelser",
    "Forhandlinger",
    "Mekling",
    "Admin",
    "Kontraktgjennomgang",
];

/// Norwegian kroner held as whole øre.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Nok(i64);

impl Nok {
    pub const ZERO: Self = Self(0);

    pub const fn from_ore(ore: i64) -> Self {
        Self(ore)
    }

    pub const fn from_kroner(kroner: i64) -> Self {
        Self(kroner.saturating_mul(100))
    }

    /// Prices `hours` at `rate` per hour, rounded to the nearest øre.
    pub fn for_hours(hours: f64, rate: Self) -> Self {
        Self((hours * rate.0 as f64).round() as i64)
    }

    pub const fn ore(self) -> i64 {
        self.0
    }

    pub fn kroner(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl Add for Nok {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Nok {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    pub id: CaseId,
    pub name: String,
    pub case_number: String,
    pub client_name: String,
}

impl Case {
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        [&self.name, &self.case_number, &self.client_name]
            .into_iter()
            .any(|field| field.to_lowercase().contains(&query))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: TimeEntryId,
    pub case_id: CaseId,
    pub date: Date,
    pub hours: f64,
    pub description: String,
    pub activity_type: String,
    pub billable: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub from_suggestion: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnconfirmedSuggestion {
    pub id: SuggestionId,
    pub case_id: Option<CaseId>,
    #[serde(rename = "type")]
    pub activity_type: String,
    pub description: String,
    pub hours: f64,
    pub date: Date,
    pub confirmed: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub important: bool,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Overdue,
}

impl InvoiceStatus {
    pub const ALL: [Self; 4] = [Self::Draft, Self::Sent, Self::Paid, Self::Overdue];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(Self::Draft),
            "sent" => Some(Self::Sent),
            "paid" => Some(Self::Paid),
            "overdue" => Some(Self::Overdue),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "Utkast",
            Self::Sent => "Sendt",
            Self::Paid => "Betalt",
            Self::Overdue => "Forfalt",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub case_id: CaseId,
    pub status: InvoiceStatus,
    pub amount: Nok,
    pub date: Date,
    pub due_date: Date,
    pub invoice_number: String,
}

/// Everything the views render, cloned out of the store in one piece.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub cases: Vec<Case>,
    pub entries: Vec<TimeEntry>,
    pub suggestions: Vec<UnconfirmedSuggestion>,
    pub invoices: Vec<Invoice>,
    pub hourly_rate: Nok,
}

impl LedgerSnapshot {
    pub fn case(&self, case_id: CaseId) -> Option<&Case> {
        self.cases.iter().find(|case| case.id == case_id)
    }

    pub fn case_label(&self, case_id: CaseId) -> &str {
        self.case(case_id)
            .map_or(UNKNOWN_CASE_LABEL, |case| case.name.as_str())
    }

    pub fn client_label(&self, case_id: CaseId) -> &str {
        self.case(case_id)
            .map_or(UNKNOWN_CLIENT_LABEL, |case| case.client_name.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TabKind {
    Week,
    Suggestions,
    Billing,
}

impl TabKind {
    pub const ALL: [Self; 3] = [Self::Week, Self::Suggestions, Self::Billing];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Week => "uke",
            Self::Suggestions => "forslag",
            Self::Billing => "fakturering",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "week" | "uke" => Some(Self::Week),
            "suggestions" | "forslag" => Some(Self::Suggestions),
            "billing" | "fakturering" => Some(Self::Billing),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormKind {
    TimeEntry,
    Case,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppMode {
    Nav,
    Edit,
    Form(FormKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

pub fn filter_cases<'a>(cases: &'a [Case], query: &str) -> Vec<&'a Case> {
    cases
        .iter()
        .filter(|case| case.matches_query(query))
        .collect()
}

pub fn filter_activities(query: &str) -> Vec<&'static str> {
    let query = query.to_lowercase();
    ACTIVITY_TYPES
        .into_iter()
        .filter(|activity| activity.to_lowercase().contains(&query))
        .collect()
}
