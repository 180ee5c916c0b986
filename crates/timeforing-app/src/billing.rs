// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use time::{Date, Duration, Month};

use crate::{
    CaseId, Invoice, InvoiceId, InvoiceStatus, LedgerSnapshot, Nok, SortDirection, TimeEntry,
};

pub const DEFAULT_PAYMENT_TERMS_DAYS: i64 = 30;

pub fn total_hours(entries: &[TimeEntry], case_id: CaseId, only_billable: bool) -> f64 {
    entries
        .iter()
        .filter(|entry| entry.case_id == case_id && (!only_billable || entry.billable))
        .fold(0.0, |total, entry| total + entry.hours)
}

/// Billable hours on the case priced at `hourly_rate`.
pub fn total_amount(entries: &[TimeEntry], case_id: CaseId, hourly_rate: Nok) -> Nok {
    Nok::for_hours(total_hours(entries, case_id, true), hourly_rate)
}

/// `7 500,00 kr`, grouped with no-break spaces the way nb-NO renders kroner.
pub fn format_currency(amount: Nok) -> String {
    let ore = amount.ore();
    let kroner = (ore / 100).unsigned_abs();
    let cents = (ore % 100).unsigned_abs();

    let digits = kroner.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 * 2);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push('\u{a0}');
        }
        grouped.push(ch);
    }

    let sign = if ore < 0 { "\u{2212}" } else { "" };
    format!("{sign}{grouped},{cents:02}\u{a0}kr")
}

/// One past the highest `F-<year>-NNN` sequence already issued that year.
pub fn next_invoice_number(invoices: &[Invoice], year: i32) -> String {
    let prefix = format!("F-{year}-");
    let next = invoices
        .iter()
        .filter_map(|invoice| {
            invoice
                .invoice_number
                .strip_prefix(&prefix)?
                .parse::<u32>()
                .ok()
        })
        .max()
        .unwrap_or(0)
        + 1;
    format!("{prefix}{next:03}")
}

pub fn draft_invoice(
    id: InvoiceId,
    case_id: CaseId,
    amount: Nok,
    date: Date,
    payment_terms_days: i64,
    existing: &[Invoice],
) -> Invoice {
    Invoice {
        id,
        case_id,
        status: InvoiceStatus::Draft,
        amount,
        date,
        due_date: date.saturating_add(Duration::days(payment_terms_days)),
        invoice_number: next_invoice_number(existing, date.year()),
    }
}

impl Invoice {
    pub fn approve(&mut self) -> Result<()> {
        if self.status != InvoiceStatus::Draft {
            bail!(
                "invoice {} is {} and can no longer be approved; only drafts are sent",
                self.invoice_number,
                self.status.label().to_lowercase()
            );
        }
        self.status = InvoiceStatus::Sent;
        Ok(())
    }

    pub fn ensure_deletable(&self) -> Result<()> {
        if self.status != InvoiceStatus::Draft {
            bail!(
                "invoice {} is {}; only drafts can be deleted",
                self.invoice_number,
                self.status.label().to_lowercase()
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BillingPeriod {
    #[default]
    All,
    CurrentMonth,
    LastMonth,
    CurrentQuarter,
    LastQuarter,
}

impl BillingPeriod {
    pub const ALL: [Self; 5] = [
        Self::All,
        Self::CurrentMonth,
        Self::LastMonth,
        Self::CurrentQuarter,
        Self::LastQuarter,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "Alle perioder",
            Self::CurrentMonth => "Denne måneden",
            Self::LastMonth => "Forrige måned",
            Self::CurrentQuarter => "Dette kvartalet",
            Self::LastQuarter => "Forrige kvartal",
        }
    }

    pub fn next(self) -> Self {
        let index = Self::ALL
            .iter()
            .position(|period| *period == self)
            .unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    /// Inclusive date range relative to `today`; `None` means unbounded.
    pub fn range(self, today: Date) -> Option<(Date, Date)> {
        let year = today.year();
        let month = today.month();
        match self {
            Self::All => None,
            Self::CurrentMonth => month_span(year, month, 1),
            Self::LastMonth => {
                let year = if month == Month::January { year - 1 } else { year };
                month_span(year, month.previous(), 1)
            }
            Self::CurrentQuarter => month_span(year, quarter_start(month), 3),
            Self::LastQuarter => {
                let start = quarter_start(month);
                let year = if start == Month::January { year - 1 } else { year };
                month_span(year, quarter_start(start.previous()), 3)
            }
        }
    }

    pub fn contains(self, today: Date, date: Date) -> bool {
        self.range(today)
            .is_none_or(|(start, end)| start <= date && date <= end)
    }
}

fn quarter_start(month: Month) -> Month {
    match month {
        Month::January | Month::February | Month::March => Month::January,
        Month::April | Month::May | Month::June => Month::April,
        Month::July | Month::August | Month::September => Month::July,
        Month::October | Month::November | Month::December => Month::October,
    }
}

fn month_span(year: i32, first: Month, months: u8) -> Option<(Date, Date)> {
    let start = Date::from_calendar_date(year, first, 1).ok()?;
    let mut end_month = first;
    let mut end_year = year;
    for _ in 0..months {
        if end_month == Month::December {
            end_year += 1;
        }
        end_month = end_month.next();
    }
    let end = Date::from_calendar_date(end_year, end_month, 1)
        .ok()?
        .previous_day()?;
    Some((start, end))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BillingSortColumn {
    #[default]
    Case,
    Client,
    Hours,
    Amount,
}

impl BillingSortColumn {
    pub const ALL: [Self; 4] = [Self::Case, Self::Client, Self::Hours, Self::Amount];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Case => "Sak",
            Self::Client => "Klient",
            Self::Hours => "Timer",
            Self::Amount => "Beløp",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseBillingRow {
    pub case_id: CaseId,
    pub case_name: String,
    pub case_number: String,
    pub client_name: String,
    pub hours: f64,
    pub amount: Nok,
}

/// Filters and sort order for the billing page.
#[derive(Debug, Clone, PartialEq)]
pub struct BillingView {
    pub query: String,
    pub status_filter: BTreeSet<InvoiceStatus>,
    pub sort_column: BillingSortColumn,
    pub sort_direction: SortDirection,
    pub period: BillingPeriod,
}

impl Default for BillingView {
    fn default() -> Self {
        Self {
            query: String::new(),
            status_filter: BTreeSet::new(),
            sort_column: BillingSortColumn::Case,
            sort_direction: SortDirection::Asc,
            period: BillingPeriod::All,
        }
    }
}

impl BillingView {
    /// Same column flips direction; a new column starts ascending.
    pub fn toggle_sort(&mut self, column: BillingSortColumn) {
        if self.sort_column == column {
            self.sort_direction = self.sort_direction.toggled();
        } else {
            self.sort_column = column;
            self.sort_direction = SortDirection::Asc;
        }
    }

    pub fn toggle_status(&mut self, status: InvoiceStatus) {
        if !self.status_filter.remove(&status) {
            self.status_filter.insert(status);
        }
    }

    fn matches_query(&self, fields: &[&str]) -> bool {
        let query = self.query.trim().to_lowercase();
        query.is_empty()
            || fields
                .iter()
                .any(|field| field.to_lowercase().contains(&query))
    }

    pub fn case_rows(&self, snapshot: &LedgerSnapshot, today: Date) -> Vec<CaseBillingRow> {
        let in_period: Vec<TimeEntry> = snapshot
            .entries
            .iter()
            .filter(|entry| self.period.contains(today, entry.date))
            .cloned()
            .collect();

        let mut rows: Vec<CaseBillingRow> = snapshot
            .cases
            .iter()
            .filter(|case| self.matches_query(&[&case.name, &case.client_name, &case.case_number]))
            .filter_map(|case| {
                let hours = total_hours(&in_period, case.id, true);
                (hours > 0.0).then(|| CaseBillingRow {
                    case_id: case.id,
                    case_name: case.name.clone(),
                    case_number: case.case_number.clone(),
                    client_name: case.client_name.clone(),
                    hours,
                    amount: Nok::for_hours(hours, snapshot.hourly_rate),
                })
            })
            .collect();

        rows.sort_by(|left, right| {
            let ordering = match self.sort_column {
                BillingSortColumn::Case => collate(&left.case_name, &right.case_name),
                BillingSortColumn::Client => collate(&left.client_name, &right.client_name),
                BillingSortColumn::Hours => left.hours.total_cmp(&right.hours),
                BillingSortColumn::Amount => left.amount.cmp(&right.amount),
            };
            match self.sort_direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
        rows
    }

    pub fn invoice_rows<'a>(&self, snapshot: &'a LedgerSnapshot, today: Date) -> Vec<&'a Invoice> {
        let mut rows: Vec<&Invoice> = snapshot
            .invoices
            .iter()
            .filter(|invoice| {
                self.status_filter.is_empty() || self.status_filter.contains(&invoice.status)
            })
            .filter(|invoice| self.period.contains(today, invoice.date))
            .filter(|invoice| {
                let (name, number, client) = snapshot.case(invoice.case_id).map_or(
                    ("", "", ""),
                    |case| {
                        (
                            case.name.as_str(),
                            case.case_number.as_str(),
                            case.client_name.as_str(),
                        )
                    },
                );
                self.matches_query(&[&invoice.invoice_number, name, number, client])
            })
            .collect();
        rows.sort_by(|left, right| right.date.cmp(&left.date).then(left.id.cmp(&right.id)));
        rows
    }
}

/// Orders text the way nb-NO does: case-insensitive, with æ, ø, å after z.
pub fn collate(left: &str, right: &str) -> Ordering {
    collation_key(left)
        .cmp(&collation_key(right))
        .then_with(|| left.cmp(right))
}

fn collation_key(value: &str) -> Vec<u32> {
    value
        .chars()
        .flat_map(char::to_lowercase)
        .map(|ch| match ch {
            'æ' | 'ä' => 'z' as u32 + 1,
            'ø' | 'ö' => 'z' as u32 + 2,
            'å' => 'z' as u32 + 3,
            other => other as u32,
        })
        .collect()
}
