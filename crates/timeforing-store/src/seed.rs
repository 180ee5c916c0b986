// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use time::{Date, Duration, Month};
use timeforing_app::{
    Case, CaseId, Invoice, InvoiceId, InvoiceStatus, Nok, SuggestionId, TimeEntry, TimeEntryId,
    UnconfirmedSuggestion, week_start,
};
use tracing::info;

use crate::Store;

const DEMO_CASES: [(&str, &str, &str); 6] = [
    ("Drap", "sak 9", "Per Gunnar"),
    ("Barnevern", "sak 33", "Fatima Khan"),
    ("Mishandling i nære relasjoner", "sak 286", "Mads Thomassen"),
    ("Omsorgsovertagelse", "sak 287", "Gunnar Aage"),
    ("Skattesvik", "sak 14", "Abdi Mohammed"),
    ("Foreldreansvar, samvær", "sak 43", "Aisha Hakeem"),
];

// (case index, day offset from Monday, hours, description, activity, billable)
const DEMO_ENTRIES: [(usize, i64, f64, &str, &str, bool); 19] = [
    (0, 0, 3.5, "Møte med klient", "Juridisk bistand", true),
    (0, 0, 2.0, "Forberedelse til rettsmøte", "Juridisk bistand", true),
    (1, 0, 1.5, "Gjennomgang av dokumenter", "Juridisk bistand", true),
    (2, 1, 4.0, "Rettsmøte", "Juridisk bistand", true),
    (2, 1, 2.0, "Etterarbeid rettsmøte", "Juridisk bistand", true),
    (4, 1, 1.0, "Telefonsamtale med klient", "Mediakommunikasjon", true),
    (3, 2, 3.0, "Møte med barnevernet", "Møte med skatt", true),
    (3, 2, 1.5, "Notat fra møte", "Juridisk bistand", true),
    (5, 2, 2.5, "Forberedelse til mekling", "Juridisk bistand", true),
    (5, 3, 4.0, "Mekling", "Mekling", true),
    (5, 3, 1.0, "Oppsummering etter mekling", "Juridisk bistand", true),
    (0, 3, 2.0, "Gjennomgang av bevis", "Juridisk bistand", true),
    (1, 4, 3.0, "Møte med klient", "Juridisk bistand", true),
    (1, 4, 2.0, "Utarbeidelse av prosesskriv", "Juridisk bistand", true),
    (1, 4, 1.5, "Korrespondanse med motpart", "Juridisk bistand", true),
    (0, 5, 2.5, "Forberedelse til vitneforklaring", "Juridisk bistand", true),
    (4, 5, 1.0, "Gjennomgang av dokumentasjon", "Undersøkelser", true),
    (2, 6, 3.0, "Forberedelse til rettssak", "Juridisk bistand", false),
    (3, 6, 2.0, "Gjennomgang av saksdokumenter", "Juridisk bistand", true),
];

// (case index, day offset, activity, description, hours)
const DEMO_SUGGESTIONS: [(Option<usize>, i64, &str, &str, f64); 13] = [
    (Some(0), 0, "Reisetid", "Sendt brev til motpart", 0.3),
    (Some(1), 1, "Juridisk bistand", "Brev til politiet", 2.0),
    (Some(2), 2, "Juridisk bistand", "Epost mottatt: Saksinfo", 1.0),
    (Some(0), 3, "Mediakommunikasjon", "Samtaler med klient", 4.0),
    (Some(3), 4, "Møte med skatt", "Korrespondanse", 7.0),
    (Some(4), 0, "", "Møte: Rettsmøte", 5.0),
    (Some(3), 1, "Forhandlinger", "", 2.0),
    (Some(2), 2, "Juridisk bistand", "Journalist", 0.0),
    (None, 3, "Mediakommunikasjon", "Epost sendt: Saksinfo", 0.5),
    (None, 4, "", "", 0.0),
    (None, 5, "", "", 0.0),
    (None, 6, "", "", 0.0),
    (None, 0, "", "", 0.0),
];

// (case index, status, kroner, issued, due, number)
const DEMO_INVOICES: [(usize, InvoiceStatus, i64, (i32, Month, u8), (i32, Month, u8), &str); 4] = [
    (
        0,
        InvoiceStatus::Paid,
        25_000,
        (2024, Month::February, 15),
        (2024, Month::March, 15),
        "F-2024-001",
    ),
    (
        1,
        InvoiceStatus::Sent,
        12_500,
        (2024, Month::March, 1),
        (2024, Month::April, 1),
        "F-2024-002",
    ),
    (
        2,
        InvoiceStatus::Draft,
        18_750,
        (2024, Month::March, 10),
        (2024, Month::April, 10),
        "F-2024-003",
    ),
    (
        4,
        InvoiceStatus::Overdue,
        9_000,
        (2024, Month::February, 1),
        (2024, Month::March, 1),
        "F-2024-004",
    ),
];

fn calendar_date((year, month, day): (i32, Month, u8)) -> Result<Date> {
    Date::from_calendar_date(year, month, day)
        .with_context(|| format!("invalid demo date {year}-{month}-{day}"))
}

impl Store {
    /// Loads the demo ledger for the week containing `today`.
    pub fn seed_demo_data(&mut self, today: Date) -> Result<()> {
        let monday = week_start(today);
        let day = |offset: i64| monday.saturating_add(Duration::days(offset));

        let mut case_ids = Vec::with_capacity(DEMO_CASES.len());
        for (name, case_number, client_name) in DEMO_CASES {
            let id = CaseId::new(self.ids.next());
            self.cases.push(Case {
                id,
                name: name.to_owned(),
                case_number: case_number.to_owned(),
                client_name: client_name.to_owned(),
            });
            case_ids.push(id);
        }

        for (case_index, offset, hours, description, activity, billable) in DEMO_ENTRIES {
            self.entries.push(TimeEntry {
                id: TimeEntryId::new(self.ids.next()),
                case_id: case_ids[case_index],
                date: day(offset),
                hours,
                description: description.to_owned(),
                activity_type: activity.to_owned(),
                billable,
                from_suggestion: false,
            });
        }

        for (case_index, offset, activity, description, hours) in DEMO_SUGGESTIONS {
            self.suggestions.push(UnconfirmedSuggestion {
                id: SuggestionId::new(self.ids.next()),
                case_id: case_index.map(|index| case_ids[index]),
                activity_type: activity.to_owned(),
                description: description.to_owned(),
                hours,
                date: day(offset),
                confirmed: false,
                important: false,
            });
        }

        for (case_index, status, kroner, issued, due, number) in DEMO_INVOICES {
            self.invoices.push(Invoice {
                id: InvoiceId::new(self.ids.next()),
                case_id: case_ids[case_index],
                status,
                amount: Nok::from_kroner(kroner),
                date: calendar_date(issued)?,
                due_date: calendar_date(due)?,
                invoice_number: number.to_owned(),
            });
        }

        info!(
            cases = self.cases.len(),
            entries = self.entries.len(),
            suggestions = self.suggestions.len(),
            invoices = self.invoices.len(),
            week_start = %monday,
            "demo data loaded"
        );
        Ok(())
    }
}
