// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use std::path::PathBuf;
use time::{Date, Duration, Month};
use timeforing_app::{
    ACTIVITY_TYPES, CaseFormInput, CaseId, SuggestionCategory, SuggestionId, TimeEntryFormInput,
    UnconfirmedSuggestion,
};

const CASE_NAMES: [&str; 12] = [
    "Arveoppgjør",
    "Barnefordeling",
    "Erstatningskrav",
    "Husleietvist",
    "Oppsigelse",
    "Naboklage",
    "Kontraktsbrudd",
    "Skjønnssak",
    "Forsikringsoppgjør",
    "Ekteskapsbrudd",
    "Tomtegrense",
    "Konkursbo",
];

const FIRST_NAMES: [&str; 14] = [
    "Ingrid", "Ola", "Kari", "Lars", "Sigrid", "Jonas", "Nora", "Emil", "Astrid", "Henrik",
    "Leila", "Tobias", "Maja", "Yusuf",
];
const LAST_NAMES: [&str; 14] = [
    "Hansen", "Johansen", "Olsen", "Larsen", "Andersen", "Pedersen", "Nilsen", "Kristiansen",
    "Jensen", "Karlsen", "Berg", "Haugen", "Dahl", "Lund",
];

const WORDS: [&str; 20] = [
    "brev",
    "møte",
    "klient",
    "motpart",
    "retten",
    "dokumenter",
    "utkast",
    "avtale",
    "samtale",
    "gjennomgang",
    "prosesskriv",
    "frist",
    "bevis",
    "vitne",
    "forlik",
    "anke",
    "notat",
    "telefon",
    "epost",
    "kontrakt",
];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// Seeded generator for cases, entry forms and suggestions.
#[derive(Debug, Clone)]
pub struct LedgerFaker {
    rng: DeterministicRng,
    case_counter: u32,
}

impl LedgerFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            case_counter: 0,
        }
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn case_input(&mut self) -> CaseFormInput {
        self.case_counter += 1;
        CaseFormInput {
            name: self.pick(&CASE_NAMES).to_owned(),
            case_number: format!("sak{}", 100 + self.case_counter),
            client_name: self.person_name(),
        }
    }

    pub fn person_name(&mut self) -> String {
        format!("{} {}", self.pick(&FIRST_NAMES), self.pick(&LAST_NAMES))
    }

    pub fn activity(&mut self) -> &'static str {
        ACTIVITY_TYPES[self.rng.int_n(ACTIVITY_TYPES.len())]
    }

    /// Quarter-hour multiple in `[0.25, 8]`.
    pub fn hours(&mut self) -> f64 {
        (self.rng.int_n(32) + 1) as f64 * 0.25
    }

    pub fn date_in_week(&mut self, week_start: Date) -> Date {
        week_start.saturating_add(Duration::days(self.rng.int_n(7) as i64))
    }

    pub fn description(&mut self) -> String {
        let count = 2 + self.rng.int_n(4);
        let mut sentence = (0..count)
            .map(|_| self.pick(&WORDS))
            .collect::<Vec<_>>()
            .join(" ");
        if let Some(first) = sentence.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        sentence
    }

    pub fn entry_input(&mut self, case_id: CaseId, week_start: Date) -> TimeEntryFormInput {
        TimeEntryFormInput {
            case_id: Some(case_id),
            date: self.date_in_week(week_start),
            hours: self.hours(),
            description: self.description(),
            activity_type: self.activity().to_owned(),
            billable: self.rng.int_n(5) != 0,
        }
    }

    /// A suggestion shaped to land in `category`.
    pub fn suggestion(
        &mut self,
        id: SuggestionId,
        case_id: CaseId,
        category: SuggestionCategory,
        week_start: Date,
    ) -> UnconfirmedSuggestion {
        let mut suggestion = UnconfirmedSuggestion {
            id,
            case_id: Some(case_id),
            activity_type: self.activity().to_owned(),
            description: self.description(),
            hours: self.hours(),
            date: self.date_in_week(week_start),
            confirmed: false,
            important: self.rng.int_n(4) == 0,
        };
        match category {
            SuggestionCategory::Completed => {}
            SuggestionCategory::PartiallyCompleted => match self.rng.int_n(4) {
                0 => suggestion.case_id = None,
                1 => suggestion.activity_type.clear(),
                2 => suggestion.description.clear(),
                _ => suggestion.hours = 0.0,
            },
            SuggestionCategory::Spam => {
                suggestion.case_id = None;
                suggestion.activity_type.clear();
                suggestion.description.clear();
                suggestion.hours = 0.0;
                suggestion.important = false;
            }
        }
        suggestion
    }

    pub fn coin(&mut self) -> bool {
        self.rng.bool()
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }
}

/// Monday used by fixtures that need a stable week.
pub fn fixture_week_start() -> Date {
    Date::from_calendar_date(2026, Month::February, 16).expect("valid fixture date")
}

pub fn fixture_today() -> Date {
    fixture_week_start().saturating_add(Duration::days(2))
}

pub fn temp_export_dir() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let export_dir = dir.path().join("fakturaer");
    Ok((dir, export_dir))
}

pub fn temp_config_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let config_path = dir.path().join("config.toml");
    Ok((dir, config_path))
}
