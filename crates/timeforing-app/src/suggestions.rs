// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::{SuggestionId, UnconfirmedSuggestion};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum SuggestionCategory {
    Completed,
    PartiallyCompleted,
    Spam,
}

impl SuggestionCategory {
    pub const ALL: [Self; 3] = [Self::Completed, Self::PartiallyCompleted, Self::Spam];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::PartiallyCompleted => "partiallyCompleted",
            Self::Spam => "spam",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Completed => "Fullført",
            Self::PartiallyCompleted => "Delvis fullført",
            Self::Spam => "Spam",
        }
    }

    /// Spam has nothing to turn into an entry.
    pub const fn is_confirmable(self) -> bool {
        !matches!(self, Self::Spam)
    }
}

impl UnconfirmedSuggestion {
    fn filled_fields(&self) -> [bool; 4] {
        [
            self.case_id.is_some(),
            !self.activity_type.is_empty(),
            !self.description.is_empty(),
            self.hours > 0.0,
        ]
    }

    /// Every suggestion lands in exactly one category.
    pub fn category(&self) -> SuggestionCategory {
        let filled = self.filled_fields();
        if filled.iter().all(|present| *present) {
            SuggestionCategory::Completed
        } else if filled.iter().any(|present| *present) {
            SuggestionCategory::PartiallyCompleted
        } else {
            SuggestionCategory::Spam
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CategorizedSuggestions<'a> {
    pub completed: Vec<&'a UnconfirmedSuggestion>,
    pub partially_completed: Vec<&'a UnconfirmedSuggestion>,
    pub spam: Vec<&'a UnconfirmedSuggestion>,
}

impl<'a> CategorizedSuggestions<'a> {
    pub fn get(&self, category: SuggestionCategory) -> &[&'a UnconfirmedSuggestion] {
        match category {
            SuggestionCategory::Completed => &self.completed,
            SuggestionCategory::PartiallyCompleted => &self.partially_completed,
            SuggestionCategory::Spam => &self.spam,
        }
    }

    pub fn len(&self) -> usize {
        self.completed.len() + self.partially_completed.len() + self.spam.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn categorize(suggestions: &[UnconfirmedSuggestion]) -> CategorizedSuggestions<'_> {
    let mut grouped = CategorizedSuggestions::default();
    for suggestion in suggestions {
        match suggestion.category() {
            SuggestionCategory::Completed => grouped.completed.push(suggestion),
            SuggestionCategory::PartiallyCompleted => grouped.partially_completed.push(suggestion),
            SuggestionCategory::Spam => grouped.spam.push(suggestion),
        }
    }
    grouped
}

/// Selection and accordion state for the suggestion list.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionBoard {
    selected: BTreeSet<SuggestionId>,
    expanded: bool,
    open_categories: BTreeSet<SuggestionCategory>,
}

impl Default for SuggestionBoard {
    fn default() -> Self {
        Self {
            selected: BTreeSet::new(),
            expanded: true,
            open_categories: BTreeSet::from([SuggestionCategory::Completed]),
        }
    }
}

impl SuggestionBoard {
    pub fn is_selected(&self, id: SuggestionId) -> bool {
        self.selected.contains(&id)
    }

    pub fn set_selected(&mut self, id: SuggestionId, selected: bool) {
        if selected {
            self.selected.insert(id);
        } else {
            self.selected.remove(&id);
        }
    }

    pub fn toggle_selected(&mut self, id: SuggestionId) -> bool {
        let selected = !self.is_selected(id);
        self.set_selected(id, selected);
        selected
    }

    pub fn has_selection(&self) -> bool {
        !self.selected.is_empty()
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Hands the selection to a bulk action and clears it.
    pub fn take_selected(&mut self) -> Vec<SuggestionId> {
        std::mem::take(&mut self.selected).into_iter().collect()
    }

    /// Drops selections that point at suggestions which are gone.
    pub fn retain_existing(&mut self, suggestions: &[UnconfirmedSuggestion]) {
        self.selected
            .retain(|id| suggestions.iter().any(|suggestion| suggestion.id == *id));
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn toggle_expanded(&mut self) -> bool {
        self.expanded = !self.expanded;
        self.expanded
    }

    pub fn is_category_open(&self, category: SuggestionCategory) -> bool {
        self.open_categories.contains(&category)
    }

    pub fn toggle_category(&mut self, category: SuggestionCategory) -> bool {
        if !self.open_categories.remove(&category) {
            self.open_categories.insert(category);
            return true;
        }
        false
    }
}
