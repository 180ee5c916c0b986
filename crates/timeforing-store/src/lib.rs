// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod export;
mod seed;

use anyhow::{Result, anyhow, bail};
use std::env;
use std::path::PathBuf;
use time::Date;
use timeforing_app::{
    Case, CaseFormInput, CaseId, DEFAULT_HOURLY_RATE_KRONER, DEFAULT_PAYMENT_TERMS_DAYS, Invoice,
    InvoiceId, LedgerSnapshot, MAX_HOURLY_RATE_KRONER, Nok, SuggestionId, TimeEntry,
    TimeEntryFormInput, TimeEntryId, UNKNOWN_CASE_LABEL, UnconfirmedSuggestion, clamp_hours,
    draft_invoice, total_amount,
};
use tracing::{debug, info, warn};

pub use export::{InvoiceExport, export_file_name};

pub const APP_NAME: &str = "timeforing";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillingSettings {
    pub hourly_rate: Nok,
    pub payment_terms_days: i64,
}

impl Default for BillingSettings {
    fn default() -> Self {
        Self {
            hourly_rate: Nok::from_kroner(DEFAULT_HOURLY_RATE_KRONER),
            payment_terms_days: DEFAULT_PAYMENT_TERMS_DAYS,
        }
    }
}

impl BillingSettings {
    pub fn validate(&self) -> Result<()> {
        if self.hourly_rate <= Nok::ZERO {
            bail!(
                "hourly rate must be positive, got {} øre",
                self.hourly_rate.ore()
            );
        }
        if self.hourly_rate > Nok::from_kroner(MAX_HOURLY_RATE_KRONER) {
            bail!(
                "hourly rate must be at most {MAX_HOURLY_RATE_KRONER} kroner, got {} øre",
                self.hourly_rate.ore()
            );
        }
        if self.payment_terms_days < 0 {
            bail!(
                "payment terms must be zero or more days, got {}",
                self.payment_terms_days
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct IdSequence {
    last: i64,
}

impl IdSequence {
    fn next(&mut self) -> i64 {
        self.last += 1;
        self.last
    }
}

/// Result of confirming several suggestions at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfirmOutcome {
    pub confirmed: Vec<(SuggestionId, TimeEntryId)>,
    pub skipped: Vec<(SuggestionId, String)>,
}

impl ConfirmOutcome {
    pub fn entry_ids(&self) -> Vec<TimeEntryId> {
        self.confirmed.iter().map(|(_, entry_id)| *entry_id).collect()
    }
}

/// Owns every collection; all changes go through its methods.
#[derive(Debug, Clone, Default)]
pub struct Store {
    cases: Vec<Case>,
    entries: Vec<TimeEntry>,
    suggestions: Vec<UnconfirmedSuggestion>,
    invoices: Vec<Invoice>,
    ids: IdSequence,
    settings: BillingSettings,
}

impl Store {
    pub fn new(settings: BillingSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            ..Self::default()
        })
    }

    pub fn settings(&self) -> BillingSettings {
        self.settings
    }

    pub fn hourly_rate(&self) -> Nok {
        self.settings.hourly_rate
    }

    pub fn cases(&self) -> &[Case] {
        &self.cases
    }

    pub fn entries(&self) -> &[TimeEntry] {
        &self.entries
    }

    pub fn suggestions(&self) -> &[UnconfirmedSuggestion] {
        &self.suggestions
    }

    pub fn invoices(&self) -> &[Invoice] {
        &self.invoices
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            cases: self.cases.clone(),
            entries: self.entries.clone(),
            suggestions: self.suggestions.clone(),
            invoices: self.invoices.clone(),
            hourly_rate: self.settings.hourly_rate,
        }
    }

    pub fn case(&self, case_id: CaseId) -> Option<&Case> {
        self.cases.iter().find(|case| case.id == case_id)
    }

    pub fn case_label(&self, case_id: CaseId) -> &str {
        self.case(case_id)
            .map_or(UNKNOWN_CASE_LABEL, |case| case.name.as_str())
    }

    pub fn add_case(&mut self, input: &CaseFormInput) -> Result<CaseId> {
        input.validate()?;
        let id = CaseId::new(self.ids.next());
        self.cases.push(Case {
            id,
            name: input.name.trim().to_owned(),
            case_number: input.case_number.trim().to_owned(),
            client_name: input.client_name.trim().to_owned(),
        });
        info!(case_id = id.get(), case_number = %input.case_number.trim(), "case added");
        Ok(id)
    }

    /// Validates the form and appends the entry. Nothing is saved on failure.
    pub fn create_entry(&mut self, input: &TimeEntryFormInput) -> Result<TimeEntryId> {
        if let Err(errors) = input.validate() {
            warn!(%errors, "time entry rejected");
            return Err(errors.into());
        }
        let case_id = input
            .case_id
            .ok_or_else(|| anyhow!("time entry is missing its case"))?;
        let id = TimeEntryId::new(self.ids.next());
        self.entries.push(TimeEntry {
            id,
            case_id,
            date: input.date,
            hours: clamp_hours(input.hours),
            description: input.description.clone(),
            activity_type: input.activity_type.clone(),
            billable: input.billable,
            from_suggestion: false,
        });
        info!(entry_id = id.get(), case_id = case_id.get(), "time entry created");
        Ok(id)
    }

    pub fn update_entry(&mut self, entry: TimeEntry) -> Result<()> {
        let Some(slot) = self.entries.iter_mut().find(|existing| existing.id == entry.id) else {
            warn!(entry_id = entry.id.get(), "update of unknown time entry");
            bail!("time entry {} not found -- it may have been deleted", entry.id);
        };
        debug!(entry_id = entry.id.get(), "time entry updated");
        *slot = entry;
        Ok(())
    }

    pub fn delete_entry(&mut self, entry_id: TimeEntryId) -> Result<TimeEntry> {
        let Some(index) = self.entries.iter().position(|entry| entry.id == entry_id) else {
            warn!(entry_id = entry_id.get(), "delete of unknown time entry");
            bail!("time entry {entry_id} not found -- it may already be deleted");
        };
        info!(entry_id = entry_id.get(), "time entry deleted");
        Ok(self.entries.remove(index))
    }

    pub fn update_suggestion(&mut self, suggestion: UnconfirmedSuggestion) -> Result<()> {
        let Some(slot) = self
            .suggestions
            .iter_mut()
            .find(|existing| existing.id == suggestion.id)
        else {
            warn!(suggestion_id = suggestion.id.get(), "update of unknown suggestion");
            bail!(
                "suggestion {} not found -- it may have been confirmed or deleted",
                suggestion.id
            );
        };
        debug!(
            suggestion_id = suggestion.id.get(),
            category = suggestion.category().as_str(),
            "suggestion updated"
        );
        *slot = suggestion;
        Ok(())
    }

    pub fn delete_suggestion(&mut self, suggestion_id: SuggestionId) -> Result<()> {
        let Some(index) = self
            .suggestions
            .iter()
            .position(|suggestion| suggestion.id == suggestion_id)
        else {
            warn!(suggestion_id = suggestion_id.get(), "delete of unknown suggestion");
            bail!("suggestion {suggestion_id} not found -- it may already be gone");
        };
        self.suggestions.remove(index);
        info!(suggestion_id = suggestion_id.get(), "suggestion deleted");
        Ok(())
    }

    /// Turns a suggestion into a billable entry and drops the suggestion. Spam and
    /// suggestions without a case are refused.
    pub fn confirm_suggestion(&mut self, suggestion_id: SuggestionId) -> Result<TimeEntryId> {
        let Some(index) = self
            .suggestions
            .iter()
            .position(|suggestion| suggestion.id == suggestion_id)
        else {
            warn!(suggestion_id = suggestion_id.get(), "confirm of unknown suggestion");
            bail!("suggestion {suggestion_id} not found -- it may already be confirmed");
        };

        let suggestion = &self.suggestions[index];
        if !suggestion.category().is_confirmable() {
            warn!(suggestion_id = suggestion_id.get(), "confirm of spam suggestion");
            bail!("suggestion {suggestion_id} is empty and cannot be confirmed -- delete it");
        }
        let Some(case_id) = suggestion.case_id else {
            warn!(suggestion_id = suggestion_id.get(), "confirm of suggestion without case");
            bail!("suggestion {suggestion_id} has no case -- pick a case before confirming");
        };

        let suggestion = self.suggestions.remove(index);
        let id = TimeEntryId::new(self.ids.next());
        self.entries.push(TimeEntry {
            id,
            case_id,
            date: suggestion.date,
            hours: clamp_hours(suggestion.hours),
            description: suggestion.description,
            activity_type: suggestion.activity_type,
            billable: true,
            from_suggestion: true,
        });
        info!(
            suggestion_id = suggestion_id.get(),
            entry_id = id.get(),
            "suggestion confirmed"
        );
        Ok(id)
    }

    /// Confirms each id independently; refusals are collected, not fatal.
    pub fn confirm_suggestions(&mut self, suggestion_ids: &[SuggestionId]) -> ConfirmOutcome {
        let mut outcome = ConfirmOutcome::default();
        for suggestion_id in suggestion_ids {
            match self.confirm_suggestion(*suggestion_id) {
                Ok(entry_id) => outcome.confirmed.push((*suggestion_id, entry_id)),
                Err(error) => outcome.skipped.push((*suggestion_id, error.to_string())),
            }
        }
        info!(
            confirmed = outcome.confirmed.len(),
            skipped = outcome.skipped.len(),
            "bulk confirm finished"
        );
        outcome
    }

    pub fn create_invoice(&mut self, case_id: CaseId, date: Date) -> Result<InvoiceId> {
        if self.case(case_id).is_none() {
            warn!(case_id = case_id.get(), "invoice for unknown case");
            bail!("case {case_id} not found -- pick an existing case to invoice");
        }
        let amount = total_amount(&self.entries, case_id, self.settings.hourly_rate);
        let id = InvoiceId::new(self.ids.next());
        let invoice = draft_invoice(
            id,
            case_id,
            amount,
            date,
            self.settings.payment_terms_days,
            &self.invoices,
        );
        info!(
            invoice_id = id.get(),
            invoice_number = %invoice.invoice_number,
            amount_ore = amount.ore(),
            "invoice drafted"
        );
        self.invoices.push(invoice);
        Ok(id)
    }

    pub fn invoice(&self, invoice_id: InvoiceId) -> Option<&Invoice> {
        self.invoices.iter().find(|invoice| invoice.id == invoice_id)
    }

    pub fn approve_invoice(&mut self, invoice_id: InvoiceId) -> Result<()> {
        let Some(invoice) = self
            .invoices
            .iter_mut()
            .find(|invoice| invoice.id == invoice_id)
        else {
            bail!("invoice {invoice_id} not found");
        };
        if let Err(error) = invoice.approve() {
            warn!(invoice_id = invoice_id.get(), %error, "approve refused");
            return Err(error);
        }
        info!(
            invoice_id = invoice_id.get(),
            invoice_number = %invoice.invoice_number,
            "invoice sent"
        );
        Ok(())
    }

    pub fn delete_invoice(&mut self, invoice_id: InvoiceId) -> Result<()> {
        let Some(index) = self
            .invoices
            .iter()
            .position(|invoice| invoice.id == invoice_id)
        else {
            bail!("invoice {invoice_id} not found");
        };
        if let Err(error) = self.invoices[index].ensure_deletable() {
            warn!(invoice_id = invoice_id.get(), %error, "delete refused");
            return Err(error);
        }
        let invoice = self.invoices.remove(index);
        info!(
            invoice_id = invoice_id.get(),
            invoice_number = %invoice.invoice_number,
            "draft invoice deleted"
        );
        Ok(())
    }
}

/// Where invoice downloads land unless the config says otherwise.
pub fn default_export_dir() -> Result<PathBuf> {
    if let Some(override_dir) = env::var_os("TIMEFORING_EXPORT_DIR") {
        return Ok(PathBuf::from(override_dir));
    }
    let root = dirs::document_dir()
        .or_else(dirs::data_local_dir)
        .ok_or_else(|| {
            anyhow!("cannot resolve documents directory; set [export].dir in the config file")
        })?;
    Ok(root.join(APP_NAME).join("fakturaer"))
}

/// Log file location; the terminal belongs to the UI.
pub fn default_log_path() -> Result<PathBuf> {
    let root = dirs::state_dir()
        .or_else(dirs::cache_dir)
        .ok_or_else(|| anyhow!("cannot resolve log directory; set [log].path in the config file"))?;
    Ok(root.join(APP_NAME).join("timeforing.log"))
}
