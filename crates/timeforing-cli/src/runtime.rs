// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use std::path::PathBuf;
use time::Date;
use timeforing_app::{
    CaseId, FormPayload, InvoiceId, LedgerSnapshot, SuggestionId, TimeEntry, TimeEntryId,
    UnconfirmedSuggestion,
};
use timeforing_store::Store;
use timeforing_tui::{ConfirmSummary, FormSubmission};

pub struct StoreRuntime<'a> {
    store: &'a mut Store,
    export_dir: PathBuf,
}

impl<'a> StoreRuntime<'a> {
    pub fn new(store: &'a mut Store, export_dir: PathBuf) -> Self {
        Self { store, export_dir }
    }
}

impl timeforing_tui::AppRuntime for StoreRuntime<'_> {
    fn load_snapshot(&mut self) -> Result<LedgerSnapshot> {
        Ok(self.store.snapshot())
    }

    fn submit_form(&mut self, payload: &FormPayload) -> Result<FormSubmission> {
        payload.validate()?;

        match payload {
            FormPayload::TimeEntry(form) => {
                let entry_id = self.store.create_entry(form)?;
                Ok(FormSubmission::TimeEntry(entry_id))
            }
            FormPayload::Case(form) => {
                let case_id = self.store.add_case(form)?;
                Ok(FormSubmission::Case(case_id))
            }
        }
    }

    fn update_entry(&mut self, entry: TimeEntry) -> Result<()> {
        self.store.update_entry(entry)
    }

    fn delete_entry(&mut self, entry_id: TimeEntryId) -> Result<()> {
        self.store.delete_entry(entry_id).map(|_| ())
    }

    fn update_suggestion(&mut self, suggestion: UnconfirmedSuggestion) -> Result<()> {
        self.store.update_suggestion(suggestion)
    }

    fn delete_suggestion(&mut self, suggestion_id: SuggestionId) -> Result<()> {
        self.store.delete_suggestion(suggestion_id)
    }

    fn confirm_suggestions(&mut self, suggestion_ids: &[SuggestionId]) -> Result<ConfirmSummary> {
        let outcome = self.store.confirm_suggestions(suggestion_ids);
        Ok(ConfirmSummary {
            entry_ids: outcome.entry_ids(),
            skipped: outcome
                .skipped
                .into_iter()
                .map(|(_, reason)| reason)
                .collect(),
        })
    }

    fn create_invoice(&mut self, case_id: CaseId, date: Date) -> Result<InvoiceId> {
        self.store.create_invoice(case_id, date)
    }

    fn approve_invoice(&mut self, invoice_id: InvoiceId) -> Result<()> {
        self.store.approve_invoice(invoice_id)
    }

    fn delete_invoice(&mut self, invoice_id: InvoiceId) -> Result<()> {
        self.store.delete_invoice(invoice_id)
    }

    fn export_invoice(&mut self, invoice_id: InvoiceId) -> Result<PathBuf> {
        self.store.export_invoice(invoice_id, &self.export_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::StoreRuntime;
    use anyhow::Result;
    use timeforing_app::{
        CaseFormInput, FormPayload, InvoiceStatus, SuggestionCategory, TimeEntryFormInput,
    };
    use timeforing_store::{BillingSettings, Store};
    use timeforing_testkit::{LedgerFaker, fixture_today, fixture_week_start, temp_export_dir};
    use timeforing_tui::{AppRuntime, FormSubmission};

    fn seeded_store() -> Result<Store> {
        let mut store = Store::new(BillingSettings::default())?;
        store.seed_demo_data(fixture_today())?;
        Ok(store)
    }

    #[test]
    fn submit_form_creates_case_then_entry() -> Result<()> {
        let mut store = Store::new(BillingSettings::default())?;
        let (_dir, export_dir) = temp_export_dir()?;
        let mut runtime = StoreRuntime::new(&mut store, export_dir);

        let mut faker = LedgerFaker::new(7);
        let FormSubmission::Case(case_id) =
            runtime.submit_form(&FormPayload::Case(faker.case_input()))?
        else {
            panic!("case form should create a case");
        };
        let submission = runtime.submit_form(&FormPayload::TimeEntry(
            faker.entry_input(case_id, fixture_week_start()),
        ))?;
        assert!(matches!(submission, FormSubmission::TimeEntry(_)));

        let snapshot = runtime.load_snapshot()?;
        assert_eq!(snapshot.cases.len(), 1);
        assert_eq!(snapshot.entries.len(), 1);
        assert_eq!(snapshot.entries[0].case_id, case_id);
        Ok(())
    }

    #[test]
    fn invalid_forms_are_rejected_without_changes() -> Result<()> {
        let mut store = Store::new(BillingSettings::default())?;
        let (_dir, export_dir) = temp_export_dir()?;
        let mut runtime = StoreRuntime::new(&mut store, export_dir);

        assert!(
            runtime
                .submit_form(&FormPayload::Case(CaseFormInput::default()))
                .is_err()
        );
        assert!(
            runtime
                .submit_form(&FormPayload::TimeEntry(TimeEntryFormInput::blank(
                    fixture_today()
                )))
                .is_err()
        );
        let snapshot = runtime.load_snapshot()?;
        assert!(snapshot.cases.is_empty());
        assert!(snapshot.entries.is_empty());
        Ok(())
    }

    #[test]
    fn confirm_reports_entries_and_skipped_reasons() -> Result<()> {
        let mut store = seeded_store()?;
        let snapshot = store.snapshot();
        let completed = snapshot
            .suggestions
            .iter()
            .find(|suggestion| suggestion.category() == SuggestionCategory::Completed)
            .map(|suggestion| suggestion.id)
            .ok_or_else(|| anyhow::anyhow!("demo data has a completed suggestion"))?;
        let spam = snapshot
            .suggestions
            .iter()
            .find(|suggestion| suggestion.category() == SuggestionCategory::Spam)
            .map(|suggestion| suggestion.id)
            .ok_or_else(|| anyhow::anyhow!("demo data has a spam suggestion"))?;

        let (_dir, export_dir) = temp_export_dir()?;
        let mut runtime = StoreRuntime::new(&mut store, export_dir);
        let summary = runtime.confirm_suggestions(&[completed, spam])?;
        assert_eq!(summary.entry_ids.len(), 1);
        assert_eq!(summary.skipped.len(), 1);

        let after = runtime.load_snapshot()?;
        assert_eq!(after.entries.len(), snapshot.entries.len() + 1);
        assert!(after.suggestions.iter().all(|suggestion| suggestion.id != completed));
        assert!(after.suggestions.iter().any(|suggestion| suggestion.id == spam));
        Ok(())
    }

    #[test]
    fn invoice_lifecycle_exports_into_configured_dir() -> Result<()> {
        let mut store = seeded_store()?;
        let case_id = store.cases()[0].id;
        let (_dir, export_dir) = temp_export_dir()?;
        let mut runtime = StoreRuntime::new(&mut store, export_dir.clone());

        let invoice_id = runtime.create_invoice(case_id, fixture_today())?;
        let path = runtime.export_invoice(invoice_id)?;
        assert!(path.starts_with(&export_dir));
        assert!(path.exists());

        runtime.approve_invoice(invoice_id)?;
        let snapshot = runtime.load_snapshot()?;
        let invoice = snapshot
            .invoices
            .iter()
            .find(|invoice| invoice.id == invoice_id)
            .ok_or_else(|| anyhow::anyhow!("invoice should exist"))?;
        assert_eq!(invoice.status, InvoiceStatus::Sent);

        let error = runtime
            .delete_invoice(invoice_id)
            .expect_err("sent invoices cannot be deleted");
        assert!(!error.to_string().is_empty());
        Ok(())
    }

    #[test]
    fn delete_entry_drops_it_from_snapshot() -> Result<()> {
        let mut store = seeded_store()?;
        let entry_id = store.entries()[0].id;
        let (_dir, export_dir) = temp_export_dir()?;
        let mut runtime = StoreRuntime::new(&mut store, export_dir);

        runtime.delete_entry(entry_id)?;
        assert!(
            runtime
                .load_snapshot()?
                .entries
                .iter()
                .all(|entry| entry.id != entry_id)
        );
        assert!(runtime.delete_entry(entry_id).is_err());
        Ok(())
    }
}
