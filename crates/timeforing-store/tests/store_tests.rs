// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use time::{Duration, Month};
use timeforing_app::{
    CaseFormErrors, CaseFormInput, CaseId, InvoiceStatus, Nok, SuggestionCategory, SuggestionId,
    TimeEntryFormErrors, TimeEntryFormInput, UnconfirmedSuggestion, categorize,
};
use timeforing_store::{BillingSettings, InvoiceExport, Store, export_file_name};
use timeforing_testkit::{LedgerFaker, fixture_today, fixture_week_start, temp_export_dir};

fn store_with_case() -> Result<(Store, CaseId)> {
    let mut store = Store::new(BillingSettings::default())?;
    let case_id = store.add_case(&CaseFormInput {
        name: "Drap".to_owned(),
        case_number: "sak 9".to_owned(),
        client_name: "Per Gunnar".to_owned(),
    })?;
    Ok((store, case_id))
}

fn entry_input(case_id: CaseId, hours: f64, billable: bool) -> TimeEntryFormInput {
    TimeEntryFormInput {
        case_id: Some(case_id),
        hours,
        description: "Møte med klient".to_owned(),
        activity_type: "Juridisk bistand".to_owned(),
        billable,
        ..TimeEntryFormInput::blank(fixture_today())
    }
}

fn suggestion(
    id: i64,
    case_id: Option<CaseId>,
    activity: &str,
    description: &str,
    hours: f64,
) -> UnconfirmedSuggestion {
    UnconfirmedSuggestion {
        id: SuggestionId::new(id),
        case_id,
        activity_type: activity.to_owned(),
        description: description.to_owned(),
        hours,
        date: fixture_today(),
        confirmed: false,
        important: false,
    }
}

#[test]
fn demo_data_matches_documented_shape() -> Result<()> {
    let mut store = Store::new(BillingSettings::default())?;
    store.seed_demo_data(fixture_today())?;

    assert_eq!(store.cases().len(), 6);
    assert_eq!(store.entries().len(), 19);
    assert_eq!(store.suggestions().len(), 13);
    assert_eq!(store.invoices().len(), 4);

    let grouped = categorize(store.suggestions());
    assert_eq!(grouped.completed.len(), 5);
    assert_eq!(grouped.partially_completed.len(), 4);
    assert_eq!(grouped.spam.len(), 4);

    let monday = fixture_week_start();
    let sunday = monday + Duration::days(6);
    assert!(
        store
            .entries()
            .iter()
            .all(|entry| monday <= entry.date && entry.date <= sunday)
    );
    assert_eq!(
        store.entries().iter().filter(|entry| !entry.billable).count(),
        1
    );
    Ok(())
}

#[test]
fn demo_invoices_keep_their_statuses() -> Result<()> {
    let mut store = Store::new(BillingSettings::default())?;
    store.seed_demo_data(fixture_today())?;

    let statuses: Vec<InvoiceStatus> = store.invoices().iter().map(|i| i.status).collect();
    assert_eq!(
        statuses,
        vec![
            InvoiceStatus::Paid,
            InvoiceStatus::Sent,
            InvoiceStatus::Draft,
            InvoiceStatus::Overdue,
        ]
    );
    assert_eq!(store.invoices()[0].amount, Nok::from_kroner(25_000));
    assert_eq!(store.invoices()[0].date.month(), Month::February);
    Ok(())
}

#[test]
fn ids_are_unique_across_rapid_creates() -> Result<()> {
    let (mut store, case_id) = store_with_case()?;
    let first = store.create_entry(&entry_input(case_id, 1.0, true))?;
    let second = store.create_entry(&entry_input(case_id, 1.0, true))?;
    assert_ne!(first, second);
    assert_eq!(store.entries().len(), 2);
    Ok(())
}

#[test]
fn invalid_entry_reports_field_errors_and_saves_nothing() -> Result<()> {
    let (mut store, _) = store_with_case()?;
    let error = store
        .create_entry(&TimeEntryFormInput::blank(fixture_today()))
        .expect_err("blank entry should fail");
    let errors = error
        .downcast_ref::<TimeEntryFormErrors>()
        .expect("typed form errors");
    assert_eq!(
        errors.messages(),
        vec![
            "Vennligst velg en sak",
            "Vennligst velg en aktivitetstype",
            "Vennligst skriv en beskrivelse",
        ]
    );
    assert!(store.entries().is_empty());
    Ok(())
}

#[test]
fn created_entry_hours_stay_in_range() -> Result<()> {
    let (mut store, case_id) = store_with_case()?;
    store.create_entry(&entry_input(case_id, 30.0, true))?;
    store.create_entry(&entry_input(case_id, 0.0, true))?;
    let hours: Vec<f64> = store.entries().iter().map(|entry| entry.hours).collect();
    assert_eq!(hours, vec![24.0, 0.25]);
    Ok(())
}

#[test]
fn update_and_delete_require_known_ids() -> Result<()> {
    let (mut store, case_id) = store_with_case()?;
    let id = store.create_entry(&entry_input(case_id, 2.0, true))?;

    let mut entry = store.entries()[0].clone();
    entry.description = "Oppdatert".to_owned();
    store.update_entry(entry.clone())?;
    assert_eq!(store.entries()[0].description, "Oppdatert");

    let removed = store.delete_entry(id)?;
    assert_eq!(removed.id, id);
    assert!(store.entries().is_empty());

    let error = store.update_entry(entry).expect_err("entry is gone");
    assert!(error.to_string().contains("not found"));
    assert!(store.delete_entry(id).is_err());
    Ok(())
}

#[test]
fn add_case_trims_and_validates() -> Result<()> {
    let (mut store, _) = store_with_case()?;
    let id = store.add_case(&CaseFormInput {
        name: "  Arv ".to_owned(),
        case_number: "sak 50".to_owned(),
        client_name: "Ola Nordmann".to_owned(),
    })?;
    assert_eq!(store.case_label(id), "Arv");

    let error = store
        .add_case(&CaseFormInput::default())
        .expect_err("blank case should fail");
    assert!(error.downcast_ref::<CaseFormErrors>().is_some());
    assert_eq!(store.cases().len(), 2);
    Ok(())
}

#[test]
fn dangling_case_renders_fallback_label() -> Result<()> {
    let (store, _) = store_with_case()?;
    assert_eq!(store.case_label(CaseId::new(999)), "Ukjent sak");
    Ok(())
}

#[test]
fn confirming_completed_suggestion_creates_billable_entry() -> Result<()> {
    let mut store = Store::new(BillingSettings::default())?;
    store.seed_demo_data(fixture_today())?;
    let case_id = store.cases()[0].id;
    let target = store
        .suggestions()
        .iter()
        .find(|s| s.activity_type == "Reisetid")
        .map(|s| s.id)
        .expect("seeded travel suggestion");

    let mut edited = store
        .suggestions()
        .iter()
        .find(|s| s.id == target)
        .cloned()
        .expect("suggestion");
    edited.hours = 2.0;
    edited.description = "X".to_owned();
    store.update_suggestion(edited)?;

    let entries_before = store.entries().len();
    let entry_id = store.confirm_suggestion(target)?;

    assert!(store.suggestions().iter().all(|s| s.id != target));
    assert_eq!(store.entries().len(), entries_before + 1);
    let entry = store
        .entries()
        .iter()
        .find(|entry| entry.id == entry_id)
        .expect("new entry");
    assert!(entry.billable);
    assert!(entry.from_suggestion);
    assert_eq!(entry.activity_type, "Reisetid");
    assert_eq!(entry.case_id, case_id);
    assert_eq!(entry.hours, 2.0);
    assert_eq!(entry.description, "X");
    Ok(())
}

#[test]
fn partial_suggestion_with_case_confirms_into_entry() -> Result<()> {
    let mut store = Store::new(BillingSettings::default())?;
    store.seed_demo_data(fixture_today())?;
    let partial = categorize(store.suggestions()).partially_completed[0].clone();
    assert!(partial.case_id.is_some());
    assert!(partial.activity_type.is_empty());
    let before = store.entries().len();

    let entry_id = store.confirm_suggestion(partial.id)?;
    let entry = store
        .entries()
        .iter()
        .find(|entry| entry.id == entry_id)
        .expect("new entry");
    assert_eq!(Some(entry.case_id), partial.case_id);
    assert_eq!(entry.description, partial.description);
    assert_eq!(entry.hours, 5.0);
    assert!(entry.activity_type.is_empty());
    assert!(entry.billable);
    assert!(entry.from_suggestion);
    assert_eq!(store.entries().len(), before + 1);
    assert!(store.suggestions().iter().all(|s| s.id != partial.id));
    Ok(())
}

#[test]
fn zero_hour_partial_suggestion_confirms_with_minimum_hours() -> Result<()> {
    let mut store = Store::new(BillingSettings::default())?;
    store.seed_demo_data(fixture_today())?;
    let zero_hours = store
        .suggestions()
        .iter()
        .find(|s| s.case_id.is_some() && s.hours == 0.0)
        .map(|s| s.id)
        .expect("seeded zero-hour suggestion");

    let entry_id = store.confirm_suggestion(zero_hours)?;
    let entry = store
        .entries()
        .iter()
        .find(|entry| entry.id == entry_id)
        .expect("new entry");
    assert_eq!(entry.hours, 0.25);
    Ok(())
}

#[test]
fn suggestions_without_case_and_spam_are_not_confirmed() -> Result<()> {
    let mut store = Store::new(BillingSettings::default())?;
    store.seed_demo_data(fixture_today())?;
    let grouped = categorize(store.suggestions());
    let caseless = grouped
        .partially_completed
        .iter()
        .find(|s| s.case_id.is_none())
        .map(|s| s.id)
        .expect("seeded partial suggestion without case");
    let spam = grouped.spam[0].id;
    let before = store.entries().len();

    let error = store
        .confirm_suggestion(caseless)
        .expect_err("suggestion without case should be refused");
    assert!(error.to_string().contains("has no case"));
    let error = store
        .confirm_suggestion(spam)
        .expect_err("spam suggestion should be refused");
    assert!(error.to_string().contains("delete it"));

    assert_eq!(store.entries().len(), before);
    assert_eq!(store.suggestions().len(), 13);
    Ok(())
}

#[test]
fn bulk_confirm_reports_confirmed_and_skipped() -> Result<()> {
    let mut store = Store::new(BillingSettings::default())?;
    store.seed_demo_data(fixture_today())?;
    let grouped = categorize(store.suggestions());
    let mut ids: Vec<SuggestionId> = grouped.completed.iter().map(|s| s.id).collect();
    ids.push(grouped.spam[0].id);
    ids.push(SuggestionId::new(10_000));

    let outcome = store.confirm_suggestions(&ids);
    assert_eq!(outcome.confirmed.len(), 5);
    assert_eq!(outcome.skipped.len(), 2);
    assert_eq!(outcome.entry_ids().len(), 5);
    assert_eq!(store.entries().len(), 24);
    assert_eq!(
        categorize(store.suggestions())
            .get(SuggestionCategory::Completed)
            .len(),
        0
    );
    Ok(())
}

#[test]
fn confirmed_hours_are_clamped() -> Result<()> {
    let mut store = Store::new(BillingSettings::default())?;
    store.seed_demo_data(fixture_today())?;
    let mut tiny = store.suggestions()[0].clone();
    tiny.hours = 0.1;
    let id = tiny.id;
    store.update_suggestion(tiny)?;

    let entry_id = store.confirm_suggestion(id)?;
    let entry = store
        .entries()
        .iter()
        .find(|entry| entry.id == entry_id)
        .expect("new entry");
    assert_eq!(entry.hours, 0.25);
    Ok(())
}

#[test]
fn suggestion_update_and_delete_require_known_ids() -> Result<()> {
    let (mut store, case_id) = store_with_case()?;
    let missing = suggestion(77, Some(case_id), "Admin", "Notat", 1.0);
    assert!(store.update_suggestion(missing).is_err());
    assert!(store.delete_suggestion(SuggestionId::new(77)).is_err());

    store.seed_demo_data(fixture_today())?;
    let id = store.suggestions()[12].id;
    store.delete_suggestion(id)?;
    assert_eq!(store.suggestions().len(), 12);
    Ok(())
}

#[test]
fn invoice_for_five_billable_hours() -> Result<()> {
    let (mut store, case_id) = store_with_case()?;
    store.create_entry(&entry_input(case_id, 5.0, true))?;
    store.create_entry(&entry_input(case_id, 3.0, false))?;

    let date = fixture_today();
    let invoice_id = store.create_invoice(case_id, date)?;
    let invoice = store.invoice(invoice_id).expect("invoice");
    assert_eq!(invoice.amount, Nok::from_kroner(7500));
    assert_eq!(invoice.status, InvoiceStatus::Draft);
    assert_eq!(invoice.due_date, date + Duration::days(30));
    assert_eq!(invoice.invoice_number, "F-2026-001");
    Ok(())
}

#[test]
fn invoice_uses_configured_rate_and_terms() -> Result<()> {
    let mut store = Store::new(BillingSettings {
        hourly_rate: Nok::from_kroner(2000),
        payment_terms_days: 14,
    })?;
    let case_id = store.add_case(&CaseFormInput {
        name: "Arv".to_owned(),
        case_number: "sak 1".to_owned(),
        client_name: "Kari".to_owned(),
    })?;
    store.create_entry(&entry_input(case_id, 1.5, true))?;
    let invoice_id = store.create_invoice(case_id, fixture_today())?;
    let invoice = store.invoice(invoice_id).expect("invoice");
    assert_eq!(invoice.amount, Nok::from_kroner(3000));
    assert_eq!(invoice.due_date, fixture_today() + Duration::days(14));
    Ok(())
}

#[test]
fn invoice_for_unknown_case_is_refused() -> Result<()> {
    let (mut store, _) = store_with_case()?;
    let error = store
        .create_invoice(CaseId::new(404), fixture_today())
        .expect_err("unknown case should fail");
    assert!(error.to_string().contains("not found"));
    assert!(store.invoices().is_empty());
    Ok(())
}

#[test]
fn invoice_lifecycle_only_moves_drafts() -> Result<()> {
    let (mut store, case_id) = store_with_case()?;
    store.create_entry(&entry_input(case_id, 2.0, true))?;
    let sent = store.create_invoice(case_id, fixture_today())?;
    let draft = store.create_invoice(case_id, fixture_today())?;
    assert_eq!(
        store.invoice(draft).map(|i| i.invoice_number.as_str()),
        Some("F-2026-002")
    );

    store.approve_invoice(sent)?;
    assert_eq!(store.invoice(sent).map(|i| i.status), Some(InvoiceStatus::Sent));
    assert!(store.approve_invoice(sent).is_err());
    assert!(store.delete_invoice(sent).is_err());

    store.delete_invoice(draft)?;
    assert!(store.invoice(draft).is_none());
    assert_eq!(store.invoices().len(), 1);
    Ok(())
}

#[test]
fn seeded_settled_invoices_cannot_be_deleted() -> Result<()> {
    let mut store = Store::new(BillingSettings::default())?;
    store.seed_demo_data(fixture_today())?;
    for invoice in store.invoices().to_vec() {
        let result = store.delete_invoice(invoice.id);
        assert_eq!(result.is_ok(), invoice.status == InvoiceStatus::Draft);
    }
    assert_eq!(store.invoices().len(), 3);
    Ok(())
}

#[test]
fn export_writes_invoice_json() -> Result<()> {
    let (mut store, case_id) = store_with_case()?;
    store.create_entry(&entry_input(case_id, 2.0, true))?;
    store.create_entry(&entry_input(case_id, 1.0, false))?;
    let invoice_id = store.create_invoice(case_id, fixture_today())?;

    let (_dir, export_dir) = temp_export_dir()?;
    let path = store.export_invoice(invoice_id, &export_dir)?;
    assert!(path.starts_with(&export_dir));
    assert_eq!(
        path.file_name().and_then(|name| name.to_str()),
        Some("faktura-F-2026-001.json")
    );

    let contents = std::fs::read_to_string(&path)?;
    let export: InvoiceExport = serde_json::from_str(&contents)?;
    assert_eq!(export.invoice.id, invoice_id);
    assert_eq!(export.entries.len(), 1);
    assert_eq!(export.billable_hours, 2.0);
    assert_eq!(export.case.map(|case| case.name), Some("Drap".to_owned()));
    Ok(())
}

#[test]
fn export_of_unknown_invoice_fails() -> Result<()> {
    let (store, _) = store_with_case()?;
    let (_dir, export_dir) = temp_export_dir()?;
    let error = store
        .export_invoice(timeforing_app::InvoiceId::new(5), &export_dir)
        .expect_err("unknown invoice");
    assert!(error.to_string().contains("not found"));
    assert!(!export_dir.exists());
    Ok(())
}

#[test]
fn export_file_name_is_filesystem_safe() -> Result<()> {
    let (mut store, case_id) = store_with_case()?;
    let invoice_id = store.create_invoice(case_id, fixture_today())?;
    let mut invoice = store.invoice(invoice_id).cloned().expect("invoice");
    invoice.invoice_number = "F/2026 001".to_owned();
    assert_eq!(export_file_name(&invoice), "faktura-F_2026_001.json");
    Ok(())
}

#[test]
fn faker_entries_always_validate_in_store() -> Result<()> {
    let (mut store, case_id) = store_with_case()?;
    let mut faker = LedgerFaker::new(11);
    for _ in 0..25 {
        store.create_entry(&faker.entry_input(case_id, fixture_week_start()))?;
    }
    assert_eq!(store.entries().len(), 25);
    let snapshot = store.snapshot();
    assert_eq!(snapshot.entries.len(), 25);
    assert_eq!(snapshot.hourly_rate, Nok::from_kroner(1500));
    Ok(())
}
