// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::Date;
use timeforing_app::{
    BillingView, LedgerSnapshot, SuggestionCategory, case_week_total, categorize, day_total,
    entries_on, format_currency, format_date, format_day_month, format_hours, week_dates,
    week_total, weekday_label,
};

const COLUMN_GAP: &str = "  ";

/// Plain-text report of the week around `today`, the suggestion backlog and billing.
pub fn render_summary(snapshot: &LedgerSnapshot, today: Date) -> String {
    let mut lines = Vec::new();
    lines.extend(week_section(snapshot, today));
    lines.push(String::new());
    lines.extend(suggestion_section(snapshot));
    lines.push(String::new());
    lines.extend(billing_section(snapshot, today));
    lines.push(String::new());
    lines.extend(invoice_section(snapshot, today));
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

fn hours_or_dash(hours: f64) -> String {
    if hours > 0.0 {
        format_hours(hours)
    } else {
        "-".to_owned()
    }
}

fn week_section(snapshot: &LedgerSnapshot, today: Date) -> Vec<String> {
    let days = week_dates(today);
    let mut header = vec!["Sak".to_owned()];
    header.extend(
        days.iter()
            .map(|day| format!("{} {}", weekday_label(day.weekday()), format_day_month(*day))),
    );
    header.push("Sum".to_owned());

    let mut rows = vec![header];
    for case in &snapshot.cases {
        let mut row = vec![case.name.clone()];
        row.extend(days.iter().map(|day| {
            let hours = entries_on(&snapshot.entries, case.id, *day)
                .iter()
                .fold(0.0, |sum, entry| sum + entry.hours);
            hours_or_dash(hours)
        }));
        row.push(hours_or_dash(case_week_total(&snapshot.entries, case.id, today)));
        rows.push(row);
    }

    let mut totals = vec!["Sum".to_owned()];
    totals.extend(
        days.iter()
            .map(|day| hours_or_dash(day_total(&snapshot.entries, *day))),
    );
    totals.push(hours_or_dash(week_total(&snapshot.entries, today)));
    rows.push(totals);

    let mut lines = vec![format!(
        "uke {} ({} - {})",
        today.iso_week(),
        format_date(days[0]),
        format_date(days[6])
    )];
    lines.extend(align_columns(&rows));
    lines
}

fn suggestion_section(snapshot: &LedgerSnapshot) -> Vec<String> {
    let grouped = categorize(&snapshot.suggestions);
    let mut lines = vec![format!("Forslag ({})", grouped.len())];
    lines.extend(
        SuggestionCategory::ALL
            .into_iter()
            .map(|category| format!("  {}: {}", category.label(), grouped.get(category).len())),
    );
    lines
}

fn billing_section(snapshot: &LedgerSnapshot, today: Date) -> Vec<String> {
    let case_rows = BillingView::default().case_rows(snapshot, today);
    let mut lines = vec![format!(
        "Fakturagrunnlag (timepris {})",
        format_currency(snapshot.hourly_rate)
    )];
    if case_rows.is_empty() {
        lines.push("  ingen fakturerbare timer".to_owned());
        return lines;
    }

    let mut rows = vec![vec![
        "Sak".to_owned(),
        "Klient".to_owned(),
        "Timer".to_owned(),
        "Beløp".to_owned(),
    ]];
    rows.extend(case_rows.iter().map(|row| {
        vec![
            format!("{} ({})", row.case_name, row.case_number),
            row.client_name.clone(),
            format_hours(row.hours),
            format_currency(row.amount),
        ]
    }));
    lines.extend(align_columns(&rows).into_iter().map(|line| format!("  {line}")));
    lines
}

fn invoice_section(snapshot: &LedgerSnapshot, today: Date) -> Vec<String> {
    let invoices = BillingView::default().invoice_rows(snapshot, today);
    let mut lines = vec![format!("Fakturaer ({})", invoices.len())];
    if invoices.is_empty() {
        return lines;
    }

    let mut rows = vec![vec![
        "Nummer".to_owned(),
        "Sak".to_owned(),
        "Status".to_owned(),
        "Beløp".to_owned(),
        "Forfall".to_owned(),
    ]];
    rows.extend(invoices.iter().map(|invoice| {
        vec![
            invoice.invoice_number.clone(),
            snapshot.case_label(invoice.case_id).to_owned(),
            invoice.status.label().to_owned(),
            format_currency(invoice.amount),
            format_date(invoice.due_date),
        ]
    }));
    lines.extend(align_columns(&rows).into_iter().map(|line| format!("  {line}")));
    lines
}

/// Left-aligns every column to its widest cell, measured in chars.
fn align_columns(rows: &[Vec<String>]) -> Vec<String> {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|index| {
            rows.iter()
                .filter_map(|row| row.get(index))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    rows.iter()
        .map(|row| {
            let cells: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(cell, &width)| format!("{cell:<width$}"))
                .collect();
            cells.join(COLUMN_GAP).trim_end().to_owned()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{align_columns, render_summary};
    use anyhow::Result;
    use timeforing_app::LedgerSnapshot;
    use timeforing_store::{BillingSettings, Store};
    use timeforing_testkit::fixture_today;

    fn demo_summary() -> Result<String> {
        let mut store = Store::new(BillingSettings::default())?;
        store.seed_demo_data(fixture_today())?;
        Ok(render_summary(&store.snapshot(), fixture_today()))
    }

    #[test]
    fn week_section_names_the_iso_week_and_totals_cases() -> Result<()> {
        let summary = demo_summary()?;
        assert!(summary.starts_with("uke 8 (16.02.2026 - 22.02.2026)"));
        let drap = summary
            .lines()
            .find(|line| line.starts_with("Drap "))
            .ok_or_else(|| anyhow::anyhow!("Drap row missing"))?;
        assert!(drap.trim_end().ends_with("10"));
        Ok(())
    }

    #[test]
    fn suggestion_counts_follow_categories() -> Result<()> {
        let summary = demo_summary()?;
        assert!(summary.contains("Forslag (13)"));
        assert!(summary.contains("  Fullført: 5"));
        assert!(summary.contains("  Delvis fullført: 4"));
        assert!(summary.contains("  Spam: 4"));
        Ok(())
    }

    #[test]
    fn billing_rows_use_norwegian_currency() -> Result<()> {
        let summary = demo_summary()?;
        assert!(summary.contains("timepris 1\u{a0}500,00\u{a0}kr"));
        let barnevern = summary
            .lines()
            .find(|line| line.contains("Barnevern (sak 33)"))
            .ok_or_else(|| anyhow::anyhow!("Barnevern row missing"))?;
        assert!(barnevern.contains("12\u{a0}000,00\u{a0}kr"));
        Ok(())
    }

    #[test]
    fn invoices_are_listed_with_status_labels() -> Result<()> {
        let summary = demo_summary()?;
        assert!(summary.contains("Fakturaer (4)"));
        let paid = summary
            .lines()
            .find(|line| line.contains("F-2024-001"))
            .ok_or_else(|| anyhow::anyhow!("paid invoice missing"))?;
        assert!(paid.contains("Betalt"));
        assert!(paid.contains("15.03.2024"));
        Ok(())
    }

    #[test]
    fn empty_ledger_still_renders_every_section() {
        let summary = render_summary(&LedgerSnapshot::default(), fixture_today());
        assert!(summary.contains("uke 8"));
        assert!(summary.contains("Forslag (0)"));
        assert!(summary.contains("ingen fakturerbare timer"));
        assert!(summary.contains("Fakturaer (0)"));
    }

    #[test]
    fn columns_are_padded_to_the_widest_cell() {
        let rows = vec![
            vec!["Sak".to_owned(), "Sum".to_owned()],
            vec!["Skattesvik".to_owned(), "3".to_owned()],
        ];
        assert_eq!(
            align_columns(&rows),
            vec!["Sak         Sum".to_owned(), "Skattesvik  3".to_owned()]
        );
    }
}
