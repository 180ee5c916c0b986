// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use timeforing_app::{Case, Invoice, InvoiceId, Nok, TimeEntry, total_hours};
use tracing::info;

use crate::Store;

/// Document written when an invoice is downloaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceExport {
    pub invoice: Invoice,
    pub case: Option<Case>,
    pub hourly_rate: Nok,
    pub billable_hours: f64,
    pub entries: Vec<TimeEntry>,
}

pub fn export_file_name(invoice: &Invoice) -> String {
    let stem: String = invoice
        .invoice_number
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '-' { ch } else { '_' })
        .collect();
    format!("faktura-{stem}.json")
}

impl Store {
    pub fn invoice_export(&self, invoice_id: InvoiceId) -> Result<InvoiceExport> {
        let invoice = self
            .invoice(invoice_id)
            .ok_or_else(|| anyhow!("invoice {invoice_id} not found"))?;
        let entries: Vec<TimeEntry> = self
            .entries()
            .iter()
            .filter(|entry| entry.case_id == invoice.case_id && entry.billable)
            .cloned()
            .collect();
        Ok(InvoiceExport {
            invoice: invoice.clone(),
            case: self.case(invoice.case_id).cloned(),
            hourly_rate: self.hourly_rate(),
            billable_hours: total_hours(&entries, invoice.case_id, true),
            entries,
        })
    }

    /// Writes the invoice as pretty JSON into `dir` and returns the file path.
    pub fn export_invoice(&self, invoice_id: InvoiceId, dir: &Path) -> Result<PathBuf> {
        let export = self.invoice_export(invoice_id)?;
        fs::create_dir_all(dir)
            .with_context(|| format!("create export directory {}", dir.display()))?;
        let path = dir.join(export_file_name(&export.invoice));
        let json = serde_json::to_string_pretty(&export).context("serialize invoice export")?;
        fs::write(&path, json).with_context(|| format!("write invoice to {}", path.display()))?;
        info!(
            invoice_id = invoice_id.get(),
            path = %path.display(),
            "invoice exported"
        );
        Ok(path)
    }
}
