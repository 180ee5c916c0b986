// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use timeforing_app::{
    DEFAULT_HOURLY_RATE_KRONER, DEFAULT_PAYMENT_TERMS_DAYS, MAX_HOURLY_RATE_KRONER, Nok, TabKind,
};
use timeforing_store::BillingSettings;
use tracing_subscriber::EnvFilter;

const CONFIG_VERSION: i64 = 1;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub billing: Billing,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub export: Export,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            billing: Billing::default(),
            ui: Ui::default(),
            export: Export::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Billing {
    /// Whole kroner per hour.
    pub hourly_rate: Option<i64>,
    pub payment_terms_days: Option<i64>,
}

impl Default for Billing {
    fn default() -> Self {
        Self {
            hourly_rate: Some(DEFAULT_HOURLY_RATE_KRONER),
            payment_terms_days: Some(DEFAULT_PAYMENT_TERMS_DAYS),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ui {
    pub start_tab: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Export {
    pub dir: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    pub level: Option<String>,
    pub path: Option<String>,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: Some(DEFAULT_LOG_LEVEL.to_owned()),
            path: None,
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("TIMEFORING_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!(
                "cannot resolve config directory; set TIMEFORING_CONFIG_PATH to the config file"
            )
        })?;

        let app_dir = config_root.join(timeforing_store::APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and put values under [billing], [ui], [export] and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(rate) = self.billing.hourly_rate {
            if rate <= 0 {
                bail!(
                    "billing.hourly_rate in {} must be positive, got {}",
                    path.display(),
                    rate
                );
            }
            if rate > MAX_HOURLY_RATE_KRONER {
                bail!(
                    "billing.hourly_rate in {} must be at most {} kroner, got {}",
                    path.display(),
                    MAX_HOURLY_RATE_KRONER,
                    rate
                );
            }
        }

        if let Some(days) = self.billing.payment_terms_days
            && days < 0
        {
            bail!(
                "billing.payment_terms_days in {} must be non-negative, got {}",
                path.display(),
                days
            );
        }

        if let Some(tab) = &self.ui.start_tab
            && TabKind::parse(tab).is_none()
        {
            bail!(
                "ui.start_tab in {} must be one of week, suggestions, billing; got {:?}",
                path.display(),
                tab
            );
        }

        if let Some(dir) = &self.export.dir
            && dir.trim().is_empty()
        {
            bail!(
                "export.dir in {} is empty; remove it to use the default directory",
                path.display()
            );
        }

        if let Some(level) = &self.log.level {
            EnvFilter::try_new(level).with_context(|| {
                format!(
                    "log.level in {} is not a valid filter: {:?} (try \"info\" or \"timeforing_store=debug\")",
                    path.display(),
                    level
                )
            })?;
        }

        Ok(())
    }

    pub fn billing_settings(&self) -> BillingSettings {
        BillingSettings {
            hourly_rate: Nok::from_kroner(
                self.billing
                    .hourly_rate
                    .unwrap_or(DEFAULT_HOURLY_RATE_KRONER),
            ),
            payment_terms_days: self
                .billing
                .payment_terms_days
                .unwrap_or(DEFAULT_PAYMENT_TERMS_DAYS),
        }
    }

    pub fn start_tab(&self) -> TabKind {
        self.ui
            .start_tab
            .as_deref()
            .and_then(TabKind::parse)
            .unwrap_or(TabKind::Week)
    }

    pub fn export_dir(&self) -> Result<PathBuf> {
        match &self.export.dir {
            Some(dir) => Ok(PathBuf::from(dir)),
            None => timeforing_store::default_export_dir(),
        }
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        match &self.log.path {
            Some(path) => Ok(PathBuf::from(path)),
            None => timeforing_store::default_log_path(),
        }
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# timeforing config\n# Place this file at: {}\n\nversion = 1\n\n[billing]\n# Whole kroner per hour\nhourly_rate = {}\npayment_terms_days = {}\n\n[ui]\n# week, suggestions or billing\nstart_tab = \"week\"\n\n[export]\n# Optional. Default is the documents dir (for example ~/Documents/timeforing/fakturaer)\n# dir = \"/absolute/path/to/fakturaer\"\n\n[log]\n# Any tracing filter; TIMEFORING_LOG overrides it\nlevel = \"{}\"\n# path = \"/absolute/path/to/timeforing.log\"\n",
            path.display(),
            DEFAULT_HOURLY_RATE_KRONER,
            DEFAULT_PAYMENT_TERMS_DAYS,
            DEFAULT_LOG_LEVEL,
        )
    }
}
