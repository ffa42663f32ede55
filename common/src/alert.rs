use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertLevel {
    Success,
    Error,
    Info,
}

/// A user-facing notification banner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub level: AlertLevel,
    pub title: String,
    pub body: String,
    pub raised_at: DateTime<Utc>,
}

impl Alert {
    pub fn new(level: AlertLevel, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            body: body.into(),
            raised_at: Utc::now(),
        }
    }
}

/// Receiver of user-facing alerts.
pub trait AlertSink {
    fn generate_alert(&mut self, level: AlertLevel, title: String, body: String);
}

/// Collects alerts in memory, newest last.
impl AlertSink for Vec<Alert> {
    fn generate_alert(&mut self, level: AlertLevel, title: String, body: String) {
        self.push(Alert::new(level, title, body));
    }
}

/// Lookup of user-facing strings by key.
pub trait Translate {
    fn t(&self, key: &str) -> String;
}

/// A flat key -> string catalog. Unknown keys translate to themselves.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    entries: HashMap<String, String>,
}

impl Catalog {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// English strings used by the receive screen.
    pub fn english() -> Self {
        let entries = [
            ("global:pleaseWait", "Please wait"),
            (
                "global:pleaseWaitExplanation",
                "Your wallet is busy. Please wait until it has finished before generating an address.",
            ),
            ("receive:generationFailed", "Could not generate address"),
            ("receive:copied", "Address copied"),
            ("receive:copiedExplanation", "The receive address is on your clipboard."),
            ("ledger:checkAddress", "Check your device"),
            (
                "ledger:checkAddressExplanation",
                "Confirm that the address on your hardware device matches the one on screen.",
            ),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Self { entries }
    }
}

impl Translate for Catalog {
    fn t(&self, key: &str) -> String {
        self.entries
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}
