//! Report delivery boundary. Transport failures here are never fatal to a
//! reporting cycle: by the time `send` runs, the ledger append and chart are
//! already durable, so the caller logs the error and moves on.

use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Mail delivery settings, passed into a notifier at construction rather
/// than living in module globals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub sender: String,
    pub receiver: String,
    pub subject: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            sender: String::new(),
            receiver: String::new(),
            subject: "Balance sheet report".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("report delivery failed: {0}")]
    Transport(String),
}

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, report: &str, images: &[PathBuf]) -> Result<(), DeliveryError>;
}

/// Prints the report to stdout; the console stand-in for mail delivery.
#[derive(Debug, Clone, Default)]
pub struct StdoutNotifier {
    mail: MailConfig,
}

impl StdoutNotifier {
    pub fn new(mail: MailConfig) -> Self {
        Self { mail }
    }
}

#[async_trait::async_trait]
impl Notifier for StdoutNotifier {
    async fn send(&self, report: &str, images: &[PathBuf]) -> Result<(), DeliveryError> {
        if !self.mail.subject.is_empty() {
            println!("{}", self.mail.subject);
            println!("{}", "=".repeat(self.mail.subject.len()));
        }
        println!("{report}");
        for image in images {
            info!(path = %image.display(), "chart written");
        }
        Ok(())
    }
}

/// Captures sends for tests.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    sent: Mutex<Vec<(String, Vec<PathBuf>)>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<(String, Vec<PathBuf>)> {
        self.sent.lock().expect("notifier lock poisoned").clone()
    }
}

#[async_trait::async_trait]
impl Notifier for MemoryNotifier {
    async fn send(&self, report: &str, images: &[PathBuf]) -> Result<(), DeliveryError> {
        self.sent
            .lock()
            .expect("notifier lock poisoned")
            .push((report.to_string(), images.to_vec()));
        Ok(())
    }
}
