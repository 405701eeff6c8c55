//! Contact form submissions.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bizoe_core::{Email, ValidationErrors};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::instrument;
use uuid::Uuid;

/// Errors from the contact service.
#[derive(Debug, Error)]
pub enum ContactError {
    #[error("contact service unavailable")]
    Unavailable,
}

/// Contact form as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
}

/// A validated contact message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
}

impl ContactForm {
    /// Check required fields. Phone is optional.
    ///
    /// # Errors
    ///
    /// Returns field errors for blank fields or a malformed email.
    pub fn validate(self) -> Result<ContactMessage, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("name", &self.name);
        errors.require("email", &self.email);
        errors.require("subject", &self.subject);
        errors.require("message", &self.message);

        let email = if self.email.trim().is_empty() {
            None
        } else {
            Email::parse(&self.email)
                .inspect_err(|e| errors.add("email", e.to_string()))
                .ok()
        };

        errors.into_result()?;
        let email = email.ok_or_else(ValidationErrors::new)?;
        let phone = self.phone.trim();
        Ok(ContactMessage {
            name: self.name.trim().to_string(),
            email,
            phone: (!phone.is_empty()).then(|| phone.to_string()),
            subject: self.subject.trim().to_string(),
            message: self.message.trim().to_string(),
        })
    }
}

/// Acknowledgement of a received message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactReceipt {
    pub reference: String,
    pub received_at: DateTime<Utc>,
}

/// Contact inbox port.
#[async_trait]
pub trait ContactService: Send + Sync {
    async fn submit(&self, message: ContactMessage) -> Result<ContactReceipt, ContactError>;
}

/// Collects messages in memory after a delay.
#[derive(Debug)]
pub struct MockContactService {
    latency: Duration,
    inbox: RwLock<Vec<(ContactReceipt, ContactMessage)>>,
    available: AtomicBool,
}

impl MockContactService {
    #[must_use]
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            inbox: RwLock::new(Vec::new()),
            available: AtomicBool::new(true),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Relaxed);
    }

    /// Number of messages received so far.
    pub async fn received(&self) -> usize {
        self.inbox.read().await.len()
    }
}

#[async_trait]
impl ContactService for MockContactService {
    #[instrument(skip(self, message), fields(email = %message.email, subject = %message.subject))]
    async fn submit(&self, message: ContactMessage) -> Result<ContactReceipt, ContactError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if !self.available.load(Ordering::Relaxed) {
            return Err(ContactError::Unavailable);
        }

        let simple = Uuid::new_v4().simple().to_string();
        let receipt = ContactReceipt {
            reference: format!("MSG-{}", simple.get(..8).unwrap_or(&simple).to_uppercase()),
            received_at: Utc::now(),
        };
        self.inbox.write().await.push((receipt.clone(), message));

        tracing::info!(reference = %receipt.reference, "Contact message received");
        Ok(receipt)
    }
}
