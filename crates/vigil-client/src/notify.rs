//! Transactional email notifications over an EmailJS-compatible REST API.
//!
//! Sends are fire-and-forget relative to complaint creation: the task is
//! spawned only after the record commits, and its outcome reaches the UI
//! through an advisory channel. There is no retry anywhere.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::oneshot;
use tracing::{info, warn};

use vigil_shared::types::ComplaintId;

use crate::config::EmailConfig;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// Email settings are incomplete; nothing was sent.
    #[error("Email service not configured")]
    NotConfigured,

    #[error("Email request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Email service rejected the request: {status}")]
    Rejected { status: reqwest::StatusCode },
}

/// Template parameters for the submission confirmation email.
#[derive(Debug, Clone, Serialize)]
pub struct ConfirmationEmail {
    pub to_name: String,
    pub to_email: String,
    pub complaint_id: ComplaintId,
    pub vehicle_no: String,
    /// Link to the status page where the submitter can track the case.
    pub status_link: String,
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: &'a ConfirmationEmail,
}

/// Client for the transactional email service.
pub struct EmailNotifier {
    http: reqwest::Client,
    config: EmailConfig,
}

impl EmailNotifier {
    pub fn new(config: EmailConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// One send attempt.
    pub async fn send(&self, email: &ConfirmationEmail) -> Result<(), NotifyError> {
        if !self.config.is_configured() {
            return Err(NotifyError::NotConfigured);
        }

        let url = format!(
            "{}/api/v1.0/email/send",
            self.config.api_base.trim_end_matches('/')
        );
        let request = SendRequest {
            service_id: &self.config.service_id,
            template_id: &self.config.template_id,
            user_id: &self.config.public_key,
            template_params: email,
        };

        let response = self.http.post(&url).json(&request).send().await?;
        if !response.status().is_success() {
            return Err(NotifyError::Rejected {
                status: response.status(),
            });
        }
        Ok(())
    }
}

/// Spawn the confirmation send as an independent task, reporting its
/// outcome through the returned channel. The critical path never awaits
/// this, and a failed send leaves the committed complaint untouched;
/// dropping the receiver is fine.
pub fn spawn_confirmation(
    notifier: Arc<EmailNotifier>,
    email: ConfirmationEmail,
) -> oneshot::Receiver<Result<(), NotifyError>> {
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let outcome = notifier.send(&email).await;
        match &outcome {
            Ok(()) => {
                info!(complaint = %email.complaint_id, to = %email.to_email, "confirmation email sent");
            }
            Err(e) => {
                warn!(complaint = %email.complaint_id, error = %e, "confirmation email failed");
            }
        }
        let _ = tx.send(outcome);
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn sample_email() -> ConfirmationEmail {
        ConfirmationEmail {
            to_name: "Asha Verma".to_string(),
            to_email: "asha@example.com".to_string(),
            complaint_id: "CR-7K2M9Q".parse().unwrap(),
            vehicle_no: "MH12AB1234".to_string(),
            status_link: "https://vigil.example/status.html".to_string(),
        }
    }

    #[tokio::test]
    async fn unconfigured_service_reports_without_sending() {
        let notifier = EmailNotifier::new(AppConfig::default().email);
        let err = notifier.send(&sample_email()).await.unwrap_err();
        assert!(matches!(err, NotifyError::NotConfigured));
    }

    #[tokio::test]
    async fn spawned_send_reports_through_the_advisory_channel() {
        let notifier = Arc::new(EmailNotifier::new(AppConfig::default().email));
        let outcome = spawn_confirmation(notifier, sample_email()).await.unwrap();
        assert!(matches!(outcome, Err(NotifyError::NotConfigured)));
    }

    #[test]
    fn request_body_matches_the_service_contract() {
        let email = sample_email();
        let request = SendRequest {
            service_id: "service_123",
            template_id: "template_456",
            user_id: "public_789",
            template_params: &email,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["service_id"], "service_123");
        assert_eq!(value["template_params"]["complaint_id"], "CR-7K2M9Q");
        assert_eq!(value["template_params"]["vehicle_no"], "MH12AB1234");
        assert_eq!(
            value["template_params"]["status_link"],
            "https://vigil.example/status.html"
        );
    }
}
