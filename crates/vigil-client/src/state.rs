//! Shared service context handed to every operation.
//!
//! Deliberately holds no per-view state: each open view owns its own
//! subscription handle (see [`crate::chat::ChatPanel`] and
//! [`crate::sync::DashboardFeed`]), so switching views can never leak a
//! watch or cross-talk between two complaints.

use std::sync::Arc;

use vigil_store::DocumentStore;

use crate::config::AppConfig;
use crate::notify::EmailNotifier;

/// Central application context: the store handle, the email notifier, and
/// configuration. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub store: DocumentStore,
    pub notifier: Arc<EmailNotifier>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: DocumentStore, config: AppConfig) -> Self {
        let notifier = Arc::new(EmailNotifier::new(config.email.clone()));
        Self {
            store,
            notifier,
            config: Arc::new(config),
        }
    }
}
