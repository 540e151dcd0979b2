//! Notification intents.
//!
//! The engine never delivers notifications itself. It builds a structured
//! intent for each executed action and hands it to an external delivery
//! system through [`NotificationSink`]. Dispatch is best-effort and never
//! gates executor success.

use std::sync::Arc;

use gavel_db::entities::enforcement_action::{self, ActionKind};
use serde::Serialize;

/// Delivery priority of a notification intent.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentPriority {
    Medium,
    High,
}

/// Delivery channel of a notification intent.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentChannel {
    Email,
    Inbox,
    Push,
}

/// A structured, side-effect-free description of what should be
/// communicated to the affected account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationIntent {
    pub account_id: String,
    pub kind: ActionKind,
    pub title: String,
    pub priority: IntentPriority,
    pub channels: Vec<IntentChannel>,
    pub message: String,
}

/// Build the notification intent for an executed action.
///
/// Fully deterministic: each kind maps to a fixed title, priority and
/// channel set.
#[must_use]
pub fn build_intent(action: &enforcement_action::Model) -> NotificationIntent {
    let (title, priority, channels) = match action.kind {
        ActionKind::Warning => (
            "Account warning issued",
            IntentPriority::Medium,
            vec![IntentChannel::Email, IntentChannel::Inbox],
        ),
        ActionKind::Suspension => (
            "Account suspended",
            IntentPriority::High,
            vec![IntentChannel::Email, IntentChannel::Inbox, IntentChannel::Push],
        ),
        ActionKind::Freeze => (
            "Account frozen",
            IntentPriority::High,
            vec![IntentChannel::Email, IntentChannel::Inbox, IntentChannel::Push],
        ),
        ActionKind::Reinstatement => (
            "Account reinstated",
            IntentPriority::Medium,
            vec![IntentChannel::Email, IntentChannel::Inbox],
        ),
    };

    NotificationIntent {
        account_id: action.account_id.clone(),
        kind: action.kind,
        title: title.to_string(),
        priority,
        channels,
        message: action.message.clone(),
    }
}

/// Outbound hand-off to the external delivery system.
#[async_trait::async_trait]
pub trait NotificationSink: Send + Sync {
    /// Hand an intent to the delivery system. Best-effort: implementations
    /// must not propagate delivery failures back to the executor.
    async fn dispatch(&self, intent: NotificationIntent);
}

/// Shared handle to a notification sink.
pub type SharedSink = Arc<dyn NotificationSink>;

/// Sink that records intents in the log stream.
///
/// Used when no delivery system is wired up.
#[derive(Debug, Clone, Default)]
pub struct TracingSink;

#[async_trait::async_trait]
impl NotificationSink for TracingSink {
    async fn dispatch(&self, intent: NotificationIntent) {
        tracing::info!(
            account_id = %intent.account_id,
            kind = ?intent.kind,
            priority = ?intent.priority,
            title = %intent.title,
            "Notification intent emitted"
        );
    }
}
