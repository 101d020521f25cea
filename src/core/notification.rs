//! Notification sinks
//!
//! The engine notifies both parties of a completed transfer. Delivery is
//! fire-and-forget: the default sink writes a structured log event, and a
//! failing or slow sink can never change a transfer's recorded outcome.

use crate::core::traits::NotificationSink;
use crate::types::Account;
use tracing::info;

/// Sink that emits every notification as a `tracing` event
///
/// Events use the `notifications` target so they can be filtered or routed
/// separately, e.g. `RUST_LOG=notifications=info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNotifier;

impl NotificationSink for LoggingNotifier {
    fn notify(&self, account: &Account, message: &str) {
        info!(target: "notifications", account_id = account.id(), "{}", message);
    }
}
