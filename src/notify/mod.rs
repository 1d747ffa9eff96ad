pub mod console;
pub mod email;

pub use console::ConsoleNotifier;
pub use email::EmailNotifier;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::NotificationsConfig;
use crate::models::DiscountEvent;
use crate::utils::error::Result;

/// A delivery channel for the discounts a run found.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;

    /// Delivers the whole batch at once so channels can digest it
    /// (one email per run, not one per event).
    async fn notify(&self, events: &[DiscountEvent]) -> Result<()>;
}

/// Builds the configured channels. An empty vec is fine; a run without
/// notifiers still updates the history.
pub fn build_notifiers(config: &NotificationsConfig) -> Vec<Box<dyn Notifier>> {
    let mut notifiers: Vec<Box<dyn Notifier>> = Vec::new();

    if config.console {
        notifiers.push(Box::new(ConsoleNotifier));
    }
    if config.smtp.enabled {
        notifiers.push(Box::new(EmailNotifier::new(config.smtp.clone())));
    }

    notifiers
}

/// Hands the run's events to every channel. Delivery failures are logged
/// and swallowed; a broken SMTP server must not turn a successful run into
/// a failed one.
pub async fn dispatch(notifiers: &[Box<dyn Notifier>], events: &[DiscountEvent]) {
    if events.is_empty() {
        return;
    }

    for notifier in notifiers {
        match notifier.notify(events).await {
            Ok(()) => info!(notifier = notifier.name(), events = events.len(), "Notified"),
            Err(e) => warn!(
                notifier = notifier.name(),
                error = %e,
                "Notification delivery failed"
            ),
        }
    }
}
