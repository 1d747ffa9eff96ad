use async_trait::async_trait;

use super::Notifier;
use crate::models::DiscountEvent;
use crate::utils::error::Result;

/// Prints one line per event to stdout. Useful when the binary runs from a
/// terminal or a cron job that mails its output anyway.
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    fn name(&self) -> &str {
        "console"
    }

    async fn notify(&self, events: &[DiscountEvent]) -> Result<()> {
        for event in events {
            println!("{}", event.summary());
        }
        Ok(())
    }
}
