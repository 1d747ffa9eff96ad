pub mod almedina;
pub mod leya;
pub mod presenca;

pub use almedina::AlmedinaSource;
pub use leya::LeyaSource;
pub use presenca::PresencaSource;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::config::{FetcherConfig, SourceKind, StoreConfig};
use crate::models::Book;
use crate::utils::error::Result;

/// A store that can be asked for the current price of a book.
///
/// Implementations do the store-specific search-by-ISBN and HTML
/// extraction. Any error from `fetch_price` means "no usable price this
/// run" and is absorbed by the tracker as a per-pair fetch failure.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// The configured store id this source answers for.
    fn store_id(&self) -> &str;

    /// Fetches the price currently listed for `book`.
    async fn fetch_price(&self, book: &Book) -> Result<Decimal>;
}

/// Shared HTTP client for every source. One connection pool, one timeout,
/// one user agent.
pub fn build_http_client(config: &FetcherConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout))
        .user_agent(&config.user_agent)
        .build()?;
    Ok(client)
}

/// Builds the source registry from the configured stores, keyed by store
/// id. Disabled stores are left out, so the tracker never sees them.
pub fn build_sources(
    stores: &[StoreConfig],
    client: &reqwest::Client,
) -> HashMap<String, Arc<dyn PriceSource>> {
    let mut sources: HashMap<String, Arc<dyn PriceSource>> = HashMap::new();

    for store in stores.iter().filter(|s| s.enabled) {
        let source: Arc<dyn PriceSource> = match store.kind {
            SourceKind::Almedina => {
                Arc::new(AlmedinaSource::new(&store.id, &store.base_url, client.clone()))
            }
            SourceKind::Leya => {
                Arc::new(LeyaSource::new(&store.id, &store.base_url, client.clone()))
            }
            SourceKind::Presenca => {
                Arc::new(PresencaSource::new(&store.id, &store.base_url, client.clone()))
            }
        };
        sources.insert(store.id.clone(), source);
    }

    sources
}

/// Normalizes the price text the store pages carry into a decimal.
///
/// Handles the euro sign in its literal and entity-encoded spellings,
/// stray whitespace including NBSP, and a decimal comma or dot:
/// `"19,90 €"` parses as `19.90`. Anything without a recognizable number
/// is `None`.
pub(crate) fn parse_price_text(text: &str) -> Option<Decimal> {
    let cleaned = text
        .replace("&euro;", "")
        .replace("&#8364;", "")
        .replace('€', "");

    let price_regex = Regex::new(r"(\d+(?:[.,]\d{1,2})?)").unwrap();
    let captures = price_regex.captures(&cleaned)?;
    let normalized = captures.get(1)?.as_str().replace(',', ".");

    Decimal::from_str(&normalized).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("19,90 €", "19.90")]
    #[case("19.90", "19.90")]
    #[case("  12,50€  ", "12.50")]
    #[case("&euro;9,99", "9.99")]
    #[case("&#8364; 30", "30")]
    #[case("15,5", "15.5")]
    #[case("7", "7")]
    fn test_parse_price_text(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(
            parse_price_text(input),
            Some(Decimal::from_str(expected).unwrap())
        );
    }

    #[test]
    fn test_parse_price_text_handles_nbsp() {
        assert_eq!(
            parse_price_text("19,90\u{a0}€"),
            Some(Decimal::from_str("19.90").unwrap())
        );
    }

    #[rstest]
    #[case("")]
    #[case("esgotado")]
    #[case("€")]
    fn test_parse_price_text_rejects_garbage(#[case] input: &str) {
        assert_eq!(parse_price_text(input), None);
    }
}
