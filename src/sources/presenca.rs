use async_trait::async_trait;
use rust_decimal::Decimal;
use scraper::{Html, Selector};
use tracing::debug;

use super::{parse_price_text, PriceSource};
use crate::models::Book;
use crate::utils::error::{AppError, Result};

/// Presença site search. The product page carries no price class, only an
/// inline style, so the selector matches on the exact style attribute.
pub struct PresencaSource {
    store_id: String,
    base_url: String,
    client: reqwest::Client,
}

impl PresencaSource {
    pub fn new(
        store_id: impl Into<String>,
        base_url: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            store_id: store_id.into(),
            base_url: base_url.into(),
            client,
        }
    }

    fn extract_price(&self, html: &str) -> Result<Decimal> {
        let document = Html::parse_document(html);

        let price = Selector::parse(r#"span[style="font-size:36px;font-weight:600"]"#).unwrap();
        let element = document
            .select(&price)
            .next()
            .ok_or_else(|| AppError::fetch(&self.store_id, "no price element in result page"))?;

        let text = element.text().collect::<Vec<_>>().join(" ");
        parse_price_text(&text).ok_or_else(|| {
            AppError::fetch(
                &self.store_id,
                format!("cannot parse price text '{}'", text.trim()),
            )
        })
    }
}

#[async_trait]
impl PriceSource for PresencaSource {
    fn store_id(&self) -> &str {
        &self.store_id
    }

    async fn fetch_price(&self, book: &Book) -> Result<Decimal> {
        let url = format!("{}{}", self.base_url, book.isbn);
        debug!(store = %self.store_id, %url, "Fetching price");

        let response = self.client.get(&url).send().await?.error_for_status()?;
        let body = response.text().await?;

        self.extract_price(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn source() -> PresencaSource {
        PresencaSource::new(
            "presenca",
            "https://www.presenca.pt/search?q=",
            reqwest::Client::new(),
        )
    }

    #[test]
    fn test_extracts_styled_price() {
        let html = r#"
            <html><body>
              <div class="product">
                <span style="font-size:36px;font-weight:600">14,36 &euro;</span>
                <span style="font-size:12px">PVP: 15,95 &euro;</span>
              </div>
            </body></html>
        "#;

        let price = source().extract_price(html).unwrap();
        assert_eq!(price, Decimal::from_str("14.36").unwrap());
    }

    #[test]
    fn test_missing_price_element_is_a_fetch_failure() {
        let err = source()
            .extract_price("<html><body><div class=\"product\"></div></body></html>")
            .unwrap_err();

        assert!(matches!(err, AppError::Fetch { .. }));
    }
}
