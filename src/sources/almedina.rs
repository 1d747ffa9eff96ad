use async_trait::async_trait;
use rust_decimal::Decimal;
use scraper::{Html, Selector};
use tracing::debug;

use super::{parse_price_text, PriceSource};
use crate::models::Book;
use crate::utils::error::{AppError, Result};

/// Almedina catalog search. A GET on `{base_url}{isbn}` lands either on the
/// book's product page or on a results page with a "not found" notice.
pub struct AlmedinaSource {
    store_id: String,
    base_url: String,
    client: reqwest::Client,
}

impl AlmedinaSource {
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

    // Parsing stays synchronous: scraper's DOM is not Send, so it must not
    // live across an await point.
    fn extract_price(&self, html: &str) -> Result<Decimal> {
        let document = Html::parse_document(html);

        let notice = Selector::parse("div.message.notice").unwrap();
        if document.select(&notice).next().is_some() {
            return Err(AppError::fetch(&self.store_id, "book is not listed"));
        }

        let price = Selector::parse(r#"span[data-price-type="finalPrice"]"#).unwrap();
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
impl PriceSource for AlmedinaSource {
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
