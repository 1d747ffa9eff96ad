use async_trait::async_trait;
use rust_decimal::Decimal;
use scraper::{Html, Selector};
use tracing::debug;

use super::{parse_price_text, PriceSource};
use crate::models::Book;
use crate::utils::error::{AppError, Result};

/// Leya's ajax search endpoint. Search is a POST form with the ISBN in the
/// `chave` field; the fragment that comes back lists each hit with its
/// price in a `div.right`.
pub struct LeyaSource {
    store_id: String,
    base_url: String,
    client: reqwest::Client,
}

impl LeyaSource {
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

        let price = Selector::parse("div.right").unwrap();
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
impl PriceSource for LeyaSource {
    fn store_id(&self) -> &str {
        &self.store_id
    }

    async fn fetch_price(&self, book: &Book) -> Result<Decimal> {
        let form = [
            ("chave", book.isbn.as_str()),
            ("pagina", "1"),
            ("num_prod_pag", "15"),
            ("ordenar", "0"),
            ("listagem", "2"),
            ("categorias", "0"),
            ("editoras", "0"),
        ];
        debug!(store = %self.store_id, url = %self.base_url, isbn = %book.isbn, "Posting search");

        let response = self
            .client
            .post(&self.base_url)
            .form(&form)
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;

        self.extract_price(&body)
    }
}
