use config::{Config, ConfigError, Environment, File};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use url::Url;

use crate::models::{Book, CheckTarget, Store};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub tracker: TrackerConfig,
    pub fetcher: FetcherConfig,
    pub notifications: NotificationsConfig,
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    pub history_path: String,
    pub discount_threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    pub request_timeout: u64,
    pub retry_attempts: usize,
    pub retry_delay_ms: u64,
    pub max_concurrent_fetches: usize,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    pub console: bool,
    pub smtp: SmtpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from_address: String,
    pub from_name: String,
    pub to_address: String,
    pub use_tls: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub books: Vec<BookConfig>,
    pub stores: Vec<StoreConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookConfig {
    pub isbn: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub id: String,
    pub name: String,
    pub kind: SourceKind,
    pub base_url: String,
    pub currency: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Which adapter answers for a store. The id stays free-form; the kind
/// picks the scraping strategy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Almedina,
    Leya,
    Presenca,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_dir("config")
    }

    pub fn from_dir(dir: &str) -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // Start with default configuration
            .add_source(File::with_name(&format!("{}/default", dir)))
            // Add environment-specific config
            .add_source(File::with_name(&format!("{}/{}", dir, run_mode)).required(false))
            // Add local config (ignored by git)
            .add_source(File::with_name(&format!("{}/local", dir)).required(false))
            // Add environment variables with prefix "BOOKHOUND_"
            .add_source(Environment::with_prefix("BOOKHOUND").separator("__"))
            .build()?;

        let config: AppConfig = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tracker.history_path.is_empty() {
            return Err(ConfigError::Message(
                "tracker.history_path must not be empty".into(),
            ));
        }

        if self.tracker.discount_threshold <= 0.0 || self.tracker.discount_threshold > 1.0 {
            return Err(ConfigError::Message(
                "tracker.discount_threshold must be a fraction in (0, 1]".into(),
            ));
        }

        if self.fetcher.request_timeout == 0 {
            return Err(ConfigError::Message(
                "fetcher.request_timeout must be greater than 0".into(),
            ));
        }

        if self.fetcher.max_concurrent_fetches == 0 {
            return Err(ConfigError::Message(
                "fetcher.max_concurrent_fetches must be greater than 0".into(),
            ));
        }

        if self.catalog.books.is_empty() {
            return Err(ConfigError::Message(
                "catalog.books must list at least one book".into(),
            ));
        }

        if !self.catalog.stores.iter().any(|s| s.enabled) {
            return Err(ConfigError::Message(
                "catalog.stores must have at least one enabled store".into(),
            ));
        }

        let mut isbns = HashSet::new();
        for book in &self.catalog.books {
            if book.isbn.is_empty() {
                return Err(ConfigError::Message("book isbn must not be empty".into()));
            }
            if !isbns.insert(&book.isbn) {
                return Err(ConfigError::Message(format!(
                    "duplicate book isbn: {}",
                    book.isbn
                )));
            }
        }

        let mut ids = HashSet::new();
        for store in &self.catalog.stores {
            if !ids.insert(&store.id) {
                return Err(ConfigError::Message(format!(
                    "duplicate store id: {}",
                    store.id
                )));
            }
            if Url::parse(&store.base_url).is_err() {
                return Err(ConfigError::Message(format!(
                    "invalid base_url for store {}",
                    store.id
                )));
            }
        }

        if self.notifications.smtp.enabled {
            if self.notifications.smtp.port == 0 {
                return Err(ConfigError::Message(
                    "SMTP port must be greater than 0".into(),
                ));
            }
            if self.notifications.smtp.from_address.is_empty()
                || self.notifications.smtp.to_address.is_empty()
            {
                return Err(ConfigError::Message(
                    "SMTP from_address and to_address must be set when email is enabled".into(),
                ));
            }
        }

        Ok(())
    }
}

impl TrackerConfig {
    /// The configured threshold as an exact decimal for the evaluator.
    pub fn threshold(&self) -> Option<Decimal> {
        Decimal::from_f64(self.discount_threshold)
    }
}

impl BookConfig {
    pub fn to_book(&self) -> Book {
        Book::new(&self.isbn, &self.title)
    }
}

impl StoreConfig {
    pub fn to_store(&self) -> Store {
        Store::new(&self.id, &self.name, &self.currency)
    }
}

impl CatalogConfig {
    /// The run's catalog: every book crossed with every enabled store,
    /// books outermost, both in configuration order.
    pub fn pairs(&self) -> Vec<CheckTarget> {
        let stores: Vec<Store> = self
            .stores
            .iter()
            .filter(|s| s.enabled)
            .map(|s| s.to_store())
            .collect();

        let mut pairs = Vec::with_capacity(self.books.len() * stores.len());
        for book in &self.books {
            for store in &stores {
                pairs.push(CheckTarget::new(book.to_book(), store.clone()));
            }
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AppConfig {
        AppConfig {
            tracker: TrackerConfig {
                history_path: "data/history.json".to_string(),
                discount_threshold: 0.10,
            },
            fetcher: FetcherConfig {
                request_timeout: 30,
                retry_attempts: 2,
                retry_delay_ms: 1000,
                max_concurrent_fetches: 4,
                user_agent: "Bookhound/0.1".to_string(),
            },
            notifications: NotificationsConfig {
                console: true,
                smtp: SmtpConfig {
                    enabled: false,
                    host: "smtp.gmail.com".to_string(),
                    port: 587,
                    username: None,
                    password: None,
                    from_address: "bookhound@example.com".to_string(),
                    from_name: "Bookhound".to_string(),
                    to_address: "reader@example.com".to_string(),
                    use_tls: true,
                },
            },
            catalog: CatalogConfig {
                books: vec![
                    BookConfig {
                        isbn: "9789722040280".to_string(),
                        title: "Memorial do Convento".to_string(),
                    },
                    BookConfig {
                        isbn: "9789896416270".to_string(),
                        title: "Ensaio sobre a Cegueira".to_string(),
                    },
                ],
                stores: vec![
                    StoreConfig {
                        id: "almedina".to_string(),
                        name: "Almedina".to_string(),
                        kind: SourceKind::Almedina,
                        base_url: "https://www.almedina.net/catalogsearch/result/?q=".to_string(),
                        currency: "EUR".to_string(),
                        enabled: true,
                    },
                    StoreConfig {
                        id: "leya".to_string(),
                        name: "Leya".to_string(),
                        kind: SourceKind::Leya,
                        base_url: "https://www.leyaonline.com/pt/pesquisa/pesquisa_ajax.php"
                            .to_string(),
                        currency: "EUR".to_string(),
                        enabled: true,
                    },
                    StoreConfig {
                        id: "presenca".to_string(),
                        name: "Presença".to_string(),
                        kind: SourceKind::Presenca,
                        base_url: "https://www.presenca.pt/search?q=".to_string(),
                        currency: "EUR".to_string(),
                        enabled: false,
                    },
                ],
            },
        }
    }

    #[test]
    fn test_config_validation_valid() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_threshold() {
        let mut config = valid_config();
        config.tracker.discount_threshold = 0.0;
        assert!(config.validate().is_err());

        config.tracker.discount_threshold = 1.5;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("discount_threshold"));
    }

    #[test]
    fn test_config_validation_empty_catalog() {
        let mut config = valid_config();
        config.catalog.books.clear();

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("at least one book"));
    }

    #[test]
    fn test_config_validation_no_enabled_store() {
        let mut config = valid_config();
        for store in &mut config.catalog.stores {
            store.enabled = false;
        }

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("enabled store"));
    }

    #[test]
    fn test_config_validation_duplicate_store_id() {
        let mut config = valid_config();
        config.catalog.stores[1].id = "almedina".to_string();

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("duplicate store id"));
    }

    #[test]
    fn test_config_validation_duplicate_isbn() {
        let mut config = valid_config();
        config.catalog.books[1].isbn = config.catalog.books[0].isbn.clone();

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("duplicate book isbn"));
    }

    #[test]
    fn test_config_validation_invalid_base_url() {
        let mut config = valid_config();
        config.catalog.stores[0].base_url = "not-a-valid-url".to_string();

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("invalid base_url"));
    }

    #[test]
    fn test_threshold_converts_exactly() {
        let config = valid_config();
        assert_eq!(
            config.tracker.threshold(),
            Some(Decimal::from_str_exact("0.1").unwrap())
        );
    }

    #[test]
    fn test_pairs_cross_product_in_catalog_order() {
        let config = valid_config();

        let pairs = config.catalog.pairs();

        // 2 books x 2 enabled stores; presenca is disabled.
        assert_eq!(pairs.len(), 4);
        let order: Vec<(&str, &str)> = pairs
            .iter()
            .map(|p| (p.book.isbn.as_str(), p.store.id.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("9789722040280", "almedina"),
                ("9789722040280", "leya"),
                ("9789896416270", "almedina"),
                ("9789896416270", "leya"),
            ]
        );
    }

    #[test]
    fn test_toml_deserialization() {
        let toml = r#"
            [tracker]
            history_path = "data/history.json"
            discount_threshold = 0.15

            [fetcher]
            request_timeout = 20
            retry_attempts = 1
            retry_delay_ms = 500
            max_concurrent_fetches = 2
            user_agent = "Bookhound/0.1"

            [notifications]
            console = true

            [notifications.smtp]
            enabled = false
            host = "smtp.example.com"
            port = 587
            from_address = "bookhound@example.com"
            from_name = "Bookhound"
            to_address = "reader@example.com"
            use_tls = true

            [[catalog.books]]
            isbn = "9789722040280"
            title = "Memorial do Convento"

            [[catalog.stores]]
            id = "leya"
            name = "Leya"
            kind = "leya"
            base_url = "https://www.leyaonline.com/pt/pesquisa/pesquisa_ajax.php"
            currency = "EUR"
        "#;

        let config: AppConfig = Config::builder()
            .add_source(File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.tracker.discount_threshold, 0.15);
        assert_eq!(config.catalog.stores[0].kind, SourceKind::Leya);
        // enabled defaults to true when the key is absent
        assert!(config.catalog.stores[0].enabled);
        assert!(config.validate().is_ok());
    }
}
