use serde::{Deserialize, Serialize};

/// An online bookstore being watched. The id keys price records and the
/// source registry; prices from a store are always quoted in its currency.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Store {
    pub id: String,
    pub name: String,
    pub currency: String,
}

impl Store {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            currency: currency.into(),
        }
    }
}
