use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored restaurant review. Owned by the document store; read-only here.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Review {
    pub id: String,
    pub text: String,
    pub rating: Option<i64>,
    pub user_name: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Review {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Review {
            id: id.into(),
            text: text.into(),
            ..Default::default()
        }
    }
}
