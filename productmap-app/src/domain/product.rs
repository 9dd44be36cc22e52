use super::Coordinate;
use serde::{Deserialize, Serialize};

/// Key assigned by the remote store on create.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Option<ProductId>,
    pub title: String,
    pub description: String,
    pub city: String,
    pub coordinate: Coordinate,
    pub upvote_count: u32,
    pub image_url: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Product {
    /// Local placeholder for a marker that has not been created remotely yet.
    pub fn placeholder(coordinate: Coordinate, city: String) -> Self {
        Self {
            id: None,
            title: String::new(),
            description: String::new(),
            city,
            coordinate,
            upvote_count: 0,
            image_url: None,
            created_at: Some(chrono::Utc::now()),
        }
    }

    pub fn with_id(mut self, id: ProductId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_fields(mut self, fields: &ProductFields) -> Self {
        self.title = fields.title.clone();
        self.description = fields.description.clone();
        self
    }

    pub fn is_provisional(&self) -> bool {
        self.id.is_none() || self.title.is_empty()
    }
}

/// User-entered metadata written by the confirm step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFields {
    pub title: String,
    pub description: String,
}

impl ProductFields {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}
