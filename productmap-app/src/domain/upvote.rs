use super::ProductId;
use serde::{Deserialize, Serialize};

/// A single tap on the upvote button of a confirmed product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpvoteRequest {
    pub product_id: ProductId,
    pub city: String,
}

impl UpvoteRequest {
    pub fn new(product_id: ProductId, city: impl Into<String>) -> Self {
        Self {
            product_id,
            city: city.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpvoteResult {
    pub product_id: ProductId,
    pub count: u32,
    pub label: String,
}

/// What happens to the optimistic count when the remote increment fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UpvotePolicy {
    /// Local count stays incremented; the failure is only reported.
    #[default]
    KeepOptimistic,
    /// Local count is decremented again and the new count is published.
    RollBack,
}

pub fn upvote_label(count: u32) -> &'static str {
    if count > 1 {
        "Upvotes"
    } else {
        "Upvote"
    }
}
