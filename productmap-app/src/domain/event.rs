use super::{PlacementState, Product, ProductId};
use serde::{Deserialize, Serialize};

/// Notifications produced for the map UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum MapEvent {
    SessionStateChanged {
        state: PlacementState,
    },

    /// Emitted on every flip of the derived `state != Idle` flag.
    InteractionChanged {
        enabled: bool,
    },

    MarkerAdded {
        product: Product,
    },

    MarkerRemoved {
        product_id: ProductId,
    },

    UpvoteCountChanged {
        product_id: ProductId,
        count: u32,
    },

    /// A remote call failed after the UI had already moved on.
    OperationFailed {
        kind: String,
        product_id: Option<ProductId>,
        message: String,
    },
}

impl MapEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::SessionStateChanged { .. } => "SessionStateChanged",
            Self::InteractionChanged { .. } => "InteractionChanged",
            Self::MarkerAdded { .. } => "MarkerAdded",
            Self::MarkerRemoved { .. } => "MarkerRemoved",
            Self::UpvoteCountChanged { .. } => "UpvoteCountChanged",
            Self::OperationFailed { .. } => "OperationFailed",
        }
    }

    pub fn operation_failed(
        error: &productmap_errors::AppError,
        product_id: Option<ProductId>,
    ) -> Self {
        Self::OperationFailed {
            kind: error.kind().to_string(),
            product_id,
            message: error.to_string(),
        }
    }
}
