use super::{Product, ProductId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlacementState {
    Idle,
    AwaitingGeocode,
    AwaitingCreate,
    Editing,
    Cancelling,
    Cancelled,
    Confirmed,
}

impl PlacementState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::Confirmed)
    }

    /// Map interaction is only allowed while no session is open.
    pub fn interaction_enabled(self) -> bool {
        self == Self::Idle
    }
}

impl std::fmt::Display for PlacementState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "Idle",
            Self::AwaitingGeocode => "AwaitingGeocode",
            Self::AwaitingCreate => "AwaitingCreate",
            Self::Editing => "Editing",
            Self::Cancelling => "Cancelling",
            Self::Cancelled => "Cancelled",
            Self::Confirmed => "Confirmed",
        };
        f.write_str(name)
    }
}

/// Read-only view of the placement session for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementSnapshot {
    pub state: PlacementState,
    pub interaction_enabled: bool,
    pub pending_product: Option<Product>,
    pub cancel_queued: bool,
}

/// What a `cancel` call did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum CancelOutcome {
    /// The record was deleted and the session closed.
    Cancelled { product_id: ProductId },
    /// No id yet; the session closes once the in-flight call resolves.
    Queued,
}
