use super::viewport::{MapViewport, ScreenPoint};
use crate::application::{PlacementCoordinator, UpvoteCoordinator};
use crate::domain::{
    CancelOutcome, Coordinate, PlacementSnapshot, Product, ProductId, UpvoteRequest, UpvoteResult,
};
use crate::infrastructure::security::InputSanitizer;
use productmap_errors::AppError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GesturePhase {
    Began,
    Changed,
    Ended,
    Cancelled,
}

/// A long-press gesture as reported by the map view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LongPress {
    #[serde(flatten)]
    pub point: ScreenPoint,
    pub phase: GesturePhase,
    pub viewport: MapViewport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum LongPressOutcome {
    /// Only the first phase of a gesture starts a placement.
    Ignored,
    Started(PlacementSnapshot),
}

/// Translates map gestures and editor actions into coordinator calls.
#[derive(Clone)]
pub struct MapAdapter {
    placement: PlacementCoordinator,
    upvotes: UpvoteCoordinator,
}

impl MapAdapter {
    pub fn new(placement: PlacementCoordinator, upvotes: UpvoteCoordinator) -> Self {
        Self { placement, upvotes }
    }

    pub async fn on_long_press(&self, press: LongPress) -> Result<LongPressOutcome, AppError> {
        if press.phase != GesturePhase::Began {
            tracing::debug!(phase = ?press.phase, "Ignoring long-press phase");
            return Ok(LongPressOutcome::Ignored);
        }

        let coordinate = press.viewport.coordinate_at(press.point)?;
        self.on_long_press_at(coordinate).await.map(LongPressOutcome::Started)
    }

    pub async fn on_long_press_at(&self, coordinate: Coordinate) -> Result<PlacementSnapshot, AppError> {
        tracing::info!(%coordinate, "Long-press on map");
        self.placement.begin_placement(coordinate).await
    }

    pub async fn on_confirm_edit(&self, title: &str, description: &str) -> Result<Product, AppError> {
        let fields = InputSanitizer::sanitize_fields(title, description)?;
        self.placement.confirm_placement(fields).await
    }

    pub async fn on_cancel_edit(&self) -> Result<CancelOutcome, AppError> {
        self.placement.cancel_placement().await
    }

    pub fn on_upvote_tap(&self, product_id: ProductId, city: &str) -> Result<UpvoteResult, AppError> {
        self.upvotes.upvote(UpvoteRequest::new(product_id, city))
    }

    pub async fn interaction_enabled(&self) -> bool {
        self.placement.interaction_enabled().await
    }
}
