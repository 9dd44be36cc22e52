//! Placement session state machine.
//!
//! The machine performs no I/O. Every operation returns the [`Effect`]s the
//! caller has to carry out (remote calls to start, events to publish), and
//! every remote completion is fed back in tagged with the [`SessionId`] it was
//! started for. Completions whose id no longer matches the open session are
//! dropped, so a stale callback can never act on a newer session.
//!
//! ```text
//! Idle --begin--> AwaitingGeocode --city--> AwaitingCreate --id--> Editing
//!                      |                          |                 |  \
//!                   failure                    failure          confirm cancel
//!                      v                          v                 v     v
//!                    Idle                       Idle         Confirmed  Cancelling -> Cancelled
//! ```
//!
//! Terminal states are reported and the session returns to `Idle` in the
//! same step.

use crate::domain::{
    CancelOutcome, Coordinate, MapEvent, PlacementSnapshot, PlacementState, Product,
    ProductFields, ProductId,
};
use productmap_errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(uuid::Uuid);

impl SessionId {
    fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Work requested by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    ResolveCity {
        session: SessionId,
        coordinate: Coordinate,
    },
    CreateRecord {
        session: SessionId,
        product: Product,
    },
    UpdateRecord {
        id: ProductId,
        city: String,
        fields: ProductFields,
    },
    DeleteRecord {
        id: ProductId,
        city: String,
    },
    /// The record is now confirmed and may be shown to (and upvoted by) others.
    Publish(Product),
    Emit(MapEvent),
}

#[derive(Debug)]
enum Phase {
    Idle,
    AwaitingGeocode {
        session: SessionId,
        coordinate: Coordinate,
        cancel_queued: bool,
    },
    AwaitingCreate {
        session: SessionId,
        product: Product,
        cancel_queued: bool,
    },
    Editing {
        product: Product,
        id: ProductId,
    },
}

impl Phase {
    fn state(&self) -> PlacementState {
        match self {
            Self::Idle => PlacementState::Idle,
            Self::AwaitingGeocode { .. } => PlacementState::AwaitingGeocode,
            Self::AwaitingCreate { .. } => PlacementState::AwaitingCreate,
            Self::Editing { .. } => PlacementState::Editing,
        }
    }
}

/// Owns the single placement slot.
#[derive(Debug)]
pub struct PlacementSession {
    phase: Phase,
}

impl Default for PlacementSession {
    fn default() -> Self {
        Self::new()
    }
}

impl PlacementSession {
    pub fn new() -> Self {
        Self { phase: Phase::Idle }
    }

    pub fn state(&self) -> PlacementState {
        self.phase.state()
    }

    pub fn interaction_enabled(&self) -> bool {
        self.state().interaction_enabled()
    }

    pub fn snapshot(&self) -> PlacementSnapshot {
        let (pending_product, cancel_queued) = match &self.phase {
            Phase::Idle => (None, false),
            Phase::AwaitingGeocode { cancel_queued, .. } => (None, *cancel_queued),
            Phase::AwaitingCreate {
                product,
                cancel_queued,
                ..
            } => (Some(product.clone()), *cancel_queued),
            Phase::Editing { product, .. } => (Some(product.clone()), false),
        };
        PlacementSnapshot {
            state: self.state(),
            interaction_enabled: self.interaction_enabled(),
            pending_product,
            cancel_queued,
        }
    }

    /// Opens a session for a long-press at `coordinate`.
    pub fn begin(&mut self, coordinate: Coordinate) -> Result<(SessionId, Vec<Effect>), AppError> {
        if !matches!(self.phase, Phase::Idle) {
            tracing::warn!(state = %self.state(), "Long-press rejected: a placement is already open");
            return Err(AppError::invalid_state("begin placement", self.state()));
        }
        let coordinate = coordinate.validated()?;

        let session = SessionId::new();
        tracing::info!(%session, %coordinate, "Placement started");

        let mut effects = Vec::new();
        self.enter(
            Phase::AwaitingGeocode {
                session,
                coordinate,
                cancel_queued: false,
            },
            &mut effects,
        );
        effects.push(Effect::ResolveCity {
            session,
            coordinate,
        });
        Ok((session, effects))
    }

    pub fn geocode_resolved(
        &mut self,
        session: SessionId,
        result: Result<String, AppError>,
    ) -> Vec<Effect> {
        let (coordinate, cancel_queued) = match &self.phase {
            Phase::AwaitingGeocode {
                session: current,
                coordinate,
                cancel_queued,
            } if *current == session => (*coordinate, *cancel_queued),
            _ => {
                tracing::debug!(%session, "Ignoring stale geocode completion");
                return Vec::new();
            }
        };

        let mut effects = Vec::new();
        let city = match result {
            Ok(city) if !city.trim().is_empty() => city.trim().to_string(),
            Ok(_) => {
                let error = AppError::GeocodeFailure("no city at this location".to_string());
                self.abort(&error, &mut effects);
                return effects;
            }
            Err(error) => {
                self.abort(&error, &mut effects);
                return effects;
            }
        };

        if cancel_queued {
            // Nothing exists remotely yet, so there is nothing to delete.
            tracing::info!(%session, "Queued cancel applied before create");
            self.close(PlacementState::Cancelled, &mut effects);
            return effects;
        }

        let product = Product::placeholder(coordinate, city);
        tracing::info!(%session, city = %product.city, "City resolved, creating record");
        self.enter(
            Phase::AwaitingCreate {
                session,
                product: product.clone(),
                cancel_queued: false,
            },
            &mut effects,
        );
        effects.push(Effect::CreateRecord { session, product });
        effects
    }

    pub fn create_resolved(
        &mut self,
        session: SessionId,
        result: Result<ProductId, AppError>,
    ) -> Vec<Effect> {
        let (product, cancel_queued) = match &self.phase {
            Phase::AwaitingCreate {
                session: current,
                product,
                cancel_queued,
            } if *current == session => (product.clone(), *cancel_queued),
            _ => {
                tracing::debug!(%session, "Ignoring stale create completion");
                return Vec::new();
            }
        };

        let mut effects = Vec::new();
        let id = match result {
            Ok(id) => id,
            Err(error) => {
                self.abort(&error, &mut effects);
                return effects;
            }
        };

        let product = product.with_id(id.clone());
        if cancel_queued {
            tracing::info!(%session, product_id = %id, "Queued cancel applied, deleting record");
            self.push_state(PlacementState::Cancelling, &mut effects);
            effects.push(Effect::DeleteRecord {
                id,
                city: product.city,
            });
            self.close(PlacementState::Cancelled, &mut effects);
            return effects;
        }

        tracing::info!(%session, product_id = %id, "Record created, awaiting details");
        self.enter(
            Phase::Editing {
                product: product.clone(),
                id,
            },
            &mut effects,
        );
        effects.push(Effect::Emit(MapEvent::MarkerAdded { product }));
        effects
    }

    /// Finalizes the record with user-entered metadata.
    ///
    /// `city`, `coordinate` and `upvote_count` are carried over untouched.
    pub fn confirm(&mut self, fields: ProductFields) -> Result<(Product, Vec<Effect>), AppError> {
        let (product, id) = match &self.phase {
            Phase::Editing { product, id } => (product.clone(), id.clone()),
            _ => return Err(AppError::invalid_state("confirm placement", self.state())),
        };

        let product = product.with_fields(&fields);
        tracing::info!(product_id = %id, title = %product.title, "Placement confirmed");

        let mut effects = vec![Effect::UpdateRecord {
            id,
            city: product.city.clone(),
            fields,
        }];
        effects.push(Effect::Publish(product.clone()));
        self.close(PlacementState::Confirmed, &mut effects);
        Ok((product, effects))
    }

    /// Discards the placement.
    ///
    /// Before the record id is known the cancel is queued and carried out when
    /// the in-flight call resolves; a delete is never issued without an id.
    pub fn cancel(&mut self) -> Result<(CancelOutcome, Vec<Effect>), AppError> {
        match &mut self.phase {
            Phase::Idle => Err(AppError::invalid_state("cancel placement", PlacementState::Idle)),
            Phase::AwaitingGeocode { cancel_queued, session, .. }
            | Phase::AwaitingCreate { cancel_queued, session, .. } => {
                if !*cancel_queued {
                    tracing::info!(%session, "Cancel queued until the record id is known");
                }
                *cancel_queued = true;
                Ok((CancelOutcome::Queued, Vec::new()))
            }
            Phase::Editing { product, id } => {
                let id = id.clone();
                let city = product.city.clone();
                tracing::info!(product_id = %id, "Placement cancelled");

                let mut effects = Vec::new();
                self.push_state(PlacementState::Cancelling, &mut effects);
                effects.push(Effect::DeleteRecord {
                    id: id.clone(),
                    city,
                });
                effects.push(Effect::Emit(MapEvent::MarkerRemoved {
                    product_id: id.clone(),
                }));
                self.close(PlacementState::Cancelled, &mut effects);
                Ok((CancelOutcome::Cancelled { product_id: id }, effects))
            }
        }
    }

    fn abort(&mut self, error: &AppError, effects: &mut Vec<Effect>) {
        tracing::warn!(state = %self.state(), error = %error, "Placement aborted");
        effects.push(Effect::Emit(MapEvent::operation_failed(error, None)));
        self.enter(Phase::Idle, effects);
    }

    /// Reports `terminal` and returns the slot to `Idle`.
    fn close(&mut self, terminal: PlacementState, effects: &mut Vec<Effect>) {
        debug_assert!(terminal.is_terminal());
        self.push_state(terminal, effects);
        self.enter(Phase::Idle, effects);
    }

    fn enter(&mut self, phase: Phase, effects: &mut Vec<Effect>) {
        let was_enabled = self.interaction_enabled();
        self.phase = phase;
        self.push_state(self.state(), effects);

        let enabled = self.interaction_enabled();
        if enabled != was_enabled {
            effects.push(Effect::Emit(MapEvent::InteractionChanged { enabled }));
        }
    }

    fn push_state(&self, state: PlacementState, effects: &mut Vec<Effect>) {
        effects.push(Effect::Emit(MapEvent::SessionStateChanged { state }));
    }
}
