use super::placement_session::{Effect, PlacementSession};
use super::{BackgroundTasks, Geocoder, RemoteStore};
use crate::domain::{
    CancelOutcome, Coordinate, MapEvent, PlacementSnapshot, PlacementState, Product,
    ProductFields,
};
use crate::infrastructure::cache::ProductCache;
use crate::infrastructure::events::EventBus;
use productmap_errors::AppError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

pub const DEFAULT_GEOCODE_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs the placement session against the real collaborators.
///
/// Gesture calls and remote completions all go through the same session
/// lock, and events are published while it is held, so subscribers observe
/// transitions in the order they happened.
#[derive(Clone)]
pub struct PlacementCoordinator {
    inner: Arc<Inner>,
}

struct Inner {
    session: Mutex<PlacementSession>,
    store: Arc<dyn RemoteStore>,
    geocoder: Arc<dyn Geocoder>,
    cache: ProductCache,
    events: EventBus,
    tasks: Arc<BackgroundTasks>,
    geocode_timeout: Duration,
}

impl PlacementCoordinator {
    pub fn new(
        store: Arc<dyn RemoteStore>,
        geocoder: Arc<dyn Geocoder>,
        cache: ProductCache,
        events: EventBus,
        tasks: Arc<BackgroundTasks>,
        geocode_timeout: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                session: Mutex::new(PlacementSession::new()),
                store,
                geocoder,
                cache,
                events,
                tasks,
                geocode_timeout,
            }),
        }
    }

    /// Starts a placement at `coordinate`. Returns once the geocode request is
    /// dispatched; the rest of the chain runs in the background.
    pub async fn begin_placement(&self, coordinate: Coordinate) -> Result<PlacementSnapshot, AppError> {
        let mut session = self.inner.session.lock().await;
        let (_, effects) = session.begin(coordinate)?;
        self.inner.dispatch(effects);
        Ok(session.snapshot())
    }

    pub async fn confirm_placement(&self, fields: ProductFields) -> Result<Product, AppError> {
        let mut session = self.inner.session.lock().await;
        let (product, effects) = session.confirm(fields)?;
        self.inner.dispatch(effects);
        Ok(product)
    }

    pub async fn cancel_placement(&self) -> Result<CancelOutcome, AppError> {
        let mut session = self.inner.session.lock().await;
        let (outcome, effects) = session.cancel()?;
        self.inner.dispatch(effects);
        Ok(outcome)
    }

    pub async fn snapshot(&self) -> PlacementSnapshot {
        self.inner.session.lock().await.snapshot()
    }

    pub async fn state(&self) -> PlacementState {
        self.inner.session.lock().await.state()
    }

    pub async fn interaction_enabled(&self) -> bool {
        self.inner.session.lock().await.interaction_enabled()
    }

    /// Waits for every in-flight remote call to settle.
    pub async fn flush(&self) {
        self.inner.tasks.flush().await;
    }
}

impl Inner {
    /// Carries out `effects`. Must be called with the session lock held.
    fn dispatch(self: &Arc<Self>, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Emit(event) => self.events.emit(event),
                Effect::Publish(product) => {
                    if let Err(e) = self.cache.publish(product) {
                        tracing::error!("Confirmed product could not be cached: {}", e);
                    }
                }
                Effect::ResolveCity {
                    session,
                    coordinate,
                } => {
                    let inner = Arc::clone(self);
                    self.tasks.spawn(async move {
                        let result = tokio::time::timeout(
                            inner.geocode_timeout,
                            inner.geocoder.resolve_city(coordinate),
                        )
                        .await
                        .unwrap_or_else(|_| {
                            Err(AppError::GeocodeFailure(format!(
                                "no answer within {:?}",
                                inner.geocode_timeout
                            )))
                        });

                        let mut state = inner.session.lock().await;
                        let effects = state.geocode_resolved(session, result);
                        inner.dispatch(effects);
                    });
                }
                Effect::CreateRecord { session, product } => {
                    let inner = Arc::clone(self);
                    self.tasks.spawn(async move {
                        let result = inner.store.create(&product).await;
                        if let Err(e) = &result {
                            tracing::error!(city = %product.city, "Create failed: {}", e);
                        }

                        let mut state = inner.session.lock().await;
                        let effects = state.create_resolved(session, result);
                        inner.dispatch(effects);
                    });
                }
                Effect::UpdateRecord { id, city, fields } => {
                    let inner = Arc::clone(self);
                    self.tasks.spawn(async move {
                        // The session is already closed; a failure leaves the
                        // remote record with empty metadata.
                        if let Err(e) = inner.store.update(&id, &city, &fields).await {
                            tracing::error!(product_id = %id, "Update failed: {}", e);
                            inner.events.emit(MapEvent::operation_failed(&e, Some(id)));
                        }
                    });
                }
                Effect::DeleteRecord { id, city } => {
                    let inner = Arc::clone(self);
                    self.tasks.spawn(async move {
                        if let Err(e) = inner.store.delete(&id, &city).await {
                            tracing::error!(product_id = %id, "Delete failed: {}", e);
                            inner.events.emit(MapEvent::operation_failed(&e, Some(id)));
                        }
                    });
                }
            }
        }
    }
}
