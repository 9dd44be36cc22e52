use super::{BackgroundTasks, RemoteStore};
use crate::domain::{upvote_label, MapEvent, UpvotePolicy, UpvoteRequest, UpvoteResult};
use crate::infrastructure::cache::ProductCache;
use crate::infrastructure::events::EventBus;
use crate::infrastructure::security::InputSanitizer;
use productmap_errors::AppError;
use std::sync::Arc;

/// Optimistic upvotes on confirmed products.
///
/// Every tap counts: the local count goes up immediately and one remote
/// increment is fired per tap, without de-duplication.
#[derive(Clone)]
pub struct UpvoteCoordinator {
    store: Arc<dyn RemoteStore>,
    cache: ProductCache,
    events: EventBus,
    tasks: Arc<BackgroundTasks>,
    policy: UpvotePolicy,
}

impl UpvoteCoordinator {
    pub fn new(
        store: Arc<dyn RemoteStore>,
        cache: ProductCache,
        events: EventBus,
        tasks: Arc<BackgroundTasks>,
        policy: UpvotePolicy,
    ) -> Self {
        Self {
            store,
            cache,
            events,
            tasks,
            policy,
        }
    }

    pub fn upvote(&self, request: UpvoteRequest) -> Result<UpvoteResult, AppError> {
        InputSanitizer::validate_upvote(&request)?;

        // Only confirmed products are cached, so placeholders can't be upvoted.
        let product = self.cache.get(&request.product_id).ok_or(AppError::NotFound)?;
        if product.city != request.city {
            return Err(AppError::InvalidInput(format!(
                "product {} is not in {}",
                request.product_id, request.city
            )));
        }

        let count = self
            .cache
            .increment_upvotes(&request.product_id)
            .ok_or(AppError::NotFound)?;
        tracing::info!(product_id = %request.product_id, count, "Upvote applied locally");
        self.events.emit(MapEvent::UpvoteCountChanged {
            product_id: request.product_id.clone(),
            count,
        });

        self.send_increment(request.clone());

        Ok(UpvoteResult {
            product_id: request.product_id,
            count,
            label: upvote_label(count).to_string(),
        })
    }

    pub async fn flush(&self) {
        self.tasks.flush().await;
    }

    fn send_increment(&self, request: UpvoteRequest) {
        let store = Arc::clone(&self.store);
        let cache = self.cache.clone();
        let events = self.events.clone();
        let policy = self.policy;

        self.tasks.spawn(async move {
            let Err(e) = store
                .increment_upvote(&request.product_id, &request.city)
                .await
            else {
                return;
            };

            tracing::warn!(
                product_id = %request.product_id,
                ?policy,
                "Remote upvote failed: {}",
                e
            );
            events.emit(MapEvent::operation_failed(&e, Some(request.product_id.clone())));

            if policy == UpvotePolicy::RollBack {
                if let Some(count) = cache.decrement_upvotes(&request.product_id) {
                    events.emit(MapEvent::UpvoteCountChanged {
                        product_id: request.product_id,
                        count,
                    });
                }
            }
        });
    }
}
