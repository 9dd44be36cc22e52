use crate::application::{
    BackgroundTasks, Geocoder, PlacementCoordinator, ProductCatalog, RemoteStore, UpvoteCoordinator,
};
use crate::config::AppConfig;
use crate::infrastructure::cache::ProductCache;
use crate::infrastructure::events::EventBus;
use crate::infrastructure::memory::InMemoryStore;
use crate::presentation::MapAdapter;
#[cfg(feature = "remote")]
use productmap_errors::AppError;
use std::sync::Arc;

/// Everything the map surface needs, wired once at startup.
#[derive(Clone)]
pub struct AppContext {
    pub placement: PlacementCoordinator,
    pub upvotes: UpvoteCoordinator,
    pub catalog: ProductCatalog,
    pub adapter: MapAdapter,
    pub events: EventBus,
    pub tasks: Arc<BackgroundTasks>,
}

impl AppContext {
    pub fn new(store: Arc<dyn RemoteStore>, geocoder: Arc<dyn Geocoder>, config: &AppConfig) -> Self {
        let cache = ProductCache::new();
        let events = EventBus::new(config.event_bus_capacity);
        let tasks = Arc::new(BackgroundTasks::new());

        let placement = PlacementCoordinator::new(
            Arc::clone(&store),
            geocoder,
            cache.clone(),
            events.clone(),
            Arc::clone(&tasks),
            config.geocode_timeout,
        );
        let upvotes = UpvoteCoordinator::new(
            Arc::clone(&store),
            cache.clone(),
            events.clone(),
            Arc::clone(&tasks),
            config.upvote_policy,
        );
        let catalog = ProductCatalog::new(store, cache, events.clone());
        let adapter = MapAdapter::new(placement.clone(), upvotes.clone());

        Self {
            placement,
            upvotes,
            catalog,
            adapter,
            events,
            tasks,
        }
    }

    /// In-memory store with the given geocoder; nothing leaves the process
    /// except geocoding.
    pub fn in_memory(geocoder: Arc<dyn Geocoder>, config: &AppConfig) -> Self {
        Self::new(Arc::new(InMemoryStore::new()), geocoder, config)
    }

    #[cfg(feature = "remote")]
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        use crate::infrastructure::firebase::FirebaseStore;
        use crate::infrastructure::geocoding::NominatimGeocoder;

        let geocoder = Arc::new(NominatimGeocoder::new(&config.geocoder_url)?);

        match &config.firebase_database_url {
            Some(url) => {
                tracing::info!(database = %url, "Using Realtime Database store");
                let store = FirebaseStore::new(url, config.firebase_auth_token.clone())?;
                Ok(Self::new(Arc::new(store), geocoder, config))
            }
            None => {
                tracing::info!("FIREBASE_DATABASE_URL not set, using in-memory store");
                Ok(Self::in_memory(geocoder, config))
            }
        }
    }

    /// Waits for every fire-and-forget store call to finish.
    pub async fn shutdown(&self) {
        let pending = self.tasks.pending();
        if pending > 0 {
            tracing::info!(pending, "Waiting for background store calls");
        }
        self.tasks.flush().await;
    }
}
