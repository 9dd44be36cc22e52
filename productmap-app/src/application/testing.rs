//! Recording fakes for the store and geocoder ports.

use super::{Geocoder, RemoteStore};
use crate::domain::{Coordinate, MapEvent, Product, ProductFields, ProductId};
use async_trait::async_trait;
use productmap_errors::AppError;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, Notify};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Create,
    Update,
    Delete,
    Increment,
    Read,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    Create(Product),
    Update(ProductId, String, ProductFields),
    Delete(ProductId, String),
    Increment(ProductId, String),
    Fetch(ProductId, String),
    List(String),
}

#[derive(Default)]
pub struct FakeStore {
    calls: Mutex<Vec<StoreCall>>,
    failing: Mutex<HashSet<StoreOp>>,
    next_id: Mutex<Option<String>>,
    listed: Mutex<Vec<Product>>,
    create_gate: Option<Arc<Notify>>,
    increment_gate: Option<Arc<Notify>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose `create` waits until the returned gate is notified.
    pub fn with_create_gate() -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let store = Self {
            create_gate: Some(Arc::clone(&gate)),
            ..Self::default()
        };
        (store, gate)
    }

    /// Store whose `increment_upvote` waits until the returned gate is notified.
    pub fn with_increment_gate() -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let store = Self {
            increment_gate: Some(Arc::clone(&gate)),
            ..Self::default()
        };
        (store, gate)
    }

    pub fn fail(self, op: StoreOp) -> Self {
        self.failing.lock().unwrap().insert(op);
        self
    }

    pub fn next_id(self, id: &str) -> Self {
        *self.next_id.lock().unwrap() = Some(id.to_string());
        self
    }

    pub fn listing(self, products: Vec<Product>) -> Self {
        *self.listed.lock().unwrap() = products;
        self
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn creates(&self) -> usize {
        self.count(|c| matches!(c, StoreCall::Create(_)))
    }

    pub fn deletes(&self) -> Vec<(ProductId, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                StoreCall::Delete(id, city) => Some((id, city)),
                _ => None,
            })
            .collect()
    }

    pub fn increments(&self) -> usize {
        self.count(|c| matches!(c, StoreCall::Increment(..)))
    }

    fn count(&self, f: impl Fn(&StoreCall) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| f(*c)).count()
    }

    fn record(&self, call: StoreCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn fails(&self, op: StoreOp) -> bool {
        self.failing.lock().unwrap().contains(&op)
    }
}

#[async_trait]
impl RemoteStore for FakeStore {
    async fn create(&self, product: &Product) -> Result<ProductId, AppError> {
        self.record(StoreCall::Create(product.clone()));
        if let Some(gate) = &self.create_gate {
            gate.notified().await;
        }
        if self.fails(StoreOp::Create) {
            return Err(AppError::StoreCreateFailure("fake create failure".into()));
        }
        let id = self
            .next_id
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| "abc123".to_string());
        Ok(ProductId::new(id))
    }

    async fn update(
        &self,
        id: &ProductId,
        city: &str,
        fields: &ProductFields,
    ) -> Result<(), AppError> {
        self.record(StoreCall::Update(id.clone(), city.to_string(), fields.clone()));
        if self.fails(StoreOp::Update) {
            return Err(AppError::StoreUpdateFailure("fake update failure".into()));
        }
        Ok(())
    }

    async fn delete(&self, id: &ProductId, city: &str) -> Result<(), AppError> {
        self.record(StoreCall::Delete(id.clone(), city.to_string()));
        if self.fails(StoreOp::Delete) {
            return Err(AppError::StoreDeleteFailure("fake delete failure".into()));
        }
        Ok(())
    }

    async fn increment_upvote(&self, id: &ProductId, city: &str) -> Result<(), AppError> {
        self.record(StoreCall::Increment(id.clone(), city.to_string()));
        if let Some(gate) = &self.increment_gate {
            gate.notified().await;
        }
        if self.fails(StoreOp::Increment) {
            return Err(AppError::StoreIncrementFailure("fake increment failure".into()));
        }
        Ok(())
    }

    async fn fetch(&self, id: &ProductId, city: &str) -> Result<Option<Product>, AppError> {
        self.record(StoreCall::Fetch(id.clone(), city.to_string()));
        if self.fails(StoreOp::Read) {
            return Err(AppError::StoreReadFailure("fake read failure".into()));
        }
        Ok(self
            .listed
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id.as_ref() == Some(id) && p.city == city)
            .cloned())
    }

    async fn list_city(&self, city: &str) -> Result<Vec<Product>, AppError> {
        self.record(StoreCall::List(city.to_string()));
        if self.fails(StoreOp::Read) {
            return Err(AppError::StoreReadFailure("fake read failure".into()));
        }
        Ok(self
            .listed
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.city == city)
            .cloned()
            .collect())
    }
}

enum GeocodeBehavior {
    City(String),
    Fail,
    Hang,
}

pub struct FakeGeocoder {
    behavior: GeocodeBehavior,
    calls: AtomicUsize,
}

impl FakeGeocoder {
    pub fn city(city: &str) -> Self {
        Self::with(GeocodeBehavior::City(city.to_string()))
    }

    pub fn failing() -> Self {
        Self::with(GeocodeBehavior::Fail)
    }

    /// Never answers.
    pub fn hanging() -> Self {
        Self::with(GeocodeBehavior::Hang)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn with(behavior: GeocodeBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn resolve_city(&self, _coordinate: Coordinate) -> Result<String, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            GeocodeBehavior::City(city) => Ok(city.clone()),
            GeocodeBehavior::Fail => Err(AppError::GeocodeFailure("fake geocode failure".into())),
            GeocodeBehavior::Hang => std::future::pending().await,
        }
    }
}

/// Receives events until one matches `predicate`; panics after one second.
pub async fn wait_for(
    rx: &mut broadcast::Receiver<MapEvent>,
    predicate: impl Fn(&MapEvent) -> bool,
) -> MapEvent {
    tokio::time::timeout(Duration::from_secs(1), async {
        loop {
            let event = rx.recv().await.expect("event bus closed");
            if predicate(&event) {
                return event;
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}

/// Drains everything already published.
pub fn drain(rx: &mut broadcast::Receiver<MapEvent>) -> Vec<MapEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
