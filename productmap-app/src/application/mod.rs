mod background;
mod placement_coordinator;
pub mod placement_session;
mod ports;
mod product_catalog;
mod upvote_coordinator;

#[cfg(test)]
pub(crate) mod testing;

pub use background::BackgroundTasks;
pub use placement_coordinator::{PlacementCoordinator, DEFAULT_GEOCODE_TIMEOUT};
pub use placement_session::{PlacementSession, SessionId};
pub use ports::{Geocoder, RemoteStore};
pub use product_catalog::ProductCatalog;
pub use upvote_coordinator::UpvoteCoordinator;
