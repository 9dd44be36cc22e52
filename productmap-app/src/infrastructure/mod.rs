pub mod cache;
pub mod events;
pub mod memory;
pub mod security;

#[cfg(feature = "remote")]
pub mod firebase;

#[cfg(feature = "remote")]
pub mod geocoding;
