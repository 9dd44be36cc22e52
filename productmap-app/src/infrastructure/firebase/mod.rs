mod client;
mod types;

pub use client::FirebaseStore;
pub use types::ProductDocument;
