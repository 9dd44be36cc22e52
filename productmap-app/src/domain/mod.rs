mod coordinate;
mod event;
mod placement;
mod product;
mod upvote;

pub use coordinate::Coordinate;
pub use event::MapEvent;
pub use placement::{CancelOutcome, PlacementSnapshot, PlacementState};
pub use product::{Product, ProductFields, ProductId};
pub use upvote::{upvote_label, UpvotePolicy, UpvoteRequest, UpvoteResult};
