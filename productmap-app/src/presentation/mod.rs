mod map_adapter;
mod viewport;

pub use map_adapter::{GesturePhase, LongPress, LongPressOutcome, MapAdapter};
pub use viewport::{MapViewport, ScreenPoint};
