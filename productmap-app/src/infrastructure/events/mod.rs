mod event_bus;

pub use event_bus::{EventBus, DEFAULT_EVENT_CAPACITY};
