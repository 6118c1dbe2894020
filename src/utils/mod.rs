/// Shared helpers
pub mod polling;

pub use polling::Poller;
