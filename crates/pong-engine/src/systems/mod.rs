pub mod overlay;
pub mod snapshot;
