//! Per-player, per-action rate limiting

pub mod tracker;

pub use tracker::CooldownTracker;
