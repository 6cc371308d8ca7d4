//! Game service: one clock, one dice, one store, every subsystem wired together

pub mod game;
pub mod sweeper;

pub use game::{GameService, SweepReport};
pub use sweeper::spawn_sweeper;
