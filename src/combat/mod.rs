pub mod arena;
pub mod session;

pub use arena::{ArenaSweep, AttackReport, CombatArena, VictoryReward};
pub use session::{CombatSession, Round, SessionStatus};
