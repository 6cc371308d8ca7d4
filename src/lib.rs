//! Demon Slayer - persistent multiplayer progression game
//!
//! Players register, roll a breathing style, race each other to claim
//! spawned demons and fight them turn by turn. All resource changes go
//! through the progression ledger; coin exchanges need an approver.

pub mod combat;
pub mod command;
pub mod confirm;
pub mod cooldown;
pub mod core;
pub mod encounter;
pub mod ledger;
pub mod player;
pub mod service;
pub mod store;
