pub mod clock;
pub mod config;
pub mod error;
pub mod keyed;
pub mod random;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{GameConfig, LevelingPolicy};
pub use error::{Resource, Result, SlayerError};
pub use keyed::KeyedLocks;
pub use random::{Dice, RandomSource, ScriptedRandom, SeededRandom};
pub use types::{ActionKind, EncounterId, PlayerId, RequestId, SessionId, Tick};
