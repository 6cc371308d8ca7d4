//! Progression ledger: experience, level, stamina, coins and inventory grants
//!
//! All writes to a player's economy go through `ProgressionLedger` and are
//! serialized per player.

pub mod onboarding;
pub mod progression;
pub mod shop;
pub mod standings;

pub use progression::{level_after_reward, ProgressionLedger, RewardOutcome};
pub use shop::{shop_item, Purchase, ShopItem, PRICE_LIST};
pub use standings::Standing;
