//! Fixed-price shop

use serde::Serialize;

use crate::core::error::{Result, SlayerError};
use crate::core::types::PlayerId;
use crate::ledger::progression::{debit, ProgressionLedger};
use crate::player::ItemKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShopItem {
    pub number: u32,
    pub item: ItemKind,
    pub price: u64,
}

pub const PRICE_LIST: [ShopItem; 3] = [
    ShopItem { number: 1, item: ItemKind::Sword, price: 100 },
    ShopItem { number: 2, item: ItemKind::StaminaPotion, price: 50 },
    ShopItem { number: 3, item: ItemKind::ExpBoost, price: 200 },
];

pub fn shop_item(number: u32) -> Result<&'static ShopItem> {
    PRICE_LIST
        .iter()
        .find(|entry| entry.number == number)
        .ok_or(SlayerError::UnknownItem(number))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Purchase {
    pub item: ItemKind,
    pub quantity: u32,
    pub cost: u64,
    pub coins_left: u64,
}

impl ProgressionLedger {
    /// Spend coins and receive the items in one step
    pub fn buy(&self, player: PlayerId, number: u32, quantity: i64) -> Result<Purchase> {
        let entry = shop_item(number)?;
        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|q| *q > 0)
            .ok_or(SlayerError::InvalidQuantity(quantity))?;
        let cost = entry
            .price
            .checked_mul(quantity as u64)
            .ok_or(SlayerError::ValueOverflow("purchase cost"))?;

        let coins_left = self.mutate_with_inventory(player, |p, inventory| {
            let left = debit(p, cost)?;
            inventory.add(entry.item, quantity);
            Ok(left)
        })?;

        tracing::info!(%player, item = %entry.item, quantity, cost, "Purchase completed");
        Ok(Purchase {
            item: entry.item,
            quantity,
            cost,
            coins_left,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GameConfig;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    fn ledger_with_coins(coins: i64) -> ProgressionLedger {
        let ledger =
            ProgressionLedger::new(Arc::new(MemoryStore::new()), Arc::new(GameConfig::default()));
        ledger.register(PlayerId(1), "shinobu").unwrap();
        ledger.apply_coins_delta(PlayerId(1), coins).unwrap();
        ledger
    }

    #[test]
    fn test_buy_deducts_and_stocks() {
        let ledger = ledger_with_coins(250);
        let purchase = ledger.buy(PlayerId(1), 2, 3).unwrap();
        assert_eq!(purchase.cost, 150);
        assert_eq!(purchase.coins_left, 100);
        assert_eq!(
            ledger.inventory(PlayerId(1)).unwrap().count(ItemKind::StaminaPotion),
            3
        );
    }

    #[test]
    fn test_buy_without_funds_changes_nothing() {
        let ledger = ledger_with_coins(150);
        assert!(matches!(
            ledger.buy(PlayerId(1), 3, 1),
            Err(SlayerError::InsufficientFunds { have: 150, cost: 200 })
        ));
        assert_eq!(ledger.profile(PlayerId(1)).unwrap().coins, 150);
        assert!(ledger.inventory(PlayerId(1)).unwrap().is_empty());
    }

    #[test]
    fn test_buy_validates_input() {
        let ledger = ledger_with_coins(500);
        assert!(matches!(ledger.buy(PlayerId(1), 9, 1), Err(SlayerError::UnknownItem(9))));
        assert!(matches!(ledger.buy(PlayerId(1), 1, 0), Err(SlayerError::InvalidQuantity(0))));
        assert!(matches!(ledger.buy(PlayerId(1), 1, -2), Err(SlayerError::InvalidQuantity(-2))));
    }
}
