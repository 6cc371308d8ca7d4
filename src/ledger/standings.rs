//! Leaderboard

use serde::Serialize;

use crate::core::error::Result;
use crate::core::types::PlayerId;
use crate::ledger::progression::ProgressionLedger;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standing {
    pub rank: usize,
    pub player: PlayerId,
    pub username: String,
    pub level: u32,
    pub experience: u64,
    pub coins: u64,
    pub stamina: u64,
}

impl ProgressionLedger {
    /// Top registered players by level, then experience, then id
    pub fn leaderboard(&self, limit: usize) -> Result<Vec<Standing>> {
        let mut profiles: Vec<_> = self
            .store
            .profiles()?
            .into_iter()
            .filter(|p| p.registered)
            .collect();
        profiles.sort_by(|a, b| {
            b.level
                .cmp(&a.level)
                .then(b.experience.cmp(&a.experience))
                .then(a.id.cmp(&b.id))
        });

        Ok(profiles
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(i, p)| Standing {
                rank: i + 1,
                player: p.id,
                username: p.username,
                level: p.level,
                experience: p.experience,
                coins: p.coins,
                stamina: p.stamina,
            })
            .collect())
    }
}
