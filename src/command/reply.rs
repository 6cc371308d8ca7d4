//! Structured replies handed back to the chat transport

use serde::Serialize;

use crate::combat::{AttackReport, CombatSession};
use crate::confirm::ApprovalRequest;
use crate::core::error::SlayerError;
use crate::encounter::Encounter;
use crate::ledger::{Purchase, ShopItem, Standing};
use crate::player::{Breathing, ItemKind, PlayerProfile};

/// What a command produced; the transport decides how to render it
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reply {
    Registered {
        profile: PlayerProfile,
    },
    BreathingRolled {
        breathing: Breathing,
    },
    Status {
        profile: PlayerProfile,
        breathing: Option<Breathing>,
        items: Vec<(ItemKind, u32)>,
    },
    StaminaClaimed {
        gained: u64,
        stamina: u64,
    },
    StarterPack {
        profile: PlayerProfile,
    },
    PriceList {
        items: Vec<ShopItem>,
    },
    Purchased {
        purchase: Purchase,
    },
    Leaderboard {
        standings: Vec<Standing>,
    },
    Spawned {
        encounter: Encounter,
    },
    FightStarted {
        encounter: Encounter,
        session: CombatSession,
    },
    Attacked {
        report: AttackReport,
    },
    Exchange {
        request: ApprovalRequest,
    },
    Pending {
        requests: Vec<ApprovalRequest>,
    },
    Failure {
        message: String,
        retryable: bool,
    },
}

impl Reply {
    pub fn is_failure(&self) -> bool {
        matches!(self, Reply::Failure { .. })
    }

    /// One-line human rendering for plain-text transports
    pub fn summary(&self) -> String {
        match self {
            Reply::Registered { profile } => format!(
                "Welcome to the Corps, {}! Stamina {}, coins {}.",
                profile.username, profile.stamina, profile.coins
            ),
            Reply::BreathingRolled { breathing } => {
                format!("Your breathing style is {}.", breathing)
            }
            Reply::Status {
                profile,
                breathing,
                items,
            } => {
                let breathing = breathing.map_or("not rolled".to_string(), |b| b.to_string());
                let items = if items.is_empty() {
                    "nothing".to_string()
                } else {
                    items
                        .iter()
                        .map(|(item, count)| format!("{} x{}", item, count))
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                format!(
                    "{} | level {} | exp {} | stamina {} | coins {} | breathing {} | items: {}",
                    profile.username,
                    profile.level,
                    profile.experience,
                    profile.stamina,
                    profile.coins,
                    breathing,
                    items
                )
            }
            Reply::StaminaClaimed { gained, stamina } => {
                format!("+{} stamina (now {}).", gained, stamina)
            }
            Reply::StarterPack { profile } => format!(
                "Starter pack claimed: beginner sword added, stamina {}, coins {}.",
                profile.stamina, profile.coins
            ),
            Reply::PriceList { items } => items
                .iter()
                .map(|entry| format!("{}. {} - {} coins", entry.number, entry.item, entry.price))
                .collect::<Vec<_>>()
                .join("\n"),
            Reply::Purchased { purchase } => format!(
                "Bought {} x{} for {} coins ({} left).",
                purchase.item, purchase.quantity, purchase.cost, purchase.coins_left
            ),
            Reply::Leaderboard { standings } => {
                if standings.is_empty() {
                    return "No slayers yet.".to_string();
                }
                standings
                    .iter()
                    .map(|s| {
                        format!(
                            "#{} {} - level {} ({} exp)",
                            s.rank, s.username, s.level, s.experience
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            Reply::Spawned { encounter } => format!(
                "A {} appeared! Type !fight {} within {} seconds.",
                encounter.monster.name,
                encounter.id.short(),
                encounter.expires_at.saturating_sub(encounter.created_at)
            ),
            Reply::FightStarted { session, .. } => format!(
                "Fight against {} begins. Your HP {}, its HP {}. Type !attack.",
                session.monster.name, session.player_hp, session.monster_hp
            ),
            Reply::Attacked { report } => {
                let round = &report.round;
                let mut line = format!(
                    "Round {}: you dealt {} to {} ({} HP left)",
                    round.number, round.player_damage, report.monster, round.monster_hp
                );
                if let Some(hit) = round.monster_damage {
                    line.push_str(&format!(", it hit back for {} (you have {})", hit, round.player_hp));
                }
                line.push('.');
                if let Some(reward) = &report.reward {
                    line.push_str(&format!(
                        " Victory! +{} exp, +{} stamina, found {}.",
                        reward.experience_gained, reward.stamina_gained, reward.item
                    ));
                    if reward.outcome.levels_gained > 0 {
                        line.push_str(&format!(" Level up: {}!", reward.outcome.level));
                    }
                } else if round.player_hp <= 0 {
                    line.push_str(" You were defeated.");
                }
                line
            }
            Reply::Exchange { request } => format!(
                "Exchange {} ({:?} {} coins) is {}.",
                request.id.short(),
                request.direction,
                request.amount,
                request.status
            ),
            Reply::Pending { requests } => {
                if requests.is_empty() {
                    return "No exchanges awaiting approval.".to_string();
                }
                requests
                    .iter()
                    .map(|r| {
                        format!(
                            "{} {} {:?} {} coins",
                            r.id.short(),
                            r.requester,
                            r.direction,
                            r.amount
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            Reply::Failure { message, retryable } => {
                if *retryable {
                    format!("{} (try again shortly)", message)
                } else {
                    message.clone()
                }
            }
        }
    }
}

impl From<SlayerError> for Reply {
    fn from(error: SlayerError) -> Self {
        Reply::Failure {
            retryable: error.is_retryable(),
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_from_error() {
        let reply = Reply::from(SlayerError::StoreUnavailable("down".into()));
        assert!(reply.is_failure());
        assert!(reply.summary().ends_with("(try again shortly)"));

        let reply = Reply::from(SlayerError::InsufficientFunds { have: 10, cost: 50 });
        match reply {
            Reply::Failure { retryable, .. } => assert!(!retryable),
            other => panic!("unexpected reply {:?}", other),
        }
    }

    #[test]
    fn test_reply_serializes_with_kind_tag() {
        let json = serde_json::to_value(Reply::StaminaClaimed {
            gained: 12,
            stamina: 112,
        })
        .unwrap();
        assert_eq!(json["kind"], "stamina_claimed");
        assert_eq!(json["gained"], 12);
    }
}
