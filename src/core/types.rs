//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Game time in whole time units (seconds)
pub type Tick = u64;

/// Platform identity of a player (chat user snowflake)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u64);

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "player#{}", self.0)
    }
}

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// First eight hex digits, enough to tell live entries apart in chat
            pub fn short(&self) -> String {
                self.0.simple().to_string()[..8].to_string()
            }

            /// True if `reference` is this id, with or without prefix, or a leading slice of its hex digits
            pub fn matches_ref(&self, reference: &str) -> bool {
                let raw = reference
                    .strip_prefix(concat!($prefix, "-"))
                    .unwrap_or(reference)
                    .replace('-', "")
                    .to_ascii_lowercase();
                !raw.is_empty() && self.0.simple().to_string().starts_with(&raw)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = s.strip_prefix(concat!($prefix, "-")).unwrap_or(s);
                Uuid::parse_str(raw).map(Self)
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for a spawned encounter
    EncounterId,
    "enc"
);
uuid_id!(
    /// Unique identifier for a combat session
    SessionId,
    "fight"
);
uuid_id!(
    /// Unique identifier for an approval request
    RequestId,
    "req"
);

/// Rate-limited player actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    SpawnDemon,
    ClaimStamina,
    Exchange,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::SpawnDemon => "spawn_demon",
            ActionKind::ClaimStamina => "claim_stamina",
            ActionKind::Exchange => "exchange",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_ids_are_unique() {
        assert_ne!(EncounterId::new(), EncounterId::new());
        assert_ne!(RequestId::new(), RequestId::new());
    }

    #[test]
    fn test_id_parses_with_or_without_prefix() {
        let id = SessionId::new();
        let shown = id.to_string();
        assert!(shown.starts_with("fight-"));
        assert_eq!(shown.parse::<SessionId>().ok(), Some(id));
        assert_eq!(id.0.to_string().parse::<SessionId>().ok(), Some(id));
        assert!("nonsense".parse::<SessionId>().is_err());
    }

    #[test]
    fn test_short_id_length() {
        assert_eq!(RequestId::new().short().len(), 8);
    }

    #[test]
    fn test_short_reference_matching() {
        let id = RequestId::new();
        assert!(id.matches_ref(&id.short()));
        assert!(id.matches_ref(&id.short().to_uppercase()));
        assert!(id.matches_ref(&id.to_string()));
        assert!(!id.matches_ref(""));
        assert!(!id.matches_ref("req-"));
    }

    #[test]
    fn test_action_kind_serde_names() {
        let json = serde_json::to_string(&ActionKind::ClaimStamina).unwrap();
        assert_eq!(json, "\"claim_stamina\"");
    }
}
