//! Parse chat messages into game commands

use thiserror::Error;

use crate::confirm::ExchangeDirection;

const PREFIX: char = '!';

/// A player command, still holding raw references to encounters and requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Register,
    RollBreathing,
    Status,
    ClaimStamina,
    StarterPack,
    PriceList,
    Buy { item: u32, quantity: i64 },
    Leaderboard,
    Spawn,
    /// Claim the named encounter, or the newest one
    Fight { encounter: Option<String> },
    Attack,
    Exchange {
        direction: ExchangeDirection,
        amount: i64,
        evidence: Option<String>,
    },
    Evidence { request: String, evidence: String },
    Approve { request: String },
    Reject { request: String },
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("not a command")]
    NotACommand,
    #[error("unknown command '!{0}'")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

/// Parse one message; anything not starting with `!` is `NotACommand`
pub fn parse(input: &str) -> Result<Command, ParseError> {
    let body = input.trim().strip_prefix(PREFIX).ok_or(ParseError::NotACommand)?;
    let mut words = body.split_whitespace();
    let name = words.next().ok_or(ParseError::NotACommand)?.to_ascii_lowercase();
    let args: Vec<&str> = words.collect();

    let command = match name.as_str() {
        "register" => Command::Register,
        "roll" => Command::RollBreathing,
        "cstatus" | "status" => Command::Status,
        "claim" => Command::ClaimStamina,
        "0lp" => Command::StarterPack,
        "store" | "shop" => Command::PriceList,
        "buy" => {
            const USAGE: &str = "!buy <item number> <quantity>";
            let (item, quantity) = match args.as_slice() {
                [item] => (*item, "1"),
                [item, quantity] => (*item, *quantity),
                _ => return Err(ParseError::Usage(USAGE)),
            };
            Command::Buy {
                item: item.parse().map_err(|_| ParseError::Usage(USAGE))?,
                quantity: quantity.parse().map_err(|_| ParseError::Usage(USAGE))?,
            }
        }
        "leaderboard" | "top" => Command::Leaderboard,
        "spawn" => Command::Spawn,
        "fight" => Command::Fight {
            encounter: args.first().map(|s| s.to_string()),
        },
        "attack" => Command::Attack,
        "exchange" => {
            const USAGE: &str = "!exchange <withdraw|deposit> <amount> [evidence]";
            let (direction, amount, evidence) = match args.as_slice() {
                [direction, amount] => (*direction, *amount, None),
                [direction, amount, rest @ ..] => (*direction, *amount, Some(rest.join(" "))),
                _ => return Err(ParseError::Usage(USAGE)),
            };
            Command::Exchange {
                direction: direction.parse().map_err(|_| ParseError::Usage(USAGE))?,
                amount: amount.parse().map_err(|_| ParseError::Usage(USAGE))?,
                evidence,
            }
        }
        "evidence" => match args.as_slice() {
            [request, rest @ ..] if !rest.is_empty() => Command::Evidence {
                request: request.to_string(),
                evidence: rest.join(" "),
            },
            _ => return Err(ParseError::Usage("!evidence <request> <reference>")),
        },
        "approve" => match args.as_slice() {
            [request] => Command::Approve {
                request: request.to_string(),
            },
            _ => return Err(ParseError::Usage("!approve <request>")),
        },
        "reject" => match args.as_slice() {
            [request] => Command::Reject {
                request: request.to_string(),
            },
            _ => return Err(ParseError::Usage("!reject <request>")),
        },
        "pending" => Command::Pending,
        other => return Err(ParseError::Unknown(other.to_string())),
    };
    Ok(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_chat_ignored() {
        assert_eq!(parse("hello there"), Err(ParseError::NotACommand));
        assert_eq!(parse("!"), Err(ParseError::NotACommand));
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse("!register"), Ok(Command::Register));
        assert_eq!(parse("  !CStatus "), Ok(Command::Status));
        assert_eq!(parse("!0lp"), Ok(Command::StarterPack));
        assert_eq!(parse("!fight"), Ok(Command::Fight { encounter: None }));
    }

    #[test]
    fn test_buy_arguments() {
        assert_eq!(parse("!buy 2 3"), Ok(Command::Buy { item: 2, quantity: 3 }));
        assert_eq!(parse("!buy 1"), Ok(Command::Buy { item: 1, quantity: 1 }));
        assert_eq!(parse("!buy 1 -4"), Ok(Command::Buy { item: 1, quantity: -4 }));
        assert!(matches!(parse("!buy sword"), Err(ParseError::Usage(_))));
    }

    #[test]
    fn test_exchange_keeps_evidence_text() {
        assert_eq!(
            parse("!exchange deposit 250 txn 8841"),
            Ok(Command::Exchange {
                direction: ExchangeDirection::Deposit,
                amount: 250,
                evidence: Some("txn 8841".to_string()),
            })
        );
        assert!(matches!(parse("!exchange sideways 5"), Err(ParseError::Usage(_))));
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(parse("!dance"), Err(ParseError::Unknown("dance".to_string())));
    }
}
