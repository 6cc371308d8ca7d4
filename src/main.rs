//! Demon Slayer - interactive driver
//!
//! Reads `<player> <command>` lines from stdin and plays them against one
//! game service, so several players can be simulated from a single terminal.
//! A background sweeper releases expired encounters, fights and requests.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use ahash::AHashMap;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::watch;

use demon_slayer::command::{self, Invoker, ParseError, Reply};
use demon_slayer::core::clock::SystemClock;
use demon_slayer::core::config::GameConfig;
use demon_slayer::core::error::Result;
use demon_slayer::core::random::{Dice, SeededRandom};
use demon_slayer::core::types::PlayerId;
use demon_slayer::service::{spawn_sweeper, GameService};
use demon_slayer::store::{MemoryStore, Store};

#[derive(Parser, Debug)]
#[command(name = "demon-slayer")]
#[command(about = "Play the demon slayer game from the terminal")]
struct Args {
    /// Game configuration (TOML); built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for reproducible sessions
    #[arg(long)]
    seed: Option<u64>,

    /// Player name allowed to approve exchanges (repeatable)
    #[arg(long = "admin")]
    admins: Vec<String>,

    /// JSON snapshot loaded at start and written on exit
    #[arg(long)]
    state: Option<PathBuf>,

    /// Print replies as JSON instead of text
    #[arg(long, default_value_t = false)]
    json: bool,
}

/// Maps terminal names to player ids
struct Roster {
    ids: AHashMap<String, PlayerId>,
    next: u64,
}

impl Roster {
    fn from_store(store: &dyn Store) -> Result<Self> {
        let mut ids = AHashMap::new();
        let mut next = 1;
        for profile in store.profiles()? {
            next = next.max(profile.id.0 + 1);
            ids.insert(profile.username.to_ascii_lowercase(), profile.id);
        }
        Ok(Self { ids, next })
    }

    fn id_for(&mut self, name: &str) -> PlayerId {
        let key = name.to_ascii_lowercase();
        if let Some(id) = self.ids.get(&key) {
            return *id;
        }
        let id = PlayerId(self.next);
        self.next += 1;
        self.ids.insert(key, id);
        id
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("demon_slayer=info")),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    let sweep_interval = Duration::from_secs(config.sweep_interval_secs);

    let store = match &args.state {
        Some(path) if path.exists() => Arc::new(MemoryStore::load_json(path)?),
        _ => Arc::new(MemoryStore::new()),
    };
    let dice = match args.seed {
        Some(seed) => Dice::seeded(seed),
        None => Dice::new(SeededRandom::from_entropy()),
    };

    let mut roster = Roster::from_store(&*store)?;
    let admins: Vec<String> = args.admins.iter().map(|a| a.to_ascii_lowercase()).collect();

    let service = Arc::new(GameService::new(
        config,
        store.clone(),
        Arc::new(SystemClock::new()),
        dice,
    )?);

    let (stop_tx, stop_rx) = watch::channel(false);
    let sweeper = spawn_sweeper(service.clone(), sweep_interval, stop_rx);

    tracing::info!(seed = ?args.seed, admins = admins.len(), "Demon Slayer starting");

    println!("\n=== DEMON SLAYER ===");
    println!("Type `<player> <command>`, e.g. `tanjiro !register`.");
    println!("Commands: !register !roll !cstatus !claim !0lp !store !buy <n> <q> !leaderboard");
    println!("          !spawn !fight [id] !attack !exchange <withdraw|deposit> <amount> [evidence]");
    println!("          !evidence <id> <ref> !approve <id> !reject <id> !pending");
    println!("Type `quit` to exit.\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" || line == "q" {
            break;
        }

        let Some((name, message)) = line.split_once(char::is_whitespace) else {
            println!("Expected `<player> <command>`");
            continue;
        };

        let parsed = match command::parse(message) {
            Ok(parsed) => parsed,
            Err(ParseError::NotACommand) => {
                println!("Commands start with `!`");
                continue;
            }
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        let mut invoker = Invoker::new(roster.id_for(name), name);
        if admins.iter().any(|a| a.eq_ignore_ascii_case(name)) {
            invoker = invoker.admin();
        }

        let task_service = service.clone();
        let reply = tokio::task::spawn_blocking(move || {
            command::execute(&task_service, &invoker, parsed)
        })
        .await
        .unwrap_or_else(|e| Reply::Failure {
            message: format!("command task failed: {}", e),
            retryable: true,
        });

        if args.json {
            println!("{}", serde_json::to_string(&reply)?);
        } else {
            println!("{}", reply.summary());
        }
    }

    let _ = stop_tx.send(true);
    if let Ok(passes) = sweeper.await {
        tracing::debug!(passes, "Sweeper joined");
    }

    if let Some(path) = &args.state {
        store.save_json(path)?;
        tracing::info!(path = %path.display(), "State saved");
    }

    tracing::info!("Demon Slayer shutting down");
    Ok(())
}
