mod accounts;
mod cli;
mod config;
mod home;
mod journal;
mod ledger;
mod storage;
mod store;
mod user;
mod validation;

use anyhow::{Context as _, Result};
use clap::Parser;
use std::cell::RefCell;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dayplan", about = "Keep a personal list of activities")]
pub struct Args {
    #[arg(short, long, help = "Run a single command and exit (e.g. '/list')")]
    pub command: Option<String>,

    #[arg(long, env = "DAYPLAN_DATA_DIR", help = "Directory for account data")]
    pub data_dir: Option<PathBuf>,

    #[arg(long, help = "Config file path")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Keep accounts in memory only")]
    pub memory: bool,

    #[arg(long, help = "Remove activities without asking")]
    pub yes: bool,

    #[arg(long, help = "Do not write the event journal")]
    pub no_journal: bool,

    #[arg(long, help = "Verbose output (info logs)")]
    pub verbose: bool,

    #[arg(long, help = "Debug output (debug logs)")]
    pub debug: bool,
}

fn init_tracing(args: &Args) {
    let default_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_backend(
    cfg: &config::Config,
    data_dir: &std::path::Path,
) -> Result<Box<dyn storage::KeyValueStore>> {
    match cfg.storage {
        config::StorageKind::Memory => Ok(Box::new(storage::MemoryStore::new())),
        config::StorageKind::File => {
            let file_store = storage::FileStore::open(data_dir)?;
            tracing::info!(path = %file_store.path().display(), "using file storage");
            Ok(Box::new(file_store))
        }
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_tracing(&args);

    let mut cfg = if let Some(config_path) = &args.config {
        config::Config::load_from(config_path)?
    } else {
        config::Config::load()?
    };

    // CLI overrides
    if let Some(dir) = &args.data_dir {
        cfg.data_dir = Some(dir.clone());
    }
    if args.memory {
        cfg.storage = config::StorageKind::Memory;
    }
    if args.no_journal {
        cfg.journal = false;
    }

    if let Err(errors) = cfg.validate() {
        for e in &errors {
            eprintln!("Config error {}", e);
        }
        return Err(anyhow::anyhow!("invalid configuration"));
    }

    let data_dir = cfg.resolve_data_dir();
    tracing::debug!(data_dir = %data_dir.display(), storage = cfg.storage.as_str(), "starting");

    let backend = open_backend(&cfg, &data_dir)?;
    let store = store::Store::open(backend).context("failed to open account store")?;

    let session_id = uuid::Uuid::new_v4().to_string();
    let journal = if cfg.journal && cfg.storage == config::StorageKind::File {
        let path = data_dir
            .join("journal")
            .join(format!("{}.jsonl", session_id));
        Some(journal::Journal::new(&path, &session_id)?)
    } else {
        None
    };

    let ctx = cli::Context {
        args,
        config: cfg,
        store: RefCell::new(store),
        journal: RefCell::new(journal),
        session_id,
    };

    if let Some(command) = ctx.args.command.clone() {
        cli::run_once(&ctx, &command)
    } else {
        cli::run_repl(ctx)
    }
}
