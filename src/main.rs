// src/main.rs

//! Command-line access to SpinelDB-backed collections.
//!
//! Usage: `spinelqr [--config FILE] [--url URL] <KIND> <KEY> <OPERATION> [VALUE]`
//! where KIND is `deque`, `queue`, `stack` or `capped:SIZE`.

use anyhow::{Result, anyhow, bail};
use spinelqr::{CappedCollection, ConnectionConfig, Deque, ListStore, Queue, RespStore, Stack};
use std::env;
use std::sync::Arc;
use tracing::{debug, error};

const USAGE: &str = "Usage: spinelqr [--config FILE] [--url URL] <deque|queue|stack|capped:SIZE> <KEY> <push|pop|pushfront|pushback|popfront|popback|elements|json> [VALUE]";

#[tokio::main]
async fn main() -> Result<()> {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    let mut args: Vec<String> = env::args().skip(1).collect();

    if args.iter().any(|a| a == "--version") {
        println!("spinelqr version {VERSION}");
        return Ok(());
    }
    if args.is_empty() || args.iter().any(|a| a == "--help" || a == "-h") {
        println!("{USAGE}");
        return Ok(());
    }

    let config = match load_config(&mut args) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    // RUST_LOG wins over the configured level.
    let log_level = env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone());
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .compact()
        .with_ansi(true)
        .init();

    if let Err(e) = run(config, &args).await {
        error!("{}", e);
        eprintln!("{e}");
        std::process::exit(1);
    }
    Ok(())
}

/// Pulls `--config FILE` and `--url URL` out of `args`, leaving the positional arguments.
fn load_config(args: &mut Vec<String>) -> Result<ConnectionConfig> {
    let mut config = ConnectionConfig::default();

    if let Some(i) = args.iter().position(|a| a == "--config") {
        let path = args
            .get(i + 1)
            .cloned()
            .ok_or_else(|| anyhow!("--config flag requires a value"))?;
        config = ConnectionConfig::from_file(&path)?;
        args.drain(i..=i + 1);
    }

    if let Some(i) = args.iter().position(|a| a == "--url") {
        let url = args
            .get(i + 1)
            .cloned()
            .ok_or_else(|| anyhow!("--url flag requires a value"))?;
        let log_level = config.log_level.clone();
        config = ConnectionConfig::from_url(&url)?;
        config.log_level = log_level;
        config.validate()?;
        args.drain(i..=i + 1);
    }

    Ok(config)
}

/// The collection named on the command line.
enum Target {
    Deque(Deque),
    Queue(Queue),
    Stack(Stack),
    Capped(CappedCollection),
}

impl Target {
    fn parse(kind: &str, key: &str, store: Arc<dyn ListStore>) -> Result<Self> {
        match kind.split_once(':') {
            Some(("capped", size)) => {
                let size = size
                    .parse::<usize>()
                    .map_err(|_| anyhow!("invalid capped size '{size}'"))?;
                Ok(Target::Capped(CappedCollection::new(key, size, store)))
            }
            None if kind == "deque" => Ok(Target::Deque(Deque::new(key, store))),
            None if kind == "queue" => Ok(Target::Queue(Queue::new(key, store))),
            None if kind == "stack" => Ok(Target::Stack(Stack::new(key, store))),
            _ => bail!("unknown collection kind '{kind}'"),
        }
    }
}

async fn run(config: ConnectionConfig, args: &[String]) -> Result<()> {
    let [kind, key, op, rest @ ..] = args else {
        bail!("{USAGE}");
    };
    let value = rest.first().cloned();
    let need_value = || value.clone().ok_or_else(|| anyhow!("'{op}' requires a VALUE"));

    debug!("Connecting to {}", config.addr());
    let store = RespStore::connect(config).await?;
    debug!(
        "Using database {} on {}",
        store.config().database,
        store.config().addr()
    );
    let store: Arc<dyn ListStore> = Arc::new(store);
    let target = Target::parse(kind, key, store)?;

    match (op.as_str(), &target) {
        ("elements", t) => {
            for element in elements(t).await? {
                println!("{element}");
            }
        }
        ("json", t) => println!("{}", elements_as_json(t).await?),
        ("push", Target::Queue(q)) => println!("{}", q.push(need_value()?).await?),
        ("push", Target::Stack(s)) => println!("{}", s.push(need_value()?).await?),
        ("push", Target::Capped(c)) => println!("{}", c.push(need_value()?).await?),
        ("pushback", Target::Deque(d)) => println!("{}", d.pushback(need_value()?).await?),
        ("pushfront", Target::Deque(d)) => println!("{}", d.pushfront(need_value()?).await?),
        ("pop", Target::Queue(q)) => print_popped(q.pop().await?),
        ("pop", Target::Stack(s)) => print_popped(s.pop().await?),
        ("pop", Target::Capped(c)) => print_popped(c.pop().await?),
        ("popfront", Target::Deque(d)) => print_popped(d.popfront().await?),
        ("popback", Target::Deque(d)) => print_popped(d.popback().await?),
        _ => bail!("operation '{op}' is not supported by '{kind}'"),
    }
    Ok(())
}

async fn elements(target: &Target) -> Result<Vec<String>> {
    Ok(match target {
        Target::Deque(d) => d.elements().await?,
        Target::Queue(q) => q.elements().await?,
        Target::Stack(s) => s.elements().await?,
        Target::Capped(c) => c.elements().await?,
    })
}

async fn elements_as_json(target: &Target) -> Result<String> {
    Ok(match target {
        Target::Deque(d) => d.elements_as_json().await?,
        Target::Queue(q) => q.elements_as_json().await?,
        Target::Stack(s) => s.elements_as_json().await?,
        Target::Capped(c) => c.elements_as_json().await?,
    })
}

fn print_popped(popped: Option<String>) {
    match popped {
        Some(element) => println!("{element}"),
        None => println!("(nil)"),
    }
}
