use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use tracing::debug;
use trol_codec::JsonCodec;
use trol_core::{Holder, Property};
use trol_store::DirStore;

use crate::cli::*;
use crate::config::CliConfig;

/// What a command did, before rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Value { key: String, text: String },
    /// Written and committed.
    Stored { key: String },
    /// Cached only; autocommit resolved false.
    Staged { key: String },
    /// The store refused the commit.
    Refused { key: String },
    Deleted { key: String, existed: bool },
    Exists { key: String, present: bool },
}

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let outcome = execute(&cli)?;
    render(&outcome);
    Ok(())
}

pub fn execute(cli: &Cli) -> anyhow::Result<Outcome> {
    let config = match &cli.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };
    let root = cli.root.clone().unwrap_or(config.store.root);
    let store = DirStore::open(&root)
        .with_context(|| format!("opening store at {}", root.display()))?;

    let target = cli.command.target();
    let mut holder = Holder::new(Arc::new(store)).with_policy(config.policy);
    if let Some(owner) = &target.owner {
        holder = holder.with_key(owner.clone());
    }
    dispatch(&cli.command, &holder)
}

/// Run `command` against properties owned by `holder`.
pub fn dispatch(command: &Command, holder: &Holder) -> anyhow::Result<Outcome> {
    match command.target().codec {
        CodecKind::Str => drive(
            holder,
            Property::<String>::native(),
            command,
            |s| Ok(s.to_string()),
            |v| v.clone(),
        ),
        CodecKind::Int => drive(
            holder,
            Property::<i64>::native(),
            command,
            |s| s.parse().with_context(|| format!("{s:?} is not an integer")),
            |v| v.to_string(),
        ),
        CodecKind::Float => drive(
            holder,
            Property::<f64>::native(),
            command,
            |s| s.parse().with_context(|| format!("{s:?} is not a number")),
            |v| v.to_string(),
        ),
        CodecKind::Bytes => drive(
            holder,
            Property::<Vec<u8>>::native(),
            command,
            |s| hex::decode(s).with_context(|| format!("{s:?} is not hex")),
            |v| hex::encode(v),
        ),
        CodecKind::Json => drive(
            holder,
            Property::with_codec(JsonCodec::<serde_json::Value>::new()),
            command,
            |s| serde_json::from_str(s).with_context(|| format!("{s:?} is not JSON")),
            |v| v.to_string(),
        ),
    }
}

fn drive<T>(
    holder: &Holder,
    property: Property<T>,
    command: &Command,
    parse: impl Fn(&str) -> anyhow::Result<T>,
    show: impl Fn(&T) -> String,
) -> anyhow::Result<Outcome>
where
    T: Clone + Send + Sync + 'static,
{
    let property = property.named(command.target().name.clone());
    let key = property.key(holder)?;
    debug!(%key, codec = ?command.target().codec, "resolved property");
    match command {
        Command::Get(args) => {
            let property = if args.fresh {
                property.alwaysfetch(true)
            } else {
                property
            };
            let value = property.read(holder)?;
            Ok(Outcome::Value {
                key,
                text: show(&value),
            })
        }
        Command::Set(args) => {
            let value = parse(&args.value)?;
            property.stage(holder, value);
            if !property.resolve_autocommit(holder) {
                return Ok(Outcome::Staged { key });
            }
            if property.commit(holder)? {
                Ok(Outcome::Stored { key })
            } else {
                Ok(Outcome::Refused { key })
            }
        }
        Command::Del(_) => {
            let existed = property.delete(holder)?;
            Ok(Outcome::Deleted { key, existed })
        }
        Command::Exists(_) => {
            let present = property.exists(holder)?;
            Ok(Outcome::Exists { key, present })
        }
    }
}

fn render(outcome: &Outcome) {
    match outcome {
        Outcome::Value { text, .. } => println!("{text}"),
        Outcome::Stored { key } => {
            println!("{} Stored {}", "✓".green().bold(), key.bold())
        }
        Outcome::Staged { key } => println!(
            "{} {} staged but not committed (autocommit is off)",
            "!".yellow().bold(),
            key.bold()
        ),
        Outcome::Refused { key } => {
            println!("{} Store refused {}", "✗".red().bold(), key.bold())
        }
        Outcome::Deleted { key, existed: true } => {
            println!("{} Deleted {}", "✓".green().bold(), key.bold())
        }
        Outcome::Deleted { key, existed: false } => {
            println!("{} was not set", key.dimmed())
        }
        Outcome::Exists { present, .. } => {
            if *present {
                println!("{}", "true".green())
            } else {
                println!("{}", "false".red())
            }
        }
    }
}
