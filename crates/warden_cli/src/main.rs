//! WARDEN CLI
//!
//! Checks a JSON argument payload against a JSON signature declaration.

#![warn(missing_docs)]
#![warn(clippy::all)]

use clap::{Parser, Subcommand};
use color_eyre::eyre::{bail, WrapErr};
use color_eyre::Result;
use indexmap::IndexMap;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use warden_core::{Arg, EnforceError, Stream, Value};
use warden_engine::{enforce, Args, BoundArgs, ParamKind, Signature, SignatureSpec};
use warden_rules::RuleSpec;

#[derive(Parser)]
#[command(name = "warden")]
#[command(about = "WARDEN - declarative rules for callable parameters", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check arguments against a signature declaration
    Check {
        /// Path to signature declaration
        #[arg(short, long)]
        signature: PathBuf,
        /// Path to argument payload
        #[arg(short, long)]
        args: PathBuf,
        /// Pass this parameter's array as a lazy stream
        #[arg(long = "stream", value_name = "PARAM")]
        streams: Vec<String>,
    },
    /// List built-in rules
    Rules,
}

/// Argument payload: `{"positional": [...], "keyword": {...}}`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Payload {
    positional: Vec<serde_json::Value>,
    keyword: IndexMap<String, serde_json::Value>,
}

impl Payload {
    fn into_args(self, signature: &Signature, streams: &[String]) -> Result<Args> {
        for name in streams {
            if signature.param(name).is_none() {
                bail!("--stream {name}: no such parameter in '{}'", signature.name());
            }
        }

        let positional_names: Vec<&str> = signature
            .params()
            .iter()
            .filter(|p| p.kind() == ParamKind::PositionalOrKeyword)
            .map(|p| p.name())
            .collect();

        let mut args = Args::new();
        for (index, value) in self.positional.into_iter().enumerate() {
            let name = positional_names.get(index).copied();
            args = args.arg(to_arg(name, value, streams)?);
        }
        for (name, value) in self.keyword {
            let arg = to_arg(Some(name.as_str()), value, streams)?;
            args = args.kwarg(name, arg);
        }
        Ok(args)
    }
}

fn to_arg(name: Option<&str>, value: serde_json::Value, streams: &[String]) -> Result<Arg> {
    match name {
        Some(name) if streams.iter().any(|s| s == name) => match value {
            serde_json::Value::Array(items) => {
                Ok(Arg::Stream(Stream::new(items.into_iter().map(Value::from))))
            }
            other => bail!("--stream {name}: expected a JSON array, got {other}"),
        },
        _ => Ok(Arg::Value(Value::from(value))),
    }
}

/// Consume every argument, draining streams so lazy rules run to the end
fn drain(mut args: BoundArgs) -> Result<IndexMap<String, serde_json::Value>, EnforceError> {
    let names: Vec<String> = args.iter().map(|(name, _)| name.to_string()).collect();
    let mut out = IndexMap::with_capacity(names.len());
    for name in names {
        let value = match args.take(&name) {
            Some(Arg::Value(value)) => value,
            Some(Arg::Stream(stream)) => Value::List(stream.materialize()?),
            None => continue,
        };
        out.insert(name, value.into());
    }
    Ok(out)
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).wrap_err_with(|| format!("failed to read {}", path.display()))
}

fn check(signature: &Path, args: &Path, streams: &[String]) -> Result<()> {
    let signature = SignatureSpec::from_json(&read(signature)?)
        .and_then(SignatureSpec::into_signature)
        .wrap_err("failed to load signature")?;
    let payload: Payload =
        serde_json::from_str(&read(args)?).wrap_err("failed to parse argument payload")?;
    let args = payload.into_args(&signature, streams)?;

    let wrapped = enforce(signature, drain)?;
    let bound = wrapped.call(args)??;
    tracing::info!(function = wrapped.signature().name(), "arguments satisfy all rules");

    println!("{}", serde_json::to_string_pretty(&bound)?);
    Ok(())
}

fn rules() -> Result<()> {
    for name in RuleSpec::BUILTINS {
        let spec: RuleSpec = serde_json::from_value(serde_json::json!({ "rule": name }))?;
        let rule = spec.build();
        println!("{:<10} {:<10} {}", name, rule.name(), serde_json::to_string(&spec)?);
    }
    Ok(())
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let filter =
        EnvFilter::try_from_env("WARDEN_LOG").unwrap_or_else(|_| EnvFilter::new("warden=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            signature,
            args,
            streams,
        } => check(&signature, &args, &streams),
        Commands::Rules => rules(),
    }
}
