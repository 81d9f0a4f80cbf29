//! Preview generated instances from definition directories.
//!
//! Run with:
//! ```
//! cargo run -p fixture-factory --bin preview -- <model> [count] [dir...]
//! ```
//!
//! Definitions are loaded from `factories/` when no directory is given:
//! ```
//! cargo run -p fixture-factory --bin preview -- admin:User 3 crates/fixture-factory/factories
//! ```
//!
//! Set `FACTORY_LOCALE` and `FACTORY_SEED` to control the generated data.

use anyhow::{Context, bail};
use fixture_factory::{Factory, FactoryConfig};
use tracing_subscriber::EnvFilter;

const DEFAULT_DIR: &str = "factories";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let Some(model) = args.next() else {
        bail!("usage: preview <model> [count] [dir...]");
    };
    let count: usize = match args.next() {
        Some(count) => count
            .parse()
            .with_context(|| format!("invalid count: {count}"))?,
        None => 1,
    };
    let mut dirs: Vec<String> = args.collect();
    if dirs.is_empty() {
        dirs.push(DEFAULT_DIR.to_string());
    }

    let config = FactoryConfig::from_env();
    tracing::info!(locale = %config.locale, seed = ?config.seed, "Starting preview");

    let mut factory = Factory::with_records(config);
    factory.load_factories(&dirs)?;

    for _ in 0..count {
        let instance = factory
            .instance(&model)
            .with_context(|| format!("failed to build {model}"))?;
        println!("{}", serde_json::to_string_pretty(&instance.to_json())?);
    }

    tracing::info!("Previewed {count} {model} instances");
    Ok(())
}
