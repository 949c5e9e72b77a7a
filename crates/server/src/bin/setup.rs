//! One-time schema setup for the FakeDetector store.
//!
//! Creates (or additively migrates) the tables and indexes in the
//! configured SQLite file, then optionally inserts the sample analysis.
//! Seeding is chosen with `--seed` / `--no-seed`; without either flag the
//! user is asked only when stdin is a terminal, otherwise nothing is seeded.

use std::io::{BufRead, IsTerminal, Write};

use anyhow::Context;
use fakedetector::Store;
use server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_target(false)
        .init();

    let config = ServerConfig::load()?;
    let seed = choose_seed(
        seed_flag(std::env::args().skip(1)),
        std::io::stdin().is_terminal(),
        prompt_seed,
    )?;

    tracing::info!(path = %config.database_path.display(), "setting up database");

    let store = Store::open(config.store_location()).context("opening database file")?;
    store.ensure_schema().await.context("creating schema")?;
    if seed {
        store.seed_sample().await.context("inserting sample data")?;
    }
    store.close().await?;

    tracing::info!(path = %config.database_path.display(), "database setup complete");
    Ok(())
}

fn seed_flag(args: impl Iterator<Item = String>) -> Option<bool> {
    let mut flag = None;
    for arg in args {
        match arg.as_str() {
            "--seed" => flag = Some(true),
            "--no-seed" => flag = Some(false),
            other => tracing::warn!(arg = other, "ignoring unknown argument"),
        }
    }
    flag
}

/// An explicit flag wins; otherwise ask only on an interactive stdin.
fn choose_seed(
    flag: Option<bool>,
    interactive: bool,
    prompt: impl FnOnce() -> anyhow::Result<bool>,
) -> anyhow::Result<bool> {
    match flag {
        Some(seed) => Ok(seed),
        None if interactive => prompt(),
        None => Ok(false),
    }
}

fn prompt_seed() -> anyhow::Result<bool> {
    print!("Insert sample data? (y/n): ");
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    let answer = answer.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn test_seed_flags() {
        assert_eq!(seed_flag(args(&["--seed"])), Some(true));
        assert_eq!(seed_flag(args(&["--no-seed"])), Some(false));
        assert_eq!(seed_flag(args(&[])), None);
    }

    #[test]
    fn test_last_seed_flag_wins() {
        assert_eq!(seed_flag(args(&["--seed", "--no-seed"])), Some(false));
        assert_eq!(seed_flag(args(&["--no-seed", "--seed"])), Some(true));
    }

    #[test]
    fn test_prompt_only_without_flag_on_a_terminal() {
        let never = || -> anyhow::Result<bool> { panic!("prompted") };
        assert!(!choose_seed(None, false, never).unwrap());
        assert!(!choose_seed(Some(false), true, never).unwrap());
        assert!(choose_seed(Some(true), false, never).unwrap());
        assert!(choose_seed(None, true, || Ok(true)).unwrap());
    }

    #[test]
    fn test_unknown_arguments_are_ignored() {
        assert_eq!(seed_flag(args(&["--verbose", "yes"])), None);
        assert_eq!(seed_flag(args(&["extra", "--no-seed"])), Some(false));
    }
}
