//! donor-gen: writes a synthetic nonprofit donor dataset to SQLite.
//!
//! Usage:
//!   donor-gen --seed 12345 --db donor_data.db
//!   donor-gen --seed 7 --config data/generator_config.json --constituents 1000
//!   donor-gen --seed 7 --as-of 2025-01-31 --json

use anyhow::{Context, Result};
use chrono::NaiveDate;
use donor_sim_core::{config::GeneratorConfig, engine::GeneratorEngine, store::DatasetStore};
use std::env;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let db = string_arg(&args, "--db").unwrap_or("donor_data.db");
    let json = args.iter().any(|a| a == "--json");

    let mut config = match string_arg(&args, "--config") {
        Some(path) => GeneratorConfig::load(path)?,
        None => GeneratorConfig::default(),
    };
    if let Some(n) = string_arg(&args, "--constituents") {
        config.constituent_count = n
            .parse()
            .with_context(|| format!("--constituents expects a count, got '{n}'"))?;
    }
    if let Some(d) = string_arg(&args, "--as-of") {
        config.as_of = NaiveDate::parse_from_str(d, "%Y-%m-%d")
            .with_context(|| format!("--as-of expects YYYY-MM-DD, got '{d}'"))?;
    }
    config.validate()?;

    if !json {
        println!("donor-gen");
        println!("  seed:          {seed}");
        println!("  db:            {db}");
        println!("  window:        {} .. {}", config.start_date, config.end_date);
        println!("  as_of:         {}", config.as_of);
        println!("  constituents:  {}", config.constituent_count);
        println!();
    }

    let store = DatasetStore::open(db)?;
    store.migrate()?;
    let started_at = chrono::Utc::now().timestamp();
    let run_id = format!("run-{seed}-{started_at}");
    store.insert_run(&run_id, seed, env!("CARGO_PKG_VERSION"), started_at)?;
    log::info!("run {run_id} started: seed={seed} db={db}");

    let mut engine = GeneratorEngine::build(run_id.clone(), seed, config, store);
    engine.run()?;

    let counts = engine.store.row_counts(&run_id)?;
    let rows: usize = counts.iter().map(|(_, n)| n).sum();
    log::info!("run {run_id} finished: {rows} rows across {} tables", counts.len());
    if json {
        let tables: serde_json::Map<String, serde_json::Value> = counts
            .iter()
            .map(|(t, n)| (t.to_string(), serde_json::Value::from(*n)))
            .collect();
        let summary = serde_json::json!({ "run_id": run_id, "seed": seed, "tables": tables });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&engine, &run_id, &counts);
    }
    Ok(())
}

fn print_summary(engine: &GeneratorEngine, run_id: &str, counts: &[(&str, usize)]) {
    let data = engine.dataset();
    let total: f64 = data.transactions.iter().map(|t| t.amount).sum();

    println!("=== RUN SUMMARY ===");
    println!("  run_id:        {run_id}");
    for (table, rows) in counts {
        println!("  {:<16} {rows}", format!("{table}:"));
    }
    println!("  total giving:  {total:.2}");
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    string_arg(args, flag)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
