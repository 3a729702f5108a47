// ABOUTME: CLI for inspecting site configs: compiles each site's crawl strategy and prints it as JSON.
// ABOUTME: Useful for checking start URLs, allowed domains and link rules before a crawl.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;
use misinfo_extract::logging::init_tracing;
use misinfo_extract::{load_registry, CrawlPlan};
use serde_json::json;

/// Compile site configs into crawl plans and output JSON.
#[derive(Parser, Debug)]
#[command(name = "misinfo-cli")]
#[command(about = "Print the crawl plan for configured sites", long_about = None)]
struct Args {
    /// YAML file of site configs keyed by site name.
    config: PathBuf,

    /// Only plan this site.
    #[arg(long)]
    site: Option<String>,

    /// Article limit for the crawl; 0 means unlimited.
    #[arg(long, default_value_t = 0)]
    max_articles: u32,

    /// Output compact JSON instead of pretty.
    #[arg(long, default_value_t = false)]
    compact: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let registry = load_registry(&args.config)?;
    let sites: Vec<_> = match &args.site {
        Some(name) => vec![registry
            .get(name)
            .ok_or_else(|| anyhow!("site {:?} not found in {:?}", name, args.config))?],
        None => registry.iter().collect(),
    };

    let results: Vec<_> = sites
        .iter()
        .map(|config| match CrawlPlan::from_config(config, args.max_articles) {
            Ok(plan) => json!({
                "site_name": config.site_name,
                "ok": true,
                "plan": plan,
                "error": null
            }),
            Err(err) => json!({
                "site_name": config.site_name,
                "ok": false,
                "plan": null,
                "error": err.to_string()
            }),
        })
        .collect();

    // A single site that compiled is printed bare; anything else gets an envelope.
    let output = match results.as_slice() {
        [only] if only["ok"] == json!(true) => only["plan"].clone(),
        _ => {
            let planned = results.iter().filter(|r| r["ok"] == json!(true)).count();
            json!({
                "sites": results,
                "total_sites": results.len(),
                "planned": planned,
                "failed": results.len() - planned
            })
        }
    };

    if args.compact {
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&output)?);
    }

    Ok(())
}
