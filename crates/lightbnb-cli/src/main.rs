use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use lightbnb_core::{build_listing_query, ConnectionConfig, FilterCriteria};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lightbnb")]
#[command(about = "LightBnB query tooling", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Print the listing search statement and its bound parameters
    Search(SearchArgs),
    /// Print the resolved database connection settings
    Config,
}

#[derive(Args, Debug, Default)]
struct SearchArgs {
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    owner_id: Option<i64>,
    /// Minimum nightly price, in dollars
    #[arg(long)]
    min_price: Option<f64>,
    /// Maximum nightly price, in dollars
    #[arg(long)]
    max_price: Option<f64>,
    #[arg(long)]
    min_rating: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    limit: Option<i64>,
}

impl SearchArgs {
    fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            city: self.city.clone(),
            owner_id: self.owner_id,
            minimum_price_per_night: self.min_price,
            maximum_price_per_night: self.max_price,
            minimum_rating: self.min_rating,
        }
    }
}

fn explain(args: &SearchArgs) -> Result<serde_json::Value> {
    let criteria = args.criteria();
    debug!(?criteria, limit = ?args.limit, "building listing query");
    let plan = build_listing_query(&criteria, args.limit);
    info!("built listing query with {} parameters", plan.params().len());
    Ok(serde_json::json!({
        "template": plan.template(),
        "params": plan.params(),
    }))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Search(args) => {
            let out = explain(&args)?;
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Cmd::Config => {
            let cfg = ConnectionConfig::from_env();
            let out = serde_json::json!({ "url": cfg.redacted_url(), "settings": cfg });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_search_flags() {
        let cli = Cli::try_parse_from([
            "lightbnb",
            "search",
            "--city",
            "van",
            "--min-price",
            "50",
            "--limit",
            "-3",
        ])
        .unwrap();
        let Cmd::Search(args) = cli.cmd else {
            panic!("expected search");
        };
        assert_eq!(
            args.criteria(),
            FilterCriteria::default()
                .with_city("van")
                .with_minimum_price(50.0)
        );
        assert_eq!(args.limit, Some(-3));
    }

    #[test]
    fn explain_emits_template_and_params() {
        let args = SearchArgs {
            city: Some("van".into()),
            ..Default::default()
        };
        let out = explain(&args).unwrap();
        assert_eq!(out["params"], serde_json::json!(["%van%", 10]));
        assert!(out["template"].as_str().unwrap().contains("city LIKE $1"));
    }

    #[test]
    fn nan_price_flag_adds_no_filter() {
        let cli = Cli::try_parse_from(["lightbnb", "search", "--max-price", "NaN"]).unwrap();
        let Cmd::Search(args) = cli.cmd else {
            panic!("expected search");
        };
        let out = explain(&args).unwrap();
        assert_eq!(out["params"], serde_json::json!([10]));
        assert!(!out["template"].as_str().unwrap().contains("WHERE"));
    }
}
