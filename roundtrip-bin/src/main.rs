use anyhow::Result;
use clap::Parser;
use roundtrip_core::{
    analysis::{analyze, AnalysisOutcome},
    config::{ExplorerConfig, DEFAULT_CONTRACT_ADDRESS, DEFAULT_EXPLORER_URL},
    explorer::ExplorerClient,
    models::AnalysisParams,
    request::{AnalysisRequest, RawQuery},
};
use tracing_subscriber::EnvFilter;

/// Find out -> in round-trip transfer pairs for one address and date range.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to analyze
    #[arg(short, long)]
    address: String,

    /// First day of the range (YYYY-MM-DD)
    #[arg(short, long)]
    start_date: String,

    /// Last day of the range, included in full (YYYY-MM-DD)
    #[arg(short, long)]
    end_date: String,

    /// Drop transfers smaller than this many tokens
    #[arg(long)]
    min_amount: Option<String>,

    /// Largest tolerated amount difference inside a pair
    #[arg(long)]
    max_diff: Option<String>,

    /// Largest tolerated delay between the out and in transfer, in minutes
    #[arg(long)]
    max_minutes: Option<String>,

    /// Block explorer API endpoint
    #[arg(long, env = "EXPLORER_URL", default_value = DEFAULT_EXPLORER_URL)]
    explorer_url: String,

    /// Block explorer API key
    #[arg(long, env = "EXPLORER_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Token contract to analyze
    #[arg(long, env = "TOKEN_CONTRACT", default_value = DEFAULT_CONTRACT_ADDRESS)]
    contract: String,

    /// Explorer request timeout in seconds
    #[arg(long, env = "EXPLORER_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let request = AnalysisRequest::parse(
        RawQuery {
            address: Some(args.address),
            start_date: Some(args.start_date),
            end_date: Some(args.end_date),
            min_amount: args.min_amount,
            max_diff: args.max_diff,
            max_minutes: args.max_minutes,
        },
        &AnalysisParams::default(),
    )?;

    let explorer = ExplorerClient::new(ExplorerConfig {
        base_url: args.explorer_url,
        api_key: args.api_key,
        contract_address: args.contract,
        timeout_secs: args.timeout_secs,
    })?;

    match analyze(&explorer, &request).await? {
        AnalysisOutcome::Report(report) => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        empty => {
            println!("{}", empty.message().unwrap_or_default());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "roundtrip",
            "--address",
            "0xabc",
            "--start-date",
            "2024-01-01",
            "--end-date",
            "2024-01-31",
            "--max-minutes",
            "15",
            "--api-key",
            "key",
        ])
        .unwrap();

        assert_eq!(args.address, "0xabc");
        assert_eq!(args.max_minutes.as_deref(), Some("15"));
        assert_eq!(args.min_amount, None);
        assert_eq!(args.api_key, "key");
    }
}
