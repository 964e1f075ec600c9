use crate::models::AnalysisParams;
use anyhow::Result;
use serde::Deserialize;

/// BEP-20 USDT on BNB Smart Chain.
pub const DEFAULT_CONTRACT_ADDRESS: &str = "0x55d398326f99059fF775485246999027B3197955";
pub const DEFAULT_EXPLORER_URL: &str = "https://api.bscscan.com/api";

#[derive(Debug, Deserialize, Clone)]
pub struct RuntimeConfig {
    pub environment: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub bind_addr: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExplorerConfig {
    #[serde(default = "default_explorer_url")]
    pub base_url: String,
    pub api_key: String,
    #[serde(default = "default_contract_address")]
    pub contract_address: String,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_explorer_url() -> String {
    DEFAULT_EXPLORER_URL.to_string()
}

fn default_contract_address() -> String {
    DEFAULT_CONTRACT_ADDRESS.to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnalyzerConfig {
    pub runtime: RuntimeConfig,
    pub api: ApiConfig,
    pub explorer: ExplorerConfig,
    #[serde(default)]
    pub analysis: Option<AnalysisParams>,
}

impl AnalyzerConfig {
    pub fn from_env() -> Result<Self> {
        // Base values come from `config/default.(toml|yaml|json)` relative to the
        // working directory, then `ROUNDTRIP__...` environment variables override them.
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::Environment::with_prefix("ROUNDTRIP").separator("__"))
            .build()?;

        settings.try_deserialize().map_err(Into::into)
    }

    pub fn analysis_params(&self) -> AnalysisParams {
        self.analysis.unwrap_or_default()
    }
}
