use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub api: ApiSettings,
    pub organization: Organization,
    pub report: ReportSettings,
}

/// Remote backend connection settings. The base URL is a deployment-time
/// value; every request goes through it.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    30
}

/// Identity block rendered right-aligned in the printable report header band.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Organization {
    pub name: String,
    pub address: String,
    pub city: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ReportSettings {
    pub currency_symbol: String,
    pub output_dir: String,
}
