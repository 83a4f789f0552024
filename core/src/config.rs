use config::{Config, ConfigError, Environment};
use erc20_token_contract::MINTER_ORG_MSP_ID;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server_port: u16,
    pub rust_log: String,
    /// Organization allowed to mint and burn.
    pub minter_msp_id: String,
}

/// Load configuration from the process environment, reading `.env` first if present.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_from(Environment::default())
}

pub fn load_from(source: Environment) -> Result<AppConfig, ConfigError> {
    let settings = Config::builder()
        .add_source(source)
        .set_default("server_port", 8080)?
        .set_default("rust_log", "info")?
        .set_default("minter_msp_id", MINTER_ORG_MSP_ID)?
        .build()?;

    settings.try_deserialize()
}
