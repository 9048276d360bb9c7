use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{AppError, Result};

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub storage: StorageConfig,
    pub freshness: FreshnessConfig,
    pub provider: ProviderConfig,
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub symbols: HashMap<String, SymbolConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FreshnessConfig {
    pub max_stale_minutes: f64, // may be fractional, e.g. 0.01
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DefaultsConfig {
    pub symbol: String,
    pub strikes: u32,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SymbolConfig {
    #[serde(default)]
    pub id: String, // filled from the table key
    pub oc_url: String,
    pub spot_url: String,
    pub strike_increment: i64,
}

impl SymbolConfig {
    /// Symbols known without any configuration file.
    pub fn builtin() -> Vec<SymbolConfig> {
        vec![
            SymbolConfig {
                id: "NIFTY".to_string(),
                oc_url: "https://services.niftytrader.in/options/fetchNseOptionsDataNew?symbol=nifty&strikePrice=0"
                    .to_string(),
                spot_url: "https://api.niftytrader.in/webapi/Symbol/getSymbolSpotData?symbol=NIFTY%2050"
                    .to_string(),
                strike_increment: 50,
            },
            SymbolConfig {
                id: "BANKNIFTY".to_string(),
                oc_url: "https://services.niftytrader.in/options/fetchNseOptionsDataNew?symbol=banknifty&strikePrice=0"
                    .to_string(),
                spot_url: "https://api.niftytrader.in/webapi/Symbol/getSymbolSpotData?symbol=NIFTY%20BANK"
                    .to_string(),
                strike_increment: 100,
            },
        ]
    }
}

impl Settings {
    /// Loads `.env`, then `config/default.*` (optional), then `OI_TRACKER__*` variables.
    pub fn load() -> std::result::Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(Environment::with_prefix("OI_TRACKER").separator("__"));

        Self::from_builder(builder)
    }

    pub fn from_builder(
        builder: ConfigBuilder<DefaultState>,
    ) -> std::result::Result<Self, ConfigError> {
        let config = builder
            .set_default("storage.data_dir", ".")?
            .set_default("freshness.max_stale_minutes", 0.01)?
            .set_default("provider.timeout_secs", 30_i64)?
            .set_default(
                "provider.user_agent",
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
            )?
            .set_default("defaults.symbol", "NIFTY")?
            .set_default("defaults.strikes", 10_i64)?
            .build()?;

        let mut settings: Settings = config.try_deserialize()?;

        // Source keys may come back lower-cased; symbol ids are upper-case
        let configured: HashMap<String, SymbolConfig> = std::mem::take(&mut settings.symbols)
            .into_iter()
            .map(|(id, mut symbol)| {
                symbol.id = id.to_uppercase();
                (symbol.id.clone(), symbol)
            })
            .collect();
        settings.symbols = configured;

        // Configured symbols override the built-in ones of the same id
        for builtin in SymbolConfig::builtin() {
            settings.symbols.entry(builtin.id.clone()).or_insert(builtin);
        }

        if settings.freshness.max_stale_minutes < 0.0 {
            return Err(ConfigError::Message(
                "freshness.max_stale_minutes must not be negative".into(),
            ));
        }

        Ok(settings)
    }

    pub fn symbol(&self, id: &str) -> Result<&SymbolConfig> {
        self.symbols
            .get(id)
            .ok_or_else(|| AppError::UnknownSymbol(id.to_string()))
    }
}
