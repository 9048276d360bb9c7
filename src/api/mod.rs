mod niftytrader;

pub use niftytrader::NiftyTraderClient;

use crate::config::SymbolConfig;
use crate::error::Result;
use crate::models::ChainRecord;

/// Source of option-chain rows and spot prices.
#[allow(async_fn_in_trait)]
pub trait ChainProvider {
    async fn option_chain(&self, symbol: &SymbolConfig) -> Result<Vec<ChainRecord>>;

    async fn spot_price(&self, symbol: &SymbolConfig) -> Result<f64>;
}
