use chrono::NaiveDate;
use tracing::{debug, info};

use crate::analysis::{atm_strike, weekly_expiry, StrikeWindow};
use crate::api::ChainProvider;
use crate::config::SymbolConfig;
use crate::error::Result;
use crate::models::{Snapshot, EXPIRY_FORMAT};

/// Per-run market context derived from one spot-price read.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainContext {
    pub expiry: NaiveDate,
    pub spot: f64,
    pub atm_strike: i64,
    pub window: StrikeWindow,
}

/// Pulls the current weekly expiry's chain around the money.
pub struct ChainFetcher<'a, P> {
    provider: &'a P,
    symbol: &'a SymbolConfig,
}

impl<'a, P: ChainProvider> ChainFetcher<'a, P> {
    pub fn new(provider: &'a P, symbol: &'a SymbolConfig) -> Self {
        Self { provider, symbol }
    }

    /// Reads spot once and derives expiry, ATM strike and strike window.
    pub async fn context(&self, strike_count: u32, today: NaiveDate) -> Result<ChainContext> {
        let spot = self.provider.spot_price(self.symbol).await?;
        let atm = atm_strike(spot, self.symbol.strike_increment);

        Ok(ChainContext {
            expiry: weekly_expiry(today),
            spot,
            atm_strike: atm,
            window: StrikeWindow::around(atm, self.symbol.strike_increment, strike_count),
        })
    }

    /// Keeps rows whose expiry date and strike match `ctx`, in provider order.
    pub async fn fetch_snapshot(&self, ctx: &ChainContext) -> Result<Snapshot> {
        let records = self.provider.option_chain(self.symbol).await?;
        let expiry_key = ctx.expiry.format(EXPIRY_FORMAT).to_string();

        let mut snapshot = Snapshot::new(ctx.expiry);
        let total = records.len();
        for record in records
            .iter()
            .filter(|r| r.expiry_prefix() == Some(expiry_key.as_str()))
            .filter(|r| ctx.window.contains(r.strike_price))
        {
            snapshot.insert(record.strike_price, record.to_entry());
        }

        debug!("Kept {} of {} chain rows", snapshot.strike_count(), total);
        info!(
            "Fetched option chain for '{}' for expiry '{}' and the strike range: {} - {}",
            self.symbol.id, expiry_key, ctx.window.min, ctx.window.max
        );
        Ok(snapshot)
    }

    pub async fn fetch(&self, strike_count: u32, today: NaiveDate) -> Result<(ChainContext, Snapshot)> {
        let ctx = self.context(strike_count, today).await?;
        let snapshot = self.fetch_snapshot(&ctx).await?;
        Ok((ctx, snapshot))
    }
}
