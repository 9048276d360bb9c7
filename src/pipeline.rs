use chrono::NaiveDateTime;
use tracing::info;

use crate::analysis::{latest_pair, DiffEngine, FreshnessPolicy};
use crate::api::ChainProvider;
use crate::config::SymbolConfig;
use crate::error::Result;
use crate::fetcher::{ChainContext, ChainFetcher};
use crate::models::{DiffRow, SnapshotId};
use crate::store::SnapshotStore;

/// Result of one run.
#[derive(Debug)]
pub enum RunOutcome {
    /// Only one snapshot exists for the day so far; nothing to compare.
    Baseline { context: ChainContext, snapshot: SnapshotId },
    Report(Report),
}

#[derive(Debug)]
pub struct Report {
    pub context: ChainContext,
    pub current: SnapshotId,
    pub previous: SnapshotId,
    pub refreshed: bool,
    pub rows: Vec<DiffRow>,
}

/// One end-to-end run: freshness check, optional fetch and persist, then diff.
pub struct Pipeline<'a, P> {
    provider: &'a P,
    symbol: &'a SymbolConfig,
    store: &'a SnapshotStore,
    policy: FreshnessPolicy,
    strike_count: u32,
}

impl<'a, P: ChainProvider> Pipeline<'a, P> {
    pub fn new(
        provider: &'a P,
        symbol: &'a SymbolConfig,
        store: &'a SnapshotStore,
        policy: FreshnessPolicy,
        strike_count: u32,
    ) -> Self {
        Self {
            provider,
            symbol,
            store,
            policy,
            strike_count,
        }
    }

    /// Any error aborts the run; nothing is retried.
    pub async fn run(&self, now: NaiveDateTime) -> Result<RunOutcome> {
        let today = now.date();
        let fetcher = ChainFetcher::new(self.provider, self.symbol);

        let context = fetcher.context(self.strike_count, today).await?;
        info!("Current weekly expiry: {}", context.expiry);
        info!("CMP: {} (ATM strike {})", context.spot, context.atm_strike);

        let mut history = self.store.read_history(&self.symbol.id, today)?;
        let refreshed = self.policy.should_refetch(&history, now.time());

        if refreshed {
            info!("Cached snapshots are stale, fetching");
            let snapshot = fetcher.fetch_snapshot(&context).await?;
            let id = self.store.persist(&self.symbol.id, &snapshot, now)?;
            history = self.store.record_history(&self.symbol.id, today, &id, now)?;
        } else {
            info!("Reusing cached snapshots");
        }

        let Some((current, previous)) = latest_pair(&history) else {
            let snapshot = history
                .iter()
                .find_map(|entry| entry.snapshot().cloned())
                .unwrap_or_else(|| SnapshotId::new(&self.symbol.id, now));
            info!("Baseline snapshot {} recorded, nothing to compare yet", snapshot);
            return Ok(RunOutcome::Baseline { context, snapshot });
        };

        let current_snapshot = self.store.load(&current)?;
        let previous_snapshot = self.store.load(&previous)?;
        let rows = DiffEngine::new().diff(&current_snapshot, &previous_snapshot, context.atm_strike)?;

        Ok(RunOutcome::Report(Report {
            context,
            current,
            previous,
            refreshed,
            rows,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::fetcher::tests::{nifty, record, FakeProvider};
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn chain(ce_oi: i64, pe_oi: i64) -> Vec<crate::models::ChainRecord> {
        vec![
            record(17700, "2026-10-22T00:00:00", ce_oi, pe_oi),
            record(17650, "2026-10-22T00:00:00", ce_oi, pe_oi),
            record(17600, "2026-10-22T00:00:00", ce_oi, pe_oi),
        ]
    }

    #[tokio::test]
    async fn test_first_run_records_baseline() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        let provider = FakeProvider::new(17641.0, chain(1000, 2000));
        let symbol = nifty();
        let pipeline = Pipeline::new(&provider, &symbol, &store, FreshnessPolicy::new(5.0), 10);

        let outcome = pipeline.run(at(9, 15)).await.unwrap();
        assert!(matches!(outcome, RunOutcome::Baseline { .. }));
        assert_eq!(provider.chain_calls.get(), 1);
    }

    #[tokio::test]
    async fn test_second_run_reports_delta_then_reuses_cache() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        let provider = FakeProvider::new(17641.0, chain(1000, 2000));
        let symbol = nifty();
        let pipeline = Pipeline::new(&provider, &symbol, &store, FreshnessPolicy::new(5.0), 10);

        pipeline.run(at(9, 15)).await.unwrap();
        *provider.records.borrow_mut() = chain(1200, 1500);

        let RunOutcome::Report(report) = pipeline.run(at(9, 20)).await.unwrap() else {
            panic!("expected a report");
        };
        assert!(report.refreshed);
        assert_eq!(report.current.label(), "09:20");
        assert_eq!(report.previous.label(), "09:15");
        assert_eq!(report.rows.len(), 3);
        assert_eq!(report.rows[0].strike, 17700);
        assert_eq!(report.rows[0].ce.delta, 200);
        assert!((report.rows[0].pe.delta_pct + 25.0).abs() < 1e-9);
        assert!(report.rows[1].is_atm);
        assert_eq!(provider.chain_calls.get(), 2);

        // Within the staleness window: no fetch, same comparison
        let RunOutcome::Report(report) = pipeline.run(at(9, 22)).await.unwrap() else {
            panic!("expected a report");
        };
        assert!(!report.refreshed);
        assert_eq!(report.current.label(), "09:20");
        assert_eq!(provider.chain_calls.get(), 2);
    }

    #[tokio::test]
    async fn test_missing_snapshot_file_aborts() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        let provider = FakeProvider::new(17641.0, chain(1000, 2000));
        let symbol = nifty();
        let pipeline = Pipeline::new(&provider, &symbol, &store, FreshnessPolicy::new(5.0), 10);

        pipeline.run(at(9, 15)).await.unwrap();
        pipeline.run(at(9, 20)).await.unwrap();
        std::fs::remove_file(store.snapshot_path(&SnapshotId::new("NIFTY", at(9, 15)))).unwrap();

        let err = pipeline.run(at(9, 21)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_provider_failure_aborts_without_writing() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        let mut provider = FakeProvider::new(17641.0, chain(1000, 2000));
        provider.fail = true;
        let symbol = nifty();
        let pipeline = Pipeline::new(&provider, &symbol, &store, FreshnessPolicy::new(5.0), 10);

        let err = pipeline.run(at(9, 15)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Provider);
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert!(store.read_history("NIFTY", today).unwrap().is_empty());
    }
}
