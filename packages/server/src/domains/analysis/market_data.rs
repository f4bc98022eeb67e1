use asset_extract::{ExcerptMode, FetchRequest, FetchResult, ResilientFetchExtractor};
use futures::future::join_all;
use thiserror::Error;
use tracing::{info, warn};

use super::models::AnalysisPlan;
use crate::config::FetchFailurePolicy;

/// Market data collected for one asset.
#[derive(Debug, Clone)]
pub struct MarketSnapshot {
    pub asset: String,
    pub result: FetchResult,
}

/// No page could be retrieved for an asset and the policy is to abort.
#[derive(Debug, Clone, Error)]
#[error("Não foi possível obter dados de {asset}. Confirme o ticker e tente novamente.")]
pub struct MarketDataUnavailable {
    pub asset: String,
    pub detail: String,
}

/// Look up every asset the plan names.
///
/// Assets are looked up concurrently; candidates within one lookup stay
/// sequential. Returns an empty list when the plan needs no market data.
pub async fn gather_market_data(
    extractor: &ResilientFetchExtractor,
    plan: &AnalysisPlan,
    policy: FetchFailurePolicy,
) -> Result<Vec<MarketSnapshot>, MarketDataUnavailable> {
    let lookups = plan.assets_to_fetch().into_iter().map(|(asset, category)| async move {
        let request = FetchRequest::new(asset, category);
        MarketSnapshot {
            asset: asset.to_string(),
            result: extractor.lookup(&request, ExcerptMode::Keywords).await,
        }
    });
    let snapshots = join_all(lookups).await;

    for snapshot in snapshots.iter().filter(|s| !s.result.ok()) {
        match policy {
            FetchFailurePolicy::Abort => {
                warn!(
                    asset = %snapshot.asset,
                    error = %snapshot.result.error_detail(),
                    "Market data unavailable, aborting analysis"
                );
                return Err(MarketDataUnavailable {
                    asset: snapshot.asset.clone(),
                    detail: snapshot.result.error_detail().to_string(),
                });
            }
            FetchFailurePolicy::Degrade => {
                warn!(
                    asset = %snapshot.asset,
                    error = %snapshot.result.error_detail(),
                    "Market data unavailable, continuing without it"
                );
            }
        }
    }

    info!(
        assets = snapshots.len(),
        fetched = snapshots.iter().filter(|s| s.result.ok()).count(),
        "Market data gathered"
    );

    Ok(snapshots)
}
