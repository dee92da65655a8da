//! Leaderboard aggregation.

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::resolver::AgentDirectory;
use super::scoring::rank_rows;
use super::view::{GroupingStrategy, ReferenceLookups};
use super::LeaderboardError;
use crate::models::{
    Agent, Leaderboard, LeaderboardMetrics, LeaderboardRow, PerformanceRecord, ReferenceEntity,
    View, WeekRange,
};
use crate::store::{decode_all, Collection, RecordStore};

/// Field of `raw_data` the week range applies to.
pub const RECORD_DATE_FIELD: &str = "date";

/// Builds ranked leaderboards from a record store.
///
/// Holds no state between calls: every call reads all collections afresh.
#[derive(Clone)]
pub struct LeaderboardAggregator {
    store: Arc<dyn RecordStore>,
}

impl LeaderboardAggregator {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub fn store_name(&self) -> &'static str {
        self.store.name()
    }

    /// Fetch, group, score and rank.
    ///
    /// The five reads run concurrently; if any of them fails the whole call
    /// fails and nothing is aggregated.
    pub async fn aggregate(
        &self,
        range: Option<&WeekRange>,
        view: View,
    ) -> Result<Leaderboard, LeaderboardError> {
        let (records, agents, depots, companies, platoons) = tokio::try_join!(
            self.fetch_records(range),
            self.fetch_all::<Agent>(Collection::Agents),
            self.fetch_all::<ReferenceEntity>(Collection::Depots),
            self.fetch_all::<ReferenceEntity>(Collection::Companies),
            self.fetch_all::<ReferenceEntity>(Collection::Platoons),
        )?;

        let directory = AgentDirectory::new(agents);
        let refs = ReferenceLookups::new(depots, companies, platoons);
        let board = build_leaderboard(view, &records, &directory, &refs);

        info!(
            "Aggregated {} records into {} {} rows",
            records.len(),
            board.rows.len(),
            board.view
        );
        Ok(board)
    }

    async fn fetch_records(
        &self,
        range: Option<&WeekRange>,
    ) -> Result<Vec<PerformanceRecord>, LeaderboardError> {
        let documents = match range {
            Some(range) => {
                self.store
                    .query_date_range(Collection::RawData, RECORD_DATE_FIELD, range)
                    .await?
            }
            None => self.store.list_documents(Collection::RawData).await?,
        };
        debug!("Fetched {} performance records", documents.len());
        Ok(decode_all(Collection::RawData, &documents)?)
    }

    async fn fetch_all<T: DeserializeOwned>(
        &self,
        collection: Collection,
    ) -> Result<Vec<T>, LeaderboardError> {
        let documents = self.store.list_documents(collection).await?;
        debug!("Fetched {} {}", documents.len(), collection.name());
        Ok(decode_all(collection, &documents)?)
    }
}

/// Group already-fetched records into a ranked leaderboard.
///
/// Groups are created in first-seen order; each record's totals go to exactly
/// one group, and display fields come from the record that opened the group.
pub fn build_leaderboard(
    view: View,
    records: &[PerformanceRecord],
    directory: &AgentDirectory,
    refs: &ReferenceLookups,
) -> Leaderboard {
    let strategy = GroupingStrategy::for_view(&view);
    let mut rows: Vec<LeaderboardRow> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let resolution = directory.resolve(&record.agent_id);
        let meta = resolution.meta();
        let key = strategy.group_key(meta);

        let idx = match index.get(&key) {
            Some(&idx) => idx,
            None => {
                let display = strategy.display(&key, meta, refs);
                rows.push(LeaderboardRow {
                    key: key.clone(),
                    name: display.name,
                    avatar_url: display.avatar_url,
                    platoon: display.platoon,
                    leads: 0.0,
                    payins: 0.0,
                    sales: 0.0,
                    points: 0.0,
                    rank: 0,
                });
                index.insert(key, rows.len() - 1);
                rows.len() - 1
            }
        };

        let row = &mut rows[idx];
        row.leads += record.leads;
        row.payins += record.payins;
        row.sales += record.sales;
    }

    rank_rows(&mut rows);

    Leaderboard {
        view,
        metrics: LeaderboardMetrics::from_rows(&rows),
        rows,
    }
}
