use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::services::ingestion::{IngestionTask, RunOutcome};

/// Runs `task` every `period`, starting immediately. A run is awaited before
/// the next tick is taken, so runs never overlap; a slow run delays the
/// schedule instead of triggering a burst of catch-up runs.
pub fn spawn_ingestion(task: Arc<IngestionTask>, period: Duration) -> JoinHandle<()> {
    tracing::info!("Scheduling video ingestion every {:?}", period);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match task.run_once().await {
                RunOutcome::Completed { fetched, inserted } => {
                    tracing::debug!(fetched, inserted, "Ingestion run completed")
                }
                outcome => tracing::warn!(?outcome, "Ingestion run ended without success"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::videos::VideoQuery;
    use crate::services::ingestion::tests::ScriptedSearch;
    use crate::services::key_rotation::KeyRotator;
    use crate::services::youtube_search::tests::item;
    use crate::store::sqlite::tests::memory_store;
    use crate::store::VideoStore;

    #[tokio::test]
    async fn scheduled_runs_ingest_and_keep_polling() {
        let store: Arc<dyn VideoStore> = Arc::new(memory_store().await);
        let search = Arc::new(ScriptedSearch::new(vec![
            Ok(vec![item("first", "Cricket", "2024-05-01T12:00:00Z")]),
            Ok(vec![item("second", "Cricket", "2024-05-01T12:01:00Z")]),
        ]));
        let task = Arc::new(IngestionTask::new(
            store.clone(),
            search.clone(),
            Arc::new(KeyRotator::from_csv("A")),
            "cricket",
        ));

        let handle = spawn_ingestion(task, Duration::from_millis(20));

        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            let stored = store.list(&VideoQuery::default()).await.unwrap();
            if stored.len() == 2 {
                break;
            }
            assert!(tokio::time::Instant::now() < deadline, "ingestion did not run twice");
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        handle.abort();

        assert!(search.calls().len() >= 2);
    }
}
