// src/pipeline/fetch.rs

//! Per-topic search and normalization.

use std::time::Duration;

use futures::stream::{self, StreamExt};

use crate::error::{AppError, Result};
use crate::models::{ArxivConfig, EntryForm, PaperRecord, TopicBatch, TopicQuery, normalize};
use crate::services::PaperSource;

/// Normalized records of one topic, in upstream order.
#[derive(Debug, Clone)]
pub struct TopicRecords {
    pub topic: String,
    pub records: Vec<PaperRecord>,
}

/// Summary of a fetch run.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    /// Topics that answered, in configuration order
    pub fetched: Vec<TopicRecords>,
    /// Topics whose search failed
    pub failed_topics: Vec<String>,
}

impl FetchOutcome {
    /// Store batches holding the requested form of every fetched record.
    pub fn batches(&self, form: EntryForm) -> Vec<TopicBatch> {
        self.fetched
            .iter()
            .map(|t| TopicBatch::from_records(t.topic.clone(), &t.records, form))
            .collect()
    }

    pub fn record_count(&self) -> usize {
        self.fetched.iter().map(|t| t.records.len()).sum()
    }
}

/// Search one topic, bounded by the configured timeout.
async fn fetch_topic(
    source: &dyn PaperSource,
    query: &TopicQuery,
    settings: &ArxivConfig,
) -> Result<TopicRecords> {
    log::info!("Keyword: {}", query.topic);

    let limit = Duration::from_secs(settings.timeout_secs);
    let results = tokio::time::timeout(limit, source.search(&query.query, settings.max_results))
        .await
        .map_err(|_| {
            AppError::upstream(&query.topic, format!("timed out after {}s", limit.as_secs()))
        })?
        .map_err(|e| match e {
            AppError::Upstream { .. } => e,
            other => AppError::upstream(&query.topic, other),
        })?;

    let records = results
        .iter()
        .map(|raw| normalize(raw, &settings.base_url).1)
        .collect();

    Ok(TopicRecords {
        topic: query.topic.clone(),
        records,
    })
}

/// Search every topic, keeping configuration order.
///
/// Up to `max_concurrent` searches run at once. A failed topic is logged and
/// skipped; the others still complete.
pub async fn fetch_topics(
    source: &dyn PaperSource,
    queries: &[TopicQuery],
    settings: &ArxivConfig,
) -> FetchOutcome {
    log::info!("GET daily papers begin");
    let concurrency = settings.max_concurrent.max(1);

    let mut outcome = FetchOutcome::default();
    let mut results = stream::iter(queries)
        .map(|query| async move { (query, fetch_topic(source, query, settings).await) })
        .buffered(concurrency);

    while let Some((query, result)) = results.next().await {
        match result {
            Ok(topic) => {
                log::info!("{}: {} papers", topic.topic, topic.records.len());
                outcome.fetched.push(topic);
            }
            Err(error) => {
                log::warn!("Failed to fetch topic {}: {}", query.topic, error);
                outcome.failed_topics.push(query.topic.clone());
            }
        }
    }

    log::info!("GET daily papers end");
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawResult;
    use async_trait::async_trait;
    use chrono::NaiveDate;

    struct FakeSource;

    #[async_trait]
    impl PaperSource for FakeSource {
        async fn search(&self, query: &str, _max_results: usize) -> Result<Vec<RawResult>> {
            if query.contains("broken") {
                return Err(AppError::xml("unexpected end of feed"));
            }
            if query.contains("slow") {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
            Ok(vec![
                RawResult {
                    id: "2406.04843v1".into(),
                    title: "Old version".into(),
                    authors: vec!["A".into()],
                    updated: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                    comment: None,
                },
                RawResult {
                    id: "2406.04843v2".into(),
                    title: "New version".into(),
                    authors: vec!["A".into()],
                    updated: NaiveDate::from_ymd_opt(2024, 6, 7).unwrap(),
                    comment: None,
                },
            ])
        }
    }

    fn query(topic: &str, q: &str) -> TopicQuery {
        TopicQuery {
            topic: topic.into(),
            query: q.into(),
        }
    }

    #[tokio::test]
    async fn failed_topics_do_not_stop_others() {
        let queries = [
            query("SLAM", "\"SLAM\""),
            query("Broken", "\"broken\""),
            query("NeRF", "\"NeRF\""),
        ];
        let settings = ArxivConfig {
            max_concurrent: 2,
            ..ArxivConfig::default()
        };

        let outcome = fetch_topics(&FakeSource, &queries, &settings).await;

        let fetched: Vec<_> = outcome.fetched.iter().map(|t| t.topic.as_str()).collect();
        assert_eq!(fetched, ["SLAM", "NeRF"]);
        assert_eq!(outcome.failed_topics, ["Broken"]);
        assert_eq!(outcome.record_count(), 4);
    }

    #[tokio::test]
    async fn batches_collapse_versions_last_write_wins() {
        let outcome =
            fetch_topics(&FakeSource, &[query("SLAM", "\"SLAM\"")], &ArxivConfig::default())
                .await;

        let batches = outcome.batches(EntryForm::TableRow);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].entries.len(), 1);
        assert!(batches[0].entries["2406.04843"].contains("New version"));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_topics_time_out() {
        let settings = ArxivConfig {
            timeout_secs: 1,
            ..ArxivConfig::default()
        };

        let outcome = fetch_topics(&FakeSource, &[query("Slow", "slow")], &settings).await;
        assert!(outcome.fetched.is_empty());
        assert_eq!(outcome.failed_topics, ["Slow"]);
    }
}
