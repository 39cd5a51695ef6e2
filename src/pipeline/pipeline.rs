// src/pipeline/pipeline.rs

use chrono::NaiveDate;

use crate::error::Result;
use crate::models::{Config, EntryForm, RenderOptions, Store};
use crate::services::PaperSource;
use crate::storage::DigestStorage;

use super::fetch::fetch_topics;
use super::render::render;

/// A store file and the document rendered from it.
#[derive(Debug, Clone)]
struct Target<'a> {
    store_key: &'a str,
    document_key: &'a str,
    form: EntryForm,
    options: RenderOptions,
}

/// The main document, plus the web document when both web paths are set.
fn targets(config: &Config) -> Vec<Target<'_>> {
    let mut targets = vec![Target {
        store_key: &config.paths.store_file,
        document_key: &config.paths.document_file,
        form: EntryForm::TableRow,
        options: RenderOptions {
            to_web: false,
            ..config.readme
        },
    }];

    if let (Some(store_key), Some(document_key)) = (
        config.paths.web_store_file.as_deref(),
        config.paths.web_document_file.as_deref(),
    ) {
        targets.push(Target {
            store_key,
            document_key,
            form: EntryForm::WebEntry,
            options: RenderOptions {
                to_web: true,
                ..config.web
            },
        });
    }

    targets
}

/// What a run did.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub topics_fetched: usize,
    pub failed_topics: Vec<String>,
    pub records_fetched: usize,
    pub documents_written: usize,
    pub fallback_topics: Vec<String>,
}

/// Load every target store before anything is written.
async fn load_stores(
    storage: &dyn DigestStorage,
    targets: &[Target<'_>],
) -> Result<Vec<Store>> {
    let mut stores = Vec::with_capacity(targets.len());
    for target in targets {
        stores.push(storage.load_store(target.store_key).await?);
    }
    Ok(stores)
}

async fn write_document(
    storage: &dyn DigestStorage,
    target: &Target<'_>,
    store: &Store,
    today: NaiveDate,
    summary: &mut RunSummary,
) -> Result<()> {
    let report = render(store, &target.options, today);
    storage.write_document(target.document_key, &report.document).await?;
    summary.documents_written += 1;
    for topic in report.fallback_topics {
        if !summary.fallback_topics.contains(&topic) {
            summary.fallback_topics.push(topic);
        }
    }
    Ok(())
}

/// Run the full pipeline: compile, fetch, merge, save, render.
///
/// Configuration and store errors abort before any file is written. A failed
/// topic only drops that topic's new results.
pub async fn run_pipeline(
    config: &Config,
    source: &dyn PaperSource,
    storage: &dyn DigestStorage,
    today: NaiveDate,
) -> Result<RunSummary> {
    config.validate()?;
    let queries = config.compile_topics()?;
    for query in &queries {
        log::debug!("{} => {}", query.topic, query.query);
    }

    let outcome = fetch_topics(source, &queries, &config.arxiv).await;
    let mut summary = RunSummary {
        topics_fetched: outcome.fetched.len(),
        failed_topics: outcome.failed_topics.clone(),
        records_fetched: outcome.record_count(),
        ..RunSummary::default()
    };

    let targets = targets(config);
    let stores = load_stores(storage, &targets).await?;

    for (target, mut store) in targets.iter().zip(stores) {
        let written = store.merge(outcome.batches(target.form));
        log::info!("Merged {} entries into {}", written, target.store_key);
        storage.save_store(target.store_key, &store).await?;
        write_document(storage, target, &store, today, &mut summary).await?;
    }

    Ok(summary)
}

/// Re-render documents from the persisted stores without searching.
pub async fn run_render(
    config: &Config,
    storage: &dyn DigestStorage,
    today: NaiveDate,
) -> Result<RunSummary> {
    let targets = targets(config);
    let stores = load_stores(storage, &targets).await?;

    let mut summary = RunSummary::default();
    for (target, store) in targets.iter().zip(&stores) {
        write_document(storage, target, store, today, &mut summary).await?;
    }
    Ok(summary)
}
