//! Pipeline entry points for digest operations.
//!
//! - `run_pipeline`: search every topic, merge into the stores, re-render
//! - `run_render`: re-render documents from the stores alone

pub mod fetch;
#[allow(clippy::module_inception)]
pub mod pipeline;
pub mod render;

pub use fetch::{FetchOutcome, TopicRecords, fetch_topics};
pub use pipeline::{RunSummary, run_pipeline, run_render};
pub use render::{RenderReport, SortOrder, pretty_math, render, sort_entries};
