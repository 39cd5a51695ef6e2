// src/models/mod.rs

//! Domain models for the digest application.

mod config;
mod filter;
mod paper;
mod store;

pub use config::{
    ArxivConfig, Config, PathsConfig, RenderOptions, TopicConfig, TopicQuery,
};
pub use filter::{FilterSpec, compile};
pub use paper::{
    AuthorMode, PaperRecord, RawResult, abs_url, canonical_key, format_authors, normalize,
};
pub use store::{EntryForm, Store, TopicBatch, TopicEntries};
