//! The topic → key → entry mapping that is the digest's durable state.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::models::PaperRecord;

/// Entries of one topic, keyed by canonical key.
pub type TopicEntries = IndexMap<String, String>;

/// Newly fetched entries for one topic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicBatch {
    pub topic: String,
    pub entries: TopicEntries,
}

/// Which pre-rendered form of a record a store holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryForm {
    TableRow,
    WebEntry,
}

impl TopicBatch {
    /// Collect records into a batch, later records winning on key collision.
    pub fn from_records<'a>(
        topic: impl Into<String>,
        records: impl IntoIterator<Item = &'a PaperRecord>,
        form: EntryForm,
    ) -> Self {
        let entries = records
            .into_iter()
            .map(|r| {
                let text = match form {
                    EntryForm::TableRow => r.table_row.clone(),
                    EntryForm::WebEntry => r.web_entry.clone(),
                };
                (r.key.clone(), text)
            })
            .collect();

        Self {
            topic: topic.into(),
            entries,
        }
    }
}

/// Persisted digest state. Topic order is insertion order and drives rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Store {
    topics: IndexMap<String, TopicEntries>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge fetched batches.
    ///
    /// New topics are inserted whole. Existing topics take the incoming
    /// entries, overwriting on key collision and keeping every other key.
    /// Returns the number of entries written.
    pub fn merge<I>(&mut self, batches: I) -> usize
    where
        I: IntoIterator<Item = TopicBatch>,
    {
        let mut written = 0;
        for batch in batches {
            written += batch.entries.len();
            match self.topics.get_mut(&batch.topic) {
                Some(existing) => existing.extend(batch.entries),
                None => {
                    self.topics.insert(batch.topic, batch.entries);
                }
            }
        }
        written
    }

    /// Entries of a topic, if present.
    pub fn topic(&self, name: &str) -> Option<&TopicEntries> {
        self.topics.get(name)
    }

    /// Iterate topics in store order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &TopicEntries)> {
        self.topics.iter()
    }

    /// Insert or replace a topic wholesale.
    pub fn insert_topic(&mut self, topic: impl Into<String>, entries: TopicEntries) {
        self.topics.insert(topic.into(), entries);
    }

    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    /// Total entries across all topics.
    pub fn entry_count(&self) -> usize {
        self.topics.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}
