//! Search results and their canonical, render-ready form.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A result record as returned by the upstream search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawResult {
    /// Short identifier, possibly versioned (e.g. `2406.04843v2`)
    pub id: String,

    /// Paper title
    pub title: String,

    /// Authors in listing order
    pub authors: Vec<String>,

    /// Last update date
    pub updated: NaiveDate,

    /// Free-form author comment
    #[serde(default)]
    pub comment: Option<String>,
}

/// How author lists are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorMode {
    /// Only the first listed author
    First,
    /// Every author, comma separated
    All,
}

/// Canonical form of one result, keyed by its version-less identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperRecord {
    pub key: String,
    pub updated: NaiveDate,
    pub url: String,
    /// Markdown table row, newline terminated
    pub table_row: String,
    /// Markdown list entry, newline terminated
    pub web_entry: String,
}

/// Strip the version suffix from an identifier.
///
/// Everything from the first `v` onwards is dropped. Identifiers that carry a
/// `v` before the version suffix (old-style `solv-int/...` ids) are truncated
/// too; this is a known limitation of the scan.
pub fn canonical_key(id: &str) -> &str {
    match id.find('v') {
        Some(pos) => &id[..pos],
        None => id,
    }
}

/// Render an author list.
pub fn format_authors(authors: &[String], mode: AuthorMode) -> String {
    match mode {
        AuthorMode::First => authors.first().cloned().unwrap_or_default(),
        AuthorMode::All => authors.join(", "),
    }
}

/// Build the abstract page URL for a canonical key.
pub fn abs_url(base_url: &str, key: &str) -> String {
    format!("{base_url}abs/{key}")
}

/// Turn a raw result into its canonical key and record.
pub fn normalize(raw: &RawResult, base_url: &str) -> (String, PaperRecord) {
    let key = canonical_key(&raw.id).to_string();
    let first_author = format_authors(&raw.authors, AuthorMode::First);
    let url = abs_url(base_url, &key);
    let date = raw.updated.format("%Y-%m-%d").to_string();

    log::info!(
        "Time = {} title = {} author = {}",
        date,
        raw.title,
        first_author
    );

    let table_row = format!(
        "|**{date}**|**{title}**|{first_author} et.al.|[{key}]({url})|null|\n",
        title = raw.title,
    );

    let mut web_entry = format!(
        "- {date}, **{title}**, {first_author} et.al., Paper: [{url}]({url})",
        title = raw.title,
    );
    match &raw.comment {
        Some(comment) => {
            web_entry.push_str(", ");
            web_entry.push_str(comment);
            web_entry.push('\n');
        }
        None => web_entry.push('\n'),
    }

    let record = PaperRecord {
        key: key.clone(),
        updated: raw.updated,
        url,
        table_row,
        web_entry,
    };
    (key, record)
}
