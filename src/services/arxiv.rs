// src/services/arxiv.rs

//! arXiv Atom API client.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::{AppError, Result};
use crate::models::{ArxivConfig, RawResult};
use crate::services::PaperSource;
use crate::utils::http::{create_async_client, fetch_text};
use crate::utils::{normalize_whitespace, short_id_from_url};

/// Searches arXiv through its Atom query endpoint.
pub struct ArxivClient {
    client: reqwest::Client,
    api_url: String,
}

impl ArxivClient {
    /// Create a client from the upstream settings.
    pub fn new(config: &ArxivConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
            api_url: config.api_url.clone(),
        })
    }
}

#[async_trait]
impl PaperSource for ArxivClient {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<RawResult>> {
        log::debug!("Querying arXiv: {}", query);
        let params = [
            ("search_query", query.to_string()),
            ("start", "0".to_string()),
            ("max_results", max_results.to_string()),
            ("sortBy", "submittedDate".to_string()),
            ("sortOrder", "descending".to_string()),
        ];
        let body = fetch_text(&self.client, &self.api_url, &params).await?;
        let mut results = parse_feed(&body)?;
        results.truncate(max_results);
        Ok(results)
    }
}

/// Fields collected while inside one `<entry>`.
#[derive(Default)]
struct EntryBuilder {
    id_url: String,
    title: String,
    authors: Vec<String>,
    updated: String,
    comment: Option<String>,
    in_author: bool,
}

impl EntryBuilder {
    fn finish(self) -> Option<RawResult> {
        let Some(id) = short_id_from_url(&self.id_url) else {
            log::warn!("Skipping entry with unusable id '{}'", self.id_url);
            return None;
        };
        if self.title.is_empty() || self.authors.is_empty() {
            log::warn!("Skipping entry {} with missing title or authors", id);
            return None;
        }
        let Some(updated) = parse_date(&self.updated) else {
            log::warn!("Skipping entry {} with bad updated date '{}'", id, self.updated);
            return None;
        };

        Some(RawResult {
            id,
            title: self.title,
            authors: self.authors,
            updated,
            comment: self.comment,
        })
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.date_naive())
        .ok()
        .or_else(|| NaiveDate::parse_from_str(text.get(..10)?, "%Y-%m-%d").ok())
}

/// Parse an arXiv Atom feed into result records, in feed order.
///
/// Entries lacking an id, title, author or update date are skipped.
pub fn parse_feed(body: &str) -> Result<Vec<RawResult>> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut results = Vec::new();
    let mut entry: Option<EntryBuilder> = None;
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => {
                text.clear();
                match e.local_name().as_ref() {
                    b"entry" => entry = Some(EntryBuilder::default()),
                    b"author" => {
                        if let Some(cur) = entry.as_mut() {
                            cur.in_author = true;
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(t)) => {
                if entry.is_some() {
                    let chunk = t.unescape().map_err(AppError::xml)?;
                    text.push_str(&chunk);
                }
            }
            Ok(Event::CData(c)) => {
                if entry.is_some() {
                    text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Ok(Event::End(e)) => {
                let name = e.local_name();
                if name.as_ref() == b"entry" {
                    if let Some(result) = entry.take().and_then(EntryBuilder::finish) {
                        results.push(result);
                    }
                } else if let Some(cur) = entry.as_mut() {
                    let value = normalize_whitespace(&text);
                    match name.as_ref() {
                        b"id" => cur.id_url = value,
                        b"title" => cur.title = value,
                        b"updated" => cur.updated = value,
                        b"comment" if !value.is_empty() => cur.comment = Some(value),
                        b"name" if cur.in_author && !value.is_empty() => cur.authors.push(value),
                        b"author" => cur.in_author = false,
                        _ => {}
                    }
                }
                text.clear();
            }
            Ok(_) => {}
            Err(e) => {
                return Err(AppError::xml(format!(
                    "at byte {}: {e}",
                    reader.error_position()
                )));
            }
        }
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:arxiv="http://arxiv.org/schemas/atom">
  <id>http://arxiv.org/api/abc</id>
  <title type="html">ArXiv Query: search_query=SLAM</title>
  <updated>2024-06-10T00:00:00-04:00</updated>
  <entry>
    <id>http://arxiv.org/abs/2406.04843v2</id>
    <updated>2024-06-07T17:59:59Z</updated>
    <published>2024-06-07T17:59:59Z</published>
    <title>Gaussian Splatting
      SLAM</title>
    <summary>We present a dense SLAM system with $x^2$ &amp; more.</summary>
    <author><name>Hidenobu Matsuki</name></author>
    <author><name>Riku Murai</name></author>
    <arxiv:comment>CVPR 2024 Highlight</arxiv:comment>
    <link href="http://arxiv.org/abs/2406.04843v2" rel="alternate" type="text/html"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/2406.01111v1</id>
    <updated>2024-06-05T10:00:00Z</updated>
    <title>Loop Closure &amp; Relocalization</title>
    <author><name>Jane Doe</name></author>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/2406.02222v1</id>
    <updated>2024-06-04T10:00:00Z</updated>
    <title>No Authors Here</title>
  </entry>
</feed>"#;

    #[test]
    fn parses_entries_in_feed_order() {
        let results = parse_feed(FEED).unwrap();
        assert_eq!(results.len(), 2);

        let first = &results[0];
        assert_eq!(first.id, "2406.04843v2");
        assert_eq!(first.title, "Gaussian Splatting SLAM");
        assert_eq!(first.authors, vec!["Hidenobu Matsuki", "Riku Murai"]);
        assert_eq!(first.updated, NaiveDate::from_ymd_opt(2024, 6, 7).unwrap());
        assert_eq!(first.comment.as_deref(), Some("CVPR 2024 Highlight"));

        let second = &results[1];
        assert_eq!(second.id, "2406.01111v1");
        assert_eq!(second.title, "Loop Closure & Relocalization");
        assert_eq!(second.comment, None);
    }

    #[test]
    fn empty_feed_yields_no_results() {
        let feed = r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>empty</title></feed>"#;
        assert!(parse_feed(feed).unwrap().is_empty());
    }

    #[test]
    fn malformed_feed_is_an_error() {
        let feed = "<feed><entry><id>x</entry></feed>";
        assert!(matches!(parse_feed(feed), Err(AppError::Xml(_))));
    }

    #[test]
    fn parses_dates() {
        let expected = NaiveDate::from_ymd_opt(2024, 6, 7);
        assert_eq!(parse_date("2024-06-07T17:59:59Z"), expected);
        assert_eq!(parse_date("2024-06-07"), expected);
        assert_eq!(parse_date("June 7"), None);
    }
}
