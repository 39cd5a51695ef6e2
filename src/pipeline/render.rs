// src/pipeline/render.rs

//! Markdown rendering of a store.
//!
//! Topics appear in store order and empty topics are skipped. Entries inside a
//! topic are ordered newest first by the date embedded in each pre-rendered
//! entry; if any entry of a topic has no readable date the whole topic falls
//! back to descending key order.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::models::{RenderOptions, Store, TopicEntries};

const USAGE_LINE: &str = "> Usage instructions: [here](./docs/README.md#usage)\n\n";
const ATTRIBUTION_LINE: &str =
    "> This page is modified from [here](https://github.com/Vincentqyw/cv-arxiv-daily)\n\n";

const TABLE_HEADER: &str = "|Publish Date|Title|Authors|PDF|Code|\n|---|---|---|---|---|\n";
const WEB_TABLE_HEADER: &str = "| Publish Date | Title | Authors | PDF | Code |\n\
                                |:---------|:-----------------------|:---------|:------|:------|\n";

static MATH_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$.*\$").expect("math span pattern is valid"));

/// How a topic's entries ended up ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Newest date first
    ByDate,
    /// Descending key order, used when a date could not be read
    KeyFallback,
}

/// A rendered document plus the topics that needed the fallback ordering.
#[derive(Debug, Clone, Default)]
pub struct RenderReport {
    pub document: String,
    pub fallback_topics: Vec<String>,
}

/// Read the date token of a pre-rendered entry.
///
/// Table rows carry it in the first cell (`|**2024-06-07**|...`), list entries
/// before the first comma (`- 2024-06-07, **Title**, ...`).
pub fn entry_date(entry: &str) -> Option<String> {
    let token = if entry.starts_with('|') {
        entry.split('|').nth(1)?
    } else if let Some(rest) = entry.strip_prefix("- ") {
        rest.split_once(',')?.0
    } else {
        return None;
    };

    let token = token.replace("**", "");
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Order a topic's entries for rendering.
pub fn sort_entries(entries: &TopicEntries) -> (Vec<(&String, &String)>, SortOrder) {
    let dated: Option<Vec<_>> = entries
        .iter()
        .map(|(key, entry)| entry_date(entry).map(|date| (date, key, entry)))
        .collect();

    match dated {
        Some(mut dated) => {
            dated.sort_by(|a, b| b.0.cmp(&a.0));
            let sorted = dated.into_iter().map(|(_, k, e)| (k, e)).collect();
            (sorted, SortOrder::ByDate)
        }
        None => {
            let mut sorted: Vec<_> = entries.iter().collect();
            sorted.sort_by(|a, b| b.0.cmp(a.0));
            (sorted, SortOrder::KeyFallback)
        }
    }
}

/// Space out the first inline math span of an entry.
///
/// The span runs from the first `$` to the last `$` on its line. A single space
/// is inserted on either side unless the neighbour is already a space or an
/// emphasis marker, and whitespace just inside the delimiters is dropped.
pub fn pretty_math(s: &str) -> String {
    let Some(m) = MATH_SPAN.find(s) else {
        return s.to_string();
    };

    let before = &s[..m.start()];
    let after = &s[m.end()..];
    let inner = &m.as_str()[1..m.as_str().len() - 1];

    let needs_space = |c: Option<char>| matches!(c, Some(c) if c != ' ' && c != '*');
    let lead = if needs_space(before.chars().last()) { " " } else { "" };
    let trail = if needs_space(after.chars().next()) { " " } else { "" };

    format!("{before}{lead}${}${trail}{after}", inner.trim())
}

/// Anchor for a topic heading: lower-cased, spaces as hyphens.
pub fn topic_anchor(topic: &str) -> String {
    topic.replace(' ', "-").to_lowercase()
}

fn has_entries(entries: &TopicEntries) -> bool {
    !entries.is_empty()
}

/// Render a store into a Markdown document dated `date`.
pub fn render(store: &Store, options: &RenderOptions, date: NaiveDate) -> RenderReport {
    let date_now = date.format("%Y.%m.%d").to_string();
    let mut report = RenderReport::default();
    let doc = &mut report.document;

    if options.use_title {
        doc.push_str(&format!("## Updated on {date_now}\n"));
    } else {
        doc.push_str(&format!("> Updated on {date_now}\n"));
    }
    doc.push_str(USAGE_LINE);
    doc.push_str(ATTRIBUTION_LINE);

    if options.use_tc {
        doc.push_str("<details>\n");
        doc.push_str("  <summary>Table of Contents</summary>\n");
        doc.push_str("  <ol>\n");
        for (topic, _) in store.iter().filter(|(_, e)| has_entries(e)) {
            doc.push_str(&format!(
                "    <li><a href=#{}>{}</a></li>\n",
                topic_anchor(topic),
                topic
            ));
        }
        doc.push_str("  </ol>\n");
        doc.push_str("</details>\n\n");
    }

    let back_to_top = format!("#Updated on {date_now}")
        .replace(' ', "-")
        .replace('.', "")
        .to_lowercase();

    for (topic, entries) in store.iter().filter(|(_, e)| has_entries(e)) {
        doc.push_str(&format!("## {topic}\n\n"));

        if options.use_title {
            doc.push_str(if options.to_web {
                WEB_TABLE_HEADER
            } else {
                TABLE_HEADER
            });
        }

        let (sorted, order) = sort_entries(entries);
        if order == SortOrder::KeyFallback {
            log::warn!(
                "Could not sort papers of '{}' by date, falling back to key order",
                topic
            );
            report.fallback_topics.push(topic.clone());
        }
        for (_, entry) in sorted {
            doc.push_str(&pretty_math(entry));
        }

        doc.push('\n');

        if options.use_b2t {
            doc.push_str(&format!(
                "<p align=right>(<a href={back_to_top}>back to top</a>)</p>\n\n"
            ));
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(date: &str, key: &str) -> String {
        format!(
            "|**{date}**|**Title {key}**|Someone et.al.|[{key}](http://arxiv.org/abs/{key})|null|\n"
        )
    }

    fn entries(pairs: &[(&str, String)]) -> TopicEntries {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    #[test]
    fn reads_dates_from_both_layouts() {
        assert_eq!(entry_date(&row("2024-06-07", "1")), Some("2024-06-07".into()));
        assert_eq!(
            entry_date("- 2024-06-07, **T**, A et.al., Paper: [u](u)\n"),
            Some("2024-06-07".into())
        );
        assert_eq!(entry_date("garbage"), None);
        assert_eq!(entry_date("|"), None);
        assert_eq!(entry_date("|****|x|"), None);
    }

    #[test]
    fn sorts_by_date_descending() {
        let topic = entries(&[
            ("a", row("2024-06-07", "a")),
            ("b", row("2024-06-09", "b")),
            ("c", row("2024-06-05", "c")),
        ]);

        let (sorted, order) = sort_entries(&topic);
        let keys: Vec<_> = sorted.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(order, SortOrder::ByDate);
        assert_eq!(keys, ["b", "a", "c"]);
    }

    #[test]
    fn equal_dates_keep_store_order() {
        let topic = entries(&[
            ("x", row("2024-06-07", "x")),
            ("y", row("2024-06-07", "y")),
        ]);
        let (sorted, _) = sort_entries(&topic);
        let keys: Vec<_> = sorted.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["x", "y"]);
    }

    #[test]
    fn one_bad_entry_falls_back_to_key_order_for_whole_topic() {
        let topic = entries(&[
            ("2406.00002", row("2024-06-01", "2406.00002")),
            ("2406.00003", "malformed".to_string()),
            ("2406.00001", row("2024-06-09", "2406.00001")),
        ]);

        let (sorted, order) = sort_entries(&topic);
        let keys: Vec<_> = sorted.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(order, SortOrder::KeyFallback);
        assert_eq!(keys, ["2406.00003", "2406.00002", "2406.00001"]);
    }

    #[test]
    fn pretty_math_inserts_spaces_and_trims() {
        assert_eq!(pretty_math("see$x=1$here"), "see $x=1$ here");
        assert_eq!(pretty_math("see $ x=1 $ here"), "see $x=1$ here");
        assert_eq!(pretty_math("**$O(n)$**"), "**$O(n)$**");
        assert_eq!(pretty_math("no math"), "no math");
    }

    #[test]
    fn pretty_math_handles_span_at_edges() {
        assert_eq!(pretty_math("$x$"), "$x$");
        assert_eq!(pretty_math("$x$tail"), "$x$ tail");
    }

    #[test]
    fn pretty_math_in_table_row() {
        let input = "|**2024-06-07**|**Fast $\\mathcal{O}(n)$ SLAM**|A et.al.|[1](u)|null|\n";
        assert_eq!(pretty_math(input), input);

        let input = "|**2024-06-07**|**Fast$n^2$SLAM**|A et.al.|[1](u)|null|\n";
        assert_eq!(
            pretty_math(input),
            "|**2024-06-07**|**Fast $n^2$ SLAM**|A et.al.|[1](u)|null|\n"
        );
    }

    #[test]
    fn anchors() {
        assert_eq!(topic_anchor("Visual Odometry"), "visual-odometry");
    }

    #[test]
    fn renders_full_document() {
        let mut store = Store::new();
        store.insert_topic(
            "Visual SLAM",
            entries(&[
                ("1", row("2024-06-05", "1")),
                ("2", row("2024-06-09", "2")),
            ]),
        );
        store.insert_topic("Empty Topic", TopicEntries::new());

        let report = render(&store, &RenderOptions::default(), day());

        let expected = format!(
            "## Updated on 2024.06.10\n\
             {USAGE_LINE}{ATTRIBUTION_LINE}\
             <details>\n  <summary>Table of Contents</summary>\n  <ol>\n\
             \x20   <li><a href=#visual-slam>Visual SLAM</a></li>\n\
             \x20 </ol>\n</details>\n\n\
             ## Visual SLAM\n\n\
             {TABLE_HEADER}{}{}\n\
             <p align=right>(<a href=#updated-on-20240610>back to top</a>)</p>\n\n",
            row("2024-06-09", "2"),
            row("2024-06-05", "1"),
        );
        assert_eq!(report.document, expected);
        assert!(report.fallback_topics.is_empty());
    }

    #[test]
    fn empty_topics_get_no_heading_or_toc_entry() {
        let mut store = Store::new();
        store.insert_topic("Empty Topic", TopicEntries::new());

        let report = render(&store, &RenderOptions::default(), day());
        assert!(!report.document.contains("Empty Topic"));
        assert!(!report.document.contains("empty-topic"));
    }

    #[test]
    fn web_layout_uses_quote_header_and_web_table() {
        let mut store = Store::new();
        store.insert_topic(
            "SLAM",
            entries(&[("1", "- 2024-06-07, **T**, A et.al., Paper: [u](u)\n".to_string())]),
        );

        let quoted = RenderOptions {
            use_title: false,
            use_tc: false,
            use_b2t: false,
            to_web: true,
        };
        let report = render(&store, &quoted, day());
        assert!(report.document.starts_with("> Updated on 2024.06.10\n"));
        assert!(!report.document.contains("<details>"));
        assert!(!report.document.contains("back to top"));
        assert!(!report.document.contains("| Publish Date |"));

        let titled = RenderOptions {
            use_title: true,
            ..quoted
        };
        let report = render(&store, &titled, day());
        assert!(report.document.contains(WEB_TABLE_HEADER));
        assert!(report.fallback_topics.is_empty());
    }

    #[test]
    fn reports_fallback_topics() {
        let mut store = Store::new();
        store.insert_topic("Legacy", entries(&[("1", "old format\n".to_string())]));

        let report = render(&store, &RenderOptions::default(), day());
        assert_eq!(report.fallback_topics, ["Legacy"]);
        assert!(report.document.contains("old format\n"));
    }
}
