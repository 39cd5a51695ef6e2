//! Filter trees and their compilation into arXiv query syntax.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// A node of a topic's filter tree.
///
/// In configuration files a node is written as a string (a literal term) or as
/// an array of nodes (a group), so `["SLAM", ["visual", "odometry"]]` is a
/// group holding one term and one nested group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterSpec {
    /// A single search term, quoted when compiled.
    Literal(String),
    /// A list of child nodes.
    Group(Vec<FilterSpec>),
}

impl FilterSpec {
    /// Build a group of literal terms.
    pub fn terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Group(terms.into_iter().map(|t| Self::Literal(t.into())).collect())
    }

    /// Compile this node into a query string.
    ///
    /// A group made only of literals is an OR of its quoted terms. A group with
    /// at least one nested group is an AND of its children, nested groups
    /// parenthesized. The rule applies at every depth and child order is kept.
    pub fn compile(&self) -> Result<String> {
        match self {
            Self::Literal(term) => quote(term),
            Self::Group(children) => {
                if children.is_empty() {
                    return Err(AppError::config("filter group is empty"));
                }

                let has_group = children.iter().any(|c| matches!(c, Self::Group(_)));
                let parts = children
                    .iter()
                    .map(|child| match child {
                        Self::Literal(term) => quote(term),
                        Self::Group(_) => child.compile().map(|inner| format!("({inner})")),
                    })
                    .collect::<Result<Vec<_>>>()?;

                let connector = if has_group { " AND " } else { " OR " };
                Ok(parts.join(connector))
            }
        }
    }
}

fn quote(term: &str) -> Result<String> {
    if term.trim().is_empty() {
        return Err(AppError::config("filter term is blank"));
    }
    Ok(format!("\"{term}\""))
}

/// Compile a filter tree into a query string.
pub fn compile(spec: &FilterSpec) -> Result<String> {
    spec.compile()
}
