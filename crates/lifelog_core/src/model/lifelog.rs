//! Lifelog domain model.
//!
//! # Responsibility
//! - Define the typed shape of lifelog records returned by the remote API.
//! - Provide semantic checks that structural decoding cannot express.
//!
//! # Invariants
//! - `Lifelog::id` is the record identity; refetches of the same id are the
//!   same logical entry.
//! - `start_offset_ms <= end_offset_ms` for every content node where both are set.
//! - `start_time <= end_time` for a lifelog when both parse as RFC 3339.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::model::validation::ValidationError;

/// Stable identifier assigned by the remote API.
pub type LifelogId = String;

/// Known speaker identities attached to transcript nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeakerIdentifier {
    /// The owner of the recording device.
    User,
}

/// One segment of a lifelog's structured content.
///
/// Nodes form a tree: headings carry paragraphs and blockquotes as children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentNode {
    /// Node tag such as `heading1`, `paragraph` or `blockquote`.
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    /// Milliseconds from the lifelog start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_offset_ms: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_offset_ms: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ContentNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker_identifier: Option<SpeakerIdentifier>,
}

impl ContentNode {
    /// Creates a leaf node with no timing or speaker metadata.
    pub fn new(kind: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            content: content.into(),
            start_time: None,
            end_time: None,
            start_offset_ms: None,
            end_offset_ms: None,
            children: Vec::new(),
            speaker_name: None,
            speaker_identifier: None,
        }
    }

    /// Iterates this node and all descendants in depth-first pre-order.
    pub fn walk(&self) -> ContentWalk<'_> {
        ContentWalk { stack: vec![self] }
    }

    /// Checks offset ordering on this node and every descendant.
    ///
    /// `path` is the JSON-style location used in error messages.
    pub fn validate(&self, path: &str) -> Result<(), ValidationError> {
        if let (Some(start), Some(end)) = (self.start_offset_ms, self.end_offset_ms) {
            if start > end {
                return Err(ValidationError::invariant(
                    path,
                    format!("startOffsetMs {start} is after endOffsetMs {end}"),
                ));
            }
        }

        for (index, child) in self.children.iter().enumerate() {
            child.validate(&format!("{path}.children[{index}]"))?;
        }

        Ok(())
    }
}

/// Depth-first iterator returned by [`ContentNode::walk`].
pub struct ContentWalk<'a> {
    stack: Vec<&'a ContentNode>,
}

impl<'a> Iterator for ContentWalk<'a> {
    type Item = &'a ContentNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// A single journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lifelog {
    pub id: LifelogId,
    pub title: String,
    /// Markdown rendering of the whole entry; `null` when not requested.
    #[serde(default)]
    pub markdown: Option<String>,
    pub contents: Vec<ContentNode>,
    pub start_time: String,
    pub end_time: String,
    pub is_starred: bool,
    pub updated_at: String,
}

impl Lifelog {
    /// Counts every content node in the tree, not just the root level.
    pub fn content_node_count(&self) -> usize {
        self.contents.iter().map(|node| node.walk().count()).sum()
    }

    /// Runs semantic checks on top of the structural decode.
    ///
    /// # Errors
    /// - Start time after end time, when both are RFC 3339 instants.
    /// - Any content node whose start offset exceeds its end offset.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let (Some(start), Some(end)) = (
            parse_instant(&self.start_time),
            parse_instant(&self.end_time),
        ) {
            if start > end {
                return Err(ValidationError::invariant(
                    &format!("lifelog `{}`", self.id),
                    format!(
                        "startTime {} is after endTime {}",
                        self.start_time, self.end_time
                    ),
                ));
            }
        }

        for (index, node) in self.contents.iter().enumerate() {
            node.validate(&format!("lifelog `{}`.contents[{index}]", self.id))?;
        }

        Ok(())
    }
}

fn parse_instant(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value).ok()
}

/// Raw envelope returned by `GET /v1/lifelogs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifelogsResponse {
    pub data: LifelogsData,
    pub meta: LifelogsMeta,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifelogsData {
    pub lifelogs: Vec<Lifelog>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifelogsMeta {
    pub lifelogs: PageMeta,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    pub count: u64,
}

/// One fetched page flattened for callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifelogPage {
    pub lifelogs: Vec<Lifelog>,
    /// `None` on the last page.
    pub next_cursor: Option<String>,
    pub count: u64,
}

impl From<LifelogsResponse> for LifelogPage {
    fn from(response: LifelogsResponse) -> Self {
        // An empty cursor carries no continuation.
        let next_cursor = response
            .meta
            .lifelogs
            .next_cursor
            .filter(|cursor| !cursor.is_empty());
        Self {
            lifelogs: response.data.lifelogs,
            next_cursor,
            count: response.meta.lifelogs.count,
        }
    }
}
