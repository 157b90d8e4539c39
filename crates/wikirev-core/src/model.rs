//! The document and changeset data model.
//!
//! A [`Document`] holds the current accepted content; every content
//! change appends a [`ChangeSet`] whose `content_diff` is a reverse
//! patch (post-edit text to pre-edit text). Changesets are never
//! deleted; a revert only flags the ones it walked over.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId(pub u64);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Markup kinds a document's content can be written in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Markup {
    #[default]
    Creole,
    Markdown,
    Textile,
    RestructuredText,
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Markup::Creole => "creole",
            Markup::Markdown => "markdown",
            Markup::Textile => "textile",
            Markup::RestructuredText => "restructuredtext",
        };
        f.write_str(name)
    }
}

impl FromStr for Markup {
    type Err = UnknownMarkup;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "creole" => Ok(Markup::Creole),
            "markdown" => Ok(Markup::Markdown),
            "textile" => Ok(Markup::Textile),
            "restructuredtext" => Ok(Markup::RestructuredText),
            other => Err(UnknownMarkup(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown markup kind: {0}")]
pub struct UnknownMarkup(pub String);

/// A wiki page. `content` and `title` always reflect the latest
/// accepted revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    pub content: String,
    pub markup: Markup,
    pub creator: Option<UserId>,
    pub creator_ip: Option<IpAddr>,
    /// Scope for group wikis; `None` for the site-wide wiki.
    pub group: Option<GroupId>,
    /// Soft-delete flag, orthogonal to revision history.
    pub removed: bool,
    pub created_at: DateTime<Utc>,
    pub last_update: DateTime<Utc>,
}

impl Document {
    pub fn new(id: DocumentId, title: impl Into<String>, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Document {
            id,
            title: title.into(),
            content: content.into(),
            markup: Markup::default(),
            creator: None,
            creator_ip: None,
            group: None,
            removed: false,
            created_at: now,
            last_update: now,
        }
    }

    pub fn mark_removed(&mut self) {
        if !self.removed {
            self.removed = true;
            self.last_update = Utc::now();
        }
    }
}

/// One entry in a document's append-only history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub document: DocumentId,
    /// Unique and contiguous per document, starting at 1. Assigned by
    /// the store, never by callers.
    pub revision: u32,
    pub old_title: String,
    pub old_markup: Markup,
    /// Serialized reverse patch: applied to the post-edit content it
    /// yields the pre-edit content.
    pub content_diff: String,
    pub comment: String,
    pub editor: Option<UserId>,
    pub editor_ip: Option<IpAddr>,
    /// Set when a later revert walked over this changeset. The entry
    /// stays part of the permanent history.
    pub reverted: bool,
    pub modified: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markup_display_roundtrip() {
        for m in [
            Markup::Creole,
            Markup::Markdown,
            Markup::Textile,
            Markup::RestructuredText,
        ] {
            assert_eq!(m.to_string().parse::<Markup>(), Ok(m));
        }
        assert!("html".parse::<Markup>().is_err());
    }

    #[test]
    fn mark_removed_is_sticky() {
        let mut doc = Document::new(DocumentId(1), "FrontPage", "welcome");
        assert!(!doc.removed);
        doc.mark_removed();
        assert!(doc.removed);
        doc.mark_removed();
        assert!(doc.removed);
    }
}
