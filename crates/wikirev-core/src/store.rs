//! Storage seam for documents and their revision chains.
//!
//! The manager talks to a [`RevisionStore`]; a database-backed
//! implementation plugs in behind the same trait. [`MemoryStore`] is the
//! reference implementation used by tests and embedders.
//!
//! Revision numbers are assigned inside [`RevisionStore::append_changeset`]
//! under the store's exclusive borrow, so the classic
//! read-max-then-write race cannot be expressed through that path.
//! [`RevisionStore::insert_changeset`] takes a caller-chosen revision and
//! enforces the unique `(document, revision)` constraint instead; it
//! exists for stores that replicate externally numbered history and to
//! keep the naive-numbering collision demonstrable.

use std::collections::HashMap;

use thiserror::Error;

use crate::model::{ChangeSet, Document, DocumentId, Markup, UserId};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document {0} not found")]
    DocumentNotFound(DocumentId),
    #[error("changeset revision {revision} not found for document {document}")]
    ChangeSetNotFound { document: DocumentId, revision: u32 },
    #[error("revision {revision} already exists for document {document}")]
    RevisionConflict { document: DocumentId, revision: u32 },
}

/// Changeset fields supplied by the caller; the store fills in the
/// revision number.
#[derive(Debug, Clone)]
pub struct NewChangeSet {
    pub old_title: String,
    pub old_markup: Markup,
    pub content_diff: String,
    pub comment: String,
    pub editor: Option<UserId>,
    pub editor_ip: Option<std::net::IpAddr>,
}

pub trait RevisionStore {
    fn load_document(&self, id: DocumentId) -> Result<Document, StoreError>;

    fn save_document(&mut self, doc: &Document) -> Result<(), StoreError>;

    /// Appends a changeset at `latest_revision + 1` and returns it.
    fn append_changeset(
        &mut self,
        id: DocumentId,
        new: NewChangeSet,
    ) -> Result<ChangeSet, StoreError>;

    /// Inserts a changeset with a caller-supplied revision number,
    /// enforcing the unique `(document, revision)` constraint.
    fn insert_changeset(&mut self, cs: ChangeSet) -> Result<(), StoreError>;

    fn changeset(&self, id: DocumentId, revision: u32) -> Result<ChangeSet, StoreError>;

    /// All changesets with `revision > after`, newest first.
    fn changesets_after(&self, id: DocumentId, after: u32) -> Result<Vec<ChangeSet>, StoreError>;

    /// Highest assigned revision, or 0 when the document has no history.
    fn latest_revision(&self, id: DocumentId) -> Result<u32, StoreError>;

    /// Flags the given revisions as reverted.
    fn mark_reverted(&mut self, id: DocumentId, revisions: &[u32]) -> Result<(), StoreError>;
}

#[derive(Debug)]
struct DocumentRecord {
    document: Document,
    changesets: Vec<ChangeSet>,
}

/// HashMap-backed store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: HashMap<DocumentId, DocumentRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the document row; the initial save records no changeset.
    pub fn create_document(&mut self, doc: Document) {
        self.records.insert(
            doc.id,
            DocumentRecord {
                document: doc,
                changesets: Vec::new(),
            },
        );
    }

    fn record(&self, id: DocumentId) -> Result<&DocumentRecord, StoreError> {
        self.records.get(&id).ok_or(StoreError::DocumentNotFound(id))
    }

    fn record_mut(&mut self, id: DocumentId) -> Result<&mut DocumentRecord, StoreError> {
        self.records
            .get_mut(&id)
            .ok_or(StoreError::DocumentNotFound(id))
    }
}

impl RevisionStore for MemoryStore {
    fn load_document(&self, id: DocumentId) -> Result<Document, StoreError> {
        Ok(self.record(id)?.document.clone())
    }

    fn save_document(&mut self, doc: &Document) -> Result<(), StoreError> {
        self.record_mut(doc.id)?.document = doc.clone();
        Ok(())
    }

    fn append_changeset(
        &mut self,
        id: DocumentId,
        new: NewChangeSet,
    ) -> Result<ChangeSet, StoreError> {
        let rec = self.record_mut(id)?;
        let revision = rec.changesets.last().map(|cs| cs.revision).unwrap_or(0) + 1;
        let cs = ChangeSet {
            document: id,
            revision,
            old_title: new.old_title,
            old_markup: new.old_markup,
            content_diff: new.content_diff,
            comment: new.comment,
            editor: new.editor,
            editor_ip: new.editor_ip,
            reverted: false,
            modified: chrono::Utc::now(),
        };
        rec.changesets.push(cs.clone());
        Ok(cs)
    }

    fn insert_changeset(&mut self, cs: ChangeSet) -> Result<(), StoreError> {
        let rec = self.record_mut(cs.document)?;
        if rec.changesets.iter().any(|c| c.revision == cs.revision) {
            return Err(StoreError::RevisionConflict {
                document: cs.document,
                revision: cs.revision,
            });
        }
        rec.changesets.push(cs);
        rec.changesets.sort_by_key(|c| c.revision);
        Ok(())
    }

    fn changeset(&self, id: DocumentId, revision: u32) -> Result<ChangeSet, StoreError> {
        self.record(id)?
            .changesets
            .iter()
            .find(|c| c.revision == revision)
            .cloned()
            .ok_or(StoreError::ChangeSetNotFound {
                document: id,
                revision,
            })
    }

    fn changesets_after(&self, id: DocumentId, after: u32) -> Result<Vec<ChangeSet>, StoreError> {
        let mut out: Vec<ChangeSet> = self
            .record(id)?
            .changesets
            .iter()
            .filter(|c| c.revision > after)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.revision.cmp(&a.revision));
        Ok(out)
    }

    fn latest_revision(&self, id: DocumentId) -> Result<u32, StoreError> {
        Ok(self
            .record(id)?
            .changesets
            .last()
            .map(|c| c.revision)
            .unwrap_or(0))
    }

    fn mark_reverted(&mut self, id: DocumentId, revisions: &[u32]) -> Result<(), StoreError> {
        let rec = self.record_mut(id)?;
        for cs in rec.changesets.iter_mut() {
            if revisions.contains(&cs.revision) {
                cs.reverted = true;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_cs() -> NewChangeSet {
        NewChangeSet {
            old_title: "FrontPage".into(),
            old_markup: Markup::Creole,
            content_diff: "[]".into(),
            comment: String::new(),
            editor: None,
            editor_ip: None,
        }
    }

    #[test]
    fn append_assigns_contiguous_revisions() {
        let mut store = MemoryStore::new();
        store.create_document(Document::new(DocumentId(1), "FrontPage", "hi"));
        for expected in 1..=5u32 {
            let cs = store.append_changeset(DocumentId(1), new_cs()).unwrap();
            assert_eq!(cs.revision, expected);
        }
        assert_eq!(store.latest_revision(DocumentId(1)).unwrap(), 5);
    }

    #[test]
    fn insert_enforces_unique_revision() {
        let mut store = MemoryStore::new();
        store.create_document(Document::new(DocumentId(1), "FrontPage", "hi"));
        let cs = store.append_changeset(DocumentId(1), new_cs()).unwrap();

        let err = store.insert_changeset(cs).unwrap_err();
        assert!(matches!(err, StoreError::RevisionConflict { revision: 1, .. }));
    }

    #[test]
    fn changesets_after_is_newest_first() {
        let mut store = MemoryStore::new();
        store.create_document(Document::new(DocumentId(1), "FrontPage", "hi"));
        for _ in 0..4 {
            store.append_changeset(DocumentId(1), new_cs()).unwrap();
        }
        let after = store.changesets_after(DocumentId(1), 1).unwrap();
        let revisions: Vec<u32> = after.iter().map(|c| c.revision).collect();
        assert_eq!(revisions, vec![4, 3, 2]);
    }

    #[test]
    fn missing_document_and_revision_are_distinct_errors() {
        let mut store = MemoryStore::new();
        assert!(matches!(
            store.load_document(DocumentId(9)),
            Err(StoreError::DocumentNotFound(DocumentId(9)))
        ));
        store.create_document(Document::new(DocumentId(1), "FrontPage", "hi"));
        assert!(matches!(
            store.changeset(DocumentId(1), 3),
            Err(StoreError::ChangeSetNotFound { revision: 3, .. })
        ));
    }
}
