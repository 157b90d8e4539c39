//! The revision chain manager.
//!
//! Sole write path for a document's history: every content change goes
//! through [`RevisionManager::record_edit`], which stores a reverse
//! patch (post-edit -> pre-edit) in a new changeset. Reconstruction
//! walks those patches newest-first from the current content; reverting
//! reconstructs a historical state, flags the traversed changesets, and
//! records a fresh forward changeset documenting the reversion.
//!
//! The manager does no locking and no authorization; callers serialize
//! writes per document and check permissions (see [`crate::authz`])
//! before reaching the mutating entry points.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::RevisionError;
use crate::events::DomainEvent;
use crate::model::{ChangeSet, DocumentId, Markup, UserId};
use crate::store::{NewChangeSet, RevisionStore};
use wikirev_diff as textdiff;

/// What to do when a stored patch no longer applies cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyMode {
    /// Fail the operation with [`RevisionError::PatchDiverged`].
    Strict,
    /// Keep the fuzzy reconstruction, tagged in the returned
    /// [`Fidelity`] and logged as a warning.
    Lenient,
}

/// Whether a reconstruction is byte-exact or degraded by drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fidelity {
    Exact,
    Fuzzy { fuzzy_hunks: usize, failed_hunks: usize },
}

impl Fidelity {
    pub fn is_exact(&self) -> bool {
        matches!(self, Fidelity::Exact)
    }

    fn merge(self, other: Fidelity) -> Fidelity {
        match (self, other) {
            (Fidelity::Exact, f) | (f, Fidelity::Exact) => f,
            (
                Fidelity::Fuzzy {
                    fuzzy_hunks: f1,
                    failed_hunks: x1,
                },
                Fidelity::Fuzzy {
                    fuzzy_hunks: f2,
                    failed_hunks: x2,
                },
            ) => Fidelity::Fuzzy {
                fuzzy_hunks: f1 + f2,
                failed_hunks: x1 + x2,
            },
        }
    }
}

/// A historical text together with how faithfully it was rebuilt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconstructed {
    pub text: String,
    pub fidelity: Fidelity,
}

/// One edit to a document, as supplied by the caller.
#[derive(Debug, Clone)]
pub struct Edit {
    pub content: String,
    pub title: String,
    pub markup: Markup,
    pub comment: String,
    pub editor: Option<UserId>,
    pub editor_ip: Option<std::net::IpAddr>,
}

#[derive(Debug)]
pub struct EditOutcome {
    pub changeset: ChangeSet,
    pub events: Vec<DomainEvent>,
}

#[derive(Debug)]
pub struct RevertOutcome {
    pub changeset: ChangeSet,
    pub fidelity: Fidelity,
    pub events: Vec<DomainEvent>,
}

/// The change a single revision introduced, rendered for display.
#[derive(Debug, Clone)]
pub struct RevisionDiff {
    pub revision: u32,
    pub before: String,
    pub after: String,
    pub html: String,
    pub fidelity: Fidelity,
}

pub struct RevisionManager<S> {
    store: S,
    mode: ApplyMode,
}

impl<S: RevisionStore> RevisionManager<S> {
    pub fn new(store: S, mode: ApplyMode) -> Self {
        RevisionManager { store, mode }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Records one edit: stores the reverse patch as a changeset at
    /// `latest + 1` and writes the new current state.
    pub fn record_edit(&mut self, id: DocumentId, edit: Edit) -> Result<EditOutcome, RevisionError> {
        let mut doc = self.store.load_document(id)?;

        let reverse = textdiff::diff(&edit.content, &doc.content);
        let hunks = textdiff::make_patch(&edit.content, &reverse);
        let blob = textdiff::encode(&hunks)
            .map_err(|source| RevisionError::PatchEncode { document: id, source })?;

        let changeset = self.store.append_changeset(
            id,
            NewChangeSet {
                old_title: doc.title.clone(),
                old_markup: doc.markup,
                content_diff: blob,
                comment: edit.comment.clone(),
                editor: edit.editor,
                editor_ip: edit.editor_ip,
            },
        )?;

        doc.title = edit.title;
        doc.content = edit.content;
        doc.markup = edit.markup;
        doc.last_update = Utc::now();
        self.store.save_document(&doc)?;

        debug!(
            document = %id,
            revision = changeset.revision,
            editor = ?edit.editor,
            "recorded revision"
        );

        let events = vec![DomainEvent::RevisionRecorded {
            document: id,
            revision: changeset.revision,
            editor: edit.editor,
            comment: changeset.comment.clone(),
        }];
        Ok(EditOutcome { changeset, events })
    }

    /// Rebuilds the content as it was immediately after `target` was
    /// recorded. `target = 0` is the content before the first edit.
    pub fn reconstruct(
        &self,
        id: DocumentId,
        target: u32,
    ) -> Result<Reconstructed, RevisionError> {
        let latest = self.store.latest_revision(id)?;
        if target > latest {
            return Err(RevisionError::RevisionNotFound {
                document: id,
                revision: target,
            });
        }

        let doc = self.store.load_document(id)?;
        let mut text = doc.content;
        let mut fuzzy_hunks = 0usize;
        let mut failed_hunks = 0usize;

        for cs in self.store.changesets_after(id, target)? {
            let hunks = textdiff::decode(&cs.content_diff).map_err(|source| {
                RevisionError::CorruptPatch {
                    document: id,
                    revision: cs.revision,
                    source,
                }
            })?;
            let outcome = textdiff::apply(&hunks, &text);
            if !outcome.is_exact() {
                let fuzzy = outcome.fuzzy_hunks();
                let failed = outcome.failed_hunks();
                if self.mode == ApplyMode::Strict {
                    return Err(RevisionError::PatchDiverged {
                        document: id,
                        revision: cs.revision,
                        fuzzy,
                        failed,
                    });
                }
                warn!(
                    document = %id,
                    revision = cs.revision,
                    fuzzy,
                    failed,
                    "stored patch applied fuzzily"
                );
                fuzzy_hunks += fuzzy;
                failed_hunks += failed;
            }
            text = outcome.text;
        }

        let fidelity = if fuzzy_hunks == 0 && failed_hunks == 0 {
            Fidelity::Exact
        } else {
            Fidelity::Fuzzy {
                fuzzy_hunks,
                failed_hunks,
            }
        };
        Ok(Reconstructed { text, fidelity })
    }

    /// Restores the document to the state of revision `target`.
    ///
    /// The traversed changesets are flagged reverted and a new forward
    /// changeset is recorded, so history is preserved in full.
    /// `target = latest` is allowed and appends a content no-op
    /// changeset, matching the second-revert idempotence contract.
    pub fn revert_to(
        &mut self,
        id: DocumentId,
        target: u32,
        editor: Option<UserId>,
        editor_ip: Option<std::net::IpAddr>,
    ) -> Result<RevertOutcome, RevisionError> {
        let latest = self.store.latest_revision(id)?;
        if target < 1 || target > latest {
            return Err(RevisionError::RevisionNotFound {
                document: id,
                revision: target,
            });
        }

        let traversed = self.store.changesets_after(id, target)?;
        // Strict mode aborts here, before any state is written.
        let rebuilt = self.reconstruct(id, target)?;

        let doc = self.store.load_document(id)?;
        let (title, markup) = traversed
            .last()
            .map(|cs| (cs.old_title.clone(), cs.old_markup))
            .unwrap_or((doc.title, doc.markup));

        let revisions: Vec<u32> = traversed.iter().map(|cs| cs.revision).collect();
        self.store.mark_reverted(id, &revisions)?;

        let edit = Edit {
            content: rebuilt.text,
            title,
            markup,
            comment: format!("Reverted to revision #{target}"),
            editor,
            editor_ip,
        };
        let recorded = self.record_edit(id, edit)?;

        debug!(
            document = %id,
            target,
            new_revision = recorded.changeset.revision,
            fidelity = ?rebuilt.fidelity,
            "reverted document"
        );

        let mut events = vec![DomainEvent::DocumentReverted {
            document: id,
            target_revision: target,
            new_revision: recorded.changeset.revision,
            editor,
            fidelity: rebuilt.fidelity,
        }];
        events.extend(recorded.events);
        Ok(RevertOutcome {
            changeset: recorded.changeset,
            fidelity: rebuilt.fidelity,
            events,
        })
    }

    /// Renders the change revision `revision` introduced.
    pub fn diff_display(
        &self,
        id: DocumentId,
        revision: u32,
    ) -> Result<RevisionDiff, RevisionError> {
        let latest = self.store.latest_revision(id)?;
        if revision < 1 || revision > latest {
            return Err(RevisionError::RevisionNotFound {
                document: id,
                revision,
            });
        }

        let before = self.reconstruct(id, revision - 1)?;
        let after = self.reconstruct(id, revision)?;
        let d = textdiff::diff(&before.text, &after.text);
        Ok(RevisionDiff {
            revision,
            html: textdiff::render_html(&d),
            fidelity: before.fidelity.merge(after.fidelity),
            before: before.text,
            after: after.text,
        })
    }
}
