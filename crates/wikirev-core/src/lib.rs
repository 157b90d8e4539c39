//! Revision engine for wiki documents.
//!
//! Every edit appends a [`model::ChangeSet`] holding a reverse patch
//! (post-edit content to pre-edit content) plus editor metadata. The
//! [`manager::RevisionManager`] reconstructs any historical revision by
//! walking those patches newest-first and reverts by reconstructing,
//! flagging the traversed changesets, and recording a fresh forward
//! changeset. History is append-only.
//!
//! Persistence, HTTP, and notification delivery live behind the seams:
//! [`store::RevisionStore`], [`authz::Authorizable`], and the
//! [`events::DomainEvent`] values returned from mutating calls.

pub mod authz;
pub mod error;
pub mod events;
pub mod manager;
pub mod model;
pub mod store;
pub mod title;

pub use authz::{Authorizable, DocumentAcl, GroupPolicy, Permission, Viewer};
pub use error::RevisionError;
pub use events::DomainEvent;
pub use manager::{
    ApplyMode, Edit, EditOutcome, Fidelity, Reconstructed, RevertOutcome, RevisionDiff,
    RevisionManager,
};
pub use model::{ChangeSet, Document, DocumentId, GroupId, Markup, UserId};
pub use store::{MemoryStore, NewChangeSet, RevisionStore, StoreError};
pub use title::{link_wiki_words, validate_title, TitleError, BANNED_TITLES};

/// Returns the crate version at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
