//! Domain events emitted by the revision manager.
//!
//! Mutating entry points return the events they produced; an outer
//! dispatcher (notifications, feeds, cache invalidation) consumes them.
//! There is no implicit signal bus.

use serde::{Deserialize, Serialize};

use crate::manager::Fidelity;
use crate::model::{DocumentId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomainEvent {
    RevisionRecorded {
        document: DocumentId,
        revision: u32,
        editor: Option<UserId>,
        comment: String,
    },
    DocumentReverted {
        document: DocumentId,
        target_revision: u32,
        new_revision: u32,
        editor: Option<UserId>,
        fidelity: Fidelity,
    },
}
