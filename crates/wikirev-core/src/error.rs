use thiserror::Error;

use crate::model::DocumentId;
use crate::store::StoreError;
use wikirev_diff::PatchCodecError;

#[derive(Debug, Error)]
pub enum RevisionError {
    #[error("revision {revision} does not exist for document {document}")]
    RevisionNotFound { document: DocumentId, revision: u32 },
    #[error(
        "stored patch for revision {revision} of document {document} no longer applies cleanly \
         ({failed} failed, {fuzzy} fuzzy hunks)"
    )]
    PatchDiverged {
        document: DocumentId,
        revision: u32,
        fuzzy: usize,
        failed: usize,
    },
    #[error("stored patch for revision {revision} of document {document} is unreadable: {source}")]
    CorruptPatch {
        document: DocumentId,
        revision: u32,
        source: PatchCodecError,
    },
    #[error("failed to encode patch for document {document}: {source}")]
    PatchEncode {
        document: DocumentId,
        source: PatchCodecError,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}
