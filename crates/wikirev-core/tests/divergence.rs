//! Behavior when stored patches no longer match the current content,
//! e.g. after writes that bypassed the revision manager.

use wikirev_core::{
    ApplyMode, Document, DocumentId, Edit, Fidelity, Markup, MemoryStore, RevisionError,
    RevisionManager, RevisionStore, UserId,
};

const DOC: DocumentId = DocumentId(1);

fn edit(content: &str) -> Edit {
    Edit {
        content: content.into(),
        title: "FrontPage".into(),
        markup: Markup::Creole,
        comment: String::new(),
        editor: Some(UserId(7)),
        editor_ip: None,
    }
}

fn store_with_history() -> MemoryStore {
    let mut store = MemoryStore::new();
    store.create_document(Document::new(DOC, "FrontPage", "alpha beta gamma"));
    let mut mgr = RevisionManager::new(store, ApplyMode::Lenient);
    mgr.record_edit(DOC, edit("alpha BETA gamma")).unwrap();
    mgr.record_edit(DOC, edit("alpha BETA gamma delta")).unwrap();
    mgr.into_store()
}

fn clobber_content(store: &mut MemoryStore) {
    // Replace the current content behind the manager's back with text
    // none of the stored patches can anchor in.
    let mut doc = store.load_document(DOC).unwrap();
    doc.content = "1234567890 1234567890 1234567890".into();
    store.save_document(&doc).unwrap();
}

#[test]
fn lenient_mode_tags_the_reconstruction() {
    let mut store = store_with_history();
    clobber_content(&mut store);
    let mgr = RevisionManager::new(store, ApplyMode::Lenient);

    let rebuilt = mgr.reconstruct(DOC, 0).unwrap();
    match rebuilt.fidelity {
        Fidelity::Fuzzy { failed_hunks, .. } => assert!(failed_hunks > 0),
        Fidelity::Exact => panic!("divergence went unnoticed"),
    }
}

#[test]
fn strict_mode_fails_the_reconstruction() {
    let mut store = store_with_history();
    clobber_content(&mut store);
    let mgr = RevisionManager::new(store, ApplyMode::Strict);

    assert!(matches!(
        mgr.reconstruct(DOC, 0),
        Err(RevisionError::PatchDiverged { revision: 2, .. })
    ));
}

#[test]
fn strict_revert_aborts_before_writing() {
    let mut store = store_with_history();
    clobber_content(&mut store);
    let mut mgr = RevisionManager::new(store, ApplyMode::Strict);

    assert!(matches!(
        mgr.revert_to(DOC, 1, None, None),
        Err(RevisionError::PatchDiverged { .. })
    ));

    // Nothing was flagged and no changeset was appended.
    assert_eq!(mgr.store().latest_revision(DOC).unwrap(), 2);
    assert!(!mgr.store().changeset(DOC, 2).unwrap().reverted);
}

#[test]
fn clean_history_reverts_exactly() {
    let store = store_with_history();
    let mut mgr = RevisionManager::new(store, ApplyMode::Strict);

    let outcome = mgr.revert_to(DOC, 1, None, None).unwrap();
    assert!(outcome.fidelity.is_exact());
    assert_eq!(
        mgr.store().load_document(DOC).unwrap().content,
        "alpha BETA gamma"
    );
}
