//! Permission facade.
//!
//! Pure predicate over (entity state, viewer, permission): total, never
//! errors, no side effects. The revision manager assumes its caller has
//! already passed through this check; nothing here is consulted on the
//! write path itself.

use crate::model::{Document, UserId};

/// The closed set of permissions the system defines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    View,
    Browse,
    Add,
    Edit,
    BrowseRevisions,
    ReapplyRevision,
    AddComment,
    ChangeComment,
    DeleteComment,
    MarkRemoved,
    Delete,
}

/// Who is asking. `user: None` is an anonymous visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewer {
    pub user: Option<UserId>,
}

impl Viewer {
    pub fn anonymous() -> Self {
        Viewer { user: None }
    }

    pub fn user(id: UserId) -> Self {
        Viewer { user: Some(id) }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Group collaborator: membership and explicit per-permission grants.
pub trait GroupPolicy {
    fn is_member(&self, user: UserId) -> bool;

    fn grants(&self, user: UserId, perm: Permission) -> bool;
}

/// Entity-side authorization hook with a fixed signature.
pub trait Authorizable {
    fn is_allowed(&self, viewer: &Viewer, perm: Permission) -> bool;
}

/// A document paired with the policy of the group it is scoped to, if
/// any. This is the unit the authorization layer consults.
pub struct DocumentAcl<'a, G: GroupPolicy> {
    pub document: &'a Document,
    pub group: Option<&'a G>,
}

impl<'a, G: GroupPolicy> DocumentAcl<'a, G> {
    pub fn new(document: &'a Document, group: Option<&'a G>) -> Self {
        DocumentAcl { document, group }
    }
}

impl<G: GroupPolicy> Authorizable for DocumentAcl<'_, G> {
    fn is_allowed(&self, viewer: &Viewer, perm: Permission) -> bool {
        match self.group {
            Some(group) => {
                let member = viewer.user.map(|u| group.is_member(u)).unwrap_or(false);
                let granted = viewer.user.map(|u| group.grants(u, perm)).unwrap_or(false);
                match perm {
                    Permission::View | Permission::Browse => {
                        viewer.user.map(|u| group.grants(u, Permission::View)).unwrap_or(false)
                    }
                    Permission::Add
                    | Permission::Edit
                    | Permission::BrowseRevisions
                    | Permission::ReapplyRevision => member,
                    Permission::AddComment => member || granted,
                    Permission::MarkRemoved
                    | Permission::Delete
                    | Permission::ChangeComment
                    | Permission::DeleteComment => granted,
                }
            }
            None => match perm {
                Permission::View | Permission::Browse => true,
                Permission::Add
                | Permission::Edit
                | Permission::BrowseRevisions
                | Permission::ReapplyRevision
                | Permission::AddComment => viewer.is_authenticated(),
                Permission::MarkRemoved
                | Permission::Delete
                | Permission::ChangeComment
                | Permission::DeleteComment => false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Document, DocumentId, GroupId};

    /// Members can do member things; user 1 additionally holds every
    /// explicit grant.
    struct TestGroup {
        members: Vec<UserId>,
    }

    impl GroupPolicy for TestGroup {
        fn is_member(&self, user: UserId) -> bool {
            self.members.contains(&user)
        }

        fn grants(&self, user: UserId, _perm: Permission) -> bool {
            user == UserId(1)
        }
    }

    fn ungrouped() -> Document {
        Document::new(DocumentId(1), "FrontPage", "hi")
    }

    fn grouped() -> Document {
        let mut doc = ungrouped();
        doc.group = Some(GroupId(10));
        doc
    }

    #[test]
    fn ungrouped_world_readable() {
        let doc = ungrouped();
        let acl: DocumentAcl<TestGroup> = DocumentAcl::new(&doc, None);
        assert!(acl.is_allowed(&Viewer::anonymous(), Permission::View));
        assert!(acl.is_allowed(&Viewer::anonymous(), Permission::Browse));
        assert!(!acl.is_allowed(&Viewer::anonymous(), Permission::Edit));
        assert!(acl.is_allowed(&Viewer::user(UserId(2)), Permission::Edit));
        assert!(acl.is_allowed(&Viewer::user(UserId(2)), Permission::ReapplyRevision));
    }

    #[test]
    fn ungrouped_moderation_always_denied() {
        let doc = ungrouped();
        let acl: DocumentAcl<TestGroup> = DocumentAcl::new(&doc, None);
        for perm in [
            Permission::MarkRemoved,
            Permission::Delete,
            Permission::ChangeComment,
            Permission::DeleteComment,
        ] {
            assert!(!acl.is_allowed(&Viewer::user(UserId(2)), perm));
            assert!(!acl.is_allowed(&Viewer::anonymous(), perm));
        }
    }

    #[test]
    fn grouped_delegates_to_membership_and_grants() {
        let doc = grouped();
        let group = TestGroup {
            members: vec![UserId(2)],
        };
        let acl = DocumentAcl::new(&doc, Some(&group));

        // Member without grants.
        let member = Viewer::user(UserId(2));
        assert!(acl.is_allowed(&member, Permission::Edit));
        assert!(acl.is_allowed(&member, Permission::ReapplyRevision));
        assert!(acl.is_allowed(&member, Permission::AddComment));
        assert!(!acl.is_allowed(&member, Permission::View));
        assert!(!acl.is_allowed(&member, Permission::MarkRemoved));

        // Grant-holder who is not a member.
        let moderator = Viewer::user(UserId(1));
        assert!(acl.is_allowed(&moderator, Permission::View));
        assert!(acl.is_allowed(&moderator, Permission::MarkRemoved));
        assert!(!acl.is_allowed(&moderator, Permission::Edit));

        // Anonymous gets nothing on a group wiki.
        for perm in [Permission::View, Permission::Edit, Permission::AddComment] {
            assert!(!acl.is_allowed(&Viewer::anonymous(), perm));
        }
    }
}
