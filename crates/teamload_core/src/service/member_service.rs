//! Member use-case service.
//!
//! # Invariants
//! - Names are trimmed before validation and persistence.
//! - Deleting a member never deletes tasks; they become unassigned.

use crate::model::member::{Member, MemberDraft, MemberId};
use crate::model::owner::OwnerId;
use crate::repo::member_repo::MemberRepository;
use crate::service::error::ServiceResult;
use log::info;

/// Member service facade over repository implementations.
pub struct MemberService<R: MemberRepository> {
    repo: R,
}

impl<R: MemberRepository> MemberService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a member with the given capacity (`0..=5`).
    pub fn create_member(
        &self,
        owner: &OwnerId,
        name: impl AsRef<str>,
        capacity: i64,
    ) -> ServiceResult<Member> {
        let draft = MemberDraft::new(name, capacity);
        draft.validate()?;
        let member = self.repo.create_member(owner, &draft)?;
        info!(
            "event=member_create module=service status=ok member_id={} capacity={}",
            member.id, member.capacity
        );
        Ok(member)
    }

    pub fn get_member(&self, owner: &OwnerId, id: MemberId) -> ServiceResult<Option<Member>> {
        Ok(self.repo.get_member(owner, id)?)
    }

    /// Lists members in registration order.
    pub fn list_members(&self, owner: &OwnerId) -> ServiceResult<Vec<Member>> {
        Ok(self.repo.list_members(owner)?)
    }

    pub fn delete_member(&self, owner: &OwnerId, id: MemberId) -> ServiceResult<()> {
        self.repo.delete_member(owner, id)?;
        info!("event=member_delete module=service status=ok member_id={id}");
        Ok(())
    }
}
