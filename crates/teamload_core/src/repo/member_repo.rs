//! Member repository contract and SQLite implementation.
//!
//! # Invariants
//! - Listing order is registration order: `created_at ASC, rowid ASC`.
//! - Deleting a member unassigns its tasks (`ON DELETE SET NULL`); tasks are
//!   never removed with it.

use super::{count_to_u32, ensure_connection_ready, parse_uuid, RepoError, RepoResult};
use crate::model::member::{Member, MemberDraft, MemberId};
use crate::model::owner::OwnerId;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const MEMBER_SELECT_SQL: &str = "SELECT
    uuid,
    owner_id,
    name,
    capacity,
    created_at
FROM members";

/// Repository interface for owner-scoped member records.
pub trait MemberRepository {
    /// Persists a validated draft and returns the stored record.
    fn create_member(&self, owner: &OwnerId, draft: &MemberDraft) -> RepoResult<Member>;
    fn get_member(&self, owner: &OwnerId, id: MemberId) -> RepoResult<Option<Member>>;
    /// Returns all members of `owner` in registration order.
    fn list_members(&self, owner: &OwnerId) -> RepoResult<Vec<Member>>;
    fn count_members(&self, owner: &OwnerId) -> RepoResult<u32>;
    /// Deletes one member; its tasks become unassigned.
    fn delete_member(&self, owner: &OwnerId, id: MemberId) -> RepoResult<()>;
}

/// SQLite-backed member repository.
pub struct SqliteMemberRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMemberRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["members"])?;
        Ok(Self { conn })
    }
}

impl MemberRepository for SqliteMemberRepository<'_> {
    fn create_member(&self, owner: &OwnerId, draft: &MemberDraft) -> RepoResult<Member> {
        draft.validate()?;

        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO members (uuid, owner_id, name, capacity)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                id.to_string(),
                owner.as_str(),
                draft.name.as_str(),
                draft.capacity
            ],
        )?;

        self.get_member(owner, id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("created member {id} missing in read-back"))
        })
    }

    fn get_member(&self, owner: &OwnerId, id: MemberId) -> RepoResult<Option<Member>> {
        let sql = format!("{MEMBER_SELECT_SQL} WHERE uuid = ?1 AND owner_id = ?2;");
        self.conn
            .query_row(&sql, params![id.to_string(), owner.as_str()], |row| {
                Ok(parse_member_row(row))
            })
            .optional()?
            .transpose()
    }

    fn list_members(&self, owner: &OwnerId) -> RepoResult<Vec<Member>> {
        let mut stmt = self.conn.prepare(&format!(
            "{MEMBER_SELECT_SQL}
             WHERE owner_id = ?1
             ORDER BY created_at ASC, rowid ASC;"
        ))?;
        let mut rows = stmt.query([owner.as_str()])?;
        let mut members = Vec::new();
        while let Some(row) = rows.next()? {
            members.push(parse_member_row(row)?);
        }
        Ok(members)
    }

    fn count_members(&self, owner: &OwnerId) -> RepoResult<u32> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM members WHERE owner_id = ?1;",
            [owner.as_str()],
            |row| row.get(0),
        )?;
        count_to_u32(count, "member count")
    }

    fn delete_member(&self, owner: &OwnerId, id: MemberId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM members WHERE uuid = ?1 AND owner_id = ?2;",
            params![id.to_string(), owner.as_str()],
        )?;

        if changed == 0 {
            return Err(RepoError::MemberNotFound(id));
        }

        Ok(())
    }
}

fn parse_member_row(row: &Row<'_>) -> RepoResult<Member> {
    let uuid_text: String = row.get("uuid")?;
    let owner_text: String = row.get("owner_id")?;
    let owner_id = OwnerId::parse(&owner_text).map_err(|_| {
        RepoError::InvalidData(format!("blank owner_id for member `{uuid_text}`"))
    })?;
    let capacity_raw: i64 = row.get("capacity")?;
    let capacity = u32::try_from(capacity_raw).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid capacity `{capacity_raw}` in members.capacity"
        ))
    })?;

    let member = Member {
        id: parse_uuid(&uuid_text, "members.uuid")?,
        owner_id,
        name: row.get("name")?,
        capacity,
        created_at: row.get("created_at")?,
    };
    member.validate()?;
    Ok(member)
}
