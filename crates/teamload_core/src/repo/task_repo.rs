//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide owner-scoped task CRUD for use-case services.
//! - Provide the count/query/reassign primitives the balancing core consumes.
//!
//! # Invariants
//! - An assignment is only written when the member belongs to the same owner.
//! - Task listing is newest first: `created_at DESC, rowid DESC`.
//! - Per-member todo listing is least urgent first, then oldest first.

use super::{count_to_u32, ensure_connection_ready, parse_uuid, RepoError, RepoResult};
use crate::model::member::MemberId;
use crate::model::owner::OwnerId;
use crate::model::task::{Task, TaskDraft, TaskId, TaskPatch, TaskPriority, TaskStatus};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use uuid::Uuid;

const TASK_SELECT_SQL: &str = "SELECT
    uuid,
    owner_id,
    title,
    assigned_member_id,
    priority,
    status,
    created_at,
    updated_at
FROM tasks";

const PRIORITY_RANK_SQL: &str =
    "CASE priority WHEN 'low' THEN 0 WHEN 'medium' THEN 1 ELSE 2 END";

/// Task read model joined with its assignee's display fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    pub task: Task,
    /// `None` when unassigned.
    pub member_name: Option<String>,
    /// `None` when unassigned.
    pub member_capacity: Option<u32>,
}

/// Repository interface for owner-scoped task records.
pub trait TaskRepository {
    /// Persists a validated draft and returns the stored record.
    fn create_task(&self, owner: &OwnerId, draft: &TaskDraft) -> RepoResult<Task>;
    fn get_task(&self, owner: &OwnerId, id: TaskId) -> RepoResult<Option<Task>>;
    /// Lists all tasks of `owner`, newest first, with assignee fields.
    fn list_tasks(&self, owner: &OwnerId) -> RepoResult<Vec<TaskRecord>>;
    /// Applies a partial update and returns the stored record.
    fn update_task(&self, owner: &OwnerId, id: TaskId, patch: &TaskPatch) -> RepoResult<Task>;
    fn delete_task(&self, owner: &OwnerId, id: TaskId) -> RepoResult<()>;
    fn count_tasks(&self, owner: &OwnerId) -> RepoResult<u32>;
    /// Counts `Todo` tasks assigned to `member_id`.
    fn count_todo_tasks(&self, owner: &OwnerId, member_id: MemberId) -> RepoResult<u32>;
    /// Lists `Todo` tasks of one member restricted to `priorities`,
    /// ordered by priority ascending, then oldest first.
    fn list_todo_tasks_by_member(
        &self,
        owner: &OwnerId,
        member_id: MemberId,
        priorities: &[TaskPriority],
    ) -> RepoResult<Vec<Task>>;
    /// Points one task at `member_id` (or clears it with `None`).
    fn update_task_assignment(
        &self,
        owner: &OwnerId,
        task_id: TaskId,
        member_id: Option<MemberId>,
    ) -> RepoResult<()>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["members", "tasks"])?;
        Ok(Self { conn })
    }

    fn ensure_member_owned(&self, owner: &OwnerId, member_id: MemberId) -> RepoResult<()> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM members WHERE uuid = ?1 AND owner_id = ?2
            );",
            params![member_id.to_string(), owner.as_str()],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::MemberNotFound(member_id));
        }
        Ok(())
    }

    fn load_required(&self, owner: &OwnerId, id: TaskId) -> RepoResult<Task> {
        self.get_task(owner, id)?
            .ok_or(RepoError::TaskNotFound(id))
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, owner: &OwnerId, draft: &TaskDraft) -> RepoResult<Task> {
        draft.validate()?;
        if let Some(member_id) = draft.assigned_member_id {
            self.ensure_member_owned(owner, member_id)?;
        }

        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO tasks (
                uuid,
                owner_id,
                title,
                assigned_member_id,
                priority,
                status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                id.to_string(),
                owner.as_str(),
                draft.title.as_str(),
                draft.assigned_member_id.map(|value| value.to_string()),
                draft.priority.as_str(),
                draft.status.as_str(),
            ],
        )?;

        self.get_task(owner, id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("created task {id} missing in read-back"))
        })
    }

    fn get_task(&self, owner: &OwnerId, id: TaskId) -> RepoResult<Option<Task>> {
        let sql = format!("{TASK_SELECT_SQL} WHERE uuid = ?1 AND owner_id = ?2;");
        self.conn
            .query_row(&sql, params![id.to_string(), owner.as_str()], |row| {
                Ok(parse_task_row(row))
            })
            .optional()?
            .transpose()
    }

    fn list_tasks(&self, owner: &OwnerId) -> RepoResult<Vec<TaskRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                t.uuid AS uuid,
                t.owner_id AS owner_id,
                t.title AS title,
                t.assigned_member_id AS assigned_member_id,
                t.priority AS priority,
                t.status AS status,
                t.created_at AS created_at,
                t.updated_at AS updated_at,
                m.name AS member_name,
                m.capacity AS member_capacity
             FROM tasks t
             LEFT JOIN members m
               ON m.uuid = t.assigned_member_id
              AND m.owner_id = t.owner_id
             WHERE t.owner_id = ?1
             ORDER BY t.created_at DESC, t.rowid DESC;",
        )?;
        let mut rows = stmt.query([owner.as_str()])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let member_capacity = match row.get::<_, Option<i64>>("member_capacity")? {
                Some(value) => Some(count_to_u32(value, "members.capacity")?),
                None => None,
            };
            records.push(TaskRecord {
                task: parse_task_row(row)?,
                member_name: row.get("member_name")?,
                member_capacity,
            });
        }
        Ok(records)
    }

    fn update_task(&self, owner: &OwnerId, id: TaskId, patch: &TaskPatch) -> RepoResult<Task> {
        let mut task = self.load_required(owner, id)?;
        if patch.is_empty() {
            return Ok(task);
        }

        patch.apply_to(&mut task);
        task.validate()?;
        if let Some(Some(member_id)) = patch.assigned_member_id {
            self.ensure_member_owned(owner, member_id)?;
        }

        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                title = ?3,
                assigned_member_id = ?4,
                priority = ?5,
                status = ?6,
                updated_at = (CAST(strftime('%s', 'now') AS INTEGER) * 1000)
             WHERE uuid = ?1 AND owner_id = ?2;",
            params![
                id.to_string(),
                owner.as_str(),
                task.title.as_str(),
                task.assigned_member_id.map(|value| value.to_string()),
                task.priority.as_str(),
                task.status.as_str(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::TaskNotFound(id));
        }

        self.load_required(owner, id)
    }

    fn delete_task(&self, owner: &OwnerId, id: TaskId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM tasks WHERE uuid = ?1 AND owner_id = ?2;",
            params![id.to_string(), owner.as_str()],
        )?;
        if changed == 0 {
            return Err(RepoError::TaskNotFound(id));
        }
        Ok(())
    }

    fn count_tasks(&self, owner: &OwnerId) -> RepoResult<u32> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM tasks WHERE owner_id = ?1;",
            [owner.as_str()],
            |row| row.get(0),
        )?;
        count_to_u32(count, "task count")
    }

    fn count_todo_tasks(&self, owner: &OwnerId, member_id: MemberId) -> RepoResult<u32> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*)
             FROM tasks
             WHERE owner_id = ?1
               AND assigned_member_id = ?2
               AND status = ?3;",
            params![
                owner.as_str(),
                member_id.to_string(),
                TaskStatus::Todo.as_str()
            ],
            |row| row.get(0),
        )?;
        count_to_u32(count, "todo task count")
    }

    fn list_todo_tasks_by_member(
        &self,
        owner: &OwnerId,
        member_id: MemberId,
        priorities: &[TaskPriority],
    ) -> RepoResult<Vec<Task>> {
        if priorities.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; priorities.len()].join(", ");
        let sql = format!(
            "{TASK_SELECT_SQL}
             WHERE owner_id = ?
               AND assigned_member_id = ?
               AND status = ?
               AND priority IN ({placeholders})
             ORDER BY {PRIORITY_RANK_SQL} ASC, created_at ASC, rowid ASC;"
        );
        let mut bind_values = vec![
            Value::Text(owner.as_str().to_string()),
            Value::Text(member_id.to_string()),
            Value::Text(TaskStatus::Todo.as_str().to_string()),
        ];
        bind_values.extend(
            priorities
                .iter()
                .map(|priority| Value::Text(priority.as_str().to_string())),
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }

    fn update_task_assignment(
        &self,
        owner: &OwnerId,
        task_id: TaskId,
        member_id: Option<MemberId>,
    ) -> RepoResult<()> {
        if let Some(member_id) = member_id {
            self.ensure_member_owned(owner, member_id)?;
        }

        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                assigned_member_id = ?3,
                updated_at = (CAST(strftime('%s', 'now') AS INTEGER) * 1000)
             WHERE uuid = ?1 AND owner_id = ?2;",
            params![
                task_id.to_string(),
                owner.as_str(),
                member_id.map(|value| value.to_string()),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::TaskNotFound(task_id));
        }
        Ok(())
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let uuid_text: String = row.get("uuid")?;
    let owner_text: String = row.get("owner_id")?;
    let owner_id = OwnerId::parse(&owner_text)
        .map_err(|_| RepoError::InvalidData(format!("blank owner_id for task `{uuid_text}`")))?;

    let assigned_member_id = match row.get::<_, Option<String>>("assigned_member_id")? {
        Some(value) => Some(parse_uuid(&value, "tasks.assigned_member_id")?),
        None => None,
    };

    let priority_text: String = row.get("priority")?;
    let priority = priority_text.parse::<TaskPriority>().map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid priority `{priority_text}` in tasks.priority"
        ))
    })?;
    let status_text: String = row.get("status")?;
    let status = status_text.parse::<TaskStatus>().map_err(|_| {
        RepoError::InvalidData(format!("invalid status `{status_text}` in tasks.status"))
    })?;

    let task = Task {
        id: parse_uuid(&uuid_text, "tasks.uuid")?,
        owner_id,
        title: row.get("title")?,
        assigned_member_id,
        priority,
        status,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    task.validate()?;
    Ok(task)
}
