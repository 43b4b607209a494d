//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose member, task and balancing use cases to Dart via FRB.
//! - Translate service errors into flat envelopes with a stable `error_kind`.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every call is scoped to the `owner_id` the host passes in; a blank
//!   owner yields `error_kind = "unauthenticated"`.
//! - Ids cross the boundary as UTF-8 uuid strings.

use log::warn;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::OnceLock;
use teamload_core::db::open_db;
use teamload_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    BalanceService, CapacityStatus, DashboardService, ErrorKind, MemberService, MemberWorkload,
    OwnerId, RepoError, ServiceError, SqliteMemberRepository, SqliteTaskRepository, TaskDraft,
    TaskPatch, TaskPriority, TaskRecord, TaskService, TaskStatus, TaskValidationError,
};
use uuid::Uuid;

const DB_FILE_NAME: &str = "teamload.sqlite3";
const DB_PATH_ENV: &str = "TEAMLOAD_DB_PATH";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Pins the SQLite file used by every later call.
///
/// Must run before the first data call; afterwards only the already active
/// path is accepted. Returns empty string on success and error message on
/// failure.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_db_path(path: String) -> String {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return "db path cannot be empty".to_string();
    }

    let requested = PathBuf::from(trimmed);
    let active = DB_PATH.get_or_init(|| requested.clone());
    if *active == requested {
        String::new()
    } else {
        format!(
            "database already configured at `{}`; refusing to switch to `{}`",
            active.display(),
            requested.display()
        )
    }
}

/// Member row with live workload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberItem {
    pub member_id: String,
    pub name: String,
    pub capacity: u32,
    /// Open (`todo`) tasks currently assigned.
    pub workload: u32,
    /// `under|at_capacity|over`.
    pub capacity_status: String,
    pub created_at_ms: i64,
}

/// Task row with assignee display fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskItem {
    pub task_id: String,
    pub title: String,
    pub assigned_member_id: Option<String>,
    pub member_name: Option<String>,
    /// `low|medium|high`.
    pub priority: String,
    /// `todo|done`.
    pub status: String,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

/// Generic write response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    /// Stable error category when `ok` is false.
    pub error_kind: Option<String>,
    pub message: String,
    /// Id of the created or touched record.
    pub id: Option<String>,
    /// Assignee was already at or over capacity before this write.
    pub capacity_warning: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberListResponse {
    pub ok: bool,
    pub error_kind: Option<String>,
    pub message: String,
    pub items: Vec<MemberItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskListResponse {
    pub ok: bool,
    pub error_kind: Option<String>,
    pub message: String,
    pub items: Vec<TaskItem>,
}

/// Auto-assign suggestion. Nothing is written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutoAssignResponse {
    pub ok: bool,
    pub error_kind: Option<String>,
    pub message: String,
    pub member: Option<MemberItem>,
    /// Suggested member is already at or over capacity.
    pub at_capacity: bool,
}

/// Rebalance result.
///
/// On failure `reassigned_count` still reports moves committed before the
/// error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReassignResponse {
    pub ok: bool,
    pub error_kind: Option<String>,
    pub message: String,
    pub reassigned_count: u32,
    pub overloaded_members: u32,
    pub unresolved_excess: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardResponse {
    pub ok: bool,
    pub error_kind: Option<String>,
    pub message: String,
    pub total_tasks: u32,
    pub open_tasks: u32,
    pub member_count: u32,
    pub overloaded_members: u32,
}

/// Registers a team member with capacity `0..=5`.
#[flutter_rust_bridge::frb(sync)]
pub fn member_create(owner_id: String, name: String, capacity: i64) -> ActionResponse {
    let result = with_owner(&owner_id, |conn, owner| {
        let service = MemberService::new(SqliteMemberRepository::try_new(conn)?);
        Ok(service.create_member(owner, name, capacity)?)
    });
    match result {
        Ok(member) => ActionResponse {
            ok: true,
            message: "Member created.".to_string(),
            id: Some(member.id.to_string()),
            ..ActionResponse::default()
        },
        Err(failure) => ActionResponse::failure("member_create", failure),
    }
}

/// Lists members in registration order with live workload.
#[flutter_rust_bridge::frb(sync)]
pub fn get_members_with_workload(owner_id: String) -> MemberListResponse {
    let result = with_owner(&owner_id, |conn, owner| {
        Ok(balance_service(conn)?.members_with_workload(owner)?)
    });
    match result {
        Ok(entries) => MemberListResponse {
            ok: true,
            message: format!("Loaded {} member(s).", entries.len()),
            items: entries.iter().map(to_member_item).collect(),
            ..MemberListResponse::default()
        },
        Err(failure) => {
            let (error_kind, message) = failure.report("get_members_with_workload");
            MemberListResponse {
                error_kind,
                message,
                ..MemberListResponse::default()
            }
        }
    }
}

/// Deletes a member; their tasks become unassigned.
#[flutter_rust_bridge::frb(sync)]
pub fn member_delete(owner_id: String, member_id: String) -> ActionResponse {
    let result = with_owner(&owner_id, |conn, owner| {
        let id = parse_id(&member_id, "member_id")?;
        let service = MemberService::new(SqliteMemberRepository::try_new(conn)?);
        service.delete_member(owner, id)?;
        Ok(id)
    });
    match result {
        Ok(id) => ActionResponse::success("Member deleted.", id),
        Err(failure) => ActionResponse::failure("member_delete", failure),
    }
}

/// Creates a task.
///
/// `priority` defaults to `medium` and `status` to `todo`.
#[flutter_rust_bridge::frb(sync)]
pub fn task_create(
    owner_id: String,
    title: String,
    assigned_member_id: Option<String>,
    priority: Option<String>,
    status: Option<String>,
) -> ActionResponse {
    let result = with_owner(&owner_id, |conn, owner| {
        let mut draft = TaskDraft::new(title);
        if let Some(raw) = assigned_member_id.as_deref() {
            draft = draft.assigned_to(parse_id(raw, "assigned_member_id")?);
        }
        if let Some(raw) = priority.as_deref() {
            draft = draft.with_priority(raw.parse::<TaskPriority>()?);
        }
        if let Some(raw) = status.as_deref() {
            draft = draft.with_status(raw.parse::<TaskStatus>()?);
        }
        Ok(task_service(conn)?.create_task(owner, draft)?)
    });
    match result {
        Ok(written) => ActionResponse {
            ok: true,
            message: "Task created.".to_string(),
            id: Some(written.task.id.to_string()),
            capacity_warning: written.capacity_warning,
            ..ActionResponse::default()
        },
        Err(failure) => ActionResponse::failure("task_create", failure),
    }
}

/// Lists tasks newest first.
#[flutter_rust_bridge::frb(sync)]
pub fn task_list(owner_id: String) -> TaskListResponse {
    let result = with_owner(&owner_id, |conn, owner| {
        Ok(task_service(conn)?.list_tasks(owner)?)
    });
    match result {
        Ok(records) => TaskListResponse {
            ok: true,
            message: format!("Loaded {} task(s).", records.len()),
            items: records.into_iter().map(to_task_item).collect(),
            ..TaskListResponse::default()
        },
        Err(failure) => {
            let (error_kind, message) = failure.report("task_list");
            TaskListResponse {
                error_kind,
                message,
                ..TaskListResponse::default()
            }
        }
    }
}

/// Partially updates a task; `None` fields stay unchanged.
///
/// `unassign = true` clears the assignee and wins over
/// `assigned_member_id`.
#[flutter_rust_bridge::frb(sync)]
pub fn task_update(
    owner_id: String,
    task_id: String,
    title: Option<String>,
    assigned_member_id: Option<String>,
    unassign: bool,
    priority: Option<String>,
    status: Option<String>,
) -> ActionResponse {
    let result = with_owner(&owner_id, |conn, owner| {
        let id = parse_id(&task_id, "task_id")?;
        let assigned = if unassign {
            Some(None)
        } else {
            match assigned_member_id.as_deref() {
                Some(raw) => Some(Some(parse_id(raw, "assigned_member_id")?)),
                None => None,
            }
        };
        let patch = TaskPatch {
            title,
            assigned_member_id: assigned,
            priority: priority
                .as_deref()
                .map(str::parse::<TaskPriority>)
                .transpose()?,
            status: status.as_deref().map(str::parse::<TaskStatus>).transpose()?,
        };
        Ok(task_service(conn)?.update_task(owner, id, &patch)?)
    });
    match result {
        Ok(written) => ActionResponse {
            ok: true,
            message: "Task updated.".to_string(),
            id: Some(written.task.id.to_string()),
            capacity_warning: written.capacity_warning,
            ..ActionResponse::default()
        },
        Err(failure) => ActionResponse::failure("task_update", failure),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn task_delete(owner_id: String, task_id: String) -> ActionResponse {
    let result = with_owner(&owner_id, |conn, owner| {
        let id = parse_id(&task_id, "task_id")?;
        task_service(conn)?.delete_task(owner, id)?;
        Ok(id)
    });
    match result {
        Ok(id) => ActionResponse::success("Task deleted.", id),
        Err(failure) => ActionResponse::failure("task_delete", failure),
    }
}

/// Suggests the least-loaded member for a new task.
#[flutter_rust_bridge::frb(sync)]
pub fn auto_assign(owner_id: String) -> AutoAssignResponse {
    let result = with_owner(&owner_id, |conn, owner| {
        Ok(balance_service(conn)?.select_member_for_new_task(owner)?)
    });
    match result {
        Ok(assignment) => {
            let at_capacity = assignment.needs_capacity_warning();
            let message = if at_capacity {
                format!("{} is at or over capacity.", assignment.member.name)
            } else {
                format!("Suggested {}.", assignment.member.name)
            };
            let entry = MemberWorkload {
                member: assignment.member,
                workload: assignment.workload,
            };
            AutoAssignResponse {
                ok: true,
                message,
                member: Some(to_member_item(&entry)),
                at_capacity,
                ..AutoAssignResponse::default()
            }
        }
        Err(failure) => {
            let (error_kind, message) = failure.report("auto_assign");
            AutoAssignResponse {
                error_kind,
                message,
                ..AutoAssignResponse::default()
            }
        }
    }
}

/// Moves excess low/medium tasks off overloaded members.
#[flutter_rust_bridge::frb(sync)]
pub fn reassign_all(owner_id: String) -> ReassignResponse {
    let result = with_owner(&owner_id, |conn, owner| {
        Ok(balance_service(conn)?.rebalance(owner)?)
    });
    match result {
        Ok(outcome) => ReassignResponse {
            ok: true,
            error_kind: None,
            message: format!("Reassigned {} task(s).", outcome.reassigned_count),
            reassigned_count: outcome.reassigned_count,
            overloaded_members: outcome.overloaded_members,
            unresolved_excess: outcome.unresolved_excess,
        },
        Err(failure) => {
            let reassigned_count = failure.committed_moves.unwrap_or(0);
            let (error_kind, message) = failure.report("reassign_all");
            ReassignResponse {
                error_kind,
                message,
                reassigned_count,
                ..ReassignResponse::default()
            }
        }
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn dashboard_stats(owner_id: String) -> DashboardResponse {
    let result = with_owner(&owner_id, |conn, owner| {
        let service = DashboardService::new(
            SqliteMemberRepository::try_new(conn)?,
            SqliteTaskRepository::try_new(conn)?,
        );
        Ok(service.stats(owner)?)
    });
    match result {
        Ok(stats) => DashboardResponse {
            ok: true,
            error_kind: None,
            message: String::new(),
            total_tasks: stats.total_tasks,
            open_tasks: stats.open_tasks,
            member_count: stats.member_count,
            overloaded_members: stats.overloaded_members,
        },
        Err(failure) => {
            let (error_kind, message) = failure.report("dashboard_stats");
            DashboardResponse {
                error_kind,
                message,
                ..DashboardResponse::default()
            }
        }
    }
}

impl ActionResponse {
    fn success(message: impl Into<String>, id: Uuid) -> Self {
        Self {
            ok: true,
            message: message.into(),
            id: Some(id.to_string()),
            ..Self::default()
        }
    }

    fn failure(op: &'static str, failure: CallFailure) -> Self {
        let (error_kind, message) = failure.report(op);
        Self {
            error_kind,
            message,
            ..Self::default()
        }
    }
}

/// Flattened error crossing the FFI boundary.
#[derive(Debug)]
struct CallFailure {
    kind: ErrorKind,
    message: String,
    committed_moves: Option<u32>,
}

impl CallFailure {
    fn invalid_input(message: String) -> Self {
        Self {
            kind: ErrorKind::ValidationError,
            message,
            committed_moves: None,
        }
    }

    fn report(self, op: &'static str) -> (Option<String>, String) {
        warn!(
            "event=ffi_call module=ffi status=error op={op} error_kind={}",
            self.kind
        );
        (Some(self.kind.as_str().to_string()), self.message)
    }
}

impl From<ServiceError> for CallFailure {
    fn from(value: ServiceError) -> Self {
        Self {
            kind: value.kind(),
            committed_moves: value.committed_moves(),
            message: value.to_string(),
        }
    }
}

impl From<RepoError> for CallFailure {
    fn from(value: RepoError) -> Self {
        Self::from(ServiceError::from(value))
    }
}

impl From<TaskValidationError> for CallFailure {
    fn from(value: TaskValidationError) -> Self {
        Self::from(ServiceError::from(value))
    }
}

fn with_owner<T>(
    owner_id: &str,
    f: impl FnOnce(&Connection, &OwnerId) -> Result<T, CallFailure>,
) -> Result<T, CallFailure> {
    let owner = OwnerId::parse(owner_id).map_err(ServiceError::from)?;
    let conn = open_db(resolve_db_path()).map_err(RepoError::from)?;
    f(&conn, &owner)
}

fn balance_service(
    conn: &Connection,
) -> Result<BalanceService<SqliteMemberRepository<'_>, SqliteTaskRepository<'_>>, RepoError> {
    Ok(BalanceService::new(
        SqliteMemberRepository::try_new(conn)?,
        SqliteTaskRepository::try_new(conn)?,
    ))
}

fn task_service(
    conn: &Connection,
) -> Result<TaskService<SqliteMemberRepository<'_>, SqliteTaskRepository<'_>>, RepoError> {
    Ok(TaskService::new(
        SqliteMemberRepository::try_new(conn)?,
        SqliteTaskRepository::try_new(conn)?,
    ))
}

fn parse_id(raw: &str, field: &'static str) -> Result<Uuid, CallFailure> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| CallFailure::invalid_input(format!("invalid {field} `{}`", raw.trim())))
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

fn to_member_item(entry: &MemberWorkload) -> MemberItem {
    let capacity_status = match entry.capacity_status() {
        CapacityStatus::Under => "under",
        CapacityStatus::AtCapacity => "at_capacity",
        CapacityStatus::Over => "over",
    };
    MemberItem {
        member_id: entry.member.id.to_string(),
        name: entry.member.name.clone(),
        capacity: entry.member.capacity,
        workload: entry.workload,
        capacity_status: capacity_status.to_string(),
        created_at_ms: entry.member.created_at,
    }
}

fn to_task_item(record: TaskRecord) -> TaskItem {
    let task = record.task;
    TaskItem {
        task_id: task.id.to_string(),
        title: task.title,
        assigned_member_id: task.assigned_member_id.map(|id| id.to_string()),
        member_name: record.member_name,
        priority: task.priority.as_str().to_string(),
        status: task.status.as_str().to_string(),
        created_at_ms: task.created_at,
        updated_at_ms: task.updated_at,
    }
}
