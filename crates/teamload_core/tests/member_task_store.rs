use rusqlite::Connection;
use teamload_core::db::open_db_in_memory;
use teamload_core::{
    DashboardService, ErrorKind, Member, MemberRepository, MemberService, OwnerId, RepoError,
    ServiceError, SqliteMemberRepository, SqliteTaskRepository, TaskDraft, TaskPatch,
    TaskPriority, TaskRepository, TaskService, TaskStatus,
};
use uuid::Uuid;

fn owner(subject: &str) -> OwnerId {
    OwnerId::parse(subject).unwrap()
}

fn members(conn: &Connection) -> MemberService<SqliteMemberRepository<'_>> {
    MemberService::new(SqliteMemberRepository::try_new(conn).unwrap())
}

fn tasks(conn: &Connection) -> TaskService<SqliteMemberRepository<'_>, SqliteTaskRepository<'_>> {
    TaskService::new(
        SqliteMemberRepository::try_new(conn).unwrap(),
        SqliteTaskRepository::try_new(conn).unwrap(),
    )
}

fn add_member(conn: &Connection, owner: &OwnerId, name: &str, capacity: i64) -> Member {
    members(conn).create_member(owner, name, capacity).unwrap()
}

#[test]
fn member_create_trims_name_and_reads_back() {
    let conn = open_db_in_memory().unwrap();
    let team = owner("team");

    let created = add_member(&conn, &team, "  Ada  ", 4);
    assert_eq!(created.name, "Ada");
    assert_eq!(created.capacity, 4);
    assert_eq!(created.owner_id, team);

    let loaded = members(&conn).get_member(&team, created.id).unwrap().unwrap();
    assert_eq!(loaded, created);
}

#[test]
fn member_create_rejects_invalid_input() {
    let conn = open_db_in_memory().unwrap();
    let team = owner("team");

    let err = members(&conn).create_member(&team, "   ", 2).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationError);
    assert_eq!(err.to_string(), "Name is required");

    let err = members(&conn).create_member(&team, "Ada", 6).unwrap_err();
    assert_eq!(err.to_string(), "Capacity must be between 0 and 5");
    let err = members(&conn).create_member(&team, "Ada", -1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationError);

    assert!(members(&conn).list_members(&team).unwrap().is_empty());
}

#[test]
fn member_capacity_bounds_are_inclusive() {
    let conn = open_db_in_memory().unwrap();
    let team = owner("team");

    assert_eq!(add_member(&conn, &team, "Zero", 0).capacity, 0);
    assert_eq!(add_member(&conn, &team, "Five", 5).capacity, 5);
}

#[test]
fn members_are_isolated_per_owner() {
    let conn = open_db_in_memory().unwrap();
    let ours = owner("ours");
    let theirs = owner("theirs");
    let ada = add_member(&conn, &ours, "Ada", 2);
    add_member(&conn, &theirs, "Eve", 2);

    let listed = members(&conn).list_members(&ours).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, ada.id);
    assert!(members(&conn).get_member(&theirs, ada.id).unwrap().is_none());

    let err = members(&conn).delete_member(&theirs, ada.id).unwrap_err();
    assert!(matches!(err, ServiceError::MemberNotFound(id) if id == ada.id));
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();
    assert_eq!(repo.count_members(&ours).unwrap(), 1);
}

#[test]
fn deleting_member_unassigns_their_tasks() {
    let conn = open_db_in_memory().unwrap();
    let team = owner("team");
    let ada = add_member(&conn, &team, "Ada", 2);
    let written = tasks(&conn)
        .create_task(&team, TaskDraft::new("write docs").assigned_to(ada.id))
        .unwrap();

    members(&conn).delete_member(&team, ada.id).unwrap();

    let task = tasks(&conn).get_task(&team, written.task.id).unwrap().unwrap();
    assert_eq!(task.assigned_member_id, None);
    assert_eq!(task.status, TaskStatus::Todo);
}

#[test]
fn task_create_defaults_and_rejects_blank_title() {
    let conn = open_db_in_memory().unwrap();
    let team = owner("team");

    let written = tasks(&conn).create_task(&team, TaskDraft::new(" plan ")).unwrap();
    assert_eq!(written.task.title, "plan");
    assert_eq!(written.task.priority, TaskPriority::Medium);
    assert_eq!(written.task.status, TaskStatus::Todo);
    assert_eq!(written.task.assigned_member_id, None);
    assert!(!written.capacity_warning);

    let err = tasks(&conn).create_task(&team, TaskDraft::new("  ")).unwrap_err();
    assert_eq!(err.to_string(), "Title is required");
}

#[test]
fn task_create_with_foreign_member_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let ours = owner("ours");
    let foreign = add_member(&conn, &owner("theirs"), "Eve", 3);

    let err = tasks(&conn)
        .create_task(&ours, TaskDraft::new("steal").assigned_to(foreign.id))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = tasks(&conn)
        .create_task(&ours, TaskDraft::new("ghost").assigned_to(Uuid::new_v4()))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn assigning_to_full_member_warns_without_blocking() {
    let conn = open_db_in_memory().unwrap();
    let team = owner("team");
    let ada = add_member(&conn, &team, "Ada", 1);
    let service = tasks(&conn);

    let first = service
        .create_task(&team, TaskDraft::new("first").assigned_to(ada.id))
        .unwrap();
    assert!(!first.capacity_warning);

    let second = service
        .create_task(&team, TaskDraft::new("second").assigned_to(ada.id))
        .unwrap();
    assert!(second.capacity_warning);
    assert_eq!(second.task.assigned_member_id, Some(ada.id));

    let done = service
        .create_task(
            &team,
            TaskDraft::new("archived")
                .assigned_to(ada.id)
                .with_status(TaskStatus::Done),
        )
        .unwrap();
    assert!(!done.capacity_warning);
}

#[test]
fn task_update_applies_patch_and_warns_on_reassignment() {
    let conn = open_db_in_memory().unwrap();
    let team = owner("team");
    let full = add_member(&conn, &team, "Full", 1);
    let free = add_member(&conn, &team, "Free", 3);
    let service = tasks(&conn);
    service
        .create_task(&team, TaskDraft::new("busy").assigned_to(full.id))
        .unwrap();
    let task = service
        .create_task(&team, TaskDraft::new("floating"))
        .unwrap()
        .task;

    let patch = TaskPatch {
        title: Some(" renamed ".to_string()),
        assigned_member_id: Some(Some(full.id)),
        priority: Some(TaskPriority::High),
        ..TaskPatch::default()
    };
    let written = service.update_task(&team, task.id, &patch).unwrap();
    assert!(written.capacity_warning);
    assert_eq!(written.task.title, "renamed");
    assert_eq!(written.task.priority, TaskPriority::High);

    let same_assignee = TaskPatch {
        title: Some("again".to_string()),
        ..TaskPatch::default()
    };
    assert!(!service.update_task(&team, task.id, &same_assignee).unwrap().capacity_warning);

    let moved = TaskPatch {
        assigned_member_id: Some(Some(free.id)),
        ..TaskPatch::default()
    };
    let written = service.update_task(&team, task.id, &moved).unwrap();
    assert!(!written.capacity_warning);
    assert_eq!(written.task.assigned_member_id, Some(free.id));

    let cleared = TaskPatch {
        assigned_member_id: Some(None),
        ..TaskPatch::default()
    };
    let written = service.update_task(&team, task.id, &cleared).unwrap();
    assert_eq!(written.task.assigned_member_id, None);
}

#[test]
fn task_update_rejects_blank_title_and_missing_task() {
    let conn = open_db_in_memory().unwrap();
    let team = owner("team");
    let service = tasks(&conn);
    let task = service.create_task(&team, TaskDraft::new("keep")).unwrap().task;

    let blank = TaskPatch {
        title: Some("   ".to_string()),
        ..TaskPatch::default()
    };
    let err = service.update_task(&team, task.id, &blank).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationError);
    assert_eq!(service.get_task(&team, task.id).unwrap().unwrap().title, "keep");

    let err = service
        .update_task(&team, Uuid::new_v4(), &TaskPatch::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn task_list_is_newest_first_with_assignee_fields() {
    let conn = open_db_in_memory().unwrap();
    let team = owner("team");
    let ada = add_member(&conn, &team, "Ada", 3);
    let service = tasks(&conn);
    service.create_task(&team, TaskDraft::new("older")).unwrap();
    service
        .create_task(&team, TaskDraft::new("newer").assigned_to(ada.id))
        .unwrap();
    service
        .create_task(&owner("elsewhere"), TaskDraft::new("hidden"))
        .unwrap();

    let records = service.list_tasks(&team).unwrap();
    let titles: Vec<&str> = records.iter().map(|r| r.task.title.as_str()).collect();
    assert_eq!(titles, vec!["newer", "older"]);
    assert_eq!(records[0].member_name.as_deref(), Some("Ada"));
    assert_eq!(records[0].member_capacity, Some(3));
    assert_eq!(records[1].member_name, None);
}

#[test]
fn task_delete_is_owner_scoped() {
    let conn = open_db_in_memory().unwrap();
    let team = owner("team");
    let service = tasks(&conn);
    let task = service.create_task(&team, TaskDraft::new("bye")).unwrap().task;

    let err = service.delete_task(&owner("other"), task.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    service.delete_task(&team, task.id).unwrap();
    assert!(service.get_task(&team, task.id).unwrap().is_none());
    let err = service.delete_task(&team, task.id).unwrap_err();
    assert!(matches!(err, ServiceError::TaskNotFound(_)));
}

#[test]
fn todo_listing_orders_low_before_medium_and_skips_done() {
    let conn = open_db_in_memory().unwrap();
    let team = owner("team");
    let ada = add_member(&conn, &team, "Ada", 5);
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    for (title, priority, status) in [
        ("medium", TaskPriority::Medium, TaskStatus::Todo),
        ("high", TaskPriority::High, TaskStatus::Todo),
        ("low-done", TaskPriority::Low, TaskStatus::Done),
        ("low", TaskPriority::Low, TaskStatus::Todo),
    ] {
        let draft = TaskDraft::new(title)
            .assigned_to(ada.id)
            .with_priority(priority)
            .with_status(status);
        repo.create_task(&team, &draft).unwrap();
    }

    let listed = repo
        .list_todo_tasks_by_member(&team, ada.id, &TaskPriority::MOVABLE)
        .unwrap();
    let titles: Vec<&str> = listed.iter().map(|task| task.title.as_str()).collect();
    assert_eq!(titles, vec!["low", "medium"]);
    assert_eq!(repo.count_todo_tasks(&team, ada.id).unwrap(), 3);
    assert!(repo
        .list_todo_tasks_by_member(&team, ada.id, &[])
        .unwrap()
        .is_empty());
}

#[test]
fn assignment_update_rejects_foreign_member() {
    let conn = open_db_in_memory().unwrap();
    let ours = owner("ours");
    let foreign = add_member(&conn, &owner("theirs"), "Eve", 3);
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let task = repo.create_task(&ours, &TaskDraft::new("mine")).unwrap();

    let err = repo
        .update_task_assignment(&ours, task.id, Some(foreign.id))
        .unwrap_err();
    assert!(matches!(err, RepoError::MemberNotFound(_)));
    let err = repo
        .update_task_assignment(&ours, Uuid::new_v4(), None)
        .unwrap_err();
    assert!(matches!(err, RepoError::TaskNotFound(_)));
}

#[test]
fn dashboard_counts_open_tasks_and_overloaded_members() {
    let conn = open_db_in_memory().unwrap();
    let team = owner("team");
    let busy = add_member(&conn, &team, "Busy", 1);
    add_member(&conn, &team, "Idle", 2);
    let service = tasks(&conn);
    for title in ["a", "b"] {
        service
            .create_task(&team, TaskDraft::new(title).assigned_to(busy.id))
            .unwrap();
    }
    service
        .create_task(&team, TaskDraft::new("done").with_status(TaskStatus::Done))
        .unwrap();

    let stats = DashboardService::new(
        SqliteMemberRepository::try_new(&conn).unwrap(),
        SqliteTaskRepository::try_new(&conn).unwrap(),
    )
    .stats(&team)
    .unwrap();

    assert_eq!(stats.total_tasks, 3);
    assert_eq!(stats.open_tasks, 2);
    assert_eq!(stats.member_count, 2);
    assert_eq!(stats.overloaded_members, 1);
}

#[test]
fn rapid_registrations_keep_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let team = owner("team");
    let created: Vec<Member> = (0..20)
        .map(|index| add_member(&conn, &team, &format!("m{index}"), 1))
        .collect();

    let listed = members(&conn).list_members(&team).unwrap();
    let listed_ids: Vec<_> = listed.iter().map(|member| member.id).collect();
    let created_ids: Vec<_> = created.iter().map(|member| member.id).collect();
    assert_eq!(listed_ids, created_ids);
}
