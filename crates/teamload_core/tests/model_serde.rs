use serde_json::json;
use teamload_core::{
    CapacityStatus, DashboardStats, OwnerId, RebalanceOutcome, TaskMove, TaskPriority, TaskStatus,
};
use uuid::Uuid;

#[test]
fn enums_use_lowercase_wire_names() {
    assert_eq!(serde_json::to_value(TaskPriority::Low).unwrap(), json!("low"));
    assert_eq!(serde_json::to_value(TaskStatus::Done).unwrap(), json!("done"));
    assert_eq!(
        serde_json::to_value(CapacityStatus::AtCapacity).unwrap(),
        json!("at_capacity")
    );

    let parsed: TaskPriority = serde_json::from_value(json!("high")).unwrap();
    assert_eq!(parsed, TaskPriority::High);
}

#[test]
fn priority_and_status_parse_case_insensitively() {
    assert_eq!(" Medium ".parse::<TaskPriority>().unwrap(), TaskPriority::Medium);
    assert_eq!("TODO".parse::<TaskStatus>().unwrap(), TaskStatus::Todo);
    assert!("urgent".parse::<TaskPriority>().is_err());
    assert!("in_progress".parse::<TaskStatus>().is_err());
}

#[test]
fn owner_id_serializes_as_plain_string() {
    let owner = OwnerId::parse("user-42").unwrap();
    assert_eq!(serde_json::to_value(&owner).unwrap(), json!("user-42"));
}

#[test]
fn rebalance_outcome_shape() {
    let task_id = Uuid::new_v4();
    let from = Uuid::new_v4();
    let to = Uuid::new_v4();
    let outcome = RebalanceOutcome {
        reassigned_count: 1,
        overloaded_members: 1,
        unresolved_excess: 0,
        moves: vec![TaskMove {
            task_id,
            from_member_id: from,
            to_member_id: to,
        }],
    };

    let value = serde_json::to_value(&outcome).unwrap();
    assert_eq!(value["reassigned_count"], json!(1));
    assert_eq!(value["moves"][0]["task_id"], json!(task_id.to_string()));
    assert_eq!(value["moves"][0]["to_member_id"], json!(to.to_string()));
}

#[test]
fn dashboard_stats_shape() {
    let value = serde_json::to_value(DashboardStats::default()).unwrap();
    assert_eq!(
        value,
        json!({
            "total_tasks": 0,
            "open_tasks": 0,
            "member_count": 0,
            "overloaded_members": 0
        })
    );
}
