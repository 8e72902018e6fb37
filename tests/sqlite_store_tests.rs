mod common;

use boardroom::{
    Discussion, DiscussionError, DiscussionOrchestrator, DiscussionStatus, DiscussionStore,
    RoleAssignment, SqliteStore, StreamEvent,
};
use chrono::Utc;
use common::{catalog_with_defaults, collect, test_config, ScriptedClient};
use std::sync::Arc;
use tempfile::TempDir;

fn discussion(id: &str) -> Discussion {
    Discussion {
        id: id.to_string(),
        task: "Launch a subscription coffee box".to_string(),
        goal: "## Vision".to_string(),
        status: DiscussionStatus::Active,
        created_at: Utc::now(),
    }
}

fn role(discussion_id: &str, name: &str, agent_id: &str) -> RoleAssignment {
    RoleAssignment {
        discussion_id: discussion_id.to_string(),
        role_name: name.to_string(),
        description: format!("{} description", name),
        agent_id: agent_id.to_string(),
    }
}

#[tokio::test]
async fn test_create_and_read_back() {
    let dir = TempDir::new().unwrap();
    let store = SqliteStore::open(dir.path().join("discussions.db")).unwrap();

    let roles = vec![role("d1", "CFO", "cfo"), role("d1", "CTO", "cto")];
    store
        .create_discussion(&discussion("d1"), &roles, "PM", "kickoff\nline two")
        .await
        .unwrap();

    let loaded = store.get_discussion("d1").await.unwrap().unwrap();
    assert_eq!(loaded.task, "Launch a subscription coffee box");
    assert_eq!(loaded.status, DiscussionStatus::Active);
    assert_eq!(store.list_roles("d1").await.unwrap(), roles);

    let messages = store.list_messages("d1").await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].sender, "PM");
    assert_eq!(messages[0].content, "kickoff\nline two");
}

#[tokio::test]
async fn test_messages_are_ordered_and_scoped() {
    let store = SqliteStore::open_in_memory().unwrap();
    store
        .create_discussion(&discussion("a"), &[], "PM", "a0")
        .await
        .unwrap();
    store
        .create_discussion(&discussion("b"), &[], "PM", "b0")
        .await
        .unwrap();

    store.append_message("a", "CFO", "a1").await.unwrap();
    store.append_message("b", "CTO", "b1").await.unwrap();
    let last = store.append_message("a", "CTO", "a2").await.unwrap();

    let a: Vec<String> = store
        .list_messages("a")
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.content)
        .collect();
    assert_eq!(a, vec!["a0", "a1", "a2"]);
    assert_eq!(store.list_messages("b").await.unwrap().len(), 2);
    assert_eq!(last.discussion_id, "a");
}

#[tokio::test]
async fn test_unknown_discussion() {
    let store = SqliteStore::open_in_memory().unwrap();
    assert!(store.get_discussion("ghost").await.unwrap().is_none());
    assert!(store.list_roles("ghost").await.unwrap().is_empty());
    assert!(store.list_messages("ghost").await.unwrap().is_empty());

    let err = store.append_message("ghost", "PM", "hi").await.unwrap_err();
    assert_eq!(err, DiscussionError::UnknownDiscussion("ghost".to_string()));
}

#[tokio::test]
async fn test_duplicate_create_rolls_back() {
    let store = SqliteStore::open_in_memory().unwrap();
    store
        .create_discussion(&discussion("a"), &[role("a", "CFO", "cfo")], "PM", "first")
        .await
        .unwrap();

    let err = store
        .create_discussion(&discussion("a"), &[role("a", "CTO", "cto")], "PM", "second")
        .await
        .unwrap_err();
    assert!(matches!(err, DiscussionError::Storage(_)));

    assert_eq!(store.list_roles("a").await.unwrap().len(), 1);
    assert_eq!(store.list_messages("a").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_discussion_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("discussions.db");

    let id = {
        let orchestrator = DiscussionOrchestrator::new(
            Arc::new(ScriptedClient::new()),
            Arc::new(catalog_with_defaults(0)),
            Arc::new(SqliteStore::open(&path).unwrap()),
            &test_config(),
        );
        orchestrator
            .create_discussion("Launch a subscription coffee box")
            .await
            .unwrap()
            .id
    };

    let store = Arc::new(SqliteStore::open(&path).unwrap());
    assert_eq!(store.list_roles(&id).await.unwrap().len(), 5);

    let orchestrator = DiscussionOrchestrator::new(
        Arc::new(ScriptedClient::new()),
        Arc::new(catalog_with_defaults(0)),
        store.clone(),
        &test_config(),
    );
    let events = collect(orchestrator.run_stream(&id)).await;
    assert!(matches!(events.last(), Some(StreamEvent::Finished(_))));
    assert_eq!(store.list_messages(&id).await.unwrap().len(), 21);
}
