//! Integration tests for the in-memory User repository.

use std::sync::Arc;

use bastion_core::clock::Clock;
use bastion_core::error::BastionError;
use bastion_core::models::user::{User, UserField, UserStatus};
use bastion_core::repository::{
    Pagination, Sort, UserCondition, UserOrderField, UserRepository,
};
use bastion_db::MemoryStore;
use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap()
}

/// Helper: store whose clock is pinned to `t0 + 1h`.
fn setup() -> MemoryStore {
    let clock: Arc<dyn Clock> = Arc::new(|| t0() + Duration::hours(1));
    MemoryStore::with_clock(clock)
}

fn new_user(org_id: Uuid, name: &str, email: &str) -> User {
    User {
        id: Uuid::new_v4(),
        organization_id: org_id,
        display_name: name.into(),
        email: email.into(),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$stub".into(),
        status: UserStatus::Active,
        created_at: t0(),
        updated_at: t0(),
        deleted_at: None,
        organization: None,
    }
}

#[tokio::test]
async fn create_and_get_user() {
    let store = setup();
    let repo = store.users();
    let org_id = Uuid::new_v4();

    let user = repo
        .create(new_user(org_id, "alice", "alice@example.com"))
        .await
        .unwrap();

    let fetched = repo.get(user.id).await.unwrap();
    assert_eq!(fetched, user);

    let by_email = repo.get_by_email("alice@example.com").await.unwrap();
    assert_eq!(by_email.id, user.id);
}

#[tokio::test]
async fn get_missing_user_is_not_found() {
    let store = setup();
    let repo = store.users();

    let err = repo.get(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, BastionError::NotFound { .. }));

    let err = repo.get_by_email("nobody@example.com").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let store = setup();
    let repo = store.users();
    let org_id = Uuid::new_v4();

    repo.create(new_user(org_id, "alice", "same@example.com"))
        .await
        .unwrap();
    let err = repo
        .create(new_user(org_id, "bob", "same@example.com"))
        .await
        .unwrap_err();

    match err {
        BastionError::Conflict { entity, field } => {
            assert_eq!(entity, "user");
            assert_eq!(field, "email");
        }
        other => panic!("expected Conflict, got: {other:?}"),
    }
}

#[tokio::test]
async fn duplicate_id_is_a_conflict() {
    let store = setup();
    let repo = store.users();
    let user = new_user(Uuid::new_v4(), "alice", "alice@example.com");

    repo.create(user.clone()).await.unwrap();
    let mut again = user.clone();
    again.email = "other@example.com".into();

    let err = repo.create(again).await.unwrap_err();
    assert!(matches!(err, BastionError::Conflict { ref field, .. } if field == "id"));
}

#[tokio::test]
async fn update_writes_only_listed_fields() {
    let store = setup();
    let repo = store.users();
    let user = repo
        .create(new_user(Uuid::new_v4(), "alice", "alice@example.com"))
        .await
        .unwrap();

    let mut changed = user.clone();
    changed.display_name = "alice2".into();
    changed.email = "changed@example.com".into();
    changed.updated_at = t0() + Duration::minutes(5);

    let updated = repo
        .update(&changed, &[UserField::DisplayName])
        .await
        .unwrap();

    assert_eq!(updated.display_name, "alice2");
    assert_eq!(updated.email, "alice@example.com");
    assert_eq!(updated.updated_at, t0() + Duration::minutes(5));
    assert_eq!(updated.created_at, user.created_at);
}

#[tokio::test]
async fn update_without_fields_is_rejected() {
    let store = setup();
    let repo = store.users();
    let user = repo
        .create(new_user(Uuid::new_v4(), "alice", "alice@example.com"))
        .await
        .unwrap();

    let err = repo.update(&user, &[]).await.unwrap_err();
    assert_eq!(err.validation_field(), Some("fields"));
}

#[tokio::test]
async fn update_to_taken_email_is_a_conflict() {
    let store = setup();
    let repo = store.users();
    let org_id = Uuid::new_v4();
    repo.create(new_user(org_id, "alice", "alice@example.com"))
        .await
        .unwrap();
    let bob = repo
        .create(new_user(org_id, "bob", "bob@example.com"))
        .await
        .unwrap();

    let mut changed = bob.clone();
    changed.email = "alice@example.com".into();
    let err = repo.update(&changed, &[UserField::Email]).await.unwrap_err();
    assert!(matches!(err, BastionError::Conflict { .. }));

    // Keeping one's own email is not a conflict.
    let ok = repo.update(&bob, &[UserField::Email]).await;
    assert!(ok.is_ok());
}

#[tokio::test]
async fn duplicate_display_name_is_a_conflict() {
    let store = setup();
    let repo = store.users();
    let org_id = Uuid::new_v4();

    repo.create(new_user(org_id, "system", "root@example.com"))
        .await
        .unwrap();
    let err = repo
        .create(new_user(org_id, "system", "evil@example.com"))
        .await
        .unwrap_err();

    assert!(matches!(err, BastionError::Conflict { ref field, .. } if field == "display_name"));
    assert!(repo.get_by_email("evil@example.com").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn update_to_taken_display_name_is_a_conflict() {
    let store = setup();
    let repo = store.users();
    let org_id = Uuid::new_v4();
    repo.create(new_user(org_id, "alice", "alice@example.com"))
        .await
        .unwrap();
    let bob = repo
        .create(new_user(org_id, "bob", "bob@example.com"))
        .await
        .unwrap();

    let mut changed = bob.clone();
    changed.display_name = "alice".into();
    let err = repo
        .update(&changed, &[UserField::DisplayName])
        .await
        .unwrap_err();
    assert!(matches!(err, BastionError::Conflict { ref field, .. } if field == "display_name"));

    // Not checked when the name is not among the written fields.
    assert!(repo.update(&changed, &[UserField::Status]).await.is_ok());
    assert!(repo.update(&bob, &[UserField::DisplayName]).await.is_ok());
    assert_eq!(repo.get(bob.id).await.unwrap().display_name, "bob");
}

#[tokio::test]
async fn update_missing_user_is_not_found() {
    let store = setup();
    let repo = store.users();
    let ghost = new_user(Uuid::new_v4(), "ghost", "ghost@example.com");

    let err = repo
        .update(&ghost, &[UserField::DisplayName])
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn delete_is_soft() {
    let store = setup();
    let repo = store.users();
    let user = repo
        .create(new_user(Uuid::new_v4(), "alice", "alice@example.com"))
        .await
        .unwrap();

    repo.delete(user.id).await.unwrap();

    let fetched = repo.get(user.id).await.unwrap();
    assert_eq!(fetched.status, UserStatus::Deleted);
    assert_eq!(fetched.deleted_at, Some(t0() + Duration::hours(1)));
    assert_eq!(fetched.created_at, user.created_at);

    assert!(repo.delete(Uuid::new_v4()).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn list_filters_sorts_and_paginates() {
    let store = setup();
    let repo = store.users();
    let org_a = Uuid::new_v4();
    let org_b = Uuid::new_v4();

    for (org, name) in [(org_a, "carol"), (org_a, "alice"), (org_b, "bob"), (org_a, "dave")] {
        repo.create(new_user(org, name, &format!("{name}@example.com")))
            .await
            .unwrap();
    }

    let page = repo
        .list(
            Pagination {
                offset: 1,
                limit: 1,
            },
            &[Sort::asc(UserOrderField::DisplayName)],
            &[UserCondition::OrganizationId(org_a)],
        )
        .await
        .unwrap();

    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].display_name, "carol");

    let all_desc = repo
        .list(
            Pagination::default(),
            &[Sort::desc(UserOrderField::Email)],
            &[],
        )
        .await
        .unwrap();
    let names: Vec<_> = all_desc.items.iter().map(|u| u.display_name.as_str()).collect();
    assert_eq!(names, ["dave", "carol", "bob", "alice"]);
}

#[tokio::test]
async fn list_by_status() {
    let store = setup();
    let repo = store.users();
    let org = Uuid::new_v4();
    let alice = repo
        .create(new_user(org, "alice", "alice@example.com"))
        .await
        .unwrap();
    repo.create(new_user(org, "bob", "bob@example.com"))
        .await
        .unwrap();
    repo.delete(alice.id).await.unwrap();

    let active = repo
        .list(
            Pagination::default(),
            &[],
            &[UserCondition::Status(UserStatus::Active)],
        )
        .await
        .unwrap();
    assert_eq!(active.total, 1);
    assert_eq!(active.items[0].display_name, "bob");
}
