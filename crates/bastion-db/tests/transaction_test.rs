//! Integration tests for transactional units of work on the in-memory store.

use std::time::Duration as StdDuration;

use bastion_core::error::BastionError;
use bastion_core::models::organization::Organization;
use bastion_core::repository::{OrganizationRepository, Repositories, TransactionRunner};
use bastion_db::MemoryStore;
use chrono::Utc;
use uuid::Uuid;

fn new_org(legal_name: &str) -> Organization {
    let now = Utc::now();
    Organization {
        id: Uuid::new_v4(),
        legal_name: legal_name.into(),
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn ok_commits_all_writes() {
    let store = MemoryStore::new();
    let org = new_org("Committed");
    let id = org.id;

    let legal_name = store
        .begin_op(move |repos| async move {
            let created = repos.organizations().create(org).await?;
            Ok(created.legal_name)
        })
        .await
        .unwrap();

    assert_eq!(legal_name, "Committed");
    assert_eq!(
        store.organizations().get(id).await.unwrap().legal_name,
        "Committed"
    );
}

#[tokio::test]
async fn err_rolls_back_all_writes() {
    let store = MemoryStore::new();
    let org = new_org("Rolled Back");
    let id = org.id;

    let result: Result<(), _> = store
        .begin_op(move |repos| async move {
            repos.organizations().create(org).await?;
            Err(BastionError::Internal("boom".into()))
        })
        .await;

    assert!(matches!(result, Err(BastionError::Internal(_))));
    assert!(store.organizations().get(id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn writes_are_visible_inside_the_transaction() {
    let store = MemoryStore::new();
    let org = new_org("Inside");
    let id = org.id;

    let seen = store
        .begin_op(move |repos| async move {
            repos.organizations().create(org).await?;
            repos.organizations().get(id).await
        })
        .await
        .unwrap();

    assert_eq!(seen.id, id);
}

#[tokio::test]
async fn dropped_transaction_leaves_nothing_behind() {
    let store = MemoryStore::new();
    let org = new_org("Abandoned");
    let id = org.id;

    let timed_out = tokio::time::timeout(
        StdDuration::from_millis(50),
        store.begin_op(move |repos| async move {
            repos.organizations().create(org).await?;
            tokio::time::sleep(StdDuration::from_secs(60)).await;
            Ok(())
        }),
    )
    .await;

    assert!(timed_out.is_err());
    assert!(store.organizations().get(id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn concurrent_transactions_do_not_double_create() {
    let store = MemoryStore::new();

    let create_if_missing = |store: MemoryStore| async move {
        store
            .begin_op(|repos| async move {
                let existing = repos
                    .organizations()
                    .list(
                        Default::default(),
                        &[],
                        &[bastion_core::repository::OrganizationCondition::LegalName {
                            value: "Singleton".into(),
                            wildcard: false,
                        }],
                    )
                    .await?;
                if existing.total == 0 {
                    repos.organizations().create(new_org("Singleton")).await?;
                    return Ok(true);
                }
                Ok(false)
            })
            .await
    };

    let (a, b) = tokio::join!(
        create_if_missing(store.clone()),
        create_if_missing(store.clone())
    );

    let created = [a.unwrap(), b.unwrap()];
    assert_eq!(created.iter().filter(|c| **c).count(), 1);

    let all = store
        .organizations()
        .list(Default::default(), &[], &[])
        .await
        .unwrap();
    assert_eq!(all.total, 1);
}

#[tokio::test]
async fn auto_commit_repositories_share_state() {
    let store = MemoryStore::new();
    let repos = store.repositories();
    let org = repos.organizations().create(new_org("Shared")).await.unwrap();

    let fetched = store.organizations().get(org.id).await.unwrap();
    assert_eq!(fetched, org);
}
