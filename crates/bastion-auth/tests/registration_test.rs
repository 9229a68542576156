//! Integration tests for user registration.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use bastion_auth::bootstrap::{Bootstrapper, SystemOrganizationConfig, SystemUserConfig};
use bastion_auth::password::{Argon2PasswordHasher, PasswordHasher};
use bastion_auth::registration::{Registration, RegistrationService};
use bastion_core::clock::{Clock, IdGenerator};
use bastion_core::error::{BastionError, BastionResult};
use bastion_core::models::user::{User, UserField, UserStatus};
use bastion_core::repository::{
    PaginatedResult, Pagination, Sort, UserCondition, UserOrderField, UserRepository,
};
use bastion_db::MemoryStore;
use bastion_db::repository::MemoryUserRepository;
use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

/// Delegating user repository that counts `create` calls.
#[derive(Clone)]
struct CountingUsers {
    inner: MemoryUserRepository,
    creates: Arc<AtomicUsize>,
}

impl UserRepository for CountingUsers {
    async fn get(&self, id: Uuid) -> BastionResult<User> {
        self.inner.get(id).await
    }

    async fn get_by_email(&self, email: &str) -> BastionResult<User> {
        self.inner.get_by_email(email).await
    }

    async fn create(&self, user: User) -> BastionResult<User> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.inner.create(user).await
    }

    async fn update(&self, user: &User, fields: &[UserField]) -> BastionResult<User> {
        self.inner.update(user, fields).await
    }

    async fn delete(&self, id: Uuid) -> BastionResult<()> {
        self.inner.delete(id).await
    }

    async fn list(
        &self,
        pagination: Pagination,
        order_by: &[Sort<UserOrderField>],
        conditions: &[UserCondition],
    ) -> BastionResult<PaginatedResult<User>> {
        self.inner.list(pagination, order_by, conditions).await
    }
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap()
}

fn user_id() -> Uuid {
    Uuid::parse_str("c5172a66-3dbe-4415-bbf9-9921d9798698").unwrap()
}

struct Fixture {
    store: MemoryStore,
    creates: Arc<AtomicUsize>,
    hasher: Arc<dyn PasswordHasher>,
    service: RegistrationService<CountingUsers>,
}

fn setup() -> Fixture {
    let store = MemoryStore::new();
    let creates = Arc::new(AtomicUsize::new(0));
    let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2PasswordHasher::default());
    let clock: Arc<dyn Clock> = Arc::new(t0);
    let ids: Arc<dyn IdGenerator> = Arc::new(user_id);

    let service = RegistrationService::new(
        CountingUsers {
            inner: store.users(),
            creates: creates.clone(),
        },
        hasher.clone(),
        clock,
        ids,
    );

    Fixture {
        store,
        creates,
        hasher,
        service,
    }
}

fn registration(display_name: &str, email: &str, password: &str) -> Registration {
    Registration {
        organization_id: Uuid::new_v4(),
        display_name: display_name.into(),
        email: email.into(),
        password: password.into(),
    }
}

#[tokio::test]
async fn registers_active_user() {
    let fx = setup();

    let user = fx
        .service
        .register(registration("john_doe", "john@example.com", "s3cret!pw"))
        .await
        .unwrap();

    assert_eq!(user.id, user_id());
    assert_eq!(user.display_name, "john_doe");
    assert_eq!(user.status, UserStatus::Active);
    assert_eq!(user.created_at, t0());
    assert_eq!(user.updated_at, t0());
    assert!(user.password_hash.is_empty(), "hash must not be returned");
    assert_eq!(fx.creates.load(Ordering::SeqCst), 1);

    let stored = fx.store.users().get(user.id).await.unwrap();
    assert!(stored.password_hash.starts_with("$argon2id$"));
    assert!(fx.hasher.verify("s3cret!pw", &stored.password_hash).unwrap());
}

#[tokio::test]
async fn invalid_fields_are_named_and_never_persisted() {
    let fx = setup();

    let cases = [
        (registration("j", "john@example.com", "s3cret!pw"), "display_name"),
        (registration("john doe", "john@example.com", "s3cret!pw"), "display_name"),
        (registration(&"j".repeat(51), "john@example.com", "s3cret!pw"), "display_name"),
        (registration("john", "j", "s3cret!pw"), "email"),
        (registration("john", &"j".repeat(51), "s3cret!pw"), "email"),
        (registration("john", "john@example.com", "secret!pw"), "password"),
        (registration("john", "john@example.com", "s3cretpw"), "password"),
        (registration("john", "john@example.com", &format!("1!{}", "a".repeat(54))), "password"),
    ];

    for (input, field) in cases {
        let err = fx.service.register(input).await.unwrap_err();
        assert_eq!(err.validation_field(), Some(field), "got: {err:?}");
    }

    assert_eq!(fx.creates.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn first_failing_field_wins() {
    let fx = setup();

    let err = fx
        .service
        .register(registration("j", "x", "nope"))
        .await
        .unwrap_err();

    assert_eq!(err.validation_field(), Some("display_name"));
}

#[tokio::test]
async fn duplicate_email_surfaces_conflict() {
    let fx = setup();
    fx.store
        .users()
        .create(User {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            display_name: "existing".into(),
            email: "john@example.com".into(),
            password_hash: String::new(),
            status: UserStatus::Active,
            created_at: t0(),
            updated_at: t0(),
            deleted_at: None,
            organization: None,
        })
        .await
        .unwrap();

    let err = fx
        .service
        .register(registration("john", "john@example.com", "s3cret!pw"))
        .await
        .unwrap_err();

    assert!(matches!(err, BastionError::Conflict { ref field, .. } if field == "email"));
}

#[tokio::test]
async fn system_display_name_cannot_be_registered() {
    let fx = setup();
    Bootstrapper::new(
        fx.store.clone(),
        fx.hasher.clone(),
        Arc::new(t0),
        SystemOrganizationConfig {
            id: Uuid::parse_str("0b9b3c1e-8a47-4f7e-9d3a-2f1c5e6a7b80").unwrap(),
            legal_name: "Bastion Inc".into(),
        },
        SystemUserConfig {
            id: Uuid::parse_str("6f1d2c3b-4a59-4e68-8b7a-9c0d1e2f3a4b").unwrap(),
            email: "root@example.com".into(),
            password: "changeme1!".into(),
        },
    )
    .setup()
    .await
    .unwrap();

    let err = fx
        .service
        .register(registration("system", "evil@example.com", "s3cret!pw"))
        .await
        .unwrap_err();

    assert!(matches!(err, BastionError::Conflict { ref field, .. } if field == "display_name"));
    assert!(
        fx.store
            .users()
            .get_by_email("evil@example.com")
            .await
            .unwrap_err()
            .is_not_found()
    );
}
