mod common;

use chrono::Duration;
use chrono::Utc;
use common::TestDb;
use identity_service::domain::identity::errors::IdentityError;
use identity_service::domain::identity::models::CodeType;
use identity_service::domain::identity::models::EmailAddress;
use identity_service::domain::identity::models::NewUser;
use identity_service::domain::identity::models::OneTimeCode;
use identity_service::domain::identity::models::RefreshToken;
use identity_service::domain::identity::models::User;
use identity_service::domain::identity::models::UserId;
use identity_service::domain::identity::models::Username;
use identity_service::domain::identity::ports::CodeRepository;
use identity_service::domain::identity::ports::RefreshTokenRepository;
use identity_service::domain::identity::ports::UserRepository;
use identity_service::outbound::repositories::PostgresCredentialStore;

fn new_user(email: &str, username: &str) -> NewUser {
    NewUser {
        email: EmailAddress::new(email.to_string()).unwrap(),
        username: Username::new(username.to_string()).unwrap(),
        password_hash: "$argon2id$stub".to_string(),
    }
}

async fn seeded_user(store: &PostgresCredentialStore) -> User {
    store
        .create_user(new_user("a@x.com", "alice"))
        .await
        .expect("Failed to create user")
}

#[tokio::test]
#[ignore = "requires Postgres"]
async fn test_create_and_find_user() {
    let db = TestDb::new().await;
    let store = PostgresCredentialStore::new(db.pool.clone());

    let user = seeded_user(&store).await;

    assert!(!user.email_confirmed);
    let by_id = store.find_user_by_id(&user.id).await.unwrap();
    let by_email = store.find_user_by_email("a@x.com").await.unwrap();
    let by_username = store.find_user_by_username("alice").await.unwrap();
    assert_eq!(by_id.unwrap().username.as_str(), "alice");
    assert_eq!(by_email.unwrap().id, user.id);
    assert_eq!(by_username.unwrap().id, user.id);
    assert!(store.find_user_by_email("b@x.com").await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires Postgres"]
async fn test_unique_constraints_map_to_conflicts() {
    let db = TestDb::new().await;
    let store = PostgresCredentialStore::new(db.pool.clone());
    seeded_user(&store).await;

    let same_email = store.create_user(new_user("a@x.com", "bob")).await;
    let same_username = store.create_user(new_user("b@x.com", "alice")).await;

    assert!(matches!(same_email, Err(IdentityError::EmailAlreadyExists(_))));
    assert!(matches!(
        same_username,
        Err(IdentityError::UsernameAlreadyExists(_))
    ));
}

#[tokio::test]
#[ignore = "requires Postgres"]
async fn test_targeted_user_writes() {
    let db = TestDb::new().await;
    let store = PostgresCredentialStore::new(db.pool.clone());
    let user = seeded_user(&store).await;

    store
        .set_password_hash(&user.id, "$argon2id$other")
        .await
        .unwrap();
    store.mark_email_confirmed(&user.id).await.unwrap();

    let stored = store.find_user_by_id(&user.id).await.unwrap().unwrap();
    assert!(stored.email_confirmed);
    assert_eq!(stored.password_hash, "$argon2id$other");

    let missing = store.mark_email_confirmed(&UserId(user.id.0 + 1000)).await;
    assert!(matches!(missing, Err(IdentityError::UserNotFound(_))));
}

#[tokio::test]
#[ignore = "requires Postgres"]
async fn test_code_upsert_and_single_consumption() {
    let db = TestDb::new().await;
    let store = PostgresCredentialStore::new(db.pool.clone());
    seeded_user(&store).await;
    let now = Utc::now();

    for code in ["111111", "222222"] {
        store
            .save_code(OneTimeCode {
                email: "a@x.com".to_string(),
                code: code.to_string(),
                code_type: CodeType::EmailConfirmation,
                expires_at: now + Duration::minutes(10),
            })
            .await
            .unwrap();
    }

    let live = store
        .find_live_code("a@x.com", CodeType::EmailConfirmation, now)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(live.code, "222222");

    let consume = |code: &'static str| {
        store.consume_code("a@x.com", CodeType::EmailConfirmation, code, now)
    };
    assert!(!consume("111111").await.unwrap());
    assert!(consume("222222").await.unwrap());
    assert!(!consume("222222").await.unwrap());
}

#[tokio::test]
#[ignore = "requires Postgres"]
async fn test_expired_code_is_not_live() {
    let db = TestDb::new().await;
    let store = PostgresCredentialStore::new(db.pool.clone());
    seeded_user(&store).await;
    let now = Utc::now();

    store
        .save_code(OneTimeCode {
            email: "a@x.com".to_string(),
            code: "123456".to_string(),
            code_type: CodeType::PasswordReset,
            expires_at: now - Duration::seconds(1),
        })
        .await
        .unwrap();

    let live = store
        .find_live_code("a@x.com", CodeType::PasswordReset, now)
        .await
        .unwrap();
    let consumed = store
        .consume_code("a@x.com", CodeType::PasswordReset, "123456", now)
        .await
        .unwrap();

    assert!(live.is_none());
    assert!(!consumed);
    assert_eq!(store.purge_expired_codes(now).await.unwrap(), 1);
}

#[tokio::test]
#[ignore = "requires Postgres"]
async fn test_refresh_token_lifecycle() {
    let db = TestDb::new().await;
    let store = PostgresCredentialStore::new(db.pool.clone());
    let user = seeded_user(&store).await;
    let now = Utc::now();

    store
        .save_refresh_token(RefreshToken {
            user_id: user.id,
            token: "live-token".to_string(),
            expires_at: now + Duration::days(7),
        })
        .await
        .unwrap();
    store
        .save_refresh_token(RefreshToken {
            user_id: user.id,
            token: "stale-token".to_string(),
            expires_at: now - Duration::days(1),
        })
        .await
        .unwrap();

    let found = store.find_refresh_token("live-token").await.unwrap().unwrap();
    assert_eq!(found.user_id, user.id);

    assert_eq!(store.purge_expired_refresh_tokens(now).await.unwrap(), 1);
    assert!(store.find_refresh_token("stale-token").await.unwrap().is_none());

    assert!(store.delete_refresh_token("live-token").await.unwrap());
    assert!(!store.delete_refresh_token("live-token").await.unwrap());
}
