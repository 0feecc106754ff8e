use std::sync::Arc;
use std::time::Duration;

use token_gate::auth::{AuthService, ManualClock, TokenManager};
use token_gate::storage::{MemoryUserStorage, SharedUserStorage, SqliteUserStorage, UserStorage};
use token_gate::TokenGateError;

fn service(users: SharedUserStorage) -> AuthService {
    let tokens = Arc::new(TokenManager::new(
        "registration-signing-key-5e6f7a8b9c0d",
        Duration::from_secs(3600),
        Arc::new(ManualClock::starting_now()),
    ));
    AuthService::new(users, tokens, Duration::ZERO).unwrap()
}

#[tokio::test]
async fn test_register_twice_conflicts() {
    let service = service(Arc::new(MemoryUserStorage::new()));

    assert!(service.register("alice", "Secret123!", None).await.is_ok());
    for _ in 0..2 {
        let again = service.register("alice", "Different1!", None).await;
        assert!(matches!(again, Err(TokenGateError::UserAlreadyExists(ref name)) if name == "alice"));
    }

    // The first credential still works, the rejected one never landed
    assert!(service.issue("alice", "Secret123!").await.is_ok());
    assert!(service.issue("alice", "Different1!").await.is_err());
    assert_eq!(service.users().count_users().await.unwrap(), 1);
}

#[tokio::test]
async fn test_register_trims_username() {
    let service = service(Arc::new(MemoryUserStorage::new()));
    let user = service.register("  dave  ", "pw", None).await.unwrap();
    assert_eq!(user.username, "dave");

    assert!(matches!(
        service.register("dave", "pw", None).await,
        Err(TokenGateError::UserAlreadyExists(_))
    ));
    assert!(service.issue(" dave ", "pw").await.is_ok());
}

#[tokio::test]
async fn test_register_validation_errors_leave_no_user() {
    let service = service(Arc::new(MemoryUserStorage::new()));

    let cases = [
        ("", "pw", None),
        ("   ", "pw", None),
        ("has space", "pw", None),
        ("erin", "", None),
        ("erin", "pw", Some("not-an-email")),
    ];

    for (username, password, email) in cases {
        let result = service.register(username, password, email).await;
        assert!(
            matches!(result, Err(TokenGateError::ValidationError(_))),
            "expected validation error for {:?}/{:?}/{:?}",
            username,
            password,
            email
        );
    }

    assert_eq!(service.users().count_users().await.unwrap(), 0);
}

#[tokio::test]
async fn test_registration_against_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.db");
    let store = Arc::new(SqliteUserStorage::open(path.to_str().unwrap()).unwrap());
    let service = service(store.clone());

    let user = service
        .register("frank", "Secret123!", Some("frank@example.com"))
        .await
        .unwrap();
    assert!(matches!(
        service.register("frank", "x", None).await,
        Err(TokenGateError::UserAlreadyExists(_))
    ));

    let stored = store.get_user_by_username("frank").await.unwrap().unwrap();
    assert_eq!(stored.id, user.id);
    assert_eq!(stored.email.as_deref(), Some("frank@example.com"));
    assert!(!stored.password_hash.contains("Secret123!"));

    let issued = service.issue("frank", "Secret123!").await.unwrap();
    assert_eq!(service.tokens().verify(&issued.token).unwrap().sub, user.id);
}

#[tokio::test]
async fn test_concurrent_registration_single_winner() {
    let service = Arc::new(service(Arc::new(SqliteUserStorage::open_in_memory().unwrap())));

    let mut handles = Vec::new();
    for i in 0..6 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service.register("grace", &format!("pw-{}", i), None).await
        }));
    }

    let mut created = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(TokenGateError::UserAlreadyExists(_)) => conflicts += 1,
            Err(e) => panic!("unexpected error: {}", e),
        }
    }
    assert_eq!(created, 1);
    assert_eq!(conflicts, 5);
}
