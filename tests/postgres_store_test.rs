use bookmark_service::config::DatabaseConfig;
use bookmark_service::database::{DatabaseService, Store, StoreError};
use bookmark_service::models::{CreateBookmarkRequest, EditBookmarkRequest, EditUserRequest};
use uuid::Uuid;

// Requires a running Postgres; skipped when DATABASE_URL is not set.
async fn setup_store() -> Option<DatabaseService> {
    dotenvy::from_filename(".env").ok();

    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => return None,
    };

    let db = DatabaseService::new(&DatabaseConfig { url, max_connections: 4 })
        .await
        .expect("db init");
    db.run_migrations(concat!(env!("CARGO_MANIFEST_DIR"), "/migrations"))
        .await
        .expect("migrations");
    Some(db)
}

#[tokio::test]
async fn postgres_store_enforces_uniqueness_and_owner_scope() {
    let db = match setup_store().await {
        Some(db) => db,
        None => {
            eprintln!("Skipping test: DATABASE_URL not set");
            return;
        }
    };

    let email = format!("pg_{}@example.com", Uuid::new_v4().simple());
    let owner = db.create_user(&email, "hash").await.expect("create user");
    let err = db.create_user(&email, "hash").await.unwrap_err();
    assert!(matches!(err, StoreError::UniqueViolation));

    let other = db
        .create_user(&format!("pg_{}@example.com", Uuid::new_v4().simple()), "hash")
        .await
        .expect("create second user");

    let created = db
        .create_bookmark(
            owner.id,
            &CreateBookmarkRequest {
                title: "Postgres".to_string(),
                description: None,
                link: "https://www.postgresql.org".to_string(),
            },
        )
        .await
        .expect("create bookmark");

    assert!(db.get_bookmark(other.id, created.id).await.unwrap().is_none());
    assert!(db
        .update_bookmark(other.id, created.id, &EditBookmarkRequest::default())
        .await
        .unwrap()
        .is_none());
    assert!(!db.delete_bookmark(other.id, created.id).await.unwrap());

    let updated = db
        .update_bookmark(
            owner.id,
            created.id,
            &EditBookmarkRequest {
                description: Some("docs".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .expect("owner can update");
    assert_eq!(updated.title, "Postgres");
    assert_eq!(updated.description.as_deref(), Some("docs"));

    assert!(db.delete_bookmark(owner.id, created.id).await.unwrap());
    assert!(db.list_bookmarks(owner.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn postgres_store_accepts_long_text_fields() {
    let db = match setup_store().await {
        Some(db) => db,
        None => {
            eprintln!("Skipping test: DATABASE_URL not set");
            return;
        }
    };

    let long = "x".repeat(300);
    let user = db
        .create_user(&format!("pg_{}@example.com", Uuid::new_v4().simple()), "hash")
        .await
        .expect("create user");

    let renamed = db
        .update_user(
            user.id,
            &EditUserRequest {
                first_name: Some(long.clone()),
                ..Default::default()
            },
        )
        .await
        .expect("long first name is stored")
        .expect("user exists");
    assert_eq!(renamed.first_name.as_deref(), Some(long.as_str()));

    let bookmark = db
        .create_bookmark(
            user.id,
            &CreateBookmarkRequest {
                title: long.clone(),
                description: None,
                link: "https://example.com".to_string(),
            },
        )
        .await
        .expect("long title is stored");
    assert_eq!(bookmark.title, long);
}
