use async_trait::async_trait;
use deadpool_postgres::{Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime};
use glob::glob;
use tokio_postgres::error::SqlState;
use tokio_postgres::NoTls;

use crate::config::DatabaseConfig;
use crate::models::{Bookmark, CreateBookmarkRequest, EditBookmarkRequest, EditUserRequest, User};

pub mod memory;

pub use memory::InMemoryStore;

/// Database connection pool
pub type DbPool = Pool;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unique constraint violated")]
    UniqueViolation,
    #[error("failed to create connection pool: {0}")]
    CreatePool(#[from] deadpool_postgres::CreatePoolError),
    #[error("connection pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),
    #[error("query error: {0}")]
    Query(tokio_postgres::Error),
    #[error("migration error: {0}")]
    Migration(String),
}

impl From<tokio_postgres::Error> for StoreError {
    fn from(err: tokio_postgres::Error) -> Self {
        if err.code() == Some(&SqlState::UNIQUE_VIOLATION) {
            StoreError::UniqueViolation
        } else {
            StoreError::Query(err)
        }
    }
}

/// Persistence operations for users and bookmarks.
///
/// Every bookmark method takes the owner id and applies it inside the
/// query, so a bookmark owned by someone else behaves exactly like a
/// missing one.
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert a new user. Fails with [`StoreError::UniqueViolation`] when the
    /// email is taken.
    async fn create_user(&self, email: &str, hash: &str) -> Result<User, StoreError>;

    async fn get_user_by_id(&self, id: i32) -> Result<Option<User>, StoreError>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Apply the supplied fields and return the updated user, or `None` when
    /// the user does not exist.
    async fn update_user(&self, id: i32, changes: &EditUserRequest) -> Result<Option<User>, StoreError>;

    /// Bookmarks of one owner, ordered by id.
    async fn list_bookmarks(&self, user_id: i32) -> Result<Vec<Bookmark>, StoreError>;

    async fn create_bookmark(&self, user_id: i32, req: &CreateBookmarkRequest) -> Result<Bookmark, StoreError>;

    async fn get_bookmark(&self, user_id: i32, id: i32) -> Result<Option<Bookmark>, StoreError>;

    async fn update_bookmark(
        &self,
        user_id: i32,
        id: i32,
        changes: &EditBookmarkRequest,
    ) -> Result<Option<Bookmark>, StoreError>;

    /// Returns whether a row was removed.
    async fn delete_bookmark(&self, user_id: i32, id: i32) -> Result<bool, StoreError>;
}

const USER_COLUMNS: &str = "id, created_at, updated_at, email, hash, first_name, last_name";
const BOOKMARK_COLUMNS: &str = "id, created_at, updated_at, title, description, link, user_id";

/// Postgres-backed store
pub struct DatabaseService {
    pool: DbPool,
}

impl DatabaseService {
    /// Create a new database service with connection pool
    pub async fn new(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let mut cfg = Config::new();
        cfg.url = Some(config.url.clone());
        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });
        cfg.pool = Some(PoolConfig::new(config.max_connections));

        let pool = cfg.create_pool(Some(Runtime::Tokio1), NoTls)?;

        // Test connection
        let client = pool.get().await?;
        client.execute("SELECT 1", &[]).await?;

        log::info!("Database connection established");

        Ok(Self { pool })
    }

    /// Get a database client from the pool
    pub async fn get_client(&self) -> Result<deadpool_postgres::Client, StoreError> {
        Ok(self.pool.get().await?)
    }

    /// Apply every `V*.sql` file in `dir` that is not yet recorded in
    /// `schema_migrations`, in lexical order, each in its own transaction.
    /// Returns the names of the newly applied files.
    pub async fn run_migrations(&self, dir: &str) -> Result<Vec<String>, StoreError> {
        let mut client = self.get_client().await?;

        client
            .execute(
                "CREATE TABLE IF NOT EXISTS schema_migrations (
                    version VARCHAR(100) PRIMARY KEY,
                    installed_on TIMESTAMPTZ NOT NULL DEFAULT NOW()
                )",
                &[],
            )
            .await?;

        let pattern = format!("{}/V*.sql", dir.trim_end_matches('/'));
        let mut files = glob(&pattern)
            .map_err(|e| StoreError::Migration(e.to_string()))?
            .filter_map(Result::ok)
            .collect::<Vec<_>>();
        files.sort();

        let mut applied = Vec::new();
        for path in files {
            let name = path
                .file_name()
                .and_then(|s| s.to_str())
                .ok_or_else(|| StoreError::Migration(format!("unreadable file name {}", path.display())))?
                .to_string();

            let done = client
                .query_opt("SELECT version FROM schema_migrations WHERE version = $1", &[&name])
                .await?;
            if done.is_some() {
                log::debug!("Skipping already-applied migration {}", name);
                continue;
            }

            let sql = std::fs::read_to_string(&path)
                .map_err(|e| StoreError::Migration(format!("{}: {}", name, e)))?;

            let txn = client.transaction().await?;
            txn.batch_execute(&sql).await?;
            txn.execute("INSERT INTO schema_migrations (version) VALUES ($1)", &[&name])
                .await?;
            txn.commit().await?;

            log::info!("Applied migration {}", name);
            applied.push(name);
        }

        Ok(applied)
    }

    /// Helper to convert database row to User
    fn row_to_user(row: &tokio_postgres::Row) -> User {
        User {
            id: row.get(0),
            created_at: row.get(1),
            updated_at: row.get(2),
            email: row.get(3),
            hash: row.get(4),
            first_name: row.get(5),
            last_name: row.get(6),
        }
    }

    /// Helper to convert database row to Bookmark
    fn row_to_bookmark(row: &tokio_postgres::Row) -> Bookmark {
        Bookmark {
            id: row.get(0),
            created_at: row.get(1),
            updated_at: row.get(2),
            title: row.get(3),
            description: row.get(4),
            link: row.get(5),
            user_id: row.get(6),
        }
    }
}

#[async_trait]
impl Store for DatabaseService {
    async fn create_user(&self, email: &str, hash: &str) -> Result<User, StoreError> {
        let client = self.get_client().await?;

        let sql = format!("INSERT INTO users (email, hash) VALUES ($1, $2) RETURNING {}", USER_COLUMNS);
        let row = client.query_one(sql.as_str(), &[&email, &hash]).await?;

        Ok(Self::row_to_user(&row))
    }

    async fn get_user_by_id(&self, id: i32) -> Result<Option<User>, StoreError> {
        let client = self.get_client().await?;

        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let row = client.query_opt(sql.as_str(), &[&id]).await?;

        Ok(row.as_ref().map(Self::row_to_user))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let client = self.get_client().await?;

        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let row = client.query_opt(sql.as_str(), &[&email]).await?;

        Ok(row.as_ref().map(Self::row_to_user))
    }

    async fn update_user(&self, id: i32, changes: &EditUserRequest) -> Result<Option<User>, StoreError> {
        let client = self.get_client().await?;

        let sql = format!(
            "UPDATE users
             SET email = COALESCE($2, email),
                 first_name = COALESCE($3, first_name),
                 last_name = COALESCE($4, last_name),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            USER_COLUMNS
        );
        let row = client
            .query_opt(
                sql.as_str(),
                &[&id, &changes.email, &changes.first_name, &changes.last_name],
            )
            .await?;

        Ok(row.as_ref().map(Self::row_to_user))
    }

    async fn list_bookmarks(&self, user_id: i32) -> Result<Vec<Bookmark>, StoreError> {
        let client = self.get_client().await?;

        let sql = format!("SELECT {} FROM bookmarks WHERE user_id = $1 ORDER BY id", BOOKMARK_COLUMNS);
        let rows = client.query(sql.as_str(), &[&user_id]).await?;

        Ok(rows.iter().map(Self::row_to_bookmark).collect())
    }

    async fn create_bookmark(&self, user_id: i32, req: &CreateBookmarkRequest) -> Result<Bookmark, StoreError> {
        let client = self.get_client().await?;

        let sql = format!(
            "INSERT INTO bookmarks (title, description, link, user_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {}",
            BOOKMARK_COLUMNS
        );
        let row = client
            .query_one(sql.as_str(), &[&req.title, &req.description, &req.link, &user_id])
            .await?;

        Ok(Self::row_to_bookmark(&row))
    }

    async fn get_bookmark(&self, user_id: i32, id: i32) -> Result<Option<Bookmark>, StoreError> {
        let client = self.get_client().await?;

        let sql = format!("SELECT {} FROM bookmarks WHERE id = $1 AND user_id = $2", BOOKMARK_COLUMNS);
        let row = client.query_opt(sql.as_str(), &[&id, &user_id]).await?;

        Ok(row.as_ref().map(Self::row_to_bookmark))
    }

    async fn update_bookmark(
        &self,
        user_id: i32,
        id: i32,
        changes: &EditBookmarkRequest,
    ) -> Result<Option<Bookmark>, StoreError> {
        let client = self.get_client().await?;

        let sql = format!(
            "UPDATE bookmarks
             SET title = COALESCE($3, title),
                 description = COALESCE($4, description),
                 link = COALESCE($5, link),
                 updated_at = NOW()
             WHERE id = $1 AND user_id = $2
             RETURNING {}",
            BOOKMARK_COLUMNS
        );
        let row = client
            .query_opt(
                sql.as_str(),
                &[&id, &user_id, &changes.title, &changes.description, &changes.link],
            )
            .await?;

        Ok(row.as_ref().map(Self::row_to_bookmark))
    }

    async fn delete_bookmark(&self, user_id: i32, id: i32) -> Result<bool, StoreError> {
        let client = self.get_client().await?;

        let removed = client
            .execute("DELETE FROM bookmarks WHERE id = $1 AND user_id = $2", &[&id, &user_id])
            .await?;

        Ok(removed > 0)
    }
}
