use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{Store, StoreError};
use crate::models::{Bookmark, CreateBookmarkRequest, EditBookmarkRequest, EditUserRequest, User};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    bookmarks: Vec<Bookmark>,
    next_user_id: i32,
    next_bookmark_id: i32,
}

/// Process-local store with the same contract as the Postgres one,
/// including email uniqueness. Used by tests and for running without a
/// database.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn create_user(&self, email: &str, hash: &str) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.email == email) {
            return Err(StoreError::UniqueViolation);
        }

        tables.next_user_id += 1;
        let now = Utc::now();
        let user = User {
            id: tables.next_user_id,
            created_at: now,
            updated_at: now,
            email: email.to_string(),
            hash: hash.to_string(),
            first_name: None,
            last_name: None,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn get_user_by_id(&self, id: i32) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn update_user(&self, id: i32, changes: &EditUserRequest) -> Result<Option<User>, StoreError> {
        let mut tables = self.tables.write().await;
        if let Some(email) = &changes.email {
            if tables.users.iter().any(|u| u.id != id && &u.email == email) {
                return Err(StoreError::UniqueViolation);
            }
        }

        let Some(user) = tables.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(email) = &changes.email {
            user.email = email.clone();
        }
        if let Some(first_name) = &changes.first_name {
            user.first_name = Some(first_name.clone());
        }
        if let Some(last_name) = &changes.last_name {
            user.last_name = Some(last_name.clone());
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn list_bookmarks(&self, user_id: i32) -> Result<Vec<Bookmark>, StoreError> {
        let tables = self.tables.read().await;
        // Ids are assigned in increasing order, so insertion order is id order.
        Ok(tables
            .bookmarks
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_bookmark(&self, user_id: i32, req: &CreateBookmarkRequest) -> Result<Bookmark, StoreError> {
        let mut tables = self.tables.write().await;
        tables.next_bookmark_id += 1;
        let now = Utc::now();
        let bookmark = Bookmark {
            id: tables.next_bookmark_id,
            created_at: now,
            updated_at: now,
            title: req.title.clone(),
            description: req.description.clone(),
            link: req.link.clone(),
            user_id,
        };
        tables.bookmarks.push(bookmark.clone());
        Ok(bookmark)
    }

    async fn get_bookmark(&self, user_id: i32, id: i32) -> Result<Option<Bookmark>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .bookmarks
            .iter()
            .find(|b| b.id == id && b.user_id == user_id)
            .cloned())
    }

    async fn update_bookmark(
        &self,
        user_id: i32,
        id: i32,
        changes: &EditBookmarkRequest,
    ) -> Result<Option<Bookmark>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(bookmark) = tables
            .bookmarks
            .iter_mut()
            .find(|b| b.id == id && b.user_id == user_id)
        else {
            return Ok(None);
        };

        if let Some(title) = &changes.title {
            bookmark.title = title.clone();
        }
        if let Some(description) = &changes.description {
            bookmark.description = Some(description.clone());
        }
        if let Some(link) = &changes.link {
            bookmark.link = link.clone();
        }
        bookmark.updated_at = Utc::now();
        Ok(Some(bookmark.clone()))
    }

    async fn delete_bookmark(&self, user_id: i32, id: i32) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let before = tables.bookmarks.len();
        tables.bookmarks.retain(|b| !(b.id == id && b.user_id == user_id));
        Ok(tables.bookmarks.len() < before)
    }
}
