use std::sync::Arc;

use crate::auth::AuthService;
use crate::database::{Store, StoreError};
use crate::models::{
    AuthRequest, Bookmark, CreateBookmarkRequest, EditBookmarkRequest, EditUserRequest, TokenResponse, UserResponse,
};
use crate::utils::error::AppError;
use crate::utils::mask_sensitive;

const BOOKMARK_NOT_FOUND: &str = "Bookmark not found";

/// Signup, login and token issuance
pub struct CredentialService {
    store: Arc<dyn Store>,
    auth: Arc<AuthService>,
}

impl CredentialService {
    pub fn new(store: Arc<dyn Store>, auth: Arc<AuthService>) -> Self {
        Self { store, auth }
    }

    /// Create an account and return a token for it
    pub async fn signup(&self, req: AuthRequest) -> Result<TokenResponse, AppError> {
        let auth = Arc::clone(&self.auth);
        let password = req.password;
        let hash = tokio::task::spawn_blocking(move || auth.hash_password(&password)).await??;

        // Uniqueness is left to the store; no read-then-write race.
        let user = match self.store.create_user(&req.email, &hash).await {
            Ok(user) => user,
            Err(StoreError::UniqueViolation) => {
                log::info!("Signup rejected, email taken: {}", mask_sensitive(&req.email));
                return Err(AppError::Conflict("User already exists".to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        log::info!("User {} signed up", user.id);
        Ok(self.auth.issue_token(user.id, &user.email)?)
    }

    /// Verify credentials and return a fresh token
    pub async fn login(&self, req: AuthRequest) -> Result<TokenResponse, AppError> {
        let user = match self.store.get_user_by_email(&req.email).await? {
            Some(user) => user,
            None => return Err(AppError::Authentication("Please signup first.".to_string())),
        };

        let auth = Arc::clone(&self.auth);
        let (password, hash) = (req.password, user.hash.clone());
        let matches = tokio::task::spawn_blocking(move || auth.verify_password(&password, &hash)).await??;
        if !matches {
            log::info!("Failed login for user {}", user.id);
            return Err(AppError::Authentication("Credentials incorrect.".to_string()));
        }

        Ok(self.auth.issue_token(user.id, &user.email)?)
    }

    pub fn issue_token(&self, user_id: i32, email: &str) -> Result<TokenResponse, AppError> {
        Ok(self.auth.issue_token(user_id, email)?)
    }
}

/// Profile read and edit for the authenticated caller
pub struct UserService {
    store: Arc<dyn Store>,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn get_me(&self, user_id: i32) -> Result<UserResponse, AppError> {
        match self.store.get_user_by_id(user_id).await? {
            Some(user) => Ok(user.into()),
            None => Err(AppError::NotFound("User not found".to_string())),
        }
    }

    /// Apply first name, last name and email changes; omitted fields are kept
    pub async fn edit_user(&self, user_id: i32, changes: EditUserRequest) -> Result<UserResponse, AppError> {
        match self.store.update_user(user_id, &changes).await {
            Ok(Some(user)) => Ok(user.into()),
            Ok(None) => Err(AppError::NotFound("User not found".to_string())),
            Err(StoreError::UniqueViolation) => Err(AppError::Conflict("Email already in use".to_string())),
            Err(e) => Err(e.into()),
        }
    }
}

/// Bookmark CRUD, always scoped to the owner
pub struct BookmarkService {
    store: Arc<dyn Store>,
}

impl BookmarkService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self, user_id: i32) -> Result<Vec<Bookmark>, AppError> {
        Ok(self.store.list_bookmarks(user_id).await?)
    }

    pub async fn create(&self, user_id: i32, req: CreateBookmarkRequest) -> Result<Bookmark, AppError> {
        let bookmark = self.store.create_bookmark(user_id, &req).await?;
        log::debug!("User {} created bookmark {}", user_id, bookmark.id);
        Ok(bookmark)
    }

    pub async fn get(&self, user_id: i32, id: i32) -> Result<Bookmark, AppError> {
        self.store
            .get_bookmark(user_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(BOOKMARK_NOT_FOUND.to_string()))
    }

    pub async fn edit(&self, user_id: i32, id: i32, changes: EditBookmarkRequest) -> Result<Bookmark, AppError> {
        self.store
            .update_bookmark(user_id, id, &changes)
            .await?
            .ok_or_else(|| AppError::NotFound(BOOKMARK_NOT_FOUND.to_string()))
    }

    pub async fn delete(&self, user_id: i32, id: i32) -> Result<(), AppError> {
        if self.store.delete_bookmark(user_id, id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(BOOKMARK_NOT_FOUND.to_string()))
        }
    }
}

/// Shared collaborators handed to the HTTP layer
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub store: Arc<dyn Store>,
    pub credentials: Arc<CredentialService>,
    pub users: Arc<UserService>,
    pub bookmarks: Arc<BookmarkService>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, auth: Arc<AuthService>) -> Self {
        Self {
            credentials: Arc::new(CredentialService::new(Arc::clone(&store), Arc::clone(&auth))),
            users: Arc::new(UserService::new(Arc::clone(&store))),
            bookmarks: Arc::new(BookmarkService::new(Arc::clone(&store))),
            auth,
            store,
        }
    }
}

#[cfg(test)]
#[path = "services_test.rs"]
mod tests;
