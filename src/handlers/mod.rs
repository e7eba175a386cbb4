use actix_web::{web, HttpMessage, HttpRequest, HttpResponse};
use std::sync::Arc;
use validator::Validate;

use crate::auth::Claims;
use crate::middleware::AuthMiddleware;
use crate::models::{AuthRequest, CreateBookmarkRequest, EditBookmarkRequest, EditUserRequest, HealthResponse};
use crate::services::{AppState, BookmarkService, CredentialService, UserService};
use crate::utils::error::AppError;

/// Register shared state, JSON settings and every route.
pub fn configure(state: AppState, max_json_payload_bytes: usize) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        let json_config = web::JsonConfig::default()
            .limit(max_json_payload_bytes)
            .error_handler(|err, _req| AppError::validation(err.to_string()).into());

        let guard = || AuthMiddleware {
            auth_service: Arc::clone(&state.auth),
            store: Arc::clone(&state.store),
        };

        cfg.app_data(json_config)
            .app_data(web::Data::new(Arc::clone(&state.credentials)))
            .app_data(web::Data::new(Arc::clone(&state.users)))
            .app_data(web::Data::new(Arc::clone(&state.bookmarks)))
            // Public routes
            .route("/health", web::get().to(health_check))
            .service(
                web::scope("/auth")
                    .route("/signup", web::post().to(signup))
                    .route("/login", web::post().to(login)),
            )
            // Protected routes
            .service(
                web::scope("/users")
                    .route("/me", web::get().to(get_me))
                    .route("", web::patch().to(edit_user))
                    .route("/", web::patch().to(edit_user))
                    .wrap(guard()),
            )
            .service(
                web::scope("/bookmarks")
                    .route("", web::get().to(get_bookmarks))
                    .route("", web::post().to(create_bookmark))
                    .route("/{id}", web::get().to(get_bookmark_by_id))
                    .route("/{id}", web::patch().to(edit_bookmark_by_id))
                    .route("/{id}", web::delete().to(delete_bookmark_by_id))
                    .wrap(guard()),
            );
    }
}

/// Subject of the verified token attached by [`AuthMiddleware`]
fn caller_id(req: &HttpRequest) -> Result<i32, AppError> {
    req.extensions()
        .get::<Claims>()
        .map(|claims| claims.sub)
        .ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))
}

/// Health check endpoint
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

pub async fn signup(
    body: web::Json<AuthRequest>,
    credentials: web::Data<Arc<CredentialService>>,
) -> Result<HttpResponse, AppError> {
    let req = body.into_inner();
    req.validate()?;

    let token = credentials.signup(req).await?;
    Ok(HttpResponse::Created().json(token))
}

pub async fn login(
    body: web::Json<AuthRequest>,
    credentials: web::Data<Arc<CredentialService>>,
) -> Result<HttpResponse, AppError> {
    let req = body.into_inner();
    req.validate()?;

    let token = credentials.login(req).await?;
    Ok(HttpResponse::Ok().json(token))
}

pub async fn get_me(req: HttpRequest, users: web::Data<Arc<UserService>>) -> Result<HttpResponse, AppError> {
    let user_id = caller_id(&req)?;
    Ok(HttpResponse::Ok().json(users.get_me(user_id).await?))
}

pub async fn edit_user(
    req: HttpRequest,
    body: web::Json<EditUserRequest>,
    users: web::Data<Arc<UserService>>,
) -> Result<HttpResponse, AppError> {
    let user_id = caller_id(&req)?;
    let changes = body.into_inner();
    changes.validate()?;

    Ok(HttpResponse::Ok().json(users.edit_user(user_id, changes).await?))
}

pub async fn get_bookmarks(
    req: HttpRequest,
    bookmarks: web::Data<Arc<BookmarkService>>,
) -> Result<HttpResponse, AppError> {
    let user_id = caller_id(&req)?;
    Ok(HttpResponse::Ok().json(bookmarks.list(user_id).await?))
}

pub async fn create_bookmark(
    req: HttpRequest,
    body: web::Json<CreateBookmarkRequest>,
    bookmarks: web::Data<Arc<BookmarkService>>,
) -> Result<HttpResponse, AppError> {
    let user_id = caller_id(&req)?;
    let new_bookmark = body.into_inner();
    new_bookmark.validate()?;

    Ok(HttpResponse::Created().json(bookmarks.create(user_id, new_bookmark).await?))
}

pub async fn get_bookmark_by_id(
    req: HttpRequest,
    path: web::Path<i32>,
    bookmarks: web::Data<Arc<BookmarkService>>,
) -> Result<HttpResponse, AppError> {
    let user_id = caller_id(&req)?;
    Ok(HttpResponse::Ok().json(bookmarks.get(user_id, path.into_inner()).await?))
}

pub async fn edit_bookmark_by_id(
    req: HttpRequest,
    path: web::Path<i32>,
    body: web::Json<EditBookmarkRequest>,
    bookmarks: web::Data<Arc<BookmarkService>>,
) -> Result<HttpResponse, AppError> {
    let user_id = caller_id(&req)?;
    let changes = body.into_inner();
    changes.validate()?;

    Ok(HttpResponse::Ok().json(bookmarks.edit(user_id, path.into_inner(), changes).await?))
}

pub async fn delete_bookmark_by_id(
    req: HttpRequest,
    path: web::Path<i32>,
    bookmarks: web::Data<Arc<BookmarkService>>,
) -> Result<HttpResponse, AppError> {
    let user_id = caller_id(&req)?;
    bookmarks.delete(user_id, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
