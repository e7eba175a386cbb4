use actix_web::{
    body::BoxBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderName, HeaderValue},
    Error, HttpMessage, ResponseError,
};

use futures_util::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::{extract_token_from_request, AuthService};
use crate::database::Store;
use crate::utils::{self, error::AppError};

/// Authentication middleware.
///
/// Verifies the bearer token, checks that its subject still exists and
/// attaches the [`Claims`](crate::auth::Claims) to the request extensions.
/// Mounted only on protected scopes.
pub struct AuthMiddleware {
    pub auth_service: Arc<AuthService>,
    pub store: Arc<dyn Store>,
}

impl<S> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error>,
    S: 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Arc::new(service),
            auth_service: Arc::clone(&self.auth_service),
            store: Arc::clone(&self.store),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Arc<S>,
    auth_service: Arc<AuthService>,
    store: Arc<dyn Store>,
}

impl<S> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error>,
    S: 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Arc::clone(&self.service);
        let auth_service = Arc::clone(&self.auth_service);
        let store = Arc::clone(&self.store);

        Box::pin(async move {
            let reject = |req: ServiceRequest, message: &str| -> Result<ServiceResponse<BoxBody>, Error> {
                let response = AppError::Unauthorized(message.to_string()).error_response();
                Ok(req.into_response(response))
            };

            let token = match extract_token_from_request(&req) {
                Some(token) => token,
                None => return reject(req, "Missing authentication token"),
            };

            let claims = match auth_service.validate_access_token(&token) {
                Ok(claims) => claims,
                Err(e) => {
                    log::debug!("Rejected bearer token: {}", e);
                    return reject(req, "Invalid or expired token");
                }
            };

            match store.get_user_by_id(claims.sub).await {
                Ok(Some(_)) => {}
                Ok(None) => return reject(req, "Invalid or expired token"),
                Err(e) => {
                    let response = AppError::from(e).error_response();
                    return Ok(req.into_response(response));
                }
            }

            req.extensions_mut().insert(claims);
            service.call(req).await
        })
    }
}

/// Logging middleware. Logs one line per request and tags the response
/// with an `x-request-id` header.
pub struct LoggingMiddleware;

impl<S> Transform<S, ServiceRequest> for LoggingMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error>,
    S: 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = LoggingMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(LoggingMiddlewareService {
            service: Arc::new(service),
        }))
    }
}

pub struct LoggingMiddlewareService<S> {
    service: Arc<S>,
}

impl<S> Service<ServiceRequest> for LoggingMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error>,
    S: 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Arc::clone(&self.service);
        let start_time = std::time::Instant::now();
        let method = req.method().to_string();
        let path = req.path().to_string();
        let remote_addr = req.connection_info().peer_addr().unwrap_or("unknown").to_string();
        let request_id = Uuid::new_v4().to_string();

        Box::pin(async move {
            let result = service.call(req).await;
            let elapsed = start_time.elapsed().as_millis();

            match result {
                Ok(mut res) => {
                    utils::logging::log_request(&method, &path, res.status().as_u16(), elapsed, &remote_addr, &request_id);
                    if let Ok(value) = HeaderValue::from_str(&request_id) {
                        res.headers_mut().insert(HeaderName::from_static("x-request-id"), value);
                    }
                    Ok(res)
                }
                Err(err) => {
                    log::error!(
                        "Request failed: {} {} {} {}ms from {} [{}]",
                        method, path, err, elapsed, remote_addr, request_id
                    );
                    Err(err)
                }
            }
        })
    }
}
