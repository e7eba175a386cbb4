/// Mask sensitive values partially (emails, tokens) before they reach a log line
pub fn mask_sensitive(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }

    // If it looks like an email, mask local part
    if let Some((local, domain)) = value.split_once('@') {
        let visible: String = local.chars().take(if local.chars().count() <= 2 { 1 } else { 2 }).collect();
        return format!("{}***@{}", visible, domain);
    }

    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 4 {
        return format!("{}***", chars[0]);
    }

    let start: String = chars[..4].iter().collect();
    let end: String = chars[chars.len() - 4..].iter().collect();
    format!("{}***{}", start, end)
}

/// Logging helpers
pub mod logging {
    use log::{Level, LevelFilter};

    use crate::config::LoggingConfig;

    pub fn level_from_string(level: &str) -> LevelFilter {
        match level.to_lowercase().as_str() {
            "error" => LevelFilter::Error,
            "warn" => LevelFilter::Warn,
            "info" => LevelFilter::Info,
            "debug" => LevelFilter::Debug,
            "trace" => LevelFilter::Trace,
            _ => LevelFilter::Info,
        }
    }

    pub fn level_for_status(status: u16) -> Level {
        match status {
            400..=499 => Level::Warn,
            500..=599 => Level::Error,
            _ => Level::Info,
        }
    }

    pub fn log_request(method: &str, path: &str, status: u16, duration_ms: u128, remote_addr: &str, request_id: &str) {
        log::log!(
            level_for_status(status),
            "{} {} {} {}ms from {} [{}]",
            method,
            path,
            status,
            duration_ms,
            remote_addr,
            request_id
        );
    }

    /// Start file + stdout logging; falls back to env_logger when the file
    /// logger cannot be set up. The returned handle must be kept alive for
    /// the file writer to keep flushing.
    pub fn init(config: &LoggingConfig) -> Option<flexi_logger::LoggerHandle> {
        let file_logger = flexi_logger::Logger::try_with_str(&config.level).and_then(|logger| {
            logger
                .log_to_file(
                    flexi_logger::FileSpec::default()
                        .directory(&config.directory)
                        .suppress_timestamp(),
                )
                .duplicate_to_stdout(flexi_logger::Duplicate::Info)
                .start()
        });

        match file_logger {
            Ok(handle) => Some(handle),
            Err(e) => {
                env_logger::builder()
                    .filter_level(level_from_string(&config.level))
                    .format_timestamp_secs()
                    .init();
                log::warn!("File logging unavailable ({}), logging to stderr", e);
                None
            }
        }
    }
}

/// Error handling utilities
pub mod error {
    use actix_web::http::StatusCode;
    use actix_web::{HttpResponse, ResponseError};

    use crate::database::StoreError;

    #[derive(Debug, thiserror::Error)]
    pub enum AppError {
        #[error("validation failed: {}", .0.join(", "))]
        Validation(Vec<String>),
        #[error("{0}")]
        Authentication(String),
        #[error("{0}")]
        Conflict(String),
        #[error("{0}")]
        Unauthorized(String),
        #[error("{0}")]
        NotFound(String),
        #[error("storage error: {0}")]
        Store(#[from] StoreError),
        #[error("password hashing failed: {0}")]
        Hash(#[from] bcrypt::BcryptError),
        #[error("token signing failed: {0}")]
        Token(#[from] jsonwebtoken::errors::Error),
        #[error("blocking task failed: {0}")]
        Blocking(#[from] tokio::task::JoinError),
    }

    impl AppError {
        pub fn validation(message: impl Into<String>) -> Self {
            AppError::Validation(vec![message.into()])
        }

        fn is_internal(&self) -> bool {
            matches!(
                self,
                AppError::Store(_) | AppError::Hash(_) | AppError::Token(_) | AppError::Blocking(_)
            )
        }
    }

    impl From<validator::ValidationErrors> for AppError {
        fn from(err: validator::ValidationErrors) -> Self {
            let mut msgs = Vec::new();
            for (field, errors) in err.field_errors() {
                for e in errors {
                    let message = match &e.message {
                        Some(m) => m.to_string(),
                        None => format!("{} {}", field, e.code),
                    };
                    msgs.push(message);
                }
            }
            msgs.sort();
            AppError::Validation(msgs)
        }
    }

    impl ResponseError for AppError {
        fn status_code(&self) -> StatusCode {
            match self {
                AppError::Validation(_) => StatusCode::BAD_REQUEST,
                AppError::Authentication(_) | AppError::Conflict(_) => StatusCode::FORBIDDEN,
                AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
                AppError::NotFound(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            }
        }

        fn error_response(&self) -> HttpResponse {
            match self {
                AppError::Validation(errors) => super::response::validation_error_response(errors),
                err if err.is_internal() => {
                    log::error!("Internal error: {}", err);
                    super::response::error_response("An internal error occurred", self.status_code())
                }
                err => super::response::error_response(&err.to_string(), self.status_code()),
            }
        }
    }
}

/// Response helpers
pub mod response {
    use actix_web::http::StatusCode;
    use actix_web::HttpResponse;

    pub fn error_response(message: &str, status: StatusCode) -> HttpResponse {
        HttpResponse::build(status).json(serde_json::json!({ "error": message }))
    }

    pub fn validation_error_response(errors: &[String]) -> HttpResponse {
        HttpResponse::BadRequest().json(serde_json::json!({ "errors": errors }))
    }
}
