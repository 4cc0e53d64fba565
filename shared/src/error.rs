use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

use crate::capabilities::RequestError;
use crate::media::MAX_IMAGE_BYTES;
use crate::wishlist::ApiError;

const GENERIC_FAILURE: &str = "Ошибка при создании желания. Попробуйте еще раз.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorSeverity {
    /// Trying again later may succeed.
    Transient,
    Permanent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Network,
    Timeout,
    Authentication,
    Validation,
    NotFound,
    RateLimited,
    Deserialization,
    ImageTooLarge,
    ImageFormatUnsupported,
    Internal,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Network => "NETWORK_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::Authentication => "AUTH_ERROR",
            Self::Validation => "VALIDATION_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::RateLimited => "RATE_LIMITED",
            Self::Deserialization => "DESERIALIZATION_ERROR",
            Self::ImageTooLarge => "IMAGE_TOO_LARGE",
            Self::ImageFormatUnsupported => "IMAGE_FORMAT_UNSUPPORTED",
            Self::Internal => "INTERNAL_ERROR",
        }
    }

    #[must_use]
    pub const fn default_severity(self) -> ErrorSeverity {
        match self {
            Self::Network | Self::Timeout | Self::RateLimited => ErrorSeverity::Transient,
            _ => ErrorSeverity::Permanent,
        }
    }

    #[must_use]
    pub const fn from_http_status(status: u16) -> Self {
        match status {
            400 | 422 => Self::Validation,
            401 | 403 => Self::Authentication,
            404 => Self::NotFound,
            408 => Self::Timeout,
            429 => Self::RateLimited,
            _ => Self::Internal,
        }
    }
}

/// A failure the user is told about through the host alert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppError {
    pub kind: ErrorKind,
    pub severity: ErrorSeverity,
    pub message: String,
    pub context: HashMap<String, String>,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.default_severity(),
            message: message.into(),
            context: HashMap::new(),
        }
    }

    /// A mutation was attempted before any owner id was resolved.
    #[must_use]
    pub fn authorization_required() -> Self {
        Self::new(ErrorKind::Authentication, "owner id is not resolved")
    }

    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Russian alert text. Anything without a specific message reuses the
    /// add form's generic failure line.
    #[must_use]
    pub fn user_facing_message(&self) -> String {
        match self.kind {
            ErrorKind::Authentication => "Необходима авторизация".into(),
            ErrorKind::ImageFormatUnsupported => {
                "Пожалуйста, выберите изображение в формате .jpeg, .webp, .svg или .png".into()
            }
            ErrorKind::ImageTooLarge => format!(
                "Изображение слишком большое. Максимальный размер {} МБ.",
                MAX_IMAGE_BYTES / (1024 * 1024)
            ),
            ErrorKind::Network | ErrorKind::Timeout => {
                "Нет соединения. Проверьте интернет и попробуйте еще раз.".into()
            }
            ErrorKind::Validation
            | ErrorKind::NotFound
            | ErrorKind::RateLimited
            | ErrorKind::Deserialization
            | ErrorKind::Internal => GENERIC_FAILURE.into(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)
    }
}

impl std::error::Error for AppError {}

impl From<&ApiError> for AppError {
    fn from(e: &ApiError) -> Self {
        let kind = match e {
            ApiError::NotAuthenticated => ErrorKind::Authentication,
            ApiError::Status { status } => ErrorKind::from_http_status(*status),
            ApiError::Malformed { .. } => ErrorKind::Deserialization,
            ApiError::Request(RequestError::Network { .. }) => ErrorKind::Network,
            ApiError::Request(RequestError::InvalidResponse { .. }) => ErrorKind::Deserialization,
            ApiError::Request(_) => ErrorKind::Internal,
        };
        let error = AppError::new(kind, e.to_string());
        match e {
            ApiError::Status { status } => error.with_context("http_status", status.to_string()),
            _ => error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("value too long ({len} > {max})")]
    TooLong { len: usize, max: usize },
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::new(ErrorKind::Validation, e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ErrorKind::from_http_status(401), ErrorKind::Authentication);
        assert_eq!(ErrorKind::from_http_status(404), ErrorKind::NotFound);
        assert_eq!(ErrorKind::from_http_status(503), ErrorKind::Internal);
        assert_eq!(ErrorKind::from_http_status(418), ErrorKind::Internal);
    }

    #[test]
    fn test_api_status_carries_context() {
        let error = AppError::from(&ApiError::Status { status: 500 });
        assert_eq!(error.kind, ErrorKind::Internal);
        assert_eq!(error.context.get("http_status").map(String::as_str), Some("500"));
        assert_eq!(error.severity, ErrorSeverity::Permanent);
    }

    #[test]
    fn test_api_transport_errors() {
        let offline = ApiError::Request(RequestError::Network {
            message: "offline".into(),
        });
        let error = AppError::from(&offline);
        assert_eq!(error.kind, ErrorKind::Network);
        assert_eq!(error.severity, ErrorSeverity::Transient);
        assert_eq!(
            AppError::from(&ApiError::NotAuthenticated).user_facing_message(),
            "Необходима авторизация"
        );
    }

    #[test]
    fn test_generic_failure_message() {
        let error = AppError::new(ErrorKind::Internal, "boom");
        assert_eq!(error.user_facing_message(), GENERIC_FAILURE);
    }

    #[test]
    fn test_display_includes_code() {
        let error = AppError::new(ErrorKind::Network, "offline");
        assert_eq!(error.to_string(), "[NETWORK_ERROR] offline");
    }
}
