//! User-facing status after an action completes

use crate::article::Article;
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Notice {
        Notice::Success(message.into())
    }

    /// Outcome of a single-URL save.
    pub fn saved(url: &str, result: &Result<Vec<Article>, AppError>) -> Notice {
        match result {
            Ok(_) => Notice::success(format!("Successfully saved: {url}")),
            Err(err) => Notice::from(err),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Notice::Success(msg) | Notice::Error(msg) => msg,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }
}

impl From<&AppError> for Notice {
    fn from(err: &AppError) -> Notice {
        Notice::Error(err.user_message())
    }
}
