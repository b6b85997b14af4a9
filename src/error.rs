use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

pub type DashboardResult<T> = Result<T, DashboardError>;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("could not load {}: {message}", .path.display())]
    FileLoad { path: PathBuf, message: String },

    #[error("invalid answer for {question}: {value:?}")]
    InvalidCategoryValue { question: &'static str, value: String },

    #[error("answer for {question} must be between {min} and {max}, got {value}")]
    ValueOutOfRange {
        question: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DashboardError {
    pub fn file_load(path: &Path, message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "dashboard::loader", path = %path.display(), %message, "data file rejected");
        DashboardError::FileLoad {
            path: path.to_path_buf(),
            message,
        }
    }

    pub fn invalid_category(question: &'static str, value: impl Into<String>) -> Self {
        let value = value.into();
        warn!(target: "dashboard::answers", question, %value, "unknown answer label");
        DashboardError::InvalidCategoryValue { question, value }
    }

    #[cfg(test)]
    pub(crate) fn is_file_load(&self) -> bool {
        matches!(self, DashboardError::FileLoad { .. })
    }
}
