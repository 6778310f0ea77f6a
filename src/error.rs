//! @acp:module "Errors"
//! @acp:summary "Library error type and result alias"
//! @acp:domain cli
//! @acp:layer core

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the case study library.
#[derive(Debug, Error)]
pub enum CaseStudyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("Template error: {0}")]
    Template(#[from] handlebars::RenderError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Column not found in summary: {0}")]
    MissingColumn(String),

    #[error("Sampler failed for {path}: {message}")]
    Sampler { path: PathBuf, message: String },

    #[error("Parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

impl CaseStudyError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn parse(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: msg.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CaseStudyError>;
