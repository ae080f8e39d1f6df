//! Intake: turning validated form candidates into persisted entities.
//!
//! Every operation validates first and writes nothing when validation fails.

mod customers;
mod menus;
mod staging;
mod visits;

pub use staging::*;

use thiserror::Error;

use crate::db::{Database, DbError};
use crate::util::CodeError;
use crate::validation::ValidationError;

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Database error: {0}")]
    Db(#[from] DbError),

    #[error(transparent)]
    Code(#[from] CodeError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Customer code already in use: {0}")]
    DuplicateCode(String),

    #[error("At most {max} photos per form")]
    StagingFull { max: usize },
}

pub type IntakeResult<T> = Result<T, IntakeError>;

/// Write-side operations over one database.
pub struct Intake<'a> {
    db: &'a Database,
}

impl<'a> Intake<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }
}

/// Trimmed text, `None` when blank.
pub(crate) fn clean(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}
