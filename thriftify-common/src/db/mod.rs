use chrono::NaiveDate;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::result::DatabaseErrorKind;
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

use crate::models::budget::Budget;
use crate::models::spending_log::SpendingLogEntry;

pub mod budget;
pub mod credential;
pub mod memory;
pub mod spending_log;

pub type DbThreadPool = diesel::r2d2::Pool<ConnectionManager<PgConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<PgConnection>>;

pub fn create_db_thread_pool(
    database_uri: &str,
    max_db_connections: u32,
    idle_timeout: Duration,
) -> Result<DbThreadPool, DaoError> {
    Ok(r2d2::Pool::builder()
        .max_size(max_db_connections)
        .idle_timeout(Some(idle_timeout))
        .build(ConnectionManager::<PgConnection>::new(database_uri))?)
}

#[derive(Debug)]
pub enum DaoError {
    DbThreadPoolFailure(r2d2::Error),
    QueryFailure(diesel::result::Error),
    AlreadyExists,
    StorePoisoned,
}

impl std::error::Error for DaoError {}

impl fmt::Display for DaoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DaoError::DbThreadPoolFailure(e) => {
                write!(f, "DaoError: Failed to obtain DB connection: {e}")
            }
            DaoError::QueryFailure(e) => {
                write!(f, "DaoError: Query failed: {e}")
            }
            DaoError::AlreadyExists => {
                write!(f, "DaoError: A record with the same key already exists")
            }
            DaoError::StorePoisoned => {
                write!(f, "DaoError: In-memory store lock was poisoned")
            }
        }
    }
}

impl From<r2d2::Error> for DaoError {
    fn from(error: r2d2::Error) -> Self {
        DaoError::DbThreadPoolFailure(error)
    }
}

impl From<diesel::result::Error> for DaoError {
    fn from(error: diesel::result::Error) -> Self {
        match error {
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                DaoError::AlreadyExists
            }
            e => DaoError::QueryFailure(e),
        }
    }
}

pub trait CredentialStore: Send + Sync {
    fn create_credential(&self, username: &str, password_hash: &str) -> Result<Uuid, DaoError>;
    fn get_password_hash(&self, username: &str) -> Result<Option<String>, DaoError>;
    fn does_user_exist(&self, username: &str) -> Result<bool, DaoError>;
}

pub trait BudgetStore: Send + Sync {
    fn create_budget(
        &self,
        username: &str,
        start_date: NaiveDate,
        duration_days: i32,
        budget_amount: f64,
    ) -> Result<Budget, DaoError>;

    fn get_budget(&self, budget_id: Uuid, username: &str) -> Result<Option<Budget>, DaoError>;

    /// The budget with the latest start date, ties going to the most recently created.
    fn get_current_budget(&self, username: &str) -> Result<Option<Budget>, DaoError>;

    /// All of the user's budgets in creation order.
    fn get_all_budgets(&self, username: &str) -> Result<Vec<Budget>, DaoError>;
}

pub trait SpendingLogStore: Send + Sync {
    fn create_entry(
        &self,
        username: &str,
        spent_date: NaiveDate,
        spent: f64,
        purpose: &str,
    ) -> Result<SpendingLogEntry, DaoError>;

    /// Entries dated within `[start, end]` (inclusive), oldest first.
    fn get_entries_between(
        &self,
        username: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SpendingLogEntry>, DaoError>;
}
