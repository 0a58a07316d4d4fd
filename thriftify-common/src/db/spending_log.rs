use chrono::NaiveDate;
use diesel::{dsl, ExpressionMethods, QueryDsl, RunQueryDsl};
use std::time::SystemTime;
use uuid::Uuid;

use crate::db::{DaoError, DbThreadPool, SpendingLogStore};
use crate::models::spending_log::{NewSpendingLogEntry, SpendingLogEntry};
use crate::schema::spending_logs as spending_log_fields;
use crate::schema::spending_logs::dsl::spending_logs;

pub struct Dao {
    db_thread_pool: DbThreadPool,
}

impl Dao {
    pub fn new(db_thread_pool: &DbThreadPool) -> Self {
        Self {
            db_thread_pool: db_thread_pool.clone(),
        }
    }
}

impl SpendingLogStore for Dao {
    fn create_entry(
        &self,
        username: &str,
        spent_date: NaiveDate,
        spent: f64,
        purpose: &str,
    ) -> Result<SpendingLogEntry, DaoError> {
        let new_entry = NewSpendingLogEntry {
            id: Uuid::now_v7(),
            username,
            spent_date,
            spent,
            purpose,
            created_timestamp: SystemTime::now(),
        };

        Ok(dsl::insert_into(spending_logs)
            .values(&new_entry)
            .get_result::<SpendingLogEntry>(&mut self.db_thread_pool.get()?)?)
    }

    fn get_entries_between(
        &self,
        username: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SpendingLogEntry>, DaoError> {
        Ok(spending_logs
            .filter(spending_log_fields::username.eq(username))
            .filter(spending_log_fields::spent_date.between(start, end))
            .order((
                spending_log_fields::spent_date.asc(),
                spending_log_fields::created_timestamp.asc(),
            ))
            .load::<SpendingLogEntry>(&mut self.db_thread_pool.get()?)?)
    }
}
