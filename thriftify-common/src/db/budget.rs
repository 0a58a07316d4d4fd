use chrono::NaiveDate;
use diesel::{dsl, ExpressionMethods, OptionalExtension, QueryDsl, RunQueryDsl};
use std::time::SystemTime;
use uuid::Uuid;

use crate::db::{BudgetStore, DaoError, DbThreadPool};
use crate::models::budget::{Budget, NewBudget};
use crate::schema::budgets as budget_fields;
use crate::schema::budgets::dsl::budgets;

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

impl BudgetStore for Dao {
    fn create_budget(
        &self,
        username: &str,
        start_date: NaiveDate,
        duration_days: i32,
        budget_amount: f64,
    ) -> Result<Budget, DaoError> {
        let new_budget = NewBudget {
            id: Uuid::now_v7(),
            username,
            start_date,
            duration_days,
            budget_amount,
            created_timestamp: SystemTime::now(),
        };

        Ok(dsl::insert_into(budgets)
            .values(&new_budget)
            .get_result::<Budget>(&mut self.db_thread_pool.get()?)?)
    }

    fn get_budget(&self, budget_id: Uuid, username: &str) -> Result<Option<Budget>, DaoError> {
        Ok(budgets
            .find(budget_id)
            .filter(budget_fields::username.eq(username))
            .get_result::<Budget>(&mut self.db_thread_pool.get()?)
            .optional()?)
    }

    fn get_current_budget(&self, username: &str) -> Result<Option<Budget>, DaoError> {
        Ok(budgets
            .filter(budget_fields::username.eq(username))
            .order((
                budget_fields::start_date.desc(),
                budget_fields::created_timestamp.desc(),
            ))
            .first::<Budget>(&mut self.db_thread_pool.get()?)
            .optional()?)
    }

    fn get_all_budgets(&self, username: &str) -> Result<Vec<Budget>, DaoError> {
        Ok(budgets
            .filter(budget_fields::username.eq(username))
            .order(budget_fields::created_timestamp.asc())
            .load::<Budget>(&mut self.db_thread_pool.get()?)?)
    }
}
