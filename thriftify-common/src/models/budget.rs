use chrono::{Days, NaiveDate};
use diesel::{Insertable, Queryable};
use serde::Serialize;
use std::time::SystemTime;
use uuid::Uuid;

use crate::schema::budgets;

/// A spending limit over the inclusive window `[start_date, start_date + duration_days]`.
///
/// The serialized field names are the ones the dashboard script reads from `allBudgets`.
#[derive(Clone, Debug, PartialEq, Serialize, Identifiable, Queryable)]
#[diesel(table_name = budgets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Budget {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub username: String,
    pub start_date: NaiveDate,
    #[serde(rename = "duration")]
    pub duration_days: i32,
    #[serde(rename = "budget")]
    pub budget_amount: f64,
    #[serde(skip)]
    pub created_timestamp: SystemTime,
}

impl Budget {
    /// Last day covered by the window. Saturates at the calendar's end.
    pub fn end_date(&self) -> NaiveDate {
        let days = u64::try_from(self.duration_days).unwrap_or(0);
        self.start_date
            .checked_add_days(Days::new(days))
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date()
    }

    /// Whole days between the window start and `date`, if `date` is inside the window.
    pub fn day_offset(&self, date: NaiveDate) -> Option<i64> {
        if !self.contains(date) {
            return None;
        }

        Some((date - self.start_date).num_days())
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = budgets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewBudget<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub start_date: NaiveDate,
    pub duration_days: i32,
    pub budget_amount: f64,
    pub created_timestamp: SystemTime,
}
