use chrono::NaiveDate;
use diesel::{Insertable, Queryable};
use serde::Serialize;
use std::time::SystemTime;
use uuid::Uuid;

use crate::schema::spending_logs;

#[derive(Clone, Debug, PartialEq, Serialize, Identifiable, Queryable)]
#[diesel(table_name = spending_logs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SpendingLogEntry {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub username: String,
    #[serde(rename = "date")]
    pub spent_date: NaiveDate,
    pub spent: f64,
    pub purpose: String,
    #[serde(skip)]
    pub created_timestamp: SystemTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = spending_logs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewSpendingLogEntry<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub spent_date: NaiveDate,
    pub spent: f64,
    pub purpose: &'a str,
    pub created_timestamp: SystemTime,
}
