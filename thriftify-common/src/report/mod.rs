//! Joins a user's spending log against a budget window.
//!
//! Entries are attributed to a budget purely by date: anything dated inside
//! `[start_date, start_date + duration_days]` counts toward it, so an entry may belong to
//! several overlapping budgets or to none.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

use crate::db::{BudgetStore, DaoError, SpendingLogStore};
use crate::models::budget::Budget;
use crate::models::spending_log::SpendingLogEntry;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BudgetEcho {
    pub duration: i32,
    pub budget: f64,
}

impl From<&Budget> for BudgetEcho {
    fn from(budget: &Budget) -> Self {
        Self {
            duration: budget.duration_days,
            budget: budget.budget_amount,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DaySpending {
    pub day: i64,
    pub amount: f64,
    pub purpose: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PurposeTotal {
    pub purpose: String,
    pub spent: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetReport {
    pub budget: Option<BudgetEcho>,
    pub spending: Vec<DaySpending>,
    #[serde(skip)]
    pub purpose_summary: Vec<PurposeTotal>,
    pub all_budgets: Vec<Budget>,
}

impl BudgetReport {
    pub fn total_spent(&self) -> f64 {
        self.purpose_summary.iter().map(|p| p.spent).sum()
    }
}

#[derive(Debug)]
pub enum ReportError {
    BudgetNotFound,
    Store(DaoError),
}

impl std::error::Error for ReportError {}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::BudgetNotFound => write!(f, "ReportError: Budget not found"),
            ReportError::Store(e) => write!(f, "ReportError: {e}"),
        }
    }
}

impl From<DaoError> for ReportError {
    fn from(error: DaoError) -> Self {
        ReportError::Store(error)
    }
}

/// Entries inside the budget's window as day offsets from its start. Input order is kept.
pub fn day_series(budget: &Budget, entries: &[SpendingLogEntry]) -> Vec<DaySpending> {
    entries
        .iter()
        .filter_map(|entry| {
            budget.day_offset(entry.spent_date).map(|day| DaySpending {
                day,
                amount: entry.spent,
                purpose: entry.purpose.clone(),
            })
        })
        .collect()
}

/// Totals of `spent` per purpose across the entries inside the budget's window, listed in the
/// order each purpose first appears. Non-finite amounts count as zero.
pub fn purpose_summary(budget: &Budget, entries: &[SpendingLogEntry]) -> Vec<PurposeTotal> {
    let mut totals: Vec<PurposeTotal> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for entry in entries.iter().filter(|e| budget.contains(e.spent_date)) {
        let spent = if entry.spent.is_finite() {
            entry.spent
        } else {
            0.0
        };

        match positions.get(entry.purpose.as_str()) {
            Some(&i) => totals[i].spent += spent,
            None => {
                positions.insert(entry.purpose.as_str(), totals.len());
                totals.push(PurposeTotal {
                    purpose: entry.purpose.clone(),
                    spent,
                });
            }
        }
    }

    totals
}

/// Renders a summary as `"purpose: amount purpose: amount"` for use in a prompt.
pub fn summary_text(summary: &[PurposeTotal]) -> String {
    summary
        .iter()
        .map(|p| format!("{}: {}", p.purpose, p.spent))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn build_report(
    budget: Option<&Budget>,
    entries: &[SpendingLogEntry],
    all_budgets: Vec<Budget>,
) -> BudgetReport {
    let Some(budget) = budget else {
        return BudgetReport {
            all_budgets,
            ..Default::default()
        };
    };

    BudgetReport {
        budget: Some(BudgetEcho::from(budget)),
        spending: day_series(budget, entries),
        purpose_summary: purpose_summary(budget, entries),
        all_budgets,
    }
}

/// Loads the selected budget (or the user's current one when `budget_id` is `None`) and its
/// window's entries, then aggregates them. A user without budgets gets an empty report.
pub fn generate(
    budget_store: &dyn BudgetStore,
    spending_log_store: &dyn SpendingLogStore,
    username: &str,
    budget_id: Option<Uuid>,
) -> Result<BudgetReport, ReportError> {
    let budget = match budget_id {
        Some(id) => Some(
            budget_store
                .get_budget(id, username)?
                .ok_or(ReportError::BudgetNotFound)?,
        ),
        None => budget_store.get_current_budget(username)?,
    };

    let all_budgets = budget_store.get_all_budgets(username)?;

    let Some(budget) = budget else {
        return Ok(build_report(None, &[], all_budgets));
    };

    let entries =
        spending_log_store.get_entries_between(username, budget.start_date, budget.end_date())?;

    Ok(build_report(Some(&budget), &entries, all_budgets))
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use std::time::SystemTime;

    use crate::db::memory::InMemoryStore;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn budget(start: &str, duration_days: i32, amount: f64) -> Budget {
        Budget {
            id: Uuid::now_v7(),
            username: String::from("alice"),
            start_date: date(start),
            duration_days,
            budget_amount: amount,
            created_timestamp: SystemTime::now(),
        }
    }

    fn entry(on: &str, spent: f64, purpose: &str) -> SpendingLogEntry {
        SpendingLogEntry {
            id: Uuid::now_v7(),
            username: String::from("alice"),
            spent_date: date(on),
            spent,
            purpose: String::from(purpose),
            created_timestamp: SystemTime::now(),
        }
    }

    #[test]
    fn test_day_series_offsets_and_window_filter() {
        let budget = budget("2024-01-01", 30, 500.0);
        let entries = vec![
            entry("2023-12-01", 99.0, "before"),
            entry("2024-01-01", 5.0, "coffee"),
            entry("2024-01-05", 50.0, "food"),
            entry("2024-01-31", 7.5, "bus"),
            entry("2024-02-01", 99.0, "after"),
        ];

        let series = day_series(&budget, &entries);

        assert_eq!(
            series,
            vec![
                DaySpending {
                    day: 0,
                    amount: 5.0,
                    purpose: String::from("coffee"),
                },
                DaySpending {
                    day: 4,
                    amount: 50.0,
                    purpose: String::from("food"),
                },
                DaySpending {
                    day: 30,
                    amount: 7.5,
                    purpose: String::from("bus"),
                },
            ]
        );

        for point in &series {
            assert!(point.day >= 0 && point.day <= i64::from(budget.duration_days));
        }
    }

    #[test]
    fn test_purpose_summary_groups_in_first_seen_order() {
        let budget = budget("2024-01-01", 30, 500.0);
        let entries = vec![
            entry("2024-01-02", 20.0, "food"),
            entry("2024-01-03", 100.0, "rent"),
            entry("2024-01-04", 15.5, "food"),
            entry("2024-03-01", 1000.0, "food"),
            entry("2024-01-06", f64::NAN, "rent"),
        ];

        let summary = purpose_summary(&budget, &entries);

        assert_eq!(
            summary,
            vec![
                PurposeTotal {
                    purpose: String::from("food"),
                    spent: 35.5,
                },
                PurposeTotal {
                    purpose: String::from("rent"),
                    spent: 100.0,
                },
            ]
        );
        assert_eq!(summary_text(&summary), "food: 35.5 rent: 100");
    }

    #[test]
    fn test_summary_total_matches_day_series() {
        let budget = budget("2024-01-01", 10, 500.0);
        let entries = vec![
            entry("2023-12-31", 3.0, "a"),
            entry("2024-01-01", 4.0, "a"),
            entry("2024-01-02", 6.0, "b"),
            entry("2024-01-11", 8.0, "c"),
            entry("2024-01-12", 9.0, "c"),
        ];

        let report = build_report(Some(&budget), &entries, vec![budget.clone()]);
        let series_total: f64 = report.spending.iter().map(|d| d.amount).sum();

        assert_eq!(report.total_spent(), series_total);
        assert_eq!(series_total, 18.0);
    }

    #[test]
    fn test_build_report_without_budget_is_empty() {
        let report = build_report(None, &[entry("2024-01-01", 1.0, "x")], Vec::new());

        assert_eq!(report, BudgetReport::default());

        let json = serde_json::to_value(&report).unwrap();
        assert!(json["budget"].is_null());
        assert_eq!(json["spending"], serde_json::json!([]));
        assert_eq!(json["allBudgets"], serde_json::json!([]));
        assert!(json.get("purposeSummary").is_none());
    }

    #[test]
    fn test_generate_uses_current_budget() {
        let store = InMemoryStore::new();

        store
            .create_budget("alice", date("2023-06-01"), 30, 100.0)
            .unwrap();
        store
            .create_budget("alice", date("2024-01-01"), 30, 500.0)
            .unwrap();
        store
            .create_entry("alice", date("2024-01-05"), 50.0, "food")
            .unwrap();
        store
            .create_entry("alice", date("2023-12-01"), 70.0, "food")
            .unwrap();
        store
            .create_entry("bob", date("2024-01-05"), 80.0, "food")
            .unwrap();

        let report = generate(&store, &store, "alice", None).unwrap();

        assert_eq!(
            report.budget,
            Some(BudgetEcho {
                duration: 30,
                budget: 500.0,
            })
        );
        assert_eq!(
            report.spending,
            vec![DaySpending {
                day: 4,
                amount: 50.0,
                purpose: String::from("food"),
            }]
        );
        assert_eq!(report.all_budgets.len(), 2);
    }

    #[test]
    fn test_generate_with_explicit_budget() {
        let store = InMemoryStore::new();

        let old = store
            .create_budget("alice", date("2023-12-01"), 5, 100.0)
            .unwrap();
        store
            .create_budget("alice", date("2024-01-01"), 30, 500.0)
            .unwrap();
        store
            .create_entry("alice", date("2023-12-03"), 12.0, "gift")
            .unwrap();

        let report = generate(&store, &store, "alice", Some(old.id)).unwrap();

        assert_eq!(report.budget.unwrap().duration, 5);
        assert_eq!(report.spending.len(), 1);
        assert_eq!(report.spending[0].day, 2);
    }

    #[test]
    fn test_entry_counts_toward_overlapping_budgets() {
        let store = InMemoryStore::new();

        let first = store
            .create_budget("alice", date("2024-01-01"), 30, 500.0)
            .unwrap();
        let second = store
            .create_budget("alice", date("2024-01-10"), 30, 300.0)
            .unwrap();
        store
            .create_entry("alice", date("2024-01-15"), 40.0, "fuel")
            .unwrap();

        let report = generate(&store, &store, "alice", Some(first.id)).unwrap();
        assert_eq!(
            report.spending,
            vec![DaySpending {
                day: 14,
                amount: 40.0,
                purpose: String::from("fuel"),
            }]
        );
        assert_eq!(report.total_spent(), 40.0);

        let report = generate(&store, &store, "alice", Some(second.id)).unwrap();
        assert_eq!(
            report.spending,
            vec![DaySpending {
                day: 5,
                amount: 40.0,
                purpose: String::from("fuel"),
            }]
        );
        assert_eq!(report.total_spent(), 40.0);

        let current = generate(&store, &store, "alice", None).unwrap();
        assert_eq!(current.budget.unwrap().budget, 300.0);
        assert_eq!(current.spending[0].day, 5);
    }

    #[test]
    fn test_generate_rejects_foreign_budget() {
        let store = InMemoryStore::new();

        let bobs = store
            .create_budget("bob", date("2024-01-01"), 30, 500.0)
            .unwrap();

        assert!(matches!(
            generate(&store, &store, "alice", Some(bobs.id)),
            Err(ReportError::BudgetNotFound)
        ));
    }

    #[test]
    fn test_generate_without_budgets() {
        let store = InMemoryStore::new();

        let report = generate(&store, &store, "alice", None).unwrap();

        assert!(report.budget.is_none());
        assert!(report.spending.is_empty());
        assert!(report.all_budgets.is_empty());
    }
}
