use chrono::NaiveDate;
use std::sync::{Mutex, MutexGuard};
use std::time::SystemTime;
use uuid::Uuid;

use crate::db::{BudgetStore, CredentialStore, DaoError, SpendingLogStore};
use crate::models::budget::Budget;
use crate::models::credential::Credential;
use crate::models::spending_log::SpendingLogEntry;

/// Process-local store backing all three collections. Used when no database is configured
/// and by the handler tests.
#[derive(Default)]
pub struct InMemoryStore {
    credentials: Mutex<Vec<Credential>>,
    budgets: Mutex<Vec<Budget>>,
    spending_logs: Mutex<Vec<SpendingLogEntry>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, DaoError> {
    mutex.lock().map_err(|_| DaoError::StorePoisoned)
}

impl CredentialStore for InMemoryStore {
    fn create_credential(&self, username: &str, password_hash: &str) -> Result<Uuid, DaoError> {
        let mut credentials = lock(&self.credentials)?;

        if credentials.iter().any(|c| c.username == username) {
            return Err(DaoError::AlreadyExists);
        }

        let credential_id = Uuid::now_v7();
        credentials.push(Credential {
            id: credential_id,
            username: String::from(username),
            password_hash: String::from(password_hash),
            created_timestamp: SystemTime::now(),
        });

        Ok(credential_id)
    }

    fn get_password_hash(&self, username: &str) -> Result<Option<String>, DaoError> {
        Ok(lock(&self.credentials)?
            .iter()
            .find(|c| c.username == username)
            .map(|c| c.password_hash.clone()))
    }

    fn does_user_exist(&self, username: &str) -> Result<bool, DaoError> {
        Ok(lock(&self.credentials)?
            .iter()
            .any(|c| c.username == username))
    }
}

impl BudgetStore for InMemoryStore {
    fn create_budget(
        &self,
        username: &str,
        start_date: NaiveDate,
        duration_days: i32,
        budget_amount: f64,
    ) -> Result<Budget, DaoError> {
        let budget = Budget {
            id: Uuid::now_v7(),
            username: String::from(username),
            start_date,
            duration_days,
            budget_amount,
            created_timestamp: SystemTime::now(),
        };

        lock(&self.budgets)?.push(budget.clone());

        Ok(budget)
    }

    fn get_budget(&self, budget_id: Uuid, username: &str) -> Result<Option<Budget>, DaoError> {
        Ok(lock(&self.budgets)?
            .iter()
            .find(|b| b.id == budget_id && b.username == username)
            .cloned())
    }

    fn get_current_budget(&self, username: &str) -> Result<Option<Budget>, DaoError> {
        // Budgets are appended in creation order, so `max_by_key` picking the last maximum
        // resolves start-date ties in favor of the newest budget
        Ok(lock(&self.budgets)?
            .iter()
            .filter(|b| b.username == username)
            .max_by_key(|b| b.start_date)
            .cloned())
    }

    fn get_all_budgets(&self, username: &str) -> Result<Vec<Budget>, DaoError> {
        Ok(lock(&self.budgets)?
            .iter()
            .filter(|b| b.username == username)
            .cloned()
            .collect())
    }
}

impl SpendingLogStore for InMemoryStore {
    fn create_entry(
        &self,
        username: &str,
        spent_date: NaiveDate,
        spent: f64,
        purpose: &str,
    ) -> Result<SpendingLogEntry, DaoError> {
        let entry = SpendingLogEntry {
            id: Uuid::now_v7(),
            username: String::from(username),
            spent_date,
            spent,
            purpose: String::from(purpose),
            created_timestamp: SystemTime::now(),
        };

        lock(&self.spending_logs)?.push(entry.clone());

        Ok(entry)
    }

    fn get_entries_between(
        &self,
        username: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SpendingLogEntry>, DaoError> {
        let mut entries = lock(&self.spending_logs)?
            .iter()
            .filter(|e| e.username == username && e.spent_date >= start && e.spent_date <= end)
            .cloned()
            .collect::<Vec<_>>();

        // Stable sort keeps same-day entries in creation order
        entries.sort_by_key(|e| e.spent_date);

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_create_credential_rejects_duplicate_username() {
        let store = InMemoryStore::new();

        store.create_credential("alice", "hash-one").unwrap();
        assert!(matches!(
            store.create_credential("alice", "hash-two"),
            Err(DaoError::AlreadyExists)
        ));

        assert_eq!(
            store.get_password_hash("alice").unwrap().as_deref(),
            Some("hash-one")
        );
        assert!(store.does_user_exist("alice").unwrap());
        assert!(!store.does_user_exist("bob").unwrap());
        assert!(store.get_password_hash("bob").unwrap().is_none());
    }

    #[test]
    fn test_current_budget_uses_latest_start_date() {
        let store = InMemoryStore::new();

        let later = store
            .create_budget("alice", date("2024-03-01"), 30, 300.0)
            .unwrap();
        store
            .create_budget("alice", date("2024-01-01"), 30, 100.0)
            .unwrap();
        store
            .create_budget("bob", date("2025-01-01"), 30, 100.0)
            .unwrap();

        assert_eq!(store.get_current_budget("alice").unwrap(), Some(later));
        assert!(store.get_current_budget("carol").unwrap().is_none());
    }

    #[test]
    fn test_current_budget_tie_goes_to_newest() {
        let store = InMemoryStore::new();

        store
            .create_budget("alice", date("2024-03-01"), 30, 300.0)
            .unwrap();
        let newest = store
            .create_budget("alice", date("2024-03-01"), 10, 50.0)
            .unwrap();

        assert_eq!(store.get_current_budget("alice").unwrap(), Some(newest));
    }

    #[test]
    fn test_get_budget_is_scoped_to_user() {
        let store = InMemoryStore::new();

        let budget = store
            .create_budget("alice", date("2024-03-01"), 30, 300.0)
            .unwrap();

        assert!(store.get_budget(budget.id, "alice").unwrap().is_some());
        assert!(store.get_budget(budget.id, "mallory").unwrap().is_none());
        assert!(store.get_budget(Uuid::now_v7(), "alice").unwrap().is_none());
    }

    #[test]
    fn test_get_all_budgets_in_creation_order() {
        let store = InMemoryStore::new();

        let first = store
            .create_budget("alice", date("2024-05-01"), 30, 1.0)
            .unwrap();
        let second = store
            .create_budget("alice", date("2024-01-01"), 30, 2.0)
            .unwrap();

        assert_eq!(store.get_all_budgets("alice").unwrap(), vec![first, second]);
        assert!(store.get_all_budgets("bob").unwrap().is_empty());
    }

    #[test]
    fn test_entries_between_is_inclusive_and_sorted() {
        let store = InMemoryStore::new();

        store
            .create_entry("alice", date("2024-01-10"), 10.0, "late")
            .unwrap();
        store
            .create_entry("alice", date("2024-01-01"), 20.0, "start")
            .unwrap();
        store
            .create_entry("alice", date("2024-01-31"), 30.0, "end")
            .unwrap();
        store
            .create_entry("alice", date("2023-12-31"), 40.0, "before")
            .unwrap();
        store
            .create_entry("bob", date("2024-01-05"), 50.0, "other user")
            .unwrap();

        let entries = store
            .get_entries_between("alice", date("2024-01-01"), date("2024-01-31"))
            .unwrap();

        let purposes = entries.iter().map(|e| e.purpose.as_str()).collect::<Vec<_>>();
        assert_eq!(purposes, vec!["start", "late", "end"]);
    }
}
