use diesel::{dsl, ExpressionMethods, OptionalExtension, QueryDsl, RunQueryDsl};
use std::time::SystemTime;
use uuid::Uuid;

use crate::db::{CredentialStore, DaoError, DbThreadPool};
use crate::models::credential::NewCredential;
use crate::schema::credentials as credential_fields;
use crate::schema::credentials::dsl::credentials;

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

impl CredentialStore for Dao {
    fn create_credential(&self, username: &str, password_hash: &str) -> Result<Uuid, DaoError> {
        let credential_id = Uuid::now_v7();

        let new_credential = NewCredential {
            id: credential_id,
            username,
            password_hash,
            created_timestamp: SystemTime::now(),
        };

        dsl::insert_into(credentials)
            .values(&new_credential)
            .execute(&mut self.db_thread_pool.get()?)?;

        Ok(credential_id)
    }

    fn get_password_hash(&self, username: &str) -> Result<Option<String>, DaoError> {
        Ok(credentials
            .select(credential_fields::password_hash)
            .filter(credential_fields::username.eq(username))
            .get_result::<String>(&mut self.db_thread_pool.get()?)
            .optional()?)
    }

    fn does_user_exist(&self, username: &str) -> Result<bool, DaoError> {
        Ok(dsl::select(dsl::exists(
            credentials.filter(credential_fields::username.eq(username)),
        ))
        .get_result(&mut self.db_thread_pool.get()?)?)
    }
}
