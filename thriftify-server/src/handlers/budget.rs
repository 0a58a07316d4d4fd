use thriftify_common::db::{BudgetStore, CredentialStore, DaoError, SpendingLogStore};
use thriftify_common::html::templates::DashboardPage;
use thriftify_common::report;
use thriftify_common::validators;

use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::handlers::error::HttpErrorResponse;
use crate::middleware::auth::SessionUser;

/// Fields arrive as whatever the browser sent, so numbers may be strings.
#[derive(Deserialize)]
pub struct NewBudgetInput {
    pub duration: Option<Value>,
    pub budget: Option<Value>,
    #[serde(rename = "startDate")]
    pub start_date: Option<Value>,
}

#[derive(Deserialize)]
pub struct SpendingInput {
    pub date: Option<Value>,
    pub spent: Option<Value>,
    pub purpose: Option<Value>,
}

#[derive(Deserialize)]
pub struct BudgetQuery {
    pub budget_id: Option<String>,
}

fn require<'a>(value: &'a Option<Value>, field: &str) -> Result<&'a Value, HttpErrorResponse> {
    match value {
        None | Some(Value::Null) => Err(HttpErrorResponse::MissingField(String::from(field))),
        Some(v) => Ok(v),
    }
}

fn require_date(value: &Option<Value>, field: &str) -> Result<NaiveDate, HttpErrorResponse> {
    let value = require(value, field)?;

    value
        .as_str()
        .and_then(validators::parse_date)
        .ok_or_else(|| {
            HttpErrorResponse::IncorrectlyFormed(format!("{field} must be a YYYY-MM-DD date"))
        })
}

/// A session can outlive the credential it was created for.
async fn require_credential(
    credential_store: web::Data<dyn CredentialStore>,
    user: &SessionUser,
) -> Result<(), HttpErrorResponse> {
    let username = user.username.clone();
    if !web::block(move || credential_store.does_user_exist(&username)).await?? {
        return Err(HttpErrorResponse::NotAuthenticated(String::from(
            "User no longer exists",
        )));
    }

    Ok(())
}

pub async fn create(
    user: SessionUser,
    credential_store: web::Data<dyn CredentialStore>,
    budget_store: web::Data<dyn BudgetStore>,
    input: web::Json<NewBudgetInput>,
) -> Result<HttpResponse, HttpErrorResponse> {
    require_credential(credential_store, &user).await?;

    let duration_days = validators::coerce_day_count(require(&input.duration, "duration")?)
        .ok_or_else(|| {
            HttpErrorResponse::IncorrectlyFormed(String::from(
                "duration must be a whole number of days",
            ))
        })?;

    let budget_amount = validators::coerce_number(require(&input.budget, "budget")?)
        .ok_or_else(|| {
            HttpErrorResponse::IncorrectlyFormed(String::from("budget must be a number"))
        })?;

    let start_date = require_date(&input.start_date, "startDate")?;

    let budget = web::block(move || {
        budget_store.create_budget(&user.username, start_date, duration_days, budget_amount)
    })
    .await??;

    log::debug!("Created budget {} for '{}'", budget.id, budget.username);

    Ok(HttpResponse::Ok().json(json!({ "message": "Budget Created Successfully!" })))
}

pub async fn log_spending(
    user: SessionUser,
    credential_store: web::Data<dyn CredentialStore>,
    spending_log_store: web::Data<dyn SpendingLogStore>,
    input: web::Json<SpendingInput>,
) -> Result<HttpResponse, HttpErrorResponse> {
    require_credential(credential_store, &user).await?;

    let spent_date = require_date(&input.date, "date")?;
    let spent_value = require(&input.spent, "spent")?;
    let purpose = validators::coerce_text(require(&input.purpose, "purpose")?).ok_or_else(|| {
        HttpErrorResponse::IncorrectlyFormed(String::from("purpose must be text"))
    })?;

    if purpose.chars().count() > validators::MAX_PURPOSE_LENGTH {
        return Err(HttpErrorResponse::InputTooLarge(format!(
            "purpose can be at most {} characters",
            validators::MAX_PURPOSE_LENGTH,
        )));
    }

    let spent = match validators::coerce_number(spent_value) {
        Some(s) => s,
        None => {
            log::warn!(
                "Non-numeric spending amount {spent_value} from '{}' recorded as 0",
                user.username
            );
            0.0
        }
    };

    web::block(move || {
        spending_log_store.create_entry(&user.username, spent_date, spent, &purpose)
    })
    .await??;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Spending information inputted successfully!"
    })))
}

pub async fn dashboard(
    user: SessionUser,
    budget_store: web::Data<dyn BudgetStore>,
    spending_log_store: web::Data<dyn SpendingLogStore>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let username = user.username.clone();
    let (budget, entries) = web::block(move || -> Result<_, DaoError> {
        let Some(budget) = budget_store.get_current_budget(&username)? else {
            return Ok((None, Vec::new()));
        };

        let entries = spending_log_store.get_entries_between(
            &username,
            budget.start_date,
            budget.end_date(),
        )?;

        Ok((Some(budget), entries))
    })
    .await??;

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(DashboardPage::generate(
            &user.username,
            budget.as_ref(),
            &entries,
        )))
}

pub async fn dashboard_data(
    user: SessionUser,
    budget_store: web::Data<dyn BudgetStore>,
    spending_log_store: web::Data<dyn SpendingLogStore>,
    query: web::Query<BudgetQuery>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let budget_id = match query.budget_id.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(id) => Some(Uuid::parse_str(id).map_err(|_| {
            HttpErrorResponse::IncorrectlyFormed(String::from("budget_id is not a valid id"))
        })?),
    };

    let report = web::block(move || {
        report::generate(
            budget_store.get_ref(),
            spending_log_store.get_ref(),
            &user.username,
            budget_id,
        )
    })
    .await??;

    Ok(HttpResponse::Ok().json(report))
}
