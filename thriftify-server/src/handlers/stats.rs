use thriftify_common::advisor::{self, GenerateText};
use thriftify_common::db::{BudgetStore, SpendingLogStore};
use thriftify_common::html::templates::StatsPage;
use thriftify_common::report;

use actix_web::{web, HttpResponse};

use crate::handlers::error::HttpErrorResponse;
use crate::middleware::auth::SessionUser;

pub const NO_BUDGET_SUMMARY: &str = "No budget data available.";
pub const ADVICE_UNAVAILABLE: &str =
    "Savings advice is unavailable right now. Please try again later.";

/// Per-purpose spending for the current budget plus generated advice on where to cut back. The
/// breakdown still renders when advice can't be generated.
pub async fn stats(
    user: SessionUser,
    budget_store: web::Data<dyn BudgetStore>,
    spending_log_store: web::Data<dyn SpendingLogStore>,
    generator: web::Data<dyn GenerateText>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let username = user.username.clone();
    let report = web::block(move || {
        report::generate(budget_store.get_ref(), spending_log_store.get_ref(), &username, None)
    })
    .await??;

    let page = if report.budget.is_none() {
        StatsPage::generate(NO_BUDGET_SUMMARY, &[])
    } else {
        match advisor::savings_advice(generator.get_ref(), &report.purpose_summary).await {
            Ok(advice) => StatsPage::generate(&advice, &report.purpose_summary),
            Err(e) => {
                log::warn!("Savings advice for '{}' failed: {e}", user.username);
                StatsPage::generate(ADVICE_UNAVAILABLE, &report.purpose_summary)
            }
        }
    };

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(page))
}
