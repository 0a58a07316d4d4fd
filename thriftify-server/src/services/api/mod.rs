use actix_web::web::*;

use crate::handlers::{budget, health};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(resource("/createBudget").route(post().to(budget::create)))
        .service(resource("/spendingBudget").route(post().to(budget::log_spending)))
        .service(resource("/dashboardData").route(get().to(budget::dashboard_data)))
        .service(resource("/heartbeat").route(get().to(health::heartbeat)));
}
