pub mod budget;
pub mod credential;
pub mod spending_log;
