#![cfg(not(doctest))]

#[macro_use]
extern crate diesel;

pub mod advisor;
pub mod catalog;
pub mod db;
pub mod html;
pub mod illustrator;
pub mod models;
pub mod report;
pub mod schema;
pub mod session;
pub mod threadrand;
pub mod token;
pub mod validators;
