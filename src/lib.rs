#![doc = "The `taskboard` library crate."]
#![doc = ""]
#![doc = "This crate contains the domain models, authentication and authorization"]
#![doc = "machinery, routing configuration, and error handling for the taskboard"]
#![doc = "API. The main binary (`main.rs`) uses it to construct and run the server."]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;

pub use crate::error::AppError;
