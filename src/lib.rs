pub mod auth;
pub mod dao;
pub mod database;
pub mod errors;
pub mod fixtures;
pub mod forms;
pub mod model;
pub mod observability;
pub mod password;
pub mod routes;
pub mod settings;
pub mod startup;
pub mod templates;
pub mod urls;
