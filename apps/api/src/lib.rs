pub mod applications;
pub mod auth;
pub mod client;
pub mod companies;
pub mod config;
pub mod db;
pub mod email;
pub mod errors;
pub mod jobs;
pub mod models;
pub mod notifications;
pub mod reviews;
pub mod routes;
pub mod saved_jobs;
pub mod scraped;
pub mod state;
pub mod storage;
pub mod users;
