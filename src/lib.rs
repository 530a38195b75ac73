pub mod cache;
pub mod config;
pub mod database;
pub mod errors;
pub mod logger;
pub mod title;
pub mod webserver;
