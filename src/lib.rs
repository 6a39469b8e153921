pub mod ai;
pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod store;

#[cfg(test)]
pub mod testing;
