pub mod api;
pub mod app;
pub mod cache;
pub mod config;
pub mod events;
pub mod logging;
pub mod models;
pub mod session;
pub mod ui;

#[cfg(test)]
mod testserver;
