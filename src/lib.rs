pub mod client;
pub mod config;
pub mod dto;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod poller;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
