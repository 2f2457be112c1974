//! AquaClean water tank cleaning service.
//!
//! The library backs three programs: the REST API server (`main.rs`), the
//! notification worker (`bin/worker.rs`) and client applications, which use
//! [`client`] to drive bookings and field jobs against the API.

pub mod app_state;
pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
