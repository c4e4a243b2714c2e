pub mod alerts;
pub mod auth;
pub mod config;
pub mod diary;
pub mod directory;
pub mod error;
pub mod integrations;
pub mod prior_auth;
pub mod store;
pub mod telemetry;
pub mod trends;
