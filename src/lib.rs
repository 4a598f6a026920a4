// SPDX-License-Identifier: MIT

//! SeePaw backend: adoption, scheduling, and walk tracking.
//!
//! This crate provides the API the SeePaw mobile client talks to: animal
//! listings, adoption requests, activity scheduling, and live GPS walk
//! sessions that end up in the community feed.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::walk::WalkRegistry;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub walks: WalkRegistry,
}
