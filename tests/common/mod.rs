// SPDX-License-Identifier: MIT

use seepaw_api::config::Config;
use seepaw_api::db::FirestoreDb;
use seepaw_api::middleware::auth::{create_jwt, Role};
use seepaw_api::routes::create_router;
use seepaw_api::services::walk::WalkRegistry;
use seepaw_api::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let db = test_db_offline();
    let walks = WalkRegistry::new();

    let state = Arc::new(AppState { config, db, walks });

    (create_router(state.clone()), state)
}

/// Create a signed session token for the test app's signing key.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str, role: Role) -> String {
    let config = Config::test_default();
    create_jwt(user_id, role, &config.jwt_signing_key).expect("Failed to sign test JWT")
}
