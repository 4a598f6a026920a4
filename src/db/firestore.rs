// SPDX-License-Identifier: MIT

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profile storage)
//! - Animals (shelter listings)
//! - Walks (finished walk records + stats aggregates)
//! - Activities (pickup/delivery bookings)
//! - Adoption requests

use crate::db::collections;
use crate::error::AppError;
use crate::models::{
    Animal, AnimalStatus, AdoptionRequest, RequestStatus, ScheduledActivity, User, UserStats, Walk,
};
use crate::services::schedule::{BookedDates, ScheduleError};
use crate::time_utils::parse_iso_date;

/// Soft cap for unpaginated per-animal queries (bookings are short lists).
const ACTIVITY_QUERY_LIMIT: u32 = 200;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // Use ExternalJwtFunctionSource to provide a dummy token without needing
        // a custom TokenSource implementation struct.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by ID.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a user.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.user_id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Animal Operations ───────────────────────────────────────

    /// Get an animal by ID.
    pub async fn get_animal(&self, animal_id: &str) -> Result<Option<Animal>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::ANIMALS)
            .obj()
            .one(animal_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List animals with a given status, newest first.
    pub async fn list_animals(
        &self,
        status: AnimalStatus,
        limit: u32,
    ) -> Result<Vec<Animal>, AppError> {
        let status_value = status.as_str();

        self.get_client()?
            .fluent()
            .select()
            .from(collections::ANIMALS)
            .filter(move |q| q.field("status").eq(status_value))
            .order_by([(
                "created_at",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update an animal listing.
    pub async fn upsert_animal(&self, animal: &Animal) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::ANIMALS)
            .document_id(&animal.animal_id)
            .object(animal)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Walk Operations ─────────────────────────────────────────

    /// Get a walk record by ID.
    pub async fn get_walk(&self, walk_id: &str) -> Result<Option<Walk>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::WALKS)
            .obj()
            .one(walk_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get walks for a user, newest first, with cursor pagination.
    ///
    /// `before` is an exclusive `recorded_at` upper bound (RFC3339) taken
    /// from the last item of the previous page.
    pub async fn get_walks_for_user(
        &self,
        user_id: &str,
        before: Option<String>,
        limit: u32,
    ) -> Result<Vec<Walk>, AppError> {
        let user_id = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::WALKS)
            .filter(move |q| {
                let mut conditions = vec![q.field("user_id").eq(user_id.clone())];
                if let Some(cursor) = &before {
                    conditions.push(q.field("recorded_at").less_than(cursor.clone()));
                }
                q.for_all(conditions)
            })
            .order_by([(
                "recorded_at",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get public walks for the community feed, newest first, with cursor
    /// pagination (same cursor scheme as user walks).
    pub async fn get_public_walks(
        &self,
        before: Option<String>,
        limit: u32,
    ) -> Result<Vec<Walk>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::WALKS)
            .filter(move |q| {
                let mut conditions = vec![q.field("is_public").eq(true)];
                if let Some(cursor) = &before {
                    conditions.push(q.field("recorded_at").less_than(cursor.clone()));
                }
                q.for_all(conditions)
            })
            .order_by([(
                "recorded_at",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get public walks recorded at or after `since` (RFC3339), for rankings.
    pub async fn get_public_walks_since(
        &self,
        since: String,
        limit: u32,
    ) -> Result<Vec<Walk>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::WALKS)
            .filter(move |q| {
                q.for_all([
                    q.field("is_public").eq(true),
                    q.field("recorded_at").greater_than_or_equal(since.clone()),
                ])
            })
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── User Stats Operations ──────────────────────────────────

    /// Get user walk-stats aggregate document.
    pub async fn get_user_stats(&self, user_id: &str) -> Result<Option<UserStats>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USER_STATS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Atomic Walk Recording ──────────────────────────────────

    /// Atomically record a walk and update the user stats aggregate.
    ///
    /// Uses a Firestore transaction so both writes succeed or fail together.
    /// If another request modifies the user stats concurrently, Firestore
    /// retries with fresh data, preventing lost updates.
    ///
    /// Returns `true` if the walk was newly recorded, `false` if it was
    /// already recorded (idempotent duplicate).
    pub async fn record_walk_atomic(&self, walk: &Walk) -> Result<bool, AppError> {
        let user_id = walk.user_id.clone();
        let now = chrono::Utc::now().to_rfc3339();

        let mut transaction = self
            .get_client()?
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        // 1. Read current user stats; this registers the document for
        //    conflict detection
        let current_stats: Option<UserStats> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USER_STATS)
            .obj()
            .one(&user_id)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read stats in transaction: {}", e))
            })?;

        let mut stats = current_stats.unwrap_or_default();

        // 2. Idempotency: if already recorded, skip all writes
        if !stats.update_from_walk(walk, &now) {
            tracing::debug!(
                user_id = %user_id,
                walk_id = %walk.walk_id,
                "Walk already recorded (idempotent skip)"
            );
            let _ = transaction.rollback().await;
            return Ok(false);
        }

        // 3. Add walk write to transaction
        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::WALKS)
            .document_id(&walk.walk_id)
            .object(walk)
            .add_to_transaction(&mut transaction)
            .map_err(|e| AppError::Database(format!("Failed to add walk to transaction: {}", e)))?;

        // 4. Add stats write to transaction
        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::USER_STATS)
            .document_id(&user_id)
            .object(&stats)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add stats to transaction: {}", e))
            })?;

        // 5. Commit atomically
        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::info!(
            user_id = %user_id,
            walk_id = %walk.walk_id,
            distance_meters = walk.distance_meters,
            "Walk recorded atomically"
        );

        Ok(true)
    }

    // ─── Activity Operations ─────────────────────────────────────

    /// Get all committed activities for one animal.
    pub async fn get_activities_for_animal(
        &self,
        animal_id: &str,
    ) -> Result<Vec<ScheduledActivity>, AppError> {
        let animal_id = animal_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::ACTIVITIES)
            .filter(move |q| q.field("animal_id").eq(animal_id.clone()))
            .order_by([(
                "start_date",
                firestore::FirestoreQueryDirection::Ascending,
            )])
            .limit(ACTIVITY_QUERY_LIMIT)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get all committed activities for one user.
    pub async fn get_activities_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<ScheduledActivity>, AppError> {
        let user_id = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::ACTIVITIES)
            .filter(move |q| q.field("user_id").eq(user_id.clone()))
            .order_by([(
                "start_date",
                firestore::FirestoreQueryDirection::Ascending,
            )])
            .limit(ACTIVITY_QUERY_LIMIT)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Commit a validated activity after re-checking the overlap invariant.
    ///
    /// The booked-date set is rebuilt from a fresh query immediately before
    /// the transactional write, narrowing the window between validation and
    /// commit. A conflict found here surfaces as `DateConflict`, same as in
    /// the validation pass.
    pub async fn commit_activity_atomic(
        &self,
        activity: &ScheduledActivity,
    ) -> Result<(), AppError> {
        let (start, end) = match (
            parse_iso_date(&activity.start_date),
            parse_iso_date(&activity.end_date),
        ) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                return Err(AppError::BadRequest(
                    "Activity dates must be YYYY-MM-DD".to_string(),
                ))
            }
        };

        // Re-check overlap against the freshest committed state
        let existing = self.get_activities_for_animal(&activity.animal_id).await?;
        let booked = BookedDates::from_activities(&existing);
        if booked.conflicts_with(start, end) {
            return Err(AppError::Schedule(ScheduleError::DateConflict));
        }

        let mut transaction = self
            .get_client()?
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::ACTIVITIES)
            .document_id(&activity.activity_id)
            .object(activity)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add activity to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::info!(
            activity_id = %activity.activity_id,
            animal_id = %activity.animal_id,
            start_date = %activity.start_date,
            end_date = %activity.end_date,
            "Activity committed"
        );

        Ok(())
    }

    // ─── Adoption Request Operations ─────────────────────────────

    /// Get an adoption request by ID.
    pub async fn get_adoption_request(
        &self,
        request_id: &str,
    ) -> Result<Option<AdoptionRequest>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::ADOPTION_REQUESTS)
            .obj()
            .one(request_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store an adoption request.
    pub async fn upsert_adoption_request(
        &self,
        request: &AdoptionRequest,
    ) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::ADOPTION_REQUESTS)
            .document_id(&request.request_id)
            .object(request)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get adoption requests filed by one user.
    pub async fn get_adoption_requests_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<AdoptionRequest>, AppError> {
        let user_id = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::ADOPTION_REQUESTS)
            .filter(move |q| q.field("user_id").eq(user_id.clone()))
            .order_by([(
                "created_at",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get pending adoption requests for a shelter's animals.
    ///
    /// One query per animal; shelters hold short listing lists, so this stays
    /// within a handful of reads.
    pub async fn get_pending_adoption_requests(
        &self,
        animal_ids: &[String],
    ) -> Result<Vec<AdoptionRequest>, AppError> {
        let mut results = Vec::new();
        for animal_id in animal_ids {
            let animal_id = animal_id.clone();
            let mut batch: Vec<AdoptionRequest> = self
                .get_client()?
                .fluent()
                .select()
                .from(collections::ADOPTION_REQUESTS)
                .filter(move |q| {
                    q.for_all([
                        q.field("animal_id").eq(animal_id.clone()),
                        q.field("status").eq(RequestStatus::Pending.as_str()),
                    ])
                })
                .obj()
                .query()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            results.append(&mut batch);
        }
        Ok(results)
    }

    /// List animals owned by a shelter.
    pub async fn get_animals_for_shelter(
        &self,
        shelter_id: &str,
    ) -> Result<Vec<Animal>, AppError> {
        let shelter_id = shelter_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::ANIMALS)
            .filter(move |q| q.field("shelter_id").eq(shelter_id.clone()))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Atomically apply an adoption decision: the updated request and the
    /// updated animal are written in one transaction.
    pub async fn apply_adoption_decision_atomic(
        &self,
        request: &AdoptionRequest,
        animal: &Animal,
    ) -> Result<(), AppError> {
        let mut transaction = self
            .get_client()?
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::ADOPTION_REQUESTS)
            .document_id(&request.request_id)
            .object(request)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add request to transaction: {}", e))
            })?;

        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::ANIMALS)
            .document_id(&animal.animal_id)
            .object(animal)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add animal to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::info!(
            request_id = %request.request_id,
            animal_id = %animal.animal_id,
            status = ?request.status,
            "Adoption decision applied"
        );

        Ok(())
    }
}