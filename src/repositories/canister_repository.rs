use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::entities::canister::{
    ActiveModel as CanisterActiveModel, CanisterStatus, Column, Entity as Canister,
    Model as CanisterModel,
};
use crate::entities::canister_type::Entity as CanisterType;
use crate::entities::weighing::{Column as WeighingColumn, Entity as Weighing};
use crate::errors::ServiceError;
use crate::repositories::Repository;

use super::BaseRepository;

/// Regeneration budget when a freshly generated id is already taken.
pub const MAX_ID_ATTEMPTS: usize = 5;

/// `GC-` + 6 hex characters from a random UUID + the last 4 digits of the
/// current Unix time in milliseconds.
pub fn generate_canister_id() -> String {
    let random = Uuid::new_v4().simple().to_string();
    let millis = Utc::now().timestamp_millis().rem_euclid(10_000);
    format!("GC-{}{:04}", &random[..6], millis)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCanister {
    pub label: String,
    pub canister_type_id: i32,
}

/// Repository for canister operations
#[derive(Debug, Clone)]
pub struct CanisterRepository {
    base: BaseRepository,
}

impl CanisterRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<CanisterModel>, ServiceError> {
        let id = id.to_string();
        self.base
            .access()
            .execute("canister.find_by_id", move |db| {
                Box::pin(Canister::find_by_id(id).one(db))
            })
            .await
    }

    /// Canisters ordered by label, optionally restricted to one status
    pub async fn find_all(
        &self,
        status: Option<CanisterStatus>,
    ) -> Result<Vec<CanisterModel>, ServiceError> {
        self.base
            .access()
            .execute("canister.find_all", move |db| {
                let mut query = Canister::find();
                if let Some(status) = status {
                    query = query.filter(Column::Status.eq(status));
                }
                Box::pin(query.order_by_asc(Column::Label).all(db))
            })
            .await
    }

    /// Inserts an active canister under a freshly generated id.
    pub async fn create(&self, new: NewCanister) -> Result<CanisterModel, ServiceError> {
        self.create_with_id_source(new, generate_canister_id).await
    }

    /// Like [`create`](Self::create) with a caller supplied id generator.
    /// Ids already present are skipped; after [`MAX_ID_ATTEMPTS`] collisions
    /// the insert fails with `Conflict`.
    pub async fn create_with_id_source<G>(
        &self,
        new: NewCanister,
        mut next_id: G,
    ) -> Result<CanisterModel, ServiceError>
    where
        G: FnMut() -> String + Send + 'static,
    {
        let label = new.label.clone();
        let result = self
            .base
            .access()
            .transaction::<_, CanisterModel, ServiceError>(move |txn| {
                Box::pin(async move {
                    if CanisterType::find_by_id(new.canister_type_id)
                        .one(txn)
                        .await?
                        .is_none()
                    {
                        return Err(ServiceError::InvalidInput(format!(
                            "Canister type {} does not exist",
                            new.canister_type_id
                        )));
                    }

                    let mut id = None;
                    for _ in 0..MAX_ID_ATTEMPTS {
                        let candidate = next_id();
                        if Canister::find_by_id(candidate.clone())
                            .one(txn)
                            .await?
                            .is_none()
                        {
                            id = Some(candidate);
                            break;
                        }
                        warn!("Generated canister id {} already exists, retrying", candidate);
                    }
                    let id = id.ok_or_else(|| {
                        ServiceError::Conflict(format!(
                            "Could not generate a unique canister id after {} attempts",
                            MAX_ID_ATTEMPTS
                        ))
                    })?;

                    CanisterActiveModel {
                        id: Set(id),
                        label: Set(new.label),
                        canister_type_id: Set(new.canister_type_id),
                        status: Set(CanisterStatus::Active),
                        created_at: Set(Utc::now()),
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::db_error)
                })
            })
            .await;

        match &result {
            Ok(model) => info!(canister_id = %model.id, "Created canister '{}'", model.label),
            Err(e) => warn!("Failed to create canister '{}': {}", label, e),
        }
        result
    }

    /// Re-writes the status; setting the current value again is allowed.
    pub async fn update_status(
        &self,
        id: &str,
        status: CanisterStatus,
    ) -> Result<CanisterModel, ServiceError> {
        let id = id.to_string();
        let log_id = id.clone();
        let result = self
            .base
            .access()
            .transaction::<_, CanisterModel, ServiceError>(move |txn| {
                Box::pin(async move {
                    let existing = Canister::find_by_id(id.clone())
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("Canister {} not found", id))
                        })?;

                    let mut active: CanisterActiveModel = existing.into();
                    active.status = Set(status);
                    active.update(txn).await.map_err(ServiceError::db_error)
                })
            })
            .await;

        match &result {
            Ok(_) => info!(canister_id = %log_id, "Canister marked {}", status.as_str()),
            Err(e) => warn!(canister_id = %log_id, "Failed to update canister status: {}", e),
        }
        result
    }

    pub async fn update_label(&self, id: &str, label: &str) -> Result<CanisterModel, ServiceError> {
        let id = id.to_string();
        let label = label.to_string();
        let log_id = id.clone();
        let result = self
            .base
            .access()
            .transaction::<_, CanisterModel, ServiceError>(move |txn| {
                Box::pin(async move {
                    let existing = Canister::find_by_id(id.clone())
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("Canister {} not found", id))
                        })?;

                    let mut active: CanisterActiveModel = existing.into();
                    active.label = Set(label);
                    active.update(txn).await.map_err(ServiceError::db_error)
                })
            })
            .await;

        match &result {
            Ok(model) => info!(canister_id = %log_id, "Renamed canister to '{}'", model.label),
            Err(e) => warn!(canister_id = %log_id, "Failed to rename canister: {}", e),
        }
        result
    }

    /// Deletes the canister and all of its weighings in one transaction.
    /// Returns the number of weighings removed.
    pub async fn delete(&self, id: &str) -> Result<u64, ServiceError> {
        let id = id.to_string();
        let log_id = id.clone();
        let result = self
            .base
            .access()
            .transaction::<_, u64, ServiceError>(move |txn| {
                Box::pin(async move {
                    let canister = Canister::find_by_id(id.clone())
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("Canister {} not found", id))
                        })?;

                    let removed = Weighing::delete_many()
                        .filter(WeighingColumn::CanisterId.eq(id.as_str()))
                        .exec(txn)
                        .await?
                        .rows_affected;

                    canister.delete(txn).await?;
                    Ok(removed)
                })
            })
            .await;

        match &result {
            Ok(removed) => info!(
                canister_id = %log_id,
                "Deleted canister and {} weighing(s)",
                removed
            ),
            Err(e) => warn!(canister_id = %log_id, "Failed to delete canister: {}", e),
        }
        result
    }
}
