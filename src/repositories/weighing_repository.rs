use chrono::NaiveDateTime;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::entities::canister::Entity as Canister;
use crate::entities::weighing::{
    ActiveModel as WeighingActiveModel, Column, Entity as Weighing, Model as WeighingModel,
};
use crate::errors::ServiceError;
use crate::repositories::Repository;

use super::BaseRepository;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWeighing {
    pub canister_id: String,
    pub weight: i32,
    pub comment: Option<String>,
    pub recorded_at: NaiveDateTime,
}

/// Blank comments are stored as NULL.
fn normalize_comment(comment: Option<String>) -> Option<String> {
    comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

/// Repository for weighing operations
#[derive(Debug, Clone)]
pub struct WeighingRepository {
    base: BaseRepository,
}

impl WeighingRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<WeighingModel>, ServiceError> {
        self.base
            .access()
            .execute("weighing.find_by_id", move |db| {
                Box::pin(Weighing::find_by_id(id).one(db))
            })
            .await
    }

    /// Most recent weighing by `recorded_at`; equal timestamps resolve to the
    /// later insert.
    pub async fn latest_for_canister(
        &self,
        canister_id: &str,
    ) -> Result<Option<WeighingModel>, ServiceError> {
        let canister_id = canister_id.to_string();
        self.base
            .access()
            .execute("weighing.latest_for_canister", move |db| {
                Box::pin(
                    Weighing::find()
                        .filter(Column::CanisterId.eq(canister_id))
                        .order_by_desc(Column::RecordedAt)
                        .order_by_desc(Column::Id)
                        .one(db),
                )
            })
            .await
    }

    /// History for one canister, newest first
    pub async fn find_for_canister(
        &self,
        canister_id: &str,
    ) -> Result<Vec<WeighingModel>, ServiceError> {
        self.find_all(Some(canister_id)).await
    }

    pub async fn find_all(
        &self,
        canister_id: Option<&str>,
    ) -> Result<Vec<WeighingModel>, ServiceError> {
        let canister_id = canister_id.map(str::to_string);
        self.base
            .access()
            .execute("weighing.find_all", move |db| {
                let mut query = Weighing::find();
                if let Some(canister_id) = canister_id {
                    query = query.filter(Column::CanisterId.eq(canister_id));
                }
                Box::pin(
                    query
                        .order_by_desc(Column::RecordedAt)
                        .order_by_desc(Column::Id)
                        .all(db),
                )
            })
            .await
    }

    /// Records a weighing. The weight must be positive and the canister must exist.
    pub async fn create(&self, new: NewWeighing) -> Result<WeighingModel, ServiceError> {
        let canister_id = new.canister_id.clone();
        let result = self
            .base
            .access()
            .transaction::<_, WeighingModel, ServiceError>(move |txn| {
                Box::pin(async move {
                    if new.weight <= 0 {
                        return Err(ServiceError::ValidationError(
                            "Weight must be a positive number of grams".to_string(),
                        ));
                    }
                    if Canister::find_by_id(new.canister_id.clone())
                        .one(txn)
                        .await?
                        .is_none()
                    {
                        return Err(ServiceError::InvalidInput(format!(
                            "Canister {} does not exist",
                            new.canister_id
                        )));
                    }

                    WeighingActiveModel {
                        canister_id: Set(new.canister_id),
                        weight: Set(new.weight),
                        comment: Set(normalize_comment(new.comment)),
                        recorded_at: Set(new.recorded_at),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::db_error)
                })
            })
            .await;

        match &result {
            Ok(model) => info!(
                canister_id = %model.canister_id,
                weighing_id = model.id,
                "Recorded weighing of {}g",
                model.weight
            ),
            Err(e) => warn!(canister_id = %canister_id, "Failed to record weighing: {}", e),
        }
        result
    }

    /// Deletes one weighing and returns it.
    pub async fn delete(&self, id: i32) -> Result<WeighingModel, ServiceError> {
        let result = self
            .base
            .access()
            .transaction::<_, WeighingModel, ServiceError>(move |txn| {
                Box::pin(async move {
                    let model = Weighing::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("Weighing {} not found", id))
                        })?;
                    model.clone().delete(txn).await?;
                    Ok(model)
                })
            })
            .await;

        match &result {
            Ok(model) => info!(
                weighing_id = id,
                canister_id = %model.canister_id,
                "Deleted weighing"
            ),
            Err(e) => warn!(weighing_id = id, "Failed to delete weighing: {}", e),
        }
        result
    }
}
