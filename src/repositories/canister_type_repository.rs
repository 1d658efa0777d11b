use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::entities::canister::{Column as CanisterColumn, Entity as Canister};
use crate::entities::canister_type::{
    ActiveModel as CanisterTypeActiveModel, Column, Entity as CanisterType,
    Model as CanisterTypeModel,
};
use crate::errors::ServiceError;
use crate::repositories::Repository;

use super::BaseRepository;

/// Types that can never be deleted: everything we seed plus the large Coleman.
pub const PROTECTED_TYPE_NAMES: [&str; 4] =
    ["Coleman 240g", "Primus 230g", "Primus 100g", "Coleman 450g"];

pub fn is_protected(name: &str) -> bool {
    PROTECTED_TYPE_NAMES.contains(&name)
}

/// Fields for a new canister type; checked by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCanisterType {
    pub name: String,
    pub full_weight: i32,
    pub empty_weight: i32,
}

/// Repository for canister type operations
#[derive(Debug, Clone)]
pub struct CanisterTypeRepository {
    base: BaseRepository,
}

impl CanisterTypeRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<CanisterTypeModel>, ServiceError> {
        self.base
            .access()
            .execute("canister_type.find_by_id", move |db| {
                Box::pin(CanisterType::find_by_id(id).one(db))
            })
            .await
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<CanisterTypeModel>, ServiceError> {
        let name = name.to_string();
        self.base
            .access()
            .execute("canister_type.find_by_name", move |db| {
                Box::pin(CanisterType::find().filter(Column::Name.eq(name)).one(db))
            })
            .await
    }

    /// All types, alphabetical
    pub async fn find_all(&self) -> Result<Vec<CanisterTypeModel>, ServiceError> {
        self.base
            .access()
            .execute("canister_type.find_all", |db| {
                Box::pin(CanisterType::find().order_by_asc(Column::Name).all(db))
            })
            .await
    }

    pub async fn count_canisters(&self, type_id: i32) -> Result<u64, ServiceError> {
        self.base
            .access()
            .execute("canister_type.count_canisters", move |db| {
                Box::pin(
                    Canister::find()
                        .filter(CanisterColumn::CanisterTypeId.eq(type_id))
                        .count(db),
                )
            })
            .await
    }

    /// Inserts a type. A duplicate name is a `Conflict`.
    pub async fn create(&self, new: NewCanisterType) -> Result<CanisterTypeModel, ServiceError> {
        let name = new.name.clone();
        let result = self
            .base
            .access()
            .transaction::<_, CanisterTypeModel, ServiceError>(move |txn| {
                Box::pin(async move {
                    let existing = CanisterType::find()
                        .filter(Column::Name.eq(new.name.as_str()))
                        .one(txn)
                        .await?;
                    if existing.is_some() {
                        return Err(ServiceError::Conflict(format!(
                            "Canister type '{}' already exists",
                            new.name
                        )));
                    }

                    CanisterTypeActiveModel {
                        name: Set(new.name),
                        full_weight: Set(new.full_weight),
                        empty_weight: Set(new.empty_weight),
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
                type_id = model.id,
                "Created canister type '{}' (full {}g, empty {}g)",
                model.name,
                model.full_weight,
                model.empty_weight
            ),
            Err(e) => warn!("Failed to create canister type '{}': {}", name, e),
        }
        result
    }

    /// Returns the existing type with this name, or creates it. The flag is
    /// true when a row was inserted.
    pub async fn ensure(
        &self,
        new: NewCanisterType,
    ) -> Result<(CanisterTypeModel, bool), ServiceError> {
        if let Some(existing) = self.find_by_name(&new.name).await? {
            return Ok((existing, false));
        }
        self.create(new).await.map(|model| (model, true))
    }

    /// Deletes an unreferenced, unprotected type and returns it.
    pub async fn delete(&self, id: i32) -> Result<CanisterTypeModel, ServiceError> {
        let result = self
            .base
            .access()
            .transaction::<_, CanisterTypeModel, ServiceError>(move |txn| {
                Box::pin(async move {
                    let model = CanisterType::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("Canister type {} not found", id))
                        })?;

                    if is_protected(&model.name) {
                        return Err(ServiceError::InvalidOperation(format!(
                            "Cannot delete protected type '{}'",
                            model.name
                        )));
                    }

                    let in_use = Canister::find()
                        .filter(CanisterColumn::CanisterTypeId.eq(id))
                        .count(txn)
                        .await?;
                    if in_use > 0 {
                        return Err(ServiceError::Conflict(format!(
                            "Canister type '{}' is still used by {} canister(s)",
                            model.name, in_use
                        )));
                    }

                    model.clone().delete(txn).await?;
                    Ok(model)
                })
            })
            .await;

        match &result {
            Ok(model) => info!(type_id = id, "Deleted canister type '{}'", model.name),
            Err(e) => warn!(type_id = id, "Failed to delete canister type: {}", e),
        }
        result
    }
}
