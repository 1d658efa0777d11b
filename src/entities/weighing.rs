use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One weight observation. `recorded_at` is user supplied and may be back-dated.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "weighings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub canister_id: String,
    pub weight: i32,
    #[sea_orm(column_type = "Text", nullable)]
    pub comment: Option<String>,
    pub recorded_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::canister::Entity",
        from = "Column::CanisterId",
        to = "super::canister::Column::Id",
        on_delete = "Cascade"
    )]
    Canister,
}

impl Related<super::canister::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Canister.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
