use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A canister product: reference weights shared by many physical canisters.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "canister_types")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    /// Grams, sealed and full
    pub full_weight: i32,
    /// Grams, tare
    pub empty_weight: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::canister::Entity")]
    Canisters,
}

impl Related<super::canister::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Canisters.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
