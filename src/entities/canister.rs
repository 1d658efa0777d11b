use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "canisters")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub label: String,
    pub canister_type_id: i32,
    pub status: CanisterStatus,
    pub created_at: DateTime<Utc>,
}

impl Model {
    pub fn is_depleted(&self) -> bool {
        self.status == CanisterStatus::Depleted
    }
}

/// Lifecycle of a physical canister. Both transitions are user driven.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CanisterStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "depleted")]
    Depleted,
}

impl CanisterStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CanisterStatus::Active => "active",
            CanisterStatus::Depleted => "depleted",
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::canister_type::Entity",
        from = "Column::CanisterTypeId",
        to = "super::canister_type::Column::Id"
    )]
    CanisterType,
    #[sea_orm(has_many = "super::weighing::Entity")]
    Weighings,
}

impl Related<super::canister_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CanisterType.def()
    }
}

impl Related<super::weighing::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Weighings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_parses_lowercase_names() {
        assert_eq!(CanisterStatus::from_str("active").unwrap(), CanisterStatus::Active);
        assert_eq!(CanisterStatus::from_str("depleted").unwrap(), CanisterStatus::Depleted);
        assert!(CanisterStatus::from_str("empty").is_err());
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&CanisterStatus::Depleted).unwrap(),
            "\"depleted\""
        );
        assert_eq!(CanisterStatus::Active.as_str(), "active");
    }
}
