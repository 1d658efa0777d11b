use crate::errors::ServiceError;
use crate::repositories::{canister_type_repository::NewCanisterType, CanisterTypeRepository};
use tracing::{info, instrument};

/// A canister product shipped with the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedType {
    pub name: &'static str,
    pub full_weight: i32,
    pub empty_weight: i32,
}

pub const SEED_TYPES: [SeedType; 3] = [
    SeedType {
        name: "Coleman 240g",
        full_weight: 361,
        empty_weight: 122,
    },
    SeedType {
        name: "Primus 230g",
        full_weight: 381,
        empty_weight: 151,
    },
    SeedType {
        name: "Primus 100g",
        full_weight: 203,
        empty_weight: 103,
    },
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub created: usize,
    pub existing: usize,
}

/// Creates any missing predefined type. Existing rows are left untouched.
#[instrument(skip(repo))]
pub async fn seed_canister_types(repo: &CanisterTypeRepository) -> Result<SeedReport, ServiceError> {
    info!("Seeding predefined canister types");
    let mut report = SeedReport::default();

    for seed in SEED_TYPES {
        let (model, created) = repo
            .ensure(NewCanisterType {
                name: seed.name.to_string(),
                full_weight: seed.full_weight,
                empty_weight: seed.empty_weight,
            })
            .await?;
        if created {
            report.created += 1;
        } else {
            report.existing += 1;
            info!(type_id = model.id, "Canister type '{}' already exists", model.name);
        }
    }

    info!(
        created = report.created,
        existing = report.existing,
        "Canister type seeding complete"
    );
    Ok(report)
}
