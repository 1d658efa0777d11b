use crate::db::DatabaseAccess;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

pub mod canister_repository;
pub mod canister_type_repository;
pub mod weighing_repository;

pub use canister_repository::CanisterRepository;
pub use canister_type_repository::CanisterTypeRepository;
pub use weighing_repository::WeighingRepository;

/// Repository trait for common database operations
pub trait Repository {
    /// Metered access used for reads and transactional writes
    fn access(&self) -> &DatabaseAccess;
}

#[derive(Debug, Clone)]
pub struct BaseRepository {
    access: DatabaseAccess,
}

impl BaseRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            access: DatabaseAccess::new(db),
        }
    }
}

impl Repository for BaseRepository {
    fn access(&self) -> &DatabaseAccess {
        &self.access
    }
}
