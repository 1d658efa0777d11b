use crate::{
    calculations::{self, GasReading, StatusClass, CHEAT_SHEET_BANDS},
    db::DbPool,
    entities::{
        canister::{self, CanisterStatus},
        canister_type, weighing,
    },
    errors::ServiceError,
    repositories::{
        canister_repository::{generate_canister_id, NewCanister},
        canister_type_repository::NewCanisterType,
        weighing_repository::NewWeighing,
        CanisterRepository, CanisterTypeRepository, WeighingRepository,
    },
};
use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};
use validator::{Validate, ValidationError};

/// Accepted `recorded_at` layouts, tried in order.
const RECORDED_AT_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_type_weights"))]
pub struct CreateCanisterType {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,
    #[validate(range(min = 1, message = "Full weight must be a positive number of grams"))]
    pub full_weight: i32,
    #[validate(range(min = 1, message = "Empty weight must be a positive number of grams"))]
    pub empty_weight: i32,
}

fn validate_type_weights(req: &CreateCanisterType) -> Result<(), ValidationError> {
    if req.empty_weight >= req.full_weight {
        let mut err = ValidationError::new("weights");
        err.message = Some("Empty weight must be less than full weight".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCanister {
    #[validate(length(min = 1, max = 64, message = "Label must be between 1 and 64 characters"))]
    pub label: String,
    pub canister_type_id: i32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateLabel {
    #[validate(length(min = 1, max = 64, message = "Label must be between 1 and 64 characters"))]
    pub label: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateWeighing {
    #[validate(range(min = 1, message = "Weight must be a positive number of grams"))]
    pub weight: i32,
    #[serde(default)]
    pub recorded_at: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Parses a user supplied timestamp. Blank means now, in local time.
pub fn parse_recorded_at(input: Option<&str>) -> Result<NaiveDateTime, ServiceError> {
    let raw = match input.map(str::trim) {
        None | Some("") => return Ok(Local::now().naive_local()),
        Some(raw) => raw,
    };

    for format in RECORDED_AT_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(parsed);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight);
        }
    }

    Err(ServiceError::ValidationError(format!(
        "Invalid recorded_at '{}': expected YYYY-MM-DD or YYYY-MM-DDTHH:MM",
        raw
    )))
}

/// Short, non-unique label offered on the create form.
pub fn suggested_label() -> String {
    generate_canister_id().chars().take(7).collect()
}

/// One card on the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct CanisterSummary {
    pub canister: canister::Model,
    pub canister_type: Option<canister_type::Model>,
    pub latest_weighing: Option<weighing::Model>,
    pub remaining_percentage: Option<f64>,
    pub status_class: StatusClass,
    pub is_depleted: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub canisters: Vec<CanisterSummary>,
    pub canister_types: Vec<canister_type::Model>,
    pub suggested_label: String,
}

/// A weighing with its derived values.
#[derive(Debug, Clone, Serialize)]
pub struct WeighingReading {
    #[serde(flatten)]
    pub weighing: weighing::Model,
    #[serde(flatten)]
    pub reading: GasReading,
    /// Drop in remaining percentage since the next older weighing; the
    /// oldest one counts from full.
    pub consumed_since_previous: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CanisterDetail {
    pub canister: canister::Model,
    pub canister_type: canister_type::Model,
    pub gas_capacity: i32,
    pub weighings: Vec<WeighingReading>,
    pub latest_weighing: Option<WeighingReading>,
    pub status_class: StatusClass,
    pub is_depleted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheatSheetRow {
    pub percent_range: &'static str,
    pub percent_top: f64,
    pub percent_bottom: f64,
    pub weight_top: f64,
    pub weight_bottom: f64,
    pub weight_range: String,
    pub color_class: StatusClass,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheatSheet {
    pub type_id: i32,
    pub name: String,
    pub full_weight: i32,
    pub empty_weight: i32,
    pub gas_capacity: i32,
    pub rows: Vec<CheatSheetRow>,
}

impl CheatSheet {
    pub fn for_type(canister_type: &canister_type::Model) -> Self {
        let capacity =
            calculations::gas_capacity(canister_type.full_weight, canister_type.empty_weight);
        let rows = CHEAT_SHEET_BANDS
            .iter()
            .map(|band| {
                let percent_top = (band.top * 100.0).round();
                let percent_bottom = (band.bottom * 100.0).round();
                let weight_top = calculations::weight_at_percentage(
                    band.top * 100.0,
                    canister_type.empty_weight,
                    capacity,
                );
                let weight_bottom = calculations::weight_at_percentage(
                    band.bottom * 100.0,
                    canister_type.empty_weight,
                    capacity,
                );
                CheatSheetRow {
                    percent_range: band.label,
                    percent_top,
                    percent_bottom,
                    weight_top,
                    weight_bottom,
                    weight_range: format!(
                        "{}g - {}g",
                        weight_top.trunc() as i64,
                        weight_bottom.trunc() as i64
                    ),
                    color_class: band.class,
                }
            })
            .collect();

        Self {
            type_id: canister_type.id,
            name: canister_type.name.clone(),
            full_weight: canister_type.full_weight,
            empty_weight: canister_type.empty_weight,
            gas_capacity: capacity,
            rows,
        }
    }
}

fn reading_for(weight: i32, canister_type: &canister_type::Model) -> GasReading {
    GasReading::new(weight, canister_type.empty_weight, canister_type.full_weight)
}

/// Attaches derived values to a history ordered newest first.
fn enrich_history(
    weighings: Vec<weighing::Model>,
    canister_type: &canister_type::Model,
) -> Vec<WeighingReading> {
    let readings: Vec<GasReading> = weighings
        .iter()
        .map(|w| reading_for(w.weight, canister_type))
        .collect();

    weighings
        .into_iter()
        .enumerate()
        .map(|(idx, weighing)| WeighingReading {
            consumed_since_previous: readings
                .get(idx + 1)
                .map_or(100.0, |older| older.remaining_percentage)
                - readings[idx].remaining_percentage,
            reading: readings[idx],
            weighing,
        })
        .collect()
}

/// Service composing the repositories and calculations into page data
#[derive(Clone)]
pub struct GaugeService {
    canister_types: CanisterTypeRepository,
    canisters: CanisterRepository,
    weighings: WeighingRepository,
}

impl GaugeService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self {
            canister_types: CanisterTypeRepository::new(db_pool.clone()),
            canisters: CanisterRepository::new(db_pool.clone()),
            weighings: WeighingRepository::new(db_pool),
        }
    }

    pub fn canister_types(&self) -> &CanisterTypeRepository {
        &self.canister_types
    }

    pub fn canisters(&self) -> &CanisterRepository {
        &self.canisters
    }

    pub fn weighings(&self) -> &WeighingRepository {
        &self.weighings
    }

    /// Every canister with its latest reading. Active canisters come first,
    /// each group ordered by label.
    #[instrument(skip(self))]
    pub async fn dashboard_view(&self) -> Result<DashboardView, ServiceError> {
        let canisters = self.canisters.find_all(None).await?;
        let canister_types = self.canister_types.find_all().await?;
        let types_by_id: HashMap<i32, &canister_type::Model> =
            canister_types.iter().map(|t| (t.id, t)).collect();

        let mut summaries = Vec::with_capacity(canisters.len());
        for canister in canisters {
            let canister_type = types_by_id.get(&canister.canister_type_id).copied().cloned();
            let latest_weighing = self.weighings.latest_for_canister(&canister.id).await?;

            let remaining_percentage = match (&latest_weighing, &canister_type) {
                (Some(w), Some(t)) => Some(reading_for(w.weight, t).remaining_percentage),
                _ => None,
            };
            let is_depleted = canister.is_depleted();

            summaries.push(CanisterSummary {
                status_class: calculations::status_class(remaining_percentage, is_depleted),
                canister,
                canister_type,
                latest_weighing,
                remaining_percentage,
                is_depleted,
            });
        }

        summaries.sort_by(|a, b| {
            (a.is_depleted, a.canister.label.as_str())
                .cmp(&(b.is_depleted, b.canister.label.as_str()))
        });

        Ok(DashboardView {
            canisters: summaries,
            canister_types,
            suggested_label: suggested_label(),
        })
    }

    /// Full history for one canister; `None` when the id is unknown.
    #[instrument(skip(self))]
    pub async fn canister_detail_view(
        &self,
        canister_id: &str,
    ) -> Result<Option<CanisterDetail>, ServiceError> {
        let Some(canister) = self.canisters.find_by_id(canister_id).await? else {
            return Ok(None);
        };
        let canister_type = self
            .canister_types
            .find_by_id(canister.canister_type_id)
            .await?
            .ok_or_else(|| {
                ServiceError::InternalError(format!(
                    "Canister {} references missing type {}",
                    canister.id, canister.canister_type_id
                ))
            })?;

        let history = self.weighings.find_for_canister(canister_id).await?;
        let weighings = enrich_history(history, &canister_type);
        let latest_weighing = weighings.first().cloned();
        let is_depleted = canister.is_depleted();
        let status_class = calculations::status_class(
            latest_weighing
                .as_ref()
                .map(|w| w.reading.remaining_percentage),
            is_depleted,
        );

        Ok(Some(CanisterDetail {
            gas_capacity: calculations::gas_capacity(
                canister_type.full_weight,
                canister_type.empty_weight,
            ),
            canister,
            canister_type,
            weighings,
            latest_weighing,
            status_class,
            is_depleted,
        }))
    }

    #[instrument(skip(self))]
    pub async fn cheat_sheet(&self, type_id: i32) -> Result<CheatSheet, ServiceError> {
        let canister_type = self
            .canister_types
            .find_by_id(type_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Canister type not found".to_string()))?;
        Ok(CheatSheet::for_type(&canister_type))
    }

    pub async fn list_canister_types(&self) -> Result<Vec<canister_type::Model>, ServiceError> {
        self.canister_types.find_all().await
    }

    pub async fn get_canister(&self, canister_id: &str) -> Result<canister::Model, ServiceError> {
        self.canisters
            .find_by_id(canister_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Canister {} not found", canister_id)))
    }

    pub async fn list_canisters(
        &self,
        status: Option<CanisterStatus>,
    ) -> Result<Vec<canister::Model>, ServiceError> {
        self.canisters.find_all(status).await
    }

    /// Weighings newest first with derived values, optionally for one canister.
    #[instrument(skip(self))]
    pub async fn list_weighings(
        &self,
        canister_id: Option<&str>,
    ) -> Result<Vec<WeighingReading>, ServiceError> {
        let weighings = self.weighings.find_all(canister_id).await?;
        let types: HashMap<i32, canister_type::Model> = self
            .canister_types
            .find_all()
            .await?
            .into_iter()
            .map(|t| (t.id, t))
            .collect();
        let canister_types: HashMap<String, i32> = self
            .canisters
            .find_all(None)
            .await?
            .into_iter()
            .map(|c| (c.id, c.canister_type_id))
            .collect();

        let mut grouped: HashMap<String, Vec<weighing::Model>> = HashMap::new();
        let mut order = Vec::with_capacity(weighings.len());
        for w in weighings {
            order.push((w.canister_id.clone(), w.id));
            grouped.entry(w.canister_id.clone()).or_default().push(w);
        }

        let mut enriched: HashMap<i32, WeighingReading> = HashMap::new();
        for (canister_id, history) in grouped {
            let canister_type = canister_types
                .get(&canister_id)
                .and_then(|type_id| types.get(type_id))
                .ok_or_else(|| {
                    ServiceError::InternalError(format!(
                        "No canister type found for canister {}",
                        canister_id
                    ))
                })?;
            for reading in enrich_history(history, canister_type) {
                enriched.insert(reading.weighing.id, reading);
            }
        }

        Ok(order
            .into_iter()
            .filter_map(|(_, id)| enriched.remove(&id))
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn create_canister_type(
        &self,
        mut request: CreateCanisterType,
    ) -> Result<canister_type::Model, ServiceError> {
        request.name = request.name.trim().to_string();
        request.validate()?;

        self.canister_types
            .create(NewCanisterType {
                name: request.name,
                full_weight: request.full_weight,
                empty_weight: request.empty_weight,
            })
            .await
    }

    #[instrument(skip(self))]
    pub async fn create_canister(
        &self,
        mut request: CreateCanister,
    ) -> Result<canister::Model, ServiceError> {
        request.label = request.label.trim().to_string();
        request.validate()?;

        self.canisters
            .create(NewCanister {
                label: request.label,
                canister_type_id: request.canister_type_id,
            })
            .await
    }

    #[instrument(skip(self))]
    pub async fn create_weighing(
        &self,
        canister_id: &str,
        request: CreateWeighing,
    ) -> Result<weighing::Model, ServiceError> {
        request.validate()?;
        let recorded_at = parse_recorded_at(request.recorded_at.as_deref())?;

        self.weighings
            .create(NewWeighing {
                canister_id: canister_id.to_string(),
                weight: request.weight,
                comment: request.comment,
                recorded_at,
            })
            .await
    }

    #[instrument(skip(self))]
    pub async fn set_status(
        &self,
        canister_id: &str,
        status: CanisterStatus,
    ) -> Result<canister::Model, ServiceError> {
        self.canisters.update_status(canister_id, status).await
    }

    pub async fn mark_depleted(&self, canister_id: &str) -> Result<canister::Model, ServiceError> {
        self.set_status(canister_id, CanisterStatus::Depleted).await
    }

    pub async fn reactivate(&self, canister_id: &str) -> Result<canister::Model, ServiceError> {
        self.set_status(canister_id, CanisterStatus::Active).await
    }

    #[instrument(skip(self))]
    pub async fn update_label(
        &self,
        canister_id: &str,
        request: UpdateLabel,
    ) -> Result<canister::Model, ServiceError> {
        let request = UpdateLabel {
            label: request.label.trim().to_string(),
        };
        request.validate()?;
        self.canisters.update_label(canister_id, &request.label).await
    }

    #[instrument(skip(self))]
    pub async fn delete_canister(&self, canister_id: &str) -> Result<u64, ServiceError> {
        self.canisters.delete(canister_id).await
    }

    /// Deletes a weighing and returns the owning canister id.
    #[instrument(skip(self))]
    pub async fn delete_weighing(&self, weighing_id: i32) -> Result<String, ServiceError> {
        let deleted = self.weighings.delete(weighing_id).await?;
        info!(
            canister_id = %deleted.canister_id,
            "Weighing {} removed from history",
            weighing_id
        );
        Ok(deleted.canister_id)
    }

    #[instrument(skip(self))]
    pub async fn delete_canister_type(
        &self,
        type_id: i32,
    ) -> Result<canister_type::Model, ServiceError> {
        self.canister_types.delete(type_id).await
    }
}
