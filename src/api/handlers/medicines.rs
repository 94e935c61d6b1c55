//! Catalog endpoints - list, fetch, add (admin) and remove (admin).

use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use super::RawId;
use crate::{
    api::{AppState, auth::AdminAuth, response::ApiJson},
    core::catalog::{self, NewMedicine},
    entities::medicine,
    errors::{Error, Result},
};

/// One medicine as sent to clients
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineView {
    /// Medicine identifier
    #[serde(rename = "_id")]
    pub id: i64,
    /// Product name
    pub name: String,
    /// Catalog category
    pub category: String,
    /// Manufacturer name
    pub manufacturer: String,
    /// Free-form description
    pub description: String,
    /// Unit price
    pub price: f64,
    /// Dosage instructions
    pub dosage: String,
    /// Public image URL
    pub image_url: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl From<medicine::Model> for MedicineView {
    fn from(medicine: medicine::Model) -> Self {
        Self {
            id: medicine.id,
            name: medicine.name,
            category: medicine.category,
            manufacturer: medicine.manufacturer,
            description: medicine.description,
            price: medicine.price,
            dosage: medicine.dosage,
            image_url: medicine.image_url,
            created_at: medicine.created_at,
            updated_at: medicine.updated_at,
        }
    }
}

/// Response of the list endpoint
#[derive(Debug, Serialize)]
pub struct MedicineListResponse {
    /// Always true
    pub success: bool,
    /// Medicines, newest first
    pub data: Vec<MedicineView>,
    /// Number of medicines
    pub count: usize,
}

/// Response of the single medicine endpoint
#[derive(Debug, Serialize)]
pub struct MedicineResponse {
    /// Always true
    pub success: bool,
    /// The medicine
    pub data: MedicineView,
}

/// Body of `POST .../singleMedicine`
#[derive(Debug, Deserialize)]
pub struct GetMedicineRequest {
    /// Medicine identifier
    #[serde(rename = "_id")]
    pub id: Option<RawId>,
}

/// Body of `POST /api/admin/removeMedicne`
#[derive(Debug, Deserialize)]
pub struct RemoveMedicineRequest {
    /// Medicine identifier
    pub id: Option<RawId>,
}

/// Plain acknowledgement
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Always true
    pub success: bool,
    /// Human-readable outcome
    pub message: &'static str,
}

/// Identifier echoed by the remove endpoint
#[derive(Debug, Serialize)]
pub struct RemovedId {
    /// Identifier of the removed medicine
    pub id: i64,
}

/// Response of the remove endpoint
#[derive(Debug, Serialize)]
pub struct RemoveMedicineResponse {
    /// Always true
    pub success: bool,
    /// Human-readable outcome
    pub message: &'static str,
    /// The removed identifier
    pub data: RemovedId,
}

fn record_id(id: Option<RawId>) -> Result<i64> {
    let id = id.ok_or_else(|| Error::invalid_argument("Medicine ID is required"))?;
    id.as_record_id()
        .ok_or_else(|| Error::invalid_argument("Medicine ID must be numeric"))
}

/// Lists every medicine, newest first.
#[instrument(skip_all)]
pub async fn list_medicines(State(state): State<AppState>) -> Result<Json<MedicineListResponse>> {
    let data: Vec<MedicineView> = catalog::list_medicines(&state.database)
        .await?
        .into_iter()
        .map(MedicineView::from)
        .collect();

    Ok(Json(MedicineListResponse {
        success: true,
        count: data.len(),
        data,
    }))
}

/// Fetches one medicine.
#[instrument(skip_all)]
pub async fn get_medicine(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<GetMedicineRequest>,
) -> Result<Json<MedicineResponse>> {
    let id = record_id(payload.id)?;
    let medicine = catalog::get_medicine(&state.database, id)
        .await?
        .ok_or_else(|| Error::MedicineNotFound { id: id.to_string() })?;

    Ok(Json(MedicineResponse {
        success: true,
        data: medicine.into(),
    }))
}

/// Fields collected from the add-medicine form.
#[derive(Debug, Default)]
struct MedicineForm {
    name: String,
    category: String,
    manufacturer: String,
    description: String,
    price: String,
    dosage: String,
    image: Option<(Option<String>, Vec<u8>)>,
}

impl MedicineForm {
    async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match name.as_str() {
                "image" => {
                    let file_name = field.file_name().map(str::to_string);
                    let bytes = field.bytes().await?;
                    if !bytes.is_empty() {
                        form.image = Some((file_name, bytes.to_vec()));
                    }
                }
                "name" => form.name = field.text().await?,
                "category" => form.category = field.text().await?,
                "manufacturer" => form.manufacturer = field.text().await?,
                "description" => form.description = field.text().await?,
                "price" => form.price = field.text().await?,
                "dosage" => form.dosage = field.text().await?,
                other => warn!("Ignoring unexpected form field {other}"),
            }
        }

        Ok(form)
    }

    fn price(&self) -> Result<f64> {
        if self.price.trim().is_empty() {
            return Err(Error::invalid_argument("Please provide all required fields"));
        }
        self.price
            .trim()
            .parse()
            .map_err(|_| Error::invalid_argument("Price must be a number"))
    }
}

/// Adds a medicine from a multipart form, storing the optional image.
#[instrument(skip_all)]
pub async fn add_medicine(
    State(state): State<AppState>,
    _admin: AdminAuth,
    multipart: Multipart,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    let form = MedicineForm::read(multipart).await?;
    let price = form.price()?;

    let image_url = match &form.image {
        Some((file_name, bytes)) => Some(state.images.save(file_name.as_deref(), bytes).await?),
        None => None,
    };

    let new_medicine = NewMedicine {
        name: form.name,
        category: form.category,
        manufacturer: form.manufacturer,
        description: form.description,
        price,
        dosage: form.dosage,
        image_url: image_url.clone(),
    };

    if let Err(e) = catalog::create_medicine(&state.database, new_medicine).await {
        // Do not leave an orphaned upload behind
        if let Some(url) = image_url {
            if let Err(cleanup) = state.images.remove(&url).await {
                warn!("Failed to discard image {url}: {cleanup}");
            }
        }
        return Err(e);
    }

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            success: true,
            message: "Medicine added successfully",
        }),
    ))
}

/// Deletes a medicine and its stored image.
#[instrument(skip_all)]
pub async fn remove_medicine(
    State(state): State<AppState>,
    _admin: AdminAuth,
    ApiJson(payload): ApiJson<RemoveMedicineRequest>,
) -> Result<Json<RemoveMedicineResponse>> {
    let id = record_id(payload.id)?;
    let removed = catalog::remove_medicine(&state.database, id).await?;

    if let Some(url) = &removed.image_url {
        if let Err(e) = state.images.remove(url).await {
            warn!("Medicine {} removed but its image was not: {e}", removed.id);
        }
    }

    Ok(Json(RemoveMedicineResponse {
        success: true,
        message: "Medicine deleted successfully",
        data: RemovedId { id: removed.id },
    }))
}
