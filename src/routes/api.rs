// Handlers for the showroom JSON API.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    filter,
    firestore,
    links,
    models::{format_price, FilterCriteria, QuickTag, VehicleRecord},
    pagination::VehiclePager,
    AppState,
};

// --- Request Structs ---

#[derive(Deserialize, Debug, Default)]
pub struct VehicleQuery {
    pub search: Option<String>,
    pub year: Option<String>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub fuel: Option<String>,
    pub transmission: Option<String>,
    pub category: Option<String>,
    pub shielding: Option<bool>,
    pub tag: Option<QuickTag>,
}

impl VehicleQuery {
    fn into_criteria(self) -> FilterCriteria {
        let defaults = FilterCriteria::default();
        let criteria = FilterCriteria {
            search_term: self.search.unwrap_or_default(),
            year: self.year.unwrap_or_default(),
            price_range: [
                self.price_min.unwrap_or(defaults.price_range[0]),
                self.price_max.unwrap_or(defaults.price_range[1]),
            ],
            fuel_type: self.fuel.unwrap_or_default(),
            transmission: self.transmission.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            is_shielding: self.shielding,
            ..defaults
        };
        criteria.with_quick_tag(self.tag.unwrap_or(QuickTag::ShowAll))
    }
}

// --- Response Wrappers ---

/// One card in the visible window.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VehicleCard {
    id: String,
    title: String,
    description: Option<String>,
    brand: String,
    model: String,
    price: String,
    year: Option<u32>,
    km: u32,
    image: String,
    is_shielding: bool,
    is_zero_km: bool,
    is_consignment: bool,
    is_semi_new: bool,
    recently_added: bool,
    favorite: bool,
    detail_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VehicleListResponse {
    success: bool,
    total: usize,
    page: usize,
    total_pages: usize,
    remaining: usize,
    end_of_list: bool,
    vehicles: Vec<VehicleCard>,
    message: Option<String>,
    error: Option<String>,
}

#[derive(Serialize)]
struct FavoritesResponse {
    success: bool,
    count: usize,
    ids: Vec<String>,
}

#[derive(Serialize)]
struct ToggleResponse {
    success: bool,
    favorite: bool,
    count: usize,
    /// Transient toast text shown to the user.
    message: String,
}

#[derive(Serialize)]
struct RefreshResponse {
    success: bool,
    total: usize,
    message: String,
}

fn to_card(
    car: &VehicleRecord,
    gallery_base: &str,
    favorite: bool,
    now: chrono::DateTime<Utc>,
) -> VehicleCard {
    VehicleCard {
        id: car.id.clone(),
        title: car.title.clone(),
        description: car.description.clone(),
        brand: car.brand.clone(),
        model: car.model.clone(),
        price: format_price(&car.price),
        year: car.year,
        km: car.km,
        image: car
            .images
            .first()
            .map(|img| img.display_url().to_string())
            .unwrap_or_else(|| "/static/placeholder.svg".to_string()),
        is_shielding: car.is_shielding,
        is_zero_km: car.is_zero_km,
        is_consignment: car.is_consignment,
        is_semi_new: car.is_semi_new,
        recently_added: car.is_recently_added(now),
        favorite,
        detail_url: links::gallery_url(gallery_base, &car.title, &car.id),
    }
}

// Builds the windowed list response from the current view state. Lock order
// is view -> inventory -> favorites everywhere in this module.
async fn build_list_response(app_state: &AppState) -> VehicleListResponse {
    let view = app_state.view.lock().await;
    let inventory = app_state.inventory.read().await;
    let favorites = app_state.favorites.lock().await;

    let filtered = filter::evaluate(&inventory.vehicles, &view.criteria, &favorites.ids());
    let total = filtered.len();
    let now = Utc::now();

    let vehicles: Vec<VehicleCard> = view
        .pager
        .window(&filtered)
        .iter()
        .map(|car| {
            to_card(
                car,
                &app_state.settings.gallery_base_url,
                favorites.is_favorite(&car.id),
                now,
            )
        })
        .collect();

    let message = if total == 0 {
        if inventory.last_error.is_some() {
            Some("Não foi possível conectar ao banco de dados".to_string())
        } else {
            Some("Nenhum carro encontrado com os filtros selecionados.".to_string())
        }
    } else if view.pager.is_complete(total) {
        Some(format!("Você viu todos os {} veículos disponíveis", total))
    } else {
        None
    };

    VehicleListResponse {
        success: true,
        total,
        page: view.pager.page(),
        total_pages: VehiclePager::total_pages(total),
        remaining: view.pager.remaining(total),
        end_of_list: view.pager.is_complete(total),
        vehicles,
        message,
        error: inventory.last_error.clone(),
    }
}

// --- API Handlers ---

/// GET /api/vehicles — the filtered, sorted, windowed grid. A criteria
/// change resets the window to one page.
pub async fn list_vehicles(
    State(app_state): State<AppState>,
    Query(query): Query<VehicleQuery>,
) -> Result<impl IntoResponse, AppError> {
    let criteria = query.into_criteria();
    tracing::debug!(tag = ?criteria.active_quick_tag(), ?criteria, "API call: list_vehicles");

    {
        let mut view = app_state.view.lock().await;
        if view.criteria != criteria {
            view.criteria = criteria;
            view.pager.reset();
        }
    }

    Ok(Json(build_list_response(&app_state).await))
}

/// POST /api/vehicles/more — expands the visible window by one page.
pub async fn load_more_vehicles(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let total = {
        let view = app_state.view.lock().await;
        let inventory = app_state.inventory.read().await;
        let favorites = app_state.favorites.lock().await;
        filter::evaluate(&inventory.vehicles, &view.criteria, &favorites.ids()).len()
    };

    let advanced = {
        let mut view = app_state.view.lock().await;
        view.pager.load_more(total).await
    };
    tracing::debug!(total, advanced, "API call: load_more_vehicles");

    Ok(Json(build_list_response(&app_state).await))
}

/// POST /api/vehicles/refresh — manual retry of the snapshot fetch. On
/// failure the snapshot is cleared and the error recorded for the grid's
/// error state.
pub async fn refresh_vehicles(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!("API call: refresh_vehicles");

    match firestore::fetch_vehicles(&app_state.settings).await {
        Ok(vehicles) => {
            let total = vehicles.len();
            {
                let mut inventory = app_state.inventory.write().await;
                inventory.vehicles = vehicles;
                inventory.last_error = None;
            }
            // New snapshot, new sequence identity: the window restarts.
            app_state.view.lock().await.pager.reset();

            Ok(Json(RefreshResponse {
                success: true,
                total,
                message: format!("{} veículos carregados", total),
            }))
        }
        Err(e) => {
            tracing::error!("Failed to refresh vehicle snapshot: {}", e);
            let mut inventory = app_state.inventory.write().await;
            inventory.vehicles.clear();
            inventory.last_error = Some(e.to_string());
            drop(inventory);
            app_state.view.lock().await.pager.reset();

            Err(AppError::Fetch(e))
        }
    }
}

/// GET /api/favorites
pub async fn get_favorites(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let favorites = app_state.favorites.lock().await;
    let mut ids: Vec<String> = favorites.ids().into_iter().collect();
    ids.sort();
    Ok(Json(FavoritesResponse {
        success: true,
        count: favorites.len(),
        ids,
    }))
}

/// POST /api/favorites/:id — idempotent toggle, persisted immediately.
pub async fn toggle_favorite(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let mut favorites = app_state.favorites.lock().await;
    let now_favorite = favorites
        .toggle(&id)
        .map_err(AppError::InternalServerError)?;
    tracing::info!(vehicle = %id, favorite = now_favorite, "Toggled favorite");

    let message = if now_favorite {
        "Veículo adicionado aos favoritos".to_string()
    } else {
        "Veículo removido dos favoritos".to_string()
    };

    Ok(Json(ToggleResponse {
        success: true,
        favorite: now_favorite,
        count: favorites.len(),
        message,
    }))
}
