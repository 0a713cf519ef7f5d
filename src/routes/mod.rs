// Route definitions.

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

mod api;
mod static_pages;

pub fn create_router(app_state: AppState) -> Router {
    let api_router = Router::new()
        .route("/vehicles", get(api::list_vehicles))
        .route("/vehicles/more", post(api::load_more_vehicles))
        .route("/vehicles/refresh", post(api::refresh_vehicles))
        .route("/favorites", get(api::get_favorites))
        .route("/favorites/:id", post(api::toggle_favorite))
        .with_state(app_state.clone());

    Router::new()
        .route("/", get(static_pages::showroom_page))
        .nest("/api", api_router)
        .with_state(app_state)
}
