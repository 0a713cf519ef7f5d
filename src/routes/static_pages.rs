use askama::Template;
use axum::extract::State;
use axum::response::{Html, IntoResponse};

use crate::error::AppError;
use crate::AppState;

// The showroom page: hero banner plus the grid shell the front-end script
// fills from /api/vehicles.
#[derive(Template)]
#[template(path = "index.html")]
struct ShowroomTemplate {
    total_vehicles: usize,
    store_error: bool,
}

pub async fn showroom_page(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let inventory = app_state.inventory.read().await;
    let template = ShowroomTemplate {
        total_vehicles: inventory.vehicles.len(),
        store_error: inventory.last_error.is_some(),
    };
    match template.render() {
        Ok(html) => Ok(Html(html)),
        Err(e) => {
            tracing::error!("Failed to render showroom template: {}", e);
            Err(AppError::InternalServerError(anyhow::Error::new(e)))
        }
    }
}
