use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::{Mutex, RwLock};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Settings;
use crate::favorites::{FavoritesStore, FileBackend};
use crate::models::{FilterCriteria, VehicleRecord};
use crate::pagination::VehiclePager;

mod config;
mod error;
mod favorites;
mod filter;
mod firestore;
mod links;
mod models;
mod pagination;
mod routes;

/// The in-memory result of the most recent snapshot fetch. Cleared (and the
/// error recorded) when a fetch fails; replaced wholesale on refresh.
#[derive(Default)]
pub struct Inventory {
    pub vehicles: Vec<VehicleRecord>,
    pub last_error: Option<String>,
}

/// The grid's view state: current criteria plus the visible-window pager.
/// The pager resets whenever the criteria are replaced.
#[derive(Default)]
pub struct GridView {
    pub criteria: FilterCriteria,
    pub pager: VehiclePager,
}

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub inventory: Arc<RwLock<Inventory>>,
    pub favorites: Arc<Mutex<FavoritesStore>>,
    pub view: Arc<Mutex<GridView>>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "showroom_rust=info,tower_http=info".into()),
        )
        .with(fmt::layer())
        .init();

    tracing::info!("Initializing showroom server...");

    let settings = match Settings::new() {
        Ok(s) => {
            tracing::info!("Configuration loaded successfully.");
            Arc::new(s)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    let favorites = FavoritesStore::load(Box::new(FileBackend::new(&settings.favorites_path)))
        .context("Failed to load favorites store")?;
    tracing::info!(count = favorites.len(), "Favorites store loaded.");

    // One-shot snapshot fetch. Failure is not fatal: the grid renders its
    // error state and the refresh endpoint retries on demand.
    let inventory = match firestore::fetch_vehicles(&settings).await {
        Ok(vehicles) => {
            tracing::info!(count = vehicles.len(), "Initial vehicle snapshot loaded.");
            Inventory {
                vehicles,
                last_error: None,
            }
        }
        Err(e) => {
            tracing::error!("Initial vehicle fetch failed: {}", e);
            Inventory {
                vehicles: Vec::new(),
                last_error: Some(e.to_string()),
            }
        }
    };

    let app_state = AppState {
        settings: settings.clone(),
        inventory: Arc::new(RwLock::new(inventory)),
        favorites: Arc::new(Mutex::new(favorites)),
        view: Arc::new(Mutex::new(GridView::default())),
    };

    let router: Router = routes::create_router(app_state);
    let app = router
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = settings
        .server_address
        .parse()
        .with_context(|| format!("Invalid server address format: {}", settings.server_address))?;

    let listener = match TcpListener::bind(&addr).await {
        Ok(l) => {
            tracing::info!("Server listening on {}", addr);
            l
        }
        Err(e) => {
            tracing::error!("Failed to bind to address {}: {}", addr, e);
            return Err(e.into());
        }
    };

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
