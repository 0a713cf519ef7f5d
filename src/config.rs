// Application configuration, loaded from defaults, an optional config.toml
// and APP_-prefixed environment variables.

use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server_address: String,
    /// Google Cloud project hosting the inventory Firestore database.
    pub firebase_project_id: Option<String>,
    /// Firestore collection holding the car documents.
    pub cars_collection: String,
    /// Path of the JSON file backing the favorites set.
    pub favorites_path: String,
    /// Base domain for outbound detail-page links.
    pub gallery_base_url: String,
}

impl Settings {
    pub fn new() -> Result<Self> {
        dotenv::dotenv().ok(); // Load .env file if present

        let builder = Config::builder()
            .set_default("server_address", "127.0.0.1:3000")?
            .set_default("cars_collection", "cars")?
            .set_default("favorites_path", "favorites.json")?
            .set_default("gallery_base_url", "https://carronamidia.vercel.app")?
            // Load from a configuration file (e.g., config.toml)
            .add_source(File::with_name("config").required(false))
            // Load from environment variables (e.g., APP_FIREBASE_PROJECT_ID)
            .add_source(Environment::with_prefix("APP").separator("_"));

        let settings = builder.build()?.try_deserialize()?;
        Ok(settings)
    }
}
