// Functions for interacting with Google Cloud Firestore.
//
// The inventory lives in a "cars" collection and is read once per session
// (plus manual retry) through the Firestore REST API: a structured query for
// documents where active == true, converted into VehicleRecords at this
// boundary and immutable afterwards.

use std::collections::HashMap;
use std::env;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use yup_oauth2::{ServiceAccountAuthenticator, ServiceAccountKey};

use crate::config::Settings;
use crate::error::FetchError;
use crate::models::{split_title, VehicleImage, VehicleRecord};

const FIRESTORE_SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/datastore",
    "https://www.googleapis.com/auth/cloud-platform",
];

// Gets an authenticated reqwest client using service account credentials.
// Reads the credentials path from the GOOGLE_APPLICATION_CREDENTIALS env var.
pub async fn get_authenticated_client() -> Result<Client> {
    let creds_path = env::var("GOOGLE_APPLICATION_CREDENTIALS")
        .context("GOOGLE_APPLICATION_CREDENTIALS environment variable not set")?;

    let sa_key: ServiceAccountKey = yup_oauth2::read_service_account_key(&creds_path)
        .await
        .context("Failed to read service account key file")?;

    let auth = ServiceAccountAuthenticator::builder(sa_key)
        .build()
        .await
        .context("Failed to create service account authenticator")?;

    let token = auth
        .token(&FIRESTORE_SCOPES)
        .await
        .context("Failed to get OAuth2 token")?;

    let mut headers = HeaderMap::new();
    let auth_value = format!(
        "Bearer {}",
        token.token().ok_or_else(|| anyhow!("Token string is empty"))?
    );
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&auth_value).context("Failed to create Authorization header")?,
    );

    let client = Client::builder()
        .default_headers(headers)
        .build()
        .context("Failed to build authenticated reqwest client")?;

    Ok(client)
}

// --- Firestore Response Structures ---

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct FirestoreValue {
    string_value: Option<String>,
    integer_value: Option<String>, // Firestore integers arrive as strings
    double_value: Option<f64>,
    boolean_value: Option<bool>,
    timestamp_value: Option<String>,
    array_value: Option<FirestoreArrayValue>,
    map_value: Option<FirestoreMapValue>,
}

#[derive(Deserialize, Debug, Default)]
struct FirestoreArrayValue {
    values: Option<Vec<FirestoreValue>>,
}

#[derive(Deserialize, Debug)]
struct FirestoreMapValue {
    fields: HashMap<String, FirestoreValue>,
}

#[derive(Deserialize, Debug)]
struct FirestoreDocument {
    name: String,
    fields: HashMap<String, FirestoreValue>,
}

#[derive(Deserialize, Debug)]
struct RunQueryElement {
    document: Option<FirestoreDocument>,
}

// --- Field extraction helpers ---

fn extract_doc_id(name: &str) -> Option<String> {
    name.split('/').next_back().map(|s| s.to_string())
}

fn get_string_field<'a>(fields: &'a HashMap<String, FirestoreValue>, key: &str) -> Option<&'a str> {
    fields.get(key)?.string_value.as_deref()
}

fn get_boolean_field(fields: &HashMap<String, FirestoreValue>, key: &str) -> bool {
    fields
        .get(key)
        .and_then(|v| v.boolean_value)
        .unwrap_or(false)
}

// Numeric fields are stored inconsistently (stringValue, integerValue or
// doubleValue depending on who wrote the document), so try all three.
fn get_numeric_field(fields: &HashMap<String, FirestoreValue>, key: &str) -> Option<i64> {
    let value = fields.get(key)?;
    if let Some(s) = value.string_value.as_deref() {
        if let Ok(parsed) = s.trim().parse::<i64>() {
            return Some(parsed);
        }
    }
    if let Some(s) = value.integer_value.as_deref() {
        if let Ok(parsed) = s.parse::<i64>() {
            return Some(parsed);
        }
    }
    value.double_value.map(|d| d as i64)
}

/// Normalizes the heterogeneous timestamp shapes the store produces (native
/// timestampValue, RFC 3339 string, plain date string) to a comparable
/// instant. The single conversion used everywhere timestamps are compared.
fn to_instant(value: &FirestoreValue) -> Option<DateTime<Utc>> {
    let raw = value
        .timestamp_value
        .as_deref()
        .or(value.string_value.as_deref())?;

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    None
}

// Image entries are either plain URL strings or maps with url/base64 fields.
fn to_image(value: &FirestoreValue) -> VehicleImage {
    if let Some(url) = value.string_value.as_deref() {
        return VehicleImage::from_url(url);
    }
    if let Some(map) = &value.map_value {
        return VehicleImage {
            url: get_string_field(&map.fields, "url").map(str::to_string),
            base64: get_string_field(&map.fields, "base64").map(str::to_string),
        };
    }
    VehicleImage::default()
}

fn get_images(fields: &HashMap<String, FirestoreValue>) -> Vec<VehicleImage> {
    fields
        .get("images")
        .and_then(|v| v.array_value.as_ref())
        .and_then(|arr| arr.values.as_ref())
        .map(|values| values.iter().map(to_image).collect())
        .unwrap_or_default()
}

/// Maps one raw store document to a VehicleRecord. Returns None when the
/// document has no usable id or fewer than 2 images (presumed incomplete
/// listings, dropped at fetch time).
fn document_to_vehicle(doc: &FirestoreDocument) -> Option<VehicleRecord> {
    let id = extract_doc_id(&doc.name)?;
    let fields = &doc.fields;

    let images = get_images(fields);
    if images.len() < 2 {
        tracing::debug!(doc = %doc.name, images = images.len(), "Skipping listing with fewer than 2 images");
        return None;
    }

    let title = get_string_field(fields, "title").unwrap_or("").to_string();
    let (brand, model) = split_title(&title);

    Some(VehicleRecord {
        id,
        brand,
        model,
        description: get_string_field(fields, "description").map(str::to_string),
        price: get_string_field(fields, "price").unwrap_or("").to_string(),
        year: get_numeric_field(fields, "year").and_then(|y| u32::try_from(y).ok()),
        km: get_numeric_field(fields, "km")
            .and_then(|km| u32::try_from(km).ok())
            .unwrap_or(0),
        category: get_string_field(fields, "category").map(str::to_string),
        color: get_string_field(fields, "color").map(str::to_string),
        is_shielding: get_boolean_field(fields, "isShielding"),
        is_zero_km: get_boolean_field(fields, "isZeroKm"),
        is_consignment: get_boolean_field(fields, "isConsignment"),
        is_semi_new: get_boolean_field(fields, "isSemiNovo"),
        in_preparation: get_boolean_field(fields, "inPreparation"),
        in_transit: get_boolean_field(fields, "inTransit"),
        active: get_boolean_field(fields, "active"),
        featured: get_boolean_field(fields, "featured"),
        images,
        created_at: fields.get("createdAt").and_then(to_instant),
        updated_at: fields.get("updatedAt").and_then(to_instant),
        title,
    })
}

// Most recently updated first; records with any updatedAt sort before
// records without one.
fn sort_by_most_recent(vehicles: &mut [VehicleRecord]) {
    vehicles.sort_by(|a, b| match (a.updated_at, b.updated_at) {
        (Some(a_updated), Some(b_updated)) => b_updated.cmp(&a_updated),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

/// Fetches the full active-vehicle snapshot: queries the cars collection for
/// active documents, converts them, drops incomplete listings and sorts by
/// most recent update.
pub async fn fetch_vehicles(settings: &Settings) -> Result<Vec<VehicleRecord>, FetchError> {
    let client = get_authenticated_client()
        .await
        .map_err(|e| FetchError::Auth(e.to_string()))?;

    let project_id = settings
        .firebase_project_id
        .as_deref()
        .ok_or_else(|| FetchError::Auth("Firebase project ID not configured".to_string()))?;

    let url = format!(
        "https://firestore.googleapis.com/v1/projects/{}/databases/(default)/documents:runQuery",
        project_id
    );

    let query = json!({
        "structuredQuery": {
            "from": [{ "collectionId": settings.cars_collection }],
            "where": {
                "fieldFilter": {
                    "field": { "fieldPath": "active" },
                    "op": "EQUAL",
                    "value": { "booleanValue": true }
                }
            }
        }
    });

    let response = client
        .post(&url)
        .json(&query)
        .send()
        .await?
        .error_for_status()?;

    let elements: Vec<RunQueryElement> = response
        .json()
        .await
        .map_err(|e| FetchError::Malformed(e.to_string()))?;

    let mut vehicles: Vec<VehicleRecord> = elements
        .iter()
        .filter_map(|el| el.document.as_ref())
        .filter_map(document_to_vehicle)
        .collect();

    sort_by_most_recent(&mut vehicles);

    tracing::info!(
        count = vehicles.len(),
        collection = %settings.cars_collection,
        "Fetched vehicle snapshot from Firestore"
    );
    Ok(vehicles)
}
