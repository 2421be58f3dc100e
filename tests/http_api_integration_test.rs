// HTTP API Integration Tests
// Exercises the complete REST surface with real HTTP requests against a
// server bound to a random port.

use anyhow::Result;
use garasi::{catalog_store::CatalogStore, start_server};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::{sync::Mutex, time::Duration};

fn seed_catalog() -> Value {
    json!({
        "car": {
            "sedan": [
                { "name": "Civic", "description": "compact sedan", "releaseYear": 2020 },
                { "name": "Model 3", "description": "electric sedan", "releaseYear": 2021 }
            ],
            "suv": [
                { "name": "CR-V", "description": "compact suv", "releaseYear": 2020 }
            ]
        },
        "motorcycle": {
            "sport": [
                { "name": "Ninja", "description": "sport bike", "releaseYear": 2020 },
                { "name": "Relic", "description": "year lost to time", "releaseYear": "unknown" }
            ]
        }
    })
}

/// Start a server on a random available port over a freshly seeded catalog.
async fn start_test_server(stale_views: bool) -> (String, TempDir, tokio::task::JoinHandle<Result<()>>) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("db.json");
    std::fs::write(&db_path, seed_catalog().to_string()).expect("Failed to seed catalog");

    let store = CatalogStore::load(&db_path, stale_views)
        .await
        .expect("Failed to load catalog");
    let store = Arc::new(Mutex::new(store));

    // Use port 0 to get an available port automatically
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to port");
    let port = listener.local_addr().unwrap().port();
    drop(listener); // Close the listener so the server can bind to it

    let server_handle = tokio::spawn(async move { start_server(store, port).await });

    // Give the server a moment to start
    tokio::time::sleep(Duration::from_millis(100)).await;

    (format!("http://127.0.0.1:{port}"), temp_dir, server_handle)
}

#[tokio::test]
async fn test_health_check_endpoint() -> Result<()> {
    let (base_url, _temp_dir, server_handle) = start_test_server(false).await;
    let client = Client::new();

    let response = client.get(format!("{base_url}/health")).send().await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await?;
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());

    server_handle.abort();
    Ok(())
}

#[tokio::test]
async fn test_lookup_endpoints() -> Result<()> {
    let (base_url, _temp_dir, server_handle) = start_test_server(false).await;
    let client = Client::new();

    // Whole category
    let response = client.get(format!("{base_url}/all/car")).send().await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["data"]["sedan"].as_array().unwrap().len(), 2);
    assert_eq!(body["message"], "success");

    // One type
    let response = client
        .get(format!("{base_url}/all/car/sedan"))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["data"][0]["name"], "Civic");

    // Case-insensitive name lookup
    let response = client
        .get(format!("{base_url}/car/sedan/cIvIc"))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["data"]["name"], "Civic");

    // Unknown paths
    for uri in ["/all/plane", "/all/car/coupe", "/car/sedan/ghost"] {
        let response = client.get(format!("{base_url}{uri}")).send().await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "uri: {uri}");
    }

    server_handle.abort();
    Ok(())
}

#[tokio::test]
async fn test_release_year_lookup_unions_categories() -> Result<()> {
    let (base_url, _temp_dir, server_handle) = start_test_server(false).await;
    let client = Client::new();

    let response = client.get(format!("{base_url}/2020")).send().await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["name"].as_str().unwrap())
        .collect();
    // Across both categories; the vehicle with an unparsable year never shows up.
    assert_eq!(names, ["Civic", "CR-V", "Ninja"]);

    let response = client.get(format!("{base_url}/1999")).send().await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Non-numeric year segment matches nothing (and is not confused with a
    // category, which would need three segments).
    let response = client.get(format!("{base_url}/someday")).send().await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    server_handle.abort();
    Ok(())
}

#[tokio::test]
async fn test_vehicle_lifecycle() -> Result<()> {
    let (base_url, _temp_dir, server_handle) = start_test_server(false).await;
    let client = Client::new();

    // Create
    let new_vehicle = json!({
        "name": "Accord",
        "description": "mid-size sedan",
        "releaseYear": 2023,
        "trim": "Touring"
    });
    let response = client
        .post(format!("{base_url}/add/car/sedan"))
        .json(&new_vehicle)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await?;
    assert_eq!(body["data"], new_vehicle);
    assert_eq!(body["message"], "Created");

    // Duplicate name, case-insensitive
    let dup = json!({ "name": "ACCORD", "description": "again", "releaseYear": 2024 });
    let response = client
        .post(format!("{base_url}/add/car/sedan"))
        .json(&dup)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body["message"], "Data With That Name Already Existed");

    // Update replaces the whole record
    let replacement = json!({
        "name": "Accord",
        "description": "facelift",
        "releaseYear": 2025
    });
    let response = client
        .put(format!("{base_url}/update/car/sedan/accord"))
        .json(&replacement)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["data"], replacement);

    let response = client
        .get(format!("{base_url}/car/sedan/accord"))
        .send()
        .await?;
    let body: Value = response.json().await?;
    // The pre-update extra field must be gone.
    assert!(body["data"].get("trim").is_none());
    assert_eq!(body["data"]["description"], "facelift");

    // Delete, case-insensitive
    let response = client
        .delete(format!("{base_url}/delete/car/sedan/ACCORD"))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body, json!({ "message": "Deleted" }));

    let response = client
        .get(format!("{base_url}/car/sedan/accord"))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Deleting again is a 404
    let response = client
        .delete(format!("{base_url}/delete/car/sedan/accord"))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await?;
    assert_eq!(body["message"], "Data not found");

    server_handle.abort();
    Ok(())
}

#[tokio::test]
async fn test_validation_failures() -> Result<()> {
    let (base_url, _temp_dir, server_handle) = start_test_server(false).await;
    let client = Client::new();

    let response = client
        .post(format!("{base_url}/add/car/sedan"))
        .json(&json!({ "name": "NSX" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body["message"], "\"description\" is required");

    let response = client
        .post(format!("{base_url}/add/car/sedan"))
        .json(&json!({ "name": "NSX", "description": "x", "releaseYear": "2020" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body["message"], "\"releaseYear\" must be a number");

    let response = client
        .post(format!("{base_url}/add-category"))
        .json(&json!({}))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body["message"], "\"name\" is required");

    server_handle.abort();
    Ok(())
}

#[tokio::test]
async fn test_category_and_type_creation() -> Result<()> {
    let (base_url, _temp_dir, server_handle) = start_test_server(false).await;
    let client = Client::new();

    // New category shows up in the returned catalog and is readable at once
    let response = client
        .post(format!("{base_url}/add-category"))
        .json(&json!({ "name": "boat" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await?;
    assert!(body["data"]["boat"].is_object());
    assert_eq!(body["message"], "Created new category");

    let response = client.get(format!("{base_url}/all/boat")).send().await?;
    assert_eq!(response.status(), StatusCode::OK);

    // Conflicts
    let response = client
        .post(format!("{base_url}/add-category"))
        .json(&json!({ "name": "boat" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await?;
    assert_eq!(body["message"], "Category Already Exists");

    // New type under the new category, then a vehicle under it
    let response = client
        .post(format!("{base_url}/add-type/boat"))
        .json(&json!({ "name": "yacht" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await?;
    assert_eq!(body["message"], "Created new type");

    let response = client
        .post(format!("{base_url}/add/boat/yacht"))
        .json(&json!({ "name": "Sunseeker", "description": "luxury", "releaseYear": 2019 }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = client
        .post(format!("{base_url}/add-type/boat"))
        .json(&json!({ "name": "yacht" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = client
        .post(format!("{base_url}/add-type/plane"))
        .json(&json!({ "name": "jet" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await?;
    assert_eq!(body["message"], "Category Not Found");

    server_handle.abort();
    Ok(())
}

#[tokio::test]
async fn test_stale_views_reproduce_snapshot_behavior() -> Result<()> {
    let (base_url, _temp_dir, server_handle) = start_test_server(true).await;
    let client = Client::new();

    let response = client
        .post(format!("{base_url}/add-category"))
        .json(&json!({ "name": "boat" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    // The category was persisted but the load-time snapshot gates reads.
    let response = client.get(format!("{base_url}/all/boat")).send().await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    server_handle.abort();
    Ok(())
}
