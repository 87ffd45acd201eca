//! Item endpoints.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use entities::{Item, ItemId, ItemUpdate};
use serde::Deserialize;

use crate::error::ServerResult;
use crate::state::AppState;

/// Body of a create request.
#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    #[serde(alias = "name")]
    pub text: String,
}

/// Lists all items.
pub async fn list_items(State(state): State<AppState>) -> ServerResult<Json<Vec<Item>>> {
    let items = state.persistence.get_items().await?;
    Ok(Json(items))
}

/// Creates an item.
pub async fn add_item(
    State(state): State<AppState>,
    payload: Result<Json<CreateItemRequest>, JsonRejection>,
) -> ServerResult<(StatusCode, Json<Item>)> {
    let Json(request) = payload?;
    let item = state.persistence.add_item(&request.text).await?;

    tracing::info!(item_id = item.id, "Item created");

    Ok((StatusCode::CREATED, Json(item)))
}

/// Gets an item by ID.
pub async fn get_item(
    State(state): State<AppState>,
    id: Result<Path<ItemId>, PathRejection>,
) -> ServerResult<Json<Item>> {
    let Path(id) = id?;
    let item = state.persistence.get_item(id).await?;
    Ok(Json(item))
}

/// Updates an item's status and, optionally, its text.
pub async fn update_item(
    State(state): State<AppState>,
    id: Result<Path<ItemId>, PathRejection>,
    payload: Result<Json<ItemUpdate>, JsonRejection>,
) -> ServerResult<Json<Item>> {
    let Path(id) = id?;
    let Json(update) = payload?;
    let item = state.persistence.update_item(id, update).await?;

    tracing::info!(item_id = id, completed = item.completed, "Item updated");

    Ok(Json(item))
}

/// Deletes an item.
pub async fn delete_item(
    State(state): State<AppState>,
    id: Result<Path<ItemId>, PathRejection>,
) -> ServerResult<Json<Item>> {
    let Path(id) = id?;
    let item = state.persistence.delete_item(id).await?;

    tracing::info!(item_id = id, "Item deleted");

    Ok(Json(item))
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request},
        Router,
    };
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use todo_store::{Persistence, SqliteConfig, StoreConfig};
    use tower::ServiceExt;

    use super::*;
    use crate::{config::ServerConfig, create_app};

    async fn test_app() -> (TempDir, Router) {
        let dir = TempDir::new().unwrap();
        let config = StoreConfig::Sqlite(SqliteConfig::new(dir.path().join("todo.db")));
        let persistence = Persistence::open(&config).await.unwrap();
        let state = AppState::with_persistence(ServerConfig::default(), persistence);
        (dir, create_app(state))
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::String(
                String::from_utf8_lossy(&bytes).to_string(),
            ))
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_buy_milk_scenario() {
        let (_dir, app) = test_app().await;

        let (status, created) =
            send(&app, Method::POST, "/items", Some(json!({"name": "Buy milk"}))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["text"], "Buy milk");
        assert_eq!(created["completed"], false);
        let id = created["id"].as_i64().unwrap();

        let (status, items) = send(&app, Method::GET, "/items", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(items.as_array().unwrap().len(), 1);

        let (status, updated) = send(
            &app,
            Method::PUT,
            &format!("/items/{}", id),
            Some(json!({"completed": true})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["completed"], true);
        assert_eq!(updated["text"], "Buy milk");

        let (_, fetched) = send(&app, Method::GET, &format!("/items/{}", id), None).await;
        assert_eq!(fetched, updated);

        let (status, deleted) = send(&app, Method::DELETE, &format!("/items/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(deleted["id"], id);

        let (_, items) = send(&app, Method::GET, "/items", None).await;
        assert_eq!(items, json!([]));
    }

    #[tokio::test]
    async fn test_invalid_input() {
        let (_dir, app) = test_app().await;

        let (status, body) = send(&app, Method::POST, "/items", Some(json!({"text": "  "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "invalid_request");

        let (status, body) = send(&app, Method::POST, "/items", Some(json!({"text": 5}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "invalid_request");

        let (status, _) = send(
            &app,
            Method::PUT,
            "/items/not-a-number",
            Some(json!({"completed": true})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, items) = send(&app, Method::GET, "/items", None).await;
        assert_eq!(items, json!([]));
    }

    #[tokio::test]
    async fn test_missing_item() {
        let (_dir, app) = test_app().await;

        let (status, body) = send(
            &app,
            Method::PUT,
            "/items/41",
            Some(json!({"completed": true})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "not_found");

        let (status, _) = send(&app, Method::DELETE, "/items/41", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Method::GET, "/items/41", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_closed_store_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let config = StoreConfig::Sqlite(SqliteConfig::new(dir.path().join("todo.db")));
        let persistence = Persistence::open(&config).await.unwrap();
        let app = create_app(AppState::with_persistence(
            ServerConfig::default(),
            persistence.clone(),
        ));
        persistence.close().await;

        let (status, body) = send(&app, Method::GET, "/items", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "storage_unavailable");
    }

    #[tokio::test]
    async fn test_health() {
        let (_dir, app) = test_app().await;
        let (status, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::String("OK".to_string()));
    }
}
