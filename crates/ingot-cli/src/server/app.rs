//! Axum application setup.

use axum::{
    extract::DefaultBodyLimit,
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::handlers;
use super::state::AppState;

/// Create the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route(
            "/tables",
            get(handlers::list_tables).post(handlers::upload_table),
        )
        .route(
            "/tables/:id",
            get(handlers::get_table).delete(handlers::delete_table),
        )
        .route("/tables/:id/data", get(handlers::get_table_data));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(state.max_file_size))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the web server and run until Ctrl+C.
pub async fn run_server(state: AppState, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use ingot::{Ingot, MetadataStore, SqlCatalog, SqliteEngine};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;

    const OWNER: &str = "a1b2c3d4-e5f6-7890";
    const BOUNDARY: &str = "ingot-test-boundary";

    async fn test_router() -> Router {
        let engine = Arc::new(SqliteEngine::in_memory().await.unwrap());
        let catalog = Arc::new(SqlCatalog::new(engine.clone()));
        catalog.migrate().await.unwrap();
        let ingot = Ingot::new(engine, catalog);
        create_router(AppState::new(ingot, 1024 * 1024))
    }

    fn multipart_body(filename: &str, csv: &str, table_name: Option<&str>) -> String {
        let mut body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\n\
             Content-Type: text/csv\r\n\r\n{csv}\r\n",
            b = BOUNDARY,
            f = filename,
            csv = csv
        );
        if let Some(name) = table_name {
            body.push_str(&format!(
                "--{b}\r\nContent-Disposition: form-data; name=\"table_name\"\r\n\r\n{n}\r\n",
                b = BOUNDARY,
                n = name
            ));
        }
        body.push_str(&format!("--{}--\r\n", BOUNDARY));
        body
    }

    fn upload_request(body: String) -> Request<Body> {
        Request::post("/api/tables")
            .header("x-owner-id", OWNER)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::get(uri)
            .header("x-owner-id", OWNER)
            .body(Body::empty())
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_router().await;
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "healthy");
    }

    #[tokio::test]
    async fn test_missing_owner_is_unauthorized() {
        let app = test_router().await;
        let response = app
            .oneshot(Request::get("/api/tables").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_upload_list_read_delete() {
        let app = test_router().await;

        let body = multipart_body("sales.csv", "Name,Qty\nwidget,3\ngadget,5\n", Some("Sales"));
        let response = app.clone().oneshot(upload_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = json_body(response).await;
        assert_eq!(created["rows_imported"], 2);
        assert_eq!(created["columns"], serde_json::json!(["name", "qty"]));
        assert_eq!(created["message"], "Data imported successfully");
        let id = created["table_id"].as_str().unwrap().to_string();

        let response = app.clone().oneshot(get_request("/api/tables")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let listed = json_body(response).await;
        assert_eq!(listed["total"], 1);
        assert_eq!(listed["tables"][0]["name"], "Sales");
        assert_eq!(listed["tables"][0]["filename"], "sales.csv");

        let response = app
            .clone()
            .oneshot(get_request(&format!("/api/tables/{}/data?page=1&limit=1", id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let page = json_body(response).await;
        assert_eq!(page["data"][0]["name"], "widget");
        assert_eq!(page["data"][0]["qty"], 3);
        assert_eq!(page["pagination"]["total_pages"], 2);
        assert_eq!(page["pagination"]["has_next"], true);

        let response = app
            .clone()
            .oneshot(
                Request::delete(format!("/api/tables/{}", id))
                    .header("x-owner-id", OWNER)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["table_id"], id.as_str());

        let response = app
            .oneshot(get_request(&format!("/api/tables/{}", id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_upload_rejects_non_csv() {
        let app = test_router().await;
        let body = multipart_body("sales.txt", "a\n1\n", Some("Sales"));
        let response = app.oneshot(upload_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["message"], "Only CSV files are supported");
    }

    #[tokio::test]
    async fn test_upload_requires_table_name() {
        let app = test_router().await;
        let body = multipart_body("sales.csv", "a\n1\n", None);
        let response = app.oneshot(upload_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_header_only_is_bad_request() {
        let app = test_router().await;
        let body = multipart_body("empty.csv", "a,b\n", Some("Empty"));
        let response = app.oneshot(upload_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_bad_row_is_unprocessable() {
        let app = test_router().await;
        let body = multipart_body("bad.csv", "n\n1\n2\n3\n4\nx\n", Some("Bad"));
        let response = app.oneshot(upload_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
