use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Json;
use axum::routing::post;
use axum::Router;
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_create_trip_envelope_shape() {
    let app = create_test_app();
    let payload = json!({
        "requester_id": "6f1c5f4e-8d7a-4c2b-9f3e-1a2b3c4d5e6f",
        "purpose": "Visita a planta",
        "from_location": "Oficina central",
        "to_location": "Planta norte",
        "from_time": "2026-09-01T09:00:00Z",
        "to_time": "2026-09-01T12:00:00Z",
        "company": "head_office",
        "vehicle_category": "FLEET"
    });

    let response = app
        .oneshot(
            Request::post("/api/trip")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["success"], true);
    assert!(body["data"].is_object());
    assert!(body["message"].is_string());
}

// App de test básica con la misma forma de respuesta que la API real;
// el flujo completo contra la base se ejercita aparte.
fn create_test_app() -> Router {
    Router::new().route(
        "/api/trip",
        post(|| async {
            Json(json!({
                "success": true,
                "data": { "status": "requested" },
                "message": "Solicitud de viaje creada exitosamente"
            }))
        }),
    )
}
