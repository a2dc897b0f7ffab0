pub mod health;

use anyhow::{Context, Result};
use axum::{
    http::HeaderValue,
    routing::{get, patch, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::auth::handlers as auth;
use crate::goals::handlers as goals;
use crate::layout::handlers as layout;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Sign-in
        .route("/api/v1/auth/code", post(auth::handle_request_code))
        .route("/api/v1/auth/verify", post(auth::handle_verify_code))
        .route("/api/v1/auth/signout", post(auth::handle_sign_out))
        .route("/api/v1/auth/me", get(auth::handle_me))
        // Goal lists
        .route(
            "/api/v1/goal-lists",
            get(goals::handle_list_goal_lists).post(goals::handle_create_goal_list),
        )
        .route(
            "/api/v1/goal-lists/:id",
            patch(goals::handle_update_goal_list).delete(goals::handle_delete_goal_list),
        )
        // Goals
        .route(
            "/api/v1/goal-lists/:id/goals",
            get(goals::handle_list_goals).post(goals::handle_create_goal),
        )
        .route(
            "/api/v1/goals/:id",
            patch(goals::handle_update_goal).delete(goals::handle_delete_goal),
        )
        // Rendering
        .route(
            "/api/v1/goal-lists/:id/sheet",
            get(layout::handle_goal_list_sheet),
        )
        .route("/api/v1/tracker", get(layout::handle_tracker_preview))
        .route("/api/v1/example/sheet", get(layout::handle_example_sheet))
        .with_state(state)
}

/// CORS for the web client. No configured origins allows any origin.
pub fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer> {
    if allowed_origins.is_empty() {
        return Ok(CorsLayer::permissive());
    }
    let origins = allowed_origins
        .iter()
        .map(|o| HeaderValue::from_str(o).with_context(|| format!("Invalid CORS origin '{o}'")))
        .collect::<Result<Vec<_>>>()?;
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::test_support::{TestApp, VALID_CODE};

    async fn allowed_origin_header(layer: CorsLayer, origin: &str) -> Option<String> {
        let app = Router::new()
            .route("/health", get(health::health_handler))
            .layer(layer);
        let request = Request::builder()
            .uri("/health")
            .header(header::ORIGIN, origin)
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .map(|v| v.to_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn test_cors_layer_restricts_origins() {
        let origins = vec!["https://goalsheet.app".to_string()];
        assert_eq!(
            allowed_origin_header(cors_layer(&origins).unwrap(), "https://goalsheet.app").await,
            Some("https://goalsheet.app".to_string())
        );
        assert_eq!(
            allowed_origin_header(cors_layer(&origins).unwrap(), "https://evil.example").await,
            None
        );
        assert_eq!(
            allowed_origin_header(cors_layer(&[]).unwrap(), "https://evil.example").await,
            Some("*".to_string())
        );
        assert!(cors_layer(&["bad\norigin".to_string()]).is_err());
    }

    #[tokio::test]
    async fn test_health() {
        let app = TestApp::new();
        let (status, body) = app.get_json("/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_goal_lists_require_auth() {
        let app = TestApp::new();
        let (status, body) = app.get_json("/api/v1/goal-lists", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");

        let (status, _) = app.get_json("/api/v1/goal-lists", Some("bogus")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_sign_in_flow() {
        let app = TestApp::new();
        let (status, _) = app
            .send_json("POST", "/api/v1/auth/code", None, json!({"email": "Ana@Example.com"}))
            .await;
        assert_eq!(status, StatusCode::ACCEPTED);

        let (status, _) = app
            .send_json(
                "POST",
                "/api/v1/auth/verify",
                None,
                json!({"email": "ana@example.com", "code": "000000"}),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, session) = app
            .send_json(
                "POST",
                "/api/v1/auth/verify",
                None,
                json!({"email": "ana@example.com", "code": VALID_CODE}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let token = session["access_token"].as_str().unwrap().to_string();

        let (status, me) = app.get_json("/api/v1/auth/me", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["email"], "ana@example.com");

        let (status, _) = app
            .send_json("POST", "/api/v1/auth/signout", Some(&token), Value::Null)
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = app.get_json("/api/v1/auth/me", Some(&token)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_request_code_rejects_bad_email() {
        let app = TestApp::new();
        let (status, body) = app
            .send_json("POST", "/api/v1/auth/code", None, json!({"email": "nope"}))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_goal_list_crud() {
        let app = TestApp::new();
        let token = app.sign_in("ana@example.com").await;

        let (status, list) = app
            .send_json("POST", "/api/v1/goal-lists", Some(&token), json!({"title": "  2025  "}))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(list["title"], "2025");
        let id = list["id"].as_str().unwrap().to_string();

        let (status, _) = app
            .send_json("POST", "/api/v1/goal-lists", Some(&token), json!({"title": " "}))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, renamed) = app
            .send_json(
                "PATCH",
                &format!("/api/v1/goal-lists/{id}"),
                Some(&token),
                json!({"title": "2025 Goals"}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(renamed["title"], "2025 Goals");

        let (_, lists) = app.get_json("/api/v1/goal-lists", Some(&token)).await;
        assert_eq!(lists.as_array().unwrap().len(), 1);

        let (status, _) = app
            .send_json("DELETE", &format!("/api/v1/goal-lists/{id}"), Some(&token), Value::Null)
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, lists) = app.get_json("/api/v1/goal-lists", Some(&token)).await;
        assert!(lists.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_other_users_lists_are_hidden() {
        let app = TestApp::new();
        let owner = app.sign_in("owner@example.com").await;
        let intruder = app.sign_in("intruder@example.com").await;
        let list_id = app.create_list(&owner, "Mine").await;

        let (status, _) = app
            .get_json(&format!("/api/v1/goal-lists/{list_id}/goals"), Some(&intruder))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app
            .send_json(
                "DELETE",
                &format!("/api/v1/goal-lists/{list_id}"),
                Some(&intruder),
                Value::Null,
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, lists) = app.get_json("/api/v1/goal-lists", Some(&intruder)).await;
        assert!(lists.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_goal_crud_and_ordering() {
        let app = TestApp::new();
        let token = app.sign_in("ana@example.com").await;
        let list_id = app.create_list(&token, "2025").await;
        let goals_path = format!("/api/v1/goal-lists/{list_id}/goals");

        let (status, first) = app
            .send_json(
                "POST",
                &goals_path,
                Some(&token),
                json!({"title": "Run", "category": "Physical", "goal_type": "steps", "step_count": 52, "label_style": "numeric"}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(first["order_index"], 0);
        assert_eq!(first["progress_preset"]["preset"], "weekly");

        let (_, second) = app
            .send_json(
                "POST",
                &goals_path,
                Some(&token),
                json!({"title": "Stretch", "category": "Physical", "goal_type": "checkbox"}),
            )
            .await;
        assert_eq!(second["order_index"], 1);
        assert!(second["progress_preset"].is_null());

        // A different category starts its own sequence.
        let (_, other) = app
            .send_json(
                "POST",
                &goals_path,
                Some(&token),
                json!({"title": "Budget", "category": "Financial", "goal_type": "checkbox"}),
            )
            .await;
        assert_eq!(other["order_index"], 0);

        let goal_id = second["id"].as_str().unwrap();
        let (status, updated) = app
            .send_json(
                "PATCH",
                &format!("/api/v1/goals/{goal_id}"),
                Some(&token),
                json!({"goal_type": "steps", "step_count": 12, "label_style": "monthly"}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["title"], "Stretch");
        assert_eq!(updated["goal_type"], "steps");
        assert_eq!(updated["progress_preset"]["preset"], "monthly");

        let (_, goals) = app.get_json(&goals_path, Some(&token)).await;
        let titles: Vec<&str> = goals
            .as_array()
            .unwrap()
            .iter()
            .map(|g| g["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles.len(), 3);
        assert_eq!(titles[2], "Stretch");

        let (status, _) = app
            .send_json("DELETE", &format!("/api/v1/goals/{goal_id}"), Some(&token), Value::Null)
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, goals) = app.get_json(&goals_path, Some(&token)).await;
        assert_eq!(goals.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_goal_validation() {
        let app = TestApp::new();
        let token = app.sign_in("ana@example.com").await;
        let list_id = app.create_list(&token, "2025").await;
        let goals_path = format!("/api/v1/goal-lists/{list_id}/goals");

        let (status, body) = app
            .send_json(
                "POST",
                &goals_path,
                Some(&token),
                json!({"title": "Too many", "category": "Social", "goal_type": "steps", "step_count": 1001}),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, _) = app
            .send_json(
                "POST",
                &goals_path,
                Some(&token),
                json!({"title": "Roman", "category": "Social", "goal_type": "steps", "step_count": 5, "label_style": "roman"}),
            )
            .await;
        assert!(status.is_client_error());

        let (status, _) = app
            .send_json(
                "POST",
                &goals_path,
                Some(&token),
                json!({"title": "No count", "category": "Social", "goal_type": "steps"}),
            )
            .await;
        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn test_goal_patch_uses_flat_kind_fields() {
        let app = TestApp::new();
        let token = app.sign_in("ana@example.com").await;
        let list_id = app.create_list(&token, "2025").await;
        let (_, goal) = app
            .send_json(
                "POST",
                &format!("/api/v1/goal-lists/{list_id}/goals"),
                Some(&token),
                json!({"title": "Run", "category": "Physical", "goal_type": "steps", "step_count": 52, "label_style": "numeric"}),
            )
            .await;
        let goal_path = format!("/api/v1/goals/{}", goal["id"].as_str().unwrap());

        let (status, updated) = app
            .send_json(
                "PATCH",
                &goal_path,
                Some(&token),
                json!({"step_count": 24, "label_style": "monthly"}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["goal_type"], "steps");
        assert_eq!(updated["step_count"], 24);
        assert_eq!(updated["label_style"], "monthly");

        let (status, _) = app
            .send_json(
                "PATCH",
                &goal_path,
                Some(&token),
                json!({"kind": {"goal_type": "checkbox"}}),
            )
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, body) = app
            .send_json("PATCH", &goal_path, Some(&token), json!({"step_count": 1001}))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (_, goals) = app
            .get_json(&format!("/api/v1/goal-lists/{list_id}/goals"), Some(&token))
            .await;
        assert_eq!(goals[0]["step_count"], 24);
        assert_eq!(goals[0]["label_style"], "monthly");
    }

    #[tokio::test]
    async fn test_monthly_goal_over_twelve_is_accepted() {
        let app = TestApp::new();
        let token = app.sign_in("ana@example.com").await;
        let list_id = app.create_list(&token, "2025").await;
        let (status, goal) = app
            .send_json(
                "POST",
                &format!("/api/v1/goal-lists/{list_id}/goals"),
                Some(&token),
                json!({"title": "Two years", "category": "Career", "goal_type": "steps", "step_count": 24, "label_style": "monthly"}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(goal["progress_preset"]["preset"], "count");
        assert_eq!(goal["progress_preset"]["step_count"], 24);
    }

    #[tokio::test]
    async fn test_goal_list_sheet() {
        let app = TestApp::new();
        let token = app.sign_in("ana@example.com").await;
        let list_id = app.create_list(&token, "Family <3").await;
        app.send_json(
            "POST",
            &format!("/api/v1/goal-lists/{list_id}/goals"),
            Some(&token),
            json!({"title": "Daily journal", "category": "Family", "goal_type": "steps", "step_count": 365, "label_style": "numeric"}),
        )
        .await;

        let (status, html) = app
            .get_text(&format!("/api/v1/goal-lists/{list_id}/sheet?mode=print"), Some(&token))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("<title>Family &lt;3</title>"));
        assert_eq!(html.matches("<div class=\"cell\"").count(), 365);
        assert!(html.contains("calc(100% / 40)"));
        assert!(html.contains(">360</div>"));
    }

    #[tokio::test]
    async fn test_tracker_preview() {
        let app = TestApp::new();
        let (status, body) = app
            .get_json("/api/v1/tracker?step_count=12&label_style=monthly", None)
            .await;
        assert_eq!(status, StatusCode::OK);
        let cells = body["cells"].as_array().unwrap();
        assert_eq!(cells.len(), 12);
        assert_eq!(cells[0]["label"], "Jan");
        assert_eq!(cells[11]["label"], "Dec");
        assert_eq!(cells[0]["width"]["policy"], "fill_row");
        assert!(body["html"].as_str().unwrap().contains(">Dec</div>"));
        assert!(body.get("cell_width_px").is_none());

        let (_, body) = app
            .get_json("/api/v1/tracker?step_count=365&label_style=numeric&row_width_px=320", None)
            .await;
        assert_eq!(body["cells"].as_array().unwrap().len(), 365);
        assert_eq!(body["cell_width_px"], 20.0);

        let (status, body) = app.get_json("/api/v1/tracker?step_count=0", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["cells"].as_array().unwrap().is_empty());
        assert!(body["html"].is_null());

        let (status, _) = app
            .get_json("/api/v1/tracker?step_count=5&label_style=roman", None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_tracker_preview_caps_step_count() {
        let app = TestApp::new();
        let (status, body) = app.get_json("/api/v1/tracker?step_count=1000", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cells"].as_array().unwrap().len(), 1000);

        for count in ["1001", "4000000000"] {
            let (status, body) = app
                .get_json(&format!("/api/v1/tracker?step_count={count}"), None)
                .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        }

        let (status, body) = app.get_json("/api/v1/tracker?step_count=-5", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["cells"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_example_sheet_is_public() {
        let app = TestApp::new();
        let (status, html) = app.get_text("/api/v1/example/sheet", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("Write in journal daily"));
        assert!(!html.contains("@page"));
    }
}
