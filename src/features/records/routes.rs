use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use crate::features::records::handlers;
use crate::features::records::selectors::RecordSelector;
use crate::features::records::services::RecordService;
use crate::modules::storage::BlobStorage;

/// Shared state for the record endpoints
#[derive(Clone)]
pub struct RecordsState {
    pub selector: Arc<RecordSelector>,
    pub service: Arc<RecordService>,
    pub storage: Arc<dyn BlobStorage>,
}

pub fn routes(state: RecordsState) -> Router {
    Router::new()
        .route("/records/", get(handlers::list_records))
        .route("/records/create/", post(handlers::create_record))
        .route("/records/{id}/", get(handlers::retrieve_record))
        .route(
            "/records/{id}/update/",
            put(handlers::update_record).patch(handlers::partial_update_record),
        )
        .route("/records/{id}/delete/", delete(handlers::delete_record))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::Role;
    use crate::shared::test_helpers::{
        make_record, with_role_auth, MemoryBlobStorage, MemoryRecordStore,
    };
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    const BOUNDARY: &str = "test-boundary";

    fn build_state() -> (RecordsState, Arc<MemoryRecordStore>) {
        let store = Arc::new(MemoryRecordStore::new());
        let storage = Arc::new(MemoryBlobStorage::new());
        let state = RecordsState {
            selector: Arc::new(RecordSelector::new(store.clone())),
            service: Arc::new(RecordService::new(store.clone(), storage.clone())),
            storage,
        };
        (state, store)
    }

    fn app(role: Role) -> (Router, Arc<MemoryRecordStore>) {
        let (state, store) = build_state();
        (with_role_auth(routes(state), role), store)
    }

    fn form_body(fields: &[(&str, &str)]) -> Body {
        let mut body = String::new();
        for (name, value) in fields {
            body.push_str(&format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            ));
        }
        body.push_str(&format!("--{}--\r\n", BOUNDARY));
        Body::from(body)
    }

    fn multipart_request(method: &str, uri: &str, fields: &[(&str, &str)]) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(form_body(fields))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn requests_without_a_principal_are_unauthorized() {
        let (state, _) = build_state();
        let app = routes(state);

        let response = app
            .oneshot(Request::builder().uri("/records/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn viewer_can_read_but_not_write() {
        let (app, store) = app(Role::Viewer);
        store.push(make_record("Doc", true));

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/records/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(multipart_request(
                "POST",
                "/records/create/",
                &[("title", "New")],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Editor or Admin role required.");
    }

    #[tokio::test]
    async fn editor_can_create_but_not_delete() {
        let (app, store) = app(Role::Editor);

        let response = app
            .clone()
            .oneshot(multipart_request(
                "POST",
                "/records/create/",
                &[("title", "Minutes"), ("description", "Q3 meeting")],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(store.len(), 1);

        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["title"], "Minutes");
        let id = json["data"]["id"].as_str().unwrap().to_string();

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/records/{}/delete/", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn admin_delete_removes_the_record() {
        let (app, store) = app(Role::Admin);
        let record = make_record("Doc", true);
        store.push(record.clone());

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/records/{}/delete/", record.id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(store.len(), 0);

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/records/{}/", record.id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Resource not found");
    }

    #[tokio::test]
    async fn create_without_title_reports_the_missing_field() {
        let (app, store) = app(Role::Editor);

        let response = app
            .oneshot(multipart_request(
                "POST",
                "/records/create/",
                &[("description", "no title here")],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(store.len(), 0);
        let json = body_json(response).await;
        assert_eq!(json["errors"]["title"][0], "This field is required.");
    }

    #[tokio::test]
    async fn put_requires_title_while_patch_is_partial() {
        let (app, store) = app(Role::Editor);
        let record = make_record("Doc", true);
        store.push(record.clone());

        let response = app
            .clone()
            .oneshot(multipart_request(
                "PATCH",
                &format!("/records/{}/update/", record.id),
                &[("description", "amended")],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["title"], "Doc");
        assert_eq!(json["data"]["description"], "amended");

        let response = app
            .oneshot(multipart_request(
                "PUT",
                &format!("/records/{}/update/", record.id),
                &[("description", "amended again")],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["errors"]["title"][0], "This field is required.");
    }


    #[tokio::test]
    async fn malformed_parameters_are_rejected_with_the_envelope() {
        let (app, store) = app(Role::Viewer);
        store.push(make_record("Doc", true));

        for uri in [
            "/records/?created_at_after=not-a-date",
            "/records/?page=abc",
            "/records/not-a-uuid/",
        ] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);

            let json = body_json(response).await;
            assert_eq!(json["success"], false, "{}", uri);
            assert!(json["message"].is_string(), "{}", uri);
        }
    }

    #[tokio::test]
    async fn page_past_the_end_is_empty_not_an_error() {
        let (app, store) = app(Role::Viewer);
        store.push(make_record("Doc", true));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/records/?page=99")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["count"], 1);
        assert!(json["data"]["results"].as_array().unwrap().is_empty());
        assert!(json["data"]["next"].is_null());
    }

    #[tokio::test]
    async fn list_envelope_carries_pagination_metadata() {
        let (app, store) = app(Role::Viewer);
        for i in 0..3 {
            store.push(make_record(&format!("Doc {}", i), true));
        }

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/records/?page=1&page_size=2")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["count"], 3);
        assert_eq!(json["data"]["total_pages"], 2);
        assert_eq!(json["data"]["results"].as_array().unwrap().len(), 2);
        assert_eq!(
            json["data"]["next"],
            "/records/?page_size=2&page=2"
        );
        assert!(json["data"]["previous"].is_null());
    }
}
