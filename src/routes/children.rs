use axum::routing::get;
use axum::Router;

use super::{create, fetch, list, remove, update};
use crate::models::Child;
use crate::store::Store;

pub fn routes() -> Router<Store> {
    Router::new()
        .route("/children", get(list::<Child>).post(create::<Child>))
        .route("/children/", get(list::<Child>).post(create::<Child>))
        .route(
            "/children/:id",
            get(fetch::<Child>)
                .put(update::<Child>)
                .delete(remove::<Child>),
        )
}

#[cfg(test)]
mod tests {
    use super::super::tests::{add_child, app, send};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_child_lifecycle() {
        let app = app();
        let id = add_child(&app, "Noah").await;

        let (status, child) = send(&app, Method::GET, &format!("/children/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(child["name"], "Noah");
        assert_eq!(child["date_of_birth"], "2020-06-15");
        assert!(child["meals_per_day"].is_null());

        let (status, updated) = send(
            &app,
            Method::PUT,
            &format!("/children/{}", id),
            Some(json!({"meals_per_day": 5})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["meals_per_day"], 5);
        assert_eq!(updated["name"], "Noah");

        let (status, body) = send(&app, Method::DELETE, &format!("/children/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], format!("Child {} deleted successfully", id));

        let (status, body) = send(&app, Method::GET, &format!("/children/{}", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], format!("Child with id {} not found", id));
    }

    #[tokio::test]
    async fn test_empty_update_returns_unchanged_child() {
        let app = app();
        let id = add_child(&app, "Noah").await;
        let (_, before) = send(&app, Method::GET, &format!("/children/{}", id), None).await;

        let (status, after) =
            send(&app, Method::PUT, &format!("/children/{}", id), Some(json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(after, before);
    }

    #[tokio::test]
    async fn test_list_filters_by_ids() {
        let app = app();
        for name in ["A", "B", "C", "D", "E"] {
            add_child(&app, name).await;
        }

        let (status, body) = send(&app, Method::GET, "/children?ids=5,2", None).await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["B", "E"]);

        let (status, body) = send(&app, Method::GET, "/children/?ids=", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 5);

        let (status, body) = send(&app, Method::GET, "/children?ids=1,two", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["errors"]["ids"].is_array());
    }

    #[tokio::test]
    async fn test_update_missing_child_is_not_found() {
        let (status, _) = send(
            &app(),
            Method::PUT,
            "/children/77",
            Some(json!({"name": "Ghost"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
