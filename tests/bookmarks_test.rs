mod common;

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::json;

    use bookmark_service::handlers;
    use bookmark_service::models::Bookmark;

    use crate::common::{bearer_for, test_state, JSON_LIMIT};

    fn first_bookmark() -> serde_json::Value {
        json!({
            "title": "First Bookmark",
            "description": "FreeCodeCamp NestJS tutorial",
            "link": "https://www.youtube.com/watch?v=GHTA143_b-s",
        })
    }

    #[actix_rt::test]
    async fn bookmark_lifecycle() {
        let state = test_state();
        let bearer = bearer_for(&state, "owner@example.com").await;
        let app = test::init_service(App::new().configure(handlers::configure(state, JSON_LIMIT))).await;

        // Empty list
        let req = test::TestRequest::get()
            .uri("/bookmarks")
            .insert_header(("Authorization", bearer.clone()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body, json!([]));

        // Create
        let req = test::TestRequest::post()
            .uri("/bookmarks")
            .insert_header(("Authorization", bearer.clone()))
            .set_json(first_bookmark())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Bookmark = test::read_body_json(resp).await;
        assert_eq!(created.title, "First Bookmark");

        // Listed exactly once
        let req = test::TestRequest::get()
            .uri("/bookmarks")
            .insert_header(("Authorization", bearer.clone()))
            .to_request();
        let listed: Vec<Bookmark> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(listed, vec![created.clone()]);

        // Get by id
        let req = test::TestRequest::get()
            .uri(&format!("/bookmarks/{}", created.id))
            .insert_header(("Authorization", bearer.clone()))
            .to_request();
        let fetched: Bookmark = test::call_and_read_body_json(&app, req).await;
        assert_eq!(fetched, created);

        // Partial update
        let req = test::TestRequest::patch()
            .uri(&format!("/bookmarks/{}", created.id))
            .insert_header(("Authorization", bearer.clone()))
            .set_json(json!({ "title": "Some title", "description": "New description" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let updated: Bookmark = test::read_body_json(resp).await;
        assert_eq!(updated.title, "Some title");
        assert_eq!(updated.description.as_deref(), Some("New description"));
        assert_eq!(updated.link, created.link);

        // Delete
        let req = test::TestRequest::delete()
            .uri(&format!("/bookmarks/{}", created.id))
            .insert_header(("Authorization", bearer.clone()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        let body = test::read_body(resp).await;
        assert!(body.is_empty());

        // Gone
        let req = test::TestRequest::get()
            .uri("/bookmarks")
            .insert_header(("Authorization", bearer.clone()))
            .to_request();
        let listed: Vec<Bookmark> = test::call_and_read_body_json(&app, req).await;
        assert!(listed.is_empty());

        let req = test::TestRequest::get()
            .uri(&format!("/bookmarks/{}", created.id))
            .insert_header(("Authorization", bearer))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_rt::test]
    async fn create_requires_title_and_link() {
        let state = test_state();
        let bearer = bearer_for(&state, "strict@example.com").await;
        let app = test::init_service(App::new().configure(handlers::configure(state, JSON_LIMIT))).await;

        let bodies = [
            json!({ "link": "https://example.com" }),
            json!({ "title": "No link" }),
            json!({ "title": "", "link": "https://example.com" }),
            json!({ "title": "Bad link", "link": "not a url" }),
        ];
        for body in bodies {
            let req = test::TestRequest::post()
                .uri("/bookmarks")
                .insert_header(("Authorization", bearer.clone()))
                .set_json(body)
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[actix_rt::test]
    async fn other_users_bookmark_is_not_found() {
        let state = test_state();
        let owner = bearer_for(&state, "alice@example.com").await;
        let intruder = bearer_for(&state, "mallory@example.com").await;
        let app = test::init_service(App::new().configure(handlers::configure(state, JSON_LIMIT))).await;

        let req = test::TestRequest::post()
            .uri("/bookmarks")
            .insert_header(("Authorization", owner.clone()))
            .set_json(first_bookmark())
            .to_request();
        let created: Bookmark = test::call_and_read_body_json(&app, req).await;
        let uri = format!("/bookmarks/{}", created.id);

        let read = test::TestRequest::get()
            .uri(&uri)
            .insert_header(("Authorization", intruder.clone()))
            .to_request();
        assert_eq!(test::call_service(&app, read).await.status(), StatusCode::NOT_FOUND);

        let edit = test::TestRequest::patch()
            .uri(&uri)
            .insert_header(("Authorization", intruder.clone()))
            .set_json(json!({ "title": "hijacked" }))
            .to_request();
        assert_eq!(test::call_service(&app, edit).await.status(), StatusCode::NOT_FOUND);

        let delete = test::TestRequest::delete()
            .uri(&uri)
            .insert_header(("Authorization", intruder.clone()))
            .to_request();
        assert_eq!(test::call_service(&app, delete).await.status(), StatusCode::NOT_FOUND);

        // Same outcome as an id that never existed
        let missing = test::TestRequest::get()
            .uri("/bookmarks/424242")
            .insert_header(("Authorization", intruder))
            .to_request();
        assert_eq!(test::call_service(&app, missing).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get()
            .uri(&uri)
            .insert_header(("Authorization", owner))
            .to_request();
        let unchanged: Bookmark = test::call_and_read_body_json(&app, req).await;
        assert_eq!(unchanged, created);
    }

    #[actix_rt::test]
    async fn non_numeric_id_is_not_found() {
        let state = test_state();
        let bearer = bearer_for(&state, "ids@example.com").await;
        let app = test::init_service(App::new().configure(handlers::configure(state, JSON_LIMIT))).await;

        let req = test::TestRequest::get()
            .uri("/bookmarks/abc")
            .insert_header(("Authorization", bearer))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_rt::test]
    async fn long_title_is_accepted() {
        let state = test_state();
        let bearer = bearer_for(&state, "verbose@example.com").await;
        let app = test::init_service(App::new().configure(handlers::configure(state, JSON_LIMIT))).await;

        let title = "t".repeat(300);
        let req = test::TestRequest::post()
            .uri("/bookmarks")
            .insert_header(("Authorization", bearer))
            .set_json(json!({ "title": title, "link": "https://example.com" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Bookmark = test::read_body_json(resp).await;
        assert_eq!(created.title.len(), 300);
    }
}
