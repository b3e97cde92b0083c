// handlers/protected/user.rs - /user CRUD handlers

use axum::extract::{Path, Query, State};

use crate::database::models::UserView;
use crate::database::{InsertOneResult, UpdateResult};
use crate::i18n::Locale;
use crate::middleware::{ApiResponse, ApiResult, JsonBody};
use crate::query::{ListParams, Page};
use crate::services::{CreateUserForm, UpdateUserForm, UserService};
use crate::state::AppState;

fn service(state: &AppState) -> UserService {
    UserService::new(state.store().clone(), state.config().security.bcrypt_cost)
}

/// GET /user?page&pageSize&keyword&status - Paginated listing, newest first
pub async fn user_list(
    State(state): State<AppState>,
    locale: Locale,
    Query(params): Query<ListParams>,
) -> ApiResult<Page<UserView>> {
    let query = params.resolve(&state.config().list, locale)?;
    Ok(ApiResponse::success(service(&state).list(&query).await?))
}

/// GET /user/:id
pub async fn user_get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<UserView> {
    Ok(ApiResponse::success(service(&state).get(&id).await?))
}

/// POST /user
pub async fn user_post(
    State(state): State<AppState>,
    locale: Locale,
    JsonBody(form): JsonBody<CreateUserForm>,
) -> ApiResult<InsertOneResult> {
    Ok(ApiResponse::success(service(&state).create(&form, locale).await?))
}

/// PUT /user - The target id travels in the body
pub async fn user_put(
    State(state): State<AppState>,
    locale: Locale,
    JsonBody(form): JsonBody<UpdateUserForm>,
) -> ApiResult<UpdateResult> {
    Ok(ApiResponse::success(service(&state).update(&form, locale).await?))
}

/// DELETE /user/:id - Soft delete
pub async fn user_delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<UpdateResult> {
    Ok(ApiResponse::success(service(&state).delete(&id).await?))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::{json, Value};

    use crate::auth;
    use crate::database::Collection;
    use crate::testing::{json_request, TestContext};

    fn ids(body: &Value) -> Vec<String> {
        body["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|u| u["id"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn pages_are_disjoint_and_newest_first() {
        let ctx = TestContext::new();
        let caller = ctx.create_user_at("caller@anyshare.vn", "secret123", 1000).await;
        for i in 1..25 {
            ctx.create_user_at(&format!("user{:02}@anyshare.vn", i), "secret123", 1000 + i).await;
        }
        let token = ctx.token_for(&caller).await;

        let (status, first) = ctx
            .send(json_request(Method::GET, "/user?page=1&pageSize=10", Some(&token), None))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["itemCount"], 25);
        assert_eq!(first["pageCount"], 3);
        assert_eq!(first["page"], 1);

        let (_, second) = ctx
            .send(json_request(Method::GET, "/user?page=2&pageSize=10", Some(&token), None))
            .await;
        assert_eq!(second["pageCount"], 3);

        let first_ids = ids(&first);
        let second_ids = ids(&second);
        assert_eq!(first_ids.len(), 10);
        assert_eq!(second_ids.len(), 10);
        assert!(first_ids.iter().all(|id| !second_ids.contains(id)));

        let times: Vec<i64> = second["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|u| u["joinTime"].as_i64().unwrap())
            .collect();
        assert_eq!(times.first(), Some(&1014));
        assert!(times.windows(2).all(|w| w[0] > w[1]));

        let (_, third) = ctx
            .send(json_request(Method::GET, "/user?page=3&pageSize=10", Some(&token), None))
            .await;
        assert_eq!(ids(&third).len(), 5);
        assert!(ids(&third).contains(&caller.id));
    }

    #[tokio::test]
    async fn status_filter_separates_deleted_users() {
        let ctx = TestContext::new();
        let caller = ctx.create_user_at("caller@anyshare.vn", "secret123", 1).await;
        let gone = ctx.create_user_at("gone@anyshare.vn", "secret123", 2).await;
        let token = ctx.token_for(&caller).await;

        let (status, _) = ctx
            .send(json_request(Method::DELETE, &format!("/user/{}", gone.id), Some(&token), None))
            .await;
        assert_eq!(status, StatusCode::OK);

        for uri in ["/user", "/user?status=active", "/user?status=anything"] {
            let (_, body) = ctx.send(json_request(Method::GET, uri, Some(&token), None)).await;
            assert_eq!(ids(&body), vec![caller.id.clone()], "{}", uri);
        }

        let (_, body) = ctx
            .send(json_request(Method::GET, "/user?status=deleted", Some(&token), None))
            .await;
        assert_eq!(ids(&body), vec![gone.id.clone()]);
        assert_eq!(body["itemCount"], 1);
    }

    #[tokio::test]
    async fn keyword_is_a_literal_substring() {
        let ctx = TestContext::new();
        let caller = ctx.create_user_at("caller@anyshare.vn", "secret123", 1).await;
        let dotted = ctx.create_user_at("a.b@anyshare.vn", "secret123", 2).await;
        ctx.create_user_at("axb@anyshare.vn", "secret123", 3).await;
        let token = ctx.token_for(&caller).await;

        let (_, body) = ctx
            .send(json_request(Method::GET, "/user?keyword=%20a.b%20", Some(&token), None))
            .await;
        assert_eq!(ids(&body), vec![dotted.id]);

        let (_, body) = ctx
            .send(json_request(Method::GET, "/user?keyword=%5Ba", Some(&token), None))
            .await;
        assert_eq!(body["itemCount"], 0);
    }

    #[tokio::test]
    async fn invalid_paging_is_a_field_error() {
        let ctx = TestContext::new();
        let caller = ctx.create_user("caller@anyshare.vn", "secret123").await;
        let token = ctx.token_for(&caller).await;

        let (status, body) = ctx
            .send(json_request(Method::GET, "/user?pageSize=0", Some(&token), None))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.get("pageSize").is_some());

        let (status, body) = ctx
            .send(json_request(Method::GET, "/user?page=x&pageSize=y", Some(&token), None))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["page"], 1);
    }

    #[tokio::test]
    async fn create_lowercases_email_and_rejects_duplicates() {
        let ctx = TestContext::new();
        let caller = ctx.create_user("caller@anyshare.vn", "secret123").await;
        let token = ctx.token_for(&caller).await;
        let form = json!({
            "email": "New.Person@AnyShare.vn",
            "password": "secret123",
            "fullName": "New Person",
            "address": "Da Nang",
        });

        let (status, body) = ctx.send(json_request(Method::POST, "/user", Some(&token), Some(form.clone()))).await;
        assert_eq!(status, StatusCode::OK);
        let id = body["insertedId"].as_str().unwrap();
        let stored = ctx.find_user(id).await.unwrap();
        assert_eq!(stored.email, "new.person@anyshare.vn");
        assert_ne!(stored.password, "secret123");
        assert!(stored.delete_time.is_none());

        let (status, body) = ctx.send(json_request(Method::POST, "/user", Some(&token), Some(form))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["email"], "Email is already in use");
    }

    #[tokio::test]
    async fn create_reports_every_invalid_field() {
        let ctx = TestContext::new();
        let caller = ctx.create_user("caller@anyshare.vn", "secret123").await;
        let token = ctx.token_for(&caller).await;

        let (status, body) = ctx
            .send(json_request(
                Method::POST,
                "/user",
                Some(&token),
                Some(json!({ "email": "not-an-email", "password": "short" })),
            ))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let fields = body.as_object().unwrap();
        for field in ["email", "password", "fullName", "address"] {
            assert!(fields.contains_key(field), "missing {}", field);
        }
        assert!(!fields.contains_key("desc"));
        assert_eq!(ctx.store.documents(Collection::Users).len(), 1);
    }

    #[tokio::test]
    async fn empty_password_keeps_hash_and_new_password_replaces_it() {
        let ctx = TestContext::new();
        let caller = ctx.create_user("caller@anyshare.vn", "secret123").await;
        let target = ctx.create_user("target@anyshare.vn", "original1").await;
        let token = ctx.token_for(&caller).await;

        let (status, body) = ctx
            .send(json_request(
                Method::PUT,
                "/user",
                Some(&token),
                Some(json!({
                    "id": target.id,
                    "password": "",
                    "fullName": "Renamed",
                    "address": "Hue",
                })),
            ))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["matchedCount"], 1);
        let stored = ctx.find_user(&target.id).await.unwrap();
        assert_eq!(stored.password, target.password);
        assert_eq!(stored.full_name, "Renamed");

        let (status, _) = ctx
            .send(json_request(
                Method::PUT,
                "/user",
                Some(&token),
                Some(json!({
                    "id": target.id,
                    "password": "changed99",
                    "fullName": "Renamed",
                    "address": "Hue",
                })),
            ))
            .await;
        assert_eq!(status, StatusCode::OK);
        let stored = ctx.find_user(&target.id).await.unwrap();
        assert!(auth::verify_password("changed99".to_string(), stored.password.clone()).await.unwrap());
        assert!(!auth::verify_password("original1".to_string(), stored.password).await.unwrap());
    }

    #[tokio::test]
    async fn update_of_deleted_user_is_not_found() {
        let ctx = TestContext::new();
        let caller = ctx.create_user("caller@anyshare.vn", "secret123").await;
        let target = ctx.create_user("target@anyshare.vn", "secret123").await;
        let token = ctx.token_for(&caller).await;

        ctx.send(json_request(Method::DELETE, &format!("/user/{}", target.id), Some(&token), None))
            .await;

        let (status, _) = ctx
            .send(json_request(
                Method::PUT,
                "/user",
                Some(&token),
                Some(json!({ "id": target.id, "fullName": "X", "address": "Y" })),
            ))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_twice_succeeds_and_stays_hidden() {
        let ctx = TestContext::new();
        let caller = ctx.create_user("caller@anyshare.vn", "secret123").await;
        let target = ctx.create_user("target@anyshare.vn", "secret123").await;
        let token = ctx.token_for(&caller).await;
        let uri = format!("/user/{}", target.id);

        let (first, body) = ctx.send(json_request(Method::DELETE, &uri, Some(&token), None)).await;
        assert_eq!(first, StatusCode::OK);
        assert_eq!(body["matchedCount"], 1);
        let (second, body) = ctx.send(json_request(Method::DELETE, &uri, Some(&token), None)).await;
        assert_eq!(second, StatusCode::OK);
        assert_eq!(body["matchedCount"], 1);

        assert!(ctx.find_user(&target.id).await.unwrap().is_deleted());
        let (_, list) = ctx.send(json_request(Method::GET, "/user", Some(&token), None)).await;
        assert_eq!(ids(&list), vec![caller.id]);

        // Still reachable by id
        let (status, body) = ctx.send(json_request(Method::GET, &uri, Some(&token), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["deleteTime"].as_i64().unwrap() > 0);
        assert!(body.get("password").is_none());
    }

    #[tokio::test]
    async fn ids_must_be_well_formed() {
        let ctx = TestContext::new();
        let caller = ctx.create_user("caller@anyshare.vn", "secret123").await;
        let token = ctx.token_for(&caller).await;

        let (status, _) = ctx.send(json_request(Method::GET, "/user/12345", Some(&token), None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let unknown = uuid::Uuid::new_v4();
        let (status, _) = ctx
            .send(json_request(Method::DELETE, &format!("/user/{}", unknown), Some(&token), None))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unauthenticated_requests_never_touch_the_store() {
        let ctx = TestContext::new();
        let target = ctx.create_user("target@anyshare.vn", "secret123").await;
        let before = ctx.store.documents(Collection::Users);

        let requests = vec![
            json_request(Method::GET, "/user", None, None),
            json_request(Method::POST, "/user", None, Some(json!({ "email": "x@y.co" }))),
            json_request(Method::PUT, "/user", Some("not-a-token"), Some(json!({ "id": target.id }))),
            json_request(Method::DELETE, &format!("/user/{}", target.id), None, None),
            json_request(Method::POST, "/profile/password", Some("nope"), Some(json!({}))),
            json_request(Method::DELETE, &format!("/admin/{}", target.id), None, None),
        ];
        for request in requests {
            let (status, body) = ctx.send(request).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body["code"], "UNAUTHENTICATED");
        }

        assert_eq!(ctx.store.documents(Collection::Users), before);
        assert!(ctx.store.documents(Collection::Admins).is_empty());
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let ctx = TestContext::new();
        let caller = ctx.create_user("caller@anyshare.vn", "secret123").await;
        let token = ctx.token_for(&caller).await;

        let request = axum::http::Request::builder()
            .method(Method::POST)
            .uri("/user")
            .header("authorization", format!("Bearer {}", token))
            .header("content-type", "application/json")
            .body(axum::body::Body::from("{not json"))
            .unwrap();
        let (status, body) = ctx.send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "MALFORMED_REQUEST");

        let (status, _) = ctx
            .send(json_request(Method::POST, "/user", Some(&token), Some(json!({ "email": 42 }))))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn store_failures_are_internal_errors() {
        let ctx = TestContext::new();
        let caller = ctx.create_user("caller@anyshare.vn", "secret123").await;
        let token = ctx.token_for(&caller).await;
        ctx.store.set_failing(true);

        let (status, body) = ctx.send(json_request(Method::GET, "/user", Some(&token), None)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body["message"].as_str().unwrap().contains("unavailable"));
    }
}
