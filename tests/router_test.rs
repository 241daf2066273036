//! End-to-end router tests: real services over in-memory SQLite, driven
//! through `tower::ServiceExt::oneshot`.

mod common;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use sea_orm::ConnectionTrait;
use tower::ServiceExt;

use shop_backend::api::{create_router, AppState};
use shop_backend::config::{FLASH_COOKIE, SESSION_COOKIE};
use shop_backend::domain::Role;
use shop_backend::infra::Database;
use shop_backend::services::{ServiceContainer, Services};

use common::{create_bare_account, create_order, create_user, seed_catalog, setup_db, test_config, PASSWORD};

struct TestApp {
    router: Router,
    services: Arc<Services>,
    db: sea_orm::DatabaseConnection,
    _media: tempfile::TempDir,
}

impl TestApp {
    async fn new() -> Self {
        let db = setup_db().await;
        seed_catalog(&db).await;
        let media = tempfile::tempdir().unwrap();
        let config = test_config(media.path());

        let services = Arc::new(Services::from_connection(db.clone(), &config));
        let state = AppState::new(
            services.clone(),
            Arc::new(Database::from_connection(db.clone())),
            config,
        )
        .unwrap();

        Self {
            router: create_router(state),
            services,
            db,
            _media: media,
        }
    }

    async fn session_for(&self, username: &str) -> String {
        let session = self.services.auth().login(username, PASSWORD).await.unwrap();
        format!("{}={}", SESSION_COOKIE, session.token)
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    async fn post_multipart(&self, uri: &str, cookie: &str, body: String) -> Response {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::COOKIE, cookie)
            .header(header::CONTENT_TYPE, "multipart/form-data; boundary=XBOUNDARY")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    async fn post_form(&self, uri: &str, cookie: Option<&str>, body: &str) -> Response {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap()).await
    }
}

/// multipart/form-data body with an optional file part named `photo`
fn multipart_body(fields: &[(&str, String)], photo: (&str, &str)) -> String {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--XBOUNDARY\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
            name, value
        ));
    }
    let (filename, content) = photo;
    body.push_str(&format!(
        "--XBOUNDARY\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"{}\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n{}\r\n--XBOUNDARY--\r\n",
        filename, content
    ));
    body
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

fn sets_cookie(response: &Response, name: &str) -> bool {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.starts_with(&format!("{}=", name)))
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_health_reports_database() {
    let app = TestApp::new().await;
    let response = app.get("/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("healthy"));
}

#[tokio::test]
async fn test_login_sets_session_and_redirects() {
    let app = TestApp::new().await;
    create_user(&app.db, Role::Manager).await;

    let response = app
        .post_form("/", None, &format!("username=manager&password={}", PASSWORD))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard/");
    assert!(sets_cookie(&response, SESSION_COOKIE));
}

#[tokio::test]
async fn test_bad_login_rerenders_form() {
    let app = TestApp::new().await;
    create_user(&app.db, Role::Manager).await;

    let response = app.post_form("/", None, "username=manager&password=wrong").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!sets_cookie(&response, SESSION_COOKIE));
    assert!(body_text(response).await.contains("Invalid username or password"));
}

#[tokio::test]
async fn test_anonymous_is_sent_to_login() {
    let app = TestApp::new().await;
    for uri in ["/products/", "/orders/", "/dashboard/", "/products/add/"] {
        let response = app.get(uri, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", uri);
        assert_eq!(location(&response), "/", "{}", uri);
    }
}

#[tokio::test]
async fn test_guest_catalog_has_no_filters() {
    let app = TestApp::new().await;
    let response = app.get("/guest/?search=tozzi", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Ankle boots") && html.contains("Sneakers"));
    assert!(!html.contains("name=\"search\""));
}

#[tokio::test]
async fn test_manager_can_filter_products() {
    let app = TestApp::new().await;
    create_user(&app.db, Role::Manager).await;
    let cookie = app.session_for("manager").await;

    let response = app.get("/products/?search=tozzi", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Sneakers"));
    assert!(!html.contains("Ankle boots"));
    assert!(html.contains("name=\"search\""));
}

#[tokio::test]
async fn test_client_is_bounced_from_product_management() {
    let app = TestApp::new().await;
    create_user(&app.db, Role::Client).await;
    let cookie = app.session_for("client").await;

    let response = app.get("/products/add/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/products/");
    assert!(sets_cookie(&response, FLASH_COOKIE));

    let response = app.get("/orders/", Some(&cookie)).await;
    assert_eq!(location(&response), "/dashboard/");
}

#[tokio::test]
async fn test_account_without_profile() {
    let app = TestApp::new().await;
    create_bare_account(&app.db, "orphan").await;
    let cookie = app.session_for("orphan").await;

    let response = app.get("/products/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    // the dashboard only needs a session
    let response = app.get("/dashboard/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_tampered_session_is_anonymous() {
    let app = TestApp::new().await;
    let response = app
        .get("/dashboard/", Some(&format!("{}=not.a.token", SESSION_COOKIE)))
        .await;
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_admin_creates_order_and_duplicate_is_rejected() {
    let app = TestApp::new().await;
    create_user(&app.db, Role::Admin).await;
    let cookie = app.session_for("admin").await;
    let form = "order_number=501&order_date=2025-03-01T10%3A00&delivery_date=2025-03-05T10%3A00\
                &delivery_point_id=&customer_name=Anna+Orlova&code=777&status=pending";

    let response = app.post_form("/orders/add/", Some(&cookie), form).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/orders/");
    assert!(sets_cookie(&response, FLASH_COOKIE));

    let response = app.post_form("/orders/add/", Some(&cookie), form).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Order with this order number already exists"));

    let response = app.get("/orders/", Some(&cookie)).await;
    assert!(body_text(response).await.contains("Anna Orlova"));
}

#[tokio::test]
async fn test_protected_product_delete_flashes_error() {
    let app = TestApp::new().await;
    create_user(&app.db, Role::Admin).await;
    let cookie = app.session_for("admin").await;

    let order = create_order(&app.db, 77, None).await;
    app.services
        .orders()
        .add_item(
            order.id,
            shop_backend::domain::OrderItemInput {
                product_article: "F635R4".to_string(),
                quantity: 1,
            },
        )
        .await
        .unwrap();

    let response = app.post_form("/products/F635R4/delete/", Some(&cookie), "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/products/");
    assert!(sets_cookie(&response, FLASH_COOKIE));

    let response = app.get("/products/F635R4/delete/", Some(&cookie)).await;
    assert_eq!(location(&response), "/products/");

    let response = app.get("/products/H782T5/delete/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_admin_adds_product_with_multipart_form() {
    let app = TestApp::new().await;
    create_user(&app.db, Role::Admin).await;
    let cookie = app.session_for("admin").await;
    let lookups = app.services.catalog().lookups().await.unwrap();

    let fields = [
        ("article", "M900".to_string()),
        ("name", "Moccasins".to_string()),
        ("unit", "pcs.".to_string()),
        ("price", "1500".to_string()),
        ("supplier_id", lookups.suppliers[0].id.to_string()),
        ("manufacturer_id", lookups.manufacturers[0].id.to_string()),
        ("category_id", lookups.categories[0].id.to_string()),
        ("discount", "0".to_string()),
        ("quantity", "3".to_string()),
        ("description", "Suede".to_string()),
    ];
    // no file chosen
    let response = app
        .post_multipart("/products/add/", &cookie, multipart_body(&fields, ("", "")))
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/products/");
    let product = app.services.catalog().get_product("M900").await.unwrap();
    assert_eq!(product.photo, None);
}

#[tokio::test]
async fn test_logout_clears_session() {
    let app = TestApp::new().await;
    create_user(&app.db, Role::Client).await;
    let cookie = app.session_for("client").await;

    let response = app.get("/logout/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    assert!(sets_cookie(&response, SESSION_COOKIE));
}

#[tokio::test]
async fn test_session_is_void_after_logout() {
    let app = TestApp::new().await;
    create_user(&app.db, Role::Admin).await;
    let cookie = app.session_for("admin").await;
    assert_eq!(app.get("/orders/", Some(&cookie)).await.status(), StatusCode::OK);

    app.get("/logout/", Some(&cookie)).await;

    // replaying the old cookie no longer authenticates
    for uri in ["/orders/", "/dashboard/"] {
        let response = app.get(uri, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", uri);
        assert_eq!(location(&response), "/", "{}", uri);
    }

    // a fresh login works again
    let cookie = app.session_for("admin").await;
    assert_eq!(app.get("/orders/", Some(&cookie)).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_photo_error_shown_next_to_other_errors() {
    let app = TestApp::new().await;
    create_user(&app.db, Role::Admin).await;
    let cookie = app.session_for("admin").await;

    let fields = [
        ("article", "M901".to_string()),
        ("name", "Loafers".to_string()),
        ("price", "cheap".to_string()),
    ];
    let response = app
        .post_multipart("/products/add/", &cookie, multipart_body(&fields, ("scan.bmp", "BM")))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Enter a number"));
    assert!(html.contains("Only JPG, PNG and GIF formats are supported"));
    assert!(app.services.catalog().get_product("M901").await.is_err());
}

#[tokio::test]
async fn test_manager_cannot_change_orders() {
    let app = TestApp::new().await;
    create_user(&app.db, Role::Manager).await;
    let cookie = app.session_for("manager").await;
    let order = create_order(&app.db, 88, None).await;

    let response = app.get("/orders/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!body_text(response).await.contains("/orders/add/"));

    let edit = format!("/orders/{}/edit/", order.id);
    let delete = format!("/orders/{}/delete/", order.id);
    for uri in ["/orders/add/", edit.as_str(), delete.as_str()] {
        let response = app.get(uri, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", uri);
        assert_eq!(location(&response), "/orders/", "{}", uri);
    }

    let response = app.post_form(&delete, Some(&cookie), "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/orders/");
    assert!(sets_cookie(&response, FLASH_COOKIE));

    let response = app
        .post_form(
            &format!("/orders/{}/items/add/", order.id),
            Some(&cookie),
            "product_article=A112T4&quantity=1",
        )
        .await;
    assert_eq!(location(&response), "/orders/");

    let details = app.services.orders().get_order(order.id).await.unwrap();
    assert!(details.items.is_empty());
}

#[tokio::test]
async fn test_manager_cannot_change_products() {
    let app = TestApp::new().await;
    create_user(&app.db, Role::Manager).await;
    let cookie = app.session_for("manager").await;

    for uri in ["/products/add/", "/products/H782T5/edit/", "/products/H782T5/delete/"] {
        let response = app.get(uri, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", uri);
        assert_eq!(location(&response), "/products/", "{}", uri);
    }

    let response = app.post_form("/products/H782T5/delete/", Some(&cookie), "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/products/");
    assert!(sets_cookie(&response, FLASH_COOKIE));

    let fields = [("article", "H782T5".to_string()), ("name", "Renamed".to_string())];
    let response = app
        .post_multipart("/products/H782T5/edit/", &cookie, multipart_body(&fields, ("", "")))
        .await;
    assert_eq!(location(&response), "/products/");

    let product = app.services.catalog().get_product("H782T5").await.unwrap();
    assert_eq!(product.name, "Slippers");
}

#[tokio::test]
async fn test_non_numeric_order_id_is_not_found() {
    let app = TestApp::new().await;
    create_user(&app.db, Role::Admin).await;
    let cookie = app.session_for("admin").await;

    let response = app.get("/orders/abc/edit/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.post_form("/orders/1/items/x/delete/", Some(&cookie), "").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.get("/orders/999/edit/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_stored_role_counts_as_no_profile() {
    let app = TestApp::new().await;
    create_user(&app.db, Role::Manager).await;
    let cookie = app.session_for("manager").await;
    app.db
        .execute_unprepared("UPDATE user_profiles SET role = 'owner'")
        .await
        .unwrap();

    let response = app.get("/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.get("/products/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let response = app.get("/dashboard/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
}
