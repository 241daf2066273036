//! Login, logout, guest catalog and dashboard.

use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use tera::Context;

use crate::api::context::RequestContext;
use crate::api::AppState;
use crate::config::SESSION_COOKIE;
use crate::domain::{ProductListParams, Role};
use crate::errors::{AppError, AppResult};

/// Login form
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Create authentication and landing routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(login_page).post(login))
        .route("/guest/", get(guest_products))
        .route("/logout/", get(logout))
        .route("/dashboard/", get(dashboard))
}

fn login_context(username: &str, error: Option<&str>) -> Context {
    let mut context = Context::new();
    context.insert("username", username);
    context.insert("error", &error);
    context
}

pub async fn login_page(State(state): State<AppState>, ctx: RequestContext) -> AppResult<Response> {
    ctx.page(&state, "login.html", login_context("", None))
}

pub async fn login(
    State(state): State<AppState>,
    ctx: RequestContext,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    match state.services.auth().login(form.username.trim(), &form.password).await {
        Ok(session) => {
            tracing::debug!(expires_at = %session.expires_at, "Session issued");
            let cookie = Cookie::build((SESSION_COOKIE, session.token))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .build();
            Ok((jar.add(cookie), Redirect::to("/dashboard/")).into_response())
        }
        Err(AppError::InvalidCredentials) => {
            let message = AppError::InvalidCredentials.to_string();
            ctx.page(&state, "login.html", login_context(&form.username, Some(&message)))
        }
        Err(e) => Err(e),
    }
}

pub async fn logout(State(state): State<AppState>, ctx: RequestContext, jar: CookieJar) -> AppResult<Response> {
    if let Some(claims) = ctx.claims() {
        state.services.auth().logout(claims).await?;
    }
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((jar, Redirect::to("/")).into_response())
}

/// Full catalog in article order, no filters, no login.
pub async fn guest_products(State(state): State<AppState>, ctx: RequestContext) -> AppResult<Response> {
    let page = state
        .services
        .catalog()
        .list_products(Role::Guest, &ProductListParams::default())
        .await?;

    let mut context = Context::new();
    context.insert("products", &page.products);
    context.insert("has_filters", &false);
    ctx.guest_page(&state, "products_list.html", context)
}

pub async fn dashboard(State(state): State<AppState>, ctx: RequestContext) -> AppResult<Response> {
    ctx.require_login()?;
    ctx.page(&state, "dashboard.html", Context::new())
}
