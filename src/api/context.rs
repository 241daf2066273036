//! Request-scoped caller context.
//!
//! Every handler that cares about who is calling takes a `RequestContext`:
//! the verified session, the resolved profile and any pending flash message.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use tera::Context;

use super::flash::Flash;
use super::AppState;
use crate::config::SESSION_COOKIE;
use crate::domain::{Capability, ProfileLookup, Role, UserProfile};
use crate::errors::{AppError, AppResult};
use crate::services::Claims;

/// What the navigation may offer to the current role
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Permissions {
    pub filter_products: bool,
    pub manage_products: bool,
    pub view_orders: bool,
    pub manage_orders: bool,
}

impl Permissions {
    pub fn for_role(role: Option<Role>) -> Self {
        let can = |capability| role.is_some_and(|r| r.can(capability));
        Self {
            filter_products: can(Capability::FilterProducts),
            manage_products: can(Capability::ManageProducts),
            view_orders: can(Capability::ViewOrders),
            manage_orders: can(Capability::ManageOrders),
        }
    }
}

/// Variables the base layout reads on every page
pub(crate) fn insert_layout(
    context: &mut Context,
    flash: Option<&Flash>,
    profile: Option<&UserProfile>,
    role: Option<Role>,
    logged_in: bool,
) {
    context.insert("flash", &flash);
    context.insert("profile", &profile);
    context.insert("user_role", &role.map(Role::as_str));
    context.insert("perms", &Permissions::for_role(role));
    context.insert("logged_in", &logged_in);
}

pub struct RequestContext {
    claims: Option<Claims>,
    profile: ProfileLookup,
    flash: Option<Flash>,
    jar: CookieJar,
}

#[async_trait]
impl FromRequestParts<AppState> for RequestContext {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let auth = state.services.auth();

        let claims = jar.get(SESSION_COOKIE).and_then(|cookie| {
            auth.verify_token(cookie.value())
                .map_err(|e| tracing::debug!("Ignoring invalid session cookie: {}", e))
                .ok()
        });

        let (claims, profile) = match claims {
            Some(claims) => match auth.resolve_profile(&claims).await? {
                Some(profile) => (Some(claims), profile),
                None => {
                    tracing::debug!(account_id = claims.sub, "Ignoring void session");
                    (None, ProfileLookup::Missing)
                }
            },
            None => (None, ProfileLookup::Missing),
        };

        let (jar, flash) = Flash::take(jar);

        Ok(Self {
            claims,
            profile,
            flash,
            jar,
        })
    }
}

impl RequestContext {
    pub fn claims(&self) -> Option<&Claims> {
        self.claims.as_ref()
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.profile()
    }

    pub fn role(&self) -> Option<Role> {
        self.profile().map(|p| p.role)
    }

    /// A valid session is enough; the profile may be absent.
    pub fn require_login(&self) -> AppResult<&Claims> {
        self.claims.as_ref().ok_or(AppError::LoginRequired)
    }

    /// Shared access guard: a missing profile counts as not logged in, a
    /// role without `capability` is sent to `redirect_to` with a flash.
    pub fn require(&self, capability: Capability, redirect_to: &'static str) -> AppResult<&UserProfile> {
        let profile = match &self.profile {
            ProfileLookup::Found(profile) => profile,
            ProfileLookup::Missing => return Err(AppError::LoginRequired),
        };

        if profile.role.can(capability) {
            Ok(profile)
        } else {
            tracing::warn!(
                account_id = profile.account_id,
                role = %profile.role,
                ?capability,
                "Access denied"
            );
            Err(AppError::forbidden(redirect_to))
        }
    }

    /// Render a page as the caller's own role.
    pub fn page(&self, state: &AppState, template: &str, context: Context) -> AppResult<Response> {
        self.render(state, template, context, self.role())
    }

    /// Render a page as a guest regardless of the session.
    pub fn guest_page(&self, state: &AppState, template: &str, context: Context) -> AppResult<Response> {
        self.render(state, template, context, Some(Role::Guest))
    }

    fn render(
        &self,
        state: &AppState,
        template: &str,
        mut context: Context,
        role: Option<Role>,
    ) -> AppResult<Response> {
        insert_layout(
            &mut context,
            self.flash.as_ref(),
            self.profile(),
            role,
            self.claims.is_some(),
        );

        let body = state.views.render(template, &context)?;
        // jar carries the flash removal, if any
        Ok((self.jar.clone(), Html(body)).into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_role(role: Role) -> RequestContext {
        RequestContext {
            claims: Some(Claims {
                sub: 1,
                username: "user".to_string(),
                ver: 0,
                exp: i64::MAX,
                iat: 0,
            }),
            profile: ProfileLookup::Found(UserProfile {
                id: 1,
                account_id: 1,
                role,
                full_name: "Test User".to_string(),
            }),
            flash: None,
            jar: CookieJar::new(),
        }
    }

    #[test]
    fn test_missing_profile_is_login_required() {
        let mut ctx = with_role(Role::Admin);
        ctx.profile = ProfileLookup::Missing;
        assert!(matches!(
            ctx.require(Capability::ViewProducts, "/products/"),
            Err(AppError::LoginRequired)
        ));
        // dashboard only needs the session
        assert!(ctx.require_login().is_ok());
    }

    #[test]
    fn test_forbidden_carries_redirect() {
        let ctx = with_role(Role::Client);
        match ctx.require(Capability::ManageProducts, "/products/") {
            Err(AppError::Forbidden { redirect_to, .. }) => assert_eq!(redirect_to, "/products/"),
            other => panic!("expected forbidden, got {:?}", other.map(|p| p.role)),
        }
    }

    #[test]
    fn test_allowed_role_gets_profile() {
        let ctx = with_role(Role::Manager);
        let profile = ctx.require(Capability::ViewOrders, "/dashboard/").unwrap();
        assert_eq!(profile.role, Role::Manager);
    }

    #[test]
    fn test_anonymous_requires_login() {
        let ctx = RequestContext {
            claims: None,
            profile: ProfileLookup::Missing,
            flash: None,
            jar: CookieJar::new(),
        };
        assert!(matches!(ctx.require_login(), Err(AppError::LoginRequired)));
        assert_eq!(Permissions::for_role(ctx.role()), Permissions::default());
    }

    #[test]
    fn test_permissions_follow_capabilities() {
        let admin = Permissions::for_role(Some(Role::Admin));
        assert!(admin.manage_products && admin.manage_orders);
        let manager = Permissions::for_role(Some(Role::Manager));
        assert!(manager.view_orders && manager.filter_products && !manager.manage_products);
    }
}
