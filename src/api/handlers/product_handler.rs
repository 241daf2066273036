//! Product catalog handlers.

use axum::{
    extract::{Multipart, Path, Query, State},
    response::Response,
    routing::get,
    Router,
};
use tera::Context;

use crate::api::context::RequestContext;
use crate::api::flash::Flash;
use crate::api::forms::ProductForm;
use crate::api::AppState;
use crate::domain::{Capability, CatalogLookups, Product, ProductListParams};
use crate::errors::{AppError, AppResult, FieldErrors};
use crate::services::parallel;

const PRODUCTS_URL: &str = "/products/";

/// Create product routes
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products/", get(list_products))
        .route("/products/add/", get(add_product_form).post(add_product))
        .route("/products/:article/edit/", get(edit_product_form).post(edit_product))
        .route(
            "/products/:article/delete/",
            get(confirm_delete_product).post(delete_product),
        )
}

/// `Protected` becomes a flash error on the catalog page
fn protected_to_flash(result: AppResult<Response>) -> AppResult<Response> {
    match result {
        Err(AppError::Protected(message)) => {
            tracing::warn!("{}", message);
            Ok(Flash::error(message).redirect(PRODUCTS_URL))
        }
        other => other,
    }
}

fn render_form(
    state: &AppState,
    ctx: &RequestContext,
    form: &ProductForm,
    errors: &FieldErrors,
    lookups: &CatalogLookups,
    product: Option<&Product>,
) -> AppResult<Response> {
    let mut context = Context::new();
    context.insert("form", form);
    context.insert("errors", errors);
    context.insert("lookups", lookups);
    context.insert("product", &product);
    context.insert("is_edit", &product.is_some());
    ctx.page(state, "product_form.html", context)
}

pub async fn list_products(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(params): Query<ProductListParams>,
) -> AppResult<Response> {
    let profile = ctx.require(Capability::ViewProducts, "/")?;
    let page = state
        .services
        .catalog()
        .list_products(profile.role, &params)
        .await?;

    let mut context = Context::new();
    context.insert("products", &page.products);
    context.insert("suppliers", &page.suppliers);
    context.insert("has_filters", &page.filters_enabled);
    context.insert("search_query", &params.search);
    context.insert("selected_supplier", &params.supplier);
    context.insert("sort_quantity", &params.sort_quantity);
    ctx.page(&state, "products_list.html", context)
}

pub async fn add_product_form(State(state): State<AppState>, ctx: RequestContext) -> AppResult<Response> {
    ctx.require(Capability::ManageProducts, PRODUCTS_URL)?;
    let lookups = state.services.catalog().lookups().await?;
    render_form(&state, &ctx, &ProductForm::blank(), &FieldErrors::new(), &lookups, None)
}

pub async fn add_product(
    State(state): State<AppState>,
    ctx: RequestContext,
    multipart: Multipart,
) -> AppResult<Response> {
    ctx.require(Capability::ManageProducts, PRODUCTS_URL)?;
    let catalog = state.services.catalog();
    let mut form = ProductForm::from_multipart(multipart).await?;

    let result = match form.to_input() {
        Ok(input) => catalog.create_product(input, form.photo.take()).await,
        Err(errors) => Err(AppError::Invalid(errors)),
    };

    match result {
        Ok(product) => {
            Ok(Flash::success(format!("Product \"{}\" added successfully", product.name)).redirect(PRODUCTS_URL))
        }
        Err(AppError::Invalid(errors)) => {
            let lookups = catalog.lookups().await?;
            render_form(&state, &ctx, &form, &errors, &lookups, None)
        }
        Err(e) => Err(e),
    }
}

pub async fn edit_product_form(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(article): Path<String>,
) -> AppResult<Response> {
    ctx.require(Capability::ManageProducts, PRODUCTS_URL)?;
    let catalog = state.services.catalog();
    let (product, lookups) = parallel::join2(catalog.get_product(&article), catalog.lookups()).await?;

    let form = ProductForm::from_product(&product);
    render_form(&state, &ctx, &form, &FieldErrors::new(), &lookups, Some(&product))
}

pub async fn edit_product(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(article): Path<String>,
    multipart: Multipart,
) -> AppResult<Response> {
    ctx.require(Capability::ManageProducts, PRODUCTS_URL)?;
    let catalog = state.services.catalog();
    let product = catalog.get_product(&article).await?;
    let mut form = ProductForm::from_multipart(multipart).await?;

    let result = match form.to_input() {
        Ok(input) => catalog.update_product(&article, input, form.photo.take()).await,
        Err(errors) => Err(AppError::Invalid(errors)),
    };

    match result {
        Ok(updated) => {
            Ok(Flash::success(format!("Product \"{}\" updated successfully", updated.name)).redirect(PRODUCTS_URL))
        }
        Err(AppError::Invalid(errors)) => {
            let lookups = catalog.lookups().await?;
            render_form(&state, &ctx, &form, &errors, &lookups, Some(&product))
        }
        Err(e) => Err(e),
    }
}

pub async fn confirm_delete_product(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(article): Path<String>,
) -> AppResult<Response> {
    ctx.require(Capability::ManageProducts, PRODUCTS_URL)?;

    protected_to_flash(async {
        let product = state.services.catalog().deletable_product(&article).await?;
        let mut context = Context::new();
        context.insert("product", &product);
        ctx.page(&state, "product_confirm_delete.html", context)
    }
    .await)
}

pub async fn delete_product(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(article): Path<String>,
) -> AppResult<Response> {
    ctx.require(Capability::ManageProducts, PRODUCTS_URL)?;

    protected_to_flash(
        state
            .services
            .catalog()
            .delete_product(&article)
            .await
            .map(|product| {
                Flash::success(format!("Product \"{}\" deleted successfully", product.name))
                    .redirect(PRODUCTS_URL)
            }),
    )
}
