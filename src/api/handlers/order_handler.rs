//! Order management handlers.

use axum::{
    extract::State,
    response::Response,
    routing::{get, post},
    Form, Router,
};
use serde::Serialize;
use tera::Context;

use crate::api::context::RequestContext;
use crate::api::extract::PagePath;
use crate::api::flash::Flash;
use crate::api::forms::{OrderForm, OrderItemForm};
use crate::api::AppState;
use crate::domain::{Capability, OrderDetails, OrderStatus};
use crate::errors::{AppError, AppResult, FieldErrors};
use crate::services::parallel;

const ORDERS_URL: &str = "/orders/";

#[derive(Serialize)]
struct StatusChoice {
    value: &'static str,
    label: &'static str,
}

fn status_choices() -> Vec<StatusChoice> {
    OrderStatus::ALL
        .iter()
        .map(|status| StatusChoice {
            value: status.as_str(),
            label: status.label(),
        })
        .collect()
}

/// Create order routes
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/orders/", get(list_orders))
        .route("/orders/add/", get(add_order_form).post(add_order))
        .route("/orders/:order_id/edit/", get(edit_order_form).post(edit_order))
        .route(
            "/orders/:order_id/delete/",
            get(confirm_delete_order).post(delete_order),
        )
        .route("/orders/:order_id/items/add/", post(add_order_item))
        .route(
            "/orders/:order_id/items/:item_id/delete/",
            post(remove_order_item),
        )
}

/// Everything the add/edit page shows. `order` is set on the edit page,
/// which also carries the item list and the add-item form.
struct OrderPage<'a> {
    order: Option<&'a OrderDetails>,
    form: &'a OrderForm,
    errors: &'a FieldErrors,
    item_form: &'a OrderItemForm,
    item_errors: &'a FieldErrors,
}

async fn render_form(state: &AppState, ctx: &RequestContext, page: OrderPage<'_>) -> AppResult<Response> {
    let orders = state.services.orders();

    let mut context = Context::new();
    context.insert("form", page.form);
    context.insert("errors", page.errors);
    context.insert("statuses", &status_choices());
    context.insert("is_edit", &page.order.is_some());
    context.insert("order", &page.order);

    if page.order.is_some() {
        let (delivery_points, products) =
            parallel::join2(orders.delivery_points(), orders.item_products()).await?;
        context.insert("delivery_points", &delivery_points);
        context.insert("products", &products);
        context.insert("item_form", page.item_form);
        context.insert("item_errors", page.item_errors);
    } else {
        context.insert("delivery_points", &orders.delivery_points().await?);
    }

    ctx.page(state, "order_form.html", context)
}

pub async fn list_orders(State(state): State<AppState>, ctx: RequestContext) -> AppResult<Response> {
    ctx.require(Capability::ViewOrders, "/dashboard/")?;
    let orders = state.services.orders().list_orders().await?;

    let mut context = Context::new();
    context.insert("orders", &orders);
    ctx.page(&state, "orders_list.html", context)
}

pub async fn add_order_form(State(state): State<AppState>, ctx: RequestContext) -> AppResult<Response> {
    ctx.require(Capability::ManageOrders, ORDERS_URL)?;
    render_form(
        &state,
        &ctx,
        OrderPage {
            order: None,
            form: &OrderForm::blank(),
            errors: &FieldErrors::new(),
            item_form: &OrderItemForm::default(),
            item_errors: &FieldErrors::new(),
        },
    )
    .await
}

pub async fn add_order(
    State(state): State<AppState>,
    ctx: RequestContext,
    Form(form): Form<OrderForm>,
) -> AppResult<Response> {
    ctx.require(Capability::ManageOrders, ORDERS_URL)?;

    let result = match form.to_input() {
        Ok(input) => state.services.orders().create_order(input).await,
        Err(errors) => Err(AppError::Invalid(errors)),
    };

    match result {
        Ok(order) => Ok(Flash::success(format!("{} added successfully", order)).redirect(ORDERS_URL)),
        Err(AppError::Invalid(errors)) => {
            render_form(
                &state,
                &ctx,
                OrderPage {
                    order: None,
                    form: &form,
                    errors: &errors,
                    item_form: &OrderItemForm::default(),
                    item_errors: &FieldErrors::new(),
                },
            )
            .await
        }
        Err(e) => Err(e),
    }
}

pub async fn edit_order_form(
    State(state): State<AppState>,
    ctx: RequestContext,
    PagePath(order_id): PagePath<i32>,
) -> AppResult<Response> {
    ctx.require(Capability::ManageOrders, ORDERS_URL)?;
    let order = state.services.orders().get_order(order_id).await?;

    render_form(
        &state,
        &ctx,
        OrderPage {
            order: Some(&order),
            form: &OrderForm::from_order(&order.order),
            errors: &FieldErrors::new(),
            item_form: &OrderItemForm::default(),
            item_errors: &FieldErrors::new(),
        },
    )
    .await
}

pub async fn edit_order(
    State(state): State<AppState>,
    ctx: RequestContext,
    PagePath(order_id): PagePath<i32>,
    Form(form): Form<OrderForm>,
) -> AppResult<Response> {
    ctx.require(Capability::ManageOrders, ORDERS_URL)?;
    let orders = state.services.orders();

    let result = match form.to_input() {
        Ok(input) => orders.update_order(order_id, input).await,
        Err(errors) => Err(AppError::Invalid(errors)),
    };

    match result {
        Ok(order) => Ok(Flash::success(format!("{} updated successfully", order)).redirect(ORDERS_URL)),
        Err(AppError::Invalid(errors)) => {
            let order = orders.get_order(order_id).await?;
            render_form(
                &state,
                &ctx,
                OrderPage {
                    order: Some(&order),
                    form: &form,
                    errors: &errors,
                    item_form: &OrderItemForm::default(),
                    item_errors: &FieldErrors::new(),
                },
            )
            .await
        }
        Err(e) => Err(e),
    }
}

pub async fn confirm_delete_order(
    State(state): State<AppState>,
    ctx: RequestContext,
    PagePath(order_id): PagePath<i32>,
) -> AppResult<Response> {
    ctx.require(Capability::ManageOrders, ORDERS_URL)?;
    let order = state.services.orders().get_order(order_id).await?;

    let mut context = Context::new();
    context.insert("order", &order);
    ctx.page(&state, "order_confirm_delete.html", context)
}

pub async fn delete_order(
    State(state): State<AppState>,
    ctx: RequestContext,
    PagePath(order_id): PagePath<i32>,
) -> AppResult<Response> {
    ctx.require(Capability::ManageOrders, ORDERS_URL)?;
    let order = state.services.orders().delete_order(order_id).await?;
    Ok(Flash::success(format!("{} deleted successfully", order)).redirect(ORDERS_URL))
}

pub async fn add_order_item(
    State(state): State<AppState>,
    ctx: RequestContext,
    PagePath(order_id): PagePath<i32>,
    Form(item_form): Form<OrderItemForm>,
) -> AppResult<Response> {
    ctx.require(Capability::ManageOrders, ORDERS_URL)?;
    let orders = state.services.orders();
    let edit_url = format!("/orders/{}/edit/", order_id);

    let result = match item_form.to_input() {
        Ok(input) => orders.add_item(order_id, input).await,
        Err(errors) => Err(AppError::Invalid(errors)),
    };

    match result {
        Ok(item) => Ok(Flash::success(format!("Product {} added to the order", item.product_article))
            .redirect(&edit_url)),
        Err(AppError::Invalid(item_errors)) => {
            let order = orders.get_order(order_id).await?;
            render_form(
                &state,
                &ctx,
                OrderPage {
                    order: Some(&order),
                    form: &OrderForm::from_order(&order.order),
                    errors: &FieldErrors::new(),
                    item_form: &item_form,
                    item_errors: &item_errors,
                },
            )
            .await
        }
        Err(e) => Err(e),
    }
}

pub async fn remove_order_item(
    State(state): State<AppState>,
    ctx: RequestContext,
    PagePath((order_id, item_id)): PagePath<(i32, i32)>,
) -> AppResult<Response> {
    ctx.require(Capability::ManageOrders, ORDERS_URL)?;
    state.services.orders().remove_item(order_id, item_id).await?;
    Ok(Flash::success("Item removed from the order").redirect(&format!("/orders/{}/edit/", order_id)))
}
