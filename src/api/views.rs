//! Server-rendered HTML pages.

use tera::{Context, Tera};

use crate::errors::AppResult;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../templates/base.html")),
    ("login.html", include_str!("../../templates/login.html")),
    ("dashboard.html", include_str!("../../templates/dashboard.html")),
    ("products_list.html", include_str!("../../templates/products_list.html")),
    ("product_form.html", include_str!("../../templates/product_form.html")),
    (
        "product_confirm_delete.html",
        include_str!("../../templates/product_confirm_delete.html"),
    ),
    ("orders_list.html", include_str!("../../templates/orders_list.html")),
    ("order_form.html", include_str!("../../templates/order_form.html")),
    (
        "order_confirm_delete.html",
        include_str!("../../templates/order_confirm_delete.html"),
    ),
];

/// Template set compiled into the binary
pub struct Views {
    tera: Tera,
}

impl Views {
    pub fn new() -> AppResult<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.iter().copied())?;
        tracing::debug!(count = TEMPLATES.len(), "Templates loaded");
        Ok(Self { tera })
    }

    pub fn render(&self, template: &str, context: &Context) -> AppResult<String> {
        Ok(self.tera.render(template, context)?)
    }
}
