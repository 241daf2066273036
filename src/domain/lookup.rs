//! Name-only reference data: categories, manufacturers, suppliers and
//! delivery points.

use serde::Serialize;

/// Reference tables managed from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum LookupKind {
    Category,
    Manufacturer,
    Supplier,
    DeliveryPoint,
}

impl LookupKind {
    /// Whether removing a row is refused while products reference it.
    /// Delivery points are detached from their orders instead.
    pub fn is_protected(self) -> bool {
        !matches!(self, LookupKind::DeliveryPoint)
    }

    pub fn label(self) -> &'static str {
        match self {
            LookupKind::Category => "Category",
            LookupKind::Manufacturer => "Manufacturer",
            LookupKind::Supplier => "Supplier",
            LookupKind::DeliveryPoint => "Delivery point",
        }
    }
}

/// One row of a reference table. For delivery points `name` holds the address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lookup {
    pub id: i32,
    pub name: String,
}

impl std::fmt::Display for Lookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Reference data a product form needs for its select boxes
#[derive(Debug, Clone, Default, Serialize)]
pub struct CatalogLookups {
    pub categories: Vec<Lookup>,
    pub manufacturers: Vec<Lookup>,
    pub suppliers: Vec<Lookup>,
}
