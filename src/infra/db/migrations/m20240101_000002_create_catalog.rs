//! Migration: reference tables and products.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Name-only reference table with a unique name
fn lookup_table<T: Iden + Copy + 'static>(table: T, id: T, name: T) -> TableCreateStatement {
    Table::create()
        .table(table)
        .if_not_exists()
        .col(
            ColumnDef::new(id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(ColumnDef::new(name).string_len(100).not_null().unique_key())
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(lookup_table(Categories::Table, Categories::Id, Categories::Name))
            .await?;
        manager
            .create_table(lookup_table(
                Manufacturers::Table,
                Manufacturers::Id,
                Manufacturers::Name,
            ))
            .await?;
        manager
            .create_table(lookup_table(Suppliers::Table, Suppliers::Id, Suppliers::Name))
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Products::Article)
                            .string_len(50)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Products::Name).string_len(200).not_null())
                    .col(
                        ColumnDef::new(Products::Unit)
                            .string_len(20)
                            .not_null()
                            .default("pcs."),
                    )
                    .col(ColumnDef::new(Products::Price).decimal_len(10, 2).not_null())
                    .col(ColumnDef::new(Products::SupplierId).integer().not_null())
                    .col(ColumnDef::new(Products::ManufacturerId).integer().not_null())
                    .col(ColumnDef::new(Products::CategoryId).integer().not_null())
                    .col(
                        ColumnDef::new(Products::Discount)
                            .decimal_len(5, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Products::Quantity)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Products::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Products::Photo).string_len(255).null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_products_supplier")
                            .from(Products::Table, Products::SupplierId)
                            .to(Suppliers::Table, Suppliers::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_products_manufacturer")
                            .from(Products::Table, Products::ManufacturerId)
                            .to(Manufacturers::Table, Manufacturers::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_products_category")
                            .from(Products::Table, Products::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_products_supplier_id")
                    .table(Products::Table)
                    .col(Products::SupplierId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Suppliers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Manufacturers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await
    }
}

#[derive(Iden, Clone, Copy)]
pub(super) enum Categories {
    Table,
    Id,
    Name,
}

#[derive(Iden, Clone, Copy)]
pub(super) enum Manufacturers {
    Table,
    Id,
    Name,
}

#[derive(Iden, Clone, Copy)]
pub(super) enum Suppliers {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
pub(super) enum Products {
    Table,
    Article,
    Name,
    Unit,
    Price,
    SupplierId,
    ManufacturerId,
    CategoryId,
    Discount,
    Quantity,
    Description,
    Photo,
}
