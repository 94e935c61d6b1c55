//! Database configuration module.
//!
//! This module handles the database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs without hand-written SQL.

use crate::entities::{CartItem, Medicine, Order, OrderItem, User};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use std::path::Path;
use tracing::debug;

/// Default `SQLite` location used when neither the config file nor `DATABASE_URL` set one.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/medicart.sqlite?mode=rwc";

/// Establishes a connection to the database at `database_url`.
///
/// For file-backed `SQLite` URLs the parent directory is created first, since `SQLite`
/// will create the file but not the directory holding it.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    if let Some(parent) = sqlite_parent_dir(database_url) {
        debug!("Ensuring database directory {:?} exists", parent);
        tokio::fs::create_dir_all(parent).await?;
    }

    Database::connect(database_url).await.map_err(Into::into)
}

/// Returns the directory holding a file-backed `SQLite` database, if there is one to create.
fn sqlite_parent_dir(database_url: &str) -> Option<&Path> {
    let path = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = path.split('?').next().unwrap_or(path);

    if path.is_empty() || path.starts_with(":memory:") {
        return None;
    }

    Path::new(path)
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
}

/// Creates every table that does not exist yet.
///
/// Users come first so the foreign keys of carts and orders resolve; order items
/// follow orders for the same reason.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    create_table(db, User).await?;
    create_table(db, Medicine).await?;
    create_table(db, CartItem).await?;
    create_table(db, Order).await?;
    create_table(db, OrderItem).await?;
    Ok(())
}

async fn create_table<E>(db: &DatabaseConnection, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();

    db.execute(builder.build(&statement)).await?;
    Ok(())
}
