//! Categories group transactions, e.g. "Groceries" or "Rent".

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    database_id::{CategoryId, GENERATED_ID_SQL},
};

/// A spending category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The display name, also used to filter the transactions page.
    pub name: String,
    /// A short icon, typically a single emoji.
    pub icon: String,
    /// A CSS colour used for the category's badge, e.g. "#16a34a".
    pub color: String,
}

/// The fields needed to create a [Category].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    /// An explicit ID for the category. The database generates one if `None`.
    pub id: Option<CategoryId>,
    /// The display name.
    pub name: String,
    /// A short icon, typically a single emoji.
    pub icon: String,
    /// A CSS colour.
    pub color: String,
}

/// Create the category table.
///
/// # Errors
/// Returns an error if the table cannot be created.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS category (
            id TEXT PRIMARY KEY NOT NULL DEFAULT ({GENERATED_ID_SQL}),
            name TEXT NOT NULL,
            icon TEXT NOT NULL,
            color TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_category_name ON category(name);"
    ))
}

/// Create a category and return it with its ID.
///
/// # Errors
/// Returns a [Error::SqlError] if the ID is already taken or there is some other SQL error.
pub fn create_category(category: NewCategory, connection: &Connection) -> Result<Category, Error> {
    connection
        .prepare(&format!(
            "INSERT INTO category (id, name, icon, color)
             VALUES (COALESCE(?1, {GENERATED_ID_SQL}), ?2, ?3, ?4)
             RETURNING id, name, icon, color"
        ))?
        .query_row(
            (category.id, category.name, category.icon, category.color),
            map_category_row,
        )
        .map_err(Error::from)
}

/// Retrieve all categories ordered alphabetically by name.
///
/// # Errors
/// Returns a [Error::SqlError] if there is an SQL error.
pub fn get_all_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT id, name, icon, color FROM category ORDER BY name ASC")?
        .query_map([], map_category_row)?
        .map(|maybe_category| maybe_category.map_err(Error::from))
        .collect()
}

/// Map the columns `id, name, icon, color` starting at `offset` to a [Category].
pub(crate) fn map_category_columns(row: &Row, offset: usize) -> Result<Category, rusqlite::Error> {
    Ok(Category {
        id: row.get(offset)?,
        name: row.get(offset + 1)?,
        icon: row.get(offset + 2)?,
        color: row.get(offset + 3)?,
    })
}

fn map_category_row(row: &Row) -> Result<Category, rusqlite::Error> {
    map_category_columns(row, 0)
}
