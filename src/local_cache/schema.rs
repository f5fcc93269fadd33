//! SQLite schema definitions for the profile storage database.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP};

// =============================================================================
// Version 1 - Key/value items with writer tracking
// =============================================================================

/// One row per storage key. `revision` is global and monotonic across keys,
/// `writer` is the id of the handle that committed the current value.
const STORAGE_ITEMS_TABLE_V1: Table = Table {
    name: "storage_items",
    columns: &[
        sqlite_column!("key", &SqlType::Text, is_primary_key = true),
        sqlite_column!("value", &SqlType::Text, non_null = true),
        sqlite_column!("revision", &SqlType::Integer, non_null = true),
        sqlite_column!("writer", &SqlType::Text, non_null = true),
        sqlite_column!(
            "updated_at",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_storage_items_revision", "revision")],
};

pub const STORAGE_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 1,
    tables: &[STORAGE_ITEMS_TABLE_V1],
    migration: None,
}];
