// SPDX-FileCopyrightText: 2026 Givesync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Category mapping reads.
//!
//! The mapping table is maintained by an external admin UI; the engine only
//! reads it. The upsert exists for operational seeding and tests.

use std::collections::HashMap;

use givesync_core::{CategoryMapping, SyncError};
use rusqlite::params;

use crate::database::{Database, map_tr_err};

/// Load all category mappings keyed by upstream category id.
pub async fn all(db: &Database) -> Result<HashMap<String, CategoryMapping>, SyncError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT category_id, display_name, class_name, location_name
                 FROM category_mappings",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(CategoryMapping {
                    category_id: row.get(0)?,
                    display_name: row.get(1)?,
                    class_name: row.get(2)?,
                    location_name: row.get(3)?,
                })
            })?;
            let mut mappings = HashMap::new();
            for row in rows {
                let mapping = row?;
                mappings.insert(mapping.category_id.clone(), mapping);
            }
            Ok(mappings)
        })
        .await
        .map_err(map_tr_err)
}

/// Insert or update a mapping row.
pub async fn upsert(db: &Database, mapping: &CategoryMapping) -> Result<(), SyncError> {
    let mapping = mapping.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO category_mappings (category_id, display_name, class_name, location_name)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(category_id) DO UPDATE
                 SET display_name = excluded.display_name,
                     class_name = excluded.class_name,
                     location_name = excluded.location_name",
                params![
                    mapping.category_id,
                    mapping.display_name,
                    mapping.class_name,
                    mapping.location_name,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
