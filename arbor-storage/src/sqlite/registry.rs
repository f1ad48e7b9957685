use super::{MAX_BATCH, lock, placeholders};
use crate::{Registry, StorageError, StorageResult};
use arbor_types::{EntityId, EntityKind};
use rusqlite::{Connection, params, params_from_iter};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Registry stored in the `<prefix>_manifest` table.
pub struct SqliteRegistry {
    conn: Arc<Mutex<Connection>>,
    table: String,
}

impl SqliteRegistry {
    pub(crate) fn new(conn: Arc<Mutex<Connection>>, table: String) -> Self {
        Self { conn, table }
    }
}

fn decode_kind(id: i64, code: i32) -> StorageResult<EntityKind> {
    EntityKind::from_code(code)
        .map_err(|e| StorageError::InvalidData(format!("entity {id}: {e}")))
}

impl Registry for SqliteRegistry {
    fn create(&mut self, kind: EntityKind) -> StorageResult<EntityId> {
        let conn = lock(&self.conn);
        conn.execute(
            &format!("INSERT INTO {} (type_id) VALUES (?1)", self.table),
            params![kind.code()],
        )?;
        Ok(EntityId::new(conn.last_insert_rowid()))
    }

    fn delete(&mut self, id: EntityId) -> StorageResult<()> {
        let conn = lock(&self.conn);
        conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", self.table),
            params![id.get()],
        )?;
        Ok(())
    }

    fn types_of(&self, ids: &[EntityId]) -> StorageResult<HashMap<EntityId, EntityKind>> {
        let conn = lock(&self.conn);
        let mut result = HashMap::new();
        for chunk in ids.chunks(MAX_BATCH) {
            let mut stmt = conn.prepare(&format!(
                "SELECT id, type_id FROM {} WHERE id IN ({})",
                self.table,
                placeholders(chunk.len())
            ))?;
            let rows = stmt.query_map(params_from_iter(chunk.iter().map(|id| id.get())), |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, i32>(1)?))
            })?;
            for row in rows {
                let (id, code) = row?;
                result.insert(EntityId::new(id), decode_kind(id, code)?);
            }
        }
        Ok(result)
    }

    fn ids_by_kind(&self, kind: EntityKind) -> StorageResult<HashSet<EntityId>> {
        let conn = lock(&self.conn);
        let mut stmt = conn.prepare(&format!("SELECT id FROM {} WHERE type_id = ?1", self.table))?;
        let rows = stmt.query_map(params![kind.code()], |row| row.get::<_, i64>(0))?;
        let mut result = HashSet::new();
        for row in rows {
            result.insert(EntityId::new(row?));
        }
        Ok(result)
    }

    fn all_ids(&self) -> StorageResult<Vec<EntityId>> {
        let conn = lock(&self.conn);
        let mut stmt = conn.prepare(&format!("SELECT id FROM {} ORDER BY id", self.table))?;
        let rows = stmt.query_map([], |row| row.get::<_, i64>(0))?;
        let mut result = Vec::new();
        for row in rows {
            result.push(EntityId::new(row?));
        }
        Ok(result)
    }
}
