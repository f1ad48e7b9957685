use super::{MAX_BATCH, lock, placeholders};
use crate::{AttributeTable, Namespace, StorageResult};
use arbor_model::AttributeMap;
use arbor_types::EntityId;
use rusqlite::types::Value;
use rusqlite::{Connection, params, params_from_iter};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Attribute table stored as `(id, property, value)` rows.
pub struct SqliteAttributeTable {
    conn: Arc<Mutex<Connection>>,
    namespace: Namespace,
    table: String,
}

impl SqliteAttributeTable {
    pub(crate) fn new(conn: Arc<Mutex<Connection>>, namespace: Namespace, table: String) -> Self {
        Self {
            conn,
            namespace,
            table,
        }
    }
}

impl AttributeTable for SqliteAttributeTable {
    fn namespace(&self) -> Namespace {
        self.namespace
    }

    fn set(&mut self, id: EntityId, key: &str, value: &str) -> StorageResult<()> {
        let conn = lock(&self.conn);
        if value.is_empty() {
            conn.execute(
                &format!("DELETE FROM {} WHERE id = ?1 AND property = ?2", self.table),
                params![id.get(), key],
            )?;
        } else {
            conn.execute(
                &format!(
                    "INSERT OR REPLACE INTO {} (id, property, value) VALUES (?1, ?2, ?3)",
                    self.table
                ),
                params![id.get(), key, value],
            )?;
        }
        Ok(())
    }

    fn get(&self, ids: &[EntityId]) -> StorageResult<HashMap<EntityId, AttributeMap>> {
        let conn = lock(&self.conn);
        let mut result: HashMap<EntityId, AttributeMap> =
            ids.iter().map(|id| (*id, AttributeMap::new())).collect();
        for chunk in ids.chunks(MAX_BATCH) {
            let mut stmt = conn.prepare(&format!(
                "SELECT id, property, value FROM {} WHERE id IN ({})",
                self.table,
                placeholders(chunk.len())
            ))?;
            let rows = stmt.query_map(params_from_iter(chunk.iter().map(|id| id.get())), |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?;
            for row in rows {
                let (id, property, value) = row?;
                result
                    .entry(EntityId::new(id))
                    .or_default()
                    .insert(property, value);
            }
        }
        Ok(result)
    }

    fn values_of(&self, key: &str) -> StorageResult<HashMap<EntityId, String>> {
        let conn = lock(&self.conn);
        let mut stmt =
            conn.prepare(&format!("SELECT id, value FROM {} WHERE property = ?1", self.table))?;
        let rows = stmt.query_map(params![key], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut result = HashMap::new();
        for row in rows {
            let (id, value) = row?;
            result.insert(EntityId::new(id), value);
        }
        Ok(result)
    }

    fn filter(&self, criteria: &AttributeMap) -> StorageResult<HashSet<EntityId>> {
        if criteria.is_empty() {
            return Ok(HashSet::new());
        }
        // (id, property) is the primary key, so an id matching every pair
        // yields exactly one row per pair.
        let clauses = vec!["(property = ? AND value = ?)"; criteria.len()].join(" OR ");
        let sql = format!(
            "SELECT id FROM {} WHERE {clauses} GROUP BY id HAVING COUNT(*) = ?",
            self.table
        );
        let mut bound: Vec<Value> = Vec::with_capacity(criteria.len() * 2 + 1);
        for (key, value) in criteria {
            bound.push(Value::Text(key.clone()));
            bound.push(Value::Text(value.clone()));
        }
        bound.push(Value::Integer(criteria.len() as i64));

        let conn = lock(&self.conn);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(bound), |row| row.get::<_, i64>(0))?;
        let mut result = HashSet::new();
        for row in rows {
            result.insert(EntityId::new(row?));
        }
        Ok(result)
    }

    fn clear(&mut self, id: EntityId) -> StorageResult<()> {
        let conn = lock(&self.conn);
        conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", self.table),
            params![id.get()],
        )?;
        Ok(())
    }
}
