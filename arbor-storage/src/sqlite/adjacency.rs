use super::lock;
use crate::{AdjacencyTable, StorageResult};
use arbor_types::EntityId;
use rusqlite::{Connection, Row, params};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Adjacency table stored as `(parent_id, child_id, sort_order)` rows.
pub struct SqliteAdjacencyTable {
    conn: Arc<Mutex<Connection>>,
    table: String,
}

impl SqliteAdjacencyTable {
    pub(crate) fn new(conn: Arc<Mutex<Connection>>, table: String) -> Self {
        Self { conn, table }
    }

    fn collect_ids(&self, sql: &str, id: Option<EntityId>) -> StorageResult<Vec<EntityId>> {
        let conn = lock(&self.conn);
        let mut stmt = conn.prepare(sql)?;
        let rows = match id {
            Some(id) => stmt.query_map(params![id.get()], first_id)?,
            None => stmt.query_map([], first_id)?,
        };
        let mut result = Vec::new();
        for row in rows {
            result.push(EntityId::new(row?));
        }
        Ok(result)
    }
}

impl AdjacencyTable for SqliteAdjacencyTable {
    fn children_of(&self, parent: EntityId) -> StorageResult<Vec<EntityId>> {
        self.collect_ids(
            &format!(
                "SELECT child_id FROM {} WHERE parent_id = ?1 ORDER BY sort_order",
                self.table
            ),
            Some(parent),
        )
    }

    fn all_children(&self) -> StorageResult<HashSet<EntityId>> {
        Ok(self
            .collect_ids(&format!("SELECT DISTINCT child_id FROM {}", self.table), None)?
            .into_iter()
            .collect())
    }

    fn parents_of(&self, child: EntityId) -> StorageResult<HashSet<EntityId>> {
        Ok(self
            .collect_ids(
                &format!("SELECT parent_id FROM {} WHERE child_id = ?1", self.table),
                Some(child),
            )?
            .into_iter()
            .collect())
    }

    fn insert_at(&mut self, child: EntityId, parent: EntityId, order: u32) -> StorageResult<()> {
        let mut conn = lock(&self.conn);
        let tx = conn.transaction()?;
        tx.execute(
            &format!("DELETE FROM {} WHERE parent_id = ?1 AND child_id = ?2", self.table),
            params![parent.get(), child.get()],
        )?;
        let occupied: i64 = tx.query_row(
            &format!(
                "SELECT COUNT(*) FROM {} WHERE parent_id = ?1 AND sort_order = ?2",
                self.table
            ),
            params![parent.get(), order],
            |row| row.get(0),
        )?;
        if occupied > 0 {
            tx.execute(
                &format!(
                    "UPDATE {} SET sort_order = sort_order + 1 WHERE parent_id = ?1 AND sort_order >= ?2",
                    self.table
                ),
                params![parent.get(), order],
            )?;
        }
        tx.execute(
            &format!(
                "INSERT INTO {} (parent_id, child_id, sort_order) VALUES (?1, ?2, ?3)",
                self.table
            ),
            params![parent.get(), child.get(), order],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn remove_edge(&mut self, child: EntityId, parent: EntityId) -> StorageResult<()> {
        let conn = lock(&self.conn);
        conn.execute(
            &format!("DELETE FROM {} WHERE parent_id = ?1 AND child_id = ?2", self.table),
            params![parent.get(), child.get()],
        )?;
        Ok(())
    }

    fn purge(&mut self, id: EntityId) -> StorageResult<()> {
        let conn = lock(&self.conn);
        conn.execute(
            &format!("DELETE FROM {} WHERE parent_id = ?1 OR child_id = ?1", self.table),
            params![id.get()],
        )?;
        Ok(())
    }
}

fn first_id(row: &Row<'_>) -> rusqlite::Result<i64> {
    row.get(0)
}
