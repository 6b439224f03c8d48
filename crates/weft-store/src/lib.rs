//! Weft Storage Layer
//!
//! Implements the RelationshipStore trait on SQLite.
//!
//! # Architecture
//!
//! - One `relationships` table (see `schema.sql`) with a composite
//!   unique key on (source_path, target_path, relationship_type) and
//!   independent indexes on both endpoint columns
//! - Adds upsert on the uniqueness triple with the max-merge rule
//! - `add_batch` is transactional: every row commits or none do
//! - A bounded read-through cache (see [`cache`]) can be layered on top
//!
//! # Examples
//!
//! ```no_run
//! use weft_store::SqliteStore;
//!
//! let store = SqliteStore::new("weft.db").unwrap();
//! // Store is now ready for relationship operations
//! ```

#![warn(missing_docs)]

pub mod cache;

use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use thiserror::Error;
use weft_domain::{
    Direction, Metadata, Relationship, RelationshipId, RelationshipStore, RelationshipType,
    ValidationError,
};

pub use cache::{CacheConfig, CacheStats, CachedStore, RelationshipCache};

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Relationship not found
    #[error("Relationship not found: {0}")]
    NotFound(String),

    /// Invalid data format in a stored row
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Relationship rejected before reaching the database
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
}

/// SQLite-based implementation of RelationshipStore
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Share a store across tasks by
/// wrapping it in a mutex (the orchestrator does exactly this).
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Create or open a store at the given database path
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use weft_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("weft.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (useful for testing)
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Convert bytes to RelationshipId
    fn bytes_to_id(bytes: &[u8]) -> Result<RelationshipId, StoreError> {
        let arr: [u8; 16] = bytes.try_into().map_err(|_| {
            StoreError::InvalidData(format!("Expected 16 bytes for id, got {}", bytes.len()))
        })?;
        Ok(RelationshipId::from_bytes(arr))
    }

    /// Map one result row to a Relationship
    fn row_to_relationship(row: &rusqlite::Row<'_>) -> rusqlite::Result<Relationship> {
        let id_bytes: Vec<u8> = row.get(0)?;
        let id = Self::bytes_to_id(&id_bytes).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Blob, Box::new(e))
        })?;

        let type_str: String = row.get(3)?;
        let relationship_type = RelationshipType::parse(&type_str).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?;

        let metadata_json: String = row.get(7)?;
        let metadata: Metadata = serde_json::from_str(&metadata_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(7, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(Relationship {
            id,
            source_path: row.get(1)?,
            target_path: row.get(2)?,
            relationship_type,
            forward_strength: row.get(4)?,
            reverse_strength: row.get(5)?,
            confidence: row.get(6)?,
            metadata,
            created_at: row.get::<_, i64>(8)? as u64,
            updated_at: row.get::<_, i64>(9)? as u64,
        })
    }

    /// Insert a relationship, or merge it into the existing row with the
    /// same (source, target, type) triple.
    ///
    /// Works on a plain connection or inside a transaction (a
    /// `Transaction` derefs to `Connection`). Returns the id of the row
    /// that now holds the data.
    fn upsert(conn: &Connection, relationship: &Relationship) -> Result<RelationshipId, StoreError> {
        relationship.validate()?;

        let existing = conn
            .query_row(
                "SELECT id, source_path, target_path, relationship_type,
                        forward_strength, reverse_strength, confidence,
                        metadata, created_at, updated_at
                 FROM relationships
                 WHERE source_path = ?1 AND target_path = ?2 AND relationship_type = ?3",
                params![
                    &relationship.source_path,
                    &relationship.target_path,
                    relationship.relationship_type.as_str(),
                ],
                Self::row_to_relationship,
            )
            .optional()?;

        match existing {
            Some(mut stored) => {
                stored.merge_from(relationship);
                let metadata_json = serde_json::to_string(&stored.metadata)
                    .map_err(|e| StoreError::InvalidData(e.to_string()))?;
                conn.execute(
                    "UPDATE relationships
                     SET forward_strength = ?1, reverse_strength = ?2, confidence = ?3,
                         metadata = ?4, updated_at = ?5
                     WHERE id = ?6",
                    params![
                        stored.forward_strength,
                        stored.reverse_strength,
                        stored.confidence,
                        metadata_json,
                        stored.updated_at as i64,
                        stored.id.to_bytes().to_vec(),
                    ],
                )?;
                Ok(stored.id)
            }
            None => {
                let metadata_json = serde_json::to_string(&relationship.metadata)
                    .map_err(|e| StoreError::InvalidData(e.to_string()))?;
                conn.execute(
                    "INSERT INTO relationships
                        (id, source_path, target_path, relationship_type,
                         forward_strength, reverse_strength, confidence,
                         metadata, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                    params![
                        relationship.id.to_bytes().to_vec(),
                        &relationship.source_path,
                        &relationship.target_path,
                        relationship.relationship_type.as_str(),
                        relationship.forward_strength,
                        relationship.reverse_strength,
                        relationship.confidence,
                        metadata_json,
                        relationship.created_at as i64,
                        relationship.updated_at as i64,
                    ],
                )?;
                Ok(relationship.id)
            }
        }
    }

    fn query_relationships(
        &self,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<Relationship>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let relationships = stmt
            .query_map(params, Self::row_to_relationship)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(relationships)
    }
}

const SELECT_COLUMNS: &str = "SELECT id, source_path, target_path, relationship_type,
        forward_strength, reverse_strength, confidence,
        metadata, created_at, updated_at
 FROM relationships";

impl RelationshipStore for SqliteStore {
    type Error = StoreError;

    fn add(&mut self, relationship: Relationship) -> Result<RelationshipId, Self::Error> {
        Self::upsert(&self.conn, &relationship)
    }

    fn add_batch(
        &mut self,
        relationships: Vec<Relationship>,
    ) -> Result<Vec<RelationshipId>, Self::Error> {
        let tx = self.conn.transaction()?;
        let mut ids = Vec::with_capacity(relationships.len());
        for relationship in &relationships {
            // Any failure drops the transaction, rolling back every row
            // written so far; the original error surfaces unchanged.
            ids.push(Self::upsert(&tx, relationship)?);
        }
        tx.commit()?;
        Ok(ids)
    }

    fn get(&self, id: RelationshipId) -> Result<Option<Relationship>, Self::Error> {
        let relationship = self
            .conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                params![id.to_bytes().to_vec()],
                Self::row_to_relationship,
            )
            .optional()?;
        Ok(relationship)
    }

    fn get_for_file(
        &self,
        path: &str,
        direction: Direction,
    ) -> Result<Vec<Relationship>, Self::Error> {
        let filter = match direction {
            Direction::Outgoing => "WHERE source_path = ?1",
            Direction::Incoming => "WHERE target_path = ?1",
            Direction::Both => "WHERE source_path = ?1 OR target_path = ?1",
        };
        let sql = format!(
            "{} {} ORDER BY source_path, target_path, relationship_type",
            SELECT_COLUMNS, filter
        );
        self.query_relationships(&sql, &[&path])
    }

    fn all(&self) -> Result<Vec<Relationship>, Self::Error> {
        let sql = format!(
            "{} ORDER BY source_path, target_path, relationship_type",
            SELECT_COLUMNS
        );
        self.query_relationships(&sql, &[])
    }

    fn remove(
        &mut self,
        source: &str,
        target: &str,
        relationship_type: Option<&RelationshipType>,
    ) -> Result<usize, Self::Error> {
        let removed = match relationship_type {
            Some(rt) => self.conn.execute(
                "DELETE FROM relationships
                 WHERE source_path = ?1 AND target_path = ?2 AND relationship_type = ?3",
                params![source, target, rt.as_str()],
            )?,
            None => self.conn.execute(
                "DELETE FROM relationships WHERE source_path = ?1 AND target_path = ?2",
                params![source, target],
            )?,
        };
        Ok(removed)
    }

    fn remove_for_file(&mut self, path: &str) -> Result<usize, Self::Error> {
        let removed = self.conn.execute(
            "DELETE FROM relationships WHERE source_path = ?1 OR target_path = ?1",
            params![path],
        )?;
        Ok(removed)
    }

    fn update_strength(
        &mut self,
        id: RelationshipId,
        direction: Direction,
        value: f64,
    ) -> Result<(), Self::Error> {
        if !value.is_finite() {
            return Err(ValidationError::NonFiniteStrength("strength").into());
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(ValidationError::StrengthOutOfRange {
                field: "strength",
                value,
            }
            .into());
        }

        let assignment = match direction {
            Direction::Outgoing => "forward_strength = ?1",
            Direction::Incoming => "reverse_strength = ?1",
            Direction::Both => "forward_strength = ?1, reverse_strength = ?1",
        };
        let sql = format!(
            "UPDATE relationships SET {}, updated_at = ?2 WHERE id = ?3",
            assignment
        );
        let updated = self.conn.execute(
            &sql,
            params![
                value,
                weft_domain::relationship::now_millis() as i64,
                id.to_bytes().to_vec()
            ],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
