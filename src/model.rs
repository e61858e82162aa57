// Record Model - generic CRUD and relation management
//
// Any entity with an identity, a schema, and one relation collection gets
// create / update / delete / add / remove / clear for free. Every mutation
// ends in `commit`: stage, write, then re-read the record from the store.

use crate::error::{CatalogError, Result};
use crate::schema::{EntitySchema, FieldSet, FieldValue};
use rusqlite::{params, Connection, Row, ToSql};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

/// Join table shared by both sides of the many-to-many link
pub const ASSOCIATION_TABLE: &str = "association";

/// Where a record's relation collection lives in the join table.
#[derive(Debug, Clone, Copy)]
pub struct Relation {
    /// Collection name as exposed to clients ("filmography", "cast")
    pub name: &'static str,
    /// Join column pointing at the owning record
    pub owner_column: &'static str,
    /// Join column pointing at the related record
    pub related_column: &'static str,
}

/// Capability every persisted entity kind implements.
pub trait Record: Sized {
    /// Kind on the other side of the relation collection
    type Related: Record;

    const SCHEMA: EntitySchema;
    const RELATION: Relation;

    /// Build from a row laid out as `id` followed by `SCHEMA.fields` in order.
    /// The relation set starts empty.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    fn id(&self) -> i64;

    fn relations(&self) -> &BTreeSet<i64>;

    fn relations_mut(&mut self) -> &mut BTreeSet<i64>;
}

/// Minimal view of a related record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedRef {
    pub id: i64,
    pub name: String,
}

// ============================================================================
// LOOKUPS
// ============================================================================

fn select_sql<R: Record>() -> String {
    format!(
        "SELECT id, {} FROM {}",
        R::SCHEMA.column_names().join(", "),
        R::SCHEMA.table
    )
}

fn load_relations<R: Record>(conn: &Connection, record: &mut R) -> Result<()> {
    let relation = R::RELATION;
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM {} WHERE {} = ?1",
        relation.related_column, ASSOCIATION_TABLE, relation.owner_column
    ))?;

    let ids = stmt
        .query_map([record.id()], |row| row.get::<_, i64>(0))?
        .collect::<rusqlite::Result<BTreeSet<_>>>()?;

    *record.relations_mut() = ids;
    Ok(())
}

/// First record whose `field` equals `value`. Only `id` and schema fields
/// may be used as filters.
pub fn find_by<R: Record>(conn: &Connection, field: &str, value: &FieldValue) -> Result<Option<R>> {
    if !R::SCHEMA.allows(field) {
        return Err(CatalogError::InvalidFields(vec![field.to_string()]));
    }

    let sql = format!("{} WHERE {} = ?1 LIMIT 1", select_sql::<R>(), field);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query_map([value], R::from_row)?;

    match rows.next() {
        Some(row) => {
            let mut record = row?;
            load_relations(conn, &mut record)?;
            Ok(Some(record))
        }
        None => Ok(None),
    }
}

pub fn find<R: Record>(conn: &Connection, id: i64) -> Result<Option<R>> {
    find_by(conn, "id", &FieldValue::Integer(id))
}

/// Like `find`, but an absent record is an error
pub fn get<R: Record>(conn: &Connection, id: i64) -> Result<R> {
    find(conn, id)?.ok_or_else(|| CatalogError::not_found(R::SCHEMA.kind, id))
}

pub fn all<R: Record>(conn: &Connection) -> Result<Vec<R>> {
    let mut stmt = conn.prepare(&format!("{} ORDER BY id", select_sql::<R>()))?;
    let mut records = stmt
        .query_map([], R::from_row)?
        .collect::<rusqlite::Result<Vec<R>>>()?;

    for record in records.iter_mut() {
        load_relations(conn, record)?;
    }

    Ok(records)
}

/// Id and name of every record in the relation collection, ordered by id.
pub fn related<R: Record>(conn: &Connection, record: &R) -> Result<Vec<RelatedRef>> {
    let relation = R::RELATION;
    let sql = format!(
        "SELECT r.id, r.name FROM {related} r
         JOIN {join} a ON a.{related_col} = r.id
         WHERE a.{owner_col} = ?1
         ORDER BY r.id",
        related = <R::Related as Record>::SCHEMA.table,
        join = ASSOCIATION_TABLE,
        related_col = relation.related_column,
        owner_col = relation.owner_column,
    );

    let mut stmt = conn.prepare(&sql)?;
    let refs = stmt
        .query_map([record.id()], |row| {
            Ok(RelatedRef {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(refs)
}

// ============================================================================
// MUTATIONS
// ============================================================================

/// Write the record's relation set and return the record as the store sees it.
fn commit<R: Record>(conn: &Connection, record: &R) -> Result<R> {
    let relation = R::RELATION;
    let tx = conn.unchecked_transaction()?;

    tx.execute(
        &format!(
            "DELETE FROM {} WHERE {} = ?1",
            ASSOCIATION_TABLE, relation.owner_column
        ),
        [record.id()],
    )?;

    {
        let mut insert = tx.prepare(&format!(
            "INSERT INTO {} ({}, {}) VALUES (?1, ?2)",
            ASSOCIATION_TABLE, relation.owner_column, relation.related_column
        ))?;
        for related_id in record.relations() {
            insert.execute(params![record.id(), related_id])?;
        }
    }

    tx.commit()?;

    get(conn, record.id())
}

/// Insert a new record; the store assigns its identity.
pub fn create<R: Record>(conn: &Connection, fields: &FieldSet) -> Result<R> {
    let table = R::SCHEMA.table;

    if fields.is_empty() {
        conn.execute(&format!("INSERT INTO {} DEFAULT VALUES", table), [])?;
    } else {
        let columns: Vec<&str> = fields.keys().copied().collect();
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders.join(", ")
        );
        conn.execute(&sql, rusqlite::params_from_iter(fields.values()))?;
    }

    let id = conn.last_insert_rowid();
    debug!(kind = R::SCHEMA.kind, id, "record created");

    let record: R = get(conn, id)?;
    commit(conn, &record)
}

/// Overwrite the supplied fields of an existing record. Fields absent from
/// `fields` are left untouched. `Ok(None)` when the id is unknown.
pub fn update<R: Record>(conn: &Connection, id: i64, fields: &FieldSet) -> Result<Option<R>> {
    let Some(record) = find::<R>(conn, id)? else {
        return Ok(None);
    };

    if !fields.is_empty() {
        let assignments: Vec<String> = fields
            .keys()
            .enumerate()
            .map(|(i, column)| format!("{} = ?{}", column, i + 1))
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            R::SCHEMA.table,
            assignments.join(", "),
            fields.len() + 1
        );

        let mut values: Vec<&dyn ToSql> = fields.values().map(|v| v as &dyn ToSql).collect();
        values.push(&id);
        conn.execute(&sql, values.as_slice())?;
        debug!(kind = R::SCHEMA.kind, id, fields = fields.len(), "record updated");
    }

    commit(conn, &record).map(Some)
}

/// Remove a record. Returns `false` when there was nothing to remove.
pub fn delete<R: Record>(conn: &Connection, id: i64) -> Result<bool> {
    let removed = conn.execute(
        &format!("DELETE FROM {} WHERE id = ?1", R::SCHEMA.table),
        [id],
    )?;

    debug!(kind = R::SCHEMA.kind, id, removed, "record delete");
    Ok(removed > 0)
}

/// Add `related` to the owner's relation collection. Adding a record that is
/// already present leaves the collection unchanged.
pub fn add_relation<R: Record>(conn: &Connection, id: i64, related: &R::Related) -> Result<Option<R>> {
    let Some(mut record) = find::<R>(conn, id)? else {
        return Ok(None);
    };

    record.relations_mut().insert(related.id());
    commit(conn, &record).map(Some)
}

/// Drop `related` from the owner's relation collection. Removing a
/// non-member still commits and returns the record.
pub fn remove_relation<R: Record>(conn: &Connection, id: i64, related: &R::Related) -> Result<Option<R>> {
    let Some(mut record) = find::<R>(conn, id)? else {
        return Ok(None);
    };

    record.relations_mut().remove(&related.id());
    commit(conn, &record).map(Some)
}

pub fn clear_relations<R: Record>(conn: &Connection, id: i64) -> Result<Option<R>> {
    let Some(mut record) = find::<R>(conn, id)? else {
        return Ok(None);
    };

    record.relations_mut().clear();
    commit(conn, &record).map(Some)
}
