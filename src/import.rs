// Bulk import - CSV -> SQLite
// Rows go through the same field validation and record model as HTTP
// requests. Records whose name already exists are skipped, so importing
// the same file twice is harmless.

use crate::entities::{Actor, Movie};
use crate::error::{CatalogError, Result};
use crate::model::{self, Record};
use crate::schema::{FieldValue, RawFields};
use anyhow::Context as _;
use rusqlite::Connection;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub inserted: usize,
    /// Name already present in the store
    pub skipped: usize,
    /// Rows that failed validation or referenced unknown records
    pub rejected: usize,
}

impl ImportSummary {
    fn absorb(&mut self, other: ImportSummary) {
        self.inserted += other.inserted;
        self.skipped += other.skipped;
        self.rejected += other.rejected;
    }
}

/// Outcome of every import step run by the CLI
#[derive(Debug, Default)]
pub struct ImportReport {
    pub actors: ImportSummary,
    pub movies: ImportSummary,
    pub relations: ImportSummary,
}

fn read_rows<Rd: Read>(reader: Rd) -> Vec<RawFields> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut rows = Vec::new();
    for (line, result) in rdr.deserialize::<RawFields>().enumerate() {
        match result {
            Ok(row) => rows.push(row),
            // Header is line 1
            Err(err) => warn!(line = line + 2, error = %err, "unreadable csv row"),
        }
    }

    rows
}

/// Create one record per row, skipping names that already exist.
pub fn import_records<R: Record, Rd: Read>(conn: &Connection, reader: Rd) -> Result<ImportSummary> {
    let mut summary = ImportSummary::default();

    for row in read_rows(reader) {
        let fields = match R::SCHEMA.validate_create(&row) {
            Ok(fields) => fields,
            Err(err) => {
                warn!(kind = R::SCHEMA.kind, error = %err, "rejected row");
                summary.rejected += 1;
                continue;
            }
        };

        if let Some(name) = fields.get("name") {
            if model::find_by::<R>(conn, "name", name)?.is_some() {
                summary.skipped += 1;
                continue;
            }
        }

        match model::create::<R>(conn, &fields) {
            Ok(_) => summary.inserted += 1,
            Err(err) if err.is_constraint_violation() => summary.skipped += 1,
            Err(err) => return Err(err),
        }
    }

    info!(
        kind = R::SCHEMA.kind,
        inserted = summary.inserted,
        skipped = summary.skipped,
        rejected = summary.rejected,
        "import finished"
    );
    Ok(summary)
}

fn find_by_name<R: Record>(conn: &Connection, name: &str) -> Result<Option<R>> {
    model::find_by(conn, "name", &FieldValue::Text(name.to_string()))
}

/// Link actors to movies from rows of `actor,movie` names.
pub fn import_relations<Rd: Read>(conn: &Connection, reader: Rd) -> Result<ImportSummary> {
    let mut summary = ImportSummary::default();

    for row in read_rows(reader) {
        let (Some(actor_name), Some(movie_name)) = (row.get("actor"), row.get("movie")) else {
            warn!("relation row needs actor and movie columns");
            summary.rejected += 1;
            continue;
        };

        let actor = find_by_name::<Actor>(conn, actor_name)?;
        let movie = find_by_name::<Movie>(conn, movie_name)?;
        let (Some(actor), Some(movie)) = (actor, movie) else {
            warn!(actor = %actor_name, movie = %movie_name, "relation references unknown record");
            summary.rejected += 1;
            continue;
        };

        if actor.filmography.contains(&movie.id) {
            summary.skipped += 1;
            continue;
        }

        model::add_relation::<Actor>(conn, actor.id, &movie)?
            .ok_or_else(|| CatalogError::not_found(Actor::SCHEMA.kind, actor.id))?;
        summary.inserted += 1;
    }

    info!(
        inserted = summary.inserted,
        skipped = summary.skipped,
        rejected = summary.rejected,
        "relation import finished"
    );
    Ok(summary)
}

fn open_csv(path: &Path) -> anyhow::Result<std::fs::File> {
    std::fs::File::open(path).with_context(|| format!("Failed to open CSV file {}", path.display()))
}

/// Import whichever files are given, records first so relations can resolve.
pub fn import_files(
    conn: &Connection,
    actors: Option<&Path>,
    movies: Option<&Path>,
    relations: Option<&Path>,
) -> anyhow::Result<ImportReport> {
    let mut report = ImportReport::default();

    if let Some(path) = actors {
        report.actors.absorb(import_records::<Actor, _>(conn, open_csv(path)?)?);
    }
    if let Some(path) = movies {
        report.movies.absorb(import_records::<Movie, _>(conn, open_csv(path)?)?);
    }
    if let Some(path) = relations {
        report.relations.absorb(import_relations(conn, open_csv(path)?)?);
    }

    Ok(report)
}
