// Movie Entity
// name (unique), year, genre; cast -> Actor

use crate::entities::Actor;
use crate::model::{Record, Relation};
use crate::schema::{EntitySchema, FieldSpec, FieldType};
use rusqlite::Row;
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Movie {
    pub id: i64,
    pub name: String,
    pub year: i64,
    pub genre: String,

    /// Ids of actors appearing in this movie
    #[serde(skip)]
    pub cast: BTreeSet<i64>,
}

impl Record for Movie {
    type Related = Actor;

    const SCHEMA: EntitySchema = EntitySchema {
        kind: "Movie",
        table: "movies",
        fields: &[
            FieldSpec::required("name", FieldType::Text),
            FieldSpec::required("year", FieldType::Integer),
            FieldSpec::required("genre", FieldType::Text),
        ],
    };

    const RELATION: Relation = Relation {
        name: "cast",
        owner_column: "movie_id",
        related_column: "actor_id",
    };

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Movie {
            id: row.get(0)?,
            name: row.get(1)?,
            year: row.get(2)?,
            genre: row.get(3)?,
            cast: BTreeSet::new(),
        })
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn relations(&self) -> &BTreeSet<i64> {
        &self.cast
    }

    fn relations_mut(&mut self) -> &mut BTreeSet<i64> {
        &mut self.cast
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::model;
    use crate::schema::{FieldValue, RawFields};

    fn inception() -> RawFields {
        RawFields::from([
            ("name".to_string(), "Inception".to_string()),
            ("genre".to_string(), "Sci-Fi".to_string()),
            ("year".to_string(), "2010".to_string()),
        ])
    }

    #[test]
    fn test_year_is_stored_as_integer() {
        let conn = open_in_memory().unwrap();
        let fields = Movie::SCHEMA.validate_create(&inception()).unwrap();

        let movie: Movie = model::create(&conn, &fields).unwrap();
        assert_eq!(movie.year, 2010);

        let json = serde_json::to_value(&movie).unwrap();
        assert_eq!(json["year"], serde_json::json!(2010));
        assert!(json.get("cast").is_none());
    }

    #[test]
    fn test_duplicate_name_is_rejected() {
        let conn = open_in_memory().unwrap();
        let fields = Movie::SCHEMA.validate_create(&inception()).unwrap();

        model::create::<Movie>(&conn, &fields).unwrap();
        let err = model::create::<Movie>(&conn, &fields).unwrap_err();
        assert!(err.is_constraint_violation());
    }

    #[test]
    fn test_find_by_name() {
        let conn = open_in_memory().unwrap();
        let fields = Movie::SCHEMA.validate_create(&inception()).unwrap();
        let created: Movie = model::create(&conn, &fields).unwrap();

        let found: Option<Movie> =
            model::find_by(&conn, "name", &FieldValue::Text("Inception".to_string())).unwrap();
        assert_eq!(found, Some(created));

        let missing: Option<Movie> =
            model::find_by(&conn, "name", &FieldValue::Text("Tenet".to_string())).unwrap();
        assert!(missing.is_none());
    }
}
