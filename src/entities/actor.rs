// Actor Entity
// name (unique), gender, date_of_birth; filmography -> Movie

use crate::entities::Movie;
use crate::model::{Record, Relation};
use crate::schema::{EntitySchema, FieldSpec, FieldType, DATE_FORMAT};
use chrono::NaiveDate;
use rusqlite::Row;
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Actor {
    pub id: i64,
    pub name: String,
    pub gender: String,
    #[serde(serialize_with = "serialize_date")]
    pub date_of_birth: NaiveDate,

    /// Ids of movies this actor appears in
    #[serde(skip)]
    pub filmography: BTreeSet<i64>,
}

fn serialize_date<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&date.format(DATE_FORMAT))
}

impl Record for Actor {
    type Related = Movie;

    const SCHEMA: EntitySchema = EntitySchema {
        kind: "Actor",
        table: "actors",
        fields: &[
            FieldSpec::required("name", FieldType::Text),
            FieldSpec::required("gender", FieldType::Text),
            FieldSpec::required("date_of_birth", FieldType::Date),
        ],
    };

    const RELATION: Relation = Relation {
        name: "filmography",
        owner_column: "actor_id",
        related_column: "movie_id",
    };

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Actor {
            id: row.get(0)?,
            name: row.get(1)?,
            gender: row.get(2)?,
            date_of_birth: row.get(3)?,
            filmography: BTreeSet::new(),
        })
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn relations(&self) -> &BTreeSet<i64> {
        &self.filmography
    }

    fn relations_mut(&mut self) -> &mut BTreeSet<i64> {
        &mut self.filmography
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::model;
    use crate::schema::{FieldSet, FieldValue};

    fn megan_fox() -> FieldSet {
        let mut fields = FieldSet::new();
        fields.insert("name", FieldValue::Text("Megan Fox".to_string()));
        fields.insert("gender", FieldValue::Text("female".to_string()));
        fields.insert(
            "date_of_birth",
            FieldValue::Date(NaiveDate::from_ymd_opt(1986, 5, 16).unwrap()),
        );
        fields
    }

    #[test]
    fn test_actor_roundtrip_through_store() {
        let conn = open_in_memory().unwrap();

        let created: Actor = model::create(&conn, &megan_fox()).unwrap();
        assert!(created.id > 0);
        assert_eq!(created.name, "Megan Fox");
        assert_eq!(created.date_of_birth, NaiveDate::from_ymd_opt(1986, 5, 16).unwrap());
        assert!(created.filmography.is_empty());

        let loaded: Actor = model::get(&conn, created.id).unwrap();
        assert_eq!(loaded, created);
    }

    #[test]
    fn test_actor_serializes_whitelisted_fields_only() {
        let actor = Actor {
            id: 7,
            name: "Megan Fox".to_string(),
            gender: "female".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1986, 5, 16).unwrap(),
            filmography: BTreeSet::from([1, 2]),
        };

        let json = serde_json::to_value(&actor).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 7,
                "name": "Megan Fox",
                "gender": "female",
                "date_of_birth": "16.05.1986",
            })
        );
    }
}
