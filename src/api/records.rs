// Record handlers
// One generic handler per operation, mounted once per entity kind.
// Each handler: extract fields -> validate -> record model -> shape response.

use super::form::RequestFields;
use super::{ApiResult, AppState};
use crate::error::CatalogError;
use crate::model::{self, Record, RelatedRef};
use crate::schema::parse_id;
use axum::{extract::State, response::Json};
use serde::Serialize;
use std::collections::BTreeMap;

/// Form key naming the record on the other side of a relation
pub const RELATION_ID_FIELD: &str = "relation_id";

#[derive(Debug, Serialize)]
pub struct Message {
    pub message: &'static str,
}

/// A record plus its relation collection as `{id, name}` summaries,
/// keyed by the collection name ("filmography" or "cast").
#[derive(Debug, Serialize)]
pub struct RelationView<R> {
    #[serde(flatten)]
    pub record: R,
    #[serde(flatten)]
    pub relations: BTreeMap<&'static str, Vec<RelatedRef>>,
}

fn relation_view<R: Record>(conn: &rusqlite::Connection, record: R) -> crate::Result<RelationView<R>> {
    let refs = model::related(conn, &record)?;
    Ok(RelationView {
        record,
        relations: BTreeMap::from([(R::RELATION.name, refs)]),
    })
}

fn not_found<R: Record>(id: i64) -> CatalogError {
    CatalogError::not_found(R::SCHEMA.kind, id)
}

/// GET /api/{kind}s - every record, without relations
pub async fn list<R>(State(state): State<AppState>) -> ApiResult<Vec<R>>
where
    R: Record + Serialize + Send + 'static,
{
    state.with_conn(|conn| model::all::<R>(conn)).await.map(Json)
}

/// GET /api/{kind}?id=N
pub async fn get_by_id<R>(State(state): State<AppState>, RequestFields(raw): RequestFields) -> ApiResult<R>
where
    R: Record + Serialize + Send + 'static,
{
    let id = parse_id(&raw, "id")?;
    state.with_conn(move |conn| model::get::<R>(conn, id)).await.map(Json)
}

/// POST /api/{kind}
pub async fn create<R>(State(state): State<AppState>, RequestFields(raw): RequestFields) -> ApiResult<R>
where
    R: Record + Serialize + Send + 'static,
{
    let fields = R::SCHEMA.validate_create(&raw)?;
    state
        .with_conn(move |conn| model::create::<R>(conn, &fields))
        .await
        .map(Json)
}

/// PUT /api/{kind}
pub async fn update<R>(State(state): State<AppState>, RequestFields(raw): RequestFields) -> ApiResult<R>
where
    R: Record + Serialize + Send + 'static,
{
    let (id, fields) = R::SCHEMA.validate_update(&raw)?;
    state
        .with_conn(move |conn| model::update::<R>(conn, id, &fields)?.ok_or_else(|| not_found::<R>(id)))
        .await
        .map(Json)
}

/// DELETE /api/{kind}
pub async fn delete<R>(State(state): State<AppState>, RequestFields(raw): RequestFields) -> ApiResult<Message>
where
    R: Record + Serialize + Send + 'static,
{
    let id = parse_id(&raw, "id")?;
    state
        .with_conn(move |conn| {
            if model::delete::<R>(conn, id)? {
                Ok(Json(Message {
                    message: "Record successfully deleted",
                }))
            } else {
                Err(not_found::<R>(id))
            }
        })
        .await
}

/// PUT /api/{kind}-relations - link `id` to `relation_id`
pub async fn add_relation<R>(
    State(state): State<AppState>,
    RequestFields(raw): RequestFields,
) -> ApiResult<RelationView<R>>
where
    R: Record + Serialize + Send + 'static,
{
    let id = parse_id(&raw, "id")?;
    let related_id = parse_id(&raw, RELATION_ID_FIELD)?;

    state
        .with_conn(move |conn| {
            let owner = model::get::<R>(conn, id)?;
            let related = model::get::<R::Related>(conn, related_id)?;
            let record = model::add_relation::<R>(conn, owner.id(), &related)?
                .ok_or_else(|| not_found::<R>(id))?;
            relation_view(conn, record)
        })
        .await
        .map(Json)
}

/// DELETE /api/{kind}-relations - drop the link to `relation_id` when given,
/// otherwise clear the whole collection
pub async fn remove_relations<R>(
    State(state): State<AppState>,
    RequestFields(raw): RequestFields,
) -> ApiResult<RelationView<R>>
where
    R: Record + Serialize + Send + 'static,
{
    let id = parse_id(&raw, "id")?;
    let related_id = if raw.contains_key(RELATION_ID_FIELD) {
        Some(parse_id(&raw, RELATION_ID_FIELD)?)
    } else {
        None
    };

    state
        .with_conn(move |conn| {
            // Owner first, so a missing owner is reported before a missing link target
            let owner = model::get::<R>(conn, id)?;
            let record = match related_id {
                Some(related_id) => {
                    let related = model::get::<R::Related>(conn, related_id)?;
                    model::remove_relation::<R>(conn, owner.id(), &related)?
                }
                None => model::clear_relations::<R>(conn, owner.id())?,
            };
            relation_view(conn, record.ok_or_else(|| not_found::<R>(id))?)
        })
        .await
        .map(Json)
}
