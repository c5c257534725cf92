//! # Result Projector
//!
//! Shapes native storage results into the envelope's `data`. The shape is
//! decided once per request by a [`Projection`]:
//!
//! | mode      | all fields              | projected                |
//! |-----------|-------------------------|--------------------------|
//! | Raw       | native result, as is    | native result, as is     |
//! | Versioned | `{version, data: _source}` | `{version, data: fields}` |
//! | Plain     | `_source`               | `fields`                 |

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::store::{GetResult, SearchHit, SearchResponse};

use super::errors::ResourceResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionMode {
    /// Pass the storage engine's structure through.
    Raw,
    /// Wrap each entity as `{version, data}`.
    Versioned,
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSelection {
    AllFields,
    /// Only the requested `dataFields`.
    Projected,
}

/// The per-request shaping decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projection {
    pub mode: ProjectionMode,
    pub fields: FieldSelection,
}

impl Projection {
    /// `raw` wins over `versioned`.
    pub fn new(raw: bool, versioned: bool, projected: bool) -> Self {
        let mode = if raw {
            ProjectionMode::Raw
        } else if versioned {
            ProjectionMode::Versioned
        } else {
            ProjectionMode::Plain
        };
        let fields = if projected {
            FieldSelection::Projected
        } else {
            FieldSelection::AllFields
        };
        Self { mode, fields }
    }

    pub fn is_raw(&self) -> bool {
        self.mode == ProjectionMode::Raw
    }
}

/// Native structure of any storage result.
pub fn raw<T: Serialize>(result: &T) -> ResourceResult<Value> {
    Ok(serde_json::to_value(result)?)
}

fn hit_data(hit: &SearchHit, fields: FieldSelection) -> Value {
    match (fields, &hit.fields, &hit.source) {
        (FieldSelection::Projected, Some(projected), _) => Value::Object(projected.clone()),
        (_, _, Some(source)) => source.clone(),
        (_, Some(projected), None) => Value::Object(projected.clone()),
        (_, None, None) => Value::Object(Map::new()),
    }
}

fn wrap(version: Option<u64>, data: Value) -> Value {
    json!({ "version": version, "data": data })
}

/// Shape a search response.
pub fn project_search(response: &SearchResponse, projection: Projection) -> ResourceResult<Value> {
    let hits: Vec<Value> = match projection.mode {
        ProjectionMode::Raw => return raw(response),
        ProjectionMode::Versioned => response
            .hits
            .hits
            .iter()
            .map(|hit| wrap(hit.version, hit_data(hit, projection.fields)))
            .collect(),
        ProjectionMode::Plain => response
            .hits
            .hits
            .iter()
            .map(|hit| hit_data(hit, projection.fields))
            .collect(),
    };
    Ok(json!({ "hits": hits }))
}

/// Shape a single fetched entity. Field selection does not apply here.
pub fn project_entity(result: &GetResult, projection: Projection) -> ResourceResult<Value> {
    match projection.mode {
        ProjectionMode::Raw => raw(result),
        ProjectionMode::Versioned => Ok(wrap(Some(result.version), result.source.clone())),
        ProjectionMode::Plain => Ok(result.source.clone()),
    }
}
