//! # Parameter Resolver
//!
//! Turns raw query pairs into typed, defaulted parameter sets. Each endpoint
//! declares the parameters it recognizes in a [`ParamSpec`] table; anything
//! else in the query string is ignored.
//!
//! Resolution never fails: a missing or ill-typed value falls back to the
//! default. Type errors are reported separately by [`validate_query`], which
//! the handlers run at the transport boundary.

use serde::Serialize;
use url::form_urlencoded;

use crate::http::request::RequestContext;
use crate::store::SortField;

use super::errors::{ResourceError, ResourceResult};
use super::projection::Projection;

/// Default page size.
pub const DEFAULT_LIMIT: u64 = 10;

/// Decoded query string, in request order.
pub type QueryPairs = Vec<(String, String)>;

/// Decode a raw query string.
pub fn parse_query(raw: Option<&str>) -> QueryPairs {
    raw.map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

/// Expected type of a query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Integer,
    Boolean,
    Text,
}

impl ParamKind {
    fn describe(self) -> &'static str {
        match self {
            ParamKind::Integer => "a non-negative integer",
            ParamKind::Boolean => "a boolean",
            ParamKind::Text => "a string",
        }
    }

    fn accepts(self, value: &str) -> bool {
        match self {
            ParamKind::Integer => coerce_integer(value).is_some(),
            ParamKind::Boolean => coerce_bool(value).is_some(),
            ParamKind::Text => true,
        }
    }
}

/// A recognized query parameter.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
}

const fn spec(name: &'static str, kind: ParamKind) -> ParamSpec {
    ParamSpec { name, kind }
}

/// `GET` collection.
pub const LIST_PARAMS: &[ParamSpec] = &[
    spec("limit", ParamKind::Integer),
    spec("offset", ParamKind::Integer),
    spec("sort", ParamKind::Text),
    spec("dataFields", ParamKind::Text),
    spec("dataOnly", ParamKind::Boolean),
    spec("actions", ParamKind::Boolean),
    spec("links", ParamKind::Boolean),
    spec("timeout", ParamKind::Integer),
    spec("version", ParamKind::Boolean),
    spec("raw", ParamKind::Boolean),
];

/// `GET` single entity.
pub const READ_PARAMS: &[ParamSpec] = &[
    spec("dataOnly", ParamKind::Boolean),
    spec("actions", ParamKind::Boolean),
    spec("links", ParamKind::Boolean),
    spec("timeout", ParamKind::Integer),
    spec("version", ParamKind::Boolean),
    spec("raw", ParamKind::Boolean),
];

/// `POST` collection and `PUT` entity.
pub const WRITE_PARAMS: &[ParamSpec] = &[
    spec("dataOnly", ParamKind::Boolean),
    spec("actions", ParamKind::Boolean),
    spec("links", ParamKind::Boolean),
    spec("raw", ParamKind::Boolean),
];

/// `DELETE` entity.
pub const DELETE_PARAMS: &[ParamSpec] = &[
    spec("actions", ParamKind::Boolean),
    spec("links", ParamKind::Boolean),
    spec("timeout", ParamKind::Integer),
    spec("raw", ParamKind::Boolean),
];

/// `GET` count sub-resource.
pub const COUNT_PARAMS: &[ParamSpec] = &[
    spec("links", ParamKind::Boolean),
    spec("timeout", ParamKind::Integer),
];

/// Check every recognized parameter present in `query` has the declared type.
pub fn validate_query(specs: &[ParamSpec], query: &QueryPairs) -> ResourceResult<()> {
    for (name, value) in query {
        if let Some(spec) = specs.iter().find(|s| s.name == name) {
            if !spec.kind.accepts(value) {
                return Err(ResourceError::InvalidQuery {
                    name: spec.name,
                    value: value.clone(),
                    expected: spec.kind.describe(),
                });
            }
        }
    }
    Ok(())
}

fn coerce_integer(value: &str) -> Option<u64> {
    value.trim().parse().ok()
}

fn coerce_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// First value of `name`; repeated parameters beyond the first are ignored.
fn lookup<'a>(query: &'a QueryPairs, name: &str) -> Option<&'a str> {
    query
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

fn integer(query: &QueryPairs, name: &str) -> Option<u64> {
    lookup(query, name).and_then(coerce_integer)
}

fn boolean(query: &QueryPairs, name: &str) -> Option<bool> {
    lookup(query, name).and_then(coerce_bool)
}

/// Split a comma-separated field list, dropping blank entries.
fn field_list(value: &str) -> Option<Vec<String>> {
    let fields: Vec<String> = value
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect();
    (!fields.is_empty()).then_some(fields)
}

/// Ordered multi-field sort, parsed from `field[|asc|desc],...`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortSpec(Vec<SortField>);

impl SortSpec {
    /// Parse a sort expression. Terms without a direction sort ascending;
    /// returns `None` when no term names a field.
    pub fn parse(value: &str) -> Option<Self> {
        let terms: Vec<SortField> = value
            .split(',')
            .filter_map(|term| {
                let mut tokens = term.split('|').map(str::trim);
                let field = tokens.next().filter(|f| !f.is_empty())?;
                let descending = tokens
                    .next()
                    .is_some_and(|dir| dir.eq_ignore_ascii_case("desc"));
                Some(SortField {
                    field: field.to_string(),
                    descending,
                })
            })
            .collect();
        (!terms.is_empty()).then_some(Self(terms))
    }

    pub fn terms(&self) -> &[SortField] {
        &self.0
    }

    pub fn to_fields(&self) -> Vec<SortField> {
        self.0.clone()
    }
}

/// Resolved parameters of a list request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParameters {
    pub limit: u64,
    pub offset: u64,
    pub data_fields: Option<Vec<String>>,
    pub sort: Option<SortSpec>,
    /// Storage timeout hint in milliseconds.
    pub timeout: Option<u64>,
    pub versioned: bool,
    pub raw_mode: bool,
    pub include_actions: bool,
    pub include_links: bool,
    pub data_only: bool,
}

impl Default for ListParameters {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
            data_fields: None,
            sort: None,
            timeout: None,
            versioned: false,
            raw_mode: false,
            include_actions: true,
            include_links: true,
            data_only: false,
        }
    }
}

impl ListParameters {
    /// Defaults with a different page size.
    pub fn with_default_limit(limit: u64) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// Overlay the request's values on `defaults`. Neither input is modified.
    pub fn resolve(defaults: &ListParameters, query: &QueryPairs, ctx: &RequestContext) -> Self {
        let params = Self {
            limit: integer(query, "limit").unwrap_or(defaults.limit),
            offset: integer(query, "offset").unwrap_or(defaults.offset),
            data_fields: lookup(query, "dataFields")
                .and_then(field_list)
                .or_else(|| defaults.data_fields.clone()),
            sort: lookup(query, "sort")
                .and_then(SortSpec::parse)
                .or_else(|| defaults.sort.clone()),
            timeout: integer(query, "timeout").or(defaults.timeout),
            versioned: boolean(query, "version").unwrap_or(defaults.versioned),
            raw_mode: boolean(query, "raw").unwrap_or(defaults.raw_mode),
            include_actions: boolean(query, "actions").unwrap_or(defaults.include_actions),
            include_links: boolean(query, "links").unwrap_or(defaults.include_links),
            data_only: boolean(query, "dataOnly").unwrap_or(defaults.data_only),
        };
        tracing::debug!(request_id = %ctx.request_id, query = ?query, params = ?params, "list parameters resolved");
        params
    }

    pub fn wants_actions(&self) -> bool {
        self.include_actions && !self.data_only
    }

    pub fn wants_links(&self) -> bool {
        self.include_links && !self.data_only
    }

    pub fn projection(&self) -> Projection {
        Projection::new(self.raw_mode, self.versioned, self.data_fields.is_some())
    }
}

/// Resolved parameters of a single-entity request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityParameters {
    pub timeout: Option<u64>,
    pub versioned: bool,
    pub raw_mode: bool,
    pub include_actions: bool,
    pub include_links: bool,
    pub data_only: bool,
}

impl Default for EntityParameters {
    fn default() -> Self {
        Self {
            timeout: None,
            versioned: false,
            raw_mode: false,
            include_actions: true,
            include_links: true,
            data_only: false,
        }
    }
}

impl EntityParameters {
    /// Overlay the request's values on the defaults. Only parameters listed
    /// in `specs` are read.
    pub fn resolve(specs: &[ParamSpec], query: &QueryPairs, ctx: &RequestContext) -> Self {
        let recognized = |name: &str| specs.iter().any(|s| s.name == name);
        let flag = |name: &str, default: bool| {
            if recognized(name) {
                boolean(query, name).unwrap_or(default)
            } else {
                default
            }
        };
        let defaults = Self::default();

        let params = Self {
            timeout: if recognized("timeout") {
                integer(query, "timeout")
            } else {
                None
            },
            versioned: flag("version", defaults.versioned),
            raw_mode: flag("raw", defaults.raw_mode),
            include_actions: flag("actions", defaults.include_actions),
            include_links: flag("links", defaults.include_links),
            data_only: flag("dataOnly", defaults.data_only),
        };
        tracing::debug!(request_id = %ctx.request_id, query = ?query, params = ?params, "entity parameters resolved");
        params
    }

    pub fn wants_actions(&self) -> bool {
        self.include_actions && !self.data_only
    }

    pub fn wants_links(&self) -> bool {
        self.include_links && !self.data_only
    }

    pub fn projection(&self) -> Projection {
        Projection::new(self.raw_mode, self.versioned, false)
    }
}
