//! # Hypermedia Synthesizer
//!
//! Computes the `actions` and `links` of a response. Actions describe the
//! operations a client may invoke next; they advertise the auth schemes the
//! collection is configured with and enforce nothing.
//!
//! Page links are derived from the search counts alone:
//!
//! ```text
//! firstPage  total > 0                          offset = 0
//! lastPage   total > limit                      offset = max(total - limit, offset + limit)
//! nextPage   count < total && offset+limit < total   offset = offset + limit
//! prevPage   offset > 0 && offset - limit > 0   offset = offset - limit
//! ```
//!
//! Every href keeps the request's other query parameters in their original
//! order and only overrides `offset`.

use std::collections::BTreeSet;

use serde::Serialize;
use url::form_urlencoded;

use super::envelope::SearchResultMeta;
use super::params::QueryPairs;

/// Collection path.
pub const COLLECTION_PATH: &str = "/v1/resources/objectschemas";

/// Count sub-resource path.
pub const COUNT_PATH: &str = "/v1/resources/objectschemas/count";

/// Path of one entity.
pub fn entity_path(id: &str) -> String {
    format!("{}/{}", COLLECTION_PATH, id)
}

/// Path that replaces one entity at a known version.
pub fn replace_path(id: &str, version: u64) -> String {
    format!("{}/{}/{}", COLLECTION_PATH, id, version)
}

/// An operation the client may invoke next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub name: String,
    pub title: String,
    pub http_method: String,
    pub required_auth_schemes: BTreeSet<String>,
    pub href: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Relation {
    #[serde(rename = "self")]
    SelfLink,
    FirstPage,
    LastPage,
    NextPage,
    PrevPage,
}

impl Relation {
    fn title(self) -> &'static str {
        match self {
            Relation::SelfLink => "Self",
            Relation::FirstPage => "First page",
            Relation::LastPage => "Last page",
            Relation::NextPage => "Next page",
            Relation::PrevPage => "Previous page",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub relation: Relation,
    pub href: String,
    pub title: String,
    pub required_auth_schemes: BTreeSet<String>,
}

/// Offsets of the page links that apply; `None` means the link is omitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageOffsets {
    pub first: Option<u64>,
    pub last: Option<u64>,
    pub next: Option<u64>,
    pub prev: Option<u64>,
}

/// Page link arithmetic.
pub fn page_offsets(page: &SearchResultMeta) -> PageOffsets {
    let SearchResultMeta {
        limit,
        offset,
        total,
        count,
    } = *page;
    let following = offset.saturating_add(limit);

    PageOffsets {
        first: (total > 0).then_some(0),
        last: (total > limit).then(|| (total - limit).max(following)),
        next: (count < total && following < total).then_some(following),
        prev: (offset > 0 && offset > limit).then(|| offset - limit),
    }
}

fn encode(query: &QueryPairs) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(query.iter())
        .finish()
}

fn href(path: &str, query: &QueryPairs) -> String {
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, encode(query))
    }
}

/// The query with `offset` set to `offset`. An existing `offset` keeps its
/// position; later duplicates are dropped.
pub fn with_offset(query: &QueryPairs, offset: u64) -> QueryPairs {
    let value = offset.to_string();
    let mut replaced = false;
    let mut pairs: QueryPairs = query
        .iter()
        .filter_map(|(k, v)| {
            if k != "offset" {
                return Some((k.clone(), v.clone()));
            }
            if replaced {
                return None;
            }
            replaced = true;
            Some((k.clone(), value.clone()))
        })
        .collect();
    if !replaced {
        pairs.push(("offset".to_string(), value));
    }
    pairs
}

/// Builds actions and links for the collection.
#[derive(Debug, Clone)]
pub struct Hypermedia {
    auth_schemes: BTreeSet<String>,
}

impl Hypermedia {
    pub fn new<I, T>(auth_schemes: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            auth_schemes: auth_schemes.into_iter().map(Into::into).collect(),
        }
    }

    fn action(&self, name: &str, title: &str, method: &str, href: String) -> Action {
        Action {
            name: name.to_string(),
            title: title.to_string(),
            http_method: method.to_string(),
            required_auth_schemes: self.auth_schemes.clone(),
            href,
        }
    }

    fn link(&self, relation: Relation, href: String) -> Link {
        Link {
            relation,
            href,
            title: relation.title().to_string(),
            required_auth_schemes: self.auth_schemes.clone(),
        }
    }

    /// `create` and `count`.
    pub fn collection_actions(&self) -> Vec<Action> {
        vec![
            self.action("create", "Create ObjectSchema", "POST", COLLECTION_PATH.to_string()),
            self.action("count", "Count ObjectSchemas", "GET", COUNT_PATH.to_string()),
        ]
    }

    /// `delete` and `replace` of one entity.
    pub fn entity_actions(&self, id: &str, version: u64) -> Vec<Action> {
        vec![
            self.action("delete", "Delete ObjectSchema", "DELETE", entity_path(id)),
            self.action("replace", "Replace ObjectSchema", "PUT", replace_path(id, version)),
        ]
    }

    pub fn entity_links(&self, id: &str) -> Vec<Link> {
        vec![self.link(Relation::SelfLink, entity_path(id))]
    }

    /// `self` of the bare collection.
    pub fn collection_links(&self) -> Vec<Link> {
        vec![self.link(Relation::SelfLink, COLLECTION_PATH.to_string())]
    }

    pub fn count_links(&self, query: &QueryPairs) -> Vec<Link> {
        vec![self.link(Relation::SelfLink, href(COUNT_PATH, query))]
    }

    /// `self` plus whichever page links apply.
    pub fn page_links(&self, query: &QueryPairs, page: &SearchResultMeta) -> Vec<Link> {
        let offsets = page_offsets(page);
        let mut links = vec![self.link(Relation::SelfLink, href(COLLECTION_PATH, query))];

        let pages = [
            (Relation::FirstPage, offsets.first),
            (Relation::LastPage, offsets.last),
            (Relation::NextPage, offsets.next),
            (Relation::PrevPage, offsets.prev),
        ];
        for (relation, offset) in pages {
            if let Some(offset) = offset {
                links.push(self.link(relation, href(COLLECTION_PATH, &with_offset(query, offset))));
            }
        }
        links
    }
}
