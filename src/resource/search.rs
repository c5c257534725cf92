//! Search Translator: resolved list parameters to storage search options.

use crate::http::request::RequestContext;
use crate::store::SearchOptions;

use super::params::ListParameters;

/// Build the storage search for a list request. Pure apart from a debug record.
pub fn to_search_options(params: &ListParameters, ctx: &RequestContext) -> SearchOptions {
    let options = SearchOptions {
        page_size: params.limit,
        from: params.offset,
        return_fields: params.data_fields.clone(),
        timeout: params.timeout,
        versioned: params.versioned,
        multi_field_sort: params.sort.as_ref().map(|s| s.to_fields()),
    };
    tracing::debug!(request_id = %ctx.request_id, options = ?options, "search options built");
    options
}
