//! Page-token pagination over list endpoints.
//!
//! The service pages every list response with a `nextPageToken` field; the
//! driver here fetches a page, hands it to the visitor, and follows tokens
//! until the field is absent. Pure over a fetch closure so it tests without
//! HTTP.

use serde_json::Value;

/// Fetch every page and hand each to `visit`. `fetch` receives the page
/// token to request (`None` for the first page). Returns the number of
/// pages visited.
pub fn paginate<F, V, E>(mut fetch: F, mut visit: V) -> Result<u32, E>
where
    F: FnMut(Option<&str>) -> Result<Value, E>,
    V: FnMut(&Value) -> Result<(), E>,
{
    let mut token: Option<String> = None;
    let mut pages = 0u32;
    loop {
        let page = fetch(token.as_deref())?;
        pages += 1;
        visit(&page)?;
        match next_page_token(&page) {
            Some(next) => token = Some(next),
            None => return Ok(pages),
        }
    }
}

/// The `nextPageToken` of a page, if it names one more page.
pub fn next_page_token(page: &Value) -> Option<String> {
    page.get("nextPageToken")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// The named item array of a page (e.g. `rasters`, `layers`, `assets`);
/// empty when the key is absent.
pub fn items<'a>(page: &'a Value, key: &str) -> &'a [Value] {
    page.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}
