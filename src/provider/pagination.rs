//! # Pagination
//!
//! Drains a token-paginated upstream listing into a single ordered sequence.
//! A listing is only complete once the upstream stops returning a continuation
//! token; returning after the first page would silently truncate results.

use super::ProviderError;
use std::future::Future;

/// One page of an upstream listing
#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_token: Option<String>,
}

/// Call `fetch` with the previous page's continuation token until none is returned.
///
/// Items keep upstream order across pages. An empty token is treated as the end
/// of the listing (some AWS-compatible endpoints return `""` instead of omitting it).
pub async fn drain_pages<T, F, Fut>(mut fetch: F) -> Result<Vec<T>, ProviderError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, ProviderError>>,
{
    let mut items = Vec::new();
    let mut token = None;

    loop {
        let page = fetch(token.take()).await?;
        items.extend(page.items);

        match page.next_token.filter(|t| !t.is_empty()) {
            Some(next) => token = Some(next),
            None => return Ok(items),
        }
    }
}
