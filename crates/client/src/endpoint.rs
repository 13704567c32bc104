//! Endpoint URL resolution.
//!
//! Endpoints are resolved relative to the page URL, the way a browser resolves
//! a relative link. All query parameters of the page are carried over so that
//! access parameters in the page URL travel with every request.

use reqwest::Url;

use crate::Error;

/// Path of the draft endpoint, relative to the page URL.
pub const DRAFT_PATH: &str = "journal/draft";

/// Path of the attachment endpoint, relative to the page URL.
pub const ATTACHMENT_PATH: &str = "journal/attachment";

/// Query parameter carrying the content address of an uploaded chunk.
pub const HASH_PARAM: &str = "att_hash";

/// Resolve `path` against `page` and copy the page's query parameters.
///
/// Each page parameter is copied once (first value wins). Parameters in
/// `overrides` replace page parameters of the same name.
pub fn resolve(page: &Url, path: &str, overrides: &[(&str, &str)]) -> Result<Url, Error> {
    let mut url = page
        .join(path)
        .map_err(|e| Error::Configuration(format!("cannot resolve {path:?}: {e}")))?;
    url.set_query(None);
    url.set_fragment(None);

    let mut seen: Vec<String> = Vec::new();
    {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in page.query_pairs() {
            if seen.iter().any(|k| *k == key) || overrides.iter().any(|(k, _)| *k == key) {
                continue;
            }
            pairs.append_pair(&key, &value);
            seen.push(key.into_owned());
        }
        for (key, value) in overrides {
            pairs.append_pair(key, value);
        }
    }
    if url.query() == Some("") {
        url.set_query(None);
    }

    Ok(url)
}
