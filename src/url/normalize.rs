use crate::UrlError;
use url::Url;

/// Tracking query parameters removed during normalization
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid", "msclkid"];

/// Normalizes a URL so that trivially different spellings share one dedup key
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Require an HTTP or HTTPS scheme and a host
/// 3. Lowercase the host (the `url` crate already does this for special schemes)
/// 4. Remove the fragment
/// 5. Remove tracking query parameters (`utm_*`, `fbclid`, ...)
/// 6. Sort remaining query parameters by key
/// 7. Remove an empty query string
///
/// Paths are left as the server spelled them; dot segments are already resolved
/// by the parser.
///
/// # Examples
///
/// ```
/// use depthwalk::url::normalize_url;
///
/// let url = normalize_url("https://Example.COM/page?b=2&a=1#top").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/page?a=1&b=2");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    normalize_parsed(url)
}

/// Normalizes an already-parsed URL
///
/// Used by the page parser after resolving a link against its base URL.
pub fn normalize_parsed(mut url: Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => {}
        _ => return Err(UrlError::MissingHost),
    }

    url.set_fragment(None);

    let rewritten = url.query().and_then(|query| {
        let segments = filter_and_sort_query_segments(query);
        (segments.is_empty() || segments != query).then_some(segments)
    });

    match rewritten {
        Some(segments) if segments.is_empty() => url.set_query(None),
        Some(segments) => url.set_query(Some(&segments)),
        None => {}
    }

    Ok(url)
}

/// Filters out tracking parameters and sorts the remaining query segments
///
/// Segments are kept exactly as written (percent-encoding, valueless keys,
/// segments without `=`) and only reordered or dropped, so the result still
/// names the resource that was linked.
fn filter_and_sort_query_segments(query: &str) -> String {
    let mut segments: Vec<&str> = query
        .split('&')
        .filter(|segment| !segment.is_empty())
        .filter(|segment| !is_tracking_param(segment_key(segment)))
        .collect();

    // Stable sort keeps repeated keys in their original order
    segments.sort_by(|a, b| segment_key(a).cmp(segment_key(b)));

    segments.join("&")
}

/// Raw key of a `key=value` query segment
fn segment_key(segment: &str) -> &str {
    segment.split_once('=').map_or(segment, |(key, _)| key)
}

/// Checks if a query parameter is a tracking parameter
fn is_tracking_param(key: &str) -> bool {
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key)
}
