//! Link header parsing for paginated GitHub listings.

use regex::Regex;

/// Extracts the page number of the `rel="last"` target from a `Link` header.
///
/// GitHub sends pagination metadata like:
///
/// ```text
/// <https://api.github.com/repositories/3060/contributors?page=2>; rel="next",
/// <https://api.github.com/repositories/3060/contributors?page=6>; rel="last"
/// ```
///
/// Returns `None` when the header carries no `rel="last"` entry or the target
/// URL has no parseable `page` parameter.
pub fn last_page(link_header: &str) -> Option<u32> {
    let re = Regex::new(r#"<([^>]+)>\s*;\s*rel="last""#).ok()?;
    let target = re.captures(link_header)?.get(1)?.as_str();
    page_parameter(target)
}

/// Pulls the `page` query parameter out of a pagination target URL.
fn page_parameter(url: &str) -> Option<u32> {
    let (_, query) = url.split_once('?')?;
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix("page="))
        .and_then(|value| value.parse().ok())
}
