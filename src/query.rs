use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Everything except the characters `encodeURIComponent` leaves alone.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Query string for `GET /jobs`: `?query=<encoded>` or empty when there is
/// nothing to search for.
pub fn build_query(search: &str) -> String {
    if search.is_empty() {
        return String::new();
    }
    format!("?query={}", utf8_percent_encode(search, QUERY_VALUE))
}
