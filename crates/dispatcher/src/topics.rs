//! Topic list parsing

/// Split a rendered topic list into topic names
///
/// One topic per line; entries are trimmed and blank lines skipped. Order
/// and duplicates are preserved.
pub fn split_topics(rendered: &str) -> impl Iterator<Item = &str> {
    rendered
        .split('\n')
        .map(str::trim)
        .filter(|topic| !topic.is_empty())
}
