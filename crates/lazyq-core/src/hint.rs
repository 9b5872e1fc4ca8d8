//! Length-hint arithmetic. `None` means "unknown, iterate to find out".

/// Sum of all parts, unknown as soon as one part is.
pub fn sum_hints<I>(hints: I) -> Option<usize>
where
    I: IntoIterator<Item = Option<usize>>,
{
    hints.into_iter().sum()
}

/// The shorter of two sides, unknown unless both are known.
pub fn min_hints(left: Option<usize>, right: Option<usize>) -> Option<usize> {
    Some(left?.min(right?))
}

/// Length of a `(offset, limit)` window over a source of length `source`.
pub fn window_hint(source: Option<usize>, offset: usize, limit: Option<usize>) -> Option<usize> {
    let rest = source?.saturating_sub(offset);
    Some(limit.map_or(rest, |l| rest.min(l)))
}
