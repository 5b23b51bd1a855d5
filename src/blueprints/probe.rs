//! Ordered probing: "try A, then B, then C"

/// Run `probe` over `candidates` in order and return the first hit.
///
/// Misses (`Ok(None)`) move on to the next candidate; errors stop the probe.
pub fn first_hit<I, T, E, F>(candidates: I, mut probe: F) -> Result<Option<T>, E>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Result<Option<T>, E>,
{
    for candidate in candidates {
        if let Some(hit) = probe(candidate)? {
            return Ok(Some(hit));
        }
    }
    Ok(None)
}
