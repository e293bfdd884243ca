//! Finding aggregation

use crate::phi::models::FindingsMap;

/// Merge scanner outputs into one deduplicated findings map
///
/// Every category present in any input is present in the output, with the
/// union of its substrings. Merge order does not affect the result.
pub fn aggregate<I>(results: I) -> FindingsMap
where
    I: IntoIterator<Item = FindingsMap>,
{
    results
        .into_iter()
        .fold(FindingsMap::new(), |mut merged, findings| {
            merged.merge(findings);
            merged
        })
}
