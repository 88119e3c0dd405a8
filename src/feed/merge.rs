use super::parser::Entry;

/// Concatenates entries from every source and orders them newest first.
///
/// Sources are appended in the order given; the sort is stable, so entries
/// sharing a timestamp keep that order. Nothing is deduplicated.
pub fn merge<I>(sources: I) -> Vec<Entry>
where
    I: IntoIterator<Item = Vec<Entry>>,
{
    let mut entries: Vec<Entry> = sources.into_iter().flatten().collect();
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    entries
}
