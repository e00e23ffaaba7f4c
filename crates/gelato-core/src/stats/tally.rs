//! Insertion-ordered counting helpers.

use indexmap::IndexMap;
use serde::Serialize;

/// A name paired with how often it occurred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ranked {
    pub name: String,
    pub count: usize,
}

impl Ranked {
    pub fn new(name: impl Into<String>, count: usize) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

/// Count keys, remembering the order in which each was first seen.
pub fn tally<I>(keys: I) -> IndexMap<String, usize>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    let mut counts = IndexMap::new();
    for key in keys {
        *counts.entry(key.into()).or_insert(0) += 1;
    }
    counts
}

/// Highest count; ties go to the key seen first.
pub fn leader(counts: &IndexMap<String, usize>) -> Option<Ranked> {
    let mut best: Option<(&String, usize)> = None;
    for (name, &count) in counts {
        match best {
            Some((_, top)) if count <= top => {}
            _ => best = Some((name, count)),
        }
    }
    best.map(|(name, count)| Ranked::new(name.clone(), count))
}

/// All keys by descending count; ties keep first-seen order.
pub fn ranking(counts: &IndexMap<String, usize>) -> Vec<Ranked> {
    let mut ranked = counts
        .iter()
        .map(|(name, &count)| Ranked::new(name.clone(), count))
        .collect::<Vec<_>>();
    // `sort_by` is stable, which preserves first-seen order among ties.
    ranked.sort_by(|left, right| right.count.cmp(&left.count));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn leader_breaks_ties_by_first_seen() {
        let counts = tally(["b", "a", "a", "b", "c"]);
        assert_eq!(leader(&counts), Some(Ranked::new("b", 2)));
        assert_eq!(leader(&IndexMap::new()), None);
    }

    #[test]
    fn ranking_is_stable_for_ties() {
        let counts = tally(["mint", "choc", "lemon", "choc", "lemon", "fig"]);
        let names = ranking(&counts)
            .into_iter()
            .map(|ranked| ranked.name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["choc", "lemon", "mint", "fig"]);
    }
}
