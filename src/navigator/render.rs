//! Neighborhood rendering.
//!
//! The neighborhood of a concept is every triple with that concept as
//! subject, grouped by predicate. Predicates and the objects under each are
//! ordered case-insensitively, with the case-sensitive text breaking ties, so
//! the listing is stable even when two terms differ only in case.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::graph::{Term, Triple};
use crate::term_index::TermIndex;

/// Case-insensitive order with a case-sensitive tie-break.
pub fn term_order(a: &str, b: &str) -> Ordering {
    a.to_uppercase()
        .cmp(&b.to_uppercase())
        .then_with(|| a.cmp(b))
}

/// Objects grouped under their predicate, both levels sorted by [`term_order`].
pub fn group_by_predicate<'t, I>(triples: I) -> Vec<(Term, Vec<Term>)>
where
    I: IntoIterator<Item = &'t Triple>,
{
    let mut groups: HashMap<&str, Vec<Term>> = HashMap::new();
    for triple in triples {
        groups
            .entry(triple.predicate.as_str())
            .or_default()
            .push(triple.object.clone());
    }

    let mut grouped: Vec<(Term, Vec<Term>)> = groups
        .into_iter()
        .map(|(predicate, mut objects)| {
            objects.sort_by(|a, b| term_order(a, b));
            (predicate.to_string(), objects)
        })
        .collect();
    grouped.sort_by(|(a, _), (b, _)| term_order(a, b));
    grouped
}

/// Lines showing `concept` and its grouped neighborhood.
///
/// Numbers are taken from (and allocated in) `terms` in display order:
/// each predicate, then its objects.
pub fn neighborhood_lines(concept: &str, groups: &[(Term, Vec<Term>)], terms: &TermIndex) -> Vec<String> {
    let mut lines = vec![concept.to_string()];
    for (predicate, objects) in groups {
        lines.push(format!("  {predicate} {}:", terms.number_of(predicate)));
        for object in objects {
            lines.push(format!("      {object} {}", terms.number_of(object)));
        }
    }
    lines
}
