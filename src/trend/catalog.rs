use serde::Serialize;

use crate::models::SessionDetail;

use super::normalize::CanonicalName;
use super::matching::match_canonical;

/// Raw names across the corpus that resolve to the same measurement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestNameGroup {
    /// First spelling seen; used as the group's representative.
    pub display_name: String,
    /// Every distinct spelling in the group, in first-seen order.
    pub variants: Vec<String>,
    /// Number of observations carrying any of the variants.
    pub occurrences: usize,
}

/// Groups every test name in the corpus by equivalence to each group's
/// representative, in first-seen order.
///
/// Equivalence is not transitive (containment chains), so a name is compared
/// against representatives only; this keeps grouping order-dependent but
/// deterministic for a given corpus.
pub fn catalog_test_names(sessions: &[SessionDetail]) -> Vec<TestNameGroup> {
    let mut groups: Vec<(CanonicalName, TestNameGroup)> = Vec::new();

    let names = sessions
        .iter()
        .filter_map(|s| s.observations.as_deref())
        .flatten()
        .filter_map(|o| o.test_name.as_deref());

    for name in names {
        let canonical = CanonicalName::of(name);
        match groups
            .iter_mut()
            .find(|(representative, _)| match_canonical(&canonical, representative).is_some())
        {
            Some((_, group)) => {
                group.occurrences += 1;
                if !group.variants.iter().any(|v| v == name) {
                    group.variants.push(name.to_string());
                }
            }
            None => groups.push((
                canonical,
                TestNameGroup {
                    display_name: name.to_string(),
                    variants: vec![name.to_string()],
                    occurrences: 1,
                },
            )),
        }
    }

    tracing::debug!(groups = groups.len(), "Catalogued test names");
    groups.into_iter().map(|(_, group)| group).collect()
}
