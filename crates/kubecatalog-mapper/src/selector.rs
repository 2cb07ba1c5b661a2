use std::collections::BTreeMap;

use kubecatalog_types::PodRecord;

use crate::set::OrderedStringSet;

/// Whether a label set satisfies every key/value pair of a selector
///
/// An empty selector matches everything.
pub fn matches_selector(
    selector: &BTreeMap<String, String>,
    labels: &BTreeMap<String, String>,
) -> bool {
    selector
        .iter()
        .all(|(key, value)| labels.get(key) == Some(value))
}

/// Pods selected by a workload's `matchLabels`
///
/// Matching looks at labels only. Pods in other namespaces carrying the same
/// labels are selected too, so a workload in `a` picks up pods from `b`.
pub fn matching_pods<'a>(
    selector: &'a BTreeMap<String, String>,
    pods: &'a [PodRecord],
) -> impl Iterator<Item = &'a PodRecord> {
    pods.iter()
        .filter(move |pod| matches_selector(selector, &pod.labels))
}

/// Distinct node names the selected pods are scheduled on
///
/// Unscheduled pods contribute the empty string; callers drop it before
/// resolving names against the node list.
pub fn node_names_for_selector(
    selector: &BTreeMap<String, String>,
    pods: &[PodRecord],
) -> OrderedStringSet {
    matching_pods(selector, pods)
        .map(|pod| pod.node_name.as_str())
        .collect()
}
