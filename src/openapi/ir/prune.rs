//! Reachability pruning of the model graph.

use std::collections::BTreeSet;

use tracing::info;

use super::api::Endpoint;
use super::model::{ModelGraph, TypeToken};

/// Keep only the models reachable from `endpoints`.
///
/// Seeds are each endpoint's response, request and parameter types; the
/// closure follows composed children, field types and alias types.
pub fn prune(graph: &ModelGraph, endpoints: &[Endpoint]) -> ModelGraph {
    let mut worklist: Vec<String> = Vec::new();
    for endpoint in endpoints {
        worklist.extend(endpoint.response.iter().filter_map(seed));
        worklist.extend(
            endpoint
                .request
                .iter()
                .filter_map(|payload| seed(&payload.ty)),
        );
        worklist.extend(endpoint.params().filter_map(|param| seed(&param.ty)));
    }

    let mut reachable: BTreeSet<String> = BTreeSet::new();
    while let Some(name) = worklist.pop() {
        let Some(model) = graph.get(&name) else {
            continue;
        };
        if !reachable.insert(name) {
            continue;
        }
        // Enum children are literals, not model names.
        if !model.is_enum {
            worklist.extend(model.children.iter().cloned());
        }
        worklist.extend(model.fields.values().filter_map(|field| seed(&field.ty)));
        worklist.extend(model.alias.iter().filter_map(seed));
    }

    let pruned: ModelGraph = graph
        .iter()
        .filter(|model| reachable.contains(&model.name))
        .cloned()
        .collect();
    info!(kept = pruned.len(), total = graph.len(), "Pruned model graph.");
    pruned
}

fn seed(token: &TypeToken) -> Option<String> {
    token.named().map(str::to_string)
}
