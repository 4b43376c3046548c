#![no_main]

use haversack_core::graph::{ContainmentGraph, ancestors, total_contained};
use haversack_core::rules::{MalformedPolicy, parse_with};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Strict parsing may reject the input but must never panic.
    let _ = parse_with(text, MalformedPolicy::Fail);

    let Ok(outcome) = parse_with(text, MalformedPolicy::Skip) else {
        return;
    };
    let graph = ContainmentGraph::build(outcome.groups);

    // Cycles and overflow surface as errors; nothing may panic or hang.
    for node in graph.nodes() {
        let reach = ancestors(&graph, node);
        assert!(!reach.contains(node));
        let _ = total_contained(&graph, node);
    }
});
