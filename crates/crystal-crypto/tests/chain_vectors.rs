//! # Event Chain Vectors
//!
//! Pins the node hash layout: a chain built here must hash exactly like a
//! chain built by any other conforming implementation.

use std::sync::Arc;

use crystal_core::{hash_str, EventType, FixedClock, TraceRecord};
use crystal_crypto::{compute_root, verify_links, ChainBuilder, EMPTY_TREE};

const EPOCH_MS: u64 = 1_704_499_200_000;

#[test]
fn first_node_hash_is_pinned() {
    let mut chain = ChainBuilder::new(Arc::new(FixedClock::new(EPOCH_MS)));
    let record = TraceRecord::from(EventType::DispatchReceived);
    let node = chain.append(&record.event_type, &record).expect("append");

    assert_eq!(node.index, 0);
    assert_eq!(node.timestamp, EPOCH_MS);
    assert_eq!(node.data, r#"{"event_type":"DISPATCH_RECEIVED"}"#);
    assert_eq!(node.parent_hash, None);
    assert_eq!(
        node.hash,
        "c34b1020e35ade543685254267d80cd679a44b0da99d8d9d7109c08c9e955b08"
    );
    assert_eq!(chain.compute_root(), hash_str(&node.hash));
}

#[test]
fn root_of_empty_chain_is_sentinel() {
    assert_eq!(compute_root(&[]), hash_str(EMPTY_TREE));
}

#[test]
fn stored_chain_round_trips_through_json() {
    let mut chain = ChainBuilder::new(Arc::new(FixedClock::new(EPOCH_MS)));
    for event in [
        EventType::DispatchReceived,
        EventType::ValidationOk,
        EventType::DispatchComplete,
    ] {
        chain
            .append(event.as_str(), &TraceRecord::from(event))
            .expect("append");
    }
    let json = serde_json::to_string(chain.nodes()).expect("serialize");
    let nodes: Vec<crystal_crypto::EventNode> = serde_json::from_str(&json).expect("deserialize");

    assert!(verify_links(&nodes).is_empty());
    assert_eq!(compute_root(&nodes), chain.compute_root());
    assert!(json.contains("\"parentHash\":null"));
    assert!(json.contains("\"eventType\":\"VALIDATION_OK\""));
}
