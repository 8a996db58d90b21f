#![allow(dead_code)]

use proptest::prelude::*;

/// Hyphenated lowercase UUID-shaped strings
pub fn uuid_strategy() -> impl Strategy<Value = String> {
    "[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}"
}

/// Colon-delimited prefixes such as `urn:uuid` or `did:ledger:node`
pub fn identifier_prefix_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z]{1,8}", 1..4).prop_map(|parts| parts.join(":"))
}

/// Canonical node identifiers ending in a hyphenated UUID
pub fn node_identifier_strategy() -> impl Strategy<Value = (String, String)> {
    (identifier_prefix_strategy(), uuid_strategy())
        .prop_map(|(prefix, uuid)| (format!("{prefix}:{uuid}"), uuid))
}

/// Raw counter values as nodes write them, including junk
pub fn raw_counter_strategy() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        (0i64..10_000).prop_map(|n| Some(n.to_string())),
        Just(Some("not-a-number".to_string())),
    ]
}
