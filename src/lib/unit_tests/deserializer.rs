// SPDX-License-Identifier: Apache-2.0

use crate::{AggregateFlowStats, FlowEntry, LinkEndpoint};

#[test]
fn test_integer_as_number_or_string() {
    let stats: AggregateFlowStats = serde_json::from_str(
        r#"{"packet_count": "10", "byte_count": 800, "flow_count": "0x1"}"#,
    )
    .unwrap();

    assert_eq!(stats.packet_count, 10);
    assert_eq!(stats.byte_count, 800);
    assert_eq!(stats.flow_count, 1);
}

#[test]
fn test_optional_integer_absent_or_null() {
    let entry: FlowEntry = serde_json::from_str(
        r#"{"priority": null, "table_id": "3", "match": {}}"#,
    )
    .unwrap();

    assert_eq!(entry.priority, None);
    assert_eq!(entry.table_id, Some(3));
    assert_eq!(entry.idle_timeout, None);
}

#[test]
fn test_integer_overflow_is_rejected() {
    let result = serde_json::from_str::<FlowEntry>(r#"{"priority": 70000}"#);

    assert!(result.is_err());
}

#[test]
fn test_negative_integer_is_rejected() {
    let result = serde_json::from_str::<FlowEntry>(r#"{"priority": -1}"#);

    assert!(result.is_err());
}

#[test]
fn test_dpid_as_number() {
    let endpoint: LinkEndpoint =
        serde_json::from_str(r#"{"dpid": 1, "port_no": 2}"#).unwrap();

    assert_eq!(endpoint.dpid, "1");
    assert_eq!(endpoint.port_no, "2");
    assert_eq!(endpoint.name, "");
}

#[test]
fn test_integer_from_yaml_string() {
    let entry: FlowEntry = serde_yaml::from_str(
        r#"---
priority: "100"
idle_timeout: 30
match:
  in_port: "1"
  dl_type: "0x0800"
"#,
    )
    .unwrap();

    assert_eq!(entry.priority, Some(100));
    assert_eq!(entry.idle_timeout, Some(30));
    let flow_match = entry.flow_match.unwrap();
    assert_eq!(flow_match.in_port, Some(1));
    assert_eq!(flow_match.dl_type, Some(0x0800));
}
