// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use serde_json::json;
use wiremock::MockServer;

use super::testlib::{mount_json, new_test_client};
use crate::fetch_switch_view;
use crate::switch::unwrap_dpid_key;

fn gen_reply(keys: &[&str]) -> BTreeMap<String, u32> {
    keys.iter()
        .enumerate()
        .map(|(i, k)| (k.to_string(), i as u32))
        .collect()
}

#[test]
fn test_unwrap_dpid_key_decimal() {
    assert_eq!(unwrap_dpid_key(1, gen_reply(&["2", "1"])), Some(1));
    assert_eq!(unwrap_dpid_key(3, gen_reply(&["1", "2"])), None);
}

#[test]
fn test_unwrap_dpid_key_sixteen_decimal_digits() {
    let id = 1000000000000001;
    assert_eq!(
        unwrap_dpid_key(id, gen_reply(&["1000000000000001"])),
        Some(0)
    );
}

#[test]
fn test_unwrap_dpid_key_ignore_hex_form() {
    // 0x10 is 16, but stats keys are decimal
    assert_eq!(unwrap_dpid_key(16, gen_reply(&["0000000000000010"])), None);
}

#[tokio::test]
async fn test_fetch_switch_view_long_dpid() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "GET",
        "/stats/flow/1000000000000001",
        json!({"1000000000000001": [{"priority": 1, "match": {}}]}),
    )
    .await;
    mount_json(
        &server,
        "GET",
        "/stats/desc/1000000000000001",
        json!({"1000000000000001": {"dp_desc": "core"}}),
    )
    .await;
    mount_json(
        &server,
        "GET",
        "/stats/aggregateflow/1000000000000001",
        json!({"1000000000000001": [{"flow_count": 1}]}),
    )
    .await;
    let client = new_test_client(&server);

    let view = fetch_switch_view(&client, 1000000000000001).await.unwrap();

    assert_eq!(view.flow_table.len(), 1);
    assert_eq!(view.desc.map(|d| d.dp_desc), Some("core".to_string()));
    assert_eq!(view.aggregate_flow.map(|a| a.flow_count), Some(1));
}
