// SPDX-License-Identifier: Apache-2.0

use serde_json::Value;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

use crate::{
    Host, Link, LinkEndpoint, SouthboundClient, SouthboundConfig,
    TopologySnapshot,
};

pub(crate) fn new_test_client(server: &MockServer) -> SouthboundClient {
    SouthboundClient::new(&SouthboundConfig::new(&server.uri())).unwrap()
}

pub(crate) async fn mount_json(
    server: &MockServer,
    http_method: &str,
    url_path: &str,
    body: Value,
) {
    Mock::given(method(http_method))
        .and(path(url_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

pub(crate) async fn mount_status(
    server: &MockServer,
    http_method: &str,
    url_path: &str,
    status: u16,
) {
    Mock::given(method(http_method))
        .and(path(url_path))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

pub(crate) fn new_endpoint(dpid: &str, port_no: &str) -> LinkEndpoint {
    let dpid_suffix = &dpid[dpid.len() - 1..];
    LinkEndpoint::new(
        dpid,
        port_no,
        &format!("00:00:00:00:00:{dpid_suffix}{port_no}"),
        &format!("s{dpid_suffix}-eth{port_no}"),
    )
}

pub(crate) fn new_link(
    src: &str,
    src_port: &str,
    dst: &str,
    dst_port: &str,
) -> Link {
    Link::new(new_endpoint(src, src_port), new_endpoint(dst, dst_port))
}

// Two switches linked both ways on port 2, one host on each.
pub(crate) fn gen_test_snapshot() -> TopologySnapshot {
    TopologySnapshot::new(
        vec![
            new_link("0000000000000001", "2", "0000000000000002", "2"),
            new_link("0000000000000002", "2", "0000000000000001", "2"),
        ],
        vec![
            Host::new(
                "00:00:00:00:00:0a",
                &["10.0.0.1"],
                new_endpoint("0000000000000001", "1"),
            ),
            Host::new(
                "00:00:00:00:00:0b",
                &["10.0.0.2"],
                new_endpoint("0000000000000002", "1"),
            ),
        ],
    )
}
