use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::Duration;

use axum::http::StatusCode;
use serde_json::{Value, json};
use shapr_common::error::ShapingError;
use shapr_common::profile::{ProfileFormat, ShapingProfile};
use shapr_core::{ClientConfig, HttpShapingClient, ShapingClient};

use crate::service::FakeShapingService;

fn ip(d: u8) -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(10, 0, 0, d))
}

fn parameters() -> Value {
    json!({
        "up": { "rate": 1024, "loss": { "percentage": 0 } },
        "down": { "rate": 4096, "delay": { "delay": 80, "jitter": 5 } }
    })
}

fn client_for(service: &FakeShapingService) -> HttpShapingClient {
    HttpShapingClient::new(&ClientConfig::new(service.host())).unwrap()
}

#[tokio::test]
async fn get_missing_profile_is_none() {
    let service = FakeShapingService::start().await;
    let client = client_for(&service);

    let result = client.get_shaping(ip(10)).await;

    assert!(matches!(result, Ok(None)), "{result:?}");
}

#[tokio::test]
async fn get_existing_profile_decodes_raw_body() {
    let service = FakeShapingService::start().await;
    service.state.put("10.0.0.10", parameters());
    let client = client_for(&service);

    let profile = client.get_shaping(ip(10)).await.unwrap().expect("profile should be set");

    assert_eq!(Value::Object(profile.parameters().clone()), parameters());
}

#[tokio::test]
async fn get_server_error_carries_status_and_body() {
    let service = FakeShapingService::start().await;
    service.state.fail_reads("10.0.0.10", StatusCode::INTERNAL_SERVER_ERROR);
    let client = client_for(&service);

    match client.get_shaping(ip(10)).await {
        Err(ShapingError::UnexpectedResponse { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "injected failure");
        }
        other => panic!("expected UnexpectedResponse, got {other:?}"),
    }
}

#[tokio::test]
async fn get_body_without_up_down_is_invalid() {
    let service = FakeShapingService::start().await;
    service.state.put("10.0.0.10", json!({ "content": parameters() }));
    let client = client_for(&service);

    let result = client.get_shaping(ip(10)).await;

    assert!(matches!(result, Err(ShapingError::InvalidProfile(_))), "{result:?}");
}

#[tokio::test]
async fn set_posts_parameters_with_real_ip_header() {
    let service = FakeShapingService::start().await;
    let client = client_for(&service);
    let profile = ShapingProfile::decode(json!({ "name": "DSL", "content": parameters() }), ProfileFormat::Named).unwrap();

    client.set_shaping(ip(42), &profile).await.unwrap();

    let writes = service.state.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].address, "10.0.0.42");
    assert_eq!(writes[0].real_ip.as_deref(), Some("10.0.0.42"));
    assert_eq!(writes[0].body, Some(parameters()));
    assert_eq!(service.state.profile("10.0.0.42"), Some(parameters()));
}

#[tokio::test]
async fn set_rejected_write_is_unexpected_response() {
    let service = FakeShapingService::start().await;
    service.state.fail_writes("10.0.0.10", StatusCode::CONFLICT);
    let client = client_for(&service);
    let profile = ShapingProfile::decode(parameters(), ProfileFormat::Raw).unwrap();

    match client.set_shaping(ip(10), &profile).await {
        Err(ShapingError::UnexpectedResponse { status, .. }) => assert_eq!(status, 409),
        other => panic!("expected UnexpectedResponse, got {other:?}"),
    }
    assert_eq!(service.state.profile("10.0.0.10"), None);
}

#[tokio::test]
async fn ipv6_addresses_round_trip_through_path_and_header() {
    let service = FakeShapingService::start().await;
    let client = client_for(&service);
    let addr = IpAddr::V6("fd00::1:2".parse::<Ipv6Addr>().unwrap());
    let profile = ShapingProfile::decode(parameters(), ProfileFormat::Raw).unwrap();

    client.set_shaping(addr, &profile).await.unwrap();
    let fetched = client.get_shaping(addr).await.unwrap();

    assert_eq!(service.state.writes()[0].real_ip.as_deref(), Some("fd00::1:2"));
    assert_eq!(fetched, Some(profile));
}

#[tokio::test]
async fn connection_refused_is_transport_error() {
    let port = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = HttpShapingClient::new(&ClientConfig::new(format!("127.0.0.1:{port}"))).unwrap();

    let result = client.get_shaping(ip(10)).await;

    assert!(matches!(result, Err(ShapingError::Transport(_))), "{result:?}");
}

#[tokio::test]
async fn slow_service_times_out_as_transport_error() {
    let service = FakeShapingService::start().await;
    service.state.stall_reads(Duration::from_secs(5));
    let config = ClientConfig::new(service.host()).with_timeout(Duration::from_millis(200));
    let client = HttpShapingClient::new(&config).unwrap();

    let result = client.get_shaping(ip(10)).await;

    assert!(matches!(result, Err(ShapingError::Transport(_))), "{result:?}");
}
