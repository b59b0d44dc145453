//! BDD step definitions for the data client feature

use std::sync::Arc;

use cucumber::{given, then, when};

use iot_dashboard::client::{DataClient, DeviceDataSource};
use iot_dashboard::io::{HttpClient, HttpResponse};
use iot_dashboard::DashboardError;

use crate::steps::doubles::CannedHttpClient;
use crate::world::DashboardWorld;

fn backend(world: &mut DashboardWorld, base_url: String, response: Result<HttpResponse, String>) {
    world.base_url = Some(base_url);
    world.http = Some(CannedHttpClient::responding(response));
}

fn ok_body(body: &str) -> Result<HttpResponse, String> {
    Ok(HttpResponse {
        status: 200,
        body: body.to_string(),
    })
}

// --- Given steps ---

#[given(expr = "a backend at {string} returning an empty list")]
fn backend_empty(world: &mut DashboardWorld, base_url: String) {
    backend(world, base_url, ok_body("[]"));
}

#[given(expr = "a backend at {string} returning null")]
fn backend_null(world: &mut DashboardWorld, base_url: String) {
    backend(world, base_url, ok_body("null"));
}

#[given(expr = "a backend at {string} returning a thermostat reading of {float} °C")]
fn backend_thermostat(world: &mut DashboardWorld, base_url: String, temperature: f64) {
    let body = serde_json::json!([{
        "device_id": "t-1",
        "device_type": "thermostat",
        "timestamp": 1000,
        "data": {"data": {"temperature": temperature}}
    }])
    .to_string();
    backend(world, base_url, ok_body(&body));
}

#[given(expr = "a backend at {string} returning a light reading with null data")]
fn backend_null_data(world: &mut DashboardWorld, base_url: String) {
    backend(
        world,
        base_url,
        ok_body(r#"[{"device_id": "l-1", "device_type": "light", "timestamp": 1, "data": null}]"#),
    );
}

#[given(expr = "a backend at {string} returning a reading without a device id")]
fn backend_malformed(world: &mut DashboardWorld, base_url: String) {
    backend(
        world,
        base_url,
        ok_body(r#"[{"device_type": "light", "timestamp": 1, "data": {"data": {}}}]"#),
    );
}

#[given(expr = "a backend at {string} returning two readings for device {string}")]
fn backend_duplicate(world: &mut DashboardWorld, base_url: String, device_id: String) {
    let reading = |timestamp: i64| {
        serde_json::json!({
            "device_id": device_id,
            "device_type": "light",
            "timestamp": timestamp,
            "data": {"data": {}}
        })
    };
    let body = serde_json::json!([reading(1), reading(2)]).to_string();
    backend(world, base_url, ok_body(&body));
}

#[given(expr = "a backend at {string} responding with status {int}")]
fn backend_status(world: &mut DashboardWorld, base_url: String, status: u16) {
    backend(
        world,
        base_url,
        Ok(HttpResponse {
            status,
            body: "Error retrieving device data".to_string(),
        }),
    );
}

#[given(expr = "a backend at {string} that refuses connections")]
fn backend_refuses(world: &mut DashboardWorld, base_url: String) {
    backend(world, base_url, Err("connection refused".to_string()));
}

// --- When steps ---

async fn fetch(world: &mut DashboardWorld, time_range: Option<u64>) {
    let http = world.http.clone().expect("no backend configured");
    let base_url = world.base_url.clone().expect("no base url configured");
    let client = DataClient::new(&base_url, http as Arc<dyn HttpClient>);
    world.fetch_result = Some(client.fetch_device_data(time_range).await);
}

#[when("device data is fetched without a time range")]
async fn fetch_default(world: &mut DashboardWorld) {
    fetch(world, None).await;
}

#[when(expr = "device data is fetched for the last {int} seconds")]
async fn fetch_range(world: &mut DashboardWorld, seconds: u64) {
    fetch(world, Some(seconds)).await;
}

// --- Then steps ---

#[then(expr = "the request URL should be {string}")]
async fn request_url(world: &mut DashboardWorld, expected: String) {
    let http = world.http.as_ref().expect("no backend configured");
    let requests = http.requests.read().await;
    assert_eq!(requests.as_slice(), [expected]);
}

#[then(expr = "the fetch should succeed with {int} readings")]
fn fetch_succeeds(world: &mut DashboardWorld, count: usize) {
    match world.fetch_result.as_ref().expect("nothing fetched") {
        Ok(readings) => assert_eq!(readings.len(), count),
        Err(e) => panic!("expected success, got {e:?}"),
    }
}

#[then(expr = "the first reading should have a temperature of {float} °C")]
fn first_temperature(world: &mut DashboardWorld, temperature: f64) {
    let readings = match world.fetch_result.as_ref().expect("nothing fetched") {
        Ok(readings) => readings,
        Err(e) => panic!("expected success, got {e:?}"),
    };
    assert_eq!(readings[0].attributes().temperature, Some(temperature));
}

#[then(expr = "the fetch should fail with a status {int} error")]
fn fetch_fails_status(world: &mut DashboardWorld, expected: u16) {
    match world.fetch_result.as_ref().expect("nothing fetched") {
        Err(DashboardError::Fetch { status, .. }) => assert_eq!(*status, expected),
        other => panic!("expected Fetch error, got {other:?}"),
    }
}

#[then("the fetch should fail with a transport error")]
fn fetch_fails_transport(world: &mut DashboardWorld) {
    match world.fetch_result.as_ref().expect("nothing fetched") {
        Err(DashboardError::Http(_)) => {}
        other => panic!("expected Http error, got {other:?}"),
    }
}

#[then("the fetch should fail with a decoding error")]
fn fetch_fails_decode(world: &mut DashboardWorld) {
    match world.fetch_result.as_ref().expect("nothing fetched") {
        Err(DashboardError::Decode(_)) => {}
        other => panic!("expected Decode error, got {other:?}"),
    }
}

#[then("the fetch should fail with a schema error")]
fn fetch_fails_schema(world: &mut DashboardWorld) {
    match world.fetch_result.as_ref().expect("nothing fetched") {
        Err(DashboardError::Schema(_)) => {}
        other => panic!("expected Schema error, got {other:?}"),
    }
}
