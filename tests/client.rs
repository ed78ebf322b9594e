use chrono::{FixedOffset, NaiveDate};
use comfort_cloud::client::{ComfortCloudClient, SessionState};
use comfort_cloud::error::{AuthError, ClientError, ControlError};
use comfort_cloud::models::command::Command;
use comfort_cloud::models::comfort_cloud::{DataMode, EcoMode, HistoryEntry, HistoryQuery, OperationMode, Power};
use comfort_cloud::session::{self, Credentials, Resumed};
use mockito::{Matcher, Server};
use serde_json::json;

const SESSION_BODY: &str = r#"{"uToken":"tok1","result":0,"language":0}"#;
const ONE_DEVICE_GROUPS: &str = r#"{"groupCount":1,"groupList":[{"groupId":1,"groupName":"Home","deviceList":[{"deviceGuid":"DEV-1"}]}]}"#;
const SUCCESS: &str = r#"{"result":0}"#;

fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/data/{name}")).expect("fixture present")
}

fn credentials() -> Credentials {
    Credentials {
        username: "u".into(),
        password: "p".into(),
    }
}

#[test]
fn login_list_and_set_temperature() {
    let mut server = Server::new();
    let login = server
        .mock("POST", "/auth/login")
        .match_header("x-user-authorization", Matcher::Missing)
        .match_body(Matcher::Json(json!({"language": "0", "loginId": "u", "password": "p"})))
        .with_body(SESSION_BODY)
        .expect(1)
        .create();
    let groups = server
        .mock("GET", "/device/group")
        .match_header("x-user-authorization", "tok1")
        .with_body(ONE_DEVICE_GROUPS)
        .create();
    let control = server
        .mock("POST", "/deviceStatus/control")
        .match_header("x-user-authorization", "tok1")
        .match_body(Matcher::Json(json!({"deviceGuid": "DEV-1", "parameters": {"temperatureSet": 19.5}})))
        .with_body(SUCCESS)
        .create();

    let mut client = ComfortCloudClient::new(&server.url());
    let session = client.login("u", "p").unwrap();
    assert_eq!(session.token, "tok1");
    assert_eq!(client.token(), Some("tok1"));
    assert_eq!(client.state(), SessionState::Active);

    assert_eq!(client.list_devices().unwrap(), vec!["DEV-1".to_string()]);
    client.set_temperature("DEV-1", 19.5).unwrap();

    login.assert();
    groups.assert();
    control.assert();
}

#[test]
fn every_request_carries_the_client_headers() {
    let mut server = Server::new();
    let groups = server
        .mock("GET", "/device/group")
        .match_header("x-user-authorization", "tok1")
        .match_header("x-app-type", "1")
        .match_header("x-app-version", "1.9.0")
        .match_header("user-agent", "G-RAC")
        .match_header("accept", "application/json; charset=utf-8")
        .with_body(ONE_DEVICE_GROUPS)
        .create();

    let mut client = ComfortCloudClient::new(&server.url());
    client.set_token("tok1");
    client.get_groups().unwrap();
    groups.assert();
}

#[test]
fn valid_stored_token_is_reused_without_login() {
    let mut server = Server::new();
    let validate = server
        .mock("GET", "/auth/agreement/status/1")
        .match_header("x-user-authorization", "tok-old")
        .with_body("{}")
        .expect(1)
        .create();
    let login = server.mock("POST", "/auth/login").expect(0).create();

    let mut client = ComfortCloudClient::new(&server.url());
    let resumed = session::resume(&mut client, Some("tok-old"), Some(&credentials())).unwrap();

    assert_eq!(resumed, Resumed::Reused);
    assert_eq!(client.token(), Some("tok-old"));
    assert_eq!(client.state(), SessionState::Active);
    validate.assert();
    login.assert();
}

#[test]
fn rejected_token_logs_in_once_and_uses_the_new_token() {
    let mut server = Server::new();
    let validate = server
        .mock("GET", "/auth/agreement/status/1")
        .with_status(401)
        .with_body(r#"{"code":4100,"message":"Token expires"}"#)
        .create();
    let login = server
        .mock("POST", "/auth/login")
        .with_body(r#"{"uToken":"tok-new","result":0,"language":0}"#)
        .expect(1)
        .create();
    let groups = server
        .mock("GET", "/device/group")
        .match_header("x-user-authorization", "tok-new")
        .with_body(ONE_DEVICE_GROUPS)
        .create();

    let mut client = ComfortCloudClient::new(&server.url());
    let resumed = session::resume(&mut client, Some("tok-old"), Some(&credentials())).unwrap();

    assert_eq!(resumed, Resumed::LoggedIn("tok-new".into()));
    assert_eq!(client.list_devices().unwrap(), vec!["DEV-1".to_string()]);
    validate.assert();
    login.assert();
    groups.assert();
}

#[test]
fn rejected_token_without_credentials_is_an_auth_error() {
    let mut server = Server::new();
    server.mock("GET", "/auth/agreement/status/1").with_status(403).create();
    let login = server.mock("POST", "/auth/login").expect(0).create();

    let mut client = ComfortCloudClient::new(&server.url());
    let err = session::resume(&mut client, Some("tok-old"), None).unwrap_err();

    assert!(matches!(err, ClientError::Auth(AuthError::NoCredentials)));
    assert_eq!(client.state(), SessionState::Invalid);
    login.assert();
}

#[test]
fn validate_reports_rejection_with_body() {
    let mut server = Server::new();
    server
        .mock("GET", "/auth/agreement/status/1")
        .with_status(401)
        .with_body("expired")
        .create();

    let mut client = ComfortCloudClient::new(&server.url());
    match client.validate("tok-old") {
        Err(ClientError::Auth(AuthError::TokenRejected { status, body })) => {
            assert_eq!(status, 401);
            assert_eq!(body, "expired");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn login_failures_are_typed() {
    let mut server = Server::new();
    let mut client = ComfortCloudClient::new(&server.url());

    let rejected = server
        .mock("POST", "/auth/login")
        .with_status(401)
        .with_body(r#"{"code":4101}"#)
        .create();
    let err = client.login("u", "wrong").unwrap_err();
    assert_eq!(
        err.to_string(),
        r#"auth error: login rejected (http 401): {"code":4101}"#
    );
    assert_eq!(client.state(), SessionState::NoSession);
    assert_eq!(client.token(), None);
    rejected.remove();

    let garbled = server.mock("POST", "/auth/login").with_body("<html>").create();
    let err = client.login("u", "p").unwrap_err();
    assert!(matches!(err, ClientError::Decode(ref d) if d.body == "<html>"));
    garbled.remove();

    server
        .mock("POST", "/auth/login")
        .with_body(r#"{"uToken":"","result":1,"language":0}"#)
        .create();
    let err = client.login("u", "p").unwrap_err();
    assert!(matches!(err, ClientError::Auth(AuthError::LoginRejected { status: 200, .. })));
}

#[test]
fn zero_valued_commands_reach_the_wire() {
    let mut server = Server::new();
    let off = server
        .mock("POST", "/deviceStatus/control")
        .match_body(Matcher::Json(json!({"deviceGuid": "DEV-1", "parameters": {"operate": 0}})))
        .with_body(SUCCESS)
        .expect(1)
        .create();
    let auto = server
        .mock("POST", "/deviceStatus/control")
        .match_body(Matcher::Json(json!({"deviceGuid": "DEV-1", "parameters": {"operationMode": 0}})))
        .with_body(SUCCESS)
        .expect(1)
        .create();
    let combined = server
        .mock("POST", "/deviceStatus/control")
        .match_body(Matcher::Json(json!({
            "deviceGuid": "DEV-1",
            "parameters": {"operate": 1, "ecoMode": 2, "fanSpeed": 0}
        })))
        .with_body(SUCCESS)
        .expect(1)
        .create();

    let mut client = ComfortCloudClient::new(&server.url());
    client.set_token("tok1");
    client.turn_off("DEV-1").unwrap();
    client.set_mode("DEV-1", OperationMode::Auto).unwrap();
    client
        .control(&Command::new("DEV-1").power(Power::On).eco_mode(EcoMode::Quiet).fan_speed(0))
        .unwrap();

    off.assert();
    auto.assert();
    combined.assert();
}

#[test]
fn control_failures_keep_the_raw_body() {
    let mut server = Server::new();
    let mut client = ComfortCloudClient::new(&server.url());
    client.set_token("tok1");

    let refused = server
        .mock("POST", "/deviceStatus/control")
        .with_body(r#"{"result":1}"#)
        .create();
    match client.turn_on("DEV-1") {
        Err(ClientError::Control(ControlError { status: None, body, .. })) => assert_eq!(body, r#"{"result":1}"#),
        other => panic!("unexpected result: {:?}", other),
    }
    refused.remove();

    let lookalike = server
        .mock("POST", "/deviceStatus/control")
        .with_body(r#"{"result":"0"}"#)
        .create();
    assert!(matches!(client.turn_on("DEV-1"), Err(ClientError::Control(_))));
    lookalike.remove();

    server
        .mock("POST", "/deviceStatus/control")
        .with_status(500)
        .with_body("upstream")
        .create();
    match client.set_eco_mode("DEV-1", EcoMode::Powerful) {
        Err(ClientError::Control(ControlError { status, body, .. })) => {
            assert_eq!(status, Some(500));
            assert_eq!(body, "upstream");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn http_failures_carry_status_and_body() {
    let mut server = Server::new();
    server
        .mock("GET", "/device/group")
        .with_status(401)
        .with_body(r#"{"code":4100}"#)
        .create();

    let mut client = ComfortCloudClient::new(&server.url());
    client.set_token("tok1");
    match client.list_devices() {
        Err(ClientError::HttpStatus { status, body }) => {
            assert_eq!(status, 401);
            assert_eq!(body, r#"{"code":4100}"#);
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(client.state(), SessionState::Expired);
}

#[test]
fn device_status_decodes_capabilities_and_parameters() {
    let mut server = Server::new();
    let status = server
        .mock("GET", "/deviceStatus/now/DEV-1")
        .with_body(fixture("device-status.json"))
        .create();

    let mut client = ComfortCloudClient::new(&server.url());
    client.set_token("tok1");
    let device = client.get_device_status("DEV-1").unwrap();

    assert!(device.cool_mode);
    assert!(!device.eco_function);
    assert_eq!(device.parameters.operate, Power::On);
    assert_eq!(device.parameters.operation_mode, OperationMode::Heat);
    assert_eq!(device.parameters.out_temperature, 8.0);
    status.assert();
}

#[test]
fn malformed_status_is_a_decode_error() {
    let mut server = Server::new();
    server
        .mock("GET", "/deviceStatus/now/DEV-1")
        .with_body(r#"{"deviceGuid":"DEV-1","heatMode":"yes"}"#)
        .create();

    let mut client = ComfortCloudClient::new(&server.url());
    client.set_token("tok1");
    match client.get_device_status("DEV-1") {
        Err(ClientError::Decode(e)) => {
            assert_eq!(e.path, "heatMode");
            assert_eq!(e.body, r#"{"deviceGuid":"DEV-1","heatMode":"yes"}"#);
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn history_request_and_sentinel_preservation() {
    let mut server = Server::new();
    let history = server
        .mock("POST", "/deviceHistoryData")
        .match_body(Matcher::Json(json!({
            "dataMode": "1",
            "date": "20210105",
            "deviceGuid": "DEV-1",
            "osTimezone": "+01:00",
        })))
        .with_body(fixture("history.json"))
        .create();

    let mut client = ComfortCloudClient::new(&server.url());
    client.set_token("tok1");
    let query = HistoryQuery {
        mode: DataMode::Week,
        date: NaiveDate::from_ymd_opt(2021, 1, 5).unwrap(),
        timezone: FixedOffset::east_opt(3600).unwrap(),
    };
    let result = client.get_device_history("DEV-1", &query).unwrap();

    assert_eq!(result.energy_consumption, 4.2);
    assert_eq!(result.entries.len(), 4);
    assert_eq!(result.entries[3].average_inside_temp, HistoryEntry::NO_DATA);
    assert_eq!(result.entries[2].average_outside_temp, -255.0);
    history.assert();
}

#[test]
fn unreachable_server_is_a_transport_error() {
    let mut client = ComfortCloudClient::new("http://127.0.0.1:1");
    assert!(matches!(client.login("u", "p"), Err(ClientError::Transport(_))));
    assert_eq!(client.state(), SessionState::NoSession);
}

#[test]
fn non_finite_temperature_never_reaches_the_wire() {
    let mut server = Server::new();
    let control = server.mock("POST", "/deviceStatus/control").expect(0).create();

    let mut client = ComfortCloudClient::new(&server.url());
    client.set_token("tok1");
    let err = client.set_temperature("DEV-1", f64::NAN).unwrap_err();

    assert!(matches!(err, ClientError::Control(ControlError { status: None, .. })));
    control.assert();
}
