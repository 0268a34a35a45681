/// Integration tests with a mocked backend
/// Tests the persona gateways, lead board and inbox without a real backend
use lead_dashboard_api::core::errors::AppError;
use lead_dashboard_api::integrations::gateway_client::{gateway_for, BackendClient, LeadGateway};
use lead_dashboard_api::inbox::{InboxMonitor, RefreshOutcome};
use lead_dashboard_api::core::lead_board::LeadBoard;
use lead_dashboard_api::models::{LeadQuery, Persona, UploadFile};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper function to create a gateway pointing at the mock server
fn create_test_gateway(base_url: &str, persona: Persona) -> Arc<dyn LeadGateway> {
    let backend = BackendClient::new(
        BackendClient::http_client().unwrap(),
        base_url,
        "test_key",
        Duration::from_secs(5),
    )
    .unwrap();
    gateway_for(persona, backend)
}

fn csv_upload(name: &str) -> UploadFile {
    UploadFile {
        file_name: name.to_string(),
        content_type: Some("text/csv".to_string()),
        bytes: b"name,title\nAhmed,Director\n".to_vec(),
    }
}

#[tokio::test]
async fn test_list_all_leads_wrapped_payload() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sales/leads"))
        .and(header("X-API-Key", "test_key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "leads": [
                {"id": 1, "employee_name": "Ahmed Al-Rashid", "title": "Sales Director", "campaign_name": "MICT"},
                {"id": "2", "employeeName": "Sarah Johnson", "title": null}
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let gateway = create_test_gateway(&mock_server.uri(), Persona::Sales);
    let leads = gateway.list_all_leads().await.unwrap();

    assert_eq!(leads.len(), 2);
    assert_eq!(leads[0].id, "1");
    assert_eq!(leads[0].event_name, "MICT");
    assert_eq!(leads[1].employee_name, "Sarah Johnson");
    assert_eq!(leads[1].title, "");
    assert_eq!(leads[1].event_name, "Unknown Event");
}

#[tokio::test]
async fn test_bad_records_do_not_fail_the_lead_list() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sales/leads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "1", "event_name": "MICT", "eventName": "MICT", "employee_name": "Ahmed Al-Rashid"},
            null,
            {"id": "2", "employeeName": "Sarah Johnson"}
        ])))
        .mount(&mock_server)
        .await;

    let gateway = create_test_gateway(&mock_server.uri(), Persona::Sales);
    let leads = gateway.list_all_leads().await.unwrap();

    assert_eq!(leads.len(), 2);
    assert_eq!(leads[0].event_name, "MICT");
    assert_eq!(leads[1].employee_name, "Sarah Johnson");
}

#[tokio::test]
async fn test_wrong_lead_list_shape_is_invalid_payload() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sales/leads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&mock_server)
        .await;

    let gateway = create_test_gateway(&mock_server.uri(), Persona::Sales);
    assert!(matches!(
        gateway.list_all_leads().await,
        Err(AppError::InvalidPayload(_))
    ));
}

#[tokio::test]
async fn test_delegates_persona_uses_its_own_prefix() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/delegates/leads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "d1", "employee_name": "James Wilson"}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let gateway = create_test_gateway(&mock_server.uri(), Persona::Delegates);
    let leads = gateway.list_all_leads().await.unwrap();

    assert_eq!(leads.len(), 1);
    assert_eq!(leads[0].employee_name, "James Wilson");
}

#[tokio::test]
async fn test_upstream_error_carries_backend_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sales/campaigns/c9/stop"))
        .respond_with(ResponseTemplate::new(409).set_body_string("Campaign already stopped"))
        .mount(&mock_server)
        .await;

    let gateway = create_test_gateway(&mock_server.uri(), Persona::Sales);
    match gateway.stop_campaign("c9").await {
        Err(AppError::Upstream { status, body }) => {
            assert_eq!(status, 409);
            assert_eq!(body, "Campaign already stopped");
        }
        other => panic!("expected upstream error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_network_failure_is_reported() {
    // Nothing listens on port 1, so the connection is refused.
    let gateway = create_test_gateway("http://127.0.0.1:1", Persona::Sales);
    let result = gateway.dashboard_stats().await;
    assert!(matches!(result, Err(AppError::Network(_))));
}

#[tokio::test]
async fn test_create_campaign_sends_json_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sales/campaigns"))
        .and(body_string_contains("\"name\":\"Q4 Fintech\""))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "c1"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let gateway = create_test_gateway(&mock_server.uri(), Persona::Sales);
    let created = gateway
        .create_campaign(json!({"name": "Q4 Fintech"}))
        .await
        .unwrap();
    assert_eq!(created["id"], "c1");
}

#[tokio::test]
async fn test_empty_backend_body_is_null() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sales/leads/l1/approve"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let gateway = create_test_gateway(&mock_server.uri(), Persona::Sales);
    let result = gateway.approve_lead("l1").await.unwrap();
    assert!(result.is_null());
}

#[tokio::test]
async fn test_export_keeps_content_type() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sales/campaigns/c1/export"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("name,email\nAhmed,ahmed@example.com\n", "text/csv"),
        )
        .mount(&mock_server)
        .await;

    let gateway = create_test_gateway(&mock_server.uri(), Persona::Sales);
    let download = gateway.export_campaign("c1").await.unwrap();
    assert_eq!(download.content_type, "text/csv");
    assert!(String::from_utf8(download.bytes).unwrap().starts_with("name,email"));
}

#[tokio::test]
async fn test_upload_then_refetch_replaces_list() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sales/leads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "new-1", "employee_name": "Fatima Noor", "event_name": "GITEX"}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/sales/leads/upload"))
        .and(body_string_contains("name=\"files\""))
        .and(body_string_contains("filename=\"leads.csv\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"imported": 1})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let gateway = create_test_gateway(&mock_server.uri(), Persona::Sales);

    // Stale session state that must not survive the refetch
    let mut board = LeadBoard::new(vec![lead_dashboard_api::models::Lead {
        id: "old-1".into(),
        event_name: "MICT".into(),
        employee_name: "Ahmed Al-Rashid".into(),
        title: String::new(),
        company: String::new(),
        email: String::new(),
        phone: String::new(),
        linkedin_url: String::new(),
        company_url: String::new(),
    }]);

    let response = board
        .upload(gateway.as_ref(), vec![csv_upload("leads.csv")])
        .await
        .unwrap();

    assert_eq!(response["imported"], 1);
    assert_eq!(board.leads().len(), 1);
    assert_eq!(board.leads()[0].id, "new-1");
    assert_eq!(board.event_names(), vec!["GITEX"]);
}

#[tokio::test]
async fn test_failed_upload_does_not_refetch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sales/leads/upload"))
        .respond_with(ResponseTemplate::new(422).set_body_string("Unsupported file"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/sales/leads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let gateway = create_test_gateway(&mock_server.uri(), Persona::Sales);
    let mut board = LeadBoard::default();
    let result = board
        .upload(gateway.as_ref(), vec![csv_upload("leads.pdf")])
        .await;

    assert!(matches!(result, Err(AppError::Upstream { status: 422, .. })));
}

#[tokio::test]
async fn test_board_search_over_fetched_leads() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sales/leads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "1", "employee_name": "Ahmed Al-Rashid", "title": "Sales Director", "event_name": "MICT"},
            {"id": "2", "employee_name": "Sarah Johnson", "title": "VP Marketing", "event_name": "MICT"},
            {"id": "3", "employee_name": "James Wilson", "title": "Regional Director", "event_name": "Other Event"}
        ])))
        .mount(&mock_server)
        .await;

    let gateway = create_test_gateway(&mock_server.uri(), Persona::Sales);
    let board = LeadBoard::load(gateway.as_ref()).await.unwrap();

    let ids: Vec<String> = board
        .search(&LeadQuery::from_params(Some("director".into()), None, None))
        .into_iter()
        .map(|l| l.id)
        .collect();
    assert_eq!(ids, vec!["1", "3"]);
}

#[tokio::test]
async fn test_inbox_halves_are_independent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sales/replies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "r1", "body": "Interested, let's talk"}
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/sales/messages/status"))
        .respond_with(ResponseTemplate::new(503).set_body_string("status service down"))
        .mount(&mock_server)
        .await;

    let gateway = create_test_gateway(&mock_server.uri(), Persona::Sales);
    let inbox = InboxMonitor::new();

    let outcome = inbox.refresh(gateway.as_ref()).await;
    assert_eq!(
        outcome,
        RefreshOutcome::Applied {
            replies: true,
            statuses: false
        }
    );

    let snapshot = inbox.snapshot().await;
    assert_eq!(snapshot.replies[0]["id"], "r1");
    assert_eq!(snapshot.message_statuses, json!([]));
    assert!(snapshot.refreshed_at.is_some());
    assert!(snapshot
        .last_error
        .unwrap()
        .contains("status service down"));
}

#[tokio::test]
async fn test_overlapping_inbox_refresh_is_skipped() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&mock_server)
        .await;

    let gateway = create_test_gateway(&mock_server.uri(), Persona::Sales);
    let inbox = InboxMonitor::new();

    let (first, second) = tokio::join!(inbox.refresh(gateway.as_ref()), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        inbox.refresh(gateway.as_ref()).await
    });

    assert!(matches!(first, RefreshOutcome::Applied { .. }));
    assert_eq!(second, RefreshOutcome::Skipped);

    // Once the first refresh is done a new one runs again.
    assert!(matches!(
        inbox.refresh(gateway.as_ref()).await,
        RefreshOutcome::Applied { .. }
    ));
}

#[tokio::test]
async fn test_persona_switch_does_not_keep_other_persona_inbox() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sales/replies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "s1"}])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sales/messages/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "s-status"}])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/delegates/replies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "d1"}])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/delegates/messages/status"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let inbox = InboxMonitor::new();
    inbox
        .refresh(create_test_gateway(&mock_server.uri(), Persona::Sales).as_ref())
        .await;
    inbox
        .refresh(create_test_gateway(&mock_server.uri(), Persona::Delegates).as_ref())
        .await;

    let snapshot = inbox.snapshot_for(Persona::Delegates).await;
    assert_eq!(snapshot.replies[0]["id"], "d1");
    // The failed half starts empty instead of showing sales statuses.
    assert_eq!(snapshot.message_statuses, json!([]));
    assert!(snapshot.last_error.unwrap().contains("boom"));
}
