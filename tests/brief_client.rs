use brief_wizard::core::ServiceClient;
use brief_wizard::types::response::ApprovalStatus;
use brief_wizard::{ApiError, BriefClient, BriefData, Language, Section, Seniority, UserPreferences};
use reqwest::StatusCode;
use serde_json::{json, Map, Value};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> BriefClient {
    BriefClient::new(ServiceClient::new(server.uri(), 5).unwrap())
}

fn obj(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

#[tokio::test]
async fn test_submit_preferences_sends_flat_config() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let prefs = UserPreferences::new(Language::Fr, Seniority::Senior)
        .with_sections([Section::TitreJobFamily, Section::ProcessusRecrutement]);

    let mut expected_sections = vec![false; 18];
    expected_sections[0] = true;
    expected_sections[17] = true;

    Mock::given(method("POST"))
        .and(path("/v1/config"))
        .and(body_partial_json(json!({
            "session_id": client.session_id().to_string(),
            "sections": expected_sections,
            "language": "fr",
            "seniority": "Senior"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    client.submit_preferences(&prefs).await.unwrap();
}

#[tokio::test]
async fn test_update_section_data_uses_slug() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    Mock::given(method("POST"))
        .and(path("/v1/data"))
        .and(body_partial_json(json!({
            "section_id": "titre_job_family",
            "data": { "job_title": "Développeur Rust", "job_family": "Tech" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    client
        .update_section_data(
            Section::TitreJobFamily,
            &obj(json!({ "job_title": "Développeur Rust", "job_family": "Tech" })),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_generate_section_parses_draft() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let prefs = UserPreferences::default().with_sections([Section::Contexte]);
    let mut data = BriefData::new();
    data.merge_section(Section::Contexte, obj(json!({ "business_context": "Croissance" })));

    Mock::given(method("POST"))
        .and(path("/v1/generate"))
        .and(body_partial_json(json!({
            "section_id": "contexte",
            "user_preferences": { "language": "fr", "seniority": "Senior" },
            "brief_data": { "contexte": { "business_context": "Croissance" } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "markdown": "## Contexte\n\nCroissance forte.",
            "confidence": 0.55,
            "fallback_needed": true
        })))
        .mount(&server)
        .await;

    let generated = client
        .generate_section(Section::Contexte, &prefs, &data)
        .await
        .unwrap();

    assert_eq!(generated.markdown, "## Contexte\n\nCroissance forte.");
    assert!(generated.fallback_needed);
    assert_eq!(generated.confidence_level().to_string(), "low");
}

#[tokio::test]
async fn test_feedback_and_approval_bodies() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let prefs = UserPreferences::default().with_sections([Section::Contexte]);

    Mock::given(method("POST"))
        .and(path("/v1/feedback"))
        .and(body_partial_json(json!({
            "section_id": "contexte",
            "user_feedback": "Plus concis",
            "previous_markdown": "v1"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "markdown": "v2", "confidence": 0.9 })),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/approval"))
        .and(body_partial_json(json!({
            "section_id": "contexte",
            "markdown": "v2",
            "status": "approved"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    let revised = client
        .submit_feedback(Section::Contexte, "Plus concis", "v1", &prefs, &BriefData::new())
        .await
        .unwrap();
    assert_eq!(revised.markdown, "v2");

    client
        .record_approval(Section::Contexte, &revised.markdown, ApprovalStatus::Approved)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_final_document_is_plain_text() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    Mock::given(method("GET"))
        .and(path(format!("/v1/brief/{}", client.session_id())))
        .respond_with(ResponseTemplate::new(200).set_body_string("# Brief\n\n## Contexte\n"))
        .mount(&server)
        .await;

    let markdown = client.fetch_final_document().await.unwrap();
    assert_eq!(markdown, "# Brief\n\n## Contexte\n");
}

#[tokio::test]
async fn test_unapproved_sections_conflict_is_surfaced() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    Mock::given(method("GET"))
        .and(path(format!("/v1/brief/{}", client.session_id())))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({ "detail": "Section contexte not approved" })),
        )
        .mount(&server)
        .await;

    let err = client.fetch_final_document().await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::CONFLICT));
    assert_eq!(err.operation(), "fetch final document");
    match err {
        ApiError::Status { body, .. } => assert!(body.contains("not approved")),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_server_error_is_an_api_error() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    Mock::given(method("POST"))
        .and(path("/v1/data"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client
        .update_section_data(Section::Contexte, &obj(json!({ "business_context": "x" })))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
}

#[tokio::test]
async fn test_fetch_section_data_is_best_effort() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let sid = client.session_id();

    Mock::given(method("GET"))
        .and(path(format!("/v1/data/{}/contexte", sid)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "business_context": "Croissance" })),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/v1/data/{}/cadre_contractuel", sid)))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/v1/data/{}/processus_recrutement", sid)))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let stored = client.fetch_section_data(Section::Contexte).await.unwrap();
    assert_eq!(stored["business_context"], json!("Croissance"));

    assert!(client.fetch_section_data(Section::CadreContractuel).await.is_none());
    assert!(client.fetch_section_data(Section::ProcessusRecrutement).await.is_none());
}

#[tokio::test]
async fn test_bearer_token_is_attached() {
    let server = MockServer::start().await;
    let service = ServiceClient::new(server.uri(), 5)
        .unwrap()
        .with_bearer_token("secret-token");
    let client = BriefClient::new(service);

    Mock::given(method("GET"))
        .and(path(format!("/v1/brief/{}", client.session_id())))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("# Brief"))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(client.fetch_final_document().await.unwrap(), "# Brief");
}
