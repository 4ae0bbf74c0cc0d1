use axum::http::{self, Request, StatusCode};
use axum::Router;
use chrono::{Days, Utc};
use http_body_util::BodyExt;
use mock_server::app;
use mock_server::models::{
    Appointment, Assessment, Child, Dashboard, EmergencyContact, GrowthRecord, Pregnancy, Token, User, Vaccination,
};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

/// Router clones share one store.
async fn send(app: &Router, request: Request<String>) -> axum::response::Response {
    app.clone().oneshot(request).await.unwrap()
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<&str>) -> Request<String> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
    }
    if body.is_some() {
        builder = builder.header(http::header::CONTENT_TYPE, "application/json");
    }
    builder.body(body.unwrap_or_default().to_string()).unwrap()
}

fn json_request(method: &str, uri: &str, token: &str, body: &str) -> Request<String> {
    request(method, uri, Some(token), Some(body))
}

fn get(uri: &str, token: &str) -> Request<String> {
    request("GET", uri, Some(token), None)
}

fn login_request(email: &str, password: &str) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header(http::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(format!("username={email}&password={password}"))
        .unwrap()
}

async fn register(app: &Router, email: &str) -> StatusCode {
    let body = format!(r#"{{"email":"{email}","password":"secret1","first_name":"Neema"}}"#);
    send(app, request("POST", "/auth/register", None, Some(&body))).await.status()
}

/// Register `email` and return a bearer token for it.
async fn session(app: &Router, email: &str) -> String {
    assert_eq!(register(app, email).await, StatusCode::OK);
    let resp = send(app, login_request(email, "secret1")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let token: Token = body_json(resp).await;
    token.access_token
}

fn days_ago(days: u64) -> String {
    Utc::now()
        .date_naive()
        .checked_sub_days(Days::new(days))
        .unwrap()
        .to_string()
}

fn days_ahead(days: u64) -> String {
    Utc::now()
        .date_naive()
        .checked_add_days(Days::new(days))
        .unwrap()
        .to_string()
}

// --- auth ---

#[tokio::test]
async fn register_login_and_me() {
    let app = app();
    let token = session(&app, "Neema@Example.com").await;

    let resp = send(&app, get("/auth/me", &token)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let user: User = body_json(resp).await;
    assert_eq!(user.email, "neema@example.com");
    assert_eq!(user.preferred_language, "en");
    assert_eq!(user.first_name.as_deref(), Some("Neema"));
}

#[tokio::test]
async fn duplicate_email_returns_400() {
    let app = app();
    assert_eq!(register(&app, "a@example.com").await, StatusCode::OK);
    let body = r#"{"email":"a@example.com","password":"secret1"}"#;
    let resp = send(&app, request("POST", "/auth/register", None, Some(body))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let error: Value = body_json(resp).await;
    assert_eq!(error["detail"], "Email already registered");
}

#[tokio::test]
async fn short_password_returns_400() {
    let app = app();
    let body = r#"{"email":"a@example.com","password":"123"}"#;
    let resp = send(&app, request("POST", "/auth/register", None, Some(body))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn wrong_password_returns_401_with_challenge() {
    let app = app();
    register(&app, "a@example.com").await;
    let resp = send(&app, login_request("a@example.com", "nope")).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(resp.headers()[http::header::WWW_AUTHENTICATE], "Bearer");
    let error: Value = body_json(resp).await;
    assert_eq!(error["detail"], "Incorrect email or password");
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let app = app();
    let resp = send(&app, request("GET", "/children", None, None)).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = send(&app, get("/children", "not-a-token")).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = send(&app, get("/children", "00000000-0000-0000-0000-000000000000")).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn change_password_checks_the_current_one() {
    let app = app();
    let token = session(&app, "a@example.com").await;

    let wrong = r#"{"current_password":"nope","new_password":"another1"}"#;
    let resp = send(&app, json_request("PUT", "/auth/change-password", &token, wrong)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let right = r#"{"current_password":"secret1","new_password":"another1"}"#;
    let resp = send(&app, json_request("PUT", "/auth/change-password", &token, right)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = send(&app, login_request("a@example.com", "another1")).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn deleting_the_account_revokes_the_session() {
    let app = app();
    let token = session(&app, "a@example.com").await;
    let resp = send(&app, request("DELETE", "/auth/me", Some(&token), None)).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    let resp = send(&app, get("/auth/me", &token)).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- pregnancy ---

#[tokio::test]
async fn active_pregnancy_is_404_until_created() {
    let app = app();
    let token = session(&app, "a@example.com").await;

    let resp = send(&app, get("/pregnancy/active", &token)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let error: Value = body_json(resp).await;
    assert_eq!(error["detail"], "No active pregnancy found");

    let body = format!(r#"{{"due_date":"{}"}}"#, days_ahead(140));
    let resp = send(&app, json_request("POST", "/pregnancy", &token, &body)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let created: Pregnancy = body_json(resp).await;
    assert!(created.is_active);
    assert_eq!(created.current_week, Some(20));
    assert_eq!(created.trimester, Some(2));

    let resp = send(&app, get("/pregnancy/active", &token)).await;
    let active: Pregnancy = body_json(resp).await;
    assert_eq!(active.id, created.id);
}

#[tokio::test]
async fn new_pregnancy_deactivates_the_previous_one() {
    let app = app();
    let token = session(&app, "a@example.com").await;
    let body = format!(r#"{{"due_date":"{}"}}"#, days_ahead(100));
    let first: Pregnancy = body_json(send(&app, json_request("POST", "/pregnancy", &token, &body)).await).await;
    let second: Pregnancy = body_json(send(&app, json_request("POST", "/pregnancy", &token, &body)).await).await;

    let all: Vec<Pregnancy> = body_json(send(&app, get("/pregnancy", &token)).await).await;
    assert_eq!(all.len(), 2);
    let first = all.iter().find(|p| p.id == first.id).unwrap();
    let second = all.iter().find(|p| p.id == second.id).unwrap();
    assert!(!first.is_active);
    assert!(second.is_active);
}

#[tokio::test]
async fn appointments_filter_by_pregnancy() {
    let app = app();
    let token = session(&app, "a@example.com").await;
    let body = format!(r#"{{"due_date":"{}"}}"#, days_ahead(100));
    let first: Pregnancy = body_json(send(&app, json_request("POST", "/pregnancy", &token, &body)).await).await;
    let second: Pregnancy = body_json(send(&app, json_request("POST", "/pregnancy", &token, &body)).await).await;

    for (pregnancy_id, days) in [(first.id, 10), (second.id, 5), (second.id, 2)] {
        let body = format!(
            r#"{{"pregnancy_id":{pregnancy_id},"appointment_type":"anc","scheduled_date":"{}"}}"#,
            days_ahead(days)
        );
        let resp = send(&app, json_request("POST", "/pregnancy/appointments", &token, &body)).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let uri = format!("/pregnancy/appointments?pregnancy_id={}", second.id);
    let appointments: Vec<Appointment> = body_json(send(&app, get(&uri, &token)).await).await;
    assert_eq!(appointments.len(), 2);
    assert!(appointments[0].scheduled_date < appointments[1].scheduled_date);

    let all: Vec<Appointment> = body_json(send(&app, get("/pregnancy/appointments", &token)).await).await;
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn appointment_for_unknown_pregnancy_is_404() {
    let app = app();
    let token = session(&app, "a@example.com").await;
    let body = r#"{"pregnancy_id":999,"appointment_type":"anc","scheduled_date":"2030-01-01"}"#;
    let resp = send(&app, json_request("POST", "/pregnancy/appointments", &token, body)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body = r#"{"appointment_type":"anc","scheduled_date":"2030-01-01"}"#;
    let resp = send(&app, json_request("POST", "/pregnancy/appointments", &token, body)).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn danger_signs_list() {
    let app = app();
    let token = session(&app, "a@example.com").await;
    let resp = send(&app, get("/pregnancy/danger-signs", &token)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert!(!body["danger_signs"].as_array().unwrap().is_empty());
}

// --- children ---

async fn create_child(app: &Router, token: &str, birth_date: &str) -> Child {
    let body = format!(r#"{{"name":"Amani","birth_date":"{birth_date}","gender":"female"}}"#);
    let resp = send(app, json_request("POST", "/children", token, &body)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    body_json(resp).await
}

#[tokio::test]
async fn new_child_gets_an_immunization_schedule() {
    let app = app();
    let token = session(&app, "a@example.com").await;
    let child = create_child(&app, &token, &days_ago(60)).await;
    assert_eq!(child.age_months, Some(2));

    let uri = format!("/children/{}/vaccinations", child.id);
    let vaccinations: Vec<Vaccination> = body_json(send(&app, get(&uri, &token)).await).await;
    assert_eq!(vaccinations.len(), 18);
    let bcg = &vaccinations[0];
    assert_eq!(bcg.vaccine_code.as_deref(), Some("BCG"));
    assert_eq!(bcg.status, "overdue");
    assert!(vaccinations.iter().any(|v| v.status == "pending"));
}

#[tokio::test]
async fn administering_a_vaccination_completes_it() {
    let app = app();
    let token = session(&app, "a@example.com").await;
    let child = create_child(&app, &token, &days_ago(10)).await;
    let uri = format!("/children/{}/vaccinations", child.id);
    let vaccinations: Vec<Vaccination> = body_json(send(&app, get(&uri, &token)).await).await;

    let uri = format!("/children/{}/vaccinations/{}", child.id, vaccinations[0].id);
    let body = format!(r#"{{"administered_date":"{}","batch_number":"B-12"}}"#, days_ago(1));
    let resp = send(&app, json_request("PUT", &uri, &token, &body)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Vaccination = body_json(resp).await;
    assert_eq!(updated.status, "completed");
    assert_eq!(updated.batch_number.as_deref(), Some("B-12"));
}

#[tokio::test]
async fn growth_record_derives_bmi_and_age() {
    let app = app();
    let token = session(&app, "a@example.com").await;
    let child = create_child(&app, &token, &days_ago(185)).await;
    let uri = format!("/children/{}/growth", child.id);
    let body = format!(r#"{{"recorded_date":"{}","weight":7.0,"height":66.0}}"#, days_ago(0));
    let resp = send(&app, json_request("POST", &uri, &token, &body)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let record: GrowthRecord = body_json(resp).await;
    assert_eq!(record.age_months, Some(6));
    assert_eq!(record.bmi, Some(16.07));
    assert!(record.weight_percentile.is_some());
}

#[tokio::test]
async fn milestones_are_ordered_by_typical_age() {
    let app = app();
    let token = session(&app, "a@example.com").await;
    let child = create_child(&app, &token, &days_ago(300)).await;
    let uri = format!("/children/{}/milestones", child.id);
    for (name, months) in [("Walks", 12), ("Smiles", 2)] {
        let body = format!(r#"{{"milestone_type":"motor","milestone_name":"{name}","typical_age_months":{months}}}"#);
        send(&app, json_request("POST", &uri, &token, &body)).await;
    }
    let milestones: Vec<Value> = body_json(send(&app, get(&uri, &token)).await).await;
    assert_eq!(milestones[0]["milestone_name"], "Smiles");
    assert_eq!(milestones[0]["is_achieved"], false);
}

#[tokio::test]
async fn other_users_children_are_invisible() {
    let app = app();
    let owner = session(&app, "a@example.com").await;
    let stranger = session(&app, "b@example.com").await;
    let child = create_child(&app, &owner, &days_ago(30)).await;

    let resp = send(&app, get(&format!("/children/{}", child.id), &stranger)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let error: Value = body_json(resp).await;
    assert_eq!(error["detail"], "Child not found");

    let children: Vec<Child> = body_json(send(&app, get("/children", &stranger)).await).await;
    assert!(children.is_empty());
}

#[tokio::test]
async fn deleting_a_child_removes_its_records() {
    let app = app();
    let token = session(&app, "a@example.com").await;
    let child = create_child(&app, &token, &days_ago(30)).await;
    let uri = format!("/children/{}", child.id);
    let resp = send(&app, request("DELETE", &uri, Some(&token), None)).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = send(&app, get(&format!("{uri}/vaccinations"), &token)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let resp = send(&app, request("DELETE", &uri, Some(&token), None)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- health ---

#[tokio::test]
async fn health_record_crud() {
    let app = app();
    let token = session(&app, "a@example.com").await;
    let body = r#"{"record_type":"symptom","title":"Headache","severity":"high","recorded_date":"2024-03-01"}"#;
    let resp = send(&app, json_request("POST", "/health/records", &token, body)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let created: Value = body_json(resp).await;
    let uri = format!("/health/records/{}", created["id"]);

    let resp = send(&app, json_request("PUT", &uri, &token, r#"{"outcome":"resolved"}"#)).await;
    let updated: Value = body_json(resp).await;
    assert_eq!(updated["outcome"], "resolved");
    assert_eq!(updated["title"], "Headache");

    let resp = send(&app, request("DELETE", &uri, Some(&token), None)).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = send(&app, get(&uri, &token)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn record_for_someone_elses_child_is_rejected() {
    let app = app();
    let owner = session(&app, "a@example.com").await;
    let stranger = session(&app, "b@example.com").await;
    let child = create_child(&app, &owner, &days_ago(30)).await;
    let body = format!(
        r#"{{"record_type":"illness","title":"Fever","recorded_date":"2024-03-01","child_id":{}}}"#,
        child.id
    );
    let resp = send(&app, json_request("POST", "/health/records", &stranger, &body)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn assessment_is_scored() {
    let app = app();
    let token = session(&app, "a@example.com").await;
    let body = r#"{"assessment_type":"epds","responses":{"q1":3,"q2":3,"q3":3,"q4":3,"q5":2},"assessment_date":"2024-03-01"}"#;
    let resp = send(&app, json_request("POST", "/health/mental-health", &token, body)).await;
    let assessment: Assessment = body_json(resp).await;
    assert_eq!(assessment.score, 14);
    assert_eq!(assessment.risk_level, "high");

    let uri = format!("/health/mental-health/{}", assessment.id);
    let body = r#"{"assessment_type":"epds","responses":{"q1":1},"assessment_date":"2024-03-02"}"#;
    let rescored: Assessment = body_json(send(&app, json_request("PUT", &uri, &token, body)).await).await;
    assert_eq!(rescored.score, 1);
    assert_eq!(rescored.risk_level, "low");
}

#[tokio::test]
async fn only_one_primary_contact() {
    let app = app();
    let token = session(&app, "a@example.com").await;
    for name in ["Zawadi", "Baraka"] {
        let body = format!(r#"{{"name":"{name}","phone":"+254700000000","is_primary":true}}"#);
        let resp = send(&app, json_request("POST", "/health/emergency-contacts", &token, &body)).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
    let body = r#"{"name":"Akinyi","phone":"+254711111111"}"#;
    send(&app, json_request("POST", "/health/emergency-contacts", &token, body)).await;

    let contacts: Vec<EmergencyContact> =
        body_json(send(&app, get("/health/emergency-contacts", &token)).await).await;
    let names: Vec<&str> = contacts.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Baraka", "Akinyi", "Zawadi"]);
    assert_eq!(contacts.iter().filter(|c| c.is_primary).count(), 1);
}

#[tokio::test]
async fn dashboard_summarizes_the_account() {
    let app = app();
    let token = session(&app, "a@example.com").await;
    create_child(&app, &token, &days_ago(60)).await;
    let body = r#"{"record_type":"checkup","title":"Clinic visit","recorded_date":"2024-03-01"}"#;
    send(&app, json_request("POST", "/health/records", &token, body)).await;

    let resp = send(&app, get("/dashboard", &token)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let dashboard: Dashboard = body_json(resp).await;
    assert_eq!(dashboard.user.email, "a@example.com");
    assert!(dashboard.active_pregnancy.is_none());
    assert_eq!(dashboard.children.len(), 1);
    assert_eq!(dashboard.recent_health_records.len(), 1);
    // Only the birth doses are more than 30 days late.
    assert_eq!(dashboard.overdue_vaccinations.len(), 2);
}

#[tokio::test]
async fn chatbot_answers_and_rejects_blank_queries() {
    let app = app();
    let token = session(&app, "a@example.com").await;
    let uri = "/chatbot?query=is+swelling+normal%3F";
    let resp = send(&app, request("POST", uri, Some(&token), None)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let reply: Value = body_json(resp).await;
    assert_eq!(reply["query"], "is swelling normal?");
    assert!(reply["response"].as_str().unwrap().contains("swelling"));
    assert!(reply["disclaimer"].as_str().unwrap().contains("educational"));

    let resp = send(&app, request("POST", "/chatbot?query=+", Some(&token), None)).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
