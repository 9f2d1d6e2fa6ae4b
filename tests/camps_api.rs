use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use camp_api::migration::sample_camps;
use camp_api::model::Camp;
use camp_api::{app, AppError, AppState, CampRepository, ChangeSet, InMemoryCampRepository};
use chrono::NaiveDate;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const BODY_LIMIT: usize = 64 * 1024;

fn router_with(repo: Arc<dyn CampRepository>) -> Router {
    app(AppState::new(repo), BODY_LIMIT)
}

fn empty_app() -> Router {
    router_with(Arc::new(InMemoryCampRepository::new()))
}

fn seeded_app() -> Router {
    router_with(Arc::new(InMemoryCampRepository::with_camps(sample_camps())))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, HeaderMap, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            req = req.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, headers, json)
}

fn atl_payload() -> Value {
    json!({ "moniker": "ATL2018", "name": "Atlanta Code Camp", "length": 3 })
}

#[tokio::test]
async fn create_returns_201_with_location_then_duplicate_is_400() {
    let app = empty_app();
    let (status, headers, body) = send(&app, Method::POST, "/api/camps", Some(atl_payload())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(headers[header::LOCATION], "/api/camps/ATL2018");
    assert_eq!(body["moniker"], "ATL2018");
    assert_eq!(body["name"], "Atlanta Code Camp");
    assert_eq!(body["length"], 3);
    assert!(body["campId"].as_i64().unwrap() > 0);

    let (status, _, body) = send(&app, Method::POST, "/api/camps", Some(json!({
        "moniker": "ATL2018", "name": "Someone Else", "length": 9
    })))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "conflict");

    let (_, _, stored) = send(&app, Method::GET, "/api/camps/ATL2018", None).await;
    assert_eq!(stored["name"], "Atlanta Code Camp");
    assert_eq!(stored["length"], 3);
}

#[tokio::test]
async fn create_then_get_round_trips() {
    let app = empty_app();
    let payload = json!({
        "moniker": "NYC2019",
        "name": "New York Code Camp",
        "eventDate": "2019-04-06T00:00:00",
        "length": 2,
        "locationVenue": "Javits Center",
        "locationCityTown": "New York",
        "locationCountry": "USA"
    });
    let (status, _, created) = send(&app, Method::POST, "/api/camps", Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _, fetched) = send(&app, Method::GET, "/api/camps/NYC2019", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
    assert_eq!(fetched["eventDate"], "2019-04-06T00:00:00");
    assert_eq!(fetched["locationVenue"], "Javits Center");
    assert_eq!(fetched["locationAddress1"], Value::Null);
}

#[tokio::test]
async fn create_rejects_invalid_payloads() {
    let app = empty_app();
    let cases = [
        json!({ "name": "No Moniker" }),
        json!({ "moniker": "X1" }),
        json!({ "moniker": "X1", "name": "n".repeat(101) }),
        json!({ "moniker": "X1", "name": "Camp", "length": 0 }),
        json!({ "moniker": "X1", "name": "Camp", "length": 101 }),
        json!({ "moniker": "X1", "name": "Camp", "eventDate": "soon" }),
    ];
    for payload in cases {
        let (status, _, _) = send(&app, Method::POST, "/api/camps", Some(payload.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {}", payload);
    }
    let (_, _, all) = send(&app, Method::GET, "/api/camps", None).await;
    assert_eq!(all, json!([]));
}

#[tokio::test]
async fn create_rejects_malformed_json() {
    let app = empty_app();
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/camps")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_rejects_unroutable_moniker() {
    let app = empty_app();
    for moniker in ["ATL 2018", "search", "a/b"] {
        let (status, _, _) = send(&app, Method::POST, "/api/camps", Some(json!({ "moniker": moniker, "name": "Camp" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "moniker {:?}", moniker);
    }
}

#[tokio::test]
async fn list_honors_include_talks() {
    let app = seeded_app();
    let (status, _, without) = send(&app, Method::GET, "/api/camps", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(without.as_array().unwrap().len(), 1);
    assert_eq!(without[0]["talks"], json!([]));

    let (_, _, with) = send(&app, Method::GET, "/api/camps?includeTalks=true", None).await;
    let talks = with[0]["talks"].as_array().unwrap();
    assert_eq!(talks.len(), 2);
    assert_eq!(talks[0]["title"], "Entity Framework From Scratch");
    assert_eq!(talks[0]["speaker"]["lastName"], "Wildermuth");
}

#[tokio::test]
async fn list_on_empty_store_is_empty_array() {
    let (status, _, body) = send(&empty_app(), Method::GET, "/api/camps", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn get_unknown_moniker_is_404() {
    let (status, _, body) = send(&seeded_app(), Method::GET, "/api/camps/NOPE", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn search_matches_exact_date() {
    let app = seeded_app();
    send(&app, Method::POST, "/api/camps", Some(json!({
        "moniker": "ATL2018B", "name": "Atlanta Day Two", "eventDate": "2018-10-19"
    })))
    .await;

    let (status, _, body) = send(&app, Method::GET, "/api/camps/search?theDate=2018-10-18", None).await;
    assert_eq!(status, StatusCode::OK);
    let monikers: Vec<&str> = body.as_array().unwrap().iter().map(|c| c["moniker"].as_str().unwrap()).collect();
    assert_eq!(monikers, vec!["ATL2018"]);
    assert_eq!(body[0]["talks"], json!([]));

    let (_, _, body) = send(&app, Method::GET, "/api/camps/search?theDate=2018-10-18T00:00:00&includeTalks=true", None).await;
    assert_eq!(body[0]["talks"].as_array().unwrap().len(), 2);

    let (status, _, _) = send(&app, Method::GET, "/api/camps/search?theDate=2018-10-20", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn search_requires_a_valid_date() {
    let app = seeded_app();
    let (status, _, _) = send(&app, Method::GET, "/api/camps/search", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _, _) = send(&app, Method::GET, "/api/camps/search?theDate=yesterday", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_overlays_fields_and_keeps_absent_location_data() {
    let app = seeded_app();
    let (status, _, body) = send(&app, Method::PUT, "/api/camps/ATL2018", Some(json!({
        "moniker": "ATL2018",
        "name": "Atlanta Code Camp 2018",
        "eventDate": "2018-10-18",
        "length": 2,
        "locationVenue": "Georgia World Congress Center"
    })))
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Atlanta Code Camp 2018");
    assert_eq!(body["length"], 2);
    assert_eq!(body["locationVenue"], "Georgia World Congress Center");
    assert_eq!(body["locationCityTown"], "Atlanta");

    let (_, _, talks) = send(&app, Method::GET, "/api/camps/ATL2018/talks", None).await;
    assert_eq!(talks.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn update_with_identical_payload_is_400() {
    let app = seeded_app();
    let (_, _, current) = send(&app, Method::GET, "/api/camps/ATL2018", None).await;
    let (status, _, _) = send(&app, Method::PUT, "/api/camps/ATL2018", Some(current)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_unknown_moniker_is_404_and_changes_nothing() {
    let app = seeded_app();
    let (status, _, _) = send(&app, Method::PUT, "/api/camps/NOPE", Some(atl_payload())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, _, all) = send(&app, Method::GET, "/api/camps", None).await;
    assert_eq!(all.as_array().unwrap().len(), 1);
    assert_eq!(all[0]["name"], "Atlanta Code Camp");
}

#[tokio::test]
async fn update_to_taken_moniker_is_400() {
    let app = seeded_app();
    send(&app, Method::POST, "/api/camps", Some(json!({ "moniker": "SEA2019", "name": "Seattle" }))).await;
    let (status, _, _) = send(&app, Method::PUT, "/api/camps/SEA2019", Some(json!({ "moniker": "ATL2018", "name": "Seattle" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_to_unroutable_moniker_is_400_and_camp_stays_reachable() {
    let app = seeded_app();
    for moniker in ["search", "a b/c", ".."] {
        let (status, _, _) =
            send(&app, Method::PUT, "/api/camps/ATL2018", Some(json!({ "moniker": moniker, "name": "Atlanta" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "moniker {:?}", moniker);
    }
    let (status, _, camp) = send(&app, Method::GET, "/api/camps/ATL2018", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(camp["name"], "Atlanta Code Camp");
    let (status, _, _) = send(&app, Method::DELETE, "/api/camps/ATL2018", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn include_talks_flag_ignores_letter_case() {
    let app = seeded_app();
    let (status, _, with) = send(&app, Method::GET, "/api/camps?includeTalks=True", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(with[0]["talks"].as_array().unwrap().len(), 2);

    let (status, _, camp) = send(&app, Method::GET, "/api/camps/ATL2018?includeTalks=FALSE", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(camp["talks"], json!([]));

    let (status, _, _) = send(&app, Method::GET, "/api/camps?includeTalks=maybe", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_removes_camp() {
    let app = seeded_app();
    let (status, _, body) = send(&app, Method::DELETE, "/api/camps/ATL2018", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);
    let (status, _, _) = send(&app, Method::GET, "/api/camps/ATL2018", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _, _) = send(&app, Method::DELETE, "/api/camps/ATL2018", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn talks_are_readable_per_camp() {
    let app = seeded_app();
    let (status, _, talks) = send(&app, Method::GET, "/api/camps/ATL2018/talks", None).await;
    assert_eq!(status, StatusCode::OK);
    let id = talks[1]["talkId"].as_i64().unwrap();

    let (status, _, talk) = send(&app, Method::GET, &format!("/api/camps/ATL2018/talks/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(talk["title"], "Writing Sample Data Made Easy");
    assert_eq!(talk["abstract"], "Thinking of good sample data examples is tiring.");

    let (status, _, _) = send(&app, Method::GET, "/api/camps/ATL2018/talks/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _, _) = send(&app, Method::GET, "/api/camps/NOPE/talks", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// Repository whose every call fails the way an unreachable database does.
struct FailingRepository;

#[async_trait]
impl CampRepository for FailingRepository {
    async fn all_camps(&self, _include_talks: bool) -> Result<Vec<Camp>, AppError> {
        Err(AppError::Db(sqlx::Error::PoolTimedOut))
    }

    async fn camp_by_moniker(&self, _moniker: &str, _include_talks: bool) -> Result<Option<Camp>, AppError> {
        Err(AppError::Db(sqlx::Error::PoolTimedOut))
    }

    async fn camps_by_event_date(&self, _date: NaiveDate, _include_talks: bool) -> Result<Vec<Camp>, AppError> {
        Err(AppError::Db(sqlx::Error::PoolTimedOut))
    }

    async fn save_changes(&self, _changes: &mut ChangeSet) -> Result<bool, AppError> {
        Err(AppError::Db(sqlx::Error::PoolTimedOut))
    }

    async fn ping(&self) -> Result<(), AppError> {
        Err(AppError::Db(sqlx::Error::PoolTimedOut))
    }
}

#[tokio::test]
async fn store_failures_are_500_with_generic_message() {
    let app = router_with(Arc::new(FailingRepository));
    let requests = [
        (Method::GET, "/api/camps", None),
        (Method::GET, "/api/camps/ATL2018", None),
        (Method::GET, "/api/camps/search?theDate=2018-10-18", None),
        (Method::POST, "/api/camps", Some(atl_payload())),
        (Method::PUT, "/api/camps/ATL2018", Some(atl_payload())),
        (Method::DELETE, "/api/camps/ATL2018", None),
    ];
    for (method, uri, body) in requests {
        let (status, _, body) = send(&app, method.clone(), uri, body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{} {}", method, uri);
        assert_eq!(body["error"]["message"], camp_api::error::STORE_FAILURE_MESSAGE);
        assert!(!body.to_string().contains("pool"));
    }
}

#[tokio::test]
async fn readiness_reflects_store() {
    let (status, _, body) = send(&seeded_app(), Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["store"], "ok");

    let failing = router_with(Arc::new(FailingRepository));
    let (status, _, body) = send(&failing, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");

    let (status, _, _) = send(&failing, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let (status, _, doc) = send(&empty_app(), Method::GET, "/api/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"].get("/api/camps/{moniker}/talks").is_some());
}
