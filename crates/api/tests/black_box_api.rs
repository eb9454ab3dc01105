use reqwest::StatusCode;
use serde_json::{json, Value};

use tenderhub_api::config::Config;

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        Self::spawn_with(Config::default()).await
    }

    async fn spawn_with(config: Config) -> Self {
        // Same router as prod against the in-memory store, on an ephemeral port.
        let app = tenderhub_api::app::build_app(&config)
            .await
            .expect("failed to build app");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}/api", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let res = self.client.post(self.url(path)).json(&body).send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let res = self.client.get(self.url(path)).send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    async fn put(&self, path: &str) -> (StatusCode, Value) {
        let res = self.client.put(self.url(path)).send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    async fn patch(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let res = self.client.patch(self.url(path)).json(&body).send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    async fn user(&self, username: &str) -> String {
        let (status, body) = self
            .post(
                "/user/create",
                json!({ "username": username, "first_name": "Test", "last_name": "User" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["id"].as_str().unwrap().to_string()
    }

    async fn org(&self, name: &str) -> String {
        let (status, body) = self
            .post(
                "/org/create",
                json!({ "name": name, "description": "test org", "type": "LLC" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["id"].as_str().unwrap().to_string()
    }

    async fn grant(&self, org_id: &str, user_id: &str) {
        let (status, body) = self
            .post(
                "/orgresp/create",
                json!({ "organization_id": org_id, "user_id": user_id }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
    }

    async fn tender(&self, org_id: &str, creator: &str, name: &str, service_type: &str) -> Value {
        let (status, body) = self
            .post(
                "/tenders/new",
                json!({
                    "name": name,
                    "description": "pave the road",
                    "serviceType": service_type,
                    "organizationId": org_id,
                    "creatorUsername": creator,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[tokio::test]
async fn ping_answers_ok() {
    let srv = TestServer::spawn().await;

    let res = srv.client.get(srv.url("/ping")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let srv = TestServer::spawn().await;

    let res = srv.client.get(srv.url("/ping")).send().await.unwrap();
    let minted = res
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(uuid::Uuid::parse_str(&minted).is_ok(), "{minted}");

    let res = srv
        .client
        .get(srv.url("/user/not-a-uuid"))
        .header("x-request-id", "trace-42")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.headers()["x-request-id"], "trace-42");
}

#[tokio::test]
async fn users_are_created_once_per_username() {
    let srv = TestServer::spawn().await;

    let id = srv.user("ada").await;
    let (status, body) = srv.get(&format!("/user/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "ada");

    let (status, body) = srv
        .post("/user/create", json!({ "username": "ada" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User already exists");
}

#[tokio::test]
async fn malformed_ids_and_bodies_are_bad_requests() {
    let srv = TestServer::spawn().await;

    let (status, body) = srv.get("/user/not-a-uuid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, body) = srv
        .post("/org/create", json!({ "name": "Acme", "type": "Partnership" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid request");

    let (status, _) = srv.get("/tenders?service_type=Catering").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn responsibility_requires_existing_ends_and_is_unique() {
    let srv = TestServer::spawn().await;
    let user_id = srv.user("ada").await;
    let org_id = srv.org("Acme").await;

    let (status, body) = srv
        .post(
            "/orgresp/create",
            json!({ "organization_id": org_id, "user_id": user_id }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let resp_id = body["id"].as_str().unwrap().to_string();

    let (status, body) = srv.get(&format!("/orgresp/{resp_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["organization_id"], org_id.as_str());

    let (status, _) = srv
        .post(
            "/orgresp/create",
            json!({ "organization_id": org_id, "user_id": user_id }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = srv
        .post(
            "/orgresp/create",
            json!({ "organization_id": uuid::Uuid::now_v7(), "user_id": user_id }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn tender_publish_flow_is_guarded_by_responsibility() {
    let srv = TestServer::spawn().await;
    let ada = srv.user("ada").await;
    srv.user("mallory").await;
    let org = srv.org("Acme").await;
    srv.grant(&org, &ada).await;

    let tender = srv.tender(&org, "ada", "Road", "Construction").await;
    assert_eq!(tender["status"], "Created");
    assert_eq!(tender["version"], 1);
    let id = tender["id"].as_str().unwrap().to_string();

    // Unpublished: only the responsible user may read the status.
    let (status, _) = srv.get(&format!("/tenders/{id}/status?username=mallory")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = srv
        .put(&format!("/tenders/{id}/status?status=Published&username=ada"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Published");
    assert_eq!(body["version"], 2);

    let (status, body) = srv.get(&format!("/tenders/{id}/status?username=mallory")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Published");

    let (status, body) = srv
        .put(&format!("/tenders/{id}/status?status=Closed&username=mallory"))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Forbidden");

    let (status, body) = srv
        .patch(
            &format!("/tenders/{id}/edit?username=ada"),
            json!({ "description": "pave it twice" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], 3);
    assert_eq!(body["name"], "Road");
    assert_eq!(body["description"], "pave it twice");
}

#[tokio::test]
async fn unknown_requester_is_unauthorized() {
    let srv = TestServer::spawn().await;
    let org = srv.org("Acme").await;

    let (status, body) = srv
        .post(
            "/tenders/new",
            json!({
                "name": "Road",
                "description": "pave",
                "serviceType": "Construction",
                "organizationId": org,
                "creatorUsername": "ghost",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "User not found");

    let (status, _) = srv.get("/tenders/my?username=ghost").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn creating_a_tender_needs_responsibility_for_the_organization() {
    let srv = TestServer::spawn().await;
    let ada = srv.user("ada").await;
    let acme = srv.org("Acme").await;
    let globex = srv.org("Globex").await;
    srv.grant(&acme, &ada).await;

    let (status, _) = srv
        .post(
            "/tenders/new",
            json!({
                "name": "Road",
                "description": "pave",
                "serviceType": "Construction",
                "organizationId": globex,
                "creatorUsername": "ada",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn tender_listing_pages_each_service_type() {
    let srv = TestServer::spawn().await;
    let ada = srv.user("ada").await;
    let org = srv.org("Acme").await;
    srv.grant(&org, &ada).await;

    for name in ["c1", "c2", "c3"] {
        srv.tender(&org, "ada", name, "Construction").await;
    }
    for name in ["d1", "d2", "d3"] {
        srv.tender(&org, "ada", name, "Delivery").await;
    }

    let (status, body) = srv
        .get("/tenders?service_type=Delivery&service_type=Construction&limit=2")
        .await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["d1", "d2", "c1", "c2"]);

    let (_, body) = srv.get("/tenders?limit=0").await;
    assert_eq!(body.as_array().unwrap().len(), 5);

    let (_, body) = srv.get("/tenders?offset=100").await;
    assert!(body.as_array().unwrap().is_empty());

    let (status, body) = srv.get("/tenders/my?username=ada&limit=50").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn bid_lifecycle_create_edit_and_status() {
    let srv = TestServer::spawn().await;
    let ada = srv.user("ada").await;
    let bob = srv.user("bob").await;
    srv.user("mallory").await;
    let org = srv.org("Acme").await;
    srv.grant(&org, &ada).await;

    let tender = srv.tender(&org, "ada", "Road", "Construction").await;
    let tender_id = tender["id"].as_str().unwrap().to_string();

    let (status, bid) = srv
        .post(
            "/bids/new",
            json!({
                "name": "Cheap",
                "description": "two weeks",
                "tenderId": tender_id,
                "authorType": "User",
                "authorId": bob,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{bid}");
    assert_eq!(bid["status"], "Created");
    assert_eq!(bid["version"], 1);
    assert_eq!(bid["authorId"], bob.as_str());
    let bid_id = bid["id"].as_str().unwrap().to_string();

    let (status, body) = srv
        .patch(&format!("/bids/{bid_id}/edit?username=ada"), json!({ "name": "X" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], 2);
    assert_eq!(body["name"], "X");
    assert_eq!(body["description"], "two weeks");

    let (status, _) = srv.get(&format!("/bids/{bid_id}/status?username=mallory")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = srv
        .put(&format!("/bids/{bid_id}/status?status=Published&username=ada"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], 3);

    let (status, body) = srv.get(&format!("/bids/{bid_id}/status?username=ada")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Published");

    let (status, body) = srv.get("/bids/my?username=bob").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = srv
        .get(&format!("/bids/{tender_id}/list?username=bob"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (_, body) = srv
        .get(&format!("/bids/{tender_id}/list?username=ada"))
        .await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn bid_on_missing_tender_or_author_is_rejected() {
    let srv = TestServer::spawn().await;
    let bob = srv.user("bob").await;

    let (status, body) = srv
        .post(
            "/bids/new",
            json!({
                "name": "Cheap",
                "description": "two weeks",
                "tenderId": uuid::Uuid::now_v7(),
                "authorType": "User",
                "authorId": bob,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Tender not found");

    let (status, _) = srv
        .post(
            "/bids/new",
            json!({
                "name": "Cheap",
                "description": "two weeks",
                "tenderId": uuid::Uuid::now_v7(),
                "authorType": "User",
                "authorId": uuid::Uuid::now_v7(),
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, body) = srv.get("/bids/my?username=bob").await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn strict_transitions_reject_reopening() {
    let mut config = Config::default();
    config.lifecycle.strict_transitions = true;
    let srv = TestServer::spawn_with(config).await;

    let ada = srv.user("ada").await;
    let org = srv.org("Acme").await;
    srv.grant(&org, &ada).await;
    let id = srv.tender(&org, "ada", "Road", "Construction").await["id"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, _) = srv
        .put(&format!("/tenders/{id}/status?status=Closed&username=ada"))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = srv
        .put(&format!("/tenders/{id}/status?status=Published&username=ada"))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "invariant_violation");
}
