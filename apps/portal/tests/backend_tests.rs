//! End-to-end tests against an in-process mock backend.
//!
//! Each test binds an axum router on an ephemeral port and drives the portal
//! through `AppContext`, the same way the CLI does.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, patch, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};

use portal::api_client::JobsApi;
use portal::auth::otp_flow::{FlowKind, OtpStep};
use portal::auth::password_login;
use portal::config::Config;
use portal::errors::AppError;
use portal::models::account::{ApprovalStatus, NewStaff};
use portal::models::{JobDraft, JobId, JobStatus, Role};
use portal::notifications::Level;
use portal::state::{AppContext, Navigation};

const GOOD_CODE: &str = "12345";
const STAFF_PASSWORD: &str = "correct horse";
const RESET_TOKEN: &str = "rt-1";
const CREATED_AT: &str = "2024-05-01T09:00:00Z";

#[derive(Default)]
struct Backend {
    jobs: Value,
    auth_headers: Mutex<Vec<String>>,
    saved: Mutex<HashSet<String>>,
    applied: Mutex<HashSet<String>>,
    /// Passwords accepted by `/auth/login` besides `STAFF_PASSWORD`.
    passwords: Mutex<Vec<String>>,
    posted: Mutex<Vec<Value>>,
    clients: Mutex<Vec<Value>>,
    /// `METHOD path detail` for every staff-side call.
    calls: Mutex<Vec<String>>,
}

impl Backend {
    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

type Shared = Arc<Backend>;

fn job(id: &str, title: &str, salary: (u64, u64)) -> Value {
    json!({
        "_id": id,
        "title": title,
        "organization": "Acme",
        "location": "Remote",
        "salaryMin": salary.0,
        "salaryMax": salary.1,
        "experienceMin": 1,
        "experienceMax": 3,
        "jobType": "full-time",
        "status": "active",
        "createdAt": "2024-05-01T09:00:00Z"
    })
}

fn relation(id: &str, saved: bool, applied: bool) -> Value {
    json!({ "candidateId": "u1", "jobId": id, "saved": saved, "applied": applied })
}

fn record_auth(state: &Backend, headers: &HeaderMap) {
    let value = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    state.auth_headers.lock().unwrap().push(value);
}

async fn list_jobs(State(state): State<Shared>) -> Json<Value> {
    Json(json!({ "data": state.jobs, "message": "ok" }))
}

async fn job_detail(
    State(state): State<Shared>,
    Path(id): Path<String>,
) -> (StatusCode, Json<Value>) {
    let found = state
        .jobs
        .as_array()
        .and_then(|jobs| jobs.iter().find(|j| j["_id"] == id.as_str()))
        .cloned();
    match found {
        Some(job) => (StatusCode::OK, Json(json!({ "data": job }))),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Job not found" })),
        ),
    }
}

async fn send_otp(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["email"].as_str().is_some_and(|e| e.contains('@')) {
        (StatusCode::OK, Json(json!({ "data": null, "message": "OTP sent" })))
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "Email is required" })),
        )
    }
}

async fn verify_otp(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["otp"] != GOOD_CODE {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "Invalid OTP" })),
        );
    }
    let session = json!({
        "role": "candidate",
        "token": "tok-123",
        "userId": "u1",
        "email": body["email"],
        "firstName": "Ada",
        "lastName": "Lovelace"
    });
    (StatusCode::OK, Json(json!({ "data": session })))
}

async fn relations(State(state): State<Shared>, headers: HeaderMap) -> Json<Value> {
    record_auth(&state, &headers);
    let saved = state.saved.lock().unwrap().clone();
    let applied = state.applied.lock().unwrap().clone();
    let data: Vec<Value> = saved
        .union(&applied)
        .map(|id| relation(id, saved.contains(id), applied.contains(id)))
        .collect();
    Json(json!({ "data": data }))
}

async fn save(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> (StatusCode, Json<Value>) {
    record_auth(&state, &headers);
    if id == "LOCKED" {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Could not save job" })),
        );
    }
    state.saved.lock().unwrap().insert(id.clone());
    (StatusCode::OK, Json(json!({ "data": relation(&id, true, false) })))
}

async fn unsave(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> StatusCode {
    record_auth(&state, &headers);
    state.saved.lock().unwrap().remove(&id);
    StatusCode::NO_CONTENT
}

async fn apply(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Json<Value> {
    record_auth(&state, &headers);
    state.applied.lock().unwrap().insert(id.clone());
    let saved = state.saved.lock().unwrap().contains(&id);
    Json(json!({ "data": relation(&id, saved, true) }))
}

async fn login(
    State(state): State<Shared>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let password = body["password"].as_str().unwrap_or_default();
    let known = password == STAFF_PASSWORD
        || state.passwords.lock().unwrap().iter().any(|p| p == password);
    if !known {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid credentials" })),
        );
    }
    let role = body["role"].as_str().unwrap_or_default();
    let session = json!({
        "role": role,
        "token": format!("{role}-token"),
        "userId": format!("u-{role}"),
        "email": body["email"],
        "firstName": "Grace",
        "lastName": "Hopper"
    });
    (StatusCode::OK, Json(json!({ "data": session })))
}

async fn reset_send(
    State(state): State<Shared>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.record(format!("POST /auth/password-reset/send role={}", body["role"]));
    (StatusCode::OK, Json(json!({ "message": "Code sent" })))
}

async fn reset_verify(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["otp"] != GOOD_CODE || body["role"].is_null() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "Invalid OTP" })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({ "data": { "resetToken": RESET_TOKEN } })),
    )
}

async fn reset_update(
    State(state): State<Shared>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if body["resetToken"] != RESET_TOKEN {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "Reset token expired" })),
        );
    }
    let password = body["password"].as_str().unwrap_or_default().to_string();
    state.passwords.lock().unwrap().push(password);
    (StatusCode::OK, Json(json!({ "message": "Password updated" })))
}

async fn own_jobs(State(state): State<Shared>, headers: HeaderMap) -> Json<Value> {
    record_auth(&state, &headers);
    let posted = state.posted.lock().unwrap().clone();
    Json(json!({ "data": posted }))
}

async fn create_posting(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(draft): Json<Value>,
) -> Json<Value> {
    record_auth(&state, &headers);
    let mut created = json!({
        "_id": format!("P{}", state.posted.lock().unwrap().len() + 1),
        "title": draft["title"],
        "description": draft["description"],
        "organization": "Acme",
        "location": draft["location"],
        "salaryMin": draft["salaryMin"],
        "salaryMax": draft["salaryMax"],
        "experienceMin": draft["experienceMin"],
        "experienceMax": draft["experienceMax"],
        "jobType": draft["jobType"],
        "status": "drafted",
        "createdAt": CREATED_AT
    });
    if draft["title"] == "Inverted" {
        created["salaryMin"] = json!(3000);
        created["salaryMax"] = json!(10);
    }
    state.posted.lock().unwrap().push(created.clone());
    Json(json!({ "data": created }))
}

fn update_posted(
    state: &Backend,
    id: &str,
    edit: impl FnOnce(&mut Value),
) -> (StatusCode, Json<Value>) {
    let mut posted = state.posted.lock().unwrap();
    match posted.iter_mut().find(|j| j["_id"] == id) {
        Some(job) => {
            edit(job);
            (StatusCode::OK, Json(json!({ "data": job.clone() })))
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Job not found" })),
        ),
    }
}

async fn update_posting(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Json(draft): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.record(format!("PUT /client/jobs/{id}"));
    update_posted(&state, &id, |job| job["title"] = draft["title"].clone())
}

async fn posting_status(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.record(format!("PATCH /client/jobs/{id}/status {}", body["status"]));
    update_posted(&state, &id, |job| job["status"] = body["status"].clone())
}

async fn admin_clients(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    record_auth(&state, &headers);
    let approval = query.get("approval").cloned().unwrap_or_default();
    state.record(format!("GET /admin/clients approval={approval}"));
    let clients: Vec<Value> = state
        .clients
        .lock()
        .unwrap()
        .iter()
        .filter(|c| approval.is_empty() || c["approval"] == approval.as_str())
        .cloned()
        .collect();
    Json(json!({ "data": clients }))
}

async fn client_approval(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.record(format!("PATCH /admin/clients/{id}/approval approved={}", body["approved"]));
    let decision = if body["approved"] == true { "approved" } else { "rejected" };
    let mut clients = state.clients.lock().unwrap();
    match clients.iter_mut().find(|c| c["_id"] == id.as_str()) {
        Some(client) => {
            client["approval"] = json!(decision);
            (StatusCode::OK, Json(json!({ "data": client.clone() })))
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Client not found" })),
        ),
    }
}

async fn delete_client(State(state): State<Shared>, Path(id): Path<String>) -> StatusCode {
    state.record(format!("DELETE /admin/clients/{id}"));
    state.clients.lock().unwrap().retain(|c| c["_id"] != id.as_str());
    StatusCode::NO_CONTENT
}

async fn admin_candidates() -> Json<Value> {
    Json(json!({ "data": [{
        "_id": "U1",
        "email": "ada@example.com",
        "firstName": "Ada",
        "lastName": "Lovelace",
        "createdAt": CREATED_AT
    }] }))
}

async fn delete_candidate(State(state): State<Shared>, Path(id): Path<String>) -> StatusCode {
    state.record(format!("DELETE /admin/candidates/{id}"));
    StatusCode::NO_CONTENT
}

async fn job_approval(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.record(format!("PATCH /admin/jobs/{id}/approval approved={}", body["approved"]));
    job_detail(State(state), Path(id)).await
}

async fn create_staff(
    State(state): State<Shared>,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.record(format!("POST /admin/staff role={}", body["role"]));
    Json(json!({ "data": {
        "_id": "S1",
        "email": body["email"],
        "firstName": body["firstName"],
        "lastName": body["lastName"],
        "role": body["role"]
    } }))
}

async fn delete_staff(State(state): State<Shared>, Path(id): Path<String>) -> StatusCode {
    state.record(format!("DELETE /admin/staff/{id}"));
    StatusCode::NO_CONTENT
}

async fn spawn_backend(jobs: Value) -> (String, Shared) {
    let state = Arc::new(Backend {
        jobs,
        clients: Mutex::new(vec![
            json!({ "_id": "C1", "name": "Acme", "email": "hr@acme.io",
                    "approval": "pending", "createdAt": CREATED_AT }),
            json!({ "_id": "C2", "name": "Globex", "email": "hr@globex.io",
                    "approval": "approved", "createdAt": CREATED_AT }),
        ]),
        ..Backend::default()
    });
    let app = Router::new()
        .route("/jobs", get(list_jobs))
        .route("/jobs/:id", get(job_detail))
        .route("/candidate/otp/send", post(send_otp))
        .route("/candidate/otp/verify", post(verify_otp))
        .route("/candidate/relations", get(relations))
        .route("/candidate/jobs/:id/save", post(save).delete(unsave))
        .route("/candidate/jobs/:id/apply", post(apply))
        .route("/auth/login", post(login))
        .route("/auth/password-reset/send", post(reset_send))
        .route("/auth/password-reset/verify", post(reset_verify))
        .route("/auth/password-reset/update", post(reset_update))
        .route("/client/jobs", get(own_jobs).post(create_posting))
        .route("/client/jobs/:id", put(update_posting))
        .route("/client/jobs/:id/status", patch(posting_status))
        .route("/admin/clients", get(admin_clients))
        .route("/admin/clients/:id", delete(delete_client))
        .route("/admin/clients/:id/approval", patch(client_approval))
        .route("/admin/candidates", get(admin_candidates))
        .route("/admin/candidates/:id", delete(delete_candidate))
        .route("/admin/jobs/:id/approval", patch(job_approval))
        .route("/admin/staff", post(create_staff))
        .route("/admin/staff/:id", delete(delete_staff))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), state)
}

fn default_jobs() -> Value {
    json!([
        job("J1", "Backend Engineer", (500, 1000)),
        job("J2", "Frontend Engineer", (2000, 3000)),
        job("LOCKED", "Platform Engineer", (800, 1200)),
    ])
}

async fn staff_signed_in(base: &str, role: Role, password: &str) -> AppContext {
    let ctx = AppContext::connect(Config::for_api(base));
    password_login(
        ctx.auth.as_ref(),
        &ctx.session,
        &ctx.notifications,
        "grace@acme.io",
        password,
        role,
        None,
    )
    .await
    .unwrap();
    ctx
}

fn draft(title: &str) -> JobDraft {
    JobDraft {
        title: title.to_string(),
        description: "<p>Ship the platform</p>".to_string(),
        location: "Pune".to_string(),
        salary_min: 1500,
        salary_max: 2500,
        experience_min: 2,
        experience_max: 4,
        job_type: "full-time".to_string(),
        logo_url: None,
        posted_at: None,
        closes_at: None,
    }
}

async fn signed_in(base: &str) -> AppContext {
    let ctx = AppContext::connect(Config::for_api(base));
    let mut flow = ctx.login_flow(None);
    flow.submit_identifier("ada@example.com").await.unwrap();
    flow.submit_code(GOOD_CODE).await.unwrap();
    ctx
}

#[tokio::test]
async fn test_anonymous_feed_loads_without_relations() {
    let (base, backend) = spawn_backend(default_jobs()).await;
    let ctx = AppContext::connect(Config::for_api(&base));

    assert_eq!(ctx.refresh_feed().await.unwrap(), 3);
    let feed = ctx.feed.lock().unwrap();
    assert_eq!(feed.salary_bounds().max, 3000);
    assert!(feed.page().items.iter().all(|i| !i.bookmarked));
    assert!(backend.auth_headers.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_otp_login_then_bearer_on_candidate_calls() {
    let (base, backend) = spawn_backend(default_jobs()).await;
    let ctx = AppContext::connect(Config::for_api(&base));

    let mut flow = ctx.login_flow(Some("/jobs/J2".to_string()));
    flow.submit_identifier("ada@example.com").await.unwrap();
    assert_eq!(flow.step(), OtpStep::OtpSent);
    let nav = flow.submit_code(GOOD_CODE).await.unwrap();
    assert_eq!(nav, Some(Navigation("/jobs/J2".to_string())));
    assert_eq!(ctx.session.current().unwrap().role, Role::Candidate);

    ctx.refresh_feed().await.unwrap();
    assert_eq!(
        *backend.auth_headers.lock().unwrap(),
        vec!["Bearer tok-123".to_string()]
    );
}

#[tokio::test]
async fn test_rejected_code_surfaces_backend_message() {
    let (base, _) = spawn_backend(default_jobs()).await;
    let ctx = AppContext::connect(Config::for_api(&base));

    let mut flow = ctx.login_flow(None);
    flow.submit_identifier("ada@example.com").await.unwrap();
    let err = flow.submit_code("54321").await.unwrap_err();
    assert!(matches!(err, AppError::Remote { status: 400, .. }));
    assert_eq!(flow.step(), OtpStep::OtpSent);
    assert!(!ctx.session.is_authenticated());

    let last = ctx.notifications.last().unwrap();
    assert_eq!(last.level, Level::Error);
    assert_eq!(last.message, "Invalid OTP");
}

#[tokio::test]
async fn test_bookmark_round_trip_and_failed_save_reverts() {
    let (base, backend) = spawn_backend(default_jobs()).await;
    let ctx = signed_in(&base).await;
    ctx.refresh_feed().await.unwrap();
    let bookmarks = ctx.bookmarks();

    assert!(bookmarks.toggle(&JobId::from("J1")).await.unwrap());
    assert!(backend.saved.lock().unwrap().contains("J1"));
    assert!(!bookmarks.toggle(&JobId::from("J1")).await.unwrap());
    assert!(backend.saved.lock().unwrap().is_empty());

    let err = bookmarks.toggle(&JobId::from("LOCKED")).await.unwrap_err();
    assert!(err.is_remote());
    assert!(!ctx.feed.lock().unwrap().is_bookmarked(&JobId::from("LOCKED")));
    assert_eq!(ctx.notifications.last().unwrap().message, "Could not save job");
}

#[tokio::test]
async fn test_apply_marks_job_and_survives_refresh() {
    let (base, _) = spawn_backend(default_jobs()).await;
    let ctx = signed_in(&base).await;
    ctx.refresh_feed().await.unwrap();

    let rel = ctx.applications().apply(&JobId::from("J2")).await.unwrap();
    assert!(rel.applied);

    ctx.refresh_feed().await.unwrap();
    let feed = ctx.feed.lock().unwrap();
    let applied: Vec<_> = feed
        .page()
        .items
        .iter()
        .filter(|i| i.applied)
        .map(|i| i.job.id.clone())
        .collect();
    assert_eq!(applied, vec![JobId::from("J2")]);
}

#[tokio::test]
async fn test_invalid_job_rejects_whole_payload() {
    let (base, _) = spawn_backend(json!([
        job("J1", "Backend Engineer", (500, 1000)),
        job("BAD", "Broken", (3000, 1000)),
    ]))
    .await;
    let ctx = AppContext::connect(Config::for_api(&base));

    let err = ctx.refresh_feed().await.unwrap_err();
    assert!(matches!(err, AppError::Parse { ref endpoint, .. } if endpoint == "/jobs"));
    assert!(ctx.feed.lock().unwrap().jobs().is_empty());
}

#[tokio::test]
async fn test_job_detail_not_found_is_remote() {
    let (base, _) = spawn_backend(default_jobs()).await;
    let ctx = AppContext::connect(Config::for_api(&base));

    let job = ctx.jobs.job_detail(&JobId::from("J2")).await.unwrap();
    assert_eq!(job.title, "Frontend Engineer");
    let err = ctx.jobs.job_detail(&JobId::from("nope")).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Remote { status: 404, ref message } if message == "Job not found"
    ));
}

#[tokio::test]
async fn test_password_reset_then_login_with_new_password() {
    let (base, backend) = spawn_backend(default_jobs()).await;
    let ctx = AppContext::connect(Config::for_api(&base));

    let mut flow = ctx.otp_flow(FlowKind::PasswordReset(Role::Client), None);
    flow.submit_identifier("grace@acme.io").await.unwrap();
    assert_eq!(flow.submit_code(GOOD_CODE).await.unwrap(), None);
    assert_eq!(flow.step(), OtpStep::ResetPassword);
    let nav = flow
        .submit_new_password("fresh-password", "fresh-password")
        .await
        .unwrap();
    assert_eq!(nav, Navigation("/login".to_string()));
    assert_eq!(
        *backend.passwords.lock().unwrap(),
        vec!["fresh-password".to_string()]
    );
    assert_eq!(
        *backend.calls.lock().unwrap(),
        vec!["POST /auth/password-reset/send role=\"client\"".to_string()]
    );

    let nav = password_login(
        ctx.auth.as_ref(),
        &ctx.session,
        &ctx.notifications,
        "grace@acme.io",
        "fresh-password",
        Role::Client,
        None,
    )
    .await
    .unwrap();
    assert_eq!(nav, Navigation("/dashboard/jobs".to_string()));
    assert_eq!(ctx.session.token().as_deref(), Some("client-token"));
}

#[tokio::test]
async fn test_wrong_password_is_remote_401() {
    let (base, _) = spawn_backend(default_jobs()).await;
    let ctx = AppContext::connect(Config::for_api(&base));

    let err = password_login(
        ctx.auth.as_ref(),
        &ctx.session,
        &ctx.notifications,
        "grace@acme.io",
        "guess",
        Role::Admin,
        None,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Remote { status: 401, .. }));
    assert_eq!(ctx.notifications.last().unwrap().message, "Invalid credentials");
    assert!(!ctx.session.is_authenticated());
}

#[tokio::test]
async fn test_posting_lifecycle_over_http() {
    let (base, backend) = spawn_backend(default_jobs()).await;
    let ctx = staff_signed_in(&base, Role::Client, STAFF_PASSWORD).await;
    let postings = ctx.postings();

    let created = postings.create(&draft("Platform Engineer")).await.unwrap();
    assert_eq!(created.id, JobId::from("P1"));
    assert_eq!(created.status, JobStatus::Drafted);
    assert_eq!((created.salary_min, created.salary_max), (1500, 2500));
    assert_eq!(created.experience_bucket(), "2-4 years");

    let edited = postings
        .update(&created, &draft("Senior Platform Engineer"))
        .await
        .unwrap();
    assert_eq!(edited.title, "Senior Platform Engineer");
    let active = postings.publish(&edited).await.unwrap();
    assert_eq!(active.status, JobStatus::Active);
    let closed = postings.close(&active).await.unwrap();
    assert_eq!(closed.status, JobStatus::Closed);

    let own = postings.list_own().await.unwrap();
    assert_eq!(own.len(), 1);
    assert_eq!(own[0].status, JobStatus::Closed);

    assert_eq!(
        *backend.calls.lock().unwrap(),
        vec![
            "PUT /client/jobs/P1".to_string(),
            "PATCH /client/jobs/P1/status \"active\"".to_string(),
            "PATCH /client/jobs/P1/status \"closed\"".to_string(),
        ]
    );
    assert!(backend
        .auth_headers
        .lock()
        .unwrap()
        .iter()
        .all(|h| h == "Bearer client-token"));
}

#[tokio::test]
async fn test_created_posting_with_inverted_bounds_is_parse_error() {
    let (base, _) = spawn_backend(default_jobs()).await;
    let ctx = staff_signed_in(&base, Role::Recruiter, STAFF_PASSWORD).await;

    let err = ctx.postings().create(&draft("Inverted")).await.unwrap_err();
    assert!(matches!(err, AppError::Parse { ref endpoint, .. } if endpoint == "/client/jobs"));
    assert_eq!(ctx.notifications.last().unwrap().level, Level::Error);
}

#[tokio::test]
async fn test_admin_console_over_http() {
    let (base, backend) = spawn_backend(default_jobs()).await;
    let ctx = staff_signed_in(&base, Role::Admin, STAFF_PASSWORD).await;
    let admin = ctx.admin();

    let pending = admin.pending_clients().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, "C1");

    let approved = admin.approve_client("C1").await.unwrap();
    assert_eq!(approved.approval, ApprovalStatus::Approved);
    let rejected = admin.reject_client("C2").await.unwrap();
    assert_eq!(rejected.approval, ApprovalStatus::Rejected);
    admin.delete_client("C2").await.unwrap();

    assert_eq!(admin.candidates().await.unwrap()[0].first_name, "Ada");
    admin.delete_candidate("U1").await.unwrap();

    let job = admin.approve_job(&JobId::from("J1")).await.unwrap();
    assert_eq!(job.title, "Backend Engineer");

    let staff = admin
        .create_staff(&NewStaff {
            email: "linus@acme.io".to_string(),
            first_name: "Linus".to_string(),
            last_name: "Torvalds".to_string(),
            password: "long-enough".to_string(),
            role: Role::Recruiter,
        })
        .await
        .unwrap();
    assert_eq!(staff.role, Role::Recruiter);
    assert_eq!(staff.first_name, "Linus");

    // a slash in an id stays inside its path segment
    admin.delete_staff("team/a").await.unwrap();

    assert_eq!(
        *backend.calls.lock().unwrap(),
        vec![
            "GET /admin/clients approval=pending".to_string(),
            "PATCH /admin/clients/C1/approval approved=true".to_string(),
            "PATCH /admin/clients/C2/approval approved=false".to_string(),
            "DELETE /admin/clients/C2".to_string(),
            "DELETE /admin/candidates/U1".to_string(),
            "PATCH /admin/jobs/J1/approval approved=true".to_string(),
            "POST /admin/staff role=\"recruiter\"".to_string(),
            "DELETE /admin/staff/team/a".to_string(),
        ]
    );
    assert_eq!(backend.clients.lock().unwrap().len(), 1);
}
