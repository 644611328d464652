//! In-memory stand-in for the backend, shared by unit tests.
//!
//! `MockBackend` implements [`HttpTransport`] over a tiny model of the real
//! service (users, pins, saves, comments) and records every request so tests
//! can assert on exactly what went over the wire.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::net::api::{ApiClient, AuthEvents};
use crate::net::transport::{ApiRequest, ApiResponse, HttpTransport, Method, MultipartField, RequestBody};
use crate::net::types::{Comment, CommentAuthor, Owner, Pin, Tag, User};
use crate::state::session::SessionStore;
use crate::state::storage::MemoryStorage;
use crate::util::token::{self, mint_for};

pub(crate) const PASSWORD: &str = "pw";

struct Account {
    user: User,
    password: String,
}

#[derive(Default)]
struct BackendState {
    accounts: Vec<Account>,
    pins: Vec<Pin>,
    saved: BTreeSet<(i64, i64)>,
    comments: HashMap<i64, Vec<Comment>>,
    scripted: HashMap<(Method, String), ApiResponse>,
    requests: Vec<ApiRequest>,
    token_ttl: i64,
    next_id: i64,
}

pub(crate) struct MockBackend {
    state: Mutex<BackendState>,
}

fn reply(status: u16, body: &Value) -> ApiResponse {
    ApiResponse { status, body: body.to_string() }
}

fn detail(status: u16, message: &str) -> ApiResponse {
    reply(status, &json!({ "detail": message }))
}

impl MockBackend {
    /// Backend seeded with alice (id 1), bob (id 2) and three pins.
    pub(crate) fn seeded() -> Arc<Self> {
        let backend = Self { state: Mutex::new(BackendState { token_ttl: 3600, next_id: 100, ..Default::default() }) };
        {
            let mut state = backend.lock();
            for (id, name) in [(1, "alice"), (2, "bob")] {
                state.accounts.push(Account {
                    user: User {
                        id,
                        email: format!("{name}@example.com"),
                        username: name.into(),
                        created_at: "2024-01-01T00:00:00".into(),
                    },
                    password: PASSWORD.into(),
                });
            }
            state.pins = vec![
                make_pin(1, "Sunset", 1, "alice", &[(1, "sky")]),
                make_pin(2, "Forest", 2, "bob", &[(2, "trees"), (1, "sky")]),
                make_pin(3, "Coffee", 2, "bob", &[]),
            ];
        }
        Arc::new(backend)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BackendState> {
        self.state.lock().unwrap()
    }

    /// Issue tokens that expire `ttl` seconds after login (negative = already dead).
    pub(crate) fn set_token_ttl(&self, ttl: i64) {
        self.lock().token_ttl = ttl;
    }

    /// Answer `method path` with a fixed response from now on.
    pub(crate) fn script(&self, method: Method, path: &str, status: u16, body: Value) {
        self.lock().scripted.insert((method, path.to_owned()), reply(status, &body));
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.lock().requests.clone()
    }

    pub(crate) fn count(&self, method: Method, path: &str) -> usize {
        self.lock().requests.iter().filter(|r| r.method == method && r.path == path).count()
    }

    pub(crate) fn is_saved(&self, user_id: i64, pin_id: i64) -> bool {
        self.lock().saved.contains(&(user_id, pin_id))
    }

    pub(crate) fn pin_count(&self) -> usize {
        self.lock().pins.len()
    }

    fn viewer(state: &BackendState, request: &ApiRequest) -> Result<Option<User>, ApiResponse> {
        let Some(bearer) = &request.bearer else { return Ok(None) };
        let claims = token::validate(bearer, token::now_unix()).map_err(|_| detail(401, "Could not validate credentials"))?;
        let user = state
            .accounts
            .iter()
            .find(|a| Some(a.user.username.as_str()) == claims.sub.as_deref())
            .map(|a| a.user.clone());
        user.map(Some).ok_or_else(|| detail(401, "Could not validate credentials"))
    }

    fn pin_view(state: &BackendState, pin: &Pin, viewer: Option<&User>) -> Value {
        let mut pin = pin.clone();
        pin.is_saved = viewer.is_some_and(|u| state.saved.contains(&(u.id, pin.id)));
        serde_json::to_value(pin).unwrap()
    }

    fn pins_view<'a>(state: &BackendState, pins: impl Iterator<Item = &'a Pin>, viewer: Option<&User>) -> Value {
        Value::Array(pins.map(|p| Self::pin_view(state, p, viewer)).collect())
    }

    fn handle(state: &mut BackendState, request: &ApiRequest) -> ApiResponse {
        if let Some(scripted) = state.scripted.get(&(request.method, request.path.clone())) {
            return scripted.clone();
        }
        let viewer = match Self::viewer(state, request) {
            Ok(viewer) => viewer,
            Err(resp) => return resp,
        };
        let segments: Vec<&str> = request.path.trim_start_matches('/').split('/').collect();

        match (request.method, segments.as_slice()) {
            (Method::Post, ["token"]) => Self::issue_token(state, &request.body),
            (Method::Post, ["register"]) => Self::register(state, &request.body),
            (_, ["pins", ..] | ["users", "me", ..]) if viewer.is_none() && request.path != "/pins/" => {
                detail(401, "Not authenticated")
            }
            (Method::Get, ["users", "me"]) => reply(200, &serde_json::to_value(viewer).unwrap()),
            (Method::Get, ["users", "me", "pins"]) => {
                let me = viewer.as_ref().map(|u| u.id);
                let owned = state.pins.iter().filter(|p| Some(p.owner_id) == me);
                reply(200, &Self::pins_view(state, owned, viewer.as_ref()))
            }
            (Method::Get, ["pins", ""]) => reply(200, &Self::pins_view(state, state.pins.iter(), viewer.as_ref())),
            (Method::Post, ["pins", ""]) => Self::create_pin(state, &request.body, viewer.as_ref()),
            (Method::Get, ["pins", "saved"]) => {
                let me = viewer.as_ref().map_or(0, |u| u.id);
                let saved = state.pins.iter().filter(|p| state.saved.contains(&(me, p.id)));
                reply(200, &Self::pins_view(state, saved, viewer.as_ref()))
            }
            (Method::Get, ["pins", "tag", name]) => {
                let name = urlencoding::decode(name).unwrap().into_owned();
                let tagged = state.pins.iter().filter(|p| p.tags.iter().any(|t| t.name == name));
                reply(200, &Self::pins_view(state, tagged, viewer.as_ref()))
            }
            (method, ["pins", id, rest @ ..]) => {
                let Some(pin_id) = id.parse::<i64>().ok().filter(|id| state.pins.iter().any(|p| p.id == *id)) else {
                    return detail(404, "Pin not found");
                };
                let me = viewer.expect("checked above");
                match (method, rest) {
                    (Method::Get, []) => {
                        let pin = state.pins.iter().find(|p| p.id == pin_id).unwrap();
                        reply(200, &Self::pin_view(state, pin, Some(&me)))
                    }
                    (Method::Post, ["save"]) => {
                        state.saved.insert((me.id, pin_id));
                        reply(200, &json!({ "message": "Pin saved" }))
                    }
                    (Method::Delete, ["save"]) => {
                        state.saved.remove(&(me.id, pin_id));
                        reply(200, &json!({ "message": "Pin unsaved" }))
                    }
                    (Method::Get, ["comments"]) => {
                        let comments = state.comments.get(&pin_id).cloned().unwrap_or_default();
                        reply(200, &serde_json::to_value(comments).unwrap())
                    }
                    (Method::Post, ["comments"]) => Self::add_comment(state, pin_id, &me, &request.body),
                    _ => detail(405, "Method Not Allowed"),
                }
            }
            _ => detail(404, "Not Found"),
        }
    }

    fn issue_token(state: &BackendState, body: &RequestBody) -> ApiResponse {
        let RequestBody::Form(pairs) = body else { return detail(422, "form body required") };
        let field = |key: &str| pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str());
        let ok = state
            .accounts
            .iter()
            .any(|a| Some(a.user.username.as_str()) == field("username") && Some(a.password.as_str()) == field("password"));
        if !ok {
            return detail(401, "Incorrect username or password");
        }
        let username = field("username").unwrap_or_default();
        reply(200, &json!({ "access_token": mint_for(username, state.token_ttl), "token_type": "bearer" }))
    }

    fn register(state: &mut BackendState, body: &RequestBody) -> ApiResponse {
        let RequestBody::Json(body) = body else { return detail(422, "json body required") };
        let get = |key: &str| body.get(key).and_then(Value::as_str).unwrap_or_default().to_owned();
        let (email, username, password) = (get("email"), get("username"), get("password"));
        if state.accounts.iter().any(|a| a.user.username == username) {
            return detail(400, "Username already registered");
        }
        if !email.contains('@') {
            return reply(422, &json!({ "detail": [{ "msg": "value is not a valid email address" }] }));
        }
        state.next_id += 1;
        let user = User { id: state.next_id, email, username, created_at: "2024-06-01T00:00:00".into() };
        state.accounts.push(Account { user: user.clone(), password });
        reply(200, &serde_json::to_value(user).unwrap())
    }

    fn create_pin(state: &mut BackendState, body: &RequestBody, viewer: Option<&User>) -> ApiResponse {
        let RequestBody::Multipart(fields) = body else { return detail(422, "multipart body required") };
        let Some(me) = viewer else { return detail(401, "Not authenticated") };
        let text = |key: &str| {
            fields.iter().find_map(|f| match f {
                MultipartField::Text { name, value } if name == key => Some(value.clone()),
                _ => None,
            })
        };
        let image = fields.iter().find_map(|f| match f {
            MultipartField::File { name, file_name, .. } if name == "image" => Some(file_name.clone()),
            _ => None,
        });
        let title = text("title").unwrap_or_default();
        let mut errors = Vec::new();
        if title.trim().is_empty() {
            errors.push(json!({ "loc": ["body", "title"], "msg": "title must not be empty" }));
        }
        if image.is_none() {
            errors.push(json!({ "loc": ["body", "image"], "msg": "field required" }));
        }
        if !errors.is_empty() {
            return reply(422, &json!({ "detail": errors }));
        }
        state.next_id += 1;
        let raw_tags = text("tags").unwrap_or_default();
        let tags: Vec<(i64, &str)> = raw_tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .zip(1000..)
            .map(|(name, id)| (id, name))
            .collect();
        let mut pin = make_pin(state.next_id, &title, me.id, &me.username, &tags);
        pin.description = text("description");
        pin.image_ref = format!("/uploads/{}", image.unwrap_or_default());
        state.pins.push(pin.clone());
        reply(200, &serde_json::to_value(pin).unwrap())
    }

    fn add_comment(state: &mut BackendState, pin_id: i64, me: &User, body: &RequestBody) -> ApiResponse {
        let RequestBody::Json(body) = body else { return detail(422, "json body required") };
        let content = body.get("content").and_then(Value::as_str).unwrap_or_default().to_owned();
        state.next_id += 1;
        let comment = Comment {
            id: state.next_id,
            content,
            created_at: format!("2024-06-01T00:00:{:02}", state.next_id % 60),
            author: CommentAuthor { id: me.id, username: me.username.clone(), email: me.email.clone() },
        };
        state.comments.entry(pin_id).or_default().push(comment.clone());
        reply(200, &serde_json::to_value(comment).unwrap())
    }
}

pub(crate) fn make_pin(id: i64, title: &str, owner_id: i64, owner: &str, tags: &[(i64, &str)]) -> Pin {
    Pin {
        id,
        title: title.into(),
        description: Some(format!("{title} description")),
        image_ref: format!("/uploads/{id}.jpg"),
        owner_id,
        is_saved: false,
        tags: tags.iter().map(|(id, name)| Tag { id: *id, name: (*name).into() }).collect(),
        owner: Owner { username: owner.into(), email: format!("{owner}@example.com") },
    }
}

#[async_trait::async_trait]
impl HttpTransport for MockBackend {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let mut state = self.lock();
        state.requests.push(request.clone());
        Ok(Self::handle(&mut state, &request))
    }
}

/// Transport that never reaches a server.
pub(crate) struct OfflineTransport;

#[async_trait::async_trait]
impl HttpTransport for OfflineTransport {
    async fn send(&self, _request: ApiRequest) -> Result<ApiResponse, ClientError> {
        Err(ClientError::Network("connection refused".into()))
    }
}

pub(crate) struct Harness {
    pub backend: Arc<MockBackend>,
    pub api: ApiClient,
    pub events: AuthEvents,
    pub storage: Arc<MemoryStorage>,
}

/// Signed-out client wired to a freshly seeded backend.
pub(crate) fn harness() -> Harness {
    let backend = MockBackend::seeded();
    let storage = Arc::new(MemoryStorage::new());
    let session = SessionStore::new(storage.clone());
    let (api, events) = ApiClient::new(ClientConfig::default(), backend.clone(), session);
    Harness { backend, api, events, storage }
}

/// Client already logged in as `username`.
pub(crate) async fn signed_in(username: &str) -> Harness {
    let h = harness();
    h.api.login(username, PASSWORD).await.unwrap();
    h
}

pub(crate) fn offline_api() -> (ApiClient, AuthEvents) {
    let session = SessionStore::new(Arc::new(MemoryStorage::with_token(mint_for("alice", 3600))));
    ApiClient::new(ClientConfig::default(), Arc::new(OfflineTransport), session)
}
