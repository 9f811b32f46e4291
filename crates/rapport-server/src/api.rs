use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{Method, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use rapport_shared::{Message, RapportError, UserId, UserSummary};
use rapport_social::{ConversationLog, RelationshipGraph};
use rapport_store::{StoreHandle, User};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::accounts;
use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::extract::JsonBody;

#[derive(Clone)]
pub struct AppState {
    pub store: StoreHandle,
    pub graph: Arc<RelationshipGraph>,
    pub conversations: Arc<ConversationLog>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Wire both social components to one store handle.
    pub fn new(config: ServerConfig, store: StoreHandle) -> Result<Self, RapportError> {
        let shared = Arc::new(store.clone());
        let graph = RelationshipGraph::new(shared.clone(), shared.clone());
        let conversations =
            ConversationLog::open(shared.clone(), shared, config.social_policy())?;

        Ok(Self {
            store,
            graph: Arc::new(graph),
            conversations: Arc::new(conversations),
            config: Arc::new(config),
        })
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/user/signup", post(signup))
        .route("/user/login", post(login))
        .route("/user/:id", get(get_user))
        .route("/alluser", get(all_users))
        .route("/user/send-friend-request", post(send_friend_request))
        .route("/user/accept-friend-request", post(accept_friend_request))
        .route("/user/:id/friend-requests", get(friend_requests))
        .route("/user/:id/friends", get(friends))
        .route("/chat/send", post(send_message))
        .route("/chat/:current_user_id/:friend_id", get(conversation))
        .layer(TimeoutLayer::new(state.config.request_timeout))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct MessageResponse {
    message: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    message: &'static str,
    user_id: UserId,
}

/// A user as returned by `GET /user/:id`, without the password hash.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UserView {
    #[serde(rename = "_id")]
    id: UserId,
    name: String,
    email: String,
    created_at: DateTime<Utc>,
    friend_requests: Vec<UserId>,
    friends: Vec<UserId>,
}

#[derive(Deserialize)]
struct SignupRequest {
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

#[derive(Deserialize)]
struct LoginRequest {
    email: Option<String>,
    password: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FriendRequestBody {
    sender_id: Option<String>,
    receiver_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AcceptRequestBody {
    user_id: Option<String>,
    sender_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendMessageBody {
    sender_id: Option<String>,
    receiver_id: Option<String>,
    message: Option<String>,
}

/// Parse a required identifier field from a request body.
fn required_id(field: &str, value: Option<&str>) -> Result<UserId, ServerError> {
    let raw = value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ServerError::BadRequest(format!("{field} is required")))?;
    Ok(UserId::parse(raw)?)
}

/// Run store-backed work on the blocking pool. SQLite calls and the store
/// mutex must not stall the async workers.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T, ServerError>
where
    F: FnOnce() -> Result<T, ServerError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ServerError::Internal(format!("store task failed: {e}")))?
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn signup(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<SignupRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ServerError> {
    accounts::register(
        &state.store,
        state.config.bcrypt_cost,
        req.name.as_deref().unwrap_or(""),
        req.email.as_deref().unwrap_or(""),
        req.password.as_deref().unwrap_or(""),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User created successfully",
        }),
    ))
}

async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, ServerError> {
    let user = accounts::login(
        &state.store,
        req.email.as_deref().unwrap_or(""),
        req.password.as_deref().unwrap_or(""),
    )
    .await?;

    Ok(Json(LoginResponse {
        message: "User logged in successfully",
        user_id: user.id,
    }))
}

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserView>, ServerError> {
    let id = UserId::parse(&id)?;
    let view = blocking(move || {
        let user = state
            .store
            .with(|db| db.get_user(&id))
            .map_err(|e| match e {
                rapport_store::StoreError::NotFound => {
                    ServerError::Social(RapportError::NotFound(id))
                }
                other => other.into(),
            })?;
        let (friend_requests, friends) = state.graph.edges(&id)?;

        Ok(UserView {
            id: user.id,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
            friend_requests,
            friends,
        })
    })
    .await?;

    Ok(Json(view))
}

async fn all_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ServerError> {
    let users = blocking(move || Ok(state.store.with(|db| db.list_users())?)).await?;
    Ok(Json(users))
}

async fn send_friend_request(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<FriendRequestBody>,
) -> Result<Json<MessageResponse>, ServerError> {
    let sender = required_id("senderId", req.sender_id.as_deref())?;
    let receiver = required_id("receiverId", req.receiver_id.as_deref())?;

    blocking(move || Ok(state.graph.send_friend_request(&sender, &receiver)?)).await?;

    Ok(Json(MessageResponse {
        message: "Friend request sent successfully!",
    }))
}

async fn accept_friend_request(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<AcceptRequestBody>,
) -> Result<Json<MessageResponse>, ServerError> {
    let user = required_id("userId", req.user_id.as_deref())?;
    let sender = required_id("senderId", req.sender_id.as_deref())?;

    blocking(move || Ok(state.graph.accept_friend_request(&user, &sender)?)).await?;

    Ok(Json(MessageResponse {
        message: "Friend request accepted",
    }))
}

async fn friend_requests(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<UserSummary>>, ServerError> {
    let id = UserId::parse(&id)?;
    let pending = blocking(move || Ok(state.graph.list_pending_requests(&id)?)).await?;
    Ok(Json(pending))
}

async fn friends(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<UserSummary>>, ServerError> {
    let id = UserId::parse(&id)?;
    let friends = blocking(move || Ok(state.graph.list_friends(&id)?)).await?;
    Ok(Json(friends))
}

async fn send_message(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<SendMessageBody>,
) -> Result<(StatusCode, Json<Message>), ServerError> {
    let sender = required_id("senderId", req.sender_id.as_deref())?;
    let receiver = required_id("receiverId", req.receiver_id.as_deref())?;
    let text = req.message.unwrap_or_default();

    let message = blocking(move || {
        Ok(state
            .conversations
            .send_message(&sender, &receiver, &text)?)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(message)))
}

async fn conversation(
    State(state): State<AppState>,
    Path((current_user_id, friend_id)): Path<(String, String)>,
) -> Result<Json<Vec<Message>>, ServerError> {
    let current = UserId::parse(&current_user_id)?;
    let friend = UserId::parse(&friend_id)?;
    let messages =
        blocking(move || Ok(state.conversations.get_conversation(&current, &friend)?)).await?;
    Ok(Json(messages))
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
