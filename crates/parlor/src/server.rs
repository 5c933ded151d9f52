//! Server builder, shared state, and the HTTP surface.
//!
//! Two routes on one listener: `POST /join` (create/join a session,
//! request/response) and `GET /socket` (the per-player WebSocket). The
//! builder wires the store, services, rooms, and reaper together; `run`
//! serves until shutdown.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parlor_protocol::{ErrorReply, JoinGrant, JoinRequest};
use parlor_room::{Rooms, StatusPublisher};
use parlor_session::{
    AuthGateway, DomainError, JoinService, SessionError, SessionRegistry,
    validate_name,
};
use parlor_store::MemoryStore;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use crate::error::present;
use crate::handler::socket_endpoint;
use crate::reaper::ExpiryReaper;
use crate::{Config, EnvMode, ServerError};

/// Shared state handed to every request handler. Cheap to clone — all
/// fields are shared handles.
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) registry: Arc<SessionRegistry<MemoryStore>>,
    pub(crate) join: Arc<JoinService<MemoryStore>>,
    pub(crate) auth: Arc<AuthGateway<MemoryStore>>,
    pub(crate) publisher: Arc<StatusPublisher<MemoryStore>>,
    pub(crate) rooms: Arc<Mutex<Rooms>>,
    pub(crate) env: EnvMode,
}

/// Builder for a [`Server`].
pub struct ServerBuilder {
    bind_addr: String,
    ttl: std::time::Duration,
    env: EnvMode,
}

impl ServerBuilder {
    pub fn new() -> Self {
        let env = EnvMode::default();
        Self {
            bind_addr: "127.0.0.1:4000".to_string(),
            ttl: env.default_ttl(),
            env,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            bind_addr: config.bind_addr(),
            ttl: config.ttl,
            env: config.env,
        }
    }

    /// Sets the address to bind the listener to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the idle-session TTL (and therefore the reaper period).
    pub fn ttl(mut self, ttl: std::time::Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn env(mut self, env: EnvMode) -> Self {
        self.env = env;
        self
    }

    /// Binds the listener and wires up the full stack.
    pub async fn build(self) -> Result<Server, ServerError> {
        let listener = TcpListener::bind(&self.bind_addr)
            .await
            .map_err(ServerError::Bind)?;

        let store = Arc::new(MemoryStore::new());
        let rooms = Arc::new(Mutex::new(Rooms::new()));
        let registry = Arc::new(SessionRegistry::new(Arc::clone(&store)));

        let state = AppState {
            registry: Arc::clone(&registry),
            join: Arc::new(JoinService::new(Arc::clone(&store))),
            auth: Arc::new(AuthGateway::new(Arc::clone(&store))),
            publisher: Arc::new(StatusPublisher::new(
                Arc::clone(&store),
                Arc::clone(&rooms),
            )),
            rooms: Arc::clone(&rooms),
            env: self.env,
        };

        Ok(Server {
            listener,
            state,
            store,
            registry,
            rooms,
            ttl: self.ttl,
        })
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound, ready-to-run Parlor server.
pub struct Server {
    listener: TcpListener,
    state: AppState,
    store: Arc<MemoryStore>,
    registry: Arc<SessionRegistry<MemoryStore>>,
    rooms: Arc<Mutex<Rooms>>,
    ttl: std::time::Duration,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// The address the listener actually bound (useful with port 0).
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves until interrupted. The reaper starts with the server and is
    /// stopped when the serve loop exits.
    pub async fn run(self) -> Result<(), ServerError> {
        let reaper = ExpiryReaper::new(
            Arc::clone(&self.store),
            Arc::clone(&self.registry),
            Arc::clone(&self.rooms),
            self.ttl,
        )
        .spawn();

        let app = router(self.state);
        let addr = self.listener.local_addr()?;
        tracing::info!(
            %addr,
            ttl_secs = self.ttl.as_secs(),
            "parlor server running"
        );

        let served = axum::serve(self.listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await;

        reaper.stop().await;
        served.map_err(ServerError::Io)
    }
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/join", post(join_endpoint))
        .route("/socket", get(socket_endpoint))
        .with_state(state)
}

/// `POST /join` — seat a player, creating a session first when no code
/// was supplied.
async fn join_endpoint(
    State(state): State<AppState>,
    Json(request): Json<JoinRequest>,
) -> Response {
    match join_flow(&state, request).await {
        Ok(grant) => (StatusCode::OK, Json(grant)).into_response(),
        Err(err) => {
            let status = match &err {
                SessionError::Domain(_) => StatusCode::BAD_REQUEST,
                SessionError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            let body = ErrorReply {
                error: present(&err, state.env),
            };
            (status, Json(body)).into_response()
        }
    }
}

async fn join_flow(
    state: &AppState,
    request: JoinRequest,
) -> Result<JoinGrant, SessionError> {
    // Validate the name before creating anything, so a bad request can't
    // litter the registry with empty sessions.
    validate_name(&request.player_name)?;

    let code = match request.game_code {
        Some(code) if code.in_range() => code,
        Some(_) => return Err(DomainError::NotFound.into()),
        None => state.registry.create_session().await?,
    };

    state.join.join(code, &request.player_name).await
}
