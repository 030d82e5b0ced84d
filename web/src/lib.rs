//! HTTP surface of the chat backend: `/health` and the `/ws` upgrade endpoint.

use domain::conversation::ConversationRepository;
use domain::error::Error as DomainError;
use domain::jwt::{AccessTokens, TokenVerifier};
use domain::message::{MessageRepository, MessageService};
use events::EventPublisher;
use hub::{ConnectionSettings, Hub, HubEventHandler, MessageCreator};
use log::*;
use service::config::Config;
use std::sync::Arc;
use tokio::net::TcpListener;

pub mod collaborators;
mod controller;
mod error;
mod extractors;
mod realtime;
pub mod router;

use collaborators::{ConversationParticipants, MessageServiceCreator};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub hub: Arc<Hub>,
    pub creator: Arc<dyn MessageCreator>,
    pub verifier: Arc<dyn TokenVerifier>,
}

impl AppState {
    pub fn new(
        config: Config,
        hub: Arc<Hub>,
        creator: Arc<dyn MessageCreator>,
        verifier: Arc<dyn TokenVerifier>,
    ) -> Self {
        Self {
            config,
            hub,
            creator,
            verifier,
        }
    }

    /// Wire the hub, the message service and token verification on top of the
    /// given stores. Fails when no JWT secret is configured.
    pub fn from_config(
        config: Config,
        conversations: Arc<dyn ConversationRepository>,
        messages: Arc<dyn MessageRepository>,
    ) -> Result<Self, DomainError> {
        let secret = config
            .jwt_secret()
            .ok_or_else(|| DomainError::config("JWT_SECRET is not set"))?;
        let verifier = Arc::new(AccessTokens::new(secret));

        let hub = Arc::new(Hub::new(Arc::new(ConversationParticipants::new(
            conversations.clone(),
        ))));
        let publisher =
            EventPublisher::new().with_handler(Arc::new(HubEventHandler::new(hub.clone())));
        let creator = Arc::new(MessageServiceCreator::new(MessageService::new(
            conversations,
            messages,
            publisher,
        )));

        Ok(Self::new(config, hub, creator, verifier))
    }

    pub fn connection_settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            queue_capacity: self.config.ws_outbound_queue_capacity,
            write_wait: self.config.write_wait(),
            pong_wait: self.config.pong_wait(),
            ping_period: self.config.ping_period(),
            max_message_size: self.config.ws_max_message_size,
            rate_limit_count: self.config.ws_rate_limit_count,
            rate_limit_window: self.config.rate_limit_window(),
        }
    }
}

pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let host = app_state
        .config
        .interface
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let port = app_state.config.port;

    let listener = TcpListener::bind((host.as_str(), port)).await?;
    info!(
        "Server starting... listening for connections on http://{}",
        listener.local_addr()?
    );

    axum::serve(listener, router::define_routes(app_state)).await
}
