//! Realtime connection hub for chat delivery over WebSockets.
//!
//! The hub tracks every open connection per user and fans persisted messages out
//! to every connected device of every participant of a conversation.
//!
//! # Architecture
//!
//! - **Weak registry**: [`ConnectionRegistry`] maps a user to that user's open
//!   connections. It holds non-owning references only; each connection is owned
//!   by its pair of pumps.
//! - **Non-blocking fan-out**: [`Hub::broadcast`] resolves participants, serializes
//!   one [`Envelope`] and offers it to every recipient queue with `try_send`. A full
//!   queue drops that delivery for that connection only.
//! - **Two pumps per connection**: the inbound pump decodes client frames, rate
//!   limits them and forwards `send_message` requests to the [`MessageCreator`];
//!   the outbound pump is the only writer to the socket and owns keep-alive pings.
//! - **One closed signal**: unregistering cancels the connection's token, which
//!   wakes both pumps so they exit together.
//!
//! # Message Flow
//!
//! 1. Client upgrades on `/ws` with an access token; `web` verifies it
//! 2. [`session::run`] creates the [`Connection`], registers it and starts both pumps
//! 3. A client frame `{"type":"send_message",...}` reaches the [`MessageCreator`]
//! 4. The creator persists the message and publishes `DomainEvent::MessageCreated`
//! 5. [`HubEventHandler`] turns the event into [`Hub::broadcast`]
//! 6. Every recipient's outbound pump writes `{"type":"new_message","message":...}`
//!
//! # Modules
//!
//! - `connection`: [`Connection`], its bounded outbound queue and closed signal
//! - `registry`: user → connections index backed by `DashMap`
//! - `hub`: broadcast and registration entry points
//! - `envelope`: the serialized outbound message
//! - `pump`: inbound and outbound loops
//! - `rate_limit`: rolling-window limiter for inbound sends
//! - `collaborators`: traits the hub consumes from the domain layer

pub mod collaborators;
pub mod connection;
pub mod domain_event_handler;
pub mod envelope;
pub mod hub;
pub mod pump;
pub mod rate_limit;
pub mod registry;
pub mod session;
pub mod settings;

pub use collaborators::{CreateMessageError, LookupError, MessageCreator, ParticipantResolver};
pub use connection::{Connection, ConnectionId, ConnectionState, EnqueueError};
pub use domain_event_handler::HubEventHandler;
pub use envelope::Envelope;
pub use events::{ConversationId, UserId};
pub use hub::{BroadcastOutcome, Hub};
pub use registry::ConnectionRegistry;
pub use settings::ConnectionSettings;
