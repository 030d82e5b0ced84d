use crate::collaborators::MessageCreator;
use crate::connection::Connection;
use crate::hub::Hub;
use crate::pump::{run_inbound, run_outbound, PumpExit};
use crate::settings::ConnectionSettings;
use axum::extract::ws::Message;
use events::UserId;
use futures::{Sink, Stream, StreamExt};
use log::*;
use std::fmt;
use std::sync::Arc;

/// Drive one upgraded socket for an authenticated user until both pumps stop.
///
/// The connection is created and registered here, after the upgrade, so a
/// rejected handshake never allocates anything. The outbound pump runs as its
/// own task; the inbound pump runs on the caller's task.
pub async fn run<S, E>(
    socket: S,
    user_id: UserId,
    hub: Arc<Hub>,
    creator: Arc<dyn MessageCreator>,
    settings: ConnectionSettings,
) -> (PumpExit, PumpExit)
where
    S: Stream<Item = Result<Message, E>> + Sink<Message> + Send + 'static,
    <S as Sink<Message>>::Error: fmt::Display + Send,
    E: fmt::Display + Send,
{
    let (connection, queue) = Connection::new(user_id, settings.queue_capacity);
    hub.register(&connection);

    let (sink, stream) = socket.split();
    let outbound = tokio::spawn(run_outbound(
        sink,
        queue,
        connection.clone(),
        hub.clone(),
        settings,
    ));

    let inbound_exit = run_inbound(stream, connection.clone(), hub.clone(), creator, settings).await;
    let outbound_exit = match outbound.await {
        Ok(exit) => exit,
        Err(e) => {
            error!("Outbound pump for connection {} panicked: {e}", connection.id());
            hub.unregister(&connection);
            PumpExit::Unregistered
        }
    };

    // After a peer close the transport refuses our own close frame; that is not a fault.
    let outbound_failed = outbound_exit.is_failure() && inbound_exit != PumpExit::ClosedByPeer;
    if inbound_exit.is_failure() || outbound_failed {
        warn!(
            "Connection {} for user {user_id} ended (inbound: {inbound_exit}, outbound: {outbound_exit})",
            connection.id()
        );
    } else {
        info!(
            "Connection {} for user {user_id} ended (inbound: {inbound_exit}, outbound: {outbound_exit})",
            connection.id()
        );
    }

    (inbound_exit, outbound_exit)
}
