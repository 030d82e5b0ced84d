use super::{PumpExit, TransportError};
use crate::connection::{Connection, OutboundQueue};
use crate::hub::Hub;
use crate::settings::ConnectionSettings;
use axum::body::Bytes;
use axum::extract::ws::{close_code, CloseFrame, Message};
use futures::{Sink, SinkExt};
use log::*;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, timeout, Instant, MissedTickBehavior};

const MIN_PING_PERIOD: Duration = Duration::from_millis(1);

/// Drain the outbound queue to the socket and send keep-alive pings.
///
/// The only writer to the socket. On the closed signal it flushes whatever is
/// still queued and sends a close frame; any write error or missed write
/// deadline unregisters the connection.
pub async fn run_outbound<S>(
    mut sink: S,
    mut queue: OutboundQueue,
    connection: Arc<Connection>,
    hub: Arc<Hub>,
    settings: ConnectionSettings,
) -> PumpExit
where
    S: Sink<Message> + Unpin,
    S::Error: fmt::Display,
{
    // A zero period would panic inside the timer.
    let ping_period = settings.ping_period.max(MIN_PING_PERIOD);
    let mut ticker = interval_at(Instant::now() + ping_period, ping_period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let exit = loop {
        tokio::select! {
            biased;

            _ = connection.closed() => {
                break close_gracefully(&mut sink, &mut queue, settings.write_wait).await;
            }
            envelope = queue.recv() => {
                // The connection owns a sender, so the queue cannot end while it is alive.
                let Some(envelope) = envelope else {
                    break PumpExit::Unregistered;
                };
                let frame = Message::Text(envelope.payload().clone());
                if let Err(e) = write(&mut sink, frame, settings.write_wait).await {
                    break PumpExit::Failed(e);
                }
            }
            _ = ticker.tick() => {
                if let Err(e) = write(&mut sink, Message::Ping(Bytes::new()), settings.write_wait).await {
                    break PumpExit::Failed(e);
                }
            }
        }
    };

    hub.unregister(&connection);
    connection.mark_closed();
    exit
}

async fn write<S>(sink: &mut S, frame: Message, deadline: Duration) -> Result<(), TransportError>
where
    S: Sink<Message> + Unpin,
    S::Error: fmt::Display,
{
    match timeout(deadline, sink.send(frame)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(TransportError::Write(e.to_string())),
        Err(_) => Err(TransportError::Deadline),
    }
}

async fn close_gracefully<S>(sink: &mut S, queue: &mut OutboundQueue, deadline: Duration) -> PumpExit
where
    S: Sink<Message> + Unpin,
    S::Error: fmt::Display,
{
    queue.close();
    while let Ok(envelope) = queue.try_recv() {
        if let Err(e) = write(sink, Message::Text(envelope.payload().clone()), deadline).await {
            debug!("Abandoning flush of queued envelopes: {e}");
            return PumpExit::Failed(e);
        }
    }

    let close = Message::Close(Some(CloseFrame {
        code: close_code::NORMAL,
        reason: "".into(),
    }));
    match write(sink, close, deadline).await {
        Ok(()) => PumpExit::Unregistered,
        Err(e) => PumpExit::Failed(e),
    }
}

#[cfg(test)]
#[path = "outbound_tests.rs"]
mod outbound_tests;
