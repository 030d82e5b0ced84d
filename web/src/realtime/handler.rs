use crate::extractors::authenticated_user::AuthenticatedUser;
use crate::AppState;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::State;
use axum::response::Response;
use log::*;

/// Upgrades an authenticated request to a WebSocket and serves it until either
/// side goes away. Authentication runs before the upgrade, so a rejected token
/// never creates a connection.
pub(crate) async fn ws_handler(
    AuthenticatedUser(user_id): AuthenticatedUser,
    State(app_state): State<AppState>,
    ws: WebSocketUpgrade,
) -> Response {
    debug!("Upgrading realtime connection for user {user_id}");

    let settings = app_state.connection_settings();
    ws.max_message_size(settings.max_message_size)
        .on_failed_upgrade(move |e| warn!("WebSocket upgrade for user {user_id} failed: {e}"))
        .on_upgrade(move |socket| async move {
            hub::session::run(
                socket,
                user_id,
                app_state.hub,
                app_state.creator,
                settings,
            )
            .await;
        })
}
