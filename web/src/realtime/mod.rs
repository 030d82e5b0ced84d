//! WebSocket HTTP handler for the web layer.
//!
//! This module contains only the Axum handler for the `/ws` endpoint.
//! Connection tracking, fan-out and the per-connection pumps live in the `hub`
//! crate so that they can be exercised without HTTP.

pub(crate) mod handler;
