use crate::error::Result;
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
};
use relaymap_protocol::PortMapRequest;

/// Records the relay directives for a negotiated app/camera session.
///
/// The body is decoded by hand rather than through `Json` so that every
/// malformed payload is answered with 400.
pub async fn add_port_map(
    State(state): State<AppState>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<()> {
    let body = body?;
    tracing::debug!("Port map request: {}", String::from_utf8_lossy(&body));

    let request: PortMapRequest = serde_json::from_slice(&body)?;
    state.portmap_service.apply(&request).await?;

    Ok(())
}
