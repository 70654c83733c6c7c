use crate::state::AppState;
use axum::{extract::State, Json};
use relaymap_protocol::{RelayTableData, RtcpTableData};

pub async fn get_table(State(state): State<AppState>) -> Json<RelayTableData> {
    Json(state.relay.snapshot().await.table_data())
}

pub async fn get_rtcp_status(State(state): State<AppState>) -> Json<RtcpTableData> {
    Json(state.relay.snapshot().await.rtcp_data())
}
