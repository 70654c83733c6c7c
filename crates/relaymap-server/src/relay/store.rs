//! Relay table and RTCP status store
//!
//! Holds the process-wide forwarding table and the control-stream status
//! map that the UDP forwarding engine reads. Both maps sit behind one lock
//! so a mapping insert and its status upsert are applied together, and a
//! snapshot always sees them in agreement.

use relaymap_protocol::{RelayEntryData, RelayTableData, RtcpStatusData, RtcpTableData, StreamKind};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

use super::{Endpoint, EndpointParseError, RelayDirective};

/// Receivers and stream kind for one sender endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayEntry {
    /// In insertion order; no endpoint appears twice
    pub receivers: Vec<Endpoint>,
    pub kind: StreamKind,
}

/// Liveness status of one control-stream sender
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RtcpStatus {
    pub active: bool,
    /// The media sender this control stream monitors
    pub paired_sender: Endpoint,
}

/// Result of a successful [`RelayStore::add_mapping`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    Added,
    /// The receiver was already mapped for this sender; nothing changed
    Duplicate,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    #[error("invalid receiver endpoint: {0}")]
    InvalidEndpoint(#[from] EndpointParseError),

    #[error("control mapping from {0} has no paired sender")]
    MissingPairedSender(Endpoint),
}

/// Consistent copy of both maps
#[derive(Debug, Clone, Default)]
pub struct RelaySnapshot {
    pub table: HashMap<Endpoint, RelayEntry>,
    pub rtcp: HashMap<Endpoint, RtcpStatus>,
}

impl RelaySnapshot {
    pub fn table_data(&self) -> RelayTableData {
        self.table
            .iter()
            .map(|(sender, entry)| {
                (
                    sender.to_string(),
                    RelayEntryData {
                        receivers: entry.receivers.iter().map(ToString::to_string).collect(),
                        kind: entry.kind,
                    },
                )
            })
            .collect()
    }

    pub fn rtcp_data(&self) -> RtcpTableData {
        self.rtcp
            .iter()
            .map(|(sender, status)| {
                (
                    sender.to_string(),
                    RtcpStatusData {
                        active: status.active,
                        paired_sender: status.paired_sender.to_string(),
                    },
                )
            })
            .collect()
    }
}

#[derive(Default)]
struct Tables {
    relay: HashMap<Endpoint, RelayEntry>,
    rtcp: HashMap<Endpoint, RtcpStatus>,
}

#[derive(Default)]
pub struct RelayStore {
    tables: RwLock<Tables>,
}

impl RelayStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps packets from `sender` to the endpoint rendered as `receiver`.
    ///
    /// A receiver already present for `sender` is a no-op. Otherwise the
    /// receiver is appended and `kind` replaces the sender's previous kind.
    /// Control mappings also mark the sender's RTCP status active and record
    /// `paired_sender`. Nothing is modified on error.
    pub async fn add_mapping(
        &self,
        sender: Endpoint,
        receiver: &str,
        kind: StreamKind,
        paired_sender: Option<Endpoint>,
    ) -> Result<Insertion, RelayError> {
        let mut tables = self.tables.write().await;

        if let Some(entry) = tables.relay.get(&sender) {
            if entry.receivers.iter().any(|r| r.to_string() == receiver) {
                return Ok(Insertion::Duplicate);
            }
        }

        let receiver: Endpoint = receiver.parse()?;

        // Non-canonical spellings such as "10.0.0.5:05000" only match once parsed
        if let Some(entry) = tables.relay.get(&sender) {
            if entry.receivers.contains(&receiver) {
                return Ok(Insertion::Duplicate);
            }
        }

        let status = match kind {
            StreamKind::Control => {
                let paired_sender =
                    paired_sender.ok_or(RelayError::MissingPairedSender(sender))?;
                Some(RtcpStatus {
                    active: true,
                    paired_sender,
                })
            }
            StreamKind::Media => None,
        };

        // The kind is per sender, so a later mapping of a different kind
        // relabels every receiver already attached to it.
        match tables.relay.get_mut(&sender) {
            Some(entry) => {
                entry.receivers.push(receiver);
                entry.kind = kind;
            }
            None => {
                tables.relay.insert(
                    sender,
                    RelayEntry {
                        receivers: vec![receiver],
                        kind,
                    },
                );
            }
        }

        if let Some(status) = status {
            tables.rtcp.insert(sender, status);
        }

        Ok(Insertion::Added)
    }

    /// Records one directive. Failures are logged and swallowed so that a
    /// bad directive never aborts the request that produced it.
    pub async fn apply(&self, directive: &RelayDirective) -> Option<Insertion> {
        let result = self
            .add_mapping(
                directive.sender,
                &directive.receiver.to_string(),
                directive.kind,
                directive.paired_sender,
            )
            .await;

        match result {
            Ok(Insertion::Added) => {
                tracing::debug!(
                    "Mapped {} -> {} ({})",
                    directive.sender,
                    directive.receiver,
                    directive.kind
                );
                Some(Insertion::Added)
            }
            Ok(Insertion::Duplicate) => {
                tracing::debug!(
                    "Receiver {} already mapped for {}, skipping",
                    directive.receiver,
                    directive.sender
                );
                Some(Insertion::Duplicate)
            }
            Err(e) => {
                tracing::warn!("Failed to map {}: {}", directive.sender, e);
                None
            }
        }
    }

    pub async fn route(&self, sender: &Endpoint) -> Option<RelayEntry> {
        self.tables.read().await.relay.get(sender).cloned()
    }

    pub async fn rtcp_status(&self, sender: &Endpoint) -> Option<RtcpStatus> {
        self.tables.read().await.rtcp.get(sender).copied()
    }

    /// Sets the liveness flag of a control-stream sender. Returns `false` if
    /// the sender has no RTCP status.
    pub async fn set_rtcp_active(&self, sender: &Endpoint, active: bool) -> bool {
        match self.tables.write().await.rtcp.get_mut(sender) {
            Some(status) => {
                status.active = active;
                true
            }
            None => false,
        }
    }

    pub async fn snapshot(&self) -> RelaySnapshot {
        let tables = self.tables.read().await;
        RelaySnapshot {
            table: tables.relay.clone(),
            rtcp: tables.rtcp.clone(),
        }
    }

    pub async fn len(&self) -> usize {
        self.tables.read().await.relay.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tables.read().await.relay.is_empty()
    }
}
