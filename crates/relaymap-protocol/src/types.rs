use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Logical media track negotiated between app and camera
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Video,
    Audio,
    /// Push-to-talk audio flowing from app to camera
    Talk,
}

impl TrackKind {
    pub const ALL: [TrackKind; 3] = [TrackKind::Video, TrackKind::Audio, TrackKind::Talk];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrackKind::Video => "video",
            TrackKind::Audio => "audio",
            TrackKind::Talk => "talk",
        }
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the forwarding engine treats packets from a sender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum StreamKind {
    /// Payload-carrying stream; may be recycled when idle
    #[serde(rename = "rtp")]
    Media,
    /// Companion control stream; kept alive by the forwarding engine
    #[serde(rename = "rtcp")]
    Control,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Media => f.write_str("rtp"),
            StreamKind::Control => f.write_str("rtcp"),
        }
    }
}

/// Relay entry for one sender endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelayEntryData {
    pub receivers: Vec<String>,
    pub kind: StreamKind,
}

/// Liveness status of one control-stream sender
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RtcpStatusData {
    pub active: bool,
    /// Media sender this control stream monitors
    pub paired_sender: String,
}

/// Relay table keyed by canonical sender endpoint
pub type RelayTableData = BTreeMap<String, RelayEntryData>;

/// Control-stream status keyed by canonical sender endpoint
pub type RtcpTableData = BTreeMap<String, RtcpStatusData>;
