//! Track pairing
//!
//! Derives the two relay directives for one negotiated track. For video and
//! audio the sender's primary (RTP) port feeds the receiver's primary port,
//! and the receiver's secondary (RTCP) port reports back to the sender's
//! secondary port.
//!
//! The talk track swaps the stream-kind labels: its RTP direction is tagged
//! Control and its RTCP direction Media. The forwarding engine recycles idle
//! Media streams but keeps Control streams alive, and talk-back audio is
//! idle most of the time, so tagging it Media would get it torn down
//! mid-session. This relies on the forwarding engine's recycling policy; if
//! that policy changes, this labelling has to change with it.

use relaymap_protocol::{StreamKind, TrackKind};
use std::net::IpAddr;

use super::Endpoint;

/// `[primary, secondary]` ports of one side of a track. `None` marks a port
/// that was missing or not a valid UDP port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PortPair {
    pub primary: Option<u16>,
    pub secondary: Option<u16>,
}

impl PortPair {
    pub fn new(primary: u16, secondary: u16) -> Self {
        Self {
            primary: Some(primary),
            secondary: Some(secondary),
        }
    }
}

/// An instruction to relay packets arriving from `sender` to `receiver`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayDirective {
    pub sender: Endpoint,
    pub receiver: Endpoint,
    pub kind: StreamKind,
    /// For Control directives, the media sender the control stream monitors
    pub paired_sender: Option<Endpoint>,
}

/// Builds the relay directives for one track flowing from `sender_ip` to
/// `receiver_ip`.
///
/// A directive that depends on a missing or invalid port is skipped with a
/// warning; the other directive is still returned.
pub fn pair_track(
    sender_ip: IpAddr,
    sender_ports: PortPair,
    receiver_ip: IpAddr,
    receiver_ports: PortPair,
    track: TrackKind,
) -> Vec<RelayDirective> {
    let endpoint = |ip: IpAddr, port: Option<u16>| port.and_then(|p| Endpoint::new(ip, p));

    let sender_rtp = endpoint(sender_ip, sender_ports.primary);
    let sender_rtcp = endpoint(sender_ip, sender_ports.secondary);
    let receiver_rtp = endpoint(receiver_ip, receiver_ports.primary);
    let receiver_rtcp = endpoint(receiver_ip, receiver_ports.secondary);

    tracing::debug!(
        "Pairing {} track: sender {} {:?}, receiver {} {:?}",
        track,
        sender_ip,
        sender_ports,
        receiver_ip,
        receiver_ports
    );

    // Talk tags its RTP direction Control and pairs it with the receiver's
    // RTCP endpoint; see the module docs.
    let (forward_kind, forward_paired, reverse_kind, reverse_paired) = match track {
        TrackKind::Video | TrackKind::Audio => {
            (StreamKind::Media, None, StreamKind::Control, sender_rtp)
        }
        TrackKind::Talk => (StreamKind::Control, receiver_rtcp, StreamKind::Media, None),
    };

    [
        directive(track, sender_rtp, receiver_rtp, forward_kind, forward_paired),
        directive(track, receiver_rtcp, sender_rtcp, reverse_kind, reverse_paired),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn directive(
    track: TrackKind,
    sender: Option<Endpoint>,
    receiver: Option<Endpoint>,
    kind: StreamKind,
    paired_sender: Option<Endpoint>,
) -> Option<RelayDirective> {
    let (Some(sender), Some(receiver)) = (sender, receiver) else {
        tracing::warn!("Skipping {} {} directive: invalid port", track, kind);
        return None;
    };

    let paired_sender = match kind {
        StreamKind::Media => None,
        StreamKind::Control if paired_sender.is_none() => {
            tracing::warn!(
                "Skipping {} {} directive from {}: paired sender port invalid",
                track,
                kind,
                sender
            );
            return None;
        }
        StreamKind::Control => paired_sender,
    };

    Some(RelayDirective {
        sender,
        receiver,
        kind,
        paired_sender,
    })
}
