use crate::error::{AppError, Result};
use crate::relay::{pair_track, Insertion, PortPair, RelayStore};
use relaymap_protocol::{PortMapRequest, SideDescription, TrackDescription, TrackKind};
use std::net::IpAddr;
use std::sync::Arc;

/// Outcome counts for one port-map request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PairingReport {
    pub added: usize,
    pub duplicates: usize,
    /// Directives the store refused
    pub rejected: usize,
    /// Directives never built because a port was missing or invalid
    pub skipped: usize,
}

/// Address and track ports of one side, validated
struct Side<'a> {
    ip: IpAddr,
    tracks: [&'a TrackDescription; 3],
}

impl<'a> Side<'a> {
    fn parse(label: &str, side: &'a SideDescription) -> Result<Self> {
        let address = side
            .addresses
            .first()
            .ok_or_else(|| AppError::BadRequest(format!("{label}: no addresses")))?;
        let ip = address.parse::<IpAddr>().map_err(|_| {
            AppError::BadRequest(format!("{label}: invalid address {address:?}"))
        })?;

        let track = move |kind: TrackKind| {
            side.track(kind.as_str())
                .ok_or_else(|| AppError::BadRequest(format!("{label}: missing {kind} track")))
        };

        Ok(Self {
            ip,
            tracks: [
                track(TrackKind::Video)?,
                track(TrackKind::Audio)?,
                track(TrackKind::Talk)?,
            ],
        })
    }

    fn ports(&self, kind: TrackKind) -> PortPair {
        let track = match kind {
            TrackKind::Video => self.tracks[0],
            TrackKind::Audio => self.tracks[1],
            TrackKind::Talk => self.tracks[2],
        };
        PortPair {
            primary: track.port(0),
            secondary: track.port(1),
        }
    }
}

/// Turns port-map requests into relay table entries
#[derive(Clone)]
pub struct PortMapService {
    store: Arc<RelayStore>,
}

impl PortMapService {
    pub fn new(store: Arc<RelayStore>) -> Self {
        Self { store }
    }

    /// Validates both sides, then pairs video and audio camera to app and
    /// talk app to camera. Validation failures leave the table untouched;
    /// per-directive failures are counted and logged but do not fail the
    /// request.
    pub async fn apply(&self, request: &PortMapRequest) -> Result<PairingReport> {
        let app = Side::parse("app", &request.app)?;
        let camera = Side::parse("camera", &request.camera)?;

        let mut report = PairingReport::default();

        for kind in TrackKind::ALL {
            let (sender, receiver) = match kind {
                TrackKind::Video | TrackKind::Audio => (&camera, &app),
                TrackKind::Talk => (&app, &camera),
            };

            let directives = pair_track(
                sender.ip,
                sender.ports(kind),
                receiver.ip,
                receiver.ports(kind),
                kind,
            );
            report.skipped += 2 - directives.len();

            for directive in &directives {
                match self.store.apply(directive).await {
                    Some(Insertion::Added) => report.added += 1,
                    Some(Insertion::Duplicate) => report.duplicates += 1,
                    None => report.rejected += 1,
                }
            }
        }

        tracing::info!(
            "Port map app {} <-> camera {}: {} added, {} duplicate, {} rejected, {} skipped",
            app.ip,
            camera.ip,
            report.added,
            report.duplicates,
            report.rejected,
            report.skipped
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::Endpoint;
    use relaymap_protocol::StreamKind;
    use serde_json::json;

    fn ep(s: &str) -> Endpoint {
        s.parse().unwrap()
    }

    fn request(value: serde_json::Value) -> PortMapRequest {
        serde_json::from_value(value).unwrap()
    }

    fn full_request() -> PortMapRequest {
        request(json!({
            "app": {
                "addresses": ["10.0.0.5", "192.168.1.5"],
                "tracks": [
                    { "name": "video", "ports": [5000, 5001] },
                    { "name": "audio", "ports": [5002, 5003] },
                    { "name": "talk", "ports": [7000, 7001] }
                ]
            },
            "camera": {
                "addresses": ["10.0.0.9"],
                "tracks": [
                    { "name": "video", "ports": [6000, 6001] },
                    { "name": "audio", "ports": [6002, 6003] },
                    { "name": "talk", "ports": [8000, 8001] }
                ]
            }
        }))
    }

    #[tokio::test]
    async fn pairs_all_three_tracks() {
        let store = Arc::new(RelayStore::new());
        let service = PortMapService::new(store.clone());

        let report = service.apply(&full_request()).await.unwrap();
        assert_eq!(
            report,
            PairingReport {
                added: 6,
                ..Default::default()
            }
        );

        let video = store.route(&ep("10.0.0.9:6000")).await.unwrap();
        assert_eq!(video.receivers, vec![ep("10.0.0.5:5000")]);
        assert_eq!(video.kind, StreamKind::Media);

        let video_rtcp = store.route(&ep("10.0.0.5:5001")).await.unwrap();
        assert_eq!(video_rtcp.receivers, vec![ep("10.0.0.9:6001")]);
        assert_eq!(video_rtcp.kind, StreamKind::Control);

        let status = store.rtcp_status(&ep("10.0.0.5:5001")).await.unwrap();
        assert!(status.active);
        assert_eq!(status.paired_sender, ep("10.0.0.9:6000"));

        let audio = store.route(&ep("10.0.0.9:6002")).await.unwrap();
        assert_eq!(audio.receivers, vec![ep("10.0.0.5:5002")]);

        let talk = store.route(&ep("10.0.0.5:7000")).await.unwrap();
        assert_eq!(talk.receivers, vec![ep("10.0.0.9:8000")]);
        assert_eq!(talk.kind, StreamKind::Control);

        let talk_back = store.route(&ep("10.0.0.9:8001")).await.unwrap();
        assert_eq!(talk_back.receivers, vec![ep("10.0.0.5:7001")]);
        assert_eq!(talk_back.kind, StreamKind::Media);

        let talk_status = store.rtcp_status(&ep("10.0.0.5:7000")).await.unwrap();
        assert_eq!(talk_status.paired_sender, ep("10.0.0.9:8001"));
        assert!(store.rtcp_status(&ep("10.0.0.9:8001")).await.is_none());
    }

    #[tokio::test]
    async fn repeated_request_is_deduplicated() {
        let store = Arc::new(RelayStore::new());
        let service = PortMapService::new(store.clone());

        service.apply(&full_request()).await.unwrap();
        let report = service.apply(&full_request()).await.unwrap();

        assert_eq!(report.duplicates, 6);
        assert_eq!(report.added, 0);
        assert_eq!(store.len().await, 6);
        let video = store.route(&ep("10.0.0.9:6000")).await.unwrap();
        assert_eq!(video.receivers.len(), 1);
    }

    #[tokio::test]
    async fn bad_port_only_affects_its_track() {
        let store = Arc::new(RelayStore::new());
        let service = PortMapService::new(store.clone());

        let mut req = full_request();
        req.app.tracks[1] = serde_json::from_value(json!({ "name": "audio", "ports": [0, 5003] })).unwrap();

        let report = service.apply(&req).await.unwrap();

        assert_eq!(report.added, 5);
        assert_eq!(report.skipped, 1);
        assert!(store.route(&ep("10.0.0.9:6002")).await.is_none());
        assert!(store.route(&ep("10.0.0.5:5003")).await.is_some());
        assert!(store.route(&ep("10.0.0.9:6000")).await.is_some());
        assert!(store.route(&ep("10.0.0.5:7000")).await.is_some());
    }

    #[tokio::test]
    async fn null_port_only_affects_its_track() {
        let store = Arc::new(RelayStore::new());
        let service = PortMapService::new(store.clone());

        let mut req = full_request();
        req.camera.tracks[0] =
            serde_json::from_value(json!({ "name": "video", "ports": [6000, null] })).unwrap();

        let report = service.apply(&req).await.unwrap();

        assert_eq!(report.added, 5);
        assert_eq!(report.skipped, 1);
        assert!(store.route(&ep("10.0.0.9:6000")).await.is_some());
        assert!(store.route(&ep("10.0.0.5:5001")).await.is_none());
        assert!(store.rtcp_status(&ep("10.0.0.5:5001")).await.is_none());
    }

    #[tokio::test]
    async fn missing_track_is_rejected_before_mutation() {
        let store = Arc::new(RelayStore::new());
        let service = PortMapService::new(store.clone());

        let mut req = full_request();
        req.camera.tracks.retain(|t| t.name != "talk");

        let err = service.apply(&req).await.unwrap_err();
        match err {
            AppError::BadRequest(msg) => assert_eq!(msg, "camera: missing talk track"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn missing_or_invalid_address_is_rejected() {
        let store = Arc::new(RelayStore::new());
        let service = PortMapService::new(store.clone());

        let mut req = full_request();
        req.app.addresses.clear();
        assert!(matches!(
            service.apply(&req).await,
            Err(AppError::BadRequest(_))
        ));

        let mut req = full_request();
        req.camera.addresses = vec!["camera.local".into()];
        assert!(matches!(
            service.apply(&req).await,
            Err(AppError::BadRequest(_))
        ));

        assert!(store.is_empty().await);
    }
}
