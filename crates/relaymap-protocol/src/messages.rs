use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Port-map request posted when an app and a camera finish negotiating a
/// session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortMapRequest {
    pub app: SideDescription,
    pub camera: SideDescription,
}

/// One side of a negotiated session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SideDescription {
    /// Candidate addresses, most preferred first. Only the first is used.
    pub addresses: Vec<String>,
    pub tracks: Vec<TrackDescription>,
}

impl SideDescription {
    /// Looks up a track by name. If a name repeats, the last one wins.
    pub fn track(&self, name: &str) -> Option<&TrackDescription> {
        self.tracks.iter().rev().find(|t| t.name == name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackDescription {
    pub name: String,
    /// `[primary, secondary]`, i.e. the RTP port followed by the RTCP port.
    /// A `null` entry marks a port the side did not negotiate.
    pub ports: Vec<Option<Number>>,
}

impl TrackDescription {
    pub fn new(name: impl Into<String>, primary: u16, secondary: u16) -> Self {
        Self {
            name: name.into(),
            ports: vec![Some(primary.into()), Some(secondary.into())],
        }
    }

    /// Port at `index` if present, non-null and a valid UDP port (an integer
    /// in `1..=65535`). Integral floats such as `5000.0` are accepted.
    pub fn port(&self, index: usize) -> Option<u16> {
        let n = self.ports.get(index)?.as_ref()?;
        let value = match n.as_u64() {
            Some(v) => v,
            None => {
                let f = n.as_f64()?;
                if f.fract() != 0.0 || f < 1.0 {
                    return None;
                }
                f as u64
            }
        };
        u16::try_from(value).ok().filter(|p| *p > 0)
    }
}
