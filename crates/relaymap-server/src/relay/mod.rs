//! Relay table construction
//!
//! Turns the port pairs negotiated for each track into relay directives and
//! records them in the forwarding table read by the UDP relay. Each track
//! yields one media (RTP) and one control (RTCP) directive, except that the
//! talk track swaps the two labels; see [`pairing`].

pub mod endpoint;
pub mod pairing;
pub mod store;

pub use endpoint::{Endpoint, EndpointParseError};
pub use pairing::{pair_track, PortPair, RelayDirective};
pub use store::{Insertion, RelayEntry, RelayError, RelaySnapshot, RelayStore, RtcpStatus};
