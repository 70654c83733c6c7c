//! Wire types shared between the relaymap server and the processes that
//! consume its forwarding table.

pub mod messages;
pub mod types;

pub use messages::*;
pub use types::*;
