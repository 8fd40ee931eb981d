//! Network input for vision and referee datagrams

mod udp;

pub use udp::{RECEIVE_TIMEOUT, UdpReceiver};
