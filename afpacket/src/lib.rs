#![cfg(target_os = "linux")]
mod linux;
mod netdev;
mod sockets;

pub use netdev::NetDevice;
pub use sockets::{Addr, BoundSocket, Socket};
