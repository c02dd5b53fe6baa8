use crate::interface::InterfaceDescriptor;
use afpacket::{BoundSocket, Socket};
use rarp_packets::RARP_ETHER_TYPE;
use std::io;
use thiserror::Error;
use tracing::trace;

/// Receive buffer size, comfortably above a standard Ethernet MTU.
pub const RECV_BUFFER_LEN: usize = 2048;

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("opening packet socket: {0}")]
    SocketOpen(#[source] io::Error),
    #[error("binding packet socket: {0}")]
    Bind(#[source] io::Error),
    #[error("reading from packet socket: {0}")]
    Read(#[source] io::Error),
    #[error("sending on packet socket: {0}")]
    Write(#[source] io::Error),
}

/// A source and sink of raw Ethernet frames.
pub trait Channel {
    /// Blocks until the next frame arrives.
    fn receive(&mut self) -> Result<Vec<u8>, ChannelError>;

    /// Sends one complete frame; its first six bytes are the destination.
    fn transmit(&mut self, frame: &[u8]) -> Result<(), ChannelError>;
}

/// An `AF_PACKET` socket that only sees RARP frames on one interface.
pub struct PacketChannel {
    socket: BoundSocket,
    buffer: Vec<u8>,
}

impl PacketChannel {
    pub fn open(interface: &InterfaceDescriptor) -> Result<Self, ChannelError> {
        let socket = Socket::new(RARP_ETHER_TYPE).map_err(ChannelError::SocketOpen)?;
        let socket = socket.bind(interface.index).map_err(ChannelError::Bind)?;
        Ok(PacketChannel {
            socket,
            buffer: vec![0; RECV_BUFFER_LEN],
        })
    }
}

impl Channel for PacketChannel {
    fn receive(&mut self) -> Result<Vec<u8>, ChannelError> {
        loop {
            match self.socket.recv(&mut self.buffer) {
                // Our own replies come back to us on a packet socket
                Ok((_, addr)) if addr.is_outgoing() => {
                    trace!("skipping outgoing frame");
                }
                Ok((len, _)) => return Ok(self.buffer[..len].to_vec()),
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(ChannelError::Read(e)),
            }
        }
    }

    fn transmit(&mut self, frame: &[u8]) -> Result<(), ChannelError> {
        self.socket.send(frame).map_err(ChannelError::Write)?;
        Ok(())
    }
}
