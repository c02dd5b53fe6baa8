use crate::channel::{Channel, ChannelError};
use crate::mapping::MappingTable;
use rarp_packets::{decode, encode_reply, DecodeError, MacAddr};
use std::net::Ipv4Addr;
use thiserror::Error;
use tracing::{debug, warn};

/// The addresses this server answers from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerIdentity {
    pub mac: MacAddr,
    pub ip: Ipv4Addr,
}

/// Why a received frame produced no reply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Discard {
    #[error("skip frame: {0}")]
    Malformed(#[from] DecodeError),
    #[error("ignore opcode {0}")]
    NotARequest(u16),
    #[error("no mapping for {0}")]
    Unmapped(MacAddr),
}

/// A reply ready to go out, with what it assigns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub requester: MacAddr,
    pub assigned: Ipv4Addr,
    pub frame: Vec<u8>,
}

pub struct Dispatcher {
    identity: ServerIdentity,
    table: MappingTable,
}

impl Dispatcher {
    pub fn new(identity: ServerIdentity, table: MappingTable) -> Self {
        Dispatcher { identity, table }
    }

    ///
    /// Turns one received frame into the reply to send back, if any.
    ///
    /// A RARP requester asks "what is my protocol address" by putting its own hardware address
    /// in the target hardware address field, so that field is the lookup key. Requests for
    /// unknown hardware addresses are dropped; no negative reply exists in RARP.
    ///
    pub fn handle(&self, frame: &[u8]) -> Result<Reply, Discard> {
        let (_, request) = decode(frame)?;
        if !request.is_request() {
            return Err(Discard::NotARequest(request.opcode));
        }

        let requester = request.target_hardware_addr;
        let assigned = self
            .table
            .get(&requester)
            .ok_or(Discard::Unmapped(requester))?;

        Ok(Reply {
            requester,
            assigned,
            frame: encode_reply(self.identity.mac, self.identity.ip, requester, assigned),
        })
    }

    /// Answers requests one frame at a time until the channel fails to read, and returns that
    /// failure. Everything else is logged and skipped.
    pub fn serve<C: Channel>(&self, channel: &mut C) -> ChannelError {
        loop {
            let frame = match channel.receive() {
                Ok(frame) => frame,
                Err(e) => return e,
            };

            let reply = match self.handle(&frame) {
                Ok(reply) => reply,
                Err(discard) => {
                    debug!("{}", discard);
                    continue;
                }
            };

            match channel.transmit(&reply.frame) {
                Ok(()) => debug!("answered RARP for {} -> {}", reply.requester, reply.assigned),
                Err(e) => warn!("reply to {} failed: {}", reply.requester, e),
            }
        }
    }
}
