use crate::{
    EthernetFrame, EthernetHeader, MacAddr, ETHERNET_HEADER_LEN, IPV4_ETHER_TYPE, RARP_ETHER_TYPE,
};
use std::convert::{TryFrom, TryInto};
use std::net::Ipv4Addr;
use thiserror::Error;

/// Operation codes defined by RFC 903. ARP's own request/reply codes (1 and 2) are
/// never answered by a RARP server.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RarpOp {
    Request = 3,
    Reply = 4,
}

pub enum ArpHardwareType {
    Ethernet = 1,
}

/// Size of the RARP body for Ethernet hardware and IPv4 protocol addresses.
pub const RARP_PAYLOAD_LEN: usize = 28;

/// Smallest frame that can hold an Ethernet header and a full RARP body.
pub const RARP_FRAME_LEN: usize = ETHERNET_HEADER_LEN + RARP_PAYLOAD_LEN;

// Offsets are relative to the start of the RARP body. The layout is fixed for
// Ethernet/IPv4, so the address length fields are not used to locate fields.
const HARDWARE_TYPE_RANGE: (usize, usize) = (0, 2);
const PROTOCOL_TYPE_RANGE: (usize, usize) = (2, 4);
const HARDWARE_ADDR_LEN_RANGE: (usize, usize) = (4, 5);
const PROTOCOL_ADDR_LEN_RANGE: (usize, usize) = (5, 6);
const OPCODE_RANGE: (usize, usize) = (6, 8);
const SENDER_HARDWARE_ADDR_RANGE: (usize, usize) = (8, 14);
const SENDER_PROTOCOL_ADDR_RANGE: (usize, usize) = (14, 18);
const TARGET_HARDWARE_ADDR_RANGE: (usize, usize) = (18, 24);
const TARGET_PROTOCOL_ADDR_RANGE: (usize, usize) = (24, 28);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("frame too short: {len} bytes, need at least {}", RARP_FRAME_LEN)]
    FrameTooShort { len: usize },
    #[error("not a RARP ethertype: {0:#06x}")]
    WrongEthertype(u16),
}

/// A RARP body with every field decoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RarpMessage {
    pub hardware_type: u16,
    pub protocol_type: u16,
    pub hardware_addr_len: u8,
    pub protocol_addr_len: u8,
    pub opcode: u16,
    pub sender_hardware_addr: MacAddr,
    pub sender_protocol_addr: Ipv4Addr,
    pub target_hardware_addr: MacAddr,
    pub target_protocol_addr: Ipv4Addr,
}

impl RarpMessage {
    /// A message with the Ethernet/IPv4 constants filled in and everything else zeroed.
    pub fn ethernet_ipv4(opcode: RarpOp) -> Self {
        RarpMessage {
            hardware_type: ArpHardwareType::Ethernet as u16,
            protocol_type: IPV4_ETHER_TYPE,
            hardware_addr_len: 6,
            protocol_addr_len: 4,
            opcode: opcode as u16,
            sender_hardware_addr: MacAddr::default(),
            sender_protocol_addr: Ipv4Addr::UNSPECIFIED,
            target_hardware_addr: MacAddr::default(),
            target_protocol_addr: Ipv4Addr::UNSPECIFIED,
        }
    }

    pub fn is_request(&self) -> bool {
        self.opcode == RarpOp::Request as u16
    }

    ///
    /// Serializes the message into a 42 byte frame. The Ethernet source and destination are
    /// taken from the message's sender and target hardware addresses.
    ///
    pub fn to_frame(&self) -> RarpFrame {
        let mut rarp_frame = RarpFrame::new();
        rarp_frame.set_hardware_type(self.hardware_type);
        rarp_frame.set_protocol_type(self.protocol_type);
        rarp_frame.set_hardware_addr_len(self.hardware_addr_len);
        rarp_frame.set_protocol_addr_len(self.protocol_addr_len);
        rarp_frame.set_opcode(self.opcode);
        rarp_frame.set_sender_hardware_addr(self.sender_hardware_addr);
        rarp_frame.set_sender_protocol_addr(self.sender_protocol_addr);
        rarp_frame.set_target_hardware_addr(self.target_hardware_addr);
        rarp_frame.set_target_protocol_addr(self.target_protocol_addr);

        let frame = rarp_frame.frame_mut();
        frame.set_dest_mac(self.target_hardware_addr);
        frame.set_src_mac(self.sender_hardware_addr);
        rarp_frame
    }
}

///
/// EthernetFrame wrapper with getters/setters for the packet structure described in RFC 903
/// https://tools.ietf.org/html/rfc903
///
#[derive(Clone, Debug)]
pub struct RarpFrame {
    frame: EthernetFrame,
}

impl RarpFrame {
    ///
    /// Constructs a zeroed 42 byte frame carrying the RARP ether type.
    ///
    pub fn new() -> Self {
        let mut frame = EthernetFrame::empty();
        frame.set_payload(&[0; RARP_PAYLOAD_LEN]);
        frame.set_ether_type(RARP_ETHER_TYPE);
        RarpFrame { frame }
    }

    pub fn hardware_type(&self) -> u16 {
        let (start, end) = HARDWARE_TYPE_RANGE;
        u16::from_be_bytes(self.rarp_data(start, end).try_into().unwrap())
    }

    pub fn protocol_type(&self) -> u16 {
        let (start, end) = PROTOCOL_TYPE_RANGE;
        u16::from_be_bytes(self.rarp_data(start, end).try_into().unwrap())
    }

    pub fn hardware_addr_len(&self) -> u8 {
        let (start, end) = HARDWARE_ADDR_LEN_RANGE;
        self.rarp_data(start, end)[0]
    }

    pub fn protocol_addr_len(&self) -> u8 {
        let (start, end) = PROTOCOL_ADDR_LEN_RANGE;
        self.rarp_data(start, end)[0]
    }

    pub fn opcode(&self) -> u16 {
        let (start, end) = OPCODE_RANGE;
        u16::from_be_bytes(self.rarp_data(start, end).try_into().unwrap())
    }

    pub fn sender_hardware_addr(&self) -> MacAddr {
        let (start, end) = SENDER_HARDWARE_ADDR_RANGE;
        MacAddr::new(self.rarp_data(start, end).try_into().unwrap())
    }

    pub fn sender_protocol_addr(&self) -> Ipv4Addr {
        let (start, end) = SENDER_PROTOCOL_ADDR_RANGE;
        Ipv4Addr::from(<[u8; 4]>::try_from(self.rarp_data(start, end)).unwrap())
    }

    pub fn target_hardware_addr(&self) -> MacAddr {
        let (start, end) = TARGET_HARDWARE_ADDR_RANGE;
        MacAddr::new(self.rarp_data(start, end).try_into().unwrap())
    }

    pub fn target_protocol_addr(&self) -> Ipv4Addr {
        let (start, end) = TARGET_PROTOCOL_ADDR_RANGE;
        Ipv4Addr::from(<[u8; 4]>::try_from(self.rarp_data(start, end)).unwrap())
    }

    pub fn set_hardware_type(&mut self, htype: u16) {
        let (start, end) = HARDWARE_TYPE_RANGE;
        self.set_rarp_data(&htype.to_be_bytes(), start, end);
    }

    pub fn set_protocol_type(&mut self, ptype: u16) {
        let (start, end) = PROTOCOL_TYPE_RANGE;
        self.set_rarp_data(&ptype.to_be_bytes(), start, end);
    }

    pub fn set_hardware_addr_len(&mut self, len: u8) {
        let (start, end) = HARDWARE_ADDR_LEN_RANGE;
        self.set_rarp_data(&[len], start, end);
    }

    pub fn set_protocol_addr_len(&mut self, len: u8) {
        let (start, end) = PROTOCOL_ADDR_LEN_RANGE;
        self.set_rarp_data(&[len], start, end);
    }

    pub fn set_opcode(&mut self, code: u16) {
        let (start, end) = OPCODE_RANGE;
        self.set_rarp_data(&code.to_be_bytes(), start, end);
    }

    pub fn set_sender_hardware_addr(&mut self, addr: MacAddr) {
        let (start, end) = SENDER_HARDWARE_ADDR_RANGE;
        self.set_rarp_data(&addr.bytes, start, end);
    }

    pub fn set_sender_protocol_addr(&mut self, addr: Ipv4Addr) {
        let (start, end) = SENDER_PROTOCOL_ADDR_RANGE;
        self.set_rarp_data(&addr.octets(), start, end);
    }

    pub fn set_target_hardware_addr(&mut self, addr: MacAddr) {
        let (start, end) = TARGET_HARDWARE_ADDR_RANGE;
        self.set_rarp_data(&addr.bytes, start, end);
    }

    pub fn set_target_protocol_addr(&mut self, addr: Ipv4Addr) {
        let (start, end) = TARGET_PROTOCOL_ADDR_RANGE;
        self.set_rarp_data(&addr.octets(), start, end);
    }

    pub fn message(&self) -> RarpMessage {
        RarpMessage {
            hardware_type: self.hardware_type(),
            protocol_type: self.protocol_type(),
            hardware_addr_len: self.hardware_addr_len(),
            protocol_addr_len: self.protocol_addr_len(),
            opcode: self.opcode(),
            sender_hardware_addr: self.sender_hardware_addr(),
            sender_protocol_addr: self.sender_protocol_addr(),
            target_hardware_addr: self.target_hardware_addr(),
            target_protocol_addr: self.target_protocol_addr(),
        }
    }

    pub fn frame_mut(&mut self) -> &mut EthernetFrame {
        &mut self.frame
    }

    // Move ownership of the frame back to the caller
    pub fn frame(self) -> EthernetFrame {
        self.frame
    }

    // Returns the bytes of the RARP body between start and end, exclusive
    fn rarp_data(&self, start: usize, end: usize) -> &[u8] {
        let offset = self.frame.payload_offset;
        &self.frame.data[offset + start..offset + end]
    }

    fn set_rarp_data(&mut self, bytes: &[u8], start: usize, end: usize) {
        let offset = self.frame.payload_offset;
        self.frame.data[offset + start..offset + end].copy_from_slice(bytes);
    }
}

impl Default for RarpFrame {
    fn default() -> Self {
        RarpFrame::new()
    }
}

impl TryFrom<EthernetFrame> for RarpFrame {
    type Error = DecodeError;

    ///
    /// Decorates the given EthernetFrame with RarpFrame getters/setters.
    /// Validates
    /// - The frame is long enough to hold the whole RARP body
    /// - The frame has the RARP ether type
    ///
    /// Anything past the RARP body (padding, trailer) is kept but never read.
    ///
    fn try_from(frame: EthernetFrame) -> Result<Self, Self::Error> {
        if frame.data.len() < frame.payload_offset + RARP_PAYLOAD_LEN {
            return Err(DecodeError::FrameTooShort {
                len: frame.data.len(),
            });
        }
        if frame.ether_type() != RARP_ETHER_TYPE {
            return Err(DecodeError::WrongEthertype(frame.ether_type()));
        }

        Ok(RarpFrame { frame })
    }
}

///
/// Parses a raw frame as received from the wire.
///
pub fn decode(bytes: &[u8]) -> Result<(EthernetHeader, RarpMessage), DecodeError> {
    if bytes.len() < RARP_FRAME_LEN {
        return Err(DecodeError::FrameTooShort { len: bytes.len() });
    }
    let frame = EthernetFrame::from_buffer(bytes[..RARP_FRAME_LEN].to_vec())
        .map_err(|_| DecodeError::FrameTooShort { len: bytes.len() })?;
    let rarp_frame = RarpFrame::try_from(frame)?;
    Ok((rarp_frame.frame.header(), rarp_frame.message()))
}

///
/// Builds the 42 byte reply telling `target_mac` that its protocol address is `target_ip`.
///
pub fn encode_reply(
    server_mac: MacAddr,
    server_ip: Ipv4Addr,
    target_mac: MacAddr,
    target_ip: Ipv4Addr,
) -> Vec<u8> {
    let mut reply = RarpMessage::ethernet_ipv4(RarpOp::Reply);
    reply.sender_hardware_addr = server_mac;
    reply.sender_protocol_addr = server_ip;
    reply.target_hardware_addr = target_mac;
    reply.target_protocol_addr = target_ip;
    reply.to_frame().frame().data
}
