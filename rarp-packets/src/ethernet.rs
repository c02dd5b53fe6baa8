use crate::*;
use std::borrow::Cow;
use std::convert::{TryFrom, TryInto};

/// Length of an untagged Ethernet II header.
pub const ETHERNET_HEADER_LEN: usize = 14;

/// The decoded fields of an Ethernet II header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EthernetHeader {
    pub dest_mac: MacAddr,
    pub src_mac: MacAddr,
    pub ether_type: u16,
}

#[derive(Clone, Debug)]
pub struct EthernetFrame {
    pub data: PacketData,
    pub payload_offset: usize,
}

impl EthernetFrame {
    pub fn from_buffer(frame: PacketData) -> Result<EthernetFrame, &'static str> {
        // Ethernet II frames must be at least the header, which is 14bytes
        // 0                    6                    12                      14
        // |---6 byte Dest_MAC--|---6 byte Src_MAC---|--2 Byte EtherType---|
        // RARP is only carried in untagged Ethernet II frames here.

        if frame.len() < ETHERNET_HEADER_LEN {
            return Err("Frame is less than the minimum of 14 bytes");
        }

        Ok(EthernetFrame {
            data: frame,
            payload_offset: ETHERNET_HEADER_LEN,
        })
    }

    /// Returns an empty EthernetFrame where all values all populated to zero. This function allocates a
    /// new array to hold the header.
    pub fn empty() -> EthernetFrame {
        EthernetFrame {
            data: vec![0; ETHERNET_HEADER_LEN],
            payload_offset: ETHERNET_HEADER_LEN,
        }
    }

    pub fn dest_mac(&self) -> MacAddr {
        let bytes = <[u8; 6]>::try_from(&self.data[0..6]).unwrap();
        MacAddr::new(bytes)
    }

    pub fn src_mac(&self) -> MacAddr {
        let bytes = <[u8; 6]>::try_from(&self.data[6..12]).unwrap();
        MacAddr::new(bytes)
    }

    pub fn set_dest_mac(&mut self, mac: MacAddr) {
        self.data[..6].copy_from_slice(&mac.bytes[..6]);
    }

    pub fn set_src_mac(&mut self, mac: MacAddr) {
        self.data[6..12].copy_from_slice(&mac.bytes[..6]);
    }

    pub fn ether_type(&self) -> u16 {
        u16::from_be_bytes(self.data[12..=13].try_into().unwrap())
    }

    pub fn set_ether_type(&mut self, ether_type: u16) {
        self.data[12..=13].copy_from_slice(&ether_type.to_be_bytes());
    }

    pub fn header(&self) -> EthernetHeader {
        EthernetHeader {
            dest_mac: self.dest_mac(),
            src_mac: self.src_mac(),
            ether_type: self.ether_type(),
        }
    }

    // This gives you a cow of a slice of the payload.
    pub fn payload(&self) -> Cow<[u8]> {
        Cow::from(&self.data[self.payload_offset..])
    }

    pub fn set_payload(&mut self, payload: &[u8]) {
        self.data.truncate(self.payload_offset);
        self.data.reserve_exact(payload.len());
        self.data.extend(payload);
    }
}

/// EthernetFrames are considered the same if they carry the same bytes.
impl PartialEq for EthernetFrame {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl Eq for EthernetFrame {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    #[test]
    fn ethernet_frame() {
        let data: Vec<u8> = vec![0xde, 0xad, 0xbe, 0xef, 0xff, 0xff, 1, 2, 3, 4, 5, 6, 0, 0];
        let frame = EthernetFrame::from_buffer(data).unwrap();
        assert_eq!(
            frame.dest_mac(),
            MacAddr::new([0xde, 0xad, 0xbe, 0xef, 0xff, 0xff])
        );
        assert_eq!(frame.src_mac(), MacAddr::new([1, 2, 3, 4, 5, 6]));
        assert_eq!(frame.ether_type(), 0);
        assert_eq!(frame.payload().len(), 0);
    }

    #[test]
    fn set_payload() {
        let data: Vec<u8> = vec![0xde, 0xad, 0xbe, 0xef, 0xff, 0xff, 1, 2, 3, 4, 5, 6, 0, 0];
        let mut frame = EthernetFrame::from_buffer(data).unwrap();
        assert_eq!(frame.ether_type(), 0);
        assert_eq!(frame.payload().len(), 0);

        let new_payload: Vec<u8> = vec![1, 2, 3, 4, 5, 6, 7, 8, 9];
        frame.set_payload(&new_payload);
        assert_eq!(frame.payload(), new_payload);
        assert_eq!(frame.payload()[2], 3);
    }

    #[test]
    #[should_panic(expected = "Frame is less than the minimum of 14 bytes")]
    fn invalid_data_length() {
        let data: Vec<u8> = vec![0xde, 0xad, 0xbe, 0xef, 0xff, 0xff, 1, 2, 3, 4, 5, 6];
        let _frame = EthernetFrame::from_buffer(data).unwrap();
    }

    #[test]
    fn set_header_fields() {
        let mut frame = EthernetFrame::empty();
        let new_dest = MacAddr::new([0x98, 0x88, 0x18, 0x12, 0xb4, 0xdf]);
        let new_src = MacAddr::new([1, 2, 3, 4, 5, 6]);
        frame.set_dest_mac(new_dest);
        frame.set_src_mac(new_src);
        frame.set_ether_type(RARP_ETHER_TYPE);
        assert_eq!(
            frame.header(),
            EthernetHeader {
                dest_mac: new_dest,
                src_mac: new_src,
                ether_type: RARP_ETHER_TYPE,
            }
        );
        assert_eq!(&frame.data[12..14], &[0x80, 0x35]);
    }

    #[test]
    fn empty() {
        let empty_frame = EthernetFrame::empty();
        assert_eq!(empty_frame.data.len(), ETHERNET_HEADER_LEN);
        assert_eq!(empty_frame.payload_offset, 14);
        assert_eq!(empty_frame.header().ether_type, 0);
    }
}
