use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Owned bytes of a frame, starting at the beginning of the link-layer header.
pub type PacketData = Vec<u8>;

pub const RARP_ETHER_TYPE: u16 = 0x8035;
pub const IPV4_ETHER_TYPE: u16 = 0x0800;

///
/// A 48-bit Ethernet hardware address.
///
/// Textual forms accepted by `FromStr` are six two-digit hex groups separated by
/// either `:` or `-`, in any letter case. `Display` always prints the lowercase,
/// colon-separated form.
///
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacAddr {
    pub bytes: [u8; 6],
}

impl MacAddr {
    pub const BROADCAST: MacAddr = MacAddr { bytes: [0xff; 6] };

    pub fn new(bytes: [u8; 6]) -> Self {
        MacAddr { bytes }
    }

    pub fn is_broadcast(&self) -> bool {
        *self == MacAddr::BROADCAST
    }
}

impl From<[u8; 6]> for MacAddr {
    fn from(bytes: [u8; 6]) -> Self {
        MacAddr::new(bytes)
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.bytes;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid hardware address {0:?}")]
pub struct MacAddrParseError(pub String);

impl FromStr for MacAddr {
    type Err = MacAddrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || MacAddrParseError(s.to_string());

        // Separators may not be mixed within one address
        let separator = if s.contains(':') { ':' } else { '-' };

        let mut bytes = [0u8; 6];
        let mut groups = s.split(separator);
        for byte in bytes.iter_mut() {
            let group = groups.next().ok_or_else(err)?;
            if group.len() != 2 || !group.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(err());
            }
            *byte = u8::from_str_radix(group, 16).map_err(|_| err())?;
        }
        if groups.next().is_some() {
            return Err(err());
        }

        Ok(MacAddr::new(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_colon_separated() {
        let mac: MacAddr = "aa:bb:cc:dd:ee:ff".parse().unwrap();
        assert_eq!(mac, MacAddr::new([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]));
    }

    #[test]
    fn parse_is_case_insensitive() {
        let upper: MacAddr = "AA:BB:CC:DD:EE:FF".parse().unwrap();
        let lower: MacAddr = "aa:bb:cc:dd:ee:ff".parse().unwrap();
        assert_eq!(upper, lower);
    }

    #[test]
    fn parse_dash_separated() {
        let mac: MacAddr = "52-54-00-12-34-56".parse().unwrap();
        assert_eq!(mac, MacAddr::new([0x52, 0x54, 0x00, 0x12, 0x34, 0x56]));
    }

    #[test]
    fn parse_rejects_malformed() {
        for text in &[
            "",
            "aa:bb:cc:dd:ee",
            "aa:bb:cc:dd:ee:ff:00",
            "aa:bb:cc:dd:ee:gg",
            "a:bb:cc:dd:ee:ff",
            "aa:bb-cc:dd:ee:ff",
            "aabbccddeeff",
            "+a:bb:cc:dd:ee:ff",
        ] {
            assert_eq!(
                text.parse::<MacAddr>(),
                Err(MacAddrParseError(text.to_string())),
                "{:?} should not parse",
                text
            );
        }
    }

    #[test]
    fn display_round_trips_through_parse() {
        let mac = MacAddr::new([0x52, 0x54, 0x00, 0x0a, 0xbc, 0xde]);
        assert_eq!(mac.to_string(), "52:54:00:0a:bc:de");
        assert_eq!(mac.to_string().parse::<MacAddr>().unwrap(), mac);
    }

    #[test]
    fn broadcast() {
        assert!(MacAddr::new([0xff; 6]).is_broadcast());
        assert!(!MacAddr::default().is_broadcast());
    }
}
