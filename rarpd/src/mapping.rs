use rarp_packets::MacAddr;
use std::collections::{hash_map, HashMap};
use std::net::Ipv4Addr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("invalid mapping entry {0:?} (want mac=ipv4)")]
    InvalidMappingEntry(String),
    #[error("invalid MAC address {0:?}")]
    InvalidMacAddress(String),
    #[error("invalid IPv4 address {0:?}")]
    InvalidIPv4Address(String),
}

/// Static hardware address to IPv4 address assignments. Built once from the command line and
/// never modified afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingTable {
    entries: HashMap<MacAddr, Ipv4Addr>,
}

impl MappingTable {
    ///
    /// Parses `mac=ipv4` entries separated by commas, e.g.
    /// `52:54:00:12:34:56=192.168.1.10,aa:bb:cc:dd:ee:ff=192.168.1.11`.
    ///
    /// Whitespace around entries and around either side of `=` is ignored, as are empty entries,
    /// so an empty string gives an empty table. A MAC listed twice keeps its last address.
    ///
    pub fn parse(spec: &str) -> Result<Self, MappingError> {
        let mut entries = HashMap::new();

        for entry in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let parts: Vec<&str> = entry.split('=').map(str::trim).collect();
            let (mac, ip) = match parts.as_slice() {
                [mac, ip] => (*mac, *ip),
                _ => return Err(MappingError::InvalidMappingEntry(entry.to_string())),
            };

            let mac: MacAddr = mac
                .parse()
                .map_err(|_| MappingError::InvalidMacAddress(mac.to_string()))?;
            let ip: Ipv4Addr = ip
                .parse()
                .map_err(|_| MappingError::InvalidIPv4Address(ip.to_string()))?;

            entries.insert(mac, ip);
        }

        Ok(MappingTable { entries })
    }

    pub fn get(&self, mac: &MacAddr) -> Option<Ipv4Addr> {
        self.entries.get(mac).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, MacAddr, Ipv4Addr> {
        self.entries.iter()
    }
}

impl From<HashMap<MacAddr, Ipv4Addr>> for MappingTable {
    fn from(entries: HashMap<MacAddr, Ipv4Addr>) -> Self {
        MappingTable { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maplit::hashmap;

    fn mac(text: &str) -> MacAddr {
        text.parse().unwrap()
    }

    #[test]
    fn single_entry() {
        let table = MappingTable::parse("aa:bb:cc:dd:ee:ff=10.0.0.5").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.get(&mac("aa:bb:cc:dd:ee:ff")),
            Some(Ipv4Addr::new(10, 0, 0, 5))
        );
    }

    #[test]
    fn empty_input_gives_empty_table() {
        assert!(MappingTable::parse("").unwrap().is_empty());
        assert!(MappingTable::parse("   ").unwrap().is_empty());
    }

    #[test]
    fn several_entries_with_whitespace() {
        let table = MappingTable::parse(
            " 52:54:00:12:34:56 = 192.168.1.10 ,AA:BB:CC:DD:EE:FF=192.168.1.11, ",
        )
        .unwrap();
        assert_eq!(
            table,
            MappingTable::from(hashmap! {
                mac("52:54:00:12:34:56") => Ipv4Addr::new(192, 168, 1, 10),
                mac("aa:bb:cc:dd:ee:ff") => Ipv4Addr::new(192, 168, 1, 11),
            })
        );
    }

    #[test]
    fn last_write_wins() {
        let table =
            MappingTable::parse("aa:bb:cc:dd:ee:ff=10.0.0.5,aa:bb:cc:dd:ee:ff=10.0.0.6").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.get(&mac("aa:bb:cc:dd:ee:ff")),
            Some(Ipv4Addr::new(10, 0, 0, 6))
        );
    }

    #[test]
    fn entry_without_separator() {
        assert_eq!(
            MappingTable::parse("garbage"),
            Err(MappingError::InvalidMappingEntry("garbage".to_string()))
        );
    }

    #[test]
    fn entry_with_too_many_separators() {
        assert_eq!(
            MappingTable::parse("aa:bb:cc:dd:ee:ff=10.0.0.5=10.0.0.6"),
            Err(MappingError::InvalidMappingEntry(
                "aa:bb:cc:dd:ee:ff=10.0.0.5=10.0.0.6".to_string()
            ))
        );
    }

    #[test]
    fn bad_mac() {
        assert_eq!(
            MappingTable::parse("aa:bb:cc:dd:ee=10.0.0.5"),
            Err(MappingError::InvalidMacAddress("aa:bb:cc:dd:ee".to_string()))
        );
    }

    #[test]
    fn bad_ip() {
        for ip in &["10.0.0", "10.0.0.256", "::1", ""] {
            assert_eq!(
                MappingTable::parse(&format!("aa:bb:cc:dd:ee:ff={}", ip)),
                Err(MappingError::InvalidIPv4Address(ip.to_string()))
            );
        }
    }

    #[test]
    fn one_bad_entry_fails_the_whole_table() {
        assert!(MappingTable::parse("aa:bb:cc:dd:ee:ff=10.0.0.5,oops").is_err());
    }
}
