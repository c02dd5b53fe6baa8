use afpacket::NetDevice;
use rarp_packets::MacAddr;
use std::io;
use std::net::Ipv4Addr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InterfaceError {
    #[error("interface {0} not found")]
    InterfaceNotFound(String),
    #[error("interface {0} is down")]
    InterfaceDown(String),
    #[error("interface {0} has no 6-byte hardware address")]
    MissingHardwareAddress(String),
    #[error("interface {0} has no IPv4 address")]
    NoIPv4Address(String),
    #[error("querying interface {name}: {source}")]
    Query {
        name: String,
        #[source]
        source: io::Error,
    },
}

/// The interface the server binds to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceDescriptor {
    pub name: String,
    pub index: i32,
    pub mac: MacAddr,
}

fn query(name: &str) -> Result<NetDevice, InterfaceError> {
    NetDevice::query(name).map_err(|source| match source.raw_os_error() {
        Some(libc::ENODEV) | Some(libc::ENXIO) => {
            InterfaceError::InterfaceNotFound(name.to_string())
        }
        _ => InterfaceError::Query {
            name: name.to_string(),
            source,
        },
    })
}

/// Looks up `name` and checks it can carry RARP: it must be up, running, and Ethernet.
pub fn resolve(name: &str) -> Result<InterfaceDescriptor, InterfaceError> {
    let device = query(name)?;
    if !device.is_up() || !device.is_running() {
        return Err(InterfaceError::InterfaceDown(name.to_string()));
    }
    let mac = device
        .hardware_addr()
        .ok_or_else(|| InterfaceError::MissingHardwareAddress(name.to_string()))?;

    Ok(InterfaceDescriptor {
        name: name.to_string(),
        index: device.index(),
        mac: MacAddr::new(mac),
    })
}

pub fn first_ipv4(name: &str) -> Result<Ipv4Addr, InterfaceError> {
    let device = query(name)?;
    let addrs = device.ipv4_addrs().map_err(|source| InterfaceError::Query {
        name: name.to_string(),
        source,
    })?;
    addrs
        .first()
        .copied()
        .ok_or_else(|| InterfaceError::NoIPv4Address(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_interface() {
        match resolve("nosuchdev0") {
            Err(InterfaceError::InterfaceNotFound(name)) => assert_eq!(name, "nosuchdev0"),
            other => panic!("unexpected {:?}", other),
        }
        match first_ipv4("nosuchdev0") {
            Err(InterfaceError::InterfaceNotFound(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn overlong_name_is_not_found() {
        assert!(matches!(
            resolve("thisnameistoolongforlinux"),
            Err(InterfaceError::InterfaceNotFound(_))
        ));
    }

    #[test]
    fn loopback_is_rejected() {
        // Depending on the sandbox, lo is either down or up without an Ethernet address
        match resolve("lo") {
            Err(InterfaceError::InterfaceDown(_))
            | Err(InterfaceError::MissingHardwareAddress(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }
}
