use crate::linux;
use libc;
use std::{
    ffi::{CStr, CString},
    io,
    mem::MaybeUninit,
    net::Ipv4Addr,
    ptr,
};

/// A snapshot of a network interface, as reported by the kernel's netdevice ioctls at the time
/// of the query.
#[derive(Debug, Clone)]
pub struct NetDevice {
    name: CString,
    index: libc::c_int,
    flags: libc::c_int,
    hw_family: libc::c_ushort,
    hw_addr: [u8; 6],
}

/// A throwaway datagram socket. netdevice ioctls need some socket to be issued on, and an
/// `AF_INET` datagram socket doesn't require any privileges.
struct ControlSocket {
    fd: libc::c_int,
}

impl ControlSocket {
    fn new() -> io::Result<Self> {
        let fd = unsafe { libc::socket(libc::AF_INET, libc::SOCK_DGRAM, 0) };
        if fd < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(ControlSocket { fd })
    }

    /// Issues `request` for the interface `name` and returns the filled in request.
    fn ioctl(&self, name: &CStr, request: libc::c_ulong) -> io::Result<linux::ifreq> {
        // This block is unsafe because it uses FFI. The name is copied including its terminating
        // NUL, and callers guarantee it fits into IFNAMSIZ, so the kernel never reads past it.
        unsafe {
            let mut ifr: linux::ifreq = MaybeUninit::zeroed().assume_init();
            let bytes = name.to_bytes_with_nul();
            ptr::copy_nonoverlapping(
                bytes.as_ptr() as *const libc::c_char,
                ifr.ifr_ifrn.ifrn_name.as_mut_ptr(),
                bytes.len(),
            );
            // Resources:
            // man 7 netdevice
            let err = libc::ioctl(self.fd, request, &mut ifr);
            if err < 0 {
                return Err(io::Error::last_os_error());
            }
            Ok(ifr)
        }
    }
}

impl Drop for ControlSocket {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.fd);
        }
    }
}

impl NetDevice {
    /// Looks up an interface by name. A name that can't possibly exist (too long for the kernel,
    /// or containing a NUL byte) fails the same way as a missing interface, with `ENODEV`.
    pub fn query(name: &str) -> io::Result<Self> {
        let name = match CString::new(name) {
            Ok(name) if name.as_bytes().len() < libc::IFNAMSIZ => name,
            _ => return Err(io::Error::from_raw_os_error(libc::ENODEV)),
        };

        let control = ControlSocket::new()?;
        let index = unsafe { control.ioctl(&name, linux::SIOCGIFINDEX)?.ifr_ifru.ifru_ivalue };
        let flags = unsafe { control.ioctl(&name, linux::SIOCGIFFLAGS)?.ifr_ifru.ifru_flags };
        let hwaddr = unsafe { control.ioctl(&name, linux::SIOCGIFHWADDR)?.ifr_ifru.ifru_hwaddr };

        let mut hw_addr = [0u8; 6];
        for (dst, src) in hw_addr.iter_mut().zip(hwaddr.sa_data.iter()) {
            *dst = *src as u8;
        }

        Ok(NetDevice {
            name,
            index,
            // The kernel hands back a short, but the IFF_* constants are ints
            flags: flags as libc::c_ushort as libc::c_int,
            hw_family: hwaddr.sa_family,
            hw_addr,
        })
    }

    pub fn name(&self) -> &CStr {
        &self.name
    }

    pub fn index(&self) -> libc::c_int {
        self.index
    }

    /// Administratively up.
    pub fn is_up(&self) -> bool {
        self.flags & libc::IFF_UP == libc::IFF_UP
    }

    /// Operationally up (carrier present).
    pub fn is_running(&self) -> bool {
        self.flags & libc::IFF_RUNNING == libc::IFF_RUNNING
    }

    /// The 48-bit hardware address, if the interface is Ethernet-like. Loopback, tunnels and
    /// other non-Ethernet devices return `None`.
    pub fn hardware_addr(&self) -> Option<[u8; 6]> {
        if self.hw_family == libc::ARPHRD_ETHER {
            Some(self.hw_addr)
        } else {
            None
        }
    }

    /// Every IPv4 address configured on the interface, in the order the kernel lists them.
    /// Addresses on alias labels (`eth0:1`) count as addresses of the interface.
    pub fn ipv4_addrs(&self) -> io::Result<Vec<Ipv4Addr>> {
        let name = self.name.as_bytes();
        let mut addrs = Vec::new();

        // This block is unsafe because it walks a kernel-provided linked list. Every pointer is
        // checked for null before use and the list is freed exactly once, after the walk.
        unsafe {
            let mut head: *mut libc::ifaddrs = ptr::null_mut();
            // Resources:
            // man 3 getifaddrs
            if libc::getifaddrs(&mut head) < 0 {
                return Err(io::Error::last_os_error());
            }

            let mut cursor = head;
            while !cursor.is_null() {
                let ifa = &*cursor;
                cursor = ifa.ifa_next;

                if ifa.ifa_addr.is_null() || ifa.ifa_name.is_null() {
                    continue;
                }
                if libc::c_int::from((*ifa.ifa_addr).sa_family) != libc::AF_INET {
                    continue;
                }
                let label = CStr::from_ptr(ifa.ifa_name).to_bytes();
                let same_device = label == name
                    || (label.starts_with(name) && label.get(name.len()) == Some(&b':'));
                if !same_device {
                    continue;
                }

                let sin = &*(ifa.ifa_addr as *const libc::sockaddr_in);
                addrs.push(Ipv4Addr::from(u32::from_be(sin.sin_addr.s_addr)));
            }

            libc::freeifaddrs(head);
        }

        Ok(addrs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loopback_is_not_ethernet() {
        let lo = NetDevice::query("lo").unwrap();
        assert_eq!(lo.name().to_bytes(), b"lo");
        assert!(lo.index() > 0);
        assert_eq!(lo.hardware_addr(), None);
    }

    #[test]
    #[ignore]
    fn loopback_has_localhost() {
        let lo = NetDevice::query("lo").unwrap();
        assert!(lo.ipv4_addrs().unwrap().contains(&Ipv4Addr::LOCALHOST));
    }

    #[test]
    fn missing_device() {
        let err = NetDevice::query("nosuchdev0").unwrap_err();
        assert_eq!(err.raw_os_error(), Some(libc::ENODEV));
    }

    #[test]
    fn impossible_names() {
        for name in &["averyveryverylongname", "lo\0"] {
            let err = NetDevice::query(name).unwrap_err();
            assert_eq!(err.raw_os_error(), Some(libc::ENODEV));
        }
    }
}
