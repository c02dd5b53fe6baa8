#![deny(missing_docs)]

use libc;
use std::{
    io,
    mem::{self, MaybeUninit},
};

/// Represents the link-layer address a frame was received from.
pub struct Addr {
    inner: libc::sockaddr_ll,
}

impl Addr {
    /// Index of the interface the frame arrived on.
    pub fn ifindex(&self) -> libc::c_int {
        self.inner.sll_ifindex
    }

    /// True if the frame is one this host sent, looped back to the socket by the kernel.
    pub fn is_outgoing(&self) -> bool {
        self.inner.sll_pkttype == libc::PACKET_OUTGOING as libc::c_uchar
    }
}

/// Represents an unbound `AF_PACKET` socket.  At this phase of a socket's lifecycle, it can be
/// configured.
pub struct Socket {
    fd: libc::c_int,
    protocol: u16,
}

/// Represents a bound `AF_PACKET` socket. At this phase of a socket's lifecycle, it can be read
/// to/written from.
pub struct BoundSocket {
    fd: libc::c_int,
    send_addr: libc::sockaddr_ll,
}

impl Socket {
    /// Creates a new unbound socket that only sees frames whose ether type is `protocol` (in host
    /// byte order, e.g. `0x8035`).
    pub fn new(protocol: u16) -> io::Result<Self> {
        // This block must be marked as unsafe because it uses FFI with C code. We believe the code
        // in this block to be safe because it does not interact with any memory owned by Rust
        // code, nor does it violate the invariant of the Socket type -- namely, that it return an
        // Err if it fails to initialize.
        let fd = unsafe {
            // Resources:
            // https://beej.us/guide/bgnet/html/multi/syscalls.html#socket
            // man 7 packet
            let fd = libc::socket(
                libc::AF_PACKET,
                libc::SOCK_RAW,
                libc::c_int::from(protocol.to_be()),
            );
            if fd < 0 {
                return Err(io::Error::last_os_error());
            }
            fd
        };
        Ok(Self { fd, protocol })
    }

    /// Binds the socket to the network interface with index `ifindex`. This function consumes the
    /// `Socket` instance, as no more configuration options may be safely changed.
    pub fn bind(self, ifindex: libc::c_int) -> io::Result<BoundSocket> {
        // This block is marked as unsafe because it uses FFI, however, we believe it to be safe
        // because it handles FFI failures in accordance with the bound API's conventions and only
        // lends the kernel a stack-allocated, correctly sized sockaddr_ll.
        let send_addr = unsafe {
            let mut ll: libc::sockaddr_ll = MaybeUninit::zeroed().assume_init();
            ll.sll_family = libc::AF_PACKET as libc::c_ushort;
            ll.sll_protocol = self.protocol.to_be();
            ll.sll_ifindex = ifindex;
            // Resources:
            // https://beej.us/guide/bgnet/html/multi/syscalls.html#bind
            // man 7 packet regarding sockaddr_ll
            let err = libc::bind(
                self.fd,
                &ll as *const _ as *const libc::sockaddr,
                mem::size_of::<libc::sockaddr_ll>() as libc::socklen_t,
            );
            if err < 0 {
                return Err(io::Error::last_os_error());
            }
            ll
        };
        let fd = self.fd;
        // This ensures that `self` does not attempt to close the file descriptor, as the file
        // descriptor is transferred to the BoundSocket we're returning. This doesn't cause any
        // resource leaks since the stack-bound `self` is consumed and deallocated in
        // `mem::forget`.
        mem::forget(self);
        Ok(BoundSocket { fd, send_addr })
    }
}

impl BoundSocket {
    /// Index of the interface this socket is bound to.
    pub fn ifindex(&self) -> libc::c_int {
        self.send_addr.sll_ifindex
    }

    /// Sends a complete Ethernet frame to the NIC. The destination is whatever the frame's own
    /// header says.
    pub fn send(&mut self, frame: &[u8]) -> io::Result<usize> {
        // This block is marked as unsafe because it uses FFI. We believe this code to be safe,
        // because it safely borrows the Rust-owned frame and passes the length of the frame to the
        // libc function, so it should not exhibit any C-side undefined behaviour.
        unsafe {
            // Resources:
            // https://beej.us/guide/bgnet/html/multi/syscalls.html#sendtorecv
            let bytes = libc::sendto(
                self.fd,
                frame.as_ptr() as *const _,
                frame.len(),
                0,
                &self.send_addr as *const _ as *const libc::sockaddr,
                mem::size_of::<libc::sockaddr_ll>() as libc::socklen_t,
            );
            if bytes < 0 {
                Err(io::Error::last_os_error())
            } else {
                Ok(bytes as usize)
            }
        }
    }

    /// Receives a frame from the NIC, blocking until one arrives. Frames longer than `frame` are
    /// truncated.
    pub fn recv(&mut self, frame: &mut [u8]) -> io::Result<(usize, Addr)> {
        // Note comment in `send` call.
        unsafe {
            let mut storage = MaybeUninit::<libc::sockaddr_ll>::zeroed();
            let mut addrlen = mem::size_of::<libc::sockaddr_ll>() as libc::socklen_t;

            // Resources:
            // https://beej.us/guide/bgnet/html/multi/syscalls.html#sendtorecv
            let bytes = libc::recvfrom(
                self.fd,
                frame.as_mut_ptr() as *mut _,
                frame.len(),
                0,
                storage.as_mut_ptr() as *mut _,
                &mut addrlen,
            );
            if bytes < 0 {
                Err(io::Error::last_os_error())
            } else {
                Ok((
                    bytes as usize,
                    Addr {
                        inner: storage.assume_init(),
                    },
                ))
            }
        }
    }
}

impl Drop for Socket {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.fd);
        }
    }
}

impl Drop for BoundSocket {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.fd);
        }
    }
}
