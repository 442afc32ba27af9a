// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Discovery socket construction.
//!
//! Socket lifecycle stays the caller's responsibility; this helper only
//! spares demos and tests the flag dance: reuse-address, broadcast,
//! optional `SO_REUSEPORT`, non-blocking, bound to the discovery port on
//! all interfaces.

use crate::config::DiscoveryConfig;
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};

/// Open the shared-port broadcast socket described by `config`.
///
/// The returned socket is non-blocking, as required by the read cycle.
pub fn open_discovery_socket(config: &DiscoveryConfig) -> io::Result<UdpSocket> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_reuse_address(true)?;
    if config.reuse_port {
        #[cfg(unix)]
        set_reuseport(&socket)?;
        #[cfg(not(unix))]
        log::warn!("[udp] reuse_port requested but unsupported on this platform, ignoring");
    }
    socket.set_broadcast(true)?;
    socket.set_nonblocking(true)?;

    let bind_addr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, config.port));
    socket.bind(&bind_addr.into())?;
    log::debug!(
        "[udp] discovery socket bound to {} (send dest {})",
        bind_addr,
        config.send_socket_addr()
    );

    Ok(socket.into())
}

/// Set `SO_REUSEPORT` so several processes on one host can bind the
/// discovery port and all hear the broadcast.
#[cfg(unix)]
fn set_reuseport(socket: &Socket) -> io::Result<()> {
    use std::os::unix::io::AsRawFd;
    let fd = socket.as_raw_fd();
    let optval: libc::c_int = 1;
    // SAFETY: setsockopt FFI with valid fd, standard socket option, and correctly sized optval pointer
    let ret = unsafe {
        libc::setsockopt(
            fd,
            libc::SOL_SOCKET,
            libc::SO_REUSEPORT,
            &optval as *const _ as *const libc::c_void,
            std::mem::size_of::<libc::c_int>() as libc::socklen_t,
        )
    };
    if ret != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_is_nonblocking() {
        let config = DiscoveryConfig::default().with_port(0);
        let socket = open_discovery_socket(&config).expect("open socket");
        let mut buf = [0u8; 16];
        let err = socket.recv_from(&mut buf).expect_err("nothing to receive");
        assert_eq!(err.kind(), io::ErrorKind::WouldBlock);
    }

    #[cfg(unix)]
    #[test]
    fn test_reuse_port_allows_second_bind() {
        let config = DiscoveryConfig::default().with_port(0).with_reuse_port(true);
        let first = open_discovery_socket(&config).expect("first bind");
        let port = first.local_addr().expect("local addr").port();

        let config = config.with_port(port);
        let _second = open_discovery_socket(&config).expect("second bind on same port");
    }
}
