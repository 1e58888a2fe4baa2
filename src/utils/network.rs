//! Network utilities
//!
//! Provides address helpers for binding and connecting.

use std::net::{AddrParseError, IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

/// Parse a socket address string
pub fn parse_socket_addr(addr: &str) -> Result<SocketAddr, AddrParseError> {
    addr.parse()
}

/// Address a client should dial to reach a server bound to `bind`.
///
/// A wildcard bind address is replaced by the loopback address of the same family.
pub fn connect_addr(bind: SocketAddr) -> SocketAddr {
    let ip = match bind.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
        ip => ip,
    };
    SocketAddr::new(ip, bind.port())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_addr_replaces_wildcard() {
        let bind = parse_socket_addr("0.0.0.0:9002").unwrap();
        assert_eq!(connect_addr(bind).to_string(), "127.0.0.1:9002");

        let bind = parse_socket_addr("[::]:9002").unwrap();
        assert_eq!(connect_addr(bind).to_string(), "[::1]:9002");

        let bind = parse_socket_addr("10.0.0.5:9002").unwrap();
        assert_eq!(connect_addr(bind), bind);
    }
}
