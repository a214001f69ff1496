//! Active-mode address codec
//!
//! Decodes the `h1,h2,h3,h4,p1,p2` argument of the PORT command.

use std::net::{Ipv4Addr, SocketAddrV4};

use crate::error::ProtocolError;

/// Decodes a PORT argument into the IPv4 socket address it names.
///
/// The port is `256 * p1 + p2`. Exactly six comma separated decimal
/// fields in `0..=255` are accepted; anything else is a
/// [`ProtocolError::MalformedAddress`].
pub fn decode_address(input: &str) -> Result<SocketAddrV4, ProtocolError> {
    let malformed = || ProtocolError::MalformedAddress(input.to_string());

    let fields = input
        .split(',')
        .map(|field| field.parse::<u8>())
        .collect::<Result<Vec<u8>, _>>()
        .map_err(|_| malformed())?;

    let [a, b, c, d, p1, p2] = fields[..] else {
        return Err(malformed());
    };

    let port = 256 * u16::from(p1) + u16::from(p2);
    Ok(SocketAddrV4::new(Ipv4Addr::new(a, b, c, d), port))
}
