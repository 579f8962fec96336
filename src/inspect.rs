use std::fmt;
use std::net::Ipv4Addr;
use thiserror::Error;

#[cfg(test)]
#[path = "inspect_tests.rs"]
mod inspect_tests;

/// Minimum IPv4 header size; anything shorter is reported as malformed.
pub const MIN_IPV4_HEADER: usize = 20;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InspectError {
    #[error("Buffer too short for IPv4 header: {0} bytes, need at least {MIN_IPV4_HEADER}")]
    TooShort(usize),
}

/// Non-owning diagnostic view of the leading IPv4 header of a forwarded
/// chunk. Produced and discarded within a single forwarding step; it
/// never gates the forwarding decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4View {
    pub version: u8,
    pub protocol: u8,
    pub source: Ipv4Addr,
    pub destination: Ipv4Addr,
    /// Byte count actually received, not the header's own length field.
    pub total_len: usize,
}

/// Parse the leading bytes of `buf` as an IPv4 header.
///
/// Bit-exact extraction, no checksum validation, no options parsing:
/// version is the high nibble of byte 0, protocol is byte 9, source and
/// destination addresses are bytes 12-15 and 16-19.
pub fn inspect(buf: &[u8]) -> Result<Ipv4View, InspectError> {
    if buf.len() < MIN_IPV4_HEADER {
        return Err(InspectError::TooShort(buf.len()));
    }
    Ok(Ipv4View {
        version: buf[0] >> 4,
        protocol: buf[9],
        source: Ipv4Addr::new(buf[12], buf[13], buf[14], buf[15]),
        destination: Ipv4Addr::new(buf[16], buf[17], buf[18], buf[19]),
        total_len: buf.len(),
    })
}

impl fmt::Display for Ipv4View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "v{} proto={} {} -> {} ({} bytes)",
            self.version, self.protocol, self.source, self.destination, self.total_len
        )
    }
}
