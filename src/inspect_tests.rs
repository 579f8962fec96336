// Unit tests for the diagnostic IPv4 header inspector

use crate::inspect::{inspect, InspectError, Ipv4View, MIN_IPV4_HEADER};
use std::net::Ipv4Addr;

/// Minimal ICMP echo header: 10.0.0.2 -> 10.0.0.1, exactly 20 bytes.
fn icmp_header() -> [u8; 20] {
    [
        0x45, 0x00, 0x00, 0x14, // version 4, IHL 5, total length 20
        0x00, 0x00, 0x00, 0x00, // identification, flags, fragment offset
        0x40, 0x01, 0x00, 0x00, // TTL 64, protocol 1 (ICMP), checksum
        10, 0, 0, 2, // source
        10, 0, 0, 1, // destination
    ]
}

#[test]
fn test_inspect_extracts_icmp_fields() {
    let view = inspect(&icmp_header()).expect("20-byte buffer should parse");
    assert_eq!(view.version, 4);
    assert_eq!(view.protocol, 1);
    assert_eq!(view.source, Ipv4Addr::new(10, 0, 0, 2));
    assert_eq!(view.destination, Ipv4Addr::new(10, 0, 0, 1));
    assert_eq!(view.total_len, 20);
}

#[test]
fn test_inspect_is_bit_exact_not_semantic() {
    // No validation happens beyond length: garbage fields come back as-is.
    let mut buf = [0xFFu8; 32];
    buf[0] = 0x6A; // claims version 6
    buf[9] = 0x11; // UDP
    buf[12..16].copy_from_slice(&[192, 168, 1, 1]);
    buf[16..20].copy_from_slice(&[8, 8, 8, 8]);

    let view = inspect(&buf).expect("length is sufficient");
    assert_eq!(view.version, 6);
    assert_eq!(view.protocol, 0x11);
    assert_eq!(view.source, Ipv4Addr::new(192, 168, 1, 1));
    assert_eq!(view.destination, Ipv4Addr::new(8, 8, 8, 8));
}

#[test]
fn test_inspect_total_len_is_received_count() {
    // total_len reports the bytes actually received, not the header's own
    // total-length field (which here still says 20).
    let mut buf = vec![0u8; 60];
    buf[..20].copy_from_slice(&icmp_header());
    let view = inspect(&buf).expect("should parse");
    assert_eq!(view.total_len, 60);
}

#[test]
fn test_inspect_rejects_short_buffers() {
    for len in 0..MIN_IPV4_HEADER {
        let buf = vec![0x45u8; len];
        assert_eq!(
            inspect(&buf),
            Err(InspectError::TooShort(len)),
            "{len}-byte buffer must be reported malformed"
        );
    }
}

#[test]
fn test_inspect_boundary_exactly_20_bytes() {
    assert!(inspect(&[0u8; 20]).is_ok());
    assert!(inspect(&[0u8; 19]).is_err());
}

#[test]
fn test_view_display_is_human_readable() {
    let view = Ipv4View {
        version: 4,
        protocol: 6,
        source: Ipv4Addr::new(10, 0, 0, 2),
        destination: Ipv4Addr::new(10, 0, 0, 1),
        total_len: 52,
    };
    assert_eq!(view.to_string(), "v4 proto=6 10.0.0.2 -> 10.0.0.1 (52 bytes)");
}
