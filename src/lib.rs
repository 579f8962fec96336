//! tcptun Library
//!
//! This library contains the core modules for the tcptun tunnel daemon:
//! the TUN device adapter, the TCP peer connection, the bridge session
//! loop and the diagnostic IPv4 packet inspector.

pub mod error;
pub mod inspect;
pub mod peer;
pub mod session;
pub mod tun_adapter;
