//! # oget – tunnel
//!
//! Reaching the mailbox host:
//!   • SOCKS5 CONNECT through a local proxy (remote name resolution, so
//!     `.onion` targets work)
//!   • SSH handshake + password authentication over the relayed stream
//!   • One deadline bounding dial, negotiation and handshake together

pub mod tunnel;
