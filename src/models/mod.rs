//! Wire-format object model: address families, capabilities, path attributes, NLRI,
//! and complete BGP messages.

pub mod bgp;
pub mod network;

pub use bgp::*;
pub use network::*;
