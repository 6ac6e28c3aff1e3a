#[macro_use]
pub mod utils;
pub mod bgp;

pub use crate::error::ParserError;
pub use bgp::attributes::parse_attributes;
pub use bgp::messages::{
    encode_bgp_message, encode_bgp_notification_message, encode_bgp_open_message,
    encode_bgp_route_refresh_message, encode_bgp_update_message, parse_bgp_message,
    parse_bgp_notification_message, parse_bgp_open_message, parse_bgp_route_refresh_message,
    parse_bgp_update_message,
};
pub use utils::{parse_nlri_list, ReadUtils};
