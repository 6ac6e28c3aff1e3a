use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::ParserError;
use crate::models::*;
use crate::parser::bgp::attributes::parse_attributes;
use crate::parser::{parse_nlri_list, ReadUtils};

/// 16 bytes of 0xFF -- RFC 4271 Section 4.1. No BGP authentication scheme currently in
/// use sets the marker to anything else, so it carries no information on receipt.
const BGP_MARKER: [u8; 16] = [0xFF; 16];

const HEADER_LEN: usize = 19;

/// Parse a single BGP message out of `data`, which must contain at least one full message
/// (marker through payload). Anything past the message's declared length is ignored by the
/// caller, which is expected to re-slice the stream using the returned length.
///
/// ```text
/// 0                   1                   2                   3
/// 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// +                                                               +
/// |                           Marker                             |
/// +                                                               +
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |          Length               |      Type     |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
pub fn parse_bgp_message(
    mut data: Bytes,
    add_path: bool,
    asn_len: &AsnLength,
    extended_message: bool,
) -> Result<BgpMessage, ParserError> {
    data.has_n_remaining(HEADER_LEN)?;
    data.advance(16);

    let length = data.read_u16()? as usize;
    let max_length = if extended_message { 65535 } else { 4096 };
    if length < HEADER_LEN || length > max_length {
        return Err(ParserError::ParseError(format!(
            "invalid BGP message length {length}"
        )));
    }

    let msg_type = BgpMessageType::try_from(data.read_u8()?)?;

    let body_length = length - HEADER_LEN;
    data.has_n_remaining(body_length)?;
    let body = data.split_to(body_length);

    Ok(match msg_type {
        BgpMessageType::OPEN => BgpMessage::Open(parse_bgp_open_message(body)?),
        BgpMessageType::UPDATE => {
            BgpMessage::Update(parse_bgp_update_message(body, add_path, asn_len)?)
        }
        BgpMessageType::NOTIFICATION => {
            BgpMessage::Notification(parse_bgp_notification_message(body)?)
        }
        BgpMessageType::KEEPALIVE => BgpMessage::KeepAlive,
        BgpMessageType::ROUTE_REFRESH => {
            BgpMessage::RouteRefresh(parse_bgp_route_refresh_message(body)?)
        }
    })
}

/// Encode a full BGP message, including the 19-byte header.
pub fn encode_bgp_message(msg: &BgpMessage, asn_len: AsnLength, add_path: bool) -> Bytes {
    let body = match msg {
        BgpMessage::Open(m) => encode_bgp_open_message(m),
        BgpMessage::Update(m) => encode_bgp_update_message(m, asn_len, add_path),
        BgpMessage::Notification(m) => encode_bgp_notification_message(m),
        BgpMessage::KeepAlive => Bytes::new(),
        BgpMessage::RouteRefresh(m) => encode_bgp_route_refresh_message(m),
    };

    let mut bytes = BytesMut::with_capacity(HEADER_LEN + body.len());
    bytes.extend_from_slice(&BGP_MARKER);
    bytes.put_u16((HEADER_LEN + body.len()) as u16);
    bytes.put_u8(u8::from(msg.msg_type()));
    bytes.extend(body);
    bytes.freeze()
}

/// Parse a BGP OPEN message body (everything after the 19-byte header).
///
/// Also decodes the BGP capabilities found in optional parameter type 2.
pub fn parse_bgp_open_message(mut data: Bytes) -> Result<BgpOpenMessage, ParserError> {
    let version = data.read_u8()?;
    let asn = Asn::new_16bit(data.read_u16()?);
    let hold_time = data.read_u16()?;
    let sender_ip = data.read_ipv4_address()?;
    let opt_params_len = data.read_u8()? as usize;

    let mut extended_length = false;
    let mut opt_params = Vec::new();

    if opt_params_len == 255 && data.first() == Some(&255) {
        // RFC 9072 extended optional parameters: a single Non-Ext OP Type (255) marker
        // followed by a 2-octet length, then a run of (1-octet type, 2-octet len, value) entries.
        extended_length = true;
        data.advance(1);
        let ext_len = data.read_u16()? as usize;
        data.has_n_remaining(ext_len)?;
        let mut ext_data = data.split_to(ext_len);
        while ext_data.remaining() > 0 {
            let param_type = ext_data.read_u8()?;
            let param_len = ext_data.read_u16()? as usize;
            ext_data.has_n_remaining(param_len)?;
            let param_bytes = ext_data.split_to(param_len);
            opt_params.extend(parse_opt_param(param_type, param_len as u16, param_bytes)?);
        }
    } else {
        data.has_n_remaining(opt_params_len)?;
        let mut params_data = data.split_to(opt_params_len);
        while params_data.remaining() > 0 {
            let param_type = params_data.read_u8()?;
            let param_len = params_data.read_u8()? as usize;
            params_data.has_n_remaining(param_len)?;
            let param_bytes = params_data.split_to(param_len);
            opt_params.extend(parse_opt_param(param_type, param_len as u16, param_bytes)?);
        }
    }

    Ok(BgpOpenMessage {
        version,
        asn,
        hold_time,
        sender_ip,
        extended_length,
        opt_params,
    })
}

/// Parse a single optional parameter TLV. Capability parameters (type 2) MAY pack more
/// than one `<code, length, value>` triple into one TLV, so this can return several
/// [`OptParam`] entries -- one per negotiated capability.
fn parse_opt_param(
    param_type: u8,
    param_len: u16,
    mut data: Bytes,
) -> Result<Vec<OptParam>, ParserError> {
    if param_type != 2 {
        return Ok(vec![OptParam {
            param_type,
            param_len,
            param_value: ParamValue::Raw(data.to_vec()),
        }]);
    }

    let mut caps = Vec::new();
    while data.remaining() > 0 {
        let code = data.read_u8()?;
        let len = data.read_u8()? as usize;
        data.has_n_remaining(len)?;
        let value_bytes = data.split_to(len);
        let ty = BgpCapabilityType::from(code);
        let cap = Capability::parse(ty, value_bytes);
        caps.push(OptParam {
            param_type,
            param_len: (len + 2) as u16,
            param_value: ParamValue::Capability(cap),
        });
    }
    Ok(caps)
}

pub fn encode_bgp_open_message(msg: &BgpOpenMessage) -> Bytes {
    let mut bytes = BytesMut::new();
    bytes.put_u8(msg.version);
    let wire_asn = if msg.asn.to_u32() > u16::MAX as u32 {
        Asn::TRANSITION.to_u32() as u16
    } else {
        msg.asn.to_u32() as u16
    };
    bytes.put_u16(wire_asn);
    bytes.put_u16(msg.hold_time);
    bytes.put_u32(msg.sender_ip.into());

    let mut params_bytes = BytesMut::new();
    for param in &msg.opt_params {
        match &param.param_value {
            ParamValue::Raw(v) => {
                params_bytes.put_u8(param.param_type);
                params_bytes.put_u8(v.len() as u8);
                params_bytes.extend_from_slice(v);
            }
            ParamValue::Capability(cap) => {
                let cap_bytes = cap.encode();
                params_bytes.put_u8(param.param_type);
                params_bytes.put_u8((cap_bytes.len() + 2) as u8);
                params_bytes.put_u8(u8::from(cap.ty));
                params_bytes.put_u8(cap_bytes.len() as u8);
                params_bytes.extend(cap_bytes);
            }
        }
    }

    bytes.put_u8(params_bytes.len() as u8);
    bytes.extend(params_bytes);
    bytes.freeze()
}

/// Parse a BGP NOTIFICATION message body.
pub fn parse_bgp_notification_message(
    mut data: Bytes,
) -> Result<BgpNotificationMessage, ParserError> {
    let error_code = data.read_u8()?;
    let error_subcode = data.read_u8()?;
    let error = BgpError::new(error_code, error_subcode);
    let remaining = data.remaining();
    let data = data.read_n_bytes(remaining)?;
    Ok(BgpNotificationMessage { error, data })
}

pub fn encode_bgp_notification_message(msg: &BgpNotificationMessage) -> Bytes {
    let mut bytes = BytesMut::new();
    let (code, subcode) = msg.error.to_codes();
    bytes.put_u8(code);
    bytes.put_u8(subcode);
    bytes.extend_from_slice(&msg.data);
    bytes.freeze()
}

/// Parse a BGP ROUTE-REFRESH message body -- RFC 2918.
pub fn parse_bgp_route_refresh_message(
    mut data: Bytes,
) -> Result<BgpRouteRefreshMessage, ParserError> {
    let afi = data.read_afi()?;
    let _reserved = data.read_u8()?;
    let safi = data.read_safi()?;
    Ok(BgpRouteRefreshMessage { afi, safi })
}

pub fn encode_bgp_route_refresh_message(msg: &BgpRouteRefreshMessage) -> Bytes {
    let mut bytes = BytesMut::with_capacity(4);
    bytes.put_u16(msg.afi as u16);
    bytes.put_u8(0);
    bytes.put_u8(msg.safi as u8);
    bytes.freeze()
}

/// Parse a BGP UPDATE message body.
pub fn parse_bgp_update_message(
    mut data: Bytes,
    add_path: bool,
    asn_len: &AsnLength,
) -> Result<BgpUpdateMessage, ParserError> {
    // withdrawn/announced NLRI outside of MP_(UN)REACH_NLRI are always IPv4 unicast.
    let afi = Afi::Ipv4;

    let withdrawn_len = data.read_u16()? as usize;
    data.has_n_remaining(withdrawn_len)?;
    let withdrawn_bytes = data.split_to(withdrawn_len);
    let withdrawn_prefixes = parse_nlri_list(withdrawn_bytes, add_path, &afi)?;

    let attr_len = data.read_u16()? as usize;
    data.has_n_remaining(attr_len)?;
    let attr_bytes = data.split_to(attr_len);
    let attributes = parse_attributes(attr_bytes, asn_len, add_path, None, None, None)?;

    // whatever is left of the message body is the announced-prefix NLRI.
    let announced_prefixes = parse_nlri_list(data, add_path, &afi)?;

    Ok(BgpUpdateMessage {
        withdrawn_prefixes,
        attributes,
        announced_prefixes,
    })
}

pub fn encode_bgp_update_message(
    msg: &BgpUpdateMessage,
    asn_len: AsnLength,
    add_path: bool,
) -> Bytes {
    let mut bytes = BytesMut::new();

    let mut withdrawn_bytes = BytesMut::new();
    for prefix in &msg.withdrawn_prefixes {
        withdrawn_bytes.extend(prefix.encode(add_path));
    }
    bytes.put_u16(withdrawn_bytes.len() as u16);
    bytes.extend(withdrawn_bytes);

    let attr_bytes = msg.attributes.encode(asn_len, add_path);
    bytes.put_u16(attr_bytes.len() as u16);
    bytes.extend(attr_bytes);

    for prefix in &msg.announced_prefixes {
        bytes.extend(prefix.encode(add_path));
    }

    bytes.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keepalive_roundtrip() {
        let msg = BgpMessage::KeepAlive;
        let bytes = encode_bgp_message(&msg, AsnLength::Bits32, false);
        assert_eq!(bytes.len(), HEADER_LEN);
        let parsed = parse_bgp_message(bytes, false, &AsnLength::Bits32, false).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn test_open_message_roundtrip() {
        let msg = BgpMessage::Open(BgpOpenMessage {
            version: 4,
            asn: Asn::new_16bit(65000),
            hold_time: 180,
            sender_ip: "192.0.2.1".parse().unwrap(),
            extended_length: false,
            opt_params: vec![OptParam {
                param_type: 2,
                param_len: 6,
                param_value: ParamValue::Capability(Capability {
                    ty: BgpCapabilityType::ROUTE_REFRESH_CAPABILITY_FOR_BGP_4,
                    value: CapabilityValue::RouteRefresh(RouteRefreshCapability::new()),
                }),
            }],
        });
        let bytes = encode_bgp_message(&msg, AsnLength::Bits16, false);
        let parsed = parse_bgp_message(bytes, false, &AsnLength::Bits16, false).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn test_route_refresh_roundtrip() {
        let msg = BgpMessage::RouteRefresh(BgpRouteRefreshMessage {
            afi: Afi::Ipv4,
            safi: Safi::Unicast,
        });
        let bytes = encode_bgp_message(&msg, AsnLength::Bits32, false);
        let parsed = parse_bgp_message(bytes, false, &AsnLength::Bits32, false).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn test_notification_roundtrip() {
        let msg = BgpMessage::Notification(BgpNotificationMessage {
            error: BgpError::HoldTimerExpired(0),
            data: vec![],
        });
        let bytes = encode_bgp_message(&msg, AsnLength::Bits32, false);
        let parsed = parse_bgp_message(bytes, false, &AsnLength::Bits32, false).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn test_rejects_oversized_length_without_extended_message() {
        let mut bytes = BytesMut::new();
        bytes.extend_from_slice(&BGP_MARKER);
        bytes.put_u16(4097);
        bytes.put_u8(4);
        bytes.resize(19 + 4097 - 19, 0);
        let err = parse_bgp_message(bytes.freeze(), false, &AsnLength::Bits32, false).unwrap_err();
        assert!(matches!(err, ParserError::ParseError(_)));
    }
}
