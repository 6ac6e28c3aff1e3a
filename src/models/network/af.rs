//! Packed AFI/SAFI keys -- used as map keys for per-address-family state (MP capability
//! entries, extended next-hop pairs, ADD_PATH direction) and rendered on the wire in
//! either the 3-byte ATTR_MP form or the 4-byte capability form (RFC 4760).

use super::{Afi, Safi};
#[cfg(feature = "parser")]
use bytes::{BufMut, BytesMut};
use std::fmt::{Display, Formatter};

/// `(AFI<<16) | SAFI` packed into 32 bits, with a reserved zero byte between the two on
/// the 4-byte wire form. Equality and ordering are over the packed integer, so this type
/// is cheap to use as a `BTreeMap`/`HashMap` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Af(u32);

impl Af {
    pub fn new(afi: Afi, safi: Safi) -> Self {
        Af(((afi as u16 as u32) << 16) | safi as u8 as u32)
    }

    /// Raw AFI half of the key, whether or not it maps to a known [`Afi`] variant.
    pub const fn afi_raw(&self) -> u16 {
        (self.0 >> 16) as u16
    }

    /// Raw SAFI half of the key, whether or not it maps to a known [`Safi`] variant.
    pub const fn safi_raw(&self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    pub fn afi(&self) -> Option<Afi> {
        Afi::try_from(self.afi_raw()).ok()
    }

    pub fn safi(&self) -> Option<Safi> {
        Safi::try_from(self.safi_raw()).ok()
    }

    /// Decode either the 3-byte (`AFI SAFI`) ATTR_MP form or the 4-byte
    /// (`AFI reserved SAFI`) capability form. Any other length decodes to the zero key
    /// rather than erroring, matching the lenient handling used elsewhere for optional
    /// parameters.
    #[cfg(feature = "parser")]
    pub fn from_wire(buf: &[u8]) -> Self {
        match buf.len() {
            3 => {
                let afi = u16::from_be_bytes([buf[0], buf[1]]);
                Af((afi as u32) << 16 | buf[2] as u32)
            }
            4 => {
                let afi = u16::from_be_bytes([buf[0], buf[1]]);
                Af((afi as u32) << 16 | buf[3] as u32)
            }
            _ => Af(0),
        }
    }

    /// Append the 3-byte ATTR_MP wire form: `AFI(16) SAFI(8)`.
    #[cfg(feature = "parser")]
    pub fn to_wire3(&self, buf: &mut BytesMut) {
        buf.put_u16(self.afi_raw());
        buf.put_u8(self.safi_raw());
    }

    /// Append the 4-byte capability wire form: `AFI(16) reserved(8) SAFI(8)`.
    #[cfg(feature = "parser")]
    pub fn to_wire4(&self, buf: &mut BytesMut) {
        buf.put_u16(self.afi_raw());
        buf.put_u8(0);
        buf.put_u8(self.safi_raw());
    }
}

fn afi_symbol(raw: u16) -> String {
    match Afi::try_from(raw) {
        Ok(Afi::Ipv4) => "IPV4".to_string(),
        Ok(Afi::Ipv6) => "IPV6".to_string(),
        Ok(Afi::L2vpn) => "L2VPN".to_string(),
        Ok(Afi::BgpLs) => "BGP_LS".to_string(),
        Err(_) => format!("AFI_{raw}"),
    }
}

fn safi_symbol(raw: u8) -> String {
    match Safi::try_from(raw) {
        Ok(Safi::Unicast) => "UNICAST".to_string(),
        Ok(Safi::Multicast) => "MULTICAST".to_string(),
        Ok(Safi::UnicastMulticast) => "UNICAST_MULTICAST".to_string(),
        Ok(Safi::MplsVpn) => "MPLS_VPN".to_string(),
        Ok(Safi::MulticastVpn) => "MULTICAST_VPN".to_string(),
        Ok(Safi::Flowspec) => "FLOWSPEC".to_string(),
        Ok(Safi::FlowspecVpn) => "FLOWSPEC_VPN".to_string(),
        Ok(Safi::BgpLs) => "BGP_LS".to_string(),
        Ok(Safi::BgpLsVpn) => "BGP_LS_VPN".to_string(),
        Err(_) => format!("SAFI_{raw}"),
    }
}

fn parse_afi_symbol(s: &str) -> Option<u16> {
    Some(match s {
        "IPV4" => Afi::Ipv4 as u16,
        "IPV6" => Afi::Ipv6 as u16,
        "L2VPN" => Afi::L2vpn as u16,
        "BGP_LS" => Afi::BgpLs as u16,
        _ => return s.strip_prefix("AFI_")?.parse().ok(),
    })
}

fn parse_safi_symbol(s: &str) -> Option<u8> {
    Some(match s {
        "UNICAST" => Safi::Unicast as u8,
        "MULTICAST" => Safi::Multicast as u8,
        "UNICAST_MULTICAST" => Safi::UnicastMulticast as u8,
        "MPLS_VPN" => Safi::MplsVpn as u8,
        "MULTICAST_VPN" => Safi::MulticastVpn as u8,
        "FLOWSPEC" => Safi::Flowspec as u8,
        "FLOWSPEC_VPN" => Safi::FlowspecVpn as u8,
        "BGP_LS" => Safi::BgpLs as u8,
        "BGP_LS_VPN" => Safi::BgpLsVpn as u8,
        _ => return s.strip_prefix("SAFI_")?.parse().ok(),
    })
}

impl Display for Af {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", afi_symbol(self.afi_raw()), safi_symbol(self.safi_raw()))
    }
}

#[derive(Debug)]
pub struct AfParseError(String);

impl Display for AfParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid AFI/SAFI key {:?}", self.0)
    }
}

impl std::error::Error for AfParseError {}

impl std::str::FromStr for Af {
    type Err = AfParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(2, '/');
        let (afi_part, safi_part) = match (parts.next(), parts.next()) {
            (Some(a), Some(b)) => (a, b),
            _ => return Err(AfParseError(s.to_string())),
        };
        let afi = parse_afi_symbol(afi_part).ok_or_else(|| AfParseError(s.to_string()))?;
        let safi = parse_safi_symbol(safi_part).ok_or_else(|| AfParseError(s.to_string()))?;
        Ok(Af((afi as u32) << 16 | safi as u32))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Af {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Af {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// An [`Af`] key with a trailing 32-bit value whose meaning is context-dependent: the
/// next-hop AFI for extended next-hop entries, or the ADD_PATH send/receive direction
/// (1, 2, or 3) for ADD_PATH entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Asv(Af, u32);

impl Asv {
    pub fn new(afi: Afi, safi: Safi, val: u32) -> Self {
        Asv(Af::new(afi, safi), val)
    }

    pub fn af(&self) -> Af {
        self.0
    }

    pub fn val(&self) -> u32 {
        self.1
    }

    /// Discards the trailing value, returning the bare address-family key.
    pub fn drop_val(&self) -> Af {
        self.0
    }
}

impl Display for Asv {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.0, self.1)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Asv {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Asv {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let mut parts = s.rsplitn(2, '/');
        let (val_part, af_part) = match (parts.next(), parts.next()) {
            (Some(v), Some(a)) => (v, a),
            _ => return Err(serde::de::Error::custom(format!("invalid AFI/SAFI/VAL key {s:?}"))),
        };
        let af: Af = af_part.parse().map_err(serde::de::Error::custom)?;
        let val: u32 = val_part
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid AFI/SAFI/VAL key {s:?}")))?;
        Ok(Asv(af, val))
    }
}
