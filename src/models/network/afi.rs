use num_enum::{IntoPrimitive, TryFromPrimitive};

/// AFI -- Address Family Identifier
///
/// <https://www.iana.org/assignments/address-family-numbers/address-family-numbers.xhtml>
#[derive(Debug, PartialEq, TryFromPrimitive, IntoPrimitive, Clone, Copy, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u16)]
pub enum Afi {
    Ipv4 = 1,
    Ipv6 = 2,
    L2vpn = 25,
    BgpLs = 16388,
}

/// SAFI -- Subsequent Address Family Identifier
///
/// SAFI can be: Unicast, Multicast, or both.
#[derive(Debug, PartialEq, TryFromPrimitive, IntoPrimitive, Clone, Copy, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Safi {
    Unicast = 1,
    Multicast = 2,
    UnicastMulticast = 3,
    MplsVpn = 128,
    MulticastVpn = 129,
    Flowspec = 133,
    FlowspecVpn = 134,
    BgpLs = 71,
    BgpLsVpn = 72,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_afi_roundtrip() {
        assert_eq!(Afi::try_from(1u16).unwrap(), Afi::Ipv4);
        assert_eq!(u16::from(Afi::Ipv6), 2);
        assert!(Afi::try_from(9999u16).is_err());
    }

    #[test]
    fn test_safi_roundtrip() {
        assert_eq!(Safi::try_from(133u8).unwrap(), Safi::Flowspec);
        assert_eq!(u8::from(Safi::MplsVpn), 128);
        assert!(Safi::try_from(200u8).is_err());
    }
}
