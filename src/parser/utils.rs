//! IO utility functions for reading primitive wire values out of a [`bytes::Buf`]
//! and converting them into the crate's model types.
use bytes::Buf;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::error::ParserError;
use crate::models::{Afi, Asn, AsnLength, NetworkPrefix, Safi};

/// Extends any [`bytes::Buf`] (`Bytes`, `BytesMut`, `&[u8]`, ...) with BGP-specific reads
/// that check remaining length up front and return a [`ParserError`] on a short buffer,
/// instead of panicking the way the bare `Buf` getters do.
pub trait ReadUtils: Buf {
    #[inline]
    fn has_n_remaining(&self, n: usize) -> Result<(), ParserError> {
        if self.remaining() < n {
            return Err(ParserError::TruncatedMsg(format!(
                "expected at least {} bytes, found {}",
                n,
                self.remaining()
            )));
        }
        Ok(())
    }

    /// Errors unless exactly `n` bytes remain. Used for fixed-length attribute bodies.
    fn expect_remaining_eq(&self, n: usize, attr_name: &str) -> Result<(), ParserError> {
        if self.remaining() != n {
            return Err(ParserError::ParseError(format!(
                "{} attribute must be exactly {} bytes, found {}",
                attr_name,
                n,
                self.remaining()
            )));
        }
        Ok(())
    }

    #[inline]
    fn read_u8(&mut self) -> Result<u8, ParserError> {
        self.has_n_remaining(1)?;
        Ok(Buf::get_u8(self))
    }

    #[inline]
    fn read_u16(&mut self) -> Result<u16, ParserError> {
        self.has_n_remaining(2)?;
        Ok(Buf::get_u16(self))
    }

    #[inline]
    fn read_u32(&mut self) -> Result<u32, ParserError> {
        self.has_n_remaining(4)?;
        Ok(Buf::get_u32(self))
    }

    #[inline]
    fn read_u64(&mut self) -> Result<u64, ParserError> {
        self.has_n_remaining(8)?;
        Ok(Buf::get_u64(self))
    }

    fn read_n_bytes(&mut self, n_bytes: usize) -> Result<Vec<u8>, ParserError> {
        self.has_n_remaining(n_bytes)?;
        let mut buffer = vec![0u8; n_bytes];
        self.copy_to_slice(&mut buffer);
        Ok(buffer)
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), ParserError> {
        self.has_n_remaining(buf.len())?;
        self.copy_to_slice(buf);
        Ok(())
    }

    fn read_ipv4_address(&mut self) -> Result<Ipv4Addr, ParserError> {
        Ok(Ipv4Addr::from(self.read_u32()?))
    }

    fn read_ipv6_address(&mut self) -> Result<Ipv6Addr, ParserError> {
        let mut buf = [0u8; 16];
        self.read_exact(&mut buf)?;
        Ok(Ipv6Addr::from(buf))
    }

    fn read_address(&mut self, afi: &Afi) -> Result<IpAddr, ParserError> {
        match afi {
            Afi::Ipv4 => Ok(IpAddr::V4(self.read_ipv4_address()?)),
            Afi::Ipv6 => Ok(IpAddr::V6(self.read_ipv6_address()?)),
            other => Err(ParserError::Unsupported(format!(
                "cannot read a plain address for AFI {other:?}"
            ))),
        }
    }

    fn read_asn(&mut self, as_length: &AsnLength) -> Result<Asn, ParserError> {
        match as_length {
            AsnLength::Bits16 => Ok(Asn::new_16bit(self.read_u16()?)),
            AsnLength::Bits32 => Ok(Asn::new_32bit(self.read_u32()?)),
        }
    }

    fn read_asns(&mut self, as_length: &AsnLength, count: usize) -> Result<Vec<Asn>, ParserError> {
        let mut path = Vec::with_capacity(count);
        for _ in 0..count {
            path.push(self.read_asn(as_length)?);
        }
        Ok(path)
    }

    fn read_afi(&mut self) -> Result<Afi, ParserError> {
        let afi = self.read_u16()?;
        Afi::try_from(afi).map_err(|_| ParserError::UnrecognizedEnumVariant {
            type_name: "Afi",
            value: afi as u64,
        })
    }

    fn read_safi(&mut self) -> Result<Safi, ParserError> {
        let safi = self.read_u8()?;
        Safi::try_from(safi).map_err(|_| ParserError::UnrecognizedEnumVariant {
            type_name: "Safi",
            value: safi as u64,
        })
    }
}

impl<T: Buf + ?Sized> ReadUtils for T {}

/// Reads the NLRI prefix list out of `input`, handling the leading optional 4-byte
/// ADD_PATH identifier per-prefix when `additional_paths` is set.
///
/// The wire form is a sequence of `(path_id?, prefix_len_bits, prefix_bytes)` entries
/// that run until `input` is exhausted -- there is no explicit count field.
pub fn parse_nlri_list(
    mut input: bytes::Bytes,
    additional_paths: bool,
    afi: &Afi,
) -> Result<Vec<NetworkPrefix>, ParserError> {
    let mut prefixes = vec![];
    while input.remaining() > 0 {
        let path_id = if additional_paths {
            input.read_u32()?
        } else {
            0
        };

        input.has_n_remaining(1)?;
        let bit_len = input.read_u8()?;
        let byte_len = bit_len.div_ceil(8) as usize;
        input.has_n_remaining(byte_len)?;

        let prefix = match afi {
            Afi::Ipv4 => {
                let mut buf = [0u8; 4];
                if byte_len > buf.len() {
                    return Err(ParserError::ParseError(format!(
                        "invalid IPv4 prefix length: {bit_len} bits"
                    )));
                }
                input.copy_to_slice(&mut buf[..byte_len]);
                let net = ipnet::Ipv4Net::new(Ipv4Addr::from(buf), bit_len)
                    .map_err(|e| ParserError::ParseError(e.to_string()))?;
                ipnet::IpNet::V4(net)
            }
            Afi::Ipv6 => {
                let mut buf = [0u8; 16];
                if byte_len > buf.len() {
                    return Err(ParserError::ParseError(format!(
                        "invalid IPv6 prefix length: {bit_len} bits"
                    )));
                }
                input.copy_to_slice(&mut buf[..byte_len]);
                let net = ipnet::Ipv6Net::new(Ipv6Addr::from(buf), bit_len)
                    .map_err(|e| ParserError::ParseError(e.to_string()))?;
                ipnet::IpNet::V6(net)
            }
            other => {
                return Err(ParserError::Unsupported(format!(
                    "cannot parse a plain NLRI prefix for AFI {other:?}"
                )))
            }
        };

        prefixes.push(NetworkPrefix::new(prefix, path_id));
    }
    Ok(prefixes)
}
