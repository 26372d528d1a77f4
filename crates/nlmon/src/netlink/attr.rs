//! Netlink attribute (rtattr/nlattr) handling.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use super::error::{Error, Result};

/// Netlink attribute alignment.
pub const NLA_ALIGNTO: usize = 4;

/// Align a length to NLA_ALIGNTO boundary.
#[inline]
pub const fn nla_align(len: usize) -> usize {
    (len + NLA_ALIGNTO - 1) & !(NLA_ALIGNTO - 1)
}

/// Size of the attribute header.
pub const NLA_HDRLEN: usize = 4;

/// Netlink attribute header (mirrors struct nlattr / struct rtattr).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct NlAttr {
    /// Length including header.
    pub nla_len: u16,
    /// Attribute type.
    pub nla_type: u16,
}

/// Attribute type flags.
pub const NLA_F_NESTED: u16 = 1 << 15;
pub const NLA_F_NET_BYTEORDER: u16 = 1 << 14;
pub const NLA_TYPE_MASK: u16 = !(NLA_F_NESTED | NLA_F_NET_BYTEORDER);

impl NlAttr {
    /// Get the attribute type without flags.
    pub fn kind(&self) -> u16 {
        self.nla_type & NLA_TYPE_MASK
    }

    /// Get the payload length (total length minus header).
    pub fn payload_len(&self) -> usize {
        (self.nla_len as usize).saturating_sub(NLA_HDRLEN)
    }

    /// Parse from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<&Self> {
        Self::ref_from_prefix(data)
            .map(|(r, _)| r)
            .map_err(|_| Error::Truncated {
                expected: std::mem::size_of::<Self>(),
                actual: data.len(),
            })
    }
}

/// Iterator over netlink attributes in a payload.
///
/// Yields `Err` for malformed encodings: an attribute whose declared
/// length is shorter than the header, or exceeds the remaining buffer.
/// This is a distinct failure from an unknown message type code; the
/// payload cannot be walked any further once it happens. Trailing bytes
/// shorter than one attribute header are alignment padding, not an
/// error.
pub struct AttrIter<'a> {
    data: &'a [u8],
}

impl<'a> AttrIter<'a> {
    /// Create a new attribute iterator.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }
}

impl<'a> Iterator for AttrIter<'a> {
    /// Returns (attribute type, payload data).
    type Item = Result<(u16, &'a [u8])>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.data.len() < NLA_HDRLEN {
            return None;
        }

        let attr = match NlAttr::from_bytes(self.data) {
            Ok(a) => a,
            Err(e) => {
                self.data = &[];
                return Some(Err(e));
            }
        };

        let len = attr.nla_len as usize;
        if len < NLA_HDRLEN || len > self.data.len() {
            let msg = format!(
                "attribute type {} declares {} bytes, {} remain",
                attr.kind(),
                len,
                self.data.len()
            );
            self.data = &[];
            return Some(Err(Error::InvalidAttribute(msg)));
        }

        let kind = attr.kind();
        let payload = &self.data[NLA_HDRLEN..len];
        let aligned_len = nla_align(len);

        // Move to next attribute
        if aligned_len >= self.data.len() {
            self.data = &[];
        } else {
            self.data = &self.data[aligned_len..];
        }

        Some(Ok((kind, payload)))
    }
}

/// Helper functions for extracting typed values from attribute payloads.
pub mod get {
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

    use super::*;

    /// Extract a u8 value.
    pub fn u8(data: &[u8]) -> Result<u8> {
        data.first()
            .copied()
            .ok_or_else(|| Error::InvalidAttribute("empty u8 attribute".into()))
    }

    /// Extract a u32 value (native endian).
    pub fn u32_ne(data: &[u8]) -> Result<u32> {
        if data.len() < 4 {
            return Err(Error::InvalidAttribute("truncated u32 attribute".into()));
        }
        Ok(u32::from_ne_bytes([data[0], data[1], data[2], data[3]]))
    }

    /// Extract a u16 value (native endian).
    pub fn u16_ne(data: &[u8]) -> Result<u16> {
        if data.len() < 2 {
            return Err(Error::InvalidAttribute("truncated u16 attribute".into()));
        }
        Ok(u16::from_ne_bytes([data[0], data[1]]))
    }

    /// Extract an i32 value (native endian).
    pub fn i32_ne(data: &[u8]) -> Result<i32> {
        if data.len() < 4 {
            return Err(Error::InvalidAttribute("truncated i32 attribute".into()));
        }
        Ok(i32::from_ne_bytes([data[0], data[1], data[2], data[3]]))
    }

    /// Extract a null-terminated string.
    pub fn string(data: &[u8]) -> Result<String> {
        let len = data.iter().position(|&b| b == 0).unwrap_or(data.len());
        std::str::from_utf8(&data[..len])
            .map(str::to_owned)
            .map_err(|e| Error::InvalidAttribute(format!("invalid UTF-8: {}", e)))
    }

    /// Extract bytes (no interpretation).
    pub fn bytes(data: &[u8]) -> Vec<u8> {
        data.to_vec()
    }

    /// Extract an IP address; the attribute width decides the family.
    pub fn ip_addr(data: &[u8]) -> Result<IpAddr> {
        match data.len() {
            4 => {
                let octets: [u8; 4] = data.try_into().unwrap();
                Ok(IpAddr::V4(Ipv4Addr::from(octets)))
            }
            16 => {
                let octets: [u8; 16] = data.try_into().unwrap();
                Ok(IpAddr::V6(Ipv6Addr::from(octets)))
            }
            n => Err(Error::InvalidAttribute(format!(
                "address attribute of {} bytes",
                n
            ))),
        }
    }
}
