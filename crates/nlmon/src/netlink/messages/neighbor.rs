//! Strongly-typed neighbor message.

use std::net::IpAddr;

use crate::netlink::attr::{AttrIter, get};
use crate::netlink::error::Result;
use crate::netlink::types::neigh::{NdMsg, NdaCacheinfo, nud_state_name};

/// Attribute IDs for NDA_* constants.
mod attr_ids {
    pub const NDA_DST: u16 = 1;
    pub const NDA_LLADDR: u16 = 2;
    pub const NDA_CACHEINFO: u16 = 3;
    pub const NDA_PROBES: u16 = 4;
}

/// Strongly-typed neighbor message with attributes parsed.
#[derive(Debug, Clone, Default)]
pub struct NeighborMessage {
    /// Fixed-size header.
    pub(crate) header: NdMsg,
    /// Neighbor address (NDA_DST).
    pub(crate) dst: Option<IpAddr>,
    /// Link-layer address (NDA_LLADDR).
    pub(crate) lladdr: Option<Vec<u8>>,
    /// Cache info (NDA_CACHEINFO).
    pub(crate) cacheinfo: Option<NdaCacheinfo>,
    /// Probe count (NDA_PROBES).
    pub(crate) probes: Option<u32>,
}

impl NeighborMessage {
    /// Parse a neighbor message body (fixed header plus attributes).
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let header = *NdMsg::from_bytes(data)?;
        let mut msg = NeighborMessage {
            header,
            ..Default::default()
        };

        for attr in AttrIter::new(&data[NdMsg::SIZE..]) {
            let (kind, payload) = attr?;
            match kind {
                attr_ids::NDA_DST => msg.dst = Some(get::ip_addr(payload)?),
                attr_ids::NDA_LLADDR => msg.lladdr = Some(get::bytes(payload)),
                attr_ids::NDA_CACHEINFO => msg.cacheinfo = NdaCacheinfo::from_bytes(payload),
                attr_ids::NDA_PROBES => msg.probes = Some(get::u32_ne(payload)?),
                _ => {}
            }
        }

        Ok(msg)
    }

    /// Get the interface index.
    pub fn ifindex(&self) -> i32 {
        self.header.ndm_ifindex
    }

    /// Get the neighbor state name.
    pub fn state_name(&self) -> &'static str {
        nud_state_name(self.header.ndm_state)
    }

    /// Get the neighbor flags (NTF_*).
    pub fn flags(&self) -> u8 {
        self.header.ndm_flags
    }

    /// Get the neighbor address.
    pub fn dst(&self) -> Option<IpAddr> {
        self.dst
    }

    /// Get the link-layer address as bytes.
    pub fn lladdr(&self) -> Option<&[u8]> {
        self.lladdr.as_deref()
    }

    /// Format the link-layer address as a MAC string.
    pub fn mac_address(&self) -> Option<String> {
        let addr = self.lladdr.as_ref()?;
        if addr.len() == 6 {
            Some(format!(
                "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
                addr[0], addr[1], addr[2], addr[3], addr[4], addr[5]
            ))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlink::fixtures;
    use crate::netlink::types::neigh::nud;

    #[test]
    fn test_parse_neighbor() {
        let data = fixtures::neigh_body(
            libc::AF_INET as u8,
            2,
            nud::REACHABLE,
            &[192, 168, 1, 1],
            &[0xde, 0xad, 0xbe, 0xef, 0x00, 0x01],
        );
        let msg = NeighborMessage::from_bytes(&data).unwrap();
        assert_eq!(msg.ifindex(), 2);
        assert_eq!(msg.state_name(), "REACHABLE");
        assert_eq!(msg.dst(), Some("192.168.1.1".parse().unwrap()));
        assert_eq!(msg.mac_address().as_deref(), Some("de:ad:be:ef:00:01"));
    }
}
