//! Strongly-typed address message.

use std::net::IpAddr;

use crate::netlink::attr::{AttrIter, get};
use crate::netlink::error::Result;
use crate::netlink::types::addr::{AddrScope, IfAddrMsg, IfaCacheInfo};

/// Attribute IDs for IFA_* constants.
mod attr_ids {
    pub const IFA_ADDRESS: u16 = 1;
    pub const IFA_LOCAL: u16 = 2;
    pub const IFA_LABEL: u16 = 3;
    pub const IFA_BROADCAST: u16 = 4;
    pub const IFA_CACHEINFO: u16 = 6;
}

/// Strongly-typed address message with attributes parsed.
#[derive(Debug, Clone, Default)]
pub struct AddrMessage {
    /// Fixed-size header.
    pub(crate) header: IfAddrMsg,
    /// Interface address (IFA_ADDRESS).
    pub(crate) address: Option<IpAddr>,
    /// Local address (IFA_LOCAL).
    pub(crate) local: Option<IpAddr>,
    /// Interface label (IFA_LABEL).
    pub(crate) label: Option<String>,
    /// Broadcast address (IFA_BROADCAST).
    pub(crate) broadcast: Option<IpAddr>,
    /// Lifetime info (IFA_CACHEINFO).
    pub(crate) cacheinfo: Option<IfaCacheInfo>,
}

impl AddrMessage {
    /// Parse an address message body (fixed header plus attributes).
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let header = *IfAddrMsg::from_bytes(data)?;
        let mut msg = AddrMessage {
            header,
            ..Default::default()
        };

        for attr in AttrIter::new(&data[IfAddrMsg::SIZE..]) {
            let (kind, payload) = attr?;
            match kind {
                attr_ids::IFA_ADDRESS => msg.address = Some(get::ip_addr(payload)?),
                attr_ids::IFA_LOCAL => msg.local = Some(get::ip_addr(payload)?),
                attr_ids::IFA_LABEL => msg.label = Some(get::string(payload)?),
                attr_ids::IFA_BROADCAST => msg.broadcast = Some(get::ip_addr(payload)?),
                attr_ids::IFA_CACHEINFO => msg.cacheinfo = IfaCacheInfo::from_bytes(payload),
                _ => {}
            }
        }

        Ok(msg)
    }

    /// Get the interface index.
    pub fn ifindex(&self) -> u32 {
        self.header.ifa_index
    }

    /// Get the prefix length.
    pub fn prefixlen(&self) -> u8 {
        self.header.ifa_prefixlen
    }

    /// Get the address scope.
    pub fn scope(&self) -> AddrScope {
        AddrScope::from(self.header.ifa_scope)
    }

    /// Get the interface address.
    pub fn address(&self) -> Option<IpAddr> {
        self.address
    }

    /// Get the local address.
    pub fn local(&self) -> Option<IpAddr> {
        self.local
    }

    /// Get the interface label.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Get the lifetime info.
    pub fn cacheinfo(&self) -> Option<&IfaCacheInfo> {
        self.cacheinfo.as_ref()
    }
}
