//! Strongly-typed route message.

use std::net::IpAddr;

use crate::netlink::attr::{AttrIter, get};
use crate::netlink::error::Result;
use crate::netlink::types::route::{RouteProtocol, RouteScope, RouteType, RtMsg};

/// Attribute IDs for RTA_* constants.
mod attr_ids {
    pub const RTA_DST: u16 = 1;
    pub const RTA_SRC: u16 = 2;
    pub const RTA_OIF: u16 = 4;
    pub const RTA_GATEWAY: u16 = 5;
    pub const RTA_PRIORITY: u16 = 6;
    pub const RTA_PREFSRC: u16 = 7;
    pub const RTA_TABLE: u16 = 15;
}

/// Strongly-typed route message with attributes parsed.
#[derive(Debug, Clone, Default)]
pub struct RouteMessage {
    /// Fixed-size header.
    pub(crate) header: RtMsg,
    /// Destination prefix (RTA_DST).
    pub(crate) dst: Option<IpAddr>,
    /// Source prefix (RTA_SRC).
    pub(crate) src: Option<IpAddr>,
    /// Output interface index (RTA_OIF).
    pub(crate) oif: Option<u32>,
    /// Gateway address (RTA_GATEWAY).
    pub(crate) gateway: Option<IpAddr>,
    /// Route metric (RTA_PRIORITY).
    pub(crate) priority: Option<u32>,
    /// Preferred source address (RTA_PREFSRC).
    pub(crate) prefsrc: Option<IpAddr>,
    /// Routing table ID (RTA_TABLE, supersedes rtm_table).
    pub(crate) table: Option<u32>,
}

impl RouteMessage {
    /// Parse a route message body (fixed header plus attributes).
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let header = *RtMsg::from_bytes(data)?;
        let mut msg = RouteMessage {
            header,
            ..Default::default()
        };

        for attr in AttrIter::new(&data[RtMsg::SIZE..]) {
            let (kind, payload) = attr?;
            match kind {
                attr_ids::RTA_DST => msg.dst = Some(get::ip_addr(payload)?),
                attr_ids::RTA_SRC => msg.src = Some(get::ip_addr(payload)?),
                attr_ids::RTA_OIF => msg.oif = Some(get::u32_ne(payload)?),
                attr_ids::RTA_GATEWAY => msg.gateway = Some(get::ip_addr(payload)?),
                attr_ids::RTA_PRIORITY => msg.priority = Some(get::u32_ne(payload)?),
                attr_ids::RTA_PREFSRC => msg.prefsrc = Some(get::ip_addr(payload)?),
                attr_ids::RTA_TABLE => msg.table = Some(get::u32_ne(payload)?),
                _ => {}
            }
        }

        Ok(msg)
    }

    /// Get the destination prefix length.
    pub fn dst_len(&self) -> u8 {
        self.header.rtm_dst_len
    }

    /// Get the destination address.
    pub fn dst(&self) -> Option<IpAddr> {
        self.dst
    }

    /// Get the gateway address.
    pub fn gateway(&self) -> Option<IpAddr> {
        self.gateway
    }

    /// Get the output interface index.
    pub fn oif(&self) -> Option<u32> {
        self.oif
    }

    /// Get the routing table ID. RTA_TABLE wins over the header byte.
    pub fn table(&self) -> u32 {
        self.table.unwrap_or(self.header.rtm_table as u32)
    }

    /// Get the route type.
    pub fn route_type(&self) -> RouteType {
        RouteType::from(self.header.rtm_type)
    }

    /// Get the routing protocol.
    pub fn protocol(&self) -> RouteProtocol {
        RouteProtocol::from(self.header.rtm_protocol)
    }

    /// Get the route scope.
    pub fn scope(&self) -> RouteScope {
        RouteScope::from(self.header.rtm_scope)
    }

    /// Check if this is a default route.
    pub fn is_default(&self) -> bool {
        self.header.rtm_dst_len == 0 && self.dst.is_none()
    }
}
