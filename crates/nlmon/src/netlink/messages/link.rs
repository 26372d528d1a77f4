//! Strongly-typed link message.

use crate::netlink::attr::{AttrIter, get};
use crate::netlink::error::Result;
use crate::netlink::types::link::{IfInfoMsg, LinkStats64, OperState};

/// Attribute IDs for IFLA_* constants.
mod attr_ids {
    pub const IFLA_ADDRESS: u16 = 1;
    pub const IFLA_BROADCAST: u16 = 2;
    pub const IFLA_IFNAME: u16 = 3;
    pub const IFLA_MTU: u16 = 4;
    pub const IFLA_QDISC: u16 = 6;
    pub const IFLA_MASTER: u16 = 10;
    pub const IFLA_OPERSTATE: u16 = 16;
    pub const IFLA_LINKINFO: u16 = 18;
    pub const IFLA_STATS64: u16 = 23;
    pub const IFLA_CARRIER: u16 = 33;
}

/// Nested IFLA_INFO_* attribute IDs.
mod info_ids {
    pub const IFLA_INFO_KIND: u16 = 1;
}

/// Strongly-typed link message with attributes parsed.
#[derive(Debug, Clone, Default)]
pub struct LinkMessage {
    /// Fixed-size header.
    pub(crate) header: IfInfoMsg,
    /// Interface name (IFLA_IFNAME).
    pub(crate) name: Option<String>,
    /// Hardware address (IFLA_ADDRESS).
    pub(crate) address: Option<Vec<u8>>,
    /// Broadcast address (IFLA_BROADCAST).
    pub(crate) broadcast: Option<Vec<u8>>,
    /// MTU (IFLA_MTU).
    pub(crate) mtu: Option<u32>,
    /// Qdisc name (IFLA_QDISC).
    pub(crate) qdisc: Option<String>,
    /// Master device index (IFLA_MASTER).
    pub(crate) master: Option<u32>,
    /// Operational state (IFLA_OPERSTATE).
    pub(crate) operstate: Option<OperState>,
    /// Carrier state (IFLA_CARRIER).
    pub(crate) carrier: Option<bool>,
    /// Link type kind from IFLA_LINKINFO (e.g., "vlan", "bridge").
    pub(crate) kind: Option<String>,
    /// Statistics (IFLA_STATS64).
    pub(crate) stats: Option<LinkStats64>,
}

impl LinkMessage {
    /// Parse a link message body (fixed header plus attributes).
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let header = *IfInfoMsg::from_bytes(data)?;
        let mut msg = LinkMessage {
            header,
            ..Default::default()
        };

        for attr in AttrIter::new(&data[IfInfoMsg::SIZE..]) {
            let (kind, payload) = attr?;
            match kind {
                attr_ids::IFLA_IFNAME => msg.name = Some(get::string(payload)?),
                attr_ids::IFLA_ADDRESS => msg.address = Some(get::bytes(payload)),
                attr_ids::IFLA_BROADCAST => msg.broadcast = Some(get::bytes(payload)),
                attr_ids::IFLA_MTU => msg.mtu = Some(get::u32_ne(payload)?),
                attr_ids::IFLA_QDISC => msg.qdisc = Some(get::string(payload)?),
                attr_ids::IFLA_MASTER => msg.master = Some(get::u32_ne(payload)?),
                attr_ids::IFLA_OPERSTATE => {
                    msg.operstate = Some(OperState::from(get::u8(payload)?));
                }
                attr_ids::IFLA_CARRIER => msg.carrier = Some(get::u8(payload)? != 0),
                attr_ids::IFLA_LINKINFO => msg.kind = parse_info_kind(payload)?,
                attr_ids::IFLA_STATS64 => msg.stats = LinkStats64::from_bytes(payload),
                _ => {}
            }
        }

        Ok(msg)
    }

    /// Get the interface index.
    pub fn ifindex(&self) -> i32 {
        self.header.ifi_index
    }

    /// Get the interface flags.
    pub fn flags(&self) -> u32 {
        self.header.ifi_flags
    }

    /// Get the interface name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Get the interface name, or a default placeholder.
    pub fn name_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.name.as_deref().unwrap_or(default)
    }

    /// Get the hardware address as bytes.
    pub fn address(&self) -> Option<&[u8]> {
        self.address.as_deref()
    }

    /// Get the MTU.
    pub fn mtu(&self) -> Option<u32> {
        self.mtu
    }

    /// Get the master device index.
    pub fn master(&self) -> Option<u32> {
        self.master
    }

    /// Get the operational state.
    pub fn operstate(&self) -> Option<OperState> {
        self.operstate
    }

    /// Get the link type kind (e.g., "vlan", "bridge", "veth").
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    /// Get the statistics.
    pub fn stats(&self) -> Option<&LinkStats64> {
        self.stats.as_ref()
    }

    /// Check if the interface is up.
    pub fn is_up(&self) -> bool {
        self.header.ifi_flags & 0x1 != 0 // IFF_UP
    }

    /// Format the hardware address as a MAC string.
    pub fn mac_address(&self) -> Option<String> {
        let addr = self.address.as_ref()?;
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

/// Pull IFLA_INFO_KIND out of the IFLA_LINKINFO nest.
fn parse_info_kind(data: &[u8]) -> Result<Option<String>> {
    for attr in AttrIter::new(data) {
        let (kind, payload) = attr?;
        if kind == info_ids::IFLA_INFO_KIND {
            return Ok(Some(get::string(payload)?));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlink::fixtures;

    #[test]
    fn test_parse_link() {
        let data = fixtures::link_body("eth0", 2, 0x11043, 1500);
        let msg = LinkMessage::from_bytes(&data).unwrap();
        assert_eq!(msg.ifindex(), 2);
        assert_eq!(msg.name(), Some("eth0"));
        assert_eq!(msg.mtu(), Some(1500));
        assert!(msg.is_up());
    }

    #[test]
    fn test_parse_link_truncated_header() {
        assert!(LinkMessage::from_bytes(&[0u8; 8]).is_err());
    }
}
