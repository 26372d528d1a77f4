//! Route message types.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::netlink::error::{Error, Result};

/// Route message (struct rtmsg).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct RtMsg {
    /// Address family.
    pub rtm_family: u8,
    /// Destination prefix length.
    pub rtm_dst_len: u8,
    /// Source prefix length.
    pub rtm_src_len: u8,
    /// TOS filter.
    pub rtm_tos: u8,
    /// Routing table ID.
    pub rtm_table: u8,
    /// Routing protocol (RTPROT_*).
    pub rtm_protocol: u8,
    /// Route scope (RT_SCOPE_*).
    pub rtm_scope: u8,
    /// Route type (RTN_*).
    pub rtm_type: u8,
    /// Route flags.
    pub rtm_flags: u32,
}

impl RtMsg {
    /// Size of this structure.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Convert to bytes.
    pub fn as_bytes(&self) -> &[u8] {
        <Self as IntoBytes>::as_bytes(self)
    }

    /// Parse from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<&Self> {
        Self::ref_from_prefix(data)
            .map(|(r, _)| r)
            .map_err(|_| Error::Truncated {
                expected: Self::SIZE,
                actual: data.len(),
            })
    }
}

/// Route types (RTN_*).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RouteType {
    Unspec = 0,
    Unicast = 1,
    Local = 2,
    Broadcast = 3,
    Anycast = 4,
    Multicast = 5,
    Blackhole = 6,
    Unreachable = 7,
    Prohibit = 8,
    Throw = 9,
    Nat = 10,
}

impl From<u8> for RouteType {
    fn from(val: u8) -> Self {
        match val {
            1 => Self::Unicast,
            2 => Self::Local,
            3 => Self::Broadcast,
            4 => Self::Anycast,
            5 => Self::Multicast,
            6 => Self::Blackhole,
            7 => Self::Unreachable,
            8 => Self::Prohibit,
            9 => Self::Throw,
            10 => Self::Nat,
            _ => Self::Unspec,
        }
    }
}

impl RouteType {
    /// Get the name of this route type.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Unspec => "unspec",
            Self::Unicast => "unicast",
            Self::Local => "local",
            Self::Broadcast => "broadcast",
            Self::Anycast => "anycast",
            Self::Multicast => "multicast",
            Self::Blackhole => "blackhole",
            Self::Unreachable => "unreachable",
            Self::Prohibit => "prohibit",
            Self::Throw => "throw",
            Self::Nat => "nat",
        }
    }
}

/// Route protocols (RTPROT_*): who installed the route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RouteProtocol {
    Unspec = 0,
    Redirect = 1,
    Kernel = 2,
    Boot = 3,
    Static = 4,
    Ra = 9,
    Dhcp = 16,
    Bgp = 186,
    Ospf = 188,
    Rip = 189,
}

impl From<u8> for RouteProtocol {
    fn from(val: u8) -> Self {
        match val {
            1 => Self::Redirect,
            2 => Self::Kernel,
            3 => Self::Boot,
            4 => Self::Static,
            9 => Self::Ra,
            16 => Self::Dhcp,
            186 => Self::Bgp,
            188 => Self::Ospf,
            189 => Self::Rip,
            _ => Self::Unspec,
        }
    }
}

impl RouteProtocol {
    /// Get the name of this protocol.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Unspec => "unspec",
            Self::Redirect => "redirect",
            Self::Kernel => "kernel",
            Self::Boot => "boot",
            Self::Static => "static",
            Self::Ra => "ra",
            Self::Dhcp => "dhcp",
            Self::Bgp => "bgp",
            Self::Ospf => "ospf",
            Self::Rip => "rip",
        }
    }
}

/// Route scope (RT_SCOPE_*).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RouteScope {
    Universe = 0,
    Site = 200,
    Link = 253,
    Host = 254,
    Nowhere = 255,
}

impl From<u8> for RouteScope {
    fn from(val: u8) -> Self {
        match val {
            200 => Self::Site,
            253 => Self::Link,
            254 => Self::Host,
            255 => Self::Nowhere,
            _ => Self::Universe,
        }
    }
}

impl RouteScope {
    /// Get the name of this scope.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Universe => "global",
            Self::Site => "site",
            Self::Link => "link",
            Self::Host => "host",
            Self::Nowhere => "nowhere",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rtmsg_size() {
        assert_eq!(RtMsg::SIZE, 12);
    }

    #[test]
    fn test_enum_round_trips() {
        assert_eq!(RouteType::from(1).name(), "unicast");
        assert_eq!(RouteProtocol::from(2).name(), "kernel");
        assert_eq!(RouteScope::from(253).name(), "link");
        assert_eq!(RouteType::from(77), RouteType::Unspec);
    }
}
