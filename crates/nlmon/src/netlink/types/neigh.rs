//! Neighbor (ARP/NDP) message types.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::netlink::error::{Error, Result};

/// Neighbor message (struct ndmsg).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct NdMsg {
    /// Address family.
    pub ndm_family: u8,
    /// Padding.
    pub ndm_pad1: u8,
    /// Padding.
    pub ndm_pad2: u16,
    /// Interface index.
    pub ndm_ifindex: i32,
    /// Neighbor state (NUD_*).
    pub ndm_state: u16,
    /// Neighbor flags (NTF_*).
    pub ndm_flags: u8,
    /// Neighbor type.
    pub ndm_type: u8,
}

impl NdMsg {
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

/// Neighbor state (NUD_*).
pub mod nud {
    pub const INCOMPLETE: u16 = 0x01;
    pub const REACHABLE: u16 = 0x02;
    pub const STALE: u16 = 0x04;
    pub const DELAY: u16 = 0x08;
    pub const PROBE: u16 = 0x10;
    pub const FAILED: u16 = 0x20;
    pub const NOARP: u16 = 0x40;
    pub const PERMANENT: u16 = 0x80;
    pub const NONE: u16 = 0x00;
}

/// Get the name of a neighbor state.
pub fn nud_state_name(state: u16) -> &'static str {
    match state {
        nud::INCOMPLETE => "INCOMPLETE",
        nud::REACHABLE => "REACHABLE",
        nud::STALE => "STALE",
        nud::DELAY => "DELAY",
        nud::PROBE => "PROBE",
        nud::FAILED => "FAILED",
        nud::NOARP => "NOARP",
        nud::PERMANENT => "PERMANENT",
        nud::NONE => "NONE",
        _ => "UNKNOWN",
    }
}

/// Neighbor flags (NTF_*).
pub mod ntf {
    pub const USE: u8 = 0x01;
    pub const SELF: u8 = 0x02;
    pub const MASTER: u8 = 0x04;
    pub const PROXY: u8 = 0x08;
    pub const EXT_LEARNED: u8 = 0x10;
    pub const OFFLOADED: u8 = 0x20;
    pub const STICKY: u8 = 0x40;
    pub const ROUTER: u8 = 0x80;
}

/// Get the names of set neighbor flags, pipe-separated.
pub fn ntf_flag_names(flags: u8) -> String {
    let names = [
        (ntf::USE, "use"),
        (ntf::SELF, "self"),
        (ntf::MASTER, "master"),
        (ntf::PROXY, "proxy"),
        (ntf::EXT_LEARNED, "ext_learned"),
        (ntf::OFFLOADED, "offloaded"),
        (ntf::STICKY, "sticky"),
        (ntf::ROUTER, "router"),
    ];

    let set: Vec<&str> = names
        .iter()
        .filter(|(bit, _)| flags & bit != 0)
        .map(|(_, name)| *name)
        .collect();

    if set.is_empty() {
        "none".to_string()
    } else {
        set.join("|")
    }
}

/// Neighbor cache info (struct nda_cacheinfo).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, Immutable, KnownLayout)]
pub struct NdaCacheinfo {
    pub ndm_confirmed: u32,
    pub ndm_used: u32,
    pub ndm_updated: u32,
    pub ndm_refcnt: u32,
}

impl NdaCacheinfo {
    /// Parse from an NDA_CACHEINFO attribute payload.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        Self::read_from_prefix(data).map(|(s, _)| s).ok()
    }
}
