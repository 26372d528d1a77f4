//! Async netlink protocol plumbing.
//!
//! Frame and attribute decoding, the routing socket, and network
//! namespace helpers. The high-level monitor API lives one level up in
//! [`crate::monitor`].

pub mod attr;
mod error;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod message;
pub mod messages;
pub mod namespace;
mod socket;
pub mod types;

pub use attr::{AttrIter, NlAttr};
pub use error::{Error, Result};
pub use message::{FrameIter, NLMSG_HDRLEN, NlMsgHdr, NlMsgType};
pub use socket::{NetlinkSocket, rtnetlink_groups};
