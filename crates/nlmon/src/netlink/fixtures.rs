//! Netlink message fixtures for testing.
//!
//! Helpers that assemble message bodies and whole frames so parsing
//! tests do not need network access.

use crate::netlink::message::{NLMSG_HDRLEN, NlMsgHdr, nlmsg_align};

/// Append one attribute with padding.
pub fn push_attr(buf: &mut Vec<u8>, kind: u16, payload: &[u8]) {
    let len = 4 + payload.len();
    buf.extend_from_slice(&(len as u16).to_ne_bytes());
    buf.extend_from_slice(&kind.to_ne_bytes());
    buf.extend_from_slice(payload);
    buf.resize(buf.len() + (nlmsg_align(len) - len), 0);
}

/// Append a NUL-terminated string attribute.
pub fn push_attr_str(buf: &mut Vec<u8>, kind: u16, value: &str) {
    let mut payload = value.as_bytes().to_vec();
    payload.push(0);
    push_attr(buf, kind, &payload);
}

/// Wrap a body in a netlink frame header.
pub fn frame(msg_type: u16, flags: u16, seq: u32, body: &[u8]) -> Vec<u8> {
    let hdr = NlMsgHdr {
        nlmsg_len: (NLMSG_HDRLEN + body.len()) as u32,
        nlmsg_type: msg_type,
        nlmsg_flags: flags,
        nlmsg_seq: seq,
        nlmsg_pid: 0,
    };
    let mut buf = hdr.as_bytes().to_vec();
    buf.extend_from_slice(body);
    buf
}

/// Link message body (struct ifinfomsg plus attributes).
pub fn link_body(name: &str, index: i32, flags: u32, mtu: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.push(0); // family = AF_UNSPEC
    buf.push(0); // pad
    buf.extend_from_slice(&1u16.to_ne_bytes()); // type = ARPHRD_ETHER
    buf.extend_from_slice(&index.to_ne_bytes());
    buf.extend_from_slice(&flags.to_ne_bytes());
    buf.extend_from_slice(&0u32.to_ne_bytes()); // change
    push_attr_str(&mut buf, 3, name); // IFLA_IFNAME
    push_attr(&mut buf, 4, &mtu.to_ne_bytes()); // IFLA_MTU
    buf
}

/// Address message body (struct ifaddrmsg plus attributes).
pub fn addr_body(family: u8, prefixlen: u8, index: u32, addr: &[u8], label: &str) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.push(family);
    buf.push(prefixlen);
    buf.push(0); // flags
    buf.push(0); // scope = RT_SCOPE_UNIVERSE
    buf.extend_from_slice(&index.to_ne_bytes());
    push_attr(&mut buf, 1, addr); // IFA_ADDRESS
    push_attr(&mut buf, 2, addr); // IFA_LOCAL
    push_attr_str(&mut buf, 3, label); // IFA_LABEL
    buf
}

/// Route message body (struct rtmsg plus attributes).
pub fn route_body(family: u8, dst_len: u8, dst: &[u8], oif: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.push(family);
    buf.push(dst_len);
    buf.push(0); // src_len
    buf.push(0); // tos
    buf.push(254); // table = RT_TABLE_MAIN
    buf.push(2); // protocol = RTPROT_KERNEL
    buf.push(0); // scope = RT_SCOPE_UNIVERSE
    buf.push(1); // type = RTN_UNICAST
    buf.extend_from_slice(&0u32.to_ne_bytes()); // flags
    if !dst.is_empty() {
        push_attr(&mut buf, 1, dst); // RTA_DST
    }
    push_attr(&mut buf, 4, &oif.to_ne_bytes()); // RTA_OIF
    buf
}

/// Neighbor message body (struct ndmsg plus attributes).
pub fn neigh_body(family: u8, ifindex: i32, state: u16, dst: &[u8], lladdr: &[u8]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.push(family);
    buf.push(0); // pad1
    buf.extend_from_slice(&0u16.to_ne_bytes()); // pad2
    buf.extend_from_slice(&ifindex.to_ne_bytes());
    buf.extend_from_slice(&state.to_ne_bytes());
    buf.push(0); // flags
    buf.push(0); // type
    push_attr(&mut buf, 1, dst); // NDA_DST
    push_attr(&mut buf, 2, lladdr); // NDA_LLADDR
    buf
}

/// Error message body (struct nlmsgerr): errno plus the original header.
pub fn error_body(errno: i32, orig: &NlMsgHdr) -> Vec<u8> {
    let mut buf = errno.to_ne_bytes().to_vec();
    buf.extend_from_slice(orig.as_bytes());
    buf
}
