//! Text output for monitored events.
//!
//! One event renders as a header line followed by indented detail
//! lines. Indentation is a fixed four-space unit per nesting level, so
//! two captures of the same traffic diff cleanly.

use std::io::{self, Write};

use crate::monitor::MonitorEvent;
use crate::netlink::messages::{
    Action, AddrMessage, ErrorMessage, LinkMessage, Message, NeighborMessage, RouteMessage,
};
use crate::netlink::types::link::flag_names;
use crate::netlink::types::neigh::ntf_flag_names;

/// One indentation step.
pub const INDENT_UNIT: &str = "    ";

/// A writer that prefixes each line with the current indent level.
pub struct IndentWriter<W> {
    inner: W,
    level: usize,
    at_line_start: bool,
}

impl<W: Write> IndentWriter<W> {
    /// Wrap a writer at indent level zero.
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            level: 0,
            at_line_start: true,
        }
    }

    /// Increase the indent by one unit.
    pub fn push(&mut self) {
        self.level += 1;
    }

    /// Decrease the indent by one unit.
    pub fn pop(&mut self) {
        self.level = self.level.saturating_sub(1);
    }

    /// Unwrap the inner writer.
    pub fn into_inner(self) -> W {
        self.inner
    }

    fn write_indent(&mut self) -> io::Result<()> {
        for _ in 0..self.level {
            self.inner.write_all(INDENT_UNIT.as_bytes())?;
        }
        Ok(())
    }
}

impl<W: Write> Write for IndentWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut written = 0;
        for chunk in buf.split_inclusive(|&b| b == b'\n') {
            if self.at_line_start && chunk != b"\n" {
                self.write_indent()?;
            }
            self.inner.write_all(chunk)?;
            written += chunk.len();
            self.at_line_start = chunk.ends_with(b"\n");
        }
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Write one event as indented text.
pub fn write_event<W: Write>(w: &mut W, event: &MonitorEvent) -> io::Result<()> {
    let mut out = IndentWriter::new(w);
    if !event.namespace.is_empty() {
        write!(out, "{}: ", event.namespace)?;
    }
    match &event.message {
        Message::Noop(noop) => write_seq_block(&mut out, "noop", noop.seq),
        Message::Done(done) => write_seq_block(&mut out, "done", done.seq),
        Message::Error(err) => write_error(&mut out, err),
        Message::Link(action, link) => write_link(&mut out, *action, link),
        Message::Addr(action, addr) => write_addr(&mut out, *action, addr),
        Message::Route(action, route) => write_route(&mut out, *action, route),
        Message::Neighbor(action, neigh) => write_neighbor(&mut out, *action, neigh),
    }
}

fn write_seq_block<W: Write>(out: &mut IndentWriter<W>, kind: &str, seq: u32) -> io::Result<()> {
    writeln!(out, "{}", kind)?;
    out.push();
    writeln!(out, "seq: {}", seq)?;
    out.pop();
    Ok(())
}

fn write_error<W: Write>(out: &mut IndentWriter<W>, err: &ErrorMessage) -> io::Result<()> {
    if err.is_ack() {
        writeln!(out, "ack")?;
        out.push();
        writeln!(out, "seq: {}", err.seq)?;
    } else {
        writeln!(out, "error")?;
        out.push();
        writeln!(out, "code: {}", err.code)?;
        writeln!(out, "seq: {}", err.seq)?;
    }
    out.pop();
    Ok(())
}

fn write_link<W: Write>(
    out: &mut IndentWriter<W>,
    action: Action,
    link: &LinkMessage,
) -> io::Result<()> {
    writeln!(out, "link {} {}", action.name(), link.name_or("?"))?;
    out.push();
    writeln!(out, "index: {}", link.ifindex())?;
    writeln!(out, "flags: {}", flag_names(link.flags()))?;
    if let Some(mtu) = link.mtu() {
        writeln!(out, "mtu: {}", mtu)?;
    }
    if let Some(mac) = link.mac_address() {
        writeln!(out, "address: {}", mac)?;
    }
    if let Some(state) = link.operstate() {
        writeln!(out, "state: {}", state.name())?;
    }
    if let Some(master) = link.master() {
        writeln!(out, "master: {}", master)?;
    }
    if let Some(kind) = link.kind() {
        writeln!(out, "kind: {}", kind)?;
    }
    if let Some(stats) = link.stats() {
        writeln!(out, "stats:")?;
        out.push();
        writeln!(out, "rx-packets: {}", stats.rx_packets)?;
        writeln!(out, "tx-packets: {}", stats.tx_packets)?;
        writeln!(out, "rx-bytes: {}", stats.rx_bytes)?;
        writeln!(out, "tx-bytes: {}", stats.tx_bytes)?;
        writeln!(out, "rx-errors: {}", stats.rx_errors)?;
        writeln!(out, "tx-errors: {}", stats.tx_errors)?;
        out.pop();
    }
    out.pop();
    Ok(())
}

fn write_addr<W: Write>(
    out: &mut IndentWriter<W>,
    action: Action,
    addr: &AddrMessage,
) -> io::Result<()> {
    match addr.address() {
        Some(ip) => writeln!(out, "addr {} {}/{}", action.name(), ip, addr.prefixlen())?,
        None => writeln!(out, "addr {} ?/{}", action.name(), addr.prefixlen())?,
    }
    out.push();
    writeln!(out, "index: {}", addr.ifindex())?;
    writeln!(out, "scope: {}", addr.scope().name())?;
    if let Some(label) = addr.label() {
        writeln!(out, "label: {}", label)?;
    }
    if let Some(info) = addr.cacheinfo() {
        writeln!(out, "lifetime:")?;
        out.push();
        writeln!(out, "preferred: {}", lifetime(info.ifa_prefered))?;
        writeln!(out, "valid: {}", lifetime(info.ifa_valid))?;
        out.pop();
    }
    out.pop();
    Ok(())
}

fn write_route<W: Write>(
    out: &mut IndentWriter<W>,
    action: Action,
    route: &RouteMessage,
) -> io::Result<()> {
    match route.dst() {
        Some(dst) => writeln!(out, "route {} {}/{}", action.name(), dst, route.dst_len())?,
        None => writeln!(out, "route {} default", action.name())?,
    }
    out.push();
    writeln!(out, "type: {}", route.route_type().name())?;
    writeln!(out, "proto: {}", route.protocol().name())?;
    writeln!(out, "scope: {}", route.scope().name())?;
    writeln!(out, "table: {}", route.table())?;
    if let Some(gw) = route.gateway() {
        writeln!(out, "via: {}", gw)?;
    }
    if let Some(oif) = route.oif() {
        writeln!(out, "oif: {}", oif)?;
    }
    out.pop();
    Ok(())
}

fn write_neighbor<W: Write>(
    out: &mut IndentWriter<W>,
    action: Action,
    neigh: &NeighborMessage,
) -> io::Result<()> {
    match neigh.dst() {
        Some(dst) => writeln!(out, "neighbor {} {}", action.name(), dst)?,
        None => writeln!(out, "neighbor {} ?", action.name())?,
    }
    out.push();
    writeln!(out, "index: {}", neigh.ifindex())?;
    writeln!(out, "state: {}", neigh.state_name())?;
    if neigh.flags() != 0 {
        writeln!(out, "flags: {}", ntf_flag_names(neigh.flags()))?;
    }
    if let Some(mac) = neigh.mac_address() {
        writeln!(out, "lladdr: {}", mac)?;
    }
    out.pop();
    Ok(())
}

/// Render an address lifetime; u32::MAX means forever.
fn lifetime(value: u32) -> String {
    if value == u32::MAX {
        "forever".to_string()
    } else {
        format!("{}sec", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlink::fixtures;
    use crate::netlink::message::{FrameIter, NlMsgType};

    fn decode_event(msg_type: u16, body: &[u8]) -> MonitorEvent {
        let buf = fixtures::frame(msg_type, 0, 1, body);
        let (header, payload) = FrameIter::new(&buf).next().unwrap().unwrap();
        MonitorEvent {
            namespace: String::new(),
            message: Message::decode(header, payload).unwrap(),
        }
    }

    fn render(event: &MonitorEvent) -> String {
        let mut buf = Vec::new();
        write_event(&mut buf, event).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_indent_writer_levels() {
        let mut out = IndentWriter::new(Vec::new());
        writeln!(out, "top").unwrap();
        out.push();
        writeln!(out, "one").unwrap();
        out.push();
        writeln!(out, "two").unwrap();
        out.pop();
        writeln!(out, "one again").unwrap();
        let text = String::from_utf8(out.into_inner()).unwrap();
        assert_eq!(text, "top\n    one\n        two\n    one again\n");
    }

    #[test]
    fn test_link_output_is_indented() {
        let body = fixtures::link_body("eth0", 2, 0x1, 1500);
        let event = decode_event(NlMsgType::RTM_NEWLINK, &body);
        let text = render(&event);
        assert_eq!(
            text,
            "link new eth0\n    index: 2\n    flags: up\n    mtu: 1500\n"
        );
    }

    #[test]
    fn test_addr_output() {
        let body = fixtures::addr_body(libc::AF_INET as u8, 24, 2, &[192, 168, 1, 10], "eth0");
        let event = decode_event(NlMsgType::RTM_DELADDR, &body);
        let text = render(&event);
        assert_eq!(
            text,
            "addr del 192.168.1.10/24\n    index: 2\n    scope: global\n    label: eth0\n"
        );
    }

    #[test]
    fn test_default_route_output() {
        let body = fixtures::route_body(libc::AF_INET as u8, 0, &[], 2);
        let event = decode_event(NlMsgType::RTM_NEWROUTE, &body);
        let text = render(&event);
        assert!(text.starts_with("route new default\n"));
        assert!(text.contains("    table: 254\n"));
    }

    #[test]
    fn test_neighbor_output_includes_flags() {
        use crate::netlink::types::neigh::ntf;

        let mut body =
            fixtures::neigh_body(libc::AF_INET as u8, 2, 0x02, &[10, 0, 0, 1], &[0; 6]);
        body[10] = ntf::ROUTER; // ndm_flags
        let event = decode_event(NlMsgType::RTM_NEWNEIGH, &body);
        let text = render(&event);
        assert!(text.starts_with("neighbor new 10.0.0.1\n"));
        assert!(text.contains("    flags: router\n"));
    }

    #[test]
    fn test_done_output_carries_sequence() {
        let buf = fixtures::frame(NlMsgType::DONE, 0, 42, &[]);
        let (header, payload) = FrameIter::new(&buf).next().unwrap().unwrap();
        let event = MonitorEvent {
            namespace: String::new(),
            message: Message::decode(header, payload).unwrap(),
        };
        assert_eq!(render(&event), "done\n    seq: 42\n");
    }

    #[test]
    fn test_namespace_prefix() {
        let body = fixtures::link_body("eth0", 2, 0x1, 1500);
        let mut event = decode_event(NlMsgType::RTM_NEWLINK, &body);
        event.namespace = "blue".to_string();
        let text = render(&event);
        assert!(text.starts_with("blue: link new eth0\n"));
    }
}
