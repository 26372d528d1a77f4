//! Filtered event dumping.
//!
//! Parses selector tokens into a filter, runs a monitor, and writes
//! every matching event as indented text until the session ends.

use std::collections::HashSet;
use std::io::Write;

use tokio::sync::mpsc;
use tracing::debug;

use crate::monitor::{MonitorEvent, MonitorSocket, NamespaceScope};
use crate::netlink::messages::MessageKind;
use crate::netlink::{Error, Result};
use crate::output::write_event;

/// Spellings of the scope token that widens a dump to every named
/// namespace. Flag-style dashes are tolerated so the token works the
/// same whether a caller treats it as a selector word or an option.
pub const ALL_NSID_TOKENS: [&str; 3] = ["all-nsid", "-all-nsid", "--all-nsid"];

/// Which message kinds a dump lets through.
///
/// An empty selection means everything; filtering is opt-in.
#[derive(Debug, Clone, Default)]
pub struct DumpFilter {
    kinds: HashSet<MessageKind>,
}

impl DumpFilter {
    /// Check whether a message kind passes the filter.
    pub fn matches(&self, kind: MessageKind) -> bool {
        self.kinds.is_empty() || self.kinds.contains(&kind)
    }

    /// Check whether the filter lets everything through.
    pub fn is_all(&self) -> bool {
        self.kinds.is_empty()
    }

    fn insert(&mut self, kind: MessageKind) {
        self.kinds.insert(kind);
    }
}

/// A validated dump request: a filter plus a namespace scope.
#[derive(Debug, Clone)]
pub struct DumpRequest {
    pub filter: DumpFilter,
    pub scope: NamespaceScope,
}

impl DumpRequest {
    /// Parse selector tokens.
    ///
    /// Each token is either a message kind (`link`, `addr`, `route`,
    /// `neighbor`, `noop`, `error`, `done`) or the scope modifier
    /// `all-nsid` (also accepted as `-all-nsid` or `--all-nsid`). No
    /// kind tokens means all kinds. Any unknown token fails the whole
    /// request; nothing is opened before validation passes.
    pub fn parse<I, S>(tokens: I) -> Result<DumpRequest>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut filter = DumpFilter::default();
        let mut scope = NamespaceScope::Current;

        for token in tokens {
            let token = token.as_ref();
            if ALL_NSID_TOKENS.contains(&token) {
                scope = NamespaceScope::All;
                continue;
            }
            match MessageKind::from_token(token) {
                Some(kind) => filter.insert(kind),
                None => {
                    return Err(Error::UnknownSelector {
                        token: token.to_string(),
                    });
                }
            }
        }

        Ok(DumpRequest { filter, scope })
    }

    /// Open a monitor for this request and dump matching events.
    ///
    /// Runs until the monitor session ends. A session that ends on a
    /// read or decode failure returns that failure, after everything
    /// delivered before it has been written.
    pub async fn run<W: Write>(self, out: &mut W) -> Result<()> {
        let socket = MonitorSocket::open(self.scope)?;
        debug!(namespaces = socket.namespace_count(), "dump started");
        let (_handle, rx) = socket.spawn();
        dump(&self.filter, rx, out).await
    }
}

/// Consume a monitor channel, writing events that pass the filter.
pub async fn dump<W: Write>(
    filter: &DumpFilter,
    mut rx: mpsc::Receiver<Result<MonitorEvent>>,
    out: &mut W,
) -> Result<()> {
    while let Some(item) = rx.recv().await {
        let event = item?;
        if filter.matches(event.message.kind()) {
            write_event(out, &event)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlink::fixtures;
    use crate::netlink::message::{FrameIter, NlMsgType};
    use crate::netlink::messages::Message;

    fn event(msg_type: u16, body: &[u8]) -> MonitorEvent {
        let buf = fixtures::frame(msg_type, 0, 1, body);
        let (header, payload) = FrameIter::new(&buf).next().unwrap().unwrap();
        MonitorEvent {
            namespace: String::new(),
            message: Message::decode(header, payload).unwrap(),
        }
    }

    #[test]
    fn test_parse_empty_selects_all() {
        let req = DumpRequest::parse(Vec::<String>::new()).unwrap();
        assert!(req.filter.is_all());
        assert_eq!(req.scope, NamespaceScope::Current);
        for kind in MessageKind::ALL {
            assert!(req.filter.matches(kind));
        }
    }

    #[test]
    fn test_parse_kind_tokens() {
        let req = DumpRequest::parse(["link", "route"]).unwrap();
        assert!(req.filter.matches(MessageKind::Link));
        assert!(req.filter.matches(MessageKind::Route));
        assert!(!req.filter.matches(MessageKind::Addr));
        assert!(!req.filter.matches(MessageKind::Neighbor));
    }

    #[test]
    fn test_parse_scope_modifier() {
        let req = DumpRequest::parse(["all-nsid", "link"]).unwrap();
        assert_eq!(req.scope, NamespaceScope::All);
        assert!(req.filter.matches(MessageKind::Link));

        // Modifier alone keeps the all-kinds default
        let req = DumpRequest::parse(["all-nsid"]).unwrap();
        assert!(req.filter.is_all());
    }

    #[test]
    fn test_scope_modifier_accepts_dashed_spellings() {
        for token in ALL_NSID_TOKENS {
            let req = DumpRequest::parse([token]).unwrap();
            assert_eq!(req.scope, NamespaceScope::All, "token {:?}", token);
        }
    }

    #[test]
    fn test_parse_unknown_token_fails() {
        let err = DumpRequest::parse(["link", "bogus"]).unwrap_err();
        assert!(matches!(err, Error::UnknownSelector { ref token } if token == "bogus"));
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_dump_applies_filter() {
        let (tx, rx) = mpsc::channel(8);
        tx.send(Ok(event(
            NlMsgType::RTM_NEWLINK,
            &fixtures::link_body("eth0", 1, 0x1, 1500),
        )))
        .await
        .unwrap();
        tx.send(Ok(event(
            NlMsgType::RTM_NEWNEIGH,
            &fixtures::neigh_body(libc::AF_INET as u8, 1, 0x02, &[10, 0, 0, 1], &[0; 6]),
        )))
        .await
        .unwrap();
        drop(tx);

        let filter = DumpRequest::parse(["link"]).unwrap().filter;
        let mut out = Vec::new();
        dump(&filter, rx, &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("link new eth0"));
        assert!(!text.contains("neighbor"));
    }

    #[tokio::test]
    async fn test_dump_writes_then_returns_failure() {
        let (tx, rx) = mpsc::channel(8);
        tx.send(Ok(event(
            NlMsgType::RTM_NEWLINK,
            &fixtures::link_body("eth0", 1, 0x1, 1500),
        )))
        .await
        .unwrap();
        tx.send(Err(Error::UnknownType { code: 99 }))
            .await
            .unwrap();
        drop(tx);

        let filter = DumpFilter::default();
        let mut out = Vec::new();
        let err = dump(&filter, rx, &mut out).await.unwrap_err();
        assert!(matches!(err, Error::UnknownType { code: 99 }));

        // The message queued before the failure still went out
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("link new eth0"));
    }
}
