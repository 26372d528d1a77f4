//! Strongly-typed netlink message structures.
//!
//! Raw frames from the socket are dispatched on their header type code
//! into one of a closed set of message variants. A type code outside
//! that set is a decode failure, not a silently skipped frame.

mod address;
mod link;
mod neighbor;
mod route;

pub use address::AddrMessage;
pub use link::LinkMessage;
pub use neighbor::NeighborMessage;
pub use route::RouteMessage;

use crate::netlink::error::{Error, Result};
use crate::netlink::message::{NlMsgError, NlMsgHdr, NlMsgType};

/// Whether a routing message announces an object appearing or going away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    New,
    Del,
}

impl Action {
    /// Get the name of this action.
    pub fn name(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Del => "del",
        }
    }
}

/// Kernel no-op frame (NLMSG_NOOP). No payload; kept so a trace of the
/// session stays complete.
#[derive(Debug, Clone, Copy)]
pub struct NoopMessage {
    /// Sequence number from the frame header.
    pub seq: u32,
}

/// End of a multipart run (NLMSG_DONE).
#[derive(Debug, Clone, Copy)]
pub struct DoneMessage {
    /// Sequence number of the multipart run this terminates.
    pub seq: u32,
}

/// Error or ACK reported by the kernel (NLMSG_ERROR).
#[derive(Debug, Clone, Copy)]
pub struct ErrorMessage {
    /// Negative errno, or 0 for an ACK.
    pub code: i32,
    /// Sequence number of the request being answered.
    pub seq: u32,
}

impl ErrorMessage {
    /// Check if this is an ACK (no error).
    pub fn is_ack(&self) -> bool {
        self.code == 0
    }
}

/// One decoded netlink message.
#[derive(Debug, Clone)]
pub enum Message {
    /// NLMSG_NOOP.
    Noop(NoopMessage),
    /// NLMSG_ERROR; kernel error or ACK.
    Error(ErrorMessage),
    /// NLMSG_DONE; end of a multipart run.
    Done(DoneMessage),
    /// RTM_NEWLINK / RTM_DELLINK.
    Link(Action, LinkMessage),
    /// RTM_NEWADDR / RTM_DELADDR.
    Addr(Action, AddrMessage),
    /// RTM_NEWROUTE / RTM_DELROUTE.
    Route(Action, RouteMessage),
    /// RTM_NEWNEIGH / RTM_DELNEIGH.
    Neighbor(Action, NeighborMessage),
}

impl Message {
    /// Decode one frame into a typed message.
    ///
    /// Fails with [`Error::UnknownType`] for a type code outside the
    /// supported set, and with a decode error when the payload does not
    /// parse as the structure its type code promises.
    pub fn decode(header: &NlMsgHdr, payload: &[u8]) -> Result<Message> {
        match header.nlmsg_type {
            NlMsgType::NOOP => Ok(Message::Noop(NoopMessage {
                seq: header.nlmsg_seq,
            })),
            NlMsgType::ERROR => {
                let err = NlMsgError::from_bytes(payload)?;
                Ok(Message::Error(ErrorMessage {
                    code: err.error,
                    seq: err.msg.nlmsg_seq,
                }))
            }
            NlMsgType::DONE => Ok(Message::Done(DoneMessage {
                seq: header.nlmsg_seq,
            })),
            NlMsgType::RTM_NEWLINK => {
                Ok(Message::Link(Action::New, LinkMessage::from_bytes(payload)?))
            }
            NlMsgType::RTM_DELLINK => {
                Ok(Message::Link(Action::Del, LinkMessage::from_bytes(payload)?))
            }
            NlMsgType::RTM_NEWADDR => {
                Ok(Message::Addr(Action::New, AddrMessage::from_bytes(payload)?))
            }
            NlMsgType::RTM_DELADDR => {
                Ok(Message::Addr(Action::Del, AddrMessage::from_bytes(payload)?))
            }
            NlMsgType::RTM_NEWROUTE => Ok(Message::Route(
                Action::New,
                RouteMessage::from_bytes(payload)?,
            )),
            NlMsgType::RTM_DELROUTE => Ok(Message::Route(
                Action::Del,
                RouteMessage::from_bytes(payload)?,
            )),
            NlMsgType::RTM_NEWNEIGH => Ok(Message::Neighbor(
                Action::New,
                NeighborMessage::from_bytes(payload)?,
            )),
            NlMsgType::RTM_DELNEIGH => Ok(Message::Neighbor(
                Action::Del,
                NeighborMessage::from_bytes(payload)?,
            )),
            code => Err(Error::UnknownType { code }),
        }
    }

    /// Get the kind of this message.
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Noop(_) => MessageKind::Noop,
            Message::Error(_) => MessageKind::Error,
            Message::Done(_) => MessageKind::Done,
            Message::Link(..) => MessageKind::Link,
            Message::Addr(..) => MessageKind::Addr,
            Message::Route(..) => MessageKind::Route,
            Message::Neighbor(..) => MessageKind::Neighbor,
        }
    }

    /// Get the sequence number for control messages.
    ///
    /// Noop, Done, and Error frames answer a specific request, so they
    /// keep the sequence number that req used. Multicast notifications
    /// are unsolicited and carry none.
    pub fn seq(&self) -> Option<u32> {
        match self {
            Message::Noop(noop) => Some(noop.seq),
            Message::Error(err) => Some(err.seq),
            Message::Done(done) => Some(done.seq),
            _ => None,
        }
    }
}

/// The kind of a message, without its contents. Used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Noop,
    Error,
    Done,
    Link,
    Addr,
    Route,
    Neighbor,
}

impl MessageKind {
    /// All message kinds, in display order.
    pub const ALL: [MessageKind; 7] = [
        MessageKind::Noop,
        MessageKind::Error,
        MessageKind::Done,
        MessageKind::Link,
        MessageKind::Addr,
        MessageKind::Route,
        MessageKind::Neighbor,
    ];

    /// Get the selector token for this kind.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Noop => "noop",
            Self::Error => "error",
            Self::Done => "done",
            Self::Link => "link",
            Self::Addr => "addr",
            Self::Route => "route",
            Self::Neighbor => "neighbor",
        }
    }

    /// Parse a selector token.
    pub fn from_token(token: &str) -> Option<MessageKind> {
        match token {
            "noop" => Some(Self::Noop),
            "error" => Some(Self::Error),
            "done" => Some(Self::Done),
            "link" => Some(Self::Link),
            "addr" => Some(Self::Addr),
            "route" => Some(Self::Route),
            "neighbor" => Some(Self::Neighbor),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlink::fixtures;
    use crate::netlink::message::{FrameIter, NLM_F_REQUEST, NLMSG_HDRLEN};

    #[test]
    fn test_decode_link_frame() {
        let body = fixtures::link_body("eth0", 2, 0x1, 1500);
        let buf = fixtures::frame(NlMsgType::RTM_NEWLINK, 0, 1, &body);
        let (header, payload) = FrameIter::new(&buf).next().unwrap().unwrap();

        match Message::decode(header, payload).unwrap() {
            Message::Link(Action::New, link) => {
                assert_eq!(link.name(), Some("eth0"));
                assert_eq!(link.ifindex(), 2);
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_decode_del_action() {
        let body = fixtures::neigh_body(libc::AF_INET as u8, 2, 0x02, &[10, 0, 0, 1], &[0; 6]);
        let buf = fixtures::frame(NlMsgType::RTM_DELNEIGH, 0, 1, &body);
        let (header, payload) = FrameIter::new(&buf).next().unwrap().unwrap();

        let msg = Message::decode(header, payload).unwrap();
        assert!(matches!(msg, Message::Neighbor(Action::Del, _)));
        assert_eq!(msg.kind(), MessageKind::Neighbor);
    }

    #[test]
    fn test_decode_error_frame() {
        let orig = NlMsgHdr {
            nlmsg_len: NLMSG_HDRLEN as u32,
            nlmsg_type: NlMsgType::RTM_NEWLINK,
            nlmsg_flags: NLM_F_REQUEST,
            nlmsg_seq: 9,
            nlmsg_pid: 0,
        };
        let body = fixtures::error_body(-19, &orig);
        let buf = fixtures::frame(NlMsgType::ERROR, 0, 9, &body);
        let (header, payload) = FrameIter::new(&buf).next().unwrap().unwrap();

        match Message::decode(header, payload).unwrap() {
            Message::Error(err) => {
                assert_eq!(err.code, -19);
                assert_eq!(err.seq, 9);
                assert!(!err.is_ack());
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_control_frames_keep_their_sequence() {
        let buf = fixtures::frame(NlMsgType::DONE, 0, 42, &[]);
        let (header, payload) = FrameIter::new(&buf).next().unwrap().unwrap();
        let msg = Message::decode(header, payload).unwrap();
        assert!(matches!(msg, Message::Done(DoneMessage { seq: 42 })));
        assert_eq!(msg.seq(), Some(42));

        let buf = fixtures::frame(NlMsgType::NOOP, 0, 7, &[]);
        let (header, payload) = FrameIter::new(&buf).next().unwrap().unwrap();
        let msg = Message::decode(header, payload).unwrap();
        assert_eq!(msg.seq(), Some(7));

        let body = fixtures::link_body("eth0", 2, 0x1, 1500);
        let buf = fixtures::frame(NlMsgType::RTM_NEWLINK, 0, 3, &body);
        let (header, payload) = FrameIter::new(&buf).next().unwrap().unwrap();
        assert_eq!(Message::decode(header, payload).unwrap().seq(), None);
    }

    #[test]
    fn test_decode_unknown_type() {
        let buf = fixtures::frame(99, 0, 1, &[]);
        let (header, payload) = FrameIter::new(&buf).next().unwrap().unwrap();
        assert!(matches!(
            Message::decode(header, payload),
            Err(Error::UnknownType { code: 99 })
        ));
    }

    #[test]
    fn test_selector_tokens_round_trip() {
        for kind in MessageKind::ALL {
            assert_eq!(MessageKind::from_token(kind.name()), Some(kind));
        }
        assert_eq!(MessageKind::from_token("bogus"), None);
    }
}
