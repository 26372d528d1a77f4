//! Netlink message header and frame iteration.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use super::error::{Error, Result};

/// Netlink message header alignment.
pub const NLMSG_ALIGNTO: usize = 4;

/// Align a length to NLMSG_ALIGNTO boundary.
#[inline]
pub const fn nlmsg_align(len: usize) -> usize {
    (len + NLMSG_ALIGNTO - 1) & !(NLMSG_ALIGNTO - 1)
}

/// Size of the netlink message header.
pub const NLMSG_HDRLEN: usize = nlmsg_align(std::mem::size_of::<NlMsgHdr>());

/// Netlink message header (mirrors struct nlmsghdr).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct NlMsgHdr {
    /// Length of message including header.
    pub nlmsg_len: u32,
    /// Message type.
    pub nlmsg_type: u16,
    /// Additional flags.
    pub nlmsg_flags: u16,
    /// Sequence number.
    pub nlmsg_seq: u32,
    /// Sending process port ID.
    pub nlmsg_pid: u32,
}

impl NlMsgHdr {
    /// Get the payload length (total length minus header).
    pub fn payload_len(&self) -> usize {
        (self.nlmsg_len as usize).saturating_sub(NLMSG_HDRLEN)
    }

    /// Check if this message has the multi flag.
    pub fn is_multi(&self) -> bool {
        self.nlmsg_flags & NLM_F_MULTI != 0
    }

    /// Convert header to bytes.
    pub fn as_bytes(&self) -> &[u8] {
        <Self as IntoBytes>::as_bytes(self)
    }

    /// Parse header from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<&Self> {
        Self::ref_from_prefix(data)
            .map(|(r, _)| r)
            .map_err(|_| Error::Truncated {
                expected: std::mem::size_of::<Self>(),
                actual: data.len(),
            })
    }
}

/// Standard netlink message types.
pub struct NlMsgType;

impl NlMsgType {
    /// No operation; carries no payload.
    pub const NOOP: u16 = 1;
    /// Error message or ACK.
    pub const ERROR: u16 = 2;
    /// End of multipart message.
    pub const DONE: u16 = 3;
    /// Data lost, request resend.
    pub const OVERRUN: u16 = 4;

    // Link messages
    pub const RTM_NEWLINK: u16 = 16;
    pub const RTM_DELLINK: u16 = 17;

    // Address messages
    pub const RTM_NEWADDR: u16 = 20;
    pub const RTM_DELADDR: u16 = 21;

    // Route messages
    pub const RTM_NEWROUTE: u16 = 24;
    pub const RTM_DELROUTE: u16 = 25;

    // Neighbor messages
    pub const RTM_NEWNEIGH: u16 = 28;
    pub const RTM_DELNEIGH: u16 = 29;
}

/// Netlink message flags.
pub const NLM_F_REQUEST: u16 = 0x01;
pub const NLM_F_MULTI: u16 = 0x02;
pub const NLM_F_ACK: u16 = 0x04;

/// Iterator over netlink messages in a receive buffer.
///
/// One kernel read can return several messages back to back; this walks
/// them in order. A declared length that is shorter than a header or
/// longer than the remaining buffer is yielded as an error item, since
/// the framing has no resynchronization marker.
pub struct FrameIter<'a> {
    data: &'a [u8],
}

impl<'a> FrameIter<'a> {
    /// Create a new frame iterator over a receive buffer.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }
}

impl<'a> Iterator for FrameIter<'a> {
    type Item = Result<(&'a NlMsgHdr, &'a [u8])>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.data.is_empty() {
            return None;
        }
        if self.data.len() < NLMSG_HDRLEN {
            let actual = self.data.len();
            self.data = &[];
            return Some(Err(Error::Truncated {
                expected: NLMSG_HDRLEN,
                actual,
            }));
        }

        let header = match NlMsgHdr::from_bytes(self.data) {
            Ok(h) => h,
            Err(e) => {
                self.data = &[];
                return Some(Err(e));
            }
        };

        let msg_len = header.nlmsg_len as usize;
        if msg_len < NLMSG_HDRLEN || msg_len > self.data.len() {
            self.data = &[];
            return Some(Err(Error::InvalidMessage(format!(
                "invalid message length: {}",
                msg_len
            ))));
        }

        let payload = &self.data[NLMSG_HDRLEN..msg_len];
        let aligned_len = nlmsg_align(msg_len);

        // Move to next message
        if aligned_len >= self.data.len() {
            self.data = &[];
        } else {
            self.data = &self.data[aligned_len..];
        }

        Some(Ok((header, payload)))
    }
}

/// Netlink error message payload (struct nlmsgerr).
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, Immutable, KnownLayout)]
pub struct NlMsgError {
    /// Error code (negative errno or 0 for ACK).
    pub error: i32,
    /// Original message header that caused the error.
    pub msg: NlMsgHdr,
}

impl NlMsgError {
    /// Parse error message from payload.
    pub fn from_bytes(data: &[u8]) -> Result<&Self> {
        Self::ref_from_prefix(data)
            .map(|(r, _)| r)
            .map_err(|_| Error::Truncated {
                expected: std::mem::size_of::<Self>(),
                actual: data.len(),
            })
    }

    /// Check if this is an ACK (no error).
    pub fn is_ack(&self) -> bool {
        self.error == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(msg_type: u16, seq: u32, payload: &[u8]) -> Vec<u8> {
        let hdr = NlMsgHdr {
            nlmsg_len: (NLMSG_HDRLEN + payload.len()) as u32,
            nlmsg_type: msg_type,
            nlmsg_flags: 0,
            nlmsg_seq: seq,
            nlmsg_pid: 0,
        };
        let mut buf = hdr.as_bytes().to_vec();
        buf.extend_from_slice(payload);
        // Pad to alignment like the kernel does
        while buf.len() % NLMSG_ALIGNTO != 0 {
            buf.push(0);
        }
        buf
    }

    #[test]
    fn test_iterates_multiple_frames() {
        let mut buf = frame(NlMsgType::NOOP, 1, &[]);
        buf.extend(frame(NlMsgType::DONE, 2, &[0u8; 4]));

        let frames: Vec<_> = FrameIter::new(&buf).collect::<Result<Vec<_>>>().unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].0.nlmsg_type, NlMsgType::NOOP);
        assert_eq!(frames[0].0.nlmsg_seq, 1);
        assert_eq!(frames[1].0.nlmsg_type, NlMsgType::DONE);
        assert_eq!(frames[1].1.len(), 4);
    }

    #[test]
    fn test_bad_declared_length_is_error() {
        let mut buf = frame(NlMsgType::NOOP, 1, &[]);
        // Claim 64 bytes while only the header is present
        buf[0] = 64;
        let mut iter = FrameIter::new(&buf);
        assert!(matches!(
            iter.next(),
            Some(Err(Error::InvalidMessage(_)))
        ));
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_short_trailing_bytes_are_error() {
        let mut buf = frame(NlMsgType::NOOP, 1, &[]);
        buf.extend_from_slice(&[0u8; 3]);
        let results: Vec<_> = FrameIter::new(&buf).collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(Error::Truncated { .. })));
    }

    #[test]
    fn test_nlmsg_error_parse() {
        let inner = NlMsgHdr {
            nlmsg_len: NLMSG_HDRLEN as u32,
            nlmsg_type: NlMsgType::RTM_NEWLINK,
            nlmsg_flags: NLM_F_REQUEST,
            nlmsg_seq: 7,
            nlmsg_pid: 0,
        };
        let mut payload = (-19i32).to_ne_bytes().to_vec(); // ENODEV
        payload.extend_from_slice(inner.as_bytes());

        let err = NlMsgError::from_bytes(&payload).unwrap();
        assert_eq!(err.error, -19);
        assert_eq!(err.msg.nlmsg_seq, 7);
        assert!(!err.is_ack());
    }
}
