//! Kernel event monitoring.
//!
//! A [`MonitorSocket`] owns one routing socket per watched namespace,
//! each joined to the full set of rtnetlink multicast groups. Spawning
//! it starts a listener task that decodes every datagram into typed
//! messages and hands them to the consumer over a bounded channel.
//!
//! Delivery preserves kernel order and never drops: a full channel
//! blocks the listener until the consumer catches up. A decode failure
//! ends the session; the failure arrives on the channel after every
//! message decoded before it.
//!
//! # Example
//!
//! ```ignore
//! use nlmon::monitor::{MonitorSocket, NamespaceScope};
//!
//! let socket = MonitorSocket::open(NamespaceScope::Current)?;
//! let (handle, mut rx) = socket.spawn();
//!
//! while let Some(event) = rx.recv().await {
//!     let event = event?;
//!     println!("{:?}", event.message);
//! }
//! handle.close();
//! ```

use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::{mpsc, watch};
use tokio_stream::{Stream, StreamExt, StreamMap};
use tracing::{debug, trace};

use crate::netlink::messages::Message;
use crate::netlink::rtnetlink_groups::*;
use crate::netlink::{FrameIter, NetlinkSocket, Result, namespace};

/// Capacity of the delivery channel, in messages.
pub const QUEUE_CAPACITY: usize = 64;

/// Multicast groups a monitor socket joins.
const MONITOR_GROUPS: [u32; 6] = [
    RTNLGRP_LINK,
    RTNLGRP_NEIGH,
    RTNLGRP_IPV4_IFADDR,
    RTNLGRP_IPV4_ROUTE,
    RTNLGRP_IPV6_IFADDR,
    RTNLGRP_IPV6_ROUTE,
];

/// Which namespaces a monitor covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamespaceScope {
    /// The namespace this process runs in.
    Current,
    /// The current namespace plus every named namespace under
    /// `/var/run/netns`.
    All,
}

/// One decoded message, tagged with the namespace it arrived from.
#[derive(Debug, Clone)]
pub struct MonitorEvent {
    /// Source namespace name; empty for the current namespace.
    pub namespace: String,
    /// The decoded message.
    pub message: Message,
}

/// A raw datagram stream over one routing socket.
struct FrameStream {
    socket: NetlinkSocket,
}

impl FrameStream {
    fn new(socket: NetlinkSocket) -> Self {
        Self { socket }
    }
}

impl Stream for FrameStream {
    type Item = Result<Vec<u8>>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.socket.poll_recv(cx).map(Some)
    }
}

/// A set of subscribed routing sockets, ready to spawn a listener.
pub struct MonitorSocket {
    streams: StreamMap<String, FrameStream>,
}

impl MonitorSocket {
    /// Open monitor sockets for the given scope.
    ///
    /// Every socket is created and joined to all monitored multicast
    /// groups before this returns. In [`NamespaceScope::All`] mode the
    /// first namespace that cannot be opened or joined fails the whole
    /// call; there is no partial subscription.
    pub fn open(scope: NamespaceScope) -> Result<MonitorSocket> {
        let mut streams = StreamMap::new();

        let mut socket = NetlinkSocket::new()?;
        subscribe(&mut socket)?;
        debug!(pid = socket.pid(), "subscribed current namespace");
        streams.insert(String::new(), FrameStream::new(socket));

        if scope == NamespaceScope::All {
            for name in namespace::list()? {
                let mut socket = namespace::socket_for(&name)?;
                subscribe(&mut socket)?;
                debug!(namespace = %name, pid = socket.pid(), "subscribed namespace");
                streams.insert(name, FrameStream::new(socket));
            }
        }

        Ok(Self { streams })
    }

    /// Number of namespaces covered.
    pub fn namespace_count(&self) -> usize {
        self.streams.len()
    }

    /// Start the listener task.
    ///
    /// Returns a close handle and the receiving end of the delivery
    /// channel. The channel yields messages in kernel order; it ends
    /// after [`MonitorHandle::close`], or after a terminal `Err` when
    /// the session aborts on a read or decode failure.
    pub fn spawn(self) -> (MonitorHandle, mpsc::Receiver<Result<MonitorEvent>>) {
        let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
        let (handle, closed_rx) = MonitorHandle::new();
        tokio::spawn(listen(self.streams, tx, closed_rx));
        (handle, rx)
    }
}

fn subscribe(socket: &mut NetlinkSocket) -> Result<()> {
    for group in MONITOR_GROUPS {
        socket.add_membership(group)?;
    }
    Ok(())
}

/// The listener loop.
///
/// Generic over the datagram source so tests can drive it with
/// fabricated traffic. Each item pairs a namespace name with one raw
/// datagram. Sending on a full channel blocks here, which is what keeps
/// a slow consumer from losing messages.
pub async fn listen<S>(
    mut frames: S,
    tx: mpsc::Sender<Result<MonitorEvent>>,
    mut closed: watch::Receiver<bool>,
) where
    S: Stream<Item = (String, Result<Vec<u8>>)> + Unpin,
{
    loop {
        let (namespace, datagram) = tokio::select! {
            biased;
            _ = closed.changed() => {
                debug!("monitor closed");
                return;
            }
            item = frames.next() => match item {
                Some(item) => item,
                None => return,
            },
        };

        let buf = match datagram {
            Ok(buf) => buf,
            Err(e) => {
                // Read failure ends the session after what was already
                // delivered.
                let _ = tx.send(Err(e)).await;
                return;
            }
        };
        trace!(namespace = %namespace, bytes = buf.len(), "datagram");

        for frame in FrameIter::new(&buf) {
            let decoded: Result<Message> =
                frame.and_then(|(header, payload)| Message::decode(header, payload));
            match decoded {
                Ok(message) => {
                    let event = MonitorEvent {
                        namespace: namespace.clone(),
                        message,
                    };
                    if tx.send(Ok(event)).await.is_err() {
                        // Consumer went away
                        return;
                    }
                }
                Err(e) => {
                    let _ = tx.send(Err(e)).await;
                    return;
                }
            }
        }
    }
}

/// Handle for shutting a monitor down.
///
/// Cloneable so any task can request shutdown. Closing is idempotent;
/// after the first call the listener stops reading and drops its end of
/// the delivery channel, which unblocks a consumer waiting on it.
#[derive(Clone)]
pub struct MonitorHandle {
    closed: watch::Sender<bool>,
}

impl MonitorHandle {
    /// Create a handle together with the shutdown signal the listener
    /// watches.
    pub fn new() -> (MonitorHandle, watch::Receiver<bool>) {
        let (closed, rx) = watch::channel(false);
        (MonitorHandle { closed }, rx)
    }

    /// Close the monitor. Safe to call more than once.
    pub fn close(&self) {
        self.closed.send_replace(true);
    }

    /// Check whether close has been requested.
    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }
}
