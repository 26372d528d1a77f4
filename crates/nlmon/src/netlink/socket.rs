//! Low-level async netlink socket operations.

use std::fs::File;
use std::os::unix::io::{AsRawFd, RawFd};
use std::path::Path;
use std::task::{Context, Poll};

use bytes::BytesMut;
use netlink_sys::{Socket, SocketAddr, protocols};
use tokio::io::Interest;
use tokio::io::unix::AsyncFd;

use super::error::{Error, Result};

/// Receive buffer size for one kernel read.
const RECV_BUF_SIZE: usize = 32768;

/// Async NETLINK_ROUTE socket.
pub struct NetlinkSocket {
    /// The underlying async file descriptor.
    fd: AsyncFd<Socket>,
    /// Local port ID (assigned by kernel).
    pid: u32,
}

impl NetlinkSocket {
    /// Create a new routing netlink socket in the current namespace.
    pub fn new() -> Result<Self> {
        Self::create_socket()
    }

    /// Create a routing socket that operates in a specific network
    /// namespace, given an open namespace file descriptor.
    ///
    /// Temporarily switches the calling thread into the target
    /// namespace, creates the socket, then restores the original
    /// namespace. The socket stays bound to the target namespace for
    /// all subsequent operations.
    pub fn new_in_namespace(ns_fd: RawFd) -> Result<Self> {
        // Save the current namespace so we can restore it
        let current_ns = File::open("/proc/self/ns/net")
            .map_err(|e| Error::Namespace(format!("cannot open current namespace: {}", e)))?;
        let current_ns_fd = current_ns.as_raw_fd();

        // SAFETY: setns switches to the namespace referenced by ns_fd,
        // which is a valid open namespace file descriptor.
        let ret = unsafe { libc::setns(ns_fd, libc::CLONE_NEWNET) };
        if ret < 0 {
            return Err(Error::Io(std::io::Error::last_os_error()));
        }

        let result = Self::create_socket();

        // SAFETY: restores the namespace saved above; current_ns_fd is
        // valid until current_ns drops at the end of this function.
        let restore_ret = unsafe { libc::setns(current_ns_fd, libc::CLONE_NEWNET) };
        if restore_ret < 0 {
            tracing::warn!(
                error = %std::io::Error::last_os_error(),
                "failed to restore original namespace"
            );
        }

        result
    }

    /// Create a routing socket in the namespace at the given path,
    /// e.g. `/var/run/netns/<name>` or `/proc/<pid>/ns/net`.
    pub fn new_in_namespace_path<P: AsRef<Path>>(ns_path: P) -> Result<Self> {
        let ns_file = File::open(ns_path.as_ref()).map_err(|e| {
            Error::Namespace(format!(
                "cannot open namespace '{}': {}",
                ns_path.as_ref().display(),
                e
            ))
        })?;
        Self::new_in_namespace(ns_file.as_raw_fd())
    }

    fn create_socket() -> Result<Self> {
        let mut socket = Socket::new(protocols::NETLINK_ROUTE)?;
        socket.set_non_blocking(true)?;

        // Bind to get a port ID
        let mut addr = SocketAddr::new(0, 0);
        socket.bind(&addr)?;
        socket.get_address(&mut addr)?;
        let pid = addr.port_number();

        let fd = AsyncFd::new(socket)?;

        Ok(Self { fd, pid })
    }

    /// Get the local port ID.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Subscribe to a multicast group.
    pub fn add_membership(&mut self, group: u32) -> Result<()> {
        self.fd.get_mut().add_membership(group)?;
        Ok(())
    }

    /// Receive one datagram, allocating a buffer.
    pub async fn recv_msg(&self) -> Result<Vec<u8>> {
        // Allocate with capacity only; recv advances the buffer
        let mut buf = BytesMut::with_capacity(RECV_BUF_SIZE);

        loop {
            let mut guard = self.fd.ready(Interest::READABLE).await?;

            match guard.try_io(|inner| inner.get_ref().recv(&mut buf, 0)) {
                Ok(result) => {
                    let _n = result?;
                    return Ok(buf.to_vec());
                }
                Err(_would_block) => continue,
            }
        }
    }

    /// Poll for one incoming datagram.
    ///
    /// Poll-based version of [`recv_msg`](Self::recv_msg) for use from
    /// `Stream` implementations.
    pub fn poll_recv(&self, cx: &mut Context<'_>) -> Poll<Result<Vec<u8>>> {
        let mut buf = BytesMut::with_capacity(RECV_BUF_SIZE);

        loop {
            let mut guard = match self.fd.poll_read_ready(cx) {
                Poll::Ready(Ok(guard)) => guard,
                Poll::Ready(Err(e)) => return Poll::Ready(Err(e.into())),
                Poll::Pending => return Poll::Pending,
            };

            match guard.try_io(|inner| inner.get_ref().recv(&mut buf, 0)) {
                Ok(result) => match result {
                    Ok(_n) => return Poll::Ready(Ok(buf.to_vec())),
                    Err(e) => return Poll::Ready(Err(e.into())),
                },
                Err(_would_block) => continue,
            }
        }
    }
}

impl AsRawFd for NetlinkSocket {
    fn as_raw_fd(&self) -> RawFd {
        self.fd.get_ref().as_raw_fd()
    }
}

/// Multicast groups for NETLINK_ROUTE.
pub mod rtnetlink_groups {
    pub const RTNLGRP_LINK: u32 = 1;
    pub const RTNLGRP_NEIGH: u32 = 3;
    pub const RTNLGRP_IPV4_IFADDR: u32 = 5;
    pub const RTNLGRP_IPV4_ROUTE: u32 = 7;
    pub const RTNLGRP_IPV6_IFADDR: u32 = 9;
    pub const RTNLGRP_IPV6_ROUTE: u32 = 11;
}
