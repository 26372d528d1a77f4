//! Async kernel network event monitoring for Linux.
//!
//! Subscribes a routing netlink socket to the rtnetlink multicast
//! groups, decodes link, address, route, and neighbor notifications
//! into typed messages, and delivers them over a bounded in-order
//! channel. Named network namespaces can be watched alongside the
//! current one from a single monitor.
//!
//! # Example
//!
//! ```ignore
//! use nlmon::dump::DumpRequest;
//!
//! #[tokio::main]
//! async fn main() -> nlmon::Result<()> {
//!     let request = DumpRequest::parse(["link", "addr"])?;
//!     let mut stdout = std::io::stdout().lock();
//!     request.run(&mut stdout).await
//! }
//! ```

pub mod dump;
pub mod monitor;
pub mod netlink;
pub mod output;

pub use dump::{DumpFilter, DumpRequest};
pub use monitor::{MonitorEvent, MonitorHandle, MonitorSocket, NamespaceScope, QUEUE_CAPACITY};
pub use netlink::{Error, Result};
