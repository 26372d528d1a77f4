//! Fixed-size kernel header structs and name tables.
//!
//! One module per rtnetlink subsystem. The header structs mirror the
//! kernel's C layouts and derive zerocopy traits so they can be read
//! straight out of a receive buffer.

pub mod addr;
pub mod link;
pub mod neigh;
pub mod route;
