//! Network namespace utilities.
//!
//! Named namespaces are those created via `ip netns add <name>` and
//! stored as bind mounts under `/var/run/netns/`.

use std::path::{Path, PathBuf};

use super::error::{Error, Result};
use super::socket::NetlinkSocket;

/// The runtime directory where named network namespaces are stored.
pub const NETNS_RUN_DIR: &str = "/var/run/netns";

/// Get the namespace file path for a named namespace.
pub fn path_for(name: &str) -> PathBuf {
    PathBuf::from(NETNS_RUN_DIR).join(name)
}

/// Open a routing socket bound to a named network namespace.
pub fn socket_for(name: &str) -> Result<NetlinkSocket> {
    NetlinkSocket::new_in_namespace_path(path_for(name))
}

/// Check if a named namespace exists.
pub fn exists(name: &str) -> bool {
    path_for(name).exists()
}

/// List all named network namespaces.
///
/// Returns the names of namespaces in `/var/run/netns/`, sorted. A
/// missing directory means no namespaces, not an error.
pub fn list() -> Result<Vec<String>> {
    list_dir(Path::new(NETNS_RUN_DIR))
}

fn list_dir(dir: &Path) -> Result<Vec<String>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(d) => d,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(Error::Io(e));
        }
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(Error::Io)?;
        let name = entry.file_name().to_string_lossy().to_string();
        if name != "." && name != ".." {
            names.push(name);
        }
    }

    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_netns_run_dir() {
        assert_eq!(NETNS_RUN_DIR, "/var/run/netns");
    }

    #[test]
    fn test_list_missing_dir_is_empty() {
        let names = list_dir(Path::new("/definitely/not/a/netns/dir")).unwrap();
        assert!(names.is_empty());
    }

    #[test]
    fn test_exists_nonexistent() {
        assert!(!exists("definitely_does_not_exist_12345"));
    }
}
