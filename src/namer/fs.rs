//! File-system namer.
//!
//! # Responsibilities
//! - Map the first residual segment to a file under `rootDir`
//! - Read one `host port` pair per line from that file
//!
//! # Design Decisions
//! - The file is read on every lookup; no watching or caching
//! - Unparseable lines are skipped with a warning, not fatal
//! - A missing file is a negative resolution

use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;

use crate::config::ComponentError;
use crate::namer::{Namer, NamerConfig, Resolution};
use crate::routing::Path;

/// Parameters for the `fs` namer kind.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FsConfig {
    pub root_dir: PathBuf,
}

impl NamerConfig for FsConfig {
    fn build(&self, prefix: &Path) -> Result<Arc<dyn Namer>, ComponentError> {
        if !self.root_dir.is_dir() {
            return Err(ComponentError::InvalidParam {
                name: "rootDir",
                message: format!("{} is not a directory", self.root_dir.display()),
            });
        }
        Ok(Arc::new(FsNamer {
            prefix: prefix.clone(),
            root_dir: self.root_dir.clone(),
        }))
    }
}

#[derive(Debug)]
pub struct FsNamer {
    prefix: Path,
    root_dir: PathBuf,
}

impl Namer for FsNamer {
    fn lookup(&self, residual: &Path) -> Resolution {
        // Dot-names would escape or alias rootDir.
        let Some((name, rest)) = residual.split_first().filter(|(n, _)| !n.starts_with('.')) else {
            return Resolution::Neg;
        };
        let contents = match fs::read_to_string(self.root_dir.join(name)) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::debug!(name = %name, error = %e, "fs namer has no entry");
                return Resolution::Neg;
            }
        };

        let addrs: Vec<SocketAddr> = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| {
                let parsed = parse_line(line);
                if parsed.is_none() {
                    tracing::warn!(name = %name, line = %line, "Skipping malformed address line");
                }
                parsed
            })
            .collect();

        let Ok(id) = self.prefix.join(name) else {
            return Resolution::Neg;
        };
        Resolution::Bound {
            id,
            addrs,
            residual: rest,
        }
    }
}

fn parse_line(line: &str) -> Option<SocketAddr> {
    let mut parts = line.split_whitespace();
    let host: IpAddr = parts.next()?.parse().ok()?;
    let port: u16 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(SocketAddr::new(host, port))
}
