//! Namer that binds every name to one fixed address set.

use std::net::SocketAddr;
use std::sync::Arc;

use serde::Deserialize;

use crate::config::ComponentError;
use crate::namer::{Namer, NamerConfig, Resolution};
use crate::routing::Path;

/// Parameters for the `fixed` namer kind.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct FixedConfig {
    /// Addresses as `host:port`.
    pub addresses: Vec<String>,
}

impl NamerConfig for FixedConfig {
    fn build(&self, prefix: &Path) -> Result<Arc<dyn Namer>, ComponentError> {
        let addrs = self
            .addresses
            .iter()
            .map(|a| {
                a.parse::<SocketAddr>().map_err(|e| ComponentError::InvalidParam {
                    name: "addresses",
                    message: format!("'{}': {}", a, e),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Arc::new(FixedNamer {
            prefix: prefix.clone(),
            addrs,
        }))
    }
}

#[derive(Debug)]
pub struct FixedNamer {
    prefix: Path,
    addrs: Vec<SocketAddr>,
}

impl Namer for FixedNamer {
    fn lookup(&self, residual: &Path) -> Resolution {
        if self.addrs.is_empty() {
            return Resolution::Neg;
        }
        Resolution::Bound {
            id: self.prefix.clone(),
            addrs: self.addrs.clone(),
            residual: residual.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binds_any_residual() {
        let config = FixedConfig {
            addresses: vec!["127.0.0.1:8080".into()],
        };
        let namer = config.build(&"/a".parse().unwrap()).unwrap();
        match namer.lookup(&"/x/y".parse().unwrap()) {
            Resolution::Bound { id, addrs, residual } => {
                assert_eq!(id.to_string(), "/a");
                assert_eq!(addrs, vec!["127.0.0.1:8080".parse().unwrap()]);
                assert_eq!(residual.to_string(), "/x/y");
            }
            Resolution::Neg => panic!("expected a binding"),
        }
    }

    #[test]
    fn test_no_addresses_is_neg() {
        let namer = FixedConfig::default().build(&"/a".parse().unwrap()).unwrap();
        assert_eq!(namer.lookup(&Path::empty()), Resolution::Neg);
    }

    #[test]
    fn test_invalid_address_fails_build() {
        let config = FixedConfig {
            addresses: vec!["localhost".into()],
        };
        let err = config.build(&"/a".parse().unwrap()).unwrap_err();
        assert!(matches!(err, ComponentError::InvalidParam { name: "addresses", .. }));
    }
}
