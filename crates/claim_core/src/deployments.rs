use std::{collections::HashMap, fmt, str::FromStr};

use alloy_primitives::{address, Address};

pub const MULTI_SEND: &str = "MultiSend";
pub const MULTI_SEND_CALL_ONLY: &str = "MultiSendCallOnly";

/// Semantic version of a Safe contract, e.g. `1.3.0+L2`. Build metadata is
/// ignored. A pre-release such as `1.3.0-rc.1` sorts below its release; its
/// label is not kept, so two pre-releases of one version compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContractVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    /// False for pre-releases
    pub release: bool,
}

impl ContractVersion {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            release: true,
        }
    }

    pub const fn pre_release(self) -> Self {
        Self {
            release: false,
            ..self
        }
    }
}

impl FromStr for ContractVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let trimmed = trimmed.strip_prefix(['v', 'V']).unwrap_or(trimmed);
        let without_build = trimmed.split('+').next().unwrap_or_default();
        let (core, release) = match without_build.split_once('-') {
            Some((core, _)) => (core, false),
            None => (without_build, true),
        };

        let parts = core
            .split('.')
            .map(|part| part.parse::<u64>().map_err(|e| format!("invalid version {s}: {e}")))
            .collect::<Result<Vec<_>, _>>()?;
        let version = match parts[..] {
            [major, minor] => Self::new(major, minor, 0),
            [major, minor, patch] => Self::new(major, minor, patch),
            _ => return Err(format!("invalid version {s}")),
        };
        Ok(Self { release, ..version })
    }
}

impl fmt::Display for ContractVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if !self.release {
            f.write_str("-pre")?;
        }
        Ok(())
    }
}

/// Looks up where a named contract version is deployed on a chain.
pub trait DeploymentRegistry: Send + Sync {
    fn resolve(&self, name: &str, version: &ContractVersion, chain_id: u64) -> Option<Address>;
}

/// In-memory deployment table.
#[derive(Debug, Clone)]
pub struct StaticDeployments {
    entries: HashMap<(String, ContractVersion, u64), Address>,
}

const MULTI_SEND_1_1_1: Address = address!("8d29be29923b68abfdd21e541b9374737b49cdad");
const MULTI_SEND_CALL_ONLY_1_3_0: Address = address!("40a2accbd92bca938b02010e17a5b8929b49130d");
const CANONICAL_CHAINS: [u64; 4] = [1, 4, 5, 100];

impl StaticDeployments {
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn with(
        mut self,
        name: &str,
        version: ContractVersion,
        chain_id: u64,
        address: Address,
    ) -> Self {
        self.entries.insert((name.to_string(), version, chain_id), address);
        self
    }
}

impl Default for StaticDeployments {
    /// Canonical MultiSend deployments of the Safe contracts.
    fn default() -> Self {
        CANONICAL_CHAINS
            .iter()
            .fold(Self::empty(), |deployments, chain_id| {
                deployments
                    .with(MULTI_SEND, ContractVersion::new(1, 1, 1), *chain_id, MULTI_SEND_1_1_1)
                    .with(
                        MULTI_SEND_CALL_ONLY,
                        ContractVersion::new(1, 3, 0),
                        *chain_id,
                        MULTI_SEND_CALL_ONLY_1_3_0,
                    )
            })
    }
}

impl DeploymentRegistry for StaticDeployments {
    fn resolve(&self, name: &str, version: &ContractVersion, chain_id: u64) -> Option<Address> {
        self.entries
            .get(&(name.to_string(), *version, chain_id))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version() {
        assert_eq!("1.3.0".parse(), Ok(ContractVersion::new(1, 3, 0)));
        assert_eq!("1.3.0+L2".parse(), Ok(ContractVersion::new(1, 3, 0)));
        assert_eq!("1.4.1-beta".parse(), Ok(ContractVersion::new(1, 4, 1).pre_release()));
        assert_eq!("1.3.0-rc.1+L2".parse(), Ok(ContractVersion::new(1, 3, 0).pre_release()));
        assert_eq!(" 1.2 ".parse(), Ok(ContractVersion::new(1, 2, 0)));
        assert_eq!("v1.3.0".parse(), Ok(ContractVersion::new(1, 3, 0)));
        assert!("".parse::<ContractVersion>().is_err());
        assert!("1".parse::<ContractVersion>().is_err());
        assert!("1.x.0".parse::<ContractVersion>().is_err());
        assert!("1.2.3.4".parse::<ContractVersion>().is_err());
        assert!("1.3.0-".parse::<ContractVersion>().is_ok());
        assert!("-1.3.0".parse::<ContractVersion>().is_err());
    }

    #[test]
    fn test_versions_compare_numerically() {
        let v1_10_0: ContractVersion = "1.10.0".parse().unwrap();
        let v1_3_0: ContractVersion = "1.3.0".parse().unwrap();
        let v1_1_1: ContractVersion = "1.1.1".parse().unwrap();
        assert!(v1_10_0 > v1_3_0);
        assert!(v1_3_0 > v1_1_1);
        assert_eq!(v1_10_0.to_string(), "1.10.0");

        let v1_3_0_rc: ContractVersion = "1.3.0-rc.1".parse().unwrap();
        assert!(v1_3_0_rc < v1_3_0);
        assert!(v1_3_0_rc > ContractVersion::new(1, 2, 9));
        assert_eq!(v1_3_0_rc.to_string(), "1.3.0-pre");
    }

    #[test]
    fn test_default_deployments() {
        let deployments = StaticDeployments::default();
        assert_eq!(
            deployments.resolve(MULTI_SEND_CALL_ONLY, &ContractVersion::new(1, 3, 0), 1),
            Some(MULTI_SEND_CALL_ONLY_1_3_0)
        );
        assert_eq!(
            deployments.resolve(MULTI_SEND, &ContractVersion::new(1, 1, 1), 5),
            Some(MULTI_SEND_1_1_1)
        );
        assert_eq!(
            deployments.resolve(MULTI_SEND, &ContractVersion::new(1, 3, 0), 1),
            None
        );
        assert_eq!(
            deployments.resolve(MULTI_SEND, &ContractVersion::new(1, 1, 1), 424242),
            None
        );
    }
}
