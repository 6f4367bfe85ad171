// Static package catalog — the published packages listed on the landing page.

use serde::{Deserialize, Serialize};

/// A package whose downloads count towards the aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDescriptor {
    /// Short identifier used in URLs and logs.
    pub name: String,
    /// Name as published on the registry, e.g. `@zkthings/proof-membership-evm`.
    pub registry_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
}

impl PackageDescriptor {
    pub fn new(name: &str, registry_id: &str, title: &str, subtitle: &str) -> Self {
        Self {
            name: name.to_string(),
            registry_id: registry_id.to_string(),
            title: title.to_string(),
            subtitle: subtitle.to_string(),
        }
    }

    pub fn install_command(&self) -> String {
        format!("npm i {}", self.registry_id)
    }
}

/// The packages shown on the landing page, in display order.
pub fn default_packages() -> Vec<PackageDescriptor> {
    vec![
        PackageDescriptor::new(
            "evm-membership",
            "@zkthings/proof-membership-evm",
            "EVM zkSDK",
            "Zero-Knowledge Membership Proofs",
        ),
        PackageDescriptor::new(
            "mina-membership",
            "@zkthings/proof-membership-mina",
            "Mina zkSDK",
            "Zero-Knowledge Membership Proofs",
        ),
        PackageDescriptor::new(
            "e2e-encryption",
            "@zkthings/e2e-encryption-secp256k1",
            "E2E Encryption",
            "End-to-End Encryption for secp256k1",
        ),
        PackageDescriptor::new("zkmerkle", "zkmerkle", "zkMerkle", "Merkle trees for circom"),
    ]
}

/// Look a package up by short name or registry id.
pub fn find<'a>(packages: &'a [PackageDescriptor], key: &str) -> Option<&'a PackageDescriptor> {
    packages
        .iter()
        .find(|p| p.name == key || p.registry_id == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_unique_ids() {
        let packages = default_packages();
        let mut ids: Vec<_> = packages.iter().map(|p| p.registry_id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), packages.len());
    }

    #[test]
    fn test_install_command_and_lookup() {
        let packages = default_packages();
        let evm = find(&packages, "evm-membership").unwrap();
        assert_eq!(evm.install_command(), "npm i @zkthings/proof-membership-evm");
        assert_eq!(
            find(&packages, "@zkthings/proof-membership-mina").map(|p| p.name.as_str()),
            Some("mina-membership")
        );
        assert!(find(&packages, "unknown").is_none());
    }
}
