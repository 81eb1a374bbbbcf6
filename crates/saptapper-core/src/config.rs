//! Rip configuration.

use std::path::PathBuf;

use crate::scan::SignatureSet;

/// Default `gsfby` credit.
pub const DEFAULT_CREDIT: &str = "Saptapper";

/// Configuration for a [`Ripper`](crate::Ripper)
#[derive(Debug, Clone)]
pub struct RipConfig {
    /// Directory under which `<name>/` is created; `None` places it beside the ROM
    pub output_root: Option<PathBuf>,
    /// Value of the `gsfby` tag
    pub credit: String,
    /// Engine signatures to scan for
    pub signatures: SignatureSet,
}

impl Default for RipConfig {
    fn default() -> Self {
        Self {
            output_root: None,
            credit: DEFAULT_CREDIT.to_string(),
            signatures: SignatureSet::default(),
        }
    }
}

impl RipConfig {
    /// Create a new configuration builder
    pub fn builder() -> RipConfigBuilder {
        RipConfigBuilder::default()
    }
}

/// Builder for RipConfig
#[derive(Debug, Clone, Default)]
pub struct RipConfigBuilder {
    output_root: Option<PathBuf>,
    credit: Option<String>,
    signatures: Option<SignatureSet>,
}

impl RipConfigBuilder {
    /// Set the output root directory
    pub fn output_root<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output_root = Some(path.into());
        self
    }

    /// Set the `gsfby` credit
    pub fn credit<S: Into<String>>(mut self, credit: S) -> Self {
        self.credit = Some(credit.into());
        self
    }

    /// Replace the built-in signature set
    pub fn signatures(mut self, signatures: SignatureSet) -> Self {
        self.signatures = Some(signatures);
        self
    }

    /// Build the configuration
    pub fn build(self) -> RipConfig {
        let default = RipConfig::default();
        RipConfig {
            output_root: self.output_root.or(default.output_root),
            credit: self.credit.unwrap_or(default.credit),
            signatures: self.signatures.unwrap_or(default.signatures),
        }
    }
}
