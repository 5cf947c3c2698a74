//! Error types for topology generation, allocation and persistence.

use thiserror::Error;

/// Failure reported by an external collaborator (provisioning or persistence).
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ProviderError {
    pub message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        ProviderError {
            message: message.into(),
        }
    }
}

/// Crate error.
#[derive(Error, Debug)]
pub enum TopologyError {
    /// Bad generator bounds. Raised before anything is generated.
    #[error("Configuration error in {bound}: {message}")]
    Configuration { bound: String, message: String },

    /// Child block derivation or block construction out of range.
    #[error("Invalid address range for {block}: {message}")]
    InvalidAddressRange { block: String, message: String },

    /// A provisioning call failed. Indexes locate the failing unit.
    #[error(
        "Provisioning {operation} failed (network #{network_index}, subnet {}, batch {}): {source}",
        fmt_index(.subnet_index),
        fmt_index(.batch_index)
    )]
    Provisioning {
        network_index: usize,
        subnet_index: Option<usize>,
        batch_index: Option<usize>,
        operation: &'static str,
        #[source]
        source: ProviderError,
    },

    #[error("Persistence error: {0}")]
    Persistence(#[source] ProviderError),
}

fn fmt_index(index: &Option<usize>) -> String {
    index.map_or_else(|| "-".to_string(), |i| format!("#{i}"))
}

impl TopologyError {
    pub fn configuration(bound: impl Into<String>, message: impl Into<String>) -> Self {
        TopologyError::Configuration {
            bound: bound.into(),
            message: message.into(),
        }
    }

    pub fn address_range(block: impl ToString, message: impl Into<String>) -> Self {
        TopologyError::InvalidAddressRange {
            block: block.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TopologyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provisioning_message_has_context() {
        let err = TopologyError::Provisioning {
            network_index: 2,
            subnet_index: Some(1),
            batch_index: Some(4),
            operation: "create_allocation",
            source: ProviderError::new("throttled"),
        };
        assert_eq!(
            err.to_string(),
            "Provisioning create_allocation failed (network #2, subnet #1, batch #4): throttled"
        );
    }

    #[test]
    fn test_provisioning_message_without_subnet() {
        let err = TopologyError::Provisioning {
            network_index: 0,
            subnet_index: None,
            batch_index: None,
            operation: "create_network",
            source: ProviderError::new("quota exceeded"),
        };
        assert_eq!(
            err.to_string(),
            "Provisioning create_network failed (network #0, subnet -, batch -): quota exceeded"
        );
    }

    #[test]
    fn test_configuration_names_bound() {
        let err = TopologyError::configuration("VPC_MAX", "must be >= VPC_MIN");
        assert!(err.to_string().contains("VPC_MAX"));
    }
}
