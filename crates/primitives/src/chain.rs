use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Chain identifier of the Bitcoin mainnet settlement chain.
pub const MAINNET_CHAIN_ID: &str = "bitcoin|0";
/// Chain identifier of the Bitcoin testnet settlement chain.
pub const TESTNET_CHAIN_ID: &str = "bitcoin|4";

const EVM_PREFIX: &str = "evm|";

/// Family part of a `family|network-id` chain identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainFamily {
    /// Bitcoin and its test networks
    Bitcoin,
    /// EVM compatible chains, keyed by EIP-155 chain id
    Evm,
    /// Solana clusters
    Solana,
}

impl ChainFamily {
    /// Lowercase identifier used in chain strings.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bitcoin => "bitcoin",
            Self::Evm => "evm",
            Self::Solana => "solana",
        }
    }
}

impl FromStr for ChainFamily {
    type Err = ChainParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bitcoin" => Ok(Self::Bitcoin),
            "evm" => Ok(Self::Evm),
            "solana" => Ok(Self::Solana),
            other => Err(ChainParseError::UnknownFamily(other.to_owned())),
        }
    }
}

/// Reasons a chain identifier cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainParseError {
    /// The identifier has no `|` separator
    #[error("chain identifier `{0}` is not of the form family|network-id")]
    Malformed(String),
    /// The family part is not one we know
    #[error("unknown chain family `{0}`")]
    UnknownFamily(String),
    /// The network part is not numeric
    #[error("invalid network id `{0}`")]
    InvalidNetworkId(String),
}

/// Decoded `family|network-id` chain identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainInfo {
    /// Chain family
    pub family: ChainFamily,
    /// Numeric network id within the family
    pub network_id: u64,
}

impl ChainInfo {
    /// Human readable chain name.
    pub fn display_name(&self) -> String {
        let known = match (self.family, self.network_id) {
            (ChainFamily::Bitcoin, 0) => Some("Bitcoin"),
            (ChainFamily::Bitcoin, 4) => Some("Bitcoin Testnet4"),
            (ChainFamily::Evm, 1) => Some("Ethereum"),
            (ChainFamily::Evm, 11155111) => Some("Ethereum Sepolia"),
            (ChainFamily::Evm, 17000) => Some("Ethereum Holesky"),
            (ChainFamily::Evm, 56) => Some("BNB Smart Chain"),
            (ChainFamily::Evm, 97) => Some("BNB Smart Chain Testnet"),
            (ChainFamily::Evm, 8453) => Some("Base"),
            (ChainFamily::Evm, 84532) => Some("Base Sepolia"),
            _ => None,
        };
        known.map_or_else(
            || {
                let family = match self.family {
                    ChainFamily::Bitcoin => "Bitcoin",
                    ChainFamily::Evm => "EVM",
                    ChainFamily::Solana => "Solana",
                };
                format!("{family} {}", self.network_id)
            },
            ToOwned::to_owned,
        )
    }
}

impl FromStr for ChainInfo {
    type Err = ChainParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (family, network) =
            s.split_once('|').ok_or_else(|| ChainParseError::Malformed(s.to_owned()))?;
        let family = family.parse()?;
        let network_id = network
            .parse()
            .map_err(|_| ChainParseError::InvalidNetworkId(network.to_owned()))?;
        Ok(Self { family, network_id })
    }
}

impl fmt::Display for ChainInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.family.as_str(), self.network_id)
    }
}

/// Display name for a raw chain identifier, falling back to the identifier
/// itself when it cannot be decoded.
pub fn display_name(raw: &str) -> String {
    raw.parse::<ChainInfo>().map_or_else(|_| raw.to_owned(), |info| info.display_name())
}

/// Prefix bare EVM chain ids with the `evm|` family.
pub fn with_family_prefix(raw: &str) -> String {
    if raw.contains('|') { raw.to_owned() } else { format!("{EVM_PREFIX}{raw}") }
}

/// Cross-chain transaction category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Settlement chain to another chain
    Bridge,
    /// Between two non-settlement chains
    Transfer,
    /// Back to the settlement chain
    Redeem,
}

impl Category {
    /// Derive the category of a transfer from its endpoints.
    ///
    /// A destination on the settlement chain wins over a source on it, so a
    /// settlement-to-settlement move is a redeem.
    pub fn classify(source_chain: &str, destination_chain: &str, settlement_chain: &str) -> Self {
        if destination_chain == settlement_chain {
            Self::Redeem
        } else if source_chain == settlement_chain {
            Self::Bridge
        } else {
            Self::Transfer
        }
    }

    /// Lowercase name used on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bridge => "bridge",
            Self::Transfer => "transfer",
            Self::Redeem => "redeem",
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bridge" => Ok(Self::Bridge),
            "transfer" => Ok(Self::Transfer),
            "redeem" => Ok(Self::Redeem),
            other => Err(format!("unknown category `{other}`")),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How value entered the cross-chain flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransferType {
    /// A contract call emitting a token-sent event
    SendToken,
    /// A deposit into a vault address
    DepositAddress,
}

/// Settlement status of a cross-chain transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Not yet executed on the destination chain
    Pending,
    /// Executed on the destination chain
    Success,
}

impl Status {
    /// Status implied by an originating and an execution transaction hash.
    pub const fn from_hashes(tx_hash: &str, executed_tx_hash: &str) -> Self {
        if !tx_hash.is_empty() && !executed_tx_hash.is_empty() {
            Self::Success
        } else {
            Self::Pending
        }
    }

    /// Lowercase name used on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SETTLEMENT: &str = "bitcoin|4";

    #[test]
    fn parses_chain_identifiers() {
        let info: ChainInfo = "evm|11155111".parse().unwrap();
        assert_eq!(info, ChainInfo { family: ChainFamily::Evm, network_id: 11155111 });
        assert_eq!(info.to_string(), "evm|11155111");

        assert_eq!(
            "bitcoin".parse::<ChainInfo>(),
            Err(ChainParseError::Malformed("bitcoin".to_owned()))
        );
        assert_eq!(
            "cosmos|1".parse::<ChainInfo>(),
            Err(ChainParseError::UnknownFamily("cosmos".to_owned()))
        );
        assert_eq!(
            "evm|sepolia".parse::<ChainInfo>(),
            Err(ChainParseError::InvalidNetworkId("sepolia".to_owned()))
        );
    }

    #[test]
    fn display_name_falls_back_to_raw_identifier() {
        assert_eq!(display_name("bitcoin|0"), "Bitcoin");
        assert_eq!(display_name("evm|11155111"), "Ethereum Sepolia");
        assert_eq!(display_name("evm|42161"), "EVM 42161");
        assert_eq!(display_name("not-a-chain"), "not-a-chain");
        assert_eq!(display_name(""), "");
    }

    #[test]
    fn family_prefix_only_added_to_bare_ids() {
        assert_eq!(with_family_prefix("11155111"), "evm|11155111");
        assert_eq!(with_family_prefix("bitcoin|4"), "bitcoin|4");
    }

    #[test]
    fn classify_is_exhaustive_and_exclusive() {
        assert_eq!(Category::classify("evm|1", SETTLEMENT, SETTLEMENT), Category::Redeem);
        assert_eq!(Category::classify(SETTLEMENT, "evm|1", SETTLEMENT), Category::Bridge);
        assert_eq!(Category::classify("evm|1", "evm|56", SETTLEMENT), Category::Transfer);
        assert_eq!(Category::classify(SETTLEMENT, SETTLEMENT, SETTLEMENT), Category::Redeem);
    }

    #[test]
    fn classify_depends_only_on_chain_identifiers() {
        let chains = ["bitcoin|0", "bitcoin|4", "evm|1", "evm|56", ""];
        for source in chains {
            for destination in chains {
                let category = Category::classify(source, destination, SETTLEMENT);
                let expected = if destination == SETTLEMENT {
                    Category::Redeem
                } else if source == SETTLEMENT {
                    Category::Bridge
                } else {
                    Category::Transfer
                };
                assert_eq!(category, expected, "{source} -> {destination}");
            }
        }
    }

    #[test]
    fn category_round_trips_through_strings() {
        for category in [Category::Bridge, Category::Transfer, Category::Redeem] {
            assert_eq!(category.to_string().parse::<Category>(), Ok(category));
        }
        assert!("swap".parse::<Category>().is_err());
        assert_eq!(serde_json::to_string(&Category::Redeem).unwrap(), "\"redeem\"");
    }

    #[test]
    fn status_requires_both_hashes() {
        assert_eq!(Status::from_hashes("0xaa", "0xbb"), Status::Success);
        assert_eq!(Status::from_hashes("0xaa", ""), Status::Pending);
        assert_eq!(Status::from_hashes("", "0xbb"), Status::Pending);
        assert_eq!(Status::from_hashes("", ""), Status::Pending);
    }

    #[test]
    fn transfer_type_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&TransferType::DepositAddress).unwrap(),
            "\"deposit_address\""
        );
    }
}
