use std::fmt;

use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardTransfer {
    pub recipient: String,
    /// Whole reward units, before decimal scaling.
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MilestoneMint {
    pub recipient: String,
    pub name: String,
    pub uri: String,
    pub seller_fee_basis_points: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A required ledger setting is absent, holds the setting name.
    NotConfigured(String),
    /// The operation was refused or failed before anything could take effect.
    Rejected(String),
    /// The operation was broadcast but its outcome is unknown. It may still land.
    Unconfirmed { signature: String, source: String },
}

impl LedgerError {
    /// True when the ledger state is guaranteed to be unchanged.
    pub fn nothing_applied(&self) -> bool {
        !matches!(self, LedgerError::Unconfirmed { .. })
    }
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::NotConfigured(setting) => write!(f, "{setting} not configured"),
            LedgerError::Rejected(source) => write!(f, "{source}"),
            LedgerError::Unconfirmed { signature, source } => {
                write!(f, "transaction {signature} unconfirmed: {source}")
            }
        }
    }
}

impl std::error::Error for LedgerError {}

#[async_trait]
pub trait LedgerInterface {
    /// Address of the signing identity used for every ledger operation.
    fn operator_address(&self) -> Result<String, LedgerError>;

    /// Mints all transfers of `mint` as a single all-or-nothing operation and returns
    /// one confirmation id per transfer, in order.
    async fn mint_rewards(
        &self,
        mint: &str,
        transfers: &[RewardTransfer],
    ) -> Result<Vec<String>, LedgerError>;

    /// Creates a non-fungible asset owned by `asset.recipient`, returns its address.
    async fn mint_milestone(&self, asset: &MilestoneMint) -> Result<String, LedgerError>;

    /// Creates a fungible mint with the operator as authority, returns its address.
    async fn create_reward_mint(&self, decimals: u8) -> Result<String, LedgerError>;

    /// Native balance of the operator in the ledger's smallest unit.
    async fn operator_balance(&self) -> Result<u64, LedgerError>;
}
