pub mod rpc;

use std::str::FromStr;

use async_trait::async_trait;
use mpl_token_metadata::{
    accounts::{MasterEdition, Metadata},
    instructions::{CreateMasterEditionV3Builder, CreateMetadataAccountV3Builder},
    types::{Creator, DataV2},
    MAX_NAME_LENGTH, MAX_URI_LENGTH,
};
use solana_sdk::{
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    system_instruction,
};
use spl_associated_token_account::{
    get_associated_token_address, instruction::create_associated_token_account_idempotent,
};
use spl_token::{solana_program::program_pack::Pack, state::Mint};
use tracing::info;

use crate::interfaces::ledger::{LedgerError, LedgerInterface, MilestoneMint, RewardTransfer};
use rpc::SolanaRpc;

/// Decimals of the reward token mint.
pub const REWARD_TOKEN_DECIMALS: u8 = 9;

pub const PRIVATE_KEY_SETTING: &str = "SOLANA_PRIVATE_KEY";

/// Ledger collaborator backed by a Solana cluster. Every operation is signed by the
/// operator keypair.
pub struct SolanaLedger {
    rpc: SolanaRpc,
    payer: Result<Keypair, LedgerError>,
}

impl SolanaLedger {
    pub fn new(rpc_url: &str, private_key: Option<&str>) -> Self {
        let payer = match private_key {
            Some(secret) => decode_keypair(secret).map_err(|e| {
                LedgerError::Rejected(format!("{PRIVATE_KEY_SETTING} is malformed: {e}"))
            }),
            None => Err(LedgerError::NotConfigured(PRIVATE_KEY_SETTING.to_string())),
        };
        Self {
            rpc: SolanaRpc::new(rpc_url),
            payer,
        }
    }

    fn payer(&self) -> Result<&Keypair, LedgerError> {
        self.payer.as_ref().map_err(|e| e.clone())
    }

    async fn new_mint_account(
        &self,
        payer: &Pubkey,
        mint: &Pubkey,
    ) -> Result<Instruction, LedgerError> {
        let rent = self
            .rpc
            .get_minimum_balance_for_rent_exemption(Mint::LEN)
            .await?;
        Ok(system_instruction::create_account(
            payer,
            mint,
            rent,
            Mint::LEN as u64,
            &spl_token::id(),
        ))
    }
}

/// Accepts a base58 encoded 64-byte secret or the JSON byte array of a keypair file.
pub fn decode_keypair(secret: &str) -> Result<Keypair, String> {
    let secret = secret.trim();
    let bytes = if secret.starts_with('[') {
        serde_json::from_str::<Vec<u8>>(secret).map_err(|e| format!("invalid keypair bytes: {e}"))?
    } else {
        bs58::decode(secret)
            .into_vec()
            .map_err(|e| format!("invalid base58 keypair: {e}"))?
    };
    Keypair::from_bytes(&bytes).map_err(|e| format!("invalid keypair: {e}"))
}

pub fn parse_pubkey(address: &str) -> Result<Pubkey, LedgerError> {
    Pubkey::from_str(address.trim())
        .map_err(|e| LedgerError::Rejected(format!("invalid address {address}: {e}")))
}

pub fn to_base_units(amount: u64, decimals: u8) -> Result<u64, LedgerError> {
    10u64
        .checked_pow(decimals as u32)
        .and_then(|scale| amount.checked_mul(scale))
        .ok_or_else(|| {
            LedgerError::Rejected(format!("amount {amount} overflows at {decimals} decimals"))
        })
}

fn program_error(context: &str, err: impl std::fmt::Display) -> LedgerError {
    LedgerError::Rejected(format!("{context}: {err}"))
}

/// Associated account creation plus `mint_to` for every transfer, for one transaction.
pub fn reward_instructions(
    payer: &Pubkey,
    mint: &Pubkey,
    transfers: &[RewardTransfer],
) -> Result<Vec<Instruction>, LedgerError> {
    let mut ixs = Vec::with_capacity(transfers.len() * 2);
    for transfer in transfers {
        let owner = parse_pubkey(&transfer.recipient)?;
        let amount = to_base_units(transfer.amount, REWARD_TOKEN_DECIMALS)?;
        ixs.push(create_associated_token_account_idempotent(
            payer,
            &owner,
            mint,
            &spl_token::id(),
        ));
        ixs.push(
            spl_token::instruction::mint_to(
                &spl_token::id(),
                mint,
                &get_associated_token_address(&owner, mint),
                payer,
                &[],
                amount,
            )
            .map_err(|e| program_error("mint_to", e))?,
        );
    }
    Ok(ixs)
}

/// Initializes `mint` as a zero-decimal mint, issues the single unit to `owner` and
/// attaches metadata plus a master edition capped at one copy.
pub fn milestone_instructions(
    payer: &Pubkey,
    mint: &Pubkey,
    owner: &Pubkey,
    asset: &MilestoneMint,
) -> Result<Vec<Instruction>, LedgerError> {
    if asset.name.len() > MAX_NAME_LENGTH {
        return Err(LedgerError::Rejected(format!(
            "metadata name longer than {MAX_NAME_LENGTH} bytes"
        )));
    }
    if asset.uri.len() > MAX_URI_LENGTH {
        return Err(LedgerError::Rejected(format!(
            "metadata uri longer than {MAX_URI_LENGTH} bytes"
        )));
    }

    let (metadata, _) = Metadata::find_pda(mint);
    let (master_edition, _) = MasterEdition::find_pda(mint);
    let data = DataV2 {
        name: asset.name.clone(),
        symbol: String::new(),
        uri: asset.uri.clone(),
        seller_fee_basis_points: asset.seller_fee_basis_points,
        creators: Some(vec![Creator {
            address: *payer,
            verified: true,
            share: 100,
        }]),
        collection: None,
        uses: None,
    };

    Ok(vec![
        spl_token::instruction::initialize_mint2(&spl_token::id(), mint, payer, Some(payer), 0)
            .map_err(|e| program_error("initialize_mint2", e))?,
        create_associated_token_account_idempotent(payer, owner, mint, &spl_token::id()),
        spl_token::instruction::mint_to(
            &spl_token::id(),
            mint,
            &get_associated_token_address(owner, mint),
            payer,
            &[],
            1,
        )
        .map_err(|e| program_error("mint_to", e))?,
        CreateMetadataAccountV3Builder::new()
            .metadata(metadata)
            .mint(*mint)
            .mint_authority(*payer)
            .payer(*payer)
            .update_authority(*payer, true)
            .data(data)
            .is_mutable(true)
            .instruction(),
        CreateMasterEditionV3Builder::new()
            .edition(master_edition)
            .mint(*mint)
            .update_authority(*payer)
            .mint_authority(*payer)
            .payer(*payer)
            .metadata(metadata)
            .max_supply(0)
            .instruction(),
    ])
}

#[async_trait]
impl LedgerInterface for SolanaLedger {
    fn operator_address(&self) -> Result<String, LedgerError> {
        Ok(self.payer()?.pubkey().to_string())
    }

    async fn mint_rewards(
        &self,
        mint: &str,
        transfers: &[RewardTransfer],
    ) -> Result<Vec<String>, LedgerError> {
        let payer = self.payer()?;
        let mint = parse_pubkey(mint)?;
        let ixs = reward_instructions(&payer.pubkey(), &mint, transfers)?;

        // one transaction: every transfer lands or none does
        let signature = self.rpc.sign_and_send(&ixs, vec![payer]).await?;
        info!(%signature, %mint, transfers = transfers.len(), "reward mint confirmed");
        Ok(vec![signature.to_string(); transfers.len()])
    }

    async fn mint_milestone(&self, asset: &MilestoneMint) -> Result<String, LedgerError> {
        let payer = self.payer()?;
        let owner = parse_pubkey(&asset.recipient)?;
        let mint = Keypair::new();

        let mut ixs = vec![self.new_mint_account(&payer.pubkey(), &mint.pubkey()).await?];
        ixs.extend(milestone_instructions(
            &payer.pubkey(),
            &mint.pubkey(),
            &owner,
            asset,
        )?);

        let signature = self.rpc.sign_and_send(&ixs, vec![payer, &mint]).await?;
        info!(%signature, nft = %mint.pubkey(), "milestone mint confirmed");
        Ok(mint.pubkey().to_string())
    }

    async fn create_reward_mint(&self, decimals: u8) -> Result<String, LedgerError> {
        let payer = self.payer()?;
        let mint = Keypair::new();

        let ixs = vec![
            self.new_mint_account(&payer.pubkey(), &mint.pubkey()).await?,
            spl_token::instruction::initialize_mint2(
                &spl_token::id(),
                &mint.pubkey(),
                &payer.pubkey(),
                Some(&payer.pubkey()),
                decimals,
            )
            .map_err(|e| program_error("initialize_mint2", e))?,
        ];

        self.rpc.sign_and_send(&ixs, vec![payer, &mint]).await?;
        Ok(mint.pubkey().to_string())
    }

    async fn operator_balance(&self) -> Result<u64, LedgerError> {
        let payer = self.payer()?;
        self.rpc.get_balance(&payer.pubkey()).await
    }
}

#[cfg(test)]
mod tests {
    use super::rpc::test_support::*;
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn encoded(keypair: &Keypair) -> String {
        bs58::encode(keypair.to_bytes()).into_string()
    }

    fn milestone(recipient: &Pubkey) -> MilestoneMint {
        MilestoneMint {
            recipient: recipient.to_string(),
            name: "Space Apps DAO Milestone".to_string(),
            uri: "http://dao.test/api/milestones/metadata/abc".to_string(),
            seller_fee_basis_points: 500,
        }
    }

    #[test]
    fn decodes_base58_and_json_secrets() {
        let keypair = Keypair::new();
        let from_b58 = decode_keypair(&encoded(&keypair)).unwrap();
        assert_eq!(from_b58.pubkey(), keypair.pubkey());

        let json_bytes = serde_json::to_string(&keypair.to_bytes().to_vec()).unwrap();
        let from_json = decode_keypair(&json_bytes).unwrap();
        assert_eq!(from_json.pubkey(), keypair.pubkey());

        assert!(decode_keypair("not-base58-0OIl").is_err());
    }

    #[test]
    fn operator_address_requires_key() {
        let ledger = SolanaLedger::new("http://localhost:8899", None);
        assert_eq!(
            ledger.operator_address().unwrap_err(),
            LedgerError::NotConfigured("SOLANA_PRIVATE_KEY".to_string())
        );

        let ledger = SolanaLedger::new("http://localhost:8899", Some("[1,2,3]"));
        assert!(matches!(
            ledger.operator_address().unwrap_err(),
            LedgerError::Rejected(_)
        ));

        let keypair = Keypair::new();
        let ledger = SolanaLedger::new("http://localhost:8899", Some(&encoded(&keypair)));
        assert_eq!(ledger.operator_address().unwrap(), keypair.pubkey().to_string());
    }

    #[test]
    fn scales_whole_units() {
        assert_eq!(to_base_units(4, 9).unwrap(), 4_000_000_000);
        assert_eq!(to_base_units(1, 0).unwrap(), 1);
        assert!(to_base_units(u64::MAX, 9).is_err());
    }

    #[test]
    fn reward_instructions_target_associated_accounts() {
        let payer = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let participant = Pubkey::new_unique();
        let transfers = [
            RewardTransfer {
                recipient: participant.to_string(),
                amount: 4,
            },
            RewardTransfer {
                recipient: payer.to_string(),
                amount: 1,
            },
        ];

        let ixs = reward_instructions(&payer, &mint, &transfers).unwrap();
        assert_eq!(ixs.len(), 4);
        assert_eq!(ixs[0].program_id, spl_associated_token_account::id());
        assert_eq!(ixs[1].program_id, spl_token::id());
        assert_eq!(
            ixs[1].accounts[1].pubkey,
            get_associated_token_address(&participant, &mint)
        );
        assert_eq!(
            ixs[3].accounts[1].pubkey,
            get_associated_token_address(&payer, &mint)
        );
    }

    #[test]
    fn milestone_instructions_use_metadata_accounts() {
        let payer = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let owner = Pubkey::new_unique();

        let ixs = milestone_instructions(&payer, &mint, &owner, &milestone(&owner)).unwrap();
        assert_eq!(ixs.len(), 5);
        assert_eq!(ixs[3].program_id, mpl_token_metadata::ID);
        assert_eq!(ixs[3].accounts[0].pubkey, Metadata::find_pda(&mint).0);
        assert_eq!(ixs[4].program_id, mpl_token_metadata::ID);
        assert_eq!(ixs[4].accounts[0].pubkey, MasterEdition::find_pda(&mint).0);
    }

    #[test]
    fn oversized_metadata_is_rejected() {
        let owner = Pubkey::new_unique();
        let mut asset = milestone(&owner);
        asset.uri = format!("http://dao.test/{}", "a".repeat(MAX_URI_LENGTH));

        let err = milestone_instructions(&Pubkey::new_unique(), &Pubkey::new_unique(), &owner, &asset)
            .unwrap_err();
        assert!(err.nothing_applied());
        assert!(err.to_string().contains("uri"), "{err}");
    }

    #[tokio::test]
    async fn rewards_share_one_transaction() {
        let server = MockServer::start().await;
        mock_blockhash(&server).await;
        mock_accept(&server).await;
        mock_confirmed(&server).await;

        let keypair = Keypair::new();
        let ledger = SolanaLedger::new(&server.uri(), Some(&encoded(&keypair)));
        let mint = Pubkey::new_unique().to_string();
        let transfers = [
            RewardTransfer {
                recipient: Pubkey::new_unique().to_string(),
                amount: 4,
            },
            RewardTransfer {
                recipient: keypair.pubkey().to_string(),
                amount: 1,
            },
        ];

        let signatures = ledger.mint_rewards(&mint, &transfers).await.unwrap();
        assert_eq!(signatures.len(), 2);
        assert_eq!(signatures[0], signatures[1]);
        assert_eq!(count_calls(&server, "sendTransaction").await, 1);
    }

    #[tokio::test]
    async fn lost_confirmation_leaves_rewards_unconfirmed() {
        let server = MockServer::start().await;
        mock_blockhash(&server).await;
        mock_accept(&server).await;
        mock_error(&server, "getSignatureStatuses", -32005, "Node is unhealthy").await;

        let keypair = Keypair::new();
        let ledger = SolanaLedger::new(&server.uri(), Some(&encoded(&keypair)));
        let err = ledger
            .mint_rewards(
                &Pubkey::new_unique().to_string(),
                &[RewardTransfer {
                    recipient: Pubkey::new_unique().to_string(),
                    amount: 4,
                }],
            )
            .await
            .unwrap_err();
        assert!(!err.nothing_applied(), "{err}");
    }

    #[tokio::test]
    async fn invalid_recipient_fails_before_rpc() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let ledger = SolanaLedger::new(&server.uri(), Some(&encoded(&Keypair::new())));
        let err = ledger
            .mint_rewards(
                &Pubkey::new_unique().to_string(),
                &[RewardTransfer {
                    recipient: "0x1a2b".to_string(),
                    amount: 4,
                }],
            )
            .await
            .unwrap_err();
        assert!(err.nothing_applied());
        assert!(err.to_string().contains("invalid address"), "{err}");
    }
}
