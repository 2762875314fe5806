use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use crate::{
    config::SolanaNetwork,
    entities::milestone::{on_chain_name, MilestoneMetadata, SELLER_FEE_BASIS_POINTS},
    interfaces::ledger::{LedgerInterface, MilestoneMint},
    middleware::{
        ctx::Ctx,
        error::{AppError, CtxResult},
    },
    utils::validate_utils::deserialize_null_default,
};

pub const METADATA_PATH: &str = "/api/milestones/metadata";

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MintInput {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    #[validate(length(min = 1))]
    pub recipient_address: String,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    #[validate(length(min = 1))]
    pub project_name: String,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    #[validate(length(min = 1))]
    pub milestone: String,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub team_members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintedMilestone {
    pub nft_address: String,
    pub explorer_url: String,
    pub metadata_uri: String,
}

pub struct MilestoneService<'a> {
    ledger: &'a (dyn LedgerInterface + Send + Sync),
    metadata_store: &'a DashMap<String, MilestoneMetadata>,
    network: SolanaNetwork,
    app_url: &'a str,
    ctx: &'a Ctx,
}

impl<'a> MilestoneService<'a> {
    pub fn new(
        ledger: &'a (dyn LedgerInterface + Send + Sync),
        metadata_store: &'a DashMap<String, MilestoneMetadata>,
        network: SolanaNetwork,
        app_url: &'a str,
        ctx: &'a Ctx,
    ) -> Self {
        Self {
            ledger,
            metadata_store,
            network,
            app_url,
            ctx,
        }
    }

    pub async fn mint(&self, input: &MintInput) -> CtxResult<MintedMilestone> {
        let metadata =
            MilestoneMetadata::new(&input.project_name, &input.milestone, &input.team_members);
        let key = metadata.content_key();
        let metadata_uri = metadata_uri(self.app_url, &key);

        let asset = MilestoneMint {
            recipient: input.recipient_address.clone(),
            name: on_chain_name(&input.project_name),
            uri: metadata_uri.clone(),
            seller_fee_basis_points: SELLER_FEE_BASIS_POINTS,
        };
        let nft_address = match self.ledger.mint_milestone(&asset).await {
            Ok(nft_address) => nft_address,
            Err(err) => {
                // an unconfirmed mint may still land and point at this uri
                if !err.nothing_applied() {
                    warn!(req_id = %self.ctx.req_id(), %metadata_uri, "milestone mint unconfirmed: {err}");
                    self.metadata_store.insert(key, metadata);
                }
                return Err(self.ctx.to_ctx_error(err.into()));
            }
        };
        self.metadata_store.insert(key, metadata);

        info!(
            req_id = %self.ctx.req_id(),
            project = %input.project_name,
            milestone = %input.milestone,
            %nft_address,
            "milestone minted"
        );

        Ok(MintedMilestone {
            explorer_url: self.network.explorer_address_url(&nft_address),
            nft_address,
            metadata_uri,
        })
    }

    pub fn get_metadata(&self, key: &str) -> CtxResult<MilestoneMetadata> {
        self.metadata_store
            .get(key)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| {
                self.ctx.to_ctx_error(AppError::EntityFailIdNotFound {
                    ident: key.to_string(),
                })
            })
    }
}

pub fn metadata_uri(app_url: &str, key: &str) -> String {
    format!("{}{METADATA_PATH}/{key}", app_url.trim_end_matches('/'))
}
