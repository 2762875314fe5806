use crate::config::{AppConfig, SolanaNetwork};
use crate::entities::milestone::MilestoneMetadata;
use crate::entities::project::{default_catalog, Project};
use crate::interfaces::ai_provider::AiProviderInterface;
use crate::interfaces::clock::{ClockInterface, SystemClock};
use crate::interfaces::ledger::LedgerInterface;
use crate::utils::openai::OpenAiClient;
use crate::utils::solana::SolanaLedger;
use dashmap::DashMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

pub struct CtxState {
    pub ai_provider: Arc<dyn AiProviderInterface + Send + Sync>,
    pub ledger: Arc<dyn LedgerInterface + Send + Sync>,
    pub clock: Arc<dyn ClockInterface + Send + Sync>,
    pub solana_network: SolanaNetwork,
    pub cs_token_mint: Option<String>,
    pub app_url: String,
    pub projects: Vec<Project>,
    /// Redeemed check-in tokens mapped to the time their freshness window closes.
    pub consumed_check_ins: Arc<DashMap<String, i64>>,
    pub milestone_metadata: Arc<DashMap<String, MilestoneMetadata>>,
}

impl Debug for CtxState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CtxState")
            .field("solana_network", &self.solana_network)
            .field("cs_token_mint", &self.cs_token_mint)
            .field("app_url", &self.app_url)
            .finish_non_exhaustive()
    }
}

pub fn create_ctx_state(config: &AppConfig) -> Arc<CtxState> {
    let ctx_state = CtxState {
        ai_provider: Arc::new(OpenAiClient::new(
            &config.openai_api_url,
            &config.openai_model,
            config.openai_api_key.clone(),
        )),
        ledger: Arc::new(SolanaLedger::new(
            &config.solana_rpc_url,
            config.solana_private_key.as_deref(),
        )),
        clock: Arc::new(SystemClock),
        solana_network: config.solana_network,
        cs_token_mint: config.cs_token_mint.clone(),
        app_url: config.app_url.clone(),
        projects: default_catalog(),
        consumed_check_ins: Arc::new(DashMap::new()),
        milestone_metadata: Arc::new(DashMap::new()),
    };
    Arc::new(ctx_state)
}
