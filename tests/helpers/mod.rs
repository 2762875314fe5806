pub mod fakes;
pub mod test_with_server;

use std::sync::Arc;

use axum_test::TestServer;
use consilience_server::{
    config::SolanaNetwork,
    entities::project::default_catalog,
    middleware::mw_ctx::CtxState,
};
use dashmap::DashMap;
use fake::{faker::internet::en::Username, Fake};
use fakes::{FakeAiProvider, FakeLedger, FixedClock};

#[allow(dead_code)]
pub const REWARD_MINT: &str = "CSmint1111111111111111111111111111111111111";
#[allow(dead_code)]
pub const APP_URL: &str = "http://dao.test";
/// Clock start used by every server, in epoch millis.
#[allow(dead_code)]
pub const START_MS: i64 = 1_000_000_000_000;

pub struct Fakes {
    pub ai: Arc<FakeAiProvider>,
    pub ledger: Arc<FakeLedger>,
    pub clock: Arc<FixedClock>,
}

impl Fakes {
    pub fn new() -> Self {
        Self {
            ai: Arc::new(FakeAiProvider::default()),
            ledger: Arc::new(FakeLedger::new("Operator111111111111111111111111111111111111")),
            clock: Arc::new(FixedClock::new(START_MS)),
        }
    }

    pub fn ctx_state(&self, reward_mint: Option<&str>) -> Arc<CtxState> {
        Arc::new(CtxState {
            ai_provider: self.ai.clone(),
            ledger: self.ledger.clone(),
            clock: self.clock.clone(),
            solana_network: SolanaNetwork::Devnet,
            cs_token_mint: reward_mint.map(str::to_string),
            app_url: APP_URL.to_string(),
            projects: default_catalog(),
            consumed_check_ins: Arc::new(DashMap::new()),
            milestone_metadata: Arc::new(DashMap::new()),
        })
    }
}

pub fn create_test_server(ctx_state: &Arc<CtxState>) -> TestServer {
    let routes_all = consilience_server::init::main_router(ctx_state);
    TestServer::new(routes_all).expect("Failed to create test server")
}

#[allow(dead_code)]
pub fn fake_alias() -> String {
    Username().fake::<String>()
}
