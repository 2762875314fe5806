use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use consilience_server::{
    entities::chat::ChatMessage,
    interfaces::{
        ai_provider::{AiProviderInterface, ResponseFormat},
        clock::ClockInterface,
        ledger::{LedgerError, LedgerInterface, MilestoneMint, RewardTransfer},
    },
};

/// Replays queued completions in order and records every request.
#[derive(Default)]
pub struct FakeAiProvider {
    replies: Mutex<VecDeque<Result<String, String>>>,
    pub requests: Mutex<Vec<(Vec<ChatMessage>, ResponseFormat)>>,
}

#[allow(dead_code)]
impl FakeAiProvider {
    pub fn push_reply(&self, content: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Ok(content.into()));
    }

    pub fn push_failure(&self, message: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<(Vec<ChatMessage>, ResponseFormat)> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl AiProviderInterface for FakeAiProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        response_format: ResponseFormat,
    ) -> Result<String, String> {
        self.requests
            .lock()
            .unwrap()
            .push((messages, response_format));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err("no completion queued".to_string()))
    }
}

pub struct FakeLedger {
    operator: String,
    operator_missing: AtomicBool,
    next_failure: Mutex<Option<LedgerError>>,
    reward_delay: Mutex<Option<Duration>>,
    counter: AtomicUsize,
    pub reward_calls: Mutex<Vec<(String, Vec<RewardTransfer>)>>,
    pub milestone_calls: Mutex<Vec<MilestoneMint>>,
}

#[allow(dead_code)]
impl FakeLedger {
    pub fn new(operator: &str) -> Self {
        Self {
            operator: operator.to_string(),
            operator_missing: AtomicBool::new(false),
            next_failure: Mutex::new(None),
            reward_delay: Mutex::new(None),
            counter: AtomicUsize::new(0),
            reward_calls: Mutex::new(vec![]),
            milestone_calls: Mutex::new(vec![]),
        }
    }

    pub fn operator(&self) -> &str {
        &self.operator
    }

    /// The next mint is refused before anything is sent.
    pub fn fail_next(&self) {
        self.fail_next_with(LedgerError::Rejected("blockhash not found".to_string()));
    }

    /// The next mint is sent but its confirmation never arrives.
    pub fn lose_next_confirmation(&self) {
        self.fail_next_with(LedgerError::Unconfirmed {
            signature: "5xLostSig".to_string(),
            source: "confirmation timed out".to_string(),
        });
    }

    pub fn fail_next_with(&self, err: LedgerError) {
        *self.next_failure.lock().unwrap() = Some(err);
    }

    pub fn remove_operator_key(&self) {
        self.operator_missing.store(true, Ordering::SeqCst);
    }

    /// Holds every reward mint for `delay` before it completes.
    pub fn delay_rewards(&self, delay: Duration) {
        *self.reward_delay.lock().unwrap() = Some(delay);
    }

    pub fn reward_call_count(&self) -> usize {
        self.reward_calls.lock().unwrap().len()
    }

    fn take_failure(&self) -> Option<LedgerError> {
        self.next_failure.lock().unwrap().take()
    }
}

#[async_trait]
impl LedgerInterface for FakeLedger {
    fn operator_address(&self) -> Result<String, LedgerError> {
        if self.operator_missing.load(Ordering::SeqCst) {
            return Err(LedgerError::NotConfigured("SOLANA_PRIVATE_KEY".to_string()));
        }
        Ok(self.operator.clone())
    }

    async fn mint_rewards(
        &self,
        mint: &str,
        transfers: &[RewardTransfer],
    ) -> Result<Vec<String>, LedgerError> {
        self.reward_calls
            .lock()
            .unwrap()
            .push((mint.to_string(), transfers.to_vec()));
        let delay = *self.reward_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        Ok((0..transfers.len())
            .map(|i| format!("sig-{n}-{i}"))
            .collect())
    }

    async fn mint_milestone(&self, asset: &MilestoneMint) -> Result<String, LedgerError> {
        self.milestone_calls.lock().unwrap().push(asset.clone());
        if let Some(err) = self.take_failure() {
            return Err(match err {
                LedgerError::Rejected(_) => {
                    LedgerError::Rejected("insufficient lamports".to_string())
                }
                other => other,
            });
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        Ok(format!("Nft{n}"))
    }

    async fn create_reward_mint(&self, _decimals: u8) -> Result<String, LedgerError> {
        Ok("Mint".to_string())
    }

    async fn operator_balance(&self) -> Result<u64, LedgerError> {
        Ok(1)
    }
}

pub struct FixedClock(AtomicI64);

#[allow(dead_code)]
impl FixedClock {
    pub fn new(now_ms: i64) -> Self {
        Self(AtomicI64::new(now_ms))
    }

    pub fn set(&self, now_ms: i64) {
        self.0.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, ms: i64) {
        self.0.fetch_add(ms, Ordering::SeqCst);
    }
}

impl ClockInterface for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}
