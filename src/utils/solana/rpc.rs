use std::time::{Duration, Instant};

use solana_client::{
    client_error::{ClientError, ClientErrorKind},
    nonblocking::rpc_client::RpcClient,
    rpc_request::RpcError,
};
use solana_sdk::{
    commitment_config::CommitmentConfig,
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::Transaction,
};
use tracing::{debug, warn};

use crate::interfaces::ledger::LedgerError;

const CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(60);
const CONFIRMATION_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Cluster access at `confirmed` commitment.
pub struct SolanaRpc {
    client: RpcClient,
}

impl SolanaRpc {
    pub fn new(rpc_url: &str) -> Self {
        Self {
            client: RpcClient::new_with_commitment(
                rpc_url.to_string(),
                CommitmentConfig::confirmed(),
            ),
        }
    }

    pub async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64, LedgerError> {
        self.client
            .get_balance(pubkey)
            .await
            .map_err(|e| LedgerError::Rejected(format!("getBalance failed: {e}")))
    }

    pub async fn get_minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> Result<u64, LedgerError> {
        self.client
            .get_minimum_balance_for_rent_exemption(data_len)
            .await
            .map_err(|e| LedgerError::Rejected(format!("rent exemption lookup failed: {e}")))
    }

    /// Signs with `signers` (fee payer first), broadcasts and waits for confirmation.
    pub async fn sign_and_send(
        &self,
        instructions: &[Instruction],
        signers: Vec<&Keypair>,
    ) -> Result<Signature, LedgerError> {
        let payer = signers
            .first()
            .ok_or_else(|| LedgerError::Rejected("transaction has no signer".to_string()))?;
        let blockhash = self
            .client
            .get_latest_blockhash()
            .await
            .map_err(|e| LedgerError::Rejected(format!("getLatestBlockhash failed: {e}")))?;
        let tx = Transaction::new_signed_with_payer(
            instructions,
            Some(&payer.pubkey()),
            &signers,
            blockhash,
        );

        let signature = self
            .client
            .send_transaction(&tx)
            .await
            .map_err(|e| classify_send_error(&tx, e))?;
        self.wait_for_confirmation(&signature).await?;
        Ok(signature)
    }

    async fn wait_for_confirmation(&self, signature: &Signature) -> Result<(), LedgerError> {
        let start = Instant::now();
        loop {
            match self.client.get_signature_status(signature).await {
                Ok(Some(Ok(()))) => return Ok(()),
                // executed and failed: transactions are atomic, nothing was applied
                Ok(Some(Err(e))) => {
                    return Err(LedgerError::Rejected(format!(
                        "transaction {signature} failed: {e}"
                    )))
                }
                Ok(None) => {}
                Err(e) => {
                    return Err(LedgerError::Unconfirmed {
                        signature: signature.to_string(),
                        source: format!("status lookup failed: {e}"),
                    })
                }
            }

            if start.elapsed() > CONFIRMATION_TIMEOUT {
                return Err(LedgerError::Unconfirmed {
                    signature: signature.to_string(),
                    source: "confirmation timed out".to_string(),
                });
            }
            debug!(%signature, "waiting for confirmation");
            tokio::time::sleep(CONFIRMATION_POLL_INTERVAL).await;
        }
    }
}

/// Only an explicit refusal from the node proves the transaction was not accepted.
/// Transport failures may happen after the node already forwarded it.
fn classify_send_error(tx: &Transaction, err: ClientError) -> LedgerError {
    match err.kind() {
        ClientErrorKind::RpcError(RpcError::RpcResponseError { .. }) => {
            LedgerError::Rejected(format!("sendTransaction refused: {err}"))
        }
        _ => {
            let signature = tx.signatures.first().copied().unwrap_or_default();
            warn!(%signature, "sendTransaction outcome unknown: {err}");
            LedgerError::Unconfirmed {
                signature: signature.to_string(),
                source: format!("sendTransaction failed: {err}"),
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
    use serde_json::{json, Value};
    use solana_sdk::{hash::Hash, transaction::Transaction};
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

    fn rpc_result(id: &Value, result: Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": id,
            "result": result
        }))
    }

    fn request_id(request: &Request) -> Value {
        serde_json::from_slice::<Value>(&request.body)
            .map(|body| body["id"].clone())
            .unwrap_or(json!(1))
    }

    /// Accepts a transaction and answers with its own first signature.
    pub struct AcceptTransaction;

    impl Respond for AcceptTransaction {
        fn respond(&self, request: &Request) -> ResponseTemplate {
            let body: Value = serde_json::from_slice(&request.body).unwrap();
            let encoded = body["params"][0].as_str().unwrap();
            let bytes = BASE64.decode(encoded).unwrap();
            let tx: Transaction = bincode::deserialize(&bytes).unwrap();
            rpc_result(&body["id"], json!(tx.signatures[0].to_string()))
        }
    }

    struct Fixed(Value);

    impl Respond for Fixed {
        fn respond(&self, request: &Request) -> ResponseTemplate {
            rpc_result(&request_id(request), self.0.clone())
        }
    }

    struct Failure(i64, &'static str);

    impl Respond for Failure {
        fn respond(&self, request: &Request) -> ResponseTemplate {
            ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": request_id(request),
                "error": { "code": self.0, "message": self.1 }
            }))
        }
    }

    pub async fn mock_result(server: &MockServer, rpc_method: &str, result: Value) {
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": rpc_method })))
            .respond_with(Fixed(result))
            .mount(server)
            .await;
    }

    pub async fn mock_error(server: &MockServer, rpc_method: &str, code: i64, message: &'static str) {
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": rpc_method })))
            .respond_with(Failure(code, message))
            .mount(server)
            .await;
    }

    pub async fn mock_blockhash(server: &MockServer) {
        mock_result(
            server,
            "getLatestBlockhash",
            json!({
                "context": { "slot": 1 },
                "value": { "blockhash": Hash::default().to_string(), "lastValidBlockHeight": 100 }
            }),
        )
        .await;
        mock_result(server, "getVersion", json!({ "solana-core": "2.2.0", "feature-set": 1 })).await;
    }

    pub async fn mock_accept(server: &MockServer) {
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": "sendTransaction" })))
            .respond_with(AcceptTransaction)
            .mount(server)
            .await;
    }

    pub async fn mock_confirmed(server: &MockServer) {
        mock_result(
            server,
            "getSignatureStatuses",
            json!({
                "context": { "slot": 2 },
                "value": [{
                    "slot": 2,
                    "confirmations": null,
                    "status": { "Ok": null },
                    "err": null,
                    "confirmationStatus": "confirmed"
                }]
            }),
        )
        .await;
    }

    pub async fn count_calls(server: &MockServer, rpc_method: &str) -> usize {
        server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| {
                serde_json::from_slice::<Value>(&r.body)
                    .map(|body| body["method"] == rpc_method)
                    .unwrap_or(false)
            })
            .count()
    }
}
