use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum SolanaNetwork {
    #[strum(serialize = "devnet")]
    Devnet,
    #[strum(serialize = "mainnet-beta")]
    MainnetBeta,
}

impl SolanaNetwork {
    pub fn rpc_url(&self) -> &'static str {
        match self {
            SolanaNetwork::Devnet => "https://api.devnet.solana.com",
            SolanaNetwork::MainnetBeta => "https://api.mainnet-beta.solana.com",
        }
    }

    pub fn explorer_address_url(&self, address: &str) -> String {
        format!("https://explorer.solana.com/address/{address}?cluster={self}")
    }
}

#[derive(Debug)]
pub struct AppConfig {
    pub openai_api_key: Option<String>,
    pub openai_api_url: String,
    pub openai_model: String,
    pub solana_network: SolanaNetwork,
    pub solana_rpc_url: String,
    pub solana_private_key: Option<String>,
    pub cs_token_mint: Option<String>,
    pub app_url: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let openai_api_key = non_empty_var("OPENAI_API_KEY");
        let openai_api_url = std::env::var("OPENAI_API_URL")
            .unwrap_or("https://api.openai.com/v1".to_string());
        let openai_model =
            std::env::var("OPENAI_MODEL").unwrap_or("gpt-4-turbo-preview".to_string());

        let solana_network = std::env::var("SOLANA_NETWORK")
            .map_or(SolanaNetwork::Devnet, |v| {
                v.parse::<SolanaNetwork>()
                    .expect("SOLANA_NETWORK must be devnet or mainnet-beta")
            });
        let solana_rpc_url = non_empty_var("SOLANA_RPC_URL")
            .unwrap_or(solana_network.rpc_url().to_string());
        let solana_private_key = non_empty_var("SOLANA_PRIVATE_KEY");
        let cs_token_mint = non_empty_var("CS_TOKEN_MINT_ADDRESS");

        let app_url = std::env::var("APP_URL").unwrap_or("http://localhost:8080".to_string());
        let port = std::env::var("PORT").map_or(8080, |p| {
            p.parse::<u16>().expect("PORT must be number")
        });

        Self {
            openai_api_key,
            openai_api_url,
            openai_model,
            solana_network,
            solana_rpc_url,
            solana_private_key,
            cs_token_mint,
            app_url: app_url.trim_end_matches('/').to_string(),
            port,
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingStatus {
    Configured(String),
    Invalid(String),
    Missing,
}

#[derive(Debug, Clone)]
pub struct SettingCheck {
    pub name: &'static str,
    pub required: bool,
    pub status: SettingStatus,
}

/// Environment readiness report, independent of [`AppConfig`] so invalid values can
/// be reported instead of aborting.
#[derive(Debug, Clone)]
pub struct SetupReport {
    pub checks: Vec<SettingCheck>,
}

impl SetupReport {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(non_empty_var)
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let openai = match lookup("OPENAI_API_KEY") {
            Some(key) if key.starts_with("sk-") => SettingStatus::Configured("set".to_string()),
            Some(_) => SettingStatus::Invalid("should start with sk-".to_string()),
            None => SettingStatus::Missing,
        };
        let network = match lookup("SOLANA_NETWORK") {
            Some(value) => match value.parse::<SolanaNetwork>() {
                Ok(network) => SettingStatus::Configured(network.to_string()),
                Err(_) => SettingStatus::Invalid("use devnet or mainnet-beta".to_string()),
            },
            None => SettingStatus::Missing,
        };
        let private_key = match lookup("SOLANA_PRIVATE_KEY") {
            Some(_) => SettingStatus::Configured("set".to_string()),
            None => SettingStatus::Missing,
        };
        let app_url = match lookup("APP_URL") {
            Some(url) => SettingStatus::Configured(url),
            None => SettingStatus::Missing,
        };
        let mint = match lookup("CS_TOKEN_MINT_ADDRESS") {
            Some(_) => SettingStatus::Configured("set".to_string()),
            None => SettingStatus::Missing,
        };

        Self {
            checks: vec![
                SettingCheck { name: "OPENAI_API_KEY", required: true, status: openai },
                SettingCheck { name: "SOLANA_NETWORK", required: true, status: network },
                SettingCheck { name: "SOLANA_PRIVATE_KEY", required: true, status: private_key },
                SettingCheck { name: "APP_URL", required: true, status: app_url },
                SettingCheck { name: "CS_TOKEN_MINT_ADDRESS", required: false, status: mint },
            ],
        }
    }

    pub fn is_ready(&self) -> bool {
        self.checks
            .iter()
            .filter(|c| c.required)
            .all(|c| matches!(c.status, SettingStatus::Configured(_)))
    }

    pub fn configured_count(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| matches!(c.status, SettingStatus::Configured(_)))
            .count()
    }
}
