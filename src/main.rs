use std::net::{Ipv4Addr, SocketAddr};

use consilience_server::{
    config::{AppConfig, SettingStatus, SetupReport},
    init,
    middleware::mw_ctx,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let report = SetupReport::from_env();
    for check in report.checks.iter().filter(|c| c.required) {
        match &check.status {
            SettingStatus::Configured(_) => {}
            SettingStatus::Invalid(hint) => warn!(setting = check.name, %hint, "invalid setting"),
            SettingStatus::Missing => warn!(setting = check.name, "missing setting"),
        }
    }

    let config = AppConfig::from_env();
    info!(
        network = %config.solana_network,
        rpc = %config.solana_rpc_url,
        reward_mint = config.cs_token_mint.is_some(),
        "config loaded"
    );

    let ctx_state = mw_ctx::create_ctx_state(&config);
    let routes_all = init::main_router(&ctx_state);

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("->> LISTENING on {addr}");

    axum::serve(listener, routes_all.into_make_service()).await
}
