use predict_relay::config::RelayConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    predict_relay::init_tracing();

    let config = RelayConfig::load()?;
    predict_relay::serve(config).await
}
