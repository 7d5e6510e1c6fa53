use gamedock::config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = config::load();
    if let Err(error) = config::validate_config(&cfg) {
        eprintln!("invalid configuration: {error}");
        std::process::exit(1);
    }

    gamedock::logging::init_with_config(&cfg.logging);

    gamedock::lobby::run(cfg.lobby, cfg.protocol.max_frame_size).await
}
