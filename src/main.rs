use canvass::{
    configuration::{get_configuration, Credentials},
    services::HarvestStats,
    startup::run,
};
use env_logger::Env;

async fn try_main() -> anyhow::Result<HarvestStats> {
    let settings = get_configuration()?;
    let credentials = Credentials::from_env()?;
    run(&settings, &credentials).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let dotenv_result = dotenv::dotenv();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    if let Err(e) = dotenv_result {
        log::warn!("No .env file loaded: {}", e);
    }

    if let Err(e) = try_main().await {
        log::error!("{:?}", e);
        std::process::exit(1);
    }
}
