use broadcast_bot::bot::dispatcher::run;
use log::{error, info};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("Bot starting...");

    match run().await {
        Ok(_) => info!("Bot stopped"),
        Err(e) => {
            error!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
