use color_eyre::eyre::Context;
use dotenvy::dotenv;
use rtoc_bot::{config::Config, startup::Application};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    dotenv().ok();
    config_tracing();
    color_eyre::install()?;

    let config = Config::load().wrap_err("Failed to load configuration")?;
    let app = Application::build(config)?;
    app.run().await
}

fn config_tracing() {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "1")
    }

    use tracing::Level;
    use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

    let tracing_layer = tracing_subscriber::fmt::layer();
    let filter = filter::Targets::new()
        .with_target("hyper_util", Level::INFO)
        .with_target("reqwest", Level::INFO)
        .with_default(Level::DEBUG);

    tracing_subscriber::registry()
        .with(tracing_layer)
        .with(filter)
        .init();
}
