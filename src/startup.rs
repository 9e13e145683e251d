use std::sync::Arc;

use color_eyre::eyre::Context;
use tracing::info;

use crate::{
    bot::CommandBot,
    config::Config,
    lookup::RtocClient,
    notify::TelegramNotifier,
    sweep::{DailySchedule, Sequencer, SweepScheduler},
    telegram::TelegramApi,
    utils::shutdown::{self, ShutdownTrigger},
};

/// The wired application: daily sweep scheduler plus the command loop
pub struct Application {
    scheduler: SweepScheduler,
    bot: CommandBot,
    trigger: ShutdownTrigger,
}

impl Application {
    pub fn build(config: Config) -> color_eyre::Result<Self> {
        let (trigger, shutdown) = shutdown::channel();

        let lookup = RtocClient::new(config.rtoc.api_url.clone(), config.rtoc.timeout())
            .wrap_err("Failed to build lookup client")?;
        let api = TelegramApi::new(config.telegram.api_base.clone(), config.telegram.bot_token.clone())
            .wrap_err("Failed to build Telegram client")?;
        let notifier = TelegramNotifier::new(api.clone(), config.telegram.master_id)
            .with_retry(config.notify.max_attempts, config.notify.retry_backoff());

        let sequencer = Sequencer::new(Arc::new(lookup), Arc::new(notifier), shutdown.clone());

        let schedule = DailySchedule::new(&config.schedule.cron, config.schedule.utc_offset_secs)
            .wrap_err_with(|| format!("Invalid schedule {:?}", config.schedule.cron))?;

        info!(
            count = config.rtoc.vehicles.len(),
            vehicles = ?config.rtoc.vehicles.iter().map(|v| v.as_str()).collect::<Vec<_>>(),
            "loaded vehicles"
        );

        let scheduler = SweepScheduler::new(
            schedule,
            // Only the daily sweep closes with a summary
            sequencer.clone().with_summary(config.schedule.summary),
            config.rtoc.vehicles.clone(),
            config.schedule.sweep_cooldown(),
            shutdown.clone(),
        );
        let bot = CommandBot::new(
            api,
            config.telegram.master_id,
            config.rtoc.vehicles,
            sequencer,
            config.schedule.on_demand_cooldown(),
            shutdown,
        )
        .with_poll_timeout(config.telegram.poll_timeout_secs);

        Ok(Self {
            scheduler,
            bot,
            trigger,
        })
    }

    /// Run until a termination signal arrives
    pub async fn run(self) -> color_eyre::Result<()> {
        let scheduler = tokio::spawn(self.scheduler.run());
        let bot = tokio::spawn(self.bot.run());

        shutdown_signal().await;
        info!("shutdown signal received");
        self.trigger.trigger();

        scheduler.await.wrap_err("Scheduler task failed")?;
        bot.await.wrap_err("Command loop task failed")?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
