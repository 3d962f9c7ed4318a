use std::{env, panic};

use color_eyre::config::PanicHook;
use eyre::Result;
use tracing::{error, level_filters::LevelFilter};
use tracing_error::ErrorLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::config::Config;

/// Setup logging for the binary
pub fn setup_logging(config: &Config) -> Result<()> {
    let var = "SIGSCAN_LOG";

    let builder = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_regex(false);

    // the env var replaces the configured level entirely
    let env_filter = match env::var(var) {
        Ok(directives) => builder.parse(directives)?,
        Err(_) => builder.parse(&config.log.level)?,
    };

    let stdout_layer = tracing_subscriber::fmt::Layer::default()
        .without_time()
        .with_ansi(true)
        .with_target(config.log.targets);

    Registry::default()
        .with(stdout_layer)
        .with(ErrorLayer::default())
        .with(env_filter)
        .init();

    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default()
        .display_env_section(false)
        .into_hooks();

    eyre_hook.install()?;
    set_panic_hook(panic_hook);

    Ok(())
}

fn set_panic_hook(hook: PanicHook) {
    // route the eyre panic report through every tracing layer
    panic::set_hook(Box::new(move |info| {
        let panic = hook.panic_report(info);
        error!("{panic}");
    }))
}
