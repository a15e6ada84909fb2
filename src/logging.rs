use std::{env, fs::OpenOptions, path::Path, sync::Mutex};

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File,
}

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .map(|value| matches!(value.trim(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

pub fn init_logging(target: LogTarget, state_dir: &Path) {
    let default_level = match target {
        LogTarget::Stderr => "warn",
        LogTarget::File => "info",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let log_json = env_bool("SHOPBOARD_LOG_JSON", false);

    match target {
        LogTarget::Stderr => {
            let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
            if log_json {
                tracing_subscriber::registry().with(filter).with(layer.json()).init();
            } else {
                tracing_subscriber::registry().with(filter).with(layer).init();
            }
        }
        LogTarget::File => {
            let path = state_dir.join("shopboard.log");
            let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
                return;
            };
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            if log_json {
                tracing_subscriber::registry().with(filter).with(layer.json()).init();
            } else {
                tracing_subscriber::registry().with(filter).with(layer).init();
            }
        }
    }
}
