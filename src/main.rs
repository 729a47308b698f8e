use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;

use waymark::demo::DemoPlugin;
use waymark::nav::NavigationPlugin;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use std::fs;
use std::path::Path;
use std::time::Duration;

const LOG_DIR: &str = "logs";
const LOG_PREFIX: &str = "waymark";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bevy_ecs=info,waymark=info"))
}

fn setup_file_logging() -> std::io::Result<String> {
    let log_dir = Path::new(LOG_DIR);
    fs::create_dir_all(log_dir)?;

    // Keep only the last 25 runs
    cleanup_old_logs(log_dir, 25);

    let now = chrono::Local::now();
    let log_filename = format!("{}_{}.log", LOG_PREFIX, now.format("%Y%m%d_%H%M%S"));
    let log_path = log_dir.join(&log_filename).to_string_lossy().to_string();

    let file_appender = RollingFileAppender::new(Rotation::NEVER, log_dir, &log_filename);

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false);

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(file_layer)
        .with(stdout_layer)
        .init();

    Ok(log_path)
}

fn cleanup_old_logs(log_dir: &Path, keep_count: usize) {
    let Ok(entries) = fs::read_dir(log_dir) else { return };

    let mut log_files: Vec<_> = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_name()
                .to_str()
                .is_some_and(|s| s.starts_with(LOG_PREFIX) && s.ends_with(".log"))
        })
        .collect();

    // Oldest first
    log_files.sort_by_key(|e| e.metadata().ok().and_then(|m| m.modified().ok()));

    if log_files.len() > keep_count {
        for file in log_files.iter().take(log_files.len() - keep_count) {
            let _ = fs::remove_file(file.path());
        }
    }
}

fn main() {
    match setup_file_logging() {
        Ok(log_file) => println!("waymark: logging to {}", log_file),
        Err(e) => {
            eprintln!("waymark: file logging unavailable ({}), logging to stdout only", e);
            tracing_subscriber::registry()
                .with(env_filter())
                .with(fmt::layer().with_target(false))
                .init();
        }
    }

    // Drive the schedule faster than the fixed tick so FixedUpdate keeps pace.
    App::new()
        .add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(1.0 / 120.0))))
        .add_plugins(NavigationPlugin)
        .add_plugins(DemoPlugin::default())
        .run();
}
