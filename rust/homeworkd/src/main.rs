mod calendar;
mod config;
mod dates;
mod db;
mod ids;
mod ipc;
mod model;
mod storage;
mod store;
mod theme;
mod view;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    // stdout carries responses, so logs go to stderr.
    let filter = std::env::var("HOMEWORKD_LOG")
        .ok()
        .and_then(|v| EnvFilter::try_new(v).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();
}

fn main() {
    init_tracing();
    info!(version = env!("CARGO_PKG_VERSION"), "homeworkd starting");

    let mut state = ipc::AppState::default();

    if let Some(path) = std::env::var_os("HOMEWORKD_WORKSPACE") {
        if let Err(e) = ipc::open_workspace(&mut state, PathBuf::from(path)) {
            // Keep serving; the shell can still pick a workspace.
            error!(code = e.code(), error = %e.message(), "startup workspace failed to open");
        }
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id.
                let body = serde_json::json!({
                    "ok": false,
                    "error": { "code": "bad_json", "message": e.to_string() }
                });
                let _ = writeln!(stdout, "{}", body);
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }

    info!("stdin closed; shutting down");
}
