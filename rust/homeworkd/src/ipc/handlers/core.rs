use crate::config::Config;
use crate::db::{self, SqliteKv};
use crate::ids::UuidIds;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request, Session};
use crate::store::AssignmentStore;
use crate::theme::ThemePreference;
use serde_json::json;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::info;

#[derive(Debug)]
pub enum OpenError {
    Config(anyhow::Error),
    Db(anyhow::Error),
}

impl OpenError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "config_invalid",
            Self::Db(_) => "db_open_failed",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::Config(e) | Self::Db(e) => format!("{e:#}"),
        }
    }
}

/// Loads config, opens the database and initializes both stores. The previous
/// session, if any, is only replaced once everything has opened.
pub fn open_workspace(state: &mut AppState, path: PathBuf) -> Result<(), OpenError> {
    let config = Config::load(&path).map_err(OpenError::Config)?;
    let conn = db::open_db(&path, &config.database_file).map_err(OpenError::Db)?;
    let kv = Rc::new(SqliteKv::new(conn));

    let assignments = AssignmentStore::initialize(kv.clone(), UuidIds, config.write_policy);
    let theme = ThemePreference::new(kv);
    info!(
        workspace = %path.to_string_lossy(),
        assignments = assignments.list().len(),
        write_policy = config.write_policy.as_str(),
        "workspace opened"
    );

    state.workspace = Some(path);
    state.session = Some(Session {
        config,
        assignments,
        theme,
    });
    Ok(())
}

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string())
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    if let Err(e) = open_workspace(state, path.clone()) {
        return err(&req.id, e.code(), e.message(), None);
    }
    let Some(session) = state.session.as_ref() else {
        return err(&req.id, "db_open_failed", "workspace did not open", None);
    };
    ok(
        &req.id,
        json!({
            "workspacePath": path.to_string_lossy(),
            "assignmentCount": session.assignments.list().len(),
            "writePolicy": session.assignments.policy().as_str(),
            "databaseFile": session.config.database_file,
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        _ => None,
    }
}
