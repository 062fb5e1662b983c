use std::path::PathBuf;
use std::rc::Rc;

use serde::Deserialize;

use crate::config::Config;
use crate::db::SqliteKv;
use crate::ids::UuidIds;
use crate::store::AssignmentStore;
use crate::theme::ThemePreference;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Everything bound to one open workspace. Both stores share the same key/value table.
pub struct Session {
    pub config: Config,
    pub assignments: AssignmentStore<Rc<SqliteKv>, UuidIds>,
    pub theme: ThemePreference<Rc<SqliteKv>>,
}

#[derive(Default)]
pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub session: Option<Session>,
}
