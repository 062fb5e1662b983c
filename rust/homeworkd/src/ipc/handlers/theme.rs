use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{no_workspace, required_str};
use crate::ipc::types::{AppState, Request};
use crate::theme::Theme;
use serde_json::json;

fn theme_names() -> Vec<&'static str> {
    Theme::ALL.iter().map(|t| t.as_str()).collect()
}

fn handle_theme_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let theme = state
        .session
        .as_ref()
        .map(|s| s.theme.load())
        .unwrap_or_default();
    ok(
        &req.id,
        json!({ "theme": theme.as_str(), "themes": theme_names() }),
    )
}

fn handle_theme_set(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(session) = state.session.as_ref() else {
        return no_workspace(&req.id);
    };
    let raw = match required_str(req, "theme") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(theme) = Theme::parse(raw) else {
        return err(
            &req.id,
            "bad_params",
            format!("unknown theme: {}", raw),
            Some(json!({ "themes": theme_names() })),
        );
    };
    if let Err(e) = session.theme.save(theme) {
        return err(&req.id, "storage_failed", format!("{e:#}"), None);
    }
    ok(&req.id, json!({ "theme": theme.as_str() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "theme.get" => Some(handle_theme_get(state, req)),
        "theme.set" => Some(handle_theme_set(state, req)),
        _ => None,
    }
}
