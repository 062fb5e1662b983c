use crate::ipc::error::{err, ok};
use crate::ipc::helpers::optional_param;
use crate::ipc::types::{AppState, Request};
use crate::model::Assignment;
use crate::view::{self, ClassFilter, SortConfig, SortField, StatusFilter, ViewQuery};
use serde_json::json;

fn parse_query(req: &Request) -> Result<ViewQuery, serde_json::Value> {
    let search: Option<String> = optional_param(req, "search")?;
    let class_filter: Option<String> = optional_param(req, "classFilter")?;
    let status_filter: Option<StatusFilter> = optional_param(req, "statusFilter")?;
    let sort: Option<SortConfig> = optional_param(req, "sort")?;
    Ok(ViewQuery {
        search: search.unwrap_or_default(),
        class_filter: class_filter
            .as_deref()
            .map(ClassFilter::parse)
            .unwrap_or_default(),
        status_filter: status_filter.unwrap_or_default(),
        sort: sort.unwrap_or_default(),
    })
}

fn list(state: &AppState) -> &[Assignment] {
    state
        .session
        .as_ref()
        .map(|s| s.assignments.list())
        .unwrap_or(&[])
}

fn handle_view_derive(state: &mut AppState, req: &Request) -> serde_json::Value {
    let query = match parse_query(req) {
        Ok(q) => q,
        Err(resp) => return resp,
    };
    let all = list(state);
    let rows = view::derive(all, &query);
    ok(
        &req.id,
        json!({
            "assignments": rows,
            "classes": view::unique_classes(all),
            "sort": query.sort,
        }),
    )
}

fn handle_view_toggle_sort(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let current: Option<SortConfig> = match optional_param(req, "sort") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let field: SortField = match optional_param(req, "field") {
        Ok(Some(v)) => v,
        Ok(None) => return err(&req.id, "bad_params", "missing field", None),
        Err(resp) => return resp,
    };
    let next = current.unwrap_or_default().toggle(field);
    ok(&req.id, json!({ "sort": next }))
}

fn handle_dashboard_summary(state: &mut AppState, req: &Request) -> serde_json::Value {
    let summary = view::summarize(list(state));
    ok(&req.id, json!(summary))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "view.derive" => Some(handle_view_derive(state, req)),
        "view.toggleSort" => Some(handle_view_toggle_sort(state, req)),
        "dashboard.summary" => Some(handle_dashboard_summary(state, req)),
        _ => None,
    }
}
