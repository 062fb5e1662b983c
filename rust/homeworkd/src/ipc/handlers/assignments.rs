use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{no_workspace, required_str, validation_err};
use crate::ipc::types::{AppState, Request};
use crate::model::{AssignmentDraft, AssignmentPatch};
use serde_json::json;

fn handle_assignments_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(session) = state.session.as_ref() else {
        return ok(&req.id, json!({ "assignments": [] }));
    };
    ok(
        &req.id,
        json!({ "assignments": session.assignments.list() }),
    )
}

fn handle_assignments_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(session) = state.session.as_mut() else {
        return no_workspace(&req.id);
    };

    let draft: AssignmentDraft = match serde_json::from_value(req.params.clone()) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "bad_params", e.to_string(), None),
    };
    let new = match draft.validate() {
        Ok(v) => v,
        Err(e) => return validation_err(&req.id, &e),
    };

    match session.assignments.add(new) {
        Ok(created) => ok(
            &req.id,
            json!({ "assignmentId": created.id, "assignment": created }),
        ),
        Err(e) => err(&req.id, "storage_failed", format!("{e:#}"), None),
    }
}

fn handle_assignments_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(session) = state.session.as_mut() else {
        return no_workspace(&req.id);
    };
    let assignment_id = match required_str(req, "assignmentId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(patch_raw) = req.params.get("patch").filter(|v| v.is_object()) else {
        return err(&req.id, "bad_params", "patch must be an object", None);
    };
    let patch: AssignmentPatch = match serde_json::from_value(patch_raw.clone()) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "bad_params", e.to_string(), None),
    };
    let patch = match patch.validate() {
        Ok(v) => v,
        Err(e) => return validation_err(&req.id, &e),
    };

    match session.assignments.update(assignment_id, patch) {
        Ok(updated) => ok(&req.id, json!({ "updated": updated })),
        Err(e) => err(&req.id, "storage_failed", format!("{e:#}"), None),
    }
}

fn handle_assignments_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(session) = state.session.as_mut() else {
        return no_workspace(&req.id);
    };
    let assignment_id = match required_str(req, "assignmentId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match session.assignments.delete(assignment_id) {
        Ok(deleted) => ok(&req.id, json!({ "deleted": deleted })),
        Err(e) => err(&req.id, "storage_failed", format!("{e:#}"), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "assignments.list" => Some(handle_assignments_list(state, req)),
        "assignments.create" => Some(handle_assignments_create(state, req)),
        "assignments.update" => Some(handle_assignments_update(state, req)),
        "assignments.delete" => Some(handle_assignments_delete(state, req)),
        _ => None,
    }
}
