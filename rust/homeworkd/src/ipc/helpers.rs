use crate::ipc::error::err;
use crate::ipc::types::Request;
use crate::model::ValidationError;
use serde::de::DeserializeOwned;
use serde_json::json;

/// Reads `params.<key>` as `T`. Missing or `null` yields `None`; a wrong shape is a
/// `bad_params` reply.
pub fn optional_param<T: DeserializeOwned>(
    req: &Request,
    key: &str,
) -> Result<Option<T>, serde_json::Value> {
    match req.params.get(key) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(v) => serde_json::from_value(v.clone())
            .map(Some)
            .map_err(|e| err(&req.id, "bad_params", format!("invalid {}: {}", key, e), None)),
    }
}

pub fn required_str<'a>(req: &'a Request, key: &str) -> Result<&'a str, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

pub fn validation_err(id: &str, e: &ValidationError) -> serde_json::Value {
    err(
        id,
        "validation_failed",
        e.message.clone(),
        Some(json!({ "field": e.field })),
    )
}

pub fn no_workspace(id: &str) -> serde_json::Value {
    err(id, "no_workspace", "select a workspace first", None)
}
