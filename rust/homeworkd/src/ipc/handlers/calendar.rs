use crate::calendar;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::optional_param;
use crate::ipc::types::{AppState, Request};
use chrono::NaiveDate;
use serde_json::json;

fn handle_calendar_month(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(year) = req
        .params
        .get("year")
        .and_then(|v| v.as_i64())
        .and_then(|v| i32::try_from(v).ok())
    else {
        return err(&req.id, "bad_params", "missing year", None);
    };
    let Some(month) = req
        .params
        .get("month")
        .and_then(|v| v.as_u64())
        .and_then(|v| u32::try_from(v).ok())
    else {
        return err(&req.id, "bad_params", "missing month", None);
    };
    let today = match optional_param::<String>(req, "today") {
        Ok(None) => chrono::Local::now().date_naive(),
        Ok(Some(raw)) => match NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
            Ok(d) => d,
            Err(e) => return err(&req.id, "bad_params", format!("invalid today: {}", e), None),
        },
        Err(resp) => return resp,
    };

    let list = state
        .session
        .as_ref()
        .map(|s| s.assignments.list())
        .unwrap_or(&[]);
    let grid = match calendar::month_grid(list, year, month, today) {
        Ok(g) => g,
        Err(e) => return err(&req.id, "bad_params", e.to_string(), None),
    };

    let days: Vec<serde_json::Value> = grid
        .iter()
        .map(|d| {
            json!({
                "date": d.date.format("%Y-%m-%d").to_string(),
                "inMonth": d.in_month,
                "isToday": d.is_today,
                "assignments": d.assignments,
            })
        })
        .collect();
    ok(
        &req.id,
        json!({
            "year": year,
            "month": month,
            "today": today.format("%Y-%m-%d").to_string(),
            "days": days,
            "dueToday": calendar::due_on(list, today),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "calendar.month" => Some(handle_calendar_month(state, req)),
        _ => None,
    }
}
