use crate::dates::DueDate;
use crate::model::Assignment;
use anyhow::anyhow;
use chrono::{Datelike, Days, NaiveDate};
use std::collections::BTreeMap;
use tracing::debug;

pub fn group_by_due_date(list: &[Assignment]) -> BTreeMap<NaiveDate, Vec<&Assignment>> {
    let mut out: BTreeMap<NaiveDate, Vec<&Assignment>> = BTreeMap::new();
    for a in list {
        let Some(raw) = a.due_date.as_deref() else {
            continue;
        };
        match DueDate::parse(raw) {
            Some(due) => out.entry(due.calendar_date()).or_default().push(a),
            None => debug!(id = %a.id, due_date = raw, "skipping unreadable due date"),
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarDay<'a> {
    pub date: NaiveDate,
    pub in_month: bool,
    pub is_today: bool,
    pub assignments: Vec<&'a Assignment>,
}

/// Whole weeks (Sunday first) covering `year`-`month`, each day with what is due on it.
pub fn month_grid(
    list: &[Assignment],
    year: i32,
    month: u32,
    today: NaiveDate,
) -> anyhow::Result<Vec<CalendarDay<'_>>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| anyhow!("invalid month {year}-{month}"))?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| anyhow!("month {year}-{month} is out of range"))?;
    let last = next_first
        .pred_opt()
        .ok_or_else(|| anyhow!("month {year}-{month} is out of range"))?;

    let lead = u64::from(first.weekday().num_days_from_sunday());
    let trail = 6 - u64::from(last.weekday().num_days_from_sunday());
    let start = first
        .checked_sub_days(Days::new(lead))
        .ok_or_else(|| anyhow!("month {year}-{month} is out of range"))?;
    let end = last
        .checked_add_days(Days::new(trail))
        .ok_or_else(|| anyhow!("month {year}-{month} is out of range"))?;

    let mut by_day = group_by_due_date(list);
    let days = start
        .iter_days()
        .take_while(|d| *d <= end)
        .map(|date| CalendarDay {
            date,
            in_month: date.month() == month && date.year() == year,
            is_today: date == today,
            assignments: by_day.remove(&date).unwrap_or_default(),
        })
        .collect();
    Ok(days)
}

/// Everything due on `today`, done or not, in list order.
pub fn due_on(list: &[Assignment], today: NaiveDate) -> Vec<&Assignment> {
    group_by_due_date(list).remove(&today).unwrap_or_default()
}
