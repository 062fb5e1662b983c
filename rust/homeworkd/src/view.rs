//! Filtering, sorting and summary numbers for the assignment list.
//!
//! Everything here is a pure function of its inputs; callers re-run it whenever
//! the list or the query changes.

use crate::dates::sort_instant;
use crate::model::Assignment;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    DueDate,
    ClassName,
    AssignmentName,
    Points,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortConfig {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortConfig {
    /// Same field flips direction; a new field starts ascending.
    pub fn toggle(self, field: SortField) -> Self {
        let direction = if self.field == field && self.direction == SortDirection::Asc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        Self { field, direction }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ClassFilter {
    #[default]
    All,
    Only(String),
}

impl ClassFilter {
    pub fn parse(raw: &str) -> Self {
        if raw == "all" {
            Self::All
        } else {
            Self::Only(raw.to_string())
        }
    }

    fn matches(&self, a: &Assignment) -> bool {
        match self {
            Self::All => true,
            Self::Only(class) => a.class_name == *class,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Completed,
    Pending,
}

impl StatusFilter {
    fn matches(self, a: &Assignment) -> bool {
        match self {
            Self::All => true,
            Self::Completed => a.completed,
            Self::Pending => !a.completed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewQuery {
    pub search: String,
    pub class_filter: ClassFilter,
    pub status_filter: StatusFilter,
    pub sort: SortConfig,
}

impl ViewQuery {
    pub fn matches(&self, a: &Assignment) -> bool {
        matches_search(&self.search, a)
            && self.class_filter.matches(a)
            && self.status_filter.matches(a)
    }
}

fn matches_search(search: &str, a: &Assignment) -> bool {
    if search.is_empty() {
        return true;
    }
    let needle = search.to_lowercase();
    a.assignment_name.to_lowercase().contains(&needle)
        || a.class_name.to_lowercase().contains(&needle)
}

/// Filter then sort. The input list is left untouched.
pub fn derive<'a>(list: &'a [Assignment], query: &ViewQuery) -> Vec<&'a Assignment> {
    let mut out: Vec<&Assignment> = list.iter().filter(|a| query.matches(a)).collect();
    sort_assignments(&mut out, query.sort);
    out
}

/// Stable sort; descending reverses the comparator so ties keep their prior order.
pub fn sort_assignments(items: &mut [&Assignment], sort: SortConfig) {
    items.sort_by(|a, b| {
        let ord = compare_by(sort.field, a, b);
        match sort.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}

fn compare_by(field: SortField, a: &Assignment, b: &Assignment) -> Ordering {
    match field {
        SortField::DueDate => {
            sort_instant(a.due_date.as_deref()).cmp(&sort_instant(b.due_date.as_deref()))
        }
        SortField::ClassName => locale_cmp(&a.class_name, &b.class_name),
        SortField::AssignmentName => locale_cmp(&a.assignment_name, &b.assignment_name),
        SortField::Points => a.points.unwrap_or(0).cmp(&b.points.unwrap_or(0)),
    }
}

/// Compares base letters first, ignoring accents and case. Ties fall to
/// accents (unaccented first), then case (lowercase first).
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    fn base(s: &str) -> impl Iterator<Item = char> + '_ {
        s.nfd()
            .filter(|c| !is_combining_mark(*c))
            .flat_map(char::to_lowercase)
    }
    fn accented(s: &str) -> impl Iterator<Item = char> + '_ {
        s.nfd().flat_map(char::to_lowercase)
    }

    base(a)
        .cmp(base(b))
        .then_with(|| accented(a).cmp(accented(b)))
        .then_with(|| {
            a.nfd()
                .map(char::is_uppercase)
                .cmp(b.nfd().map(char::is_uppercase))
        })
        .then_with(|| a.cmp(b))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub completion_rate: u32,
    pub classes: Vec<String>,
}

pub fn summarize(list: &[Assignment]) -> Summary {
    let total = list.len();
    let completed = list.iter().filter(|a| a.completed).count();
    let completion_rate = if total > 0 {
        ((completed as f64 / total as f64) * 100.0).round() as u32
    } else {
        0
    };
    Summary {
        total,
        completed,
        pending: total - completed,
        completion_rate,
        classes: unique_classes(list),
    }
}

/// Class names in order of first appearance.
pub fn unique_classes(list: &[Assignment]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for a in list {
        if !out.contains(&a.class_name) {
            out.push(a.class_name.clone());
        }
    }
    out
}
