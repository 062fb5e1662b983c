use crate::dates::DueDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    pub class_name: String,
    pub assignment_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<u32>,
    #[serde(default)]
    pub completed: bool,
}

impl Assignment {
    /// Merge `patch` into this record. Fields the patch leaves out keep their value.
    pub fn apply(&mut self, patch: AssignmentPatch) {
        if let Some(v) = patch.class_name {
            self.class_name = v;
        }
        if let Some(v) = patch.assignment_name {
            self.assignment_name = v;
        }
        if let Some(v) = patch.due_date {
            self.due_date = v;
        }
        if let Some(v) = patch.description {
            self.description = v;
        }
        if let Some(v) = patch.link {
            self.link = v;
        }
        if let Some(v) = patch.points {
            self.points = v;
        }
        if let Some(v) = patch.completed {
            self.completed = v;
        }
    }
}

/// Everything but the id, which the store assigns.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewAssignment {
    pub class_name: String,
    pub assignment_name: String,
    pub due_date: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub points: Option<u32>,
    pub completed: bool,
}

impl NewAssignment {
    pub fn into_assignment(self, id: String) -> Assignment {
        Assignment {
            id,
            class_name: self.class_name,
            assignment_name: self.assignment_name,
            due_date: self.due_date,
            description: self.description,
            link: self.link,
            points: self.points,
            completed: self.completed,
        }
    }
}

/// Partial update. For the optional fields, an absent key leaves the value alone
/// while an explicit `null` clears it. Unknown keys (including `id`) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentPatch {
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub assignment_name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub due_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub link: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub points: Option<Option<u32>>,
    #[serde(default)]
    pub completed: Option<bool>,
}

fn present<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

impl AssignmentPatch {
    #[cfg(test)]
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    /// Same rules as creation for whatever fields the patch touches.
    pub fn validate(self) -> Result<Self, ValidationError> {
        Ok(Self {
            class_name: self
                .class_name
                .map(|v| required_text("className", &v))
                .transpose()?,
            assignment_name: self
                .assignment_name
                .map(|v| required_text("assignmentName", &v))
                .transpose()?,
            due_date: self
                .due_date
                .map(|v| normalize_due_date(v.as_deref()))
                .transpose()?,
            description: self.description.map(|v| optional_text(v.as_deref())),
            link: self.link.map(|v| optional_text(v.as_deref())),
            points: self.points,
            completed: self.completed,
        })
    }
}

/// Raw create-form input before trimming and validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentDraft {
    #[serde(default)]
    pub class_name: String,
    #[serde(default)]
    pub assignment_name: String,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub points: Option<PointsInput>,
}

/// Form inputs hand points over as text; programmatic callers send numbers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PointsInput {
    Number(serde_json::Number),
    Text(String),
}

impl AssignmentDraft {
    pub fn validate(self) -> Result<NewAssignment, ValidationError> {
        let class_name = self.class_name.trim();
        let assignment_name = self.assignment_name.trim();
        if class_name.is_empty() || assignment_name.is_empty() {
            let field = if class_name.is_empty() {
                "className"
            } else {
                "assignmentName"
            };
            return Err(ValidationError::new(
                field,
                "Please fill in class name and assignment name.",
            ));
        }

        Ok(NewAssignment {
            class_name: class_name.to_string(),
            assignment_name: assignment_name.to_string(),
            due_date: normalize_due_date(self.due_date.as_deref())?,
            description: optional_text(self.description.as_deref()),
            link: optional_text(self.link.as_deref()),
            points: parse_points(self.points.as_ref())?,
            completed: false,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

fn required_text(field: &'static str, raw: &str) -> Result<String, ValidationError> {
    let v = raw.trim();
    if v.is_empty() {
        return Err(ValidationError::new(field, format!("{} must not be empty", field)));
    }
    Ok(v.to_string())
}

fn optional_text(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn normalize_due_date(raw: Option<&str>) -> Result<Option<String>, ValidationError> {
    let Some(v) = optional_text(raw) else {
        return Ok(None);
    };
    if DueDate::parse(&v).is_none() {
        return Err(ValidationError::new(
            "dueDate",
            format!("dueDate must be YYYY-MM-DD or an ISO-8601 date-time, got {:?}", v),
        ));
    }
    Ok(Some(v))
}

fn parse_points(raw: Option<&PointsInput>) -> Result<Option<u32>, ValidationError> {
    let bad = || ValidationError::new("points", "points must be a whole number of at least 0");
    match raw {
        None => Ok(None),
        Some(PointsInput::Number(n)) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .map(Some)
            .ok_or_else(bad),
        Some(PointsInput::Text(s)) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            s.parse::<u32>().map(Some).map_err(|_| bad())
        }
    }
}
