pub mod specs;

pub use specs::{CareerForm, CompanyForm, DepartmentForm, EmployeeForm, SalarySlipForm};

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::api::FilePart;
use crate::models::{parse_date, parse_pay_month};
use crate::resources::Resource;

pub(crate) static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
static MOBILE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{10}$").unwrap());

/// Field name → message, in the order the fields were checked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldErrors(Vec<(String, String)>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.insert(field, message);
        errors
    }

    /// Records a message, replacing any earlier one for the same field.
    pub fn insert(&mut self, field: &str, message: impl Into<String>) {
        let message = message.into();
        match self.0.iter_mut().find(|(f, _)| f == field) {
            Some(entry) => entry.1 = message,
            None => self.0.push((field.to_string(), message)),
        }
    }

    pub fn remove(&mut self, field: &str) {
        self.0.retain(|(f, _)| f != field);
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, m)| m.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> Vec<&str> {
        self.0.iter().map(|(f, _)| f.as_str()).collect()
    }

    pub fn first_message(&self) -> Option<&str> {
        self.0.first().map(|(_, m)| m.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(f, m)| (f.as_str(), m.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "{}", joined)
    }
}

/// Raw form input: text values by field name plus attached files.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormDraft {
    values: BTreeMap<String, String>,
    files: BTreeMap<String, FilePart>,
}

impl FormDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn with_file(mut self, file: FilePart) -> Self {
        self.set_file(file);
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.values.insert(name.to_string(), value.into());
    }

    /// Files are keyed by their multipart field name.
    pub fn set_file(&mut self, file: FilePart) {
        self.files.insert(file.field.clone(), file);
    }

    pub fn get(&self, name: &str) -> &str {
        self.values.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn text(&self, name: &str) -> String {
        self.get(name).trim().to_string()
    }

    pub fn optional(&self, name: &str) -> Option<String> {
        Some(self.text(name)).filter(|v| !v.is_empty())
    }

    /// Blank or unparseable input counts as zero.
    pub fn number(&self, name: &str) -> f64 {
        self.get(name).trim().parse().unwrap_or(0.0)
    }

    /// Comma-separated entries, trimmed, blanks dropped.
    pub fn list(&self, name: &str) -> Vec<String> {
        split_list(self.get(name))
            .into_iter()
            .filter(|item| !item.is_empty())
            .collect()
    }

    pub fn file(&self, name: &str) -> Option<&FilePart> {
        self.files.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.values.values().all(|v| v.trim().is_empty()) && self.files.is_empty()
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',').map(|item| item.trim().to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(String),
}

impl FormMode {
    pub fn is_create(&self) -> bool {
        matches!(self, FormMode::Create)
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            FormMode::Create => None,
            FormMode::Edit(id) => Some(id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Required {
    Always,
    OnCreate,
    No,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    Text,
    Email,
    /// Exactly ten digits.
    Mobile,
    /// Non-negative number.
    Amount,
    /// `YYYY-MM`.
    Month,
    Date,
    /// Comma-separated, no blank entries.
    List,
    /// Uploaded file with an accepted image type.
    Image,
}

impl FieldRule {
    fn check(&self, value: &str, label: &str) -> Option<String> {
        match self {
            FieldRule::Text | FieldRule::Image => None,
            FieldRule::Email if !EMAIL_REGEX.is_match(value) => {
                Some("Please enter a valid email address.".to_string())
            }
            FieldRule::Mobile if !MOBILE_REGEX.is_match(value) => {
                Some(format!("{} must be a 10-digit number.", label))
            }
            FieldRule::Amount => match value.parse::<f64>() {
                Ok(n) if n.is_finite() && n >= 0.0 => None,
                _ => Some(format!("{} must be a non-negative number.", label)),
            },
            FieldRule::Month if parse_pay_month(value).is_none() => {
                Some("Please pick a pay month (month & year).".to_string())
            }
            FieldRule::Date if parse_date(value).is_none() => {
                Some(format!("{} must be a valid date.", label))
            }
            FieldRule::List if split_list(value).iter().any(|item| item.is_empty()) => {
                Some(format!("{} must not contain blank entries.", label))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub required: Required,
    pub rule: FieldRule,
}

impl FieldSpec {
    pub const fn required(name: &'static str, label: &'static str, rule: FieldRule) -> Self {
        Self {
            name,
            label,
            required: Required::Always,
            rule,
        }
    }

    pub const fn on_create(name: &'static str, label: &'static str, rule: FieldRule) -> Self {
        Self {
            name,
            label,
            required: Required::OnCreate,
            rule,
        }
    }

    pub const fn optional(name: &'static str, label: &'static str, rule: FieldRule) -> Self {
        Self {
            name,
            label,
            required: Required::No,
            rule,
        }
    }

    fn is_required(&self, mode: &FormMode) -> bool {
        match self.required {
            Required::Always => true,
            Required::OnCreate => mode.is_create(),
            Required::No => false,
        }
    }
}

/// Checks every field against its rule. Blank optional fields are skipped.
pub fn validate_fields(fields: &[FieldSpec], draft: &FormDraft, mode: &FormMode) -> FieldErrors {
    let mut errors = FieldErrors::new();

    for field in fields {
        let required = field.is_required(mode);

        if field.rule == FieldRule::Image {
            match draft.file(field.name) {
                None if required => errors.insert(field.name, format!("{} is required.", field.label)),
                Some(file) if !file.is_image() => errors.insert(
                    field.name,
                    format!("{} must be a JPEG, PNG, GIF or WebP image.", field.label),
                ),
                _ => {}
            }
            continue;
        }

        let value = draft.get(field.name).trim();
        if value.is_empty() {
            if required {
                errors.insert(field.name, format!("{} is required.", field.label));
            }
            continue;
        }

        if let Some(message) = field.rule.check(value, field.label) {
            errors.insert(field.name, message);
        }
    }

    errors
}

pub type RecordOf<F> = <<F as FormSpec>::Resource as Resource>::Record;
pub type PayloadOf<F> = <<F as FormSpec>::Resource as Resource>::Payload;

/// Field rules and draft ↔ payload mapping for one resource's create/edit form.
pub trait FormSpec: Send + Sync {
    type Resource: Resource;

    fn fields(&self) -> &'static [FieldSpec];

    /// Edit-mode draft seeded from an existing record.
    fn draft_from(&self, record: &RecordOf<Self>) -> FormDraft;

    /// Only called on a draft that passed [`FormSpec::validate`].
    fn to_payload(&self, draft: &FormDraft) -> PayloadOf<Self>;

    fn validate_extra(&self, _draft: &FormDraft, _mode: &FormMode, _errors: &mut FieldErrors) {}

    fn validate(&self, draft: &FormDraft, mode: &FormMode) -> FieldErrors {
        let mut errors = validate_fields(self.fields(), draft, mode);
        self.validate_extra(draft, mode, &mut errors);
        errors
    }
}
