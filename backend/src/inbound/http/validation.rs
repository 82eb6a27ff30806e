//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every helper produces an `invalid_request` error whose details carry the
//! offending `field` and a machine-readable `code`.

use std::collections::BTreeSet;

use serde_json::json;
use uuid::Uuid;

use crate::domain::{
    AttributeId, AttributeValidationError, Error, RecipeValidationError, UserValidationError,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidChoice,
    InvalidNumber,
    Blank,
    MaxLength,
    MinValue,
    MaxValue,
    MaxDecimalPlaces,
    Invalid,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidChoice => "invalid_choice",
            ErrorCode::InvalidNumber => "invalid_number",
            ErrorCode::Blank => "blank",
            ErrorCode::MaxLength => "max_length",
            ErrorCode::MinValue => "min_value",
            ErrorCode::MaxValue => "max_value",
            ErrorCode::MaxDecimalPlaces => "max_decimal_places",
            ErrorCode::Invalid => "invalid",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &'static str {
        self.0
    }
}

pub(crate) const NAME: FieldName = FieldName::new("name");
pub(crate) const EMAIL: FieldName = FieldName::new("email");
pub(crate) const PASSWORD: FieldName = FieldName::new("password");
pub(crate) const TITLE: FieldName = FieldName::new("title");
pub(crate) const TIME_MINUTES: FieldName = FieldName::new("time_minutes");
pub(crate) const COST: FieldName = FieldName::new("cost");
pub(crate) const LINK: FieldName = FieldName::new("link");
pub(crate) const TAGS: FieldName = FieldName::new("tags");
pub(crate) const INGREDIENTS: FieldName = FieldName::new("ingredients");
pub(crate) const ASSIGNED_ONLY: FieldName = FieldName::new("assigned_only");

/// Builder for validation errors with field context.
struct ValidationError {
    field: &'static str,
    message: String,
}

impl ValidationError {
    fn new(field: FieldName, message: impl Into<String>) -> Self {
        Self {
            field: field.as_str(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }

    fn with_index(self, code: ErrorCode, index: usize, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "index": index,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    ValidationError::new(field, format!("missing required field: {name}"))
        .with_code(ErrorCode::MissingField)
}

pub(crate) fn blank_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    ValidationError::new(field, format!("{name} must not be blank")).with_code(ErrorCode::Blank)
}

pub(crate) fn invalid_number_error(field: FieldName, value: &str) -> Error {
    let name = field.as_str();
    ValidationError::new(field, format!("{name} must be a number"))
        .with_value(ErrorCode::InvalidNumber, value)
}

pub(crate) fn min_value_error(field: FieldName, min: i64) -> Error {
    let name = field.as_str();
    ValidationError::new(field, format!("{name} must be at least {min}"))
        .with_code(ErrorCode::MinValue)
}

pub(crate) fn max_value_error(field: FieldName, max: impl std::fmt::Display) -> Error {
    let name = field.as_str();
    ValidationError::new(field, format!("{name} must be at most {max}"))
        .with_code(ErrorCode::MaxValue)
}

/// Parse a list of attribute ids, reporting the index of the first bad one.
pub(crate) fn parse_attribute_ids(
    values: Vec<String>,
    field: FieldName,
) -> Result<BTreeSet<AttributeId>, Error> {
    let name = field.as_str();
    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            Uuid::parse_str(&value)
                .map(AttributeId::from_uuid)
                .map_err(|_| {
                    ValidationError::new(field, format!("{name} must contain valid UUIDs"))
                        .with_index(ErrorCode::InvalidUuid, index, value)
                })
        })
        .collect()
}

/// Parse a boolean query flag. Absent means `false`.
pub(crate) fn parse_flag(value: Option<&str>, field: FieldName) -> Result<bool, Error> {
    let Some(raw) = value else {
        return Ok(false);
    };
    match raw.trim() {
        "1" => Ok(true),
        "0" => Ok(false),
        other if other.eq_ignore_ascii_case("true") => Ok(true),
        other if other.eq_ignore_ascii_case("false") => Ok(false),
        other => {
            let name = field.as_str();
            Err(
                ValidationError::new(field, format!("{name} must be one of 1, 0, true, false"))
                    .with_value(ErrorCode::InvalidChoice, other),
            )
        }
    }
}

pub(crate) fn attribute_name_error(err: AttributeValidationError) -> Error {
    let code = match err {
        AttributeValidationError::EmptyName => ErrorCode::Blank,
        AttributeValidationError::NameTooLong { .. } => ErrorCode::MaxLength,
    };
    ValidationError::new(NAME, err.to_string()).with_code(code)
}

pub(crate) fn user_field_error(err: UserValidationError) -> Error {
    let (field, code) = match err {
        UserValidationError::EmptyEmail => (EMAIL, ErrorCode::Blank),
        UserValidationError::EmailTooLong { .. } => (EMAIL, ErrorCode::MaxLength),
        UserValidationError::NameTooLong { .. } => (NAME, ErrorCode::MaxLength),
        UserValidationError::MalformedEmail | UserValidationError::InvalidId => {
            (EMAIL, ErrorCode::Invalid)
        }
    };
    ValidationError::new(field, err.to_string()).with_code(code)
}

pub(crate) fn recipe_field_error(err: RecipeValidationError) -> Error {
    let (field, code) = match err {
        RecipeValidationError::EmptyTitle => (TITLE, ErrorCode::Blank),
        RecipeValidationError::TitleTooLong { .. } => (TITLE, ErrorCode::MaxLength),
        RecipeValidationError::NegativeCost => (COST, ErrorCode::MinValue),
        RecipeValidationError::CostTooLarge { .. } => (COST, ErrorCode::MaxValue),
        RecipeValidationError::CostTooPrecise { .. } => (COST, ErrorCode::MaxDecimalPlaces),
        RecipeValidationError::LinkTooLong { .. } => (LINK, ErrorCode::MaxLength),
    };
    ValidationError::new(field, err.to_string()).with_code(code)
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;
    use serde_json::Value;

    fn detail<'a>(error: &'a Error, key: &str) -> Option<&'a Value> {
        error.details().and_then(|details| details.get(key))
    }

    #[rstest]
    #[case(None, false)]
    #[case(Some("1"), true)]
    #[case(Some("0"), false)]
    #[case(Some("true"), true)]
    #[case(Some("False"), false)]
    fn flag_accepts_numeric_and_word_forms(#[case] raw: Option<&str>, #[case] expected: bool) {
        assert_eq!(parse_flag(raw, ASSIGNED_ONLY).expect("valid flag"), expected);
    }

    #[rstest]
    #[case("yes")]
    #[case("2")]
    #[case("")]
    fn flag_rejects_other_values(#[case] raw: &str) {
        let error = parse_flag(Some(raw), ASSIGNED_ONLY).expect_err("invalid flag");

        assert_eq!(detail(&error, "field"), Some(&json!("assigned_only")));
        assert_eq!(detail(&error, "code"), Some(&json!("invalid_choice")));
    }

    #[rstest]
    fn attribute_ids_report_failing_index() {
        let ids = vec![Uuid::new_v4().to_string(), "nope".to_owned()];

        let error = parse_attribute_ids(ids, TAGS).expect_err("bad id");

        assert_eq!(detail(&error, "index"), Some(&json!(1)));
        assert_eq!(detail(&error, "value"), Some(&json!("nope")));
    }

    #[rstest]
    fn attribute_ids_deduplicate() {
        let id = Uuid::new_v4().to_string();

        let ids = parse_attribute_ids(vec![id.clone(), id], INGREDIENTS).expect("valid ids");

        assert_eq!(ids.len(), 1);
    }

    #[rstest]
    #[case(RecipeValidationError::EmptyTitle, "title", "blank")]
    #[case(RecipeValidationError::NegativeCost, "cost", "min_value")]
    #[case(RecipeValidationError::LinkTooLong { max: 255 }, "link", "max_length")]
    fn recipe_errors_name_their_field(
        #[case] err: RecipeValidationError,
        #[case] field: &str,
        #[case] code: &str,
    ) {
        let error = recipe_field_error(err);

        assert_eq!(detail(&error, "field"), Some(&json!(field)));
        assert_eq!(detail(&error, "code"), Some(&json!(code)));
    }
}
