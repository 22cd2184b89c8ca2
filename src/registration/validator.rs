use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const PHONE_LENGTH: usize = 10;

static EMAIL_PATTERN: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Email,
    Phone,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Name, Field::Email, Field::Phone];

    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Email => "Email",
            Field::Phone => "Phone",
        }
    }

    pub fn validate(self, value: &str) -> Result<(), ValidationError> {
        match self {
            Field::Name => validate_name(value),
            Field::Email => validate_email(value),
            Field::Phone => validate_phone(value),
        }
    }
}

/// 单个字段的校验失败原因。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Error)]
#[serde(tag = "type")]
pub enum ValidationError {
    #[error("Name must be more than 1 character")]
    NameTooShort,
    #[error("Name cannot contain numbers")]
    NameContainsDigit,
    #[error("Please enter a valid email address")]
    InvalidEmailFormat,
    #[error("Please enter a valid 10-digit phone number (last digit cannot be 0 or 1)")]
    InvalidPhoneFormat,
}

impl ValidationError {
    pub fn field(self) -> Field {
        match self {
            ValidationError::NameTooShort | ValidationError::NameContainsDigit => Field::Name,
            ValidationError::InvalidEmailFormat => Field::Email,
            ValidationError::InvalidPhoneFormat => Field::Phone,
        }
    }
}

/// 长度按 UTF-16 码元计算，与前端输入框的 `length` 一致。
pub fn validate_name(value: &str) -> Result<(), ValidationError> {
    if value.encode_utf16().count() <= 1 {
        return Err(ValidationError::NameTooShort);
    }
    if value.chars().any(|ch| ch.is_ascii_digit()) {
        return Err(ValidationError::NameContainsDigit);
    }
    Ok(())
}

pub fn validate_email(value: &str) -> Result<(), ValidationError> {
    let matched = EMAIL_PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(value));
    if !matched {
        return Err(ValidationError::InvalidEmailFormat);
    }
    Ok(())
}

pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    let bytes = value.as_bytes();
    if bytes.len() != PHONE_LENGTH || !bytes.iter().all(u8::is_ascii_digit) {
        return Err(ValidationError::InvalidPhoneFormat);
    }
    if matches!(bytes[PHONE_LENGTH - 1], b'0' | b'1') {
        return Err(ValidationError::InvalidPhoneFormat);
    }
    Ok(())
}

/// 表单当前输入，字段均为用户原始文本。
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistrationInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

impl RegistrationInput {
    pub fn new(name: impl Into<String>, email: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }

    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Phone => &self.phone,
        }
    }

    pub fn value_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Name => &mut self.name,
            Field::Email => &mut self.email,
            Field::Phone => &mut self.phone,
        }
    }

    pub fn errors(&self) -> Vec<ValidationError> {
        Field::ALL
            .iter()
            .filter_map(|field| field.validate(self.value(*field)).err())
            .collect()
    }
}

pub fn can_submit(input: &RegistrationInput, not_robot: bool) -> bool {
    not_robot
        && Field::ALL.iter().all(|field| {
            let value = input.value(*field);
            !value.is_empty() && field.validate(value).is_ok()
        })
}
