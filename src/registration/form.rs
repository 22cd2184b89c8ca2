use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;
use tracing::debug;

use super::validator::{can_submit, Field, RegistrationInput, ValidationError};

pub const SUBMIT_REJECTED_TITLE: &str = "Invalid Input";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Error)]
#[serde(tag = "type")]
pub enum SubmitRejected {
    #[error("Please fill in all fields correctly.")]
    InvalidInput,
}

impl SubmitRejected {
    pub fn title(self) -> &'static str {
        SUBMIT_REJECTED_TITLE
    }
}

/// 确认后的注册信息，提交后不可再修改。
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ConfirmedRegistration {
    name: String,
    email: String,
    phone: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SummaryRow {
    pub label: &'static str,
    pub value: String,
}

impl ConfirmedRegistration {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    /// 确认弹窗中逐行展示的内容。
    pub fn summary(&self) -> Vec<SummaryRow> {
        Field::ALL
            .iter()
            .map(|field| SummaryRow {
                label: field.label(),
                value: match field {
                    Field::Name => self.name.clone(),
                    Field::Email => self.email.clone(),
                    Field::Phone => self.phone.clone(),
                },
            })
            .collect()
    }

    /// "Go Back"：带着已填写的内容回到表单。
    pub fn go_back(self) -> RegistrationForm {
        RegistrationForm::prefilled(self)
    }

    /// "Continue"：把手机号交给猜数字游戏。
    pub fn continue_to_game(self) -> String {
        self.phone
    }
}

/// 注册表单状态，每次输入变化都会重新校验对应字段。
/// 序列化时错误只输出提示文案，供前端直接展示。
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationForm {
    input: RegistrationInput,
    not_robot: bool,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "error_message")]
    name_error: Option<ValidationError>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "error_message")]
    email_error: Option<ValidationError>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "error_message")]
    phone_error: Option<ValidationError>,
}

fn error_message<S: Serializer>(
    error: &Option<ValidationError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match error {
        Some(error) => serializer.collect_str(error),
        None => serializer.serialize_none(),
    }
}

impl RegistrationForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefilled(confirmed: ConfirmedRegistration) -> Self {
        let mut form = Self::new();
        form.set_field(Field::Name, confirmed.name);
        form.set_field(Field::Email, confirmed.email);
        form.set_field(Field::Phone, confirmed.phone);
        form
    }

    pub fn input(&self) -> &RegistrationInput {
        &self.input
    }

    pub fn not_robot(&self) -> bool {
        self.not_robot
    }

    pub fn set_name(&mut self, text: impl Into<String>) -> Option<ValidationError> {
        self.set_field(Field::Name, text)
    }

    pub fn set_email(&mut self, text: impl Into<String>) -> Option<ValidationError> {
        self.set_field(Field::Email, text)
    }

    pub fn set_phone(&mut self, text: impl Into<String>) -> Option<ValidationError> {
        self.set_field(Field::Phone, text)
    }

    pub fn set_field(&mut self, field: Field, text: impl Into<String>) -> Option<ValidationError> {
        let text = text.into();
        let error = field.validate(&text).err();
        *self.input.value_mut(field) = text;
        *self.error_slot(field) = error;
        error
    }

    pub fn set_not_robot(&mut self, checked: bool) {
        self.not_robot = checked;
    }

    pub fn field_error(&self, field: Field) -> Option<ValidationError> {
        match field {
            Field::Name => self.name_error,
            Field::Email => self.email_error,
            Field::Phone => self.phone_error,
        }
    }

    pub fn errors(&self) -> Vec<ValidationError> {
        Field::ALL
            .iter()
            .filter_map(|field| self.field_error(*field))
            .collect()
    }

    pub fn can_submit(&self) -> bool {
        can_submit(&self.input, self.not_robot)
    }

    pub fn submit(&self) -> Result<ConfirmedRegistration, SubmitRejected> {
        if !self.can_submit() {
            debug!(errors = ?self.errors(), not_robot = self.not_robot, "registration rejected");
            return Err(SubmitRejected::InvalidInput);
        }
        Ok(ConfirmedRegistration {
            name: self.input.name.clone(),
            email: self.input.email.clone(),
            phone: self.input.phone.clone(),
        })
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn error_slot(&mut self, field: Field) -> &mut Option<ValidationError> {
        match field {
            Field::Name => &mut self.name_error,
            Field::Email => &mut self.email_error,
            Field::Phone => &mut self.phone_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_form() -> RegistrationForm {
        let mut form = RegistrationForm::new();
        form.set_name("Ada");
        form.set_email("ada@example.com");
        form.set_phone("5551234562");
        form.set_not_robot(true);
        form
    }

    #[test]
    fn every_keystroke_revalidates_the_field() {
        let mut form = RegistrationForm::new();
        assert_eq!(form.set_name("A"), Some(ValidationError::NameTooShort));
        assert_eq!(form.field_error(Field::Name), Some(ValidationError::NameTooShort));
        assert_eq!(form.set_name("Ad"), None);
        assert_eq!(form.field_error(Field::Name), None);
        assert_eq!(form.set_name("Ad4"), Some(ValidationError::NameContainsDigit));
        assert_eq!(form.errors(), vec![ValidationError::NameContainsDigit]);
    }

    #[test]
    fn submit_hands_over_a_confirmed_registration() {
        let form = filled_form();
        let confirmed = form.submit().expect("valid form should submit");
        assert_eq!(confirmed.name(), "Ada");
        assert_eq!(confirmed.email(), "ada@example.com");

        let rows = confirmed.summary();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].label, "Phone");
        assert_eq!(rows[2].value, "5551234562");

        assert_eq!(confirmed.continue_to_game(), "5551234562");
    }

    #[test]
    fn submit_without_robot_flag_is_rejected() {
        let mut form = filled_form();
        form.set_not_robot(false);
        let rejected = form.submit().expect_err("robot flag is required");
        assert_eq!(rejected.title(), "Invalid Input");
        assert_eq!(rejected.to_string(), "Please fill in all fields correctly.");
    }

    #[test]
    fn submit_with_empty_or_invalid_field_is_rejected() {
        let mut form = filled_form();
        form.set_email("");
        assert_eq!(form.submit(), Err(SubmitRejected::InvalidInput));

        let mut form = filled_form();
        form.set_phone("5551234561");
        assert_eq!(form.submit(), Err(SubmitRejected::InvalidInput));
    }

    #[test]
    fn go_back_prefills_without_the_robot_flag() {
        let confirmed = filled_form().submit().expect("valid form should submit");
        let form = confirmed.go_back();
        assert_eq!(form.input().name, "Ada");
        assert_eq!(form.input().phone, "5551234562");
        assert!(form.errors().is_empty());
        assert!(!form.not_robot());
        assert!(!form.can_submit());
    }

    #[test]
    fn form_state_serializes_camel_case_messages() {
        let mut form = RegistrationForm::new();
        form.set_name("A");
        form.set_phone("5551234562");
        form.set_not_robot(true);

        let json = serde_json::to_value(&form).expect("form should serialize");
        assert_eq!(json["notRobot"], true);
        assert_eq!(json["nameError"], "Name must be more than 1 character");
        assert!(json.get("phoneError").is_none());
        assert!(json.get("not_robot").is_none());
        assert_eq!(json["input"]["phone"], "5551234562");
    }

    #[test]
    fn reset_clears_everything() {
        let mut form = filled_form();
        form.set_name("X");
        form.reset();
        assert_eq!(form, RegistrationForm::default());
    }
}
