//! 注册表单逻辑（字段校验、表单状态、确认信息）。

pub mod form;
pub mod validator;

pub use form::{ConfirmedRegistration, RegistrationForm, SubmitRejected, SummaryRow};
pub use validator::{
    can_submit, validate_email, validate_name, validate_phone, Field, RegistrationInput,
    ValidationError,
};
