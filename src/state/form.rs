//! Credential form state and validation.

use thiserror::Error;

use crate::client::StartRequest;

/// Raised when a required field is empty at submission time.
///
/// Validation is presence-only. Whether the credentials are actually valid
/// is the server's problem; the console only avoids pointless round-trips
/// for obviously-incomplete forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{0} is required")]
pub struct MissingField(pub &'static str);

/// Fields of the agent configuration form, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Username,
    Password,
    TargetAccount,
    ApiKey,
    VerificationCode,
}

impl FormField {
    /// All fields in display order.
    pub const ALL: [FormField; 5] = [
        FormField::Username,
        FormField::Password,
        FormField::TargetAccount,
        FormField::ApiKey,
        FormField::VerificationCode,
    ];

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            FormField::Username => "Username",
            FormField::Password => "Password",
            FormField::TargetAccount => "Target account",
            FormField::ApiKey => "API key",
            FormField::VerificationCode => "Verification code",
        }
    }

    /// Whether the field must be non-empty before submission.
    pub fn is_required(&self) -> bool {
        !matches!(self, FormField::VerificationCode)
    }

    /// Whether the field's value is rendered masked.
    pub fn is_secret(&self) -> bool {
        matches!(self, FormField::Password | FormField::ApiKey)
    }

    fn index(&self) -> usize {
        FormField::ALL.iter().position(|f| f == self).unwrap_or(0)
    }

    fn next(&self) -> FormField {
        FormField::ALL[(self.index() + 1) % FormField::ALL.len()]
    }

    fn prev(&self) -> FormField {
        let len = FormField::ALL.len();
        FormField::ALL[(self.index() + len - 1) % len]
    }
}

/// The agent configuration form.
///
/// Holds the field values plus the editing state of the control view:
/// which field has focus and whether keystrokes currently go into it.
#[derive(Debug, Clone, Default)]
pub struct AgentForm {
    pub username: String,
    pub password: String,
    pub target_account: String,
    pub api_key: String,
    pub verification_code: String,
    focus: FormField,
    editing: bool,
}

impl AgentForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// The field that currently has focus.
    pub fn focused(&self) -> FormField {
        self.focus
    }

    /// Whether keystrokes are currently routed into the focused field.
    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn begin_editing(&mut self) {
        self.editing = true;
    }

    pub fn end_editing(&mut self) {
        self.editing = false;
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    /// Append a character to the focused field.
    pub fn push_char(&mut self, c: char) {
        self.value_mut(self.focus).push(c);
    }

    /// Remove the last character of the focused field.
    pub fn pop_char(&mut self) {
        self.value_mut(self.focus).pop();
    }

    /// The raw value of a field.
    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Username => &self.username,
            FormField::Password => &self.password,
            FormField::TargetAccount => &self.target_account,
            FormField::ApiKey => &self.api_key,
            FormField::VerificationCode => &self.verification_code,
        }
    }

    fn value_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Username => &mut self.username,
            FormField::Password => &mut self.password,
            FormField::TargetAccount => &mut self.target_account,
            FormField::ApiKey => &mut self.api_key,
            FormField::VerificationCode => &mut self.verification_code,
        }
    }

    /// The value of a field as shown on screen (secrets masked).
    pub fn display_value(&self, field: FormField) -> String {
        let value = self.value(field);
        if field.is_secret() {
            "•".repeat(value.chars().count())
        } else {
            value.to_string()
        }
    }

    /// Validate the form and build the start payload.
    ///
    /// Fails on the first empty required field, in display order. An empty
    /// verification code becomes `None` on the wire.
    pub fn validate(&self) -> Result<StartRequest, MissingField> {
        for field in FormField::ALL {
            if field.is_required() && self.value(field).is_empty() {
                return Err(MissingField(field.label()));
            }
        }

        Ok(StartRequest {
            username: self.username.clone(),
            password: self.password.clone(),
            target_account: self.target_account.clone(),
            api_key: self.api_key.clone(),
            verification_code: if self.verification_code.is_empty() {
                None
            } else {
                Some(self.verification_code.clone())
            },
        })
    }
}
