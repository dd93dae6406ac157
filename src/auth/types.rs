use serde::Serialize;
use serde_json::Value;
use strum_macros::{Display, EnumIter, EnumString};

use crate::shared::AppError;
use crate::validation::{FromBody, Validator};

/// Why a one-time token was issued
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, EnumIter)]
pub enum TokenPurpose {
    PasswordReset,
    #[strum(to_string = "EmailVerify", serialize = "EmailVerification")]
    EmailVerify,
}

impl TokenPurpose {
    /// Name the backend uses for this purpose
    pub fn backend_name(&self) -> &'static str {
        match self {
            TokenPurpose::PasswordReset => "PasswordReset",
            TokenPurpose::EmailVerify => "EmailVerification",
        }
    }
}

impl Serialize for TokenPurpose {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.backend_name())
    }
}

fn email_field(validator: &mut Validator, body: &Value) -> Option<String> {
    let email = validator.required_str(body, "", "Email", "Email is required")?;
    validator.non_empty("Email", &email, "Email is required");
    validator.email("Email", &email, "Invalid email");
    Some(email)
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl FromBody for LoginRequest {
    fn from_body(body: &Value) -> Result<Self, AppError> {
        let mut v = Validator::new();
        let email = email_field(&mut v, body);
        let password = v.required_str(body, "", "Password", "Password is required");
        if let Some(password) = &password {
            v.non_empty("Password", password, "Password is required");
        }
        v.finish()?;

        Ok(Self {
            email: email.unwrap_or_default(),
            password: password.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl FromBody for SignupRequest {
    fn from_body(body: &Value) -> Result<Self, AppError> {
        let mut v = Validator::new();
        let name = v.required_str(body, "", "Name", "Name is required");
        if let Some(name) = &name {
            v.non_empty("Name", name, "Name is required");
        }
        let email = email_field(&mut v, body);
        let password = v.required_str(body, "", "Password", "Password is required");
        if let Some(password) = &password {
            v.password_strength("Password", password);
        }
        v.finish()?;

        Ok(Self {
            name: name.unwrap_or_default(),
            email: email.unwrap_or_default(),
            password: password.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EmailVerifyRequest {
    pub token: String,
}

impl FromBody for EmailVerifyRequest {
    fn from_body(body: &Value) -> Result<Self, AppError> {
        let mut v = Validator::new();
        let token = v.required_str(body, "", "Token", "Token is required");
        v.finish()?;

        Ok(Self {
            token: token.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TokenVerifyRequest {
    pub token: String,
    pub purpose: TokenPurpose,
}

impl FromBody for TokenVerifyRequest {
    fn from_body(body: &Value) -> Result<Self, AppError> {
        let mut v = Validator::new();
        let token = v.required_str(body, "", "Token", "Token is required");
        let purpose = v.one_of::<TokenPurpose>(body, "", "Purpose");
        v.finish()?;

        match (token, purpose) {
            (Some(token), Some(purpose)) => Ok(Self { token, purpose }),
            _ => Err(AppError::Internal),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ForgotPasswordRequest {
    pub email: String,
}

impl FromBody for ForgotPasswordRequest {
    fn from_body(body: &Value) -> Result<Self, AppError> {
        let mut v = Validator::new();
        let email = v.required_str(body, "", "Email", "Required");
        if let Some(email) = &email {
            v.email("Email", email, "Invalid email");
        }
        v.finish()?;

        Ok(Self {
            email: email.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

impl FromBody for ResetPasswordRequest {
    fn from_body(body: &Value) -> Result<Self, AppError> {
        let mut v = Validator::new();
        let token = v.required_str(body, "", "Token", "Token is required");
        let password = v.required_str(body, "", "Password", "Password is required");
        if let Some(password) = &password {
            v.password_strength("Password", password);
        }
        v.finish()?;

        Ok(Self {
            token: token.unwrap_or_default(),
            password: password.unwrap_or_default(),
        })
    }
}
