// Public API - what other modules can use
pub use handlers::{forgot_password, reset_password, signup, verify_email, verify_token};
pub use types::{
    EmailVerifyRequest, ForgotPasswordRequest, LoginRequest, ResetPasswordRequest, SignupRequest,
    TokenPurpose, TokenVerifyRequest,
};

// Internal modules
mod handlers;
mod types;
