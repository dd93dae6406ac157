//! Test assertion helpers - fluent API for verifying gateway responses
#![allow(dead_code)] // Test utilities may not all be used in every test

use axum::http::{
    header::{LOCATION, SET_COOKIE},
    StatusCode,
};

use super::actions::TestResponse;

// ============================================================================
// Assertion Helpers
// ============================================================================

pub struct ResponseAssertion<'a> {
    response: &'a TestResponse,
}

impl<'a> ResponseAssertion<'a> {
    pub fn for_response(response: &'a TestResponse) -> Self {
        Self { response }
    }

    pub fn has_status(self, expected: StatusCode) -> Self {
        assert_eq!(
            self.response.status, expected,
            "unexpected status, body: {}",
            self.response.body
        );
        self
    }

    /// Asserts an `{"error": ...}` body containing `fragment`
    pub fn has_error_containing(self, fragment: &str) -> Self {
        let error = self.response.body["error"]
            .as_str()
            .unwrap_or_else(|| panic!("expected an error body, got {}", self.response.body));
        assert!(
            error.contains(fragment),
            "error '{}' should contain '{}'",
            error,
            fragment
        );
        self
    }

    pub fn is_unauthenticated(self, message: &str) -> Self {
        let this = self.has_status(StatusCode::UNAUTHORIZED);
        assert_eq!(this.response.body["status"], "error");
        assert_eq!(this.response.body["message"], message);
        this
    }

    pub fn sets_no_cookies(self) -> Self {
        assert!(
            self.response.headers.get(SET_COOKIE).is_none(),
            "no cookie should have been set"
        );
        self
    }

    /// Returns the raw `Set-Cookie` line for `name`
    pub fn set_cookie(&self, name: &str) -> String {
        self.response
            .headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find(|value| value.starts_with(&format!("{}=", name)))
            .unwrap_or_else(|| panic!("cookie {} was not set", name))
            .to_string()
    }

    /// Value of cookie `name` from its `Set-Cookie` line
    pub fn cookie_value(&self, name: &str) -> String {
        let line = self.set_cookie(name);
        line.split(';')
            .next()
            .and_then(|pair| pair.split_once('='))
            .map(|(_, value)| value.to_string())
            .unwrap_or_default()
    }

    pub fn redirects_to(self, location: &str) -> Self {
        let this = self.has_status(StatusCode::SEE_OTHER);
        assert_eq!(this.response.headers[LOCATION], location);
        this
    }

    pub fn redirects_to_login(self) -> Self {
        let this = self.has_status(StatusCode::SEE_OTHER);
        let location = this.response.headers[LOCATION].to_str().unwrap();
        assert!(
            location.starts_with("/auth/login"),
            "expected a login redirect, got {}",
            location
        );
        this
    }
}
