//! Login and registration forms.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use crate::error::ClientError;
use crate::net::api::ApiClient;
use crate::util::route::Route;

/// Message for a failed submit: the backend's own words when it gave any.
fn failure_message(err: &ClientError, fallback: &str) -> String {
    match err {
        ClientError::Auth(message)
        | ClientError::Validation(message)
        | ClientError::Status { message: Some(message), .. }
            if !message.is_empty() =>
        {
            message.clone()
        }
        _ => fallback.to_owned(),
    }
}

#[derive(Clone, Debug, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub submitting: bool,
    pub error: Option<String>,
}

impl LoginForm {
    /// Log in with the form values. Returns the route to show on success.
    pub async fn submit(&mut self, api: &ApiClient) -> Option<Route> {
        let username = self.username.trim().to_owned();
        if username.is_empty() || self.password.is_empty() {
            self.error = Some("Username and password are required".into());
            return None;
        }
        self.error = None;
        self.submitting = true;
        let result = api.login(&username, &self.password).await;
        self.submitting = false;
        match result {
            Ok(_) => {
                self.password.clear();
                Some(Route::Home)
            }
            Err(err) => {
                self.error = Some(failure_message(&err, "Login failed"));
                None
            }
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct RegisterForm {
    pub email: String,
    pub username: String,
    pub password: String,
    pub submitting: bool,
    pub error: Option<String>,
}

impl RegisterForm {
    /// Create the account and sign in. Returns the route to show on success.
    pub async fn submit(&mut self, api: &ApiClient) -> Option<Route> {
        let email = self.email.trim().to_owned();
        let username = self.username.trim().to_owned();
        if email.is_empty() || username.is_empty() || self.password.is_empty() {
            self.error = Some("Email, username and password are required".into());
            return None;
        }
        self.error = None;
        self.submitting = true;
        let result = api.register(&email, &username, &self.password).await;
        self.submitting = false;
        match result {
            Ok(_) => {
                self.password.clear();
                Some(Route::Home)
            }
            Err(err) => {
                self.error = Some(failure_message(&err, "Registration failed"));
                None
            }
        }
    }
}
