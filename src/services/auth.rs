use std::sync::Mutex;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::api::{ApiClient, RequestBody, accepted};
use crate::error::{ClientError, ClientResult};
use crate::forms::{EMAIL_REGEX, FieldErrors};
use crate::session::SessionContext;

#[derive(Debug, Clone, Serialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    #[serde(default)]
    otp_sent: bool,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// A one-time password went to `email`; finish with [`AuthService::verify_login_otp`].
    OtpSent { email: String },
    /// Signed in without a second step; carries where to go next.
    LoggedIn { target: String },
}

/// Email/password login with an OTP second step, plus the admin OTP gate.
pub struct AuthService {
    api: ApiClient,
    session: SessionContext,
    last_login: Mutex<Option<LoginInput>>,
}

impl AuthService {
    pub fn new(api: ApiClient, session: SessionContext) -> Self {
        Self {
            api,
            session,
            last_login: Mutex::new(None),
        }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub async fn login(&self, email: &str, password: &str) -> ClientResult<LoginOutcome> {
        let input = LoginInput {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        validate_login(&input)?;

        let body = self
            .api
            .request(
                Method::POST,
                "/login",
                Some(RequestBody::Json(serde_json::to_value(&input)?)),
            )
            .await
            .and_then(|body| accepted(body, "Login failed"))?;

        *self.last_login.lock().unwrap_or_else(|e| e.into_inner()) = Some(input.clone());

        let response: LoginResponse = serde_json::from_value(body).unwrap_or_default();
        if response.otp_sent {
            let email = response.email.unwrap_or(input.email);
            self.session.set_pending_email(&email)?;
            log::info!("OTP sent to {}", email);
            Ok(LoginOutcome::OtpSent { email })
        } else {
            let target = self.session.establish_user(&input.email)?;
            Ok(LoginOutcome::LoggedIn { target })
        }
    }

    /// Sends the last credentials again to get a fresh OTP.
    pub async fn resend_otp(&self) -> ClientResult<LoginOutcome> {
        let last = self
            .last_login
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        match last {
            Some(input) => self.login(&input.email, &input.password).await,
            None => Err(ClientError::Session(
                "No login in progress; sign in again.".to_string(),
            )),
        }
    }

    /// Exchanges the login OTP for a session. Returns the route to land on.
    pub async fn verify_login_otp(&self, email: Option<&str>, otp: &str) -> ClientResult<String> {
        let otp = otp.trim();
        if otp.is_empty() {
            return Err(ClientError::Validation(FieldErrors::single(
                "otp",
                "Please enter the OTP.",
            )));
        }

        let email = email
            .map(str::to_string)
            .or_else(|| self.session.pending_email())
            .ok_or_else(|| {
                ClientError::Validation(FieldErrors::single(
                    "email",
                    "Email is required to verify the OTP.",
                ))
            })?;

        self.api
            .request(
                Method::POST,
                "/admin/verify-otp",
                Some(RequestBody::Json(json!({ "email": email, "otp": otp }))),
            )
            .await
            .and_then(|body| accepted(body, "Invalid OTP"))?;

        self.last_login
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        self.session.establish_user(&email)
    }

    pub async fn send_admin_otp(&self) -> ClientResult<Option<String>> {
        self.session.require_user()?;
        let body = self
            .api
            .request(Method::POST, "/admin/send-otp", None)
            .await
            .and_then(|body| accepted(body, "Failed to send OTP"))?;
        log::info!("Admin OTP requested");
        Ok(message_of(&body))
    }

    pub async fn verify_admin_otp(&self, otp: &str) -> ClientResult<()> {
        self.session.require_user()?;
        let otp = otp.trim();
        if otp.is_empty() {
            return Err(ClientError::Validation(FieldErrors::single(
                "otp",
                "Please enter the OTP.",
            )));
        }

        self.api
            .request(
                Method::POST,
                "/admin/verify-otp",
                Some(RequestBody::Json(json!({ "otp": otp }))),
            )
            .await
            .and_then(|body| accepted(body, "Invalid OTP"))?;

        self.session.establish_admin()
    }

    pub fn logout(&self) -> ClientResult<()> {
        self.last_login
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        self.session.teardown()
    }
}

fn validate_login(input: &LoginInput) -> ClientResult<()> {
    let mut errors = FieldErrors::new();
    if input.email.is_empty() {
        errors.insert("email", "Email is required.");
    } else if !EMAIL_REGEX.is_match(&input.email) {
        errors.insert("email", "Please enter a valid email address.");
    }
    if input.password.is_empty() {
        errors.insert("password", "Password is required.");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ClientError::Validation(errors))
    }
}

pub(crate) fn message_of(body: &Value) -> Option<String> {
    body.get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
}
