use std::sync::Arc;

use pretty_assertions::assert_eq;
use reqwest::Method;
use serde_json::json;
use tempfile::TempDir;

use hrpanel::error::ClientError;
use hrpanel::services::LoginOutcome;
use hrpanel::session::{FileSessionStore, Route, SessionContext, SessionStore};
use hrpanel::AppContext;

mod common;

use common::{FakeBackend, test_config};

struct TestApp {
    backend: Arc<FakeBackend>,
    ctx: AppContext,
    session_path: std::path::PathBuf,
    _dir: TempDir,
}

impl TestApp {
    fn new() -> Self {
        common::setup_test_env();
        let dir = TempDir::new().unwrap();
        let session_path = dir.path().join("session.json");
        let backend = FakeBackend::new();
        let session =
            SessionContext::new(Arc::new(FileSessionStore::new(&session_path))).unwrap();
        let ctx = AppContext::with_parts(test_config(), backend.client(), session);

        Self {
            backend,
            ctx,
            session_path,
            _dir: dir,
        }
    }

    /// A second process reading the same session file.
    fn reopen(&self) -> SessionContext {
        SessionContext::new(Arc::new(FileSessionStore::new(&self.session_path))).unwrap()
    }

    fn redirect_of(err: ClientError) -> Route {
        match err {
            ClientError::Unauthorized { redirect } => redirect,
            other => panic!("expected a redirect, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_login_with_otp_establishes_session() {
    let app = TestApp::new();
    app.backend.respond(
        Method::POST,
        "/login",
        json!({ "success": true, "otpSent": true, "email": "admin@example.com" }),
    );
    app.backend
        .respond(Method::POST, "/admin/verify-otp", json!({ "success": true }));

    let outcome = app
        .ctx
        .auth
        .login("admin@example.com", "s3cret")
        .await
        .unwrap();
    assert_eq!(
        outcome,
        LoginOutcome::OtpSent {
            email: "admin@example.com".to_string()
        }
    );
    assert!(!app.ctx.session.is_logged_in());
    assert_eq!(
        app.ctx.session.pending_email().as_deref(),
        Some("admin@example.com")
    );

    let target = app.ctx.auth.verify_login_otp(None, " 123456 ").await.unwrap();
    assert_eq!(target, "/");
    assert!(app.ctx.session.is_logged_in());

    let verify = app.backend.requests().pop().unwrap();
    assert_eq!(
        verify.body,
        Some(hrpanel::api::RequestBody::Json(
            json!({ "email": "admin@example.com", "otp": "123456" })
        ))
    );

    let reopened = app.reopen();
    assert!(reopened.is_logged_in());
    assert_eq!(reopened.email().as_deref(), Some("admin@example.com"));
    assert!(reopened.snapshot().established_at.is_some());
}

#[tokio::test]
async fn test_blank_otp_is_rejected_locally() {
    let app = TestApp::new();

    let err = app
        .ctx
        .auth
        .verify_login_otp(Some("admin@example.com"), "   ")
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Validation(_)));
    assert_eq!(err.user_message(), "Please enter the OTP.");
    assert_eq!(app.backend.request_count(), 0);
}

#[tokio::test]
async fn test_wrong_otp_keeps_user_signed_out() {
    let app = TestApp::new();
    app.backend.fail_next(
        Method::POST,
        "/admin/verify-otp",
        400,
        json!({ "message": "Invalid OTP" }),
    );

    let err = app
        .ctx
        .auth
        .verify_login_otp(Some("admin@example.com"), "000000")
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "Invalid OTP");
    assert!(!app.ctx.session.is_logged_in());
}

#[tokio::test]
async fn test_login_rejected_by_server() {
    let app = TestApp::new();
    app.backend.respond(
        Method::POST,
        "/login",
        json!({ "success": false, "message": "Invalid credentials" }),
    );

    let err = app
        .ctx
        .auth
        .login("admin@example.com", "wrong")
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "Invalid credentials");
    assert!(!app.ctx.session.is_logged_in());
}

#[tokio::test]
async fn test_admin_guard_walks_through_otp_step() {
    let app = TestApp::new();
    app.backend
        .respond(Method::POST, "/login", json!({ "success": true }));
    app.backend.respond(
        Method::POST,
        "/admin/send-otp",
        json!({ "success": true, "message": "OTP sent to admin email" }),
    );
    app.backend
        .respond(Method::POST, "/admin/verify-otp", json!({ "success": true }));

    assert_eq!(
        TestApp::redirect_of(app.ctx.session.require_admin().unwrap_err()),
        Route::Login
    );
    assert_eq!(
        TestApp::redirect_of(app.ctx.auth.send_admin_otp().await.unwrap_err()),
        Route::Login
    );
    assert_eq!(app.backend.request_count(), 0);

    app.ctx.session.remember_target("/admin").unwrap();
    let outcome = app.ctx.auth.login("admin@example.com", "s3cret").await.unwrap();
    assert_eq!(
        outcome,
        LoginOutcome::LoggedIn {
            target: "/admin".to_string()
        }
    );

    assert_eq!(
        TestApp::redirect_of(app.ctx.session.require_admin().unwrap_err()),
        Route::OtpVerify
    );

    let message = app.ctx.auth.send_admin_otp().await.unwrap();
    assert_eq!(message.as_deref(), Some("OTP sent to admin email"));

    app.ctx.auth.verify_admin_otp("424242").await.unwrap();
    assert!(app.ctx.session.require_admin().is_ok());
    assert!(app.reopen().is_admin());
}

#[tokio::test]
async fn test_logout_tears_down_persisted_session() {
    let app = TestApp::new();
    app.ctx.session.establish_user("admin@example.com").unwrap();
    app.ctx.session.establish_admin().unwrap();
    assert!(app.session_path.exists());

    app.ctx.auth.logout().unwrap();

    assert!(!app.ctx.session.is_logged_in());
    assert!(!app.session_path.exists());
    assert!(!app.reopen().is_logged_in());
}

#[tokio::test]
async fn test_resend_needs_a_previous_login() {
    let app = TestApp::new();
    app.backend.respond(
        Method::POST,
        "/login",
        json!({ "success": true, "otpSent": true }),
    );

    let err = app.ctx.auth.resend_otp().await.unwrap_err();
    assert!(matches!(err, ClientError::Session(_)));

    app.ctx.auth.login("hr@example.com", "pw").await.unwrap();
    let outcome = app.ctx.auth.resend_otp().await.unwrap();

    assert_eq!(
        outcome,
        LoginOutcome::OtpSent {
            email: "hr@example.com".to_string()
        }
    );
    assert_eq!(app.backend.targets(), vec!["POST /login", "POST /login"]);
}

#[test]
fn test_corrupt_session_file_reads_as_signed_out() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "{ not json").unwrap();

    let store = FileSessionStore::new(&path);
    let data = store.load().unwrap();

    assert!(!data.logged_in);
    assert!(!data.admin_verified);
}

#[test]
fn test_missing_session_file_reads_as_signed_out() {
    let dir = TempDir::new().unwrap();
    let store = FileSessionStore::new(dir.path().join("absent.json"));

    assert_eq!(store.load().unwrap(), Default::default());
    store.clear().unwrap();
}
