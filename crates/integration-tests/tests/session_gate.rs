//! Session gate and mock authentication over file-backed storage.

#![allow(clippy::unwrap_used)]

use serde_json::json;

use keynest_core::CatalogId;
use keynest_integration_tests::{TestContext, secret, signed_in};
use keynest_storefront::error::GatedAction;
use keynest_storefront::notify::Notification;
use keynest_storefront::services::{SessionError, SignUp};
use keynest_storefront::store::keys;
use keynest_storefront::StorefrontError;

const EXPIRED_TOKEN: &str = r#"{"token":"mock-token-old","expiresAt":"2020-01-01T00:00:00Z"}"#;

#[test]
fn test_signed_out_cannot_add() {
    let ctx = TestContext::new();
    let (mut shop, notifier) = ctx.open();

    assert!(matches!(
        shop.add_to_cart(CatalogId::new(7)),
        Err(StorefrontError::SessionRequired(GatedAction::AddToCart))
    ));
    assert_eq!(
        notifier.last().unwrap(),
        Notification::error("Please sign in to add items to cart")
    );
    assert_eq!(ctx.read_json(keys::CART), json!([]));
}

#[test]
fn test_sign_in_persists_user_and_token() {
    let ctx = TestContext::new();
    let (_shop, _) = signed_in(&ctx);

    let user = ctx.read_json(keys::USER);
    assert_eq!(user["id"], json!(1));
    assert_eq!(user["name"], json!("Test User"));
    assert_eq!(user["email"], json!("test@example.com"));
    assert!(user.get("password").is_none());

    let token = ctx.read_json(keys::AUTH_TOKEN);
    assert!(token["token"].as_str().unwrap().starts_with("mock-token-"));
    assert!(token["expiresAt"].is_string());
}

#[test]
fn test_session_survives_reopen() {
    let ctx = TestContext::new();
    drop(signed_in(&ctx));

    let (mut shop, _) = ctx.open();
    assert_eq!(shop.signed_in_user().unwrap().name, "Test User");
    shop.add_to_cart(CatalogId::new(3)).unwrap();
}

#[test]
fn test_expired_token_blocks_and_signs_out() {
    let ctx = TestContext::new();
    let (mut shop, notifier) = signed_in(&ctx);
    ctx.write_raw(keys::AUTH_TOKEN, EXPIRED_TOKEN);

    assert!(matches!(
        shop.buy_now(CatalogId::new(7)),
        Err(StorefrontError::SessionRequired(GatedAction::Purchase))
    ));
    assert_eq!(
        notifier.last().unwrap().message,
        "Please sign in to make a purchase"
    );
    assert_eq!(ctx.read_raw(keys::USER), None);
    assert_eq!(ctx.read_raw(keys::AUTH_TOKEN), None);
    assert_eq!(ctx.read_json(keys::CART), json!([]));
}

#[test]
fn test_sign_up_password_mismatch() {
    let ctx = TestContext::new();
    let (mut shop, notifier) = ctx.open();

    let form = SignUp {
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
        password: secret("one"),
        confirm_password: secret("two"),
    };
    assert!(matches!(
        shop.sign_up(&form),
        Err(StorefrontError::Session(SessionError::PasswordMismatch))
    ));
    assert_eq!(
        notifier.last().unwrap(),
        Notification::error("Passwords do not match!")
    );
    assert_eq!(ctx.read_raw(keys::USER), None);
}

#[test]
fn test_sign_up_then_add() {
    let ctx = TestContext::new();
    let (mut shop, _) = ctx.open();

    let form = SignUp {
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
        password: secret("same"),
        confirm_password: secret("same"),
    };
    let user = shop.sign_up(&form).unwrap();
    assert_eq!(ctx.read_json(keys::USER)["name"], json!("Ada"));
    assert_eq!(shop.signed_in_user().unwrap(), user);

    shop.add_to_cart(CatalogId::new(3)).unwrap();
}

#[test]
fn test_sign_out_removes_session_and_cart() {
    let ctx = TestContext::new();
    let (mut shop, notifier) = signed_in(&ctx);
    shop.add_to_cart(CatalogId::new(7)).unwrap();

    shop.sign_out().unwrap();

    assert_eq!(
        notifier.last().unwrap(),
        Notification::success("Successfully signed out!")
    );
    assert_eq!(ctx.read_raw(keys::USER), None);
    assert_eq!(ctx.read_raw(keys::AUTH_TOKEN), None);
    assert_eq!(ctx.read_json(keys::CART), json!([]));
    assert!(shop.add_to_cart(CatalogId::new(7)).is_err());
}

#[tokio::test]
async fn test_forgot_password() {
    let ctx = TestContext::new();
    let (shop, notifier) = ctx.open();

    shop.request_password_reset("ada@example.com").await.unwrap();
    assert_eq!(
        notifier.last().unwrap(),
        Notification::success("Password reset link has been sent to your email!")
    );
}
