//! Session commands.
//!
//! Passwords are wrapped in [`SecretString`] as soon as they are parsed and
//! never logged.

use secrecy::SecretString;
use tracing::info;

use keynest_storefront::Storefront;
use keynest_storefront::StorefrontError;
use keynest_storefront::services::SignUp;

/// Sign in as the mock user.
///
/// # Errors
///
/// Returns the storefront error for invalid input or storage faults.
pub fn sign_in(shop: &mut Storefront, email: &str, password: String) -> Result<(), StorefrontError> {
    let user = shop.sign_in(email, &SecretString::from(password))?;
    info!(user_id = %user.id, email = %user.email, "Signed in as {}", user.name);
    Ok(())
}

/// Register and sign in.
///
/// # Errors
///
/// Returns the storefront error for invalid input or storage faults.
pub fn sign_up(
    shop: &mut Storefront,
    name: String,
    email: String,
    password: String,
    confirm: String,
) -> Result<(), StorefrontError> {
    let form = SignUp {
        name,
        email,
        password: SecretString::from(password),
        confirm_password: SecretString::from(confirm),
    };
    let user = shop.sign_up(&form)?;
    info!(user_id = %user.id, email = %user.email, "Registered as {}", user.name);
    Ok(())
}

/// Sign out.
///
/// # Errors
///
/// Returns the storefront error if session state cannot be removed.
pub fn sign_out(shop: &mut Storefront) -> Result<(), StorefrontError> {
    shop.sign_out()
}

/// Report the current session.
pub fn status(shop: &Storefront) {
    let token = shop.session().check_session().ok();
    match (shop.signed_in_user(), token) {
        (Some(user), Some(token)) => info!(
            user_id = %user.id,
            email = %user.email,
            expires_at = %token.expires_at(),
            "Signed in as {}",
            user.name
        ),
        _ => info!("Not signed in"),
    }
}

/// Request a password reset link.
///
/// # Errors
///
/// Returns the storefront error if the email is malformed.
pub async fn forgot_password(shop: &Storefront, email: &str) -> Result<(), StorefrontError> {
    shop.request_password_reset(email).await
}
