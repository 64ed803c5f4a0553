//! Credential store and session issuing: signup, signin, profile, reset.

use serde::{Deserialize, Serialize};

use crate::constants::{ERR_EMAIL_PASSWORD_REQUIRED, ERR_EMAIL_REQUIRED, MSG_RESET_PASSWORD};
use crate::db::{Db, UserStore};
use crate::error::{AppError, Result};
use crate::models::{NewUser, ProfileUpdate, UserProfile};
use crate::security::{email_fingerprint, hash_password, verify_password, Claims, SessionIssuer};

#[derive(Debug, Default, Deserialize)]
pub struct SignUpRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SignInRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: Option<String>,
}

/// Token plus the profile it was issued for
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Clone)]
pub struct Accounts {
    db: Db,
    sessions: SessionIssuer,
    bcrypt_cost: u32,
}

/// Returns the value when it is present and not blank
fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Accounts {
    pub fn new(db: Db, sessions: SessionIssuer, bcrypt_cost: u32) -> Self {
        Self {
            db,
            sessions,
            bcrypt_cost,
        }
    }

    /// Register a new account and sign it in.
    ///
    /// Emails are compared exactly as stored. A duplicate yields
    /// `UserAlreadyExists`, including when two signups race on the unique index.
    pub async fn sign_up(&self, request: SignUpRequest) -> Result<AuthSession> {
        let (Some(email), Some(password)) =
            (required(request.email), required(request.password))
        else {
            return Err(AppError::validation(ERR_EMAIL_PASSWORD_REQUIRED));
        };
        let fingerprint = email_fingerprint(&email);

        if self.db.find_user_by_email(&email).await?.is_some() {
            tracing::warn!(email = %fingerprint, "Signup rejected: email already registered");
            return Err(AppError::UserAlreadyExists);
        }

        let password_hash = hash_password(&password, self.bcrypt_cost).await?;

        let user = self
            .db
            .insert_user(NewUser {
                email,
                password_hash,
                first_name: request.first_name,
                last_name: request.last_name,
                company: request.company,
            })
            .await?;

        let token = self.sessions.issue(user.id, &user.email)?;
        tracing::info!(user_id = user.id, email = %fingerprint, "User signed up");

        Ok(AuthSession {
            token,
            user: user.into(),
        })
    }

    /// Authenticate with email and password.
    ///
    /// Unknown email and wrong password produce the same `InvalidCredentials`.
    pub async fn sign_in(&self, request: SignInRequest) -> Result<AuthSession> {
        let (Some(email), Some(password)) =
            (required(request.email), required(request.password))
        else {
            return Err(AppError::validation(ERR_EMAIL_PASSWORD_REQUIRED));
        };
        let fingerprint = email_fingerprint(&email);

        let Some(user) = self.db.find_user_by_email(&email).await? else {
            tracing::warn!(email = %fingerprint, "Signin failed: unknown email");
            return Err(AppError::InvalidCredentials);
        };

        if !verify_password(&password, &user.password_hash).await? {
            tracing::warn!(user_id = user.id, "Signin failed: wrong password");
            return Err(AppError::InvalidCredentials);
        }

        let token = self.sessions.issue(user.id, &user.email)?;
        tracing::info!(user_id = user.id, "User signed in");

        Ok(AuthSession {
            token,
            user: user.into(),
        })
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        self.sessions.verify(token)
    }

    /// Acknowledge a reset request without revealing whether the account exists.
    ///
    /// No message is delivered; the request is only recorded in the logs.
    pub async fn reset_password(&self, request: ResetPasswordRequest) -> Result<&'static str> {
        let Some(email) = required(request.email) else {
            return Err(AppError::validation(ERR_EMAIL_REQUIRED));
        };
        let fingerprint = email_fingerprint(&email);

        match self.db.find_user_by_email(&email).await? {
            Some(user) => {
                tracing::info!(user_id = user.id, "Password reset requested");
            }
            None => {
                tracing::info!(email = %fingerprint, "Password reset requested for unknown email");
            }
        }

        Ok(MSG_RESET_PASSWORD)
    }

    pub async fn profile(&self, user_id: i64) -> Result<UserProfile> {
        self.db
            .find_user_by_id(user_id)
            .await?
            .map(UserProfile::from)
            .ok_or(AppError::NotFound("User not found"))
    }

    pub async fn update_profile(
        &self,
        user_id: i64,
        update: &ProfileUpdate,
    ) -> Result<UserProfile> {
        let user = self
            .db
            .update_profile(user_id, update)
            .await?
            .ok_or(AppError::NotFound("User not found"))?;

        tracing::info!(user_id, "Profile updated");
        Ok(user.into())
    }
}
