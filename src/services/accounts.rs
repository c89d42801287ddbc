use serde::Deserialize;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::database::models::{Owner, User};
use crate::database::Repository;
use crate::error::ApiError;
use crate::services::required;

#[derive(Debug, Default, Deserialize)]
pub struct SignupRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub phone: Option<String>,
    pub password: Option<String>,
}

/// Phone and password, both present and non-blank
struct Credentials<'a> {
    phone: &'a str,
    password: &'a str,
}

fn credentials<'a>(
    phone: Option<&'a str>,
    password: Option<&'a str>,
    extra_missing: &[&'static str],
) -> Result<Credentials<'a>, ApiError> {
    let phone = required(phone);
    // passwords are compared as sent, so only blank ones count as missing
    let password = password.filter(|p| !p.trim().is_empty());

    let mut missing: Vec<&str> = extra_missing.to_vec();
    if phone.is_none() {
        missing.push("phone");
    }
    if password.is_none() {
        missing.push("password");
    }

    match (phone, password) {
        (Some(phone), Some(password)) if missing.is_empty() => Ok(Credentials { phone, password }),
        _ => Err(ApiError::missing_fields(&missing)),
    }
}

/// Signup and login for shoppers and shop owners. Passwords are compared in
/// plaintext and no session is created; a successful login returns the account.
pub struct AccountService {
    users: Repository<User>,
    owners: Repository<Owner>,
}

impl AccountService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: Repository::new(pool.clone()),
            owners: Repository::new(pool),
        }
    }

    pub async fn signup_user(&self, request: SignupRequest) -> Result<User, ApiError> {
        let name = required(request.name.as_deref());
        let extra: &[&'static str] = if name.is_none() { &["name"] } else { &[] };
        let creds = credentials(request.phone.as_deref(), request.password.as_deref(), extra)?;
        let name = name.ok_or_else(|| ApiError::missing_fields(&["name"]))?;

        if self.users.find_by_phone(creds.phone).await?.is_some() {
            warn!(phone = %creds.phone, "User signup rejected: phone already registered");
            return Err(ApiError::bad_request("User already exists"));
        }

        let user = self.users.insert(name, creds.phone, creds.password).await?;
        info!(user_id = %user.id, phone = %user.phone, "User signed up");
        Ok(user)
    }

    pub async fn login_user(&self, request: LoginRequest) -> Result<User, ApiError> {
        let creds = credentials(request.phone.as_deref(), request.password.as_deref(), &[])?;

        let user = self.users.find_by_phone(creds.phone).await?.ok_or_else(|| {
            warn!(phone = %creds.phone, "User login failed: unknown phone");
            ApiError::not_found("User not found")
        })?;

        if user.password != creds.password {
            warn!(phone = %creds.phone, "User login failed: wrong password");
            return Err(ApiError::unauthorized("Invalid credentials"));
        }

        info!(user_id = %user.id, "User logged in");
        Ok(user)
    }

    pub async fn signup_owner(&self, request: SignupRequest) -> Result<Owner, ApiError> {
        let creds = credentials(request.phone.as_deref(), request.password.as_deref(), &[])?;

        if self.owners.find_by_phone(creds.phone).await?.is_some() {
            warn!(phone = %creds.phone, "Owner signup rejected: phone already registered");
            return Err(ApiError::bad_request("Owner already exists"));
        }

        let owner = self.owners.insert(creds.phone, creds.password).await?;
        info!(owner_id = %owner.id, phone = %owner.phone, "Owner signed up");
        Ok(owner)
    }

    pub async fn login_owner(&self, request: LoginRequest) -> Result<Owner, ApiError> {
        let creds = credentials(request.phone.as_deref(), request.password.as_deref(), &[])?;

        let owner = self.owners.find_by_phone(creds.phone).await?.ok_or_else(|| {
            warn!(phone = %creds.phone, "Owner login failed: unknown phone");
            ApiError::not_found("Owner not found")
        })?;

        if owner.password != creds.password {
            warn!(phone = %creds.phone, "Owner login failed: wrong password");
            return Err(ApiError::unauthorized("Invalid credentials"));
        }

        info!(owner_id = %owner.id, "Owner logged in");
        Ok(owner)
    }
}
