use uuid::Uuid;

use super::password::{hash_password, verify_password};
use crate::domain::errors::DomainError;
use crate::domain::ports::AccountRepository;
use crate::domain::user::UserProfile;

pub struct AccountService<R> {
    repo: R,
}

impl<R: AccountRepository> AccountService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
        address: &str,
    ) -> Result<UserProfile, DomainError> {
        let hash = hash_password(password)?;
        self.repo.insert(email, &hash, name, address)
    }

    /// Resolves to the user's profile, or `InvalidCredentials` for both an
    /// unknown email and a wrong password (indistinguishable to the caller).
    pub fn authenticate(&self, email: &str, password: &str) -> Result<UserProfile, DomainError> {
        let Some((profile, stored_hash)) = self.repo.find_by_email(email)? else {
            return Err(DomainError::InvalidCredentials);
        };
        if verify_password(&stored_hash, password)? {
            Ok(profile)
        } else {
            Err(DomainError::InvalidCredentials)
        }
    }

    pub fn update_profile(
        &self,
        user_id: Uuid,
        name: Option<String>,
        address: Option<String>,
    ) -> Result<UserProfile, DomainError> {
        self.repo.update_profile(user_id, name, address)
    }
}
