use crate::data::Store;
use crate::domain::user::{
    LoginRequest, SignupRequest, UpdateUserRequest, User, UserResponse,
};
use crate::domain::DomainError;
use crate::infrastructure::ids::IdGenerator;
use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct AuthService {
    store: Arc<dyn Store>,
    ids: Arc<IdGenerator>,
    write_lock: Arc<Mutex<()>>,
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, ids: Arc<IdGenerator>, write_lock: Arc<Mutex<()>>) -> Self {
        Self {
            store,
            ids,
            write_lock,
        }
    }

    pub async fn signup(&self, req: SignupRequest) -> Result<UserResponse, DomainError> {
        tracing::debug!("Signup requested for email: {}", req.email);

        if req.name.trim().is_empty() || req.email.trim().is_empty() || req.password.is_empty() {
            return Err(DomainError::ValidationError(
                "Missing required fields".to_string(),
            ));
        }

        // Цикл load-mutate-save целиком под глобальным замком
        let _guard = self.write_lock.lock().await;
        let mut db = self.store.load().await?;

        // Точное совпадение email, без нормализации регистра
        if db.users.iter().any(|u| u.email == req.email) {
            tracing::warn!("Signup failed: email already exists");
            return Err(DomainError::EmailAlreadyExists);
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(req.password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!("Password hashing failed: {}", e);
                DomainError::InternalError(format!("Password hashing failed: {}", e))
            })?
            .to_string();

        let user = User {
            id: self.ids.next_id(),
            name: req.name,
            email: req.email.clone(),
            password: password_hash,
            bio: "New user".to_string(),
            avatar: format!("https://i.pravatar.cc/150?u={}", req.email),
            followers: 0,
            following: 0,
            created_at: Utc::now(),
        };

        db.users.push(user.clone());
        self.store.save(&db).await?;

        tracing::info!("User registered: id={}, email={}", user.id, user.email);
        Ok(UserResponse::from(user))
    }

    pub async fn login(&self, req: LoginRequest) -> Result<UserResponse, DomainError> {
        tracing::debug!("Login requested for email: {}", req.email);

        let db = self.store.load().await?;

        let user = match db.users.into_iter().find(|u| u.email == req.email) {
            Some(u) => u,
            None => {
                tracing::warn!("Login failed: unknown email");
                return Err(DomainError::InvalidCredentials);
            }
        };

        let parsed_hash = PasswordHash::new(&user.password).map_err(|e| {
            tracing::error!("Invalid password hash format: {}", e);
            DomainError::InternalError(format!("Invalid password hash: {}", e))
        })?;

        if Argon2::default()
            .verify_password(req.password.as_bytes(), &parsed_hash)
            .is_err()
        {
            tracing::warn!("Login failed: invalid password for user {}", user.id);
            return Err(DomainError::InvalidCredentials);
        }

        tracing::info!("User logged in: id={}", user.id);
        Ok(UserResponse::from(user))
    }

    pub async fn get_user(&self, id: i64) -> Result<UserResponse, DomainError> {
        let db = self.store.load().await?;

        db.users
            .into_iter()
            .find(|u| u.id == id)
            .map(UserResponse::from)
            .ok_or(DomainError::UserNotFound)
    }

    /// Only name and bio are mutable; email, password, avatar and the
    /// follow counters are not touched by profile updates.
    pub async fn update_user(
        &self,
        id: i64,
        req: UpdateUserRequest,
    ) -> Result<UserResponse, DomainError> {
        let _guard = self.write_lock.lock().await;
        let mut db = self.store.load().await?;

        let user = db
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(DomainError::UserNotFound)?;

        if let Some(name) = req.name {
            user.name = name;
        }
        if let Some(bio) = req.bio {
            user.bio = bio;
        }
        let updated = user.clone();

        self.store.save(&db).await?;

        tracing::info!("User profile updated: id={}", id);
        Ok(UserResponse::from(updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::store::InMemoryStore;

    fn service() -> AuthService {
        AuthService::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(IdGenerator::new()),
            Arc::new(Mutex::new(())),
        )
    }

    fn signup_req(name: &str, email: &str, password: &str) -> SignupRequest {
        SignupRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn signup_then_login_round_trips() {
        let auth = service();

        let created = auth
            .signup(signup_req("Ada", "ada@x.com", "secret"))
            .await
            .unwrap();
        assert_eq!(created.bio, "New user");
        assert_eq!(created.followers, 0);

        let wrong = auth
            .login(LoginRequest {
                email: "ada@x.com".to_string(),
                password: "wrong".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(wrong, DomainError::InvalidCredentials));

        let logged_in = auth
            .login(LoginRequest {
                email: "ada@x.com".to_string(),
                password: "secret".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(logged_in.id, created.id);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_regardless_of_other_fields() {
        let auth = service();

        auth.signup(signup_req("Ada", "ada@x.com", "secret"))
            .await
            .unwrap();

        let err = auth
            .signup(signup_req("Someone Else", "ada@x.com", "different"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::EmailAlreadyExists));
    }

    #[tokio::test]
    async fn email_match_is_case_sensitive() {
        let auth = service();

        auth.signup(signup_req("Ada", "ada@x.com", "secret"))
            .await
            .unwrap();

        // Другой регистр — другой email
        auth.signup(signup_req("Ada", "ADA@x.com", "secret"))
            .await
            .unwrap();

        let err = auth
            .login(LoginRequest {
                email: "Ada@x.com".to_string(),
                password: "secret".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidCredentials));
    }

    #[tokio::test]
    async fn blank_fields_are_rejected() {
        let auth = service();

        let err = auth
            .signup(signup_req("", "ada@x.com", "secret"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));

        let err = auth
            .signup(signup_req("Ada", "ada@x.com", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));
    }

    #[tokio::test]
    async fn update_user_changes_only_name_and_bio() {
        let auth = service();

        let created = auth
            .signup(signup_req("Ada", "ada@x.com", "secret"))
            .await
            .unwrap();

        let updated = auth
            .update_user(
                created.id,
                UpdateUserRequest {
                    name: Some("Ada Lovelace".to_string()),
                    bio: Some("Analyst".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Ada Lovelace");
        assert_eq!(updated.bio, "Analyst");
        assert_eq!(updated.email, "ada@x.com");
        assert_eq!(updated.avatar, created.avatar);

        // Пароль не изменился
        auth.login(LoginRequest {
            email: "ada@x.com".to_string(),
            password: "secret".to_string(),
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let auth = service();

        let err = auth.get_user(42).await.unwrap_err();
        assert!(matches!(err, DomainError::UserNotFound));

        let err = auth
            .update_user(
                42,
                UpdateUserRequest {
                    name: None,
                    bio: Some("ghost".to_string()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::UserNotFound));
    }
}
