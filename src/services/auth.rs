// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::SqlitePool;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Claims, User, UserStatus},
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
    pool: SqlitePool,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String, pool: SqlitePool) -> Self {
        Self {
            user_repo,
            jwt_secret,
            pool,
        }
    }

    pub async fn register_user(
        &self,
        username: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<String, AppError> {
        // O hashing é pesado: roda fora do executor do tokio
        let password_clone = password.to_owned();
        let hashed_password =
            tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let new_user = self
            .user_repo
            .create_user(
                &self.pool,
                username,
                &hashed_password,
                display_name,
                "vendedor",
                false,
            )
            .await?;

        tracing::info!("👤 Usuário '{}' registrado.", new_user.username);
        self.create_token(new_user.id)
    }

    pub async fn login_user(&self, username: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        // Desligado ou excluído não entra; a mensagem é a mesma de senha
        // errada para não vazar a existência da conta.
        if user.status != UserStatus::Active {
            return Err(AppError::InvalidCredentials);
        }

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(user.id)
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        let user = self
            .user_repo
            .find_by_id(token_data.claims.sub)
            .await?
            .ok_or(AppError::UserNotFound)?;

        // Token antigo de usuário desativado não vale mais
        if user.status != UserStatus::Active {
            return Err(AppError::InvalidToken);
        }

        Ok(user)
    }

    /// Transfere a flag de super admin para outro usuário ativo.
    /// O detentor atual precisa confirmar a própria senha.
    pub async fn transfer_super_admin(
        &self,
        current: &User,
        target_user_id: i64,
        password: &str,
    ) -> Result<(), AppError> {
        if !current.is_super_admin {
            return Err(AppError::PermissionDenied(
                "Apenas o super admin pode transferir o acesso.".to_string(),
            ));
        }
        if target_user_id == current.id {
            return Err(AppError::InvalidOperation(
                "O acesso já pertence a este usuário.".to_string(),
            ));
        }

        // Confirmação de senha do detentor atual
        let password_clone = password.to_owned();
        let password_hash_clone = current.password_hash.clone();
        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        let target = self
            .user_repo
            .find_by_id(target_user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        if target.status != UserStatus::Active {
            return Err(AppError::InvalidOperation(
                "O destino da transferência precisa estar ativo.".to_string(),
            ));
        }

        // A flag sai de um e entra no outro na MESMA transação:
        // nunca pode existir um instante sem (ou com dois) super admins.
        let mut tx = self.pool.begin().await?;
        self.user_repo
            .set_super_admin(&mut *tx, current.id, false)
            .await?;
        self.user_repo
            .set_super_admin(&mut *tx, target.id, true)
            .await?;
        tx.commit().await?;

        tracing::info!(
            "🔑 Super admin transferido de '{}' para '{}'.",
            current.username,
            target.username
        );
        Ok(())
    }

    fn create_token(&self, user_id: i64) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    async fn setup_service() -> AuthService {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");
        AuthService::new(
            UserRepository::new(pool.clone()),
            "segredo-de-teste".to_string(),
            pool,
        )
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let service = setup_service().await;

        service
            .register_user("vendedor1", "senha123", Some("Vendedor Um"))
            .await
            .expect("Should register");

        let token = service
            .login_user("vendedor1", "senha123")
            .await
            .expect("Should login");

        let user = service
            .validate_token(&token)
            .await
            .expect("Token should be valid");
        assert_eq!(user.username, "vendedor1");
        assert!(!user.is_super_admin);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let service = setup_service().await;
        service
            .register_user("vendedor1", "senha123", None)
            .await
            .unwrap();

        let result = service.login_user("vendedor1", "senha-errada").await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let service = setup_service().await;
        service
            .register_user("vendedor1", "senha123", None)
            .await
            .unwrap();

        let result = service.register_user("vendedor1", "outrasenha", None).await;
        assert!(matches!(result, Err(AppError::UsernameAlreadyExists)));
    }

    #[tokio::test]
    async fn test_terminated_user_cannot_login() {
        let service = setup_service().await;
        let token = service
            .register_user("vendedor1", "senha123", None)
            .await
            .unwrap();
        let user = service.validate_token(&token).await.unwrap();

        service
            .user_repo
            .set_status(&service.pool, user.id, UserStatus::Terminated)
            .await
            .unwrap();

        let login = service.login_user("vendedor1", "senha123").await;
        assert!(matches!(login, Err(AppError::InvalidCredentials)));

        // O token antigo também morre junto
        let validate = service.validate_token(&token).await;
        assert!(matches!(validate, Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_super_admin_transfer() {
        let service = setup_service().await;

        // Monta o detentor atual na mão, com a flag ligada
        let hash_admin = bcrypt::hash("senha-admin", 4).unwrap();
        let admin = service
            .user_repo
            .create_user(&service.pool, "dono", &hash_admin, None, "admin", true)
            .await
            .unwrap();

        let token = service
            .register_user("sucessor", "senha123", None)
            .await
            .unwrap();
        let successor = service.validate_token(&token).await.unwrap();

        service
            .transfer_super_admin(&admin, successor.id, "senha-admin")
            .await
            .expect("Should transfer");

        let old_holder = service.user_repo.find_by_id(admin.id).await.unwrap().unwrap();
        let new_holder = service
            .user_repo
            .find_by_id(successor.id)
            .await
            .unwrap()
            .unwrap();
        assert!(!old_holder.is_super_admin);
        assert!(new_holder.is_super_admin);
    }

    #[tokio::test]
    async fn test_transfer_requires_correct_password() {
        let service = setup_service().await;

        let hash_admin = bcrypt::hash("senha-admin", 4).unwrap();
        let admin = service
            .user_repo
            .create_user(&service.pool, "dono", &hash_admin, None, "admin", true)
            .await
            .unwrap();
        let token = service
            .register_user("sucessor", "senha123", None)
            .await
            .unwrap();
        let successor = service.validate_token(&token).await.unwrap();

        let result = service
            .transfer_super_admin(&admin, successor.id, "senha-errada")
            .await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)));

        let unchanged = service.user_repo.find_by_id(admin.id).await.unwrap().unwrap();
        assert!(unchanged.is_super_admin);
    }

    #[tokio::test]
    async fn test_transfer_denied_for_regular_user() {
        let service = setup_service().await;

        let token = service
            .register_user("vendedor1", "senha123", None)
            .await
            .unwrap();
        let user = service.validate_token(&token).await.unwrap();

        let result = service.transfer_super_admin(&user, 999, "senha123").await;
        assert!(matches!(result, Err(AppError::PermissionDenied(_))));
    }
}
