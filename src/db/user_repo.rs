// src/db/user_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{NewProfile, UserProfile},
};

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Perfil ativo de um usuário do provedor de sessão
    async fn find_active_by_user_id(&self, user_id: Uuid) -> Result<Option<UserProfile>, AppError>;

    /// Qualquer perfil (ativo ou não), usado só no onboarding
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<UserProfile>, AppError>;

    /// Perfil ativo dentro de uma empresa (validação de responsável)
    async fn find_active_in_company(
        &self,
        company_id: Uuid,
        profile_id: Uuid,
    ) -> Result<Option<UserProfile>, AppError>;

    async fn create(&self, profile: NewProfile) -> Result<UserProfile, AppError>;
}

// O repositório de perfis, responsável pela tabela 'user_profiles'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for UserRepository {
    async fn find_active_by_user_id(&self, user_id: Uuid) -> Result<Option<UserProfile>, AppError> {
        let profile = sqlx::query_as::<_, UserProfile>(
            "SELECT * FROM user_profiles WHERE user_id = $1 AND is_active = true",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<UserProfile>, AppError> {
        let profile = sqlx::query_as::<_, UserProfile>("SELECT * FROM user_profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(profile)
    }

    async fn find_active_in_company(
        &self,
        company_id: Uuid,
        profile_id: Uuid,
    ) -> Result<Option<UserProfile>, AppError> {
        let profile = sqlx::query_as::<_, UserProfile>(
            "SELECT * FROM user_profiles WHERE id = $1 AND company_id = $2 AND is_active = true",
        )
        .bind(profile_id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn create(&self, profile: NewProfile) -> Result<UserProfile, AppError> {
        sqlx::query_as::<_, UserProfile>(
            r#"
            INSERT INTO user_profiles (user_id, company_id, email, first_name, last_name, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(profile.user_id)
        .bind(profile.company_id)
        .bind(&profile.email)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(profile.role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // Dois callbacks simultâneos do mesmo usuário: o segundo perde.
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::invalid("userId", "Perfil já existe para este usuário.");
                }
            }
            e.into()
        })
    }
}
