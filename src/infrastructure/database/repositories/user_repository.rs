use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr,
    TransactionTrait,
};

use crate::domain::{
    normalize_email, AccountStore, DomainError, DomainResult, InfraError, NewUser, User,
};
use crate::infrastructure::database::entities::user;

/// SeaORM-backed account store
pub struct SeaOrmAccountStore {
    db: DatabaseConnection,
}

impl SeaOrmAccountStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn user_model_to_domain(model: user::Model) -> User {
    User {
        id: model.id,
        email: model.email,
        normalized_email: model.normalized_email,
        password_hash: model.password_hash,
        access_failed_count: model.access_failed_count,
        lockout_enabled: model.lockout_enabled,
        lockout_end: model.lockout_end,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

pub(crate) fn db_err(e: sea_orm::DbErr) -> DomainError {
    InfraError::Database(e).into()
}

pub(crate) fn is_unique_violation(e: &sea_orm::DbErr) -> bool {
    matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl AccountStore for SeaOrmAccountStore {
    async fn create_user(&self, new_user: NewUser) -> DomainResult<User> {
        let now = Utc::now();
        let model = user::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            normalized_email: Set(normalize_email(&new_user.email)),
            email: Set(new_user.email.clone()),
            password_hash: Set(new_user.password_hash),
            access_failed_count: Set(0),
            lockout_enabled: Set(new_user.lockout_enabled),
            lockout_end: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = model.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::DuplicateEmail(new_user.email.clone())
            } else {
                db_err(e)
            }
        })?;

        Ok(user_model_to_domain(inserted))
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::NormalizedEmail.eq(normalize_email(email)))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(model.map(user_model_to_domain))
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(model.map(user_model_to_domain))
    }

    async fn record_failed_access(&self, id: &str) -> DomainResult<i32> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let result = user::Entity::update_many()
            .col_expr(
                user::Column::AccessFailedCount,
                Expr::col(user::Column::AccessFailedCount).add(1),
            )
            .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(user::Column::Id.eq(id))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::UserNotFound(id.to_string()));
        }

        let model = user::Entity::find_by_id(id.to_string())
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::UserNotFound(id.to_string()))?;

        txn.commit().await.map_err(db_err)?;
        Ok(model.access_failed_count)
    }

    async fn lock_out(&self, id: &str, until: DateTime<Utc>) -> DomainResult<()> {
        let result = user::Entity::update_many()
            .col_expr(user::Column::LockoutEnd, Expr::value(Some(until)))
            .col_expr(user::Column::AccessFailedCount, Expr::value(0))
            .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(user::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::UserNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn reset_access_failed(&self, id: &str, now: DateTime<Utc>) -> DomainResult<()> {
        let model = user::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::UserNotFound(id.to_string()))?;

        let elapsed = model.lockout_end.is_some_and(|end| end <= now);

        let mut active: user::ActiveModel = model.into();
        active.access_failed_count = Set(0);
        if elapsed {
            active.lockout_end = Set(None);
        }
        active.updated_at = Set(Utc::now());
        active.update(&self.db).await.map_err(db_err)?;

        Ok(())
    }

    async fn update_password_hash(&self, id: &str, password_hash: &str) -> DomainResult<()> {
        let model = user::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::UserNotFound(id.to_string()))?;

        let mut active: user::ActiveModel = model.into();
        active.password_hash = Set(password_hash.to_string());
        active.updated_at = Set(Utc::now());
        active.update(&self.db).await.map_err(db_err)?;

        Ok(())
    }
}
