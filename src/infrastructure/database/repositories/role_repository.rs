use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Set,
};

use super::user_repository::{db_err, is_unique_violation};
use crate::domain::{
    normalize_role_name, AssignOutcome, DomainError, DomainResult, Role, RoleStore,
};
use crate::infrastructure::database::entities::{role, user, user_role};

/// SeaORM-backed role and membership store
pub struct SeaOrmRoleStore {
    db: DatabaseConnection,
}

impl SeaOrmRoleStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_role_model(&self, name: &str) -> DomainResult<Option<role::Model>> {
        role::Entity::find()
            .filter(role::Column::NormalizedName.eq(normalize_role_name(name)))
            .one(&self.db)
            .await
            .map_err(db_err)
    }
}

fn role_model_to_domain(model: role::Model) -> Role {
    Role {
        id: model.id,
        name: model.name,
        normalized_name: model.normalized_name,
        created_at: model.created_at,
    }
}

#[async_trait]
impl RoleStore for SeaOrmRoleStore {
    async fn create_role(&self, name: &str) -> DomainResult<Role> {
        let model = role::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            name: Set(name.to_string()),
            normalized_name: Set(normalize_role_name(name)),
            created_at: Set(Utc::now()),
        };

        let inserted = model.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::DuplicateRole(name.to_string())
            } else {
                db_err(e)
            }
        })?;

        Ok(role_model_to_domain(inserted))
    }

    async fn role_exists(&self, name: &str) -> DomainResult<bool> {
        Ok(self.find_role_model(name).await?.is_some())
    }

    async fn find_role_by_name(&self, name: &str) -> DomainResult<Option<Role>> {
        Ok(self.find_role_model(name).await?.map(role_model_to_domain))
    }

    async fn assign_role(&self, user_id: &str, role_name: &str) -> DomainResult<AssignOutcome> {
        let user_exists = user::Entity::find_by_id(user_id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .is_some();
        if !user_exists {
            return Err(DomainError::UserNotFound(user_id.to_string()));
        }

        let role = self
            .find_role_model(role_name)
            .await?
            .ok_or_else(|| DomainError::RoleNotFound(role_name.to_string()))?;

        let existing = user_role::Entity::find_by_id((user_id.to_string(), role.id.clone()))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        if existing.is_some() {
            return Ok(AssignOutcome::AlreadyMember);
        }

        let membership = user_role::ActiveModel {
            user_id: Set(user_id.to_string()),
            role_id: Set(role.id),
            created_at: Set(Utc::now()),
        };

        // A concurrent insert of the same pair loses on the composite key.
        match membership.insert(&self.db).await {
            Ok(_) => Ok(AssignOutcome::Assigned),
            Err(e) if is_unique_violation(&e) => Ok(AssignOutcome::AlreadyMember),
            Err(e) => Err(db_err(e)),
        }
    }

    async fn roles_for_user(&self, user_id: &str) -> DomainResult<Vec<String>> {
        let roles = role::Entity::find()
            .join(
                sea_orm::JoinType::InnerJoin,
                role::Relation::UserRoles.def(),
            )
            .filter(user_role::Column::UserId.eq(user_id))
            .order_by_asc(role::Column::Name)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(roles.into_iter().map(|r| r.name).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccountStore, NewUser};
    use crate::infrastructure::database::repositories::user_repository::tests::test_db;
    use crate::infrastructure::database::repositories::SeaOrmAccountStore;

    async fn seeded() -> (SeaOrmAccountStore, SeaOrmRoleStore, String) {
        let db = test_db().await;
        let accounts = SeaOrmAccountStore::new(db.clone());
        let user = accounts
            .create_user(NewUser {
                email: "a@x.com".to_string(),
                password_hash: "$2b$04$hash".to_string(),
                lockout_enabled: true,
            })
            .await
            .unwrap();
        (accounts, SeaOrmRoleStore::new(db), user.id)
    }

    #[tokio::test]
    async fn create_role_twice_fails_case_insensitively() {
        let (_, roles, _) = seeded().await;
        let admin = roles.create_role("Admin").await.unwrap();
        assert_eq!(admin.normalized_name, "admin");

        let err = roles.create_role("ADMIN").await.unwrap_err();
        assert!(matches!(err, DomainError::DuplicateRole(name) if name == "ADMIN"));
    }

    #[tokio::test]
    async fn role_lookup_ignores_case() {
        let (_, roles, _) = seeded().await;
        roles.create_role("Editor").await.unwrap();

        assert!(roles.role_exists("editor").await.unwrap());
        assert!(!roles.role_exists("viewer").await.unwrap());
        let found = roles.find_role_by_name("EDITOR").await.unwrap().unwrap();
        assert_eq!(found.name, "Editor");
    }

    #[tokio::test]
    async fn assign_role_is_idempotent() {
        let (_, roles, user_id) = seeded().await;
        roles.create_role("Admin").await.unwrap();

        assert_eq!(
            roles.assign_role(&user_id, "admin").await.unwrap(),
            AssignOutcome::Assigned
        );
        assert_eq!(
            roles.assign_role(&user_id, "Admin").await.unwrap(),
            AssignOutcome::AlreadyMember
        );
        assert_eq!(roles.roles_for_user(&user_id).await.unwrap(), vec!["Admin"]);
    }

    #[tokio::test]
    async fn assign_role_reports_missing_side() {
        let (_, roles, user_id) = seeded().await;
        roles.create_role("Admin").await.unwrap();

        assert!(matches!(
            roles.assign_role("missing", "Admin").await,
            Err(DomainError::UserNotFound(_))
        ));
        assert!(matches!(
            roles.assign_role(&user_id, "Ghost").await,
            Err(DomainError::RoleNotFound(name)) if name == "Ghost"
        ));
    }

    #[tokio::test]
    async fn roles_for_user_are_sorted() {
        let (_, roles, user_id) = seeded().await;
        for name in ["Zeta", "Alpha", "Mid"] {
            roles.create_role(name).await.unwrap();
            roles.assign_role(&user_id, name).await.unwrap();
        }
        assert_eq!(
            roles.roles_for_user(&user_id).await.unwrap(),
            vec!["Alpha", "Mid", "Zeta"]
        );
    }
}
