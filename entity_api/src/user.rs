use super::error::{EntityApiErrorKind, Error};
use chrono::Utc;

use entity::users::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use password_auth;
use sea_orm::{entity::prelude::*, ConnectionTrait, Set};

pub use entity::provider::Provider;

pub async fn create(db: &impl ConnectionTrait, user_model: Model) -> Result<Model, Error> {
    debug!("New User Model to be inserted: {user_model:?}");

    let now = Utc::now();
    let user_active_model: ActiveModel = ActiveModel {
        identifier: Set(user_model.identifier),
        email: Set(user_model.email),
        display_name: Set(user_model.display_name),
        picture_url: Set(user_model.picture_url),
        provider: Set(user_model.provider),
        provider_id: Set(user_model.provider_id),
        password: Set(user_model.password.map(generate_hash)),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(user_active_model.insert(db).await?)
}

pub async fn find_by_identifier(
    db: &impl ConnectionTrait,
    identifier: &str,
) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::Identifier.eq(identifier))
        .one(db)
        .await?)
}

pub async fn find_by_id(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    match Entity::find_by_id(id).one(db).await? {
        Some(user) => Ok(user),
        None => Err(Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotFound,
        }),
    }
}

pub async fn verify_password(password_to_verify: &str, password_hash: &str) -> Result<(), Error> {
    match password_auth::verify_password(password_to_verify, password_hash) {
        Ok(_) => Ok(()),
        Err(_) => Err(Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordUnauthenticated,
        }),
    }
}

pub fn generate_hash(password: String) -> String {
    password_auth::generate_hash(password)
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod test {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn test_user_model(identifier: &str) -> Model {
        let now = chrono::Utc::now();
        Model {
            id: Id::new_v4(),
            identifier: identifier.to_string(),
            email: Some(identifier.to_string()),
            display_name: Some("Test User".to_string()),
            picture_url: None,
            provider: Provider::Local,
            provider_id: None,
            password: Some("password123".to_string()),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn create_returns_the_inserted_user_model() -> Result<(), Error> {
        let user_model = test_user_model("test@test.com");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user_model.clone()]])
            .into_connection();

        let user = create(&db, user_model.clone()).await?;

        assert_eq!(user.id, user_model.id);
        assert_eq!(user.identifier, user_model.identifier);
        assert_eq!(user.provider, Provider::Local);

        Ok(())
    }

    #[tokio::test]
    async fn create_returns_error_on_duplicate_identifier() -> Result<(), Error> {
        let user_model = test_user_model("test@test.com");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([sea_orm::DbErr::Custom("Duplicate identifier".to_string())])
            .into_connection();

        let result = create(&db, user_model).await;
        assert!(result.is_err());

        Ok(())
    }

    #[tokio::test]
    async fn find_by_identifier_returns_a_matching_record() -> Result<(), Error> {
        let user_model = test_user_model("someone@example.com");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user_model.clone()]])
            .into_connection();

        let found = find_by_identifier(&db, "someone@example.com").await?;

        assert_eq!(found, Some(user_model));

        Ok(())
    }

    #[tokio::test]
    async fn find_by_identifier_returns_none_when_absent() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Model>::new()])
            .into_connection();

        let found = find_by_identifier(&db, "missing@example.com").await?;

        assert_eq!(found, None);

        Ok(())
    }

    #[tokio::test]
    async fn find_by_id_returns_not_found_when_absent() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Model>::new()])
            .into_connection();

        let result = find_by_id(&db, Id::new_v4()).await;

        assert_eq!(
            result.unwrap_err().error_kind,
            EntityApiErrorKind::RecordNotFound
        );
    }

    #[tokio::test]
    async fn verify_password_accepts_the_original_password() -> Result<(), Error> {
        let hash = generate_hash("correct horse battery staple".to_string());

        verify_password("correct horse battery staple", &hash).await?;

        Ok(())
    }

    #[tokio::test]
    async fn verify_password_rejects_a_wrong_password() {
        let hash = generate_hash("correct horse battery staple".to_string());

        let result = verify_password("wrong password", &hash).await;

        assert_eq!(
            result.unwrap_err().error_kind,
            EntityApiErrorKind::RecordUnauthenticated
        );
    }
}
