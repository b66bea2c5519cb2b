use crate::error::Error;
use crate::gateway::oauth::UserMetadata;
use crate::{users, Id};
use chrono::Utc;
use sea_orm::ConnectionTrait;

pub use entity_api::user::{generate_hash, verify_password};

pub async fn find_by_id(db: &impl ConnectionTrait, id: Id) -> Result<users::Model, Error> {
    Ok(entity_api::user::find_by_id(db, id).await?)
}

pub async fn find_by_identifier(
    db: &impl ConnectionTrait,
    identifier: &str,
) -> Result<Option<users::Model>, Error> {
    Ok(entity_api::user::find_by_identifier(db, identifier).await?)
}

pub async fn create(db: &impl ConnectionTrait, model: users::Model) -> Result<users::Model, Error> {
    Ok(entity_api::user::create(db, model).await?)
}

/// Build a user model from the canonical metadata a provider adapter produced.
pub fn model_from_metadata(metadata: UserMetadata) -> users::Model {
    let now = Utc::now();
    users::Model {
        id: Id::new_v4(),
        identifier: metadata.identifier,
        email: metadata.email,
        display_name: metadata.name,
        picture_url: metadata.picture_url,
        provider: metadata.provider,
        provider_id: Some(metadata.provider_id),
        password: None,
        created_at: now.into(),
        updated_at: now.into(),
    }
}
