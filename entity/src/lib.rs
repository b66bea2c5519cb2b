use uuid::Uuid;

pub mod provider;
pub mod token_pair;
pub mod users;

/// A type alias that represents any Entity's internal id field data type.
/// Aliased so that it's easy to change the underlying type if necessary.
pub type Id = Uuid;

#[derive(serde::Serialize, utoipa::ToSchema)]
pub struct __ScratchTest {
    pub user_id: Id,
}
