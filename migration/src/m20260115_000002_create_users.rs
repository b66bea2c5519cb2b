use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Strategy tags. Add providers via ALTER TYPE ADD VALUE as needed.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE TYPE auth_gateway.provider AS ENUM ('local', 'google', 'supabase')",
            )
            .await?;

        // One row per identity. `identifier` is the cross-provider lookup key
        // (normally a verified email address) and is unique on its own, so a
        // person signing in through different strategies resolves to one row.
        let create_table_sql = r#"
            CREATE TABLE IF NOT EXISTS auth_gateway.users (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),

                identifier VARCHAR(255) NOT NULL UNIQUE,
                email VARCHAR(255),
                display_name VARCHAR(255),
                picture_url TEXT,

                provider auth_gateway.provider NOT NULL DEFAULT 'local',
                provider_id VARCHAR(255),

                password TEXT,

                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#;

        manager
            .get_connection()
            .execute_unprepared(create_table_sql)
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "CREATE INDEX IF NOT EXISTS idx_users_identifier
                 ON auth_gateway.users(identifier)",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS auth_gateway.users")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("DROP TYPE IF EXISTS auth_gateway.provider")
            .await?;

        Ok(())
    }
}
