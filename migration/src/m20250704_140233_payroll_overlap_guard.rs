use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const CONSTRAINT: &str = "payroll_no_overlapping_period";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // Needed for the uuid equality inside a gist exclusion
        db.execute_unprepared("CREATE EXTENSION IF NOT EXISTS btree_gist").await?;
        db.execute_unprepared(&format!(
            r#"ALTER TABLE "payroll" ADD CONSTRAINT "{CONSTRAINT}"
                EXCLUDE USING gist ("employee_id" WITH =, daterange("from_date", "to_date", '[]') WITH &&)"#
        )).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(&format!(r#"ALTER TABLE "payroll" DROP CONSTRAINT IF EXISTS "{CONSTRAINT}""#))
            .await?;

        Ok(())
    }
}
