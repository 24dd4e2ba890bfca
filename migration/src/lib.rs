pub use sea_orm_migration::prelude::*;

mod util;
mod m20250702_091512_init;
mod m20250704_140233_payroll_overlap_guard;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250702_091512_init::Migration),
            Box::new(m20250704_140233_payroll_overlap_guard::Migration),
        ]
    }
}
