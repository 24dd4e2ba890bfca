use sea_orm_migration::prelude::*;

pub(crate) fn default_table_statement() -> TableCreateStatement {
    TableCreateStatement::new()
        .if_not_exists()
        .col(ColumnDef::new(DefaultColumn::Id)
            .uuid()
            .primary_key()
            .default(Expr::cust("GEN_RANDOM_UUID()"))
            .take())
        .col(ColumnDef::new(DefaultColumn::CreatedAt)
            .timestamp_with_time_zone()
            .not_null()
            .take())
        .col(ColumnDef::new(DefaultColumn::UpdatedAt)
            .timestamp_with_time_zone()
            .not_null()
            .take())
        .take()
}

#[derive(DeriveIden)]
pub(crate) enum DefaultColumn {
    Id,
    CreatedAt,
    UpdatedAt,
}

/// Currency amounts, two decimal places
pub(crate) fn money<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .decimal_len(14, 2)
        .not_null()
        .take()
}

/// Rates given in percent
pub(crate) fn percentage<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .decimal_len(7, 4)
        .take()
}

/// Must run `setup_fk` macro on the table afterwards
///
/// # Example
///
/// ```rs
/// manager
///     .create_table(default_table_statement()
///         .table(Leave::Table)
///         .col(ColumnDef::new(Leave::EmployeeId)
///             .uuid()
///             .not_null())
///         .take()
///     ).await?;
/// setup_fk!(manager, Leave::Table, Leave::EmployeeId, Employee::Table);
/// ```
#[macro_export]
macro_rules! setup_fk {
    ($m:expr, $t:expr, $c:expr, $r:expr) => {{
        use crate::util::*;

        $m.create_foreign_key(ForeignKeyCreateStatement::new()
                .from($t, $c)
                .to($r, DefaultColumn::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .on_update(ForeignKeyAction::Cascade)
                .take()
        ).await?;
    }};
}
