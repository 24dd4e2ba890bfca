use sea_orm_migration::{prelude::{extension::postgres::TypeDropStatement, *}, sea_orm::{ActiveEnum, DbBackend, DeriveActiveEnum, EnumIter, Schema}};

use crate::{setup_fk, util::{default_table_statement, money, percentage}};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(DbBackend::Postgres);

        manager.create_type(schema.create_enum_from_active_enum::<AttendanceStatus>()).await?;
        manager.create_type(schema.create_enum_from_active_enum::<OvertimeStatus>()).await?;
        manager.create_type(schema.create_enum_from_active_enum::<LeaveStatus>()).await?;
        manager.create_type(schema.create_enum_from_active_enum::<ComponentCategory>()).await?;

        manager
            .create_table(default_table_statement()
                .table(Organization::Table)
                .col(ColumnDef::new(Organization::Name)
                    .text()
                    .not_null())
                .col(ColumnDef::new(Organization::IsActive)
                    .boolean()
                    .not_null()
                    .default(true))
                .take()
            ).await?;

        manager
            .create_table(default_table_statement()
                .table(Employee::Table)
                .col(ColumnDef::new(Employee::OrganizationId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(Employee::FullName)
                    .text()
                    .not_null())
                .col(ColumnDef::new(Employee::IsActive)
                    .boolean()
                    .not_null()
                    .default(true))
                .take()
            ).await?;
        setup_fk!(manager, Employee::Table, Employee::OrganizationId, Organization::Table);

        manager
            .create_table(default_table_statement()
                .table(Attendance::Table)
                .col(ColumnDef::new(Attendance::EmployeeId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(Attendance::Date)
                    .date()
                    .not_null())
                .col(ColumnDef::new(Attendance::Status)
                    .custom(AttendanceStatus::name())
                    .not_null())
                .col(ColumnDef::new(Attendance::IsOvertime)
                    .boolean()
                    .not_null()
                    .default(false))
                .take()
            ).await?;
        setup_fk!(manager, Attendance::Table, Attendance::EmployeeId, Employee::Table);

        manager
            .create_index(Index::create()
                .name("idx_attendance_employee_date")
                .table(Attendance::Table)
                .col(Attendance::EmployeeId)
                .col(Attendance::Date)
                .take()
            ).await?;

        manager
            .create_table(default_table_statement()
                .table(Overtime::Table)
                .col(ColumnDef::new(Overtime::AttendanceId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(Overtime::EmployeeId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(Overtime::RequestedHours)
                    .decimal_len(6, 2)
                    .not_null())
                .col(ColumnDef::new(Overtime::ApprovedHours)
                    .decimal_len(6, 2)
                    .not_null()
                    .default(0))
                .col(ColumnDef::new(Overtime::Status)
                    .custom(OvertimeStatus::name())
                    .not_null())
                .take()
            ).await?;
        setup_fk!(manager, Overtime::Table, Overtime::AttendanceId, Attendance::Table);
        setup_fk!(manager, Overtime::Table, Overtime::EmployeeId, Employee::Table);

        manager
            .create_table(default_table_statement()
                .table(Leave::Table)
                .col(ColumnDef::new(Leave::EmployeeId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(Leave::LeaveType)
                    .text()
                    .not_null())
                .col(ColumnDef::new(Leave::StartDate)
                    .date()
                    .not_null())
                .col(ColumnDef::new(Leave::EndDate)
                    .date()
                    .not_null())
                .col(ColumnDef::new(Leave::Status)
                    .custom(LeaveStatus::name())
                    .not_null())
                .check(Expr::col(Leave::EndDate).gte(Expr::col(Leave::StartDate)))
                .take()
            ).await?;
        setup_fk!(manager, Leave::Table, Leave::EmployeeId, Employee::Table);

        manager
            .create_table(default_table_statement()
                .table(LeavePolicy::Table)
                .col(ColumnDef::new(LeavePolicy::OrganizationId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(LeavePolicy::LeaveType)
                    .text()
                    .not_null())
                .col(ColumnDef::new(LeavePolicy::Paid)
                    .boolean()
                    .not_null())
                .col(ColumnDef::new(LeavePolicy::GrantedDays)
                    .integer()
                    .not_null()
                    .default(0))
                .col(ColumnDef::new(LeavePolicy::IsActive)
                    .boolean()
                    .not_null()
                    .default(true))
                .take()
            ).await?;
        setup_fk!(manager, LeavePolicy::Table, LeavePolicy::OrganizationId, Organization::Table);

        manager
            .create_table(default_table_statement()
                .table(SalaryStructure::Table)
                .col(ColumnDef::new(SalaryStructure::EmployeeId)
                    .uuid()
                    .not_null())
                .col(money(SalaryStructure::BaseSalary))
                .col(ColumnDef::new(SalaryStructure::TaxRegime)
                    .text())
                .col(ColumnDef::new(SalaryStructure::PfContribution)
                    .decimal_len(14, 2))
                .col(ColumnDef::new(SalaryStructure::EsiContribution)
                    .decimal_len(14, 2))
                .col(ColumnDef::new(SalaryStructure::IsActive)
                    .boolean()
                    .not_null()
                    .default(true))
                .take()
            ).await?;
        setup_fk!(manager, SalaryStructure::Table, SalaryStructure::EmployeeId, Employee::Table);

        manager
            .create_table(default_table_statement()
                .table(SalaryComponent::Table)
                .col(ColumnDef::new(SalaryComponent::SalaryStructureId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(SalaryComponent::Position)
                    .integer()
                    .not_null()
                    .default(0))
                .col(ColumnDef::new(SalaryComponent::Name)
                    .text()
                    .not_null())
                .col(ColumnDef::new(SalaryComponent::Category)
                    .custom(ComponentCategory::name())
                    .not_null())
                .col(ColumnDef::new(SalaryComponent::IsCustom)
                    .boolean()
                    .not_null()
                    .default(false))
                .col(percentage(SalaryComponent::Percentage))
                .col(ColumnDef::new(SalaryComponent::Amount)
                    .decimal_len(14, 2))
                .take()
            ).await?;
        setup_fk!(manager, SalaryComponent::Table, SalaryComponent::SalaryStructureId, SalaryStructure::Table);

        manager
            .create_table(default_table_statement()
                .table(TaxSlab::Table)
                .col(ColumnDef::new(TaxSlab::OrganizationId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(TaxSlab::Regime)
                    .text()
                    .not_null())
                .col(ColumnDef::new(TaxSlab::MinIncome)
                    .decimal_len(16, 2)
                    .not_null())
                .col(ColumnDef::new(TaxSlab::MaxIncome)
                    .decimal_len(16, 2))
                .col(percentage(TaxSlab::TaxRate).not_null())
                .col(percentage(TaxSlab::Surcharge))
                .col(percentage(TaxSlab::Cess))
                .take()
            ).await?;
        setup_fk!(manager, TaxSlab::Table, TaxSlab::OrganizationId, Organization::Table);

        manager
            .create_table(default_table_statement()
                .table(Payroll::Table)
                .col(ColumnDef::new(Payroll::EmployeeId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(Payroll::OrganizationId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(Payroll::SalaryStructureId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(Payroll::PayPeriod)
                    .text()
                    .not_null())
                .col(ColumnDef::new(Payroll::FromDate)
                    .date()
                    .not_null())
                .col(ColumnDef::new(Payroll::ToDate)
                    .date()
                    .not_null())
                .col(ColumnDef::new(Payroll::TotalDays)
                    .integer()
                    .not_null())
                .col(ColumnDef::new(Payroll::WorkingDays)
                    .decimal_len(6, 1)
                    .not_null())
                .col(ColumnDef::new(Payroll::PresentDays)
                    .integer()
                    .not_null())
                .col(ColumnDef::new(Payroll::HalfDays)
                    .integer()
                    .not_null())
                .col(ColumnDef::new(Payroll::AbsentDays)
                    .integer()
                    .not_null())
                .col(ColumnDef::new(Payroll::PaidLeaveDays)
                    .integer()
                    .not_null())
                .col(ColumnDef::new(Payroll::UnpaidLeaveDays)
                    .integer()
                    .not_null())
                .col(ColumnDef::new(Payroll::LeaveDays)
                    .integer()
                    .not_null())
                .col(ColumnDef::new(Payroll::OvertimeHours)
                    .decimal_len(6, 2)
                    .not_null())
                .col(money(Payroll::OvertimeAmount))
                .col(money(Payroll::BaseEarnings))
                .col(money(Payroll::GrossEarnings))
                .col(money(Payroll::GrossDeductions))
                .col(money(Payroll::UnpaidLeaveDeduction))
                .col(money(Payroll::TaxDeducted))
                .col(money(Payroll::NetSalary))
                .col(ColumnDef::new(Payroll::ComponentBreakdown)
                    .json_binary()
                    .not_null())
                .col(ColumnDef::new(Payroll::PayslipLink)
                    .text())
                .check(Expr::col(Payroll::ToDate).gte(Expr::col(Payroll::FromDate)))
                .take()
            ).await?;
        setup_fk!(manager, Payroll::Table, Payroll::EmployeeId, Employee::Table);
        setup_fk!(manager, Payroll::Table, Payroll::OrganizationId, Organization::Table);
        setup_fk!(manager, Payroll::Table, Payroll::SalaryStructureId, SalaryStructure::Table);

        manager
            .create_index(Index::create()
                .name("idx_payroll_employee_period")
                .table(Payroll::Table)
                .col(Payroll::EmployeeId)
                .col(Payroll::PayPeriod)
                .unique()
                .take()
            ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop()
                .table(Payroll::Table)
                .table(TaxSlab::Table)
                .table(SalaryComponent::Table)
                .table(SalaryStructure::Table)
                .table(LeavePolicy::Table)
                .table(Leave::Table)
                .table(Overtime::Table)
                .table(Attendance::Table)
                .table(Employee::Table)
                .table(Organization::Table)
                .take()
            ).await?;

        for name in [
            AttendanceStatus::name(),
            OvertimeStatus::name(),
            LeaveStatus::name(),
            ComponentCategory::name(),
        ] {
            manager
                .drop_type(
                    TypeDropStatement::new()
                        .name(name)
                        .to_owned()
                ).await?;
        }

        Ok(())
    }
}

#[derive(EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "attendance_status")]
enum AttendanceStatus {
    #[sea_orm(string_value = "present")]
    Present,
    #[sea_orm(string_value = "absent")]
    Absent,
    #[sea_orm(string_value = "half_day")]
    HalfDay,
    #[sea_orm(string_value = "on_leave")]
    OnLeave,
    #[sea_orm(string_value = "holiday")]
    Holiday,
}

#[derive(EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "overtime_status")]
enum OvertimeStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "hr_approved")]
    HrApproved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

#[derive(EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "leave_status")]
enum LeaveStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

#[derive(EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "component_category")]
enum ComponentCategory {
    #[sea_orm(string_value = "earning")]
    Earning,
    #[sea_orm(string_value = "deduction")]
    Deduction,
    #[sea_orm(string_value = "benefit")]
    Benefit,
}

#[derive(Iden)]
enum Organization {
    Table,
    Name,
    IsActive,
}

#[derive(Iden)]
enum Employee {
    Table,
    OrganizationId,
    FullName,
    IsActive,
}

#[derive(Iden)]
enum Attendance {
    Table,
    EmployeeId,
    Date,
    Status,
    IsOvertime,
}

#[derive(Iden)]
enum Overtime {
    Table,
    AttendanceId,
    EmployeeId,
    RequestedHours,
    ApprovedHours,
    Status,
}

#[derive(Iden)]
enum Leave {
    Table,
    EmployeeId,
    LeaveType,
    StartDate,
    EndDate,
    Status,
}

#[derive(Iden)]
enum LeavePolicy {
    Table,
    OrganizationId,
    LeaveType,
    Paid,
    GrantedDays,
    IsActive,
}

#[derive(Iden)]
enum SalaryStructure {
    Table,
    EmployeeId,
    BaseSalary,
    TaxRegime,
    PfContribution,
    EsiContribution,
    IsActive,
}

#[derive(Iden)]
enum SalaryComponent {
    Table,
    SalaryStructureId,
    Position,
    Name,
    Category,
    IsCustom,
    Percentage,
    Amount,
}

#[derive(Iden)]
enum TaxSlab {
    Table,
    OrganizationId,
    Regime,
    MinIncome,
    MaxIncome,
    TaxRate,
    Surcharge,
    Cess,
}

#[derive(Iden)]
enum Payroll {
    Table,
    EmployeeId,
    OrganizationId,
    SalaryStructureId,
    PayPeriod,
    FromDate,
    ToDate,
    TotalDays,
    WorkingDays,
    PresentDays,
    HalfDays,
    AbsentDays,
    PaidLeaveDays,
    UnpaidLeaveDays,
    LeaveDays,
    OvertimeHours,
    OvertimeAmount,
    BaseEarnings,
    GrossEarnings,
    GrossDeductions,
    UnpaidLeaveDeduction,
    TaxDeducted,
    NetSalary,
    ComponentBreakdown,
    PayslipLink,
}
