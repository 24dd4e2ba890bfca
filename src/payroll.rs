use chrono::Local;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveValue::{NotSet, Set}, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Select, TransactionTrait,
};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    entity::{
        employee, organization, payroll::{self, ComponentBreakdown}, prelude::*, salary_structure,
    },
    period::PayPeriod,
};

use payslip::{ArtifactError, Payslip, PayslipStore};

pub mod attendance;
pub mod leave;
pub mod payslip;
pub mod salary;
pub mod tax;

/// Organization-level parameters that are not stored alongside the data
#[derive(Debug, Clone)]
pub struct PayrollPolicy {
    pub standard_monthly_hours: Decimal,
    pub default_tax_regime: String,
}

#[derive(Debug, Error)]
pub enum PayrollError {
    #[error("employee {0} has no active salary structure")]
    MissingSalaryStructure(Uuid),
    #[error("employee {0} does not exist")]
    MissingEmployee(Uuid),
    #[error("payroll {0} does not exist")]
    MissingPayroll(Uuid),
    #[error("day count {0} does not fit the payroll row")]
    DayCountOutOfRange(i64),
    #[error("persistence failure")]
    Persistence(#[from] DbErr),
    #[error("payslip failure")]
    Artifact(#[from] ArtifactError),
}

/// Where one employee ended up for a pay period
#[derive(Debug)]
pub enum EmployeeOutcome {
    Persisted {
        payroll_id: Uuid,
        /// `None` when the payslip could not be stored, the payroll stays valid
        payslip_link: Option<String>,
    },
    SkippedDuplicate {
        existing_payroll_id: Uuid,
    },
    Failed(PayrollError),
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub entries: Vec<(Uuid, EmployeeOutcome)>,
}

impl RunSummary {
    fn record(&mut self, employee_id: Uuid, outcome: EmployeeOutcome) {
        self.entries.push((employee_id, outcome));
    }

    pub fn persisted(&self) -> usize {
        self.count(|o| matches!(o, EmployeeOutcome::Persisted { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, EmployeeOutcome::SkippedDuplicate { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, EmployeeOutcome::Failed(_)))
    }

    fn count(&self, predicate: impl Fn(&EmployeeOutcome) -> bool) -> usize {
        self.entries.iter().filter(|(_, o)| predicate(o)).count()
    }
}

enum Computed {
    Inserted(payroll::Model, salary_structure::Model),
    Duplicate(Uuid),
}

/// Runs payroll generation for organizations, one employee at a time
pub struct PayrollRun<'a, S> {
    db: &'a DatabaseConnection,
    policy: &'a PayrollPolicy,
    store: &'a S,
}

impl<'a, S: PayslipStore> PayrollRun<'a, S> {
    pub fn new(db: &'a DatabaseConnection, policy: &'a PayrollPolicy, store: &'a S) -> Self {
        Self { db, policy, store }
    }

    /// Process every active organization, or just `organization_id` when given
    ///
    /// Only failing to list organizations aborts the run, everything past that is
    /// recorded per employee.
    pub async fn run(&self, period: &PayPeriod, organization_id: Option<Uuid>) -> Result<RunSummary, DbErr> {
        let mut query = Organization::find()
            .filter(organization::Column::IsActive.eq(true))
            .order_by_asc(organization::Column::Name);

        if let Some(id) = organization_id {
            query = query.filter(organization::Column::Id.eq(id));
        }

        let organizations = query.all(self.db).await?;
        info!(count = organizations.len(), %period, "Starting payroll run");

        let mut summary = RunSummary::default();
        for organization in organizations {
            self.run_organization(&organization, period, &mut summary).await;
        }

        info!(
            persisted = summary.persisted(),
            skipped = summary.skipped(),
            failed = summary.failed(),
            %period,
            "Payroll run finished"
        );

        Ok(summary)
    }

    pub async fn run_organization(&self, organization: &organization::Model, period: &PayPeriod, summary: &mut RunSummary) {
        let employees = Employee::find()
            .filter(employee::Column::OrganizationId.eq(organization.id))
            .filter(employee::Column::IsActive.eq(true))
            .order_by_asc(employee::Column::FullName)
            .all(self.db).await;

        let employees = match employees {
            Ok(employees) => employees,
            Err(e) => {
                error!(error = ?e, organization_id = %organization.id, "Unable to list employees");
                return
            },
        };

        for employee in employees {
            let outcome = self.process_employee(&employee, period).await;
            summary.record(employee.id, outcome);
        }
    }

    #[tracing::instrument(skip_all, fields(employee_id = %employee.id, period = %period))]
    pub async fn process_employee(&self, employee: &employee::Model, period: &PayPeriod) -> EmployeeOutcome {
        info!("Computing");

        match self.compute_and_insert(employee, period).await {
            Ok(Computed::Inserted(payroll, structure)) => {
                info!(payroll_id = %payroll.id, net_salary = %payroll.net_salary, "Persisted");

                let payslip_link = match self.attach_payslip(&payroll, employee, Some(&structure)).await {
                    Ok(link) => Some(link),
                    Err(e) => {
                        error!(error = ?e, payroll_id = %payroll.id, "Payslip could not be stored");
                        None
                    },
                };

                EmployeeOutcome::Persisted { payroll_id: payroll.id, payslip_link }
            },
            Ok(Computed::Duplicate(existing_payroll_id)) => {
                warn!(%existing_payroll_id, "SkippedDuplicate");
                EmployeeOutcome::SkippedDuplicate { existing_payroll_id }
            },
            Err(e) => {
                error!(error = ?e, "Failed");
                EmployeeOutcome::Failed(e)
            },
        }
    }

    /// Duplicate check, computation and insert in one transaction
    ///
    /// Returning early drops the transaction, which rolls it back.
    async fn compute_and_insert(&self, employee: &employee::Model, period: &PayPeriod) -> Result<Computed, PayrollError> {
        let txn = self.db.begin().await?;

        // Serializes concurrent runs for the same employee up to commit
        Employee::find_by_id(employee.id)
            .lock_exclusive()
            .one(&txn).await?
            .ok_or(PayrollError::MissingEmployee(employee.id))?;

        if let Some(existing) = find_colliding_payroll(&txn, employee.id, period).await? {
            return Ok(Computed::Duplicate(existing.id));
        }

        let structure = salary::fetch_active_structure(&txn, employee.id).await?
            .ok_or(PayrollError::MissingSalaryStructure(employee.id))?;
        let components = salary::fetch_components(&txn, structure.id).await?;

        let records = attendance::fetch_for_period(&txn, employee.id, period).await?;
        let approved_overtime = attendance::fetch_approved_overtime(&txn, &records).await?;
        let attendance = attendance::aggregate(&records, &approved_overtime);

        let policies = leave::fetch_policies(&txn, employee.organization_id).await?;
        let leaves = leave::fetch_for_period(&txn, employee.id, period).await?;
        let history = if leaves.is_empty() {
            Vec::new()
        } else {
            leave::fetch_history(&txn, employee.id, period).await?
        };
        let leave = leave::apportion(&leaves, &history, &policies, period);

        let regime = structure.tax_regime.as_deref().unwrap_or(&self.policy.default_tax_regime);
        let slabs = tax::fetch_slabs(&txn, employee.organization_id, regime).await?;

        let salary = salary::compose(&salary::SalaryInput {
            base_salary: structure.base_salary,
            components: &components,
            working_days: attendance.working_days(),
            paid_leave_days: leave.paid_leave_days,
            unpaid_days: leave.unpaid_days,
            total_days: period.total_days(),
            overtime_hours: attendance.overtime_hours,
            standard_monthly_hours: self.policy.standard_monthly_hours,
        }, &slabs);

        debug!(
            working_days = %attendance.working_days(),
            on_leave_records = attendance.on_leave_ids.len(),
            paid_leave_days = leave.paid_leave_days,
            unpaid_days = leave.unpaid_days,
            effective_days = %salary.effective_days,
            %regime,
            "Computed"
        );

        let now = Local::now().fixed_offset();

        let payroll = Payroll::insert(payroll::ActiveModel {
            id: NotSet,
            created_at: Set(now),
            updated_at: Set(now),
            employee_id: Set(employee.id),
            organization_id: Set(employee.organization_id),
            salary_structure_id: Set(structure.id),
            pay_period: Set(period.to_string()),
            from_date: Set(period.from_date()),
            to_date: Set(period.to_date()),
            total_days: Set(day_count(period.total_days())?),
            working_days: Set(attendance.working_days()),
            present_days: Set(day_count(attendance.presents.into())?),
            half_days: Set(day_count(attendance.half_days.into())?),
            absent_days: Set(day_count(attendance.absents.into())?),
            paid_leave_days: Set(day_count(leave.paid_leave_days)?),
            unpaid_leave_days: Set(day_count(leave.unpaid_days)?),
            leave_days: Set(day_count(leave.paid_leave_days + leave.unpaid_days)?),
            overtime_hours: Set(attendance.overtime_hours),
            overtime_amount: Set(salary.overtime_pay),
            base_earnings: Set(salary.base_earnings),
            gross_earnings: Set(salary.earnings),
            gross_deductions: Set(salary.deductions),
            unpaid_leave_deduction: Set(salary.unpaid_leave_deduction),
            tax_deducted: Set(salary.tax),
            net_salary: Set(salary.net),
            component_breakdown: Set(ComponentBreakdown(salary.breakdown)),
            payslip_link: Set(None),
        }).exec_with_returning(&txn).await?;

        txn.commit().await?;

        Ok(Computed::Inserted(payroll, structure))
    }

    /// Store the payslip and record its location on the payroll row
    ///
    /// The text rendering is best effort and never fails the payslip.
    async fn attach_payslip(
        &self,
        payroll: &payroll::Model,
        employee: &employee::Model,
        structure: Option<&salary_structure::Model>,
    ) -> Result<String, ArtifactError> {
        let payslip = Payslip::new(payroll, employee, structure);

        let link = self.store.write(&payslip)?;
        if let Err(e) = self.store.render(&payslip) {
            warn!(error = ?e, payroll_id = %payroll.id, "Payslip rendering failed");
        }

        Payroll::update_many()
            .col_expr(payroll::Column::PayslipLink, Expr::value(link.clone()))
            .col_expr(payroll::Column::UpdatedAt, Expr::value(Local::now().fixed_offset()))
            .filter(payroll::Column::Id.eq(payroll.id))
            .exec(self.db).await?;

        Ok(link)
    }

    /// Rebuild the payslip of an existing payroll
    pub async fn regenerate_payslip(&self, payroll_id: Uuid) -> Result<String, PayrollError> {
        let payroll = Payroll::find_by_id(payroll_id)
            .one(self.db).await?
            .ok_or(PayrollError::MissingPayroll(payroll_id))?;

        let employee = Employee::find_by_id(payroll.employee_id)
            .one(self.db).await?
            .ok_or(PayrollError::MissingEmployee(payroll.employee_id))?;

        let structure = SalaryStructure::find_by_id(payroll.salary_structure_id)
            .one(self.db).await?;

        Ok(self.attach_payslip(&payroll, &employee, structure.as_ref()).await?)
    }
}

fn day_count(days: i64) -> Result<i32, PayrollError> {
    i32::try_from(days).map_err(|_| PayrollError::DayCountOutOfRange(days))
}

/// Payrolls of the employee that start within, end within or contain the period
fn colliding_payrolls(employee_id: Uuid, period: &PayPeriod) -> Select<Payroll> {
    let (from, to) = (period.from_date(), period.to_date());

    Payroll::find()
        .filter(payroll::Column::EmployeeId.eq(employee_id))
        .filter(Condition::any()
            .add(payroll::Column::FromDate.between(from, to))
            .add(payroll::Column::ToDate.between(from, to))
            .add(Condition::all()
                .add(payroll::Column::FromDate.lte(from))
                .add(payroll::Column::ToDate.gte(to))))
}

async fn find_colliding_payroll(
    db: &impl ConnectionTrait,
    employee_id: Uuid,
    period: &PayPeriod,
) -> Result<Option<payroll::Model>, DbErr> {
    colliding_payrolls(employee_id, period).one(db).await
}
