use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::{
    consts::MONTHS_PER_YEAR,
    entity::{payroll::BreakdownLine, prelude::*, salary_component, salary_structure, tax_slab},
    payroll::tax,
    utils::round_currency,
};

/// Everything the month's salary is composed from
#[derive(Debug, Clone)]
pub struct SalaryInput<'a> {
    pub base_salary: Decimal,
    pub components: &'a [salary_component::Model],
    pub working_days: Decimal,
    pub paid_leave_days: i64,
    pub unpaid_days: i64,
    pub total_days: i64,
    pub overtime_hours: Decimal,
    pub standard_monthly_hours: Decimal,
}

impl SalaryInput<'_> {
    pub fn effective_days(&self) -> Decimal {
        self.working_days + Decimal::from(self.paid_leave_days) - Decimal::from(self.unpaid_days)
    }

    /// Scale a monthly figure by effective days over days in the month
    fn prorate(&self, monthly: Decimal) -> Decimal {
        monthly
            .checked_div(Decimal::from(self.total_days))
            .unwrap_or_default()
            * self.effective_days()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalaryComputation {
    pub effective_days: Decimal,
    pub base_earnings: Decimal,
    pub earnings: Decimal,
    pub deductions: Decimal,
    pub tax: Decimal,
    pub overtime_pay: Decimal,
    pub unpaid_leave_deduction: Decimal,
    pub net: Decimal,
    pub breakdown: Vec<BreakdownLine>,
}

/// Compose gross earnings, deductions, tax and net salary for one month
///
/// Component lines in the breakdown carry the prorated amount, while the earning and
/// deduction totals take every component at its unprorated percentage of base salary.
/// Both figures are kept as they are.
pub fn compose(input: &SalaryInput<'_>, slabs: &[tax_slab::Model]) -> SalaryComputation {
    let hundred = dec!(100);
    let base = input.base_salary;

    let base_earnings = round_currency(input.prorate(base));

    let mut earnings = base_earnings;
    let mut deductions = Decimal::ZERO;
    let mut breakdown = Vec::with_capacity(input.components.len());

    for component in input.components {
        let monthly = if component.is_custom {
            component.amount.unwrap_or_default()
        } else {
            component.percentage.unwrap_or_default() / hundred * base
        };

        breakdown.push(BreakdownLine {
            name: component.name.clone(),
            category: component.category,
            amount: round_currency(input.prorate(monthly)),
        });

        let total = round_currency(base * component.percentage.unwrap_or_default() / hundred);
        if component.category.is_payable() {
            earnings += total;
        } else {
            deductions += total;
        }
    }

    let overtime_pay = round_currency(
        base.checked_div(input.standard_monthly_hours).unwrap_or_default() * input.overtime_hours
    );
    earnings += overtime_pay;

    let tax = tax::monthly_tax(earnings * MONTHS_PER_YEAR, slabs);

    let unpaid_leave_deduction = if input.unpaid_days > 0 {
        round_currency(
            earnings.checked_div(Decimal::from(input.total_days)).unwrap_or_default()
                * Decimal::from(input.unpaid_days)
        )
    } else {
        Decimal::ZERO
    };
    deductions += unpaid_leave_deduction;

    SalaryComputation {
        effective_days: input.effective_days(),
        base_earnings,
        earnings,
        deductions,
        tax,
        overtime_pay,
        unpaid_leave_deduction,
        net: earnings - (deductions + tax),
        breakdown,
    }
}

pub async fn fetch_active_structure(
    db: &impl ConnectionTrait,
    employee_id: Uuid,
) -> Result<Option<salary_structure::Model>, DbErr> {
    SalaryStructure::find()
        .filter(salary_structure::Column::EmployeeId.eq(employee_id))
        .filter(salary_structure::Column::IsActive.eq(true))
        .order_by_desc(salary_structure::Column::UpdatedAt)
        .one(db).await
}

pub async fn fetch_components(
    db: &impl ConnectionTrait,
    salary_structure_id: Uuid,
) -> Result<Vec<salary_component::Model>, DbErr> {
    SalaryComponent::find()
        .filter(salary_component::Column::SalaryStructureId.eq(salary_structure_id))
        .order_by_asc(salary_component::Column::Position)
        .all(db).await
}
