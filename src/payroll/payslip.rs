use std::{fmt, fs, io, path::PathBuf};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::DbErr;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::entity::{employee, payroll, salary_structure};

/// Payslip as handed to the employee, derived entirely from a payroll row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payslip {
    pub payroll_id: Uuid,
    pub employee: PayslipEmployee,
    pub organization_id: Uuid,
    pub pay_period: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub attendance: PayslipAttendance,
    pub earnings: Vec<PayslipLine>,
    pub deductions: Vec<PayslipLine>,
    pub contributions: PayslipContributions,
    pub summary: PayslipSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayslipEmployee {
    pub id: Uuid,
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayslipAttendance {
    pub total_days: i32,
    pub working_days: Decimal,
    pub present_days: i32,
    pub half_days: i32,
    pub absent_days: i32,
    pub paid_leave_days: i32,
    pub unpaid_leave_days: i32,
    pub overtime_hours: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayslipLine {
    pub label: String,
    pub amount: Decimal,
}

/// Statutory contributions, zero when the salary structure does not set them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayslipContributions {
    pub provident_fund: Decimal,
    pub employee_state_insurance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayslipSummary {
    pub gross_earnings: Decimal,
    pub gross_deductions: Decimal,
    pub tax_deducted: Decimal,
    pub net_salary: Decimal,
}

impl Payslip {
    pub fn new(
        payroll: &payroll::Model,
        employee: &employee::Model,
        structure: Option<&salary_structure::Model>,
    ) -> Self {
        let line = |label: String, amount| PayslipLine { label, amount };

        let mut earnings = vec![line("Basic salary".to_string(), payroll.base_earnings)];
        let mut deductions = Vec::new();

        for component in &payroll.component_breakdown.0 {
            let target = if component.category.is_payable() { &mut earnings } else { &mut deductions };
            target.push(line(component.name.clone(), component.amount));
        }

        if !payroll.overtime_amount.is_zero() {
            earnings.push(line(format!("Overtime ({} h)", payroll.overtime_hours), payroll.overtime_amount));
        }
        if !payroll.unpaid_leave_deduction.is_zero() {
            deductions.push(line(format!("Unpaid leave ({} days)", payroll.unpaid_leave_days), payroll.unpaid_leave_deduction));
        }
        deductions.push(line("Income tax".to_string(), payroll.tax_deducted));

        Self {
            payroll_id: payroll.id,
            employee: PayslipEmployee {
                id: employee.id,
                full_name: employee.full_name.clone(),
            },
            organization_id: payroll.organization_id,
            pay_period: payroll.pay_period.clone(),
            from_date: payroll.from_date,
            to_date: payroll.to_date,
            attendance: PayslipAttendance {
                total_days: payroll.total_days,
                working_days: payroll.working_days,
                present_days: payroll.present_days,
                half_days: payroll.half_days,
                absent_days: payroll.absent_days,
                paid_leave_days: payroll.paid_leave_days,
                unpaid_leave_days: payroll.unpaid_leave_days,
                overtime_hours: payroll.overtime_hours,
            },
            earnings,
            deductions,
            contributions: PayslipContributions {
                provident_fund: structure.and_then(|s| s.pf_contribution).unwrap_or_default(),
                employee_state_insurance: structure.and_then(|s| s.esi_contribution).unwrap_or_default(),
            },
            summary: PayslipSummary {
                gross_earnings: payroll.gross_earnings,
                gross_deductions: payroll.gross_deductions,
                tax_deducted: payroll.tax_deducted,
                net_salary: payroll.net_salary,
            },
        }
    }
}

impl fmt::Display for Payslip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PAYSLIP {}", self.pay_period)?;
        writeln!(f, "Employee: {} ({})", self.employee.full_name, self.employee.id)?;
        writeln!(f, "Period:   {} to {}", self.from_date, self.to_date)?;
        writeln!(f)?;

        let a = &self.attendance;
        writeln!(f, "Days in month {:>6}   Working days {:>6}", a.total_days, a.working_days)?;
        writeln!(f, "Present       {:>6}   Half days    {:>6}", a.present_days, a.half_days)?;
        writeln!(f, "Absent        {:>6}   Overtime (h) {:>6}", a.absent_days, a.overtime_hours)?;
        writeln!(f, "Paid leave    {:>6}   Unpaid leave {:>6}", a.paid_leave_days, a.unpaid_leave_days)?;

        for (title, lines) in [("EARNINGS", &self.earnings), ("DEDUCTIONS", &self.deductions)] {
            writeln!(f)?;
            writeln!(f, "{title}")?;
            for line in lines {
                writeln!(f, "  {:<28}{:>14.2}", line.label, line.amount)?;
            }
        }

        writeln!(f)?;
        writeln!(f, "CONTRIBUTIONS")?;
        writeln!(f, "  {:<28}{:>14.2}", "Provident fund", self.contributions.provident_fund)?;
        writeln!(f, "  {:<28}{:>14.2}", "Employee state insurance", self.contributions.employee_state_insurance)?;

        let s = &self.summary;
        writeln!(f)?;
        writeln!(f, "  {:<28}{:>14.2}", "Gross earnings", s.gross_earnings)?;
        writeln!(f, "  {:<28}{:>14.2}", "Gross deductions", s.gross_deductions)?;
        writeln!(f, "  {:<28}{:>14.2}", "Tax", s.tax_deducted)?;
        writeln!(f, "  {:<28}{:>14.2}", "NET SALARY", s.net_salary)
    }
}

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("unable to write payslip")]
    Io(#[from] io::Error),
    #[error("unable to serialize payslip")]
    Serialization(#[from] serde_json::Error),
    #[error("unable to record payslip location")]
    Link(#[from] DbErr),
}

/// Durable storage for payslips, keyed by employee and pay period
pub trait PayslipStore {
    /// Store the structured payslip and return where it can be retrieved from
    fn write(&self, payslip: &Payslip) -> Result<String, ArtifactError>;

    /// Store a human-readable rendering next to the structured payslip
    fn render(&self, payslip: &Payslip) -> Result<String, ArtifactError>;
}

/// Keeps payslips under `<root>/<employee id>/<pay period>.json`
pub struct FsPayslipStore {
    root: PathBuf,
}

impl FsPayslipStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, payslip: &Payslip, extension: &str) -> io::Result<PathBuf> {
        let dir = self.root.join(payslip.employee.id.to_string());
        fs::create_dir_all(&dir)?;

        Ok(dir.join(format!("{}.{extension}", payslip.pay_period)))
    }
}

impl PayslipStore for FsPayslipStore {
    fn write(&self, payslip: &Payslip) -> Result<String, ArtifactError> {
        let path = self.path_for(payslip, "json")?;
        fs::write(&path, serde_json::to_vec_pretty(payslip)?)?;

        Ok(path.display().to_string())
    }

    fn render(&self, payslip: &Payslip) -> Result<String, ArtifactError> {
        let path = self.path_for(payslip, "txt")?;
        fs::write(&path, payslip.to_string())?;

        Ok(path.display().to_string())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::Local;
    use rust_decimal_macros::dec;

    use crate::entity::{payroll::{BreakdownLine, ComponentBreakdown}, sea_orm_active_enums::ComponentCategory};

    use super::*;

    pub(crate) fn employee() -> employee::Model {
        employee::Model {
            id: Uuid::new_v4(),
            created_at: Local::now().into(),
            updated_at: Local::now().into(),
            organization_id: Uuid::new_v4(),
            full_name: "Bob".to_string(),
            is_active: true,
        }
    }

    pub(crate) fn payroll_for(employee: &employee::Model) -> payroll::Model {
        payroll::Model {
            id: Uuid::new_v4(),
            created_at: Local::now().into(),
            updated_at: Local::now().into(),
            employee_id: employee.id,
            organization_id: employee.organization_id,
            salary_structure_id: Uuid::new_v4(),
            pay_period: "2024-06".to_string(),
            from_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            to_date: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
            total_days: 30,
            working_days: dec!(20),
            present_days: 20,
            half_days: 0,
            absent_days: 0,
            paid_leave_days: 0,
            unpaid_leave_days: 0,
            leave_days: 0,
            overtime_hours: dec!(0),
            overtime_amount: dec!(0),
            base_earnings: dec!(2000),
            gross_earnings: dec!(2300),
            gross_deductions: dec!(0),
            unpaid_leave_deduction: dec!(0),
            tax_deducted: dec!(230),
            net_salary: dec!(2070),
            component_breakdown: ComponentBreakdown(vec![BreakdownLine {
                name: "Allowance".to_string(),
                category: ComponentCategory::Earning,
                amount: dec!(200),
            }]),
            payslip_link: None,
        }
    }

    #[test]
    fn test_payslip_lines() {
        let employee = employee();
        let mut payroll = payroll_for(&employee);
        payroll.component_breakdown.0.push(BreakdownLine {
            name: "Pension".to_string(),
            category: ComponentCategory::Deduction,
            amount: dec!(100),
        });
        payroll.overtime_hours = dec!(4);
        payroll.overtime_amount = dec!(75);
        payroll.unpaid_leave_days = 1;
        payroll.unpaid_leave_deduction = dec!(76.67);

        let payslip = Payslip::new(&payroll, &employee, None);

        let labels = |lines: &[PayslipLine]| lines.iter().map(|l| l.label.clone()).collect::<Vec<_>>();
        assert_eq!(labels(&payslip.earnings), ["Basic salary", "Allowance", "Overtime (4 h)"]);
        assert_eq!(labels(&payslip.deductions), ["Pension", "Unpaid leave (1 days)", "Income tax"]);
        assert_eq!(payslip.contributions, PayslipContributions::default());
        assert_eq!(payslip.summary.net_salary, dec!(2070));
    }

    #[test]
    fn test_payslip_rendering() {
        let employee = employee();
        let payslip = Payslip::new(&payroll_for(&employee), &employee, None);

        let rendered = payslip.to_string();

        assert!(rendered.starts_with("PAYSLIP 2024-06"));
        assert!(rendered.contains("Employee: Bob"));
        assert!(rendered.contains("Allowance"));
        assert!(rendered.lines().last().unwrap().ends_with("2070.00"));
    }

    #[test]
    fn test_fs_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsPayslipStore::new(dir.path());

        let employee = employee();
        let payslip = Payslip::new(&payroll_for(&employee), &employee, None);

        let location = store.write(&payslip).unwrap();
        assert!(location.ends_with(&format!("{}/2024-06.json", employee.id)));

        let stored: Payslip = serde_json::from_slice(&fs::read(&location).unwrap()).unwrap();
        assert_eq!(stored, payslip);

        let rendered = store.render(&payslip).unwrap();
        assert_eq!(fs::read_to_string(rendered).unwrap(), payslip.to_string());
    }
}
