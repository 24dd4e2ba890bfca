use std::{env, path::PathBuf};

use rust_decimal::Decimal;
use sea_orm::ConnectOptions;
use tracing::info;

use crate::{consts, payroll::PayrollPolicy};

pub struct Config {
    pub database_opt: ConnectOptions,

    pub payslip_dir: PathBuf,

    pub policy: PayrollPolicy,
}

pub fn load() -> Config {
    Config {
        database_opt: load_database_opt().into(),
        payslip_dir: load_payslip_dir(),
        policy: PayrollPolicy {
            standard_monthly_hours: load_standard_monthly_hours(),
            default_tax_regime: load_tax_regime(),
        },
    }
}

fn load_database_opt() -> impl Into<ConnectOptions> {
    info!("Loading environment `DATABASE_URL`");

    let var = env::var("DATABASE_URL").expect("Environment `DATABASE_URL` is required to be set");

    var
}

fn load_payslip_dir() -> PathBuf {
    info!("Loading environment `PAYSLIP_DIR`");

    env::var("PAYSLIP_DIR")
        .unwrap_or_else(|_| consts::DEFAULT_PAYSLIP_DIR.to_string())
        .into()
}

fn load_standard_monthly_hours() -> Decimal {
    info!("Loading environment `STANDARD_MONTHLY_HOURS`");

    let Ok(var) = env::var("STANDARD_MONTHLY_HOURS") else {
        return consts::DEFAULT_STANDARD_MONTHLY_HOURS
    };

    parse_standard_monthly_hours(&var)
        .expect("`STANDARD_MONTHLY_HOURS` must be a positive number")
}

fn parse_standard_monthly_hours(var: &str) -> Option<Decimal> {
    var.trim()
        .parse::<Decimal>().ok()
        .filter(|hours| hours.is_sign_positive() && !hours.is_zero())
}

fn load_tax_regime() -> String {
    info!("Loading environment `TAX_REGIME`");

    env::var("TAX_REGIME").unwrap_or_else(|_| consts::DEFAULT_TAX_REGIME.to_string())
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_parse_standard_monthly_hours() {
        assert_eq!(parse_standard_monthly_hours("160"), Some(dec!(160)));
        assert_eq!(parse_standard_monthly_hours(" 173.33 "), Some(dec!(173.33)));
        assert_eq!(parse_standard_monthly_hours("0"), None);
        assert_eq!(parse_standard_monthly_hours("-8"), None);
        assert_eq!(parse_standard_monthly_hours("many"), None);
    }
}
