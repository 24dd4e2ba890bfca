use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Monthly working hours an hourly overtime rate is derived from
pub const DEFAULT_STANDARD_MONTHLY_HOURS: Decimal = dec!(160);

pub const DEFAULT_TAX_REGIME: &str = "new";

pub const DEFAULT_PAYSLIP_DIR: &str = "payslips";

pub const MONTHS_PER_YEAR: Decimal = dec!(12);
