use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::{consts::MONTHS_PER_YEAR, entity::{prelude::*, tax_slab}, utils};

/// Progressive tax on `annual_income`, slabs ordered by `min_income`
///
/// Each slab taxes the part of the income above its minimum and below its maximum,
/// then adds its surcharge on that tax and its cess on tax plus surcharge.
pub fn annual_tax(annual_income: Decimal, slabs: &[tax_slab::Model]) -> Decimal {
    let hundred = dec!(100);

    let total = slabs.iter()
        .filter(|slab| annual_income > slab.min_income)
        .map(|slab| {
            let upper = slab.max_income.unwrap_or(annual_income);
            let taxable = annual_income.min(upper) - slab.min_income;

            let slab_tax = taxable * slab.tax_rate / hundred;
            let surcharge = slab_tax * slab.surcharge.unwrap_or_default() / hundred;
            let cess = (slab_tax + surcharge) * slab.cess.unwrap_or_default() / hundred;

            slab_tax + surcharge + cess
        })
        .sum::<Decimal>();

    utils::round_currency(total)
}

pub fn monthly_tax(annual_income: Decimal, slabs: &[tax_slab::Model]) -> Decimal {
    utils::round_currency(annual_tax(annual_income, slabs) / MONTHS_PER_YEAR)
}

pub async fn fetch_slabs(
    db: &impl ConnectionTrait,
    organization_id: Uuid,
    regime: &str,
) -> Result<Vec<tax_slab::Model>, DbErr> {
    TaxSlab::find()
        .filter(tax_slab::Column::OrganizationId.eq(organization_id))
        .filter(tax_slab::Column::Regime.eq(regime))
        .order_by_asc(tax_slab::Column::MinIncome)
        .all(db).await
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::Local;

    use super::*;

    pub(crate) fn slab(min: Decimal, max: Option<Decimal>, rate: Decimal) -> tax_slab::Model {
        tax_slab::Model {
            id: Uuid::new_v4(),
            created_at: Local::now().into(),
            updated_at: Local::now().into(),
            organization_id: Uuid::nil(),
            regime: "new".to_string(),
            min_income: min,
            max_income: max,
            tax_rate: rate,
            surcharge: None,
            cess: None,
        }
    }

    fn progressive_table() -> Vec<tax_slab::Model> {
        let mut top = slab(dec!(1000000), None, dec!(30));
        top.surcharge = Some(dec!(10));
        top.cess = Some(dec!(4));

        vec![
            slab(dec!(0), Some(dec!(300000)), dec!(0)),
            slab(dec!(300000), Some(dec!(600000)), dec!(5)),
            slab(dec!(600000), Some(dec!(1000000)), dec!(20)),
            top,
        ]
    }

    #[test]
    fn test_no_slabs() {
        assert_eq!(annual_tax(dec!(1000000), &[]), Decimal::ZERO);
        assert_eq!(monthly_tax(dec!(1000000), &[]), Decimal::ZERO);
    }

    #[test]
    fn test_flat_slab() {
        let slabs = vec![slab(dec!(0), None, dec!(10))];

        assert_eq!(annual_tax(dec!(27600), &slabs), dec!(2760));
        assert_eq!(monthly_tax(dec!(27600), &slabs), dec!(230));
    }

    #[test]
    fn test_progressive_with_surcharge_and_cess() {
        let slabs = progressive_table();

        // 15_000 + 80_000 + (60_000 + 6_000 + 2_640)
        assert_eq!(annual_tax(dec!(1200000), &slabs), dec!(163640));
        assert_eq!(monthly_tax(dec!(1200000), &slabs), dec!(13636.67));

        assert_eq!(annual_tax(dec!(450000), &slabs), dec!(7500));
    }

    #[test]
    fn test_zero_below_lowest_slab() {
        let slabs = vec![
            slab(dec!(250000), Some(dec!(500000)), dec!(5)),
            slab(dec!(500000), None, dec!(20)),
        ];

        assert_eq!(annual_tax(dec!(250000), &slabs), Decimal::ZERO);
        assert_eq!(annual_tax(dec!(100), &slabs), Decimal::ZERO);
        assert_eq!(annual_tax(Decimal::ZERO, &slabs), Decimal::ZERO);
        assert_eq!(annual_tax(dec!(-5000), &slabs), Decimal::ZERO);
    }

    #[test]
    fn test_monotonic_in_income() {
        let slabs = progressive_table();

        let mut previous = Decimal::ZERO;
        for step in 0..=300 {
            let income = Decimal::from(step * 5_000);
            let tax = annual_tax(income, &slabs);

            assert!(tax >= previous, "tax dropped from {previous} to {tax} at income {income}");
            previous = tax;
        }
    }
}
