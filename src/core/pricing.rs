//! Pricing calculator - estimate totals, tax and internal margin
//!
//! Pure functions over line items. Line amounts and tax are rounded to cents
//! as they are computed (midpoint away from zero); subtotal and total are
//! exact sums of those rounded figures, so `total == subtotal + tax - discount`
//! holds to the cent no matter how often totals are recomputed.
//!
//! Internal cost never feeds the customer-facing totals; it only drives
//! [`margin`] and [`margin_pct`].

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::core::error::{ShopError, ShopResult};

/// Tax rate (percent) used when neither the request nor shop settings give one
pub const DEFAULT_TAX_RATE: Decimal = Decimal::from_parts(115, 0, 0, false, 1);

/// Hourly labor rate used when shop settings give none
pub const DEFAULT_LABOR_RATE: Decimal = Decimal::from_parts(8500, 0, 0, false, 2);

/// A priceable line
pub trait PricedLine {
    fn quantity(&self) -> Decimal;
    fn unit_price(&self) -> Decimal;
    /// Internal unit cost
    fn cost(&self) -> Decimal;
    fn is_taxable(&self) -> bool;

    /// Customer-facing line amount
    fn amount(&self) -> ShopResult<Decimal> {
        line_amount(self.quantity(), self.unit_price())
    }
}

fn out_of_range() -> ShopError {
    ShopError::validation("amount out of range")
}

pub fn checked_add(a: Decimal, b: Decimal) -> ShopResult<Decimal> {
    a.checked_add(b).ok_or_else(out_of_range)
}

pub fn checked_sub(a: Decimal, b: Decimal) -> ShopResult<Decimal> {
    a.checked_sub(b).ok_or_else(out_of_range)
}

pub fn checked_mul(a: Decimal, b: Decimal) -> ShopResult<Decimal> {
    a.checked_mul(b).ok_or_else(out_of_range)
}

/// Round a money value to cents
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn line_amount(quantity: Decimal, unit_price: Decimal) -> ShopResult<Decimal> {
    Ok(round_money(checked_mul(quantity, unit_price)?))
}

/// Sum of every line amount, taxable or not
pub fn subtotal<L: PricedLine>(lines: &[L]) -> ShopResult<Decimal> {
    lines
        .iter()
        .try_fold(Decimal::ZERO, |acc, l| checked_add(acc, l.amount()?))
}

/// Sum of taxable line amounts
pub fn taxable_base<L: PricedLine>(lines: &[L]) -> ShopResult<Decimal> {
    lines
        .iter()
        .filter(|l| l.is_taxable())
        .try_fold(Decimal::ZERO, |acc, l| checked_add(acc, l.amount()?))
}

/// Tax on the taxable base; `rate` is a percentage (11.5 means 11.5%)
pub fn tax<L: PricedLine>(lines: &[L], rate: Decimal) -> ShopResult<Decimal> {
    let scaled = checked_mul(taxable_base(lines)?, rate)?;
    Ok(round_money(scaled / Decimal::ONE_HUNDRED))
}

/// Customer total. `discount` is a flat amount taken off after tax.
pub fn total<L: PricedLine>(lines: &[L], rate: Decimal, discount: Decimal) -> ShopResult<Decimal> {
    checked_sub(checked_add(subtotal(lines)?, tax(lines, rate)?)?, discount)
}

/// Internal cost of the lines (`cost x quantity`)
pub fn cost<L: PricedLine>(lines: &[L]) -> ShopResult<Decimal> {
    lines.iter().try_fold(Decimal::ZERO, |acc, l| {
        checked_add(acc, checked_mul(l.cost(), l.quantity())?)
    })
}

pub fn margin(subtotal: Decimal, cost: Decimal) -> ShopResult<Decimal> {
    checked_sub(subtotal, cost)
}

/// Margin as a percentage of subtotal, one decimal place; zero for an empty
/// subtotal
pub fn margin_pct(subtotal: Decimal, cost: Decimal) -> ShopResult<Decimal> {
    if subtotal.is_zero() {
        return Ok(Decimal::ZERO);
    }
    let ratio = margin(subtotal, cost)?
        .checked_div(subtotal)
        .ok_or_else(out_of_range)?;
    Ok(checked_mul(ratio, Decimal::ONE_HUNDRED)?
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero))
}

/// Unit price of a labor line billed by the hour
///
/// A data-entry convenience; stored items keep whatever unit price was
/// submitted.
pub fn labor_unit_price(hours: Decimal, labor_rate: Decimal) -> ShopResult<Decimal> {
    line_amount(hours, labor_rate)
}

/// All totals for one estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: Decimal,
    pub taxable_amount: Decimal,
    pub tax_amount: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

impl Totals {
    pub fn compute<L: PricedLine>(lines: &[L], rate: Decimal, discount: Decimal) -> ShopResult<Self> {
        let subtotal = subtotal(lines)?;
        let tax_amount = tax(lines, rate)?;
        Ok(Self {
            subtotal,
            taxable_amount: taxable_base(lines)?,
            tax_amount,
            discount,
            total: checked_sub(checked_add(subtotal, tax_amount)?, discount)?,
        })
    }
}

/// Owner-only profitability view of a set of lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Margin {
    pub cost: Decimal,
    pub margin: Decimal,
    pub margin_pct: Decimal,
}

impl Margin {
    pub fn compute<L: PricedLine>(lines: &[L]) -> ShopResult<Self> {
        Self::from_parts(subtotal(lines)?, cost(lines)?)
    }

    pub fn from_parts(subtotal: Decimal, cost: Decimal) -> ShopResult<Self> {
        Ok(Self {
            cost,
            margin: margin(subtotal, cost)?,
            margin_pct: margin_pct(subtotal, cost)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Line {
        qty: Decimal,
        price: Decimal,
        cost: Decimal,
        taxable: bool,
    }

    impl PricedLine for Line {
        fn quantity(&self) -> Decimal {
            self.qty
        }
        fn unit_price(&self) -> Decimal {
            self.price
        }
        fn cost(&self) -> Decimal {
            self.cost
        }
        fn is_taxable(&self) -> bool {
            self.taxable
        }
    }

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn line(qty: &str, price: &str, cost: &str, taxable: bool) -> Line {
        Line {
            qty: d(qty),
            price: d(price),
            cost: d(cost),
            taxable,
        }
    }

    fn brake_job() -> Vec<Line> {
        vec![
            line("1", "89.99", "45.00", true),
            line("1", "145.00", "80.00", true),
            line("1", "250.00", "0", false),
        ]
    }

    #[test]
    fn test_default_constants() {
        assert_eq!(DEFAULT_TAX_RATE, d("11.5"));
        assert_eq!(DEFAULT_LABOR_RATE, d("85.00"));
    }

    #[test]
    fn test_brake_job_totals() {
        let totals = Totals::compute(&brake_job(), d("11.5"), Decimal::ZERO).unwrap();
        assert_eq!(totals.subtotal, d("484.99"));
        assert_eq!(totals.taxable_amount, d("234.99"));
        assert_eq!(totals.tax_amount, d("27.02"));
        assert_eq!(totals.total, d("512.01"));
    }

    #[test]
    fn test_total_identity_with_discount() {
        let lines = brake_job();
        let discount = d("20.00");
        let totals = Totals::compute(&lines, d("11.5"), discount).unwrap();
        assert_eq!(totals.total, totals.subtotal + totals.tax_amount - discount);
        assert_eq!(total(&lines, d("11.5"), discount).unwrap(), totals.total);
    }

    #[test]
    fn test_negative_discount_adds() {
        let totals = Totals::compute(&brake_job(), d("11.5"), d("-5")).unwrap();
        assert_eq!(totals.total, d("517.01"));
    }

    #[test]
    fn test_tax_independent_of_order() {
        let mut lines = brake_job();
        let forward = tax(&lines, d("7.25")).unwrap();
        lines.reverse();
        assert_eq!(tax(&lines, d("7.25")).unwrap(), forward);
    }

    #[test]
    fn test_tax_only_on_taxable_lines() {
        let lines = vec![line("2", "10.00", "0", false), line("1", "5.00", "0", false)];
        assert_eq!(tax(&lines, d("11.5")).unwrap(), Decimal::ZERO);
        assert_eq!(subtotal(&lines).unwrap(), d("25.00"));
    }

    #[test]
    fn test_fractional_quantity_rounds_line() {
        // 1.5 h at 85.333/h = 127.9995
        assert_eq!(line_amount(d("1.5"), d("85.333")).unwrap(), d("128.00"));
    }

    #[test]
    fn test_cost_and_margin() {
        let lines = vec![
            line("2", "50.00", "30.00", true),
            line("1", "100.00", "0", false),
        ];
        assert_eq!(cost(&lines).unwrap(), d("60.00"));
        let m = Margin::compute(&lines).unwrap();
        assert_eq!(m.margin, d("140.00"));
        assert_eq!(m.margin_pct, d("70.0"));
    }

    #[test]
    fn test_margin_pct_zero_subtotal() {
        assert_eq!(margin_pct(Decimal::ZERO, d("10")).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_cost_does_not_touch_totals() {
        let cheap = vec![line("1", "100.00", "0", true)];
        let dear = vec![line("1", "100.00", "99.00", true)];
        assert_eq!(
            Totals::compute(&cheap, d("11.5"), Decimal::ZERO).unwrap(),
            Totals::compute(&dear, d("11.5"), Decimal::ZERO).unwrap()
        );
    }

    #[test]
    fn test_labor_unit_price() {
        assert_eq!(labor_unit_price(d("2.5"), d("85")).unwrap(), d("212.50"));
    }

    #[test]
    fn test_empty_lines() {
        let lines: Vec<Line> = Vec::new();
        let totals = Totals::compute(&lines, d("11.5"), Decimal::ZERO).unwrap();
        assert_eq!(totals.total, Decimal::ZERO);
    }

    #[test]
    fn test_huge_line_is_out_of_range() {
        let err = line_amount(d("100000000000000000000"), d("100000000000000000000")).unwrap_err();
        assert_eq!(err.to_string(), "Validation failed: amount out of range");

        let lines = vec![line("100000000000000000000", "100000000000000000000", "0", true)];
        assert!(matches!(
            Totals::compute(&lines, d("11.5"), Decimal::ZERO),
            Err(ShopError::ValidationFailed(_))
        ));
    }

    #[test]
    fn test_subtotal_overflow_is_out_of_range() {
        let big = "50000000000000000000000000000";
        let lines = vec![line("1", big, "0", false), line("1", big, "0", false)];
        assert!(lines[0].amount().is_ok());
        assert!(matches!(subtotal(&lines), Err(ShopError::ValidationFailed(_))));
        assert!(matches!(cost(&[line("2", "1", big, true)]), Err(ShopError::ValidationFailed(_))));
        assert!(checked_add(Decimal::MAX, Decimal::ONE).is_err());
    }

    #[test]
    fn test_discount_overflow_is_out_of_range() {
        let lines = vec![line("1", "10", "0", false)];
        assert!(total(&lines, d("0"), Decimal::MIN).is_err());
    }
}
