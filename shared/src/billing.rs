//! Billing arithmetic for sales and purchase invoices
//!
//! Every amount is computed with `Decimal`. Line values are kept at full
//! precision while summing; persistence rounds to two places and the sales
//! invoice grand total is rounded to whole units with the difference recorded
//! as `round_off`. Arithmetic is checked so oversized inputs surface as
//! `BillingError::Overflow` instead of a panic.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{InvoiceItemInput, PurchaseItemInput};

/// Discount codes interpreted as a percentage of the gross line amount
pub const PERCENT_DISCOUNT_CODES: &[&str] = &["%", "PCT", "PERCENT"];

/// Discount type recorded on the invoice header when the first line has none
pub const DEFAULT_DISCOUNT_TYPE: &str = "INR";

/// Decimal places used for stored money values
pub const MONEY_PLACES: u32 = 2;

/// Round a money value to two places, half away from zero
pub fn money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BillingError {
    #[error("invoice amounts exceed the supported range")]
    Overflow,
}

pub type BillingResult<T> = Result<T, BillingError>;

fn add(a: Decimal, b: Decimal) -> BillingResult<Decimal> {
    a.checked_add(b).ok_or(BillingError::Overflow)
}

fn sub(a: Decimal, b: Decimal) -> BillingResult<Decimal> {
    a.checked_sub(b).ok_or(BillingError::Overflow)
}

fn mul(a: Decimal, b: Decimal) -> BillingResult<Decimal> {
    a.checked_mul(b).ok_or(BillingError::Overflow)
}

/// `value * percent / 100`
fn percent_of(value: Decimal, percent: Decimal) -> BillingResult<Decimal> {
    mul(value, percent)?
        .checked_div(Decimal::ONE_HUNDRED)
        .ok_or(BillingError::Overflow)
}

fn sum<T>(rows: &[T], f: impl Fn(&T) -> Decimal) -> BillingResult<Decimal> {
    rows.iter().try_fold(Decimal::ZERO, |acc, row| add(acc, f(row)))
}

/// How a line's `discount_value` is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    /// `discount_value` is an absolute amount
    Flat,
    /// `discount_value` is a percentage of the gross amount
    Percent,
}

impl DiscountKind {
    /// Unknown and empty codes fall back to a flat amount.
    pub fn parse(code: &str) -> Self {
        if PERCENT_DISCOUNT_CODES.contains(&code) {
            DiscountKind::Percent
        } else {
            DiscountKind::Flat
        }
    }

    /// Discount for a gross amount, never negative
    pub fn amount(self, gross: Decimal, value: Decimal) -> BillingResult<Decimal> {
        let amount = match self {
            DiscountKind::Percent => percent_of(gross, value)?,
            DiscountKind::Flat => value,
        };
        Ok(amount.max(Decimal::ZERO))
    }
}

/// Computed amounts for one sales invoice line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineAmounts {
    pub gross: Decimal,
    pub discount: Decimal,
    pub taxable: Decimal,
    pub gst: Decimal,
    pub line_total: Decimal,
}

/// Compute the amounts of a single sales line
pub fn compute_line(
    quantity: i32,
    sales_rate: Decimal,
    discount_type: &str,
    discount_value: Decimal,
    gst_percent: Decimal,
) -> BillingResult<LineAmounts> {
    let gross = mul(Decimal::from(quantity), sales_rate)?;
    let discount = DiscountKind::parse(discount_type).amount(gross, discount_value)?;
    let taxable = sub(gross, discount)?.max(Decimal::ZERO);
    let gst = percent_of(taxable, gst_percent)?;

    Ok(LineAmounts {
        gross,
        discount,
        taxable,
        gst,
        line_total: add(taxable, gst)?,
    })
}

impl InvoiceItemInput {
    pub fn amounts(&self) -> BillingResult<LineAmounts> {
        compute_line(
            self.quantity,
            self.sales_rate,
            &self.discount_type,
            self.discount_value,
            self.gst_percent,
        )
    }
}

/// Header totals of a sales invoice
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceTotals {
    pub lines: Vec<LineAmounts>,
    pub total_amount_before_discount: Decimal,
    pub total_discount: Decimal,
    pub taxable_amount: Decimal,
    pub total_gst: Decimal,
    /// Sum of line totals before rounding to whole units
    pub unrounded_total: Decimal,
    pub round_off: Decimal,
    pub total_invoice_amount: Decimal,
    pub total_items: i32,
    pub total_quantity: i64,
}

/// Compute sales invoice totals from its lines
pub fn compute_invoice_totals(items: &[InvoiceItemInput]) -> BillingResult<InvoiceTotals> {
    let lines = items
        .iter()
        .map(InvoiceItemInput::amounts)
        .collect::<BillingResult<Vec<_>>>()?;

    let total_amount_before_discount = sum(&lines, |l| l.gross)?;
    let total_discount = sum(&lines, |l| l.discount)?;
    let taxable_amount = sum(&lines, |l| l.taxable)?;
    let total_gst = sum(&lines, |l| l.gst)?;
    let unrounded_total = sum(&lines, |l| l.line_total)?;

    let total_invoice_amount =
        unrounded_total.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let round_off = sub(total_invoice_amount, unrounded_total)?;

    Ok(InvoiceTotals {
        total_amount_before_discount,
        total_discount,
        taxable_amount,
        total_gst,
        unrounded_total,
        round_off,
        total_invoice_amount,
        total_items: i32::try_from(lines.len()).unwrap_or(i32::MAX),
        total_quantity: items.iter().map(|i| i64::from(i.quantity)).sum(),
        lines,
    })
}

/// Discount type and value mirrored onto the invoice header (taken from the first line)
pub fn header_discount(items: &[InvoiceItemInput]) -> (String, Decimal) {
    match items.first() {
        Some(item) if !item.discount_type.is_empty() => {
            (item.discount_type.clone(), item.discount_value)
        }
        Some(item) => (DEFAULT_DISCOUNT_TYPE.to_string(), item.discount_value),
        None => (DEFAULT_DISCOUNT_TYPE.to_string(), Decimal::ZERO),
    }
}

/// Computed amounts for one purchase line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PurchaseLineAmounts {
    pub base: Decimal,
    pub gst: Decimal,
    pub line_total: Decimal,
}

impl PurchaseItemInput {
    pub fn amounts(&self) -> BillingResult<PurchaseLineAmounts> {
        let base = mul(Decimal::from(self.quantity), self.purchase_price)?;
        let gst = percent_of(base, self.gst_percent)?;
        Ok(PurchaseLineAmounts {
            base,
            gst,
            line_total: add(base, gst)?,
        })
    }
}

/// Header totals of a purchase invoice
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseTotals {
    pub lines: Vec<PurchaseLineAmounts>,
    pub total_amount_before_discount: Decimal,
    pub total_gst: Decimal,
    pub total_amount: Decimal,
    pub total_items: i32,
    pub total_quantity: i64,
}

/// Compute purchase invoice totals (purchases carry no discount)
pub fn compute_purchase_totals(items: &[PurchaseItemInput]) -> BillingResult<PurchaseTotals> {
    let lines = items
        .iter()
        .map(PurchaseItemInput::amounts)
        .collect::<BillingResult<Vec<_>>>()?;

    Ok(PurchaseTotals {
        total_amount_before_discount: sum(&lines, |l| l.base)?,
        total_gst: sum(&lines, |l| l.gst)?,
        total_amount: sum(&lines, |l| l.line_total)?,
        total_items: i32::try_from(lines.len()).unwrap_or(i32::MAX),
        total_quantity: items.iter().map(|i| i64::from(i.quantity)).sum(),
        lines,
    })
}

/// Sales invoice number: `INV` + issue date + four-digit serial
pub fn format_invoice_number(date: NaiveDate, serial: i64) -> String {
    format!("INV{}{:04}", date.format("%Y%m%d"), serial.rem_euclid(10_000))
}
