use log::debug;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;

pub(crate) const MONTHS_PER_YEAR: Decimal = dec!(12);
pub(crate) const PERCENT: Decimal = dec!(100);

/// Longest term accepted, in months (100 years).
pub const MAX_TERM_MONTHS: u32 = 1200;

/// How the loan is repaid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Equal total payment every month.
    #[default]
    Annuity,
    /// Equal principal portion every month, so the payment shrinks over time.
    Differential,
}

/// Input parameters for a schedule calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanSpecification {
    /// The amount being repaid, after any down payment.
    pub principal: Decimal,
    /// The nominal annual interest rate as a percentage (e.g., 6.0 for 6%).
    pub annual_rate_percent: Decimal,
    /// The number of monthly payments.
    pub term_months: u32,
    /// Annuity or differential repayment.
    pub payment_method: PaymentMethod,
}

/// The breakdown of a single monthly payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// 1-based month number.
    pub month: u32,
    /// The total amount paid this month.
    pub payment: Decimal,
    /// The part of the payment that reduces the balance.
    #[serde(rename = "principal")]
    pub principal_portion: Decimal,
    /// The part of the payment that covers this month's interest.
    #[serde(rename = "interest")]
    pub interest_portion: Decimal,
    /// Balance left after this payment, never below zero.
    #[serde(rename = "balance")]
    pub remaining_balance: Decimal,
}

/// A complete amortization schedule with its totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationResult {
    /// The payment of the first month. Constant for annuity loans; for
    /// differential loans it is the largest payment of the schedule.
    pub monthly_payment: Decimal,
    /// The sum of every payment in the schedule.
    pub total_payment: Decimal,
    /// The sum of every interest portion in the schedule.
    pub total_interest: Decimal,
    /// One entry per month, in chronological order.
    pub schedule: Vec<ScheduleEntry>,
}

/// Converts a nominal annual percentage into the monthly rate as a decimal
/// factor (6.0 becomes 0.005).
pub fn monthly_rate(annual_rate_percent: Decimal) -> Decimal {
    annual_rate_percent / MONTHS_PER_YEAR / PERCENT
}

/// Calculates the fixed monthly payment of an annuity loan.
///
/// The formula is: PMT = P * [r(1 + r)^n] / [(1 + r)^n - 1], falling back to
/// P / n for interest-free loans.
///
/// # Arguments
///
/// * `principal` - The loan amount.
/// * `monthly_rate` - The monthly interest rate as a decimal (not percentage).
/// * `term_months` - The total number of payments.
///
/// # Errors
///
/// Returns `InvalidInput` if `term_months` is zero and `Computation` if the
/// intermediate values leave the decimal range.
pub fn annuity_payment(
    principal: Decimal,
    monthly_rate: Decimal,
    term_months: u32,
) -> Result<Decimal, ScheduleError> {
    if term_months == 0 {
        return Err(ScheduleError::invalid("term_months", "must be at least one month"));
    }

    if monthly_rate.is_zero() {
        return principal
            .checked_div(Decimal::from(term_months))
            .ok_or_else(|| ScheduleError::overflow("annuity payment"));
    }

    let growth = (Decimal::ONE + monthly_rate)
        .checked_powu(term_months.into())
        .ok_or_else(|| ScheduleError::overflow("compound growth factor"))?;

    principal
        .checked_mul(monthly_rate)
        .and_then(|v| v.checked_mul(growth))
        .and_then(|v| v.checked_div(growth - Decimal::ONE))
        .ok_or_else(|| ScheduleError::overflow("annuity payment"))
}

/// Builds the month-by-month schedule for a loan along with its totals.
///
/// Totals are accumulated in the same pass that produces the entries, and the
/// result is returned whole or not at all.
///
/// # Errors
///
/// Returns `InvalidInput` if the term is zero or above `MAX_TERM_MONTHS`, and
/// `Computation` if any step overflows the decimal range.
pub fn compute_schedule(spec: &LoanSpecification) -> Result<AmortizationResult, ScheduleError> {
    if spec.term_months == 0 {
        return Err(ScheduleError::invalid("term_months", "must be at least one month"));
    }
    if spec.term_months > MAX_TERM_MONTHS {
        return Err(ScheduleError::invalid(
            "term_months",
            format!("must be at most {MAX_TERM_MONTHS} months"),
        ));
    }

    let rate = monthly_rate(spec.annual_rate_percent);
    debug!(
        "computing {:?} schedule: principal {}, monthly rate {}, {} months",
        spec.payment_method, spec.principal, rate, spec.term_months
    );

    let mut builder = ScheduleBuilder::with_capacity(spec.term_months);
    match spec.payment_method {
        PaymentMethod::Annuity => annuity_pass(spec, rate, &mut builder)?,
        PaymentMethod::Differential => differential_pass(spec, rate, &mut builder)?,
    }

    builder.finish()
}

fn annuity_pass(
    spec: &LoanSpecification,
    rate: Decimal,
    builder: &mut ScheduleBuilder,
) -> Result<(), ScheduleError> {
    let payment = annuity_payment(spec.principal, rate, spec.term_months)?;
    let mut balance = spec.principal;

    for month in 1..=spec.term_months {
        let interest = balance
            .checked_mul(rate)
            .ok_or_else(|| ScheduleError::overflow("annuity interest"))?;
        let principal_portion = payment
            .checked_sub(interest)
            .ok_or_else(|| ScheduleError::overflow("annuity principal portion"))?;
        balance = balance
            .checked_sub(principal_portion)
            .ok_or_else(|| ScheduleError::overflow("annuity balance"))?;

        builder.push(ScheduleEntry {
            month,
            payment,
            principal_portion,
            interest_portion: interest,
            remaining_balance: balance.max(Decimal::ZERO),
        })?;
    }

    Ok(())
}

fn differential_pass(
    spec: &LoanSpecification,
    rate: Decimal,
    builder: &mut ScheduleBuilder,
) -> Result<(), ScheduleError> {
    let principal_portion = spec.principal / Decimal::from(spec.term_months);
    let mut balance = spec.principal;

    for month in 1..=spec.term_months {
        // Interest is charged on what was outstanding before this month's
        // principal repayment.
        let outstanding = principal_portion
            .checked_mul(Decimal::from(month - 1))
            .and_then(|repaid| spec.principal.checked_sub(repaid))
            .ok_or_else(|| ScheduleError::overflow("differential outstanding principal"))?;
        let interest = outstanding
            .checked_mul(rate)
            .ok_or_else(|| ScheduleError::overflow("differential interest"))?;
        let payment = principal_portion
            .checked_add(interest)
            .ok_or_else(|| ScheduleError::overflow("differential payment"))?;
        balance = balance
            .checked_sub(principal_portion)
            .ok_or_else(|| ScheduleError::overflow("differential balance"))?;

        builder.push(ScheduleEntry {
            month,
            payment,
            principal_portion,
            interest_portion: interest,
            remaining_balance: balance.max(Decimal::ZERO),
        })?;
    }

    Ok(())
}

struct ScheduleBuilder {
    schedule: Vec<ScheduleEntry>,
    total_payment: Decimal,
    total_interest: Decimal,
}

impl ScheduleBuilder {
    fn with_capacity(term_months: u32) -> Self {
        Self {
            schedule: Vec::with_capacity(term_months as usize),
            total_payment: Decimal::ZERO,
            total_interest: Decimal::ZERO,
        }
    }

    fn push(&mut self, entry: ScheduleEntry) -> Result<(), ScheduleError> {
        self.total_payment = self
            .total_payment
            .checked_add(entry.payment)
            .ok_or_else(|| ScheduleError::overflow("total payment"))?;
        self.total_interest = self
            .total_interest
            .checked_add(entry.interest_portion)
            .ok_or_else(|| ScheduleError::overflow("total interest"))?;
        self.schedule.push(entry);
        Ok(())
    }

    fn finish(self) -> Result<AmortizationResult, ScheduleError> {
        let monthly_payment = self
            .schedule
            .first()
            .map(|entry| entry.payment)
            .ok_or_else(|| ScheduleError::Computation("schedule has no entries".to_string()))?;

        Ok(AmortizationResult {
            monthly_payment,
            total_payment: self.total_payment,
            total_interest: self.total_interest,
            schedule: self.schedule,
        })
    }
}
