//! Aggregated views over a computed schedule: how the total cost splits
//! between principal and interest, how far the loan is paid off, and the
//! schedule rolled up by year.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::schedule::{AmortizationResult, PERCENT};

const MONTHS_PER_YEAR: u32 = 12;

impl AmortizationResult {
    /// The part of the total payment that went to principal.
    pub fn principal_paid(&self) -> Decimal {
        self.total_payment - self.total_interest
    }

    /// Percentage of the starting balance repaid once `month` is paid.
    ///
    /// Returns `None` for months outside the schedule.
    pub fn payoff_progress(&self, month: u32) -> Option<Decimal> {
        let entry = self.schedule.iter().find(|entry| entry.month == month)?;
        let starting_balance: Decimal = self.schedule.iter().map(|e| e.principal_portion).sum();
        if starting_balance.is_zero() {
            return Some(Decimal::ZERO);
        }

        let repaid = Decimal::ONE - entry.remaining_balance / starting_balance;
        Some((repaid * PERCENT).max(Decimal::ZERO))
    }
}

/// Split of the total amount paid into principal and interest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub principal: Decimal,
    pub interest: Decimal,
    pub principal_share_percent: Decimal,
    pub interest_share_percent: Decimal,
}

impl CostBreakdown {
    pub fn from_result(result: &AmortizationResult) -> Self {
        let principal = result.principal_paid();
        let interest = result.total_interest;
        let share = |part: Decimal| {
            if result.total_payment.is_zero() {
                Decimal::ZERO
            } else {
                part / result.total_payment * PERCENT
            }
        };

        Self {
            principal,
            interest,
            principal_share_percent: share(principal),
            interest_share_percent: share(interest),
        }
    }
}

/// One year of payments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearSummary {
    pub year: u32,
    pub payment: Decimal,
    pub principal: Decimal,
    pub interest: Decimal,
    pub closing_balance: Decimal,
}

/// Rolls the schedule up into blocks of twelve months. A trailing partial
/// year is kept as its own entry.
pub fn yearly_summary(result: &AmortizationResult) -> Vec<YearSummary> {
    let mut years: Vec<YearSummary> = Vec::new();

    for entry in &result.schedule {
        let year = (entry.month - 1) / MONTHS_PER_YEAR + 1;
        match years.last_mut() {
            Some(current) if current.year == year => {
                current.payment += entry.payment;
                current.principal += entry.principal_portion;
                current.interest += entry.interest_portion;
                current.closing_balance = entry.remaining_balance;
            }
            _ => years.push(YearSummary {
                year,
                payment: entry.payment,
                principal: entry.principal_portion,
                interest: entry.interest_portion,
                closing_balance: entry.remaining_balance,
            }),
        }
    }

    years
}
