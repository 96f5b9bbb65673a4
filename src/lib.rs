//! `mortgage_calc` computes month-by-month mortgage amortization schedules.
//!
//! Two repayment methods are supported:
//! - **Annuity**: the total payment is the same every month; the interest
//!   portion shrinks while the principal portion grows.
//! - **Differential**: the principal portion is the same every month, so the
//!   total payment decreases as the interest shrinks.
//!
//! All amounts are [`rust_decimal::Decimal`]. Interest is a nominal annual
//! percentage compounded monthly (`annual / 12 / 100`).
//!
//! ## Usage
//!
//! Compute a schedule directly from a [`LoanSpecification`]:
//!
//! ```rust
//! use mortgage_calc::{compute_schedule, LoanSpecification, PaymentMethod};
//! use rust_decimal_macros::dec;
//!
//! fn main() {
//!     let spec = LoanSpecification {
//!         principal: dec!(9_000_000),
//!         annual_rate_percent: dec!(6.0),
//!         term_months: 240,
//!         payment_method: PaymentMethod::Annuity,
//!     };
//!
//!     match compute_schedule(&spec) {
//!         Ok(result) => {
//!             println!("Monthly Payment: {:.2}", result.monthly_payment);
//!             println!("Total Paid:      {:.2}", result.total_payment);
//!             println!("Total Interest:  {:.2}", result.total_interest);
//!         }
//!         Err(e) => {
//!             eprintln!("Error calculating schedule: {}", e);
//!         }
//!     }
//! }
//! ```
//!
//! Or pass a raw JSON request through [`handle_request`], which validates it,
//! subtracts the down payment and reports failures as a status code:
//!
//! ```rust
//! let response = mortgage_calc::handle_request(
//!     r#"{"loanAmount": "10000000", "downPayment": "2000000",
//!         "interestRate": "6", "loanTerm": "240", "paymentType": "differential"}"#,
//! );
//! assert_eq!(response.status, 200);
//! assert_eq!(response.body["schedule"].as_array().unwrap().len(), 240);
//! ```

pub mod error;
pub mod request;
pub mod schedule;
pub mod summary;

pub use error::ScheduleError;
pub use request::{handle_request, handle_value, CalculationRequest, CalculationResponse};
pub use schedule::{
    annuity_payment, compute_schedule, monthly_rate, AmortizationResult, LoanSpecification,
    PaymentMethod, ScheduleEntry, MAX_TERM_MONTHS,
};
pub use summary::{yearly_summary, CostBreakdown, YearSummary};
