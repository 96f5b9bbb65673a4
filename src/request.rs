//! Decoding of calculation requests and encoding of their responses.
//!
//! Requests arrive as loosely typed JSON, the way a web form submits them:
//! numbers may come as JSON numbers or as strings. Required fields are
//! validated before the engine runs; the optional down payment is applied
//! leniently.

use std::str::FromStr;

use log::{error, warn};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::ScheduleError;
use crate::schedule::{
    compute_schedule, AmortizationResult, LoanSpecification, PaymentMethod, MAX_TERM_MONTHS,
};

pub const LOAN_AMOUNT: &str = "loanAmount";
pub const INTEREST_RATE: &str = "interestRate";
pub const LOAN_TERM: &str = "loanTerm";
pub const DOWN_PAYMENT: &str = "downPayment";
pub const PAYMENT_TYPE: &str = "paymentType";

const COMPUTATION_FAILED: &str = "calculation failed";

/// A validated calculation request.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationRequest {
    /// The loan amount as submitted, before the down payment.
    pub loan_amount: Decimal,
    /// The nominal annual interest rate as a percentage.
    pub interest_rate: Decimal,
    /// The number of monthly payments, between one and `MAX_TERM_MONTHS`.
    pub loan_term: u32,
    /// The down payment, if one was supplied as a number.
    pub down_payment: Option<Decimal>,
    /// The repayment method; annuity unless differential was asked for.
    pub payment_method: PaymentMethod,
    principal: Decimal,
}

impl CalculationRequest {
    /// Decodes and validates a request body.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` naming the offending field when a required field
    /// is missing, non-numeric or out of the decimal range, the rate is
    /// negative, the term is outside `1..=MAX_TERM_MONTHS`, or the down
    /// payment leaves nothing to borrow.
    pub fn from_value(body: &Value) -> Result<Self, ScheduleError> {
        let fields = body
            .as_object()
            .ok_or_else(|| ScheduleError::invalid("body", "expected a JSON object"))?;

        let loan_amount = required_decimal(fields.get(LOAN_AMOUNT), LOAN_AMOUNT)?;
        let interest_rate = required_decimal(fields.get(INTEREST_RATE), INTEREST_RATE)?;
        let loan_term = loan_term(fields.get(LOAN_TERM))?;
        let down_payment = down_payment(fields.get(DOWN_PAYMENT))?;
        let payment_method = payment_method(fields.get(PAYMENT_TYPE));

        if interest_rate < Decimal::ZERO {
            return Err(ScheduleError::invalid(INTEREST_RATE, "must not be negative"));
        }

        let principal = match down_payment {
            Some(down_payment) => loan_amount
                .checked_sub(down_payment)
                .ok_or_else(|| ScheduleError::invalid(LOAN_AMOUNT, "minus the down payment is out of range"))?,
            None => loan_amount,
        };
        if principal <= Decimal::ZERO {
            return Err(ScheduleError::invalid(
                LOAN_AMOUNT,
                "must be greater than the down payment",
            ));
        }

        Ok(Self {
            loan_amount,
            interest_rate,
            loan_term,
            down_payment,
            payment_method,
            principal,
        })
    }

    /// The amount actually borrowed.
    pub fn principal(&self) -> Decimal {
        self.principal
    }

    pub fn loan_specification(&self) -> LoanSpecification {
        LoanSpecification {
            principal: self.principal,
            annual_rate_percent: self.interest_rate,
            term_months: self.loan_term,
            payment_method: self.payment_method,
        }
    }

    pub fn calculate(&self) -> Result<AmortizationResult, ScheduleError> {
        compute_schedule(&self.loan_specification())
    }
}

/// Status and JSON body returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationResponse {
    /// HTTP-style status: 200, 400 for invalid input, 500 for a failed calculation.
    pub status: u16,
    /// The serialized schedule on success, otherwise `{"error": ...}`.
    pub body: Value,
}

impl CalculationResponse {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    fn from_error(err: &ScheduleError) -> Self {
        let message = match err {
            ScheduleError::InvalidInput { .. } => err.to_string(),
            ScheduleError::Computation(detail) => {
                error!("schedule computation failed: {detail}");
                COMPUTATION_FAILED.to_string()
            }
        };
        Self {
            status: err.status(),
            body: json!({ "error": message }),
        }
    }
}

/// Runs a raw request body through validation and the engine.
pub fn handle_request(body: &str) -> CalculationResponse {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => handle_value(&value),
        Err(e) => CalculationResponse::from_error(&ScheduleError::invalid(
            "body",
            format!("malformed JSON: {e}"),
        )),
    }
}

/// Same as [`handle_request`] for an already parsed body.
pub fn handle_value(body: &Value) -> CalculationResponse {
    let outcome = CalculationRequest::from_value(body)
        .and_then(|request| request.calculate())
        .and_then(|result| {
            serde_json::to_value(&result).map_err(|e| ScheduleError::Computation(e.to_string()))
        });

    match outcome {
        Ok(body) => CalculationResponse { status: 200, body },
        Err(err) => CalculationResponse::from_error(&err),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumberError {
    NotNumeric,
    OutOfRange,
}

impl NumberError {
    fn reason(self) -> &'static str {
        match self {
            NumberError::NotNumeric => "must be a number",
            NumberError::OutOfRange => "is out of range",
        }
    }
}

fn parse_decimal(value: &Value) -> Result<Decimal, NumberError> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return Err(NumberError::NotNumeric),
    };
    if text.is_empty() {
        return Err(NumberError::NotNumeric);
    }

    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| match text.parse::<f64>() {
            // A real number that does not fit 28 digits of scale or the 96-bit range.
            Ok(n) if n.is_finite() => NumberError::OutOfRange,
            _ => NumberError::NotNumeric,
        })
}

fn required_decimal(value: Option<&Value>, field: &str) -> Result<Decimal, ScheduleError> {
    match value {
        None | Some(Value::Null) => Err(ScheduleError::invalid(field, "is required")),
        Some(v) => parse_decimal(v).map_err(|e| ScheduleError::invalid(field, e.reason())),
    }
}

fn loan_term(value: Option<&Value>) -> Result<u32, ScheduleError> {
    // Fractional terms are cut to whole months.
    let months = required_decimal(value, LOAN_TERM)?.trunc();
    if months < Decimal::ONE {
        return Err(ScheduleError::invalid(LOAN_TERM, "must be at least one month"));
    }
    months
        .to_u32()
        .filter(|months| *months <= MAX_TERM_MONTHS)
        .ok_or_else(|| {
            ScheduleError::invalid(LOAN_TERM, format!("is too large (at most {MAX_TERM_MONTHS} months)"))
        })
}

fn down_payment(value: Option<&Value>) -> Result<Option<Decimal>, ScheduleError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(v) => match parse_decimal(v) {
            Ok(amount) => Ok(Some(amount)),
            Err(NumberError::OutOfRange) => {
                Err(ScheduleError::invalid(DOWN_PAYMENT, NumberError::OutOfRange.reason()))
            }
            Err(NumberError::NotNumeric) => {
                warn!("ignoring non-numeric {DOWN_PAYMENT}: {v}");
                Ok(None)
            }
        },
    }
}

fn payment_method(value: Option<&Value>) -> PaymentMethod {
    match value.and_then(Value::as_str) {
        Some("differential") => PaymentMethod::Differential,
        _ => PaymentMethod::Annuity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(json!(1500000), Ok(dec!(1500000)))]
    #[case(json!(12.5), Ok(dec!(12.5)))]
    #[case(json!(" 7.25 "), Ok(dec!(7.25)))]
    #[case(json!("1.2e6"), Ok(dec!(1200000)))]
    #[case(json!("1e30"), Err(NumberError::OutOfRange))]
    #[case(json!("1e-40"), Err(NumberError::OutOfRange))]
    #[case(json!(1e30), Err(NumberError::OutOfRange))]
    #[case(json!("abc"), Err(NumberError::NotNumeric))]
    #[case(json!("inf"), Err(NumberError::NotNumeric))]
    #[case(json!(""), Err(NumberError::NotNumeric))]
    #[case(json!(true), Err(NumberError::NotNumeric))]
    #[case(json!([1]), Err(NumberError::NotNumeric))]
    fn test_parse_decimal(#[case] value: Value, #[case] expected: Result<Decimal, NumberError>) {
        assert_eq!(parse_decimal(&value), expected);
    }

    #[test]
    fn test_out_of_range_number_is_reported_as_such() {
        let err = CalculationRequest::from_value(&json!({
            "loanAmount": "1e30",
            "interestRate": 6,
            "loanTerm": 12,
        }))
        .unwrap_err();

        assert_eq!(err, ScheduleError::invalid(LOAN_AMOUNT, "is out of range"));
    }

    #[rstest]
    #[case(Some(json!("differential")), PaymentMethod::Differential)]
    #[case(Some(json!("annuity")), PaymentMethod::Annuity)]
    #[case(Some(json!("Differential")), PaymentMethod::Annuity)]
    #[case(Some(json!(1)), PaymentMethod::Annuity)]
    #[case(None, PaymentMethod::Annuity)]
    fn test_payment_method_defaults_to_annuity(
        #[case] value: Option<Value>,
        #[case] expected: PaymentMethod,
    ) {
        assert_eq!(payment_method(value.as_ref()), expected);
    }

    #[rstest]
    #[case(json!(240), Ok(240))]
    #[case(json!("360"), Ok(360))]
    #[case(json!("12.9"), Ok(12))]
    #[case(json!(0), Err(()))]
    #[case(json!(-12), Err(()))]
    #[case(json!("ten"), Err(()))]
    #[case(json!(1200), Ok(1200))]
    #[case(json!(1201), Err(()))]
    #[case(json!("4000000000"), Err(()))]
    #[case(json!(10_000_000_000u64), Err(()))]
    fn test_loan_term(#[case] value: Value, #[case] expected: Result<u32, ()>) {
        assert_eq!(loan_term(Some(&value)).map_err(|_| ()), expected);
    }

    #[test]
    fn test_down_payment_is_subtracted() {
        let request = CalculationRequest::from_value(&json!({
            "loanAmount": 10_000_000,
            "interestRate": 6,
            "loanTerm": 240,
            "downPayment": "2000000",
        }))
        .unwrap();

        assert_eq!(request.down_payment, Some(dec!(2_000_000)));
        assert_eq!(request.loan_specification().principal, dec!(8_000_000));
    }

    #[rstest]
    #[case(json!("not a number"))]
    #[case(json!(""))]
    #[case(json!(null))]
    #[case(json!({ "amount": 5 }))]
    fn test_unusable_down_payment_is_ignored(#[case] down_payment: Value) {
        let request = CalculationRequest::from_value(&json!({
            "loanAmount": "500000",
            "interestRate": "8",
            "loanTerm": "60",
            "downPayment": down_payment,
        }))
        .unwrap();

        assert_eq!(request.down_payment, None);
        assert_eq!(request.principal(), dec!(500000));
    }

    #[rstest]
    #[case(json!({ "interestRate": 6, "loanTerm": 12 }), LOAN_AMOUNT)]
    #[case(json!({ "loanAmount": "x", "interestRate": 6, "loanTerm": 12 }), LOAN_AMOUNT)]
    #[case(json!({ "loanAmount": 1000, "loanTerm": 12 }), INTEREST_RATE)]
    #[case(json!({ "loanAmount": 1000, "interestRate": -1, "loanTerm": 12 }), INTEREST_RATE)]
    #[case(json!({ "loanAmount": 1000, "interestRate": 6, "loanTerm": null }), LOAN_TERM)]
    #[case(json!({ "loanAmount": 1000, "interestRate": 6, "loanTerm": 12, "downPayment": 1000 }), LOAN_AMOUNT)]
    #[case(json!([1000, 6, 12]), "body")]
    #[case(json!({ "loanAmount": "-79228162514264337593543950335", "interestRate": 6, "loanTerm": 12, "downPayment": "79228162514264337593543950335" }), LOAN_AMOUNT)]
    #[case(json!({ "loanAmount": "79228162514264337593543950335", "interestRate": 6, "loanTerm": 12, "downPayment": "-79228162514264337593543950335" }), LOAN_AMOUNT)]
    #[case(json!({ "loanAmount": 1000, "interestRate": 6, "loanTerm": 12, "downPayment": "1e30" }), DOWN_PAYMENT)]
    #[case(json!({ "loanAmount": 1000, "interestRate": 6, "loanTerm": 1201 }), LOAN_TERM)]
    fn test_validation_names_the_field(#[case] body: Value, #[case] field: &str) {
        match CalculationRequest::from_value(&body) {
            Err(ScheduleError::InvalidInput { field: actual, .. }) => assert_eq!(actual, field),
            other => panic!("expected invalid {field}, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_rate_is_accepted() {
        let request = CalculationRequest::from_value(&json!({
            "loanAmount": 1000,
            "interestRate": "0",
            "loanTerm": 10,
        }))
        .unwrap();
        assert_eq!(request.interest_rate, dec!(0));
    }

    #[test]
    fn test_computation_error_hides_detail() {
        let response = CalculationResponse::from_error(&ScheduleError::Computation(
            "decimal overflow in total payment".to_string(),
        ));
        assert_eq!(response.status, 500);
        assert_eq!(response.body, json!({ "error": "calculation failed" }));
    }
}
