//! Named strategy factories.
//!
//! Every factory takes the canonical option symbol of the chain and returns
//! the strategy for one unit of quantity. Strike orderings are validated.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::{OptionLegData, OptionStrategy, UnderlyingLegData};
use crate::domain::shared::{DomainError, OptionRight, Symbol};

/// Short call against long underlying.
pub fn covered_call(
    canonical: &Symbol,
    strike: Decimal,
    expiration: NaiveDate,
) -> Result<OptionStrategy, DomainError> {
    build(
        "Covered Call",
        canonical,
        vec![OptionLegData::market(OptionRight::Call, strike, expiration, -1)],
        vec![UnderlyingLegData::market(1)],
    )
}

/// Long put protecting long underlying.
pub fn protective_put(
    canonical: &Symbol,
    strike: Decimal,
    expiration: NaiveDate,
) -> Result<OptionStrategy, DomainError> {
    build(
        "Protective Put",
        canonical,
        vec![OptionLegData::market(OptionRight::Put, strike, expiration, 1)],
        vec![UnderlyingLegData::market(1)],
    )
}

/// Long lower-strike call, short higher-strike call.
pub fn bull_call_spread(
    canonical: &Symbol,
    lower_strike: Decimal,
    higher_strike: Decimal,
    expiration: NaiveDate,
) -> Result<OptionStrategy, DomainError> {
    require_ascending(&[lower_strike, higher_strike])?;
    build(
        "Bull Call Spread",
        canonical,
        vec![
            OptionLegData::market(OptionRight::Call, lower_strike, expiration, 1),
            OptionLegData::market(OptionRight::Call, higher_strike, expiration, -1),
        ],
        Vec::new(),
    )
}

/// Short lower-strike call, long higher-strike call.
pub fn bear_call_spread(
    canonical: &Symbol,
    lower_strike: Decimal,
    higher_strike: Decimal,
    expiration: NaiveDate,
) -> Result<OptionStrategy, DomainError> {
    require_ascending(&[lower_strike, higher_strike])?;
    build(
        "Bear Call Spread",
        canonical,
        vec![
            OptionLegData::market(OptionRight::Call, lower_strike, expiration, -1),
            OptionLegData::market(OptionRight::Call, higher_strike, expiration, 1),
        ],
        Vec::new(),
    )
}

/// Short higher-strike put, long lower-strike put.
pub fn bull_put_spread(
    canonical: &Symbol,
    higher_strike: Decimal,
    lower_strike: Decimal,
    expiration: NaiveDate,
) -> Result<OptionStrategy, DomainError> {
    require_ascending(&[lower_strike, higher_strike])?;
    build(
        "Bull Put Spread",
        canonical,
        vec![
            OptionLegData::market(OptionRight::Put, higher_strike, expiration, -1),
            OptionLegData::market(OptionRight::Put, lower_strike, expiration, 1),
        ],
        Vec::new(),
    )
}

/// Long higher-strike put, short lower-strike put.
pub fn bear_put_spread(
    canonical: &Symbol,
    higher_strike: Decimal,
    lower_strike: Decimal,
    expiration: NaiveDate,
) -> Result<OptionStrategy, DomainError> {
    require_ascending(&[lower_strike, higher_strike])?;
    build(
        "Bear Put Spread",
        canonical,
        vec![
            OptionLegData::market(OptionRight::Put, higher_strike, expiration, 1),
            OptionLegData::market(OptionRight::Put, lower_strike, expiration, -1),
        ],
        Vec::new(),
    )
}

/// Long call and long put at the same strike.
pub fn straddle(
    canonical: &Symbol,
    strike: Decimal,
    expiration: NaiveDate,
) -> Result<OptionStrategy, DomainError> {
    build(
        "Straddle",
        canonical,
        vec![
            OptionLegData::market(OptionRight::Call, strike, expiration, 1),
            OptionLegData::market(OptionRight::Put, strike, expiration, 1),
        ],
        Vec::new(),
    )
}

/// Long out-of-the-money call and put.
pub fn strangle(
    canonical: &Symbol,
    call_strike: Decimal,
    put_strike: Decimal,
    expiration: NaiveDate,
) -> Result<OptionStrategy, DomainError> {
    require_ascending(&[put_strike, call_strike])?;
    build(
        "Strangle",
        canonical,
        vec![
            OptionLegData::market(OptionRight::Call, call_strike, expiration, 1),
            OptionLegData::market(OptionRight::Put, put_strike, expiration, 1),
        ],
        Vec::new(),
    )
}

/// Long wings, two short bodies, all calls.
pub fn call_butterfly(
    canonical: &Symbol,
    higher_strike: Decimal,
    middle_strike: Decimal,
    lower_strike: Decimal,
    expiration: NaiveDate,
) -> Result<OptionStrategy, DomainError> {
    butterfly(
        "Butterfly Call",
        OptionRight::Call,
        canonical,
        [higher_strike, middle_strike, lower_strike],
        expiration,
    )
}

/// Long wings, two short bodies, all puts.
pub fn put_butterfly(
    canonical: &Symbol,
    higher_strike: Decimal,
    middle_strike: Decimal,
    lower_strike: Decimal,
    expiration: NaiveDate,
) -> Result<OptionStrategy, DomainError> {
    butterfly(
        "Butterfly Put",
        OptionRight::Put,
        canonical,
        [higher_strike, middle_strike, lower_strike],
        expiration,
    )
}

fn butterfly(
    name: &str,
    right: OptionRight,
    canonical: &Symbol,
    [higher, middle, lower]: [Decimal; 3],
    expiration: NaiveDate,
) -> Result<OptionStrategy, DomainError> {
    require_ascending(&[lower, middle, higher])?;
    build(
        name,
        canonical,
        vec![
            OptionLegData::market(right, higher, expiration, 1),
            OptionLegData::market(right, middle, expiration, -2),
            OptionLegData::market(right, lower, expiration, 1),
        ],
        Vec::new(),
    )
}

/// Short put spread below, short call spread above.
pub fn iron_condor(
    canonical: &Symbol,
    long_put_strike: Decimal,
    short_put_strike: Decimal,
    short_call_strike: Decimal,
    long_call_strike: Decimal,
    expiration: NaiveDate,
) -> Result<OptionStrategy, DomainError> {
    require_ascending(&[
        long_put_strike,
        short_put_strike,
        short_call_strike,
        long_call_strike,
    ])?;
    build(
        "Iron Condor",
        canonical,
        vec![
            OptionLegData::market(OptionRight::Put, long_put_strike, expiration, 1),
            OptionLegData::market(OptionRight::Put, short_put_strike, expiration, -1),
            OptionLegData::market(OptionRight::Call, short_call_strike, expiration, -1),
            OptionLegData::market(OptionRight::Call, long_call_strike, expiration, 1),
        ],
        Vec::new(),
    )
}

/// Short near-term call, long far-term call at the same strike.
pub fn call_calendar_spread(
    canonical: &Symbol,
    strike: Decimal,
    near_expiration: NaiveDate,
    far_expiration: NaiveDate,
) -> Result<OptionStrategy, DomainError> {
    calendar(
        "Call Calendar Spread",
        OptionRight::Call,
        canonical,
        strike,
        near_expiration,
        far_expiration,
    )
}

/// Short near-term put, long far-term put at the same strike.
pub fn put_calendar_spread(
    canonical: &Symbol,
    strike: Decimal,
    near_expiration: NaiveDate,
    far_expiration: NaiveDate,
) -> Result<OptionStrategy, DomainError> {
    calendar(
        "Put Calendar Spread",
        OptionRight::Put,
        canonical,
        strike,
        near_expiration,
        far_expiration,
    )
}

fn calendar(
    name: &str,
    right: OptionRight,
    canonical: &Symbol,
    strike: Decimal,
    near_expiration: NaiveDate,
    far_expiration: NaiveDate,
) -> Result<OptionStrategy, DomainError> {
    if near_expiration >= far_expiration {
        return Err(DomainError::InvalidStrategy(format!(
            "{name}: near expiration must be before far expiration"
        )));
    }
    build(
        name,
        canonical,
        vec![
            OptionLegData::market(right, strike, near_expiration, -1),
            OptionLegData::market(right, strike, far_expiration, 1),
        ],
        Vec::new(),
    )
}

fn require_ascending(strikes: &[Decimal]) -> Result<(), DomainError> {
    if strikes.iter().any(|strike| *strike <= Decimal::ZERO) {
        return Err(DomainError::InvalidStrategy(
            "strikes must be positive".to_string(),
        ));
    }
    if strikes.windows(2).any(|pair| pair[0] >= pair[1]) {
        return Err(DomainError::InvalidStrategy(format!(
            "strikes must be strictly ascending: {strikes:?}"
        )));
    }
    Ok(())
}

fn build(
    name: &str,
    canonical: &Symbol,
    option_legs: Vec<OptionLegData>,
    underlying_legs: Vec<UnderlyingLegData>,
) -> Result<OptionStrategy, DomainError> {
    if !canonical.is_canonical() || canonical.underlying().is_none() {
        return Err(DomainError::InvalidStrategy(format!(
            "{name}: {canonical} is not a canonical option symbol"
        )));
    }
    Ok(OptionStrategy {
        name: name.to_string(),
        canonical_option: canonical.clone(),
        option_legs,
        underlying_legs,
    })
}
