//! Fee models.

use std::fmt;

use rust_decimal::Decimal;

use super::Security;
use crate::domain::order_execution::OrderFee;
use crate::domain::shared::SecurityType;

/// Capability interface for order fees.
pub trait FeeModel: fmt::Debug + Send + Sync {
    /// Fee for filling a signed quantity at a price.
    fn order_fee(&self, security: &Security, quantity: Decimal, fill_price: Decimal) -> OrderFee;
}

/// Flat fee per fill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantFeeModel {
    fee: Decimal,
    currency: String,
}

impl ConstantFeeModel {
    /// Flat fee in the given currency.
    #[must_use]
    pub fn new(fee: Decimal, currency: impl Into<String>) -> Self {
        Self {
            fee: fee.abs(),
            currency: currency.into(),
        }
    }

    /// No fees.
    #[must_use]
    pub fn zero(currency: impl Into<String>) -> Self {
        Self::new(Decimal::ZERO, currency)
    }
}

impl FeeModel for ConstantFeeModel {
    fn order_fee(&self, _security: &Security, _quantity: Decimal, _fill_price: Decimal) -> OrderFee {
        OrderFee::new(self.fee, self.currency.clone())
    }
}

/// Per-share / per-contract commission with a minimum and a SEC fee on sells.
///
/// Charged in the security's quote currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerUnitFeeModel {
    /// Commission per share or unit.
    pub per_share: Decimal,
    /// Commission per option contract.
    pub per_contract: Decimal,
    /// Minimum commission per fill.
    pub minimum: Decimal,
    /// SEC fee per dollar of notional sold (equities only).
    pub sec_fee_per_dollar: Decimal,
}

impl Default for PerUnitFeeModel {
    fn default() -> Self {
        Self {
            per_share: Decimal::new(5, 3), // $0.005
            per_contract: Decimal::new(65, 2), // $0.65
            minimum: Decimal::ONE, // $1.00
            sec_fee_per_dollar: Decimal::new(278, 7), // $0.0000278
        }
    }
}

impl FeeModel for PerUnitFeeModel {
    fn order_fee(&self, security: &Security, quantity: Decimal, fill_price: Decimal) -> OrderFee {
        let units = quantity.abs();
        let currency = security.quote_currency().to_string();
        if units.is_zero() {
            return OrderFee::zero(currency);
        }

        let (base, regulatory) = match security.symbol().security_type() {
            SecurityType::Option | SecurityType::IndexOption => {
                (units * self.per_contract, Decimal::ZERO)
            }
            _ => {
                // SEC fee only on sells (based on notional value)
                let sec_fee = if quantity < Decimal::ZERO {
                    units * fill_price * security.properties().contract_multiplier
                        * self.sec_fee_per_dollar
                } else {
                    Decimal::ZERO
                };
                (units * self.per_share, sec_fee)
            }
        };

        let total = base.max(self.minimum) + regulatory;
        OrderFee::new(total.round_dp(2), currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use crate::domain::securities::{Resolution, SymbolProperties};
    use crate::domain::shared::{OptionRight, OptionStyle, Symbol};

    fn equity() -> Security {
        Security::new(
            Symbol::equity("SPY"),
            SymbolProperties::for_security_type(SecurityType::Equity, "USD"),
            Resolution::Minute,
        )
    }

    fn option() -> Security {
        let contract = Symbol::option_contract(
            &Symbol::equity("SPY"),
            OptionRight::Call,
            OptionStyle::American,
            dec!(450),
            NaiveDate::from_ymd_opt(2024, 1, 19).unwrap(),
        );
        Security::new(
            contract,
            SymbolProperties::for_security_type(SecurityType::Option, "USD"),
            Resolution::Minute,
        )
    }

    #[test]
    fn minimum_applies_to_small_buys() {
        let fee = PerUnitFeeModel::default().order_fee(&equity(), dec!(10), dec!(100));
        assert_eq!(fee.amount, dec!(1));
        assert_eq!(fee.currency, "USD");
    }

    #[test]
    fn large_buy_is_per_share() {
        let fee = PerUnitFeeModel::default().order_fee(&equity(), dec!(1000), dec!(100));
        assert_eq!(fee.amount, dec!(5));
    }

    #[test]
    fn sells_pay_sec_fee() {
        let fee = PerUnitFeeModel::default().order_fee(&equity(), dec!(-1000), dec!(100));
        // 5.00 commission + 100_000 * 0.0000278 = 2.78
        assert_eq!(fee.amount, dec!(7.78));
    }

    #[test]
    fn options_per_contract() {
        let fee = PerUnitFeeModel::default().order_fee(&option(), dec!(-10), dec!(2));
        assert_eq!(fee.amount, dec!(6.5));
    }

    #[test]
    fn constant_fee_ignores_size() {
        let model = ConstantFeeModel::new(dec!(2.5), "USD");
        assert_eq!(model.order_fee(&equity(), dec!(1), dec!(1)).amount, dec!(2.5));
        assert_eq!(model.order_fee(&equity(), dec!(-1000), dec!(1)).amount, dec!(2.5));
    }
}
