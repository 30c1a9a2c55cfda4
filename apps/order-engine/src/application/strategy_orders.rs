//! Expansion of an option strategy into per-leg order requests.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::option_strategies::{OptionLegData, OptionStrategy};
use crate::domain::order_execution::{OrderProperties, OrderType, SubmitOrderRequest};
use crate::domain::portfolio::Portfolio;
use crate::domain::shared::{OptionStyle, Symbol};
use crate::error::EngineError;

/// Contract multiplier used for underlying legs when no option leg resolved.
const DEFAULT_CONTRACT_MULTIPLIER: Decimal = Decimal::ONE_HUNDRED;

/// Build one request per leg, option legs first, all tagged
/// `"{name} ({quantity})"`.
///
/// Every leg is resolved before any request is built, so a missing contract
/// or an unsupported leg order type fails the whole strategy.
///
/// # Errors
///
/// Returns error if a leg contract is not subscribed in either exercise
/// style, a leg uses an order type other than market or limit, or a limit
/// leg has no price.
pub fn build_strategy_orders(
    portfolio: &Portfolio,
    strategy: &OptionStrategy,
    quantity: Decimal,
    properties: &OrderProperties,
    now: DateTime<Utc>,
) -> Result<Vec<SubmitOrderRequest>, EngineError> {
    let Some(underlying) = strategy.underlying() else {
        return Err(EngineError::UnknownSecurity(
            strategy.canonical_option.to_string(),
        ));
    };

    let contracts = strategy
        .option_legs
        .iter()
        .map(|leg| resolve_contract(portfolio, strategy, underlying, leg))
        .collect::<Result<Vec<_>, _>>()?;

    let multiplier = contracts
        .first()
        .and_then(|contract| portfolio.securities().get(contract))
        .map_or(DEFAULT_CONTRACT_MULTIPLIER, |security| {
            security.properties().contract_multiplier
        });

    let tag = format!("{} ({quantity})", strategy.name);
    let mut requests = Vec::with_capacity(strategy.leg_count());

    for (leg, contract) in strategy.option_legs.iter().zip(contracts) {
        let leg_quantity = Decimal::from(leg.quantity) * quantity;
        requests.push(leg_request(
            strategy,
            leg.order_type,
            leg.order_price,
            contract,
            leg_quantity,
            now,
        )?);
    }

    for leg in &strategy.underlying_legs {
        let leg_quantity = Decimal::from(leg.quantity) * quantity * multiplier;
        requests.push(leg_request(
            strategy,
            leg.order_type,
            leg.order_price,
            underlying.clone(),
            leg_quantity,
            now,
        )?);
    }

    Ok(requests
        .into_iter()
        .map(|request| {
            request
                .with_tag(tag.clone())
                .with_properties(properties.clone())
        })
        .collect())
}

fn resolve_contract(
    portfolio: &Portfolio,
    strategy: &OptionStrategy,
    underlying: &Symbol,
    leg: &OptionLegData,
) -> Result<Symbol, EngineError> {
    [OptionStyle::American, OptionStyle::European]
        .into_iter()
        .map(|style| {
            Symbol::option_contract(underlying, leg.right, style, leg.strike, leg.expiration)
        })
        .find(|contract| portfolio.securities().contains(contract))
        .ok_or_else(|| EngineError::StrategyContractNotFound {
            strategy: strategy.name.clone(),
            right: leg.right,
            strike: leg.strike,
            expiration: leg.expiration,
        })
}

fn leg_request(
    strategy: &OptionStrategy,
    order_type: OrderType,
    order_price: Option<Decimal>,
    symbol: Symbol,
    quantity: Decimal,
    now: DateTime<Utc>,
) -> Result<SubmitOrderRequest, EngineError> {
    match order_type {
        OrderType::Market => Ok(SubmitOrderRequest::market(symbol, quantity, now)),
        OrderType::Limit => {
            let Some(limit_price) = order_price else {
                return Err(EngineError::MissingLegPrice {
                    strategy: strategy.name.clone(),
                });
            };
            Ok(SubmitOrderRequest::limit(symbol, quantity, limit_price, now))
        }
        other => Err(EngineError::UnsupportedLegOrderType {
            strategy: strategy.name.clone(),
            order_type: other,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use crate::domain::option_strategies::factory;
    use crate::domain::securities::{Resolution, Security, SymbolProperties};
    use crate::domain::shared::{OptionRight, SecurityType};

    fn expiry() -> NaiveDate {
        NaiveDate::from_ymd_opt(2015, 12, 24).unwrap()
    }

    fn goog() -> Symbol {
        Symbol::equity("GOOG")
    }

    fn portfolio_with(strikes: &[(OptionRight, Decimal, OptionStyle)]) -> Portfolio {
        let mut portfolio = Portfolio::new("USD", dec!(1000000));
        portfolio.securities_mut().add(Security::new(
            goog(),
            SymbolProperties::for_security_type(SecurityType::Equity, "USD"),
            Resolution::Minute,
        ));
        for (right, strike, style) in strikes {
            portfolio.securities_mut().add(Security::new(
                Symbol::option_contract(&goog(), *right, *style, *strike, expiry()),
                SymbolProperties::for_security_type(SecurityType::Option, "USD"),
                Resolution::Minute,
            ));
        }
        portfolio
    }

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_450_000_000, 0).unwrap()
    }

    #[test]
    fn butterfly_expands_to_three_tagged_legs() {
        let portfolio = portfolio_with(&[
            (OptionRight::Call, dec!(767.5), OptionStyle::American),
            (OptionRight::Call, dec!(762.5), OptionStyle::American),
            (OptionRight::Call, dec!(757.5), OptionStyle::American),
        ]);
        let chain = Symbol::canonical_option(&goog());
        let strategy =
            factory::call_butterfly(&chain, dec!(767.5), dec!(762.5), dec!(757.5), expiry()).unwrap();

        let requests =
            build_strategy_orders(&portfolio, &strategy, dec!(10), &OrderProperties::default(), now())
                .unwrap();

        let quantities: Vec<Decimal> = requests.iter().map(SubmitOrderRequest::quantity).collect();
        assert_eq!(quantities, vec![dec!(10), dec!(-20), dec!(10)]);
        assert!(requests.iter().all(|r| r.tag() == "Butterfly Call (10)"));
    }

    #[test]
    fn european_contract_is_found() {
        let portfolio = portfolio_with(&[(OptionRight::Put, dec!(750), OptionStyle::European)]);
        let chain = Symbol::canonical_option(&goog());
        let strategy = factory::protective_put(&chain, dec!(750), expiry()).unwrap();

        let requests =
            build_strategy_orders(&portfolio, &strategy, dec!(2), &OrderProperties::default(), now())
                .unwrap();

        assert_eq!(requests.len(), 2);
        assert_eq!(
            requests[0].symbol().option_details().map(|d| d.style),
            Some(OptionStyle::European)
        );
        assert_eq!(requests[1].symbol(), &goog());
        assert_eq!(requests[1].quantity(), dec!(200));
    }

    #[test]
    fn missing_contract_is_fatal() {
        let portfolio = portfolio_with(&[(OptionRight::Call, dec!(760), OptionStyle::American)]);
        let chain = Symbol::canonical_option(&goog());
        let strategy = factory::straddle(&chain, dec!(760), expiry()).unwrap();

        let result =
            build_strategy_orders(&portfolio, &strategy, dec!(1), &OrderProperties::default(), now());
        assert!(matches!(
            result,
            Err(EngineError::StrategyContractNotFound {
                right: OptionRight::Put,
                ..
            })
        ));
    }

    #[test]
    fn stop_leg_is_rejected() {
        let portfolio = portfolio_with(&[(OptionRight::Call, dec!(760), OptionStyle::American)]);
        let chain = Symbol::canonical_option(&goog());
        let mut strategy = factory::covered_call(&chain, dec!(760), expiry()).unwrap();
        strategy.option_legs[0].order_type = OrderType::StopMarket;

        let result =
            build_strategy_orders(&portfolio, &strategy, dec!(1), &OrderProperties::default(), now());
        assert!(matches!(result, Err(EngineError::UnsupportedLegOrderType { .. })));
    }

    #[test]
    fn limit_leg_carries_price() {
        let portfolio = portfolio_with(&[
            (OptionRight::Call, dec!(750), OptionStyle::American),
            (OptionRight::Call, dec!(760), OptionStyle::American),
        ]);
        let chain = Symbol::canonical_option(&goog());
        let mut strategy = factory::bull_call_spread(&chain, dec!(750), dec!(760), expiry()).unwrap();
        strategy.option_legs[0] = strategy.option_legs[0].clone().with_limit_price(dec!(12));

        let requests =
            build_strategy_orders(&portfolio, &strategy, dec!(-1), &OrderProperties::default(), now())
                .unwrap();
        assert_eq!(requests[0].order_type(), OrderType::Limit);
        assert_eq!(requests[0].limit_price(), Some(dec!(12)));
        assert_eq!(requests[0].quantity(), dec!(-1));
        assert_eq!(requests[0].tag(), "Bull Call Spread (-1)");
    }
}
