//! Algorithm settings.
//!
//! Settings are freely mutable until the simulation clock starts, then
//! locked for the rest of the run. Every mutator checks the lock.

use chrono::Duration;
use rust_decimal::Decimal;

use crate::error::EngineError;

/// Default lifetime order cap for non-live runs.
pub const DEFAULT_MAX_ORDERS: usize = 10_000;

/// Run-wide order and sizing settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmSettings {
    max_orders: usize,
    market_on_close_buffer: Duration,
    live_mode: bool,
    liquidate_enabled: bool,
    minimum_order_margin_portfolio_percentage: Decimal,
    free_portfolio_value_percentage: Decimal,
    partial_fill_volume_fraction: Option<Decimal>,
    locked: bool,
}

impl Default for AlgorithmSettings {
    fn default() -> Self {
        Self {
            max_orders: DEFAULT_MAX_ORDERS,
            // 15.5 minutes
            market_on_close_buffer: Duration::seconds(930),
            live_mode: false,
            liquidate_enabled: true,
            minimum_order_margin_portfolio_percentage: Decimal::new(1, 3),
            free_portfolio_value_percentage: Decimal::new(25, 4),
            partial_fill_volume_fraction: None,
            locked: false,
        }
    }
}

impl AlgorithmSettings {
    /// Lifetime order cap for non-live runs.
    #[must_use]
    pub const fn max_orders(&self) -> usize {
        self.max_orders
    }

    /// Latest submission time before the close for market-on-close orders.
    #[must_use]
    pub const fn market_on_close_buffer(&self) -> Duration {
        self.market_on_close_buffer
    }

    /// Whether the run trades live.
    #[must_use]
    pub const fn live_mode(&self) -> bool {
        self.live_mode
    }

    /// Whether `liquidate` is allowed to place orders.
    #[must_use]
    pub const fn liquidate_enabled(&self) -> bool {
        self.liquidate_enabled
    }

    /// Orders worth less than this fraction of portfolio value resolve to zero.
    #[must_use]
    pub const fn minimum_order_margin_portfolio_percentage(&self) -> Decimal {
        self.minimum_order_margin_portfolio_percentage
    }

    /// Fraction of portfolio value kept out of target sizing.
    #[must_use]
    pub const fn free_portfolio_value_percentage(&self) -> Decimal {
        self.free_portfolio_value_percentage
    }

    /// Maximum fraction of a bar's volume one fill may take.
    #[must_use]
    pub const fn partial_fill_volume_fraction(&self) -> Option<Decimal> {
        self.partial_fill_volume_fraction
    }

    /// Whether the settings are locked.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.locked
    }

    /// Lock the settings. Locking is one-way.
    pub const fn lock(&mut self) {
        self.locked = true;
    }

    /// Set the order cap.
    ///
    /// # Errors
    ///
    /// Returns error if the settings are locked.
    pub fn set_max_orders(&mut self, max_orders: usize) -> Result<(), EngineError> {
        self.check_unlocked("max_orders")?;
        self.max_orders = max_orders;
        Ok(())
    }

    /// Set the market-on-close submission buffer.
    ///
    /// # Errors
    ///
    /// Returns error if the settings are locked.
    pub fn set_market_on_close_buffer(&mut self, buffer: Duration) -> Result<(), EngineError> {
        self.check_unlocked("market_on_close_buffer")?;
        self.market_on_close_buffer = buffer;
        Ok(())
    }

    /// Set live mode.
    ///
    /// # Errors
    ///
    /// Returns error if the settings are locked.
    pub fn set_live_mode(&mut self, live_mode: bool) -> Result<(), EngineError> {
        self.check_unlocked("live_mode")?;
        self.live_mode = live_mode;
        Ok(())
    }

    /// Enable or disable liquidation.
    ///
    /// # Errors
    ///
    /// Returns error if the settings are locked.
    pub fn set_liquidate_enabled(&mut self, enabled: bool) -> Result<(), EngineError> {
        self.check_unlocked("liquidate_enabled")?;
        self.liquidate_enabled = enabled;
        Ok(())
    }

    /// Set the minimum order value as a fraction of portfolio value.
    ///
    /// # Errors
    ///
    /// Returns error if the settings are locked.
    pub fn set_minimum_order_margin_portfolio_percentage(
        &mut self,
        percentage: Decimal,
    ) -> Result<(), EngineError> {
        self.check_unlocked("minimum_order_margin_portfolio_percentage")?;
        self.minimum_order_margin_portfolio_percentage = percentage;
        Ok(())
    }

    /// Set the fraction of portfolio value excluded from target sizing.
    ///
    /// # Errors
    ///
    /// Returns error if the settings are locked.
    pub fn set_free_portfolio_value_percentage(
        &mut self,
        percentage: Decimal,
    ) -> Result<(), EngineError> {
        self.check_unlocked("free_portfolio_value_percentage")?;
        self.free_portfolio_value_percentage = percentage;
        Ok(())
    }

    /// Limit fills to a fraction of bar volume, or `None` for full fills.
    ///
    /// # Errors
    ///
    /// Returns error if the settings are locked.
    pub fn set_partial_fill_volume_fraction(
        &mut self,
        fraction: Option<Decimal>,
    ) -> Result<(), EngineError> {
        self.check_unlocked("partial_fill_volume_fraction")?;
        self.partial_fill_volume_fraction = fraction;
        Ok(())
    }

    const fn check_unlocked(&self, setting: &'static str) -> Result<(), EngineError> {
        if self.locked {
            Err(EngineError::SettingsLocked { setting })
        } else {
            Ok(())
        }
    }
}
