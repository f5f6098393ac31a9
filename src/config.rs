use std::net::SocketAddr;

use crate::error::{KitchenError, Result};
use crate::scheduler::DEFAULT_MAX_BOTS;

/// Configuration for the JSON dashboard.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub listen_addr: SocketAddr,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            // SAFETY: This is a hardcoded valid address that will always parse
            listen_addr: "127.0.0.1:8080"
                .parse()
                .expect("default dashboard address is valid"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct KitchenConfig {
    /// Interval between ticks of the scheduler loop.
    pub tick_interval_ms: u64,
    /// Bots present when the kitchen opens.
    pub initial_bots: usize,
    /// Upper bound on the pool size, for both the opening pool and resizes.
    pub max_bots: usize,
    /// Dashboard settings; `None` disables the dashboard.
    pub dashboard: Option<DashboardConfig>,
}

impl Default for KitchenConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            initial_bots: 0,
            max_bots: DEFAULT_MAX_BOTS,
            dashboard: None,
        }
    }
}

impl KitchenConfig {
    pub fn with_tick_interval_ms(mut self, tick_interval_ms: u64) -> Self {
        self.tick_interval_ms = tick_interval_ms;
        self
    }

    pub fn with_initial_bots(mut self, initial_bots: usize) -> Self {
        self.initial_bots = initial_bots;
        self
    }

    pub fn with_max_bots(mut self, max_bots: usize) -> Self {
        self.max_bots = max_bots;
        self
    }

    pub fn with_dashboard(mut self, listen_addr: SocketAddr) -> Self {
        self.dashboard = Some(DashboardConfig { listen_addr });
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(KitchenError::InvalidConfig(
                "tick interval must be greater than zero".to_string(),
            ));
        }
        if self.max_bots == 0 {
            return Err(KitchenError::InvalidConfig(
                "max bots must be greater than zero".to_string(),
            ));
        }
        if self.initial_bots > self.max_bots {
            return Err(KitchenError::InvalidConfig(format!(
                "initial bots ({}) exceeds max bots ({})",
                self.initial_bots, self.max_bots
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kitchen_config_default() {
        let cfg = KitchenConfig::default();
        assert_eq!(cfg.tick_interval_ms, 1000);
        assert_eq!(cfg.initial_bots, 0);
        assert_eq!(cfg.max_bots, DEFAULT_MAX_BOTS);
        assert!(cfg.dashboard.is_none());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn dashboard_config_default() {
        let cfg = DashboardConfig::default();
        assert_eq!(cfg.listen_addr.to_string(), "127.0.0.1:8080");
    }

    #[test]
    fn kitchen_config_builders() {
        let addr: SocketAddr = "0.0.0.0:9000".parse().unwrap();
        let cfg = KitchenConfig::default()
            .with_tick_interval_ms(250)
            .with_initial_bots(3)
            .with_max_bots(8)
            .with_dashboard(addr);
        assert_eq!(cfg.tick_interval_ms, 250);
        assert_eq!(cfg.initial_bots, 3);
        assert_eq!(cfg.max_bots, 8);
        assert_eq!(cfg.dashboard.unwrap().listen_addr, addr);
    }

    #[test]
    fn zero_tick_interval_is_rejected() {
        let cfg = KitchenConfig::default().with_tick_interval_ms(0);
        assert!(matches!(cfg.validate(), Err(KitchenError::InvalidConfig(_))));
    }

    #[test]
    fn bot_limits_are_validated() {
        let cfg = KitchenConfig::default().with_max_bots(0);
        assert!(matches!(cfg.validate(), Err(KitchenError::InvalidConfig(_))));

        let cfg = KitchenConfig::default().with_initial_bots(5).with_max_bots(4);
        assert!(matches!(cfg.validate(), Err(KitchenError::InvalidConfig(_))));

        let cfg = KitchenConfig::default().with_initial_bots(4).with_max_bots(4);
        assert!(cfg.validate().is_ok());
    }
}
