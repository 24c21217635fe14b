//! Shared handles for commands.

use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;

use pembukuan_db::Gateway;

use crate::clock::Clock;
use crate::config::AppConfig;

/// The gateway, clock and configuration every command runs against.
///
/// Cheap to clone; all handles are shared.
#[derive(Clone)]
pub struct AppContext {
    gateway: Arc<dyn Gateway>,
    clock: Arc<dyn Clock>,
    config: Arc<AppConfig>,
}

impl AppContext {
    pub fn new(gateway: Arc<dyn Gateway>, clock: Arc<dyn Clock>, config: AppConfig) -> Self {
        AppContext {
            gateway,
            clock,
            config: Arc::new(config),
        }
    }

    pub fn gateway(&self) -> &dyn Gateway {
        self.gateway.as_ref()
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[inline]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    #[inline]
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("today", &self.today())
            .field("business_name", &self.config.business_name)
            .finish_non_exhaustive()
    }
}
