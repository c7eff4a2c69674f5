#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicU64, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use br_ledger::{AdminRpc, Error, LedgerAccept, LedgerAdvancer, Result};
use br_types::LedgerAdvancementConfig;

/// Scripted admin RPC for driving the advancement loop in tests.
///
/// Calls consume `script` in order; once it is empty every call succeeds
/// (or fails, with `always_fail`) and reports an incrementing ledger index.
#[derive(Default)]
pub struct MockRpc {
    script: Mutex<VecDeque<bool>>,
    always_fail: bool,
    delay: Option<Duration>,
    next_index: AtomicU64,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockRpc {
    pub fn new() -> Self {
        Self {
            next_index: AtomicU64::new(1),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            always_fail: true,
            ..Self::new()
        }
    }

    /// `true` entries succeed, `false` entries fail.
    pub fn with_script(self, outcomes: &[bool]) -> Self {
        *self.script.lock().unwrap() = outcomes.iter().copied().collect();
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AdminRpc for MockRpc {
    async fn ledger_accept(&self) -> Result<LedgerAccept> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(in_flight, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let succeed = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(!self.always_fail);
        if !succeed {
            return Err(Error::Rpc("connection refused".to_string()));
        }

        Ok(LedgerAccept {
            ledger_current_index: self.next_index.fetch_add(1, Ordering::SeqCst),
            status: "success".to_string(),
        })
    }
}

pub fn config_with_interval(interval_ms: u64) -> LedgerAdvancementConfig {
    LedgerAdvancementConfig::new("http://127.0.0.1:5005", interval_ms).unwrap()
}

/// Builds an advancer while keeping a handle on the mock for assertions.
pub fn advancer_with(
    rpc: MockRpc,
    config: LedgerAdvancementConfig,
) -> (LedgerAdvancer<MockRpc>, Arc<MockRpc>) {
    let rpc = Arc::new(rpc);
    (LedgerAdvancer::with_shared_rpc(rpc.clone(), config), rpc)
}
