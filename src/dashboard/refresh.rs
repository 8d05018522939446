use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};

use crate::api::ApiError;
use crate::notify::Notifier;

/// Single-flight flag: at most one refresh batch is outstanding.
#[derive(Debug, Clone, Default)]
pub struct RefreshGuard {
    in_flight: Arc<AtomicBool>,
}

/// Held for the duration of one refresh; releases the guard on drop.
#[derive(Debug)]
pub struct RefreshTicket {
    in_flight: Arc<AtomicBool>,
}

impl RefreshGuard {
    pub fn try_begin(&self) -> Option<RefreshTicket> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RefreshTicket {
                in_flight: Arc::clone(&self.in_flight),
            })
    }

    pub fn is_refreshing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

impl Drop for RefreshTicket {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
    }
}

/// Unwraps one dashboard slice, recording its name when it had to fall back.
pub(crate) fn slice<T>(
    name: &'static str,
    result: Result<T, ApiError>,
    failures: &mut Vec<&'static str>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            log::warn!("Dashboard slice {name} unavailable: {err}");
            failures.push(name);
            None
        }
    }
}

/// Surfaces slice failures without ever failing the dashboard itself.
pub(crate) fn report_failures(notifier: &Notifier, failures: &[&'static str], total: usize) {
    if failures.is_empty() {
        return;
    }
    if failures.len() == total {
        notifier.error("Erro ao carregar dados. Verifique sua conexão.");
    } else {
        notifier.warning(format!(
            "Alguns dados não puderam ser carregados: {}",
            failures.join(", ")
        ));
    }
}

/// Calls `tick` immediately and then every `period` until Ctrl-C. Ticks
/// that fall due while a previous one is still running are skipped.
pub async fn run_periodic<F, Fut>(period: Duration, tick: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            log::error!("Ctrl-C handler unavailable: {err}");
            std::future::pending::<()>().await;
        }
        log::info!("Ctrl-C received, stopping dashboard refresh");
    };
    run_until(period, ctrl_c, tick).await;
}

/// Same loop as [`run_periodic`] with an arbitrary stop signal. The signal
/// stays armed across iterations; firing it mid-tick abandons that tick.
pub async fn run_until<S, F, Fut>(period: Duration, shutdown: S, mut tick: F)
where
    S: Future<Output = ()>,
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            _ = ticker.tick() => {
                tokio::select! {
                    biased;
                    _ = &mut shutdown => break,
                    _ = tick() => {}
                }
            }
        }
    }
}
