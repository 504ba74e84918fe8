//! Check cycles and the poll loop.
//!
//! A cycle checks every product in order, aggregates the in-stock lines into
//! one alert and logs a [`CycleSummary`]. Per-product failures are already
//! folded into [`StockResult::Indeterminate`] by the scraper; anything that
//! still escapes (a panic) is caught at the cycle boundary, reported as a bot
//! error and the loop carries on.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use sizewatch_core::{Notifier, ProductTarget};
use sizewatch_scraper::{check_product, DebugSink, PageFetcher, ProductCheck, StockResult};

pub(crate) const STARTUP_MESSAGE: &str = "🤖 Bot is online and starting its first check cycle.";
const ALERT_HEADER: &str = "🚨 STOCK ALERT! 🚨";

/// Joins in-stock status lines into a single alert, or `None` if there are none.
pub(crate) fn alert_message(lines: &[String]) -> Option<String> {
    if lines.is_empty() {
        return None;
    }
    Some(format!("{ALERT_HEADER}\n\n{}", lines.join("\n\n")))
}

pub(crate) fn bot_error_message(detail: &str) -> String {
    format!("⚠️ BOT ERROR: The bot encountered an unexpected error: {detail}")
}

fn panic_detail(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}

/// Per-cycle counts, logged after each cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CycleSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub checked: usize,
    pub in_stock: usize,
    pub out_of_stock: usize,
    pub indeterminate: usize,
    pub alert_sent: bool,
}

impl CycleSummary {
    fn log(&self) {
        tracing::info!(
            started_at = %self.started_at.to_rfc3339(),
            elapsed_ms = (self.finished_at - self.started_at).num_milliseconds(),
            checked = self.checked,
            in_stock = self.in_stock,
            out_of_stock = self.out_of_stock,
            indeterminate = self.indeterminate,
            alert_sent = self.alert_sent,
            "check cycle finished"
        );
        if self.checked > 0 && self.indeterminate == self.checked {
            tracing::warn!(
                checked = self.checked,
                "every product check was indeterminate this cycle"
            );
        }
    }
}

/// Summary plus the individual results, in product order.
#[derive(Debug)]
pub(crate) struct CycleOutcome {
    pub summary: CycleSummary,
    pub checks: Vec<(String, ProductCheck)>,
}

/// Everything a cycle needs that stays fixed between cycles.
pub(crate) struct Watcher<'a, F, N> {
    pub fetcher: &'a F,
    pub notifier: &'a N,
    pub debug: &'a DebugSink,
    pub target_size: &'a str,
    pub notify_out_of_stock: bool,
}

impl<F, N> Watcher<'_, F, N>
where
    F: PageFetcher,
    N: Notifier,
{
    /// Checks every product in order and sends the aggregated alert.
    pub(crate) async fn run_cycle(&self, products: &[ProductTarget]) -> CycleOutcome {
        let started_at = Utc::now();
        tracing::info!(
            products = products.len(),
            size = self.target_size,
            "starting check cycle"
        );

        let mut checks = Vec::with_capacity(products.len());
        let mut alert_lines = Vec::new();
        let (mut in_stock, mut out_of_stock, mut indeterminate) = (0usize, 0usize, 0usize);

        for product in products {
            let check = check_product(self.fetcher, product, self.target_size, self.debug).await;
            match check.result {
                StockResult::InStock => {
                    in_stock += 1;
                    alert_lines.push(check.message.clone());
                }
                StockResult::OutOfStock => out_of_stock += 1,
                StockResult::Indeterminate(_) => indeterminate += 1,
            }
            if self.notify_out_of_stock && !check.result.is_in_stock() {
                self.notifier.notify(&check.message).await;
            }
            checks.push((product.name.clone(), check));
        }

        let alert = alert_message(&alert_lines);
        if let Some(alert) = &alert {
            tracing::info!(lines = alert_lines.len(), "sending stock alert");
            self.notifier.notify(alert).await;
        } else {
            tracing::info!("no tracked product is in stock");
        }

        let summary = CycleSummary {
            started_at,
            finished_at: Utc::now(),
            checked: checks.len(),
            in_stock,
            out_of_stock,
            indeterminate,
            alert_sent: alert.is_some(),
        };
        summary.log();

        CycleOutcome { summary, checks }
    }

    /// Runs one cycle, turning a panic into a bot-error notification.
    ///
    /// Returns `None` when the cycle panicked.
    pub(crate) async fn guarded_cycle(&self, products: &[ProductTarget]) -> Option<CycleOutcome> {
        match AssertUnwindSafe(self.run_cycle(products))
            .catch_unwind()
            .await
        {
            Ok(outcome) => Some(outcome),
            Err(payload) => {
                let detail = panic_detail(payload.as_ref());
                tracing::error!(error = %detail, "check cycle aborted unexpectedly");
                self.notifier.notify(&bot_error_message(&detail)).await;
                None
            }
        }
    }

    /// Runs cycles until `max_cycles` is reached or the process is interrupted.
    ///
    /// Returns the number of cycles started.
    pub(crate) async fn poll(
        &self,
        products: &[ProductTarget],
        interval: Duration,
        max_cycles: Option<u32>,
    ) -> u32 {
        let mut cycles = 0u32;
        loop {
            cycles += 1;
            self.guarded_cycle(products).await;

            if max_cycles.is_some_and(|max| cycles >= max) {
                tracing::info!(cycles, "cycle limit reached, stopping");
                return cycles;
            }

            tracing::info!(secs = interval.as_secs(), "sleeping until next cycle");
            tokio::select! {
                () = tokio::time::sleep(interval) => {}
                () = shutdown_signal() => {
                    tracing::info!(cycles, "received shutdown signal, stopping");
                    return cycles;
                }
            }
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
#[path = "cycle_test.rs"]
mod tests;
