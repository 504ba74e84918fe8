//! Outbound notification capability.

use std::future::Future;

/// Delivers plain-text messages to a fixed destination.
///
/// Delivery is fire-and-forget from the caller's side: implementations log
/// their own failures and the returned future always completes with `()`.
pub trait Notifier {
    fn notify(&self, message: &str) -> impl Future<Output = ()> + Send;
}

/// Notifier that writes each message to stdout. Used for dry runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutNotifier;

impl Notifier for StdoutNotifier {
    async fn notify(&self, message: &str) {
        println!("---- notification ----\n{message}\n----------------------");
    }
}
