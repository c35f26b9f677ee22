use tokio::sync::watch;

/// Resolve once shutdown has been signalled or the signal sender is gone.
///
/// Cancel-safe, so it can sit in a `select!` arm inside a loop.
pub async fn signalled(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}
