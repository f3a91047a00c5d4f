use ragrank_core::traits::{Cancellable, CancellationToken};

#[test]
fn token_starts_uncancelled() {
    assert!(!CancellationToken::new().is_cancelled());
}

#[test]
fn clones_share_cancellation() {
    let token = CancellationToken::new();
    let handle = token.clone();
    handle.cancel();
    assert!(token.is_cancelled());
}

#[test]
fn cancel_is_visible_across_threads() {
    let token = CancellationToken::new();
    let remote = token.clone();
    std::thread::spawn(move || remote.cancel()).join().unwrap();
    assert!(token.is_cancelled());
}
