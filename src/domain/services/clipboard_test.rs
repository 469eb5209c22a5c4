use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use super::ClipboardService;

#[test]
fn it_holds_writers_until_they_let_go() {
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let released = Arc::new(AtomicBool::new(false));
    let flag = released.clone();

    ClipboardService::keep(thread::spawn(move || {
        let _ = release_rx.recv();
        flag.store(true, Ordering::SeqCst);
    }));
    assert_eq!(ClipboardService::pending(), 1);

    release_tx.send(()).unwrap();
    ClipboardService::hold();

    assert!(released.load(Ordering::SeqCst));
    assert_eq!(ClipboardService::pending(), 0);
}
