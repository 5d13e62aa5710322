use crate::event::Event;
use crate::scheduler::Scheduler;

fn timer(node: u32) -> Event {
    Event::MraiExpired { node }
}

#[test]
fn test_order_by_time() {
    let mut s = Scheduler::new();
    s.schedule(timer(1), 5);
    s.schedule(timer(2), 1);
    s.schedule(timer(3), 3);
    assert_eq!(s.len(), 3);
    assert_eq!(s.peek_time(), Some(1));

    assert_eq!(s.pop(), Some((1, timer(2))));
    assert_eq!(s.now(), 1);
    assert_eq!(s.pop(), Some((3, timer(3))));
    assert_eq!(s.pop(), Some((5, timer(1))));
    assert_eq!(s.now(), 5);
    assert_eq!(s.pop(), None);
    assert!(s.is_empty());
}

#[test]
fn test_fifo_at_same_time() {
    let mut s = Scheduler::new();
    for node in 0..10 {
        s.schedule(timer(node), 2);
    }
    let order: Vec<u32> = std::iter::from_fn(|| s.pop()).map(|(_, e)| e.node()).collect();
    assert_eq!(order, (0..10).collect::<Vec<_>>());
}

#[test]
fn test_schedule_relative_to_now() {
    let mut s = Scheduler::new();
    s.schedule(timer(1), 4);
    s.pop();
    let key = s.schedule(timer(2), 3);
    assert_eq!(key.time, 7);
    // events in the past are scheduled now
    let key = s.schedule_at(timer(3), 2);
    assert_eq!(key.time, 4);
    assert_eq!(s.pop(), Some((4, timer(3))));
}

#[test]
fn test_reset() {
    let mut s = Scheduler::new();
    s.schedule(timer(1), 4);
    s.schedule(timer(2), 8);
    s.pop();
    s.reset();
    assert_eq!(s.now(), 0);
    assert!(!s.has_events());
    let key = s.schedule(timer(3), 0);
    assert_eq!(key.time, 0);
    assert_eq!(key.sequence, 1);
}
