mod support;

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use basic_bridge::{Event, EventBuffer, NativeInput, WaitFlag};
use pretty_assertions::assert_eq;
use support::running_bridge;

const PRODUCERS: u32 = 8;
const PER_PRODUCER: u32 = 500;

#[test]
fn every_pushed_event_is_popped_exactly_once() {
    let buffer = Arc::new(EventBuffer::new());
    let producers: Vec<_> = (0..PRODUCERS)
        .map(|producer| {
            let buffer = Arc::clone(&buffer);
            thread::spawn(move || {
                for index in 0..PER_PRODUCER {
                    buffer.push(Event::Char(producer * PER_PRODUCER + index));
                }
            })
        })
        .collect();

    let total = (PRODUCERS * PER_PRODUCER) as usize;
    let mut seen = HashSet::new();
    while seen.len() < total {
        match buffer.pop() {
            Some(Event::Char(value)) => assert!(seen.insert(value), "duplicate {value}"),
            Some(other) => panic!("unexpected event {other:?}"),
            None => {
                buffer.wait(Some(Duration::from_millis(5)));
            }
        }
    }
    for producer in producers {
        producer.join().expect("join producer");
    }

    assert_eq!(buffer.pop(), None);
    assert!(!buffer.has_pending());
    assert_eq!(seen.len(), total);
}

#[test]
fn listener_threads_feed_the_interpreter_without_loss() {
    let (mut bridge, host, _screen) = running_bridge();
    let producers: Vec<_> = (0..4u32)
        .map(|producer| {
            let host = host.clone();
            thread::spawn(move || {
                for index in 0..100u32 {
                    host.input(NativeInput::UnicodeChar(0x4e00 + producer * 100 + index));
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().expect("join producer");
    }

    while bridge.process_events(WaitFlag::Pump).is_some() {}

    let mut keys: Vec<i32> = std::iter::from_fn(|| bridge.next_key()).collect();
    keys.sort_unstable();
    let expected: Vec<i32> = (0..400).map(|offset| 0x4e00 + offset).collect();
    assert_eq!(keys, expected);
}

#[test]
fn wake_unparks_an_idle_consumer() {
    let buffer = Arc::new(EventBuffer::new());
    let waker = {
        let buffer = Arc::clone(&buffer);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            buffer.wake();
        })
    };

    assert!(!buffer.wait(None));
    waker.join().expect("join waker");
    assert!(buffer.is_empty());
}
