//! Recycling from a thread other than the one that allocated the object:
//! the weak-order queue path, drained on the home thread's next `get`.

use std::sync::Arc;
use std::thread;
use thread_recycler::{Recycler, RecyclerConfig, Recyclable};

struct Payload(Vec<u8>);

impl Recyclable for Payload {
    fn new_object(_recycler: &Recycler<Self>) -> Self {
        Payload(Vec::with_capacity(64))
    }

    fn on_acquire(&mut self) {
        self.0.clear();
    }
}

fn recycler() -> Arc<Recycler<Payload>> {
    let config = RecyclerConfig::builder().ratio(1).delayed_queue_ratio(1).build().unwrap();
    Arc::new(Recycler::new(config))
}

#[test]
fn recycling_on_a_foreign_thread_is_picked_up_by_the_home_thread() {
    let recycler = recycler();

    let mut h = recycler.get();
    h.0.extend_from_slice(b"payload");

    let worker_recycler = recycler.clone();
    thread::spawn(move || {
        assert!(h.recycle());
        // keep the recycler alive on this thread for the duration of the
        // scope so nothing upgrades to a dead producer token prematurely.
        let _ = &worker_recycler;
    })
    .join()
    .unwrap();

    // The next get on the home thread should scavenge the foreign queue
    // rather than allocate a new buffer.
    let h2 = recycler.get();
    assert!(h2.0.is_empty(), "on_acquire should have cleared the reused buffer");
}

#[test]
fn many_foreign_threads_can_recycle_into_the_same_home_stack() {
    let recycler = recycler();
    let mut handles = Vec::new();
    for _ in 0..8 {
        handles.push(recycler.get());
    }

    let mut joins = Vec::new();
    for h in handles {
        let _r = recycler.clone();
        joins.push(thread::spawn(move || {
            assert!(h.recycle());
        }));
    }
    for j in joins {
        j.join().unwrap();
    }

    // Scavenging drains one queue's worth of handles at a time; looping a
    // handful of gets is enough to pull them all back in under any
    // scheduling order.
    let mut recovered = 0;
    for _ in 0..8 {
        let h = recycler.get();
        drop(h);
        recovered += 1;
    }
    assert_eq!(recovered, 8);
}

#[test]
fn a_dead_producer_threads_unclaimed_queue_does_not_block_future_scavenges() {
    let recycler = recycler();
    let h = recycler.get();

    let worker_recycler = recycler.clone();
    thread::spawn(move || {
        // Recycle from a thread that exits immediately afterward; its
        // thread-token should report dead on the next scavenge.
        assert!(h.recycle());
        let _ = &worker_recycler;
    })
    .join()
    .unwrap();

    let h2 = recycler.get();
    let h3 = recycler.get();
    // Whether h2 came back recycled or freshly allocated, a second get must
    // still succeed without hanging or panicking once the producer is gone.
    drop(h2);
    drop(h3);
}
