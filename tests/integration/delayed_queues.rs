//! `max_delayed_queues_per_thread`: a producer thread may only maintain
//! weak-order queues toward a bounded number of distinct home stacks.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use thread_recycler::{Handle, Recycler, RecyclerConfig, Recyclable};

struct Item;

impl Recyclable for Item {
    fn new_object(_recycler: &Recycler<Self>) -> Self {
        Item
    }
}

#[test]
fn producer_thread_drops_recycles_past_its_delayed_queue_quota() {
    let config = RecyclerConfig::<Item>::builder()
        .ratio(1)
        .delayed_queue_ratio(1)
        .max_delayed_queues_per_thread(2)
        .build()
        .unwrap();
    let recycler = Arc::new(Recycler::new(config));

    // Each of these "home" threads allocates from its own thread-local
    // stack, so there are 3 distinct stacks a single foreign recycler could
    // try to establish a weak-order queue toward.
    let (tx, rx) = mpsc::channel::<Handle<Item>>();
    let producers: Vec<_> = (0..3)
        .map(|_| {
            let recycler = recycler.clone();
            let tx = tx.clone();
            thread::spawn(move || {
                tx.send(recycler.get()).unwrap();
            })
        })
        .collect();
    for p in producers {
        p.join().unwrap();
    }
    drop(tx);
    let handles: Vec<_> = rx.into_iter().collect();
    assert_eq!(handles.len(), 3);

    // A single foreign thread recycles all three handles back. With a quota
    // of 2, it can only ever hold queues toward 2 of the 3 home stacks; the
    // third handle must be dropped rather than queued.
    let recycled: Vec<bool> = thread::spawn(move || {
        handles.into_iter().map(|h| h.recycle()).collect()
    })
    .join()
    .unwrap();

    assert_eq!(recycled.len(), 3);
    let kept = recycled.iter().filter(|&&kept| kept).count();
    assert_eq!(kept, 2, "only max_delayed_queues_per_thread targets can be queued");
}
