//! The shared capacity budget bounds how many handles all of a stack's
//! foreign weak-order queues can hold before the home thread scavenges.

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
fn foreign_flood_is_clamped_by_shared_capacity_before_any_scavenge() {
    // link_capacity floors at 16; max_capacity_per_thread / factor also
    // floors at link_capacity, so shared capacity here is exactly 16.
    let config = RecyclerConfig::<Item>::builder()
        .ratio(1)
        .delayed_queue_ratio(1)
        .max_capacity_per_thread(16)
        .max_shared_capacity_factor(16)
        .link_capacity(16)
        .build()
        .unwrap();
    let recycler = Arc::new(Recycler::new(config));

    // Allocate 30 handles on the home thread and hand them to a single
    // foreign thread without the home thread ever scavenging in between.
    let handles: Vec<Handle<Item>> = (0..30).map(|_| recycler.get()).collect();

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let kept = handles.into_iter().map(|h| h.recycle()).collect::<Vec<_>>();
        tx.send(kept).unwrap();
    })
    .join()
    .unwrap();
    let kept: Vec<bool> = rx.recv().unwrap();

    let admitted = kept.iter().filter(|&&k| k).count();
    assert_eq!(
        admitted, 16,
        "only shared-capacity-many handles can be parked in the foreign queue before a scavenge"
    );
}
