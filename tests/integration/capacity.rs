//! Admission-ratio and per-thread capacity behavior, observable only
//! through whether `recycle()` reports the object kept or dropped.

use thread_recycler::{Recycler, RecyclerConfig, Recyclable};

struct Node;

impl Recyclable for Node {
    fn new_object(_recycler: &Recycler<Self>) -> Self {
        Node
    }
}

#[test]
fn ratio_filter_keeps_only_every_nth_recycle() {
    let config = RecyclerConfig::<Node>::builder().ratio(4).build().unwrap();
    let r = Recycler::new(config);

    let mut kept = 0;
    for _ in 0..12 {
        let h = r.get();
        if h.recycle() {
            kept += 1;
        }
    }
    assert_eq!(kept, 3, "every 4th of 12 recycles should be admitted");
}

#[test]
fn capacity_bound_drops_once_the_thread_local_stack_is_full() {
    let config = RecyclerConfig::<Node>::builder()
        .ratio(1)
        .max_capacity_per_thread(2)
        .build()
        .unwrap();
    let r = Recycler::new(config);

    // Fill the stack to capacity by recycling without anything consuming it
    // in between.
    let mut handles = (0..5).map(|_| r.get()).collect::<Vec<_>>();
    let mut kept = 0;
    for h in handles.drain(..) {
        if h.recycle() {
            kept += 1;
        }
    }
    assert_eq!(kept, 2, "only max_capacity_per_thread handles can be parked at once");
}
