//! Same-thread get/recycle round trips, all on the thread's own LIFO stack.

use thread_recycler::{Recycler, RecyclerConfig, Recyclable};

#[derive(Debug)]
struct Widget {
    id: u32,
    touched: u32,
}

impl Recyclable for Widget {
    fn new_object(_recycler: &Recycler<Self>) -> Self {
        Widget { id: 0, touched: 0 }
    }

    fn on_acquire(&mut self) {
        self.touched += 1;
    }
}

fn recycler() -> Recycler<Widget> {
    // ratio 1 admits every recycle, so these tests don't depend on exactly
    // which attempt the admission filter happens to keep.
    let config = RecyclerConfig::builder().ratio(1).build().unwrap();
    Recycler::new(config)
}

#[test]
fn first_get_allocates_fresh() {
    let r = recycler();
    let h = r.get();
    assert_eq!(h.touched, 1);
}

#[test]
fn recycle_then_get_reuses_the_same_storage() {
    let r = recycler();
    let mut h = r.get();
    h.id = 99;
    assert!(h.recycle());

    let h2 = r.get();
    assert_eq!(h2.id, 99, "the recycled Widget, not a fresh one, should come back");
    assert_eq!(h2.touched, 2);
}

#[test]
fn deref_mut_lets_callers_mutate_through_the_handle() {
    let r = recycler();
    let mut h = r.get();
    h.id = 7;
    assert_eq!(h.id, 7);
}

#[test]
fn many_round_trips_never_allocate_past_the_first() {
    let r = recycler();
    for _ in 0..1000 {
        let h = r.get();
        assert!(h.recycle());
    }
}

#[test]
fn zero_capacity_config_never_pools_anything() {
    let config = RecyclerConfig::<Widget>::builder()
        .max_capacity_per_thread(0)
        .build()
        .unwrap();
    let r = Recycler::new(config);

    let h1 = r.get();
    assert!(!h1.recycle());

    let h2 = r.get();
    assert_eq!(h2.touched, 1, "every get must be a fresh allocation");
}
