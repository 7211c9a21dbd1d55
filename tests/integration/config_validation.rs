//! `RecyclerConfigBuilder` validation and normalization.

use thread_recycler::RecyclerConfig;

#[test]
fn zero_ratio_is_rejected() {
    let result = RecyclerConfig::<u32>::builder().ratio(0).build();
    assert!(result.is_err());
}

#[test]
fn zero_delayed_queue_ratio_is_rejected() {
    let result = RecyclerConfig::<u32>::builder().ratio(4).delayed_queue_ratio(0).build();
    assert!(result.is_err());
}

#[test]
fn delayed_queue_ratio_defaults_to_the_same_thread_ratio() {
    let config = RecyclerConfig::<u32>::builder().ratio(6).build().unwrap();
    assert_eq!(config.delayed_queue_ratio(), 6);
}

#[test]
fn link_capacity_is_rounded_up_to_a_power_of_two() {
    let config = RecyclerConfig::<u32>::builder().link_capacity(20).build().unwrap();
    assert_eq!(config.link_capacity(), 32);
}

#[test]
fn shared_capacity_factor_is_floored_at_two() {
    let config = RecyclerConfig::<u32>::builder()
        .max_shared_capacity_factor(1)
        .build()
        .unwrap();
    assert_eq!(config.max_shared_capacity_factor(), 2);
}

#[test]
fn default_config_builds_successfully() {
    assert!(RecyclerConfig::<u32>::builder().build().is_ok());
}
