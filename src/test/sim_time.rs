use crate::sim::SimTime;

#[test]
fn sim_time_unit_conversions() {
    assert_eq!(SimTime::from_micros(1), SimTime(1_000));
    assert_eq!(SimTime::from_millis(1), SimTime(1_000_000));
    assert_eq!(SimTime::from_secs(1), SimTime(1_000_000_000));
}

#[test]
fn sim_time_unit_conversions_saturate_on_overflow() {
    assert_eq!(SimTime::from_micros(u64::MAX), SimTime(u64::MAX));
    assert_eq!(SimTime::from_millis(u64::MAX), SimTime(u64::MAX));
    assert_eq!(SimTime::from_secs(u64::MAX), SimTime(u64::MAX));
}

#[test]
fn sim_time_saturating_arithmetic() {
    assert_eq!(SimTime(5).saturating_add(SimTime(7)), SimTime(12));
    assert_eq!(SimTime::MAX.saturating_add(SimTime(1)), SimTime::MAX);
    assert_eq!(SimTime(10).saturating_sub(SimTime(4)), SimTime(6));
    assert_eq!(SimTime(4).saturating_sub(SimTime(10)), SimTime::ZERO);
}

#[test]
fn sim_time_displays_seconds() {
    assert_eq!(SimTime::from_millis(1500).to_string(), "1.500000s");
    assert_eq!(SimTime::ZERO.to_string(), "0.000000s");
}
