use crate::rdt::api::WindowReason;
use crate::rdt::{Congestion, CongestionMode};

#[test]
fn aimd_doubles_then_caps_at_upper_bound() {
    let mut cc = Congestion::new(CongestionMode::Aimd {
        base: 2,
        upper_bound: 12,
    });
    assert_eq!(cc.window(), 2);

    assert_eq!(cc.on_ack(), Some(WindowReason::SlowStart));
    assert_eq!(cc.window(), 4);
    cc.on_ack();
    assert_eq!(cc.window(), 8);
    // 16 截断到 12
    assert_eq!(cc.on_ack(), Some(WindowReason::SlowStart));
    assert_eq!(cc.window(), 12);
    // 到达上界后不再增长
    assert_eq!(cc.on_ack(), None);
    assert_eq!(cc.window(), 12);
}

#[test]
fn aimd_halves_on_fast_retransmit_and_never_drops_below_one() {
    let mut cc = Congestion::new(CongestionMode::Aimd {
        base: 3,
        upper_bound: 32,
    });
    assert_eq!(cc.on_fast_retransmit(), Some(WindowReason::FastRetransmit));
    assert_eq!(cc.window(), 1);
    assert_eq!(cc.on_fast_retransmit(), None);
    assert_eq!(cc.window(), 1);
}

#[test]
fn aimd_resets_to_base_on_timeout() {
    let mut cc = Congestion::new(CongestionMode::Aimd {
        base: 2,
        upper_bound: 32,
    });
    for _ in 0..4 {
        cc.on_ack();
    }
    assert_eq!(cc.window(), 32);
    assert_eq!(cc.on_timeout(), Some(WindowReason::Timeout));
    assert_eq!(cc.window(), 2);
    assert_eq!(cc.on_timeout(), None);
}

#[test]
fn window_stays_within_bounds_under_any_event_sequence() {
    let mut cc = Congestion::new(CongestionMode::Aimd {
        base: 2,
        upper_bound: 20,
    });
    for i in 0..500u32 {
        match i % 7 {
            0 | 2 | 3 | 5 => {
                cc.on_ack();
            }
            1 | 4 => {
                cc.on_fast_retransmit();
            }
            _ => {
                cc.on_timeout();
            }
        }
        assert!((1..=20).contains(&cc.window()), "window {} at step {i}", cc.window());
    }
}

#[test]
fn fixed_mode_never_changes() {
    let mut cc = Congestion::new(CongestionMode::Fixed { window: 5 });
    assert_eq!(cc.on_ack(), None);
    assert_eq!(cc.on_fast_retransmit(), None);
    assert_eq!(cc.on_timeout(), None);
    assert_eq!(cc.window(), 5);
}
