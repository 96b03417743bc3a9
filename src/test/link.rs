use crate::net::{FaultModel, Link, Side, Transit};
use crate::rdt::packet::PLACEHOLDER;
use crate::rdt::Packet;
use crate::sim::SimTime;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn pkt(seq: u32) -> Packet {
    Packet::encode(100, &[seq as u8; 10], seq, PLACEHOLDER).expect("encode")
}

#[test]
fn perfect_link_delivers_everything_in_order_unchanged() {
    // 100B = 800bit @ 8Mbps = 100us
    let mut link = Link::new(
        Side::Receiver,
        SimTime::from_micros(10),
        8_000_000,
        FaultModel::PERFECT,
        StdRng::seed_from_u64(7),
    );
    let mut arrivals = Vec::new();
    for seq in 1..=5 {
        match link.transmit(SimTime::ZERO, pkt(seq)) {
            Transit::Arrive {
                at,
                pkt: got,
                corrupted_bit,
                extra_delay,
            } => {
                assert_eq!(got, pkt(seq));
                assert!(corrupted_bit.is_none());
                assert!(extra_delay.is_none());
                arrivals.push(at);
            }
            Transit::Lost => panic!("perfect link lost a packet"),
        }
    }
    let expected: Vec<_> = (1..=5)
        .map(|i| SimTime::from_micros(100 * i + 10))
        .collect();
    assert_eq!(arrivals, expected);
    assert_eq!(link.stats.sent_pkts, 5);
    assert_eq!(link.stats.lost_pkts, 0);
}

#[test]
fn corruption_flips_exactly_one_bit() {
    let faults = FaultModel {
        corrupt_rate: 1.0,
        ..FaultModel::PERFECT
    };
    let rng = StdRng::seed_from_u64(3);
    let mut link = Link::new(Side::Sender, SimTime::ZERO, 0, faults, rng);
    for seq in 1..=20 {
        let original = pkt(seq);
        let Transit::Arrive { pkt: got, corrupted_bit: Some(bit), .. } = link.transmit(SimTime::ZERO, original.clone())
        else {
            panic!("expected a corrupted arrival");
        };
        let diff: u32 = original
            .as_bytes()
            .iter()
            .zip(got.as_bytes())
            .map(|(a, b)| (a ^ b).count_ones())
            .sum();
        assert_eq!(diff, 1);
        assert_eq!(got.as_bytes()[bit / 8] ^ original.as_bytes()[bit / 8], 1 << (bit % 8));
    }
    assert_eq!(link.stats.corrupted_pkts, 20);
}

#[test]
fn reorder_delay_is_bounded_by_jitter() {
    let faults = FaultModel {
        reorder_rate: 1.0,
        jitter: SimTime::from_micros(50),
        ..FaultModel::PERFECT
    };
    let mut link = Link::new(
        Side::Receiver,
        SimTime::from_micros(10),
        0,
        faults,
        StdRng::seed_from_u64(11),
    );
    for seq in 1..=50 {
        let Transit::Arrive { at, extra_delay: Some(extra), .. } = link.transmit(SimTime::ZERO, pkt(seq)) else {
            panic!("expected a delayed arrival");
        };
        assert!(extra > SimTime::ZERO && extra <= SimTime::from_micros(50));
        assert_eq!(at, SimTime::from_micros(10).saturating_add(extra));
    }
}

#[test]
fn same_seed_gives_same_fate() {
    let faults = FaultModel {
        loss_rate: 0.3,
        corrupt_rate: 0.3,
        reorder_rate: 0.3,
        jitter: SimTime::from_micros(100),
    };
    let run = |seed| {
        let rng = StdRng::seed_from_u64(seed);
        let mut link = Link::new(Side::Receiver, SimTime::ZERO, 0, faults, rng);
        (1..=100)
            .map(|seq| match link.transmit(SimTime::ZERO, pkt(seq)) {
                Transit::Lost => None,
                Transit::Arrive { at, pkt, .. } => Some((at, pkt)),
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(run(42), run(42));
    let lost = run(42).iter().filter(|x| x.is_none()).count();
    assert!(lost > 0 && lost < 100);
}
