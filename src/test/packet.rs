use crate::rdt::packet::{max_payload, HEADER_SIZE, PLACEHOLDER};
use crate::rdt::{internet_checksum, CodecError, Packet};

fn sample(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 + 3) as u8).collect()
}

#[test]
fn encode_writes_header_fields_at_fixed_offsets() {
    let payload = sample(5);
    let pkt = Packet::encode(32, &payload, 0x0102_0304, 0x0a0b_0c0d).expect("encode");
    let b = pkt.as_bytes();

    assert_eq!(b.len(), 32);
    assert_eq!(b[0], 5);
    assert_eq!(&b[1..5], &[0x04, 0x03, 0x02, 0x01]);
    assert_eq!(&b[5..9], &[0x0d, 0x0c, 0x0b, 0x0a]);
    assert_eq!(&b[HEADER_SIZE..HEADER_SIZE + 5], payload.as_slice());
    assert!(b[HEADER_SIZE + 5..].iter().all(|&x| x == 0));

    assert_eq!(pkt.seq(), 0x0102_0304);
    assert_eq!(pkt.ack_number(), 0x0a0b_0c0d);
    assert_eq!(pkt.payload(), payload.as_slice());
    assert!(pkt.is_valid());
}

#[test]
fn checksum_is_computed_with_checksum_field_zeroed() {
    let pkt = Packet::encode(64, &sample(20), 9, PLACEHOLDER).expect("encode");
    let mut scratch = pkt.as_bytes()[..HEADER_SIZE + 20].to_vec();
    scratch[9] = 0;
    scratch[10] = 0;
    assert_eq!(pkt.checksum(), internet_checksum(&scratch));
}

#[test]
fn internet_checksum_known_values() {
    assert_eq!(internet_checksum(&[]), 0xffff);
    // 0x0201 + 0x0403 = 0x0604
    assert_eq!(internet_checksum(&[1, 2, 3, 4]), !0x0604);
    // 奇数尾字节补零
    assert_eq!(internet_checksum(&[1, 2, 3]), !0x0204);
    // 进位回卷
    assert_eq!(internet_checksum(&[0xff, 0xff, 0x01, 0x00]), !0x0001);
}

#[test]
fn every_single_bit_flip_in_covered_bytes_is_detected() {
    let len = 40;
    let pkt = Packet::encode(128, &sample(len), 17, PLACEHOLDER).expect("encode");
    for byte in 1..HEADER_SIZE + len {
        for bit in 0..8 {
            let mut bytes = pkt.clone().into_bytes();
            bytes[byte] ^= 1 << bit;
            let corrupted = Packet::from_bytes(bytes).expect("wrap");
            assert!(
                !corrupted.is_valid(),
                "flip at byte {byte} bit {bit} went unnoticed"
            );
        }
    }
}

#[test]
fn padding_after_payload_is_not_covered() {
    let pkt = Packet::encode(64, &sample(4), 2, PLACEHOLDER).expect("encode");
    let mut bytes = pkt.into_bytes();
    bytes[63] ^= 0x80;
    let pkt = Packet::from_bytes(bytes).expect("wrap");
    assert!(pkt.is_valid());
    assert_eq!(pkt.payload(), sample(4).as_slice());
}

#[test]
fn declared_length_beyond_capacity_is_rejected() {
    let pkt = Packet::encode(20, &sample(3), 1, PLACEHOLDER).expect("encode");
    let mut bytes = pkt.into_bytes();
    bytes[0] = 200;
    let pkt = Packet::from_bytes(bytes).expect("wrap");
    assert_eq!(
        pkt.validate(),
        Err(CodecError::LengthOutOfRange {
            declared: 200,
            max: 9
        })
    );
    // 截断到容量，不越界
    assert_eq!(pkt.payload().len(), 9);
}

#[test]
fn encode_rejects_oversized_payload_and_tiny_packets() {
    assert_eq!(
        Packet::encode(20, &sample(10), 1, 1),
        Err(CodecError::PayloadTooLarge { len: 10, max: 9 })
    );
    assert_eq!(
        Packet::encode(HEADER_SIZE, &[], 1, 1),
        Err(CodecError::PacketTooSmall {
            size: HEADER_SIZE,
            header: HEADER_SIZE
        })
    );
    assert!(Packet::from_bytes(vec![0; HEADER_SIZE]).is_err());
}

#[test]
fn max_payload_is_capped_by_length_field() {
    assert_eq!(max_payload(100), 89);
    assert_eq!(max_payload(128), 117);
    assert_eq!(max_payload(1000), 255);
    let pkt = Packet::encode(1000, &sample(255), 1, 1).expect("encode");
    assert_eq!(pkt.payload_len(), 255);
    assert!(pkt.is_valid());
}

#[test]
fn ack_packet_has_placeholder_seq_and_no_payload() {
    let ack = Packet::ack(128, 42).expect("ack");
    assert_eq!(ack.seq(), PLACEHOLDER);
    assert_eq!(ack.ack_number(), 42);
    assert_eq!(ack.payload_len(), 0);
    assert!(ack.payload().is_empty());
    assert!(ack.is_valid());
}
