//! Message Header Tests
//!
//! Tests for the 12-byte envelope: constants, support checks, type flag.

use kvframe::protocol::{
    Direction, MessageHeader, MessageKind, CURRENT_VERSION, MESSAGE_HEADER_SIZE, MESSAGE_MAGIC,
};
use kvframe::FrameError;

// =============================================================================
// Construction / Reset Tests
// =============================================================================

#[test]
fn test_new_header_defaults() {
    let header = MessageHeader::new();

    assert_eq!(header.magic(), MESSAGE_MAGIC);
    assert_eq!(header.version(), CURRENT_VERSION);
    assert_eq!(header.type_flag(), 0);
    assert_eq!(header.msg_size(), 0);
    assert_eq!(header.opaque(), 0);
    assert!(header.is_request());
    assert_eq!(header.message_kind(), MessageKind::Operational);
    assert!(header.is_supported());
}

#[test]
fn test_reset_restores_constants_and_clears_counters() {
    let mut header = MessageHeader::from_raw(0xBEEF, 9, 0xFF, 1234, 0xCAFE);
    assert!(!header.is_supported());

    header.reset();

    assert_eq!(header, MessageHeader::new());
    assert!(header.is_supported());
}

#[test]
fn test_accessors() {
    let mut header = MessageHeader::new();
    header.set_msg_size(4096);
    header.set_opaque(0xDEAD_BEEF);

    assert_eq!(header.msg_size(), 4096);
    assert_eq!(header.opaque(), 0xDEAD_BEEF);
}

// =============================================================================
// is_supported Tests
// =============================================================================

#[test]
fn test_supported_requires_all_three_conditions() {
    let good = MessageHeader::from_raw(MESSAGE_MAGIC, CURRENT_VERSION, 0, 16, 0);
    assert!(good.is_supported());

    let bad_magic = MessageHeader::from_raw(MESSAGE_MAGIC ^ 1, CURRENT_VERSION, 0, 16, 0);
    assert!(!bad_magic.is_supported());

    let bad_version = MessageHeader::from_raw(MESSAGE_MAGIC, CURRENT_VERSION + 1, 0, 16, 0);
    assert!(!bad_version.is_supported());

    // Admin kind in the upper six bits
    let bad_kind = MessageHeader::from_raw(MESSAGE_MAGIC, CURRENT_VERSION, 1 << 2, 16, 0);
    assert!(!bad_kind.is_supported());
}

#[test]
fn test_supported_ignores_direction_bits() {
    let mut header = MessageHeader::new();
    header.set_as_response();
    assert!(header.is_supported());

    header.set_as_request(true);
    assert!(header.is_supported());
}

#[test]
fn test_ensure_supported_reports_fields() {
    let header = MessageHeader::from_raw(0x1234, CURRENT_VERSION, 2 << 2, 16, 0);

    match header.ensure_supported() {
        Err(FrameError::UnsupportedProtocol {
            magic,
            version,
            message_type,
        }) => {
            assert_eq!(magic, 0x1234);
            assert_eq!(version, CURRENT_VERSION);
            assert_eq!(message_type, 2);
        }
        other => panic!("Expected UnsupportedProtocol, got {:?}", other),
    }
}

// =============================================================================
// Type Flag Tests
// =============================================================================

#[test]
fn test_set_as_response_keeps_kind() {
    let mut header = MessageHeader::new();
    header.set_message_kind(MessageKind::Admin);
    header.set_as_response();

    assert!(header.is_response());
    assert_eq!(header.direction(), Direction::Response);
    assert_eq!(header.message_kind(), MessageKind::Admin);
}

#[test]
fn test_set_message_kind_keeps_direction() {
    let mut header = MessageHeader::new();
    header.set_as_response();
    header.set_message_kind(MessageKind::ClusterControl);

    assert!(header.is_response());
    assert_eq!(header.message_kind(), MessageKind::ClusterControl);
}

#[test]
fn test_one_way_request() {
    let mut header = MessageHeader::new();
    header.set_as_request(true);

    assert!(header.is_request());
    assert!(header.is_one_way());
    assert_eq!(header.direction(), Direction::OneWayRequest);

    // A response is never one-way
    header.set_as_response();
    assert!(!header.is_one_way());
}

#[test]
fn test_unknown_message_kind() {
    let header = MessageHeader::from_raw(MESSAGE_MAGIC, CURRENT_VERSION, 0x3F << 2, 16, 0);
    match header.message_kind() {
        MessageKind::Unknown(kind) => assert_eq!(kind.value(), 0x3F),
        other => panic!("Expected Unknown, got {:?}", other),
    }
    assert_eq!(header.message_type(), 0x3F);
}

#[test]
fn test_unknown_kind_never_aliases_a_known_kind() {
    for raw in 0..=0x3Fu8 {
        let kind = MessageKind::from_u8(raw);
        assert_eq!(kind.to_u8(), raw);
        if let MessageKind::Unknown(unknown) = kind {
            assert!(unknown.value() > 2);
        }
    }
}

#[test]
fn test_setting_unknown_kind_stays_unsupported() {
    let mut header = MessageHeader::new();
    header.set_message_kind(MessageKind::from_u8(0x2A));

    assert_eq!(header.message_type(), 0x2A);
    assert!(!header.is_supported());

    header.set_message_kind(MessageKind::Operational);
    assert!(header.is_supported());
}

// =============================================================================
// Wire Format Tests
// =============================================================================

#[test]
fn test_wire_format() {
    let mut header = MessageHeader::new();
    header.set_as_response();
    header.set_msg_size(0x0102_0304);
    header.set_opaque(0xA0B0_C0D0);

    let mut buf = Vec::new();
    header.encode(&mut buf);

    assert_eq!(buf.len(), MESSAGE_HEADER_SIZE);
    assert_eq!(&buf[0..2], &[0x50, 0x50]); // magic
    assert_eq!(buf[2], 0x01); // version
    assert_eq!(buf[3], 0x01); // operational response
    assert_eq!(&buf[4..8], &[0x01, 0x02, 0x03, 0x04]); // msg_size
    assert_eq!(&buf[8..12], &[0xA0, 0xB0, 0xC0, 0xD0]); // opaque
}

#[test]
fn test_decode_encode_header() {
    let mut header = MessageHeader::new();
    header.set_msg_size(64);
    header.set_opaque(77);

    let mut buf = Vec::new();
    header.encode(&mut buf);
    let decoded = MessageHeader::decode(&mut &buf[..]).unwrap();

    assert_eq!(decoded, header);
}

#[test]
fn test_decode_short_header() {
    let bytes = [0x50, 0x50, 0x01, 0x00, 0x00];
    let result = MessageHeader::decode(&mut &bytes[..]);

    assert!(matches!(
        result,
        Err(FrameError::Truncated {
            needed: 12,
            available: 5
        })
    ));
}

#[test]
fn test_display_dump() {
    let mut header = MessageHeader::new();
    header.set_opaque(0xAB);
    let text = header.to_string();

    assert!(text.contains("Magic       : 0x5050"));
    assert!(text.contains("Opaque      : 0x000000AB"));
    assert!(text.contains("Operational"));
}
