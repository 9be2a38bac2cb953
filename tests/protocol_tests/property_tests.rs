//! Property Tests
//!
//! Arbitrary messages survive encode -> decode -> encode byte for byte.

use bytes::Bytes;
use kvframe::protocol::{
    Component, MessageKind, MetaComponent, OpCode, OpFlags, PayloadComponent, RawComponent,
    ShardId,
};
use kvframe::{CodecConfig, Message, MessageDecoder, MessageEncoder};
use proptest::collection::vec;
use proptest::prelude::*;

fn arb_component() -> impl Strategy<Value = Component> {
    prop_oneof![
        (vec(any::<u8>(), 0..16), vec(any::<u8>(), 0..64), vec(any::<u8>(), 0..256)).prop_map(
            |(ns, key, value)| Component::Payload(PayloadComponent::new(ns, key, value))
        ),
        (any::<u8>(), vec(any::<u8>(), 0..48))
            .prop_map(|(n, fields)| Component::Meta(MetaComponent::new(n, fields))),
        (3u8..=u8::MAX, vec(any::<u8>(), 0..32)).prop_map(|(tag, body)| {
            Component::Unknown(RawComponent {
                tag,
                body: Bytes::from(body),
            })
        }),
    ]
}

fn arb_message() -> impl Strategy<Value = Message> {
    (
        any::<u8>(),
        any::<u16>(),
        any::<u32>(),
        any::<u8>(),
        0u8..3,
        vec(arb_component(), 0..6),
    )
        .prop_map(|(opcode, shard, opaque, flags, direction, components)| {
            let mut message = Message::request(OpCode(opcode), ShardId(shard))
                .with_opaque(opaque)
                .with_flags(OpFlags::from_byte(flags));
            match direction {
                1 => message = message.one_way(),
                2 => message.header.set_as_response(),
                _ => {}
            }
            for component in components {
                message.push_component(component);
            }
            message
        })
}

fn arb_alignment() -> impl Strategy<Value = usize> {
    (0u32..=7).prop_map(|shift| 1usize << shift)
}

proptest! {
    #[test]
    fn message_round_trip(message in arb_message(), align in arb_alignment()) {
        let config = CodecConfig::builder().component_alignment(align).build().unwrap();
        let encoder = MessageEncoder::new(config.clone());
        let mut decoder = MessageDecoder::new(config);

        let wire = encoder.encode(&message).unwrap();
        prop_assert_eq!(wire.len(), encoder.encoded_len(&message).unwrap());

        let decoded = decoder.decode(wire.clone()).unwrap();
        prop_assert_eq!(decoded.header.msg_size() as usize, wire.len());
        prop_assert_eq!(decoded.header.message_kind(), MessageKind::Operational);
        prop_assert_eq!(decoded.header.opaque(), message.header.opaque());
        prop_assert_eq!(decoded.header.direction(), message.header.direction());
        prop_assert_eq!(decoded.operational, message.operational);
        prop_assert_eq!(&decoded.components, &message.components);

        let again = encoder.encode(&decoded).unwrap();
        prop_assert_eq!(again, wire);
    }

    #[test]
    fn components_stay_aligned(message in arb_message(), align in arb_alignment()) {
        let config = CodecConfig::builder().component_alignment(align).build().unwrap();
        for component in &message.components {
            prop_assert_eq!(component.encoded_len(&config).unwrap() % align, 0);
        }
    }

    #[test]
    fn truncated_frames_never_decode(message in arb_message(), cut in any::<prop::sample::Index>()) {
        let wire = MessageEncoder::default().encode(&message).unwrap();
        let keep = cut.index(wire.len());

        let result = MessageDecoder::default().decode(wire.slice(..keep));
        prop_assert!(result.is_err());
    }
}
