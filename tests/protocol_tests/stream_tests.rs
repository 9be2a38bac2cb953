//! Stream Tests
//!
//! Blocking read/write helpers over in-memory and file-backed streams.

use std::io::{Cursor, ErrorKind, Seek, SeekFrom};

use kvframe::protocol::{
    read_message, read_message_with, write_message, write_message_with, OpCode, ShardId, Status,
};
use kvframe::{CodecConfig, FrameError, Message, MessageEncoder};
use tempfile::tempfile;

fn put_request(opaque: u32) -> Message {
    Message::request(OpCode(0x02), ShardId(3))
        .with_opaque(opaque)
        .with_payload(&b"users"[..], &b"alice"[..], &b"{\"age\":30}"[..])
}

#[test]
fn test_write_then_read_single_message() {
    let request = put_request(1);

    let mut stream = Vec::new();
    write_message(&mut stream, &request).unwrap();

    let mut reader = Cursor::new(stream);
    let received = read_message(&mut reader).unwrap();

    assert_eq!(received.header.opaque(), 1);
    assert_eq!(received.shard_id(), Some(ShardId(3)));
    assert_eq!(received.components, request.components);
}

#[test]
fn test_back_to_back_messages() {
    let mut stream = Vec::new();
    for opaque in 0..5 {
        write_message(&mut stream, &put_request(opaque)).unwrap();
    }

    let mut reader = Cursor::new(stream);
    for opaque in 0..5 {
        let message = read_message(&mut reader).unwrap();
        assert_eq!(message.header.opaque(), opaque);
    }

    // Stream exhausted
    match read_message(&mut reader) {
        Err(FrameError::Io(e)) => assert_eq!(e.kind(), ErrorKind::UnexpectedEof),
        other => panic!("Expected Io error, got {:?}", other),
    }
}

#[test]
fn test_file_backed_exchange() {
    let mut file = tempfile().unwrap();

    let request = put_request(0xABCD);
    let response = Message::response_to(&request, Status(0));
    write_message(&mut file, &request).unwrap();
    write_message(&mut file, &response).unwrap();

    file.seek(SeekFrom::Start(0)).unwrap();

    let read_request = read_message(&mut file).unwrap();
    let read_response = read_message(&mut file).unwrap();

    assert!(read_request.header.is_request());
    assert!(read_response.header.is_response());
    assert_eq!(read_response.header.opaque(), 0xABCD);
    assert_eq!(read_response.status(), Some(Status(0)));
}

#[test]
fn test_configured_stream_helpers() {
    let config = CodecConfig::builder().component_alignment(16).build().unwrap();
    let encoder = MessageEncoder::new(config.clone());

    let mut stream = Vec::new();
    write_message_with(&mut stream, &put_request(9), &encoder).unwrap();
    // 16 fixed + (13 + 20 body, padded to 48)
    assert_eq!(stream.len(), 64);

    let message = read_message_with(&mut Cursor::new(stream), &config).unwrap();
    assert_eq!(message.header.msg_size(), 64);
}

#[test]
fn test_foreign_traffic_rejected_before_body() {
    let mut stream = Vec::new();
    write_message(&mut stream, &put_request(1)).unwrap();
    stream[0] = 0x47; // 'G'
    stream[1] = 0x45; // 'E'

    let mut reader = Cursor::new(stream);
    let result = read_message(&mut reader);

    assert!(matches!(result, Err(FrameError::UnsupportedProtocol { .. })));
    // Only the envelope was consumed
    assert_eq!(reader.position(), 12);
}

#[test]
fn test_oversized_message_rejected_before_body() {
    let mut stream = Vec::new();
    write_message(&mut stream, &put_request(1)).unwrap();

    let config = CodecConfig::builder().max_message_size(32).build().unwrap();
    let mut reader = Cursor::new(stream);
    let result = read_message_with(&mut reader, &config);

    assert!(matches!(result, Err(FrameError::Malformed(_))));
    assert_eq!(reader.position(), 12);
}

#[test]
fn test_stream_ends_mid_message() {
    let mut stream = Vec::new();
    write_message(&mut stream, &put_request(1)).unwrap();
    stream.truncate(stream.len() - 3);

    match read_message(&mut Cursor::new(stream)) {
        Err(FrameError::Io(e)) => assert_eq!(e.kind(), ErrorKind::UnexpectedEof),
        other => panic!("Expected Io error, got {:?}", other),
    }
}
