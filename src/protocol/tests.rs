use bytes::{BufMut, BytesMut};
use std::ops::ControlFlow;

use super::{DatumType, DecodeError, ProtocolDecode, ProtocolEncode, frontend};
use crate::{
    ErrorKind,
    ext::BufMutExt,
    protocol::backend::{BackendMessage, ErrorResponse, RowDescription},
};

fn frame(tag: u8, payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.push(tag);
    buf.extend_from_slice(&(payload.len() as u32 + 4).to_le_bytes());
    buf.extend_from_slice(payload);
    buf
}

fn descriptor_payload() -> Vec<u8> {
    let mut buf = BytesMut::new();
    buf.put_u32_le(2);
    buf.put_u32_le(DatumType::Int8.code());
    buf.put_lp_slice(b"a");
    buf.put_u32_le(DatumType::Text.code());
    buf.put_lp_slice(b"b");
    buf.to_vec()
}

fn row_payload() -> Vec<u8> {
    let mut buf = BytesMut::new();
    buf.put_u8(0);
    buf.put_i64_le(7);
    buf.put_u8(0);
    buf.put_lp_slice(b"hi");
    buf.to_vec()
}

fn response_stream() -> Vec<u8> {
    let mut stream = frame(b'T', &descriptor_payload());
    stream.extend_from_slice(&frame(b'D', &row_payload()));
    stream.extend_from_slice(&frame(b'C', b""));
    stream.extend_from_slice(&frame(b'Z', b""));
    stream
}

/// Feed `stream` in `chunk` sized pieces, reading more only when the
/// framer asks, until `count` frames come out.
fn drive(stream: &[u8], chunk: usize, count: usize) -> Vec<BackendMessage> {
    let mut buf = BytesMut::new();
    let mut fed = 0;
    let mut out = Vec::new();

    while out.len() < count {
        match <BackendMessage as ProtocolDecode>::decode(&mut buf).unwrap() {
            ControlFlow::Continue(expect) => {
                assert!(fed < stream.len(), "framer wants bytes the stream does not hold");
                while buf.len() < expect {
                    let n = chunk.min(stream.len() - fed);
                    buf.extend_from_slice(&stream[fed..fed + n]);
                    fed += n;
                }
            }
            ControlFlow::Break(message) => out.push(message),
        }
    }

    assert_eq!(fed, stream.len(), "stream not fully consumed");
    assert!(buf.is_empty(), "bytes left over after the last frame");
    out
}

#[test]
fn framing_is_chunking_independent() {
    let stream = response_stream();

    for chunk in [1, 5, stream.len()] {
        let frames = drive(&stream, chunk, 4);
        let tags: Vec<u8> = frames.iter().map(BackendMessage::tag).collect();
        assert_eq!(tags, [b'T', b'D', b'C', b'Z'], "chunk size {chunk}");

        let BackendMessage::RowDescription(desc) = &frames[0] else {
            panic!("expected a row description first");
        };
        assert_eq!(desc.col_count(), 2);
        assert_eq!(desc.cols()[0].datum, DatumType::Int8);
        assert_eq!(desc.cols()[0].name, "a");
        assert_eq!(desc.cols()[1].datum, DatumType::Text);
        assert_eq!(desc.cols()[1].name, "b");

        let BackendMessage::DataRow(row) = &frames[1] else {
            panic!("expected a data row second");
        };
        assert_eq!(&row.body[..], &row_payload()[..]);
    }
}

#[test]
fn residual_bytes_stay_for_the_next_frame() {
    let mut buf = BytesMut::new();
    buf.extend_from_slice(&frame(b'C', b""));
    buf.extend_from_slice(&frame(b'Z', b""));

    let first = <BackendMessage as ProtocolDecode>::decode(&mut buf).unwrap();
    assert!(matches!(first, ControlFlow::Break(BackendMessage::CommandComplete(_))));
    assert_eq!(&buf[..], &frame(b'Z', b"")[..]);
}

#[test]
fn unknown_frame_tag_is_a_protocol_error() {
    let mut buf = BytesMut::new();
    buf.extend_from_slice(&frame(b'X', b""));

    let err = <BackendMessage as ProtocolDecode>::decode(&mut buf).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Protocol(_)));
}

#[test]
fn undersized_length_field_is_a_protocol_error() {
    let mut buf = BytesMut::new();
    buf.put_u8(b'C');
    buf.put_u32_le(3); // below the 4 bytes the field itself occupies

    let err = <BackendMessage as ProtocolDecode>::decode(&mut buf).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Protocol(_)));
}

#[test]
fn unknown_datum_tag_in_descriptor_is_a_decode_error() {
    let mut payload = BytesMut::new();
    payload.put_u32_le(1);
    payload.put_u32_le(9);
    payload.put_lp_slice(b"a");

    let mut buf = BytesMut::new();
    buf.extend_from_slice(&frame(b'T', &payload));

    let err = <BackendMessage as ProtocolDecode>::decode(&mut buf).unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::Decode(DecodeError::UnknownDatumType(9)),
    ));
}

#[test]
fn truncated_descriptor_is_a_decode_error() {
    let mut payload = BytesMut::new();
    payload.put_u32_le(2); // two columns promised, none present

    let mut buf = BytesMut::new();
    buf.extend_from_slice(&frame(b'T', &payload));

    let err = <BackendMessage as ProtocolDecode>::decode(&mut buf).unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::Decode(DecodeError::UnexpectedEnd { .. }),
    ));
}

#[test]
fn error_response_carries_the_server_message() {
    let mut buf = BytesMut::new();
    buf.extend_from_slice(&frame(b'E', b"table t does not exist"));

    let message = <ErrorResponse as ProtocolDecode>::decode(&mut buf).unwrap();
    let ControlFlow::Break(err) = message else {
        panic!("frame was complete");
    };
    assert_eq!(err.message(), "table t does not exist");
    assert_eq!(err.to_string(), "server error: table t does not exist");
}

#[test]
fn query_request_length_counts_itself() {
    let mut buf = BytesMut::new();
    frontend::Query::new("select 1;").encode(&mut buf).unwrap();

    assert_eq!(buf[0], b'Q');
    assert_eq!(u32::from_le_bytes(buf[1..5].try_into().unwrap()), 9 + 4);
    assert_eq!(&buf[5..], b"select 1;");
    // no trailing terminator
    assert_eq!(buf.len(), 1 + 4 + 9);
}

#[test]
fn datum_type_names() {
    for (datum, name) in [
        (DatumType::Int8, "Int8"),
        (DatumType::Float4, "Float4"),
        (DatumType::Text, "Text"),
        (DatumType::Bool, "Bool"),
        (DatumType::Null, "Null"),
        (DatumType::Bytea, "Bytea"),
    ] {
        assert_eq!(datum.as_str(), name);
        assert_eq!(datum.to_string(), name);
        assert_eq!(DatumType::from_code(datum.code()).unwrap(), datum);
    }
}

#[test]
fn row_description_tag_checked() {
    use crate::protocol::backend::BackendProtocol;

    let err = <RowDescription as BackendProtocol>::decode(b'D', bytes::Bytes::new()).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Protocol(_)));
}
