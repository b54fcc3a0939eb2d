//! Bus-info connection record decoding
//!
//! A peer describes each connection it holds as a positional tuple:
//!
//! ```text
//! (id: int, to: string, direction: 1-byte string, transport: string, topic: string, connected: bool)
//! ```
//!
//! Extra trailing fields are tolerated. Anything else is rejected whole.

use crate::{InfoConnection, InvalidConnectionRecord, RecordDefect, Value};

/// Minimum number of fields in a bus-info tuple
pub const BUS_INFO_ARITY: usize = 6;

/// Decode a single bus-info tuple
pub fn decode_connection(raw: &[Value]) -> Result<InfoConnection, InvalidConnectionRecord> {
    let reject = |defect| InvalidConnectionRecord {
        raw: raw.to_vec(),
        defect,
    };
    let wrong = |index, field, expected| {
        reject(RecordDefect::WrongShape {
            index,
            field,
            expected,
        })
    };

    if raw.len() < BUS_INFO_ARITY {
        return Err(reject(RecordDefect::TooShort {
            expected: BUS_INFO_ARITY,
            actual: raw.len(),
        }));
    }

    let id = raw[0].as_int().ok_or_else(|| wrong(0, "id", "an int"))?;
    let to = raw[1].as_str().ok_or_else(|| wrong(1, "to", "a string"))?;
    let direction = raw[2]
        .as_str()
        .and_then(single_char)
        .ok_or_else(|| wrong(2, "direction", "a one-byte string"))?;
    let transport = raw[3]
        .as_str()
        .ok_or_else(|| wrong(3, "transport", "a string"))?;
    let topic = raw[4].as_str().ok_or_else(|| wrong(4, "topic", "a string"))?;
    let connected = raw[5]
        .as_bool()
        .ok_or_else(|| wrong(5, "connected", "a bool"))?;

    Ok(InfoConnection {
        id,
        to: to.to_string(),
        direction,
        transport: transport.to_string(),
        topic: topic.to_string(),
        connected,
    })
}

/// Decode a whole bus-info reply, preserving order. The first bad tuple
/// fails the batch.
pub fn decode_connections(
    raw: &[Vec<Value>],
) -> Result<Vec<InfoConnection>, InvalidConnectionRecord> {
    raw.iter().map(|tuple| decode_connection(tuple)).collect()
}

/// Exactly one byte, so only ASCII directions pass
fn single_char(s: &str) -> Option<char> {
    match s.as_bytes() {
        [b] => Some(char::from(*b)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuple(direction: &str) -> Vec<Value> {
        vec![
            Value::Int(3),
            Value::from("http://x:1"),
            Value::from(direction),
            Value::from("TCPROS"),
            Value::from("/scan"),
            Value::Bool(true),
        ]
    }

    #[test]
    fn test_decode_well_formed() {
        let conn = decode_connection(&tuple("i")).unwrap();
        assert_eq!(
            conn,
            InfoConnection {
                id: 3,
                to: "http://x:1".to_string(),
                direction: 'i',
                transport: "TCPROS".to_string(),
                topic: "/scan".to_string(),
                connected: true,
            }
        );
    }

    #[test]
    fn test_trailing_fields_tolerated() {
        let mut raw = tuple("o");
        raw.push(Value::from("extra"));
        assert_eq!(decode_connection(&raw).unwrap().direction, 'o');
    }

    #[test]
    fn test_direction_must_be_one_char() {
        let err = decode_connection(&tuple("io")).unwrap_err();
        assert_eq!(
            err.defect,
            RecordDefect::WrongShape {
                index: 2,
                field: "direction",
                expected: "a one-byte string",
            }
        );
        assert_eq!(err.raw, tuple("io"));

        assert!(decode_connection(&tuple("")).is_err());
    }

    #[test]
    fn test_multibyte_direction_rejected() {
        let err = decode_connection(&tuple("é")).unwrap_err();
        assert!(matches!(err.defect, RecordDefect::WrongShape { index: 2, .. }));
        assert_eq!(err.raw, tuple("é"));
    }

    #[test]
    fn test_short_tuple_rejected() {
        let mut raw = tuple("i");
        raw.pop();
        let err = decode_connection(&raw).unwrap_err();
        assert_eq!(
            err.defect,
            RecordDefect::TooShort {
                expected: 6,
                actual: 5
            }
        );
    }

    #[test]
    fn test_wrong_field_types_rejected() {
        for (index, bad) in [
            (0, Value::from("3")),
            (1, Value::Int(1)),
            (3, Value::Bool(false)),
            (4, Value::Array(vec![])),
            (5, Value::Int(1)),
        ] {
            let mut raw = tuple("i");
            raw[index] = bad;
            let err = decode_connection(&raw).unwrap_err();
            match err.defect {
                RecordDefect::WrongShape { index: got, .. } => assert_eq!(got, index),
                other => panic!("unexpected defect {:?}", other),
            }
        }
    }

    #[test]
    fn test_batch_preserves_order_and_fails_whole() {
        let mut second = tuple("o");
        second[0] = Value::Int(7);
        let conns = decode_connections(&[tuple("i"), second.clone()]).unwrap();
        assert_eq!(conns.iter().map(|c| c.id).collect::<Vec<_>>(), vec![3, 7]);

        let err = decode_connections(&[tuple("i"), tuple("xx"), second]).unwrap_err();
        assert_eq!(err.raw, tuple("xx"));
    }
}
