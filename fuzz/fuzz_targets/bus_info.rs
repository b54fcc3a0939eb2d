#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use rostopo_core::{decode_connection, decode_connections, Value};

#[derive(Arbitrary, Debug)]
enum RawValue {
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    Array(Vec<RawValue>),
}

impl From<RawValue> for Value {
    fn from(raw: RawValue) -> Self {
        match raw {
            RawValue::Bool(v) => Value::Bool(v),
            RawValue::Int(v) => Value::Int(v),
            RawValue::Double(v) => Value::Double(v),
            RawValue::String(v) => Value::String(v),
            RawValue::Array(v) => Value::Array(v.into_iter().map(Value::from).collect()),
        }
    }
}

fuzz_target!(|tuples: Vec<Vec<RawValue>>| {
    let tuples: Vec<Vec<Value>> = tuples
        .into_iter()
        .map(|t| t.into_iter().map(Value::from).collect())
        .collect();

    let batch = decode_connections(&tuples);
    let singles: Vec<_> = tuples.iter().map(|t| decode_connection(t)).collect();

    // the batch succeeds exactly when every tuple does, in the same order
    match batch {
        Ok(conns) => {
            assert_eq!(conns.len(), tuples.len());
            for (conn, single) in conns.iter().zip(&singles) {
                assert_eq!(Some(conn), single.as_ref().ok());
            }
        }
        Err(err) => {
            // Value holds f64, so compare shape rather than raw values
            let first_bad = singles.iter().find_map(|s| s.as_ref().err());
            assert_eq!(first_bad.map(|e| &e.defect), Some(&err.defect));
            assert_eq!(first_bad.map(|e| e.raw.len()), Some(err.raw.len()));
        }
    }
});
