//! Wire codec for the signaling protocol.
//!
//! Every frame exchanged with a client is a single JSON object shaped like
//! `{"opcode": <int>, "data": <object>}`. This crate owns that envelope, the
//! closed set of opcodes, and the per-opcode payload shapes; it knows nothing
//! about sockets, the address space, or the session registry.

mod error;
mod opcode;

pub mod message;

pub use error::Error;
pub use opcode::Opcode;
pub use message::{Envelope, Operation};

/// Decode a single text frame into a typed [`Operation`].
///
/// # Test
///
/// ```
/// use signaling_codec::{decode, Operation};
///
/// let frame = r#"{"opcode":0,"data":{"subnet":"127.0.0"}}"#;
/// match decode(frame).unwrap() {
///     Operation::Knock(knock) => assert_eq!(knock.subnet, "127.0.0"),
///     _ => panic!("expected knock"),
/// }
/// ```
pub fn decode(frame: &str) -> Result<Operation, Error> {
    let envelope: Envelope = serde_json::from_str(frame).map_err(|_| Error::MalformedPayload)?;
    envelope.into_operation()
}

/// Encode an outbound message into the wire envelope.
///
/// # Test
///
/// ```
/// use signaling_codec::{encode, message::Acknowledgement};
///
/// let text = encode(&Acknowledgement { id: "127.0.0.0".into(), rejected: false }).unwrap();
/// assert!(text.contains("\"opcode\":1"));
/// ```
pub fn encode<T: message::Outbound>(payload: &T) -> Result<String, Error> {
    let envelope = Envelope {
        opcode: T::OPCODE as u8,
        data: serde_json::to_value(payload).map_err(|_| Error::MalformedPayload)?,
    };

    serde_json::to_string(&envelope).map_err(|_| Error::MalformedPayload)
}
