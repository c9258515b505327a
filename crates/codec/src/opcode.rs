use num_enum::{IntoPrimitive, TryFromPrimitive};

/// The closed set of opcodes carried in the `opcode` field of an [`Envelope`](crate::message::Envelope).
///
/// Inbound opcodes are decoded into an [`Operation`](crate::message::Operation);
/// outbound opcodes are produced from the typed payload structs in [`message`](crate::message).
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum Opcode {
    Knock = 0,
    Acknowledgement = 1,
    Greeting = 2,
    Offer = 3,
    Answer = 4,
    Candidate = 5,
    Bind = 6,
    Alias = 7,
    Accepting = 8,
    Shutdown = 9,
    Connect = 10,
    Accept = 11,
    Goodbye = 12,
}
