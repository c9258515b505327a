use serde::{Deserialize, Serialize};

use crate::{Error, Opcode};

/// The outer `{"opcode": int, "data": object}` shape every frame is wrapped in.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope {
    pub opcode: u8,
    pub data: serde_json::Value,
}

impl Envelope {
    pub fn into_operation(self) -> Result<Operation, Error> {
        let opcode = Opcode::try_from(self.opcode).map_err(|_| Error::UnknownOpcode(self.opcode))?;

        fn parse<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> Result<T, Error> {
            serde_json::from_value(value).map_err(|_| Error::MalformedPayload)
        }

        Ok(match opcode {
            Opcode::Knock => Operation::Knock(parse(self.data)?),
            Opcode::Offer => Operation::Offer(parse(self.data)?),
            Opcode::Answer => Operation::Answer(parse(self.data)?),
            Opcode::Candidate => Operation::Candidate(parse(self.data)?),
            Opcode::Bind => Operation::Bind(parse(self.data)?),
            Opcode::Accepting => Operation::Accepting(parse(self.data)?),
            Opcode::Shutdown => Operation::Shutdown(parse(self.data)?),
            Opcode::Connect => Operation::Connect(parse(self.data)?),
            // Acknowledgement, Greeting, Alias, Accept, Goodbye are outbound-only opcodes;
            // receiving one from a client is treated as unknown.
            Opcode::Acknowledgement | Opcode::Greeting | Opcode::Alias | Opcode::Accept | Opcode::Goodbye => {
                return Err(Error::UnknownOpcode(self.opcode));
            }
        })
    }
}

/// A decoded inbound message, tagged by the opcode it arrived with.
#[derive(Debug)]
pub enum Operation {
    Knock(Knock),
    Offer(Offer),
    Answer(Answer),
    Candidate(Candidate),
    Bind(Bind),
    Accepting(Accepting),
    Shutdown(Shutdown),
    Connect(Connect),
}

/// Implemented by every outbound payload type so [`crate::encode`] knows which
/// opcode to stamp on the envelope.
pub trait Outbound: Serialize {
    const OPCODE: Opcode;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Knock {
    pub subnet: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Acknowledgement {
    pub id: String,
    pub rejected: bool,
}

impl Outbound for Acknowledgement {
    const OPCODE: Opcode = Opcode::Acknowledgement;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Greeting {
    pub offerer_id: String,
    pub answerer_id: String,
}

impl Outbound for Greeting {
    const OPCODE: Opcode = Opcode::Greeting;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub offerer_id: String,
    pub answerer_id: String,
    pub offer: String,
}

impl Outbound for Offer {
    const OPCODE: Opcode = Opcode::Offer;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub offerer_id: String,
    pub answerer_id: String,
    pub answer: String,
}

impl Outbound for Answer {
    const OPCODE: Opcode = Opcode::Answer;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub offerer_id: String,
    pub answerer_id: String,
    pub candidate: String,
}

impl Outbound for Candidate {
    const OPCODE: Opcode = Opcode::Candidate;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bind {
    pub id: String,
    pub alias: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alias {
    pub id: String,
    pub alias: String,
    pub set: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_connection_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_connection_alias: Option<bool>,
}

impl Outbound for Alias {
    const OPCODE: Opcode = Opcode::Alias;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Accepting {
    pub id: String,
    pub alias: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shutdown {
    pub id: String,
    pub alias: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connect {
    pub id: String,
    pub remote_alias: String,
    pub client_connection_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accept {
    pub bound_alias: String,
    pub client_alias: String,
}

impl Outbound for Accept {
    const OPCODE: Opcode = Opcode::Accept;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goodbye {
    pub id: String,
}

impl Outbound for Goodbye {
    const OPCODE: Opcode = Opcode::Goodbye;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_knock() {
        let envelope: Envelope = serde_json::from_str(r#"{"opcode":0,"data":{"subnet":"10.0.0"}}"#).unwrap();
        match envelope.into_operation().unwrap() {
            Operation::Knock(knock) => assert_eq!(knock.subnet, "10.0.0"),
            other => panic!("unexpected operation: {other:?}"),
        }
    }

    #[test]
    fn rejects_outbound_only_opcode_from_client() {
        let envelope: Envelope = serde_json::from_str(r#"{"opcode":1,"data":{"id":"x","rejected":false}}"#).unwrap();
        assert!(matches!(envelope.into_operation(), Err(Error::UnknownOpcode(1))));
    }

    #[test]
    fn rejects_unknown_opcode() {
        let envelope: Envelope = serde_json::from_str(r#"{"opcode":99,"data":{}}"#).unwrap();
        assert!(matches!(envelope.into_operation(), Err(Error::UnknownOpcode(99))));
    }

    #[test]
    fn alias_omits_optional_fields_when_absent() {
        let alias = Alias {
            id: "127.0.0.0".into(),
            alias: "127.0.0.0:0".into(),
            set: true,
            client_connection_id: None,
            is_connection_alias: None,
        };

        let text = crate::encode(&alias).unwrap();
        assert!(!text.contains("clientConnectionId"));
        assert!(!text.contains("isConnectionAlias"));
    }
}
