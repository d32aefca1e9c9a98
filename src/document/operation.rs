use crate::document::vector_clock::VectorClock;
use crate::grpc::{proto_operation, ProtoDelete, ProtoInsert, ProtoOperation, ProtoReplace, ProtoVectorClock};
use std::convert::TryFrom;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OperationKind {
    Insert,
    Delete,
    Replace,
}

/// A single edit request as it travels over the wire and into the WAL.
///
/// The payload encoding is kind-dependent: INSERT carries the text to splice
/// in, DELETE's payload length (in characters, content ignored) is the number
/// of characters to remove, and REPLACE encodes `<deleteLength>|<insertText>`.
/// Positions and lengths count characters, not bytes.
#[derive(Clone, Debug, PartialEq)]
pub struct Operation {
    pub kind: OperationKind,
    pub position: i64,
    pub payload: String,
    pub owner: String,
    pub clock: Option<VectorClock>,
}

impl Operation {
    pub fn insert(position: i64, text: impl Into<String>, owner: impl Into<String>) -> Self {
        Operation {
            kind: OperationKind::Insert,
            position,
            payload: text.into(),
            owner: owner.into(),
            clock: None,
        }
    }

    /// DELETE encodes its count as the payload's length, so the payload here
    /// is `count` filler characters.
    pub fn delete(position: i64, count: usize, owner: impl Into<String>) -> Self {
        Operation {
            kind: OperationKind::Delete,
            position,
            payload: " ".repeat(count),
            owner: owner.into(),
            clock: None,
        }
    }

    pub fn replace(position: i64, delete_count: usize, text: &str, owner: impl Into<String>) -> Self {
        Operation {
            kind: OperationKind::Replace,
            position,
            payload: format!("{}|{}", delete_count, text),
            owner: owner.into(),
            clock: None,
        }
    }

    pub fn with_clock(mut self, clock: VectorClock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Decode the payload into its typed form. REPLACE payloads can be
    /// malformed; everything else always parses.
    pub(crate) fn edit(&self) -> Result<Edit<'_>, MalformedOperationError> {
        match self.kind {
            OperationKind::Insert => Ok(Edit::Insert { text: &self.payload }),
            OperationKind::Delete => Ok(Edit::Delete {
                count: self.payload.chars().count(),
            }),
            OperationKind::Replace => {
                let mut parts = self.payload.splitn(2, '|');
                let length_part = parts.next().unwrap_or("");
                let text = parts.next().ok_or(MalformedOperationError::MissingReplaceDelimiter)?;
                let delete_count = length_part
                    .parse::<usize>()
                    .map_err(|_| MalformedOperationError::BadReplaceLength(length_part.to_string()))?;

                Ok(Edit::Replace { delete_count, text })
            }
        }
    }
}

#[derive(Debug, PartialEq)]
pub(crate) enum Edit<'a> {
    Insert { text: &'a str },
    Delete { count: usize },
    Replace { delete_count: usize, text: &'a str },
}

#[derive(Debug, thiserror::Error)]
pub enum MalformedOperationError {
    #[error("operation has no edit payload")]
    MissingEdit,
    #[error("REPLACE payload is missing the '|' delimiter")]
    MissingReplaceDelimiter,
    #[error("REPLACE payload has a bad delete length: '{0}'")]
    BadReplaceLength(String),
}

// ------- Wire conversions --------

impl From<&VectorClock> for ProtoVectorClock {
    fn from(clock: &VectorClock) -> Self {
        ProtoVectorClock {
            entries: clock.slots().to_vec(),
        }
    }
}

impl From<ProtoVectorClock> for VectorClock {
    fn from(proto: ProtoVectorClock) -> Self {
        VectorClock::from_slots(proto.entries)
    }
}

impl TryFrom<ProtoOperation> for Operation {
    type Error = MalformedOperationError;

    fn try_from(proto: ProtoOperation) -> Result<Self, Self::Error> {
        let (kind, payload) = match proto.edit {
            Some(proto_operation::Edit::Insert(ProtoInsert { payload })) => (OperationKind::Insert, payload),
            Some(proto_operation::Edit::Delete(ProtoDelete { payload })) => (OperationKind::Delete, payload),
            Some(proto_operation::Edit::Replace(ProtoReplace { payload })) => (OperationKind::Replace, payload),
            None => return Err(MalformedOperationError::MissingEdit),
        };

        let operation = Operation {
            kind,
            position: proto.position,
            payload,
            owner: proto.owner,
            clock: proto.clock.map(VectorClock::from),
        };

        // Reject malformed payloads at the boundary so they never reach the
        // WAL or the document.
        operation.edit()?;

        Ok(operation)
    }
}

impl From<&Operation> for ProtoOperation {
    fn from(operation: &Operation) -> Self {
        let payload = operation.payload.clone();
        let edit = match operation.kind {
            OperationKind::Insert => proto_operation::Edit::Insert(ProtoInsert { payload }),
            OperationKind::Delete => proto_operation::Edit::Delete(ProtoDelete { payload }),
            OperationKind::Replace => proto_operation::Edit::Replace(ProtoReplace { payload }),
        };

        ProtoOperation {
            position: operation.position,
            owner: operation.owner.clone(),
            clock: operation.clock.as_ref().map(ProtoVectorClock::from),
            edit: Some(edit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_count_is_payload_char_count() {
        let op = Operation::delete(2, 5, "alice");
        assert_eq!(op.edit().unwrap(), Edit::Delete { count: 5 });

        // Multi-byte characters still count as one each.
        let unicode = Operation {
            kind: OperationKind::Delete,
            position: 0,
            payload: "héllo".to_string(),
            owner: "alice".to_string(),
            clock: None,
        };
        assert_eq!(unicode.edit().unwrap(), Edit::Delete { count: 5 });
    }

    #[test]
    fn replace_payload_round_trips() {
        let op = Operation::replace(0, 5, "globo", "bob");
        assert_eq!(op.payload, "5|globo");
        assert_eq!(
            op.edit().unwrap(),
            Edit::Replace {
                delete_count: 5,
                text: "globo"
            }
        );
    }

    #[test]
    fn replace_insert_text_may_contain_delimiter() {
        let op = Operation::replace(0, 2, "a|b", "bob");
        assert_eq!(
            op.edit().unwrap(),
            Edit::Replace {
                delete_count: 2,
                text: "a|b"
            }
        );
    }

    #[test]
    fn replace_without_delimiter_is_malformed() {
        let op = Operation {
            kind: OperationKind::Replace,
            position: 0,
            payload: "5globo".to_string(),
            owner: "bob".to_string(),
            clock: None,
        };
        assert!(matches!(op.edit(), Err(MalformedOperationError::MissingReplaceDelimiter)));
    }

    #[test]
    fn replace_with_bad_length_is_malformed() {
        let op = Operation {
            kind: OperationKind::Replace,
            position: 0,
            payload: "-1|x".to_string(),
            owner: "bob".to_string(),
            clock: None,
        };
        assert!(matches!(op.edit(), Err(MalformedOperationError::BadReplaceLength(_))));
    }

    #[test]
    fn proto_round_trip_preserves_operation() {
        let op = Operation::insert(4, " mundo", "carol").with_clock(VectorClock::from_slots(vec![1, 0, 2]));

        let proto = ProtoOperation::from(&op);
        let back = Operation::try_from(proto).unwrap();

        assert_eq!(back, op);
    }

    #[test]
    fn proto_without_edit_is_rejected() {
        let proto = ProtoOperation {
            position: 0,
            owner: "carol".to_string(),
            clock: None,
            edit: None,
        };
        assert!(matches!(
            Operation::try_from(proto),
            Err(MalformedOperationError::MissingEdit)
        ));
    }

    #[test]
    fn proto_with_malformed_replace_is_rejected() {
        let proto = ProtoOperation {
            position: 0,
            owner: "carol".to_string(),
            clock: None,
            edit: Some(proto_operation::Edit::Replace(ProtoReplace {
                payload: "x|y".to_string(),
            })),
        };
        assert!(matches!(
            Operation::try_from(proto),
            Err(MalformedOperationError::BadReplaceLength(_))
        ));
    }
}
