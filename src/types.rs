//! Core data types for shape selection.
//!
//! This module defines the subset of the block/connection model the renderer needs
//! in order to pick a connection shape: the connection kind tags used on the wire,
//! the shape family tags, and the crate error type.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced by the shape constant provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// A connection carried a kind tag outside the known set. This is a contract
    /// violation by the caller (a malformed connection), not a recoverable state.
    #[error("unknown connection type: {0}")]
    UnknownConnectionType(i32),
}

/// The kind of a connection point on a block.
///
/// Discriminants are wire-compatible with the host block model, which stores
/// connection kinds as raw integer tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum ConnectionKind {
    /// A value socket on a block accepting an expression block.
    InputValue = 1,
    /// The output plug of an expression block.
    OutputValue = 2,
    /// The notch on the bottom of a statement block.
    NextStatement = 3,
    /// The tab on the top of a statement block.
    PreviousStatement = 4,
}

impl TryFrom<i32> for ConnectionKind {
    type Error = ShapeError;

    /// Decodes a raw connection-kind tag from the host model.
    ///
    /// # Returns
    ///
    /// The matching kind, or [`ShapeError::UnknownConnectionType`] for any tag
    /// outside the known set.
    fn try_from(tag: i32) -> Result<Self, ShapeError> {
        match tag {
            1 => Ok(ConnectionKind::InputValue),
            2 => Ok(ConnectionKind::OutputValue),
            3 => Ok(ConnectionKind::NextStatement),
            4 => Ok(ConnectionKind::PreviousStatement),
            other => Err(ShapeError::UnknownConnectionType(other)),
        }
    }
}

/// Tags for the connection-shape families.
///
/// Discriminants match the host model's numeric shape tags and double as keys of
/// the shape-in-shape padding table (where `0` is reserved for plain fields).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum ShapeKind {
    /// Chevron-edged shape used for boolean values.
    Hexagonal = 1,
    /// Arc-edged shape used for numbers, strings and reporters in general.
    Round = 2,
    /// Corner-rounded rectangle shape.
    Square = 3,
    /// Interlocking puzzle tab (reserved; not produced by this renderer).
    Puzzle = 4,
    /// The fixed tab/socket pair joining sequential statement blocks.
    Notch = 5,
}

impl ShapeKind {
    /// The numeric tag of this shape family, as used by the host model and the
    /// padding table.
    pub fn tag(self) -> i32 {
        self as i32
    }
}

/// The slice of a connection's contract needed to select a shape.
///
/// Hosts hand the provider one of these per connection. `kind` is kept as the raw
/// integer tag from the host model so that malformed data is detected inside
/// [`shape_for`](crate::ConstantProvider::shape_for) rather than silently mapped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    /// Raw connection-kind tag (see [`ConnectionKind`]).
    pub kind: i32,
    /// Ordered type-check list for this connection, if any.
    pub checks: Option<Vec<String>>,
    /// The mating connection, used as a fallback source of type checks.
    pub target: Option<Box<Connection>>,
    /// Explicit output-shape override declared by the owning block, if any.
    /// Only meaningful for value connections.
    pub output_shape: Option<ShapeKind>,
}

impl Connection {
    /// Creates a connection of the given kind with no checks and no override.
    pub fn new(kind: ConnectionKind) -> Self {
        Self {
            kind: kind as i32,
            checks: None,
            target: None,
            output_shape: None,
        }
    }

    /// Creates a connection with the given type-check list.
    pub fn with_checks(kind: ConnectionKind, checks: Vec<String>) -> Self {
        Self {
            kind: kind as i32,
            checks: Some(checks),
            target: None,
            output_shape: None,
        }
    }

    /// The effective check list: this connection's own checks, or the mating
    /// connection's checks when absent.
    pub fn effective_checks(&self) -> Option<&[String]> {
        self.checks
            .as_deref()
            .or_else(|| self.target.as_ref().and_then(|t| t.checks.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_kind_roundtrip() {
        for kind in [
            ConnectionKind::InputValue,
            ConnectionKind::OutputValue,
            ConnectionKind::NextStatement,
            ConnectionKind::PreviousStatement,
        ] {
            assert_eq!(ConnectionKind::try_from(kind as i32), Ok(kind));
        }
    }

    #[test]
    fn test_connection_kind_unknown_tag() {
        assert_eq!(
            ConnectionKind::try_from(0),
            Err(ShapeError::UnknownConnectionType(0))
        );
        assert_eq!(
            ConnectionKind::try_from(99),
            Err(ShapeError::UnknownConnectionType(99))
        );
    }

    #[test]
    fn test_shape_kind_tags() {
        assert_eq!(ShapeKind::Hexagonal.tag(), 1);
        assert_eq!(ShapeKind::Round.tag(), 2);
        assert_eq!(ShapeKind::Square.tag(), 3);
        assert_eq!(ShapeKind::Puzzle.tag(), 4);
        assert_eq!(ShapeKind::Notch.tag(), 5);
    }

    #[test]
    fn test_effective_checks_prefers_own() {
        let mut conn = Connection::with_checks(ConnectionKind::InputValue, vec!["Number".into()]);
        conn.target = Some(Box::new(Connection::with_checks(
            ConnectionKind::OutputValue,
            vec!["String".into()],
        )));
        assert_eq!(conn.effective_checks(), Some(&["Number".to_string()][..]));
    }

    #[test]
    fn test_effective_checks_falls_back_to_target() {
        let mut conn = Connection::new(ConnectionKind::InputValue);
        conn.target = Some(Box::new(Connection::with_checks(
            ConnectionKind::OutputValue,
            vec!["Boolean".into()],
        )));
        assert_eq!(conn.effective_checks(), Some(&["Boolean".to_string()][..]));
    }

    #[test]
    fn test_effective_checks_absent() {
        let conn = Connection::new(ConnectionKind::NextStatement);
        assert_eq!(conn.effective_checks(), None);
    }

    #[test]
    fn test_connection_serialization_roundtrip() {
        let mut conn = Connection::with_checks(ConnectionKind::InputValue, vec!["Boolean".into()]);
        conn.output_shape = Some(ShapeKind::Hexagonal);

        let json = serde_json::to_string(&conn).unwrap();
        let restored: Connection = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.kind, conn.kind);
        assert_eq!(restored.checks, conn.checks);
        assert_eq!(restored.output_shape, Some(ShapeKind::Hexagonal));
    }
}
