// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::fmt;
use std::{error, result};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NoError, // will never be produced
    DuplicateVertex,
    VertexOutOfRange,
    ChildSlotOutOfRange,
    ForeignSnapshot,
    UnknownVertex,
    RootNotInGraph,
    SelfLoop,
    DegenerateSector,
    TreeMismatch,
    DisconnectedInput,
    BadConfig,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use ErrorCode::*;
        let name = match self {
            NoError => "no_error",
            DuplicateVertex => "duplicate_vertex",
            VertexOutOfRange => "vertex_out_of_range",
            ChildSlotOutOfRange => "child_slot_out_of_range",
            ForeignSnapshot => "foreign_snapshot",
            UnknownVertex => "unknown_vertex",
            RootNotInGraph => "root_not_in_graph",
            SelfLoop => "self_loop",
            DegenerateSector => "degenerate_sector",
            TreeMismatch => "tree_mismatch",
            DisconnectedInput => "disconnected_input",
            BadConfig => "bad_config",
        };

        write!(f, "{name}")
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The input graph violates a structural precondition.
    Graph,
    /// A sector pass hit a state the tree invariants should rule out.
    Layout,
    Config,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub kind: ErrorKind,
    pub code: ErrorCode,
    pub details: Option<String>,
}

impl Error {
    pub fn new(kind: ErrorKind, code: ErrorCode, details: Option<String>) -> Self {
        Error {
            kind,
            code,
            details,
        }
    }

    pub fn get_details(&self) -> Option<String> {
        self.details.clone()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind = match self.kind {
            ErrorKind::Graph => "InvalidGraphError",
            ErrorKind::Layout => "DegenerateSectorError",
            ErrorKind::Config => "ConfigError",
        };
        match self.details {
            Some(ref details) => write!(f, "{}{{{}: {}}}", kind, self.code, details),
            None => write!(f, "{}{{{}}}", kind, self.code),
        }
    }
}

impl error::Error for Error {}

pub type Result<T> = result::Result<T, Error>;

/// A non-fatal condition noticed while processing input. The affected
/// part of the input is excluded from the result rather than failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub code: ErrorCode,
    pub details: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.code {
            ErrorCode::DisconnectedInput => {
                write!(f, "DisconnectedInputWarning{{{}}}", self.details)
            }
            code => write!(f, "Warning{{{}: {}}}", code, self.details),
        }
    }
}

#[macro_export]
macro_rules! graph_err {
    ($code:tt, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(ErrorKind::Graph, ErrorCode::$code, Some($str)))
    }};
}

#[macro_export]
macro_rules! layout_err {
    ($code:tt, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(ErrorKind::Layout, ErrorCode::$code, Some($str)))
    }};
}

#[macro_export]
macro_rules! config_err {
    ($str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(ErrorKind::Config, ErrorCode::BadConfig, Some($str)))
    }};
}

#[test]
fn test_error_display() {
    let err = Error::new(
        ErrorKind::Graph,
        ErrorCode::SelfLoop,
        Some("vertex 3".to_string()),
    );
    assert_eq!(format!("{err}"), "InvalidGraphError{self_loop: vertex 3}");

    let err = Error::new(ErrorKind::Layout, ErrorCode::DegenerateSector, None);
    assert_eq!(format!("{err}"), "DegenerateSectorError{degenerate_sector}");
    assert!(err.get_details().is_none());

    let err = Error::new(ErrorKind::Layout, ErrorCode::TreeMismatch, None);
    assert_eq!(format!("{err}"), "DegenerateSectorError{tree_mismatch}");
    assert_eq!(format!("{}", ErrorCode::ForeignSnapshot), "foreign_snapshot");
}

#[test]
fn test_warning_display() {
    let warning = Warning {
        code: ErrorCode::DisconnectedInput,
        details: "2 vertices unreachable from root 0".to_string(),
    };
    let display = format!("{warning}");
    assert!(display.starts_with("DisconnectedInputWarning"));
    assert!(display.contains("unreachable"));
}

#[test]
fn test_err_macros() {
    let r: Result<()> = graph_err!(RootNotInGraph, "root 9".to_string());
    let err = r.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Graph);
    assert_eq!(err.code, ErrorCode::RootNotInGraph);

    let r: Result<()> = config_err!("decrease factor".to_string());
    assert_eq!(r.unwrap_err().code, ErrorCode::BadConfig);
}
