//! Result event models
//!
//! Defines the events relayed through the aggregated stream along with
//! the MIME-like content attached to outcomes.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A MIME content type, e.g. `text/plain;charset=utf8`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentType {
    pub primary: String,
    pub subtype: String,
    pub parameters: BTreeMap<String, String>,
}

impl ContentType {
    pub fn new(primary: impl Into<String>, subtype: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            subtype: subtype.into(),
            parameters: BTreeMap::new(),
        }
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// `text/plain;charset=utf8`
    pub fn utf8_text() -> Self {
        Self::new("text", "plain").with_parameter("charset", "utf8")
    }

    /// `text/x-traceback;charset=utf8`, used for bracketed tracebacks
    pub fn traceback() -> Self {
        Self::new("text", "x-traceback").with_parameter("charset", "utf8")
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.primary, self.subtype)?;
        if !self.parameters.is_empty() {
            let params: Vec<String> = self
                .parameters
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            write!(f, ";{}", params.join(","))?;
        }
        Ok(())
    }
}

/// Typed bytes attached to an outcome
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Content {
    pub content_type: ContentType,
    pub bytes: Vec<u8>,
}

impl Content {
    pub fn new(content_type: ContentType, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            content_type,
            bytes: bytes.into(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(ContentType::utf8_text(), text.into().into_bytes())
    }

    pub fn as_text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

impl Serialize for Content {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Content", 2)?;
        state.serialize_field("content_type", &self.content_type.to_string())?;
        state.serialize_field("text", &self.as_text())?;
        state.end()
    }
}

/// Named content attached to an outcome
pub type Details = BTreeMap<String, Content>;

/// Verdict reported for a test
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Success,
    Failure,
    Error,
    Skip,
    ExpectedFailure,
    UnexpectedSuccess,
}

impl OutcomeKind {
    /// Keyword used on the subunit wire
    pub fn keyword(&self) -> &'static str {
        match self {
            OutcomeKind::Success => "success",
            OutcomeKind::Failure => "failure",
            OutcomeKind::Error => "error",
            OutcomeKind::Skip => "skip",
            OutcomeKind::ExpectedFailure => "xfail",
            OutcomeKind::UnexpectedSuccess => "uxsuccess",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "success" | "successful" => Some(OutcomeKind::Success),
            "failure" => Some(OutcomeKind::Failure),
            "error" => Some(OutcomeKind::Error),
            "skip" => Some(OutcomeKind::Skip),
            "xfail" => Some(OutcomeKind::ExpectedFailure),
            "uxsuccess" => Some(OutcomeKind::UnexpectedSuccess),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            OutcomeKind::Success => "✓",
            OutcomeKind::Failure => "✗",
            OutcomeKind::Error => "!",
            OutcomeKind::Skip => "○",
            OutcomeKind::ExpectedFailure => "x",
            OutcomeKind::UnexpectedSuccess => "u",
        }
    }

    /// Name of the detail a bracketed block maps onto
    pub fn simple_detail_name(&self) -> &'static str {
        match self {
            OutcomeKind::Skip => "reason",
            _ => "traceback",
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeKind::Success => write!(f, "SUCCESS"),
            OutcomeKind::Failure => write!(f, "FAILURE"),
            OutcomeKind::Error => write!(f, "ERROR"),
            OutcomeKind::Skip => write!(f, "SKIP"),
            OutcomeKind::ExpectedFailure => write!(f, "XFAIL"),
            OutcomeKind::UnexpectedSuccess => write!(f, "UXSUCCESS"),
        }
    }
}

/// Progress marker semantics
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressWhence {
    /// Absolute test count
    Set,
    /// Relative adjustment
    Current,
    Push,
    Pop,
}

/// One entry in a result stream
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    Start {
        test: String,
    },
    Stop {
        test: String,
    },
    Outcome {
        test: String,
        kind: OutcomeKind,
        details: Details,
    },
    Time {
        timestamp: DateTime<Utc>,
    },
    Tags {
        new: BTreeSet<String>,
        gone: BTreeSet<String>,
    },
    Progress {
        offset: i64,
        whence: ProgressWhence,
    },
}

impl Event {
    pub fn start(test: impl Into<String>) -> Self {
        Event::Start { test: test.into() }
    }

    pub fn stop(test: impl Into<String>) -> Self {
        Event::Stop { test: test.into() }
    }

    pub fn outcome(test: impl Into<String>, kind: OutcomeKind, details: Details) -> Self {
        Event::Outcome {
            test: test.into(),
            kind,
            details,
        }
    }

    pub fn success(test: impl Into<String>) -> Self {
        Self::outcome(test, OutcomeKind::Success, Details::new())
    }

    /// Skip carrying its reason as the `reason` detail
    pub fn skip(test: impl Into<String>, reason: impl Into<String>) -> Self {
        let mut details = Details::new();
        details.insert("reason".to_string(), Content::text(reason));
        Self::outcome(test, OutcomeKind::Skip, details)
    }

    pub fn error(test: impl Into<String>, details: Details) -> Self {
        Self::outcome(test, OutcomeKind::Error, details)
    }

    pub fn time(timestamp: DateTime<Utc>) -> Self {
        Event::Time { timestamp }
    }

    pub fn outcome_kind(&self) -> Option<OutcomeKind> {
        match self {
            Event::Outcome { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Start { test } => write!(f, "start {test}"),
            Event::Stop { test } => write!(f, "stop {test}"),
            Event::Outcome { test, kind, .. } => write!(f, "{} {} {}", kind.symbol(), kind, test),
            Event::Time { timestamp } => write!(f, "time {}", timestamp.to_rfc3339()),
            Event::Tags { new, gone } => write!(f, "tags +{new:?} -{gone:?}"),
            Event::Progress { offset, whence } => write!(f, "progress {whence:?} {offset}"),
        }
    }
}
