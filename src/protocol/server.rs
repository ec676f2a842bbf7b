//! Subunit v1 parser
//!
//! Reads a fully buffered stream and forwards each decoded event to a sink.
//! Lines that are not protocol lines are logged and dropped. A `test:` line
//! only opens a test when none is open, and an outcome only applies to the
//! open test of the same name; anything else is treated as ordinary output.

use std::collections::BTreeSet;
use tracing::{debug, warn};

use super::{chunked, parse_time, Cursor, ProtocolError};
use crate::models::{Content, ContentType, Details, Event, OutcomeKind, ProgressWhence};
use crate::sink::{ResultSink, SinkError};

/// How details follow an outcome line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DetailsMode {
    None,
    Bracketed,
    Multipart,
}

/// Parses a subunit v1 stream into a [`ResultSink`]
pub struct ProtocolServer<'s> {
    sink: &'s mut dyn ResultSink,
    current_test: Option<String>,
}

impl<'s> ProtocolServer<'s> {
    pub fn new(sink: &'s mut dyn ResultSink) -> Self {
        Self {
            sink,
            current_test: None,
        }
    }

    /// Parse the whole of `stream`, forwarding events as they are decoded
    pub fn read_from(&mut self, stream: &[u8]) -> Result<(), SinkError> {
        let mut cursor = Cursor::new(stream);

        while let Some(raw) = cursor.read_line() {
            let line = String::from_utf8_lossy(raw);
            let line = line.trim_end_matches(['\n', '\r']);

            let Some((keyword, argument)) = split_command(line) else {
                debug!("Passing through non-protocol line: {:?}", line);
                continue;
            };

            match keyword {
                "test" | "testing" if self.current_test.is_none() => {
                    self.current_test = Some(argument.to_string());
                    self.sink.start_test(argument)?;
                }
                "test" | "testing" => {
                    debug!("Passing through line inside a test: {:?}", line);
                }
                "time" => match parse_time(argument) {
                    Ok(timestamp) => self.sink.time(timestamp)?,
                    Err(e) => warn!("Dropping time line: {}", e),
                },
                "tags" => {
                    let (new, gone) = parse_tags(argument);
                    self.sink.handle(&Event::Tags { new, gone })?;
                }
                "progress" => match parse_progress(argument) {
                    Ok((offset, whence)) => {
                        self.sink.handle(&Event::Progress { offset, whence })?
                    }
                    Err(e) => warn!("Dropping progress line: {}", e),
                },
                other => match OutcomeKind::from_keyword(other) {
                    Some(kind) => {
                        let (test, mode) = split_details_mode(argument);
                        if self.current_test.as_deref() == Some(test) {
                            self.read_outcome(kind, test, mode, &mut cursor)?;
                        } else {
                            debug!("Passing through outcome outside its test: {:?}", line);
                        }
                    }
                    None => debug!("Passing through non-protocol line: {:?}", line),
                },
            }
        }

        if let Some(test) = self.current_test.take() {
            self.lost_connection(&test, "during test")?;
        }
        Ok(())
    }

    fn read_outcome(
        &mut self,
        kind: OutcomeKind,
        test: &str,
        mode: DetailsMode,
        cursor: &mut Cursor<'_>,
    ) -> Result<(), SinkError> {
        let details = match mode {
            DetailsMode::None => Ok(Details::new()),
            DetailsMode::Bracketed => read_bracketed(cursor).map(|bytes| {
                let content_type = if kind == OutcomeKind::Skip {
                    ContentType::utf8_text()
                } else {
                    ContentType::traceback()
                };
                let mut details = Details::new();
                details.insert(
                    kind.simple_detail_name().to_string(),
                    Content::new(content_type, bytes),
                );
                details
            }),
            DetailsMode::Multipart => read_multipart(cursor),
        };

        self.current_test = None;

        match details {
            Ok(details) => {
                self.sink.handle(&Event::outcome(test, kind, details))?;
                self.sink.stop_test(test)
            }
            Err(e) => {
                warn!("Malformed {} report for {}: {}", kind.keyword(), test, e);
                self.lost_connection(test, &format!("during {} report", kind.keyword()))
            }
        }
    }

    fn lost_connection(&mut self, test: &str, phase: &str) -> Result<(), SinkError> {
        warn!("Lost connection {} {}", phase, test);
        let mut details = Details::new();
        details.insert(
            "lost-connection".to_string(),
            Content::text(format!("lost connection {phase} of test '{test}'")),
        );
        self.sink.add_error(test, details)?;
        self.sink.stop_test(test)
    }
}

/// Split `keyword: argument` (or `keyword argument`)
fn split_command(line: &str) -> Option<(&str, &str)> {
    let end = line.find([':', ' '])?;
    let keyword = &line[..end];
    if keyword.is_empty() {
        return None;
    }
    let rest = &line[end + 1..];
    Some((keyword, rest.strip_prefix(' ').unwrap_or(rest)))
}

fn split_details_mode(argument: &str) -> (&str, DetailsMode) {
    if let Some(test) = argument.strip_suffix(" [ multipart") {
        (test, DetailsMode::Multipart)
    } else if let Some(test) = argument.strip_suffix(" [") {
        (test, DetailsMode::Bracketed)
    } else {
        (argument.trim_end(), DetailsMode::None)
    }
}

/// Read a bracketed block up to its closing `]` line
fn read_bracketed(cursor: &mut Cursor<'_>) -> Result<Vec<u8>, ProtocolError> {
    let mut body = Vec::new();
    loop {
        let line = cursor.read_line().ok_or(ProtocolError::UnexpectedEof)?;
        if line == b"]\n" || line == b"]" || line == b"]\r\n" {
            return Ok(body);
        }
        // " ]" escapes a literal "]" line
        match line.strip_prefix(b" ]") {
            Some(rest) => {
                body.push(b']');
                body.extend_from_slice(rest);
            }
            None => body.extend_from_slice(line),
        }
    }
}

/// Read multipart details up to the closing `]` line
fn read_multipart(cursor: &mut Cursor<'_>) -> Result<Details, ProtocolError> {
    let mut details = Details::new();
    loop {
        let line = cursor.read_line().ok_or(ProtocolError::UnexpectedEof)?;
        let line = String::from_utf8_lossy(line);
        let line = line.trim_end_matches(['\n', '\r']);
        if line == "]" {
            return Ok(details);
        }

        let content_type = line
            .strip_prefix("Content-Type: ")
            .ok_or_else(|| ProtocolError::InvalidContentType(line.to_string()))
            .and_then(parse_content_type)?;

        let name = cursor.read_line().ok_or(ProtocolError::UnexpectedEof)?;
        let name = String::from_utf8_lossy(name)
            .trim_end_matches(['\n', '\r'])
            .to_string();

        let bytes = chunked::decode(cursor)?;
        details.insert(name, Content::new(content_type, bytes));
    }
}

/// Parse `type/subtype[;k=v,k=v]`
fn parse_content_type(value: &str) -> Result<ContentType, ProtocolError> {
    let invalid = || ProtocolError::InvalidContentType(value.to_string());
    let (media, params) = match value.split_once(';') {
        Some((media, params)) => (media, Some(params)),
        None => (value, None),
    };
    let (primary, subtype) = media.split_once('/').ok_or_else(invalid)?;
    if primary.is_empty() || subtype.is_empty() {
        return Err(invalid());
    }

    let mut content_type = ContentType::new(primary.trim(), subtype.trim());
    for param in params.into_iter().flat_map(|p| p.split(',')) {
        let (key, val) = param.split_once('=').ok_or_else(invalid)?;
        content_type = content_type.with_parameter(key.trim(), val.trim().trim_matches('"'));
    }
    Ok(content_type)
}

fn parse_tags(argument: &str) -> (BTreeSet<String>, BTreeSet<String>) {
    let mut new = BTreeSet::new();
    let mut gone = BTreeSet::new();
    for tag in argument.split_whitespace() {
        match tag.strip_prefix('-') {
            Some(tag) => gone.insert(tag.to_string()),
            None => new.insert(tag.to_string()),
        };
    }
    (new, gone)
}

fn parse_progress(argument: &str) -> Result<(i64, ProgressWhence), ProtocolError> {
    let argument = argument.trim();
    let invalid = || ProtocolError::InvalidProgress(argument.to_string());
    match argument {
        "push" => Ok((0, ProgressWhence::Push)),
        "pop" => Ok((0, ProgressWhence::Pop)),
        _ if argument.starts_with(['+', '-']) => argument
            .parse()
            .map(|offset| (offset, ProgressWhence::Current))
            .map_err(|_| invalid()),
        _ => argument
            .parse()
            .map(|offset| (offset, ProgressWhence::Set))
            .map_err(|_| invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ProtocolClient;
    use crate::sink::EventLog;
    use chrono::{TimeZone, Utc};

    fn parse(stream: &[u8]) -> Vec<Event> {
        let mut log = EventLog::new();
        ProtocolServer::new(&mut log).read_from(stream).unwrap();
        log.into_events()
    }

    #[test]
    fn test_simple_stream() {
        let events = parse(
            b"time: 2024-01-02 03:04:05.000000Z\n\
              test: pkg.test_a\n\
              success: pkg.test_a\n\
              test pkg.test_b\n\
              failure: pkg.test_b\n",
        );

        assert_eq!(
            events,
            vec![
                Event::time(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()),
                Event::start("pkg.test_a"),
                Event::success("pkg.test_a"),
                Event::stop("pkg.test_a"),
                Event::start("pkg.test_b"),
                Event::outcome("pkg.test_b", OutcomeKind::Failure, Details::new()),
                Event::stop("pkg.test_b"),
            ]
        );
    }

    #[test]
    fn test_bracketed_traceback() {
        let events = parse(
            b"test: t\n\
              error: t [\n\
              Traceback (most recent call last):\n\
              \x20]escaped\n\
              ]\n",
        );

        let Event::Outcome { kind, details, .. } = &events[1] else {
            panic!("expected outcome, got {:?}", events[1]);
        };
        assert_eq!(*kind, OutcomeKind::Error);
        assert_eq!(
            details["traceback"].as_text(),
            "Traceback (most recent call last):\n]escaped\n"
        );
        assert_eq!(details["traceback"].content_type, ContentType::traceback());
        assert_eq!(events[2], Event::stop("t"));
    }

    #[test]
    fn test_bracketed_skip_reason() {
        let events = parse(b"test: t\nskip: t [\nno network\n]\n");
        let Event::Outcome { details, .. } = &events[1] else {
            panic!("expected outcome");
        };
        assert_eq!(details["reason"].as_text(), "no network\n");
    }

    #[test]
    fn test_multipart_details() {
        let events = parse(
            b"test: t\n\
              failure: t [ multipart\n\
              Content-Type: text/plain;charset=utf8\n\
              log\n\
              5\r\n]\r\nab0\r\n\
              Content-Type: application/octet-stream\n\
              blob\n\
              0\r\n\
              ]\n",
        );

        let Event::Outcome { details, .. } = &events[1] else {
            panic!("expected outcome");
        };
        assert_eq!(details["log"].bytes, b"]\r\nab");
        assert_eq!(details["log"].content_type, ContentType::utf8_text());
        assert!(details["blob"].bytes.is_empty());
        assert_eq!(events.len(), 3);
    }

    #[test]
    fn test_tags_and_progress() {
        let events = parse(b"tags: py3 -slow\nprogress: 10\nprogress: -2\nprogress: pop\n");
        assert_eq!(
            events,
            vec![
                Event::Tags {
                    new: BTreeSet::from(["py3".to_string()]),
                    gone: BTreeSet::from(["slow".to_string()]),
                },
                Event::Progress {
                    offset: 10,
                    whence: ProgressWhence::Set
                },
                Event::Progress {
                    offset: -2,
                    whence: ProgressWhence::Current
                },
                Event::Progress {
                    offset: 0,
                    whence: ProgressWhence::Pop
                },
            ]
        );
    }

    #[test]
    fn test_noise_is_dropped() {
        let events = parse(b"Ran 3 tests\n\nOK\nrandom: stuff\ntime: not a time\n");
        assert!(events.is_empty());
    }

    #[test]
    fn test_lost_connection_during_test() {
        let events = parse(b"test: t\n");
        assert_eq!(events.len(), 3);
        let Event::Outcome { kind, details, .. } = &events[1] else {
            panic!("expected outcome");
        };
        assert_eq!(*kind, OutcomeKind::Error);
        assert!(details["lost-connection"].as_text().contains("'t'"));
        assert_eq!(events[2], Event::stop("t"));
    }

    #[test]
    fn test_lost_connection_during_details() {
        let events = parse(b"test: t\nfailure: t [\npartial traceback\n");
        assert_eq!(events.len(), 3);
        assert_eq!(events[1].outcome_kind(), Some(OutcomeKind::Error));
    }

    #[test]
    fn test_written_stream_reparses() {
        let mut details = Details::new();
        details.insert("stderr".to_string(), Content::text("boom\r\n]\r\nmore\n]"));
        let original = vec![
            Event::time(Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap()),
            Event::start("python312"),
            Event::error("python312", details),
            Event::stop("python312"),
            Event::start("pkg.test_x"),
            Event::skip("pkg.test_x", "not on this platform"),
            Event::stop("pkg.test_x"),
        ];

        let mut client = ProtocolClient::new(Vec::new());
        for event in &original {
            client.handle(event).unwrap();
        }
        let wire = client.into_inner();

        assert_eq!(parse(&wire), original);
    }

    #[test]
    fn test_parse_content_type() {
        let ct = parse_content_type("text/x-traceback;charset=utf8").unwrap();
        assert_eq!(ct, ContentType::traceback());
        let ct = parse_content_type("text/x-traceback;charset=utf8,language=python").unwrap();
        assert_eq!(ct.parameters["language"], "python");
        assert!(parse_content_type("garbage").is_err());
    }

    #[test]
    fn test_outcome_outside_test_is_output() {
        assert!(parse(b"error: connection refused\n").is_empty());
        assert!(parse(b"skip: t [\nreason\n]\n").is_empty());
    }

    #[test]
    fn test_outcome_for_other_test_is_output() {
        let events = parse(b"test: a\nfailure: see log\nsuccess: a\n");
        assert_eq!(
            events,
            vec![Event::start("a"), Event::success("a"), Event::stop("a")]
        );
    }

    #[test]
    fn test_nested_test_line_is_output() {
        let events = parse(b"test: a\ntest: printed by a\nsuccess: a\n");
        assert_eq!(
            events,
            vec![Event::start("a"), Event::success("a"), Event::stop("a")]
        );
    }
}
