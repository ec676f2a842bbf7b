//! Subunit v1 serializer

use std::io::Write;

use super::{chunked, format_time};
use crate::models::{Details, Event, ProgressWhence};
use crate::sink::{ResultSink, SinkError};

/// Sink that writes events as a subunit v1 stream
pub struct ProtocolClient<W: Write> {
    out: W,
}

impl<W: Write> ProtocolClient<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_details(&mut self, details: &Details) -> std::io::Result<()> {
        for (name, content) in details {
            writeln!(self.out, "Content-Type: {}", content.content_type)?;
            writeln!(self.out, "{name}")?;
            chunked::encode(&content.bytes, &mut self.out)?;
        }
        self.out.write_all(b"]\n")
    }

    fn write_event(&mut self, event: &Event) -> std::io::Result<()> {
        match event {
            Event::Start { test } => writeln!(self.out, "test: {test}"),
            // Outcomes close the test on the wire
            Event::Stop { .. } => Ok(()),
            Event::Outcome {
                test,
                kind,
                details,
            } => {
                if details.is_empty() {
                    writeln!(self.out, "{}: {test}", kind.keyword())
                } else {
                    writeln!(self.out, "{}: {test} [ multipart", kind.keyword())?;
                    self.write_details(details)
                }
            }
            Event::Time { timestamp } => writeln!(self.out, "time: {}", format_time(timestamp)),
            Event::Tags { new, gone } => {
                let tags: Vec<String> = new
                    .iter()
                    .cloned()
                    .chain(gone.iter().map(|t| format!("-{t}")))
                    .collect();
                writeln!(self.out, "tags: {}", tags.join(" "))
            }
            Event::Progress { offset, whence } => match whence {
                ProgressWhence::Set => writeln!(self.out, "progress: {offset}"),
                ProgressWhence::Current => writeln!(self.out, "progress: {offset:+}"),
                ProgressWhence::Push => writeln!(self.out, "progress: push"),
                ProgressWhence::Pop => writeln!(self.out, "progress: pop"),
            },
        }
    }
}

impl<W: Write> ResultSink for ProtocolClient<W> {
    fn handle(&mut self, event: &Event) -> Result<(), SinkError> {
        self.write_event(event)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Content, OutcomeKind};
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeSet;

    fn render(events: &[Event]) -> String {
        let mut client = ProtocolClient::new(Vec::new());
        for event in events {
            client.handle(event).unwrap();
        }
        String::from_utf8(client.into_inner()).unwrap()
    }

    #[test]
    fn test_simple_outcomes() {
        let out = render(&[
            Event::start("pkg.tests.test_a"),
            Event::success("pkg.tests.test_a"),
            Event::stop("pkg.tests.test_a"),
        ]);
        assert_eq!(out, "test: pkg.tests.test_a\nsuccess: pkg.tests.test_a\n");
    }

    #[test]
    fn test_skip_with_reason() {
        let out = render(&[Event::skip("python27", "python2.7 not available")]);
        assert_eq!(
            out,
            "skip: python27 [ multipart\n\
             Content-Type: text/plain;charset=utf8\n\
             reason\n\
             17\r\npython2.7 not available0\r\n\
             ]\n"
        );
    }

    #[test]
    fn test_error_with_stderr() {
        let mut details = Details::new();
        details.insert(
            "stderr".to_string(),
            Content::text("Traceback\n"),
        );
        let out = render(&[Event::outcome("python312", OutcomeKind::Error, details)]);
        assert!(out.starts_with("error: python312 [ multipart\n"));
        assert!(out.contains("stderr\nA\r\nTraceback\n0\r\n]\n"));
    }

    #[test]
    fn test_time_tags_progress() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let out = render(&[
            Event::time(ts),
            Event::Tags {
                new: BTreeSet::from(["py3".to_string()]),
                gone: BTreeSet::from(["slow".to_string()]),
            },
            Event::Progress {
                offset: 3,
                whence: ProgressWhence::Current,
            },
            Event::Progress {
                offset: 0,
                whence: ProgressWhence::Push,
            },
        ]);
        assert_eq!(
            out,
            "time: 2024-01-02 03:04:05.000000Z\ntags: py3 -slow\nprogress: +3\nprogress: push\n"
        );
    }
}
