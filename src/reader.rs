use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};

use crate::Never;

/// An object that provides lines to the solver.
///
/// See [`crate::Solver::new`] for more information.
///
/// Lines are opaque strings; jamloop never looks inside them. The line terminator is not part of
/// the line: implementations must accept both `\n` and `\r\n` endings and strip them, so that a
/// transform sees the same lines regardless of which platform produced the input file. No
/// terminator is required after the final line.
pub trait Reader {
    /// The error returned by this reader.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Return the next line of the input stream, or `None` once the stream is exhausted.
    fn read_line(&mut self) -> Result<Option<String>, Self::Error>;
}

/// An object that can be converted into a [`crate::Reader`].
///
/// For example, any utf8-string can be converted into a `StringReader`, such that
/// `Solver::new("3\n...", sink, plan)` and `Solver::new(&my_string, sink, plan)` work.
pub trait Readable<'a> {
    /// The reader type to which this type should be converted.
    type Reader: Reader + 'a;

    /// Convert self to some sort of reader.
    fn to_reader(self) -> Self::Reader;
}

impl<'a, R: 'a + Reader> Readable<'a> for R {
    type Reader = Self;

    fn to_reader(self) -> Self::Reader {
        self
    }
}

/// A reader over a string that is already in memory. Used by the solver to consume input from
/// string literals and owned strings, which is mostly useful in tests.
///
/// Example:
///
/// ```rust
/// use jamloop::{Readable, Reader};
///
/// let mut reader = "3\nfoo\r\nbar".to_reader();
/// let mut lines = Vec::new();
/// while let Some(line) = reader.read_line().unwrap() {
///     lines.push(line);
/// }
///
/// assert_eq!(lines, &["3", "foo", "bar"]);
/// ```
#[derive(Debug)]
pub struct StringReader<'a> {
    input: &'a str,
}

impl<'a> StringReader<'a> {
    fn new(input: &'a str) -> Self {
        StringReader { input }
    }
}

impl<'a> Reader for StringReader<'a> {
    type Error = Never;

    fn read_line(&mut self) -> Result<Option<String>, Self::Error> {
        if self.input.is_empty() {
            return Ok(None);
        }

        let line = match self.input.find('\n') {
            Some(newline_pos) => {
                let (line, rest) = self.input.split_at(newline_pos);
                self.input = &rest[1..];
                line
            }
            None => {
                let line = self.input;
                self.input = "";
                line
            }
        };

        Ok(Some(line.strip_suffix('\r').unwrap_or(line).to_string()))
    }
}

impl<'a> Readable<'a> for &'a str {
    type Reader = StringReader<'a>;

    fn to_reader(self) -> Self::Reader {
        StringReader::new(self)
    }
}

impl<'a> Readable<'a> for &'a String {
    type Reader = StringReader<'a>;

    fn to_reader(self) -> Self::Reader {
        StringReader::new(self.as_str())
    }
}

/// An [`IoReader`] can be used to construct a solver from any type that implements
/// `std::io::Read`.
///
/// Because of trait impl conflicts, `IoReader` needs to be explicitly constructed. The exception
/// to that is `File`, which can be directly passed to `Solver::new`.
///
/// When passing `Read`-types into jamloop, no I/O buffering is required. `IoReader` maintains its
/// own read-buffer. Put more simply, it's wasteful to wrap your `File` in a `std::io::BufReader`
/// before passing it to jamloop.
///
/// Example:
///
/// ```rust
/// use jamloop::{IoReader, Plan, Solver};
///
/// let input = IoReader::new("1\nhello".as_bytes());
/// // more realistically: File::open("a_large.in")?
/// let mut output = Vec::new();
///
/// Solver::new(input, &mut output, Plan::fixed_lines(1).unwrap())
///     .solve_infallible(|lines| lines[0].to_uppercase())
///     .unwrap();
///
/// assert_eq!(output, b"Case #1: HELLO");
/// ```
#[derive(Debug)]
pub struct IoReader<R: Read> {
    reader: BufReader<R>,
}

impl<R: Read> IoReader<R> {
    /// Construct a new `IoReader` from any type that implements `Read`.
    pub fn new(reader: R) -> Self {
        IoReader {
            reader: BufReader::new(reader),
        }
    }
}

impl<R: Read> Reader for IoReader<R> {
    type Error = io::Error;

    fn read_line(&mut self) -> Result<Option<String>, Self::Error> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }
}

impl<'a> Readable<'a> for File {
    type Reader = IoReader<File>;

    fn to_reader(self) -> Self::Reader {
        IoReader::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect<'a, S: Readable<'a>>(input: S) -> Vec<String> {
        let mut reader = input.to_reader();
        let mut lines = Vec::new();
        loop {
            match reader.read_line() {
                Ok(Some(line)) => lines.push(line),
                Ok(None) => break,
                Err(e) => panic!("read failed: {}", e),
            }
        }
        lines
    }

    #[test]
    fn string_reader_splits_lines() {
        assert_eq!(collect("a\nb\nc"), &["a", "b", "c"]);
    }

    #[test]
    fn string_reader_ignores_trailing_newline() {
        assert_eq!(collect("a\nb\n"), &["a", "b"]);
    }

    #[test]
    fn string_reader_keeps_empty_lines() {
        assert_eq!(collect("a\n\nb"), &["a", "", "b"]);
    }

    #[test]
    fn string_reader_strips_carriage_returns() {
        assert_eq!(collect("a\r\nb\r\n"), &["a", "b"]);
    }

    #[test]
    fn string_reader_empty_input_is_eof() {
        assert_eq!(collect(""), &[] as &[String]);
    }

    #[test]
    fn io_reader_matches_string_reader() {
        let input = "3\nfoo\r\nbar\n";
        let mut reader = IoReader::new(input.as_bytes());
        let mut lines = Vec::new();
        while let Some(line) = reader.read_line().unwrap() {
            lines.push(line);
        }
        assert_eq!(lines, collect(input));
    }
}
