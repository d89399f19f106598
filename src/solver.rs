use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{error, info};

use crate::{Error, IoReader, Never, Plan, Readable, Reader, SolveError};

/// A test case slower than this gets its own timing notice when timing is enabled.
const SLOW_CASE: Duration = Duration::from_millis(100);

/// The Code Jam dispatch loop. See crate-level docs for basic usage.
///
/// A solver owns an input line source, an output sink and a [`Plan`]. Calling [`Solver::solve`]
/// reads the test case count from the first input line, then repeatedly applies the plan,
/// hands the extracted lines to the transform and writes `Case #i: <result>` lines. It runs at
/// most once; the source and sink are closed when the solver is dropped.
#[derive(Debug)]
pub struct Solver<R: Reader, W: Write> {
    reader: R,
    sink: W,
    plan: Plan,
    timed: bool,
    started: bool,
}

impl Solver<IoReader<File>, BufWriter<File>> {
    /// Create a solver from an input file path and an output file path.
    ///
    /// The input file must exist and be readable. If the output file already exists it is
    /// cleared first; either failure surfaces as [`Error::Io`] before any solving happens.
    /// Empty paths fail with [`Error::InvalidArgument`].
    pub fn from_paths<P, Q>(input: P, output: Q, plan: Plan) -> Result<Self, Error>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let input = input.as_ref();
        let output = output.as_ref();
        if input.as_os_str().is_empty() {
            return Err(Error::InvalidArgument(
                "input file path can't be empty".to_string(),
            ));
        }
        if output.as_os_str().is_empty() {
            return Err(Error::InvalidArgument(
                "output file path can't be empty".to_string(),
            ));
        }
        let source = File::open(input)?;
        if output.exists() {
            fs::remove_file(output)?;
        }
        let sink = BufWriter::new(File::create(output)?);
        Ok(Solver::new(IoReader::new(source), sink, plan))
    }
}

impl<R: Reader, W: Write> Solver<R, W> {
    /// Create a solver from some input, a sink and a plan.
    ///
    /// `input` can be `&str`, `&String`, a `File`, or anything wrapped in [`crate::IoReader`],
    /// as those are the types for which [`crate::Readable`] is implemented — but you can
    /// implement that trait on your own types. The sink is any `std::io::Write`; a `Vec<u8>`
    /// works well in tests.
    pub fn new<'a, S: Readable<'a, Reader = R>>(input: S, sink: W, plan: Plan) -> Self {
        Solver {
            reader: input.to_reader(),
            sink,
            plan,
            timed: false,
            started: false,
        }
    }

    /// Enable execution time logging.
    ///
    /// Every test case whose transform takes longer than 100 ms gets a [`tracing`] notice, and
    /// one aggregate notice is emitted after the last case. Timing only reports, it never
    /// aborts a slow transform.
    #[must_use]
    pub fn timed(mut self) -> Self {
        self.timed = true;
        self
    }

    /// Solve the input with a transform that can fail.
    ///
    /// The transform receives all lines of a single test case and returns the output for that
    /// case. Don't put `Case #x: ` in the return value, that is added automatically. A
    /// transform error stops the loop and is returned unchanged as
    /// [`SolveError::Transform`]; output already written for earlier cases stays in place.
    ///
    /// Whatever happens — success, malformed input, a transform error — the sink is flushed
    /// before this returns. Calling `solve` a second time on the same solver fails with
    /// [`Error::InvalidState`] without touching the input or the sink.
    pub fn solve<F, E>(&mut self, mut transform: F) -> Result<(), SolveError<E>>
    where
        F: FnMut(&[String]) -> Result<String, E>,
        E: std::error::Error,
    {
        if self.started {
            return Err(SolveError::Jam(Error::InvalidState(
                "this solver has already been started once".to_string(),
            )));
        }
        self.started = true;

        let outcome = self.case_loop(&mut transform);
        // The sink must be left flushed no matter how the loop exited.
        let flushed = self.sink.flush();
        match (outcome, flushed) {
            (Err(e), _) => Err(e),
            (Ok(()), Err(e)) => Err(SolveError::Jam(Error::Io(e))),
            (Ok(()), Ok(())) => Ok(()),
        }
    }

    /// Solve the input with a transform that cannot fail.
    ///
    /// Statically gets rid of the [`SolveError`] layer for the common case where the transform
    /// is a plain `&[String] -> String` function.
    pub fn solve_infallible<F>(&mut self, mut transform: F) -> Result<(), Error>
    where
        F: FnMut(&[String]) -> String,
    {
        self.solve(|lines| Ok::<String, Never>(transform(lines)))
            .map_err(|e| match e {
                SolveError::Jam(e) => e,
                SolveError::Transform(never) => match never {},
            })
    }

    fn case_loop<F, E>(&mut self, transform: &mut F) -> Result<(), SolveError<E>>
    where
        F: FnMut(&[String]) -> Result<String, E>,
        E: std::error::Error,
    {
        let loop_started = Instant::now();
        let cases = self.case_count().map_err(|e| {
            error!("could not read the test case count: {}", e);
            SolveError::Jam(e)
        })?;

        for case in 1..=cases {
            let lines = match self.plan.extract(&mut self.reader) {
                Ok(lines) => lines,
                Err(e) => {
                    error!("stopping at test case #{}: {}", case, e);
                    return Err(SolveError::Jam(e));
                }
            };

            let case_started = Instant::now();
            let output = transform(&lines).map_err(SolveError::Transform)?;
            if self.timed {
                let spent = case_started.elapsed();
                if spent > SLOW_CASE {
                    info!("test case #{} solved in {}", case, human_duration(spent));
                }
            }

            // One atomic write per case, so a later failure can't leave a half-written line.
            let mut formatted = String::new();
            if case > 1 {
                formatted.push('\n');
            }
            formatted.push_str("Case #");
            formatted.push_str(&case.to_string());
            formatted.push_str(": ");
            formatted.push_str(&output);
            self.sink
                .write_all(formatted.as_bytes())
                .map_err(Error::from)?;
        }

        if self.timed {
            info!(
                "all {} test case(s) solved in {}",
                cases,
                human_duration(loop_started.elapsed())
            );
        }
        Ok(())
    }

    fn case_count(&mut self) -> Result<u64, Error> {
        let line = match self.reader.read_line() {
            Ok(Some(line)) => line,
            Ok(None) => {
                return Err(Error::MalformedInput(
                    "the input is empty, expected a test case count on the first line".to_string(),
                ))
            }
            Err(e) => return Err(Error::read(e)),
        };
        line.parse().map_err(|_| {
            Error::MalformedInput(format!(
                "the first line should be the test case count, got {:?}",
                line
            ))
        })
    }
}

fn human_duration(spent: Duration) -> String {
    let millis = spent.as_millis();
    if millis > 10_000 {
        format!("~{} seconds", (millis + 500) / 1000)
    } else {
        format!("{} milliseconds", millis)
    }
}
