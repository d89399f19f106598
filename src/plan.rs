use std::fmt;

use crate::{Error, Reader};

/// How one group of lines within a test case is pulled out of the input stream.
enum Segment {
    /// Exactly this many lines, known up front.
    Fixed(usize),
    /// One count line, then as many follow-up lines as the callback says. The count line itself
    /// belongs to the test case too.
    Dynamic(Box<dyn Fn(&str) -> usize>),
}

impl fmt::Debug for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Fixed(n) => f.debug_tuple("Fixed").field(n).finish(),
            Segment::Dynamic(_) => f.write_str("Dynamic"),
        }
    }
}

/// A description of how many lines make up one test case.
///
/// Plans are built once, before solving starts, and are immutable afterwards. Applying a plan
/// runs its segments in the order they were added and concatenates their lines into the block
/// handed to the transform.
///
/// ```rust
/// use jamloop::{Plan, Readable};
///
/// // One fixed line, then a count line announcing its own follow-up lines.
/// let plan = Plan::builder()
///     .fixed(1)?
///     .dynamic(|line| line.parse().unwrap())
///     .build()?;
///
/// let mut reader = "header\n2\nx\ny\nnext case...".to_reader();
/// let lines = plan.extract(&mut reader)?;
/// assert_eq!(lines, &["header", "2", "x", "y"]);
/// # Ok::<(), jamloop::Error>(())
/// ```
#[derive(Debug)]
pub struct Plan {
    segments: Vec<Segment>,
}

impl Plan {
    /// Start building a plan segment by segment. See [`PlanBuilder`].
    #[must_use]
    pub fn builder() -> PlanBuilder {
        PlanBuilder {
            segments: Vec::new(),
        }
    }

    /// The common case: every test case is exactly `n` lines.
    ///
    /// Equivalent to `Plan::builder().fixed(n)?.build()`. Fails with
    /// [`Error::InvalidArgument`] if `n` is zero.
    pub fn fixed_lines(n: usize) -> Result<Plan, Error> {
        Plan::builder().fixed(n)?.build()
    }

    /// Pull one test case's worth of lines out of `reader`.
    ///
    /// Fails with [`Error::MalformedInput`] if the stream ends before every segment got its
    /// lines, and with [`Error::Read`] if the reader itself fails.
    pub fn extract<R: Reader>(&self, reader: &mut R) -> Result<Vec<String>, Error> {
        let mut lines = Vec::new();
        for segment in &self.segments {
            match segment {
                Segment::Fixed(n) => {
                    for taken in 0..*n {
                        lines.push(required_line(reader, *n - taken)?);
                    }
                }
                Segment::Dynamic(line_count) => {
                    let first = required_line(reader, 1)?;
                    let rest = line_count(&first);
                    lines.push(first);
                    for taken in 0..rest {
                        lines.push(required_line(reader, rest - taken)?);
                    }
                }
            }
        }
        Ok(lines)
    }
}

fn required_line<R: Reader>(reader: &mut R, wanted: usize) -> Result<String, Error> {
    match reader.read_line() {
        Ok(Some(line)) => Ok(line),
        Ok(None) => Err(Error::MalformedInput(format!(
            "expected {} more line(s) for the current test case, but the stream ended early. \
             Does the plan match the input file's structure?",
            wanted
        ))),
        Err(e) => Err(Error::read(e)),
    }
}

/// Accumulates segments for a [`Plan`], in call order.
///
/// Ordering matters: segments describe consecutive groups of lines within one test case.
#[derive(Debug)]
pub struct PlanBuilder {
    segments: Vec<Segment>,
}

impl PlanBuilder {
    /// Append a segment of exactly `n` lines.
    ///
    /// Fails with [`Error::InvalidArgument`] if `n` is zero.
    pub fn fixed(mut self, n: usize) -> Result<PlanBuilder, Error> {
        if n == 0 {
            return Err(Error::InvalidArgument(
                "a fixed segment needs at least one line".to_string(),
            ));
        }
        self.segments.push(Segment::Fixed(n));
        Ok(self)
    }

    /// Append a segment whose length is announced by its first line.
    ///
    /// The first line of the segment is passed to `line_count`, which returns the number of
    /// lines that follow it. The count line is included in the test case handed to the
    /// transform. The callback should be a pure function of the line's text; it is not told
    /// which test case it is looking at.
    pub fn dynamic<F>(mut self, line_count: F) -> PlanBuilder
    where
        F: Fn(&str) -> usize + 'static,
    {
        self.segments.push(Segment::Dynamic(Box::new(line_count)));
        self
    }

    /// Finish the plan. Fails with [`Error::InvalidState`] if no segments were added.
    pub fn build(self) -> Result<Plan, Error> {
        if self.segments.is_empty() {
            return Err(Error::InvalidState(
                "add at least one segment to the plan before calling build()".to_string(),
            ));
        }
        Ok(Plan {
            segments: self.segments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Readable;

    #[test]
    fn fixed_segment_takes_exactly_n_lines() {
        let plan = Plan::fixed_lines(2).unwrap();
        let mut reader = "a\nb\nc\nd".to_reader();
        assert_eq!(plan.extract(&mut reader).unwrap(), &["a", "b"]);
        assert_eq!(plan.extract(&mut reader).unwrap(), &["c", "d"]);
    }

    #[test]
    fn dynamic_segment_includes_its_count_line() {
        let plan = Plan::builder()
            .dynamic(|line| line.parse().unwrap())
            .build()
            .unwrap();
        let mut reader = "3\nx\ny\nz".to_reader();
        assert_eq!(plan.extract(&mut reader).unwrap(), &["3", "x", "y", "z"]);
    }

    #[test]
    fn dynamic_segment_may_announce_zero_lines() {
        let plan = Plan::builder().dynamic(|_| 0).build().unwrap();
        let mut reader = "lonely".to_reader();
        assert_eq!(plan.extract(&mut reader).unwrap(), &["lonely"]);
    }

    #[test]
    fn segments_apply_in_insertion_order() {
        let plan = Plan::builder()
            .fixed(1)
            .unwrap()
            .dynamic(|line| line.parse().unwrap())
            .fixed(1)
            .unwrap()
            .build()
            .unwrap();
        let mut reader = "head\n1\nbody\ntail".to_reader();
        assert_eq!(
            plan.extract(&mut reader).unwrap(),
            &["head", "1", "body", "tail"]
        );
    }

    #[test]
    fn truncated_fixed_segment_is_malformed_input() {
        let plan = Plan::fixed_lines(3).unwrap();
        let mut reader = "only\ntwo".to_reader();
        let err = plan.extract(&mut reader).unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)), "{:?}", err);
    }

    #[test]
    fn dynamic_segment_with_no_count_line_is_malformed_input() {
        let plan = Plan::builder().dynamic(|_| 0).build().unwrap();
        let mut reader = "".to_reader();
        let err = plan.extract(&mut reader).unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)), "{:?}", err);
    }

    #[test]
    fn zero_line_fixed_segment_is_rejected() {
        let err = Plan::builder().fixed(0).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)), "{:?}", err);
        let err = Plan::fixed_lines(0).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)), "{:?}", err);
    }

    #[test]
    fn empty_plan_is_rejected() {
        let err = Plan::builder().build().unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)), "{:?}", err);
    }

    #[test]
    fn identical_rule_sequences_behave_identically() {
        let build = || {
            Plan::builder()
                .fixed(1)
                .unwrap()
                .dynamic(|line| line.parse().unwrap())
                .build()
                .unwrap()
        };
        let input = "head\n2\na\nb";
        let mut first = input.to_reader();
        let mut second = input.to_reader();
        assert_eq!(
            build().extract(&mut first).unwrap(),
            build().extract(&mut second).unwrap()
        );
    }
}
