//! Input line tokenization.
//!
//! Splits one raw input line into ordered command segments at the job
//! separators: `&` marks the preceding segment as a background job, `;` as
//! a sequential (wait-before-continuing) one. A trailing segment with no
//! separator is sequential. Empty or whitespace-only segments yield no job.
//!
//! Argument splitting is plain whitespace — no quoting, no escapes, no
//! globbing.

/// One command segment of an input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// The segment's source text, trimmed.
    pub text: String,
    /// True when the segment was terminated by `&`.
    pub background: bool,
}

/// Split a line into command segments in input order.
pub fn split_segments(line: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut rest = line;

    loop {
        match rest.find(['&', ';']) {
            Some(at) => {
                let background = rest.as_bytes()[at] == b'&';
                push_segment(&mut segments, &rest[..at], background);
                rest = &rest[at + 1..];
            }
            None => {
                push_segment(&mut segments, rest, false);
                break;
            }
        }
    }

    segments
}

fn push_segment(segments: &mut Vec<Segment>, text: &str, background: bool) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        segments.push(Segment {
            text: trimmed.to_string(),
            background,
        });
    }
}

/// Split a segment into its argument vector on whitespace.
pub fn split_args(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn seg(text: &str, background: bool) -> Segment {
        Segment {
            text: text.to_string(),
            background,
        }
    }

    #[rstest]
    #[case("ls", vec![seg("ls", false)])]
    #[case("sleep 5 &", vec![seg("sleep 5", true)])]
    #[case("a ; b", vec![seg("a", false), seg("b", false)])]
    #[case("a & b", vec![seg("a", true), seg("b", false)])]
    #[case("a & b ; c", vec![seg("a", true), seg("b", false), seg("c", false)])]
    #[case("a;b&", vec![seg("a", false), seg("b", true)])]
    fn separator_kinds(#[case] line: &str, #[case] expected: Vec<Segment>) {
        assert_eq!(split_segments(line), expected);
    }

    #[rstest]
    #[case("")]
    #[case("   \t ")]
    #[case(" ; ; ")]
    #[case(" & ")]
    fn blank_input_yields_no_segments(#[case] line: &str) {
        assert!(split_segments(line).is_empty());
    }

    #[test]
    fn empty_segments_between_separators_are_dropped() {
        let segments = split_segments("a ;; b &  & c");
        assert_eq!(
            segments,
            vec![seg("a", false), seg("b", true), seg("c", false)]
        );
    }

    #[test]
    fn args_split_on_runs_of_whitespace() {
        assert_eq!(
            split_args("  sleep   10\t&x"),
            vec!["sleep".to_string(), "10".to_string(), "&x".to_string()]
        );
        assert!(split_args("   ").is_empty());
    }
}
