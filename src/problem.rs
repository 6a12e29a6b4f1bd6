//! Batch problem files and result files.
//!
//! A problem file starts with the four move limits `L R U D`, then the number of problems,
//! then one `width,height,pattern` record per line. Result files hold one move string per
//! problem line; an empty line means the problem was skipped or not solved.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::board::Arrangement;
use crate::error::ProblemError;
use crate::moves::MoveCounts;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub arrangement: Arrangement,
}

#[derive(Debug, Clone)]
pub struct ProblemSet {
    /// Move budget per direction, for reporting.
    pub limits: MoveCounts,
    pub problems: Vec<Problem>,
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ProblemError + '_ {
    move |source| ProblemError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl ProblemSet {
    pub fn load(path: &Path) -> Result<Self, ProblemError> {
        let text = fs::read_to_string(path).map_err(io_error(path))?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ProblemError> {
        let mut lines = text.lines().enumerate().map(|(i, line)| (i + 1, line.trim()));

        let (line, header) = lines.next().ok_or_else(|| ProblemError::Header {
            line: 1,
            reason: "file is empty".to_string(),
        })?;
        let limits: Vec<usize> = header
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<_, _>>()
            .map_err(|err| ProblemError::Header {
                line,
                reason: format!("move limits: {err}"),
            })?;
        let [left, right, up, down] = limits[..] else {
            return Err(ProblemError::Header {
                line,
                reason: format!("expected 4 move limits, found {}", limits.len()),
            });
        };

        let (line, count) = lines.next().ok_or_else(|| ProblemError::Header {
            line: 2,
            reason: "missing problem count".to_string(),
        })?;
        let count: usize = count.parse().map_err(|err| ProblemError::Header {
            line,
            reason: format!("problem count: {err}"),
        })?;

        let problems = lines
            .filter(|(_, record)| !record.is_empty())
            .take(count)
            .map(|(line, record)| parse_record(line, record))
            .collect::<Result<Vec<_>, _>>()?;
        if problems.len() < count {
            return Err(ProblemError::Header {
                line: 2,
                reason: format!("expected {count} problems, found {}", problems.len()),
            });
        }

        Ok(Self {
            limits: MoveCounts {
                left,
                right,
                up,
                down,
            },
            problems,
        })
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }
}

fn parse_record(line: usize, record: &str) -> Result<Problem, ProblemError> {
    let fields: Vec<&str> = record.split(',').map(str::trim).collect();
    let [width, height, pattern] = fields[..] else {
        return Err(ProblemError::Record {
            line,
            reason: format!("expected width,height,pattern, found {record:?}"),
        });
    };
    let dimension = |field: &str, name: &str| {
        field.parse::<usize>().map_err(|err| ProblemError::Record {
            line,
            reason: format!("{name} {field:?}: {err}"),
        })
    };
    let width = dimension(width, "width")?;
    let height = dimension(height, "height")?;
    let arrangement = Arrangement::parse(width, height, pattern)
        .map_err(|source| ProblemError::Arrangement { line, source })?;
    Ok(Problem { arrangement })
}

/// Results from an earlier run, used to skip problems that already have an answer.
#[derive(Debug, Clone, Default)]
pub struct ReferenceSet {
    lines: Vec<String>,
}

impl ReferenceSet {
    pub fn load(path: &Path) -> Result<Self, ProblemError> {
        let text = fs::read_to_string(path).map_err(io_error(path))?;
        Ok(Self::parse(&text))
    }

    pub fn parse(text: &str) -> Self {
        Self {
            lines: text.lines().map(|l| l.trim().to_string()).collect(),
        }
    }

    pub fn answer(&self, index: usize) -> Option<&str> {
        self.lines
            .get(index)
            .map(String::as_str)
            .filter(|line| !line.is_empty())
    }

    pub fn is_solved(&self, index: usize) -> bool {
        self.answer(index).is_some()
    }
}

/// Appends one line per problem, reopening the file each time so partial runs keep their
/// output.
#[derive(Debug, Clone)]
pub struct ResultFile {
    path: PathBuf,
}

impl ResultFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `result_<stem>_<start>_<end>.txt` next to the working directory.
    pub fn default_name(problem_file: &Path, start: usize, end: usize) -> PathBuf {
        let stem = problem_file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "problems".to_string());
        PathBuf::from(format!("result_{stem}_{start}_{end}.txt"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, line: &str) -> Result<(), ProblemError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_error(&self.path))?;
        writeln!(file, "{line}").map_err(io_error(&self.path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;

    const SAMPLE: &str = "72187 81749 72303 81778\n3\n3,2,120453\n3,3,8=6105342\n2,2,1023\n";

    #[test]
    fn parses_header_and_records() {
        let set = ProblemSet::parse(SAMPLE).unwrap();
        assert_eq!(
            set.limits,
            MoveCounts {
                left: 72187,
                right: 81749,
                up: 72303,
                down: 81778
            }
        );
        assert_eq!(set.len(), 3);
        assert_eq!(set.problems[1].arrangement.width(), 3);
        assert_eq!(set.problems[1].arrangement.to_pattern(), "8=6105342");
        assert_eq!(set.problems[2].arrangement.blank(), 1);
    }

    #[test]
    fn rejects_short_header() {
        let err = ProblemSet::parse("1 2 3\n1\n3,2,120453\n").unwrap_err();
        assert!(matches!(err, ProblemError::Header { line: 1, .. }));
    }

    #[test]
    fn rejects_missing_records() {
        let err = ProblemSet::parse("1 2 3 4\n2\n3,2,120453\n").unwrap_err();
        assert!(matches!(err, ProblemError::Header { line: 2, .. }));
    }

    #[test]
    fn reports_bad_records_with_line() {
        let err = ProblemSet::parse("1 2 3 4\n1\n3;2;120453\n").unwrap_err();
        assert!(matches!(err, ProblemError::Record { line: 3, .. }));

        let err = ProblemSet::parse("1 2 3 4\n1\n3,2,12045\n").unwrap_err();
        assert!(matches!(
            err,
            ProblemError::Arrangement {
                line: 3,
                source: ParseError::WrongLength { .. }
            }
        ));
    }

    #[test]
    fn huge_dimensions_are_a_record_error() {
        let err = ProblemSet::parse("1 1 1 1\n1\n18446744073709551615,2,0\n").unwrap_err();
        assert!(matches!(
            err,
            ProblemError::Arrangement {
                line: 3,
                source: ParseError::TooManyCells { height: 2, .. }
            }
        ));
    }

    #[test]
    fn reference_marks_non_empty_lines() {
        let refs = ReferenceSet::parse("LURD\n\nRR\n");
        assert!(refs.is_solved(0));
        assert!(!refs.is_solved(1));
        assert_eq!(refs.answer(2), Some("RR"));
        assert!(!refs.is_solved(7));
    }

    #[test]
    fn default_result_name_uses_stem_and_range() {
        let name = ResultFile::default_name(Path::new("data/problems.txt"), 0, 99);
        assert_eq!(name, PathBuf::from("result_problems_0_99.txt"));
    }

    #[test]
    fn result_file_appends_lines() {
        let path = std::env::temp_dir()
            .join(format!("slide-meet-results-{}.txt", std::process::id()));
        let _ = fs::remove_file(&path);
        let results = ResultFile::new(&path);
        results.append("LRUD").unwrap();
        results.append("").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "LRUD\n\n");
        fs::remove_file(&path).unwrap();
    }
}
