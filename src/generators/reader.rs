use std::fs::File;
use std::io::{BufRead, BufReader};
use std::marker::PhantomData;
use std::path::Path;

use crate::error::{MpmError, MpmResult};
use crate::math::{Real, Vector};

/// Source of particle coordinates.
pub trait PointReader<const D: usize>: Send + Sync {
    fn read_points(&self, source: &mut dyn BufRead) -> MpmResult<Vec<Vector<D>>>;

    fn read_file(&self, path: &Path) -> MpmResult<Vec<Vector<D>>> {
        let mut source = BufReader::new(File::open(path)?);
        self.read_points(&mut source)
    }
}

/// Whitespace-separated text, one point of exactly `D` coordinates per
/// line. Blank lines and lines starting with `#` are skipped.
#[derive(Clone, Copy, Debug, Default)]
pub struct AsciiPointReader<const D: usize> {
    _dimension: PhantomData<[Real; D]>,
}

impl<const D: usize> AsciiPointReader<D> {
    pub fn new() -> Self {
        Self {
            _dimension: PhantomData,
        }
    }

    fn parse_line(line_number: usize, line: &str) -> MpmResult<Vector<D>> {
        let values = line
            .split_whitespace()
            .map(|token| {
                token.parse::<Real>().map_err(|e| MpmError::Parse {
                    line: line_number,
                    message: format!("`{token}`: {e}"),
                })
            })
            .collect::<MpmResult<Vec<_>>>()?;
        if values.len() != D {
            return Err(MpmError::Parse {
                line: line_number,
                message: format!("expected {D} coordinates, found {}", values.len()),
            });
        }
        Ok(Vector::<D>::from_column_slice(&values))
    }
}

impl<const D: usize> PointReader<D> for AsciiPointReader<D> {
    fn read_points(&self, source: &mut dyn BufRead) -> MpmResult<Vec<Vector<D>>> {
        let mut points = Vec::new();
        for (index, line) in source.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            points.push(Self::parse_line(index + 1, line)?);
        }
        Ok(points)
    }
}
