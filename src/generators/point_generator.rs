use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::Mesh;
use crate::error::{MpmError, MpmResult};
use crate::generators::reader::PointReader;
use crate::math::Vector;

/// Produces the initial particle coordinates for a mesh.
pub trait PointGenerator<const D: usize> {
    fn generate_points(&mut self, mesh: &Mesh<D>) -> MpmResult<Vec<Vector<D>>>;
}

/// Coordinates read from a file.
pub struct FilePointGenerator<const D: usize> {
    reader: Box<dyn PointReader<D>>,
    path: PathBuf,
}

impl<const D: usize> FilePointGenerator<D> {
    pub fn new(reader: Box<dyn PointReader<D>>, path: impl Into<PathBuf>) -> Self {
        Self {
            reader,
            path: path.into(),
        }
    }
}

impl<const D: usize> PointGenerator<D> for FilePointGenerator<D> {
    fn generate_points(&mut self, _mesh: &Mesh<D>) -> MpmResult<Vec<Vector<D>>> {
        self.reader.read_file(&self.path)
    }
}

/// Gauss points of every cell, `npoints` per direction.
#[derive(Clone, Copy, Debug)]
pub struct GaussPointGenerator {
    npoints: usize,
}

impl GaussPointGenerator {
    pub fn new(npoints: usize) -> Self {
        Self { npoints }
    }
}

impl<const D: usize> PointGenerator<D> for GaussPointGenerator {
    fn generate_points(&mut self, mesh: &Mesh<D>) -> MpmResult<Vec<Vector<D>>> {
        let mut points = Vec::new();
        for cell in mesh.cells() {
            for (xi, _) in cell.element().quadrature(self.npoints)? {
                points.push(cell.global_coordinates(&xi));
            }
        }
        Ok(points)
    }
}

/// `npoints` uniformly random points in the reference domain of each cell.
#[derive(Clone, Debug)]
pub struct RandomPointGenerator {
    npoints: usize,
    rng: StdRng,
}

impl RandomPointGenerator {
    /// Attempts per requested point before giving up on a cell.
    const MAX_ATTEMPTS: usize = 64;

    pub fn new(npoints: usize, seed: u64) -> Self {
        Self {
            npoints,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<const D: usize> PointGenerator<D> for RandomPointGenerator {
    fn generate_points(&mut self, mesh: &Mesh<D>) -> MpmResult<Vec<Vector<D>>> {
        let mut points = Vec::with_capacity(mesh.ncells() * self.npoints);
        for cell in mesh.cells() {
            let element = cell.element();
            let mut accepted = 0;
            let mut attempts = 0;
            while accepted < self.npoints {
                if attempts == self.npoints * Self::MAX_ATTEMPTS {
                    return Err(MpmError::config(format!(
                        "could not sample points inside cell {}",
                        cell.id()
                    )));
                }
                attempts += 1;
                let xi = Vector::<D>::from_fn(|_, _| self.rng.random_range(-1.0..=1.0));
                if element.is_inside_reference(&xi, 0.0) {
                    points.push(cell.global_coordinates(&xi));
                    accepted += 1;
                }
            }
        }
        Ok(points)
    }
}
