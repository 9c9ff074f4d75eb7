//! Cubical complexes generated by a cube list.
//!
//! [`CubicalComplex::from_cubes`] closes the generators under faces, the way a
//! cell-complex library does when handed a list of maximal cubes. Cell counts
//! and the Euler characteristic are read off the closure.

use hashbrown::HashSet;

use crate::algs::cube::Cube;
use crate::topology::validation::non_maximal_cubes;

/// Face closure of a set of generating cubes.
#[derive(Clone, Debug, Default)]
pub struct CubicalComplex {
    generators: Vec<Cube>,
    cells: HashSet<Cube>,
    by_dimension: Vec<usize>,
}

impl CubicalComplex {
    /// Close `cubes` under faces. Repeated generators are kept once.
    pub fn from_cubes<I>(cubes: I) -> Self
    where
        I: IntoIterator<Item = Cube>,
    {
        let mut generators = Vec::new();
        let mut seen = HashSet::new();
        let mut cells = HashSet::new();
        for cube in cubes {
            if !seen.insert(cube.clone()) {
                continue;
            }
            cells.extend(cube.faces());
            generators.push(cube);
        }
        let mut by_dimension = Vec::new();
        for cell in &cells {
            let d = cell.dimension();
            if by_dimension.len() <= d {
                by_dimension.resize(d + 1, 0);
            }
            by_dimension[d] += 1;
        }
        log::debug!(
            "cubical complex: {} generators, {} cells",
            generators.len(),
            cells.len()
        );
        Self {
            generators,
            cells,
            by_dimension,
        }
    }

    /// Distinct generating cubes in input order.
    #[inline]
    pub fn generators(&self) -> &[Cube] {
        &self.generators
    }

    /// Number of cells of every dimension.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// `counts[d]` is the number of `d`-dimensional cells.
    #[inline]
    pub fn cell_counts_by_dimension(&self) -> &[usize] {
        &self.by_dimension
    }

    /// Number of 0-cells.
    pub fn vertex_count(&self) -> usize {
        self.by_dimension.first().copied().unwrap_or(0)
    }

    /// Top cell dimension, `None` for the empty complex.
    pub fn dimension(&self) -> Option<usize> {
        self.by_dimension.len().checked_sub(1)
    }

    pub fn contains(&self, cube: &Cube) -> bool {
        self.cells.contains(cube)
    }

    /// `true` if both are cells of the complex and `face` is a face of `cell`.
    pub fn is_face(&self, face: &Cube, cell: &Cube) -> bool {
        face.is_face_of(cell) && self.contains(cell) && self.contains(face)
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cube> + '_ {
        self.cells.iter()
    }

    /// Cells of dimension `d`, sorted.
    pub fn cells_of_dimension(&self, d: usize) -> Vec<&Cube> {
        let mut out: Vec<_> = self.cells.iter().filter(|c| c.dimension() == d).collect();
        out.sort_unstable();
        out
    }

    /// Alternating sum of the cell counts.
    pub fn euler_characteristic(&self) -> i64 {
        self.by_dimension
            .iter()
            .enumerate()
            .map(|(d, &c)| {
                let c = i64::try_from(c).unwrap_or(i64::MAX);
                if d % 2 == 0 { c } else { -c }
            })
            .sum()
    }

    /// Maximal cells: generators that are not a proper face of another
    /// generator, in input order.
    pub fn facets(&self) -> Vec<&Cube> {
        let covered: HashSet<&Cube> = non_maximal_cubes(&self.generators).into_iter().collect();
        self.generators
            .iter()
            .filter(|c| !covered.contains(c))
            .collect()
    }
}
