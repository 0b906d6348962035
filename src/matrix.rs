/// Square grid of pairwise measurements, row-major. Row is the "from" core,
/// column the paired core. The diagonal is never measured and stays `0.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultMatrix {
    size: usize,
    cells: Vec<f64>,
}

impl ResultMatrix {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![0.0; size * size],
        }
    }

    /// Visits every ordered pair `(i, j)` with `i != j` in row-major order,
    /// one probe at a time, and stores what `probe` returns.
    pub fn measure<F>(size: usize, mut probe: F) -> Self
    where
        F: FnMut(usize, usize) -> f64,
    {
        let mut matrix = Self::new(size);
        for from in 0..size {
            for to in 0..size {
                if from != to {
                    matrix.set(from, to, probe(from, to));
                }
            }
        }
        matrix
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.cells[from * self.size + to]
    }

    pub fn set(&mut self, from: usize, to: usize, value: f64) {
        self.cells[from * self.size + to] = value;
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        // `max(1)` keeps `chunks` happy for the empty matrix.
        self.cells.chunks(self.size.max(1))
    }
}
