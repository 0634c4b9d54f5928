//! Dense backing storage for the concept graph.
//!
//! Both containers are addressed by slot and grow by capacity doubling.
//! Growth copies every existing entry into the new buffer at the same
//! coordinates, so slot numbers are stable across resizes.

/// Guard added to norms and sums before dividing.
pub const EPSILON: f64 = 1e-10;

// ============================================================================
// Weight matrix
// ============================================================================

/// Square row-major weight matrix; `weight(i, j)` is the edge i → j.
#[derive(Debug, Clone)]
pub struct WeightMatrix {
    capacity: usize,
    data: Vec<f64>,
}

impl WeightMatrix {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            data: vec![0.0; capacity * capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Double the capacity until `slots` fit, copying every row and column.
    pub fn ensure_capacity(&mut self, slots: usize) {
        if slots <= self.capacity {
            return;
        }
        let mut new_capacity = self.capacity;
        while new_capacity < slots {
            new_capacity *= 2;
        }
        let mut data = vec![0.0; new_capacity * new_capacity];
        for row in 0..self.capacity {
            let src = &self.data[row * self.capacity..(row + 1) * self.capacity];
            data[row * new_capacity..row * new_capacity + self.capacity].copy_from_slice(src);
        }
        self.capacity = new_capacity;
        self.data = data;
    }

    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.capacity + to]
    }

    pub fn set(&mut self, from: usize, to: usize, weight: f64) {
        self.data[from * self.capacity + to] = weight;
    }

    /// Outgoing weights of `from`, truncated to the first `len` slots.
    pub fn row(&self, from: usize, len: usize) -> &[f64] {
        let start = from * self.capacity;
        &self.data[start..start + len.min(self.capacity)]
    }
}

// ============================================================================
// Vector bank
// ============================================================================

/// Contiguous storage of fixed-dimension vectors, one row per slot.
#[derive(Debug, Clone)]
pub struct VectorBank {
    dimensions: usize,
    capacity: usize,
    data: Vec<f64>,
}

impl VectorBank {
    pub fn with_capacity(dimensions: usize, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            dimensions,
            capacity,
            data: vec![0.0; dimensions * capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ensure_capacity(&mut self, slots: usize) {
        if slots <= self.capacity {
            return;
        }
        let mut new_capacity = self.capacity;
        while new_capacity < slots {
            new_capacity *= 2;
        }
        // Rows are contiguous, so a prefix copy preserves every slot.
        let mut data = vec![0.0; self.dimensions * new_capacity];
        data[..self.data.len()].copy_from_slice(&self.data);
        self.capacity = new_capacity;
        self.data = data;
    }

    pub fn row(&self, slot: usize) -> &[f64] {
        &self.data[slot * self.dimensions..(slot + 1) * self.dimensions]
    }

    pub fn set_row(&mut self, slot: usize, values: &[f64]) {
        self.data[slot * self.dimensions..(slot + 1) * self.dimensions].copy_from_slice(values);
    }

    /// Cosine similarity of `query` against the first `len` rows.
    pub fn cosine_all(&self, query: &[f64], len: usize) -> Vec<f64> {
        let query_norm = norm(query);
        (0..len.min(self.capacity))
            .map(|slot| {
                let row = self.row(slot);
                dot(query, row) / (query_norm * norm(row) + EPSILON)
            })
            .collect()
    }
}

// ============================================================================
// Helpers
// ============================================================================

pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

pub fn norm(v: &[f64]) -> f64 {
    dot(v, v).sqrt()
}

pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    dot(a, b) / (norm(a) * norm(b) + EPSILON)
}

/// Scale `v` to unit length. Zero vectors are returned unchanged.
pub fn normalized(v: &[f64]) -> Vec<f64> {
    let n = norm(v);
    if n < EPSILON {
        return v.to_vec();
    }
    v.iter().map(|x| x / n).collect()
}
