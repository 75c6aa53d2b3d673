use super::{Count, MatrixError};

/// Compressed sparse storage shared by CSR and CSC.
///
/// The structure is orientation-agnostic: a "lane" is a row for CSR and a
/// column for CSC. Lane `i` owns `indices[indptr[i]..indptr[i + 1]]` and the
/// matching `data` slice. Indices within a lane are strictly increasing for
/// matrices built by this crate; matrices loaded from disk are only required
/// to be in bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedMatrix {
    major: usize,
    minor: usize,
    indptr: Vec<usize>,
    indices: Vec<usize>,
    data: Vec<Count>,
}

impl CompressedMatrix {
    /// Empty matrix with `major` lanes of length `minor`.
    pub fn empty(major: usize, minor: usize) -> Self {
        Self {
            major,
            minor,
            indptr: vec![0; major + 1],
            indices: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Assemble from raw arrays, validating the compressed structure.
    pub fn from_parts(
        major: usize,
        minor: usize,
        indptr: Vec<usize>,
        indices: Vec<usize>,
        data: Vec<Count>,
    ) -> Result<Self, MatrixError> {
        if indptr.len().checked_sub(1) != Some(major) {
            return Err(MatrixError::InvalidStructure(format!(
                "indptr has {} entries for {major} lanes",
                indptr.len()
            )));
        }
        if indices.len() != data.len() {
            return Err(MatrixError::InvalidStructure(format!(
                "{} indices but {} values",
                indices.len(),
                data.len()
            )));
        }
        if indptr[0] != 0 || indptr[major] != data.len() {
            return Err(MatrixError::InvalidStructure(format!(
                "indptr must span 0..{}, got {}..{}",
                data.len(),
                indptr[0],
                indptr[major]
            )));
        }
        if indptr.windows(2).any(|w| w[0] > w[1]) {
            return Err(MatrixError::InvalidStructure(
                "indptr is not monotonically non-decreasing".to_string(),
            ));
        }
        if let Some(&bad) = indices.iter().find(|&&i| i >= minor) {
            return Err(MatrixError::InvalidStructure(format!(
                "index {bad} out of bounds for lane length {minor}"
            )));
        }
        Ok(Self {
            major,
            minor,
            indptr,
            indices,
            data,
        })
    }

    /// Wrap lanes built by this crate, already sorted and in bounds.
    pub(super) fn from_lanes(
        major: usize,
        minor: usize,
        indptr: Vec<usize>,
        indices: Vec<usize>,
        data: Vec<Count>,
    ) -> Self {
        Self {
            major,
            minor,
            indptr,
            indices,
            data,
        }
    }

    /// Build from coordinate triplets, summing repeated coordinates.
    ///
    /// Callers guarantee that every coordinate is in bounds.
    pub(super) fn from_sorted_lanes(
        major: usize,
        minor: usize,
        majors: &[usize],
        minors: &[usize],
        values: &[Count],
    ) -> Result<Self, MatrixError> {
        let mut counts = vec![0usize; major + 1];
        for &m in majors {
            counts[m + 1] += 1;
        }
        for i in 0..major {
            counts[i + 1] += counts[i];
        }

        // Scatter into lanes, preserving input order within a lane.
        let mut cursor = counts.clone();
        let mut lane_minor = vec![0usize; values.len()];
        let mut lane_value: Vec<Count> = vec![0; values.len()];
        for ((&m, &n), &v) in majors.iter().zip(minors).zip(values) {
            let slot = cursor[m];
            lane_minor[slot] = n;
            lane_value[slot] = v;
            cursor[m] += 1;
        }

        let mut indptr = Vec::with_capacity(major + 1);
        let mut indices = Vec::with_capacity(values.len());
        let mut data: Vec<Count> = Vec::with_capacity(values.len());
        indptr.push(0);

        let mut lane: Vec<(usize, Count)> = Vec::new();
        for i in 0..major {
            lane.clear();
            lane.extend(
                lane_minor[counts[i]..counts[i + 1]]
                    .iter()
                    .copied()
                    .zip(lane_value[counts[i]..counts[i + 1]].iter().copied()),
            );
            lane.sort_by_key(|&(n, _)| n);

            for &(n, v) in &lane {
                match indices.last() {
                    Some(&last) if last == n && data.len() > indptr[i] => {
                        if let Some(acc) = data.last_mut() {
                            *acc = acc.checked_add(v).ok_or(MatrixError::CountOverflow {
                                major: i,
                                minor: n,
                            })?;
                        }
                    }
                    _ => {
                        indices.push(n);
                        data.push(v);
                    }
                }
            }
            indptr.push(data.len());
        }

        Ok(Self {
            major,
            minor,
            indptr,
            indices,
            data,
        })
    }

    /// Number of lanes.
    pub fn major_len(&self) -> usize {
        self.major
    }

    /// Length of each lane.
    pub fn minor_len(&self) -> usize {
        self.minor
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    /// Lane pointer array (`major_len() + 1` entries).
    pub fn indptr(&self) -> &[usize] {
        &self.indptr
    }

    /// Minor index of every stored entry.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Stored values.
    pub fn data(&self) -> &[Count] {
        &self.data
    }

    /// Indices and values of lane `i`.
    pub fn lane(&self, i: usize) -> (&[usize], &[Count]) {
        let range = self.indptr[i]..self.indptr[i + 1];
        (&self.indices[range.clone()], &self.data[range])
    }

    /// Value at `(major, minor)`, zero when not stored.
    pub fn get(&self, major: usize, minor: usize) -> Count {
        let (indices, data) = self.lane(major);
        indices
            .iter()
            .zip(data)
            .filter(|(&j, _)| j == minor)
            .map(|(_, &v)| v)
            .sum()
    }

    /// Keep the lanes in `index`, in that order. Duplicates are allowed.
    pub fn select_major(&self, index: &[usize]) -> Self {
        let mut indptr = Vec::with_capacity(index.len() + 1);
        let mut indices = Vec::new();
        let mut data = Vec::new();
        indptr.push(0);
        for &i in index {
            let (lane_indices, lane_data) = self.lane(i);
            indices.extend_from_slice(lane_indices);
            data.extend_from_slice(lane_data);
            indptr.push(data.len());
        }
        Self {
            major: index.len(),
            minor: self.minor,
            indptr,
            indices,
            data,
        }
    }

    /// Keep the minor positions in `index`, in that order. Duplicates are
    /// allowed; each copy becomes its own position.
    pub fn select_minor(&self, index: &[usize]) -> Self {
        let mut targets: Vec<Vec<usize>> = vec![Vec::new(); self.minor];
        for (new_pos, &old) in index.iter().enumerate() {
            targets[old].push(new_pos);
        }

        let mut indptr = Vec::with_capacity(self.major + 1);
        let mut indices = Vec::new();
        let mut data = Vec::new();
        let mut lane: Vec<(usize, Count)> = Vec::new();
        indptr.push(0);
        for i in 0..self.major {
            lane.clear();
            let (lane_indices, lane_data) = self.lane(i);
            for (&j, &v) in lane_indices.iter().zip(lane_data) {
                lane.extend(targets[j].iter().map(|&p| (p, v)));
            }
            lane.sort_by_key(|&(p, _)| p);
            for &(p, v) in &lane {
                indices.push(p);
                data.push(v);
            }
            indptr.push(data.len());
        }
        Self {
            major: self.major,
            minor: index.len(),
            indptr,
            indices,
            data,
        }
    }

    /// Same matrix with lanes and positions swapped (CSR <-> CSC storage).
    pub fn transposed(&self) -> Self {
        let mut counts = vec![0usize; self.minor + 1];
        for &j in &self.indices {
            counts[j + 1] += 1;
        }
        for j in 0..self.minor {
            counts[j + 1] += counts[j];
        }

        let mut cursor = counts.clone();
        let mut indices = vec![0usize; self.nnz()];
        let mut data: Vec<Count> = vec![0; self.nnz()];
        for i in 0..self.major {
            let (lane_indices, lane_data) = self.lane(i);
            for (&j, &v) in lane_indices.iter().zip(lane_data) {
                let slot = cursor[j];
                indices[slot] = i;
                data[slot] = v;
                cursor[j] += 1;
            }
        }

        Self {
            major: self.minor,
            minor: self.major,
            indptr: counts,
            indices,
            data,
        }
    }

    /// Sum of each lane.
    pub fn major_sums(&self) -> Result<Vec<Count>, MatrixError> {
        (0..self.major)
            .map(|i| {
                self.lane(i)
                    .1
                    .iter()
                    .try_fold(0 as Count, |acc, &v| acc.checked_add(v))
                    .ok_or(MatrixError::SumOverflow { lane: i })
            })
            .collect()
    }

    /// Sum over lanes at each minor position.
    pub fn minor_sums(&self) -> Result<Vec<Count>, MatrixError> {
        let mut sums: Vec<Count> = vec![0; self.minor];
        for (&j, &v) in self.indices.iter().zip(&self.data) {
            sums[j] = sums[j]
                .checked_add(v)
                .ok_or(MatrixError::SumOverflow { lane: j })?;
        }
        Ok(sums)
    }

    /// Non-zero entries per lane.
    pub fn major_nnz(&self) -> Vec<usize> {
        (0..self.major)
            .map(|i| self.lane(i).1.iter().filter(|&&v| v != 0).count())
            .collect()
    }

    /// Non-zero entries per minor position.
    pub fn minor_nnz(&self) -> Vec<usize> {
        let mut counts = vec![0; self.minor];
        for (&j, &v) in self.indices.iter().zip(&self.data) {
            if v != 0 {
                counts[j] += 1;
            }
        }
        counts
    }

    /// Lane-major dense copy (`major` vectors of length `minor`).
    pub fn to_dense_lanes(&self) -> Vec<Count> {
        let mut dense = vec![0; self.major * self.minor];
        for i in 0..self.major {
            let (lane_indices, lane_data) = self.lane(i);
            for (&j, &v) in lane_indices.iter().zip(lane_data) {
                dense[i * self.minor + j] += v;
            }
        }
        dense
    }
}
