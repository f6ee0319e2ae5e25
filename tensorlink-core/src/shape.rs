use std::fmt;

/// Ordered dimension sizes of a tensor. Rank 0 is a scalar.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Shape(Vec<usize>);

impl Shape {
    pub fn new(dims: Vec<usize>) -> Self {
        Shape(dims)
    }

    /// The 0-dimensional shape.
    pub fn scalar() -> Self {
        Shape(Vec::new())
    }

    pub fn rank(&self) -> usize {
        self.0.len()
    }

    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    /// Total logical element count. The empty product is 1, so a scalar
    /// holds one element; any zero-sized dimension makes the count 0.
    pub fn numel(&self) -> usize {
        self.0.iter().product()
    }

    /// Compute default (contiguous, row-major) strides for this shape.
    pub fn contiguous_strides(&self) -> Strides {
        let mut strides = Vec::with_capacity(self.0.len());
        let mut acc = 1;
        // Iterate dims in reverse to accumulate products
        for dim in self.0.iter().rev() {
            strides.push(acc);
            acc *= *dim;
        }
        strides.reverse();
        Strides(strides)
    }

    /// Broadcast this shape with another, aligning trailing dimensions.
    /// Each aligned pair must be equal or one of the two must be 1.
    /// Returns `None` when the shapes are incompatible.
    pub fn broadcast_with(&self, other: &Shape) -> Option<Shape> {
        let rank = self.rank().max(other.rank());
        let mut out = vec![0usize; rank];
        for i in 0..rank {
            let l = dim_from_right(&self.0, rank - 1 - i);
            let r = dim_from_right(&other.0, rank - 1 - i);
            out[i] = if l == r || r == 1 {
                l
            } else if l == 1 {
                r
            } else {
                return None;
            };
        }
        Some(Shape(out))
    }
}

/// Dimension at distance `from_right` from the trailing axis, padding with 1
/// beyond the leading axis.
fn dim_from_right(dims: &[usize], from_right: usize) -> usize {
    if from_right < dims.len() {
        dims[dims.len() - 1 - from_right]
    } else {
        1
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shape({:?})", self.0)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{d}")?;
        }
        write!(f, "]")
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Shape(dims)
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Shape(dims.to_vec())
    }
}

/// Per-dimension step sizes. Always the same rank as the shape it travels
/// with. A stride of 0 repeats the same elements along that axis, which is
/// how broadcast operands are walked.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Strides(Vec<usize>);

impl Strides {
    pub fn new(strides: Vec<usize>) -> Self {
        Strides(strides)
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Flat offset of a multi-dimensional index.
    pub fn flat_offset(&self, index: &[usize]) -> usize {
        debug_assert_eq!(self.0.len(), index.len());
        self.0.iter().zip(index.iter()).map(|(s, i)| s * i).sum()
    }
}

impl From<Vec<usize>> for Strides {
    fn from(strides: Vec<usize>) -> Self {
        Strides(strides)
    }
}

/// Strides for walking an operand of shape `operand` over the broadcast
/// result shape `target`: missing leading axes and size-1 expanded axes get
/// stride 0, all others keep the operand's stride.
pub(crate) fn broadcast_strides(
    operand: &Shape,
    operand_strides: &Strides,
    target: &Shape,
) -> Strides {
    let rank = target.rank();
    let mut out = vec![0usize; rank];
    let lead = rank - operand.rank();
    for i in lead..rank {
        let od = operand.dims()[i - lead];
        let td = target.dims()[i];
        out[i] = if od == td {
            operand_strides.as_slice()[i - lead]
        } else {
            // od == 1, expanded axis
            0
        };
    }
    Strides(out)
}

/// Advance a row-major odometer over `dims`. Returns false once the index
/// wraps past the last position.
pub(crate) fn next_index(index: &mut [usize], dims: &[usize]) -> bool {
    for axis in (0..dims.len()).rev() {
        index[axis] += 1;
        if index[axis] < dims[axis] {
            return true;
        }
        index[axis] = 0;
    }
    false
}
