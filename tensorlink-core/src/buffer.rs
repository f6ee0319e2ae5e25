use std::sync::{Arc, RwLock, RwLockReadGuard};

use rand::Rng;
use rand_distr::Uniform;

use crate::{
    shape::{next_index, Strides},
    DType, Error, Result, Shape,
};

/// Contiguous numeric storage with shape/stride metadata.
///
/// A buffer either owns its backing store or is a view over another
/// buffer's store. The store sits behind an `Arc`, so a view keeps its
/// source's storage alive for as long as the view exists, and behind an
/// `RwLock`, so any number of operations may read it concurrently while
/// writes take exclusive access. Views share the writer lock with their
/// source because they share the `Arc`.
#[derive(Debug)]
pub struct TensorBuffer<T: DType> {
    store: Arc<RwLock<Vec<T>>>,
    shape: Shape,
    strides: Strides,
    offset: usize,
    view: bool,
}

impl<T: DType> TensorBuffer<T> {
    /// Allocate a zero-initialized buffer of the given shape.
    pub fn zeros<S: Into<Shape>>(shape: S) -> Result<Self> {
        let shape = shape.into();
        let numel = checked_numel(&shape)?;
        Ok(Self::from_parts(vec![T::ZERO; numel], shape))
    }

    /// Allocate a buffer filled with uniform random values in [0, 1).
    pub fn rand<S: Into<Shape>>(shape: S) -> Result<Self> {
        let shape = shape.into();
        let numel = checked_numel(&shape)?;
        let dist = Uniform::new(0.0f64, 1.0);
        let mut rng = rand::thread_rng();
        let data = (0..numel).map(|_| T::from_f64(rng.sample(dist))).collect();
        Ok(Self::from_parts(data, shape))
    }

    /// Adopt an existing vector as the backing store of a buffer with the
    /// given shape. The vector length must match the shape's element count.
    pub fn from_vec<S: Into<Shape>>(data: Vec<T>, shape: S) -> Result<Self> {
        let shape = shape.into();
        let numel = checked_numel(&shape)?;
        if data.len() != numel {
            return Err(Error::Shape {
                op: "from_vec",
                reason: format!(
                    "expected {numel} elements for shape {shape}, got {}",
                    data.len()
                ),
            });
        }
        Ok(Self::from_parts(data, shape))
    }

    fn from_parts(data: Vec<T>, shape: Shape) -> Self {
        let strides = shape.contiguous_strides();
        TensorBuffer {
            store: Arc::new(RwLock::new(data)),
            shape,
            strides,
            offset: 0,
            view: false,
        }
    }

    /// Construct a non-owning view over this buffer's backing store with
    /// arbitrary shape, strides and starting offset.
    ///
    /// Validation is eager: the maximal flat index the view can address is
    /// checked against the store here, at construction, so an out-of-range
    /// view never exists and can never fail at first read instead.
    pub fn view<S: Into<Shape>>(&self, shape: S, strides: Strides, offset: usize) -> Result<Self> {
        let shape = shape.into();
        if shape.rank() != strides.as_slice().len() {
            return Err(Error::Shape {
                op: "view",
                reason: format!(
                    "rank mismatch: shape {shape} has rank {} but {} strides were given",
                    shape.rank(),
                    strides.as_slice().len()
                ),
            });
        }
        let store_len = self.store.read().unwrap().len();
        if let Some(max) = max_addressed(&shape, &strides, offset)? {
            if max >= store_len {
                return Err(Error::Shape {
                    op: "view",
                    reason: format!(
                        "shape {shape} with strides {:?} and offset {offset} addresses \
                         index {max} outside a store of {store_len} elements",
                        strides.as_slice()
                    ),
                });
            }
        }
        Ok(TensorBuffer {
            store: Arc::clone(&self.store),
            shape,
            strides,
            offset,
            view: true,
        })
    }

    /// Bounds-checked element read.
    pub fn read(&self, index: &[usize]) -> Result<T> {
        let flat = self.flat_index(index)?;
        Ok(self.store.read().unwrap()[flat])
    }

    /// Bounds-checked element write. Takes the store's write lock, so no
    /// other reader or writer can observe the store mid-write.
    pub fn write(&self, index: &[usize], value: T) -> Result<()> {
        let flat = self.flat_index(index)?;
        self.store.write().unwrap()[flat] = value;
        Ok(())
    }

    /// Materialize the buffer's logical contents in row-major order,
    /// following the strides. Contiguous non-view buffers are a plain copy.
    pub fn to_vec(&self) -> Result<Vec<T>> {
        let store = self.store.read().unwrap();
        let numel = self.shape.numel();
        if numel == 0 {
            return Ok(Vec::new());
        }
        if self.is_contiguous() {
            return Ok(store[self.offset..self.offset + numel].to_vec());
        }
        let mut out = Vec::with_capacity(numel);
        let mut index = vec![0usize; self.shape.rank()];
        loop {
            out.push(store[self.offset + self.strides.flat_offset(&index)]);
            if !next_index(&mut index, self.shape.dims()) {
                break;
            }
        }
        Ok(out)
    }

    /// Refcounted alias of this buffer for zero-copy sharing. The backing
    /// store stays valid until the last alias is dropped; the writer lock
    /// is shared among all aliases.
    pub fn share(&self) -> Self {
        TensorBuffer {
            store: Arc::clone(&self.store),
            shape: self.shape.clone(),
            strides: self.strides.clone(),
            offset: self.offset,
            view: self.view,
        }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn strides(&self) -> &Strides {
        &self.strides
    }

    pub fn rank(&self) -> usize {
        self.shape.rank()
    }

    pub fn numel(&self) -> usize {
        self.shape.numel()
    }

    pub fn is_view(&self) -> bool {
        self.view
    }

    pub fn is_contiguous(&self) -> bool {
        self.strides == self.shape.contiguous_strides()
    }

    pub(crate) fn offset(&self) -> usize {
        self.offset
    }

    /// Read access to the raw backing store for kernel gathers.
    pub(crate) fn raw(&self) -> RwLockReadGuard<'_, Vec<T>> {
        self.store.read().unwrap()
    }

    fn flat_index(&self, index: &[usize]) -> Result<usize> {
        if index.len() != self.shape.rank() {
            return Err(Error::Index {
                index: index.to_vec(),
                shape: self.shape.clone(),
            });
        }
        for (i, dim) in index.iter().zip(self.shape.dims()) {
            if i >= dim {
                return Err(Error::Index {
                    index: index.to_vec(),
                    shape: self.shape.clone(),
                });
            }
        }
        Ok(self.offset + self.strides.flat_offset(index))
    }
}

/// Element count of a shape, failing on usize overflow instead of wrapping.
fn checked_numel(shape: &Shape) -> Result<usize> {
    shape
        .dims()
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| Error::alloc_overflow(shape))
}

/// Largest flat index addressed by `shape`/`strides`/`offset`, or `None`
/// when the shape holds no elements and addresses nothing. The span is
/// accumulated with checked arithmetic: a range that overflows usize cannot
/// fit in any store, so it is rejected rather than wrapped.
fn max_addressed(shape: &Shape, strides: &Strides, offset: usize) -> Result<Option<usize>> {
    if shape.numel() == 0 {
        return Ok(None);
    }
    shape
        .dims()
        .iter()
        .zip(strides.as_slice())
        .try_fold(offset, |acc, (d, s)| {
            (d - 1).checked_mul(*s).and_then(|step| acc.checked_add(step))
        })
        .map(Some)
        .ok_or_else(|| Error::Shape {
            op: "view",
            reason: format!(
                "shape {shape} with strides {:?} and offset {offset} addresses \
                 a range that overflows usize",
                strides.as_slice()
            ),
        })
}
