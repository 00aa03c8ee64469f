//! Posterior summaries of resampling output.
//!
//! The resampling loops never create new parameter values: every resampled
//! vector is a copy of one in the first generation (or, for grid resampling,
//! an index into the grid). Counting how often each original vector was
//! picked therefore gives an empirical posterior mass over the original
//! catalogue. For a 2-D parameter grid those counts can be reshaped into a
//! histogram to locate the densest region.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use ndarray::{s, Array1, ArrayView, ArrayView1, ArrayView2, ArrayView3, Axis, Dimension};
use rand::Rng;

use crate::error::{Ml4ScmError, Result};
use crate::grid_search::gs_resample;

/// Exact-value key of a parameter vector. `-0.0` and `0.0` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParamKey(Vec<u64>);

impl ParamKey {
    /// Key of a vector, or `None` if it holds a NaN (which equals nothing).
    pub fn new(values: ArrayView1<f64>) -> Option<Self> {
        values
            .iter()
            .map(|&v| {
                if v.is_nan() {
                    None
                } else if v == 0.0 {
                    Some(0.0f64.to_bits())
                } else {
                    Some(v.to_bits())
                }
            })
            .collect::<Option<Vec<u64>>>()
            .map(ParamKey)
    }
}

/// Lookup from an original item to its position in the catalogue.
///
/// When the originals contain duplicates, the first position wins.
#[derive(Debug, Clone)]
pub struct Catalogue<K> {
    index: HashMap<K, usize>,
    len: usize,
}

impl<K: Hash + Eq> Catalogue<K> {
    /// Build a catalogue from items in their original order. `None` items
    /// keep their position but can never be looked up.
    pub fn from_keys(keys: impl IntoIterator<Item = Option<K>>) -> Self {
        let mut index = HashMap::new();
        let mut len = 0;
        for (i, key) in keys.into_iter().enumerate() {
            if let Some(key) = key {
                index.entry(key).or_insert(i);
            }
            len += 1;
        }
        Self { index, len }
    }

    pub fn position(&self, key: &K) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// Number of original items, duplicates included.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Add one to the count of every key's original.
    fn tally<I, F>(&self, keys: I, counts: &mut Array1<f64>, describe: F) -> Result<()>
    where
        I: IntoIterator<Item = Option<K>>,
        F: Fn(usize) -> String,
    {
        for (n, key) in keys.into_iter().enumerate() {
            let position = key
                .and_then(|k| self.position(&k))
                .ok_or_else(|| Ml4ScmError::UnknownParameterVector(describe(n)))?;
            counts[position] += 1.0;
        }
        Ok(())
    }
}

/// Catalogue of parameter vectors (rows of `original`).
pub type ParameterCatalogue = Catalogue<ParamKey>;

impl ParameterCatalogue {
    pub fn from_rows(original: ArrayView2<f64>) -> Self {
        Self::from_keys(original.rows().into_iter().map(ParamKey::new))
    }
}

/// Count, for each row of `original`, how many vectors in `history` equal it.
///
/// `history` is either a flat `(vectors x values)` matrix or a layered
/// `(generations x members x values)` array; both give the same counts for
/// the same multiset of vectors.
///
/// # Errors
///
/// * `DimensionMismatch` if `history` is neither 2-D nor 3-D or its vectors
///   differ in length from the originals
/// * `UnknownParameterVector` if a vector has no equal in `original`
pub fn param_count_by_original<D: Dimension>(
    history: ArrayView<f64, D>,
    original: ArrayView2<f64>,
) -> Result<Array1<f64>> {
    let ndim = history.ndim();
    if ndim != 2 && ndim != 3 {
        return Err(Ml4ScmError::DimensionMismatch(format!(
            "parameter history must be 2-D or 3-D, got {}-D",
            ndim
        )));
    }
    let width = history.shape()[ndim - 1];
    if width != original.ncols() {
        return Err(Ml4ScmError::DimensionMismatch(format!(
            "history vectors have {} values, originals have {}",
            width,
            original.ncols()
        )));
    }

    let catalogue = ParameterCatalogue::from_rows(original);
    let mut counts = Array1::zeros(catalogue.len());
    let vectors: Vec<ArrayView1<f64>> = history.lanes(Axis(ndim - 1)).into_iter().collect();
    catalogue.tally(
        vectors.iter().map(|v| ParamKey::new(*v)),
        &mut counts,
        |n| format!("{:?}", vectors[n].to_vec()),
    )?;

    Ok(counts)
}

/// Counts over a layered history where the first generation is the
/// catalogue: every original starts at one and every vector of the later
/// generations adds one to its original.
pub fn param_count(history: ArrayView3<f64>) -> Result<Array1<f64>> {
    if history.len_of(Axis(0)) == 0 {
        return Err(Ml4ScmError::InvalidInput(
            "parameter history is empty".to_string(),
        ));
    }

    let original = history.index_axis(Axis(0), 0);
    let later = history.slice(s![1.., .., ..]);
    let counts = param_count_by_original(later, original)?;
    Ok(counts + 1.0)
}

/// Count, for each entry of `original`, how many indices in `window` equal it.
pub fn index_count_by_original(
    window: ArrayView2<usize>,
    original: ArrayView1<usize>,
) -> Result<Array1<f64>> {
    let catalogue = Catalogue::from_keys(original.iter().map(|&i| Some(i)));
    let mut counts = Array1::zeros(catalogue.len());
    let indices: Vec<usize> = window.iter().copied().collect();
    catalogue.tally(indices.iter().map(|&i| Some(i)), &mut counts, |n| {
        format!("index {}", indices[n])
    })?;
    Ok(counts)
}

/// Counts over a grid-resampling index matrix, with row 0 as the catalogue:
/// every cell starts at one and every later draw adds one to its cell.
pub fn index_count(resampled: ArrayView2<usize>) -> Result<Array1<f64>> {
    if resampled.nrows() == 0 {
        return Err(Ml4ScmError::InvalidInput(
            "resampled index matrix is empty".to_string(),
        ));
    }

    let counts = index_count_by_original(resampled.slice(s![1.., ..]), resampled.row(0))?;
    Ok(counts + 1.0)
}

/// Coordinates of a 2-D parameter grid.
///
/// Cell `i` of a flat count vector sits at row `i / x.len()` and column
/// `i % x.len()`, i.e. `x` varies fastest.
#[derive(Debug, Clone, PartialEq)]
pub struct GridAxes {
    /// Column coordinates
    pub x: Array1<f64>,

    /// Row coordinates
    pub y: Array1<f64>,
}

impl GridAxes {
    pub fn new(x: Array1<f64>, y: Array1<f64>) -> Self {
        Self { x, y }
    }

    /// Axes of a meshgrid: `xx[0, :]` and `yy[:, 0]`.
    pub fn from_meshgrid(xx: ArrayView2<f64>, yy: ArrayView2<f64>) -> Result<Self> {
        if xx.dim() != yy.dim() || xx.is_empty() {
            return Err(Ml4ScmError::DimensionMismatch(format!(
                "meshgrid shapes {:?} and {:?} must match and be non-empty",
                xx.dim(),
                yy.dim()
            )));
        }
        Ok(Self {
            x: xx.row(0).to_owned(),
            y: yy.column(0).to_owned(),
        })
    }

    /// Grid shape as `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.y.len(), self.x.len())
    }
}

fn argmax(values: ArrayView1<f64>) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// Coordinate-wise mode of a count grid, as `(row, column)`.
///
/// The column is the argmax of the per-column maxima and the row the argmax
/// of the per-row maxima, each taken independently. This need not be the
/// cell holding the largest count.
pub fn coordinate_mode(counts: ArrayView1<f64>, shape: (usize, usize)) -> Result<(usize, usize)> {
    let (rows, cols) = shape;
    if rows == 0 || cols == 0 || counts.len() != rows * cols {
        return Err(Ml4ScmError::DimensionMismatch(format!(
            "{} counts cannot form a {}x{} grid",
            counts.len(),
            rows,
            cols
        )));
    }

    let grid = counts
        .to_owned()
        .into_shape((rows, cols))
        .map_err(|e| Ml4ScmError::DimensionMismatch(e.to_string()))?;
    let max_per_col = grid.fold_axis(Axis(0), f64::NEG_INFINITY, |&a, &b| a.max(b));
    let max_per_row = grid.fold_axis(Axis(1), f64::NEG_INFINITY, |&a, &b| a.max(b));

    Ok((argmax(max_per_row.view()), argmax(max_per_col.view())))
}

fn check_step(step_size: usize) -> Result<()> {
    if step_size == 0 {
        return Err(Ml4ScmError::InvalidConfig(
            "step_size must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn mode_coordinates(counts: ArrayView1<f64>, axes: &GridAxes) -> Result<(f64, f64)> {
    let (row, col) = coordinate_mode(counts, axes.shape())?;
    Ok((axes.x[col], axes.y[row]))
}

/// Track the coordinate-wise mode as more resampling trials are included.
///
/// For `s = step, 2*step, ...` up to the number of rows of `resampled`, the
/// counts of rows `[0, s)` (accumulated chunk by chunk against row 0) are
/// summarized into `(x, y)` grid coordinates, keyed by `s`.
pub fn best_params_by_num_samples(
    resampled: ArrayView2<usize>,
    step_size: usize,
    axes: &GridAxes,
) -> Result<BTreeMap<usize, (f64, f64)>> {
    check_step(step_size)?;

    let original = resampled.row(0);
    let mut counts = Array1::zeros(resampled.ncols());
    let mut samples = BTreeMap::new();
    let mut prev = 0;
    for s in (step_size..=resampled.nrows()).step_by(step_size) {
        counts += &index_count_by_original(resampled.slice(s![prev..s, ..]), original)?;
        samples.insert(s, mode_coordinates(counts.view(), axes)?);
        prev = s;
    }

    Ok(samples)
}

/// Like [`best_params_by_num_samples`], but every window is a fresh grid
/// resampling with `s` trials.
pub fn consecutive_resample(
    max_samples: usize,
    step_size: usize,
    grid_weights: ArrayView1<f64>,
    axes: &GridAxes,
    rng: &mut impl Rng,
) -> Result<BTreeMap<usize, (f64, f64)>> {
    check_step(step_size)?;

    let mut samples = BTreeMap::new();
    for s in (step_size..=max_samples).step_by(step_size) {
        let counts = index_count(gs_resample(s, grid_weights, rng)?.view())?;
        samples.insert(s, mode_coordinates(counts.view(), axes)?);
    }

    Ok(samples)
}
