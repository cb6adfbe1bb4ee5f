//! Labelled raster containers
//!
//! `SpectralRaster` holds one acquisition period as a 4-D array indexed by
//! `(band, y, x, time)`. `IndexRaster` holds a 2-D spectral index over
//! `(y, x)`. Both carry their spatial coordinates so that rasters covering
//! different extents can be combined on their common footprint.

use std::collections::HashMap;

use ndarray::{s, Array2, Array4, ArrayView3, Axis, Zip};
use rayon::prelude::*;

use crate::error::{Error, Result};

/// Multispectral data for a single period, indexed `(band, y, x, time)`
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralRaster {
    data: Array4<f64>,
    bands: Vec<String>,
    y: Vec<f64>,
    x: Vec<f64>,
    times: Vec<String>,
}

impl SpectralRaster {
    pub fn new(
        data: Array4<f64>,
        bands: Vec<String>,
        y: Vec<f64>,
        x: Vec<f64>,
        times: Vec<String>,
    ) -> Result<Self> {
        let (n_bands, rows, cols, n_times) = data.dim();
        check_len("band", bands.len(), n_bands)?;
        check_len("y", y.len(), rows)?;
        check_len("x", x.len(), cols)?;
        check_len("time", times.len(), n_times)?;

        Ok(Self {
            data,
            bands,
            y,
            x,
            times,
        })
    }

    /// Build a raster whose coordinates are the pixel row/column numbers and
    /// whose acquisitions are labelled `t0`, `t1`, ...
    pub fn with_pixel_coords(data: Array4<f64>, bands: Vec<String>) -> Result<Self> {
        let (_, rows, cols, n_times) = data.dim();
        let y = (0..rows).map(|r| r as f64).collect();
        let x = (0..cols).map(|c| c as f64).collect();
        let times = (0..n_times).map(|t| format!("t{t}")).collect();
        Self::new(data, bands, y, x, times)
    }

    pub fn data(&self) -> &Array4<f64> {
        &self.data
    }

    pub fn bands(&self) -> &[String] {
        &self.bands
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn times(&self) -> &[String] {
        &self.times
    }

    /// `(bands, rows, cols, times)`
    pub fn dim(&self) -> (usize, usize, usize, usize) {
        self.data.dim()
    }

    /// Select one band by identifier, yielding a `(y, x, time)` view.
    pub fn band(&self, id: &str) -> Result<ArrayView3<'_, f64>> {
        let idx = self
            .bands
            .iter()
            .position(|b| b == id)
            .ok_or_else(|| Error::BandNotFound(id.to_string()))?;
        Ok(self.data.index_axis(Axis(0), idx))
    }

    /// Collapse the time axis of one band with a per-pixel median.
    ///
    /// NaN samples are skipped; a pixel with no valid sample is NaN.
    pub fn median_over_time(&self, id: &str) -> Result<IndexRaster> {
        let band = self.band(id)?;
        let (rows, cols, _) = band.dim();

        let mut result_data = vec![0.0f64; rows * cols];
        result_data
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, result)| {
                let series = band.slice(s![i / cols, i % cols, ..]);
                *result = nan_median(series.iter().copied());
            });

        let values = Array2::from_shape_vec((rows, cols), result_data)
            .map_err(|e| Error::InvalidRaster(e.to_string()))?;
        IndexRaster::new(values, self.y.clone(), self.x.clone())
    }
}

/// A single-band index raster over `(y, x)`
#[derive(Debug, Clone, PartialEq)]
pub struct IndexRaster {
    values: Array2<f64>,
    y: Vec<f64>,
    x: Vec<f64>,
}

impl IndexRaster {
    pub fn new(values: Array2<f64>, y: Vec<f64>, x: Vec<f64>) -> Result<Self> {
        let (rows, cols) = values.dim();
        check_len("y", y.len(), rows)?;
        check_len("x", x.len(), cols)?;
        Ok(Self { values, y, x })
    }

    pub fn with_pixel_coords(values: Array2<f64>) -> Self {
        let (rows, cols) = values.dim();
        Self {
            values,
            y: (0..rows).map(|r| r as f64).collect(),
            x: (0..cols).map(|c| c as f64).collect(),
        }
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn into_values(self) -> Array2<f64> {
        self.values
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.values.get((row, col)).copied()
    }

    /// Apply `f` to every pixel, producing a new raster on the same grid.
    pub fn map<F>(&self, f: F) -> IndexRaster
    where
        F: Fn(f64) -> f64 + Sync + Send,
    {
        IndexRaster {
            values: Zip::from(&self.values).par_map_collect(|&v| f(v)),
            y: self.y.clone(),
            x: self.x.clone(),
        }
    }

    /// Combine two rasters pixel by pixel over their common coordinates.
    ///
    /// The operands are first aligned with [`align`]; the result covers only
    /// the overlap and follows this raster's coordinate order.
    pub fn zip_with<F>(&self, other: &IndexRaster, f: F) -> IndexRaster
    where
        F: Fn(f64, f64) -> f64 + Sync + Send,
    {
        let (left, right) = align(self, other);
        let values = Zip::from(&left.values)
            .and(&right.values)
            .par_map_collect(|&a, &b| f(a, b));
        IndexRaster {
            values,
            y: left.y,
            x: left.x,
        }
    }

    fn subset(&self, rows: &[usize], cols: &[usize]) -> IndexRaster {
        IndexRaster {
            values: self.values.select(Axis(0), rows).select(Axis(1), cols),
            y: rows.iter().map(|&r| self.y[r]).collect(),
            x: cols.iter().map(|&c| self.x[c]).collect(),
        }
    }
}

/// Restrict two rasters to the intersection of their coordinates (inner join).
///
/// Coordinates are matched by exact value. The returned pair shares one grid
/// ordered as in `left`; it may be empty when the extents don't overlap.
pub fn align(left: &IndexRaster, right: &IndexRaster) -> (IndexRaster, IndexRaster) {
    if left.y == right.y && left.x == right.x {
        return (left.clone(), right.clone());
    }

    let (left_rows, right_rows) = common_positions(&left.y, &right.y);
    let (left_cols, right_cols) = common_positions(&left.x, &right.x);

    (
        left.subset(&left_rows, &left_cols),
        right.subset(&right_rows, &right_cols),
    )
}

fn common_positions(left: &[f64], right: &[f64]) -> (Vec<usize>, Vec<usize>) {
    let mut lookup: HashMap<u64, usize> = HashMap::with_capacity(right.len());
    for (j, &coord) in right.iter().enumerate() {
        if let Some(key) = coord_key(coord) {
            lookup.entry(key).or_insert(j);
        }
    }

    left.iter()
        .enumerate()
        .filter_map(|(i, &coord)| {
            let j = *lookup.get(&coord_key(coord)?)?;
            Some((i, j))
        })
        .unzip()
}

/// Hash key with `==` semantics: `-0.0` matches `0.0`, NaN matches nothing.
fn coord_key(coord: f64) -> Option<u64> {
    if coord.is_nan() {
        None
    } else if coord == 0.0 {
        Some(0.0f64.to_bits())
    } else {
        Some(coord.to_bits())
    }
}

fn nan_median(samples: impl Iterator<Item = f64>) -> f64 {
    let mut values: Vec<f64> = samples.filter(|v| !v.is_nan()).collect();
    if values.is_empty() {
        return f64::NAN;
    }
    values.sort_by(f64::total_cmp);

    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

fn check_len(axis: &str, labels: usize, extent: usize) -> Result<()> {
    if labels != extent {
        return Err(Error::InvalidRaster(format!(
            "{axis} axis has {extent} elements but {labels} labels"
        )));
    }
    Ok(())
}
