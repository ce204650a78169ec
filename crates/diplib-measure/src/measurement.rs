//! The measurement container
//!
//! A [`Measurement`] is a table with one row per object and one column per
//! feature value. Features can have several values (the `Feret` feature has
//! five), so every feature owns a contiguous range of value columns.
//!
//! Objects and features are declared first, then [`Measurement::forge`]
//! allocates the table. After that values can be read and written, but the
//! layout is fixed.
//!
//! # Examples
//!
//! ```
//! use diplib_core::Units;
//! use diplib_measure::{Measurement, ValueInformation};
//!
//! let mut msr = Measurement::new();
//! msr.set_object_ids(vec![1, 4]).unwrap();
//! msr.add_feature("Size", vec![ValueInformation::new("", Units::pixel().power(2))]).unwrap();
//! msr.forge();
//! msr.value_mut("Size", 4).unwrap()[0] = 12.0;
//! assert_eq!(msr[("Size", 4)], [12.0]);
//! assert_eq!(msr.feature("Size").unwrap().object(1), Some(&[0.0][..]));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::ops::{Add, Index};

use crate::error::{MeasureError, MeasureResult};
use crate::feature::ValueInformation;

/// Where a feature's values live in the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureLayout {
    pub name: String,
    pub start_column: usize,
    pub number_values: usize,
}

/// Values of features for a set of objects.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Measurement {
    features: Vec<FeatureLayout>,
    feature_indices: HashMap<String, usize>,
    values: Vec<ValueInformation>,
    objects: Vec<usize>,
    object_indices: HashMap<usize, usize>,
    /// Row-major, `objects.len()` rows of `values.len()` columns
    data: Vec<f64>,
    forged: bool,
}

impl Measurement {
    pub fn new() -> Self {
        Measurement::default()
    }

    /// Add a feature with the given value columns.
    ///
    /// # Errors
    ///
    /// The measurement must not be forged, the name must be new and there
    /// must be at least one value.
    pub fn add_feature(&mut self, name: &str, values: Vec<ValueInformation>) -> MeasureResult<()> {
        if self.forged {
            return Err(MeasureError::Forged);
        }
        if self.feature_indices.contains_key(name) {
            return Err(MeasureError::FeatureExists(name.to_string()));
        }
        if values.is_empty() {
            return Err(MeasureError::InvalidParameters(format!(
                "feature {} has no values",
                name
            )));
        }
        self.feature_indices.insert(name.to_string(), self.features.len());
        self.features.push(FeatureLayout {
            name: name.to_string(),
            start_column: self.values.len(),
            number_values: values.len(),
        });
        self.values.extend(values);
        Ok(())
    }

    /// Replace the object IDs.
    ///
    /// # Errors
    ///
    /// The measurement must not be forged and IDs must not repeat.
    pub fn set_object_ids(&mut self, ids: Vec<usize>) -> MeasureResult<()> {
        if self.forged {
            return Err(MeasureError::Forged);
        }
        let mut indices = HashMap::with_capacity(ids.len());
        for (index, &id) in ids.iter().enumerate() {
            if indices.insert(id, index).is_some() {
                return Err(MeasureError::InvalidParameters(format!(
                    "object ID {} repeated",
                    id
                )));
            }
        }
        self.objects = ids;
        self.object_indices = indices;
        Ok(())
    }

    /// Append one object ID.
    pub fn add_object_id(&mut self, id: usize) -> MeasureResult<()> {
        if self.forged {
            return Err(MeasureError::Forged);
        }
        if self.object_indices.contains_key(&id) {
            return Err(MeasureError::InvalidParameters(format!(
                "object ID {} repeated",
                id
            )));
        }
        self.object_indices.insert(id, self.objects.len());
        self.objects.push(id);
        Ok(())
    }

    /// Allocate the table, filled with zeros. Does nothing if already
    /// forged.
    pub fn forge(&mut self) {
        if !self.forged {
            self.data = vec![0.0; self.objects.len() * self.values.len()];
            self.forged = true;
        }
    }

    pub fn is_forged(&self) -> bool {
        self.forged
    }

    pub fn feature_exists(&self, name: &str) -> bool {
        self.feature_indices.contains_key(name)
    }

    pub fn object_exists(&self, id: usize) -> bool {
        self.object_indices.contains_key(&id)
    }

    pub fn features(&self) -> &[FeatureLayout] {
        &self.features
    }

    /// Information on all value columns, in table order.
    pub fn values(&self) -> &[ValueInformation] {
        &self.values
    }

    /// Object IDs, in row order.
    pub fn objects(&self) -> &[usize] {
        &self.objects
    }

    pub fn number_of_features(&self) -> usize {
        self.features.len()
    }

    pub fn number_of_values(&self) -> usize {
        self.values.len()
    }

    pub fn number_of_objects(&self) -> usize {
        self.objects.len()
    }

    /// The whole table, row-major.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Value columns of feature `name`.
    pub fn feature_values(&self, name: &str) -> MeasureResult<&[ValueInformation]> {
        let layout = self.layout(name)?;
        Ok(&self.values[layout.start_column..layout.start_column + layout.number_values])
    }

    /// All objects' values for feature `name`.
    ///
    /// # Errors
    ///
    /// [`MeasureError::FeatureNotPresent`] for an unknown name,
    /// [`MeasureError::NotForged`] before [`Measurement::forge`].
    pub fn feature(&self, name: &str) -> MeasureResult<FeatureColumn<'_>> {
        if !self.forged {
            return Err(MeasureError::NotForged);
        }
        let layout = self.layout(name)?;
        Ok(FeatureColumn {
            measurement: self,
            name: &layout.name,
            first: layout.start_column,
            count: layout.number_values,
        })
    }

    /// All feature values of object `id`.
    pub fn object(&self, id: usize) -> MeasureResult<ObjectRow<'_>> {
        if !self.forged {
            return Err(MeasureError::NotForged);
        }
        let row = *self
            .object_indices
            .get(&id)
            .ok_or(MeasureError::ObjectNotPresent(id))?;
        Ok(self.object_at(row))
    }

    /// Values of feature `name` for object `id`.
    pub fn value(&self, name: &str, id: usize) -> Option<&[f64]> {
        let (row, layout) = self.cell_position(name, id)?;
        let start = row * self.values.len() + layout.start_column;
        Some(&self.data[start..start + layout.number_values])
    }

    pub fn value_mut(&mut self, name: &str, id: usize) -> Option<&mut [f64]> {
        let (row, layout) = self.cell_position(name, id)?;
        let start = row * self.values.len() + layout.start_column;
        let end = start + layout.number_values;
        Some(&mut self.data[start..end])
    }

    /// Union of the objects and features of `self` and `other`. Cells that
    /// neither input has are NaN; where both have a cell, `self` wins.
    ///
    /// # Errors
    ///
    /// Both inputs must be forged, and features present in both must have
    /// the same number of values.
    pub fn merge(&self, other: &Measurement) -> MeasureResult<Measurement> {
        for m in [self, other] {
            if !m.objects.is_empty() && !m.forged {
                return Err(MeasureError::NotForged);
            }
        }
        let mut out = Measurement::new();
        // output value column -> input value column
        let mut lhs_columns: Vec<Option<usize>> = Vec::new();
        let mut rhs_columns: Vec<Option<usize>> = Vec::new();
        for f in &self.features {
            out.add_feature(&f.name, self.values[range(f)].to_vec())?;
            for ii in 0..f.number_values {
                lhs_columns.push(Some(f.start_column + ii));
                rhs_columns.push(None);
            }
        }
        for f in &other.features {
            match out.feature_indices.get(&f.name) {
                Some(&index) => {
                    let existing = &out.features[index];
                    if existing.number_values != f.number_values {
                        return Err(MeasureError::ValueCountMismatch(f.name.clone()));
                    }
                    for ii in 0..f.number_values {
                        rhs_columns[existing.start_column + ii] = Some(f.start_column + ii);
                    }
                }
                None => {
                    out.add_feature(&f.name, other.values[range(f)].to_vec())?;
                    for ii in 0..f.number_values {
                        lhs_columns.push(None);
                        rhs_columns.push(Some(f.start_column + ii));
                    }
                }
            }
        }

        let mut ids = self.objects.clone();
        ids.extend(other.objects.iter().filter(|id| !self.object_exists(**id)));
        out.set_object_ids(ids)?;
        out.forge();

        let n_out = out.values.len();
        for (row, &id) in out.objects.iter().enumerate() {
            let lhs_row = self.object_indices.get(&id).copied();
            let rhs_row = other.object_indices.get(&id).copied();
            for col in 0..n_out {
                let lhs = lhs_row.zip(lhs_columns[col]).map(|(r, c)| self.cell(r, c));
                let rhs = rhs_row.zip(rhs_columns[col]).map(|(r, c)| other.cell(r, c));
                out.data[row * n_out + col] = lhs.or(rhs).unwrap_or(f64::NAN);
            }
        }
        Ok(out)
    }

    fn layout(&self, name: &str) -> MeasureResult<&FeatureLayout> {
        self.feature_indices
            .get(name)
            .map(|&index| &self.features[index])
            .ok_or_else(|| MeasureError::FeatureNotPresent(name.to_string()))
    }

    fn cell_position(&self, name: &str, id: usize) -> Option<(usize, &FeatureLayout)> {
        if !self.forged {
            return None;
        }
        let row = *self.object_indices.get(&id)?;
        let layout = self.layout(name).ok()?;
        Some((row, layout))
    }

    fn cell(&self, row: usize, column: usize) -> f64 {
        self.data[row * self.values.len() + column]
    }

    /// Row at index `row`, which must be in range.
    pub(crate) fn object_at(&self, row: usize) -> ObjectRow<'_> {
        ObjectRow {
            measurement: self,
            row,
        }
    }

    /// Values of the feature at index `feature` in the row at index `row`.
    pub(crate) fn cell_mut(&mut self, row: usize, feature: usize) -> &mut [f64] {
        let layout = &self.features[feature];
        let start = row * self.values.len() + layout.start_column;
        let end = start + layout.number_values;
        &mut self.data[start..end]
    }
}

fn range(f: &FeatureLayout) -> std::ops::Range<usize> {
    f.start_column..f.start_column + f.number_values
}

impl Add for &Measurement {
    type Output = MeasureResult<Measurement>;

    /// Same as [`Measurement::merge`].
    fn add(self, rhs: &Measurement) -> MeasureResult<Measurement> {
        self.merge(rhs)
    }
}

impl Index<(&str, usize)> for Measurement {
    type Output = [f64];

    /// Values of a feature for an object.
    ///
    /// # Panics
    ///
    /// If the measurement is not forged or has no such feature or object.
    fn index(&self, (name, id): (&str, usize)) -> &[f64] {
        match self.value(name, id) {
            Some(values) => values,
            None => panic!("no values for feature {} of object {}", name, id),
        }
    }
}

/// The values of one feature for all objects.
#[derive(Debug, Clone, Copy)]
pub struct FeatureColumn<'a> {
    measurement: &'a Measurement,
    name: &'a str,
    first: usize,
    count: usize,
}

impl<'a> FeatureColumn<'a> {
    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn number_of_values(&self) -> usize {
        self.count
    }

    pub fn number_of_objects(&self) -> usize {
        self.measurement.objects.len()
    }

    pub fn value_information(&self) -> &'a [ValueInformation] {
        &self.measurement.values[self.first..self.first + self.count]
    }

    /// Values for object `id`.
    pub fn object(&self, id: usize) -> Option<&'a [f64]> {
        let row = *self.measurement.object_indices.get(&id)?;
        Some(self.row(row))
    }

    /// `(object ID, values)` for every object, in row order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &'a [f64])> + 'a {
        let column = *self;
        self.measurement
            .objects
            .iter()
            .enumerate()
            .map(move |(row, &id)| (id, column.row(row)))
    }

    /// The first selected value of every object, in row order. This is what
    /// the column statistics work on.
    pub fn first_values(&self) -> impl Iterator<Item = f64> + 'a {
        self.iter().map(|(_, values)| values[0])
    }

    /// The same column restricted to `count` values starting at value
    /// `first` of the feature.
    pub fn subset(&self, first: usize, count: usize) -> MeasureResult<FeatureColumn<'a>> {
        if count == 0 || first + count > self.count {
            return Err(MeasureError::InvalidParameters(format!(
                "values {}..{} out of range for feature {} with {} values",
                first,
                first + count,
                self.name,
                self.count
            )));
        }
        Ok(FeatureColumn {
            first: self.first + first,
            count,
            ..*self
        })
    }

    fn row(&self, row: usize) -> &'a [f64] {
        let start = row * self.measurement.values.len() + self.first;
        &self.measurement.data[start..start + self.count]
    }
}

/// The values of all features for one object.
#[derive(Debug, Clone, Copy)]
pub struct ObjectRow<'a> {
    measurement: &'a Measurement,
    row: usize,
}

impl<'a> ObjectRow<'a> {
    pub fn object_id(&self) -> usize {
        self.measurement.objects[self.row]
    }

    /// Values of feature `name`, if the measurement has it.
    pub fn feature(&self, name: &str) -> Option<&'a [f64]> {
        let layout = self.measurement.layout(name).ok()?;
        Some(&self.values()[range(layout)])
    }

    /// All values of the object, in column order.
    pub fn values(&self) -> &'a [f64] {
        let n = self.measurement.values.len();
        &self.measurement.data[self.row * n..(self.row + 1) * n]
    }

    /// `(feature name, values)` for every feature.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a [f64])> + 'a {
        let values = self.values();
        self.measurement
            .features
            .iter()
            .map(move |f| (f.name.as_str(), &values[range(f)]))
    }
}

/// Four significant digits, switching to exponent notation for very large
/// and very small magnitudes.
fn format_value(v: f64) -> String {
    if v == 0.0 || !v.is_finite() {
        return format!("{}", v);
    }
    let magnitude = v.abs().log10().floor();
    if (-4.0..4.0).contains(&magnitude) {
        format!("{:.*}", (3.0 - magnitude) as usize, v)
    } else {
        format!("{:.3e}", v)
    }
}

fn separator(f: &mut fmt::Formatter<'_>, id_width: usize, widths: &[usize]) -> fmt::Result {
    write!(f, "{} | ", "-".repeat(id_width))?;
    for &w in widths {
        write!(f, "{} | ", "-".repeat(w))?;
    }
    writeln!(f)
}

impl fmt::Display for Measurement {
    /// A plain-text table: feature names, value names and units as headers,
    /// then one line per object.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.features.is_empty() {
            return writeln!(f, "(raw measurement object)");
        }
        const MIN_WIDTH: usize = 10;
        let max_id = self.objects.iter().copied().max().unwrap_or(0);
        let id_width = max_id.to_string().len();
        let units: Vec<String> = self
            .values
            .iter()
            .map(|v| {
                let u = v.units.to_string();
                if u.is_empty() { u } else { format!("({})", u) }
            })
            .collect();
        let mut widths: Vec<usize> = self
            .values
            .iter()
            .zip(&units)
            .map(|(v, u)| MIN_WIDTH.max(v.name.chars().count()).max(u.chars().count()))
            .collect();
        let mut feature_widths = Vec::with_capacity(self.features.len());
        for feature in &self.features {
            let cols = range(feature);
            let width = widths[cols.clone()].iter().sum::<usize>() + 3 * (feature.number_values - 1);
            let min = feature.name.chars().count();
            if width < min {
                widths[feature.start_column] += min - width;
            }
            feature_widths.push(width.max(min));
        }

        write!(f, "{:id_width$} | ", "")?;
        for (feature, &w) in self.features.iter().zip(&feature_widths) {
            write!(f, "{:>w$} | ", feature.name)?;
        }
        writeln!(f)?;
        separator(f, id_width, &feature_widths)?;
        write!(f, "{:id_width$} | ", "")?;
        for (value, &w) in self.values.iter().zip(&widths) {
            write!(f, "{:>w$} | ", value.name)?;
        }
        writeln!(f)?;
        write!(f, "{:id_width$} | ", "")?;
        for (u, &w) in units.iter().zip(&widths) {
            write!(f, "{:>w$} | ", u)?;
        }
        writeln!(f)?;
        separator(f, id_width, &widths)?;

        if self.forged {
            for (row, id) in self.objects.iter().enumerate() {
                write!(f, "{:>id_width$} | ", id)?;
                for (col, &w) in widths.iter().enumerate() {
                    write!(f, "{:>w$} | ", format_value(self.cell(row, col)))?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diplib_core::Units;

    fn single(units: Units) -> Vec<ValueInformation> {
        vec![ValueInformation::new("", units)]
    }

    fn sample(ids: Vec<usize>, features: &[(&str, usize)], offset: f64) -> Measurement {
        let mut msr = Measurement::new();
        msr.set_object_ids(ids).unwrap();
        for &(name, n) in features {
            let values = (0..n)
                .map(|i| ValueInformation::new(format!("v{}", i), Units::pixel()))
                .collect();
            msr.add_feature(name, values).unwrap();
        }
        msr.forge();
        let n = msr.number_of_values();
        for (i, v) in msr.data.iter_mut().enumerate() {
            *v = offset + (i / n) as f64 * 10.0 + (i % n) as f64;
        }
        msr
    }

    #[test]
    fn test_layout_and_access() {
        let msr = sample(vec![3, 7], &[("A", 1), ("B", 2)], 0.0);
        assert_eq!(msr.number_of_values(), 3);
        assert_eq!(msr.features()[1].start_column, 1);
        assert_eq!(msr.value("B", 7), Some(&[11.0, 12.0][..]));
        assert_eq!(msr[("A", 3)], [0.0]);
        assert!(msr.value("C", 3).is_none());
        assert!(msr.value("A", 4).is_none());

        let column = msr.feature("B").unwrap();
        let rows: Vec<(usize, Vec<f64>)> = column.iter().map(|(id, v)| (id, v.to_vec())).collect();
        assert_eq!(rows, vec![(3, vec![1.0, 2.0]), (7, vec![11.0, 12.0])]);
        let second = column.subset(1, 1).unwrap();
        assert_eq!(second.first_values().collect::<Vec<_>>(), vec![2.0, 12.0]);
        assert!(column.subset(1, 2).is_err());

        let row = msr.object(7).unwrap();
        assert_eq!(row.feature("A"), Some(&[10.0][..]));
        assert_eq!(row.iter().count(), 2);
        assert!(matches!(msr.object(1), Err(MeasureError::ObjectNotPresent(1))));
    }

    #[test]
    fn test_layout_errors() {
        let mut msr = Measurement::new();
        msr.add_feature("A", single(Units::pixel())).unwrap();
        assert!(matches!(
            msr.add_feature("A", single(Units::pixel())),
            Err(MeasureError::FeatureExists(_))
        ));
        assert!(msr.add_feature("B", Vec::new()).is_err());
        assert!(msr.set_object_ids(vec![1, 2, 1]).is_err());
        assert!(matches!(msr.feature("A"), Err(MeasureError::NotForged)));
        msr.forge();
        assert!(matches!(msr.add_object_id(5), Err(MeasureError::Forged)));
        assert!(matches!(msr.feature("Z"), Err(MeasureError::FeatureNotPresent(_))));
    }

    #[test]
    fn test_merge_fills_missing_cells_with_nan() {
        let lhs = sample(vec![1, 2], &[("A", 1), ("B", 2)], 0.0);
        let rhs = sample(vec![2, 3], &[("B", 2), ("C", 1)], 100.0);
        let out = (&lhs + &rhs).unwrap();
        assert_eq!(out.objects(), &[1, 2, 3]);
        assert_eq!(
            out.features().iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
            vec!["A", "B", "C"]
        );
        // object 2 is in both; lhs values win, C comes from rhs
        assert_eq!(out.value("B", 2), Some(&[11.0, 12.0][..]));
        assert_eq!(out.value("C", 2), Some(&[102.0][..]));
        // object 1 only in lhs, object 3 only in rhs
        assert!(out.value("C", 1).unwrap()[0].is_nan());
        assert!(out.value("A", 3).unwrap()[0].is_nan());
        assert_eq!(out.value("B", 3), Some(&[110.0, 111.0][..]));

        let other = sample(vec![1], &[("B", 3)], 0.0);
        assert!(matches!(lhs.merge(&other), Err(MeasureError::ValueCountMismatch(_))));
    }

    #[test]
    fn test_display_table() {
        let mut msr = Measurement::new();
        msr.set_object_ids(vec![1, 12]).unwrap();
        msr.add_feature("Size", single(Units::pixel().power(2))).unwrap();
        msr.forge();
        msr.value_mut("Size", 12).unwrap()[0] = 1513.0;
        let text = msr.to_string();
        let cells: Vec<Vec<String>> = text
            .lines()
            .map(|line| line.split('|').map(|c| c.trim().to_string()).collect())
            .collect();
        assert_eq!(cells.len(), 7);
        assert_eq!(cells[0][1], "Size");
        assert_eq!(cells[3][1], "(px^2)");
        assert!(cells[4][1].chars().all(|c| c == '-'));
        assert_eq!(cells[4][1].len(), 10);
        assert_eq!(&cells[5][..2], ["1", "0"]);
        assert_eq!(&cells[6][..2], ["12", "1513"]);
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(0.27527), "0.2753");
        assert_eq!(format_value(21.96377), "21.96");
        assert_eq!(format_value(1.5e-7), "1.500e-7");
        assert_eq!(format_value(f64::NAN), "NaN");
    }
}
