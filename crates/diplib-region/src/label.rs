//! Connected component labeling
//!
//! Two-pass labeling of binary images of any dimensionality. The first pass
//! records provisional labels and their equivalences in a [`UnionFind`]
//! whose payload is the region size; the second pass writes consecutive
//! final labels, dropping regions outside the requested size range.
//!
//! 2-D images with 8-connectivity use the block-free decision tree of
//! Grana et al. (2016), which reads at most four previously scanned
//! neighbours per pixel. Everything else uses a generic scan over the
//! backward half of the neighbourhood.

use diplib_core::{BoundaryCondition, Error, Image};
use log::debug;

use crate::error::{RegionError, RegionResult};
use crate::union_find::{LabelType, UnionFind};

type SizeMerge = fn(&usize, &usize) -> usize;
type RegionSizes = UnionFind<usize, SizeMerge>;

fn add_sizes(a: &usize, b: &usize) -> usize {
    a + b
}

/// Options for [`label`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LabelOptions {
    /// Maximum number of coordinates in which two neighbours may differ;
    /// 0 means the image dimensionality (full connectivity)
    pub connectivity: usize,
    /// Regions smaller than this are removed; 0 keeps all
    pub min_size: usize,
    /// Regions larger than this are removed; 0 keeps all
    pub max_size: usize,
    /// One entry, or one per dimension. Only [`BoundaryCondition::Periodic`]
    /// and [`BoundaryCondition::Remove`] change the result.
    pub boundary_condition: Vec<BoundaryCondition>,
}

impl LabelOptions {
    pub fn with_connectivity(mut self, connectivity: usize) -> Self {
        self.connectivity = connectivity;
        self
    }

    pub fn with_min_size(mut self, min_size: usize) -> Self {
        self.min_size = min_size;
        self
    }

    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn with_boundary_condition(mut self, boundary_condition: Vec<BoundaryCondition>) -> Self {
        self.boundary_condition = boundary_condition;
        self
    }

    fn keeps(&self, size: usize) -> bool {
        size >= self.min_size && (self.max_size == 0 || size <= self.max_size)
    }
}

pub(crate) fn require_scalar(image: &Image) -> RegionResult<()> {
    if !image.is_forged() {
        return Err(Error::ImageNotForged.into());
    }
    if !image.is_scalar() {
        return Err(Error::ImageNotScalar.into());
    }
    Ok(())
}

/// Label the connected components of a binary image.
///
/// Returns the `UInt32` label image, with the pixel size of the input, and
/// the number of labels. Labels are numbered from 1 in the order in which
/// their first pixel is met in linear index order.
///
/// # Errors
///
/// The input must be forged, scalar and binary, and the connectivity must
/// not exceed the dimensionality. The boundary condition list must have
/// one element or one per dimension.
///
/// # Examples
///
/// ```
/// use diplib_core::Image;
/// use diplib_region::{LabelOptions, label};
///
/// let img = Image::from_vec(&[4, 2], vec![
///     true, false, false, true,
///     true, false, true, false,
/// ]).unwrap();
/// let (labels, n) = label(&img, &LabelOptions::default()).unwrap();
/// assert_eq!(n, 2);
/// assert_eq!(labels.to_vec::<u32>().unwrap(), vec![1, 0, 0, 2, 1, 0, 2, 0]);
///
/// let (_, n) = label(&img, &LabelOptions::default().with_connectivity(1)).unwrap();
/// assert_eq!(n, 3);
/// ```
pub fn label(binary: &Image, options: &LabelOptions) -> RegionResult<(Image, usize)> {
    require_scalar(binary)?;
    if !binary.data_type().is_binary() {
        return Err(Error::ImageNotBinary.into());
    }
    let n_dims = binary.dimensionality();
    if options.connectivity > n_dims {
        return Err(RegionError::InvalidParameters(format!(
            "connectivity {} exceeds image dimensionality {}",
            options.connectivity, n_dims
        )));
    }
    let boundary = BoundaryCondition::per_dimension(&options.boundary_condition, n_dims)?;

    // Singleton dimensions do not change the linear order of the samples,
    // so they can simply be left out.
    let (sizes, boundary): (Vec<usize>, Vec<BoundaryCondition>) = binary
        .sizes()
        .iter()
        .zip(&boundary)
        .filter(|(size, _)| **size > 1)
        .map(|(&size, &bc)| (size, bc))
        .unzip();
    let connectivity = match options.connectivity {
        0 => sizes.len(),
        c => c.min(sizes.len()),
    };

    let foreground: Vec<bool> = binary.to_vec()?;
    let mut labels = vec![0 as LabelType; foreground.len()];
    let mut regions: RegionSizes = UnionFind::new(add_sizes as SizeMerge);

    if sizes.len() == 2 && connectivity == 2 && sizes[0] > 1 {
        grana_first_pass(&foreground, sizes[0], sizes[1], &mut labels, &mut regions);
    } else {
        generic_first_pass(&foreground, &sizes, connectivity, &mut labels, &mut regions);
    }

    for (dim, bc) in boundary.iter().enumerate() {
        match bc {
            BoundaryCondition::Periodic if sizes[dim] > 2 => {
                link_periodic(&foreground, &sizes, dim, connectivity, &labels, &mut regions);
            }
            BoundaryCondition::Remove if sizes[dim] > 1 => {
                remove_edge_objects(&foreground, &sizes, dim, &labels, &mut regions);
            }
            _ => {}
        }
    }

    let provisional = regions.len();
    let map = regions.relabel_if(|&size| options.keeps(size));
    for l in labels.iter_mut().filter(|l| **l != 0) {
        *l = map.label(*l);
    }
    debug!(
        "label: {} provisional labels, {} objects",
        provisional,
        map.count()
    );

    let mut out = Image::from_vec(binary.sizes(), labels)?;
    out.set_pixel_size(binary.pixel_size().clone());
    Ok((out, map.count()))
}

fn assign(labels: &mut [LabelType], regions: &mut RegionSizes, index: usize, label: LabelType) {
    labels[index] = label;
    *regions.value_mut(label) += 1;
}

/// What is known about the neighbourhood of the previous pixel.
#[derive(Debug, Clone, Copy)]
enum State {
    /// Previous pixel and the one above it are foreground
    A,
    /// Previous pixel foreground, above it background, above-right foreground
    B,
    /// Previous pixel foreground, above and above-right background
    C,
    /// Previous pixel background
    D,
}

/// First pass of the Grana 2016 decision tree for 8-connected 2-D images.
/// Neighbours are p (above-left), q (above), r (above-right), s (left).
fn grana_first_pass(
    fg: &[bool],
    width: usize,
    height: usize,
    labels: &mut [LabelType],
    regions: &mut RegionSizes,
) {
    for x in 0..width {
        if fg[x] {
            if x > 0 && fg[x - 1] {
                assign(labels, regions, x, labels[x - 1]);
            } else {
                labels[x] = regions.create(1);
            }
        }
    }

    for y in 1..height {
        let row = y * width;
        let above = row - width;

        let mut state = if !fg[row] {
            State::D
        } else if fg[above] {
            assign(labels, regions, row, labels[above]);
            State::A
        } else if fg[above + 1] {
            assign(labels, regions, row, labels[above + 1]);
            State::B
        } else {
            labels[row] = regions.create(1);
            State::C
        };

        for x in 1..width - 1 {
            let i = row + x;
            if !fg[i] {
                state = State::D;
                continue;
            }
            let (p, q, r, s) = (above + x - 1, above + x, above + x + 1, i - 1);
            state = match state {
                State::A => {
                    if fg[q] {
                        assign(labels, regions, i, labels[q]);
                        State::A
                    } else if fg[r] {
                        let l = regions.union(labels[r], labels[s]);
                        assign(labels, regions, i, l);
                        State::B
                    } else {
                        assign(labels, regions, i, labels[s]);
                        State::C
                    }
                }
                State::B => {
                    assign(labels, regions, i, labels[q]);
                    State::A
                }
                State::C => {
                    if fg[r] {
                        let l = regions.union(labels[r], labels[s]);
                        assign(labels, regions, i, l);
                        State::B
                    } else {
                        assign(labels, regions, i, labels[s]);
                        State::C
                    }
                }
                State::D => {
                    if fg[q] {
                        assign(labels, regions, i, labels[q]);
                        State::A
                    } else if fg[r] {
                        let l = if fg[p] {
                            regions.union(labels[p], labels[r])
                        } else {
                            labels[r]
                        };
                        assign(labels, regions, i, l);
                        State::B
                    } else if fg[p] {
                        assign(labels, regions, i, labels[p]);
                        State::C
                    } else {
                        labels[i] = regions.create(1);
                        State::C
                    }
                }
            };
        }

        let x = width - 1;
        let i = row + x;
        if fg[i] {
            let (p, q, s) = (above + x - 1, above + x, i - 1);
            match state {
                State::A if fg[q] => assign(labels, regions, i, labels[q]),
                State::A | State::C => assign(labels, regions, i, labels[s]),
                State::B => assign(labels, regions, i, labels[q]),
                State::D if fg[q] => assign(labels, regions, i, labels[q]),
                State::D if fg[p] => assign(labels, regions, i, labels[p]),
                State::D => labels[i] = regions.create(1),
            }
        }
    }
}

/// Coordinate offsets of the neighbours within `connectivity`, the
/// central pixel excluded.
fn neighbour_deltas(n_dims: usize, connectivity: usize) -> Vec<Vec<isize>> {
    let total = 3usize.pow(n_dims as u32);
    (0..total)
        .map(|mut code| {
            (0..n_dims)
                .map(|_| {
                    let d = (code % 3) as isize - 1;
                    code /= 3;
                    d
                })
                .collect::<Vec<isize>>()
        })
        .filter(|delta| {
            let n = delta.iter().filter(|&&d| d != 0).count();
            n > 0 && n <= connectivity
        })
        .collect()
}

fn shifted_index(coords: &[usize], delta: &[isize], sizes: &[usize]) -> Option<usize> {
    let mut index = 0;
    let mut stride = 1;
    for ((&c, &d), &size) in coords.iter().zip(delta).zip(sizes) {
        let c = c.checked_add_signed(d).filter(|&c| c < size)?;
        index += c * stride;
        stride *= size;
    }
    Some(index)
}

fn next_coordinates(coords: &mut [usize], sizes: &[usize]) {
    for (c, &size) in coords.iter_mut().zip(sizes) {
        *c += 1;
        if *c < size {
            return;
        }
        *c = 0;
    }
}

fn generic_first_pass(
    fg: &[bool],
    sizes: &[usize],
    connectivity: usize,
    labels: &mut [LabelType],
    regions: &mut RegionSizes,
) {
    // Neighbours that precede the pixel in linear order: the last non-zero
    // coordinate offset is negative.
    let backward: Vec<Vec<isize>> = neighbour_deltas(sizes.len(), connectivity)
        .into_iter()
        .filter(|delta| delta.iter().rev().find(|&&d| d != 0) == Some(&-1))
        .collect();

    let mut coords = vec![0usize; sizes.len()];
    for i in 0..fg.len() {
        if fg[i] {
            let mut l: LabelType = 0;
            for delta in &backward {
                if let Some(j) = shifted_index(&coords, delta, sizes)
                    && fg[j]
                {
                    let nl = labels[j];
                    if l == 0 {
                        l = nl;
                    } else if l != nl {
                        l = regions.union(l, nl);
                    }
                }
            }
            if l == 0 {
                labels[i] = regions.create(1);
            } else {
                assign(labels, regions, i, l);
            }
        }
        next_coordinates(&mut coords, sizes);
    }
}

/// Join objects that touch across the two ends of dimension `dim`.
fn link_periodic(
    fg: &[bool],
    sizes: &[usize],
    dim: usize,
    connectivity: usize,
    labels: &[LabelType],
    regions: &mut RegionSizes,
) {
    let across: Vec<Vec<isize>> = neighbour_deltas(sizes.len(), connectivity)
        .into_iter()
        .filter(|delta| delta[dim] == -1)
        .collect();
    let mut coords = vec![0usize; sizes.len()];
    for i in 0..fg.len() {
        if fg[i] && coords[dim] == 0 {
            // the neighbour at -1 along `dim` is the last slice
            let mut wrapped = coords.clone();
            wrapped[dim] = sizes[dim] - 1;
            for delta in &across {
                let mut d = delta.clone();
                d[dim] = 0;
                if let Some(j) = shifted_index(&wrapped, &d, sizes)
                    && fg[j]
                {
                    regions.union(labels[i], labels[j]);
                }
            }
        }
        next_coordinates(&mut coords, sizes);
    }
}

/// Merge every object touching either end of dimension `dim` with the
/// background.
fn remove_edge_objects(
    fg: &[bool],
    sizes: &[usize],
    dim: usize,
    labels: &[LabelType],
    regions: &mut RegionSizes,
) {
    let mut coords = vec![0usize; sizes.len()];
    for i in 0..fg.len() {
        if fg[i] && (coords[dim] == 0 || coords[dim] == sizes[dim] - 1) {
            regions.union(labels[i], 0);
        }
        next_coordinates(&mut coords, sizes);
    }
}
