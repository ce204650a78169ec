//! Chain code extraction from label images
//!
//! Object boundaries are followed keeping the object on the right hand
//! (turning left whenever possible), which traces the outer boundary of each
//! object clockwise on screen. Holes are not traced.

use std::collections::HashMap;

use diplib_core::{Error, Image};
use log::{debug, warn};

use crate::chain_code::{ChainCode, Code, DELTAS4, DELTAS8};
use crate::error::{RegionError, RegionResult};
use crate::label::require_scalar;
use crate::label_manipulation::{Background, get_object_labels};
use crate::union_find::LabelType;
use crate::vertex::VertexInteger;

/// Labels of a 2-D image, row-major (`x` fastest).
struct LabelPlane {
    data: Vec<LabelType>,
    width: usize,
    /// Largest valid coordinates.
    max: VertexInteger,
}

impl LabelPlane {
    fn new(label: &Image, allow_binary: bool) -> RegionResult<Self> {
        require_scalar(label)?;
        let dt = label.data_type();
        if !(dt.is_uint() || (allow_binary && dt.is_binary())) {
            return Err(Error::DataTypeNotSupported(dt).into());
        }
        let sizes = label.sizes();
        if sizes.len() != 2 {
            return Err(Error::DimensionalityNotSupported(sizes.len()).into());
        }
        Ok(LabelPlane {
            data: label.to_vec()?,
            width: sizes[0],
            max: VertexInteger::new(sizes[0] as isize - 1, sizes[1] as isize - 1),
        })
    }

    fn contains(&self, p: VertexInteger) -> bool {
        p.x >= 0 && p.y >= 0 && p.x <= self.max.x && p.y <= self.max.y
    }

    /// Label at `p`, which must be inside the image.
    fn at(&self, p: VertexInteger) -> LabelType {
        self.data[p.y as usize * self.width + p.x as usize]
    }

    fn has_label(&self, p: VertexInteger, label: LabelType) -> bool {
        self.contains(p) && self.at(p) == label
    }
}

fn check_connectivity(connectivity: usize) -> RegionResult<()> {
    if connectivity > 2 {
        return Err(RegionError::InvalidParameters(format!(
            "connectivity {} not supported for chain codes",
            connectivity
        )));
    }
    Ok(())
}

/// Follow the boundary of the object under `start`.
///
/// With `known_start_direction` the seed comes from a raster scan, so the
/// pixel above it is background and direction 0 is a valid place to start
/// looking. Otherwise the first direction pointing to a pixel outside the
/// object is searched for.
fn trace_boundary(
    plane: &LabelPlane,
    start: VertexInteger,
    connectivity: usize,
    known_start_direction: bool,
) -> RegionResult<ChainCode> {
    let not_on_boundary = || RegionError::NotOnBoundary {
        x: start.x as usize,
        y: start.y as usize,
    };
    let label = plane.at(start);
    if label == 0 {
        return Err(not_on_boundary());
    }
    let is_8_connected = connectivity != 1;
    let (deltas, n_dirs): (&[VertexInteger], u8) = if is_8_connected {
        (&DELTAS8[..], 8)
    } else {
        (&DELTAS4[..], 4)
    };
    let up = n_dirs / 4;
    let left = 2 * up;
    let down = 3 * up;

    let mut out = ChainCode {
        codes: Vec::new(),
        start,
        object_id: label,
        is_8_connected,
    };

    let mut dir: u8 = 0;
    if !known_start_direction {
        while plane.has_label(start + deltas[dir as usize], label) {
            dir += 1;
            if dir == n_dirs {
                return Err(not_on_boundary());
            }
        }
    }
    let start_dir = dir;
    let mut coord = start;
    loop {
        let next = coord + deltas[dir as usize];
        if plane.has_label(next, label) {
            let is_border = (next.x == 0 && dir == up)
                || (next.x == plane.max.x && dir == down)
                || (next.y == 0 && dir == 0)
                || (next.y == plane.max.y && dir == left);
            out.push(Code::new(dir, is_border));
            coord = next;
            // turn left as far as possible
            dir = if is_8_connected { (dir + 2) % 8 } else { (dir + 1) % 4 };
        } else {
            dir = if dir == 0 { n_dirs - 1 } else { dir - 1 };
        }
        if coord == start && dir == start_dir {
            break;
        }
    }
    Ok(out)
}

/// Chain codes of the objects in a 2-D label image.
///
/// One chain code is returned per entry of `object_ids`, in that order; an
/// empty list means every object in the image, in increasing label order.
/// IDs not present in the image give an empty [`ChainCode`]. Each object is
/// traced from its first pixel in raster order, so only its outer boundary
/// is followed, and only the connected component containing that pixel.
///
/// `connectivity` 1 gives 4-connected chain codes, 2 (or 0) 8-connected.
///
/// # Errors
///
/// `label` must be a 2-D scalar unsigned integer image and `connectivity`
/// at most 2.
///
/// # Examples
///
/// ```
/// use diplib_core::Image;
/// use diplib_region::get_image_chain_codes;
///
/// let img = Image::from_vec(&[4, 3], vec![
///     0u8, 0, 0, 0,
///     0, 1, 1, 0,
///     0, 1, 1, 0,
/// ]).unwrap();
/// let ccs = get_image_chain_codes(&img, &[], 2).unwrap();
/// assert_eq!(ccs.len(), 1);
/// assert_eq!(ccs[0].object_id, 1);
/// assert_eq!(ccs[0].codes.len(), 4);
/// assert_eq!(ccs[0].area().unwrap(), 4.0);
/// ```
pub fn get_image_chain_codes(
    label: &Image,
    object_ids: &[LabelType],
    connectivity: usize,
) -> RegionResult<Vec<ChainCode>> {
    check_connectivity(connectivity)?;
    let plane = LabelPlane::new(label, false)?;

    let ids: Vec<LabelType> = if object_ids.is_empty() {
        get_object_labels(label, None, Background::Exclude)?
            .into_iter()
            .map(|id| id as LabelType)
            .collect()
    } else {
        object_ids.to_vec()
    };
    // object ID -> (output index, traced)
    let mut pending: HashMap<LabelType, (usize, bool)> = HashMap::with_capacity(ids.len());
    for (index, &id) in ids.iter().enumerate() {
        pending.entry(id).or_insert((index, false));
    }

    let mut out = vec![ChainCode::default(); ids.len()];
    let mut current = 0;
    let mut traced = 0;
    for y in 0..=plane.max.y {
        for x in 0..=plane.max.x {
            let coord = VertexInteger::new(x, y);
            let value = plane.at(coord);
            if value == 0 || value == current {
                continue;
            }
            if let Some((index, done)) = pending.get_mut(&value)
                && !*done
            {
                *done = true;
                current = value;
                out[*index] = trace_boundary(&plane, coord, connectivity, true)?;
                traced += 1;
            }
        }
    }

    for (id, _) in pending.iter().filter(|(_, (_, done))| !done) {
        warn!("get_image_chain_codes: object ID {} not present in the image", id);
    }
    debug!(
        "get_image_chain_codes: {} chain codes for {} requested objects",
        traced,
        ids.len()
    );
    Ok(out)
}

/// Chain code of the object under `start`, which must lie on the object's
/// boundary. `label` can be binary or a label image.
///
/// # Errors
///
/// `label` must be a 2-D scalar binary or unsigned integer image, `start`
/// must have two in-range coordinates, and the pixel there must be an
/// object pixel with at least one neighbour outside the object.
pub fn get_single_chain_code(label: &Image, start: &[usize], connectivity: usize) -> RegionResult<ChainCode> {
    check_connectivity(connectivity)?;
    let plane = LabelPlane::new(label, true)?;
    if start.len() != 2 {
        return Err(Error::ArrayParameterWrongLength {
            expected: 2,
            actual: start.len(),
        }
        .into());
    }
    let coord = VertexInteger::new(start[0] as isize, start[1] as isize);
    if !plane.contains(coord) {
        let (index, len) = if coord.x > plane.max.x {
            (coord.x, plane.width)
        } else {
            (coord.y, plane.max.y as usize + 1)
        };
        return Err(Error::IndexOutOfRange { index, len }.into());
    }
    trace_boundary(&plane, coord, connectivity, false)
}
