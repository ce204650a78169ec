//! Freeman chain codes
//!
//! A chain code describes the boundary of a 2-D object as a start pixel and
//! a sequence of unit steps. 8-connected codes number the directions 0..8
//! counter-clockwise on screen starting at East (with `y` down, North is
//! `-y`); 4-connected codes use 0..4 the same way.
//!
//! Chain codes produced by [`get_image_chain_codes`] run clockwise around
//! the object, so their polygons have positive area.
//!
//! [`get_image_chain_codes`]: crate::get_image_chain_codes

use std::f64::consts::{PI, SQRT_2};

use diplib_core::Image;

use crate::convex_hull::ConvexHull;
use crate::error::{RegionError, RegionResult};
use crate::polygon::{FeretValues, Polygon, RadiusValues};
use crate::union_find::LabelType;
use crate::vertex::{BoundingBoxInteger, VertexFloat, VertexInteger, distance};

/// Steps of the 4-connected codes: East, North, West, South.
pub const DELTAS4: [VertexInteger; 4] = [
    VertexInteger::new(1, 0),
    VertexInteger::new(0, -1),
    VertexInteger::new(-1, 0),
    VertexInteger::new(0, 1),
];

/// Steps of the 8-connected codes, counter-clockwise from East.
pub const DELTAS8: [VertexInteger; 8] = [
    VertexInteger::new(1, 0),
    VertexInteger::new(1, -1),
    VertexInteger::new(0, -1),
    VertexInteger::new(-1, -1),
    VertexInteger::new(-1, 0),
    VertexInteger::new(-1, 1),
    VertexInteger::new(0, 1),
    VertexInteger::new(1, 1),
];

/// What [`ChainCode::polygon_with`] does with steps along the image edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderCodes {
    /// Every step adds its vertices
    #[default]
    Keep,
    /// Steps along the image edge add no vertices
    Lose,
}

/// Start of a chain code that describes nothing.
const NO_START: VertexInteger = VertexInteger::new(-1, -1);

/// One step of a chain code.
///
/// The border flag marks steps taken along the image edge; such steps are
/// an artifact of the object being cut off. Two codes compare equal when
/// their directions are equal, whatever their border flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct Code {
    value: u8,
}

impl Code {
    /// Direction is taken modulo 8.
    #[inline]
    pub fn new(direction: u8, border: bool) -> Self {
        Code {
            value: (direction & 7) | ((border as u8) << 3),
        }
    }

    #[inline]
    pub fn direction(self) -> u8 {
        self.value & 7
    }

    #[inline]
    pub fn is_border(self) -> bool {
        self.value & 8 != 0
    }

    #[inline]
    pub fn is_even(self) -> bool {
        self.value & 1 == 0
    }

    #[inline]
    pub fn is_odd(self) -> bool {
        !self.is_even()
    }

    /// Step of this code in an 8-connected chain.
    #[inline]
    pub fn delta8(self) -> VertexInteger {
        DELTAS8[self.direction() as usize]
    }

    /// Step of this code in a 4-connected chain.
    #[inline]
    pub fn delta4(self) -> VertexInteger {
        DELTAS4[(self.value & 3) as usize]
    }

    #[inline]
    fn index(self) -> usize {
        self.direction() as usize
    }
}

impl From<u8> for Code {
    fn from(direction: u8) -> Self {
        Code::new(direction, false)
    }
}

impl PartialEq for Code {
    fn eq(&self, other: &Self) -> bool {
        self.direction() == other.direction()
    }
}

impl Eq for Code {}

/// The boundary of one object as a chain of unit steps.
///
/// A chain code whose `start` is `(-1, -1)` is *empty*: it describes no
/// object (for example an object ID absent from the image). A chain code
/// with a valid start and no codes describes a single-pixel object.
///
/// # Examples
///
/// ```
/// use diplib_region::{ChainCode, VertexInteger};
///
/// // a 2x2 square
/// let cc = ChainCode::from_directions(VertexInteger::new(0, 0), &[0, 6, 4, 2], true);
/// assert_eq!(cc.area().unwrap(), 4.0);
/// assert_eq!(cc.polygon().unwrap().len(), 8);
/// assert!(cc.is_closed());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ChainCode {
    pub codes: Vec<Code>,
    pub start: VertexInteger,
    pub object_id: LabelType,
    pub is_8_connected: bool,
}

impl Default for ChainCode {
    fn default() -> Self {
        ChainCode {
            codes: Vec::new(),
            start: NO_START,
            object_id: 0,
            is_8_connected: true,
        }
    }
}

impl ChainCode {
    /// Chain code without border flags.
    pub fn from_directions(start: VertexInteger, directions: &[u8], is_8_connected: bool) -> Self {
        ChainCode {
            codes: directions.iter().map(|&d| Code::from(d)).collect(),
            start,
            object_id: 0,
            is_8_connected,
        }
    }

    pub fn push(&mut self, code: Code) {
        self.codes.push(code);
    }

    /// Whether this chain code describes no object.
    pub fn is_empty(&self) -> bool {
        self.start == NO_START
    }

    fn delta(&self, code: Code) -> VertexInteger {
        if self.is_8_connected { code.delta8() } else { code.delta4() }
    }

    fn reject_single_code(&self) -> RegionResult<()> {
        if self.codes.len() == 1 {
            Err(RegionError::DegenerateChainCode)
        } else {
            Ok(())
        }
    }

    /// Whether following the codes leads back to the start pixel.
    pub fn is_closed(&self) -> bool {
        let end = self
            .codes
            .iter()
            .fold(self.start, |pos, &code| pos + self.delta(code));
        end == self.start
    }

    /// Equivalent 8-connected chain code: a 4-connected step followed by a
    /// step turning left is replaced by one diagonal step.
    pub fn convert_to_8_connected(&self) -> ChainCode {
        if self.is_8_connected {
            return self.clone();
        }
        let mut out = ChainCode {
            codes: Vec::with_capacity(self.codes.len()),
            start: self.start,
            object_id: self.object_id,
            is_8_connected: true,
        };
        let codes = &self.codes;
        let n = codes.len();
        if n < 3 {
            out.codes = codes
                .iter()
                .map(|&c| Code::new(c.direction() * 2, c.is_border()))
                .collect();
            return out;
        }
        let turns_left = |cur: Code, next: Code| (cur.direction() + 1) % 4 == next.direction();

        let mut ii = 0;
        let mut skip_last = false;
        let last = codes[n - 1];
        if turns_left(last, codes[0]) {
            // the chain starts in the middle of a diagonal step
            out.push(Code::new(last.direction() * 2 + 1, false));
            out.start -= last.delta4();
            skip_last = true;
            ii = 1;
        }
        while ii + 1 < n {
            let cur = codes[ii];
            if turns_left(cur, codes[ii + 1]) {
                // a diagonal step is never along the image edge
                out.push(Code::new(cur.direction() * 2 + 1, false));
                ii += 1;
            } else {
                out.push(Code::new(cur.direction() * 2, cur.is_border()));
            }
            ii += 1;
        }
        if ii < n && !skip_last {
            let cur = codes[ii];
            out.push(Code::new(cur.direction() * 2, cur.is_border()));
        }
        out
    }

    /// Chain code of the object dilated by one pixel (with the 4-connected
    /// diamond), tracing the pixels just outside this boundary.
    ///
    /// # Errors
    ///
    /// Only defined for 8-connected chain codes.
    pub fn offset(&self) -> RegionResult<ChainCode> {
        if !self.is_8_connected {
            return Err(RegionError::NotEightConnected);
        }
        let mut out = ChainCode {
            object_id: self.object_id,
            ..ChainCode::default()
        };
        if self.is_empty() {
            return Ok(out);
        }
        let Some(&last) = self.codes.last() else {
            out.start = self.start + DELTAS8[2];
            out.codes = [7, 5, 3, 1].iter().map(|&d| Code::from(d)).collect();
            return Ok(out);
        };
        let mut prev = last.direction();
        let shift = if last.is_even() { 2 } else { 3 };
        out.start = self.start + DELTAS8[((prev + shift) % 8) as usize];
        for &code in &self.codes {
            let d = code.direction();
            let turn = (d + 8 - prev) % 8;
            let border = code.is_border();
            let mut push = |direction: u8| out.push(Code::new(direction, border));
            if code.is_even() {
                if matches!(turn, 4 | 5) {
                    push(d + 3);
                }
                if matches!(turn, 4..=7) {
                    push(d + 1);
                }
                push(d);
            } else {
                if turn == 4 {
                    push(d + 4);
                }
                if matches!(turn, 4..=6) {
                    push(d + 2);
                }
                if !matches!(turn, 1 | 2) {
                    push(d);
                }
            }
            prev = d;
        }
        Ok(out)
    }

    /// Polygon through the midpoints of the pixel edges along the boundary.
    ///
    /// A single-pixel object gives a diamond of area 0.5. An empty chain
    /// code gives an empty polygon.
    pub fn polygon(&self) -> RegionResult<Polygon> {
        self.polygon_with(BorderCodes::Keep)
    }

    /// Like [`polygon`](Self::polygon), but with [`BorderCodes::Lose`] the
    /// steps along the image edge add no vertices. The polygon then cuts
    /// straight along that edge.
    pub fn polygon_with(&self, border_codes: BorderCodes) -> RegionResult<Polygon> {
        self.reject_single_code()?;
        if self.is_empty() {
            return Ok(Polygon::default());
        }
        let converted;
        let cc = if self.is_8_connected {
            self
        } else {
            converted = self.convert_to_8_connected();
            &converted
        };

        const PTS: [VertexFloat; 4] = [
            VertexFloat::new(0.0, -0.5),
            VertexFloat::new(-0.5, 0.0),
            VertexFloat::new(0.0, 0.5),
            VertexFloat::new(0.5, 0.0),
        ];
        let decrement = |k: usize| if k == 0 { 3 } else { k - 1 };

        let mut pos = cc.start.to_float();
        let mut vertices = Vec::with_capacity(cc.codes.len() * 2);
        let Some(&last) = cc.codes.last() else {
            vertices.extend([PTS[0], PTS[3], PTS[2], PTS[1]].iter().map(|&p| p + pos));
            return Ok(Polygon::new(vertices));
        };
        let mut m = last.index();
        for &code in &cc.codes {
            let n = code.index();
            if border_codes == BorderCodes::Lose && code.is_border() {
                pos += DELTAS8[n].to_float();
                m = n;
                continue;
            }
            let mut k = (m + 1) / 2 % 4;
            let l = (n / 2 + 4 - k) % 4;
            vertices.push(PTS[k] + pos);
            if l != 0 {
                k = decrement(k);
                vertices.push(PTS[k] + pos);
                if l <= 2 {
                    k = decrement(k);
                    vertices.push(PTS[k] + pos);
                    if l == 1 {
                        // only when n is odd and n == m + 4
                        k = decrement(k);
                        vertices.push(PTS[k] + pos);
                    }
                }
            }
            pos += DELTAS8[n].to_float();
            m = n;
        }
        Ok(Polygon::new(vertices))
    }

    pub fn convex_hull(&self) -> RegionResult<ConvexHull> {
        ConvexHull::new(&self.polygon()?)
    }

    /// Pixel coordinates visited by the chain, starting at `start`. The end
    /// pixel is only listed when it differs from the start.
    pub fn coordinates(&self) -> Vec<VertexInteger> {
        if self.is_empty() {
            return Vec::new();
        }
        let mut out = Vec::with_capacity(self.codes.len() + 1);
        let mut pos = self.start;
        for &code in &self.codes {
            out.push(pos);
            pos += self.delta(code);
        }
        if pos != self.start {
            out.push(pos);
        }
        out
    }

    /// Boundary length with the corner-count corrected estimators of Vossepoel
    /// and Smeulders. Steps along the image edge count only with
    /// `include_border`.
    ///
    /// An empty chain code has length 0 and a single pixel length pi.
    ///
    /// # Errors
    ///
    /// A chain code of exactly one step is not a boundary.
    pub fn length(&self, include_border: bool) -> RegionResult<f64> {
        self.reject_single_code()?;
        if self.is_empty() {
            return Ok(0.0);
        }
        let Some(&last) = self.codes.last() else {
            return Ok(PI);
        };
        let mut n_even = 0usize;
        let mut n_odd = 0usize;
        let mut n_corners = 0usize;
        let mut prev = last;
        for &code in &self.codes {
            if include_border || !code.is_border() {
                if self.is_8_connected && code.is_odd() {
                    n_odd += 1;
                } else {
                    n_even += 1;
                }
                if code != prev {
                    n_corners += 1;
                }
            }
            prev = code;
        }
        Ok(if self.is_8_connected {
            0.980 * n_even as f64 + 1.406 * n_odd as f64 - 0.091 * n_corners as f64
        } else {
            0.948 * n_even as f64 - 0.278 * n_corners as f64
        })
    }

    /// Feret diameters, found by rotating the chain in steps of `angle_step`
    /// radian over a quarter turn and measuring its extent along `x` and
    /// `y`.
    ///
    /// # Errors
    ///
    /// `angle_step` must be positive, and the chain must not have exactly
    /// one step.
    pub fn feret(&self, angle_step: f64) -> RegionResult<FeretValues> {
        self.reject_single_code()?;
        if angle_step.is_nan() || angle_step <= 0.0 {
            return Err(RegionError::InvalidParameters(format!(
                "Feret angle step must be positive, got {}",
                angle_step
            )));
        }
        let mut feret = FeretValues::default();
        if self.is_empty() {
            return Ok(feret);
        }
        if self.codes.is_empty() {
            return Ok(FeretValues {
                max_diameter: 1.0,
                min_diameter: 1.0,
                max_perpendicular: 1.0,
                max_angle: 0.0,
                min_angle: PI / 2.0,
            });
        }

        feret.min_diameter = f64::MAX;
        let n_dirs = if self.is_8_connected { 8 } else { 4 };
        let mut angle = 0.0;
        while angle <= PI / 2.0 {
            let mut cos = [0.0; 8];
            let mut sin = [0.0; 8];
            for ii in 0..n_dirs {
                let (weight, dir_angle) = if self.is_8_connected {
                    (1.0 + (SQRT_2 - 1.0) * (ii % 2) as f64, ii as f64 * PI / 4.0)
                } else {
                    (1.0, ii as f64 * PI / 2.0)
                };
                cos[ii] = weight * (dir_angle + angle).cos();
                sin[ii] = -weight * (dir_angle + angle).sin();
            }
            let (mut x, mut y) = (0.0f64, 0.0f64);
            let (mut x_min, mut x_max, mut y_min, mut y_max) = (0.0f64, 0.0f64, 0.0f64, 0.0f64);
            for &code in &self.codes {
                let i = if self.is_8_connected { code.index() } else { code.index() % 4 };
                x += cos[i];
                y += sin[i];
                x_min = x_min.min(x);
                x_max = x_max.max(x);
                y_min = y_min.min(y);
                y_max = y_max.max(y);
            }
            let x_diam = x_max - x_min + 1.0;
            let y_diam = y_max - y_min + 1.0;
            if x_diam > feret.max_diameter || angle == 0.0 {
                feret.max_diameter = x_diam;
                feret.max_angle = angle;
            }
            if y_diam > feret.max_diameter {
                feret.max_diameter = y_diam;
                feret.max_angle = angle + PI / 2.0;
            }
            if x_diam < feret.min_diameter || angle == 0.0 {
                feret.min_diameter = x_diam;
                feret.min_angle = angle;
                feret.max_perpendicular = y_diam;
            }
            if y_diam < feret.min_diameter {
                feret.min_diameter = y_diam;
                feret.min_angle = angle + PI / 2.0;
                feret.max_perpendicular = x_diam;
            }
            angle += angle_step;
        }
        Ok(feret)
    }

    /// Integral of the squared curvature along the boundary (Young et al.),
    /// with the curvature smoothed by three passes of a uniform filter of
    /// size 5.
    pub fn bending_energy(&self) -> f64 {
        const KULPA: [f64; 2] = [0.9481, 1.3408];
        const FOUR_CONNECTED: [f64; 2] = [0.948, 0.278];
        let size = self.codes.len();
        if size <= 1 {
            return 0.0;
        }
        let mut diff = vec![0.0; size];
        let mut delta_s = vec![0.0; size];
        let mut prev = self.codes[size - 1];
        for (ii, &code) in self.codes.iter().enumerate() {
            delta_s[ii] = if self.is_8_connected {
                0.5 * (KULPA[code.index() % 2] + KULPA[prev.index() % 2])
            } else {
                FOUR_CONNECTED[0] + FOUR_CONNECTED[1] * (code != prev) as u8 as f64
            };
            let mut d = code.direction() as f64 - prev.direction() as f64;
            if !self.is_8_connected {
                d *= 2.0;
            }
            if d > 3.0 {
                d -= 8.0;
            }
            if d < -3.0 {
                d += 8.0;
            }
            diff[ii] = d / delta_s[ii];
            prev = code;
        }

        const K: usize = 5;
        if size > K {
            let size1 = size - K;
            for _ in 0..3 {
                let mut stored = [0.0; K];
                stored.copy_from_slice(&diff[..K]);
                let mut sum: f64 = stored.iter().sum();
                for ii in 0..size1 {
                    let saved = diff[ii];
                    diff[ii] = sum / K as f64;
                    sum += diff[ii + K] - saved;
                }
                for ii in size1..size {
                    let saved = diff[ii];
                    diff[ii] = sum / K as f64;
                    sum += stored[ii - size1] - saved;
                }
            }
        }

        let be: f64 = diff.iter().zip(&delta_s).map(|(d, s)| d * d * s).sum();
        // codes are in units of 45 degrees
        be * PI * PI / 16.0
    }

    /// Statistics of the distances from the boundary pixels to their mean
    /// position. A single pixel has all statistics 0; an empty chain code
    /// has no samples.
    pub fn radius(&self) -> RegionResult<RadiusValues> {
        self.reject_single_code()?;
        let mut radius = RadiusValues::default();
        if self.is_empty() {
            return Ok(radius);
        }
        let mut positions = Vec::with_capacity(self.codes.len() + 1);
        let mut pos = self.start;
        positions.push(pos.to_float());
        for &code in &self.codes {
            pos += self.delta(code);
            positions.push(pos.to_float());
        }
        // a closed chain ends where it started
        if !self.codes.is_empty() && pos == self.start {
            positions.pop();
        }
        let sum = positions
            .iter()
            .fold(VertexFloat::new(0.0, 0.0), |acc, &p| acc + p);
        let n = positions.len() as f64;
        let centre = VertexFloat::new(sum.x / n, sum.y / n);
        for &p in &positions {
            radius.push(distance(p, centre));
        }
        Ok(radius)
    }

    /// Box around all pixels visited by the chain.
    pub fn bounding_box(&self) -> BoundingBoxInteger {
        let mut current = self.start;
        let mut bb = BoundingBoxInteger::new(current);
        for &code in &self.codes {
            current += self.delta(code);
            bb.expand(current);
        }
        bb
    }

    /// Number of steps in the longest straight run, not counting steps
    /// along the image edge.
    pub fn longest_run(&self) -> usize {
        let Some(&last) = self.codes.last() else {
            return 0;
        };
        let mut longest = 0;
        let mut current = 0;
        let mut prev = last;
        // the second round finishes the run that wraps around the start
        'rounds: for round in 0..2 {
            for &code in &self.codes {
                if !code.is_border() && code == prev {
                    current += 1;
                } else {
                    longest = longest.max(current);
                    current = 0;
                    if round == 1 {
                        break 'rounds;
                    }
                }
                prev = code;
            }
        }
        longest
    }

    /// Object area in pixels: the polygon area plus the half pixel lost
    /// around the boundary. 0 for an empty chain code.
    pub fn area(&self) -> RegionResult<f64> {
        if self.is_empty() {
            return Ok(0.0);
        }
        Ok(self.polygon()?.area() + 0.5)
    }

    pub fn centroid(&self) -> RegionResult<VertexFloat> {
        Ok(self.polygon()?.centroid())
    }

    /// Binary image of the boundary pixels, the size of the bounding box.
    pub fn image(&self) -> RegionResult<Image> {
        let bb = self.bounding_box();
        let size = bb.size();
        let mut data = vec![false; size.x * size.y];
        if !self.is_empty() {
            let mut pos = self.start - bb.top_left;
            // the start is set even if the chain is not closed
            data[pos.y as usize * size.x + pos.x as usize] = true;
            for &code in &self.codes {
                pos += self.delta(code);
                data[pos.y as usize * size.x + pos.x as usize] = true;
            }
        }
        Ok(Image::from_vec(&[size.x, size.y], data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn little_circle_8() -> ChainCode {
        ChainCode::from_directions(
            VertexInteger::new(10, 12),
            &[0, 0, 7, 6, 6, 5, 4, 4, 3, 2, 2, 1],
            true,
        )
    }

    fn little_circle_4() -> ChainCode {
        ChainCode::from_directions(
            VertexInteger::new(10, 12),
            &[0, 0, 3, 0, 3, 3, 2, 3, 2, 2, 1, 2, 1, 1, 0, 1],
            false,
        )
    }

    #[test]
    fn test_convert_to_8_connected() {
        let cc8 = little_circle_4().convert_to_8_connected();
        assert!(cc8.is_8_connected);
        assert_eq!(cc8.start, VertexInteger::new(10, 12));
        assert_eq!(cc8.codes, little_circle_8().codes);
        // already 8-connected is a copy
        assert_eq!(little_circle_8().convert_to_8_connected(), little_circle_8());
    }

    #[test]
    fn test_polygons_of_both_connectivities_agree() {
        let p8 = little_circle_8().polygon().unwrap();
        let p4 = little_circle_4().polygon().unwrap();
        assert_eq!(p8, p4);
        assert!(p8.is_clockwise());
    }

    #[test]
    fn test_coordinates() {
        let c8 = little_circle_8().coordinates();
        assert_eq!(c8.len(), 12);
        assert_eq!(c8[0], VertexInteger::new(10, 12));
        assert_eq!(c8[1], VertexInteger::new(11, 12));
        assert_eq!(c8[2], VertexInteger::new(12, 12));
        assert_eq!(c8[3], VertexInteger::new(13, 13));
        assert_eq!(c8[11], VertexInteger::new(9, 13));

        let c4 = little_circle_4().coordinates();
        assert_eq!(c4.len(), 16);
        assert_eq!(c4[3], VertexInteger::new(12, 13));
        assert_eq!(c4[15], VertexInteger::new(10, 13));
    }

    #[test]
    fn test_single_pixel() {
        let cc = ChainCode::from_directions(VertexInteger::new(0, 0), &[], true);
        assert_eq!(cc.area().unwrap(), 1.0);
        assert_eq!(cc.length(false).unwrap(), PI);
        let p = cc.polygon().unwrap();
        assert_eq!(p.len(), 4);
        assert_eq!(p.area(), 0.5);
        assert!((p.length() - 2.0 * SQRT_2).abs() < 1e-12);
        let f = cc.feret(0.1).unwrap();
        assert_eq!(f.max_diameter, 1.0);
        assert_eq!(f.min_diameter, 1.0);
        let hf = cc.convex_hull().unwrap().feret();
        assert!((hf.max_diameter - 1.0).abs() < 1e-12);
        assert!((hf.min_diameter - SQRT_2 / 2.0).abs() < 1e-12);
        assert_eq!(cc.longest_run(), 0);
        assert_eq!(cc.bounding_box().size(), crate::vertex::Vertex::new(1, 1));
    }

    #[test]
    fn test_empty_chain_code() {
        let cc = ChainCode::default();
        assert!(cc.is_empty());
        assert_eq!(cc.area().unwrap(), 0.0);
        assert_eq!(cc.length(true).unwrap(), 0.0);
        assert!(cc.polygon().unwrap().is_empty());
        assert!(cc.convex_hull().unwrap().vertices().is_empty());
        assert_eq!(cc.feret(0.1).unwrap(), FeretValues::default());
        assert!(cc.coordinates().is_empty());
        assert!(cc.offset().unwrap().is_empty());
    }

    #[test]
    fn test_two_by_two_square() {
        let cc = ChainCode::from_directions(VertexInteger::new(0, 0), &[0, 6, 4, 2], true);
        assert_eq!(cc.area().unwrap(), 4.0);
        let p = cc.polygon().unwrap();
        assert_eq!(p.len(), 8);
        assert_eq!(p.area(), 3.5);
        assert!((p.length() - (4.0 + 2.0 * SQRT_2)).abs() < 1e-12);
        assert!(p.is_clockwise());
        let hull = cc.convex_hull().unwrap();
        assert_eq!(hull.vertices().len(), 8);
        let f = hull.feret();
        assert!((f.max_diameter - 5f64.sqrt()).abs() < 1e-12);
        assert!((f.min_diameter - 2.0).abs() < 1e-12);
        assert_eq!(cc.longest_run(), 0);
        assert!((cc.length(false).unwrap() - (4.0 * 0.980 - 4.0 * 0.091)).abs() < 1e-12);
    }

    #[test]
    fn test_polygon_losing_border_codes() {
        let mut cc = ChainCode::from_directions(VertexInteger::new(0, 0), &[0, 6, 4, 2], true);
        cc.codes[0] = Code::new(0, true);
        assert_eq!(cc.polygon_with(BorderCodes::Keep).unwrap(), cc.polygon().unwrap());
        let p = cc.polygon_with(BorderCodes::Lose).unwrap();
        assert_eq!(p.len(), 6);
        assert_eq!(p.vertices[0], VertexFloat::new(1.0, -0.5));
        // the corner at the start of the dropped step is cut off
        assert_eq!(p.area(), 2.5);
    }

    #[test]
    fn test_radius_of_boundary_pixels() {
        let cc = ChainCode::from_directions(VertexInteger::new(2, 5), &[], true);
        let r = cc.radius().unwrap();
        assert_eq!((r.minimum(), r.maximum(), r.mean()), (0.0, 0.0, 0.0));
        assert_eq!(r.standard_deviation(), 0.0);
        // 3x3 square: four edge pixels at 1, four corners at sqrt(2)
        let cc = ChainCode::from_directions(
            VertexInteger::new(1, 1),
            &[0, 0, 6, 6, 4, 4, 2, 2],
            true,
        );
        let r = cc.radius().unwrap();
        assert_eq!(r.minimum(), 1.0);
        assert!((r.maximum() - SQRT_2).abs() < 1e-12);
        assert!((r.mean() - (4.0 + 4.0 * SQRT_2) / 8.0).abs() < 1e-12);
        assert!(ChainCode::from_directions(VertexInteger::new(0, 0), &[2], true)
            .radius()
            .is_err());
    }

    #[test]
    fn test_degenerate_chain_code() {
        let cc = ChainCode::from_directions(VertexInteger::new(3, 3), &[0], true);
        assert!(matches!(cc.polygon(), Err(RegionError::DegenerateChainCode)));
        assert!(matches!(cc.length(false), Err(RegionError::DegenerateChainCode)));
        assert!(cc.feret(0.1).is_err());
        let cc = ChainCode::from_directions(VertexInteger::new(0, 0), &[0, 4], true);
        assert!(cc.feret(0.0).is_err());
    }

    #[test]
    fn test_longest_run_wraps_around() {
        // runs of three equal codes count two repeats
        let cc = ChainCode::from_directions(VertexInteger::new(0, 0), &[0, 0, 0, 4, 4, 4], true);
        assert_eq!(cc.longest_run(), 2);
        let cc = ChainCode::from_directions(VertexInteger::new(1, 0), &[0, 0, 4, 4, 4, 0], true);
        assert_eq!(cc.longest_run(), 2);
    }

    #[test]
    fn test_offset_of_single_pixel() {
        let cc = ChainCode::from_directions(VertexInteger::new(5, 5), &[], true);
        let off = cc.offset().unwrap();
        assert_eq!(off.start, VertexInteger::new(5, 4));
        assert_eq!(off.codes, vec![Code::from(7), Code::from(5), Code::from(3), Code::from(1)]);
        assert!(off.is_closed());
        assert!(little_circle_4().offset().is_err());
    }

    #[test]
    fn test_bending_energy_of_circle_is_small() {
        let circle = little_circle_8();
        let square = ChainCode::from_directions(
            VertexInteger::new(0, 0),
            &[0, 0, 0, 0, 6, 6, 6, 6, 4, 4, 4, 4, 2, 2, 2, 2],
            true,
        );
        assert!(circle.bending_energy() > 0.0);
        assert!(square.bending_energy() > 0.0);
        assert_eq!(ChainCode::default().bending_energy(), 0.0);
    }

    #[test]
    fn test_image_round_trip_bounds() {
        let mut cc = little_circle_8();
        cc.start = VertexInteger::new(1, 0);
        let img = cc.image().unwrap();
        assert_eq!(img.sizes().as_slice(), &[5, 5]);
        let pixels: Vec<bool> = img.to_vec().unwrap();
        assert_eq!(pixels.iter().filter(|&&p| p).count(), 12);
        assert!(!pixels[0]);
        assert!(pixels[1]);
    }

    #[test]
    fn test_code_equality_ignores_border() {
        assert_eq!(Code::new(3, true), Code::new(3, false));
        assert_ne!(Code::new(3, true), Code::new(4, true));
        assert_eq!(Code::new(9, false).direction(), 1);
        assert!(Code::new(2, true).is_border());
    }
}
