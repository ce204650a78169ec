//! Operations on label images
//!
//! Listing the object IDs present in a label image, renumbering labels and
//! removing small objects.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use diplib_core::{DataType, Error, Image};
use log::debug;

use crate::error::RegionResult;
use crate::label::{LabelOptions, label, require_scalar};

/// Whether the background label 0 counts as an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Background {
    Include,
    #[default]
    Exclude,
}

impl FromStr for Background {
    type Err = Error;

    fn from_str(s: &str) -> diplib_core::Result<Self> {
        match s {
            "include" => Ok(Background::Include),
            "exclude" => Ok(Background::Exclude),
            other => Err(Error::InvalidFlag(other.to_string())),
        }
    }
}

impl fmt::Display for Background {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Background::Include => "include",
            Background::Exclude => "exclude",
        })
    }
}

fn require_label_image(label: &Image) -> RegionResult<()> {
    require_scalar(label)?;
    if !label.data_type().is_uint() {
        return Err(Error::DataTypeNotSupported(label.data_type()).into());
    }
    Ok(())
}

/// Sorted list of the distinct labels in `label`, optionally only those
/// under `mask`.
///
/// # Errors
///
/// `label` must be a forged scalar unsigned integer image. The mask, if
/// given, must be a scalar binary image of the same sizes.
///
/// # Examples
///
/// ```
/// use diplib_core::Image;
/// use diplib_region::{Background, get_object_labels};
///
/// let img = Image::from_vec(&[5], vec![0u8, 7, 7, 2, 0]).unwrap();
/// assert_eq!(get_object_labels(&img, None, Background::Exclude).unwrap(), vec![2, 7]);
/// assert_eq!(get_object_labels(&img, None, Background::Include).unwrap(), vec![0, 2, 7]);
/// ```
pub fn get_object_labels(
    label: &Image,
    mask: Option<&Image>,
    background: Background,
) -> RegionResult<Vec<usize>> {
    require_label_image(label)?;
    let values: Vec<u32> = label.to_vec()?;
    let mut ids = BTreeSet::new();
    match mask {
        Some(mask) => {
            require_scalar(mask)?;
            if !mask.data_type().is_binary() {
                return Err(Error::ImageNotBinary.into());
            }
            if mask.sizes() != label.sizes() {
                return Err(Error::sizes_dont_match(label.sizes(), mask.sizes()).into());
            }
            let selected: Vec<bool> = mask.to_vec()?;
            ids.extend(
                values
                    .iter()
                    .zip(&selected)
                    .filter(|(_, m)| **m)
                    .map(|(&v, _)| v as usize),
            );
        }
        None => ids.extend(values.iter().map(|&v| v as usize)),
    }
    if background == Background::Exclude {
        ids.remove(&0);
    }
    Ok(ids.into_iter().collect())
}

/// Renumber the objects of a label image consecutively from 1, in the order
/// in which they are first met in linear index order. The background stays
/// 0 and the data type is preserved.
pub fn relabel(label: &Image) -> RegionResult<Image> {
    require_label_image(label)?;
    let values: Vec<u32> = label.to_vec()?;
    let mut map: HashMap<u32, u32> = HashMap::new();
    let relabeled: Vec<u32> = values
        .iter()
        .map(|&v| {
            if v == 0 {
                return 0;
            }
            let next = map.len() as u32 + 1;
            *map.entry(v).or_insert(next)
        })
        .collect();
    debug!("relabel: {} objects", map.len());
    let mut out = Image::from_vec(label.sizes(), relabeled)?;
    out.convert_in_place(label.data_type())?;
    out.set_pixel_size(label.pixel_size().clone());
    Ok(out)
}

/// Remove objects with fewer than `threshold` pixels.
///
/// A binary input is labeled with `connectivity` first and the result is
/// binary. An unsigned integer input is taken as a label image (objects need
/// not be connected) and the result keeps its labels and data type.
///
/// # Examples
///
/// ```
/// use diplib_core::Image;
/// use diplib_region::small_objects_remove;
///
/// let img = Image::from_vec(&[6], vec![true, true, true, false, true, false]).unwrap();
/// let out = small_objects_remove(&img, 2, 1).unwrap();
/// assert_eq!(out.to_vec::<bool>().unwrap(), vec![true, true, true, false, false, false]);
/// ```
pub fn small_objects_remove(image: &Image, threshold: usize, connectivity: usize) -> RegionResult<Image> {
    require_scalar(image)?;
    let dt = image.data_type();
    if dt.is_binary() {
        let options = LabelOptions::default()
            .with_connectivity(connectivity)
            .with_min_size(threshold);
        let (labels, _) = label(image, &options)?;
        let kept: Vec<bool> = labels.to_vec::<u32>()?.iter().map(|&l| l != 0).collect();
        let mut out = Image::from_vec(image.sizes(), kept)?;
        out.set_pixel_size(image.pixel_size().clone());
        return Ok(out);
    }
    if !dt.is_uint() {
        return Err(Error::DataTypeNotSupported(dt).into());
    }
    let values: Vec<u32> = image.to_vec()?;
    let mut sizes: HashMap<u32, usize> = HashMap::new();
    for &v in values.iter().filter(|&&v| v != 0) {
        *sizes.entry(v).or_insert(0) += 1;
    }
    let removed = sizes.values().filter(|&&n| n < threshold).count();
    debug!("small_objects_remove: {} of {} objects removed", removed, sizes.len());
    let kept: Vec<u32> = values
        .iter()
        .map(|&v| if sizes.get(&v).is_some_and(|&n| n >= threshold) { v } else { 0 })
        .collect();
    let mut out = Image::from_vec(image.sizes(), kept)?;
    if dt != DataType::UInt32 {
        out.convert_in_place(dt)?;
    }
    out.set_pixel_size(image.pixel_size().clone());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_labels_with_mask() {
        let img = Image::from_vec(&[3, 2], vec![1u16, 1, 4, 0, 9, 4]).unwrap();
        let mask = Image::from_vec(&[3, 2], vec![false, false, true, true, false, false]).unwrap();
        assert_eq!(
            get_object_labels(&img, Some(&mask), Background::Exclude).unwrap(),
            vec![4]
        );
        assert_eq!(
            get_object_labels(&img, Some(&mask), Background::Include).unwrap(),
            vec![0, 4]
        );
        let small = Image::from_vec(&[2], vec![true, true]).unwrap();
        assert!(get_object_labels(&img, Some(&small), Background::Exclude).is_err());
        let float = Image::from_vec(&[2], vec![1.0f32, 2.0]).unwrap();
        assert!(get_object_labels(&float, None, Background::Exclude).is_err());
    }

    #[test]
    fn test_relabel_keeps_type() {
        let img = Image::from_vec(&[5], vec![30u8, 0, 7, 30, 12]).unwrap();
        let out = relabel(&img).unwrap();
        assert_eq!(out.data_type(), DataType::UInt8);
        assert_eq!(out.to_vec::<u8>().unwrap(), vec![1, 0, 2, 1, 3]);
    }

    #[test]
    fn test_small_objects_remove_label_image() {
        let img = Image::from_vec(&[6], vec![5u16, 0, 5, 3, 8, 8]).unwrap();
        let out = small_objects_remove(&img, 2, 1).unwrap();
        assert_eq!(out.data_type(), DataType::UInt16);
        assert_eq!(out.to_vec::<u16>().unwrap(), vec![5, 0, 5, 0, 8, 8]);
    }

    #[test]
    fn test_background_flag() {
        assert_eq!("include".parse::<Background>().unwrap(), Background::Include);
        assert!("all".parse::<Background>().is_err());
        assert_eq!(Background::default().to_string(), "exclude");
    }
}
