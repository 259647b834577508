use crate::{common::*, error::Error};
use annotation::{Annotation, LabelVocabulary};

/// Feature keys of one serialized example. These names are the contract
/// with the downstream training framework and must not change.
pub const HEIGHT: &str = "image/height";
pub const WIDTH: &str = "image/width";
pub const FILENAME: &str = "image/filename";
pub const SOURCE_ID: &str = "image/source_id";
pub const ENCODED: &str = "image/encoded";
pub const FORMAT: &str = "image/format";
pub const BBOX_XMIN: &str = "image/object/bbox/xmin";
pub const BBOX_XMAX: &str = "image/object/bbox/xmax";
pub const BBOX_YMIN: &str = "image/object/bbox/ymin";
pub const BBOX_YMAX: &str = "image/object/bbox/ymax";
pub const CLASS_TEXT: &str = "image/object/class/text";
pub const CLASS_LABEL: &str = "image/object/class/label";

/// The format tag stored in every example.
pub const IMAGE_FORMAT: &str = "jpg";

/// One box of a [TrainingExample], coordinates normalized to `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedBox {
    pub xmin: f32,
    pub xmax: f32,
    pub ymin: f32,
    pub ymax: f32,
    pub class_name: String,
    pub class_id: i64,
}

/// One image worth of training data; every box of the image collapses into
/// the repeated fields of a single example.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingExample {
    pub filename: String,
    pub width: u32,
    pub height: u32,
    pub encoded: Vec<u8>,
    pub format: String,
    pub boxes: Vec<EncodedBox>,
}

/// Encodes one annotation: loads the image bytes, re-derives the dimensions
/// from them, normalizes the boxes, and resolves class ids through the
/// shared vocabulary (registering names on first encounter).
///
/// The probed dimensions must agree with the annotated ones; a disagreement
/// means the boxes were drawn against different dimensions and the
/// normalized output would be wrong either way.
pub fn encode_annotation(
    image_dir: impl AsRef<Path>,
    annotation: &Annotation,
    vocabulary: &mut LabelVocabulary,
) -> Result<TrainingExample, Error> {
    let image_path = image_dir.as_ref().join(annotation.filename());
    debug!("encoding '{}'", image_path.display());

    let encoded = fs::read(&image_path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => Error::MissingImage {
            path: image_path.clone(),
        },
        _ => Error::Io {
            path: image_path.clone(),
            source,
        },
    })?;

    let probed = imagesize::blob_size(&encoded).map_err(|err| Error::CorruptImage {
        path: image_path.clone(),
        message: err.to_string(),
    })?;
    let width = probed.width as u32;
    let height = probed.height as u32;
    if (width, height) != (annotation.width(), annotation.height()) {
        return Err(Error::DimensionMismatch {
            path: image_path,
            probed_width: width,
            probed_height: height,
            annotated_width: annotation.width(),
            annotated_height: annotation.height(),
        });
    }

    let boxes = annotation
        .boxes()
        .iter()
        .map(|bbox| {
            let class_id = vocabulary.register(bbox.class_name()) as i64;
            EncodedBox {
                xmin: bbox.xmin() as f32 / width as f32,
                xmax: bbox.xmax() as f32 / width as f32,
                ymin: bbox.ymin() as f32 / height as f32,
                ymax: bbox.ymax() as f32 / height as f32,
                class_name: bbox.class_name().to_owned(),
                class_id,
            }
        })
        .collect();

    Ok(TrainingExample {
        filename: annotation.filename().to_owned(),
        width,
        height,
        encoded,
        format: IMAGE_FORMAT.to_owned(),
        boxes,
    })
}

impl TrainingExample {
    /// The container-level feature map.
    pub fn to_example(&self) -> Example {
        let features = vec![
            (
                HEIGHT.to_owned(),
                Feature::Int64List(vec![self.height as i64]),
            ),
            (
                WIDTH.to_owned(),
                Feature::Int64List(vec![self.width as i64]),
            ),
            (
                FILENAME.to_owned(),
                Feature::BytesList(vec![self.filename.clone().into_bytes()]),
            ),
            (
                SOURCE_ID.to_owned(),
                Feature::BytesList(vec![self.filename.clone().into_bytes()]),
            ),
            (
                ENCODED.to_owned(),
                Feature::BytesList(vec![self.encoded.clone()]),
            ),
            (
                FORMAT.to_owned(),
                Feature::BytesList(vec![self.format.clone().into_bytes()]),
            ),
            (
                BBOX_XMIN.to_owned(),
                Feature::FloatList(self.boxes.iter().map(|bbox| bbox.xmin).collect()),
            ),
            (
                BBOX_XMAX.to_owned(),
                Feature::FloatList(self.boxes.iter().map(|bbox| bbox.xmax).collect()),
            ),
            (
                BBOX_YMIN.to_owned(),
                Feature::FloatList(self.boxes.iter().map(|bbox| bbox.ymin).collect()),
            ),
            (
                BBOX_YMAX.to_owned(),
                Feature::FloatList(self.boxes.iter().map(|bbox| bbox.ymax).collect()),
            ),
            (
                CLASS_TEXT.to_owned(),
                Feature::BytesList(
                    self.boxes
                        .iter()
                        .map(|bbox| bbox.class_name.clone().into_bytes())
                        .collect(),
                ),
            ),
            (
                CLASS_LABEL.to_owned(),
                Feature::Int64List(self.boxes.iter().map(|bbox| bbox.class_id).collect()),
            ),
        ];
        features.into_iter().collect()
    }

    /// Rebuilds the typed example from a container feature map.
    pub fn from_example(example: &Example) -> Result<Self, Error> {
        let height = u32::try_from(single_i64(example, HEIGHT)?).map_err(|_| malformed(HEIGHT))?;
        let width = u32::try_from(single_i64(example, WIDTH)?).map_err(|_| malformed(WIDTH))?;
        let filename = String::from_utf8(single_bytes(example, FILENAME)?)
            .map_err(|_| malformed(FILENAME))?;
        let encoded = single_bytes(example, ENCODED)?;
        let format =
            String::from_utf8(single_bytes(example, FORMAT)?).map_err(|_| malformed(FORMAT))?;

        let xmins = float_list(example, BBOX_XMIN)?;
        let xmaxs = float_list(example, BBOX_XMAX)?;
        let ymins = float_list(example, BBOX_YMIN)?;
        let ymaxs = float_list(example, BBOX_YMAX)?;
        let class_names = bytes_list(example, CLASS_TEXT)?;
        let class_ids = int64_list(example, CLASS_LABEL)?;

        let len = xmins.len();
        if [
            xmaxs.len(),
            ymins.len(),
            ymaxs.len(),
            class_names.len(),
            class_ids.len(),
        ]
        .iter()
        .any(|&other| other != len)
        {
            return Err(Error::MalformedExample {
                message: "box feature lists have mismatched lengths".into(),
            });
        }

        let boxes = izip!(xmins, xmaxs, ymins, ymaxs, class_names, class_ids)
            .map(|(&xmin, &xmax, &ymin, &ymax, class_name, &class_id)| {
                let class_name = String::from_utf8(class_name.clone())
                    .map_err(|_| malformed(CLASS_TEXT))?;
                Ok::<_, Error>(EncodedBox {
                    xmin,
                    xmax,
                    ymin,
                    ymax,
                    class_name,
                    class_id,
                })
            })
            .try_collect()?;

        Ok(Self {
            filename,
            width,
            height,
            encoded,
            format,
            boxes,
        })
    }
}

fn malformed(key: &str) -> Error {
    Error::MalformedExample {
        message: format!("feature '{}' has an unusable value", key),
    }
}

fn feature<'a>(example: &'a Example, key: &str) -> Result<&'a Feature, Error> {
    example.get(key).ok_or_else(|| Error::MalformedExample {
        message: format!("feature '{}' is missing", key),
    })
}

fn bytes_list<'a>(example: &'a Example, key: &str) -> Result<&'a [Vec<u8>], Error> {
    match feature(example, key)? {
        Feature::BytesList(values) => Ok(values),
        _ => Err(Error::MalformedExample {
            message: format!("feature '{}' is not a bytes list", key),
        }),
    }
}

fn float_list<'a>(example: &'a Example, key: &str) -> Result<&'a [f32], Error> {
    match feature(example, key)? {
        Feature::FloatList(values) => Ok(values),
        _ => Err(Error::MalformedExample {
            message: format!("feature '{}' is not a float list", key),
        }),
    }
}

fn int64_list<'a>(example: &'a Example, key: &str) -> Result<&'a [i64], Error> {
    match feature(example, key)? {
        Feature::Int64List(values) => Ok(values),
        _ => Err(Error::MalformedExample {
            message: format!("feature '{}' is not an int64 list", key),
        }),
    }
}

fn single_i64(example: &Example, key: &str) -> Result<i64, Error> {
    int64_list(example, key)?
        .first()
        .copied()
        .ok_or_else(|| malformed(key))
}

fn single_bytes(example: &Example, key: &str) -> Result<Vec<u8>, Error> {
    bytes_list(example, key)?
        .first()
        .cloned()
        .ok_or_else(|| malformed(key))
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// A syntactically minimal JPEG: start-of-image, one SOF0 segment
    /// carrying the dimensions, end-of-image. Enough for header probing;
    /// not decodable pixel data.
    pub fn tiny_jpeg(width: u16, height: u16) -> Vec<u8> {
        let [w_hi, w_lo] = width.to_be_bytes();
        let [h_hi, h_lo] = height.to_be_bytes();
        vec![
            0xFF, 0xD8, // SOI
            0xFF, 0xC0, // SOF0
            0x00, 0x0B, // segment length
            0x08, // precision
            h_hi, h_lo, w_hi, w_lo, // dimensions, height first
            0x01, // one component
            0x01, 0x11, 0x00, // component spec
            0xFF, 0xD9, // EOI
        ]
    }
}
