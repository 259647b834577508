//! Catalog of supported pre-trained detection models.

use crate::{common::*, error::Error};

/// A known pre-trained model from the TF2 detection zoo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelEntry {
    /// Human-facing name, also the `--model` argument.
    pub name: &'static str,
    /// Directory name of the extracted pre-trained archive.
    pub dir_name: &'static str,
    /// Input height expected by the fixed shape resizer.
    pub height: i64,
    /// Input width expected by the fixed shape resizer.
    pub width: i64,
    /// Batch size the model was tuned for on a single consumer GPU.
    pub batch_size: i64,
}

/// Models whose shipped pipeline templates use a fixed shape resizer.
pub const MODEL_ZOO: &[ModelEntry] = &[
    ModelEntry {
        name: "SSD MobileNet v2 320x320",
        dir_name: "ssd_mobilenet_v2_320x320_coco17_tpu-8",
        height: 300,
        width: 300,
        batch_size: 12,
    },
    ModelEntry {
        name: "SSD MobileNet V1 FPN 640x640",
        dir_name: "ssd_mobilenet_v1_fpn_640x640_coco17_tpu-8",
        height: 640,
        width: 640,
        batch_size: 8,
    },
    ModelEntry {
        name: "SSD MobileNet V2 FPNLite 320x320",
        dir_name: "ssd_mobilenet_v2_fpnlite_320x320_coco17_tpu-8",
        height: 320,
        width: 320,
        batch_size: 12,
    },
    ModelEntry {
        name: "SSD MobileNet V2 FPNLite 640x640",
        dir_name: "ssd_mobilenet_v2_fpnlite_640x640_coco17_tpu-8",
        height: 640,
        width: 640,
        batch_size: 8,
    },
    ModelEntry {
        name: "SSD ResNet50 V1 FPN 640x640 (RetinaNet50)",
        dir_name: "ssd_resnet50_v1_fpn_640x640_coco17_tpu-8",
        height: 640,
        width: 640,
        batch_size: 8,
    },
    ModelEntry {
        name: "SSD ResNet101 V1 FPN 640x640 (RetinaNet101)",
        dir_name: "ssd_resnet101_v1_fpn_640x640_coco17_tpu-8",
        height: 640,
        width: 640,
        batch_size: 8,
    },
];

/// A catalog entry resolved against a local pre-trained models directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDescriptor {
    pub name: String,
    pub height: i64,
    pub width: i64,
    pub batch_size: i64,
    /// Checkpoint prefix passed to `fine_tune_checkpoint`.
    pub checkpoint_path: PathBuf,
    /// Pipeline template shipped inside the pre-trained archive.
    pub template_config_path: PathBuf,
}

pub fn model_names() -> impl Iterator<Item = &'static str> {
    MODEL_ZOO.iter().map(|entry| entry.name)
}

pub fn find_model(name: &str) -> Option<&'static ModelEntry> {
    MODEL_ZOO.iter().find(|entry| entry.name == name)
}

/// Looks `name` up in the catalog and resolves its on-disk paths under
/// `pre_trained_dir`.
pub fn resolve_model(
    name: &str,
    pre_trained_dir: impl AsRef<Path>,
) -> Result<ModelDescriptor, Error> {
    let pre_trained_dir = pre_trained_dir.as_ref();
    let entry = find_model(name).ok_or_else(|| Error::UnknownModel {
        name: name.to_owned(),
        known: model_names().join(", "),
    })?;
    let model_dir = pre_trained_dir.join(entry.dir_name);

    Ok(ModelDescriptor {
        name: entry.name.to_owned(),
        height: entry.height,
        width: entry.width,
        batch_size: entry.batch_size,
        checkpoint_path: model_dir.join("checkpoint").join("ckpt-0"),
        template_config_path: model_dir.join("pipeline.config"),
    })
}
