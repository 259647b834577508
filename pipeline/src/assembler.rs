//! Patches a pipeline template into a ready-to-train configuration.

use crate::{
    common::*,
    error::Error,
    zoo::ModelDescriptor,
};
use annotation::LabelVocabulary;
use prototext::{Document, Scalar};

/// File names inside the annotations directory, shared with the converter.
pub const LABEL_MAP_FILE: &str = "label_map.pbtxt";
pub const TRAIN_RECORD_FILE: &str = "train.record";
pub const EVAL_RECORD_FILE: &str = "eval.record";

pub const PIPELINE_CONFIG_FILE: &str = "pipeline.config";

/// Everything the assembler needs for one run.
#[derive(Debug, Clone)]
pub struct AssemblyParams {
    pub model: ModelDescriptor,
    /// Directory holding the label map and the two record files.
    pub annotations_dir: PathBuf,
    /// Training output directory; receives a copy of the final configuration.
    pub model_dir: PathBuf,
    /// Where the patched configuration is written.
    pub pipeline_config_path: PathBuf,
    /// Patched into `train_config.batch_size` when positive; otherwise the
    /// template's own value is kept.
    pub batch_size_override: Option<i64>,
}

impl AssemblyParams {
    pub fn label_map_path(&self) -> PathBuf {
        self.annotations_dir.join(LABEL_MAP_FILE)
    }

    pub fn train_record_path(&self) -> PathBuf {
        self.annotations_dir.join(TRAIN_RECORD_FILE)
    }

    pub fn eval_record_path(&self) -> PathBuf {
        self.annotations_dir.join(EVAL_RECORD_FILE)
    }
}

/// Assembles the training configuration and returns the patched document.
///
/// The model's template is copied to `pipeline_config_path` first unless a
/// file already exists there, so a hand-edited configuration survives
/// re-runs and only the fields below are rewritten. The patched text is
/// serialized back to the same path and copied into the model directory.
pub fn assemble(params: &AssemblyParams) -> Result<Document, Error> {
    let AssemblyParams {
        model,
        model_dir,
        pipeline_config_path,
        batch_size_override,
        ..
    } = params;

    copy_template_if_absent(&model.template_config_path, pipeline_config_path)?;

    let text = fs::read_to_string(pipeline_config_path).map_err(|source| Error::Io {
        path: pipeline_config_path.clone(),
        source,
    })?;
    let mut document = prototext::parse(&text).map_err(|source| Error::Parse {
        path: pipeline_config_path.clone(),
        source,
    })?;

    let num_classes = read_label_count(&params.label_map_path())?;
    debug!("patching for {} classes", num_classes);

    let arch = architecture_name(&document, pipeline_config_path)?;
    let resizer = ["model", arch.as_str(), "image_resizer", "fixed_shape_resizer"];
    if document.message_at(&resizer).is_none() {
        return Err(Error::Config {
            message: format!(
                "the template for '{}' does not use a fixed shape resizer",
                model.name
            ),
        });
    }

    let patch = |document: &mut Document, path: &[&str], scalar: Scalar| {
        document
            .set_scalar(path, scalar)
            .map_err(|source| Error::Patch { source })
    };

    patch(
        &mut document,
        &["model", &arch, "num_classes"],
        Scalar::Int(num_classes),
    )?;
    patch(
        &mut document,
        &["model", &arch, "image_resizer", "fixed_shape_resizer", "height"],
        Scalar::Int(model.height),
    )?;
    patch(
        &mut document,
        &["model", &arch, "image_resizer", "fixed_shape_resizer", "width"],
        Scalar::Int(model.width),
    )?;

    if let Some(batch_size) = batch_size_override.filter(|&size| size > 0) {
        patch(
            &mut document,
            &["train_config", "batch_size"],
            Scalar::Int(batch_size),
        )?;
    }

    patch(
        &mut document,
        &["train_config", "fine_tune_checkpoint"],
        Scalar::Str(model.checkpoint_path.display().to_string()),
    )?;
    patch(
        &mut document,
        &["train_config", "fine_tune_checkpoint_type"],
        Scalar::Str("detection".to_owned()),
    )?;

    let label_map = params.label_map_path().display().to_string();
    patch(
        &mut document,
        &["train_input_reader", "label_map_path"],
        Scalar::Str(label_map.clone()),
    )?;
    patch(
        &mut document,
        &["train_input_reader", "tf_record_input_reader", "input_path"],
        Scalar::Str(params.train_record_path().display().to_string()),
    )?;
    patch(
        &mut document,
        &["eval_input_reader", "label_map_path"],
        Scalar::Str(label_map),
    )?;
    patch(
        &mut document,
        &["eval_input_reader", "tf_record_input_reader", "input_path"],
        Scalar::Str(params.eval_record_path().display().to_string()),
    )?;

    write_text(pipeline_config_path, &document.to_string())?;

    let audit_copy = model_dir.join(
        pipeline_config_path
            .file_name()
            .unwrap_or_else(|| PIPELINE_CONFIG_FILE.as_ref()),
    );
    fs::copy(pipeline_config_path, &audit_copy).map_err(|source| Error::Io {
        path: audit_copy,
        source,
    })?;

    info!(
        "assembled '{}' for model '{}'",
        pipeline_config_path.display(),
        model.name
    );
    Ok(document)
}

fn copy_template_if_absent(template: &Path, target: &Path) -> Result<(), Error> {
    if target.exists() {
        debug!("reusing existing '{}'", target.display());
        return Ok(());
    }
    if !template.exists() {
        return Err(Error::Config {
            message: format!(
                "pipeline template '{}' does not exist; download and extract the \
                 pre-trained model first",
                template.display()
            ),
        });
    }
    fs::copy(template, target)
        .map_err(|source| Error::Io {
            path: target.to_owned(),
            source,
        })
        .map(|_| ())
}

/// Class count from a label map produced by the dataset conversion.
fn read_label_count(path: &Path) -> Result<i64, Error> {
    if !path.exists() {
        return Err(Error::Config {
            message: format!(
                "label map '{}' has not been generated yet; run the dataset \
                 conversion first",
                path.display()
            ),
        });
    }
    let text = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_owned(),
        source,
    })?;
    let document = prototext::parse(&text).map_err(|source| Error::Parse {
        path: path.to_owned(),
        source,
    })?;
    let vocabulary = LabelVocabulary::from_document(&document).map_err(|source| {
        Error::LabelMap {
            path: path.to_owned(),
            source,
        }
    })?;
    if vocabulary.is_empty() {
        return Err(Error::Config {
            message: format!("label map '{}' contains no classes", path.display()),
        });
    }
    Ok(vocabulary.len() as i64)
}

/// The architecture sub-message under `model`, whatever its name.
fn architecture_name(document: &Document, path: &Path) -> Result<String, Error> {
    let model = document.message("model").ok_or_else(|| Error::Config {
        message: format!("'{}' has no 'model' block", path.display()),
    })?;
    model
        .fields()
        .filter(|field| field.value.as_message().is_some())
        .map(|field| field.name.clone())
        .exactly_one()
        .map_err(|_| Error::Config {
            message: format!(
                "cannot locate the architecture block under 'model' in '{}'",
                path.display()
            ),
        })
}

fn write_text(path: &Path, text: &str) -> Result<(), Error> {
    let io_error = |source| Error::Io {
        path: path.to_owned(),
        source,
    };
    let tmp_path = tmp_sibling(path);
    fs::write(&tmp_path, text).map_err(io_error)?;
    fs::rename(&tmp_path, path).map_err(io_error)
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut file_name = path.file_name().map(OsString::from).unwrap_or_default();
    file_name.push(".tmp");
    path.with_file_name(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zoo::resolve_model;

    const TEMPLATE: &str = r#"
        model {
          ssd {
            num_classes: 90
            image_resizer {
              fixed_shape_resizer {
                height: 640
                width: 640
              }
            }
            box_predictor {
              weight_shared_convolutional_box_predictor {
                depth: 256
              }
            }
          }
        }
        train_config {
          batch_size: 16
          fine_tune_checkpoint: "PATH_TO_BE_CONFIGURED"
          fine_tune_checkpoint_type: "classification"
          num_steps: 50000
        }
        train_input_reader {
          label_map_path: "PATH_TO_BE_CONFIGURED"
          tf_record_input_reader {
            input_path: "PATH_TO_BE_CONFIGURED"
          }
        }
        eval_config {
          metrics_set: "coco_detection_metrics"
        }
        eval_input_reader {
          label_map_path: "PATH_TO_BE_CONFIGURED"
          shuffle: false
          tf_record_input_reader {
            input_path: "PATH_TO_BE_CONFIGURED"
          }
        }
    "#;

    const MODEL_NAME: &str = "SSD MobileNet v2 320x320";
    const MODEL_DIR_NAME: &str = "ssd_mobilenet_v2_320x320_coco17_tpu-8";

    struct Workspace {
        _root: tempfile::TempDir,
        params: AssemblyParams,
    }

    fn workspace() -> Workspace {
        let root = tempfile::tempdir().unwrap();
        let pre_trained_dir = root.path().join("pre-trained-models");
        let template_dir = pre_trained_dir.join(MODEL_DIR_NAME);
        fs::create_dir_all(&template_dir).unwrap();
        fs::write(template_dir.join(PIPELINE_CONFIG_FILE), TEMPLATE).unwrap();

        let annotations_dir = root.path().join("annotations");
        fs::create_dir_all(&annotations_dir).unwrap();
        let mut vocabulary = LabelVocabulary::new();
        for class_name in ["cat", "dog", "bird"] {
            vocabulary.register(class_name);
        }
        fs::write(
            annotations_dir.join(LABEL_MAP_FILE),
            vocabulary.to_document().to_string(),
        )
        .unwrap();

        let model_dir = root.path().join("trained-model");
        fs::create_dir_all(&model_dir).unwrap();

        let params = AssemblyParams {
            model: resolve_model(MODEL_NAME, &pre_trained_dir).unwrap(),
            annotations_dir,
            model_dir,
            pipeline_config_path: root.path().join(PIPELINE_CONFIG_FILE),
            batch_size_override: None,
        };
        Workspace {
            _root: root,
            params,
        }
    }

    fn int_at(document: &Document, path: &[&str]) -> i64 {
        document.scalar_at(path).and_then(Scalar::as_int).unwrap()
    }

    fn str_at<'a>(document: &'a Document, path: &[&str]) -> &'a str {
        document.scalar_at(path).and_then(Scalar::as_str).unwrap()
    }

    #[test]
    fn assembles_a_complete_configuration() {
        let workspace = workspace();
        let params = &workspace.params;
        let document = assemble(params).unwrap();

        assert_eq!(int_at(&document, &["model", "ssd", "num_classes"]), 3);
        assert_eq!(
            int_at(
                &document,
                &["model", "ssd", "image_resizer", "fixed_shape_resizer", "height"]
            ),
            300
        );
        assert_eq!(
            int_at(
                &document,
                &["model", "ssd", "image_resizer", "fixed_shape_resizer", "width"]
            ),
            300
        );
        assert_eq!(int_at(&document, &["train_config", "batch_size"]), 16);
        assert_eq!(
            str_at(&document, &["train_config", "fine_tune_checkpoint"]),
            params.model.checkpoint_path.display().to_string()
        );
        assert_eq!(
            str_at(&document, &["train_config", "fine_tune_checkpoint_type"]),
            "detection"
        );

        let label_map = params.label_map_path().display().to_string();
        for reader in ["train_input_reader", "eval_input_reader"] {
            assert_eq!(str_at(&document, &[reader, "label_map_path"]), label_map);
        }
        assert_eq!(
            str_at(
                &document,
                &["train_input_reader", "tf_record_input_reader", "input_path"]
            ),
            params.train_record_path().display().to_string()
        );
        assert_eq!(
            str_at(
                &document,
                &["eval_input_reader", "tf_record_input_reader", "input_path"]
            ),
            params.eval_record_path().display().to_string()
        );

        // untouched template fields survive
        assert_eq!(int_at(&document, &["train_config", "num_steps"]), 50000);

        let written = fs::read_to_string(&params.pipeline_config_path).unwrap();
        let audit = fs::read_to_string(
            params.model_dir.join(PIPELINE_CONFIG_FILE),
        )
        .unwrap();
        assert_eq!(written, document.to_string());
        assert_eq!(written, audit);
    }

    #[test]
    fn assembly_is_idempotent() {
        let workspace = workspace();
        assemble(&workspace.params).unwrap();
        let first = fs::read_to_string(&workspace.params.pipeline_config_path).unwrap();
        assemble(&workspace.params).unwrap();
        let second = fs::read_to_string(&workspace.params.pipeline_config_path).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn positive_override_patches_the_batch_size() {
        let mut workspace = workspace();
        workspace.params.batch_size_override = Some(24);
        let document = assemble(&workspace.params).unwrap();
        assert_eq!(int_at(&document, &["train_config", "batch_size"]), 24);
    }

    #[test]
    fn zero_override_keeps_the_template_batch_size() {
        let mut workspace = workspace();
        workspace.params.batch_size_override = Some(0);
        let document = assemble(&workspace.params).unwrap();
        assert_eq!(int_at(&document, &["train_config", "batch_size"]), 16);
    }

    #[test]
    fn existing_target_survives_the_copy_step() {
        let workspace = workspace();
        let edited = TEMPLATE.replace("batch_size: 16", "batch_size: 64");
        fs::write(&workspace.params.pipeline_config_path, edited).unwrap();

        let document = assemble(&workspace.params).unwrap();
        assert_eq!(int_at(&document, &["train_config", "batch_size"]), 64);
    }

    #[test]
    fn missing_label_map_is_a_config_error() {
        let workspace = workspace();
        fs::remove_file(workspace.params.label_map_path()).unwrap();

        let err = assemble(&workspace.params).unwrap_err();
        match err {
            Error::Config { message } => {
                assert!(message.contains("has not been generated"), "{}", message)
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn missing_template_is_a_config_error() {
        let workspace = workspace();
        fs::remove_file(&workspace.params.model.template_config_path).unwrap();

        let err = assemble(&workspace.params).unwrap_err();
        match err {
            Error::Config { message } => assert!(message.contains("template")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn rejects_a_template_without_a_fixed_shape_resizer() {
        let workspace = workspace();
        let edited = TEMPLATE.replace("fixed_shape_resizer", "keep_aspect_ratio_resizer");
        fs::write(&workspace.params.model.template_config_path, edited).unwrap();

        let err = assemble(&workspace.params).unwrap_err();
        match err {
            Error::Config { message } => {
                assert!(message.contains("fixed shape resizer"), "{}", message)
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn patches_the_first_of_repeated_eval_readers() {
        let workspace = workspace();
        let second_reader = r#"
            eval_input_reader {
              label_map_path: "holdout.pbtxt"
              tf_record_input_reader {
                input_path: "holdout.record"
              }
            }
        "#;
        let mut edited = TEMPLATE.to_owned();
        edited.push_str(second_reader);
        fs::write(&workspace.params.model.template_config_path, edited).unwrap();

        let document = assemble(&workspace.params).unwrap();
        let readers: Vec<_> = document.messages("eval_input_reader").collect();
        assert_eq!(readers.len(), 2);
        assert_eq!(
            readers[0].scalar("label_map_path").and_then(Scalar::as_str),
            Some(
                workspace
                    .params
                    .label_map_path()
                    .display()
                    .to_string()
                    .as_str()
            )
        );
        assert_eq!(
            readers[1].scalar("label_map_path").and_then(Scalar::as_str),
            Some("holdout.pbtxt")
        );
    }
}
