//! The preparation steps: environment checks, dataset conversion, and
//! pipeline assembly.

use crate::common::*;
use annotation::LabelVocabulary;
use pipeline::{
    assemble, resolve_model, AssemblyParams, EVAL_RECORD_FILE, LABEL_MAP_FILE,
    PIPELINE_CONFIG_FILE, TRAIN_RECORD_FILE,
};
use record::SplitConversion;

/// Directory layout of one preparation run.
#[derive(Debug, Clone)]
pub struct Environment {
    pub train_images_dir: PathBuf,
    pub eval_images_dir: PathBuf,
    pub annotations_dir: PathBuf,
    pub model_dir: PathBuf,
}

impl Environment {
    /// Verifies the image directories and creates the output directories.
    pub fn init(&self) -> Result<()> {
        ensure!(
            self.train_images_dir.is_dir(),
            "the train images dir '{}' does not exist",
            self.train_images_dir.display()
        );
        ensure!(
            self.eval_images_dir.is_dir(),
            "the evaluation images dir '{}' does not exist",
            self.eval_images_dir.display()
        );
        for dir in [&self.annotations_dir, &self.model_dir] {
            fs::create_dir_all(dir)
                .with_context(|| format!("cannot create '{}'", dir.display()))?;
        }
        Ok(())
    }

    pub fn label_map_path(&self) -> PathBuf {
        self.annotations_dir.join(LABEL_MAP_FILE)
    }
}

/// Converts both splits into record files with one shared vocabulary, then
/// writes the label map and copies it into the model directory.
///
/// The label map is emitted after both splits so classes that only appear
/// in the evaluation images still get an id.
pub fn convert_dataset(environment: &Environment, csv_dump: bool) -> Result<LabelVocabulary> {
    let mut vocabulary = LabelVocabulary::new();
    let splits = [
        (
            "train",
            &environment.train_images_dir,
            TRAIN_RECORD_FILE,
            "train.csv",
        ),
        (
            "eval",
            &environment.eval_images_dir,
            EVAL_RECORD_FILE,
            "eval.csv",
        ),
    ];

    for (split, image_dir, record_file, csv_file) in splits {
        info!("creating the record for the {} images", split);
        let conversion = SplitConversion {
            image_dir: image_dir.clone(),
            record_path: environment.annotations_dir.join(record_file),
            label_map_path: None,
            csv_path: csv_dump.then(|| environment.annotations_dir.join(csv_file)),
        };
        let summary = conversion
            .run(&mut vocabulary)
            .with_context(|| format!("cannot convert the {} split", split))?;
        info!(
            "{} split: {} images, {} boxes, {} classes registered so far",
            split, summary.images, summary.boxes, summary.classes
        );
    }

    let label_map_path = environment.label_map_path();
    record::write_label_map(&label_map_path, &vocabulary)?;
    info!(
        "wrote the label map with {} classes to '{}'",
        vocabulary.len(),
        label_map_path.display()
    );

    let audit_copy = environment.model_dir.join(LABEL_MAP_FILE);
    fs::copy(&label_map_path, &audit_copy)
        .with_context(|| format!("cannot copy the label map to '{}'", audit_copy.display()))?;
    info!("the label map was copied to '{}'", audit_copy.display());

    Ok(vocabulary)
}

/// Model choice and batch override for the assembly step.
#[derive(Debug, Clone)]
pub struct AssembleOptions {
    pub model: String,
    pub pre_trained_dir: PathBuf,
    /// Defaults to `pipeline.config` inside the annotations directory.
    pub pipeline_config_path: Option<PathBuf>,
    /// Values below 1 keep the template's batch size.
    pub batch_size: i64,
}

pub fn assemble_pipeline(
    environment: &Environment,
    options: &AssembleOptions,
) -> Result<()> {
    let model = resolve_model(&options.model, &options.pre_trained_dir)?;
    fs::create_dir_all(&environment.model_dir)
        .with_context(|| format!("cannot create '{}'", environment.model_dir.display()))?;

    let params = AssemblyParams {
        model,
        annotations_dir: environment.annotations_dir.clone(),
        model_dir: environment.model_dir.clone(),
        pipeline_config_path: options.pipeline_config_path.clone().unwrap_or_else(|| {
            environment.annotations_dir.join(PIPELINE_CONFIG_FILE)
        }),
        batch_size_override: (options.batch_size > 0).then(|| options.batch_size),
    };
    assemble(&params)?;
    Ok(())
}

/// The whole preparation: environment init, conversion, assembly.
pub fn prepare_all(
    environment: &Environment,
    options: &AssembleOptions,
    csv_dump: bool,
) -> Result<()> {
    environment.init()?;
    convert_dataset(environment, csv_dump)?;
    assemble_pipeline(environment, options)?;
    info!("the dataset and the pipeline configuration are ready for training");
    Ok(())
}
