use anyhow::Result;
use prepare::run::{
    assemble_pipeline, convert_dataset, prepare_all, AssembleOptions, Environment,
};
use prettytable::{cell, row, Table};
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, Clone, StructOpt)]
struct EnvArgs {
    #[structopt(long, default_value = "images/train")]
    /// directory containing the train images and their labeling xml
    train_images_dir: PathBuf,
    #[structopt(long, default_value = "images/eval")]
    /// directory containing the evaluation images and their labeling xml
    eval_images_dir: PathBuf,
    #[structopt(long, default_value = "annotations")]
    /// output directory for the record files and the label map
    annotations_dir: PathBuf,
    #[structopt(long, default_value = "trained-model")]
    /// output directory for checkpoints and training artifacts
    model_dir: PathBuf,
}

#[derive(Debug, Clone, StructOpt)]
struct ModelArgs {
    #[structopt(long, default_value = "SSD ResNet50 V1 FPN 640x640 (RetinaNet50)")]
    /// type of the base model, as listed by the models command
    model_type: String,
    #[structopt(long, default_value = "pre-trained-models")]
    /// directory of the extracted pre-trained models
    pre_trained_dir: PathBuf,
    #[structopt(long)]
    /// target path of the patched pipeline configuration
    /// [default: <annotations-dir>/pipeline.config]
    pipeline_config: Option<PathBuf>,
    #[structopt(long, default_value = "0")]
    /// batch size; if < 1 the value from the pipeline template is kept
    batch_size: i64,
}

#[derive(Debug, Clone, StructOpt)]
/// Prepare a Pascal VOC-style dataset for object detection training
enum Opts {
    /// Create the record files and the label map from the annotated images
    Convert {
        #[structopt(flatten)]
        env: EnvArgs,
        #[structopt(long)]
        /// also write a per-split csv dump of the parsed annotations
        csv_dump: bool,
    },
    /// Assemble the pipeline configuration from the base model's template
    Assemble {
        #[structopt(flatten)]
        env: EnvArgs,
        #[structopt(flatten)]
        model: ModelArgs,
    },
    /// Run the whole preparation: conversion followed by assembly
    Prepare {
        #[structopt(flatten)]
        env: EnvArgs,
        #[structopt(flatten)]
        model: ModelArgs,
        #[structopt(long)]
        /// also write a per-split csv dump of the parsed annotations
        csv_dump: bool,
    },
    /// List the supported pre-trained base models
    Models,
}

impl EnvArgs {
    fn into_environment(self) -> Environment {
        let Self {
            train_images_dir,
            eval_images_dir,
            annotations_dir,
            model_dir,
        } = self;
        Environment {
            train_images_dir,
            eval_images_dir,
            annotations_dir,
            model_dir,
        }
    }
}

impl ModelArgs {
    fn into_options(self) -> AssembleOptions {
        let Self {
            model_type,
            pre_trained_dir,
            pipeline_config,
            batch_size,
        } = self;
        AssembleOptions {
            model: model_type,
            pre_trained_dir,
            pipeline_config_path: pipeline_config,
            batch_size,
        }
    }
}

fn main() -> Result<()> {
    pretty_env_logger::init();

    match Opts::from_args() {
        Opts::Convert { env, csv_dump } => {
            let environment = env.into_environment();
            environment.init()?;
            convert_dataset(&environment, csv_dump)?;
        }
        Opts::Assemble { env, model } => {
            assemble_pipeline(&env.into_environment(), &model.into_options())?;
        }
        Opts::Prepare {
            env,
            model,
            csv_dump,
        } => {
            prepare_all(&env.into_environment(), &model.into_options(), csv_dump)?;
        }
        Opts::Models => {
            list_models();
        }
    }

    Ok(())
}

fn list_models() {
    let mut table = Table::new();
    table.add_row(row!["model type", "input", "batch size", "archive directory"]);
    pipeline::MODEL_ZOO.iter().for_each(|entry| {
        table.add_row(row![
            entry.name,
            format!("{}x{}", entry.width, entry.height),
            entry.batch_size,
            entry.dir_name,
        ]);
    });
    table.printstd();
}
