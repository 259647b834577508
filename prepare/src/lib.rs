//! The preparation program for object detection training: converts a Pascal
//! VOC-style dataset into record files plus a label map and assembles the
//! training pipeline configuration from a pre-trained model's template.

pub mod common;
pub mod run;
