use crate::{
    common::*,
    csv::write_csv_dump,
    error::Error,
    example::{encode_annotation, TrainingExample},
    writer::{write_label_map, write_record_file},
};
use annotation::{load_annotation_dir, LabelVocabulary};

/// One split's conversion: where its annotated images live and which output
/// files to produce. The label map and the CSV dump are optional because a
/// run emits the label map once for all splits, not once per split.
#[derive(Debug, Clone)]
pub struct SplitConversion {
    pub image_dir: PathBuf,
    pub record_path: PathBuf,
    pub label_map_path: Option<PathBuf>,
    pub csv_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitSummary {
    pub images: usize,
    pub boxes: usize,
    pub classes: usize,
}

impl SplitConversion {
    /// Parses, encodes, and writes one split. Any failure aborts the split
    /// with nothing renamed into place.
    pub fn run(&self, vocabulary: &mut LabelVocabulary) -> Result<SplitSummary, Error> {
        info!("converting annotations under '{}'", self.image_dir.display());

        let annotations = load_annotation_dir(&self.image_dir)?;
        let examples: Vec<TrainingExample> = annotations
            .iter()
            .map(|annotation| encode_annotation(&self.image_dir, annotation, vocabulary))
            .try_collect()?;

        write_record_file(&self.record_path, &examples)?;
        info!(
            "wrote {} examples to '{}'",
            examples.len(),
            self.record_path.display()
        );

        if let Some(label_map_path) = &self.label_map_path {
            write_label_map(label_map_path, vocabulary)?;
            info!(
                "wrote label map with {} classes to '{}'",
                vocabulary.len(),
                label_map_path.display()
            );
        }

        if let Some(csv_path) = &self.csv_path {
            write_csv_dump(csv_path, &annotations)?;
            info!("wrote csv dump to '{}'", csv_path.display());
        }

        Ok(SplitSummary {
            images: examples.len(),
            boxes: annotations
                .iter()
                .map(|annotation| annotation.boxes().len())
                .sum(),
            classes: vocabulary.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{example::fixtures::tiny_jpeg, writer::read_record_file};

    fn write_split(dir: &Path, name: &str, class: &str) {
        let xml = format!(
            r#"<annotation>
  <filename>{name}.jpg</filename>
  <size><width>64</width><height>64</height></size>
  <object>
    <name>{class}</name>
    <bndbox><xmin>0</xmin><ymin>0</ymin><xmax>32</xmax><ymax>32</ymax></bndbox>
  </object>
</annotation>"#,
            name = name,
            class = class,
        );
        fs::write(dir.join(format!("{}.xml", name)), xml).unwrap();
        fs::write(dir.join(format!("{}.jpg", name)), tiny_jpeg(64, 64)).unwrap();
    }

    #[test]
    fn converts_a_whole_split() {
        let tmp = tempfile::tempdir().unwrap();
        let image_dir = tmp.path().join("train");
        fs::create_dir(&image_dir).unwrap();
        write_split(&image_dir, "b", "dog");
        write_split(&image_dir, "a", "cat");

        let conversion = SplitConversion {
            image_dir,
            record_path: tmp.path().join("train.record"),
            label_map_path: Some(tmp.path().join("label_map.pbtxt")),
            csv_path: Some(tmp.path().join("train.csv")),
        };

        let mut vocabulary = LabelVocabulary::new();
        let summary = conversion.run(&mut vocabulary).unwrap();
        assert_eq!(
            summary,
            SplitSummary {
                images: 2,
                boxes: 2,
                classes: 2,
            }
        );

        // sorted filename order drives both the record order and the ids
        let examples = read_record_file(&conversion.record_path).unwrap();
        assert_eq!(examples[0].filename, "a.jpg");
        assert_eq!(examples[1].filename, "b.jpg");
        assert_eq!(vocabulary.id_of("cat"), Some(1));
        assert_eq!(vocabulary.id_of("dog"), Some(2));

        let label_map = fs::read_to_string(tmp.path().join("label_map.pbtxt")).unwrap();
        assert!(label_map.contains("name: \"cat\""));
        let csv_text = fs::read_to_string(tmp.path().join("train.csv")).unwrap();
        assert_eq!(csv_text.lines().count(), 3); // header + two rows
    }

    #[test]
    fn eval_split_extends_the_train_vocabulary() {
        let tmp = tempfile::tempdir().unwrap();
        let train_dir = tmp.path().join("train");
        let eval_dir = tmp.path().join("eval");
        fs::create_dir(&train_dir).unwrap();
        fs::create_dir(&eval_dir).unwrap();
        write_split(&train_dir, "a", "cat");
        write_split(&eval_dir, "z", "zebra");

        let mut vocabulary = LabelVocabulary::new();
        SplitConversion {
            image_dir: train_dir,
            record_path: tmp.path().join("train.record"),
            label_map_path: None,
            csv_path: None,
        }
        .run(&mut vocabulary)
        .unwrap();
        SplitConversion {
            image_dir: eval_dir,
            record_path: tmp.path().join("eval.record"),
            label_map_path: None,
            csv_path: None,
        }
        .run(&mut vocabulary)
        .unwrap();

        // the eval-only class gets the next id, not a restarted numbering
        assert_eq!(vocabulary.id_of("cat"), Some(1));
        assert_eq!(vocabulary.id_of("zebra"), Some(2));

        let eval = read_record_file(tmp.path().join("eval.record")).unwrap();
        assert_eq!(eval[0].boxes[0].class_id, 2);
    }

    #[test]
    fn missing_image_aborts_without_output() {
        let tmp = tempfile::tempdir().unwrap();
        let image_dir = tmp.path().join("train");
        fs::create_dir(&image_dir).unwrap();
        write_split(&image_dir, "a", "cat");
        fs::remove_file(image_dir.join("a.jpg")).unwrap();

        let conversion = SplitConversion {
            image_dir,
            record_path: tmp.path().join("train.record"),
            label_map_path: None,
            csv_path: None,
        };

        let mut vocabulary = LabelVocabulary::new();
        let err = conversion.run(&mut vocabulary).unwrap_err();
        assert!(matches!(err, Error::MissingImage { .. }));
        assert!(!conversion.record_path.exists());
    }

    #[test]
    fn empty_directory_aborts() {
        let tmp = tempfile::tempdir().unwrap();
        let image_dir = tmp.path().join("train");
        fs::create_dir(&image_dir).unwrap();

        let conversion = SplitConversion {
            image_dir,
            record_path: tmp.path().join("train.record"),
            label_map_path: None,
            csv_path: None,
        };

        let mut vocabulary = LabelVocabulary::new();
        let err = conversion.run(&mut vocabulary).unwrap_err();
        assert!(matches!(
            err,
            Error::Annotation(annotation::Error::NoAnnotations { .. })
        ));
    }
}
