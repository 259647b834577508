use crate::{common::*, error::Error, example::TrainingExample};
use annotation::LabelVocabulary;

/// Serializes the examples to `path` in input order.
///
/// The file is written to a temporary sibling first and renamed into place
/// only after re-reading it with integrity checks and matching the example
/// count, so a failed conversion never leaves a usable-looking partial file
/// at the destination.
pub fn write_record_file(
    path: impl AsRef<Path>,
    examples: &[TrainingExample],
) -> Result<(), Error> {
    let path = path.as_ref();
    let tmp_path = tmp_sibling(path);

    {
        let mut writer: ExampleWriter<_> =
            RecordWriterInit::create(&tmp_path).map_err(|source| Error::Record {
                path: tmp_path.clone(),
                source,
            })?;
        for example in examples {
            writer
                .send(example.to_example())
                .map_err(|source| Error::Record {
                    path: tmp_path.clone(),
                    source,
                })?;
        }
    }

    // the reread catches short writes that a buffered drop can swallow
    let count = count_records(&tmp_path)?;
    if count != examples.len() {
        let _ = fs::remove_file(&tmp_path);
        return Err(Error::Verify {
            path: path.to_owned(),
            expected: examples.len(),
            actual: count,
        });
    }

    fs::rename(&tmp_path, path).map_err(|source| Error::Io {
        path: path.to_owned(),
        source,
    })?;
    debug!("renamed '{}' into place", path.display());
    Ok(())
}

fn count_records(path: &Path) -> Result<usize, Error> {
    let reader: ExampleReader<_> = RecordReaderInit {
        check_integrity: true,
    }
    .open(path)
    .map_err(|source| Error::Record {
        path: path.to_owned(),
        source,
    })?;

    let mut count = 0;
    for result in reader {
        result.map_err(|source| Error::Record {
            path: path.to_owned(),
            source,
        })?;
        count += 1;
    }
    Ok(count)
}

/// Reads a record file back into typed examples.
pub fn read_record_file(path: impl AsRef<Path>) -> Result<Vec<TrainingExample>, Error> {
    let path = path.as_ref();
    let reader: ExampleReader<_> = RecordReaderInit {
        check_integrity: true,
    }
    .open(path)
    .map_err(|source| Error::Record {
        path: path.to_owned(),
        source,
    })?;

    reader
        .map(|result| {
            let example = result.map_err(|source| Error::Record {
                path: path.to_owned(),
                source,
            })?;
            TrainingExample::from_example(&example)
        })
        .try_collect()
}

/// Writes the vocabulary's label map, atomically.
pub fn write_label_map(path: impl AsRef<Path>, vocabulary: &LabelVocabulary) -> Result<(), Error> {
    write_text_atomic(path.as_ref(), &vocabulary.to_document().to_string())
}

fn write_text_atomic(path: &Path, contents: &str) -> Result<(), Error> {
    let tmp_path = tmp_sibling(path);
    fs::write(&tmp_path, contents).map_err(|source| Error::Io {
        path: tmp_path.clone(),
        source,
    })?;
    fs::rename(&tmp_path, path).map_err(|source| Error::Io {
        path: path.to_owned(),
        source,
    })?;
    Ok(())
}

pub(crate) fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| OsString::from("output"));
    name.push(".tmp");
    path.with_file_name(name)
}
