use crate::{common::*, error::Error, writer::tmp_sibling};
use annotation::Annotation;

/// One row per labeled box, in the flat layout of the audit dump. Not
/// consumed by anything downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvRow {
    pub filename: String,
    pub width: u32,
    pub height: u32,
    pub class: String,
    pub xmin: u32,
    pub ymin: u32,
    pub xmax: u32,
    pub ymax: u32,
}

pub fn csv_rows(annotations: &[Annotation]) -> Vec<CsvRow> {
    annotations
        .iter()
        .flat_map(|annotation| {
            annotation.boxes().iter().map(move |bbox| CsvRow {
                filename: annotation.filename().to_owned(),
                width: annotation.width(),
                height: annotation.height(),
                class: bbox.class_name().to_owned(),
                xmin: bbox.xmin(),
                ymin: bbox.ymin(),
                xmax: bbox.xmax(),
                ymax: bbox.ymax(),
            })
        })
        .collect()
}

/// Writes the debug dump, atomically. A box-free annotation contributes no
/// rows, matching the per-box layout.
pub fn write_csv_dump(path: impl AsRef<Path>, annotations: &[Annotation]) -> Result<(), Error> {
    let path = path.as_ref();
    let tmp_path = tmp_sibling(path);

    {
        let mut writer =
            csv::WriterBuilder::new()
                .from_path(&tmp_path)
                .map_err(|source| Error::Csv {
                    path: tmp_path.clone(),
                    source,
                })?;
        for row in csv_rows(annotations) {
            writer.serialize(row).map_err(|source| Error::Csv {
                path: tmp_path.clone(),
                source,
            })?;
        }
        writer.flush().map_err(|source| Error::Io {
            path: tmp_path.clone(),
            source,
        })?;
    }

    fs::rename(&tmp_path, path).map_err(|source| Error::Io {
        path: path.to_owned(),
        source,
    })?;
    Ok(())
}
