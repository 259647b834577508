use crate::{
    common::*,
    error::Error,
    types::{Annotation, BoundingBox},
};

/// The on-disk XML schema written by annotation tools. Extra elements
/// (`folder`, `pose`, `truncated`, `difficult`, `depth`, ...) are ignored.
#[derive(Debug, Clone, Deserialize)]
struct VocAnnotation {
    filename: String,
    size: VocSize,
    #[serde(default)]
    object: Vec<VocObject>,
}

#[derive(Debug, Clone, Deserialize)]
struct VocSize {
    width: u32,
    height: u32,
}

#[derive(Debug, Clone, Deserialize)]
struct VocObject {
    name: String,
    bndbox: VocBndBox,
}

#[derive(Debug, Clone, Deserialize)]
struct VocBndBox {
    xmin: u32,
    ymin: u32,
    xmax: u32,
    ymax: u32,
}

impl VocAnnotation {
    fn into_annotation(self) -> Result<Annotation, Error> {
        let boxes: Vec<_> = self
            .object
            .into_iter()
            .map(|object| {
                let VocBndBox {
                    xmin,
                    ymin,
                    xmax,
                    ymax,
                } = object.bndbox;
                BoundingBox::try_new(object.name, xmin, ymin, xmax, ymax)
            })
            .try_collect()?;
        Annotation::try_new(self.filename, self.size.width, self.size.height, boxes)
    }
}

/// Loads and validates one annotation file.
pub fn load_annotation_file(path: impl AsRef<Path>) -> Result<Annotation, Error> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => Error::NotFound {
            path: path.to_owned(),
        },
        _ => Error::Io {
            path: path.to_owned(),
            source,
        },
    })?;

    let raw: VocAnnotation = serde_xml_rs::from_str(&text).map_err(|err| Error::Parse {
        path: path.to_owned(),
        message: err.to_string(),
    })?;

    let annotation = raw.into_annotation().map_err(|err| Error::Parse {
        path: path.to_owned(),
        message: err.to_string(),
    })?;

    if annotation.boxes().is_empty() {
        warn!("annotation '{}' has no objects", path.display());
    }

    Ok(annotation)
}

/// Lists the annotation files of a directory, non-recursive, sorted so the
/// processing order does not depend on directory enumeration order.
pub fn scan_annotation_dir(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, Error> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(Error::NotFound {
            path: dir.to_owned(),
        });
    }

    let pattern = format!("{}/*.xml", dir.display());
    let entries = glob::glob(&pattern).map_err(|err| Error::Pattern {
        pattern: pattern.clone(),
        message: err.to_string(),
    })?;

    let mut paths: Vec<PathBuf> = entries
        .map(|entry| {
            entry.map_err(|err| {
                let path = err.path().to_owned();
                Error::Io {
                    path,
                    source: err.into_error(),
                }
            })
        })
        .try_collect()?;
    paths.sort();

    if paths.is_empty() {
        return Err(Error::NoAnnotations {
            path: dir.to_owned(),
        });
    }
    Ok(paths)
}

/// Loads every annotation of a directory in sorted filename order.
pub fn load_annotation_dir(dir: impl AsRef<Path>) -> Result<Vec<Annotation>, Error> {
    scan_annotation_dir(dir)?
        .into_iter()
        .map(load_annotation_file)
        .try_collect()
}
