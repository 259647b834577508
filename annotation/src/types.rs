use crate::{common::*, error::Error};

/// One labeled region in pixel coordinates, top-left origin.
///
/// Construction enforces `xmin < xmax` and `ymin < ymax`; containment within
/// the image is checked by [Annotation::try_new], which knows the image
/// dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundingBox {
    class_name: String,
    xmin: u32,
    ymin: u32,
    xmax: u32,
    ymax: u32,
}

impl BoundingBox {
    pub fn try_new(
        class_name: impl Into<String>,
        xmin: u32,
        ymin: u32,
        xmax: u32,
        ymax: u32,
    ) -> Result<Self, Error> {
        let class_name = class_name.into();
        if xmin >= xmax {
            return Err(Error::InvalidBox {
                class_name,
                message: format!("xmin {} is not less than xmax {}", xmin, xmax),
            });
        }
        if ymin >= ymax {
            return Err(Error::InvalidBox {
                class_name,
                message: format!("ymin {} is not less than ymax {}", ymin, ymax),
            });
        }
        Ok(Self {
            class_name,
            xmin,
            ymin,
            xmax,
            ymax,
        })
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn xmin(&self) -> u32 {
        self.xmin
    }

    pub fn ymin(&self) -> u32 {
        self.ymin
    }

    pub fn xmax(&self) -> u32 {
        self.xmax
    }

    pub fn ymax(&self) -> u32 {
        self.ymax
    }
}

/// One labeled image: filename, pixel dimensions, and its boxes in document
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    filename: String,
    width: u32,
    height: u32,
    boxes: Vec<BoundingBox>,
}

impl Annotation {
    pub fn try_new(
        filename: impl Into<String>,
        width: u32,
        height: u32,
        boxes: Vec<BoundingBox>,
    ) -> Result<Self, Error> {
        let filename = filename.into();
        if filename.is_empty() {
            return Err(Error::Invalid {
                message: "empty filename".into(),
            });
        }
        if width == 0 || height == 0 {
            return Err(Error::Invalid {
                message: format!("image dimensions {}x{} are not positive", width, height),
            });
        }
        for bbox in &boxes {
            if bbox.xmax() > width {
                return Err(Error::InvalidBox {
                    class_name: bbox.class_name().to_owned(),
                    message: format!("xmax {} exceeds image width {}", bbox.xmax(), width),
                });
            }
            if bbox.ymax() > height {
                return Err(Error::InvalidBox {
                    class_name: bbox.class_name().to_owned(),
                    message: format!("ymax {} exceeds image height {}", bbox.ymax(), height),
                });
            }
        }
        Ok(Self {
            filename,
            width,
            height,
            boxes,
        })
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn boxes(&self) -> &[BoundingBox] {
        &self.boxes
    }
}
