use crate::{common::*, error::Error};
use prototext::{Document, Scalar};

/// Class name → 1-based id, in first-seen order.
///
/// One instance is shared across every split of a conversion run; ids never
/// change once assigned, so records written earlier stay consistent with the
/// label map emitted at the end. Ordering is an explicit part of the
/// contract: feeding the same names in a different order yields different
/// ids.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LabelVocabulary {
    classes: IndexSet<String>,
}

impl LabelVocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id of the class, assigning the next free id on first
    /// encounter.
    pub fn register(&mut self, class_name: &str) -> usize {
        match self.classes.get_index_of(class_name) {
            Some(index) => index + 1,
            None => {
                let (index, _) = self.classes.insert_full(class_name.to_owned());
                index + 1
            }
        }
    }

    pub fn id_of(&self, class_name: &str) -> Option<usize> {
        self.classes.get_index_of(class_name).map(|index| index + 1)
    }

    pub fn name_of(&self, id: usize) -> Option<&str> {
        self.classes.get_index(id.checked_sub(1)?).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// `(id, name)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.classes
            .iter()
            .enumerate()
            .map(|(index, name)| (index + 1, name.as_str()))
    }

    /// The label-map document, one `item { name id }` entry per class.
    pub fn to_document(&self) -> Document {
        let mut document = Document::new();
        for (id, name) in self.iter() {
            let mut item = Document::new();
            item.push_scalar("name", Scalar::Str(name.to_owned()));
            item.push_scalar("id", Scalar::Int(id as i64));
            document.push_message("item", item);
        }
        document
    }

    /// Restores a vocabulary from a label-map document, enforcing unique
    /// names and contiguous ids starting at 1.
    pub fn from_document(document: &Document) -> Result<Self, Error> {
        let mut classes = IndexSet::new();
        for (index, item) in document.messages("item").enumerate() {
            let name = item
                .scalar("name")
                .and_then(Scalar::as_str)
                .ok_or_else(|| Error::LabelMap {
                    message: format!("item #{} has no name", index + 1),
                })?;
            let id = item
                .scalar("id")
                .and_then(Scalar::as_int)
                .ok_or_else(|| Error::LabelMap {
                    message: format!("item '{}' has no id", name),
                })?;

            let expected = (index + 1) as i64;
            if id != expected {
                return Err(Error::LabelMap {
                    message: format!(
                        "item '{}' has id {}, expected {}",
                        name, id, expected
                    ),
                });
            }
            if !classes.insert(name.to_owned()) {
                return Err(Error::LabelMap {
                    message: format!("duplicate class name '{}'", name),
                });
            }
        }
        Ok(Self { classes })
    }
}
