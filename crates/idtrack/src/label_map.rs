use crate::{Error, Result};

/// Class names of a detection model, indexed by the class id the model emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMap {
    labels: Vec<String>,
}

impl LabelMap {
    /// Returns a new LabelMap from names in class id order.
    pub fn new(labels: Vec<String>) -> Result<LabelMap> {
        if labels.is_empty() {
            return Err(Error::LabelMap("no labels".into()));
        }
        Ok(LabelMap { labels })
    }

    /// Parse a protobuf text label map.
    ///
    /// Every line containing `display_name:` contributes its value, stripped of quotes, in file order. Other lines,
    /// including the `id:` fields, are ignored: the class id is the position of the entry.
    pub fn from_pbtxt(text: &str) -> Result<LabelMap> {
        let labels = text
            .lines()
            .filter_map(|line| {
                line.split_once("display_name:")
                    .map(|(_, name)| name.trim().trim_matches('"').to_owned())
            })
            .collect::<Vec<_>>();

        if labels.iter().any(|label| label.is_empty()) {
            return Err(Error::LabelMap("empty display_name".into()));
        }
        Self::new(labels)
    }

    /// Returns the name of class `index`
    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// Returns the class index of `name`
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.labels.iter().position(|label| label == name)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
