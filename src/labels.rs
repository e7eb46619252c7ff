//! The class label table.

use std::{collections::HashMap, fs, path::Path};

use anyhow::{bail, Context};

/// An immutable mapping from class index to human-readable label.
///
/// The on-disk artifact maps label strings to class indices (the layout the
/// classifier was trained with); it is inverted once at load time and
/// read-only afterwards.
#[derive(Debug, Clone)]
pub struct LabelTable {
    labels: Vec<String>,
}

impl LabelTable {
    /// Loads and inverts a label table from a JSON `{label: index}` artifact.
    ///
    /// The indices must form a dense range `0..N` without duplicates;
    /// anything else indicates a corrupt artifact and is rejected.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Self::load_impl(path.as_ref())
    }

    fn load_impl(path: &Path) -> anyhow::Result<Self> {
        let data = fs::read(path)
            .with_context(|| format!("failed to read label table '{}'", path.display()))?;
        let map: HashMap<String, usize> = serde_json::from_slice(&data)
            .with_context(|| format!("malformed label table '{}'", path.display()))?;
        Self::from_class_indices(map)
    }

    /// Builds the table from an in-memory label-to-index mapping.
    pub fn from_class_indices(map: HashMap<String, usize>) -> anyhow::Result<Self> {
        let mut labels = vec![None; map.len()];
        for (label, index) in map {
            match labels.get_mut(index) {
                Some(slot @ None) => *slot = Some(label),
                Some(Some(other)) => {
                    bail!("label table assigns index {index} to both '{other}' and '{label}'")
                }
                None => bail!("label table index {index} out of range for {} classes", labels.len()),
            }
        }

        // Every slot is filled: the indices are a permutation of 0..N.
        let labels = labels.into_iter().map(Option::unwrap).collect();
        Ok(Self { labels })
    }

    /// Returns the label for a class index, if one exists.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(|s| s.as_str())
    }

    /// Returns the number of classes in the table.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, usize)]) -> HashMap<String, usize> {
        entries.iter().map(|&(l, i)| (l.to_string(), i)).collect()
    }

    #[test]
    fn inverts_class_indices() {
        let table =
            LabelTable::from_class_indices(map(&[("A", 0), ("B", 1), ("space", 2)])).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(0), Some("A"));
        assert_eq!(table.get(2), Some("space"));
        assert_eq!(table.get(3), None);
    }

    #[test]
    fn rejects_sparse_indices() {
        assert!(LabelTable::from_class_indices(map(&[("A", 0), ("B", 2)])).is_err());
    }

    #[test]
    fn rejects_duplicate_indices() {
        assert!(LabelTable::from_class_indices(map(&[("A", 0), ("B", 0)])).is_err());
    }
}
