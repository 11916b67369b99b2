use std::collections::BTreeMap;

use crate::path::Path;
use crate::schema::FieldDefinition;

/// A schema field together with its full schema path.
#[derive(Debug, Clone, Copy)]
pub struct FieldEntry<'a> {
    pub path: &'a Path,
    pub field: &'a FieldDefinition,
}

/// Flattened view of a schema tree, addressable by full path or by bare key.
///
/// Bare keys that repeat across branches resolve to the last field visited; lookups
/// try the full path first so that ambiguity only affects callers that pass a bare key.
#[derive(Debug, Clone, Default)]
pub struct FieldMap<'a> {
    entries: Vec<(Path, &'a FieldDefinition)>,
    by_path: BTreeMap<String, usize>,
    by_key: BTreeMap<String, usize>,
}

impl<'a> FieldMap<'a> {
    pub fn get(&self, address: &str) -> Option<&'a FieldDefinition> {
        self.by_path
            .get(address)
            .or_else(|| self.by_key.get(address))
            .map(|&index| self.entries[index].1)
    }

    pub fn contains(&self, address: &str) -> bool {
        self.by_path.contains_key(address) || self.by_key.contains_key(address)
    }

    /// Fields in schema order (parents before their children), one entry per field.
    pub fn entries(&self) -> impl Iterator<Item = FieldEntry<'_>> {
        self.entries
            .iter()
            .map(|(path, field)| FieldEntry { path, field: *field })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, path: Path, field: &'a FieldDefinition) {
        let index = self.entries.len();
        self.by_path.insert(path.to_string(), index);
        self.by_key.insert(field.key.clone(), index);
        self.entries.push((path, field));
    }
}

/// Flattens `fields` (and recursively their children) into a [`FieldMap`].
pub fn build_field_map(fields: &[FieldDefinition]) -> FieldMap<'_> {
    let mut map = FieldMap::default();
    collect(fields, &Path::root(), &mut map);
    map
}

fn collect<'a>(fields: &'a [FieldDefinition], parent: &Path, map: &mut FieldMap<'a>) {
    for field in fields {
        let path = parent.join_field(&field.key);
        map.insert(path.clone(), field);
        collect(field.children(), &path, map);
    }
}
