//! Runtime field lookup for record types.
//!
//! Each record type registers a static [`RecordSchema`]: the wire names of its
//! fields, whether each field is a scalar or a nested record, and optionally
//! how it maps onto SQL tables and columns. A dot-separated path such as
//! `favoriteAnimal.name` resolves against that table into a [`FieldAccessor`]
//! without the caller providing any compiled accessor.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::domain::value::Value;

/// SQL table backing a record type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableMapping {
    pub name: &'static str,
    pub key: &'static str,
}

#[derive(Clone, Copy, Debug)]
pub enum FieldKind {
    Scalar,
    /// Nested record; resolved lazily so record types can reference each other.
    Record(fn() -> &'static RecordSchema),
}

#[derive(Clone, Copy, Debug)]
pub struct FieldDef {
    pub name: &'static str,
    /// Column holding the value, or the foreign key for nested records.
    pub column: Option<&'static str>,
    pub kind: FieldKind,
}

impl FieldDef {
    pub const fn scalar(name: &'static str, column: &'static str) -> Self {
        Self {
            name,
            column: Some(column),
            kind: FieldKind::Scalar,
        }
    }

    pub const fn nested(
        name: &'static str,
        foreign_key: &'static str,
        schema: fn() -> &'static RecordSchema,
    ) -> Self {
        Self {
            name,
            column: Some(foreign_key),
            kind: FieldKind::Record(schema),
        }
    }

    /// A field known only in memory, without any storage mapping.
    pub const fn unmapped(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            column: None,
            kind,
        }
    }

    pub fn nested_schema(&self) -> Option<&'static RecordSchema> {
        match self.kind {
            FieldKind::Scalar => None,
            FieldKind::Record(schema) => Some(schema()),
        }
    }
}

/// Field table of one record type.
#[derive(Debug)]
pub struct RecordSchema {
    pub name: &'static str,
    pub table: Option<TableMapping>,
    pub fields: &'static [FieldDef],
    folded: OnceLock<HashMap<String, usize>>,
}

impl RecordSchema {
    pub const fn new(
        name: &'static str,
        table: Option<TableMapping>,
        fields: &'static [FieldDef],
    ) -> Self {
        Self {
            name,
            table,
            fields,
            folded: OnceLock::new(),
        }
    }

    /// Finds a field by name, tolerating camelCase/PascalCase differences.
    ///
    /// Tries the exact name, the name with its first character upper-cased and
    /// then lower-cased, and finally an ASCII case-folded lookup.
    pub fn find(&self, segment: &str) -> Option<usize> {
        if segment.is_empty() {
            return None;
        }
        self.position(segment)
            .or_else(|| self.position(&swap_first(segment, char::to_ascii_uppercase)))
            .or_else(|| self.position(&swap_first(segment, char::to_ascii_lowercase)))
            .or_else(|| self.folded_index().get(&segment.to_ascii_lowercase()).copied())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }

    fn folded_index(&self) -> &HashMap<String, usize> {
        self.folded.get_or_init(|| {
            let mut index = HashMap::with_capacity(self.fields.len());
            for (position, field) in self.fields.iter().enumerate() {
                index
                    .entry(field.name.to_ascii_lowercase())
                    .or_insert(position);
            }
            index
        })
    }
}

fn swap_first(segment: &str, convert: fn(&char) -> char) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => std::iter::once(convert(&first)).chain(chars).collect(),
        None => String::new(),
    }
}

/// What a record exposes for one of its registered fields.
pub enum FieldRef<'a> {
    Value(Value),
    Record(Option<&'a dyn Record>),
}

/// A record type whose fields can be read by registry position.
pub trait Record {
    fn schema() -> &'static RecordSchema
    where
        Self: Sized;

    /// Reads the field at `index` of this record's schema.
    fn field(&self, index: usize) -> FieldRef<'_>;
}

/// One step of a resolved path.
#[derive(Clone, Copy, Debug)]
pub struct FieldHop {
    pub declaring: &'static RecordSchema,
    pub index: usize,
}

impl FieldHop {
    pub fn field(&self) -> &'static FieldDef {
        &self.declaring.fields[self.index]
    }
}

/// A resolved, possibly multi-hop field path.
#[derive(Clone, Debug)]
pub struct FieldAccessor {
    hops: Vec<FieldHop>,
}

impl FieldAccessor {
    /// Resolves `path` against `schema`.
    ///
    /// Returns `None` when any segment is unknown, when a non-final segment is
    /// not a nested record, or when the final segment is not a scalar.
    pub fn resolve(schema: &'static RecordSchema, path: &str) -> Option<Self> {
        let mut hops = Vec::new();
        let mut current = Some(schema);
        for segment in path.split('.') {
            let declaring = current?;
            let index = declaring.find(segment)?;
            hops.push(FieldHop { declaring, index });
            current = declaring.fields[index].nested_schema();
        }
        match hops.last() {
            Some(leaf) if matches!(leaf.field().kind, FieldKind::Scalar) => Some(Self { hops }),
            _ => None,
        }
    }

    pub fn hops(&self) -> &[FieldHop] {
        &self.hops
    }

    pub fn depth(&self) -> usize {
        self.hops.len()
    }

    pub fn is_nested(&self) -> bool {
        self.hops.len() > 1
    }

    /// The first `len` hops; for a nested path these end on a record field.
    pub fn prefix(&self, len: usize) -> Self {
        Self {
            hops: self.hops[..len.min(self.hops.len())].to_vec(),
        }
    }

    /// Canonical dotted path built from the registered names.
    pub fn path(&self) -> String {
        self.hops
            .iter()
            .map(|hop| hop.field().name)
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Reads the leaf value, or `None` when an intermediate record is absent.
    pub fn value(&self, record: &dyn Record) -> Option<Value> {
        let (leaf, parents) = self.hops.split_last()?;
        let mut current = record;
        for hop in parents {
            match current.field(hop.index) {
                FieldRef::Record(Some(next)) => current = next,
                _ => return None,
            }
        }
        match current.field(leaf.index) {
            FieldRef::Value(value) => Some(value),
            FieldRef::Record(_) => Some(Value::Null),
        }
    }

    /// Whether every record along the path, including the last hop, is present.
    pub fn is_present(&self, record: &dyn Record) -> bool {
        let mut current = record;
        for hop in &self.hops {
            match current.field(hop.index) {
                FieldRef::Record(Some(next)) => current = next,
                FieldRef::Record(None) => return false,
                FieldRef::Value(value) => return !value.is_null(),
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::{Animal, User};

    #[test]
    fn resolves_camel_and_pascal_case() {
        let schema = User::schema();
        let camel = FieldAccessor::resolve(schema, "userName").unwrap();
        let pascal = FieldAccessor::resolve(schema, "UserName").unwrap();
        let folded = FieldAccessor::resolve(schema, "USERNAME").unwrap();
        assert_eq!(camel.path(), "userName");
        assert_eq!(pascal.path(), "userName");
        assert_eq!(folded.path(), "userName");
    }

    #[test]
    fn resolves_nested_paths_against_the_nested_type() {
        let accessor = FieldAccessor::resolve(User::schema(), "FavoriteAnimal.Name").unwrap();
        assert_eq!(accessor.depth(), 2);
        assert_eq!(accessor.path(), "favoriteAnimal.name");
        assert_eq!(accessor.hops()[1].declaring.name, Animal::schema().name);
    }

    #[test]
    fn unknown_segments_do_not_resolve() {
        let schema = User::schema();
        assert!(FieldAccessor::resolve(schema, "shoeSize").is_none());
        assert!(FieldAccessor::resolve(schema, "favoriteAnimal.legs").is_none());
        assert!(FieldAccessor::resolve(schema, "email.length").is_none());
        assert!(FieldAccessor::resolve(schema, "").is_none());
    }

    #[test]
    fn nested_record_is_not_a_sortable_leaf() {
        assert!(FieldAccessor::resolve(User::schema(), "favoriteAnimal").is_none());
    }

    #[test]
    fn reads_values_and_detects_absent_intermediates() {
        let accessor = FieldAccessor::resolve(User::schema(), "favoriteAnimal.name").unwrap();
        let mut user = User::sample(1, "Alice", Some("Jaguar"));
        assert_eq!(accessor.value(&user), Some(Value::from("Jaguar")));
        assert!(accessor.prefix(1).is_present(&user));

        user.favorite_animal = None;
        assert_eq!(accessor.value(&user), None);
        assert!(!accessor.prefix(1).is_present(&user));
    }
}
