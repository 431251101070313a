// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Field sets and the record extraction trait.
//!
//! Both entry paths land in a [`FieldSet`]:
//! - typed records implement [`Record`] (usually via `#[derive(Record)]`),
//! - dynamically typed JSON maps go through [`FieldSet::from_json_map`].

use std::collections::BTreeMap;

use crate::error::EncodeError;
use crate::value::{FieldValue, TypeMode};

/// A type whose annotated members become Line Protocol fields.
///
/// Derive it with `#[derive(Record)]` and mark each exported member with
/// `#[influx("key")]`. Members without the attribute are skipped.
///
/// ```
/// use fluxline::{FieldSet, Record};
///
/// #[derive(Record)]
/// struct Load {
///     #[influx("load1")]
///     one: f64,
///     #[influx("cores")]
///     cores: u32,
///     scratch: Vec<u8>,
/// }
///
/// let mut fields = FieldSet::new();
/// Load { one: 0.5, cores: 4, scratch: vec![] }.record_fields(&mut fields);
/// assert_eq!(fields.len(), 2);
/// ```
pub trait Record {
    /// Insert this record's fields into `fields`.
    fn record_fields(&self, fields: &mut FieldSet);
}

impl<T: Record + ?Sized> Record for &T {
    fn record_fields(&self, fields: &mut FieldSet) {
        (**self).record_fields(fields)
    }
}

/// Field key to value map, ordered by key.
///
/// Inserting an existing key replaces its value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSet {
    fields: BTreeMap<String, FieldValue>,
}

impl FieldSet {
    /// Create an empty field set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a field, replacing any previous value for `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Get the value for `key`.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Iterate fields in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if there are no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Collect the fields of a record.
    pub fn from_record<R: Record + ?Sized>(record: &R) -> Self {
        let mut fields = Self::new();
        record.record_fields(&mut fields);
        fields
    }

    /// Build a field set from a JSON object.
    ///
    /// Fails with [`EncodeError::NotARecord`] if `value` is not an object, and
    /// with [`EncodeError::Unsupported`] if any member is not a scalar.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, EncodeError> {
        match value {
            serde_json::Value::Object(map) => Self::from_json_map(map),
            _ => Err(EncodeError::NotARecord),
        }
    }

    /// Build a field set from a key to JSON value map.
    ///
    /// All-or-nothing: the first entry that is not a string, number, or
    /// boolean aborts with [`EncodeError::Unsupported`] naming its key.
    pub fn from_json_map<'a, I>(map: I) -> Result<Self, EncodeError>
    where
        I: IntoIterator<Item = (&'a String, &'a serde_json::Value)>,
    {
        let mut fields = Self::new();
        for (key, value) in map {
            let fv = FieldValue::from_json(value)
                .ok_or_else(|| EncodeError::Unsupported { key: key.clone() })?;
            fields.fields.insert(key.clone(), fv);
        }
        Ok(fields)
    }

    /// Render every value, keeping key order.
    ///
    /// Stops at the first value that fails validation.
    pub fn render(&self, mode: TypeMode) -> Result<BTreeMap<String, String>, EncodeError> {
        self.fields
            .iter()
            .map(|(key, value)| Ok((key.clone(), value.render(key, mode)?)))
            .collect()
    }
}

impl Record for FieldSet {
    fn record_fields(&self, fields: &mut FieldSet) {
        fields
            .fields
            .extend(self.fields.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for FieldSet {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut fields = Self::new();
        for (k, v) in iter {
            fields.insert(k, v);
        }
        fields
    }
}
