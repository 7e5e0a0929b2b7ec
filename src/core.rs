use std::path::PathBuf;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

/// Atomic reference-counted string type used for property names and task
/// identities.
pub(crate) type ArcStr = Arc<str>;

/// A 32-byte BLAKE3 hash used as a fingerprint of a task's declared inputs.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Hash32([u8; 32]);

impl<T> From<T> for Hash32
where
    T: Into<[u8; 32]>,
{
    fn from(value: T) -> Self {
        Hash32(value.into())
    }
}

impl Hash32 {
    pub fn hash(buffer: impl AsRef<[u8]>) -> Self {
        blake3::Hasher::new()
            .update(buffer.as_ref())
            .finalize()
            .into()
    }

    pub fn to_hex(self) -> String {
        crate::utils::hex(&self.0)
    }
}

impl std::fmt::Debug for Hash32 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Hash32({})", self.to_hex())
    }
}

impl std::fmt::Display for Hash32 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Coarse classification of a declared property type.
///
/// Only the file-like kinds matter to validation: a generic input declared
/// with one of them is reported as a static problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TypeKind {
    /// A single file location, e.g. [`Utf8PathBuf`].
    File,
    /// A platform path, e.g. [`PathBuf`].
    Path,
    /// Several file locations, e.g. [`FileCollection`].
    FileCollection,
    /// Anything else.
    Other,
}

impl TypeKind {
    pub fn is_file_like(self) -> bool {
        !matches!(self, TypeKind::Other)
    }
}

/// The declared type of a property, known without any task instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ValueType {
    name: &'static str,
    kind: TypeKind,
}

impl ValueType {
    pub fn of<V: PropertyType>() -> Self {
        Self {
            name: std::any::type_name::<V>(),
            kind: V::KIND,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

/// The runtime value of a property after evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Plain data: strings, numbers, flags, lists of those.
    Data(serde_json::Value),
    /// A single file system location.
    File(Utf8PathBuf),
    /// Several file system locations.
    Files(Vec<Utf8PathBuf>),
}

impl Value {
    /// File locations carried by this value, empty for plain data.
    pub fn files(&self) -> &[Utf8PathBuf] {
        match self {
            Value::Data(_) => &[],
            Value::File(path) => std::slice::from_ref(path),
            Value::Files(paths) => paths,
        }
    }
}

/// Types that can be declared as task properties.
///
/// The associated [`KIND`](Self::KIND) is inspected when the validator for a
/// task type is built, [`into_value`](Self::into_value) every time a property
/// is evaluated. A conversion failure is reported like any other failure to
/// evaluate the property.
pub trait PropertyType: Send + Sync + 'static {
    const KIND: TypeKind = TypeKind::Other;

    fn into_value(self) -> anyhow::Result<Value>;
}

impl PropertyType for Utf8PathBuf {
    const KIND: TypeKind = TypeKind::File;

    fn into_value(self) -> anyhow::Result<Value> {
        Ok(Value::File(self))
    }
}

impl PropertyType for PathBuf {
    const KIND: TypeKind = TypeKind::Path;

    fn into_value(self) -> anyhow::Result<Value> {
        match Utf8PathBuf::from_path_buf(self) {
            Ok(path) => Ok(Value::File(path)),
            Err(path) => anyhow::bail!("Path '{}' is not valid UTF-8.", path.display()),
        }
    }
}

impl PropertyType for Vec<Utf8PathBuf> {
    const KIND: TypeKind = TypeKind::FileCollection;

    fn into_value(self) -> anyhow::Result<Value> {
        Ok(Value::Files(self))
    }
}

impl PropertyType for FileCollection {
    const KIND: TypeKind = TypeKind::FileCollection;

    fn into_value(self) -> anyhow::Result<Value> {
        Ok(Value::Files(self.0))
    }
}

macro_rules! impl_data {
    ($($T:ty),*) => {
        $(
            impl PropertyType for $T {
                fn into_value(self) -> anyhow::Result<Value> {
                    Ok(Value::Data(serde_json::Value::from(self)))
                }
            }
        )*
    };
}

impl_data!(String, bool, i32, i64, u32, u64, usize, f64, Vec<String>, serde_json::Value);

/// An ordered group of file locations declared as a single property.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileCollection(Vec<Utf8PathBuf>);

impl FileCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: impl Into<Utf8PathBuf>) {
        self.0.push(path.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = &Utf8Path> {
        self.0.iter().map(Utf8PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<P> FromIterator<P> for FileCollection
where
    P: Into<Utf8PathBuf>,
{
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
