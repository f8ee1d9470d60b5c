use kube::Resource;
use std::fmt;
use std::str::FromStr;

use super::KeyError;

/// Identity of a tracked object: `<namespace>/<name>`, or just `<name>` for
/// cluster-scoped objects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey(String);

impl ObjectKey {
    pub fn new(namespace: Option<&str>, name: &str) -> Result<Self, KeyError> {
        if name.is_empty() {
            return Err(KeyError::MissingName);
        }
        match namespace {
            Some(ns) if !ns.is_empty() => Ok(Self(format!("{ns}/{name}"))),
            _ => Ok(Self(name.to_owned())),
        }
    }

    /// Splits the key back into namespace and name.
    pub fn split(&self) -> (Option<&str>, &str) {
        match self.0.split_once('/') {
            Some((ns, name)) => (Some(ns), name),
            None => (None, &self.0),
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        self.split().0
    }

    pub fn name(&self) -> &str {
        self.split().1
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for ObjectKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();
        match parts.as_slice() {
            [name] if !name.is_empty() => Ok(Self((*name).to_owned())),
            [ns, name] if !ns.is_empty() && !name.is_empty() => Ok(Self(s.to_owned())),
            _ => Err(KeyError::InvalidFormat(s.to_owned())),
        }
    }
}

/// Derives the identity key of an object from its metadata.
pub fn object_key<K: Resource>(obj: &K) -> Result<ObjectKey, KeyError> {
    let meta = obj.meta();
    let name = meta.name.as_deref().ok_or(KeyError::MissingName)?;
    ObjectKey::new(meta.namespace.as_deref(), name)
}
