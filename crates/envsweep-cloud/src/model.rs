//! Resource model shared by every provider
//!
//! Providers map their raw listings into these types. Everything here is
//! created fresh per run and never persisted.

use serde::{Deserialize, Serialize};

/// Split a delimited listing into trimmed, non-empty entries.
///
/// Blank input (including whitespace-only input) yields an empty list, never
/// a single empty entry.
pub fn split_list(raw: &str, delimiter: char) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }

    raw.split(delimiter)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Ordered collection of discovered resources of one kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceSet<T> {
    items: Vec<T>,
}

impl<T> Default for ResourceSet<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> ResourceSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl ResourceSet<String> {
    /// Build a set of identifiers from raw delimited text (see [`split_list`])
    pub fn from_delimited(raw: &str, delimiter: char) -> Self {
        Self {
            items: split_list(raw, delimiter),
        }
    }

    /// Build a set of identifiers from line-oriented output
    pub fn from_lines(raw: &str) -> Self {
        Self::from_delimited(raw, '\n')
    }
}

impl<T> From<Vec<T>> for ResourceSet<T> {
    fn from(items: Vec<T>) -> Self {
        Self { items }
    }
}

impl<T> FromIterator<T> for ResourceSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<T> IntoIterator for ResourceSet<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a ResourceSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Compute instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    /// Provider-specific instance ID
    pub id: String,

    /// Display name
    pub name: String,

    /// Every address attached to the instance, in listing order
    pub addresses: Vec<String>,

    /// Publicly reachable address, if the instance has one
    pub public_ip: Option<String>,

    /// Source image reference (resolved from the instance detail)
    pub image: Option<String>,
}

impl Instance {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            addresses: Vec::new(),
            public_ip: None,
            image: None,
        }
    }

    pub fn with_addresses(mut self, addresses: Vec<String>) -> Self {
        self.addresses = addresses;
        self
    }

    pub fn with_public_ip(mut self, ip: impl Into<String>) -> Self {
        self.public_ip = Some(ip.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Whether `address` is one of this instance's addresses
    pub fn has_address(&self, address: &str) -> bool {
        self.public_ip.as_deref() == Some(address) || self.addresses.iter().any(|a| a == address)
    }
}

/// Attachment state of a volume
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VolumeStatus {
    InUse,
    Available,
    Detaching,
    Other(String),
}

impl VolumeStatus {
    pub fn is_in_use(&self) -> bool {
        matches!(self, VolumeStatus::InUse)
    }
}

impl From<&str> for VolumeStatus {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "in-use" => VolumeStatus::InUse,
            "available" => VolumeStatus::Available,
            "detaching" => VolumeStatus::Detaching,
            other => VolumeStatus::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for VolumeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VolumeStatus::InUse => write!(f, "in-use"),
            VolumeStatus::Available => write!(f, "available"),
            VolumeStatus::Detaching => write!(f, "detaching"),
            VolumeStatus::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Block storage volume
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    pub id: String,
    pub name: String,
    pub status: VolumeStatus,

    /// IDs of the instances this volume is attached to
    pub attached_to: Vec<String>,
}

impl Volume {
    pub fn new(id: impl Into<String>, status: VolumeStatus) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            status,
            attached_to: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn attached(mut self, instance_id: impl Into<String>) -> Self {
        self.attached_to.push(instance_id.into());
        self
    }

    /// Whether the volume is attached to the given instance (exact ID match)
    pub fn is_attached_to(&self, instance_id: &str) -> bool {
        self.attached_to.iter().any(|id| id == instance_id)
    }
}

/// Floating IP managed by the advanced networking subsystem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloatingIp {
    pub id: String,

    /// The publicly routable address
    pub floating_address: String,

    /// The private address it is associated with, if any.
    /// Display only: fixed addresses repeat across tenant networks.
    pub fixed_address: Option<String>,
}

impl FloatingIp {
    pub fn new(id: impl Into<String>, floating_address: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            floating_address: floating_address.into(),
            fixed_address: None,
        }
    }

    pub fn with_fixed_address(mut self, address: impl Into<String>) -> Self {
        self.fixed_address = Some(address.into());
        self
    }

    /// Whether this floating IP belongs to `instance`: its floating address
    /// is one of the instance's addresses
    pub fn belongs_to(&self, instance: &Instance) -> bool {
        instance.has_address(&self.floating_address)
    }
}

/// Floating IPs of an environment
///
/// `NotApplicable` means the provider has no floating-IP concept here, which
/// is different from an environment that simply uses none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "items", rename_all = "snake_case")]
pub enum FloatingIps {
    NotApplicable,
    Resolved(ResourceSet<FloatingIp>),
}

impl FloatingIps {
    pub fn is_applicable(&self) -> bool {
        matches!(self, FloatingIps::Resolved(_))
    }

    /// Number of floating IPs, `None` when not applicable
    pub fn len(&self) -> Option<usize> {
        match self {
            FloatingIps::NotApplicable => None,
            FloatingIps::Resolved(set) => Some(set.len()),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FloatingIp> {
        match self {
            FloatingIps::NotApplicable => <&[FloatingIp]>::default().iter(),
            FloatingIps::Resolved(set) => set.iter(),
        }
    }
}
