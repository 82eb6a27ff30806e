//! Recipe attributes: tags and ingredients.
//!
//! Both kinds share one shape (a name owned by a single user) so a single
//! service and repository port cover them, keyed by [`AttributeKind`].

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserId;

/// Maximum length of an attribute name.
pub const ATTRIBUTE_NAME_MAX: usize = 255;

/// Which attribute collection an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    Tag,
    Ingredient,
}

impl AttributeKind {
    /// Singular label used in messages and logs.
    pub fn label(self) -> &'static str {
        match self {
            Self::Tag => "tag",
            Self::Ingredient => "ingredient",
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Validation errors for attribute names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValidationError {
    EmptyName,
    NameTooLong { max: usize },
}

impl fmt::Display for AttributeValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be blank"),
            Self::NameTooLong { max } => write!(f, "name must be at most {max} characters"),
        }
    }
}

impl std::error::Error for AttributeValidationError {}

/// Identifier of a tag or ingredient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeId(Uuid);

impl AttributeId {
    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for AttributeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Non-blank attribute name with surrounding whitespace removed.
///
/// # Examples
/// ```
/// use recipe_backend::domain::AttributeName;
///
/// assert!(AttributeName::new("Vegan").is_ok());
/// assert!(AttributeName::new("  ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AttributeName(String);

impl AttributeName {
    /// Validate and construct an [`AttributeName`].
    pub fn new(name: impl Into<String>) -> Result<Self, AttributeValidationError> {
        let raw = name.into();
        let name = raw.trim();
        if name.is_empty() {
            return Err(AttributeValidationError::EmptyName);
        }
        if name.chars().count() > ATTRIBUTE_NAME_MAX {
            return Err(AttributeValidationError::NameTooLong {
                max: ATTRIBUTE_NAME_MAX,
            });
        }
        Ok(Self(name.to_owned()))
    }
}

impl AsRef<str> for AttributeName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<AttributeName> for String {
    fn from(value: AttributeName) -> Self {
        value.0
    }
}

impl TryFrom<String> for AttributeName {
    type Error = AttributeValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A tag or ingredient owned by one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    id: AttributeId,
    kind: AttributeKind,
    name: AttributeName,
    owner: UserId,
}

impl Attribute {
    /// Build an attribute from validated parts.
    pub fn new(id: AttributeId, kind: AttributeKind, name: AttributeName, owner: UserId) -> Self {
        Self {
            id,
            kind,
            name,
            owner,
        }
    }

    pub fn id(&self) -> AttributeId {
        self.id
    }

    pub fn kind(&self) -> AttributeKind {
        self.kind
    }

    pub fn name(&self) -> &AttributeName {
        &self.name
    }

    pub fn owner(&self) -> UserId {
        self.owner
    }
}

/// Options narrowing an attribute listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttributeFilter {
    /// Keep only attributes referenced by at least one recipe.
    pub assigned_only: bool,
}

impl AttributeFilter {
    /// Filter keeping only attributes attached to a recipe.
    pub fn assigned_only() -> Self {
        Self {
            assigned_only: true,
        }
    }
}

/// Sort attributes the way listings present them: name descending, then id
/// descending so equal names keep a stable order.
pub fn sort_for_listing(attributes: &mut [Attribute]) {
    attributes.sort_by(|a, b| {
        b.name
            .as_ref()
            .cmp(a.name.as_ref())
            .then_with(|| b.id.cmp(&a.id))
    });
}
