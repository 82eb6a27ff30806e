//! Recipe aggregate and its value types.
//!
//! A recipe belongs to exactly one user and links to that user's tags and
//! ingredients by id. Which representation an operation returns is decided
//! by [`RecipeOperation::view`], never by the client.

use std::collections::BTreeSet;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::attribute::{Attribute, AttributeId};
use super::user::UserId;

/// Maximum length of a title or link.
pub const RECIPE_TEXT_MAX: usize = 255;
/// Decimal places stored for a cost.
pub const COST_SCALE: u32 = 2;

/// Validation errors for recipe fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipeValidationError {
    EmptyTitle,
    TitleTooLong { max: usize },
    NegativeCost,
    CostTooLarge { max: Decimal },
    CostTooPrecise { scale: u32 },
    LinkTooLong { max: usize },
}

impl fmt::Display for RecipeValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title must not be blank"),
            Self::TitleTooLong { max } => write!(f, "title must be at most {max} characters"),
            Self::NegativeCost => write!(f, "cost must not be negative"),
            Self::CostTooLarge { max } => write!(f, "cost must be at most {max}"),
            Self::CostTooPrecise { scale } => {
                write!(f, "cost must have at most {scale} decimal places")
            }
            Self::LinkTooLong { max } => write!(f, "link must be at most {max} characters"),
        }
    }
}

impl std::error::Error for RecipeValidationError {}

/// Identifier of a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeId(Uuid);

impl RecipeId {
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

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Non-blank recipe title, trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeTitle(String);

impl RecipeTitle {
    pub fn new(title: impl Into<String>) -> Result<Self, RecipeValidationError> {
        let raw = title.into();
        let title = raw.trim();
        if title.is_empty() {
            return Err(RecipeValidationError::EmptyTitle);
        }
        if title.chars().count() > RECIPE_TEXT_MAX {
            return Err(RecipeValidationError::TitleTooLong {
                max: RECIPE_TEXT_MAX,
            });
        }
        Ok(Self(title.to_owned()))
    }
}

impl AsRef<str> for RecipeTitle {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Price of a recipe with exactly two decimal places, `0.00..=999.99`.
///
/// # Examples
/// ```
/// use recipe_backend::domain::Cost;
/// use rust_decimal::Decimal;
///
/// let cost = Cost::new(Decimal::new(55, 1)).unwrap();
/// assert_eq!(cost.to_string(), "5.50");
/// assert!(Cost::new(Decimal::new(100000, 2)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cost(Decimal);

impl Cost {
    /// Largest representable cost: five digits, two of them decimals.
    pub fn max() -> Decimal {
        Decimal::new(99_999, COST_SCALE)
    }

    pub fn new(value: Decimal) -> Result<Self, RecipeValidationError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(RecipeValidationError::NegativeCost);
        }
        if value.normalize().scale() > COST_SCALE {
            return Err(RecipeValidationError::CostTooPrecise { scale: COST_SCALE });
        }
        if value > Self::max() {
            return Err(RecipeValidationError::CostTooLarge { max: Self::max() });
        }
        let mut scaled = value.abs();
        scaled.rescale(COST_SCALE);
        Ok(Self(scaled))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// External reference for a recipe. Empty input means no link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeLink(String);

impl RecipeLink {
    /// Parse an optional link, treating blank input as absent.
    pub fn parse(raw: &str) -> Result<Option<Self>, RecipeValidationError> {
        let link = raw.trim();
        if link.is_empty() {
            return Ok(None);
        }
        if link.chars().count() > RECIPE_TEXT_MAX {
            return Err(RecipeValidationError::LinkTooLong {
                max: RECIPE_TEXT_MAX,
            });
        }
        Ok(Some(Self(link.to_owned())))
    }
}

impl AsRef<str> for RecipeLink {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Storage path of an uploaded image, relative to the media root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePath(String);

impl ImagePath {
    /// Wrap a path produced by the image naming rules or read from storage.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }
}

impl AsRef<str> for ImagePath {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ImagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Validated fields supplied when creating or replacing a recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDraft {
    pub title: RecipeTitle,
    pub time_minutes: u32,
    pub cost: Cost,
    pub link: Option<RecipeLink>,
    pub tag_ids: BTreeSet<AttributeId>,
    pub ingredient_ids: BTreeSet<AttributeId>,
}

/// Partial update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipePatch {
    pub title: Option<RecipeTitle>,
    pub time_minutes: Option<u32>,
    pub cost: Option<Cost>,
    pub link: Option<Option<RecipeLink>>,
    pub tag_ids: Option<BTreeSet<AttributeId>>,
    pub ingredient_ids: Option<BTreeSet<AttributeId>>,
}

impl RecipePatch {
    /// Whether the patch changes any association set.
    pub fn touches_associations(&self) -> bool {
        self.tag_ids.is_some() || self.ingredient_ids.is_some()
    }
}

impl From<RecipeDraft> for RecipePatch {
    fn from(draft: RecipeDraft) -> Self {
        Self {
            title: Some(draft.title),
            time_minutes: Some(draft.time_minutes),
            cost: Some(draft.cost),
            link: Some(draft.link),
            tag_ids: Some(draft.tag_ids),
            ingredient_ids: Some(draft.ingredient_ids),
        }
    }
}

/// A user's recipe.
///
/// ## Invariants
/// - `owner` is fixed at creation.
/// - `tag_ids` and `ingredient_ids` reference attributes owned by `owner`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    id: RecipeId,
    owner: UserId,
    title: RecipeTitle,
    time_minutes: u32,
    cost: Cost,
    link: Option<RecipeLink>,
    image: Option<ImagePath>,
    tag_ids: BTreeSet<AttributeId>,
    ingredient_ids: BTreeSet<AttributeId>,
}

impl Recipe {
    /// Create a fresh recipe for `owner` from a draft.
    pub fn create(id: RecipeId, owner: UserId, draft: RecipeDraft) -> Self {
        let RecipeDraft {
            title,
            time_minutes,
            cost,
            link,
            tag_ids,
            ingredient_ids,
        } = draft;
        Self {
            id,
            owner,
            title,
            time_minutes,
            cost,
            link,
            image: None,
            tag_ids,
            ingredient_ids,
        }
    }

    /// Rebuild a recipe from stored parts.
    #[expect(clippy::too_many_arguments, reason = "mirrors the stored row")]
    pub fn from_parts(
        id: RecipeId,
        owner: UserId,
        title: RecipeTitle,
        time_minutes: u32,
        cost: Cost,
        link: Option<RecipeLink>,
        image: Option<ImagePath>,
        tag_ids: BTreeSet<AttributeId>,
        ingredient_ids: BTreeSet<AttributeId>,
    ) -> Self {
        Self {
            id,
            owner,
            title,
            time_minutes,
            cost,
            link,
            image,
            tag_ids,
            ingredient_ids,
        }
    }

    /// Apply a patch. The owner and image are never touched.
    pub fn apply(&mut self, patch: RecipePatch) {
        let RecipePatch {
            title,
            time_minutes,
            cost,
            link,
            tag_ids,
            ingredient_ids,
        } = patch;
        if let Some(title) = title {
            self.title = title;
        }
        if let Some(minutes) = time_minutes {
            self.time_minutes = minutes;
        }
        if let Some(cost) = cost {
            self.cost = cost;
        }
        if let Some(link) = link {
            self.link = link;
        }
        if let Some(ids) = tag_ids {
            self.tag_ids = ids;
        }
        if let Some(ids) = ingredient_ids {
            self.ingredient_ids = ids;
        }
    }

    /// Record the stored image path.
    pub fn set_image(&mut self, image: ImagePath) {
        self.image = Some(image);
    }

    pub fn id(&self) -> RecipeId {
        self.id
    }

    pub fn owner(&self) -> UserId {
        self.owner
    }

    pub fn title(&self) -> &RecipeTitle {
        &self.title
    }

    pub fn time_minutes(&self) -> u32 {
        self.time_minutes
    }

    pub fn cost(&self) -> Cost {
        self.cost
    }

    pub fn link(&self) -> Option<&RecipeLink> {
        self.link.as_ref()
    }

    pub fn image(&self) -> Option<&ImagePath> {
        self.image.as_ref()
    }

    pub fn tag_ids(&self) -> &BTreeSet<AttributeId> {
        &self.tag_ids
    }

    pub fn ingredient_ids(&self) -> &BTreeSet<AttributeId> {
        &self.ingredient_ids
    }
}

/// Recipe with its tags and ingredients expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDetail {
    pub recipe: Recipe,
    pub tags: Vec<Attribute>,
    pub ingredients: Vec<Attribute>,
}

/// Recipe operations exposed to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeOperation {
    List,
    Create,
    Retrieve,
    Update,
    PartialUpdate,
    UploadImage,
}

/// Shape of the data returned by a recipe operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeView {
    /// Scalar fields plus tag and ingredient ids.
    Summary,
    /// Scalar fields plus expanded tags and ingredients.
    Detail,
    /// Identifier and image path only.
    ImageUpload,
}

impl RecipeOperation {
    /// Representation produced by this operation.
    ///
    /// # Examples
    /// ```
    /// use recipe_backend::domain::{RecipeOperation, RecipeView};
    ///
    /// assert_eq!(RecipeOperation::Retrieve.view(), RecipeView::Detail);
    /// assert_eq!(RecipeOperation::List.view(), RecipeView::Summary);
    /// ```
    pub fn view(self) -> RecipeView {
        match self {
            Self::Retrieve => RecipeView::Detail,
            Self::UploadImage => RecipeView::ImageUpload,
            Self::List | Self::Create | Self::Update | Self::PartialUpdate => RecipeView::Summary,
        }
    }
}

/// A recipe rendered in one of the [`RecipeView`] shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipeRepresentation {
    Summary(Recipe),
    Detail(RecipeDetail),
    ImageUpload {
        id: RecipeId,
        image: Option<ImagePath>,
    },
}

impl RecipeRepresentation {
    /// View this representation corresponds to.
    pub fn view(&self) -> RecipeView {
        match self {
            Self::Summary(_) => RecipeView::Summary,
            Self::Detail(_) => RecipeView::Detail,
            Self::ImageUpload { .. } => RecipeView::ImageUpload,
        }
    }
}

#[cfg(test)]
mod tests;
