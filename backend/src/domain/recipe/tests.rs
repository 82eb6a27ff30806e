//! Tests for recipe value types and patch semantics.

use super::*;
use rstest::{fixture, rstest};

fn draft(title: &str) -> RecipeDraft {
    RecipeDraft {
        title: RecipeTitle::new(title).expect("valid title"),
        time_minutes: 10,
        cost: Cost::new(Decimal::new(500, 2)).expect("valid cost"),
        link: None,
        tag_ids: BTreeSet::new(),
        ingredient_ids: BTreeSet::new(),
    }
}

#[fixture]
fn recipe() -> Recipe {
    let mut draft = draft("Sample recipe");
    draft.tag_ids.insert(AttributeId::random());
    Recipe::create(RecipeId::random(), UserId::random(), draft)
}

#[rstest]
#[case(Decimal::new(5, 0), "5.00")]
#[case(Decimal::new(55, 1), "5.50")]
#[case(Decimal::new(99_999, 2), "999.99")]
#[case(Decimal::ZERO, "0.00")]
#[case(Decimal::new(5_000, 3), "5.00")]
fn costs_are_scaled_to_two_places(#[case] value: Decimal, #[case] expected: &str) {
    let cost = Cost::new(value).expect("valid cost");
    assert_eq!(cost.to_string(), expected);
}

#[rstest]
#[case(Decimal::new(-1, 2), RecipeValidationError::NegativeCost)]
#[case(Decimal::new(1_000, 0), RecipeValidationError::CostTooLarge { max: Cost::max() })]
#[case(Decimal::new(5_001, 3), RecipeValidationError::CostTooPrecise { scale: COST_SCALE })]
fn invalid_costs_are_rejected(#[case] value: Decimal, #[case] expected: RecipeValidationError) {
    assert_eq!(Cost::new(value), Err(expected));
}

#[rstest]
#[case("")]
#[case("  ")]
fn blank_titles_are_rejected(#[case] raw: &str) {
    assert_eq!(RecipeTitle::new(raw), Err(RecipeValidationError::EmptyTitle));
}

#[rstest]
#[case("", None)]
#[case("   ", None)]
#[case("https://example.com/soup", Some("https://example.com/soup"))]
fn links_treat_blank_as_absent(#[case] raw: &str, #[case] expected: Option<&str>) {
    let link = RecipeLink::parse(raw).expect("valid link");
    assert_eq!(link.as_ref().map(AsRef::as_ref), expected);
}

#[rstest]
fn overlong_links_are_rejected() {
    let raw = format!("https://{}", "a".repeat(RECIPE_TEXT_MAX));
    assert_eq!(
        RecipeLink::parse(&raw),
        Err(RecipeValidationError::LinkTooLong {
            max: RECIPE_TEXT_MAX
        })
    );
}

#[rstest]
fn patch_only_changes_supplied_fields(mut recipe: Recipe) {
    let original_tags = recipe.tag_ids().clone();
    let patch = RecipePatch {
        title: Some(RecipeTitle::new("Chicken tikka").expect("valid title")),
        ..RecipePatch::default()
    };

    recipe.apply(patch);

    assert_eq!(recipe.title().as_ref(), "Chicken tikka");
    assert_eq!(recipe.time_minutes(), 10);
    assert_eq!(recipe.tag_ids(), &original_tags);
}

#[rstest]
fn full_replace_clears_unsupplied_associations(mut recipe: Recipe) {
    let owner = recipe.owner();
    recipe.apply(RecipePatch::from(draft("Spaghetti carbonara")));

    assert_eq!(recipe.title().as_ref(), "Spaghetti carbonara");
    assert!(recipe.tag_ids().is_empty());
    assert_eq!(recipe.owner(), owner);
}

#[rstest]
fn patch_preserves_image(mut recipe: Recipe) {
    recipe.set_image(ImagePath::new("uploads/recipe/a.png"));
    recipe.apply(RecipePatch::from(draft("Other")));
    assert_eq!(
        recipe.image().map(AsRef::as_ref),
        Some("uploads/recipe/a.png")
    );
}

#[rstest]
#[case(RecipeOperation::List, RecipeView::Summary)]
#[case(RecipeOperation::Create, RecipeView::Summary)]
#[case(RecipeOperation::Update, RecipeView::Summary)]
#[case(RecipeOperation::PartialUpdate, RecipeView::Summary)]
#[case(RecipeOperation::Retrieve, RecipeView::Detail)]
#[case(RecipeOperation::UploadImage, RecipeView::ImageUpload)]
fn operations_select_their_view(#[case] operation: RecipeOperation, #[case] view: RecipeView) {
    assert_eq!(operation.view(), view);
}

#[rstest]
fn touches_associations_tracks_id_sets() {
    assert!(!RecipePatch::default().touches_associations());
    let patch = RecipePatch {
        ingredient_ids: Some(BTreeSet::new()),
        ..RecipePatch::default()
    };
    assert!(patch.touches_associations());
}
