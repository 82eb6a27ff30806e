//! `DieselRecipeRepository` against embedded PostgreSQL.
//!
//! Association sets live in `recipe_tags` and `recipe_ingredients`; updates
//! replace them wholesale and deletes remove them with the recipe.

use recipe_backend::domain::ports::{AttributeRepository, RecipeRepository};
use recipe_backend::domain::{
    Attribute, AttributeId, AttributeKind, AttributeName, ImagePath, Recipe, RecipeId,
    RecipePatch, UserId,
};
use recipe_backend::outbound::persistence::{DieselAttributeRepository, DieselRecipeRepository};
use rstest::{fixture, rstest};

mod support;

use support::{PgContext, draft, handle_cluster_setup_failure, setup_context};

const TEST_DB: &str = "diesel_recipe_repository_test";

struct Repos {
    ctx: PgContext,
    attributes: DieselAttributeRepository,
    recipes: DieselRecipeRepository,
    owner: UserId,
}

impl Repos {
    fn attribute(&self, kind: AttributeKind, name: &str) -> AttributeId {
        let name = AttributeName::new(name).expect("name");
        let attribute = Attribute::new(AttributeId::random(), kind, name, self.owner);
        self.ctx
            .runtime
            .block_on(self.attributes.insert(&attribute))
            .expect("insert attribute");
        attribute.id()
    }

    fn stored(&self, id: RecipeId) -> Option<Recipe> {
        self.ctx
            .runtime
            .block_on(self.recipes.find_by_id(&id))
            .expect("find recipe")
    }
}

fn setup() -> Result<Repos, String> {
    let ctx = setup_context(TEST_DB)?;
    let owner = ctx.seed_user("owner@example.com");
    Ok(Repos {
        attributes: DieselAttributeRepository::new(ctx.pool.clone()),
        recipes: DieselRecipeRepository::new(ctx.pool.clone()),
        ctx,
        owner,
    })
}

#[fixture]
fn repos() -> Option<Repos> {
    match setup() {
        Ok(repos) => Some(repos),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

#[rstest]
fn insert_round_trips_links(repos: Option<Repos>) {
    let Some(repos) = repos else {
        eprintln!("SKIP-TEST-CLUSTER: insert_round_trips_links skipped");
        return;
    };
    let quick = repos.attribute(AttributeKind::Tag, "Quick");
    let eggs = repos.attribute(AttributeKind::Ingredient, "Eggs");
    let omelette = draft("Omelette", &[quick], &[eggs]);
    let recipe = Recipe::create(RecipeId::random(), repos.owner, omelette);

    repos
        .ctx
        .runtime
        .block_on(repos.recipes.insert(&recipe))
        .expect("insert recipe");

    assert_eq!(repos.stored(recipe.id()), Some(recipe));
}

#[rstest]
fn update_replaces_the_association_sets(repos: Option<Repos>) {
    let Some(repos) = repos else {
        eprintln!("SKIP-TEST-CLUSTER: update_replaces_the_association_sets skipped");
        return;
    };
    let quick = repos.attribute(AttributeKind::Tag, "Quick");
    let vegan = repos.attribute(AttributeKind::Tag, "Vegan");
    let spicy = repos.attribute(AttributeKind::Tag, "Spicy");
    let salt = repos.attribute(AttributeKind::Ingredient, "Salt");
    let mut recipe = Recipe::create(
        RecipeId::random(),
        repos.owner,
        draft("Curry", &[quick, vegan], &[salt]),
    );
    repos
        .ctx
        .runtime
        .block_on(repos.recipes.insert(&recipe))
        .expect("insert recipe");

    recipe.apply(RecipePatch {
        tag_ids: Some([vegan, spicy].into_iter().collect()),
        ingredient_ids: Some(Default::default()),
        ..RecipePatch::default()
    });
    repos
        .ctx
        .runtime
        .block_on(repos.recipes.update(&recipe))
        .expect("update recipe");

    let stored = repos.stored(recipe.id()).expect("recipe exists");
    assert_eq!(stored.tag_ids(), recipe.tag_ids());
    assert!(stored.ingredient_ids().is_empty());
    assert_eq!(repos.ctx.count("recipe_tags"), 2);
    assert_eq!(repos.ctx.count("recipe_ingredients"), 0);
}

#[rstest]
fn delete_removes_the_recipe_and_its_links(repos: Option<Repos>) {
    let Some(repos) = repos else {
        eprintln!("SKIP-TEST-CLUSTER: delete_removes_the_recipe_and_its_links skipped");
        return;
    };
    let quick = repos.attribute(AttributeKind::Tag, "Quick");
    let eggs = repos.attribute(AttributeKind::Ingredient, "Eggs");
    let omelette = draft("Omelette", &[quick], &[eggs]);
    let recipe = Recipe::create(RecipeId::random(), repos.owner, omelette);
    repos
        .ctx
        .runtime
        .block_on(repos.recipes.insert(&recipe))
        .expect("insert recipe");

    let (first, second) = repos.ctx.runtime.block_on(async {
        let first = repos.recipes.delete(&recipe.id()).await.expect("delete");
        let second = repos.recipes.delete(&recipe.id()).await.expect("delete");
        (first, second)
    });

    assert!(first);
    assert!(!second);
    assert_eq!(repos.stored(recipe.id()), None);
    assert_eq!(repos.ctx.count("recipe_tags"), 0);
    assert_eq!(repos.ctx.count("recipe_ingredients"), 0);
    assert_eq!(repos.ctx.count("tags"), 1);
}

#[rstest]
fn listing_keeps_creation_order_for_one_owner(repos: Option<Repos>) {
    let Some(repos) = repos else {
        eprintln!("SKIP-TEST-CLUSTER: listing_keeps_creation_order_for_one_owner skipped");
        return;
    };
    let other = repos.ctx.seed_user("other@example.com");
    let titles = ["First", "Second", "Third"];
    for title in titles {
        let recipe = Recipe::create(RecipeId::random(), repos.owner, draft(title, &[], &[]));
        repos
            .ctx
            .runtime
            .block_on(repos.recipes.insert(&recipe))
            .expect("insert recipe");
    }
    let foreign = Recipe::create(RecipeId::random(), other, draft("Foreign", &[], &[]));
    repos
        .ctx
        .runtime
        .block_on(repos.recipes.insert(&foreign))
        .expect("insert recipe");

    let listed = repos
        .ctx
        .runtime
        .block_on(repos.recipes.list_for_owner(&repos.owner))
        .expect("list recipes");
    let listed_titles: Vec<&str> = listed.iter().map(|r| r.title().as_ref()).collect();

    assert_eq!(listed_titles, titles);
}

#[rstest]
fn set_image_records_the_path(repos: Option<Repos>) {
    let Some(repos) = repos else {
        eprintln!("SKIP-TEST-CLUSTER: set_image_records_the_path skipped");
        return;
    };
    let recipe = Recipe::create(RecipeId::random(), repos.owner, draft("Toast", &[], &[]));
    let path = ImagePath::new("uploads/recipe/0b1e5c34-8f25-4d0c-9d62-6f1b0e3b5e77.png");

    repos.ctx.runtime.block_on(async {
        repos.recipes.insert(&recipe).await.expect("insert recipe");
        repos.recipes.set_image(&recipe.id(), &path).await.expect("set image");
    });

    let stored = repos.stored(recipe.id()).expect("recipe exists");
    assert_eq!(stored.image(), Some(&path));
}
