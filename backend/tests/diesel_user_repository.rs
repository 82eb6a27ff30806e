//! `DieselUserRepository` against embedded PostgreSQL.
//!
//! The schema has no `ON DELETE CASCADE`, so `delete_with_dependents` must
//! clear tokens, link rows, recipes and attributes itself.

use std::collections::BTreeSet;

use recipe_backend::domain::ports::{
    AttributeRepository, AuthTokenRepository, RecipeRepository, UserPersistenceError,
    UserRepository,
};
use recipe_backend::domain::{
    Attribute, AttributeId, AttributeKind, AttributeName, AuthToken, EmailAddress, Recipe,
    RecipeId, User, UserFlags, UserId, UserName,
};
use recipe_backend::outbound::persistence::{
    DieselAttributeRepository, DieselAuthTokenRepository, DieselRecipeRepository,
    DieselUserRepository,
};
use rstest::{fixture, rstest};

mod support;

use support::{PgContext, draft, handle_cluster_setup_failure, setup_context};

const TEST_DB: &str = "diesel_user_repository_test";

struct Repos {
    ctx: PgContext,
    users: DieselUserRepository,
    tokens: DieselAuthTokenRepository,
    attributes: DieselAttributeRepository,
    recipes: DieselRecipeRepository,
}

impl Repos {
    fn attribute(&self, owner: UserId, kind: AttributeKind, name: &str) -> AttributeId {
        let name = AttributeName::new(name).expect("name");
        let attribute = Attribute::new(AttributeId::random(), kind, name, owner);
        self.ctx
            .runtime
            .block_on(self.attributes.insert(&attribute))
            .expect("insert attribute");
        attribute.id()
    }

    fn recipe(&self, owner: UserId, tags: &[AttributeId], ingredients: &[AttributeId]) -> RecipeId {
        let recipe = Recipe::create(RecipeId::random(), owner, draft("Stew", tags, ingredients));
        self.ctx
            .runtime
            .block_on(self.recipes.insert(&recipe))
            .expect("insert recipe");
        recipe.id()
    }
}

fn setup() -> Result<Repos, String> {
    let ctx = setup_context(TEST_DB)?;
    Ok(Repos {
        users: DieselUserRepository::new(ctx.pool.clone()),
        tokens: DieselAuthTokenRepository::new(ctx.pool.clone()),
        attributes: DieselAttributeRepository::new(ctx.pool.clone()),
        recipes: DieselRecipeRepository::new(ctx.pool.clone()),
        ctx,
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
fn delete_removes_the_user_and_every_row_they_own(repos: Option<Repos>) {
    let Some(repos) = repos else {
        eprintln!("SKIP-TEST-CLUSTER: delete_removes_the_user_and_every_row_they_own skipped");
        return;
    };
    let doomed = repos.ctx.seed_user("doomed@example.com");
    let survivor = repos.ctx.seed_user("survivor@example.com");
    let token = AuthToken::issue();
    repos
        .ctx
        .runtime
        .block_on(repos.tokens.replace(&doomed, &token.digest()))
        .expect("store token");
    let quick = repos.attribute(doomed, AttributeKind::Tag, "Quick");
    let salt = repos.attribute(doomed, AttributeKind::Ingredient, "Salt");
    let kept_tag = repos.attribute(survivor, AttributeKind::Tag, "Hearty");
    let kept_ingredient = repos.attribute(survivor, AttributeKind::Ingredient, "Beans");
    repos.recipe(doomed, &[quick], &[salt]);
    // the adapter does not check ownership, so a foreign link can exist
    let shared = repos.recipe(survivor, &[quick, kept_tag], &[salt, kept_ingredient]);

    let (deleted, again) = repos.ctx.runtime.block_on(async {
        let deleted = repos.users.delete_with_dependents(&doomed).await.expect("delete");
        let again = repos.users.delete_with_dependents(&doomed).await.expect("delete");
        (deleted, again)
    });

    assert!(deleted);
    assert!(!again);
    let (user, owner_of_token, remaining) = repos.ctx.runtime.block_on(async {
        (
            repos.users.find_by_id(&doomed).await.expect("find user"),
            repos.tokens.find_user(&token.digest()).await.expect("find token"),
            repos.recipes.find_by_id(&shared).await.expect("find recipe"),
        )
    });
    assert_eq!(user, None);
    assert_eq!(owner_of_token, None);
    let remaining = remaining.expect("survivor's recipe is kept");
    assert_eq!(remaining.tag_ids(), &BTreeSet::from([kept_tag]));
    assert_eq!(remaining.ingredient_ids(), &BTreeSet::from([kept_ingredient]));
    assert_eq!(repos.ctx.count("recipes"), 1);
    assert_eq!(repos.ctx.count("tags"), 1);
    assert_eq!(repos.ctx.count("ingredients"), 1);
    assert_eq!(repos.ctx.count("recipe_tags"), 1);
    assert_eq!(repos.ctx.count("recipe_ingredients"), 1);
    assert_eq!(repos.ctx.count("auth_tokens"), 0);
}

#[rstest]
fn duplicate_emails_are_reported(repos: Option<Repos>) {
    let Some(repos) = repos else {
        eprintln!("SKIP-TEST-CLUSTER: duplicate_emails_are_reported skipped");
        return;
    };
    repos.ctx.seed_user("taken@example.com");
    let clash = User::new(
        UserId::random(),
        EmailAddress::new("taken@example.com").expect("email"),
        UserName::default(),
        None,
        UserFlags::default(),
    );

    let result = repos.ctx.runtime.block_on(repos.users.insert(&clash));

    assert!(
        matches!(result, Err(UserPersistenceError::DuplicateEmail { .. })),
        "expected DuplicateEmail, got: {result:?}"
    );
}

#[rstest]
fn lookups_find_users_by_id_and_email(repos: Option<Repos>) {
    let Some(repos) = repos else {
        eprintln!("SKIP-TEST-CLUSTER: lookups_find_users_by_id_and_email skipped");
        return;
    };
    let user = User::new(
        UserId::random(),
        EmailAddress::new("Cook@Example.com").expect("email"),
        UserName::new("Cook").expect("name"),
        None,
        UserFlags::superuser(),
    );

    let (by_id, by_email) = repos.ctx.runtime.block_on(async {
        repos.users.insert(&user).await.expect("insert user");
        (
            repos.users.find_by_id(&user.id()).await.expect("find by id"),
            repos.users.find_by_email(user.email()).await.expect("find by email"),
        )
    });

    assert_eq!(by_id.as_ref(), Some(&user));
    assert_eq!(by_email, Some(user));
}
