//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are used
//! by Diesel for compile-time query validation and type-safe SQL generation.
//!
//! # Maintenance
//!
//! When migrations change the schema, this file should be regenerated or
//! manually updated to reflect those changes. The `diesel print-schema`
//! command can generate these definitions from a live database.

diesel::table! {
    /// User accounts keyed by normalised email.
    users (id) {
        id -> Uuid,
        /// Unique login email; domain part stored lower-case.
        email -> Varchar,
        name -> Varchar,
        /// PHC-encoded hash; NULL for accounts that cannot log in.
        password_hash -> Nullable<Text>,
        is_active -> Bool,
        is_staff -> Bool,
        is_superuser -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// One bearer token digest per user.
    auth_tokens (user_id) {
        user_id -> Uuid,
        /// Hex SHA-256 digest of the issued token.
        token_digest -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// User-owned recipe tags.
    tags (id) {
        id -> Uuid,
        user_id -> Uuid,
        name -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// User-owned recipe ingredients.
    ingredients (id) {
        id -> Uuid,
        user_id -> Uuid,
        name -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// User-owned recipes.
    recipes (id) {
        id -> Uuid,
        user_id -> Uuid,
        title -> Varchar,
        time_minutes -> Int4,
        /// NUMERIC(5, 2).
        cost -> Numeric,
        /// Empty string when no link is set.
        link -> Varchar,
        /// Image path relative to the media root.
        image -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Recipe to tag links.
    recipe_tags (recipe_id, tag_id) {
        recipe_id -> Uuid,
        tag_id -> Uuid,
    }
}

diesel::table! {
    /// Recipe to ingredient links.
    recipe_ingredients (recipe_id, ingredient_id) {
        recipe_id -> Uuid,
        ingredient_id -> Uuid,
    }
}

diesel::joinable!(auth_tokens -> users (user_id));
diesel::joinable!(tags -> users (user_id));
diesel::joinable!(ingredients -> users (user_id));
diesel::joinable!(recipes -> users (user_id));
diesel::joinable!(recipe_tags -> recipes (recipe_id));
diesel::joinable!(recipe_tags -> tags (tag_id));
diesel::joinable!(recipe_ingredients -> recipes (recipe_id));
diesel::joinable!(recipe_ingredients -> ingredients (ingredient_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    auth_tokens,
    tags,
    ingredients,
    recipes,
    recipe_tags,
    recipe_ingredients,
);
