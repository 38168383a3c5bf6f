mod common;

use feedandeat::db::models::{Nutrient, Recipe};
use feedandeat::search::{build_predicates, search_recipes, FilterRequest, SortMode};
use feedandeat::Error;

async fn catalogue() -> feedandeat::db::DbPool {
    let pool = common::memory_pool().await;
    let user = common::seed_user(&pool, "chef").await;
    common::seed_catalogue(&pool, &user).await;
    pool
}

async fn search(pool: &feedandeat::db::DbPool, query: &str) -> Vec<Recipe> {
    let filter = FilterRequest::from_query(Some(query), 20).unwrap();
    search_recipes(pool, &filter, 100).await.unwrap()
}

fn names(recipes: &[Recipe]) -> Vec<&str> {
    recipes.iter().map(|r| r.name.as_str()).collect()
}

#[tokio::test]
async fn test_no_filters_returns_newest_first_with_default_limit() {
    let pool = catalogue().await;

    let results = search(&pool, "").await;
    assert_eq!(results.len(), 20);
    assert_eq!(results[0].name, "Dish 29");
    assert_eq!(results[19].name, "Soup 10");
    assert!(results
        .windows(2)
        .all(|pair| pair[0].created_at >= pair[1].created_at));
}

#[tokio::test]
async fn test_tag_filter_is_or() {
    let pool = catalogue().await;

    let results = search(&pool, "tags=vegan&tags=quick&limit=100").await;
    assert_eq!(results.len(), 20);
    for recipe in &results {
        let tags = recipe.tag_list();
        assert!(
            tags.iter().any(|t| t == "vegan" || t == "quick"),
            "{} has tags {:?}",
            recipe.name,
            tags
        );
    }

    // Comma-separated and mixed-case forms select the same recipes
    let comma = search(&pool, "tags=Vegan,QUICK&limit=100").await;
    assert_eq!(names(&comma), names(&results));
}

#[tokio::test]
async fn test_calorie_range_excludes_missing_values() {
    let pool = catalogue().await;

    let results = search(&pool, "calories_min=100&calories_max=300&limit=100").await;
    let mut found = names(&results);
    found.sort();
    assert_eq!(
        found,
        vec!["Dish 11", "Dish 6", "Dish 7", "Dish 9", "Soup 10", "Soup 5"]
    );

    for recipe in &results {
        let calories = recipe.nutrient(Nutrient::Calories).unwrap();
        assert!((100.0..=300.0).contains(&calories));
    }
}

#[tokio::test]
async fn test_protein_bound_skips_recipes_without_protein() {
    let pool = catalogue().await;

    let results = search(&pool, "protein_min=0&limit=100").await;
    assert!(!results.is_empty());
    assert!(results
        .iter()
        .all(|r| r.nutrient(Nutrient::Protein).is_some()));
}

#[tokio::test]
async fn test_carbs_filter_uses_carbohydrates() {
    let pool = catalogue().await;

    let results = search(&pool, "carbs_max=5&limit=100").await;
    assert!(!results.is_empty());
    for recipe in &results {
        assert!(recipe.nutrient(Nutrient::Carbohydrates).unwrap() <= 5.0);
    }
}

#[tokio::test]
async fn test_sort_by_rating_is_non_increasing() {
    let pool = catalogue().await;

    let results = search(&pool, "sort=rating&limit=100").await;
    assert_eq!(results.len(), 30);
    assert!(results.windows(2).all(|pair| pair[0].rating >= pair[1].rating));
}

#[tokio::test]
async fn test_sort_by_popularity_is_non_increasing() {
    let pool = catalogue().await;

    let results = search(&pool, "sort=popularity&limit=100").await;
    assert!(results.windows(2).all(|pair| pair[0].cooked >= pair[1].cooked));
}

#[tokio::test]
async fn test_unknown_sort_falls_back_to_newest() {
    let pool = catalogue().await;

    let newest = search(&pool, "limit=100").await;
    let unknown = search(&pool, "sort=alphabetical&limit=100").await;
    assert_eq!(names(&unknown), names(&newest));
}

#[tokio::test]
async fn test_pagination_window() {
    let pool = catalogue().await;

    let all = search(&pool, "limit=100").await;
    let page = search(&pool, "limit=5&offset=10").await;
    assert_eq!(page.len(), 5);
    assert_eq!(names(&page), names(&all[10..15]));

    // Past the end
    assert!(search(&pool, "offset=100").await.is_empty());
    assert!(search(&pool, "limit=0").await.is_empty());
}

#[tokio::test]
async fn test_out_of_range_pagination_is_rejected() {
    let pool = catalogue().await;

    for query in ["limit=101", "limit=-1", "offset=-1"] {
        let filter = FilterRequest::from_query(Some(query), 20).unwrap();
        let result = search_recipes(&pool, &filter, 100).await;
        assert!(
            matches!(result, Err(Error::Validation(_))),
            "{query} should be rejected"
        );
    }
}

#[tokio::test]
async fn test_tag_and_nutrient_filters_combine_with_and() {
    let pool = catalogue().await;

    let results = search(&pool, "tags=vegan&calories_max=400&limit=100").await;
    let mut found = names(&results);
    found.sort();
    // Vegan is every third recipe; those without nutrients drop out
    assert_eq!(found, vec!["Dish 3", "Dish 6", "Dish 9", "Soup 15"]);
}

#[tokio::test]
async fn test_free_text_is_case_insensitive_substring() {
    let pool = catalogue().await;

    let results = search(&pool, "q=SOUP&limit=100").await;
    assert_eq!(results.len(), 6);
    assert!(results.iter().all(|r| r.name.starts_with("Soup")));

    let results = search(&pool, "q=ish+2&limit=100").await;
    let mut found = names(&results);
    found.sort();
    assert_eq!(
        found,
        vec!["Dish 2", "Dish 21", "Dish 22", "Dish 23", "Dish 24", "Dish 26", "Dish 27", "Dish 28", "Dish 29"]
    );
}

#[tokio::test]
async fn test_results_are_exactly_the_matching_recipes() {
    let pool = catalogue().await;
    let everything = search(&pool, "limit=100").await;

    for query in [
        "q=dish&tags=dinner",
        "tags=vegan&protein_min=10",
        "calories_min=200&carbs_min=10&sort=rating",
        "q=1&sugar_max=10",
        "tags=nonexistent",
        "fat_min=0",
    ] {
        let filter = FilterRequest::from_query(Some(&format!("{query}&limit=100")), 20).unwrap();
        let predicates = build_predicates(&filter);
        let results = search_recipes(&pool, &filter, 100).await.unwrap();

        let mut expected: Vec<&str> = everything
            .iter()
            .filter(|r| predicates.iter().all(|p| p.matches(r)))
            .map(|r| r.name.as_str())
            .collect();
        let mut found = names(&results);

        if filter.sort != SortMode::Newest {
            expected.sort();
            found.sort();
        }
        assert_eq!(found, expected, "mismatch for {query}");
    }
}
