use crate::Result;
use reqwest::Client;
use serde::Deserialize;
use uuid::Uuid;

/// Search hit as printed by the CLI
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeSummary {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    pub rating: f64,
    pub cooked: i64,
}

/// Build the search URL for a server
pub fn search_url(
    server_url: &str,
    query: Option<&str>,
    tags: Option<&str>,
    sort: Option<&str>,
    limit: Option<i64>,
) -> String {
    let mut params = Vec::new();

    if let Some(query) = query {
        params.push(format!("q={}", urlencoding::encode(query)));
    }

    if let Some(tags) = tags {
        params.push(format!("tags={}", urlencoding::encode(tags)));
    }

    if let Some(sort) = sort {
        params.push(format!("sort={}", urlencoding::encode(sort)));
    }

    if let Some(limit) = limit {
        params.push(format!("limit={limit}"));
    }

    let base = format!("{}/recipes/search", server_url.trim_end_matches('/'));
    if params.is_empty() {
        base
    } else {
        format!("{base}?{}", params.join("&"))
    }
}

/// Query a running server's search endpoint
pub async fn fetch_search(
    server_url: &str,
    query: Option<&str>,
    tags: Option<&str>,
    sort: Option<&str>,
    limit: Option<i64>,
) -> Result<Vec<RecipeSummary>> {
    let client = Client::new();
    let url = search_url(server_url, query, tags, sort, limit);

    let response = client.get(&url).send().await?.error_for_status()?;
    let recipes: Vec<RecipeSummary> = response.json().await?;

    Ok(recipes)
}

/// Search for recipes and print them as a table
pub async fn search(
    server_url: &str,
    query: Option<&str>,
    tags: Option<&str>,
    sort: Option<&str>,
    limit: Option<i64>,
) -> Result<()> {
    let recipes = fetch_search(server_url, query, tags, sort, limit).await?;
    print_search_results(&recipes);
    Ok(())
}

fn print_search_results(recipes: &[RecipeSummary]) {
    if recipes.is_empty() {
        println!("No recipes found");
        return;
    }

    println!("\nFound {} recipes:\n", recipes.len());
    println!(
        "{:<36} {:<40} {:>6} {:>6} {:<20}",
        "ID", "Name", "Rating", "Cooked", "Tags"
    );
    println!("{}", "-".repeat(112));

    for recipe in recipes {
        let tags = recipe.tags.as_deref().unwrap_or_default().join(", ");

        println!(
            "{:<36} {:<40} {:>6.1} {:>6} {:<20}",
            recipe.id,
            truncate(&recipe.name, 38),
            recipe.rating,
            recipe.cooked,
            truncate(&tags, 18)
        );
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
