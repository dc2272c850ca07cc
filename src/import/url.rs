//! Web page import
//!
//! Pages are fetched with `reqwest` under a timeout, retrying transient
//! failures with exponential backoff plus random jitter. Structured
//! `schema.org/Recipe` data in JSON-LD is preferred; pages without it fall back
//! to their readable text and the same section guessing used for pasted text.

use std::time::Duration;

use lazy_static::lazy_static;
use log::{debug, info, warn};
use rand::Rng;
use reqwest::{Client, StatusCode};
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

use super::ImportedRecipe;
use crate::config::{HttpConfig, RetryConfig};
use crate::errors::ImportError;
use crate::ingredient_model::RecipeSource;
use crate::text_processing::{clean_lines, guess_sections};

lazy_static! {
    static ref JSONLD_SELECTOR: Selector = Selector::parse("script[type='application/ld+json']")
        .expect("JSON-LD selector should be valid");
    static ref TITLE_SELECTOR: Selector =
        Selector::parse("title").expect("Title selector should be valid");
    static ref H1_SELECTOR: Selector = Selector::parse("h1").expect("H1 selector should be valid");
    static ref TEXT_BLOCK_SELECTOR: Selector =
        Selector::parse("h1, h2, h3, h4, p, li").expect("Text block selector should be valid");
    static ref ITEMSCOPE_SELECTOR: Selector =
        Selector::parse("[itemscope][itemtype]").expect("Itemscope selector should be valid");
    static ref ITEMPROP_SELECTOR: Selector =
        Selector::parse("[itemprop]").expect("Itemprop selector should be valid");
    static ref LI_SELECTOR: Selector = Selector::parse("li").expect("List item selector should be valid");
}

/// Build the HTTP client used for recipe pages
pub fn build_client(config: &HttpConfig) -> Result<Client, ImportError> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(concat!("mealplanner/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ImportError::Fetch {
            url: String::new(),
            message: e.to_string(),
        })
}

/// Whether a failed attempt is worth repeating
fn is_transient(error: &ImportError) -> bool {
    match error {
        ImportError::Fetch { .. } => true,
        ImportError::HttpStatus { status, .. } => {
            *status == StatusCode::TOO_MANY_REQUESTS.as_u16() || *status >= 500
        }
        _ => false,
    }
}

async fn fetch_once(client: &Client, url: &str) -> Result<String, ImportError> {
    let response = client.get(url).send().await.map_err(|e| ImportError::Fetch {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ImportError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|e| ImportError::Fetch {
        url: url.to_string(),
        message: e.to_string(),
    })
}

/// Fetch a page, retrying transient failures
pub async fn fetch_html(client: &Client, url: &str, retry: &RetryConfig) -> Result<String, ImportError> {
    let mut attempt = 0;
    loop {
        match fetch_once(client, url).await {
            Ok(html) => {
                debug!("Fetched {} bytes from {}", html.len(), url);
                return Ok(html);
            }
            Err(e) if attempt < retry.max_retries && is_transient(&e) => {
                attempt += 1;
                let jitter = rand::thread_rng().gen_range(0..=retry.max_jitter_ms);
                let delay = retry.backoff(attempt) + Duration::from_millis(jitter);
                warn!(
                    "Fetching {} failed ({}), retry {}/{} in {:?}",
                    url, e, attempt, retry.max_retries, delay
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Import a recipe from a web page
pub async fn from_url(url: &str, config: &HttpConfig) -> Result<ImportedRecipe, ImportError> {
    info!("Importing recipe from {}", url);
    let client = build_client(config)?;
    let html = fetch_html(&client, url, &config.retry).await?;
    extract_from_html(&html, url)
}

/// Extract a recipe from page HTML
pub fn extract_from_html(html: &str, source_url: &str) -> Result<ImportedRecipe, ImportError> {
    let document = Html::parse_document(html);

    let mut recipe = if let Some(recipe) = extract_jsonld(&document) {
        debug!("Found JSON-LD recipe on {}", source_url);
        recipe
    } else if let Some(recipe) = extract_microdata(&document) {
        debug!("Found microdata recipe on {}", source_url);
        recipe
    } else {
        debug!("No structured recipe on {}, falling back to page text", source_url);
        extract_page_text(&document)?
    };

    recipe.source_url = Some(source_url.to_string());
    Ok(recipe)
}

fn extract_jsonld(document: &Html) -> Option<ImportedRecipe> {
    for element in document.select(&JSONLD_SELECTOR) {
        let json_text = element.inner_html();
        let json: Value = match serde_json::from_str(&sanitize_json(&json_text)) {
            Ok(json) => json,
            Err(e) => {
                debug!("Skipping unparseable JSON-LD block: {}", e);
                continue;
            }
        };
        if let Some(recipe) = find_recipe_in_json(&json).and_then(recipe_from_jsonld) {
            return Some(recipe);
        }
    }
    None
}

/// Escape raw control characters inside JSON strings; some sites emit literal
/// newlines in their JSON-LD
fn sanitize_json(json: &str) -> String {
    let mut result = String::with_capacity(json.len());
    let mut in_string = false;
    let mut escaped = false;

    for c in json.chars() {
        if in_string {
            if escaped {
                escaped = false;
                result.push(c);
                continue;
            }
            match c {
                '\\' => {
                    escaped = true;
                    result.push(c);
                }
                '"' => {
                    in_string = false;
                    result.push(c);
                }
                '\n' => result.push_str("\\n"),
                '\r' => result.push_str("\\r"),
                '\t' => result.push_str("\\t"),
                c if c.is_control() => {}
                c => result.push(c),
            }
        } else {
            if c == '"' {
                in_string = true;
            }
            result.push(c);
        }
    }

    result
}

fn is_recipe_type(value: &Value) -> bool {
    match value {
        Value::String(s) => s == "Recipe",
        Value::Array(types) => types.iter().any(|t| t == "Recipe"),
        _ => false,
    }
}

/// Depth-first search for a Recipe node, looking inside `@graph` and arrays
fn find_recipe_in_json(json: &Value) -> Option<&Value> {
    match json {
        Value::Object(obj) => {
            if obj.get("@type").is_some_and(is_recipe_type) {
                return Some(json);
            }
            if let Some(recipe) = obj.get("@graph").and_then(find_recipe_in_json) {
                return Some(recipe);
            }
            obj.values().find_map(find_recipe_in_json)
        }
        Value::Array(items) => items.iter().find_map(find_recipe_in_json),
        _ => None,
    }
}

/// String, number, or list of either, as one string
fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(text_value).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        _ => None,
    }
}

fn image_url(value: &Value) -> Option<String> {
    match value {
        Value::String(url) => Some(url.clone()),
        Value::Array(items) => items.iter().find_map(image_url),
        Value::Object(obj) => obj.get("url").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

fn collect_instructions(value: &Value, steps: &mut Vec<String>) {
    match value {
        Value::String(text) => {
            steps.extend(clean_lines(text));
        }
        Value::Array(items) => {
            for item in items {
                collect_instructions(item, steps);
            }
        }
        Value::Object(obj) => {
            // HowToSection nests its steps
            if let Some(items) = obj.get("itemListElement") {
                collect_instructions(items, steps);
            } else if let Some(text) = obj.get("text").and_then(Value::as_str) {
                let text = text.trim();
                if !text.is_empty() {
                    steps.push(text.to_string());
                }
            }
        }
        _ => {}
    }
}

fn recipe_from_jsonld(node: &Value) -> Option<ImportedRecipe> {
    let title = node
        .get("name")
        .or_else(|| node.get("headline"))
        .and_then(text_value)?;

    let mut recipe = ImportedRecipe::new(RecipeSource::Url);
    recipe.title = Some(title);
    recipe.servings = node.get("recipeYield").and_then(text_value);
    recipe.total_time = node.get("totalTime").and_then(text_value);
    recipe.image_url = node.get("image").and_then(image_url);
    recipe.ingredients = node
        .get("recipeIngredient")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    if let Some(instructions) = node.get("recipeInstructions") {
        collect_instructions(instructions, &mut recipe.steps);
    }
    recipe.raw_text = Some(node.to_string());
    Some(recipe)
}

fn is_recipe_itemtype(itemtype: &str) -> bool {
    itemtype
        .split_whitespace()
        .any(|t| t.trim_end_matches('/').ends_with("schema.org/Recipe"))
}

/// Whether `prop` belongs directly to `scope` and not to a nested item
/// (an author, a rating, a step)
fn owned_by(prop: ElementRef<'_>, scope: ElementRef<'_>) -> bool {
    prop.ancestors()
        .find(|node| {
            node.value()
                .as_element()
                .is_some_and(|e| e.attr("itemscope").is_some())
        })
        .is_some_and(|node| node.id() == scope.id())
}

/// Microdata property value: `content`, `datetime` or `src` attribute, else the text
fn microdata_value(prop: ElementRef<'_>) -> Option<String> {
    let element = prop.value();
    let value = element
        .attr("content")
        .or_else(|| element.attr("datetime"))
        .or_else(|| element.attr("src"))
        .map(str::to_string)
        .unwrap_or_else(|| element_text(prop));
    let value = value.split_whitespace().collect::<Vec<_>>().join(" ");
    (!value.is_empty()).then_some(value)
}

fn microdata_steps(prop: ElementRef<'_>, steps: &mut Vec<String>) {
    let items: Vec<String> = prop
        .select(&LI_SELECTOR)
        .filter_map(microdata_value)
        .collect();
    if !items.is_empty() {
        steps.extend(items);
    } else if let Some(text) = prop.value().attr("content") {
        steps.extend(clean_lines(text));
    } else {
        steps.extend(clean_lines(&prop.text().collect::<String>()));
    }
}

/// Recipe from schema.org microdata (`itemtype=".../Recipe"`)
fn extract_microdata(document: &Html) -> Option<ImportedRecipe> {
    let scope = document.select(&ITEMSCOPE_SELECTOR).find(|element| {
        element
            .value()
            .attr("itemtype")
            .is_some_and(is_recipe_itemtype)
    })?;

    let mut recipe = ImportedRecipe::new(RecipeSource::Url);
    for prop in scope.select(&ITEMPROP_SELECTOR) {
        if !owned_by(prop, scope) {
            continue;
        }
        let Some(names) = prop.value().attr("itemprop") else {
            continue;
        };
        for name in names.split_whitespace() {
            match name {
                "name" if recipe.title.is_none() => recipe.title = microdata_value(prop),
                "recipeYield" | "yield" if recipe.servings.is_none() => {
                    recipe.servings = microdata_value(prop)
                }
                "totalTime" if recipe.total_time.is_none() => recipe.total_time = microdata_value(prop),
                "image" if recipe.image_url.is_none() => recipe.image_url = microdata_value(prop),
                "recipeIngredient" | "ingredients" => {
                    recipe.ingredients.extend(microdata_value(prop))
                }
                "recipeInstructions" => microdata_steps(prop, &mut recipe.steps),
                _ => {}
            }
        }
    }

    recipe.title.as_ref()?;
    recipe.raw_text = Some(element_text(scope));
    Some(recipe)
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<Vec<_>>().join(" ")
}

fn extract_page_text(document: &Html) -> Result<ImportedRecipe, ImportError> {
    let text = document
        .select(&TEXT_BLOCK_SELECTOR)
        .map(element_text)
        .collect::<Vec<_>>()
        .join("\n");
    let lines = clean_lines(&text);
    if lines.is_empty() {
        return Err(ImportError::NoContent);
    }

    let sections = guess_sections(&lines);
    let title = document
        .select(&H1_SELECTOR)
        .next()
        .or_else(|| document.select(&TITLE_SELECTOR).next())
        .map(element_text)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    let mut recipe = ImportedRecipe::new(RecipeSource::Url);
    recipe.title = title;
    recipe.ingredients = sections.ingredients;
    recipe.steps = sections.steps;
    recipe.raw_text = Some(lines.join("\n"));
    Ok(recipe)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_json_escapes_raw_newlines() {
        let raw = "{\"name\": \"Line one\nLine two\"}";
        let value: Value = serde_json::from_str(&sanitize_json(raw)).unwrap();
        assert_eq!(value["name"], "Line one\nLine two");
    }

    #[test]
    fn test_sanitize_json_keeps_escaped_quotes() {
        let raw = r#"{"name": "Der \"beste\" Kuchen"}"#;
        let value: Value = serde_json::from_str(&sanitize_json(raw)).unwrap();
        assert_eq!(value["name"], "Der \"beste\" Kuchen");
    }

    #[test]
    fn test_find_recipe_in_graph() {
        let json: Value = serde_json::json!({
            "@context": "https://schema.org",
            "@graph": [
                { "@type": "WebPage", "name": "Page" },
                { "@type": ["Recipe", "NewsArticle"], "name": "Suppe" }
            ]
        });
        let recipe = find_recipe_in_json(&json).unwrap();
        assert_eq!(recipe["name"], "Suppe");
    }

    #[test]
    fn test_text_value_variants() {
        assert_eq!(text_value(&serde_json::json!(4)), Some("4".to_string()));
        assert_eq!(
            text_value(&serde_json::json!(["4", "4 Portionen"])),
            Some("4, 4 Portionen".to_string())
        );
        assert_eq!(text_value(&serde_json::json!("  ")), None);
    }

    #[test]
    fn test_transient_errors() {
        let server_error = ImportError::HttpStatus {
            url: "u".to_string(),
            status: 503,
        };
        let not_found = ImportError::HttpStatus {
            url: "u".to_string(),
            status: 404,
        };
        assert!(is_transient(&server_error));
        assert!(!is_transient(&not_found));
    }
}
