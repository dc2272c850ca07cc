use mealplanner::errors::ImportError;
use mealplanner::import::{extract_from_html, from_text, validate_title, ImportedRecipe};
use mealplanner::ingredient_model::{Quantity, RecipeSource};

#[cfg(test)]
mod tests {
    use super::*;

    const JSONLD_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
<title>Chefkoch - Kürbissuppe</title>
<script type="application/ld+json">
{
  "@context": "https://schema.org",
  "@graph": [
    { "@type": "WebSite", "name": "Chefkoch" },
    {
      "@type": "Recipe",
      "name": "Kürbissuppe",
      "recipeYield": ["4", "4 Portionen"],
      "totalTime": "PT45M",
      "image": { "@type": "ImageObject", "url": "https://example.org/kuerbis.jpg" },
      "recipeIngredient": ["1 kg Hokkaido", "2 Zwiebeln", "400 ml Kokosmilch", "Salz"],
      "recipeInstructions": [
        { "@type": "HowToSection", "name": "Vorbereitung", "itemListElement": [
          { "@type": "HowToStep", "text": "Kürbis würfeln." }
        ]},
        { "@type": "HowToStep", "text": "Alles weich kochen und pürieren." }
      ]
    }
  ]
}
</script>
</head>
<body><h1>Kürbissuppe</h1></body>
</html>"#;

    const PLAIN_PAGE: &str = r#"<html>
<head><title>Omas Küche</title></head>
<body>
<h1>Omas Gulasch</h1>
<h2>Zutaten</h2>
<ul><li>800 g Rindfleisch</li><li>3 Zwiebeln</li></ul>
<h2>Zubereitung</h2>
<p>Zwiebeln in Butter goldbraun anbraten.</p>
<p>Fleisch zugeben und zwei Stunden schmoren.</p>
</body>
</html>"#;

    const MICRODATA_PAGE: &str = r#"<html>
<head><title>Backblog</title></head>
<body>
<article itemscope itemtype="https://schema.org/Recipe">
  <h1 itemprop="name">Zwetschgenkuchen</h1>
  <div itemprop="author" itemscope itemtype="https://schema.org/Person">
    <span itemprop="name">Oma Hilde</span>
  </div>
  <meta itemprop="totalTime" content="PT1H15M">
  <img itemprop="image" src="https://example.org/zwetschgen.jpg">
  <p>Für <span itemprop="recipeYield">12 Stücke</span></p>
  <ul>
    <li itemprop="recipeIngredient">300 g Mehl</li>
    <li itemprop="recipeIngredient"><span>1 kg</span> <span>Zwetschgen</span></li>
    <li itemprop="ingredients">1 Prise Salz</li>
  </ul>
  <ol itemprop="recipeInstructions">
    <li>Teig kneten.</li>
    <li>Zwetschgen entsteinen und belegen.</li>
  </ol>
</article>
</body>
</html>"#;

    #[test]
    fn test_microdata_recipe() {
        let imported = extract_from_html(MICRODATA_PAGE, "https://example.org/zwetschgen").unwrap();
        assert_eq!(imported.title.as_deref(), Some("Zwetschgenkuchen"));
        assert_eq!(imported.total_time.as_deref(), Some("PT1H15M"));
        assert_eq!(imported.image_url.as_deref(), Some("https://example.org/zwetschgen.jpg"));
        assert_eq!(imported.servings.as_deref(), Some("12 Stücke"));
        assert_eq!(
            imported.ingredients,
            vec!["300 g Mehl", "1 kg Zwetschgen", "1 Prise Salz"]
        );
        assert_eq!(
            imported.steps,
            vec!["Teig kneten.", "Zwetschgen entsteinen und belegen."]
        );

        let recipe = imported.into_new_recipe(2, Some("de"));
        assert_eq!(recipe.base_servings, 12);
        assert_eq!(recipe.ingredients[1].unit, "kg");
    }

    #[test]
    fn test_jsonld_recipe_in_graph() {
        let imported = extract_from_html(JSONLD_PAGE, "https://example.org/kuerbis").unwrap();
        assert_eq!(imported.source, RecipeSource::Url);
        assert_eq!(imported.title.as_deref(), Some("Kürbissuppe"));
        assert_eq!(imported.total_time.as_deref(), Some("PT45M"));
        assert_eq!(imported.image_url.as_deref(), Some("https://example.org/kuerbis.jpg"));
        assert_eq!(imported.source_url.as_deref(), Some("https://example.org/kuerbis"));
        assert_eq!(imported.ingredients.len(), 4);
        assert_eq!(
            imported.steps,
            vec!["Kürbis würfeln.", "Alles weich kochen und pürieren."]
        );

        let recipe = imported.into_new_recipe(2, Some("de"));
        assert_eq!(recipe.base_servings, 4);
        assert_eq!(recipe.ingredients[0].quantity, Some(Quantity::amount(1)));
        assert_eq!(recipe.ingredients[0].unit, "kg");
        assert_eq!(recipe.ingredients[3].name, "Salz");
        assert_eq!(recipe.ingredients[3].quantity, None);
    }

    #[test]
    fn test_page_text_fallback() {
        let imported = extract_from_html(PLAIN_PAGE, "https://example.org/gulasch").unwrap();
        assert_eq!(imported.title.as_deref(), Some("Omas Gulasch"));
        assert_eq!(imported.ingredients, vec!["800 g Rindfleisch", "3 Zwiebeln"]);
        assert_eq!(imported.steps.len(), 2);
        assert!(imported.servings.is_none());

        let recipe = imported.into_new_recipe(2, Some("de"));
        assert_eq!(recipe.base_servings, 2);
    }

    #[test]
    fn test_page_without_text_has_no_content() {
        let result = extract_from_html("<html><body></body></html>", "https://example.org");
        assert!(matches!(result, Err(ImportError::NoContent)));
    }

    #[test]
    fn test_text_import_without_headers() {
        let text = "Schnelle Nudeln\n\n- 250 g Spaghetti\n- 1 EL Olivenöl\n- Parmesan\nNudeln kochen und mit Öl mischen.";
        let imported = from_text(text).unwrap();
        assert_eq!(imported.source, RecipeSource::Text);
        assert_eq!(imported.title.as_deref(), Some("Schnelle Nudeln"));
        assert_eq!(
            imported.ingredients,
            vec!["250 g Spaghetti", "1 EL Olivenöl", "Parmesan"]
        );
        assert_eq!(imported.steps, vec!["Nudeln kochen und mit Öl mischen."]);
        assert_eq!(imported.raw_text.as_deref(), Some(text));
    }

    #[test]
    fn test_fallback_titles_per_source() {
        let text = ImportedRecipe::new(RecipeSource::Text).into_new_recipe(2, Some("de"));
        assert_eq!(text.title, "Freitext Rezept");

        let pdf = ImportedRecipe::new(RecipeSource::Pdf).into_new_recipe(2, Some("en"));
        assert_eq!(pdf.title, "PDF recipe");

        let mut blank = ImportedRecipe::new(RecipeSource::Url);
        blank.title = Some("   ".to_string());
        assert_eq!(blank.into_new_recipe(2, Some("en")).title, "Untitled recipe");
    }

    #[test]
    fn test_long_titles_are_cut() {
        let title = "Ä".repeat(300);
        let validated = validate_title(&title).unwrap();
        assert_eq!(validated.chars().count(), 255);
    }

    #[test]
    fn test_unreadable_servings_use_default() {
        let mut imported = ImportedRecipe::new(RecipeSource::Url);
        imported.title = Some("Brot".to_string());
        imported.servings = Some("ein Laib".to_string());
        assert_eq!(imported.into_new_recipe(3, None).base_servings, 3);
    }
}
