use kitchen_vibe::extract_recipe;
use serde_json::json;

fn create_recipe_html(json_ld: &str) -> String {
    format!(
        r#"
        <!DOCTYPE html>
        <html>
        <head>
            <title>Recipe Page</title>
            <script type="application/ld+json">
                {}
            </script>
        </head>
        <body>
            <h1>Recipe</h1>
        </body>
        </html>
        "#,
        json_ld
    )
}

#[test]
fn test_text_fields_pass_through_unmodified() {
    let json_ld = r#"
    {
        "@context": "https://schema.org",
        "@type": "Recipe",
        "name": "Mac &amp; Cheese ",
        "description": "",
        "prepTime": "PT15M",
        "cookTime": "PT1H30M",
        "recipeIngredient": ["  2 cups macaroni", ""],
        "recipeInstructions": "Boil. Stir."
    }
    "#;

    let recipe = extract_recipe(&create_recipe_html(json_ld)).unwrap();

    // No entity decoding, trimming or empty-value filtering at this layer
    assert_eq!(recipe.title.as_deref(), Some("Mac &amp; Cheese "));
    assert_eq!(recipe.description.as_deref(), Some(""));
    assert_eq!(recipe.prep_time.as_deref(), Some("PT15M"));
    assert_eq!(recipe.cook_time.as_deref(), Some("PT1H30M"));
    assert_eq!(recipe.ingredients, vec!["  2 cups macaroni", ""]);
    assert_eq!(recipe.instructions, vec!["Boil. Stir."]);
}

#[test]
fn test_recipe_yield_variations() {
    for (source, expected) in [
        (r#""8 portions""#, json!("8 portions")),
        ("4", json!(4)),
        (r#"["15", "15 Stück"]"#, json!(["15", "15 Stück"])),
    ] {
        let json_ld = format!(r#"{{"@type": "Recipe", "name": "Yield", "recipeYield": {source}}}"#);
        let recipe = extract_recipe(&create_recipe_html(&json_ld)).unwrap();
        assert_eq!(recipe.recipe_yield, Some(expected));
    }
}

#[test]
fn test_image_variations() {
    for (source, expected) in [
        (r#""https://example.com/a.jpg""#, json!("https://example.com/a.jpg")),
        (
            r#"{"@type": "ImageObject", "url": "https://example.com/b.jpg", "width": 1200}"#,
            json!("https://example.com/b.jpg"),
        ),
        (
            r#"[{"@type": "ImageObject", "url": "https://example.com/c.jpg"}]"#,
            json!([{"@type": "ImageObject", "url": "https://example.com/c.jpg"}]),
        ),
    ] {
        let json_ld = format!(r#"{{"@type": "Recipe", "name": "Image", "image": {source}}}"#);
        let recipe = extract_recipe(&create_recipe_html(&json_ld)).unwrap();
        assert_eq!(recipe.image, Some(expected));
    }
}

#[test]
fn test_how_to_sections_are_flattened() {
    let json_ld = r#"
    {
        "@type": "Recipe",
        "name": "Lasagna",
        "recipeInstructions": [
            {
                "@type": "HowToSection",
                "name": "Sauce",
                "itemListElement": [
                    {"@type": "HowToStep", "text": "Brown the beef."},
                    {"@type": "HowToStep", "text": "Add tomatoes."}
                ]
            },
            {
                "@type": "HowToSection",
                "name": "Assembly",
                "itemListElement": [
                    {"@type": "HowToStep", "text": "Layer noodles and sauce."}
                ]
            },
            {"@type": "HowToStep", "text": "Bake 45 minutes."}
        ]
    }
    "#;

    let recipe = extract_recipe(&create_recipe_html(json_ld)).unwrap();
    assert_eq!(
        recipe.instructions,
        vec![
            "Brown the beef.",
            "Add tomatoes.",
            "Layer noodles and sauce.",
            "Bake 45 minutes."
        ]
    );
}

#[test]
fn test_missing_ingredients_and_instructions() {
    let json_ld = r#"{"@type": "Recipe", "name": "Mystery Dish"}"#;

    let recipe = extract_recipe(&create_recipe_html(json_ld)).unwrap();
    assert_eq!(recipe.title.as_deref(), Some("Mystery Dish"));
    assert!(recipe.ingredients.is_empty());
    assert!(recipe.instructions.is_empty());
    assert!(recipe.image.is_none());
    assert!(recipe.recipe_yield.is_none());
}

#[test]
fn test_lowercase_type_is_not_a_recipe() {
    let json_ld = r#"{"@type": "recipe", "name": "Lowercase"}"#;
    assert!(extract_recipe(&create_recipe_html(json_ld)).is_none());
}

#[test]
fn test_ingredient_objects_are_dropped() {
    let json_ld = r#"
    {
        "@type": "Recipe",
        "name": "Mixed",
        "recipeIngredient": ["1 egg", {"name": "flour", "amount": "1 cup"}, "salt"]
    }
    "#;

    let recipe = extract_recipe(&create_recipe_html(json_ld)).unwrap();
    assert_eq!(recipe.ingredients, vec!["1 egg", "salt"]);
}
