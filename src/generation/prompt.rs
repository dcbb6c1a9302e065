/// Builds the fixed generation prompt. Blank restrictions are sent as `none`.
pub fn recipe_prompt(ingredients: &str, restrictions: Option<&str>) -> String {
    let restrictions = restrictions
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or("none");

    format!(
        "Create a recipe using these ingredients: {ingredients}

Dietary restrictions: {restrictions}

Please format your response EXACTLY like this example:

Delicious Recipe Name

Ingredients:
- 1 cup ingredient 1
- 2 tablespoons ingredient 2
- 1 teaspoon ingredient 3

Instructions:
1. First step description here
2. Second step description here
3. Third step description here
4. Continue with remaining steps

Keep the recipe simple, practical, and easy to follow. Use clear measurements and cooking times."
    )
}
