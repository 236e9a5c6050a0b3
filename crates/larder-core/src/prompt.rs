use std::fmt::Write;

use crate::food::{InventoryLine, Location};

const DETECTION_TEMPLATE: &str = "\
You are analyzing a photo of a {location}. Identify all visible food items.

For each item, provide:
- name: the food item name
- quantity: estimated quantity (e.g., \"1 bottle\", \"2 lbs\", \"half full\", \"3 cans\")
- expiry_estimate: rough estimate of when it might expire (e.g., \"3 days\", \"1 week\", \"2 months\", \"N/A\" for non-perishables)

Respond ONLY with a JSON array. No other text. Example:
[
  {\"name\": \"Milk\", \"quantity\": \"1 gallon, half full\", \"expiry_estimate\": \"5 days\"},
  {\"name\": \"Eggs\", \"quantity\": \"~8 eggs\", \"expiry_estimate\": \"2 weeks\"}
]";

const MEAL_PLAN_PREAMBLE: &str = "\
Based on the following food inventory, create a 7-day meal plan with breakfast, lunch, dinner, \
and one dessert per day. Use primarily items from the inventory. Note when grocery shopping is \
needed for missing ingredients.

INVENTORY:
";

const MEAL_PLAN_FORMAT: &str = r#"
Respond ONLY with JSON in this format:
{
  "days": [
    {
      "day": "Monday",
      "breakfast": {"meal": "...", "ingredients": ["..."], "notes": "..."},
      "lunch": {"meal": "...", "ingredients": ["..."], "notes": "..."},
      "dinner": {"meal": "...", "ingredients": ["..."], "notes": "..."},
      "dessert": {"meal": "...", "ingredients": ["..."], "notes": "..."}
    }
  ],
  "grocery_list": ["items not in inventory that are needed"]
}"#;

/// Instruction sent alongside a photo of `location`.
#[must_use]
pub fn detection_prompt(location: Location) -> String {
    DETECTION_TEMPLATE.replace("{location}", location.as_str())
}

/// Instruction asking for a week of meals built from `inventory`.
#[must_use]
pub fn meal_plan_prompt(inventory: &[InventoryLine]) -> String {
    let mut out = String::from(MEAL_PLAN_PREAMBLE);
    for (i, line) in inventory.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = write!(out, "- {} ({}) [{}]", line.name, line.quantity, line.category);
    }
    out.push('\n');
    out.push_str(MEAL_PLAN_FORMAT);
    out
}
