use crate::models::{Conversation, Message, Role};

/// Markdown transcript used for sharing a conversation.
pub fn export_to_markdown(conversation: &Conversation) -> String {
    let mut output = format!("# {}\n\n", conversation.title);
    output.push_str(&format!(
        "> Date: {}\n\n",
        conversation.timestamp.format("%Y-%m-%d %H:%M")
    ));
    output.push_str("---\n\n");

    for msg in &conversation.messages {
        let role_label = match (msg.role(), msg.role_str()) {
            (Some(Role::User), _) => "You",
            (Some(Role::Assistant), _) => "Assistant",
            (None, Some(other)) => other,
            (None, None) => "Unknown",
        };
        output.push_str(&format!("### {}\n\n", role_label));
        render_body(&mut output, msg);
    }

    output
}

fn render_body(output: &mut String, msg: &Message) {
    if let Some(text) = msg.text_content() {
        output.push_str(text);
        output.push_str("\n\n");
    }

    if let Some(recipe) = msg.recipe() {
        output.push_str(&format!("**{}**\n\n", recipe.title));
        let details: Vec<String> = [
            recipe.prep_time.as_ref().map(|t| format!("Time: {}", t)),
            recipe.servings.map(|s| format!("Servings: {}", s)),
            recipe.difficulty.as_ref().map(|d| format!("Difficulty: {}", d)),
        ]
        .into_iter()
        .flatten()
        .collect();
        if !details.is_empty() {
            output.push_str(&format!("_{}_\n\n", details.join(" | ")));
        }
        for ingredient in &recipe.ingredients {
            output.push_str(&format!("- {}\n", ingredient));
        }
        if !recipe.ingredients.is_empty() {
            output.push('\n');
        }
        for (i, step) in recipe.steps.iter().enumerate() {
            output.push_str(&format!("{}. {}\n", i + 1, step));
        }
        if !recipe.steps.is_empty() {
            output.push('\n');
        }
    }

    if let Some(nutrition) = msg.nutrition() {
        let facts: Vec<String> = [
            nutrition.calories.map(|v| format!("Calories: {} kcal", v)),
            nutrition.protein.map(|v| format!("Protein: {} g", v)),
            nutrition.carbs.map(|v| format!("Carbs: {} g", v)),
            nutrition.fat.map(|v| format!("Fat: {} g", v)),
        ]
        .into_iter()
        .flatten()
        .collect();
        if !facts.is_empty() {
            output.push_str(&format!("{}\n\n", facts.join(" | ")));
        }
    }

    if let Some(video) = msg.video() {
        output.push_str(&format!("<{}>\n\n", video.url));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn conversation(messages: Vec<Message>) -> Conversation {
        Conversation {
            id: "c1".to_string(),
            title: "Phở bò".to_string(),
            timestamp: Utc.with_ymd_and_hms(2025, 3, 1, 18, 30, 0).unwrap(),
            messages,
            pinned: false,
            order: None,
        }
    }

    #[test]
    fn test_text_transcript() {
        let md = export_to_markdown(&conversation(vec![
            Message::user(1, "Cách nấu phở?"),
            Message::assistant(2, "Đây là công thức:"),
        ]));

        assert!(md.starts_with("# Phở bò\n\n> Date: 2025-03-01 18:30\n\n---\n\n"));
        assert!(md.contains("### You\n\nCách nấu phở?\n\n"));
        assert!(md.contains("### Assistant\n\nĐây là công thức:\n\n"));
    }

    #[test]
    fn test_rich_turns() {
        let recipe_turn = Message::from_value(json!({
            "id": 3,
            "role": "assistant",
            "type": "recipe",
            "recipe": {
                "title": "Phở Bò Truyền Thống",
                "ingredients": ["500g thịt bò"],
                "steps": ["Chần xương", "Ninh nước dùng"],
                "prepTime": "4 giờ",
                "servings": 4
            },
            "nutrition": {"calories": 450, "protein": 30},
            "video": {"url": "https://www.youtube.com/watch?v=abc"}
        }));

        let md = export_to_markdown(&conversation(vec![recipe_turn]));

        assert!(md.contains("**Phở Bò Truyền Thống**"));
        assert!(md.contains("_Time: 4 giờ | Servings: 4_"));
        assert!(md.contains("- 500g thịt bò\n"));
        assert!(md.contains("1. Chần xương\n2. Ninh nước dùng\n"));
        assert!(md.contains("Calories: 450 kcal | Protein: 30 g"));
        assert!(md.contains("<https://www.youtube.com/watch?v=abc>"));
    }

    #[test]
    fn test_unknown_role_and_malformed_recipe() {
        let turn = Message::from_value(json!({
            "role": "tool",
            "content": "đã lưu",
            "recipe": {"ingredients": "not a list"}
        }));

        let md = export_to_markdown(&conversation(vec![turn]));

        assert!(md.contains("### tool\n\nđã lưu\n\n"));
        assert!(!md.contains("**"));
    }
}
