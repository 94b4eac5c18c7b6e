use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub title: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prep_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servings: Option<f64>,
    // Free text: the client ships localized labels ("Dễ", "Trung bình", "Khó").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Nutrition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servings: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    pub url: String,
}

/// One chat turn exactly as the client produced it.
///
/// The JSON is kept verbatim so fields this crate does not know about, or
/// values outside the shapes below, survive every rewrite of the slot. Typed
/// views are parsed on demand and come back `None` when they don't fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Message(Value);

impl Message {
    pub fn text(id: u64, role: Role, content: impl Into<String>) -> Self {
        Self(json!({
            "id": id,
            "role": role.as_str(),
            "type": "text",
            "content": content.into(),
        }))
    }

    pub fn user(id: u64, content: impl Into<String>) -> Self {
        Self::text(id, Role::User, content)
    }

    pub fn assistant(id: u64, content: impl Into<String>) -> Self {
        Self::text(id, Role::Assistant, content)
    }

    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// Raw role string, whatever it is.
    pub fn role_str(&self) -> Option<&str> {
        self.0.get("role").and_then(Value::as_str)
    }

    /// Role, if it is one this crate knows.
    pub fn role(&self) -> Option<Role> {
        self.role_str().and_then(Role::from_str)
    }

    /// Non-empty text content, if any.
    pub fn text_content(&self) -> Option<&str> {
        self.0
            .get("content")
            .and_then(Value::as_str)
            .filter(|c| !c.is_empty())
    }

    pub fn recipe(&self) -> Option<Recipe> {
        self.view("recipe")
    }

    pub fn nutrition(&self) -> Option<Nutrition> {
        self.view("nutrition")
    }

    pub fn video(&self) -> Option<Video> {
        self.view("video")
    }

    fn view<T: serde::de::DeserializeOwned>(&self, field: &str) -> Option<T> {
        let value = self.0.get(field)?;
        serde_json::from_value(value.clone()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_client_recipe_turn() {
        let json = r#"{
            "id": 5,
            "role": "assistant",
            "type": "recipe",
            "recipe": {
                "title": "Phở Bò Truyền Thống",
                "ingredients": ["1kg xương ống"],
                "steps": ["Chần xương"],
                "prepTime": "4 giờ",
                "servings": 4,
                "difficulty": "Trung bình"
            }
        }"#;

        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.role(), Some(Role::Assistant));
        assert!(msg.text_content().is_none());
        let recipe = msg.recipe().unwrap();
        assert_eq!(recipe.prep_time.as_deref(), Some("4 giờ"));
        assert_eq!(recipe.servings, Some(4.0));
    }

    #[test]
    fn test_off_schema_turn_is_kept_verbatim() {
        let json = r#"{"id":1.5,"role":"tool","type":"audio","audio_path":"/tmp/a.mp3","video":{"href":"x"}}"#;

        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.role(), None);
        assert_eq!(msg.role_str(), Some("tool"));
        assert_eq!(msg.video(), None);

        let written = serde_json::to_value(&msg).unwrap();
        assert_eq!(written, serde_json::from_str::<Value>(json).unwrap());
    }

    #[test]
    fn test_fractional_servings() {
        let msg: Message =
            serde_json::from_str(r#"{"role":"assistant","nutrition":{"calories":450,"servings":1.5}}"#)
                .unwrap();
        assert_eq!(msg.nutrition().unwrap().servings, Some(1.5));
    }

    #[test]
    fn test_empty_content_is_not_text() {
        let msg = Message::user(1, "");
        assert!(msg.text_content().is_none());
        assert_eq!(Message::user(2, "hi").text_content(), Some("hi"));
        assert_eq!(Message::user(2, "hi").role(), Some(Role::User));
    }
}
