use serde_json::Value;

use crate::errors::{ImportError, ImportResult};

const WIDGET_NAME_KEY: &str = "widgetName";
const CHILDREN_KEY: &str = "children";

/// Widget tree of a page layout.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutDocument {
    root: Value,
}

impl LayoutDocument {
    pub fn parse(serialized: &str) -> ImportResult<Self> {
        let root: Value = serde_json::from_str(serialized)?;
        Self::from_value(root)
    }

    pub fn from_value(root: Value) -> ImportResult<Self> {
        if !root.is_object() {
            return Err(ImportError::Format(
                "layout root must be a widget object".to_string(),
            ));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn into_value(self) -> Value {
        self.root
    }

    /// Names of every widget below the root canvas, in document order.
    ///
    /// The root canvas is shared by every page and is never a name to reconcile.
    pub fn widget_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        if let Some(children) = self.root.get(CHILDREN_KEY).and_then(Value::as_array) {
            for child in children {
                collect_widget_names(child, &mut names);
            }
        }
        names
    }

    /// Rewrite every string leaf, leaving object keys and non-string values alone.
    pub fn map_strings<F>(mut self, mut rewrite: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        map_string_leaves(&mut self.root, &mut rewrite);
        self
    }
}

fn collect_widget_names(widget: &Value, names: &mut Vec<String>) {
    if let Some(name) = widget.get(WIDGET_NAME_KEY).and_then(Value::as_str) {
        names.push(name.to_string());
    }
    if let Some(children) = widget.get(CHILDREN_KEY).and_then(Value::as_array) {
        for child in children {
            collect_widget_names(child, names);
        }
    }
}

fn map_string_leaves<F>(value: &mut Value, rewrite: &mut F)
where
    F: FnMut(&str) -> Option<String>,
{
    match value {
        Value::String(text) => {
            if let Some(updated) = rewrite(text) {
                *text = updated;
            }
        }
        Value::Array(items) => {
            for item in items {
                map_string_leaves(item, rewrite);
            }
        }
        Value::Object(map) => {
            for (_, item) in map.iter_mut() {
                map_string_leaves(item, rewrite);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> LayoutDocument {
        LayoutDocument::from_value(json!({
            "widgetName": "MainContainer",
            "children": [
                {
                    "widgetName": "Container1",
                    "children": [
                        { "widgetName": "Table1", "tableData": "{{Query1.data}}" }
                    ]
                },
                { "widgetName": "Button1", "isVisible": true }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn widget_names_skip_root_canvas() {
        assert_eq!(
            sample().widget_names(),
            vec!["Container1", "Table1", "Button1"]
        );
    }

    #[test]
    fn map_strings_touches_only_string_leaves() {
        let doc = sample().map_strings(|s| Some(s.to_uppercase()));
        assert_eq!(doc.root()["children"][0]["children"][0]["tableData"], "{{QUERY1.DATA}}");
        assert_eq!(doc.root()["children"][1]["isVisible"], true);
        assert!(doc.root().get("widgetName").is_some());
    }

    #[test]
    fn malformed_layout_is_a_format_error() {
        let err = LayoutDocument::parse("{\"children\": [").unwrap_err();
        assert_eq!(err.error_code(), "FORMAT_ERROR");

        let err = LayoutDocument::parse("[1, 2]").unwrap_err();
        assert_eq!(err.error_code(), "FORMAT_ERROR");
    }
}
