//! Exported fragment document
//!
//! A fragment is the JSON export of a building block: one page, its actions and
//! JS objects, and the datasources, plugins and libraries they depend on. Only
//! the fields the partial import reads are modelled; everything else in the
//! export is ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{ImportError, ImportResult};

use super::layout::LayoutDocument;
use super::on_load::OnLoadActionRef;

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Fragment {
    /// Present only in full application exports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_application: Option<Value>,
    /// Present only in incremental exports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_resources: Option<Value>,
    #[serde(default)]
    pub page_list: Vec<FragmentPage>,
    #[serde(default)]
    pub action_list: Vec<FragmentAction>,
    #[serde(default)]
    pub action_collection_list: Vec<FragmentActionCollection>,
    #[serde(default)]
    pub datasource_list: Vec<FragmentDatasource>,
    #[serde(default)]
    pub plugin_list: Vec<FragmentPlugin>,
    #[serde(default, rename = "customJSLibList")]
    pub custom_js_lib_list: Vec<FragmentJsLib>,
    /// Serialized widget tree, used when the page carries no layout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widgets: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FragmentPage {
    pub name: String,
    #[serde(default)]
    pub layouts: Vec<FragmentLayout>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FragmentLayout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dsl: Option<Value>,
    #[serde(default)]
    pub layout_on_load_actions: Vec<Vec<OnLoadActionRef>>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FragmentPlugin {
    pub package_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub plugin_type: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FragmentDatasource {
    pub name: String,
    /// Plugin package name
    pub plugin_id: String,
    #[serde(default)]
    pub configuration: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_sync_id: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FragmentJsLib {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub uid_string: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub accessor: Vec<String>,
}

impl FragmentJsLib {
    pub fn uid(&self) -> String {
        self.uid_string
            .clone()
            .unwrap_or_else(|| format!("{}_{}", self.name, self.url))
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FragmentAction {
    /// Template identifier `<scope>_<local>`
    pub id: String,
    pub name: String,
    /// Plugin package name
    pub plugin_id: String,
    /// Datasource name, for plugin actions backed by a datasource
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datasource: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_id: Option<String>,
    /// Template identifier of the owning collection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,
    #[serde(default)]
    pub body: Value,
    #[serde(default)]
    pub execute_on_load: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_sync_id: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FragmentActionCollection {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_id: Option<String>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub variables: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_sync_id: Option<String>,
}

impl Fragment {
    /// Parse an exported document. Only a JSON object is a fragment.
    pub fn from_slice(bytes: &[u8]) -> ImportResult<Self> {
        let document: Value = serde_json::from_slice(bytes)
            .map_err(|e| ImportError::malformed(format!("not a fragment document: {}", e)))?;
        if !document.is_object() {
            return Err(ImportError::malformed(
                "not a fragment document: expected a JSON object",
            ));
        }
        serde_json::from_value(document)
            .map_err(|e| ImportError::malformed(format!("not a fragment document: {}", e)))
    }

    /// Reject documents that are not leaf building blocks.
    pub fn ensure_partial(&self) -> ImportResult<()> {
        if self.exported_application.is_some() {
            return Err(ImportError::malformed(
                "document carries a full application export",
            ));
        }
        if self.modified_resources.is_some() {
            return Err(ImportError::malformed(
                "document carries a modified-resources delta",
            ));
        }
        if self.page_list.len() > 1 {
            return Err(ImportError::malformed(format!(
                "document carries {} pages, a building block has at most one",
                self.page_list.len()
            )));
        }
        Ok(())
    }

    fn first_layout(&self) -> Option<&FragmentLayout> {
        self.page_list.first().and_then(|page| page.layouts.first())
    }

    /// The widget layout of the block: the page's first layout, or the
    /// top-level serialized widgets.
    pub fn widget_layout(&self) -> ImportResult<Option<LayoutDocument>> {
        if let Some(dsl) = self.first_layout().and_then(|layout| layout.dsl.as_ref()) {
            return match dsl {
                Value::String(serialized) => LayoutDocument::parse(serialized).map(Some),
                other => LayoutDocument::from_value(other.clone()).map(Some),
            };
        }

        match self.widgets.as_deref() {
            Some(serialized) => LayoutDocument::parse(serialized).map(Some),
            None => Ok(None),
        }
    }

    pub fn on_load_batches(&self) -> &[Vec<OnLoadActionRef>] {
        self.first_layout()
            .map(|layout| layout.layout_on_load_actions.as_slice())
            .unwrap_or(&[])
    }

    /// Package names referenced anywhere in the fragment, in first-seen order.
    pub fn referenced_plugin_packages(&self) -> Vec<String> {
        let mut packages: Vec<String> = Vec::new();
        let referenced = self
            .plugin_list
            .iter()
            .map(|p| p.package_name.as_str())
            .chain(self.datasource_list.iter().map(|d| d.plugin_id.as_str()))
            .chain(self.action_list.iter().map(|a| a.plugin_id.as_str()));
        for package in referenced {
            if !packages.iter().any(|p| p == package) {
                packages.push(package.to_string());
            }
        }
        packages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_camel_case_export() {
        let fragment = Fragment::from_slice(
            json!({
                "pageList": [{
                    "name": "Block",
                    "layouts": [{
                        "dsl": { "widgetName": "MainContainer", "children": [] },
                        "layoutOnLoadActions": [[{ "id": "Block_Query1", "name": "Query1" }]]
                    }]
                }],
                "actionList": [{
                    "id": "Block_Query1",
                    "name": "Query1",
                    "pluginId": "postgres-plugin",
                    "datasource": "Users DB",
                    "executeOnLoad": true
                }],
                "datasourceList": [{ "name": "Users DB", "pluginId": "postgres-plugin" }]
            })
            .to_string()
            .as_bytes(),
        )
        .unwrap();

        assert!(fragment.ensure_partial().is_ok());
        assert_eq!(fragment.action_list[0].datasource.as_deref(), Some("Users DB"));
        assert_eq!(fragment.on_load_batches().len(), 1);
        assert!(fragment.widget_layout().unwrap().is_some());
        assert_eq!(fragment.referenced_plugin_packages(), vec!["postgres-plugin"]);
    }

    #[test]
    fn full_exports_are_not_partial() {
        let fragment = Fragment {
            exported_application: Some(json!({ "name": "App" })),
            ..Default::default()
        };
        assert_eq!(
            fragment.ensure_partial().unwrap_err().error_code(),
            "MALFORMED_FRAGMENT"
        );

        let fragment = Fragment {
            page_list: vec![FragmentPage::default(), FragmentPage::default()],
            ..Default::default()
        };
        assert!(fragment.ensure_partial().is_err());

        let fragment = Fragment {
            modified_resources: Some(json!({})),
            ..Default::default()
        };
        assert!(fragment.ensure_partial().is_err());
    }

    #[test]
    fn falls_back_to_serialized_widgets() {
        let fragment = Fragment {
            widgets: Some(r#"{"widgetName":"MainContainer","children":[{"widgetName":"Text1"}]}"#.into()),
            ..Default::default()
        };
        let layout = fragment.widget_layout().unwrap().unwrap();
        assert_eq!(layout.widget_names(), vec!["Text1"]);

        let broken = Fragment {
            widgets: Some("{not json".into()),
            ..Default::default()
        };
        assert_eq!(broken.widget_layout().unwrap_err().error_code(), "FORMAT_ERROR");
    }

    #[test]
    fn garbage_documents_are_malformed() {
        let documents: [&[u8]; 4] = [b"[]", b"\"block\"", b"42", b"{\"pageList\": 3}"];
        for document in documents {
            let err = Fragment::from_slice(document).unwrap_err();
            assert_eq!(err.error_code(), "MALFORMED_FRAGMENT");
        }
    }

    #[test]
    fn js_lib_uid_defaults_to_name_and_url() {
        let lib = FragmentJsLib {
            name: "dayjs".into(),
            url: "https://cdn/dayjs.js".into(),
            ..Default::default()
        };
        assert_eq!(lib.uid(), "dayjs_https://cdn/dayjs.js");
    }
}
