use serde::Serialize;

use crate::window_types::WindowId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BridgeResult {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl BridgeResult {
    pub fn ok() -> Self {
        Self {
            ok: true,
            reason: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenedWindow {
    pub id: WindowId,
    pub label: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bridge_result_omits_missing_reason() {
        assert_eq!(
            serde_json::to_value(BridgeResult::ok()).expect("serialize"),
            serde_json::json!({ "ok": true })
        );
    }

    #[test]
    fn opened_window_carries_id_and_label() {
        let opened = OpenedWindow {
            id: WindowId::from("settings"),
            label: "settings".to_string(),
        };
        assert_eq!(
            serde_json::to_value(opened).expect("serialize"),
            serde_json::json!({ "id": "settings", "label": "settings" })
        );
    }
}
