use url::Url;

use crate::{window_types::WindowDescriptor, window_types::WindowId, WINDOW_QUERY_PARAM};

pub fn renderer_url_for(base: &Url, descriptor: &WindowDescriptor) -> Url {
    let mut url = base.clone();
    let retained: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != WINDOW_QUERY_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    {
        let mut query = url.query_pairs_mut();
        query.clear();
        for (key, value) in &retained {
            query.append_pair(key, value);
        }
        query.append_pair(WINDOW_QUERY_PARAM, descriptor.id.as_str());
    }

    let route = descriptor
        .route
        .as_deref()
        .map(|route| route.trim_start_matches('#'))
        .filter(|route| !route.is_empty());
    url.set_fragment(route);
    url
}

/// Inverse of [`renderer_url_for`]: which window a loaded page belongs to.
pub fn window_id_from_url(url: &Url) -> Option<WindowId> {
    url.query_pairs()
        .find(|(key, _)| key == WINDOW_QUERY_PARAM)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(WindowId::new)
}

pub fn parse_renderer_base(raw: &str) -> Result<Url, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("Missing renderer URL.".to_string());
    }
    Url::parse(trimmed).map_err(|error| format!("Invalid renderer URL '{trimmed}': {error}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(id: &str, route: Option<&str>) -> WindowDescriptor {
        WindowDescriptor {
            id: WindowId::from(id),
            title: "Settings".to_string(),
            menu_label: "Settings".to_string(),
            single_instance: true,
            width: 800,
            height: 600,
            min_width: None,
            min_height: None,
            route: route.map(str::to_string),
        }
    }

    #[test]
    fn renderer_url_encodes_window_id_and_route() {
        let base = Url::parse("http://localhost:5173/").expect("base url");
        let url = renderer_url_for(&base, &descriptor("settings", Some("#/general")));
        assert_eq!(url.as_str(), "http://localhost:5173/?win=settings#/general");
        assert_eq!(window_id_from_url(&url), Some(WindowId::from("settings")));
    }

    #[test]
    fn renderer_url_replaces_existing_window_param_and_keeps_others() {
        let base =
            Url::parse("tauri://localhost/index.html?win=old&lang=en#stale").expect("base url");
        let url = renderer_url_for(&base, &descriptor("hello-world", None));
        assert_eq!(
            url.as_str(),
            "tauri://localhost/index.html?lang=en&win=hello-world"
        );
    }

    #[test]
    fn window_id_from_url_rejects_missing_or_blank_param() {
        let url = Url::parse("http://localhost/?win=").expect("url");
        assert_eq!(window_id_from_url(&url), None);
        let url = Url::parse("http://localhost/").expect("url");
        assert_eq!(window_id_from_url(&url), None);
    }

    #[test]
    fn parse_renderer_base_rejects_blank_and_invalid_values() {
        assert!(parse_renderer_base("  ").is_err());
        assert!(parse_renderer_base("not a url").is_err());
        assert!(parse_renderer_base(" http://localhost:5173 ").is_ok());
    }
}
