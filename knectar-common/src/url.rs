//! Current-page URL handling (path, file name, query parameters)

/// Path and query of the page being composed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageUrl {
    path: String,
    query: String,
}

impl PageUrl {
    /// Split a request target such as `/project.html?item=yale#top`
    pub fn parse(target: &str) -> Self {
        let target = target.split('#').next().unwrap_or_default();
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, query),
            None => (target, ""),
        };
        Self {
            path: path.to_string(),
            query: query.to_string(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Raw query without the leading `?`
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Last path segment, i.e. the page file name (`""` for `/`)
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or_default()
    }

    /// `<file name>?<query>` as written in menu hrefs
    pub fn file_with_query(&self) -> String {
        if self.query.is_empty() {
            self.file_name().to_string()
        } else {
            format!("{}?{}", self.file_name(), self.query)
        }
    }

    /// First value of a query parameter, percent-decoded
    pub fn param(&self, name: &str) -> Option<String> {
        self.query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .find_map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (decode_component(key) == name).then(|| decode_component(value))
            })
    }
}

/// Decode a form-encoded query component (`+` is a space)
pub fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .unwrap_or(spaced)
}

/// Encode a query component the way browsers' `encodeURIComponent` does
pub fn encode_component(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_splits_path_query_and_drops_fragment() {
        let url = PageUrl::parse("/work/project.html?item=yale&x=1#gallery");
        assert_eq!(url.path(), "/work/project.html");
        assert_eq!(url.query(), "item=yale&x=1");
        assert_eq!(url.file_name(), "project.html");
        assert_eq!(url.file_with_query(), "project.html?item=yale&x=1");
    }

    #[test]
    fn test_root_has_empty_file_name() {
        let url = PageUrl::parse("/");
        assert_eq!(url.file_name(), "");
        assert_eq!(url.file_with_query(), "");
    }

    #[test]
    fn test_param_decoding() {
        let url = PageUrl::parse("/projects.html?category=Intranets%20%26%20Portals&technology=Drupal+10");
        assert_eq!(url.param("category").as_deref(), Some("Intranets & Portals"));
        assert_eq!(url.param("technology").as_deref(), Some("Drupal 10"));
        assert_eq!(url.param("item"), None);
    }

    #[test]
    fn test_encode_component() {
        assert_eq!(encode_component("Web & iOS Apps"), "Web%20%26%20iOS%20Apps");
    }
}
