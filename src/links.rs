use serde::{Deserialize, Serialize};

/// Where generated links point.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Local checkout root the report generator scanned. Only paths under it
    /// can be translated to repository links.
    pub local_prefix: String,
    /// Repository hosting base; projects live directly beneath it.
    pub hosting_base: String,
    /// Issue tracker base URL.
    pub tracker_base: String,
}

impl Default for LinkConfig {
    fn default() -> Self {
        LinkConfig {
            local_prefix: r"C:\Users\sinjav\Documents\".to_string(),
            hosting_base: "https://gitlab.sas.com/risk".to_string(),
            tracker_base: "https://rndjira.sas.com".to_string(),
        }
    }
}

impl LinkConfig {
    /// Repository link for `line` of a locally scanned file, or `None` when
    /// the path is not under the local prefix.
    ///
    /// `C:\Users\sinjav\Documents\proj\src\a.sas` + `10` becomes
    /// `<hosting-base>/proj/-/blob/develop/src/a.sas#L10`.
    pub fn source_link(&self, file_path: &str, line: &str) -> Option<String> {
        let relative = file_path.trim().strip_prefix(self.local_prefix.as_str())?;
        let relative = relative.replace('\\', "/");
        let (project, in_project) = relative.split_once('/').unwrap_or((relative.as_str(), ""));

        let mut url = format!(
            "{}/{}/-/blob/develop/{}",
            self.hosting_base.trim_end_matches('/'),
            project,
            in_project
        );
        if !line.is_empty() {
            url.push_str("#L");
            url.push_str(line);
        }
        Some(url)
    }

    pub fn ticket_link(&self, key: &str) -> String {
        format!("{}/browse/{}", self.tracker_base.trim_end_matches('/'), key)
    }
}

/// Final path component, accepting either separator.
pub fn basename(file_path: &str) -> &str {
    file_path
        .rsplit(['\\', '/'])
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or(file_path)
}
