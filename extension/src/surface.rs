// Which UI surface a page load belongs to
// popup.html and options.html load the same wasm bundle

use crate::config::PagesConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Popup,
    Options,
}

impl Surface {
    /// Map a document path (`location.pathname`) to a surface
    pub fn from_path(path: &str, pages: &PagesConfig) -> Self {
        let file = path.rsplit('/').next().unwrap_or(path);
        if file == pages.options {
            Surface::Options
        } else {
            Surface::Popup
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        let pages = PagesConfig::default();
        assert_eq!(Surface::from_path("/options.html", &pages), Surface::Options);
        assert_eq!(Surface::from_path("options.html", &pages), Surface::Options);
        assert_eq!(Surface::from_path("/popup.html", &pages), Surface::Popup);
        assert_eq!(Surface::from_path("/", &pages), Surface::Popup);
        assert_eq!(Surface::from_path("/not-options.html", &pages), Surface::Popup);
    }
}
