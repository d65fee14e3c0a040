/// Badge variant selected by query flags, checked in the same precedence
/// order as the flags are documented: `pixel`, `gif`, `flat`, `flat-gif`,
/// falling back to the SVG badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Pixel,
    Badge,
    BadgeGif,
    BadgeFlat,
    BadgeFlatGif,
}

impl Variant {
    pub fn from_query(query: &[(String, String)]) -> Variant {
        let has = |flag: &str| query.iter().any(|(key, _)| key == flag);

        if has("pixel") {
            Variant::Pixel
        } else if has("gif") {
            Variant::BadgeGif
        } else if has("flat") {
            Variant::BadgeFlat
        } else if has("flat-gif") {
            Variant::BadgeFlatGif
        } else {
            Variant::Badge
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Variant::Pixel | Variant::BadgeGif | Variant::BadgeFlatGif => "image/gif",
            Variant::Badge | Variant::BadgeFlat => "image/svg+xml",
        }
    }
}

/// The five image bodies and the informational page template, embedded at
/// compile time. Built once at startup and shared read-only; nothing mutates
/// it afterwards.
pub struct Assets {
    pixel: &'static [u8],
    badge: &'static [u8],
    badge_gif: &'static [u8],
    badge_flat: &'static [u8],
    badge_flat_gif: &'static [u8],
    page: &'static str,
}

impl Assets {
    pub fn new() -> Assets {
        Assets {
            pixel: include_bytes!("../static/pixel.gif"),
            badge: include_bytes!("../static/badge.svg"),
            badge_gif: include_bytes!("../static/badge.gif"),
            badge_flat: include_bytes!("../static/badge-flat.svg"),
            badge_flat_gif: include_bytes!("../static/badge-flat.gif"),
            page: include_str!("../static/page.html"),
        }
    }

    pub fn body(&self, variant: Variant) -> &'static [u8] {
        match variant {
            Variant::Pixel => self.pixel,
            Variant::Badge => self.badge,
            Variant::BadgeGif => self.badge_gif,
            Variant::BadgeFlat => self.badge_flat,
            Variant::BadgeFlatGif => self.badge_flat_gif,
        }
    }

    /// Render the single-segment informational page.
    pub fn render_page(&self, account: &str, referer: &str) -> String {
        self.page
            .replace("{{account}}", account)
            .replace("{{referer}}", referer)
    }
}

impl Default for Assets {
    fn default() -> Self {
        Assets::new()
    }
}
