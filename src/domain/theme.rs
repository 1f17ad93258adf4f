// Visual theme catalog
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Theme {
    #[default]
    DarkSpace,
    ArcticLight,
    BlueTech,
    PurplePro,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown theme '{0}'")]
pub struct UnknownTheme(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemePreview {
    pub background: &'static str,
    pub accent: &'static str,
    pub text: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeInfo {
    pub theme: Theme,
    pub name: &'static str,
    pub description: &'static str,
    pub preview: ThemePreview,
}

pub static THEME_CATALOG: [ThemeInfo; 4] = [
    ThemeInfo {
        theme: Theme::DarkSpace,
        name: "Dark Space",
        description: "Deep indigo and purple gradients",
        preview: ThemePreview {
            background: "linear-gradient(135deg, #0c0c2e 0%, #1a1a3e 100%)",
            accent: "#6366f1",
            text: "#ffffff",
        },
    },
    ThemeInfo {
        theme: Theme::ArcticLight,
        name: "Arctic Light",
        description: "Clean whites and light blues",
        preview: ThemePreview {
            background: "linear-gradient(135deg, #f8fafc 0%, #e2e8f0 100%)",
            accent: "#0ea5e9",
            text: "#1e293b",
        },
    },
    ThemeInfo {
        theme: Theme::BlueTech,
        name: "Blue Tech",
        description: "Cyan and deep blue technology aesthetic",
        preview: ThemePreview {
            background: "linear-gradient(135deg, #0f172a 0%, #1e3a8a 100%)",
            accent: "#3b82f6",
            text: "#ffffff",
        },
    },
    ThemeInfo {
        theme: Theme::PurplePro,
        name: "Purple Pro",
        description: "Professional purple and pink gradients",
        preview: ThemePreview {
            background: "linear-gradient(135deg, #1e1b4b 0%, #7c3aed 100%)",
            accent: "#8b5cf6",
            text: "#ffffff",
        },
    },
];

impl Theme {
    pub fn id(&self) -> &'static str {
        match self {
            Theme::DarkSpace => "dark-space",
            Theme::ArcticLight => "arctic-light",
            Theme::BlueTech => "blue-tech",
            Theme::PurplePro => "purple-pro",
        }
    }

    pub fn info(&self) -> &'static ThemeInfo {
        match self {
            Theme::DarkSpace => &THEME_CATALOG[0],
            Theme::ArcticLight => &THEME_CATALOG[1],
            Theme::BlueTech => &THEME_CATALOG[2],
            Theme::PurplePro => &THEME_CATALOG[3],
        }
    }
}

impl FromStr for Theme {
    type Err = UnknownTheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        THEME_CATALOG
            .iter()
            .map(|info| info.theme)
            .find(|theme| theme.id() == s)
            .ok_or_else(|| UnknownTheme(s.to_string()))
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
