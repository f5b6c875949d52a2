use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorSet {
    pub light: &'static str,
    pub main: &'static str,
    pub dark: &'static str,
    pub contrast_text: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteMode {
    Light,
    Dark,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Palette {
    pub primary: ColorSet,
    pub secondary: ColorSet,
    pub open_title: &'static str,      // indigo 400
    pub protected_title: &'static str, // pink 400
    #[serde(rename = "type")]
    pub mode: PaletteMode,
}

/// Theme handed to the component tree for every server render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Theme {
    pub palette: Palette,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            palette: Palette {
                primary: ColorSet {
                    light: "#fff",
                    main: "#333",
                    dark: "#002984",
                    contrast_text: "#fff",
                },
                secondary: ColorSet {
                    light: "#ff79b0",
                    main: "#ff4081",
                    dark: "#c60055",
                    contrast_text: "#000",
                },
                open_title: "#5c6bc0",
                protected_title: "#ec407a",
                mode: PaletteMode::Light,
            },
        }
    }
}

/// Stylesheets collected while rendering one request, in registration order.
/// A sheet registered twice under the same name is kept once.
#[derive(Debug, Default)]
pub struct StyleRegistry {
    sheets: Vec<(String, String)>,
}

impl StyleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, css: impl Into<String>) {
        let name = name.into();
        if self.sheets.iter().any(|(n, _)| *n == name) {
            return;
        }
        self.sheets.push((name, css.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    pub fn to_css(&self) -> String {
        self.sheets
            .iter()
            .map(|(_, css)| css.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
