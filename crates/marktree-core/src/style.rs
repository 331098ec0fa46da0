//! Style configuration consumed by renderers.
//!
//! A [`Theme`] holds one [`Style`] per node kind. Themes load from JSON and
//! are merged attribute by attribute over the built-in defaults: a missing
//! attribute, or one with the wrong type, keeps its default without
//! failing the load.

use serde::de::{Deserializer, IgnoredAny};
use serde::{Deserialize, Serialize};

use crate::ast::NodeKind;
use crate::error::ConfigError;

/// Presentation attributes for one node kind.
///
/// Attribute names follow CSS in camelCase when (de)serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Style {
    /// `false` turns styling off for the kind.
    #[serde(deserialize_with = "lenient_bool", skip_serializing_if = "Option::is_none")]
    pub enable: Option<bool>,
    #[serde(deserialize_with = "lenient_str", skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(deserialize_with = "lenient_str", skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(deserialize_with = "lenient_str", skip_serializing_if = "Option::is_none")]
    pub font_size: Option<String>,
    #[serde(deserialize_with = "lenient_str", skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(deserialize_with = "lenient_str", skip_serializing_if = "Option::is_none")]
    pub font_style: Option<String>,
    #[serde(deserialize_with = "lenient_str", skip_serializing_if = "Option::is_none")]
    pub padding: Option<String>,
    #[serde(deserialize_with = "lenient_str", skip_serializing_if = "Option::is_none")]
    pub margin: Option<String>,
    #[serde(deserialize_with = "lenient_str", skip_serializing_if = "Option::is_none")]
    pub border: Option<String>,
    #[serde(deserialize_with = "lenient_str", skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<String>,
    #[serde(deserialize_with = "lenient_str", skip_serializing_if = "Option::is_none")]
    pub text_decoration: Option<String>,
    /// String or number.
    #[serde(deserialize_with = "lenient_str_or_number", skip_serializing_if = "Option::is_none")]
    pub line_height: Option<String>,
    /// String or number.
    #[serde(deserialize_with = "lenient_str_or_number", skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
}

impl Style {
    /// Fill every attribute missing here from `base`.
    pub fn merged_over(&self, base: &Style) -> Style {
        fn pick<T: Clone>(own: &Option<T>, base: &Option<T>) -> Option<T> {
            own.clone().or_else(|| base.clone())
        }

        Style {
            enable: pick(&self.enable, &base.enable),
            background_color: pick(&self.background_color, &base.background_color),
            color: pick(&self.color, &base.color),
            font_size: pick(&self.font_size, &base.font_size),
            font_family: pick(&self.font_family, &base.font_family),
            font_style: pick(&self.font_style, &base.font_style),
            padding: pick(&self.padding, &base.padding),
            margin: pick(&self.margin, &base.margin),
            border: pick(&self.border, &base.border),
            border_radius: pick(&self.border_radius, &base.border_radius),
            text_decoration: pick(&self.text_decoration, &base.text_decoration),
            line_height: pick(&self.line_height, &base.line_height),
            font_weight: pick(&self.font_weight, &base.font_weight),
        }
    }

    /// Whether the style applies at all.
    pub fn is_enabled(&self) -> bool {
        self.enable != Some(false)
    }

    /// Set attributes as `(css-property, value)` pairs, in a fixed order.
    pub fn declarations(&self) -> Vec<(&'static str, &str)> {
        [
            ("background-color", &self.background_color),
            ("color", &self.color),
            ("font-size", &self.font_size),
            ("font-family", &self.font_family),
            ("font-style", &self.font_style),
            ("font-weight", &self.font_weight),
            ("line-height", &self.line_height),
            ("padding", &self.padding),
            ("margin", &self.margin),
            ("border", &self.border),
            ("border-radius", &self.border_radius),
            ("text-decoration", &self.text_decoration),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_deref().map(|v| (name, v)))
        .collect()
    }

    /// Declarations joined as an inline CSS string; `None` when disabled or
    /// empty.
    pub fn to_css(&self) -> Option<String> {
        if !self.is_enabled() {
            return None;
        }
        let decls = self.declarations();
        if decls.is_empty() {
            return None;
        }
        Some(
            decls
                .iter()
                .map(|(name, value)| format!("{name}: {value}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

/// Heading styles, one per level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HeadingStyles {
    pub h1: Style,
    pub h2: Style,
    pub h3: Style,
    pub h4: Style,
    pub h5: Style,
    pub h6: Style,
}

impl HeadingStyles {
    pub fn level(&self, level: u8) -> Option<&Style> {
        match level {
            1 => Some(&self.h1),
            2 => Some(&self.h2),
            3 => Some(&self.h3),
            4 => Some(&self.h4),
            5 => Some(&self.h5),
            6 => Some(&self.h6),
            _ => None,
        }
    }
}

/// Styles for every styled node kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Styles {
    pub code_block: Style,
    pub inline_code: Style,
    pub heading: HeadingStyles,
    pub paragraph: Style,
    pub link: Style,
    pub bold: Style,
    pub italic: Style,
    pub list: Style,
    pub list_item: Style,
}

/// A named style configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Theme {
    #[serde(rename = "theme")]
    pub name: String,
    pub styles: Styles,
}

impl Theme {
    /// Parse a theme document and merge it over [`Theme::default`].
    ///
    /// Only syntactically invalid JSON is an error. Unknown keys are
    /// ignored; sections and attributes of the wrong type keep defaults.
    pub fn from_json_str(json: &str) -> Result<Theme, ConfigError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let partial = match PartialTheme::deserialize(value) {
            Ok(partial) => partial,
            Err(error) => {
                tracing::debug!(%error, "theme document is not an object; using defaults");
                PartialTheme::default()
            }
        };
        Ok(partial.merged_over(Theme::default()))
    }

    /// The style a renderer should apply to a node of `kind`.
    ///
    /// Document and text nodes have no style of their own.
    pub fn style_for(&self, kind: NodeKind) -> Option<&Style> {
        let styles = &self.styles;
        match kind {
            NodeKind::Document | NodeKind::Text => None,
            NodeKind::Heading(level) => styles.heading.level(level),
            NodeKind::Paragraph => Some(&styles.paragraph),
            NodeKind::CodeBlock => Some(&styles.code_block),
            NodeKind::InlineCode => Some(&styles.inline_code),
            NodeKind::Bold => Some(&styles.bold),
            NodeKind::Italic => Some(&styles.italic),
            NodeKind::Link => Some(&styles.link),
            NodeKind::List => Some(&styles.list),
            NodeKind::ListItem => Some(&styles.list_item),
        }
    }
}

const MONO_FONTS: &str = r#"Monaco, "Cascadia Code", "Roboto Mono", Consolas, "Courier New", monospace"#;

fn style(attrs: &[(&str, &str)]) -> Style {
    let mut style = Style::default();
    for &(name, value) in attrs {
        let value = Some(value.to_string());
        match name {
            "backgroundColor" => style.background_color = value,
            "color" => style.color = value,
            "fontSize" => style.font_size = value,
            "fontFamily" => style.font_family = value,
            "fontStyle" => style.font_style = value,
            "padding" => style.padding = value,
            "margin" => style.margin = value,
            "border" => style.border = value,
            "borderRadius" => style.border_radius = value,
            "textDecoration" => style.text_decoration = value,
            "lineHeight" => style.line_height = value,
            "fontWeight" => style.font_weight = value,
            _ => {}
        }
    }
    style
}

fn heading_style(font_size: &str, color: &str, margin: &str) -> Style {
    style(&[
        ("fontSize", font_size),
        ("fontWeight", "600"),
        ("color", color),
        ("margin", margin),
        ("lineHeight", "1.25"),
    ])
}

impl Default for Theme {
    fn default() -> Self {
        const SPACED: &str = "24px 0 16px 0";
        Theme {
            name: "default".to_string(),
            styles: Styles {
                code_block: style(&[
                    ("backgroundColor", "#f6f8fa"),
                    ("border", "1px solid #e1e4e8"),
                    ("borderRadius", "6px"),
                    ("padding", "16px"),
                    ("fontFamily", MONO_FONTS),
                    ("fontSize", "14px"),
                    ("lineHeight", "1.45"),
                    ("color", "#24292f"),
                ]),
                inline_code: style(&[
                    ("backgroundColor", "rgba(175,184,193,0.2)"),
                    ("padding", "2px 4px"),
                    ("borderRadius", "4px"),
                    ("fontFamily", MONO_FONTS),
                    ("fontSize", "85%"),
                ]),
                heading: HeadingStyles {
                    h1: heading_style("32px", "#1f2937", "0 0 16px 0"),
                    h2: heading_style("24px", "#374151", SPACED),
                    h3: heading_style("20px", "#4b5563", SPACED),
                    h4: heading_style("16px", "#6b7280", SPACED),
                    h5: heading_style("14px", "#6b7280", SPACED),
                    h6: heading_style("13px", "#6b7280", SPACED),
                },
                paragraph: style(&[
                    ("margin", "0 0 16px 0"),
                    ("lineHeight", "1.6"),
                    ("color", "#24292f"),
                ]),
                link: style(&[("color", "#0969da"), ("textDecoration", "underline")]),
                bold: style(&[("fontWeight", "600")]),
                italic: style(&[("fontStyle", "italic")]),
                list: style(&[("margin", "0 0 16px 0")]),
                list_item: style(&[("margin", "0.25em 0")]),
            },
        }
    }
}

// Partial documents: every section optional, merged over defaults.

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PartialTheme {
    #[serde(deserialize_with = "lenient_str")]
    theme: Option<String>,
    #[serde(deserialize_with = "lenient_section")]
    styles: Option<PartialStyles>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PartialStyles {
    #[serde(deserialize_with = "lenient_section")]
    code_block: Option<Style>,
    #[serde(deserialize_with = "lenient_section")]
    inline_code: Option<Style>,
    #[serde(deserialize_with = "lenient_section")]
    heading: Option<PartialHeadings>,
    #[serde(deserialize_with = "lenient_section")]
    paragraph: Option<Style>,
    #[serde(deserialize_with = "lenient_section")]
    link: Option<Style>,
    #[serde(deserialize_with = "lenient_section")]
    bold: Option<Style>,
    #[serde(deserialize_with = "lenient_section")]
    italic: Option<Style>,
    #[serde(deserialize_with = "lenient_section")]
    list: Option<Style>,
    #[serde(deserialize_with = "lenient_section")]
    list_item: Option<Style>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PartialHeadings {
    #[serde(deserialize_with = "lenient_section")]
    h1: Option<Style>,
    #[serde(deserialize_with = "lenient_section")]
    h2: Option<Style>,
    #[serde(deserialize_with = "lenient_section")]
    h3: Option<Style>,
    #[serde(deserialize_with = "lenient_section")]
    h4: Option<Style>,
    #[serde(deserialize_with = "lenient_section")]
    h5: Option<Style>,
    #[serde(deserialize_with = "lenient_section")]
    h6: Option<Style>,
}

fn merge(own: Option<Style>, base: Style) -> Style {
    match own {
        Some(own) => own.merged_over(&base),
        None => base,
    }
}

impl PartialTheme {
    fn merged_over(self, base: Theme) -> Theme {
        let styles = self.styles.unwrap_or_default();
        let headings = styles.heading.unwrap_or_default();
        let defaults = base.styles;

        Theme {
            name: self.theme.unwrap_or(base.name),
            styles: Styles {
                code_block: merge(styles.code_block, defaults.code_block),
                inline_code: merge(styles.inline_code, defaults.inline_code),
                heading: HeadingStyles {
                    h1: merge(headings.h1, defaults.heading.h1),
                    h2: merge(headings.h2, defaults.heading.h2),
                    h3: merge(headings.h3, defaults.heading.h3),
                    h4: merge(headings.h4, defaults.heading.h4),
                    h5: merge(headings.h5, defaults.heading.h5),
                    h6: merge(headings.h6, defaults.heading.h6),
                },
                paragraph: merge(styles.paragraph, defaults.paragraph),
                link: merge(styles.link, defaults.link),
                bold: merge(styles.bold, defaults.bold),
                italic: merge(styles.italic, defaults.italic),
                list: merge(styles.list, defaults.list),
                list_item: merge(styles.list_item, defaults.list_item),
            },
        }
    }
}

// Lenient field deserializers: a value of the wrong type reads as absent.

#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Valid(T),
    Invalid(IgnoredAny),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StrOrNumber {
    Str(String),
    Int(i64),
    Float(f64),
}

fn lenient<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    match Lenient::<T>::deserialize(deserializer)? {
        Lenient::Valid(value) => Ok(Some(value)),
        Lenient::Invalid(_) => {
            tracing::debug!(
                expected = std::any::type_name::<T>(),
                "ignoring style value of the wrong type"
            );
            Ok(None)
        }
    }
}

fn lenient_str<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    lenient(deserializer)
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    lenient(deserializer)
}

fn lenient_section<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    lenient(deserializer)
}

fn lenient_str_or_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(lenient::<StrOrNumber, D>(deserializer)?.map(|value| match value {
        StrOrNumber::Str(s) => s,
        StrOrNumber::Int(i) => i.to_string(),
        StrOrNumber::Float(f) => f.to_string(),
    }))
}
