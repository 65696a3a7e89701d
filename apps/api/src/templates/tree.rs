//! Preview tree produced by the template layouts and consumed by the export rasterizer.
//!
//! Sizes are CSS pixels at 1× scale. The rasterizer multiplies by its scale factor.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ────────────────────────────────────────────────────────────────────────────
// Colour
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(0xff, 0xff, 0xff);
    #[cfg(test)]
    pub const BLACK: Rgb = Rgb(0x00, 0x00, 0x00);

    /// Colour from a `0xRRGGBB` literal.
    pub const fn hex(value: u32) -> Rgb {
        Rgb((value >> 16) as u8, (value >> 8) as u8, value as u8)
    }

    /// Linear blend towards `other`; `t = 0` is `self`, `t = 1` is `other`.
    pub fn mix(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgb(lerp(self.0, other.0), lerp(self.1, other.1), lerp(self.2, other.2))
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.0, self.1, self.2]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl FromStr for Rgb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| format!("colour '{s}' must start with '#'"))?;
        if hex.len() != 6 {
            return Err(format!("colour '{s}' must have six hex digits"));
        }
        let value = u32::from_str_radix(hex, 16).map_err(|e| format!("colour '{s}': {e}"))?;
        Ok(Rgb::hex(value))
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Theme
// ────────────────────────────────────────────────────────────────────────────

/// Colour scheme injected by the caller. Layouts never read ambient state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme '{other}' (expected 'light' or 'dark')")),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Nodes
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weight {
    #[default]
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub size: f32,
    pub weight: Weight,
    pub color: Rgb,
    pub align: Align,
}

impl TextStyle {
    pub fn new(size: f32, color: Rgb) -> Self {
        Self {
            size,
            weight: Weight::Regular,
            color,
            align: Align::Left,
        }
    }

    pub fn bold(mut self) -> Self {
        self.weight = Weight::Bold;
        self
    }

    pub fn aligned(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    /// Line box height for this style.
    pub fn line_height(&self) -> f32 {
        (self.size * 1.4).ceil()
    }
}

/// Box container properties shared by rows and columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxStyle {
    pub gap: f32,
    pub padding: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<Rgb>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    /// Children stacked top to bottom.
    Column { style: BoxStyle, children: Vec<Node> },
    /// Children side by side; widths are proportional to `weights`.
    Row {
        style: BoxStyle,
        weights: Vec<f32>,
        children: Vec<Node>,
    },
    Text { content: String, style: TextStyle },
    Rule { color: Rgb, thickness: f32 },
    Spacer { height: f32 },
}

impl Node {
    pub fn column(gap: f32, children: Vec<Node>) -> Node {
        Node::Column {
            style: BoxStyle {
                gap,
                ..Default::default()
            },
            children,
        }
    }

    pub fn panel(style: BoxStyle, children: Vec<Node>) -> Node {
        Node::Column { style, children }
    }

    pub fn row(gap: f32, columns: Vec<(f32, Node)>) -> Node {
        let (weights, children) = columns.into_iter().unzip();
        Node::Row {
            style: BoxStyle {
                gap,
                ..Default::default()
            },
            weights,
            children,
        }
    }

    pub fn text(content: impl Into<String>, style: TextStyle) -> Node {
        Node::Text {
            content: content.into(),
            style,
        }
    }

    pub fn rule(color: Rgb, thickness: f32) -> Node {
        Node::Rule { color, thickness }
    }

    pub fn spacer(height: f32) -> Node {
        Node::Spacer { height }
    }

    /// All text content in document order. Handy for asserting on rendered output.
    #[cfg(test)]
    pub fn texts(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_texts(&mut out);
        out
    }

    #[cfg(test)]
    fn collect_texts<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Node::Column { children, .. } | Node::Row { children, .. } => {
                for child in children {
                    child.collect_texts(out);
                }
            }
            Node::Text { content, .. } => out.push(content),
            Node::Rule { .. } | Node::Spacer { .. } => {}
        }
    }
}
