//! Box layout for the preview tree: turns a `Node` tree into absolute paint operations.
//!
//! Coordinates are device pixels (CSS pixels × scale), origin top-left.
//! Text wraps greedily on whitespace, one word at a time; a single word wider than
//! its box gets a line of its own and overflows rather than being broken.

use crate::templates::tree::{Align, Node, Rgb, Weight};

/// Measures rendered text width in device pixels.
pub trait TextMeasure {
    fn width(&self, text: &str, weight: Weight, px: f32) -> f32;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaintOp {
    Fill {
        rect: Rect,
        color: Rgb,
    },
    /// One already-wrapped line. `top` is the top of its line box.
    Text {
        x: f32,
        top: f32,
        line_height: f32,
        px: f32,
        weight: Weight,
        color: Rgb,
        text: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub width: f32,
    pub height: f32,
    pub ops: Vec<PaintOp>,
}

/// Lays out `root` in a box `width_px × scale` wide; height follows the content.
pub fn layout_preview(
    root: &Node,
    width_px: f32,
    scale: f32,
    measure: &dyn TextMeasure,
) -> PageLayout {
    let width = (width_px * scale).max(1.0);
    let mut cursor = Cursor {
        scale,
        measure,
        ops: Vec::new(),
    };
    let placed = cursor.place(root, 0.0, 0.0, width);
    PageLayout {
        width,
        height: placed.height.ceil().max(1.0),
        ops: cursor.ops,
    }
}

/// Greedy word-wrap. Explicit newlines start a new paragraph; blank paragraphs keep
/// their line.
pub fn wrap_text(text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let candidate = format!("{current} {word}");
            if measure(&candidate) <= max_width {
                current = candidate;
            } else {
                lines.push(std::mem::replace(&mut current, word.to_string()));
            }
        }
        lines.push(current);
    }
    lines
}

struct Placed {
    height: f32,
    /// Index of this box's background op, so a row can stretch it.
    background: Option<usize>,
}

struct Cursor<'m> {
    scale: f32,
    measure: &'m dyn TextMeasure,
    ops: Vec<PaintOp>,
}

impl Cursor<'_> {
    fn push_background(&mut self, color: Option<Rgb>, x: f32, y: f32, w: f32) -> Option<usize> {
        color.map(|color| {
            self.ops.push(PaintOp::Fill {
                rect: Rect { x, y, w, h: 0.0 },
                color,
            });
            self.ops.len() - 1
        })
    }

    fn set_height(&mut self, index: usize, height: f32) {
        if let Some(PaintOp::Fill { rect, .. }) = self.ops.get_mut(index) {
            rect.h = height;
        }
    }

    fn place(&mut self, node: &Node, x: f32, y: f32, width: f32) -> Placed {
        let s = self.scale;
        match node {
            Node::Column { style, children } => {
                let pad = style.padding * s;
                let gap = style.gap * s;
                let background = self.push_background(style.background, x, y, width);
                let inner = (width - 2.0 * pad).max(0.0);

                let mut cy = y + pad;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        cy += gap;
                    }
                    cy += self.place(child, x + pad, cy, inner).height;
                }
                let height = cy - y + pad;
                if let Some(index) = background {
                    self.set_height(index, height);
                }
                Placed { height, background }
            }

            Node::Row {
                style,
                weights,
                children,
            } => {
                let pad = style.padding * s;
                let gap = style.gap * s;
                let background = self.push_background(style.background, x, y, width);
                let inner = (width - 2.0 * pad).max(0.0);

                let weight_of = |i: usize| weights.get(i).copied().filter(|w| *w > 0.0).unwrap_or(1.0);
                let total: f32 = (0..children.len()).map(weight_of).sum();
                let gaps = gap * children.len().saturating_sub(1) as f32;
                let available = (inner - gaps).max(0.0);

                let mut cx = x + pad;
                let mut tallest = 0.0_f32;
                let mut stretch = Vec::new();
                for (i, child) in children.iter().enumerate() {
                    let w = available * weight_of(i) / total;
                    let placed = self.place(child, cx, y + pad, w);
                    tallest = tallest.max(placed.height);
                    stretch.extend(placed.background);
                    cx += w + gap;
                }
                // Column backgrounds in a row run the full row height (sidebars).
                for index in stretch {
                    self.set_height(index, tallest);
                }
                let height = tallest + 2.0 * pad;
                if let Some(index) = background {
                    self.set_height(index, height);
                }
                Placed { height, background }
            }

            Node::Text { content, style } => {
                let px = style.size * s;
                let line_height = style.line_height() * s;
                let measure = self.measure;
                let lines = wrap_text(content, width, |t| measure.width(t, style.weight, px));
                let count = lines.len();
                for (i, line) in lines.into_iter().enumerate() {
                    let w = measure.width(&line, style.weight, px);
                    let lx = match style.align {
                        Align::Left => x,
                        Align::Center => x + ((width - w) / 2.0).max(0.0),
                        Align::Right => x + (width - w).max(0.0),
                    };
                    self.ops.push(PaintOp::Text {
                        x: lx,
                        top: y + i as f32 * line_height,
                        line_height,
                        px,
                        weight: style.weight,
                        color: style.color,
                        text: line,
                    });
                }
                Placed {
                    height: count as f32 * line_height,
                    background: None,
                }
            }

            Node::Rule { color, thickness } => {
                let h = (thickness * s).max(1.0);
                self.ops.push(PaintOp::Fill {
                    rect: Rect {
                        x,
                        y,
                        w: width,
                        h,
                    },
                    color: *color,
                });
                Placed {
                    height: h,
                    background: None,
                }
            }

            Node::Spacer { height } => Placed {
                height: height * s,
                background: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::tree::{BoxStyle, TextStyle};

    /// Every character is half an em wide.
    struct MonoMeasure;

    impl TextMeasure for MonoMeasure {
        fn width(&self, text: &str, _weight: Weight, px: f32) -> f32 {
            text.chars().count() as f32 * px * 0.5
        }
    }

    fn char_width(text: &str) -> f32 {
        text.chars().count() as f32
    }

    fn fills(layout: &PageLayout) -> Vec<Rect> {
        layout
            .ops
            .iter()
            .filter_map(|op| match op {
                PaintOp::Fill { rect, .. } => Some(*rect),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_wrap_fits_on_one_line() {
        assert_eq!(wrap_text("hello world", 20.0, char_width), vec!["hello world"]);
    }

    #[test]
    fn test_wrap_breaks_between_words() {
        assert_eq!(
            wrap_text("aaa bbb ccc", 7.0, char_width),
            vec!["aaa bbb", "ccc"]
        );
    }

    #[test]
    fn test_wrap_long_word_gets_own_line() {
        assert_eq!(
            wrap_text("a abcdefghij b", 5.0, char_width),
            vec!["a", "abcdefghij", "b"]
        );
    }

    #[test]
    fn test_wrap_keeps_paragraphs() {
        assert_eq!(
            wrap_text("one\n\ntwo", 10.0, char_width),
            vec!["one", "", "two"]
        );
    }

    #[test]
    fn test_wrap_blank_text_has_no_lines() {
        assert!(wrap_text("   ", 10.0, char_width).is_empty());
    }

    #[test]
    fn test_column_stacks_with_gap_and_padding() {
        let style = TextStyle::new(10.0, Rgb::BLACK); // line height 14
        let tree = Node::panel(
            BoxStyle {
                gap: 6.0,
                padding: 10.0,
                background: Some(Rgb::WHITE),
            },
            vec![Node::text("a", style), Node::text("b", style)],
        );
        let layout = layout_preview(&tree, 200.0, 1.0, &MonoMeasure);
        // 10 + 14 + 6 + 14 + 10
        assert_eq!(layout.height, 54.0);
        let tops: Vec<f32> = layout
            .ops
            .iter()
            .filter_map(|op| match op {
                PaintOp::Text { top, .. } => Some(*top),
                _ => None,
            })
            .collect();
        assert_eq!(tops, vec![10.0, 30.0]);
        assert_eq!(fills(&layout)[0].h, 54.0);
    }

    #[test]
    fn test_scale_doubles_geometry() {
        let tree = Node::column(0.0, vec![Node::spacer(40.0), Node::rule(Rgb::BLACK, 1.0)]);
        let one = layout_preview(&tree, 100.0, 1.0, &MonoMeasure);
        let two = layout_preview(&tree, 100.0, 2.0, &MonoMeasure);
        assert_eq!(one.width * 2.0, two.width);
        assert_eq!(one.height * 2.0, two.height);
    }

    #[test]
    fn test_row_splits_width_by_weight_and_stretches_backgrounds() {
        let style = TextStyle::new(10.0, Rgb::BLACK);
        let side = Node::panel(
            BoxStyle {
                background: Some(Rgb(1, 2, 3)),
                ..Default::default()
            },
            vec![Node::text("x", style)],
        );
        let main = Node::column(0.0, vec![Node::spacer(100.0)]);
        let tree = Node::row(0.0, vec![(1.0, side), (3.0, main)]);
        let layout = layout_preview(&tree, 400.0, 1.0, &MonoMeasure);
        let rect = fills(&layout)[0];
        assert_eq!(rect.w, 100.0);
        assert_eq!(rect.h, 100.0);
        assert_eq!(layout.height, 100.0);
    }

    #[test]
    fn test_center_alignment_offsets_line() {
        let style = TextStyle::new(10.0, Rgb::BLACK).aligned(Align::Center);
        let tree = Node::text("abcd", style); // 20px wide
        let layout = layout_preview(&tree, 100.0, 1.0, &MonoMeasure);
        match &layout.ops[0] {
            PaintOp::Text { x, .. } => assert_eq!(*x, 40.0),
            other => panic!("expected text op, got {other:?}"),
        }
    }

    #[test]
    fn test_text_wraps_inside_narrow_column() {
        let style = TextStyle::new(10.0, Rgb::BLACK); // 5px per char
        let tree = Node::text("aaaa bbbb cccc", style);
        let layout = layout_preview(&tree, 50.0, 1.0, &MonoMeasure);
        let lines: Vec<&str> = layout
            .ops
            .iter()
            .filter_map(|op| match op {
                PaintOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(lines, vec!["aaaa bbbb", "cccc"]);
    }

    #[test]
    fn test_empty_tree_has_minimum_height() {
        let layout = layout_preview(&Node::column(0.0, vec![]), 100.0, 2.0, &MonoMeasure);
        assert_eq!(layout.height, 1.0);
        assert!(layout.ops.is_empty());
    }
}
