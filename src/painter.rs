/*
 * Drawing collaborator contract. The toolkit hands a painter a read-only
 * `DrawContext` assembled from widget state and the border pool; the painter
 * turns it into native drawing calls and never touches widget state.
 */
use crate::backend::NativeBackend;
use crate::resources::Border;
use crate::styling::Color;
use crate::types::{NativeObject, Rect};
use crate::widget::WidgetClass;

/// Pressed widgets are drawn at this percentage of their background brightness.
const PRESSED_DARKEN_PERCENT: u32 = 80;

#[derive(Debug)]
pub struct DrawContext<'a> {
    pub class: WidgetClass,
    pub surface: NativeObject,
    pub rect: Rect,
    pub background: Color,
    pub hover: Color,
    pub text_color: Color,
    pub text: &'a str,
    pub border: Option<&'a Border>,
    /// Present only while the widget has focus.
    pub focus_border: Option<&'a Border>,
    pub hovered: bool,
    pub pressed: bool,
    pub enabled: bool,
    /// Current frame of a playing animation.
    pub frame: Option<usize>,
}

pub trait WidgetPainter {
    /// Returns `false` if the painter drew nothing and default processing should run.
    fn paint(&self, ctx: &DrawContext<'_>, backend: &mut dyn NativeBackend) -> bool;
}

/// Flat fill, centered text and borders.
#[derive(Debug, Default, Clone, Copy)]
pub struct BasicPainter;

impl BasicPainter {
    fn fill_color(ctx: &DrawContext<'_>) -> Color {
        let base = if ctx.hovered && ctx.enabled {
            ctx.hover
        } else {
            ctx.background
        };
        if ctx.pressed {
            base.darken(PRESSED_DARKEN_PERCENT)
        } else {
            base
        }
    }
}

impl WidgetPainter for BasicPainter {
    fn paint(&self, ctx: &DrawContext<'_>, backend: &mut dyn NativeBackend) -> bool {
        if ctx.rect.is_empty() {
            return false;
        }
        backend.fill_rect(ctx.surface, ctx.rect, Self::fill_color(ctx));

        let mut content = ctx.rect;
        if let Some(border) = ctx.border {
            for (ring, brush) in border.rings(ctx.rect) {
                backend.frame_rect(ctx.surface, ring, brush);
            }
            content = content.inset(border.thickness());
        }
        if let Some(focus) = ctx.focus_border {
            for (ring, brush) in focus.rings(content) {
                backend.frame_rect(ctx.surface, ring, brush);
            }
            content = content.inset(focus.thickness());
        }

        if !ctx.text.is_empty() && !content.is_empty() {
            let color = if ctx.enabled {
                ctx.text_color
            } else {
                ctx.text_color.lighten(0x60)
            };
            backend.draw_text(ctx.surface, content, ctx.text, color);
        }
        true
    }
}
