/*
 * Border decorator. A border is shareable: any number of widgets may display
 * the same one, as content border or as focus border. Its native brushes are
 * created when the border is manufactured and deleted when the pool destroys it.
 *
 * Construction and release are visible to the resources module only; the rest
 * of the crate sees a read-only view.
 */
use super::SharedResource;
use crate::backend::NativeBackend;
use crate::styling::Color;
use crate::types::{NativeObject, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderStyle {
    Flat,
    Raised,
    Sunken,
    Dotted,
    Double,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderParams {
    pub style: BorderStyle,
    pub color: Color,
    pub thickness: i32,
}

impl BorderParams {
    pub fn new(style: BorderStyle, color: Color, thickness: i32) -> Self {
        Self {
            style,
            color,
            thickness: thickness.max(1),
        }
    }
}

impl Default for BorderParams {
    fn default() -> Self {
        Self::new(BorderStyle::Flat, Color::rgb(0x80, 0x80, 0x80), 1)
    }
}

#[derive(Debug)]
pub struct Border {
    params: BorderParams,
    primary: NativeObject,
    // Second tone for the beveled styles.
    shade: Option<NativeObject>,
}

impl SharedResource for Border {
    const KIND: &'static str = "Border";
    const EXCLUSIVE: bool = false;
}

impl Border {
    pub(super) fn manufacture(params: BorderParams, backend: &mut dyn NativeBackend) -> Self {
        let (primary, shade) = match params.style {
            BorderStyle::Raised | BorderStyle::Sunken => (
                backend.create_brush(params.color.lighten(0x40)),
                Some(backend.create_brush(params.color.darken(60))),
            ),
            _ => (backend.create_brush(params.color), None),
        };
        log::debug!("BorderPool: Manufactured {:?} border.", params.style);
        Self {
            params,
            primary,
            shade,
        }
    }

    pub(super) fn release(self, backend: &mut dyn NativeBackend) {
        backend.delete_object(self.primary);
        if let Some(shade) = self.shade {
            backend.delete_object(shade);
        }
    }

    pub fn style(&self) -> BorderStyle {
        self.params.style
    }

    pub fn color(&self) -> Color {
        self.params.color
    }

    pub fn thickness(&self) -> i32 {
        self.params.thickness
    }

    /*
     * The one-pixel rings that make up this border inside `rect`, outermost
     * first, each paired with the brush to frame it with. Dotted borders skip
     * every other ring; double borders draw only the outer and inner ring.
     */
    pub fn rings(&self, rect: Rect) -> Vec<(Rect, NativeObject)> {
        let thickness = self.params.thickness;
        let mut rings = Vec::new();
        for step in 0..thickness {
            let ring = rect.inset(step);
            if ring.is_empty() {
                break;
            }
            let outer_half = step < (thickness + 1) / 2;
            let brush = match (self.params.style, self.shade) {
                (BorderStyle::Raised, Some(shade)) if !outer_half => shade,
                (BorderStyle::Sunken, Some(shade)) if outer_half => shade,
                (BorderStyle::Dotted, _) if step % 2 == 1 => continue,
                (BorderStyle::Double, _) if step != 0 && step != thickness - 1 => continue,
                _ => self.primary,
            };
            rings.push((ring, brush));
        }
        rings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessBackend;

    #[test]
    fn beveled_styles_allocate_two_brushes() {
        let mut backend = HeadlessBackend::new();
        let probe = backend.probe();

        let raised = Border::manufacture(
            BorderParams::new(BorderStyle::Raised, Color::rgb(0x60, 0x60, 0x60), 2),
            &mut backend,
        );
        assert_eq!(probe.live_object_count(), 2);

        raised.release(&mut backend);
        assert_eq!(probe.live_object_count(), 0);
    }

    #[test]
    fn rings_stop_when_rect_is_exhausted() {
        let mut backend = HeadlessBackend::new();
        let border = Border::manufacture(
            BorderParams::new(BorderStyle::Flat, Color::BLACK, 10),
            &mut backend,
        );

        let rings = border.rings(Rect::new(0, 0, 6, 6));

        assert_eq!(rings.len(), 3);
        assert_eq!(rings[2].0, Rect::new(2, 2, 2, 2));
        border.release(&mut backend);
    }

    #[test]
    fn double_border_draws_outer_and_inner_ring_only() {
        let mut backend = HeadlessBackend::new();
        let border = Border::manufacture(
            BorderParams::new(BorderStyle::Double, Color::BLACK, 3),
            &mut backend,
        );

        let rings: Vec<Rect> = border
            .rings(Rect::new(0, 0, 50, 20))
            .into_iter()
            .map(|(ring, _)| ring)
            .collect();

        assert_eq!(rings, vec![Rect::new(0, 0, 50, 20), Rect::new(2, 2, 46, 16)]);
        border.release(&mut backend);
    }

    #[test]
    fn thickness_is_at_least_one() {
        assert_eq!(BorderParams::new(BorderStyle::Flat, Color::BLACK, 0).thickness, 1);
    }
}
