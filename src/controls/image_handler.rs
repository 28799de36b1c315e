/*
 * Image widgets and their animation. An image owns at most one `Animator`;
 * starting a new animation stops the previous one first. The animator is an
 * owned sub-resource, stopped and joined when the widget is torn down.
 */
use crate::animation::{AnimationSpec, Animator};
use crate::toolkit::Toolkit;
use crate::types::WidgetId;

pub(crate) fn play(toolkit: &mut Toolkit, image: WidgetId, spec: AnimationSpec) -> bool {
    let Some(widget) = toolkit.widgets.get_mut(&image) else {
        log::warn!("ImageHandler: play on unknown {image:?} ignored.");
        return false;
    };
    if !widget.exists() {
        log::warn!("ImageHandler: {image:?} must exist before it can animate.");
        return false;
    }
    let handle = widget.handle;
    let Some(slot) = widget.animator_mut() else {
        log::warn!("ImageHandler: {image:?} is not an image.");
        return false;
    };
    if let Some(mut previous) = slot.take() {
        previous.stop();
    }
    let sink = toolkit.backend.repaint_sink(handle);
    *slot = Some(Animator::start(spec, sink));
    log::debug!(
        "ImageHandler: Playing {} frame(s) on {image:?}.",
        spec.frame_count
    );
    true
}

pub(crate) fn stop(toolkit: &mut Toolkit, image: WidgetId) {
    if let Some(slot) = toolkit
        .widgets
        .get_mut(&image)
        .and_then(|w| w.animator_mut())
        && let Some(mut animator) = slot.take()
    {
        animator.stop();
        let handle = toolkit.widgets.get(&image).map(|w| w.handle);
        if let Some(handle) = handle {
            toolkit.backend.invalidate(handle);
        }
    }
}

pub(crate) fn is_animating(toolkit: &Toolkit, image: WidgetId) -> bool {
    current(toolkit, image).is_some_and(|animator| animator.is_animating())
}

pub(crate) fn current_frame(toolkit: &Toolkit, image: WidgetId) -> Option<usize> {
    current(toolkit, image).map(|animator| animator.current_frame())
}

fn current(toolkit: &Toolkit, image: WidgetId) -> Option<&Animator> {
    match &toolkit.widgets.get(&image)?.data {
        crate::widget::ClassData::Image { animator } => animator.as_ref(),
        _ => None,
    }
}
