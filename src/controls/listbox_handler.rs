/*
 * List boxes. Entries and the selected index are kept on the widget and
 * mirrored to the native control; `-1` means "no selection" everywhere.
 * Selecting an index outside the list is a soft failure that leaves the
 * selection unchanged.
 */
use crate::messages::MessageResponse;
use crate::toolkit::Toolkit;
use crate::types::{EventDetail, EventKind, WidgetEvent, WidgetId};
use crate::widget::ClassData;

pub(crate) const LBN_SELCHANGE: u16 = 1;
pub(crate) const LBN_DBLCLK: u16 = 2;

pub(crate) fn handle_command(toolkit: &mut Toolkit, list: WidgetId, code: u16) -> MessageResponse {
    match code {
        LBN_SELCHANGE => {
            let Some(widget) = toolkit.widgets.get_mut(&list) else {
                return MessageResponse::Default;
            };
            let index = toolkit.backend.read_list_selection(widget.handle);
            if let ClassData::List { selected, .. } = &mut widget.data {
                *selected = index;
            }
            log::debug!("ListBoxHandler: {list:?} selection is now {index}.");
            toolkit.fire(
                WidgetEvent::new(list, EventKind::SelectionChanged)
                    .with_detail(EventDetail::Selection { index }),
            );
            MessageResponse::Handled(0)
        }
        LBN_DBLCLK => {
            toolkit.fire(WidgetEvent::new(list, EventKind::DoubleClick));
            MessageResponse::Handled(0)
        }
        _ => MessageResponse::Default,
    }
}

pub(crate) fn set_items(toolkit: &mut Toolkit, list: WidgetId, new_items: Vec<String>) -> bool {
    let Some(widget) = toolkit.widgets.get_mut(&list) else {
        return false;
    };
    let ClassData::List { items, selected } = &mut widget.data else {
        log::warn!("ListBoxHandler: set_items on non-list {list:?} ignored.");
        return false;
    };
    *items = new_items;
    *selected = -1;
    if widget.exists() {
        let handle = widget.handle;
        if let ClassData::List { items, .. } = &widget.data {
            toolkit.backend.set_list_items(handle, items);
        }
    }
    true
}

pub(crate) fn select(toolkit: &mut Toolkit, list: WidgetId, index: i32) -> bool {
    let Some(widget) = toolkit.widgets.get_mut(&list) else {
        return false;
    };
    let ClassData::List { items, selected } = &mut widget.data else {
        log::warn!("ListBoxHandler: select on non-list {list:?} ignored.");
        return false;
    };
    if index < -1 || index >= items.len() as i32 {
        log::warn!(
            "ListBoxHandler: Index {index} out of range for {list:?} ({} entries).",
            items.len()
        );
        return false;
    }
    *selected = index;
    if widget.exists() {
        let handle = widget.handle;
        toolkit.backend.set_list_selection(handle, index);
    }
    true
}

pub(crate) fn selected_index(toolkit: &Toolkit, list: WidgetId) -> i32 {
    match toolkit.widgets.get(&list).map(|w| &w.data) {
        Some(ClassData::List { selected, .. }) => *selected,
        _ => -1,
    }
}

pub(crate) fn sync(toolkit: &mut Toolkit, list: WidgetId) {
    let Some(widget) = toolkit.widgets.get(&list) else {
        return;
    };
    if let ClassData::List { items, selected } = &widget.data {
        toolkit.backend.set_list_items(widget.handle, items);
        if *selected >= 0 {
            toolkit.backend.set_list_selection(widget.handle, *selected);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessProbe;
    use crate::types::{ToolkitConfig, WidgetConfig};
    use crate::widget::WidgetClass;

    fn setup() -> (Toolkit, HeadlessProbe, WidgetId) {
        let (mut toolkit, probe) = Toolkit::headless(ToolkitConfig::new("Test"));
        let root = toolkit.new_widget(WidgetClass::Window, None, WidgetConfig::default());
        toolkit.create(root).unwrap();
        let list = toolkit.new_widget(WidgetClass::ListBox, Some(root), WidgetConfig::default());
        (toolkit, probe, list)
    }

    fn entries() -> Vec<String> {
        vec!["alpha".into(), "beta".into(), "gamma".into()]
    }

    #[test]
    fn out_of_range_selection_is_ignored() {
        let (mut toolkit, _probe, list) = setup();
        toolkit.create(list).unwrap();
        toolkit.set_list_items(list, entries());
        assert!(toolkit.select(list, 1));

        assert!(!toolkit.select(list, 3));
        assert!(!toolkit.select(list, -2));

        assert_eq!(toolkit.selected_index(list), 1);
        assert!(toolkit.select(list, -1));
        assert_eq!(toolkit.selected_index(list), -1);
    }

    #[test]
    fn items_and_selection_set_before_creation_are_synced() {
        let (mut toolkit, probe, list) = setup();
        toolkit.set_list_items(list, entries());
        toolkit.select(list, 2);

        let handle = toolkit.create(list).unwrap();

        let native = probe.window(handle).unwrap();
        assert_eq!(native.list_items, entries());
        assert_eq!(native.list_selection, 2);
    }

    #[test]
    fn selchange_reads_native_selection() {
        let (mut toolkit, probe, list) = setup();
        let handle = toolkit.create(list).unwrap();
        toolkit.set_list_items(list, entries());
        probe.pick_list_entry(handle, 0);

        let response = handle_command(&mut toolkit, list, LBN_SELCHANGE);

        assert_eq!(response, MessageResponse::Handled(0));
        assert_eq!(toolkit.selected_index(list), 0);
    }

    #[test]
    fn selected_index_of_non_list_is_sentinel() {
        let (toolkit, _probe, _list) = setup();
        assert_eq!(selected_index(&toolkit, WidgetId(999)), -1);
    }
}
