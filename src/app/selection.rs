/// The at-most-one inspected node.
///
/// Set and cleared only by explicit picks; a new fetch never clears it. When
/// the selected id stops being part of the rendered graph the selection is
/// left in place and the detail panel reports it as unavailable.
#[derive(Debug, Default)]
pub(in crate::app) struct SelectionState {
    selected: Option<String>,
}

impl SelectionState {
    pub(in crate::app) fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub(in crate::app) fn select(&mut self, node_id: Option<String>) {
        self.selected = node_id;
    }

    pub(in crate::app) fn clear(&mut self) {
        self.selected = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_and_clear() {
        let mut selection = SelectionState::default();
        assert_eq!(selection.selected(), None);

        selection.select(Some("core::main".to_owned()));
        assert_eq!(selection.selected(), Some("core::main"));

        selection.select(Some("core::run".to_owned()));
        assert_eq!(selection.selected(), Some("core::run"));

        selection.select(None);
        assert_eq!(selection.selected(), None);

        selection.select(Some("core::main".to_owned()));
        selection.clear();
        assert_eq!(selection.selected(), None);
    }
}
