//! Read-only detail modal state

/// Selected row and open flag of one screen's detail modal
#[derive(Debug, Clone, PartialEq)]
pub struct DetailView<T> {
    selected: Option<T>,
    is_open: bool,
}

impl<T> Default for DetailView<T> {
    fn default() -> Self {
        Self {
            selected: None,
            is_open: false,
        }
    }
}

impl<T> DetailView<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, row: T) {
        self.selected = Some(row);
        self.is_open = true;
    }

    pub fn close(&mut self) {
        self.selected = None;
        self.is_open = false;
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn selected(&self) -> Option<&T> {
        self.selected.as_ref()
    }
}
