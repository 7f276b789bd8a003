//! Selection and responsive layout state for the inbox.

/// Default width (in terminal columns) below which the narrow layout is used.
pub const DEFAULT_NARROW_BREAKPOINT: u16 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedThread {
    pub thread_id: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionState {
    selected: Option<SelectedThread>,
}

impl SelectionState {
    pub fn selected(&self) -> Option<&SelectedThread> {
        self.selected.as_ref()
    }

    pub fn selected_thread_id(&self) -> Option<&str> {
        self.selected.as_ref().map(|s| s.thread_id.as_str())
    }

    pub fn is_selected(&self, thread_id: &str) -> bool {
        self.selected_thread_id() == Some(thread_id)
    }

    pub fn select(
        &mut self,
        thread_id: impl Into<String>,
        display_name: impl Into<String>,
        avatar_url: Option<String>,
    ) {
        self.selected = Some(SelectedThread {
            thread_id: thread_id.into(),
            display_name: display_name.into(),
            avatar_url,
        });
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    /// List or detail, never both.
    Narrow,
    /// List and detail side by side.
    Wide,
}

impl LayoutMode {
    pub fn for_width(width: u16, breakpoint: u16) -> Self {
        if width < breakpoint {
            Self::Narrow
        } else {
            Self::Wide
        }
    }

    pub fn as_label(&self) -> &'static str {
        match self {
            LayoutMode::Narrow => "narrow",
            LayoutMode::Wide => "wide",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneVisibility {
    pub list: bool,
    pub detail: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    width: u16,
    height: u16,
    breakpoint: u16,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: DEFAULT_NARROW_BREAKPOINT,
            height: 24,
            breakpoint: DEFAULT_NARROW_BREAKPOINT,
        }
    }
}

impl Viewport {
    pub fn new(width: u16, height: u16, breakpoint: u16) -> Self {
        Self {
            width,
            height,
            breakpoint,
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    pub fn layout_mode(&self) -> LayoutMode {
        LayoutMode::for_width(self.width, self.breakpoint)
    }

    /// Which panes render for the current width and selection.
    pub fn pane_visibility(&self, selection: &SelectionState) -> PaneVisibility {
        match self.layout_mode() {
            LayoutMode::Wide => PaneVisibility {
                list: true,
                detail: true,
            },
            LayoutMode::Narrow => {
                let has_selection = selection.selected().is_some();
                PaneVisibility {
                    list: !has_selection,
                    detail: has_selection,
                }
            }
        }
    }
}
