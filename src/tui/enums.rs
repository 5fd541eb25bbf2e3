//! Enumerations for TUI state management.

/// Screen shown by the dashboard.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum AppState {
    Dashboard,
    BucketPicker,
    TeamPicker,
    Help,
}

/// Which multi-select a picker edits.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum PickerKind {
    Bucket,
    Team,
}

impl PickerKind {
    pub fn title(self) -> &'static str {
        match self {
            PickerKind::Bucket => "Buckets",
            PickerKind::Team => "Teams",
        }
    }

    pub fn state(self) -> AppState {
        match self {
            PickerKind::Bucket => AppState::BucketPicker,
            PickerKind::Team => AppState::TeamPicker,
        }
    }
}

/// What the event loop should do after a key press.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Action {
    None,
    Refresh,
    Quit,
}
