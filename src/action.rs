/// Application actions representing all possible state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    // Core events
    Quit,

    // Navigation
    NextField,
    PrevField,
    Up,
    Down,

    // Input modes
    EnterInsert,
    EnterNormal,

    // Form actions
    SubmitEntry,
    CalculateTotal,

    // UI toggles
    ToggleHelp,

    // Text input
    InputChar(char),
    InputBackspace,
}
