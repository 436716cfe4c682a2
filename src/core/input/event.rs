//=========================================================================
// Game Input Events
//
// Portable keyboard events for embedded games.
//
// Games never see platform key codes. The host delivers `GameInput`
// values to listeners a game registered through its handle, filtered by
// `ListenerKind`.
//
//=========================================================================

//=== KeyCode =============================================================

/// Physical keyboard key identifier.
///
/// Covers the keys the arcade games bind: letters, digits, arrows and a
/// few control keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    //--- Numeric Keys -----------------------------------------------------

    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    //--- Alphabetic Keys --------------------------------------------------

    KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI,
    KeyJ, KeyK, KeyL, KeyM, KeyN, KeyO, KeyP, KeyQ, KeyR,
    KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,

    //--- Arrow Keys -------------------------------------------------------

    ArrowDown,
    ArrowLeft,
    ArrowRight,
    ArrowUp,

    //--- Special Keys -----------------------------------------------------

    Space,
    Enter,
    Escape,

    /// Any key the café does not map.
    Unidentified,
}

impl KeyCode {
    pub fn is_arrow(self) -> bool {
        matches!(
            self,
            Self::ArrowDown | Self::ArrowLeft | Self::ArrowRight | Self::ArrowUp
        )
    }
}

//=== GameInput ===========================================================

/// Keyboard event routed to the active game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameInput {
    KeyDown(KeyCode),
    KeyUp(KeyCode),
}

impl GameInput {
    pub fn key(&self) -> KeyCode {
        match self {
            Self::KeyDown(key) | Self::KeyUp(key) => *key,
        }
    }

    pub fn kind(&self) -> ListenerKind {
        match self {
            Self::KeyDown(_) => ListenerKind::KeyDown,
            Self::KeyUp(_) => ListenerKind::KeyUp,
        }
    }
}

//=== ListenerKind ========================================================

/// Event type a game listener subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    KeyDown,
    KeyUp,
}

//=========================================================================
// Tests
//=========================================================================
