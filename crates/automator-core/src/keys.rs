//! Symbolic key names and their platform key codes
//!
//! The table covers digits, lowercase letters, the arrow keys and a handful
//! of control keys. Codes are the legacy DOM `keyCode` values.

/// Symbol to key code table.
pub static KEY_CODES: &[(&str, u16)] = &[
    ("0", 48),
    ("1", 49),
    ("2", 50),
    ("3", 51),
    ("4", 52),
    ("5", 53),
    ("6", 54),
    ("7", 55),
    ("8", 56),
    ("9", 57),
    ("a", 65),
    ("b", 66),
    ("c", 67),
    ("d", 68),
    ("e", 69),
    ("f", 70),
    ("g", 71),
    ("h", 72),
    ("i", 73),
    ("j", 74),
    ("k", 75),
    ("l", 76),
    ("m", 77),
    ("n", 78),
    ("o", 79),
    ("p", 80),
    ("q", 81),
    ("r", 82),
    ("s", 83),
    ("t", 84),
    ("u", 85),
    ("v", 86),
    ("w", 87),
    ("x", 88),
    ("y", 89),
    ("z", 90),
    ("left", 37),
    ("up", 38),
    ("right", 39),
    ("down", 40),
    ("enter", 13),
    ("tab", 9),
    ("ctrl", 17),
    ("esc", 27),
    ("space", 32),
];

/// Look up the key code for a symbol. Matching is exact and case-sensitive.
pub fn key_code(symbol: &str) -> Option<u16> {
    KEY_CODES
        .iter()
        .find(|(name, _)| *name == symbol)
        .map(|(_, code)| *code)
}

/// Reverse lookup: the symbol registered for a key code
pub fn symbol_for(code: u16) -> Option<&'static str> {
    KEY_CODES
        .iter()
        .find(|(_, c)| *c == code)
        .map(|(name, _)| *name)
}

/// Check if a symbol is known to the table
pub fn is_known(symbol: &str) -> bool {
    key_code(symbol).is_some()
}
