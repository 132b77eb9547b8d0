//! Deterministic group colors.
//!
//! A group's color is derived from its name alone, so re-running an
//! organize plan over already-organized groups leaves their colors as they
//! were.
//!
//! The hash mirrors JavaScript number semantics: only the shifted term is
//! truncated to 32 bits, the running hash itself is not. Groups colored by
//! the browser extension keep their colors here.

use tabi_session::models::GroupColor;

/// The colors a group name can map to, in hash-index order.
pub const PALETTE: [GroupColor; 8] = [
    GroupColor::Blue,
    GroupColor::Red,
    GroupColor::Yellow,
    GroupColor::Green,
    GroupColor::Pink,
    GroupColor::Purple,
    GroupColor::Cyan,
    GroupColor::Orange,
];

/// Rolling hash over the UTF-16 code units of `name`
/// (`hash = c + ((hash << 5) - hash)`).
///
/// `hash << 5` truncates `hash` to an `i32` before shifting and wraps; the
/// subtraction and addition run at full width.
pub fn name_hash(name: &str) -> i64 {
    name.encode_utf16().fold(0i64, |hash, unit| {
        let shifted = i64::from((hash as i32).wrapping_shl(5));
        i64::from(unit).wrapping_add(shifted.wrapping_sub(hash))
    })
}

/// Pick the color for a group name.
pub fn group_color(name: &str) -> GroupColor {
    let index = name_hash(name).unsigned_abs() as usize % PALETTE.len();
    PALETTE[index]
}
