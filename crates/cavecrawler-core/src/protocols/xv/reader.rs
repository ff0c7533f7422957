//! Distance word unpacking.
//!
//! A distance word carries 14 bits of distance (mm) or error code, a
//! strength warning bit and an invalid-data bit.

use super::layout;

pub fn distance_value(word: u16) -> u16 {
    word & layout::DISTANCE_MASK
}

pub fn strength_warning(word: u16) -> bool {
    word & layout::STRENGTH_WARNING_BIT != 0
}

pub fn invalid_data(word: u16) -> bool {
    word & layout::INVALID_DATA_BIT != 0
}
