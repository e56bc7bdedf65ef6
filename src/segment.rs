//! Maps a segment and index to the way the emitted code reaches that cell.

use crate::ast::Segment;
use crate::error::{CommandError, MalformedOperandSnafu};
use crate::parser::MAX_CONSTANT;

/// First RAM word of the temp segment.
pub const TEMP_BASE: u16 = 5;

/// Where a segment cell lives.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Location {
    /// `*base + index`, where `base` names a pointer register.
    Indirect { base: &'static str, index: u16 },
    /// A fixed address or symbol, loadable with a single `@`.
    Direct(String),
    /// Not an address at all; the index is the value.
    Immediate(u16),
}

fn pointer_register(arg: u16) -> Result<&'static str, CommandError> {
    match arg {
        0 => Ok("THIS"),
        1 => Ok("THAT"),
        _ => MalformedOperandSnafu {
            reason: format!("pointer index must be 0 or 1, got {arg}"),
        }
        .fail(),
    }
}

fn temp_address(arg: u16) -> Result<u16, CommandError> {
    match TEMP_BASE.checked_add(arg) {
        Some(addr) if addr <= MAX_CONSTANT => Ok(addr),
        _ => MalformedOperandSnafu {
            reason: format!("temp index {arg} is past the end of memory"),
        }
        .fail(),
    }
}

/// Resolve `segment index` for code in translation unit `unit`.
///
/// Temp indexes are not bounded to the 8-word segment: `temp 8` and up land
/// on R13 and beyond, which `pop` and `return` use as scratch registers.
pub fn resolve(segment: Segment, arg: u16, unit: &str) -> Result<Location, CommandError> {
    if arg > MAX_CONSTANT {
        return MalformedOperandSnafu {
            reason: format!("index {arg} is out of range 0..={MAX_CONSTANT}"),
        }
        .fail();
    }

    let location = match segment {
        Segment::Local => Location::Indirect {
            base: "LCL",
            index: arg,
        },
        Segment::Argument => Location::Indirect {
            base: "ARG",
            index: arg,
        },
        Segment::This => Location::Indirect {
            base: "THIS",
            index: arg,
        },
        Segment::That => Location::Indirect {
            base: "THAT",
            index: arg,
        },
        Segment::Temp => Location::Direct(temp_address(arg)?.to_string()),
        Segment::Pointer => Location::Direct(pointer_register(arg)?.to_string()),
        Segment::Static => Location::Direct(format!("{}.{}", unit, arg)),
        Segment::Constant => Location::Immediate(arg),
    };
    Ok(location)
}

#[test]
fn test_resolve() {
    assert_eq!(
        resolve(Segment::Argument, 3, "Main"),
        Ok(Location::Indirect {
            base: "ARG",
            index: 3
        })
    );
    assert_eq!(
        resolve(Segment::Temp, 6, "Main"),
        Ok(Location::Direct("11".to_string()))
    );
    assert_eq!(
        resolve(Segment::Pointer, 1, "Main"),
        Ok(Location::Direct("THAT".to_string()))
    );
    assert_eq!(
        resolve(Segment::Static, 4, "Class1"),
        Ok(Location::Direct("Class1.4".to_string()))
    );
    assert_eq!(
        resolve(Segment::Constant, 17, "Main"),
        Ok(Location::Immediate(17))
    );
    assert!(resolve(Segment::Pointer, 2, "Main").is_err());
}

#[test]
fn test_resolve_range() {
    assert_eq!(
        resolve(Segment::Temp, 32762, "Main"),
        Ok(Location::Direct("32767".to_string()))
    );
    assert!(resolve(Segment::Temp, 32763, "Main").is_err());
    assert!(resolve(Segment::Temp, 65535, "Main").is_err());
    assert!(resolve(Segment::Constant, 40000, "Main").is_err());
    assert!(resolve(Segment::That, 32768, "Main").is_err());
    assert!(resolve(Segment::Static, 32768, "Main").is_err());
}
