//! Contiguous string building in a bump arena.

use crate::error::{ArenaError, ArenaResult};
use crate::memory::BumpArena;

/// Concatenates `parts` into one fresh region of `bump`.
///
/// The total length is computed first, so a string that does not fit fails
/// before anything is written.
///
/// # Errors
///
/// [`ArenaError::OutOfCapacity`] if the concatenation does not fit.
pub fn concat_in<'b>(bump: &'b BumpArena<'_>, parts: &[&[u8]]) -> ArenaResult<&'b mut [u8]> {
    concat_parts(bump, parts)
}

/// [`concat_in`] for UTF-8 text, e.g. joining path components.
///
/// # Errors
///
/// [`ArenaError::OutOfCapacity`] if the concatenation does not fit.
pub fn concat_str_in<'b>(bump: &'b BumpArena<'_>, parts: &[&str]) -> ArenaResult<&'b str> {
    let out = concat_parts(bump, parts)?;
    // Joined UTF-8 parts are UTF-8, so this check never fails.
    std::str::from_utf8(out).map_err(|_| ArenaError::LayoutMismatch("joined text is not UTF-8"))
}

fn concat_parts<'b, P: AsRef<[u8]>>(
    bump: &'b BumpArena<'_>,
    parts: &[P],
) -> ArenaResult<&'b mut [u8]> {
    let total = parts
        .iter()
        .try_fold(0usize, |total, part| total.checked_add(part.as_ref().len()))
        .ok_or(ArenaError::CapacityOverflow(parts.len()))?;

    let out = bump.alloc_bytes(total, 1)?;
    let mut offset = 0;
    for part in parts {
        let part = part.as_ref();
        out[offset..offset + part.len()].copy_from_slice(part);
        offset += part.len();
    }
    Ok(out)
}
