//! 90° rotation into a panel-sized scratch buffer
//!
//! The panel is mounted in landscape while the controller scans portrait,
//! so sprites drawn in landscape coordinates are turned a quarter clockwise
//! before they go out. [`RotationBuffer`] owns the scratch memory (normally
//! one full frame in external RAM) and rewrites it on every call.
//!
//! For a source of `width × height` pixels the output has `height` columns
//! and `width` rows: output row `j` is source column `j` read bottom to top.
//!
//! ## Example
//!
//! ```
//! use axs15231b::rotation::RotationBuffer;
//!
//! // 3x2 source:
//! //   1 2 3
//! //   4 5 6
//! let src = [1, 2, 3, 4, 5, 6];
//! let mut rot = RotationBuffer::new([0u16; 6]);
//! let out = match rot.rotate(&src, 3, 2) {
//!     Ok(out) => out,
//!     Err(_) => return,
//! };
//! // 2x3 result:
//! //   4 1
//! //   5 2
//! //   6 3
//! assert_eq!(out, &[4, 1, 5, 2, 6, 3]);
//! ```

use crate::display::Window;

/// Reasons a rotation can be refused
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RotateError {
    /// More pixels than the scratch buffer holds
    TooLarge {
        /// Pixels requested
        required: usize,
        /// Scratch capacity in pixels
        capacity: usize,
    },
    /// Source slice shorter than `width * height`
    SourceTooShort {
        /// Pixels required
        required: usize,
        /// Pixels provided
        provided: usize,
    },
}

/// Write cursor over the scratch memory
struct Cursor<'a> {
    buf: &'a mut [u16],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a mut [u16]) -> Self {
        Self { buf, pos: 0 }
    }

    fn push(&mut self, pixel: u16) -> Result<(), RotateError> {
        let capacity = self.buf.len();
        let slot = self.buf.get_mut(self.pos).ok_or(RotateError::TooLarge {
            required: self.pos + 1,
            capacity,
        })?;
        *slot = pixel;
        self.pos += 1;
        Ok(())
    }

    fn finish(self) -> &'a [u16] {
        &self.buf[..self.pos]
    }
}

/// Scratch buffer for quarter-turn rotation
///
/// Generic over the storage so it can live in a `static` array, a boxed
/// slice, or memory handed out by a PSRAM allocator.
pub struct RotationBuffer<B> {
    storage: B,
}

impl<B> RotationBuffer<B>
where
    B: AsMut<[u16]> + AsRef<[u16]>,
{
    /// Wrap existing storage
    pub fn new(storage: B) -> Self {
        Self { storage }
    }

    /// Capacity in pixels
    pub fn capacity(&self) -> usize {
        self.storage.as_ref().len()
    }

    /// Rotate `src` (row-major, `width × height`) a quarter turn clockwise
    ///
    /// Returns the populated prefix of the scratch buffer.
    ///
    /// # Errors
    ///
    /// - [`RotateError::TooLarge`] if `width * height` exceeds [`capacity`](Self::capacity)
    /// - [`RotateError::SourceTooShort`] if `src` has fewer than `width * height` pixels
    pub fn rotate(&mut self, src: &[u16], width: u16, height: u16) -> Result<&[u16], RotateError> {
        let (w, h) = (usize::from(width), usize::from(height));
        let required = w * h;
        let capacity = self.capacity();
        if required > capacity {
            return Err(RotateError::TooLarge { required, capacity });
        }
        if src.len() < required {
            return Err(RotateError::SourceTooShort {
                required,
                provided: src.len(),
            });
        }

        let mut cursor = Cursor::new(self.storage.as_mut());
        for col in 0..w {
            for row in 0..h {
                cursor.push(src[w * (h - row - 1) + col])?;
            }
        }
        Ok(cursor.finish())
    }
}

#[cfg(feature = "alloc")]
impl RotationBuffer<alloc::boxed::Box<[u16]>> {
    /// Allocate a zeroed scratch buffer of `pixels` samples on the heap
    pub fn allocate(pixels: usize) -> Self {
        Self::new(alloc::vec![0u16; pixels].into_boxed_slice())
    }
}

/// Physical window receiving a rotated `w × h` sprite drawn at logical `(x, y)`
///
/// `panel_height` is the logical (landscape) height, i.e. the physical
/// panel width. Returns `None` when the sprite would cross the bottom edge
/// or is empty.
pub fn rotated_window(x: u16, y: u16, w: u16, h: u16, panel_height: u16) -> Option<Window> {
    if w == 0 || h == 0 {
        return None;
    }
    let x1 = panel_height.checked_sub(y.checked_add(h)?)?;
    let y1 = x;
    Some(Window {
        x1,
        y1,
        x2: x1 + h - 1,
        y2: y1.checked_add(w - 1)?,
    })
}
