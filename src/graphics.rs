//! Graphics support via embedded-graphics
//!
//! This module provides the [`GraphicDisplay`] struct which wraps [`Display`]
//! with an RGB565 framebuffer and implements the
//! [`DrawTarget`](embedded_graphics_core::draw_target::DrawTarget) trait from
//! the embedded-graphics ecosystem.
//!
//! Drawing only touches the framebuffer. [`GraphicDisplay::flush`] sends the
//! whole frame, [`GraphicDisplay::flush_rows`] a horizontal band of it.
//!
//! ## Example
//!
//! ```rust,no_run
//! use embedded_graphics::{
//!     pixelcolor::Rgb565,
//!     prelude::*,
//!     primitives::{PrimitiveStyle, Rectangle},
//! };
//! use axs15231b::{Config, Display, GraphicDisplay, Interface};
//! # use core::convert::Infallible;
//! # use embedded_hal::delay::DelayNs;
//! # use embedded_hal::digital::OutputPin;
//! # use axs15231b::{BusConfig, QspiBus};
//! # use axs15231b::transaction::Transaction;
//! # struct MockBus;
//! # impl QspiBus for MockBus {
//! #     type Error = Infallible;
//! #     fn configure(&mut self, _config: &BusConfig) -> Result<(), Self::Error> { Ok(()) }
//! #     fn polling_transmit(&mut self, _t: &Transaction<'_>) -> Result<(), Self::Error> { Ok(()) }
//! #     fn queue_transmit(&mut self, _t: &Transaction<'_>) -> Result<(), Self::Error> { Ok(()) }
//! #     fn poll_completed(&mut self) -> Result<bool, Self::Error> { Ok(true) }
//! #     fn wait_completed(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # struct MockPin;
//! # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
//! # impl OutputPin for MockPin {
//! #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # struct MockDelay;
//! # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! # let mut delay = MockDelay;
//! let interface = Interface::new(MockBus, MockPin, MockPin);
//! let mut display = Display::new(interface, Config::axs15231b_180x640());
//! if display.initialize(&mut delay).is_err() {
//!     return;
//! }
//!
//! let mut graphic_display = match GraphicDisplay::new(display, vec![0u16; 180 * 640]) {
//!     Ok(gd) => gd,
//!     Err(_) => return,
//! };
//!
//! let _ = Rectangle::new(Point::new(10, 10), Size::new(40, 20))
//!     .into_styled(PrimitiveStyle::with_fill(Rgb565::RED))
//!     .draw(&mut graphic_display);
//!
//! if let Err(err) = graphic_display.flush() {
//!     let _ = err;
//! }
//! ```

use core::convert::Infallible;

use embedded_graphics_core::{
    Pixel,
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Point, Size},
    pixelcolor::Rgb565,
    primitives::Rectangle,
};

use crate::color::from_rgb565;
use crate::display::Display;
use crate::error::Error;
use crate::interface::DisplayInterface;

type GraphicsResult<I> = core::result::Result<(), Error<I>>;
type GraphicsNewResult<I, T> = core::result::Result<T, Error<I>>;

/// Display with an RGB565 framebuffer and embedded-graphics support
///
/// The framebuffer is row-major in the current orientation, so its length
/// must be at least `width * height` of the panel.
///
/// ## Type Parameters
///
/// * `I` - Interface type
/// * `B` - Rotation scratch storage of the wrapped [`Display`]
/// * `F` - Framebuffer storage
pub struct GraphicDisplay<I, B, F>
where
    I: DisplayInterface,
{
    /// The underlying display driver
    display: Display<I, B>,
    /// Frame contents, one raw RGB565 sample per pixel
    framebuffer: F,
}

impl<I, B, F> GraphicDisplay<I, B, F>
where
    I: DisplayInterface,
    B: AsMut<[u16]> + AsRef<[u16]>,
    F: AsMut<[u16]> + AsRef<[u16]>,
{
    /// Wrap a display and a framebuffer
    ///
    /// # Errors
    ///
    /// Returns `Error::BufferTooSmall` if the framebuffer holds fewer than
    /// `width * height` pixels.
    pub fn new(display: Display<I, B>, framebuffer: F) -> GraphicsNewResult<I, Self> {
        let required = display.dimensions().pixel_count();
        let provided = framebuffer.as_ref().len();
        if provided < required {
            return Err(Error::BufferTooSmall { required, provided });
        }
        Ok(Self {
            display,
            framebuffer,
        })
    }

    /// Send the whole framebuffer, blocking until it is on the panel
    pub fn flush(&mut self) -> GraphicsResult<I> {
        let size = self.size();
        self.flush_rows(0, size.height as u16)
    }

    /// Send rows `y..y + rows` of the framebuffer
    ///
    /// Rows are contiguous in the framebuffer, so the band goes out as a
    /// single push without copying.
    pub fn flush_rows(&mut self, y: u16, rows: u16) -> GraphicsResult<I> {
        let width = self.size().width as u16;
        let start = usize::from(y) * usize::from(width);
        let len = usize::from(rows) * usize::from(width);
        let Some(band) = self.framebuffer.as_ref().get(start..start + len) else {
            return Err(Error::WindowOutOfBounds {
                x: 0,
                y,
                w: width,
                h: rows,
            });
        };
        self.display.push_and_wait(0, y, width, rows, band)
    }

    /// Raw framebuffer contents
    pub fn framebuffer(&self) -> &[u16] {
        self.framebuffer.as_ref()
    }

    /// Access the underlying Display
    pub fn display(&self) -> &Display<I, B> {
        &self.display
    }

    /// Access the underlying Display mutably
    ///
    /// Changing the orientation here changes the drawing size; redraw the
    /// frame before the next flush.
    pub fn display_mut(&mut self) -> &mut Display<I, B> {
        &mut self.display
    }

    /// Release the display and the framebuffer
    pub fn release(self) -> (Display<I, B>, F) {
        (self.display, self.framebuffer)
    }

    fn index(&self, point: Point) -> Option<usize> {
        let size = self.size();
        let x = u32::try_from(point.x).ok()?;
        let y = u32::try_from(point.y).ok()?;
        if x >= size.width || y >= size.height {
            return None;
        }
        Some((y * size.width + x) as usize)
    }
}

impl<I, B, F> DrawTarget for GraphicDisplay<I, B, F>
where
    I: DisplayInterface,
    B: AsMut<[u16]> + AsRef<[u16]>,
    F: AsMut<[u16]> + AsRef<[u16]>,
{
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<Iter>(&mut self, pixels: Iter) -> Result<(), Self::Error>
    where
        Iter: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let Some(index) = self.index(point) {
                self.framebuffer.as_mut()[index] = from_rgb565(color);
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&Rectangle::new(Point::zero(), self.size()));
        let Some(bottom_right) = area.bottom_right() else {
            return Ok(());
        };
        let raw = from_rgb565(color);
        let width = self.size().width as usize;
        let (x0, x1) = (area.top_left.x as usize, bottom_right.x as usize);
        for y in area.top_left.y..=bottom_right.y {
            let row = y as usize * width;
            self.framebuffer.as_mut()[row + x0..=row + x1].fill(raw);
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.framebuffer.as_mut().fill(from_rgb565(color));
        Ok(())
    }
}

impl<I, B, F> OriginDimensions for GraphicDisplay<I, B, F>
where
    I: DisplayInterface,
    B: AsMut<[u16]> + AsRef<[u16]>,
    F: AsMut<[u16]> + AsRef<[u16]>,
{
    fn size(&self) -> Size {
        let rotated = self.display.config().rotated_dimensions();
        Size::new(u32::from(rotated.width), u32::from(rotated.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Builder, Dimensions, Rotation};
    use crate::mock::{MockDelay, MockInterface};
    use crate::transfer::PushStatus;
    use embedded_graphics::prelude::*;
    use embedded_graphics::primitives::{Line, PrimitiveStyle};

    fn test_display(rotation: Rotation) -> Display<MockInterface> {
        let config = Builder::new()
            .dimensions(Dimensions::new(8, 4).unwrap())
            .rotation(rotation)
            .build()
            .unwrap();
        let mut display = Display::new(MockInterface::new(), config);
        display.initialize(&mut MockDelay::new()).unwrap();
        display
    }

    fn graphic(
        rotation: Rotation,
    ) -> GraphicDisplay<MockInterface, [u16; 0], alloc::vec::Vec<u16>> {
        GraphicDisplay::new(test_display(rotation), alloc::vec![0u16; 32]).unwrap()
    }

    #[test]
    fn test_new_small_framebuffer_returns_error() {
        let result = GraphicDisplay::new(test_display(Rotation::Rotate0), [0u16; 31]);
        assert!(matches!(
            result,
            Err(Error::BufferTooSmall {
                required: 32,
                provided: 31
            })
        ));
    }

    #[test]
    fn test_size_follows_orientation() {
        assert_eq!(graphic(Rotation::Rotate0).size(), Size::new(8, 4));
        assert_eq!(graphic(Rotation::Rotate90).size(), Size::new(4, 8));
    }

    #[test]
    fn test_draw_iter_clips() {
        let mut gd = graphic(Rotation::Rotate0);
        Pixel(Point::new(1, 2), Rgb565::RED).draw(&mut gd).unwrap();
        Pixel(Point::new(-1, 0), Rgb565::RED).draw(&mut gd).unwrap();
        Pixel(Point::new(8, 0), Rgb565::RED).draw(&mut gd).unwrap();

        let red = from_rgb565(Rgb565::RED);
        assert_eq!(gd.framebuffer()[2 * 8 + 1], red);
        assert_eq!(gd.framebuffer().iter().filter(|&&p| p == red).count(), 1);
    }

    #[test]
    fn test_fill_solid_clips_to_panel() {
        let mut gd = graphic(Rotation::Rotate0);
        gd.fill_solid(
            &Rectangle::new(Point::new(6, 2), Size::new(10, 10)),
            Rgb565::GREEN,
        )
        .unwrap();
        let green = from_rgb565(Rgb565::GREEN);
        let filled: alloc::vec::Vec<usize> = gd
            .framebuffer()
            .iter()
            .enumerate()
            .filter(|(_, p)| **p == green)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(filled, [22, 23, 30, 31]);
    }

    #[test]
    fn test_line_primitive() {
        let mut gd = graphic(Rotation::Rotate0);
        Line::new(Point::new(0, 0), Point::new(7, 0))
            .into_styled(PrimitiveStyle::with_stroke(Rgb565::WHITE, 1))
            .draw(&mut gd)
            .unwrap();
        assert!(gd.framebuffer()[..8].iter().all(|&p| p == 0xFFFF));
        assert!(gd.framebuffer()[8..].iter().all(|&p| p == 0));
    }

    #[test]
    fn test_flush_sends_frame() {
        let mut gd = graphic(Rotation::Rotate0);
        gd.clear(Rgb565::BLUE).unwrap();
        gd.display_mut().interface_mut().clear();
        gd.flush().unwrap();

        let (display, _) = gd.release();
        let (iface, _) = display.release();
        assert_eq!(iface.pixels(), [from_rgb565(Rgb565::BLUE); 32]);
    }

    #[test]
    fn test_flush_rows_sends_band() {
        let mut gd = graphic(Rotation::Rotate0);
        gd.display_mut().interface_mut().clear();
        gd.flush_rows(1, 2).unwrap();
        let (display, _) = gd.release();
        let (iface, _) = display.release();
        assert_eq!(
            iface.commands(),
            [
                (crate::command::CASET, alloc::vec![0, 0, 0, 7]),
                (crate::command::RASET, alloc::vec![0, 1, 0, 2]),
            ]
        );
        assert_eq!(iface.pixels().len(), 16);

        let mut gd = graphic(Rotation::Rotate0);
        assert!(matches!(
            gd.flush_rows(3, 2),
            Err(Error::WindowOutOfBounds { .. })
        ));
        assert_eq!(gd.display_mut().flush().unwrap(), PushStatus::Complete);
    }
}
