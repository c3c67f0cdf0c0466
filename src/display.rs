//! Core panel operations

use embedded_hal::delay::DelayNs;

use crate::command::{
    ALL_PIXELS_OFF, AXS15231B_INIT, LONG_DELAY_MS, MADCTL, SHORT_DELAY_MS, SLEEP_IN, SOLID_FILL,
    WRITE_BRIGHTNESS,
};
use crate::config::{Config, Dimensions, Rotation};
use crate::error::Error;
use crate::interface::DisplayInterface;
use crate::rotation::{RotationBuffer, rotated_window};
use crate::transfer::{PushStatus, TransferSession, arm_window, send_command};

type DisplayResult<I> = core::result::Result<(), Error<I>>;

/// Inclusive addressing window in controller coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Window {
    /// First column
    pub x1: u16,
    /// First row
    pub y1: u16,
    /// Last column
    pub x2: u16,
    /// Last row
    pub y2: u16,
}

impl Window {
    /// Create a window from inclusive corners
    pub fn new(x1: u16, y1: u16, x2: u16, y2: u16) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Window covering `w × h` pixels at `(x, y)`
    ///
    /// Uses wrapping arithmetic, so an empty rectangle still yields a
    /// window (with `x2 < x1` or `y2 < y1`).
    #[allow(clippy::many_single_char_names)]
    pub fn for_rect(x: u16, y: u16, w: u16, h: u16) -> Self {
        Self {
            x1: x,
            y1: y,
            x2: x.wrapping_add(w).wrapping_sub(1),
            y2: y.wrapping_add(h).wrapping_sub(1),
        }
    }

    /// CASET parameters: big-endian first and last column
    pub fn column_bytes(&self) -> [u8; 4] {
        let [a, b] = self.x1.to_be_bytes();
        let [c, d] = self.x2.to_be_bytes();
        [a, b, c, d]
    }

    /// RASET parameters: big-endian first and last row
    pub fn row_bytes(&self) -> [u8; 4] {
        let [a, b] = self.y1.to_be_bytes();
        let [c, d] = self.y2.to_be_bytes();
        [a, b, c, d]
    }
}

/// Lifecycle of the panel
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum PanelState {
    /// Created, nothing sent
    #[default]
    Uninitialized,
    /// Reset line being pulsed
    Resetting,
    /// Bus settings applied
    BusConfigured,
    /// Init table sent
    CommandSequenced,
    /// Accepting drawing operations
    Ready,
    /// A bus operation failed; only a power cycle recovers
    Faulted,
}

/// Core display driver for the AXS15231B
///
/// Owns the interface, the transfer session and the rotation scratch
/// buffer. Every operation borrows the driver mutably, so transfers can
/// never overlap.
///
/// `B` is the storage behind the rotation buffer. A driver created with
/// [`Display::new`] has none and refuses rotated pushes until one is
/// attached with [`Display::with_rotation_buffer`].
pub struct Display<I, B = [u16; 0]>
where
    I: DisplayInterface,
{
    /// Hardware interface
    interface: I,
    /// Panel configuration
    config: Config,
    /// Chunked transfer state
    session: TransferSession,
    /// Scratch memory for quarter-turn pushes
    scratch: RotationBuffer<B>,
    /// Lifecycle state
    state: PanelState,
}

impl<I> Display<I, [u16; 0]>
where
    I: DisplayInterface,
{
    /// Create a new Display instance
    ///
    /// Nothing is sent until [`initialize`](Display::initialize).
    pub fn new(interface: I, config: Config) -> Self {
        let session = TransferSession::new(config.strategy, config.chunk_pixels);
        Self {
            interface,
            config,
            session,
            scratch: RotationBuffer::new([]),
            state: PanelState::Uninitialized,
        }
    }
}

impl<I, B> Display<I, B>
where
    I: DisplayInterface,
    B: AsMut<[u16]> + AsRef<[u16]>,
{
    /// Attach scratch memory for [`push_rotated`](Self::push_rotated)
    ///
    /// Size it for the largest sprite you rotate; a full panel is
    /// `180 * 640` pixels.
    pub fn with_rotation_buffer<S>(self, scratch: RotationBuffer<S>) -> Display<I, S>
    where
        S: AsMut<[u16]> + AsRef<[u16]>,
    {
        Display {
            interface: self.interface,
            config: self.config,
            session: self.session,
            scratch,
            state: self.state,
        }
    }

    /// Reset the controller, configure the bus and run the init table
    ///
    /// Ends by applying the configured orientation.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyInitialized`] on a second call
    /// - [`Error::BusFailure`] if the bus rejects a transaction
    pub fn initialize<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        match self.state {
            PanelState::Uninitialized => {}
            PanelState::Faulted => return Err(Error::Faulted),
            _ => return Err(Error::AlreadyInitialized),
        }

        self.enter(PanelState::Resetting);
        self.interface.reset(delay);

        let configured = self
            .interface
            .configure(&self.config.bus)
            .map_err(Error::BusFailure);
        self.track(configured)?;
        self.enter(PanelState::BusConfigured);

        for entry in &AXS15231B_INIT {
            let step = entry.decode();
            let sent = send_command(&mut self.interface, step.command, step.payload);
            self.track(sent)?;
            if step.long_delay {
                delay.delay_ms(LONG_DELAY_MS);
            }
            if step.short_delay {
                delay.delay_ms(SHORT_DELAY_MS);
            }
        }
        self.enter(PanelState::CommandSequenced);

        let rotation = self.config.rotation;
        self.command(MADCTL, &[rotation.madctl()])?;
        self.enter(PanelState::Ready);
        Ok(())
    }

    /// Set the scan orientation (MADCTL)
    pub fn set_orientation(&mut self, rotation: Rotation) -> DisplayResult<I> {
        self.ensure_idle()?;
        self.command(MADCTL, &[rotation.madctl()])?;
        self.config.rotation = rotation;
        Ok(())
    }

    /// Set the scan orientation from an index in `0..=3`
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRotation`] for any other index, without
    /// touching the bus.
    pub fn set_orientation_index(&mut self, index: u8) -> DisplayResult<I> {
        let rotation = Rotation::try_from(index).map_err(Error::InvalidRotation)?;
        self.set_orientation(rotation)
    }

    /// Arm the addressing window (inclusive corners)
    pub fn set_window(&mut self, x1: u16, y1: u16, x2: u16, y2: u16) -> DisplayResult<I> {
        self.ensure_ready()?;
        self.ensure_idle()?;
        let armed = arm_window(&mut self.interface, &Window::new(x1, y1, x2, y2));
        self.track(armed)
    }

    /// Write a `w × h` RGB565 buffer at `(x, y)`
    ///
    /// With [`TransferStrategy::Queued`](crate::TransferStrategy::Queued)
    /// this may return [`PushStatus::Pending`]; call it again with the same
    /// arguments (or [`flush`](Self::flush)) until it completes.
    ///
    /// # Errors
    ///
    /// - [`Error::BufferTooSmall`] if `buffer.len() != w * h`
    /// - [`Error::WindowOutOfBounds`] if the rectangle leaves the panel
    /// - [`Error::SessionBusy`] if a different queued push is pending
    #[allow(clippy::many_single_char_names)]
    pub fn push(
        &mut self,
        x: u16,
        y: u16,
        w: u16,
        h: u16,
        buffer: &[u16],
    ) -> core::result::Result<PushStatus, Error<I>> {
        self.ensure_ready()?;
        self.check_rect(x, y, w, h, buffer)?;
        let window = Window::for_rect(x, y, w, h);
        let pushed = self.session.push(&mut self.interface, window, buffer);
        self.track(pushed)
    }

    /// Like [`push`](Self::push) but blocks until the burst has completed
    #[allow(clippy::many_single_char_names)]
    pub fn push_and_wait(
        &mut self,
        x: u16,
        y: u16,
        w: u16,
        h: u16,
        buffer: &[u16],
    ) -> DisplayResult<I> {
        self.ensure_ready()?;
        self.check_rect(x, y, w, h, buffer)?;
        let window = Window::for_rect(x, y, w, h);
        let pushed = self
            .session
            .push_to_completion(&mut self.interface, window, buffer);
        self.track(pushed)
    }

    /// Wait for every queued chunk to finish
    ///
    /// Returns [`PushStatus::Pending`] if part of the pending push was never
    /// queued; repeat that push to send the rest.
    pub fn flush(&mut self) -> core::result::Result<PushStatus, Error<I>> {
        self.ensure_ready()?;
        let drained = self.session.drain(&mut self.interface);
        self.track(drained)
    }

    /// Rotate a `w × h` sprite a quarter turn and write it
    ///
    /// `(x, y)` are landscape coordinates. The sprite goes through the
    /// scratch buffer and is sent as one continuation burst.
    ///
    /// # Errors
    ///
    /// - [`Error::BufferTooLarge`] if `w * h` exceeds the scratch buffer
    /// - [`Error::BufferTooSmall`] if `buffer.len() != w * h`
    /// - [`Error::WindowOutOfBounds`] if the sprite leaves the panel
    #[allow(clippy::many_single_char_names)]
    pub fn push_rotated(
        &mut self,
        x: u16,
        y: u16,
        w: u16,
        h: u16,
        buffer: &[u16],
    ) -> DisplayResult<I> {
        self.ensure_ready()?;
        self.ensure_idle()?;

        let required = usize::from(w) * usize::from(h);
        let capacity = self.scratch.capacity();
        if required > capacity {
            return Err(Error::BufferTooLarge { required, capacity });
        }
        if buffer.len() != required {
            return Err(Error::BufferTooSmall {
                required,
                provided: buffer.len(),
            });
        }
        if required == 0 {
            return Ok(());
        }

        let physical = self.config.dimensions;
        let window = match rotated_window(x, y, w, h, physical.width) {
            Some(window) if window.y2 < physical.height => window,
            _ => return Err(Error::WindowOutOfBounds { x, y, w, h }),
        };

        let sent = match self.scratch.rotate(buffer, w, h) {
            Ok(pixels) => arm_window(&mut self.interface, &window)
                .and_then(|()| self.session.stream(&mut self.interface, pixels)),
            Err(err) => return Err(err.into()),
        };
        self.track(sent)
    }

    /// Stream pixels into the window that is already armed
    pub fn write_pixels(&mut self, pixels: &[u16]) -> DisplayResult<I> {
        self.ensure_ready()?;
        let sent = self.session.stream(&mut self.interface, pixels);
        self.track(sent)
    }

    /// Fill `[x1, x2) × [y1, y2)` with one color
    ///
    /// Builds the fill in a heap buffer and blocks until it is sent.
    #[cfg(feature = "alloc")]
    pub fn fill_rect(
        &mut self,
        x1: u16,
        y1: u16,
        x2: u16,
        y2: u16,
        color: u16,
    ) -> DisplayResult<I> {
        self.ensure_ready()?;
        let (w, h) = match (x2.checked_sub(x1), y2.checked_sub(y1)) {
            (Some(w), Some(h)) => (w, h),
            _ => {
                return Err(Error::WindowOutOfBounds {
                    x: x1,
                    y: y1,
                    w: x2.wrapping_sub(x1),
                    h: y2.wrapping_sub(y1),
                });
            }
        };
        let pixels = alloc::vec![color; usize::from(w) * usize::from(h)];
        self.push_and_wait(x1, y1, w, h, &pixels)
    }

    /// Write a single pixel
    ///
    /// # Errors
    ///
    /// Returns [`Error::WindowOutOfBounds`] if the pixel is off the panel.
    pub fn draw_point(&mut self, x: u16, y: u16, color: u16) -> DisplayResult<I> {
        self.ensure_ready()?;
        self.ensure_idle()?;
        self.check_rect(x, y, 1, 1, &[color])?;
        let sent = arm_window(&mut self.interface, &Window::new(x, y, x, y))
            .and_then(|()| self.session.stream(&mut self.interface, &[color]));
        self.track(sent)
    }

    /// Enter sleep mode
    pub fn sleep(&mut self) -> DisplayResult<I> {
        self.ensure_idle()?;
        self.command(SLEEP_IN, &[])
    }

    /// Set backlight brightness
    pub fn set_brightness(&mut self, level: u8) -> DisplayResult<I> {
        self.ensure_idle()?;
        self.command(WRITE_BRIGHTNESS, &[level])
    }

    /// Fill the whole panel in hardware with one color
    pub fn solid_fill(&mut self, r: u8, g: u8, b: u8) -> DisplayResult<I> {
        self.ensure_idle()?;
        self.command(SOLID_FILL, &[r, g, b])
    }

    /// Clear the whole panel to black in hardware
    pub fn clear_to_black(&mut self) -> DisplayResult<I> {
        self.ensure_idle()?;
        self.command(ALL_PIXELS_OFF, &[])
    }

    /// Whether a queued push is still outstanding
    pub fn is_transfer_active(&self) -> bool {
        self.session.is_active()
    }

    /// Current lifecycle state
    pub fn state(&self) -> PanelState {
        self.state
    }

    /// Get panel dimensions (native orientation)
    pub fn dimensions(&self) -> &Dimensions {
        &self.config.dimensions
    }

    /// Get the current orientation
    pub fn rotation(&self) -> Rotation {
        self.config.rotation
    }

    /// Access the underlying configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Access the underlying interface mutably
    pub fn interface_mut(&mut self) -> &mut I {
        &mut self.interface
    }

    /// Release the interface and the scratch storage
    pub fn release(self) -> (I, RotationBuffer<B>) {
        (self.interface, self.scratch)
    }

    /// Send a register write once the panel is ready
    fn command(&mut self, command: u8, data: &[u8]) -> DisplayResult<I> {
        match self.state {
            PanelState::Ready | PanelState::CommandSequenced => {}
            PanelState::Faulted => return Err(Error::Faulted),
            _ => return Err(Error::NotInitialized),
        }
        let sent = send_command(&mut self.interface, command, data);
        self.track(sent)
    }

    fn ensure_ready(&self) -> DisplayResult<I> {
        match self.state {
            PanelState::Ready => Ok(()),
            PanelState::Faulted => Err(Error::Faulted),
            _ => Err(Error::NotInitialized),
        }
    }

    /// Register writes would land in the middle of a queued burst
    fn ensure_idle(&self) -> DisplayResult<I> {
        if self.session.is_active() {
            return Err(Error::SessionBusy);
        }
        Ok(())
    }

    #[allow(clippy::many_single_char_names)]
    fn check_rect(&self, x: u16, y: u16, w: u16, h: u16, buffer: &[u16]) -> DisplayResult<I> {
        let required = usize::from(w) * usize::from(h);
        if buffer.len() != required {
            return Err(Error::BufferTooSmall {
                required,
                provided: buffer.len(),
            });
        }
        let bounds = self.config.rotated_dimensions();
        if u32::from(x) + u32::from(w) > u32::from(bounds.width)
            || u32::from(y) + u32::from(h) > u32::from(bounds.height)
        {
            return Err(Error::WindowOutOfBounds { x, y, w, h });
        }
        Ok(())
    }

    fn enter(&mut self, state: PanelState) {
        log::debug!("panel {:?} -> {:?}", self.state, state);
        self.state = state;
    }

    /// Move to [`PanelState::Faulted`] if `result` is a bus failure
    fn track<T>(
        &mut self,
        result: core::result::Result<T, Error<I>>,
    ) -> core::result::Result<T, Error<I>> {
        if let Err(Error::BusFailure(err)) = &result {
            log::warn!("bus failure in {:?}: {:?}", self.state, err);
            self.state = PanelState::Faulted;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CASET, DISPLAY_OFF, DISPLAY_ON, RASET, SLEEP_OUT};
    use crate::config::{Builder, TransferStrategy};
    use crate::mock::{Event, MockDelay, MockInterface};
    use alloc::vec::Vec;

    fn test_display() -> Display<MockInterface> {
        let config = Builder::new()
            .dimensions(Dimensions::new(180, 640).unwrap())
            .chunk_pixels(4)
            .build()
            .unwrap();
        Display::new(MockInterface::new(), config)
    }

    fn ready_display() -> Display<MockInterface> {
        let mut display = test_display();
        display.initialize(&mut MockDelay::new()).unwrap();
        display.interface.clear();
        display
    }

    fn queued_display(max_in_flight: usize) -> Display<MockInterface> {
        let config = Builder::new()
            .dimensions(Dimensions::new(180, 640).unwrap())
            .chunk_pixels(4)
            .strategy(TransferStrategy::Queued {
                max_in_flight,
                memory_floor: 0,
            })
            .build()
            .unwrap();
        let mut display = Display::new(MockInterface::new(), config);
        display.initialize(&mut MockDelay::new()).unwrap();
        display.interface.clear();
        display
    }

    #[test]
    fn test_initialize_sequence() {
        let mut display = test_display();
        let mut delay = MockDelay::new();
        display.initialize(&mut delay).unwrap();

        assert_eq!(display.state(), PanelState::Ready);
        assert_eq!(display.interface.events[0], Event::Reset);
        assert_eq!(display.interface.events[1], Event::Configure);
        assert_eq!(
            display.interface.commands(),
            [
                (DISPLAY_OFF, Vec::new()),
                (SLEEP_IN, alloc::vec![0x00]),
                (SLEEP_OUT, Vec::new()),
                (DISPLAY_ON, Vec::new()),
                (MADCTL, alloc::vec![0x00]),
            ]
        );
        // 20 ms after display off, 200 ms after sleep out
        assert_eq!(delay.calls, [20, 200]);
    }

    #[test]
    fn test_initialize_twice() {
        let mut display = ready_display();
        let result = display.initialize(&mut MockDelay::new());
        assert!(matches!(result, Err(Error::AlreadyInitialized)));
        assert!(display.interface.events.is_empty());
    }

    #[test]
    fn test_operations_before_initialize() {
        let mut display = test_display();
        assert!(matches!(
            display.push(0, 0, 1, 1, &[0]),
            Err(Error::NotInitialized)
        ));
        assert!(matches!(
            display.set_brightness(10),
            Err(Error::NotInitialized)
        ));
        assert!(matches!(
            display.draw_point(0, 0, 0),
            Err(Error::NotInitialized)
        ));
        assert!(display.interface.events.is_empty());
    }

    #[test]
    fn test_push_2x2_end_to_end() {
        let mut display = ready_display();
        let pixels = [0xF800, 0x07E0, 0x001F, 0xFFFF];
        let status = display.push(0, 0, 2, 2, &pixels).unwrap();
        assert_eq!(status, PushStatus::Complete);

        assert_eq!(
            display.interface.commands(),
            [
                (CASET, alloc::vec![0, 0, 0, 1]),
                (RASET, alloc::vec![0, 0, 0, 1]),
            ]
        );
        assert_eq!(display.interface.chunk_sizes(), [4]);
        assert_eq!(display.interface.pixels(), pixels);
    }

    #[test]
    fn test_push_rejects_wrong_buffer_length() {
        let mut display = ready_display();
        let result = display.push(0, 0, 2, 2, &[0; 3]);
        assert!(matches!(
            result,
            Err(Error::BufferTooSmall {
                required: 4,
                provided: 3
            })
        ));
        assert!(display.interface.events.is_empty());
    }

    #[test]
    fn test_push_out_of_bounds() {
        let mut display = ready_display();
        let result = display.push(179, 0, 2, 1, &[0; 2]);
        assert!(matches!(result, Err(Error::WindowOutOfBounds { .. })));
    }

    #[test]
    fn test_push_zero_size() {
        let mut display = ready_display();
        let status = display.push(10, 10, 0, 0, &[]).unwrap();
        assert_eq!(status, PushStatus::Complete);
        assert_eq!(display.interface.commands().len(), 2);
        assert!(display.interface.chunk_sizes().is_empty());
    }

    #[test]
    fn test_set_window_is_idempotent() {
        let mut display = ready_display();
        display.set_window(1, 2, 100, 300).unwrap();
        let first = display.interface.commands();
        display.interface.clear();
        display.set_window(1, 2, 100, 300).unwrap();
        assert_eq!(display.interface.commands(), first);
        assert_eq!(
            first,
            [
                (CASET, alloc::vec![0x00, 0x01, 0x00, 0x64]),
                (RASET, alloc::vec![0x00, 0x02, 0x01, 0x2C]),
            ]
        );
    }

    #[test]
    fn test_orientation_index() {
        let mut display = ready_display();
        for (index, expected) in [(0u8, 0x00u8), (1, 0x60), (2, 0xC0), (3, 0xA0)] {
            display.interface.clear();
            display.set_orientation_index(index).unwrap();
            assert_eq!(display.interface.commands(), [(MADCTL, alloc::vec![expected])]);
        }
        assert_eq!(display.rotation(), Rotation::Rotate270);

        display.interface.clear();
        let result = display.set_orientation_index(4);
        assert!(matches!(result, Err(Error::InvalidRotation(4))));
        assert!(display.interface.events.is_empty());
    }

    #[test]
    fn test_draw_point_uses_single_pixel_window() {
        let mut display = ready_display();
        display.draw_point(7, 9, 0x1234).unwrap();
        assert_eq!(
            display.interface.commands(),
            [
                (CASET, alloc::vec![0, 7, 0, 7]),
                (RASET, alloc::vec![0, 9, 0, 9]),
            ]
        );
        assert_eq!(display.interface.pixels(), [0x1234]);
    }

    #[test]
    fn test_draw_point_off_panel_sends_nothing() {
        let mut display = ready_display();
        let result = display.draw_point(1000, 1000, 0xFFFF);
        assert!(matches!(result, Err(Error::WindowOutOfBounds { .. })));
        let result = display.draw_point(180, 0, 0xFFFF);
        assert!(matches!(result, Err(Error::WindowOutOfBounds { .. })));
        assert!(display.interface.events.is_empty());

        display.draw_point(179, 639, 0xFFFF).unwrap();
        assert_eq!(display.interface.pixels(), [0xFFFF]);
    }

    #[test]
    fn test_panel_commands() {
        let mut display = ready_display();
        display.sleep().unwrap();
        display.set_brightness(0x80).unwrap();
        display.solid_fill(1, 2, 3).unwrap();
        display.clear_to_black().unwrap();
        assert_eq!(
            display.interface.commands(),
            [
                (SLEEP_IN, Vec::new()),
                (WRITE_BRIGHTNESS, alloc::vec![0x80]),
                (SOLID_FILL, alloc::vec![1, 2, 3]),
                (ALL_PIXELS_OFF, Vec::new()),
            ]
        );
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn test_fill_rect_exclusive_end() {
        let mut display = ready_display();
        display.fill_rect(10, 20, 13, 22, 0xAAAA).unwrap();
        assert_eq!(
            display.interface.commands(),
            [
                (CASET, alloc::vec![0, 10, 0, 12]),
                (RASET, alloc::vec![0, 20, 0, 21]),
            ]
        );
        assert_eq!(display.interface.pixels(), [0xAAAA; 6]);

        let result = display.fill_rect(10, 20, 5, 22, 0);
        assert!(matches!(result, Err(Error::WindowOutOfBounds { .. })));
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn test_fill_rect_below_memory_floor_returns() {
        let config = Builder::new()
            .dimensions(Dimensions::new(180, 640).unwrap())
            .chunk_pixels(16)
            .strategy(TransferStrategy::queued())
            .build()
            .unwrap();
        let mut display = Display::new(MockInterface::new(), config);
        display.initialize(&mut MockDelay::new()).unwrap();
        display.interface.clear();
        display.interface.free_memory = Some(50_000);

        display.fill_rect(0, 0, 10, 10, 0x07E0).unwrap();
        assert_eq!(display.interface.pixels(), [0x07E0; 100]);
        assert!(!display.is_transfer_active());
        assert_eq!(display.state(), PanelState::Ready);
    }

    #[test]
    fn test_push_rotated_without_scratch() {
        let mut display = ready_display();
        let result = display.push_rotated(0, 0, 2, 2, &[0; 4]);
        assert!(matches!(
            result,
            Err(Error::BufferTooLarge {
                required: 4,
                capacity: 0
            })
        ));
        assert!(display.interface.events.is_empty());
    }

    #[test]
    fn test_push_rotated() {
        let mut display = ready_display().with_rotation_buffer(RotationBuffer::new([0u16; 16]));
        // 3x2 sprite at landscape (5, 10)
        display.push_rotated(5, 10, 3, 2, &[1, 2, 3, 4, 5, 6]).unwrap();

        // x1 = 180 - (10 + 2) = 168, y1 = 5
        assert_eq!(
            display.interface.commands(),
            [
                (CASET, alloc::vec![0, 168, 0, 169]),
                (RASET, alloc::vec![0, 5, 0, 7]),
            ]
        );
        assert_eq!(display.interface.pixels(), [4, 1, 5, 2, 6, 3]);
        let continuation: Vec<_> = display
            .interface
            .transactions()
            .into_iter()
            .filter(|r| !r.pixels.is_empty())
            .map(|r| r.continuation)
            .collect();
        assert_eq!(continuation, [false, true]);
    }

    #[test]
    fn test_push_rotated_too_large_sends_nothing() {
        let mut display = ready_display().with_rotation_buffer(RotationBuffer::new([0u16; 4]));
        let result = display.push_rotated(0, 0, 3, 2, &[0; 6]);
        assert!(matches!(
            result,
            Err(Error::BufferTooLarge {
                required: 6,
                capacity: 4
            })
        ));
        assert!(display.interface.events.is_empty());
    }

    #[test]
    fn test_push_rotated_off_panel() {
        let mut display = ready_display().with_rotation_buffer(RotationBuffer::new([0u16; 16]));
        let result = display.push_rotated(0, 179, 1, 2, &[0; 2]);
        assert!(matches!(result, Err(Error::WindowOutOfBounds { .. })));
        let result = display.push_rotated(639, 0, 2, 1, &[0; 2]);
        assert!(matches!(result, Err(Error::WindowOutOfBounds { .. })));
    }

    #[test]
    fn test_queued_push_and_flush() {
        let mut display = queued_display(3);
        let pixels = [5u16; 12];
        let status = display.push(0, 0, 12, 1, &pixels).unwrap();
        assert!(!status.is_complete());
        assert!(display.is_transfer_active());

        // Register writes are refused mid-burst
        assert!(matches!(
            display.set_brightness(1),
            Err(Error::SessionBusy)
        ));
        assert!(matches!(
            display.push(0, 1, 12, 1, &pixels),
            Err(Error::SessionBusy)
        ));

        assert_eq!(display.flush().unwrap(), PushStatus::Complete);
        assert!(!display.is_transfer_active());
        assert_eq!(display.interface.pixels(), pixels);
    }

    #[test]
    fn test_queued_push_resumes() {
        let mut display = queued_display(1);
        let pixels: Vec<u16> = (0..10).collect();
        let mut calls = 0;
        while !display.push(0, 0, 10, 1, &pixels).unwrap().is_complete() {
            display.interface.complete(1);
            calls += 1;
            assert!(calls < 20);
        }
        assert_eq!(display.interface.pixels(), pixels);
        assert_eq!(display.interface.commands().len(), 2);
    }

    #[test]
    fn test_bus_failure_faults_panel() {
        let mut display = ready_display();
        display.interface.fail_at = Some(display.interface.submitted());
        let result = display.set_brightness(1);
        assert!(matches!(result, Err(Error::BusFailure(_))));
        assert_eq!(display.state(), PanelState::Faulted);

        assert!(matches!(display.push(0, 0, 1, 1, &[0]), Err(Error::Faulted)));
        assert!(matches!(display.set_brightness(1), Err(Error::Faulted)));
    }

    #[test]
    fn test_bus_failure_during_init() {
        let mut display = test_display();
        display.interface.fail_at = Some(0);
        let result = display.initialize(&mut MockDelay::new());
        assert!(matches!(result, Err(Error::BusFailure(_))));
        assert_eq!(display.state(), PanelState::Faulted);
        let result = display.initialize(&mut MockDelay::new());
        assert!(matches!(result, Err(Error::Faulted)));
    }
}
