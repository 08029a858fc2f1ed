use pocket::ppu::{self, LCD_WIDTH};
use sdl2::render::{Canvas, Texture};
use sdl2::video::Window;

/// Samples the 160x144 window at (SCX, SCY) out of the 256x256 frame,
/// wrapping around both axes, and presents it scaled to the window.
pub fn present_frame(
    canvas: &mut Canvas<Window>,
    texture: &mut Texture,
    frame: &[u8],
    lcd: &mut [u8],
    scx: u8,
    scy: u8,
) -> Result<(), String> {
    ppu::sample_window(frame, scx, scy, lcd);
    texture
        .update(None, lcd, LCD_WIDTH * 4)
        .map_err(|e| e.to_string())?;

    canvas.clear();
    canvas.copy(texture, None, None)?;
    canvas.present();
    Ok(())
}
