use pocket::joypad::JoypadState;
use pocket::ppu::{FRAME_BUFFER_LEN, LCD_BUFFER_LEN, LCD_HEIGHT, LCD_WIDTH};
use sdl2::pixels::PixelFormatEnum;
use std::path::Path;
use std::time::Instant;
use std::{env, thread};

mod constants;
mod drawing;
mod emulator;
mod input;
mod sdl_setup;

use emulator::Emulator;

fn main() -> Result<(), String> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <rom_path> [boot_rom_path]", args[0]);
        std::process::exit(1);
    }
    let rom_path = Path::new(&args[1]);
    let boot_rom_path = args.get(2).map(Path::new);

    let rom_filename = rom_path.file_name().unwrap_or_default().to_string_lossy();
    let window_title = format!("pocket - {}", rom_filename);

    let mut emulator = Emulator::new(rom_path, boot_rom_path)?;

    let mut sdl_context = sdl_setup::init_sdl(&window_title)?;
    let mut texture = sdl_context
        .texture_creator
        .create_texture_streaming(
            PixelFormatEnum::RGBA32,
            LCD_WIDTH as u32,
            LCD_HEIGHT as u32,
        )
        .map_err(|e| e.to_string())?;

    // Host-owned frame sink the projector writes into, plus the sampled
    // 160x144 window that actually reaches the screen
    let mut frame = vec![0u8; FRAME_BUFFER_LEN];
    let mut lcd = vec![0u8; LCD_BUFFER_LEN];
    let mut joypad = JoypadState::default();

    let mut last_time = Instant::now();
    let mut time_accumulator = 0.0f64;

    'main_loop: loop {
        let frame_start = Instant::now();

        if input::handle_input(&mut sdl_context.event_pump, &mut joypad) {
            break 'main_loop;
        }
        emulator.set_joypad(joypad);

        let now = Instant::now();
        time_accumulator += now.duration_since(last_time).as_secs_f64();
        if time_accumulator > constants::MAX_TIME_ACCUMULATOR {
            time_accumulator = constants::MAX_TIME_ACCUMULATOR;
        }
        last_time = now;

        while time_accumulator >= constants::FRAME_DELTA {
            if let Err(e) = emulator.run(constants::FRAME_DELTA) {
                eprintln!("emulator error: {}", e);
                return Err(e);
            }
            time_accumulator -= constants::FRAME_DELTA;
        }

        emulator.render(&mut frame);
        let (scx, scy) = emulator.scroll();
        drawing::present_frame(
            &mut sdl_context.canvas,
            &mut texture,
            &frame,
            &mut lcd,
            scx,
            scy,
        )?;

        let elapsed = frame_start.elapsed();
        if elapsed < constants::TARGET_FRAME_DURATION {
            thread::sleep(constants::TARGET_FRAME_DURATION - elapsed);
        }
    }

    Ok(())
}
