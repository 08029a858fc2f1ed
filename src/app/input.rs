use pocket::joypad::JoypadState;
use sdl2::EventPump;
use sdl2::event::Event;
use sdl2::keyboard::Keycode;

/// Polls SDL events into the joypad snapshot. Returns `true` on quit.
/// Edges are the core's business; this only reports held-or-not.
pub fn handle_input(event_pump: &mut EventPump, joypad: &mut JoypadState) -> bool {
    for event in event_pump.poll_iter() {
        match event {
            Event::Quit { .. }
            | Event::KeyDown {
                keycode: Some(Keycode::Escape),
                ..
            } => return true,
            Event::KeyDown {
                keycode: Some(key),
                repeat: false,
                ..
            } => set_key(joypad, key, true),
            Event::KeyUp {
                keycode: Some(key),
                repeat: false,
                ..
            } => set_key(joypad, key, false),
            _ => {}
        }
    }
    false
}

fn set_key(joypad: &mut JoypadState, key: Keycode, pressed: bool) {
    match key {
        Keycode::Up => joypad.up = pressed,
        Keycode::Down => joypad.down = pressed,
        Keycode::Left => joypad.left = pressed,
        Keycode::Right => joypad.right = pressed,
        Keycode::Z => joypad.a = pressed,
        Keycode::X => joypad.b = pressed,
        Keycode::Return => joypad.start = pressed,
        Keycode::Space => joypad.select = pressed,
        _ => {}
    }
}
