use std::{collections::HashMap, sync::Arc};

use anyhow::Result;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    GetAsyncKeyState, GetKeyNameTextW, MapVirtualKeyW, MAPVK_VK_TO_VSC_EX,
};

use super::KeyboardApi;

/// First virtual key after the mouse buttons.
const FIRST_KEYBOARD_VK: i32 = 0x08;
const LAST_KEYBOARD_VK: i32 = 0xfe;
/// VK_LSHIFT..VK_RMENU duplicate the generic Shift, Ctrl and Alt keys.
const SIDED_MODIFIERS: std::ops::RangeInclusive<i32> = 0xa0..=0xa5;

fn is_held(vk: i32) -> bool {
    let state = unsafe { GetAsyncKeyState(vk) };
    (state as u16) & 0x8000 != 0
}

fn key_name(vk: i32) -> Arc<str> {
    let scan_code = unsafe { MapVirtualKeyW(vk as u32, MAPVK_VK_TO_VSC_EX) };
    let extended = if scan_code & 0xff00 == 0xe000 { 1 << 24 } else { 0 };
    let lparam = (((scan_code & 0xff) << 16) | extended) as i32;

    let mut text = [0u16; 64];
    let len = unsafe { GetKeyNameTextW(lparam, &mut text) };
    if len <= 0 {
        return format!("Unknown keyCode: 0x{vk:x}").into();
    }
    String::from_utf16_lossy(&text[..len as usize]).into()
}

pub struct WindowsKeyboardApi {
    names: HashMap<i32, Arc<str>>,
}

impl WindowsKeyboardApi {
    pub fn new() -> Self {
        Self {
            names: HashMap::new(),
        }
    }
}

impl Default for WindowsKeyboardApi {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyboardApi for WindowsKeyboardApi {
    fn pressed_keys(&mut self) -> Result<Vec<Arc<str>>> {
        let mut pressed = vec![];
        for vk in FIRST_KEYBOARD_VK..=LAST_KEYBOARD_VK {
            if SIDED_MODIFIERS.contains(&vk) || !is_held(vk) {
                continue;
            }
            let name = self.names.entry(vk).or_insert_with(|| key_name(vk));
            pressed.push(name.clone());
        }
        Ok(pressed)
    }
}
