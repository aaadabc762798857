use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, instrument};
use xcb::{
    x::{GetKeyboardMapping, Keycode, Keysym, QueryKeymap},
    Connection,
};

use super::{names::keysym_name, KeyboardApi};

const NO_SYMBOL: Keysym = 0;

pub struct LinuxKeyboardApi {
    connection: Connection,
    min_keycode: Keycode,
    keysyms_per_keycode: usize,
    keysyms: Vec<Keysym>,
}

impl LinuxKeyboardApi {
    pub fn new() -> Result<Self> {
        let (connection, _) = xcb::Connection::connect(None)?;
        let setup = connection.get_setup();
        let min_keycode = setup.min_keycode();
        let count = setup
            .max_keycode()
            .saturating_sub(min_keycode)
            .saturating_add(1);

        // TODO: refresh the table on MappingNotify so layout switches are picked up.
        let mapping = connection.wait_for_reply(connection.send_request(&GetKeyboardMapping {
            first_keycode: min_keycode,
            count,
        }))?;
        debug!(
            "Loaded {} keysyms for keycodes starting at {min_keycode}",
            mapping.keysyms().len()
        );

        Ok(Self {
            keysyms_per_keycode: mapping.keysyms_per_keycode() as usize,
            keysyms: mapping.keysyms().to_vec(),
            connection,
            min_keycode,
        })
    }

    fn key_name(&self, keycode: Keycode) -> Arc<str> {
        let keysym = keycode
            .checked_sub(self.min_keycode)
            .map(|offset| offset as usize * self.keysyms_per_keycode)
            .and_then(|index| self.keysyms.get(index))
            .copied()
            .filter(|keysym| *keysym != NO_SYMBOL);

        match keysym {
            Some(keysym) => keysym_name(keysym),
            None => format!("Unknown keyCode: 0x{keycode:x}").into(),
        }
    }
}

impl KeyboardApi for LinuxKeyboardApi {
    #[instrument(skip(self), level = "trace")]
    fn pressed_keys(&mut self) -> Result<Vec<Arc<str>>> {
        let keymap = self
            .connection
            .wait_for_reply(self.connection.send_request(&QueryKeymap {}))?;

        let mut pressed = vec![];
        for (byte_index, byte) in keymap.keys().iter().enumerate() {
            for bit in 0..8 {
                if byte & (1 << bit) != 0 {
                    pressed.push(self.key_name((byte_index * 8 + bit) as Keycode));
                }
            }
        }
        Ok(pressed)
    }
}
