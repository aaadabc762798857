//! Contains logic for reading the keyboard state in different environments.
//! [GenericKeyboardApi] is the main artifact of this module that abstracts
//! the operations.

pub mod names;
#[cfg(feature = "win")]
pub mod win;
#[cfg(feature = "x11")]
pub mod x11;

#[cfg(feature = "win")]
extern crate windows;

#[cfg(feature = "x11")]
extern crate xcb;

use std::sync::Arc;

use anyhow::Result;

/// Intended to serve as a contract windows and linux systems must implement.
#[cfg_attr(test, mockall::automock)]
pub trait KeyboardApi {
    /// Names of all keys that are held down right now. For example `["Shift", "A"]`.
    fn pressed_keys(&mut self) -> Result<Vec<Arc<str>>>;
}

/// Serves as a cross-compatible KeyboardApi implementation.
pub struct GenericKeyboardApi {
    inner: Box<dyn KeyboardApi>,
}

impl GenericKeyboardApi {
    pub fn new() -> Result<Self> {
        cfg_if::cfg_if! {
            if #[cfg(feature = "win")] {
                use win::WindowsKeyboardApi;
                Ok(Self {
                    inner: Box::new(WindowsKeyboardApi::new()),
                })
            }
            else if #[cfg(feature = "x11")] {
                use x11::LinuxKeyboardApi;
                Ok(Self {
                    inner: Box::new(LinuxKeyboardApi::new()?),
                })
            }
            else {
                Err(anyhow::anyhow!(
                    "No keyboard backend was compiled in. Build with the `x11` or `win` feature, or pass key names through --stdin"
                ))
            }
        }
    }
}

impl KeyboardApi for GenericKeyboardApi {
    fn pressed_keys(&mut self) -> Result<Vec<Arc<str>>> {
        self.inner.pressed_keys()
    }
}

#[cfg(test)]
mod tests {
    #[cfg(not(any(feature = "win", feature = "x11")))]
    #[test]
    fn test_missing_backend_is_an_error() {
        use super::GenericKeyboardApi;

        assert!(GenericKeyboardApi::new().is_err());
    }
}
