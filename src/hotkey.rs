//! System-wide capture shortcut.

use global_hotkey::hotkey::HotKey;
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState};
use log::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum HotkeyError {
    #[error("invalid hotkey {accelerator:?}: {reason}")]
    Parse { accelerator: String, reason: String },

    #[error("hotkey manager unavailable: {0}")]
    Manager(global_hotkey::Error),

    #[error("failed to register {accelerator}: {source}")]
    Register {
        accelerator: String,
        #[source]
        source: global_hotkey::Error,
    },
}

/// Parse an accelerator such as `ctrl+super+KeyA`.
pub fn parse_accelerator(accelerator: &str) -> Result<HotKey, HotkeyError> {
    accelerator
        .parse::<HotKey>()
        .map_err(|e| HotkeyError::Parse {
            accelerator: accelerator.to_string(),
            reason: e.to_string(),
        })
}

/// Owns the registration; unregistered on drop. Events are delivered to the
/// crate's global channel and must be polled from the UI thread.
pub struct HotkeyService {
    manager: GlobalHotKeyManager,
    hotkey: HotKey,
}

impl HotkeyService {
    pub fn register(accelerator: &str) -> Result<Self, HotkeyError> {
        let hotkey = parse_accelerator(accelerator)?;
        let manager = GlobalHotKeyManager::new().map_err(HotkeyError::Manager)?;
        manager
            .register(hotkey)
            .map_err(|source| HotkeyError::Register {
                accelerator: accelerator.to_string(),
                source,
            })?;
        info!("Global hotkey registered ({accelerator})");
        Ok(HotkeyService { manager, hotkey })
    }

    /// Drain pending events; true when our shortcut was pressed at least once.
    pub fn poll_fired(&self) -> bool {
        let mut fired = false;
        while let Ok(event) = GlobalHotKeyEvent::receiver().try_recv() {
            if event.id() == self.hotkey.id() && event.state() == HotKeyState::Pressed {
                fired = true;
            }
        }
        fired
    }
}

impl Drop for HotkeyService {
    fn drop(&mut self) {
        if let Err(e) = self.manager.unregister(self.hotkey) {
            warn!("Failed to unregister hotkey: {e}");
        }
    }
}
