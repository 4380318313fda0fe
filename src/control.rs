use crate::config::OverlayConfig;
use crate::error::ConfigResult;
use crate::session::OverlaySession;
use serde::{Deserialize, Serialize};

/// Messages sent by the host's control surface (popup)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ControlMessage {
    Enable,
    Disable,
    GetState,
}

/// Acknowledgement carrying the resulting "drawing enabled" flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlResponse {
    pub enabled: bool,
}

/// Owns at most one overlay session for a page.
pub struct Overlay {
    config: OverlayConfig,
    viewport: (u32, u32),
    session: Option<OverlaySession>,
}

impl Overlay {
    /// Fails if `config` does not pass `OverlayConfig::validate`
    pub fn new(config: OverlayConfig, width: u32, height: u32) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            viewport: (width, height),
            session: None,
        })
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.session.is_some()
    }

    /// Start a session sized to the viewport. Does nothing if already enabled.
    pub fn enable(&mut self) {
        if self.session.is_none() {
            let (width, height) = self.viewport;
            self.session = Some(OverlaySession::new(&self.config, width, height));
        }
    }

    /// Drop the session with all of its pixels and history
    pub fn disable(&mut self) {
        self.session = None;
    }

    pub fn handle_message(&mut self, message: ControlMessage) -> ControlResponse {
        match message {
            ControlMessage::Enable => self.enable(),
            ControlMessage::Disable => self.disable(),
            ControlMessage::GetState => {}
        }
        ControlResponse {
            enabled: self.is_enabled(),
        }
    }

    /// JSON in, JSON out variant of `handle_message`
    pub fn handle_json(&mut self, message: &str) -> Result<String, serde_json::Error> {
        let message: ControlMessage = serde_json::from_str(message)?;
        serde_json::to_string(&self.handle_message(message))
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// Track the viewport size, resizing the live session if any
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
        if let Some(session) = self.session.as_mut() {
            session.resize(width, height);
        }
    }

    pub fn session(&self) -> Option<&OverlaySession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut OverlaySession> {
        self.session.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_wire_format() {
        let message: ControlMessage = serde_json::from_str(r#"{"action":"getState"}"#).unwrap();
        assert_eq!(message, ControlMessage::GetState);
        assert_eq!(
            serde_json::to_string(&ControlMessage::Enable).unwrap(),
            r#"{"action":"enable"}"#
        );
        assert_eq!(
            serde_json::to_string(&ControlResponse { enabled: true }).unwrap(),
            r#"{"enabled":true}"#
        );
    }

    #[test]
    fn test_enable_disable_cycle() {
        let mut overlay = Overlay::new(OverlayConfig::default(), 40, 30).unwrap();
        assert!(!overlay.handle_message(ControlMessage::GetState).enabled);
        assert!(overlay.handle_message(ControlMessage::Enable).enabled);

        let id = overlay.session().unwrap().id();
        overlay.handle_message(ControlMessage::Enable);
        assert_eq!(overlay.session().unwrap().id(), id);

        assert!(!overlay.handle_message(ControlMessage::Disable).enabled);
        assert!(overlay.session().is_none());
        assert!(!overlay.handle_message(ControlMessage::Disable).enabled);
    }

    #[test]
    fn test_handle_json() {
        let mut overlay = Overlay::new(OverlayConfig::default(), 40, 30).unwrap();
        assert_eq!(
            overlay.handle_json(r#"{"action":"enable"}"#).unwrap(),
            r#"{"enabled":true}"#
        );
        assert!(overlay.handle_json(r#"{"action":"explode"}"#).is_err());
        assert!(overlay.is_enabled());
    }

    #[test]
    fn test_viewport_follows_into_session() {
        let mut overlay = Overlay::new(OverlayConfig::default(), 40, 30).unwrap();
        overlay.set_viewport(50, 30);
        overlay.enable();
        assert_eq!(overlay.session().unwrap().surface().width(), 50);

        overlay.set_viewport(60, 20);
        let surface = overlay.session().unwrap().surface();
        assert_eq!((surface.width(), surface.height()), (60, 20));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = OverlayConfig {
            min_brush_size: 10.0,
            max_brush_size: 5.0,
            ..Default::default()
        };
        assert!(matches!(
            Overlay::new(config, 10, 10),
            Err(crate::error::ConfigError::Invalid(_))
        ));
    }
}
