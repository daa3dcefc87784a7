//! Session lifecycle state machine.
//!
//! One session exists per coordinator process. All transitions run on the
//! coordinator's event-loop task, so each one is atomic with respect to the
//! others; readers elsewhere (pollers, status consumers) only ever see a
//! published [`SessionSnapshot`].

use stagecast_types::{MediaHandle, SessionSnapshot, ShareTarget, Technology};

use crate::error::CommandError;

/// Title shown while the mobile-capture policy is in effect.
pub const MOBILE_TITLE: &str = "Mobile Display";

/// The single mutable session record.
///
/// Lifecycle over the flag pair (`is_streaming`, `is_paused`):
/// `Idle -> Streaming -> Paused <-> Streaming -> Idle`.
#[derive(Debug, Default)]
pub struct SessionState {
    current: SessionSnapshot,
}

impl SessionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only copy of the current session.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.current.clone()
    }

    /// Negotiate a sharing technology.
    ///
    /// Validates against the configured allow-list, then activates the
    /// technology. Every negotiated technology is treated as mobile-capable
    /// by policy; downstream correction is the caller's concern.
    pub fn negotiate(
        &mut self,
        technology: Technology,
        allowed: &[Technology],
    ) -> Result<(), CommandError> {
        if !allowed.contains(&technology) {
            return Err(CommandError::UnsupportedTechnology(technology.to_string()));
        }

        self.current.technology = Some(technology);
        self.current.is_mobile = true;
        // A selected target belongs to the previous technology.
        self.current.selected_target = None;
        self.current.title = Some(MOBILE_TITLE.to_string());
        Ok(())
    }

    /// Begin streaming, optionally attaching the capture's media handle.
    ///
    /// Requires a negotiated technology: `is_streaming` implies
    /// `technology.is_some()`.
    pub fn start_stream(&mut self, content: Option<MediaHandle>) -> Result<(), CommandError> {
        if self.current.technology.is_none() {
            return Err(CommandError::InvalidTransition(
                "cannot start streaming before a technology is negotiated",
            ));
        }

        if content.is_some() {
            self.current.content = content;
        }
        self.current.is_streaming = true;
        Ok(())
    }

    /// Toggle the paused flag; streaming is unaffected. Returns the new value.
    pub fn toggle_pause(&mut self) -> bool {
        self.current.is_paused = !self.current.is_paused;
        self.current.is_paused
    }

    /// Bind the session to a capture target and force streaming on.
    ///
    /// Target selection only exists under VNC. The mobile flag does not gate
    /// selection; it only silences the target poller.
    pub fn select_target(&mut self, target: ShareTarget) -> Result<(), CommandError> {
        if self.current.technology != Some(Technology::Vnc) {
            return Err(CommandError::InvalidTransition(
                "target selection requires the VNC technology",
            ));
        }

        self.current.title = Some(target.title());
        self.current.selected_target = Some(target);
        self.current.is_streaming = true;
        Ok(())
    }

    /// End the session: every field returns to its empty default.
    pub fn stop(&mut self) {
        self.current = SessionSnapshot::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: &[Technology] = &[Technology::Vnc, Technology::WebRtc];

    #[test]
    fn negotiate_marks_session_mobile() {
        let mut state = SessionState::new();
        state.negotiate(Technology::Vnc, ALL).unwrap();

        let snapshot = state.snapshot();
        assert_eq!(snapshot.technology, Some(Technology::Vnc));
        assert!(snapshot.is_mobile);
        assert_eq!(snapshot.title.as_deref(), Some(MOBILE_TITLE));
        assert!(!snapshot.is_streaming);
    }

    #[test]
    fn negotiate_rejects_disallowed_technology() {
        let mut state = SessionState::new();
        let err = state
            .negotiate(Technology::WebRtc, &[Technology::Vnc])
            .unwrap_err();
        assert_eq!(
            err,
            CommandError::UnsupportedTechnology("WebRTC".to_string())
        );
        assert!(state.snapshot().is_empty());
    }

    #[test]
    fn start_requires_negotiation() {
        let mut state = SessionState::new();
        let err = state.start_stream(None).unwrap_err();
        assert!(matches!(err, CommandError::InvalidTransition(_)));
        assert!(!state.snapshot().is_streaming);
    }

    #[test]
    fn start_keeps_existing_content_when_none_supplied() {
        let mut state = SessionState::new();
        state.negotiate(Technology::WebRtc, ALL).unwrap();
        state
            .start_stream(Some(MediaHandle(vec![1, 2, 3])))
            .unwrap();
        state.start_stream(None).unwrap();

        assert_eq!(state.snapshot().content, Some(MediaHandle(vec![1, 2, 3])));
    }

    #[test]
    fn select_screen_derives_title_and_streams() {
        let mut state = SessionState::new();
        state.negotiate(Technology::Vnc, ALL).unwrap();
        state
            .select_target(ShareTarget::Screen("2".to_string()))
            .unwrap();

        let snapshot = state.snapshot();
        assert_eq!(snapshot.title.as_deref(), Some("Screen 2"));
        assert_eq!(
            snapshot.selected_target,
            Some(ShareTarget::Screen("2".to_string()))
        );
        assert!(snapshot.is_streaming);
    }

    #[test]
    fn select_window_derives_title() {
        let mut state = SessionState::new();
        state.negotiate(Technology::Vnc, ALL).unwrap();
        state
            .select_target(ShareTarget::Window("1".to_string()))
            .unwrap();
        assert_eq!(state.snapshot().title.as_deref(), Some("Window 1"));
    }

    #[test]
    fn select_requires_vnc() {
        let mut state = SessionState::new();
        state.negotiate(Technology::WebRtc, ALL).unwrap();
        let err = state
            .select_target(ShareTarget::Screen("1".to_string()))
            .unwrap_err();
        assert!(matches!(err, CommandError::InvalidTransition(_)));
        assert!(state.snapshot().selected_target.is_none());
    }

    #[test]
    fn select_is_allowed_while_mobile() {
        // Negotiation always sets the mobile flag; selection must still work.
        let mut state = SessionState::new();
        state.negotiate(Technology::Vnc, ALL).unwrap();
        assert!(state.snapshot().is_mobile);
        state
            .select_target(ShareTarget::Screen("1".to_string()))
            .unwrap();
        assert_eq!(state.snapshot().title.as_deref(), Some("Screen 1"));
    }

    #[test]
    fn renegotiation_clears_selected_target() {
        // selected_target implies VNC; switching technologies must not
        // leave a stale target behind.
        let mut state = SessionState::new();
        state.negotiate(Technology::Vnc, ALL).unwrap();
        state
            .select_target(ShareTarget::Screen("1".to_string()))
            .unwrap();

        state.negotiate(Technology::WebRtc, ALL).unwrap();
        let snapshot = state.snapshot();
        assert!(snapshot.selected_target.is_none());
        assert_eq!(snapshot.title.as_deref(), Some(MOBILE_TITLE));
    }

    #[test]
    fn pause_toggles_without_touching_streaming() {
        let mut state = SessionState::new();
        state.negotiate(Technology::Vnc, ALL).unwrap();
        state.start_stream(None).unwrap();

        assert!(state.toggle_pause());
        let snapshot = state.snapshot();
        assert!(snapshot.is_paused);
        assert!(snapshot.is_streaming);

        assert!(!state.toggle_pause());
        assert!(!state.snapshot().is_paused);
    }

    #[test]
    fn stop_resets_every_field() {
        let mut state = SessionState::new();
        state.negotiate(Technology::Vnc, ALL).unwrap();
        state
            .start_stream(Some(MediaHandle(vec![9; 8])))
            .unwrap();
        state
            .select_target(ShareTarget::Window("3".to_string()))
            .unwrap();
        state.toggle_pause();

        state.stop();
        assert!(state.snapshot().is_empty());
    }

    #[test]
    fn streaming_implies_technology() {
        // The invariant holds across every mutation path.
        let mut state = SessionState::new();
        assert!(state.start_stream(None).is_err());
        assert!(state
            .select_target(ShareTarget::Screen("1".to_string()))
            .is_err());

        state.negotiate(Technology::Vnc, ALL).unwrap();
        state.start_stream(None).unwrap();
        let snapshot = state.snapshot();
        assert!(snapshot.is_streaming);
        assert!(snapshot.technology.is_some());
    }
}
