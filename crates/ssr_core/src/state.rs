use std::sync::Arc;

use crate::store::Store;
use crate::view::View;

/// Where a route resolution is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResolutionPhase {
    #[default]
    Pending,
    Matching,
    /// Terminal with a draw target and a populated store.
    Rendered,
    /// Terminal, no draw target, `redirect_target` is set.
    Redirected,
    /// Terminal, a handler failed. Whatever draw target existed is kept.
    Failed,
}

impl ResolutionPhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ResolutionPhase::Rendered | ResolutionPhase::Redirected | ResolutionPhase::Failed
        )
    }
}

/// Why a resolution ended in [`ResolutionPhase::Failed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureCause {
    /// No route matched the path.
    NotFound,
    /// A handler failed. Carries the rendered error chain.
    Handler(String),
}

/// Result of resolving one route.
#[derive(Debug, Default)]
pub struct RenderState {
    pub draw_target: Option<View>,
    pub store: Option<Arc<Store>>,
    pub redirect_target: Option<String>,
    pub phase: ResolutionPhase,
    pub failure: Option<FailureCause>,
}

impl RenderState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the per-navigation fields so the state can be reused.
    pub fn reset(&mut self) {
        self.draw_target = None;
        self.redirect_target = None;
        self.phase = ResolutionPhase::Pending;
        self.failure = None;
    }

    pub fn is_redirect(&self) -> bool {
        self.phase == ResolutionPhase::Redirected
    }

    pub fn is_not_found(&self) -> bool {
        self.failure == Some(FailureCause::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_keeps_store() {
        let store = Arc::new(crate::store::StoreDescriptors::new().init(&Default::default()));
        let mut state = RenderState {
            draw_target: Some(View::text("x")),
            store: Some(Arc::clone(&store)),
            redirect_target: Some("/login".to_string()),
            phase: ResolutionPhase::Redirected,
            failure: None,
        };

        state.reset();

        assert!(state.draw_target.is_none());
        assert!(state.redirect_target.is_none());
        assert_eq!(state.phase, ResolutionPhase::Pending);
        assert!(Arc::ptr_eq(state.store.as_ref().unwrap(), &store));
    }

    #[test]
    fn test_terminal_phases() {
        assert!(!ResolutionPhase::Pending.is_terminal());
        assert!(!ResolutionPhase::Matching.is_terminal());
        assert!(ResolutionPhase::Rendered.is_terminal());
        assert!(ResolutionPhase::Redirected.is_terminal());
        assert!(ResolutionPhase::Failed.is_terminal());
    }
}
