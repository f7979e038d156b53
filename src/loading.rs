use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared "a request is in flight" flag driving the spinner in the footer.
///
/// Clone the handle freely; all clones point at the same flag. Overlapping
/// `with_loading` calls race on it and the last one to finish wins — there is
/// no nesting counter. Known limitation, kept deliberately simple.
#[derive(Clone, Default)]
pub struct LoadingState {
    active: Arc<AtomicBool>,
}

impl LoadingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&self) {
        self.active.store(true, Ordering::Relaxed);
    }

    pub fn hide(&self) {
        self.active.store(false, Ordering::Relaxed);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }

    /// Runs `op` with the flag raised and clears it on every exit path,
    /// including an early drop of the future. The result is passed through
    /// untouched.
    pub async fn with_loading<F, Fut, T, E>(&self, op: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let _guard = LoadingGuard::raise(self);
        op().await
    }
}

/// Raises the flag on construction, lowers it on drop.
struct LoadingGuard {
    active: Arc<AtomicBool>,
}

impl LoadingGuard {
    fn raise(state: &LoadingState) -> Self {
        state.show();
        Self {
            active: state.active.clone(),
        }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.active.store(false, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_and_hide_are_idempotent() {
        let loading = LoadingState::new();
        assert!(!loading.is_active());

        loading.show();
        loading.show();
        assert!(loading.is_active());

        loading.hide();
        loading.hide();
        assert!(!loading.is_active());
    }

    #[tokio::test]
    async fn flag_is_raised_during_op_and_cleared_after_success() {
        let loading = LoadingState::new();
        let observer = loading.clone();

        let result: Result<u32, String> = loading
            .with_loading(|| async move {
                assert!(observer.is_active());
                Ok(42)
            })
            .await;

        assert_eq!(result, Ok(42));
        assert!(!loading.is_active());
    }

    #[tokio::test]
    async fn flag_is_cleared_after_failure_and_error_propagates() {
        let loading = LoadingState::new();
        let observer = loading.clone();

        let result: Result<u32, String> = loading
            .with_loading(|| async move {
                assert!(observer.is_active());
                Err("boom".to_string())
            })
            .await;

        assert_eq!(result, Err("boom".to_string()));
        assert!(!loading.is_active());
    }

    #[tokio::test]
    async fn clones_share_the_same_flag() {
        let loading = LoadingState::new();
        let other = loading.clone();

        loading.show();
        assert!(other.is_active());
        other.hide();
        assert!(!loading.is_active());
    }
}
