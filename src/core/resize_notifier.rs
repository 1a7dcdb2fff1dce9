use super::size::Size;

/// What a single size evaluation did to the recorded baseline
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResizeOutcome {
    /// First evaluation, baseline recorded without notification
    Baseline(Size),
    /// Same size as the baseline
    Unchanged,
    /// Size changed; the resize hook ran once
    Resized { size: Size, prev: Size },
}

impl ResizeOutcome {
    /// Whether the size differs from what was recorded before this evaluation
    pub fn changed(&self) -> bool {
        !matches!(self, ResizeOutcome::Unchanged)
    }
}

/// Diffs resolved sizes against the last notified size
#[derive(Debug, Clone, Copy, Default)]
pub struct ResizeNotifier;

impl ResizeNotifier {
    /// Compare `size` with `last`, recording it on first use or on a change
    ///
    /// `last` is overwritten only when it is unset or differs from `size`.
    pub fn notify(last: &mut Option<Size>, size: Size) -> ResizeOutcome {
        match *last {
            None => {
                *last = Some(size);
                ResizeOutcome::Baseline(size)
            }
            Some(prev) if prev == size => ResizeOutcome::Unchanged,
            Some(prev) => {
                *last = Some(size);
                ResizeOutcome::Resized { size, prev }
            }
        }
    }

    /// Same as [`ResizeNotifier::notify`], firing `on_resized(size, prev)` once on a change
    pub fn notify_with<F>(last: &mut Option<Size>, size: Size, on_resized: F) -> ResizeOutcome
    where
        F: FnOnce(Size, Size),
    {
        let outcome = Self::notify(last, size);
        if let ResizeOutcome::Resized { size, prev } = outcome {
            on_resized(size, prev);
        }
        outcome
    }
}
