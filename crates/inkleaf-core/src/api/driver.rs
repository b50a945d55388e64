//! Parallel page driver (component J, spec.md §4.5/§5): runs independent
//! page extractions concurrently and reassembles them in ascending page
//! order regardless of completion order.
//!
//! Grounded in the teacher's `api::high_level::extract_text_to_fp_from_doc_inner`
//! pattern: collect `(page_index, result)` pairs through a `par_iter`, then
//! `sort_by_key` before consuming — rayon makes no ordering promise on its
//! own, so the index travels with the result.

use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{PdfError, Result};

/// Runs `page_fn` over `0..page_count`, either sequentially or spread
/// across rayon's global pool, checking `cancel` between pages (sequential)
/// or before each unit of work (parallel). On cancellation the call returns
/// [`PdfError::Cancelled`] and any results already produced are dropped,
/// per spec.md §5's cancellation contract.
pub(crate) fn run_pages<T, F>(
    page_count: usize,
    parallel: bool,
    cancel: &AtomicBool,
    page_fn: F,
) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    if parallel {
        let mut results: Vec<(usize, Option<T>)> = (0..page_count)
            .into_par_iter()
            .map(|i| {
                if cancel.load(Ordering::Relaxed) {
                    (i, None)
                } else {
                    (i, Some(page_fn(i)))
                }
            })
            .collect();
        results.sort_by_key(|(i, _)| *i);
        results
            .into_iter()
            .map(|(_, r)| r.ok_or(PdfError::Cancelled))
            .collect()
    } else {
        let mut out = Vec::with_capacity(page_count);
        for i in 0..page_count {
            if cancel.load(Ordering::Relaxed) {
                return Err(PdfError::Cancelled);
            }
            out.push(page_fn(i));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_preserves_order() {
        let cancel = AtomicBool::new(false);
        let out = run_pages(5, false, &cancel, |i| i * 2).unwrap();
        assert_eq!(out, vec![0, 2, 4, 6, 8]);
    }

    #[test]
    fn parallel_preserves_order() {
        let cancel = AtomicBool::new(false);
        let out = run_pages(8, true, &cancel, |i| i * 10).unwrap();
        assert_eq!(out, vec![0, 10, 20, 30, 40, 50, 60, 70]);
    }

    #[test]
    fn cancellation_before_start_yields_error() {
        let cancel = AtomicBool::new(true);
        let err = run_pages(3, false, &cancel, |i| i).unwrap_err();
        assert!(matches!(err, PdfError::Cancelled));
    }
}
