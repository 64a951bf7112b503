//! Parallel utilities with feature-gated implementations
//!
//! Provides the data-parallel helpers used by the engines, backed by rayon
//! when the `rayon` feature is enabled and by sequential loops otherwise.
//! They run on whatever pool is current, so callers wrap them in
//! [`ExecutionContext::install`](crate::context::ExecutionContext::install).

/// Parallel map with index
#[cfg(feature = "rayon")]
pub fn parallel_map_indexed<U, F>(count: usize, f: F) -> Vec<U>
where
    U: Send,
    F: Fn(usize) -> U + Sync + Send,
{
    use rayon::prelude::*;
    (0..count).into_par_iter().map(f).collect()
}

/// Sequential map with index (fallback)
#[cfg(not(feature = "rayon"))]
pub fn parallel_map_indexed<U, F>(count: usize, f: F) -> Vec<U>
where
    F: Fn(usize) -> U,
{
    (0..count).map(f).collect()
}

/// Apply `f` to every fixed-size chunk of `data`, in parallel when possible
#[cfg(feature = "rayon")]
pub fn parallel_chunks_mut<T, F>(data: &mut [T], chunk: usize, f: F)
where
    T: Send,
    F: Fn(&mut [T]) + Sync + Send,
{
    use rayon::prelude::*;
    data.par_chunks_mut(chunk).for_each(f);
}

/// Sequential chunk loop (fallback)
#[cfg(not(feature = "rayon"))]
pub fn parallel_chunks_mut<T, F>(data: &mut [T], chunk: usize, f: F)
where
    F: Fn(&mut [T]),
{
    data.chunks_mut(chunk).for_each(f);
}

/// Apply `f` to every element of `data`, in parallel when possible
#[cfg(feature = "rayon")]
pub fn parallel_for_each_mut<T, F>(data: &mut [T], f: F)
where
    T: Send,
    F: Fn(&mut T) + Sync + Send,
{
    use rayon::prelude::*;
    data.par_iter_mut().for_each(f);
}

/// Sequential for_each (fallback)
#[cfg(not(feature = "rayon"))]
pub fn parallel_for_each_mut<T, F>(data: &mut [T], f: F)
where
    F: Fn(&mut T),
{
    data.iter_mut().for_each(f);
}
