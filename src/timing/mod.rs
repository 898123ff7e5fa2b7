pub mod backoff;
pub mod debounce;
