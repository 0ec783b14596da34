use thiserror::Error;

/// Errors returned while constructing a [`crate::CalendarCore`] or
/// [`crate::DynamicQueue`].
///
/// Every other failure mode described by the queue's contract (a causality
/// violation on push, popping an empty list, removing an unqueued event)
/// is a programmer error rather than a recoverable one, and is reported
/// via `assert!`/`debug_assert!` instead of a `Result` — see the crate's
/// `DESIGN.md` for the rationale.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarQueueError {
    /// `log_bin_size + log_num_bins` would not fit in [`crate::Time`],
    /// so `year_length = bin_size * num_bins` cannot be represented.
    #[error(
        "geometry (log_bin_size={log_bin_size}, log_num_bins={log_num_bins}) \
         overflows the {time_bits}-bit time type"
    )]
    GeometryOverflow {
        log_bin_size: u32,
        log_num_bins: u32,
        time_bits: u32,
    },
}
